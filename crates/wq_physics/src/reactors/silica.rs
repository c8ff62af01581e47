// crates/wq_physics/src/reactors/silica.rs

//! 硅反应器
//!
//! 池：生物硅（颗粒态）、溶解硅、吸附态硅。生物硅溶解是
//! 一阶温度修正反应，不受氧限制，故不实现矿化 trait。
//! 溶解硅对悬浮固体做线性吸附分配，与磷共用分配函数。
//! 生物硅与吸附态硅一同沉降。

use wq_config::{SilicaConfig, SECONDS_PER_DAY};

use crate::chemistry::{dissolved_fraction, ChemistryPools, PoolId};
use crate::fields::Field;
use crate::reactors::fill_rate;

/// 硅反应器
pub struct SilicaReactor {
    config: SilicaConfig,
    biogenic: PoolId,
    dissolved: PoolId,
    sorbed: PoolId,
    scratch: Field,
}

impl SilicaReactor {
    /// 创建反应器
    pub fn new(config: SilicaConfig, n_nodes: usize, n_layers: usize) -> Self {
        Self {
            config,
            biogenic: PoolId::biogenic_silica(),
            dissolved: PoolId::dissolved_silica(),
            sorbed: PoolId::sorbed_silica(),
            scratch: Field::new("silica_scratch", n_nodes, n_layers),
        }
    }

    /// 本反应器注册的池键
    pub fn keys(&self) -> Vec<PoolId> {
        vec![
            self.biogenic.clone(),
            self.dissolved.clone(),
            self.sorbed.clone(),
        ]
    }

    /// 推进一步：溶解 + 吸附分配
    pub fn integrate(
        &mut self,
        pools: &mut ChemistryPools,
        solids: &Field,
        anomaly: &Field,
        dt: f64,
    ) {
        let days = dt / SECONDS_PER_DAY;

        // 生物硅溶解：颗粒态 → 溶解态
        fill_rate(
            &mut self.scratch,
            pools.value(&self.biogenic),
            self.config.dissolution,
            anomaly,
            days,
        );
        pools.exchange(&self.scratch, Some(&self.biogenic), Some(&self.dissolved), None, None);

        self.repartition(pools, solids);
    }

    /// 吸附分配：把溶解硅/吸附态调整到对固体浓度的线性平衡
    fn repartition(&mut self, pools: &mut ChemistryPools, solids: &Field) {
        let kp = self.config.partition_coefficient;
        let dissolved = pools.value(&self.dissolved);
        let sorbed = pools.value(&self.sorbed);
        for i in 0..self.scratch.n_nodes() {
            for k in 0..self.scratch.n_layers() {
                let total = dissolved.at(i, k) + sorbed.at(i, k);
                let fd = dissolved_fraction(solids.at(i, k), kp);
                let target_sorbed = total * (1.0 - fd);
                self.scratch.set(i, k, target_sorbed - sorbed.at(i, k));
            }
        }
        pools.exchange(&self.scratch, Some(&self.dissolved), Some(&self.sorbed), None, None);
    }

    /// 生物硅 + 吸附态硅沉降，返回逐节点底层导出质量 [g Si]
    pub fn settle(&mut self, pools: &mut ChemistryPools, dt: f64) -> Vec<f64> {
        let vdt = self.config.settling_velocity * dt / SECONDS_PER_DAY;
        let mut deposited = vec![0.0; self.scratch.n_nodes()];
        for key in [self.biogenic.clone(), self.sorbed.clone()] {
            for (d, e) in deposited.iter_mut().zip(pools.sinking(vdt, &key)) {
                *d += e;
            }
        }
        deposited
    }
}
