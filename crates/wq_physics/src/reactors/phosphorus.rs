// crates/wq_physics/src/reactors/phosphorus.rs

//! 磷反应器
//!
//! 有机磷池叉积 + 磷酸盐 + 吸附态磷。反应链：水解、矿化
//! （溶解有机磷 → 磷酸盐）、对悬浮固体的线性吸附分配
//! （磷酸盐 ↔ 吸附态，每步调整到平衡）。颗粒态有机磷与
//! 吸附态磷一同沉降。

use wq_config::{PhosphorusConfig, SECONDS_PER_DAY};

use crate::chemistry::{
    byproduct_pools, dissolved_fraction, organic_pools, ChemistryPools, Phase, PoolId, Reactivity,
};
use crate::fields::Field;
use crate::reactors::{fill_rate, fill_rate_limited, Mineralize};

const ELEMENT: &str = "phosphorus";

/// 磷反应器
pub struct PhosphorusReactor {
    config: PhosphorusConfig,
    phosphate: PoolId,
    sorbed: PoolId,
    oxygen: PoolId,
    scratch: Field,
}

impl PhosphorusReactor {
    /// 创建反应器
    pub fn new(config: PhosphorusConfig, n_nodes: usize, n_layers: usize) -> Self {
        Self {
            config,
            phosphate: PoolId::phosphate(),
            sorbed: PoolId::sorbed_phosphate(),
            oxygen: PoolId::oxygen(),
            scratch: Field::new("phosphorus_scratch", n_nodes, n_layers),
        }
    }

    /// 本反应器注册的池键（不含共享的氧池）
    pub fn keys(&self) -> Vec<PoolId> {
        let mut keys = organic_pools(ELEMENT);
        keys.extend(byproduct_pools(ELEMENT));
        keys.push(self.phosphate.clone());
        keys.push(self.sorbed.clone());
        keys
    }

    /// 推进一步：水解 + 矿化 + 吸附分配
    pub fn integrate(
        &mut self,
        pools: &mut ChemistryPools,
        solids: &Field,
        anomaly: &Field,
        dt: f64,
    ) {
        let days = dt / SECONDS_PER_DAY;

        // 水解：颗粒态 → 同反应性溶解态
        for reactivity in Reactivity::ALL {
            let src = PoolId::organic(reactivity, Phase::Particulate, ELEMENT);
            let dst = PoolId::organic(reactivity, Phase::Dissolved, ELEMENT);
            fill_rate(
                &mut self.scratch,
                pools.value(&src),
                self.config.hydrolysis,
                anomaly,
                days,
            );
            pools.exchange(&self.scratch, Some(&src), Some(&dst), None, None);
        }

        let limit = self.oxygen.clone();
        self.mineralize(pools, &limit, anomaly, dt);
        self.repartition(pools, solids);
    }

    /// 吸附分配：把磷酸盐/吸附态调整到对固体浓度的线性平衡
    fn repartition(&mut self, pools: &mut ChemistryPools, solids: &Field) {
        let kp = self.config.partition_coefficient;
        let phosphate = pools.value(&self.phosphate);
        let sorbed = pools.value(&self.sorbed);
        for i in 0..self.scratch.n_nodes() {
            for k in 0..self.scratch.n_layers() {
                let total = phosphate.at(i, k) + sorbed.at(i, k);
                let fd = dissolved_fraction(solids.at(i, k), kp);
                let target_sorbed = total * (1.0 - fd);
                self.scratch.set(i, k, target_sorbed - sorbed.at(i, k));
            }
        }
        pools.exchange(&self.scratch, Some(&self.phosphate), Some(&self.sorbed), None, None);
    }

    /// 颗粒态有机磷 + 吸附态磷沉降，返回逐节点底层导出质量 [g P]
    pub fn settle(&mut self, pools: &mut ChemistryPools, dt: f64) -> Vec<f64> {
        let vdt = self.config.settling_velocity * dt / SECONDS_PER_DAY;
        let mut keys: Vec<PoolId> = Reactivity::ALL
            .iter()
            .map(|&r| PoolId::organic(r, Phase::Particulate, ELEMENT))
            .collect();
        keys.push(self.sorbed.clone());

        let mut deposited = vec![0.0; self.scratch.n_nodes()];
        for key in keys {
            for (d, e) in deposited.iter_mut().zip(pools.sinking(vdt, &key)) {
                *d += e;
            }
        }
        deposited
    }
}

impl Mineralize for PhosphorusReactor {
    /// 矿化：全部溶解有机磷池 → 磷酸盐，氧限制
    fn mineralize(&mut self, pools: &mut ChemistryPools, limit: &PoolId, anomaly: &Field, dt: f64) {
        let days = dt / SECONDS_PER_DAY;
        let mut sources: Vec<PoolId> = Reactivity::ALL
            .iter()
            .map(|&r| PoolId::organic(r, Phase::Dissolved, ELEMENT))
            .collect();
        sources.extend(byproduct_pools(ELEMENT));
        for src in sources {
            fill_rate_limited(
                &mut self.scratch,
                pools.value(&src),
                self.config.mineralization,
                anomaly,
                pools.value(limit),
                self.config.oxygen_half_sat,
                days,
            );
            pools.exchange(&self.scratch, Some(&src), Some(&self.phosphate), None, None);
        }
    }
}
