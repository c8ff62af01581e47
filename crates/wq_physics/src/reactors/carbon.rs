// crates/wq_physics/src/reactors/carbon.rs

//! 碳反应器
//!
//! 有机碳池：反应性 × 相态叉积（4 个）加排泄/再循环溶解池（2 个）。
//! 反应链：水解（颗粒态 → 同反应性溶解态，一阶温度修正）、
//! 氧化（溶解态 → 无机碳，Michaelis-Menten 氧限制，按 32/12
//! 化学计量耗氧）。颗粒态池沉降，底层溢出沉积到床面。

use wq_config::{CarbonConfig, SECONDS_PER_DAY};

use crate::chemistry::{organic_pools, byproduct_pools, ChemistryPools, Phase, PoolId, Reactivity};
use crate::fields::Field;
use crate::reactors::{fill_rate, fill_rate_limited, Mineralize};

/// 每单位有机碳氧化耗氧 [g O₂ / g C]
pub const OXYGEN_PER_CARBON: f64 = 32.0 / 12.0;

const ELEMENT: &str = "carbon";

/// 碳反应器
pub struct CarbonReactor {
    config: CarbonConfig,
    inorganic: PoolId,
    oxygen: PoolId,
    scratch: Field,
}

impl CarbonReactor {
    /// 创建反应器
    pub fn new(config: CarbonConfig, n_nodes: usize, n_layers: usize) -> Self {
        Self {
            config,
            inorganic: PoolId::inorganic_carbon(),
            oxygen: PoolId::oxygen(),
            scratch: Field::new("carbon_scratch", n_nodes, n_layers),
        }
    }

    /// 本反应器注册的池键（不含共享的氧池）
    pub fn keys(&self) -> Vec<PoolId> {
        let mut keys = organic_pools(ELEMENT);
        keys.extend(byproduct_pools(ELEMENT));
        keys.push(self.inorganic.clone());
        keys
    }

    /// 推进一步：水解 + 氧化
    pub fn integrate(&mut self, pools: &mut ChemistryPools, anomaly: &Field, dt: f64) {
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
    }

    /// 颗粒态池沉降，返回逐节点底层导出质量 [g C]
    pub fn settle(&mut self, pools: &mut ChemistryPools, dt: f64) -> Vec<f64> {
        let vdt = self.config.settling_velocity * dt / SECONDS_PER_DAY;
        let mut deposited = vec![0.0; self.scratch.n_nodes()];
        for reactivity in Reactivity::ALL {
            let key = PoolId::organic(reactivity, Phase::Particulate, ELEMENT);
            for (d, e) in deposited.iter_mut().zip(pools.sinking(vdt, &key)) {
                *d += e;
            }
        }
        deposited
    }

    fn oxidation_sources(&self) -> Vec<PoolId> {
        let mut sources: Vec<PoolId> = Reactivity::ALL
            .iter()
            .map(|&r| PoolId::organic(r, Phase::Dissolved, ELEMENT))
            .collect();
        sources.extend(byproduct_pools(ELEMENT));
        sources
    }
}

impl Mineralize for CarbonReactor {
    /// 氧化：全部溶解有机碳池 → 无机碳，氧限制、按计量耗氧
    fn mineralize(&mut self, pools: &mut ChemistryPools, limit: &PoolId, anomaly: &Field, dt: f64) {
        let days = dt / SECONDS_PER_DAY;
        for src in self.oxidation_sources() {
            fill_rate_limited(
                &mut self.scratch,
                pools.value(&src),
                self.config.oxidation,
                anomaly,
                pools.value(limit),
                self.config.oxygen_half_sat,
                days,
            );
            pools.exchange(&self.scratch, Some(&src), Some(&self.inorganic), None, None);
            pools.exchange(&self.scratch, Some(&self.oxygen), None, None, Some(OXYGEN_PER_CARBON));
        }
    }
}
