// crates/wq_physics/src/reactors/sulfur.rs

//! 硫反应器
//!
//! 池：硫化氢、硫酸盐，都以硫质量计，两池之间 1:1 交换。
//! 硫化氢主要来自床面厌氧层的通量注入，在水柱中被氧化为
//! 硫酸盐，按硫质量计每单位耗氧 2.0。

use wq_config::{SulfurConfig, SECONDS_PER_DAY};

use crate::chemistry::{ChemistryPools, PoolId};
use crate::fields::Field;
use crate::reactors::fill_rate_limited;

/// 每单位硫化氢氧化耗氧 [g O₂ / g S]
pub const OXYGEN_PER_SULFIDE: f64 = 2.0;

/// 硫反应器
pub struct SulfurReactor {
    config: SulfurConfig,
    sulfide: PoolId,
    sulfate: PoolId,
    oxygen: PoolId,
    scratch: Field,
}

impl SulfurReactor {
    /// 创建反应器
    pub fn new(config: SulfurConfig, n_nodes: usize, n_layers: usize) -> Self {
        Self {
            config,
            sulfide: PoolId::hydrogen_sulfide(),
            sulfate: PoolId::sulfate(),
            oxygen: PoolId::oxygen(),
            scratch: Field::new("sulfur_scratch", n_nodes, n_layers),
        }
    }

    /// 本反应器注册的池键（不含共享的氧池）
    pub fn keys(&self) -> Vec<PoolId> {
        vec![self.sulfide.clone(), self.sulfate.clone()]
    }

    /// 推进一步：硫化氢氧化
    pub fn integrate(&mut self, pools: &mut ChemistryPools, anomaly: &Field, dt: f64) {
        let days = dt / SECONDS_PER_DAY;
        fill_rate_limited(
            &mut self.scratch,
            pools.value(&self.sulfide),
            self.config.oxidation,
            anomaly,
            pools.value(&self.oxygen),
            self.config.oxygen_half_sat,
            days,
        );
        pools.exchange(&self.scratch, Some(&self.sulfide), Some(&self.sulfate), None, None);
        pools.exchange(
            &self.scratch,
            Some(&self.oxygen),
            None,
            None,
            Some(OXYGEN_PER_SULFIDE),
        );
    }
}
