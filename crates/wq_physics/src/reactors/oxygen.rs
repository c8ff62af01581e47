// crates/wq_physics/src/reactors/oxygen.rs

//! 氧反应器
//!
//! 持有溶解氧池与化学需氧量当量池。碳氧化、硝化等耗氧反应由
//! 各自的反应器按计量扣减氧池；本反应器负责剩余的当量需氧
//! （COD）衰减：当量池与氧池等量同减，受氧 Michaelis-Menten
//! 限制。

use wq_config::{OxygenConfig, SECONDS_PER_DAY};

use crate::chemistry::{ChemistryPools, PoolId};
use crate::fields::Field;
use crate::reactors::fill_rate_limited;

/// 氧反应器
pub struct OxygenReactor {
    config: OxygenConfig,
    oxygen: PoolId,
    demand: PoolId,
    scratch: Field,
}

impl OxygenReactor {
    /// 创建反应器
    pub fn new(config: OxygenConfig, n_nodes: usize, n_layers: usize) -> Self {
        Self {
            config,
            oxygen: PoolId::oxygen(),
            demand: PoolId::oxygen_demand(),
            scratch: Field::new("oxygen_scratch", n_nodes, n_layers),
        }
    }

    /// 本反应器注册的池键
    pub fn keys(&self) -> Vec<PoolId> {
        vec![self.oxygen.clone(), self.demand.clone()]
    }

    /// 推进一步：当量需氧衰减
    pub fn integrate(&mut self, pools: &mut ChemistryPools, anomaly: &Field, dt: f64) {
        let days = dt / SECONDS_PER_DAY;
        fill_rate_limited(
            &mut self.scratch,
            pools.value(&self.demand),
            self.config.cod_oxidation,
            anomaly,
            pools.value(&self.oxygen),
            self.config.oxygen_half_sat,
            days,
        );
        // 当量池氧化消失，同量耗氧
        pools.exchange(&self.scratch, Some(&self.demand), None, None, None);
        pools.exchange(&self.scratch, Some(&self.oxygen), None, None, None);
    }
}
