// crates/wq_physics/src/reactors/nitrogen.rs

//! 氮反应器
//!
//! 有机氮池叉积 + 铵 + 硝酸盐。反应链：水解、矿化（溶解有机氮
//! → 铵）、硝化（铵 → 硝酸盐，按 64/14 耗氧）、反硝化（硝酸盐
//! → 气态脱除，氧抑制，消耗易分解溶解有机碳，按 5·12/(4·14)
//! 计量）。距平低于 −20 °C 时反硝化硬零。

use wq_config::{NitrogenConfig, SECONDS_PER_DAY};

use crate::chemistry::{
    self, byproduct_pools, organic_pools, ChemistryPools, Phase, PoolId, Reactivity,
};
use crate::fields::Field;
use crate::reactors::{fill_rate, fill_rate_limited, Mineralize};

/// 每单位铵硝化耗氧 [g O₂ / g N]
pub const OXYGEN_PER_NITROGEN: f64 = 64.0 / 14.0;

/// 每单位硝酸盐反硝化消耗有机碳 [g C / g N]
pub const CARBON_PER_NITRATE: f64 = 5.0 * 12.0 / (4.0 * 14.0);

/// 反硝化硬零的温度距平下限 [°C]
pub const DENITRIFICATION_CUTOFF: f64 = -20.0;

const ELEMENT: &str = "nitrogen";

/// 氮反应器
pub struct NitrogenReactor {
    config: NitrogenConfig,
    ammonium: PoolId,
    nitrate: PoolId,
    oxygen: PoolId,
    carbon_source: PoolId,
    carbon_sink: PoolId,
    scratch: Field,
}

impl NitrogenReactor {
    /// 创建反应器
    pub fn new(config: NitrogenConfig, n_nodes: usize, n_layers: usize) -> Self {
        Self {
            config,
            ammonium: PoolId::ammonium(),
            nitrate: PoolId::nitrate(),
            oxygen: PoolId::oxygen(),
            carbon_source: PoolId::organic(Reactivity::Labile, Phase::Dissolved, "carbon"),
            carbon_sink: PoolId::inorganic_carbon(),
            scratch: Field::new("nitrogen_scratch", n_nodes, n_layers),
        }
    }

    /// 本反应器注册的池键（不含共享的氧池与碳池）
    pub fn keys(&self) -> Vec<PoolId> {
        let mut keys = organic_pools(ELEMENT);
        keys.extend(byproduct_pools(ELEMENT));
        keys.push(self.ammonium.clone());
        keys.push(self.nitrate.clone());
        keys
    }

    /// 推进一步：水解 + 矿化 + 硝化 + 反硝化
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
        self.nitrify(pools, anomaly, days);
        self.denitrify(pools, anomaly, days);
    }

    /// 硝化：铵 → 硝酸盐，Michaelis-Menten 氧限制，按计量耗氧
    fn nitrify(&mut self, pools: &mut ChemistryPools, anomaly: &Field, days: f64) {
        fill_rate_limited(
            &mut self.scratch,
            pools.value(&self.ammonium),
            self.config.nitrification,
            anomaly,
            pools.value(&self.oxygen),
            self.config.nitrification_half_sat,
            days,
        );
        pools.exchange(&self.scratch, Some(&self.ammonium), Some(&self.nitrate), None, None);
        pools.exchange(
            &self.scratch,
            Some(&self.oxygen),
            None,
            None,
            Some(OXYGEN_PER_NITROGEN),
        );
    }

    /// 反硝化：硝酸盐气态脱除，氧抑制，消耗易分解溶解有机碳
    fn denitrify(&mut self, pools: &mut ChemistryPools, anomaly: &Field, days: f64) {
        let rate = self.config.denitrification;
        let nitrate = pools.value(&self.nitrate);
        let oxygen = pools.value(&self.oxygen);
        for i in 0..self.scratch.n_nodes() {
            for k in 0..self.scratch.n_layers() {
                let a = anomaly.at(i, k);
                let r = if a < DENITRIFICATION_CUTOFF {
                    0.0
                } else {
                    chemistry::rxn(rate.kappa, rate.theta, nitrate.at(i, k), a)
                        * chemistry::inhibition(
                            oxygen.at(i, k),
                            self.config.denitrification_inhibition,
                        )
                };
                self.scratch.set(i, k, r * days);
            }
        }
        // 硝酸盐以气态离开系统，记入导出
        pools.exchange(&self.scratch, Some(&self.nitrate), None, None, None);
        // 反硝化的电子供体：易分解溶解有机碳被氧化为无机碳
        pools.exchange(
            &self.scratch,
            Some(&self.carbon_source),
            Some(&self.carbon_sink),
            None,
            Some(CARBON_PER_NITRATE),
        );
    }

    /// 颗粒态池沉降，返回逐节点底层导出质量 [g N]
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
}

impl Mineralize for NitrogenReactor {
    /// 矿化：全部溶解有机氮池 → 铵，氧限制
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
            pools.exchange(&self.scratch, Some(&src), Some(&self.ammonium), None, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use std::sync::Arc;
    use wq_mesh::{Layers, Topology};

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    fn ledger_with(reactor: &NitrogenReactor) -> ChemistryPools {
        let topo = Arc::new(
            Topology::build(
                &[
                    DVec2::new(0.0, 0.0),
                    DVec2::new(1.0, 0.0),
                    DVec2::new(0.0, 1.0),
                ],
                &[2.0; 3],
                &[[0, 1, 2]],
            )
            .unwrap(),
        );
        let layers = Arc::new(Layers::uniform(2).unwrap());
        let mut keys = reactor.keys();
        keys.push(PoolId::oxygen());
        keys.push(PoolId::organic(Reactivity::Labile, Phase::Dissolved, "carbon"));
        keys.push(PoolId::inorganic_carbon());
        ChemistryPools::new(topo, layers, &keys).unwrap()
    }

    #[test]
    fn test_nitrification_stoichiometry() {
        let mut reactor = NitrogenReactor::new(NitrogenConfig::default(), 3, 2);
        let mut pools = ledger_with(&reactor);

        pools.value_mut(&PoolId::ammonium()).fill(10.0);
        pools.value_mut(&PoolId::oxygen()).fill(8.0);

        reactor.integrate(&mut pools, &Field::new("anomaly", 3, 2), SECONDS_PER_DAY);

        let nitrified = -pools.delta(&PoolId::ammonium()).at(0, 0);
        assert!(nitrified > 0.0);
        // 硝酸盐全部来自硝化（初值为零，反硝化速率为零）
        assert!(approx_eq(pools.delta(&PoolId::nitrate()).at(0, 0), nitrified));
        assert!(approx_eq(
            pools.delta(&PoolId::oxygen()).at(0, 0),
            -nitrified * OXYGEN_PER_NITROGEN
        ));
    }

    #[test]
    fn test_denitrification_consumes_carbon() {
        let mut reactor = NitrogenReactor::new(NitrogenConfig::default(), 3, 2);
        let mut pools = ledger_with(&reactor);

        let carbon = PoolId::organic(Reactivity::Labile, Phase::Dissolved, "carbon");
        pools.value_mut(&PoolId::nitrate()).fill(5.0);
        pools.value_mut(&carbon).fill(20.0);
        // 无氧：抑制因子为 1，反硝化全速

        reactor.integrate(&mut pools, &Field::new("anomaly", 3, 2), SECONDS_PER_DAY);

        let removed = -pools.delta(&PoolId::nitrate()).at(0, 0);
        assert!(removed > 0.0);
        assert!(approx_eq(
            pools.delta(&carbon).at(0, 0),
            -removed * CARBON_PER_NITRATE
        ));
        assert!(approx_eq(
            pools.delta(&PoolId::inorganic_carbon()).at(0, 0),
            removed * CARBON_PER_NITRATE
        ));
    }

    #[test]
    fn test_denitrification_cold_cutoff() {
        let mut reactor = NitrogenReactor::new(NitrogenConfig::default(), 3, 2);
        let mut pools = ledger_with(&reactor);

        pools.value_mut(&PoolId::nitrate()).fill(5.0);

        let mut anomaly = Field::new("anomaly", 3, 2);
        anomaly.fill(-25.0);
        reactor.integrate(&mut pools, &anomaly, SECONDS_PER_DAY);

        assert!(approx_eq(pools.delta(&PoolId::nitrate()).at(0, 0), 0.0));
    }

    #[test]
    fn test_mineralization_feeds_ammonium() {
        let mut reactor = NitrogenReactor::new(NitrogenConfig::default(), 3, 2);
        let mut pools = ledger_with(&reactor);

        let ldn = PoolId::organic(Reactivity::Labile, Phase::Dissolved, "nitrogen");
        pools.value_mut(&ldn).fill(4.0);
        pools.value_mut(&PoolId::oxygen()).fill(8.0);

        reactor.integrate(&mut pools, &Field::new("anomaly", 3, 2), SECONDS_PER_DAY);

        let mineralized = pools.delta(&PoolId::ammonium()).at(0, 0);
        assert!(mineralized > 0.0);
        assert!(approx_eq(pools.delta(&ldn).at(0, 0), -mineralized));
    }
}
