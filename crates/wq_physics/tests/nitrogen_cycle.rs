// tests/nitrogen_cycle.rs

//! 氮循环情景测试
//!
//! 静水、均匀初值下硝化与反硝化的化学计量回归：
//! 铵的减少量必须等于硝酸盐的增加量，耗氧必须等于
//! 64/14 × 硝化量。

use std::sync::Arc;

use glam::DVec2;
use wq_config::ModelConfig;
use wq_mesh::{Layers, Topology};
use wq_physics::chemistry::{Phase, Reactivity};
use wq_physics::prelude::*;
use wq_physics::reactors::{CARBON_PER_NITRATE, OXYGEN_PER_NITROGEN};

fn fixture() -> (Simulation, Forcing) {
    let topology = Arc::new(
        Topology::build(
            &[
                DVec2::new(0.0, 0.0),
                DVec2::new(1.0, 0.0),
                DVec2::new(0.0, 1.0),
            ],
            &[4.0; 3],
            &[[0, 1, 2]],
        )
        .unwrap(),
    );
    let layers = Arc::new(Layers::uniform(2).unwrap());
    let forcing = Forcing::quiescent(3, 2);
    let sim = Simulation::new(ModelConfig::default(), topology, layers).unwrap();
    (sim, forcing)
}

#[test]
fn test_nitrification_stoichiometry_over_one_day() {
    let (mut sim, forcing) = fixture();
    sim.pools_mut().value_mut(&PoolId::ammonium()).fill(10.0);
    sim.pools_mut().value_mut(&PoolId::oxygen()).fill(8.0);

    let diag = sim.step(&forcing, 86400.0).unwrap();
    assert_eq!(diag.clamped, 0);

    let nh4 = sim.pools().value(&PoolId::ammonium()).at(0, 0);
    let no3 = sim.pools().value(&PoolId::nitrate()).at(0, 0);
    let o2 = sim.pools().value(&PoolId::oxygen()).at(0, 0);

    // 默认速率 0.1/d、氧半饱和 2 mg/L：硝化量 = 0.1·10·8/(8+2) = 0.8
    let nitrified = 10.0 - nh4;
    assert!((nitrified - 0.8).abs() < 1e-12, "硝化量 {} ≠ 0.8", nitrified);
    assert!((no3 - nitrified).abs() < 1e-12, "硝酸盐增量应等于铵减少量");
    assert!(
        (8.0 - o2 - nitrified * OXYGEN_PER_NITROGEN).abs() < 1e-12,
        "耗氧应为 64/14 × 硝化量"
    );
}

#[test]
fn test_denitrification_burns_labile_carbon() {
    let (mut sim, forcing) = fixture();
    let carbon = PoolId::organic(Reactivity::Labile, Phase::Dissolved, "carbon");
    sim.pools_mut().value_mut(&PoolId::nitrate()).fill(5.0);
    sim.pools_mut().value_mut(&carbon).fill(20.0);
    // 无氧：反硝化不受抑制，好氧反应全部停转

    let diag = sim.step(&forcing, 86400.0).unwrap();
    assert_eq!(diag.clamped, 0);

    let no3 = sim.pools().value(&PoolId::nitrate()).at(0, 0);
    let c = sim.pools().value(&carbon).at(0, 0);
    let dic = sim.pools().value(&PoolId::inorganic_carbon()).at(0, 0);

    let removed = 5.0 - no3;
    assert!(removed > 0.0, "无氧下反硝化应移除硝酸盐");
    assert!(
        (20.0 - c - removed * CARBON_PER_NITRATE).abs() < 1e-12,
        "碳消耗应为 5·12/(4·14) × 反硝化量"
    );
    assert!((dic - removed * CARBON_PER_NITRATE).abs() < 1e-12);

    // 气态脱除记入导出账
    let entry = diag.audit.entry(PoolId::nitrate().as_str()).unwrap();
    assert!(entry.exported_total > 0.0);
}
