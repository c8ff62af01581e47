// crates/wq_physics/src/reactors/mod.rs

//! 物种反应器
//!
//! 每个反应器在共享的 [`ChemistryPools`] 账本上执行本物种的
//! 速率律，经 `keys()` 在构造期注册池键。速率常数以 1/天 配置，
//! `integrate` 内按 `dt`（秒）折算；所有温度修正统一走
//! [`chemistry::rates::rxn`]，绝不逐反应器重写。
//!
//! 共享矿化行为以能力 trait [`Mineralize`] 组合（而非继承）：
//! 碳的氧化、氮的溶解有机氮矿化、磷的溶解有机磷矿化各自实现，
//! 目标无机池不同、速率表不同，但限制因子与温度形式一致。
//!
//! 失败语义：池键缺失是编程错误（致命 panic）；数值域问题
//! （分母过小）就地钳制并记录警告，绝不中断时间步。

pub mod carbon;
pub mod nitrogen;
pub mod oxygen;
pub mod phosphorus;
pub mod silica;
pub mod sulfur;

pub use carbon::{CarbonReactor, OXYGEN_PER_CARBON};
pub use nitrogen::{
    NitrogenReactor, CARBON_PER_NITRATE, DENITRIFICATION_CUTOFF, OXYGEN_PER_NITROGEN,
};
pub use oxygen::OxygenReactor;
pub use phosphorus::PhosphorusReactor;
pub use silica::SilicaReactor;
pub use sulfur::{SulfurReactor, OXYGEN_PER_SULFIDE};

use wq_config::RateConstant;

use crate::chemistry::{self, ChemistryPools, PoolId};
use crate::fields::Field;

/// 矿化能力：溶解有机池向无机池的氧化转化
///
/// `limit` 为限制性氧化剂的池键（通常是溶解氧），速率按
/// Michaelis-Menten 因子折减。
pub trait Mineralize {
    /// 执行一步矿化，增量写入账本的 `delta`
    fn mineralize(&mut self, pools: &mut ChemistryPools, limit: &PoolId, anomaly: &Field, dt: f64);
}

/// scratch = rxn(kappa, theta, value, anomaly) * days
pub(crate) fn fill_rate(
    scratch: &mut Field,
    value: &Field,
    rate: RateConstant,
    anomaly: &Field,
    days: f64,
) {
    debug_assert!(scratch.same_shape(value));
    for i in 0..value.n_nodes() {
        for k in 0..value.n_layers() {
            let r = chemistry::rxn(rate.kappa, rate.theta, value.at(i, k), anomaly.at(i, k));
            scratch.set(i, k, r * days);
        }
    }
}

/// scratch = rxn(...) * michaelis(limit, half_sat) * days
pub(crate) fn fill_rate_limited(
    scratch: &mut Field,
    value: &Field,
    rate: RateConstant,
    anomaly: &Field,
    limit: &Field,
    half_sat: f64,
    days: f64,
) {
    debug_assert!(scratch.same_shape(value));
    for i in 0..value.n_nodes() {
        for k in 0..value.n_layers() {
            let r = chemistry::rxn(rate.kappa, rate.theta, value.at(i, k), anomaly.at(i, k))
                * chemistry::michaelis(limit.at(i, k), half_sat);
            scratch.set(i, k, r * days);
        }
    }
}
