// crates/wq_physics/src/chemistry/mod.rs

//! 化学簿记基座
//!
//! - [`pools`]: 池命名代数（refractory|labile × particulate|dissolved ×
//!   excreted|recycled）与四账本 (`value`/`delta`/`mass`/`added`) 原语
//! - [`rates`]: 全反应器共享的温度速率律与 Michaelis-Menten 辅助

pub mod pools;
pub mod rates;

pub use pools::{
    byproduct_pools, organic_pools, ChemistryPools, NegativePolicy, Origin, Phase, PoolAudit,
    PoolId, PoolLedger, Reactivity,
};
pub use rates::{dissolved_fraction, inhibition, michaelis, rxn};
