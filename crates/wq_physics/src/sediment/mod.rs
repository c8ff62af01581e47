// crates/wq_physics/src/sediment/mod.rs

//! 沉积物成岩子模型
//!
//! 水柱颗粒态沉降在床面累积为有机碳/氮面密度，床面按好氧/
//! 厌氧双层衰解并向底层水体回馈氧债、铵和硫化氢。好氧层深度
//! 由需氧速率的区间二分解出。

pub mod bed;
pub mod demand;

pub use bed::{SedimentBed, SedimentPhase, SedimentReport, SULFIDE_PER_CARBON};
pub use demand::{solve_demand, DemandOutcome};
