// crates/wq_physics/src/lib.rs

//! WaterQual 水质核心
//!
//! 非结构三角网格 + σ 分层的多物种反应-输运求解器。
//!
//! # 模块结构
//!
//! - [`fields`]: 节点×层标量场
//! - [`transport`]: 水平/垂向平流扩散、垂向速度闭合、盐度通量限制
//! - [`chemistry`]: 池命名代数、四账本簿记原语、共享速率律
//! - [`reactors`]: 碳/氧/氮/磷/硅/硫物种反应器
//! - [`sediment`]: 成岩-需氧量求解-通量施加状态机
//! - [`engine`]: 单步驱动（输运 → 反应 → 沉积交换 → 提交审计）
//!
//! # 一步的执行顺序
//!
//! 每个时间步为严格顺序管线，无内部并行：
//!
//! 1. 输运：`influx` → 盐度通量限制 → `omega` → 各池平流/扩散入 `mass`
//! 2. 反应：各反应器读上一步 `value`，向 `delta` 累加
//! 3. 沉积物交换：`flux()` 经共享 `exchange` 原语写入底层账本
//! 4. 提交：`value += delta`、清零、负值钳制、Kahan 质量审计
//!
//! 步 `t+1` 不可能读到步 `t` 未提交的状态。跨集合成员的并行由
//! 调用方负责：`Topology`/`Layers` 经 `Arc` 只读共享，每个成员
//! 独占自己的 [`engine::Simulation`]。

#![warn(clippy::all)]

pub mod chemistry;
pub mod engine;
pub mod error;
pub mod fields;
pub mod reactors;
pub mod sediment;
pub mod transport;

pub use error::SedimentError;
pub use fields::Field;

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::chemistry::{ChemistryPools, NegativePolicy, PoolAudit, PoolId};
    pub use crate::engine::{Forcing, Simulation, StepDiagnostics};
    pub use crate::error::SedimentError;
    pub use crate::fields::Field;
    pub use crate::sediment::{DemandOutcome, SedimentBed, SedimentPhase};
}
