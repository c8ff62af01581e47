// crates/wq_physics/src/engine/mod.rs

//! 单步驱动层
//!
//! 外部水动力模型提供 [`Forcing`]，[`Simulation::step`] 按
//! 输运 → 反应 → 沉积交换 → 提交的固定顺序推进一步，返回
//! [`StepDiagnostics`] 供守恒审计。

pub mod diagnostics;
pub mod driver;
pub mod forcing;

pub use diagnostics::StepDiagnostics;
pub use driver::Simulation;
pub use forcing::Forcing;
