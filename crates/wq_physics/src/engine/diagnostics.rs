// crates/wq_physics/src/engine/diagnostics.rs

//! 单步诊断快照
//!
//! 每步返回的审计与沉积物求解报告，serde 可序列化，供调用方
//! 落盘或做守恒回归。

use serde::Serialize;

use crate::chemistry::PoolAudit;
use crate::sediment::SedimentReport;

/// 一个时间步的诊断汇总
#[derive(Debug, Clone, Serialize)]
pub struct StepDiagnostics {
    /// 步序号（从 0 起）
    pub step: u64,
    /// 逐池质量审计
    pub audit: PoolAudit,
    /// 沉积床求解报告
    pub sediment: SedimentReport,
    /// 提交时钳制的负值个数
    pub clamped: usize,
}
