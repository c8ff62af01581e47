// crates/wq_physics/src/error.rs

//! 物理层错误类型
//!
//! 传播策略沿用基础层约定：构造期错误经 `WqError` 立即传播；
//! 步内数值保护（分母钳制）只记录日志；收敛失败是类型化、
//! 可重试的结果，绝不在热循环中 panic。

use thiserror::Error;

/// 沉积物子模型错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SedimentError {
    /// 需氧量二分求解未收敛
    ///
    /// 成岩速率连续，几乎总能用更宽的区间重新括住根；
    /// 调用方应视为可重试条件而非致命错误。
    #[error("沉积物需氧量求解未收敛: 迭代 {iterations} 次, 残差 {residual:.3e}")]
    NonConvergence {
        /// 已执行的迭代次数
        iterations: usize,
        /// 终止时的残差
        residual: f64,
    },

    /// 求解区间未括住根
    #[error("求解区间 [{lo:.3e}, {hi:.3e}] 未括住根")]
    BracketFailure {
        /// 区间下界
        lo: f64,
        /// 区间上界
        hi: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = SedimentError::NonConvergence {
            iterations: 50,
            residual: 1.2e-3,
        };
        assert!(err.to_string().contains("50"));
        assert!(err.to_string().contains("未收敛"));
    }
}
