// crates/wq_physics/src/sediment/demand.rs

//! 床面氧需求的区间二分求解
//!
//! 好氧层深度依赖需氧速率，需氧速率又依赖好氧层深度：
//! 对残差 f(d) = 生成(d) − d 做括号二分解开这一环。残差
//! 对 d 连续，正常参数下在 [lo, hi] 内必有变号。

use serde::Serialize;
use wq_foundation::tolerance::{DEMAND_EPS, DEMAND_MAX_ITER};

use crate::error::SedimentError;

/// 单节点需求求解结果
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DemandOutcome {
    /// 是否在容差内收敛
    pub converged: bool,
    /// 实际迭代次数
    pub iterations: usize,
    /// 求得的需氧速率 [g O₂/m²/d]
    pub demand: f64,
}

/// 在 [lo, hi] 上二分求 residual(d) = 0 的根
///
/// `residual` 单调性不做假设，只要求端点变号。超出
/// [`DEMAND_MAX_ITER`] 次仍未达 [`DEMAND_EPS`] 时返回
/// [`SedimentError::NonConvergence`]，端点同号返回
/// [`SedimentError::BracketFailure`]。
pub fn solve_demand<F>(lo: f64, hi: f64, residual: F) -> Result<DemandOutcome, SedimentError>
where
    F: Fn(f64) -> f64,
{
    let f_lo = residual(lo);
    if f_lo.abs() < DEMAND_EPS {
        return Ok(DemandOutcome {
            converged: true,
            iterations: 0,
            demand: lo,
        });
    }
    let f_hi = residual(hi);
    if f_hi.abs() < DEMAND_EPS {
        return Ok(DemandOutcome {
            converged: true,
            iterations: 0,
            demand: hi,
        });
    }
    if f_lo.signum() == f_hi.signum() {
        return Err(SedimentError::BracketFailure { lo, hi });
    }

    let (mut a, mut b) = (lo, hi);
    let mut f_a = f_lo;
    let mut mid = 0.5 * (a + b);
    let mut f_mid = residual(mid);
    for iter in 1..=DEMAND_MAX_ITER {
        log::trace!("需求二分 第 {} 次: d = {:.6e}, 残差 = {:.6e}", iter, mid, f_mid);
        if f_mid.abs() < DEMAND_EPS {
            return Ok(DemandOutcome {
                converged: true,
                iterations: iter,
                demand: mid,
            });
        }
        if f_a.signum() == f_mid.signum() {
            a = mid;
            f_a = f_mid;
        } else {
            b = mid;
        }
        mid = 0.5 * (a + b);
        f_mid = residual(mid);
    }

    Err(SedimentError::NonConvergence {
        iterations: DEMAND_MAX_ITER,
        residual: f_mid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_root() {
        // f(d) = 3 - d，根在 3
        let outcome = solve_demand(0.0, 10.0, |d| 3.0 - d).unwrap();
        assert!(outcome.converged);
        assert!((outcome.demand - 3.0).abs() < 1e-3);
        assert!(outcome.iterations <= DEMAND_MAX_ITER);
    }

    #[test]
    fn test_root_at_endpoint() {
        let outcome = solve_demand(0.0, 10.0, |d| d).unwrap();
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.demand, 0.0);
    }

    #[test]
    fn test_bracket_failure() {
        let err = solve_demand(1.0, 10.0, |d| d + 1.0).unwrap_err();
        match err {
            SedimentError::BracketFailure { lo, hi } => {
                assert_eq!(lo, 1.0);
                assert_eq!(hi, 10.0);
            }
            other => panic!("期望括号失败，得到 {:?}", other),
        }
    }

    #[test]
    fn test_nonlinear_converges() {
        // f(d) = 5·exp(-d) - d，根约在 1.327
        let outcome = solve_demand(0.0, 100.0, |d| 5.0 * (-d).exp() - d).unwrap();
        assert!(outcome.converged);
        assert!((5.0 * (-outcome.demand).exp() - outcome.demand).abs() < DEMAND_EPS);
    }
}
