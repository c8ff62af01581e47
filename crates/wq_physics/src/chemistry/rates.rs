// crates/wq_physics/src/chemistry/rates.rs

//! 共享速率律
//!
//! 所有反应器使用同一个温度修正形式，绝不逐反应器重写，
//! 以保证全系统温度敏感性一致。距平 `anomaly` 为温度减 20 °C。

use wq_foundation::tolerance::RATE_DENOM_EPS;

/// 温度修正速率 `kappa * coefficient * theta^anomaly`
///
/// `theta > 1` 时对距平单调递增，`theta < 1` 时单调递减。
#[inline]
pub fn rxn(kappa: f64, theta: f64, coefficient: f64, anomaly: f64) -> f64 {
    kappa * coefficient * theta.powf(anomaly)
}

/// Michaelis-Menten 限制因子 `value / (value + half_sat)`
///
/// 分母低于 [`RATE_DENOM_EPS`] 时钳制并记录警告，不中断时间步。
pub fn michaelis(value: f64, half_sat: f64) -> f64 {
    let v = value.max(0.0);
    let denom = v + half_sat;
    if denom < RATE_DENOM_EPS {
        log::warn!(
            "Michaelis-Menten 分母 {:.3e} 钳制到 {:.1e} (value={}, half_sat={})",
            denom,
            RATE_DENOM_EPS,
            value,
            half_sat
        );
        return v / RATE_DENOM_EPS;
    }
    v / denom
}

/// 抑制因子 `half_sat / (value + half_sat)`（氧抑制反硝化用）
#[inline]
pub fn inhibition(value: f64, half_sat: f64) -> f64 {
    1.0 - michaelis(value, half_sat)
}

/// 线性分配下的溶解态比例 `1 / (1 + kp * solids)`
#[inline]
pub fn dissolved_fraction(solids: f64, partition: f64) -> f64 {
    1.0 / (1.0 + (partition * solids).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_rxn_reference_temperature() {
        // 距平 0 时即基准速率
        assert!(approx_eq(rxn(0.1, 1.08, 5.0, 0.0), 0.5));
    }

    #[test]
    fn test_rxn_monotone_in_anomaly() {
        // theta > 1 递增
        let mut prev = rxn(0.1, 1.08, 1.0, -10.0);
        for i in -9..=10 {
            let r = rxn(0.1, 1.08, 1.0, i as f64);
            assert!(r > prev, "theta>1 时距平 {} 处不递增", i);
            prev = r;
        }
        // theta < 1 递减
        let mut prev = rxn(0.1, 0.95, 1.0, -10.0);
        for i in -9..=10 {
            let r = rxn(0.1, 0.95, 1.0, i as f64);
            assert!(r < prev, "theta<1 时距平 {} 处不递减", i);
            prev = r;
        }
    }

    #[test]
    fn test_michaelis_saturation() {
        assert!(approx_eq(michaelis(2.0, 2.0), 0.5));
        assert!(michaelis(100.0, 0.5) > 0.99);
        assert!(approx_eq(michaelis(0.0, 0.5), 0.0));
    }

    #[test]
    fn test_michaelis_clamped_denominator() {
        // 负浓度 + 零半饱和：分母钳制，不 panic、不返回 NaN
        let f = michaelis(-1.0, 0.0);
        assert!(f.is_finite());
        assert!(approx_eq(f, 0.0));
    }

    #[test]
    fn test_inhibition_complement() {
        let o2 = 3.0;
        let k = 0.1;
        assert!(approx_eq(michaelis(o2, k) + inhibition(o2, k), 1.0));
        // 无氧时完全不抑制
        assert!(approx_eq(inhibition(0.0, 0.1), 1.0));
    }

    #[test]
    fn test_dissolved_fraction() {
        assert!(approx_eq(dissolved_fraction(0.0, 1e-3), 1.0));
        assert!(approx_eq(dissolved_fraction(1000.0, 1e-3), 0.5));
        // 负固体浓度视为零
        assert!(approx_eq(dissolved_fraction(-5.0, 1e-3), 1.0));
    }
}
