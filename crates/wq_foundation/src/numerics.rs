// crates/wq_foundation/src/numerics.rs

//! Kahan 求和算法
//!
//! 使用补偿求和减少浮点累加误差。质量守恒审计依赖长序列累加，
//! 直接 `sum()` 的舍入误差会淹没 1e-12 量级的守恒残差。

/// Kahan 补偿求和器
///
/// # 示例
///
/// ```
/// use wq_foundation::KahanSum;
///
/// let mut acc = KahanSum::new();
/// for _ in 0..1000 {
///     acc.add(0.1);
/// }
/// assert!((acc.value() - 100.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct KahanSum {
    sum: f64,
    compensation: f64,
}

impl KahanSum {
    /// 创建新的求和器
    pub fn new() -> Self {
        Self {
            sum: 0.0,
            compensation: 0.0,
        }
    }

    /// 添加一个值
    #[inline]
    pub fn add(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    /// 获取当前求和值
    #[inline]
    pub fn value(&self) -> f64 {
        self.sum
    }

    /// 重置求和器
    #[inline]
    pub fn reset(&mut self) {
        self.sum = 0.0;
        self.compensation = 0.0;
    }

    /// 从迭代器求和
    pub fn sum_iter<I: IntoIterator<Item = f64>>(iter: I) -> f64 {
        let mut kahan = Self::new();
        for v in iter {
            kahan.add(v);
        }
        kahan.value()
    }
}
