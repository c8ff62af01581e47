// crates/wq_mesh/src/layers.rs

//! σ 坐标垂向分层
//!
//! σ 取值 [0, 1]，0 为水面、1 为床面，按局部水深成比例映射到
//! 物理深度。层界面序列严格递增，长度 = 层数 + 1。

use serde::{Deserialize, Serialize};

use crate::error::{MeshError, MeshResult};

/// σ 坐标垂向分层
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layers {
    /// 层界面 σ 值（长度 = n_layers + 1，严格递增，[0, 1]）
    sigma: Vec<f64>,
    /// 层厚 dz[k] = sigma[k+1] - sigma[k]
    dz: Vec<f64>,
}

impl Layers {
    /// 均匀分层
    pub fn uniform(n_layers: usize) -> MeshResult<Self> {
        if n_layers < 1 {
            return Err(MeshError::InvalidLayerCount { n: n_layers });
        }
        let sigma = (0..=n_layers)
            .map(|i| i as f64 / n_layers as f64)
            .collect();
        Self::new(sigma)
    }

    /// 从界面序列构建
    ///
    /// # 错误
    /// 序列长度不足 2、不严格递增、或未覆盖 [0, 1] 时返回
    /// [`MeshError::InvalidSigma`]。
    pub fn new(sigma: Vec<f64>) -> MeshResult<Self> {
        if sigma.len() < 2 {
            return Err(MeshError::InvalidLayerCount {
                n: sigma.len().saturating_sub(1),
            });
        }
        if (sigma[0]).abs() > 1e-12 || (sigma[sigma.len() - 1] - 1.0).abs() > 1e-12 {
            return Err(MeshError::invalid_sigma(format!(
                "界面须覆盖 [0, 1]，实际 [{}, {}]",
                sigma[0],
                sigma[sigma.len() - 1]
            )));
        }
        let mut dz = Vec::with_capacity(sigma.len() - 1);
        for k in 0..sigma.len() - 1 {
            let d = sigma[k + 1] - sigma[k];
            if d <= 0.0 {
                return Err(MeshError::invalid_sigma(format!(
                    "界面 {} 处非严格递增: dz={:.3e}",
                    k, d
                )));
            }
            dz.push(d);
        }
        Ok(Self { sigma, dz })
    }

    /// 层数
    #[inline]
    pub fn n_layers(&self) -> usize {
        self.dz.len()
    }

    /// 层界面 σ 值
    #[inline]
    pub fn sigma(&self, k: usize) -> f64 {
        self.sigma[k]
    }

    /// 界面序列切片
    #[inline]
    pub fn interfaces(&self) -> &[f64] {
        &self.sigma
    }

    /// 层厚（无量纲）
    #[inline]
    pub fn dz(&self, k: usize) -> f64 {
        self.dz[k]
    }

    /// 层厚切片
    #[inline]
    pub fn dz_slice(&self) -> &[f64] {
        &self.dz
    }

    /// 层中心 σ 值
    #[inline]
    pub fn center(&self, k: usize) -> f64 {
        0.5 * (self.sigma[k] + self.sigma[k + 1])
    }

    /// 每层 1/dz（扩散求解用）
    pub fn gradient(&self) -> Vec<f64> {
        self.dz.iter().map(|&d| 1.0 / d).collect()
    }

    /// 界面物理深度 [m]
    #[inline]
    pub fn interface_depth(&self, k: usize, water_depth: f64) -> f64 {
        self.sigma[k] * water_depth
    }

    /// 层厚（有量纲）[m]
    #[inline]
    pub fn layer_thickness(&self, k: usize, water_depth: f64) -> f64 {
        self.dz[k] * water_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layers() {
        let layers = Layers::uniform(5).unwrap();
        assert_eq!(layers.n_layers(), 5);
        assert!((layers.sigma(0)).abs() < 1e-12);
        assert!((layers.sigma(5) - 1.0).abs() < 1e-12);
        for k in 0..5 {
            assert!((layers.dz(k) - 0.2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_layers_rejected() {
        assert!(matches!(
            Layers::uniform(0),
            Err(MeshError::InvalidLayerCount { n: 0 })
        ));
    }

    #[test]
    fn test_non_monotone_rejected() {
        let result = Layers::new(vec![0.0, 0.6, 0.4, 1.0]);
        assert!(matches!(result, Err(MeshError::InvalidSigma { .. })));
    }

    #[test]
    fn test_span_rejected() {
        let result = Layers::new(vec![0.1, 0.5, 1.0]);
        assert!(matches!(result, Err(MeshError::InvalidSigma { .. })));
    }

    #[test]
    fn test_gradient() {
        let layers = Layers::new(vec![0.0, 0.25, 1.0]).unwrap();
        let g = layers.gradient();
        assert!((g[0] - 4.0).abs() < 1e-12);
        assert!((g[1] - 1.0 / 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_physical_depths() {
        let layers = Layers::uniform(4).unwrap();
        let h = 8.0;
        assert!((layers.interface_depth(2, h) - 4.0).abs() < 1e-12);
        assert!((layers.layer_thickness(0, h) - 2.0).abs() < 1e-12);
        assert!((layers.center(0) - 0.125).abs() < 1e-12);
    }
}
