// crates/wq_physics/src/fields.rs

//! 节点×层标量场
//!
//! `Field` 是形状 `(n_nodes, n_layers)` 的命名数组，行优先存储。
//! 形状在构造时固定、永不调整；柱积分量用 `n_layers == 1` 表达。
//! API 边界上的形状不匹配返回 `WqError::SizeMismatch`，
//! 热循环内用 `debug_assert!`。

use serde::{Deserialize, Serialize};
use wq_foundation::{KahanSum, WqError, WqResult};

/// 节点×层标量场
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    name: String,
    n_nodes: usize,
    n_layers: usize,
    data: Vec<f64>,
}

impl Field {
    /// 创建零值场
    pub fn new(name: impl Into<String>, n_nodes: usize, n_layers: usize) -> Self {
        Self {
            name: name.into(),
            n_nodes,
            n_layers,
            data: vec![0.0; n_nodes * n_layers],
        }
    }

    /// 创建常值场
    pub fn filled(name: impl Into<String>, n_nodes: usize, n_layers: usize, value: f64) -> Self {
        Self {
            name: name.into(),
            n_nodes,
            n_layers,
            data: vec![value; n_nodes * n_layers],
        }
    }

    /// 场名称
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 节点数
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// 层数
    #[inline]
    pub fn n_layers(&self) -> usize {
        self.n_layers
    }

    #[inline]
    fn idx(&self, node: usize, layer: usize) -> usize {
        debug_assert!(node < self.n_nodes && layer < self.n_layers);
        node * self.n_layers + layer
    }

    /// 读取一个值
    #[inline]
    pub fn at(&self, node: usize, layer: usize) -> f64 {
        self.data[self.idx(node, layer)]
    }

    /// 写入一个值
    #[inline]
    pub fn set(&mut self, node: usize, layer: usize, value: f64) {
        let i = self.idx(node, layer);
        self.data[i] = value;
    }

    /// 累加一个值
    #[inline]
    pub fn add(&mut self, node: usize, layer: usize, value: f64) {
        let i = self.idx(node, layer);
        self.data[i] += value;
    }

    /// 全场填充
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// 单节点的整列
    #[inline]
    pub fn node_column(&self, node: usize) -> &[f64] {
        let start = node * self.n_layers;
        &self.data[start..start + self.n_layers]
    }

    /// 底层数据切片
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// 底层数据切片（可变）
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// 柱积分 Σ value·dz
    pub fn integrate_column(&self, node: usize, dz: &[f64]) -> f64 {
        debug_assert_eq!(dz.len(), self.n_layers);
        self.node_column(node)
            .iter()
            .zip(dz)
            .map(|(v, d)| v * d)
            .sum()
    }

    /// 全场 Kahan 补偿求和
    pub fn total(&self) -> f64 {
        KahanSum::sum_iter(self.data.iter().copied())
    }

    /// 将低于下界的值钳制到下界，返回钳制数量
    pub fn clamp_min(&mut self, min: f64) -> usize {
        let mut clamped = 0;
        for v in &mut self.data {
            if *v < min {
                *v = min;
                clamped += 1;
            }
        }
        clamped
    }

    /// 逐元素累加 `other * scale`
    pub fn scaled_add(&mut self, other: &Field, scale: f64) {
        debug_assert!(self.same_shape(other));
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += b * scale;
        }
    }

    /// 形状是否一致
    #[inline]
    pub fn same_shape(&self, other: &Field) -> bool {
        self.n_nodes == other.n_nodes && self.n_layers == other.n_layers
    }

    /// API 边界形状校验
    pub fn check_shape(&self, n_nodes: usize, n_layers: usize) -> WqResult<()> {
        WqError::check_size("field_nodes", n_nodes, self.n_nodes)?;
        WqError::check_size("field_layers", n_layers, self.n_layers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_shape_and_access() {
        let mut f = Field::new("salinity", 3, 2);
        assert_eq!(f.n_nodes(), 3);
        assert_eq!(f.n_layers(), 2);
        f.set(1, 1, 5.0);
        f.add(1, 1, 2.0);
        assert!(approx_eq(f.at(1, 1), 7.0));
        assert_eq!(f.node_column(1), &[0.0, 7.0]);
    }

    #[test]
    fn test_integrate_column() {
        let mut f = Field::new("oxygen", 1, 3);
        f.set(0, 0, 2.0);
        f.set(0, 1, 4.0);
        f.set(0, 2, 8.0);
        let dz = [0.25, 0.25, 0.5];
        // 2*0.25 + 4*0.25 + 8*0.5 = 5.5
        assert!(approx_eq(f.integrate_column(0, &dz), 5.5));
    }

    #[test]
    fn test_clamp_min() {
        let mut f = Field::filled("c", 2, 2, -1.0);
        f.set(0, 0, 3.0);
        let clamped = f.clamp_min(0.0);
        assert_eq!(clamped, 3);
        assert!(approx_eq(f.at(0, 0), 3.0));
        assert!(approx_eq(f.at(1, 1), 0.0));
    }

    #[test]
    fn test_total_kahan() {
        let f = Field::filled("c", 100, 10, 0.1);
        assert!(approx_eq(f.total(), 100.0));
    }

    #[test]
    fn test_check_shape() {
        let f = Field::new("c", 3, 2);
        assert!(f.check_shape(3, 2).is_ok());
        assert!(f.check_shape(4, 2).is_err());
        assert!(f.check_shape(3, 1).is_err());
    }
}
