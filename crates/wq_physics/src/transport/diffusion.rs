// crates/wq_physics/src/transport/diffusion.rs

//! 扩散算子
//!
//! 水平扩散（黏性项）用单元梯度：每个三角形按 P1 插值求浓度
//! 偏导并以单元面积校正，边上取共边单元梯度均值与法向点积，
//! 反对称施加到两节点。垂向扩散为标准二阶差分。

use glam::DVec2;
use wq_config::TransportConfig;
use wq_foundation::tolerance::AREA_EPS;
use wq_mesh::{Layers, Topology};

use crate::fields::Field;

/// 扩散算子
#[derive(Debug, Clone)]
pub struct Diffusion {
    config: TransportConfig,
}

impl Diffusion {
    /// 创建扩散算子
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// 垂向扩散
    ///
    /// 界面通量 `F = Kv * (c_下 - c_上) / dz_c`（正值向水面），
    /// 经界面反对称搬运质量。
    pub fn vertical(
        &self,
        topology: &Topology,
        layers: &Layers,
        value: &Field,
        mass: &mut Field,
        dt: f64,
    ) {
        let kv = self.config.vertical_diffusivity;
        if kv <= 0.0 {
            return;
        }
        let nl = layers.n_layers();
        for (i, node) in topology.nodes().iter().enumerate() {
            let depth = node.depth;
            for k in 1..nl {
                let dzc = (0.5 * (layers.dz(k - 1) + layers.dz(k)) * depth).max(AREA_EPS);
                let f = kv * (value.at(i, k) - value.at(i, k - 1)) / dzc;
                let m = f * node.area * dt;
                mass.add(i, k - 1, m);
                mass.add(i, k, -m);
            }
        }
    }

    /// 水平扩散（黏性项）
    ///
    /// 边法向通量 `F = -Kh * (∇c · n)`，梯度取共边单元的均值；
    /// 边界边只有一个所属单元，直接用其梯度。
    pub fn horizontal(
        &self,
        topology: &Topology,
        layers: &Layers,
        value: &Field,
        mass: &mut Field,
        dt: f64,
    ) {
        let kh = self.config.horizontal_diffusivity;
        if kh <= 0.0 {
            return;
        }
        let nl = layers.n_layers();
        for k in 0..nl {
            let grads = cell_gradients(topology, value, k);
            for edge in topology.edges() {
                let [a, b] = edge.nodes;
                let grad = edge
                    .cells
                    .iter()
                    .map(|&c| grads[c])
                    .fold(DVec2::ZERO, |acc, g| acc + g)
                    / edge.cells.len() as f64;
                let h = 0.5 * (topology.node(a).depth + topology.node(b).depth);
                let q = -kh * grad.dot(edge.normal) * edge.length * layers.dz(k) * h;
                let m = q * dt;
                mass.add(a, k, -m);
                mass.add(b, k, m);
            }
        }
    }
}

impl Default for Diffusion {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

/// 单层的逐单元浓度梯度（P1 插值，面积校正）
pub fn cell_gradients(topology: &Topology, value: &Field, layer: usize) -> Vec<DVec2> {
    topology
        .cells()
        .iter()
        .map(|cell| {
            let [i0, i1, i2] = cell.nodes;
            let p0 = topology.node(i0).position;
            let p1 = topology.node(i1).position;
            let p2 = topology.node(i2).position;
            let c0 = value.at(i0, layer);
            let c1 = value.at(i1, layer);
            let c2 = value.at(i2, layer);
            let inv2a = 1.0 / (2.0 * cell.area);
            DVec2::new(
                (c0 * (p1.y - p2.y) + c1 * (p2.y - p0.y) + c2 * (p0.y - p1.y)) * inv2a,
                (c0 * (p2.x - p1.x) + c1 * (p0.x - p2.x) + c2 * (p1.x - p0.x)) * inv2a,
            )
        })
        .collect()
}
