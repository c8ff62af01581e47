// crates/wq_physics/src/transport/advection.rs

//! 迎风平流（邻域包络限制）
//!
//! 水平与垂向平流将质量在节点/层控制体之间搬运，写入池的
//! `mass` 账本（单位 [g]）。界面值取迎风侧浓度经线性加权重构，
//! 再钳制到相邻控制体浓度的局部 min/max 内（TVD 式限制），
//! 防止非物理振荡。
//!
//! 守恒不变量：单条边（或单个垂向界面）对两侧控制体的质量增量
//! 之和恒为零，逐边成立而非仅全局成立。

use wq_config::TransportConfig;
use wq_mesh::{Edge, Layers, Topology};

use crate::fields::Field;

/// 平流算子
///
/// 无内部状态，配置之外不持有网格；可在一次运行内复用。
#[derive(Debug, Clone)]
pub struct Advection {
    config: TransportConfig,
}

impl Advection {
    /// 创建平流算子
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// 配置引用
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// 垂向平流
    ///
    /// 对每个内部界面以 omega 符号迎风取值，界面浓度经 dz 加权
    /// 重构并钳到相邻两层包络内；质量经界面反对称搬运。
    pub fn vertical(
        &self,
        topology: &Topology,
        layers: &Layers,
        value: &Field,
        omega: &Field,
        mass: &mut Field,
        dt: f64,
    ) {
        let nl = layers.n_layers();
        debug_assert_eq!(omega.n_layers(), nl + 1);

        for (i, node) in topology.nodes().iter().enumerate() {
            for k in 1..nl {
                let w = omega.at(i, k);
                if w == 0.0 {
                    continue;
                }
                let c_up = value.at(i, k - 1);
                let c_dn = value.at(i, k);
                let d_up = layers.dz(k - 1);
                let d_dn = layers.dz(k);

                // 线性加权界面值，钳到邻层包络
                let linear = (c_up * d_dn + c_dn * d_up) / (d_up + d_dn);
                let donor = if w > 0.0 { c_dn } else { c_up };
                let face = (0.5 * (linear + donor)).clamp(c_up.min(c_dn), c_up.max(c_dn));

                // w > 0 向水面：层 k 失去，层 k-1 获得
                let m = w * node.area * face * dt;
                mass.add(i, k - 1, m);
                mass.add(i, k, -m);
            }
        }
    }

    /// 水平平流
    ///
    /// 逐边组装法向通量，按迎风符号取浓度，反对称施加到共边
    /// 两节点。
    pub fn horizontal(
        &self,
        topology: &Topology,
        layers: &Layers,
        value: &Field,
        u: &Field,
        v: &Field,
        mass: &mut Field,
        dt: f64,
    ) {
        let nl = layers.n_layers();
        for edge in topology.edges() {
            let [a, b] = edge.nodes;
            let h = 0.5 * (topology.node(a).depth + topology.node(b).depth);
            for k in 0..nl {
                let m = edge_advective_mass(
                    edge,
                    value,
                    u,
                    v,
                    layers.dz(k) * h,
                    k,
                    self.config.viscosity,
                    dt,
                );
                mass.add(a, k, -m);
                mass.add(b, k, m);
            }
        }
    }
}

/// 单条边、单层的平流质量 [g]，法向正向（起点 → 终点记号）
///
/// 迎风浓度钳制在两端点浓度包络内，叠加沿边的黏性平滑项
/// `viscosity·(c_a − c_b)`（端点间距与边长相消）。正值表示
/// 质量从起点节点流向终点节点。
pub fn edge_advective_mass(
    edge: &Edge,
    value: &Field,
    u: &Field,
    v: &Field,
    thickness: f64,
    layer: usize,
    viscosity: f64,
    dt: f64,
) -> f64 {
    let [a, b] = edge.nodes;
    let ca = value.at(a, layer);
    let cb = value.at(b, layer);
    let mut m = viscosity * (ca - cb) * thickness * dt;

    let un = 0.5 * (u.at(a, layer) + u.at(b, layer)) * edge.normal.x
        + 0.5 * (v.at(a, layer) + v.at(b, layer)) * edge.normal.y;
    if un != 0.0 {
        let c_up = if un >= 0.0 { ca } else { cb };
        let face = c_up.clamp(ca.min(cb), ca.max(cb));
        m += un * edge.length * thickness * face * dt;
    }
    m
}

impl Default for Advection {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}
