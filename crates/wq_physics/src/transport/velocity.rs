// crates/wq_physics/src/transport/velocity.rs

//! 垂向速度闭合与盐度通量限制
//!
//! σ 坐标连续方程的离散形式：水平净通量逐层积分给出界面垂向
//! 速度。界面索引约定：界面 `k` 位于层 `k-1`（上）与层 `k`（下）
//! 之间，`0` 为水面、`n_layers` 为床面；垂向速度取向水面为正。
//!
//! 盐度通量限制必须在 [`omega`] 之前执行：限制器读取的是闭合
//! 校正前的原始界面通量。

use wq_foundation::tolerance::AREA_EPS;
use wq_mesh::{Layers, NodeKind, Topology};

use crate::fields::Field;

/// 每条边的法向水通量，按层聚合到节点
///
/// 边上速度取两端点均值，法向体积通量
/// `q = (u·n) * length * dz * h` [m³/s] 从起点节点扣除、
/// 向终点节点累加。边界类节点的聚合结果置零。
pub fn influx(topology: &Topology, layers: &Layers, u: &Field, v: &Field) -> Field {
    let nl = layers.n_layers();
    let mut exchange = Field::new("exchange", topology.n_nodes(), nl);

    for edge in topology.edges() {
        let [a, b] = edge.nodes;
        let h = 0.5 * (topology.node(a).depth + topology.node(b).depth);
        for k in 0..nl {
            let un = 0.5 * (u.at(a, k) + u.at(b, k)) * edge.normal.x
                + 0.5 * (v.at(a, k) + v.at(b, k)) * edge.normal.y;
            let q = un * edge.length * layers.dz(k) * h;
            exchange.add(a, k, -q);
            exchange.add(b, k, q);
        }
    }

    // 边界类节点不参与体积闭合
    for (i, node) in topology.nodes().iter().enumerate() {
        if node.kind.is_boundary() {
            for k in 0..nl {
                exchange.set(i, k, 0.0);
            }
        }
    }
    exchange
}

/// 未校正的界面垂向速度 [m/s]
///
/// 自床面（通量 0）向上对每层净交换量积分。闭合校正在
/// [`omega`] 中施加，此处的原始剖面供盐度通量限制器使用。
pub fn interface_flux(topology: &Topology, layers: &Layers, exchange: &Field) -> Field {
    let nl = layers.n_layers();
    let mut w = Field::new("interface_flux", topology.n_nodes(), nl + 1);
    for (i, node) in topology.nodes().iter().enumerate() {
        let area = node.area.max(AREA_EPS);
        let mut acc = 0.0;
        for k in (0..nl).rev() {
            acc += exchange.at(i, k) / area;
            w.set(i, k, acc);
        }
    }
    w
}

/// 盐度垂向通量限制（单调性保护）
///
/// 对每个内部界面，以 `{k-1, k, k+1}` 三点垂向模板（顶/底层截断）
/// 求盐度局部包络，将带曲率项的界面重构值钳制在包络内，再乘
/// 原始界面速度得到限制后的盐度通量。质量源节点不参与限制，
/// 保留未钳制的重构值。顶、底界面不在模板内，通量为零。
///
/// 返回形状 `(n_nodes, n_layers + 1)` 的界面盐度通量 [psu·m/s]。
pub fn salinity_flux_control(
    topology: &Topology,
    layers: &Layers,
    salinity: &Field,
    raw_flux: &Field,
) -> Field {
    let nl = layers.n_layers();
    let mut limited = Field::new("salinity_flux", topology.n_nodes(), nl + 1);

    for (i, node) in topology.nodes().iter().enumerate() {
        for k in 1..nl {
            let s_up = salinity.at(i, k - 1);
            let s_dn = salinity.at(i, k);
            let d_up = layers.dz(k - 1);
            let d_dn = layers.dz(k);

            // dz 加权线性重构 + 曲率修正（底层截断为线性）
            let linear = (s_up * d_dn + s_dn * d_up) / (d_up + d_dn);
            let mut face = linear;
            let mut lo = s_up.min(s_dn);
            let mut hi = s_up.max(s_dn);
            if k + 1 < nl {
                let s_below = salinity.at(i, k + 1);
                face = linear + 0.125 * (s_up - 2.0 * s_dn + s_below);
                lo = lo.min(s_below);
                hi = hi.max(s_below);
            }

            let s_face = if node.kind == NodeKind::Source {
                face
            } else {
                face.clamp(lo, hi)
            };
            limited.set(i, k, raw_flux.at(i, k) * s_face);
        }
    }
    limited
}

/// 界面垂向通量的反对称施加
///
/// 界面 `k` 的向上通量从层 `k` 扣除、向层 `k-1` 累加，按层体积
/// 折算为浓度增量。每个界面的两侧增量之和为零。
pub fn apply_vertical_flux(
    topology: &Topology,
    layers: &Layers,
    flux: &Field,
    field: &mut Field,
    dt: f64,
) {
    let nl = layers.n_layers();
    for (i, node) in topology.nodes().iter().enumerate() {
        let depth = node.depth;
        for k in 1..nl {
            let mass = flux.at(i, k) * node.area * dt;
            if mass == 0.0 {
                continue;
            }
            let vol_up = (node.area * layers.layer_thickness(k - 1, depth)).max(AREA_EPS);
            let vol_dn = (node.area * layers.layer_thickness(k, depth)).max(AREA_EPS);
            field.add(i, k - 1, mass / vol_up);
            field.add(i, k, -mass / vol_dn);
        }
    }
}

/// 闭合校正后的界面垂向速度 [m/s]
///
/// 自床面向上积分每层净交换量与水面升降贡献；非开边界节点的
/// 水面残差沿 σ 线性重分配（自由表面校正），使水面与床面同时
/// 精确闭合，`|omega[床面]| < 1e-8` 恒成立。开边界节点保留未
/// 校正剖面：开边界不强制体积闭合。
///
/// `dzdt` 为本步水深变化 `(n_nodes, 1)` [m]，除以 `dt` 得升降率。
pub fn omega(
    topology: &Topology,
    layers: &Layers,
    dzdt: &Field,
    exchange: &Field,
    dt: f64,
) -> Field {
    let nl = layers.n_layers();
    let mut w = Field::new("omega", topology.n_nodes(), nl + 1);

    for (i, node) in topology.nodes().iter().enumerate() {
        let area = node.area.max(AREA_EPS);
        let rate = dzdt.at(i, 0) / dt;

        let mut acc = 0.0;
        for k in (0..nl).rev() {
            acc += exchange.at(i, k) / area + rate * layers.dz(k);
            w.set(i, k, acc);
        }

        if node.kind != NodeKind::Open {
            // 水面残差沿 σ 线性重分配：σ=0 全额扣除，σ=1 不动
            let residual = w.at(i, 0);
            if residual != 0.0 {
                for k in 0..=nl {
                    w.add(i, k, -residual * (1.0 - layers.sigma(k)));
                }
            }
        }
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use std::sync::Arc;
    use wq_foundation::tolerance::OMEGA_BOTTOM_EPS;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    /// 2x2 正方形剖分，节点 4 为唯一内部节点
    fn fan_mesh() -> Arc<Topology> {
        let vertices = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(2.0, 1.0),
            DVec2::new(0.0, 2.0),
            DVec2::new(1.0, 2.0),
            DVec2::new(2.0, 2.0),
        ];
        let triangles = [
            [0, 1, 4],
            [0, 4, 3],
            [1, 2, 5],
            [1, 5, 4],
            [3, 4, 7],
            [3, 7, 6],
            [4, 5, 8],
            [4, 8, 7],
        ];
        Arc::new(Topology::build(&vertices, &[5.0; 9], &triangles).unwrap())
    }

    #[test]
    fn test_influx_zero_velocity() {
        let topo = fan_mesh();
        let layers = Layers::uniform(3).unwrap();
        let u = Field::new("u", 9, 3);
        let v = Field::new("v", 9, 3);
        let ex = influx(&topo, &layers, &u, &v);
        assert!(approx_eq(ex.total(), 0.0));
    }

    #[test]
    fn test_influx_boundary_zeroed() {
        let topo = fan_mesh();
        let layers = Layers::uniform(2).unwrap();
        let u = Field::filled("u", 9, 2, 0.5);
        let v = Field::filled("v", 9, 2, -0.3);
        let ex = influx(&topo, &layers, &u, &v);
        for (i, node) in topo.nodes().iter().enumerate() {
            if node.kind.is_boundary() {
                for k in 0..2 {
                    assert!(approx_eq(ex.at(i, k), 0.0), "边界节点 {} 未置零", i);
                }
            }
        }
    }

    #[test]
    fn test_omega_bottom_closure() {
        let topo = fan_mesh();
        let layers = Layers::uniform(4).unwrap();
        let n = topo.n_nodes();

        // 非零交换量下，非开边界节点水面与床面均须闭合
        let mut exchange = Field::new("exchange", n, 4);
        for k in 0..4 {
            exchange.set(4, k, (k as f64 - 1.5) * 0.2);
        }
        let dzdt = Field::new("dzdt", n, 1);
        let w = omega(&topo, &layers, &dzdt, &exchange, 10.0);

        for (i, node) in topo.nodes().iter().enumerate() {
            if node.kind != NodeKind::Open {
                assert!(
                    w.at(i, 4).abs() < OMEGA_BOTTOM_EPS,
                    "节点 {} 床面未闭合: {:.3e}",
                    i,
                    w.at(i, 4)
                );
                assert!(
                    w.at(i, 0).abs() < OMEGA_BOTTOM_EPS,
                    "节点 {} 水面未闭合: {:.3e}",
                    i,
                    w.at(i, 0)
                );
            }
        }
    }

    #[test]
    fn test_omega_open_boundary_uncorrected() {
        let mut topo = Topology::build(
            &[
                DVec2::new(0.0, 0.0),
                DVec2::new(1.0, 0.0),
                DVec2::new(0.0, 1.0),
            ],
            &[2.0; 3],
            &[[0, 1, 2]],
        )
        .unwrap();
        topo.mark_open(&[0]);
        let layers = Layers::uniform(2).unwrap();

        let mut exchange = Field::new("exchange", 3, 2);
        exchange.set(0, 0, 0.4);
        exchange.set(0, 1, -0.1);
        let dzdt = Field::new("dzdt", 3, 1);
        let w = omega(&topo, &layers, &dzdt, &exchange, 1.0);

        // 开边界节点保留未校正剖面：水面残差即逐层积分值
        let area = topo.node(0).area;
        let expected_surface = (0.4 - 0.1) / area;
        assert!(approx_eq(w.at(0, 0), expected_surface));
    }

    #[test]
    fn test_flux_control_envelope() {
        let topo = fan_mesh();
        let layers = Layers::uniform(4).unwrap();
        let n = topo.n_nodes();

        // 中部尖峰：限制后的界面盐度必须落在模板包络内
        let mut salinity = Field::new("salinity", n, 4);
        for i in 0..n {
            salinity.set(i, 0, 10.0);
            salinity.set(i, 1, 30.0);
            salinity.set(i, 2, 10.0);
            salinity.set(i, 3, 10.0);
        }
        let raw = Field::filled("raw", n, 5, 1.0);
        let limited = salinity_flux_control(&topo, &layers, &salinity, &raw);

        for i in 0..n {
            for k in 1..4 {
                let mut lo = salinity.at(i, k - 1).min(salinity.at(i, k));
                let mut hi = salinity.at(i, k - 1).max(salinity.at(i, k));
                if k + 1 < 4 {
                    lo = lo.min(salinity.at(i, k + 1));
                    hi = hi.max(salinity.at(i, k + 1));
                }
                // 速度为 1，限制后的通量即界面盐度
                let s = limited.at(i, k);
                assert!(
                    s >= lo - 1e-12 && s <= hi + 1e-12,
                    "节点 {} 界面 {} 超出包络: {}",
                    i,
                    k,
                    s
                );
            }
            // 顶/底界面不在模板内
            assert!(approx_eq(limited.at(i, 0), 0.0));
            assert!(approx_eq(limited.at(i, 4), 0.0));
        }
    }

    #[test]
    fn test_flux_control_source_node_skipped() {
        let vertices = [
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 1.0),
        ];
        let mut topo = Topology::build(&vertices, &[2.0; 3], &[[0, 1, 2]]).unwrap();
        topo.mark_sources(&[1]);
        // 非均匀层厚：上薄下厚时重构权重可越出包络
        let layers = Layers::new(vec![0.0, 0.1, 0.7, 1.0]).unwrap();

        let mut salinity = Field::new("salinity", 3, 3);
        for i in 0..3 {
            salinity.set(i, 0, 30.0);
            salinity.set(i, 1, 0.0);
            salinity.set(i, 2, 30.0);
        }
        let raw = Field::filled("raw", 3, 4, 1.0);
        let limited = salinity_flux_control(&topo, &layers, &salinity, &raw);

        // 界面 1: linear = (30*0.6 + 0*0.1)/0.7, 曲率项 +7.5, face > 30
        let face = (30.0 * 0.6) / 0.7 + 0.125 * (30.0 - 0.0 + 30.0);
        assert!(face > 30.0);
        // 源节点保留未钳制值，普通节点钳到包络上界 30
        assert!(approx_eq(limited.at(1, 1), face));
        assert!(approx_eq(limited.at(0, 1), 30.0));
    }

    #[test]
    fn test_apply_vertical_flux_column_conservation() {
        let topo = fan_mesh();
        let layers = Layers::uniform(3).unwrap();
        let n = topo.n_nodes();

        let mut flux = Field::new("flux", n, 4);
        flux.set(4, 1, 2.0);
        flux.set(4, 2, -1.5);
        let mut field = Field::filled("c", n, 3, 1.0);
        apply_vertical_flux(&topo, &layers, &flux, &mut field, 0.5);

        // 柱内质量（浓度×层体积）守恒
        let node = topo.node(4);
        let before = 3.0 * node.area * node.depth / 3.0;
        let after: f64 = (0..3)
            .map(|k| field.at(4, k) * node.area * layers.layer_thickness(k, node.depth))
            .sum();
        assert!((after - before).abs() < 1e-10);
    }
}
