// crates/wq_mesh/src/topology.rs

//! 非结构三角网格拓扑
//!
//! 从原始顶点/三角形数组构建只读拓扑结构：
//! - 节点邻接（父单元、相邻节点）与控制面积
//! - 三角形面积与绕向校正
//! - 边（中点、长度、法向、所属单元）
//!
//! # 构建约定
//!
//! 1. 有向面积为负的三角形交换第二、三顶点后校正为正，
//!    原始绕向保留在 [`Winding`] 中供岸线裁剪判别孔洞；
//! 2. 内部边恰有两个所属单元，边界边恰有一个，多于两个即退化；
//! 3. 节点为固壁边界节点当且仅当 `邻居数 - 父单元数 == 1`
//!    （扇形不闭合），差值为其他即退化；
//! 4. `节点控制面积 = (1/3) * Σ 父单元面积`。

use std::collections::HashMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use wq_foundation::tolerance::AREA_EPS;

use crate::error::{MeshError, MeshResult};

/// 三角形原始绕向
///
/// 校正前的有向面积符号。闭合多边形裁剪时，顺时针（负面积）
/// 环路表示孔洞，此约定必须保持。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winding {
    /// 逆时针（正面积）
    Ccw,
    /// 顺时针（负面积，已校正）
    Cw,
}

/// 节点类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// 内部节点
    #[default]
    Interior,
    /// 固壁边界节点（由拓扑判定）
    Solid,
    /// 开边界节点（由外部强迫掩膜标记，不强制体积闭合）
    Open,
    /// 质量源节点（通量限制器模板中剔除）
    Source,
}

impl NodeKind {
    /// 是否为任意边界类节点
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !matches!(self, Self::Interior)
    }
}

/// 网格节点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// 平面坐标
    pub position: DVec2,
    /// 床面深度 [m]
    pub depth: f64,
    /// 节点类别
    pub kind: NodeKind,
    /// 父单元索引（包含此节点的三角形）
    pub parents: Vec<usize>,
    /// 相邻节点索引
    pub neighbors: Vec<usize>,
    /// 控制面积 [m²]
    pub area: f64,
}

/// 三角形单元
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// 顶点索引（校正后逆时针）
    pub nodes: [usize; 3],
    /// 面积 [m²]（恒为正）
    pub area: f64,
    /// 原始绕向
    pub winding: Winding,
    /// 形心
    pub center: DVec2,
    /// 共边相邻单元
    pub neighbors: Vec<usize>,
}

/// 网格边
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// 起止节点索引
    pub nodes: [usize; 2],
    /// 中点
    pub midpoint: DVec2,
    /// 边长 [m]
    pub length: f64,
    /// 单位法向（起点→终点方向右手侧）
    pub normal: DVec2,
    /// 所属单元（内部边 2 个，边界边 1 个）
    pub cells: Vec<usize>,
}

impl Edge {
    /// 是否为边界边
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.cells.len() == 1
    }
}

/// 非结构三角网格拓扑
///
/// 构造一次后只读；通过 `Arc` 在输运算子与反应器间共享。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    nodes: Vec<Node>,
    cells: Vec<Cell>,
    edges: Vec<Edge>,
}

impl Topology {
    /// 从原始数组构建拓扑
    ///
    /// # 参数
    /// - `vertices`: 节点平面坐标
    /// - `depths`: 节点床面深度，长度须与 `vertices` 一致
    /// - `triangles`: 顶点索引三元组
    ///
    /// # 错误
    /// 任一三角形校正后面积非正、边被多于两个单元共享、
    /// 或节点邻接扇形不完整时返回 [`MeshError::DegenerateMesh`]。
    pub fn build(
        vertices: &[DVec2],
        depths: &[f64],
        triangles: &[[usize; 3]],
    ) -> MeshResult<Self> {
        MeshError::check_size("depths", vertices.len(), depths.len())?;
        let n_nodes = vertices.len();

        for (i, tri) in triangles.iter().enumerate() {
            for &v in tri {
                if v >= n_nodes {
                    return Err(MeshError::degenerate(
                        "triangle_indices",
                        format!("单元 {} 引用不存在的节点 {}", i, v),
                    ));
                }
            }
        }

        // 面积与绕向校正
        let mut cells = Vec::with_capacity(triangles.len());
        for (i, tri) in triangles.iter().enumerate() {
            let (nodes, area, winding) = correct_winding(vertices, *tri);
            if area <= AREA_EPS {
                return Err(MeshError::degenerate(
                    "triangle_areas",
                    format!("单元 {} 校正后面积 {:.3e} 非正", i, area),
                ));
            }
            let center = (vertices[nodes[0]] + vertices[nodes[1]] + vertices[nodes[2]]) / 3.0;
            cells.push(Cell {
                nodes,
                area,
                winding,
                center,
                neighbors: Vec::new(),
            });
        }

        // 节点邻接：父单元与相邻节点
        let mut parents: Vec<Vec<usize>> = vec![Vec::new(); n_nodes];
        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n_nodes];
        for (ci, cell) in cells.iter().enumerate() {
            for k in 0..3 {
                let v = cell.nodes[k];
                parents[v].push(ci);
                for other in [cell.nodes[(k + 1) % 3], cell.nodes[(k + 2) % 3]] {
                    if !neighbors[v].contains(&other) {
                        neighbors[v].push(other);
                    }
                }
            }
        }

        // 边收集：按排序后的节点对去重，保留首次遇到的方向
        let mut edge_map: HashMap<(usize, usize), usize> = HashMap::new();
        let mut edges: Vec<Edge> = Vec::new();
        for (ci, cell) in cells.iter().enumerate() {
            for k in 0..3 {
                let a = cell.nodes[k];
                let b = cell.nodes[(k + 1) % 3];
                let key = (a.min(b), a.max(b));
                match edge_map.get(&key) {
                    Some(&ei) => {
                        edges[ei].cells.push(ci);
                        if edges[ei].cells.len() > 2 {
                            return Err(MeshError::degenerate(
                                "edge_owners",
                                format!("边 ({}, {}) 被多于两个单元共享", a, b),
                            ));
                        }
                    }
                    None => {
                        let pa = vertices[a];
                        let pb = vertices[b];
                        let d = pb - pa;
                        let length = d.length();
                        if length <= AREA_EPS {
                            return Err(MeshError::degenerate(
                                "edge_length",
                                format!("边 ({}, {}) 长度为零", a, b),
                            ));
                        }
                        edge_map.insert(key, edges.len());
                        edges.push(Edge {
                            nodes: [a, b],
                            midpoint: 0.5 * (pa + pb),
                            length,
                            normal: DVec2::new(d.y, -d.x) / length,
                            cells: vec![ci],
                        });
                    }
                }
            }
        }

        // 单元邻接：共享内部边的单元对
        for edge in &edges {
            if let [c0, c1] = edge.cells[..] {
                cells[c0].neighbors.push(c1);
                cells[c1].neighbors.push(c0);
            }
        }

        // 节点分类与控制面积
        let mut nodes = Vec::with_capacity(n_nodes);
        for i in 0..n_nodes {
            let np = parents[i].len();
            let nn = neighbors[i].len();
            let kind = match nn as isize - np as isize {
                0 => NodeKind::Interior,
                1 => NodeKind::Solid,
                d => {
                    return Err(MeshError::degenerate(
                        "node_fan",
                        format!("节点 {} 邻居-父单元差值 {} (期望 0 或 1)", i, d),
                    ));
                }
            };
            let area = parents[i].iter().map(|&c| cells[c].area).sum::<f64>() / 3.0;
            nodes.push(Node {
                position: vertices[i],
                depth: depths[i],
                kind,
                parents: std::mem::take(&mut parents[i]),
                neighbors: std::mem::take(&mut neighbors[i]),
                area,
            });
        }

        Ok(Self {
            nodes,
            cells,
            edges,
        })
    }

    /// 节点数量
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// 单元数量
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// 边数量
    #[inline]
    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    /// 节点切片
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// 单元切片
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// 边切片
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// 单个节点
    #[inline]
    pub fn node(&self, i: usize) -> &Node {
        &self.nodes[i]
    }

    /// 单个单元
    #[inline]
    pub fn cell(&self, i: usize) -> &Cell {
        &self.cells[i]
    }

    /// 单个边
    #[inline]
    pub fn edge(&self, i: usize) -> &Edge {
        &self.edges[i]
    }

    /// 标记开边界节点（来自外部强迫掩膜）
    ///
    /// 仅在构建后、共享前调用；开边界节点不强制体积闭合。
    pub fn mark_open(&mut self, node_ids: &[usize]) {
        for &i in node_ids {
            self.nodes[i].kind = NodeKind::Open;
        }
    }

    /// 标记质量源节点（通量限制器模板中剔除）
    pub fn mark_sources(&mut self, node_ids: &[usize]) {
        for &i in node_ids {
            self.nodes[i].kind = NodeKind::Source;
        }
    }
}

/// 绕向校正：负有向面积交换第二、三顶点
fn correct_winding(vertices: &[DVec2], tri: [usize; 3]) -> ([usize; 3], f64, Winding) {
    let signed = triangle_signed_area(
        vertices[tri[0]],
        vertices[tri[1]],
        vertices[tri[2]],
    );
    if signed < 0.0 {
        ([tri[0], tri[2], tri[1]], -signed, Winding::Cw)
    } else {
        (tri, signed, Winding::Ccw)
    }
}

/// 三角形有向面积（两边向量叉积的一半）
#[inline]
pub fn triangle_signed_area(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    0.5 * (b - a).perp_dot(c - a)
}

/// 剥离三角形数组的前导索引列
///
/// 外部网格源的单元行可能带有第 4 列前导编号，此处统一剥离。
pub fn strip_leading_index(rows: &[Vec<usize>]) -> MeshResult<Vec<[usize; 3]>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| match row.len() {
            3 => Ok([row[0], row[1], row[2]]),
            4 => Ok([row[1], row[2], row[3]]),
            n => Err(MeshError::degenerate(
                "triangle_rows",
                format!("单元行 {} 宽度 {} (期望 3 或 4)", i, n),
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 单三角形网格
    fn single_triangle() -> Topology {
        let vertices = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 1.0),
        ];
        let depths = vec![2.0; 3];
        Topology::build(&vertices, &depths, &[[0, 1, 2]]).unwrap()
    }

    /// 2x2 正方形剖分为 8 个三角形（含一个内部节点）
    fn fan_mesh() -> Topology {
        let vertices = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(1.0, 1.0), // 内部节点
            DVec2::new(2.0, 1.0),
            DVec2::new(0.0, 2.0),
            DVec2::new(1.0, 2.0),
            DVec2::new(2.0, 2.0),
        ];
        let depths = vec![5.0; 9];
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
        Topology::build(&vertices, &depths, &triangles).unwrap()
    }

    #[test]
    fn test_positive_area_after_correction() {
        // 顺时针输入应被校正
        let vertices = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 1.0),
        ];
        let topo = Topology::build(&vertices, &[1.0; 3], &[[0, 2, 1]]).unwrap();
        let cell = topo.cell(0);
        assert!(cell.area > 0.0);
        assert_eq!(cell.winding, Winding::Cw);
        assert!((cell.area - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_area_rejected() {
        // 三点共线
        let vertices = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(2.0, 0.0),
        ];
        let result = Topology::build(&vertices, &[1.0; 3], &[[0, 1, 2]]);
        assert!(matches!(result, Err(MeshError::DegenerateMesh { .. })));
    }

    #[test]
    fn test_edge_ownership() {
        let topo = fan_mesh();
        let mut interior = 0;
        let mut boundary = 0;
        for edge in topo.edges() {
            match edge.cells.len() {
                1 => boundary += 1,
                2 => interior += 1,
                n => panic!("边有 {} 个所属单元", n),
            }
        }
        // 8 个三角形共 16 条边：8 条边界边 + 8 条内部边
        assert_eq!(boundary, 8);
        assert_eq!(interior, 8);
    }

    #[test]
    fn test_triple_owned_edge_rejected() {
        // 三个三角形共享同一条边
        let vertices = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.5, 1.0),
            DVec2::new(0.5, -1.0),
            DVec2::new(1.5, 1.0),
        ];
        let result = Topology::build(
            &vertices,
            &[1.0; 5],
            &[[0, 1, 2], [0, 1, 3], [0, 1, 4]],
        );
        assert!(matches!(result, Err(MeshError::DegenerateMesh { .. })));
    }

    #[test]
    fn test_node_classification() {
        let topo = fan_mesh();
        // 节点 4 是唯一内部节点
        assert_eq!(topo.node(4).kind, NodeKind::Interior);
        for i in [0usize, 1, 2, 3, 5, 6, 7, 8] {
            assert_eq!(topo.node(i).kind, NodeKind::Solid, "节点 {}", i);
        }
    }

    #[test]
    fn test_node_control_area() {
        let topo = fan_mesh();
        for (i, node) in topo.nodes().iter().enumerate() {
            let expected: f64 = node
                .parents
                .iter()
                .map(|&c| topo.cell(c).area)
                .sum::<f64>()
                / 3.0;
            assert!(
                (node.area - expected).abs() < 1e-12,
                "节点 {} 控制面积不符",
                i
            );
        }
        // 所有控制面积之和等于总面积
        let total_node: f64 = topo.nodes().iter().map(|n| n.area).sum();
        let total_cell: f64 = topo.cells().iter().map(|c| c.area).sum();
        assert!((total_node - total_cell).abs() < 1e-12);
    }

    #[test]
    fn test_single_triangle_all_solid() {
        let topo = single_triangle();
        for node in topo.nodes() {
            assert_eq!(node.kind, NodeKind::Solid);
            assert!((node.area - 0.5 / 3.0).abs() < 1e-12);
        }
        assert_eq!(topo.n_edges(), 3);
    }

    #[test]
    fn test_strip_leading_index() {
        let rows = vec![vec![7usize, 0, 1, 2], vec![8, 1, 2, 3]];
        let tris = strip_leading_index(&rows).unwrap();
        assert_eq!(tris, vec![[0, 1, 2], [1, 2, 3]]);

        let plain = vec![vec![0usize, 1, 2]];
        assert_eq!(strip_leading_index(&plain).unwrap(), vec![[0, 1, 2]]);

        let bad = vec![vec![0usize, 1]];
        assert!(strip_leading_index(&bad).is_err());
    }

    #[test]
    fn test_mark_open() {
        let mut topo = single_triangle();
        topo.mark_open(&[1]);
        assert_eq!(topo.node(1).kind, NodeKind::Open);
        assert!(topo.node(1).kind.is_boundary());
    }
}
