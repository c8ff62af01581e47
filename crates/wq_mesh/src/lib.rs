// crates/wq_mesh/src/lib.rs

//! WaterQual 网格模块
//!
//! 提供水质核心所需的两种只读离散化结构：
//!
//! # 核心类型
//!
//! - [`Topology`]: 非结构三角网格拓扑（节点邻接、单元面积、边法向）
//! - [`Layers`]: σ 坐标垂向分层（分数深度、层厚梯度）
//!
//! 两者均为构造一次、运行期间不可变，可通过 `Arc` 在集合成员间
//! 只读共享。
//!
//! # 模块结构
//!
//! - [`topology`]: 拓扑构建与校验
//! - [`layers`]: 垂向分层
//! - [`shape`]: 多边形有向面积与孔洞判别（岸线裁剪用）

#![warn(clippy::all)]

pub mod error;
pub mod layers;
pub mod shape;
pub mod topology;

pub use error::{MeshError, MeshResult};
pub use layers::Layers;
pub use shape::{is_hole, signed_area};
pub use topology::{Cell, Edge, Node, NodeKind, Topology, Winding};
