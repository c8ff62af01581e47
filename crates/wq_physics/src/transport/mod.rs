// crates/wq_physics/src/transport/mod.rs

//! 输运算子
//!
//! - [`velocity`]: 边法向通量聚合 (`influx`)、垂向速度闭合 (`omega`)、
//!   盐度通量限制 (`salinity_flux_control`)
//! - [`advection`]: 水平/垂向迎风平流（邻域包络限制）
//! - [`diffusion`]: 水平（单元梯度）/垂向扩散
//!
//! 算子不持有网格：`Topology`/`Layers` 由调用方持 `Arc` 只读共享，
//! 逐次作为引用传入。所有水平算子对共边两节点反对称施加通量，
//! "单条边贡献的节点质量增量之和为零"是本模块的守恒不变量。

pub mod advection;
pub mod diffusion;
pub mod velocity;

pub use advection::Advection;
pub use diffusion::{cell_gradients, Diffusion};
pub use velocity::{apply_vertical_flux, influx, interface_flux, omega, salinity_flux_control};
