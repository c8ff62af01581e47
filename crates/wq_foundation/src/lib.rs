// crates/wq_foundation/src/lib.rs

//! WaterQual Foundation Layer
//!
//! 零重依赖基础层，提供整个项目的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`numerics`]: Kahan 补偿求和（质量审计用）
//! - [`tolerance`]: 数值容差常量
//!
//! # 设计原则
//!
//! 1. **最小依赖**: 仅依赖 thiserror
//! 2. **构造期致命**: 构造期错误立即向上传播
//! 3. **步内局部**: 步内数值保护在本地处理，不打断时间步

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod numerics;
pub mod tolerance;

pub use error::{WqError, WqResult};
pub use numerics::KahanSum;

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{WqError, WqResult};
    pub use crate::numerics::KahanSum;
}
