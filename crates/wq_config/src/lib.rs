// crates/wq_config/src/lib.rs

//! WaterQual Config Layer
//!
//! 配置层，提供反应器速率常数表、输运参数与沉积物参数。
//! 本层完全无泛型，所有数值使用 f64，JSON 可序列化。
//!
//! # 模块概览
//!
//! - [`model_config`]: ModelConfig 模型总配置及各子表
//! - [`error`]: 配置错误类型
//!
//! # 设计原则
//!
//! 1. **无泛型**: 本层所有类型都不包含泛型参数
//! 2. **缺省回退**: 缺失的速率常数键回退到文档化默认值
//! 3. **构造期校验**: `validate()` 失败即致命，不进入时间步
//! 4. **作用域**: 配置生命周期限定在一次模拟运行内，由调用方
//!    显式传入构造函数，不使用全局可变单例

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod model_config;

pub use error::ConfigError;
pub use model_config::{
    CarbonConfig, ModelConfig, NitrogenConfig, OxygenConfig, PhosphorusConfig, RateConstant,
    SedimentConfig, SilicaConfig, SulfurConfig, TransportConfig, SECONDS_PER_DAY,
};
