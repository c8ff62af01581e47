// crates/wq_foundation/src/tolerance.rs

//! 数值容差常量
//!
//! 全项目共享的数值阈值集中在此，避免各求解器各自硬编码后漂移。

/// 非开边界节点底层垂向速度闭合阈值
pub const OMEGA_BOTTOM_EPS: f64 = 1e-8;

/// 速率分母钳制下限（避免除零，触发时记录警告）
pub const RATE_DENOM_EPS: f64 = 1e-10;

/// 沉积物需氧量求解收敛容差
pub const DEMAND_EPS: f64 = 5e-5;

/// 沉积物需氧量求解最大迭代次数
pub const DEMAND_MAX_ITER: usize = 50;

/// 退化三角形面积下限
pub const AREA_EPS: f64 = 1e-14;

/// 质量守恒审计相对误差阈值（回归测试用）
pub const MASS_AUDIT_EPS: f64 = 1e-12;
