// crates/wq_physics/src/engine/forcing.rs

//! 单步外部驱动
//!
//! 水动力与气象驱动由外部模型提供，本核心只消费：层平均水平
//! 流速、步内水深变化、温度距平与悬浮固体浓度。

use wq_foundation::WqResult;

use crate::fields::Field;

/// 一个时间步的外部驱动场
pub struct Forcing {
    /// 东向流速 [m/s]，节点 × 层
    pub u: Field,
    /// 北向流速 [m/s]，节点 × 层
    pub v: Field,
    /// 步内水深变化 [m]，节点 × 1
    pub dzdt: Field,
    /// 相对 20 °C 的温度距平 [°C]，节点 × 层
    pub anomaly: Field,
    /// 悬浮固体浓度 [mg/L]，节点 × 层
    pub solids: Field,
}

impl Forcing {
    /// 静水驱动：全场为零
    pub fn quiescent(n_nodes: usize, n_layers: usize) -> Self {
        Self {
            u: Field::new("u", n_nodes, n_layers),
            v: Field::new("v", n_nodes, n_layers),
            dzdt: Field::new("dzdt", n_nodes, 1),
            anomaly: Field::new("anomaly", n_nodes, n_layers),
            solids: Field::new("solids", n_nodes, n_layers),
        }
    }

    /// 校验各场形状与网格/分层一致
    pub fn validate(&self, n_nodes: usize, n_layers: usize) -> WqResult<()> {
        self.u.check_shape(n_nodes, n_layers)?;
        self.v.check_shape(n_nodes, n_layers)?;
        self.dzdt.check_shape(n_nodes, 1)?;
        self.anomaly.check_shape(n_nodes, n_layers)?;
        self.solids.check_shape(n_nodes, n_layers)?;
        Ok(())
    }
}
