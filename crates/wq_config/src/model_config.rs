// crates/wq_config/src/model_config.rs

//! ModelConfig - 模型配置（全 f64）
//!
//! 各反应器的速率常数表、输运参数与沉积物参数。
//! 所有速率常数的单位为 1/天，温度系数 theta 无量纲；
//! 反应器内部按 dt（秒）换算。
//! 缺失的键通过 `#[serde(default = ...)]` 回退到文档化默认值。

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 秒/天换算
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// 速率常数对 (基准速率, 温度系数)
///
/// 速率律统一为 `rate = kappa * theta^anomaly`，anomaly 为相对
/// 20 °C 的温度距平。
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateConstant {
    /// 20 °C 基准速率 [1/d]
    pub kappa: f64,
    /// 温度系数（无量纲，>1 随温度升高加快）
    pub theta: f64,
}

impl RateConstant {
    /// 构造速率常数对
    pub const fn new(kappa: f64, theta: f64) -> Self {
        Self { kappa, theta }
    }

    /// 温度无关的常数速率
    pub const fn constant(kappa: f64) -> Self {
        Self { kappa, theta: 1.0 }
    }

    fn validate(&self, key: &'static str) -> Result<(), ConfigError> {
        ConfigError::require_non_negative(key, self.kappa)?;
        if self.theta <= 0.0 {
            return Err(ConfigError::invalid(key, self.theta, "theta 必须为正"));
        }
        Ok(())
    }
}

// ============================================================
// 输运配置
// ============================================================

/// 输运参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// 水平扩散系数 [m²/s]
    #[serde(default = "default_horizontal_diffusivity")]
    pub horizontal_diffusivity: f64,

    /// 垂向扩散系数 [m²/s]
    #[serde(default = "default_vertical_diffusivity")]
    pub vertical_diffusivity: f64,

    /// 水平黏性项系数 [m²/s]
    #[serde(default = "default_viscosity")]
    pub viscosity: f64,

    /// 提交时是否丢弃负浓度（记入审计）
    #[serde(default = "default_true")]
    pub discard_negatives: bool,
}

fn default_horizontal_diffusivity() -> f64 {
    10.0 // 典型值 1-100 m²/s
}
fn default_vertical_diffusivity() -> f64 {
    1e-4
}
fn default_viscosity() -> f64 {
    1.0
}
fn default_true() -> bool {
    true
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            horizontal_diffusivity: default_horizontal_diffusivity(),
            vertical_diffusivity: default_vertical_diffusivity(),
            viscosity: default_viscosity(),
            discard_negatives: true,
        }
    }
}

// ============================================================
// 反应器速率表
// ============================================================

/// 碳反应器参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonConfig {
    /// 水解（颗粒态 → 溶解态）
    #[serde(default = "default_c_hydrolysis")]
    pub hydrolysis: RateConstant,
    /// 氧化（溶解态 → 无机）
    #[serde(default = "default_c_oxidation")]
    pub oxidation: RateConstant,
    /// 氧化的氧半饱和常数 [mg/L]
    #[serde(default = "default_c_half_sat")]
    pub oxygen_half_sat: f64,
    /// 颗粒态沉降速度 [m/d]
    #[serde(default = "default_c_settling")]
    pub settling_velocity: f64,
}

fn default_c_hydrolysis() -> RateConstant {
    RateConstant::new(0.05, 1.08)
}
fn default_c_oxidation() -> RateConstant {
    RateConstant::new(0.1, 1.045)
}
fn default_c_half_sat() -> f64 {
    0.5
}
fn default_c_settling() -> f64 {
    0.5
}

impl Default for CarbonConfig {
    fn default() -> Self {
        Self {
            hydrolysis: default_c_hydrolysis(),
            oxidation: default_c_oxidation(),
            oxygen_half_sat: default_c_half_sat(),
            settling_velocity: default_c_settling(),
        }
    }
}

/// 氧反应器参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OxygenConfig {
    /// 化学需氧量氧化
    #[serde(default = "default_o_cod_oxidation")]
    pub cod_oxidation: RateConstant,
    /// 化学需氧量氧化的氧半饱和常数 [mg/L]
    #[serde(default = "default_o_half_sat")]
    pub oxygen_half_sat: f64,
}

fn default_o_cod_oxidation() -> RateConstant {
    RateConstant::new(0.2, 1.08)
}
fn default_o_half_sat() -> f64 {
    0.5
}

impl Default for OxygenConfig {
    fn default() -> Self {
        Self {
            cod_oxidation: default_o_cod_oxidation(),
            oxygen_half_sat: default_o_half_sat(),
        }
    }
}

/// 氮反应器参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NitrogenConfig {
    /// 有机氮水解
    #[serde(default = "default_n_hydrolysis")]
    pub hydrolysis: RateConstant,
    /// 有机氮矿化（溶解有机氮 → 铵）
    #[serde(default = "default_n_mineralization")]
    pub mineralization: RateConstant,
    /// 矿化的氧半饱和常数 [mg/L]
    #[serde(default = "default_n_oxygen_half_sat")]
    pub oxygen_half_sat: f64,
    /// 硝化（铵 → 硝酸盐）
    #[serde(default = "default_n_nitrification")]
    pub nitrification: RateConstant,
    /// 硝化的氧半饱和常数 [mg/L]
    #[serde(default = "default_n_nitrif_half_sat")]
    pub nitrification_half_sat: f64,
    /// 反硝化（硝酸盐 → 气态）
    #[serde(default = "default_n_denitrification")]
    pub denitrification: RateConstant,
    /// 反硝化的氧抑制半饱和常数 [mg/L]
    #[serde(default = "default_n_denit_inhibition")]
    pub denitrification_inhibition: f64,
    /// 颗粒态沉降速度 [m/d]
    #[serde(default = "default_n_settling")]
    pub settling_velocity: f64,
}

fn default_n_hydrolysis() -> RateConstant {
    RateConstant::new(0.05, 1.08)
}
fn default_n_mineralization() -> RateConstant {
    RateConstant::new(0.02, 1.08)
}
fn default_n_oxygen_half_sat() -> f64 {
    0.5
}
fn default_n_nitrification() -> RateConstant {
    RateConstant::new(0.1, 1.08)
}
fn default_n_nitrif_half_sat() -> f64 {
    2.0
}
fn default_n_denitrification() -> RateConstant {
    RateConstant::new(0.05, 1.045)
}
fn default_n_denit_inhibition() -> f64 {
    0.1
}
fn default_n_settling() -> f64 {
    0.5
}

impl Default for NitrogenConfig {
    fn default() -> Self {
        Self {
            hydrolysis: default_n_hydrolysis(),
            mineralization: default_n_mineralization(),
            oxygen_half_sat: default_n_oxygen_half_sat(),
            nitrification: default_n_nitrification(),
            nitrification_half_sat: default_n_nitrif_half_sat(),
            denitrification: default_n_denitrification(),
            denitrification_inhibition: default_n_denit_inhibition(),
            settling_velocity: default_n_settling(),
        }
    }
}

/// 磷反应器参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhosphorusConfig {
    /// 有机磷水解
    #[serde(default = "default_p_hydrolysis")]
    pub hydrolysis: RateConstant,
    /// 有机磷矿化（→ 磷酸盐）
    #[serde(default = "default_p_mineralization")]
    pub mineralization: RateConstant,
    /// 矿化的氧半饱和常数 [mg/L]
    #[serde(default = "default_p_oxygen_half_sat")]
    pub oxygen_half_sat: f64,
    /// 对悬浮固体的线性分配系数 [L/mg]
    #[serde(default = "default_p_partition")]
    pub partition_coefficient: f64,
    /// 颗粒态沉降速度 [m/d]
    #[serde(default = "default_p_settling")]
    pub settling_velocity: f64,
}

fn default_p_hydrolysis() -> RateConstant {
    RateConstant::new(0.08, 1.08)
}
fn default_p_mineralization() -> RateConstant {
    RateConstant::new(0.22, 1.08)
}
fn default_p_oxygen_half_sat() -> f64 {
    0.5
}
fn default_p_partition() -> f64 {
    1e-3
}
fn default_p_settling() -> f64 {
    0.5
}

impl Default for PhosphorusConfig {
    fn default() -> Self {
        Self {
            hydrolysis: default_p_hydrolysis(),
            mineralization: default_p_mineralization(),
            oxygen_half_sat: default_p_oxygen_half_sat(),
            partition_coefficient: default_p_partition(),
            settling_velocity: default_p_settling(),
        }
    }
}

/// 硅反应器参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SilicaConfig {
    /// 生物硅溶解（颗粒态 → 溶解态）
    #[serde(default = "default_si_dissolution")]
    pub dissolution: RateConstant,
    /// 对悬浮固体的线性分配系数 [L/mg]
    #[serde(default = "default_si_partition")]
    pub partition_coefficient: f64,
    /// 颗粒态沉降速度 [m/d]
    #[serde(default = "default_si_settling")]
    pub settling_velocity: f64,
}

fn default_si_dissolution() -> RateConstant {
    RateConstant::new(0.02, 1.08)
}
fn default_si_partition() -> f64 {
    6e-3
}
fn default_si_settling() -> f64 {
    0.5
}

impl Default for SilicaConfig {
    fn default() -> Self {
        Self {
            dissolution: default_si_dissolution(),
            partition_coefficient: default_si_partition(),
            settling_velocity: default_si_settling(),
        }
    }
}

/// 硫反应器参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SulfurConfig {
    /// 硫化氢氧化
    #[serde(default = "default_s_oxidation")]
    pub oxidation: RateConstant,
    /// 氧化的氧半饱和常数 [mg/L]
    #[serde(default = "default_s_half_sat")]
    pub oxygen_half_sat: f64,
}

fn default_s_oxidation() -> RateConstant {
    RateConstant::new(0.2, 1.08)
}
fn default_s_half_sat() -> f64 {
    0.5
}

impl Default for SulfurConfig {
    fn default() -> Self {
        Self {
            oxidation: default_s_oxidation(),
            oxygen_half_sat: default_s_half_sat(),
        }
    }
}

// ============================================================
// 沉积物配置
// ============================================================

/// 沉积物成岩参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SedimentConfig {
    /// 活性层总厚度 [m]（好氧层 + 厌氧层）
    #[serde(default = "default_sed_depth")]
    pub total_depth: f64,

    /// 表面传质系数 [m/d]
    #[serde(default = "default_sed_transfer")]
    pub transfer_coefficient: f64,

    /// 沉积有机碳成岩衰解
    #[serde(default = "default_sed_diagenesis_carbon")]
    pub diagenesis_carbon: RateConstant,

    /// 沉积有机氮成岩衰解
    #[serde(default = "default_sed_diagenesis_nitrogen")]
    pub diagenesis_nitrogen: RateConstant,

    /// 好氧层分配系数（颗粒/溶解）
    #[serde(default = "default_sed_partition_aerobic")]
    pub partition_aerobic: f64,

    /// 厌氧层分配系数
    #[serde(default = "default_sed_partition_anaerobic")]
    pub partition_anaerobic: f64,

    /// 需氧量求解区间下界 [g O₂/m²/d]
    #[serde(default = "default_sed_bracket_lo")]
    pub demand_bracket_lo: f64,

    /// 需氧量求解区间上界 [g O₂/m²/d]
    #[serde(default = "default_sed_bracket_hi")]
    pub demand_bracket_hi: f64,
}

fn default_sed_depth() -> f64 {
    0.1
}
fn default_sed_transfer() -> f64 {
    0.01
}
fn default_sed_diagenesis_carbon() -> RateConstant {
    RateConstant::new(0.002, 1.1)
}
fn default_sed_diagenesis_nitrogen() -> RateConstant {
    RateConstant::new(0.003, 1.1)
}
fn default_sed_partition_aerobic() -> f64 {
    10.0
}
fn default_sed_partition_anaerobic() -> f64 {
    100.0
}
fn default_sed_bracket_lo() -> f64 {
    0.0
}
fn default_sed_bracket_hi() -> f64 {
    100.0
}

impl Default for SedimentConfig {
    fn default() -> Self {
        Self {
            total_depth: default_sed_depth(),
            transfer_coefficient: default_sed_transfer(),
            diagenesis_carbon: default_sed_diagenesis_carbon(),
            diagenesis_nitrogen: default_sed_diagenesis_nitrogen(),
            partition_aerobic: default_sed_partition_aerobic(),
            partition_anaerobic: default_sed_partition_anaerobic(),
            demand_bracket_lo: default_sed_bracket_lo(),
            demand_bracket_hi: default_sed_bracket_hi(),
        }
    }
}

// ============================================================
// 总配置
// ============================================================

/// 模型总配置
///
/// 构造一次、一次运行内只读，由调用方显式传入各构造函数。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    /// 输运参数
    #[serde(default)]
    pub transport: TransportConfig,
    /// 碳反应器
    #[serde(default)]
    pub carbon: CarbonConfig,
    /// 氧反应器
    #[serde(default)]
    pub oxygen: OxygenConfig,
    /// 氮反应器
    #[serde(default)]
    pub nitrogen: NitrogenConfig,
    /// 磷反应器
    #[serde(default)]
    pub phosphorus: PhosphorusConfig,
    /// 硅反应器
    #[serde(default)]
    pub silica: SilicaConfig,
    /// 硫反应器
    #[serde(default)]
    pub sulfur: SulfurConfig,
    /// 沉积物
    #[serde(default)]
    pub sediment: SedimentConfig,
}

impl ModelConfig {
    /// 从 JSON 字符串解析
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验参数范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::require_non_negative(
            "transport.horizontal_diffusivity",
            self.transport.horizontal_diffusivity,
        )?;
        ConfigError::require_non_negative(
            "transport.vertical_diffusivity",
            self.transport.vertical_diffusivity,
        )?;
        ConfigError::require_non_negative("transport.viscosity", self.transport.viscosity)?;

        self.carbon.hydrolysis.validate("carbon.hydrolysis")?;
        self.carbon.oxidation.validate("carbon.oxidation")?;
        ConfigError::require_positive("carbon.oxygen_half_sat", self.carbon.oxygen_half_sat)?;
        ConfigError::require_non_negative(
            "carbon.settling_velocity",
            self.carbon.settling_velocity,
        )?;

        self.oxygen.cod_oxidation.validate("oxygen.cod_oxidation")?;
        ConfigError::require_positive("oxygen.oxygen_half_sat", self.oxygen.oxygen_half_sat)?;

        self.nitrogen.hydrolysis.validate("nitrogen.hydrolysis")?;
        self.nitrogen
            .mineralization
            .validate("nitrogen.mineralization")?;
        self.nitrogen
            .nitrification
            .validate("nitrogen.nitrification")?;
        ConfigError::require_positive(
            "nitrogen.nitrification_half_sat",
            self.nitrogen.nitrification_half_sat,
        )?;
        self.nitrogen
            .denitrification
            .validate("nitrogen.denitrification")?;
        ConfigError::require_positive(
            "nitrogen.denitrification_inhibition",
            self.nitrogen.denitrification_inhibition,
        )?;

        self.phosphorus.hydrolysis.validate("phosphorus.hydrolysis")?;
        self.phosphorus
            .mineralization
            .validate("phosphorus.mineralization")?;
        ConfigError::require_non_negative(
            "phosphorus.partition_coefficient",
            self.phosphorus.partition_coefficient,
        )?;

        self.silica.dissolution.validate("silica.dissolution")?;
        ConfigError::require_non_negative(
            "silica.partition_coefficient",
            self.silica.partition_coefficient,
        )?;

        self.sulfur.oxidation.validate("sulfur.oxidation")?;
        ConfigError::require_positive("sulfur.oxygen_half_sat", self.sulfur.oxygen_half_sat)?;

        ConfigError::require_positive("sediment.total_depth", self.sediment.total_depth)?;
        self.sediment
            .diagenesis_carbon
            .validate("sediment.diagenesis_carbon")?;
        self.sediment
            .diagenesis_nitrogen
            .validate("sediment.diagenesis_nitrogen")?;
        ConfigError::require_non_negative(
            "sediment.partition_aerobic",
            self.sediment.partition_aerobic,
        )?;
        ConfigError::require_non_negative(
            "sediment.partition_anaerobic",
            self.sediment.partition_anaerobic,
        )?;
        if self.sediment.demand_bracket_hi <= self.sediment.demand_bracket_lo {
            return Err(ConfigError::invalid(
                "sediment.demand_bracket_hi",
                self.sediment.demand_bracket_hi,
                "区间上界须大于下界",
            ));
        }
        Ok(())
    }
}
