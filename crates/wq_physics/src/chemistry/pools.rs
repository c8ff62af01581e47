// crates/wq_physics/src/chemistry/pools.rs

//! 池命名代数与四账本簿记
//!
//! 每个池名由可组合标签经 `"_"` 连接生成：
//! `refractory|labile` × `particulate|dissolved` × `excreted|recycled`。
//! 反应器绝不手写键名，统一经 [`organic_pools`] / [`byproduct_pools`]
//! 生成器取键，避免反应器间键不一致。
//!
//! [`ChemistryPools`] 对每个池持有四个平行 `Field`：
//!
//! - `value`: 上一步浓度（本步所有速率律的读取源）
//! - `delta`: 本步累积的差分增量
//! - `mass`: 输运搬运的净质量 [g]
//! - `added`: 外部注入（沉积通量、强迫）
//!
//! 提交后 `value_new = value_old + delta`，且质量计
//! `Σ delta·vol == Σ added·vol − Σ exported`（负值钳制按策略
//! 显式丢弃质量时除外）。缺失的池键是编程错误，按致命 panic
//! 处理，不走错误通道。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wq_foundation::tolerance::AREA_EPS;
use wq_foundation::{KahanSum, WqError, WqResult};
use wq_mesh::{Layers, Topology};

use crate::fields::Field;

// ============================================================
// 命名代数
// ============================================================

/// 反应性标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reactivity {
    /// 易分解
    Labile,
    /// 难分解
    Refractory,
}

impl Reactivity {
    /// 全部取值
    pub const ALL: [Self; 2] = [Self::Labile, Self::Refractory];

    /// 键名片段
    pub fn tag(self) -> &'static str {
        match self {
            Self::Labile => "labile",
            Self::Refractory => "refractory",
        }
    }
}

/// 相态标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// 颗粒态
    Particulate,
    /// 溶解态
    Dissolved,
}

impl Phase {
    /// 全部取值
    pub const ALL: [Self; 2] = [Self::Particulate, Self::Dissolved];

    /// 键名片段
    pub fn tag(self) -> &'static str {
        match self {
            Self::Particulate => "particulate",
            Self::Dissolved => "dissolved",
        }
    }
}

/// 来源标签（生物排泄 / 再循环）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// 排泄
    Excreted,
    /// 再循环
    Recycled,
}

impl Origin {
    /// 全部取值
    pub const ALL: [Self; 2] = [Self::Excreted, Self::Recycled];

    /// 键名片段
    pub fn tag(self) -> &'static str {
        match self {
            Self::Excreted => "excreted",
            Self::Recycled => "recycled",
        }
    }
}

/// 经校验的池键
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoolId(String);

impl PoolId {
    /// 有机池键：`<reactivity>_<phase>_<element>`
    pub fn organic(reactivity: Reactivity, phase: Phase, element: &str) -> Self {
        Self(format!("{}_{}_{}", reactivity.tag(), phase.tag(), element))
    }

    /// 副产物池键：`<origin>_dissolved_<element>`
    pub fn byproduct(origin: Origin, element: &str) -> Self {
        Self(format!(
            "{}_{}_{}",
            origin.tag(),
            Phase::Dissolved.tag(),
            element
        ))
    }

    /// 无机池键（铵、硝酸盐、磷酸盐等单名池）
    pub fn inorganic(name: &str) -> Self {
        Self(name.to_string())
    }

    /// 键名
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 无机池的标准键
///
/// 跨反应器引用的键集中在此拼写，与标签生成器同理：
/// 反应器不手写字符串。
impl PoolId {
    /// 溶解氧
    pub fn oxygen() -> Self {
        Self::inorganic("oxygen")
    }

    /// 化学需氧量当量池
    pub fn oxygen_demand() -> Self {
        Self::inorganic("oxygen_demand")
    }

    /// 无机碳（氧化终点）
    pub fn inorganic_carbon() -> Self {
        Self::inorganic("inorganic_carbon")
    }

    /// 铵
    pub fn ammonium() -> Self {
        Self::inorganic("ammonium")
    }

    /// 硝酸盐
    pub fn nitrate() -> Self {
        Self::inorganic("nitrate")
    }

    /// 磷酸盐（溶解态）
    pub fn phosphate() -> Self {
        Self::inorganic("phosphate")
    }

    /// 吸附态磷酸盐
    pub fn sorbed_phosphate() -> Self {
        Self::inorganic("sorbed_phosphate")
    }

    /// 生物硅（颗粒态）
    pub fn biogenic_silica() -> Self {
        Self::inorganic("biogenic_silica")
    }

    /// 溶解硅
    pub fn dissolved_silica() -> Self {
        Self::inorganic("dissolved_silica")
    }

    /// 吸附态硅
    pub fn sorbed_silica() -> Self {
        Self::inorganic("sorbed_silica")
    }

    /// 硫化氢（以硫计）
    pub fn hydrogen_sulfide() -> Self {
        Self::inorganic("hydrogen_sulfide")
    }

    /// 硫酸盐（以硫计）
    pub fn sulfate() -> Self {
        Self::inorganic("sulfate")
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 元素的有机池全集：反应性 × 相态 的叉积
pub fn organic_pools(element: &str) -> Vec<PoolId> {
    let mut keys = Vec::with_capacity(4);
    for reactivity in Reactivity::ALL {
        for phase in Phase::ALL {
            keys.push(PoolId::organic(reactivity, phase, element));
        }
    }
    keys
}

/// 元素的副产物溶解池：排泄 / 再循环
pub fn byproduct_pools(element: &str) -> Vec<PoolId> {
    Origin::ALL
        .iter()
        .map(|&o| PoolId::byproduct(o, element))
        .collect()
}

// ============================================================
// 提交策略与审计
// ============================================================

/// 负浓度处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativePolicy {
    /// 钳到零，丢弃的质量记入审计
    Discard,
    /// 保留负值（守恒优先）
    Keep,
}

/// 单个池的提交账目（质量计，浓度×层体积）
#[derive(Debug, Clone, Serialize)]
pub struct PoolLedger {
    /// 池键
    pub pool: String,
    /// 本步增量质量总和
    pub delta_total: f64,
    /// 外部注入质量总和
    pub added_total: f64,
    /// 导出质量总和（沉降出底层、单侧移除）
    pub exported_total: f64,
    /// 负值钳制数量
    pub clamped: usize,
    /// 钳制丢弃的质量
    pub discarded_mass: f64,
}

/// 一次提交的全池审计
#[derive(Debug, Clone, Serialize)]
pub struct PoolAudit {
    /// 逐池账目
    pub entries: Vec<PoolLedger>,
}

impl PoolAudit {
    /// 按池名查账
    pub fn entry(&self, pool: &str) -> Option<&PoolLedger> {
        self.entries.iter().find(|e| e.pool == pool)
    }

    /// 全池负值钳制总数
    pub fn total_clamped(&self) -> usize {
        self.entries.iter().map(|e| e.clamped).sum()
    }
}

// ============================================================
// 四账本
// ============================================================

/// 多池四账本簿记
///
/// 键集在构造时固定并校验唯一性，之后不增不减；形状取自共享的
/// 拓扑与分层，永不调整。
pub struct ChemistryPools {
    topology: Arc<Topology>,
    layers: Arc<Layers>,
    index: HashMap<PoolId, usize>,
    keys: Vec<PoolId>,
    value: Vec<Field>,
    delta: Vec<Field>,
    mass: Vec<Field>,
    added: Vec<Field>,
    exported: Vec<KahanSum>,
}

impl ChemistryPools {
    /// 以固定键集创建账本
    ///
    /// # 错误
    /// 键重复时返回 `WqError::InvalidInput`。
    pub fn new(topology: Arc<Topology>, layers: Arc<Layers>, keys: &[PoolId]) -> WqResult<Self> {
        let n = topology.n_nodes();
        let nl = layers.n_layers();

        let mut index = HashMap::with_capacity(keys.len());
        for (i, key) in keys.iter().enumerate() {
            if index.insert(key.clone(), i).is_some() {
                return Err(WqError::invalid_input(format!("池键重复: {}", key)));
            }
        }

        let make = |suffix: &str| -> Vec<Field> {
            keys.iter()
                .map(|k| Field::new(format!("{}_{}", k, suffix), n, nl))
                .collect()
        };

        Ok(Self {
            value: make("value"),
            delta: make("delta"),
            mass: make("mass"),
            added: make("added"),
            exported: vec![KahanSum::new(); keys.len()],
            keys: keys.to_vec(),
            index,
            topology,
            layers,
        })
    }

    /// 键槽位。缺失键是编程错误，致命。
    fn slot(&self, key: &PoolId) -> usize {
        match self.index.get(key) {
            Some(&i) => i,
            None => panic!("池键不存在: {}", key),
        }
    }

    /// 是否含键
    pub fn contains(&self, key: &PoolId) -> bool {
        self.index.contains_key(key)
    }

    /// 键集（构造顺序）
    pub fn keys(&self) -> &[PoolId] {
        &self.keys
    }

    /// 池数量
    pub fn n_pools(&self) -> usize {
        self.keys.len()
    }

    /// 上一步浓度
    pub fn value(&self, key: &PoolId) -> &Field {
        &self.value[self.slot(key)]
    }

    /// 上一步浓度（可变，初始化/测试用）
    pub fn value_mut(&mut self, key: &PoolId) -> &mut Field {
        let i = self.slot(key);
        &mut self.value[i]
    }

    /// 本步增量
    pub fn delta(&self, key: &PoolId) -> &Field {
        &self.delta[self.slot(key)]
    }

    /// 输运质量账本（可变，输运算子写入）
    pub fn mass_mut(&mut self, key: &PoolId) -> &mut Field {
        let i = self.slot(key);
        &mut self.mass[i]
    }

    /// 外部注入账本
    pub fn added(&self, key: &PoolId) -> &Field {
        &self.added[self.slot(key)]
    }

    /// 节点某层的控制体积 [m³]
    #[inline]
    fn volume(&self, node: usize, layer: usize) -> f64 {
        let n = self.topology.node(node);
        (n.area * self.layers.layer_thickness(layer, n.depth)).max(AREA_EPS)
    }

    fn layer_range(&self, layer: Option<usize>) -> std::ops::Range<usize> {
        match layer {
            Some(k) => {
                debug_assert!(k < self.layers.n_layers());
                k..k + 1
            }
            None => 0..self.layers.n_layers(),
        }
    }

    /// 池间交换 / 单侧注入 / 单侧移除
    ///
    /// `amount * conversion.unwrap_or(1.0)` 从 `source` 的 delta 中扣除、
    /// 向 `sink` 的 delta 累加。只给一侧时建模外部注入（记入 `added`）
    /// 或移除（记入导出台账）；`layer` 限定单层，缺省作用于全部层。
    pub fn exchange(
        &mut self,
        amount: &Field,
        source: Option<&PoolId>,
        sink: Option<&PoolId>,
        layer: Option<usize>,
        conversion: Option<f64>,
    ) {
        debug_assert!(amount.n_nodes() == self.topology.n_nodes());
        debug_assert!(amount.n_layers() == self.layers.n_layers());
        let conv = conversion.unwrap_or(1.0);
        let range = self.layer_range(layer);
        let src = source.map(|k| self.slot(k));
        let dst = sink.map(|k| self.slot(k));

        for i in 0..self.topology.n_nodes() {
            for k in range.clone() {
                let a = amount.at(i, k) * conv;
                if a == 0.0 {
                    continue;
                }
                match (src, dst) {
                    (Some(s), Some(t)) => {
                        self.delta[s].add(i, k, -a);
                        self.delta[t].add(i, k, a);
                    }
                    (None, Some(t)) => {
                        self.delta[t].add(i, k, a);
                        self.added[t].add(i, k, a);
                    }
                    (Some(s), None) => {
                        let vol = self.volume(i, k);
                        self.delta[s].add(i, k, -a);
                        self.exported[s].add(a * vol);
                    }
                    (None, None) => {}
                }
            }
        }
    }

    /// 单向缩放注入：`sink.delta += amount * scale`，记入 `added`
    pub fn convert(&mut self, sink: &PoolId, amount: &Field, scale: f64, layer: Option<usize>) {
        let t = self.slot(sink);
        let range = self.layer_range(layer);
        for i in 0..self.topology.n_nodes() {
            for k in range.clone() {
                let a = amount.at(i, k) * scale;
                if a == 0.0 {
                    continue;
                }
                self.delta[t].add(i, k, a);
                self.added[t].add(i, k, a);
            }
        }
    }

    /// 沉降：质量向床面方向移动一层
    ///
    /// `velocity_dt` 为本步沉降距离 [m]。层间搬运按层厚加权折算
    /// 浓度；底层溢出作为逐节点质量 [g] 返回（水柱-沉积物耦合点）
    /// 并记入导出台账。`sinking(0.0, key)` 精确为空操作。
    pub fn sinking(&mut self, velocity_dt: f64, key: &PoolId) -> Vec<f64> {
        let p = self.slot(key);
        let n = self.topology.n_nodes();
        let nl = self.layers.n_layers();
        let mut export = vec![0.0; n];
        if velocity_dt == 0.0 {
            return export;
        }

        for i in 0..n {
            let node = self.topology.node(i);
            for k in 0..nl {
                let thick = self.layers.layer_thickness(k, node.depth).max(AREA_EPS);
                let moved = self.value[p].at(i, k) * (velocity_dt / thick).min(1.0);
                if moved == 0.0 {
                    continue;
                }
                self.delta[p].add(i, k, -moved);
                if k + 1 < nl {
                    let below = self.layers.layer_thickness(k + 1, node.depth).max(AREA_EPS);
                    self.delta[p].add(i, k + 1, moved * thick / below);
                } else {
                    let m = moved * thick * node.area;
                    export[i] = m;
                    self.exported[p].add(m);
                }
            }
        }
        export
    }

    /// 把输运质量账本折算为浓度增量并清零
    ///
    /// 输运算子向 `mass` 累加质量 [g]，此处按控制体积折入 `delta`。
    pub fn absorb_transport(&mut self) {
        let n = self.topology.n_nodes();
        let nl = self.layers.n_layers();
        for p in 0..self.keys.len() {
            for i in 0..n {
                for k in 0..nl {
                    let m = self.mass[p].at(i, k);
                    if m != 0.0 {
                        let vol = self.volume(i, k);
                        self.delta[p].add(i, k, m / vol);
                    }
                }
            }
            self.mass[p].fill(0.0);
        }
    }

    /// 提交：`value += delta`，清空账本，返回质量审计
    ///
    /// 一步只有提交后才算完成；下一步读到的 `value` 必然是
    /// 完整提交过的状态。
    pub fn commit(&mut self, negatives: NegativePolicy) -> PoolAudit {
        let n = self.topology.n_nodes();
        let nl = self.layers.n_layers();
        let mut entries = Vec::with_capacity(self.keys.len());

        for p in 0..self.keys.len() {
            let mut delta_total = KahanSum::new();
            let mut added_total = KahanSum::new();
            let mut discarded = KahanSum::new();
            let mut clamped = 0usize;

            for i in 0..n {
                for k in 0..nl {
                    let vol = self.volume(i, k);
                    delta_total.add(self.delta[p].at(i, k) * vol);
                    added_total.add(self.added[p].at(i, k) * vol);

                    let v = self.value[p].at(i, k) + self.delta[p].at(i, k);
                    if v < 0.0 && negatives == NegativePolicy::Discard {
                        discarded.add(-v * vol);
                        clamped += 1;
                        self.value[p].set(i, k, 0.0);
                    } else {
                        self.value[p].set(i, k, v);
                    }
                }
            }

            self.delta[p].fill(0.0);
            self.added[p].fill(0.0);
            entries.push(PoolLedger {
                pool: self.keys[p].to_string(),
                delta_total: delta_total.value(),
                added_total: added_total.value(),
                exported_total: self.exported[p].value(),
                clamped,
                discarded_mass: discarded.value(),
            });
            self.exported[p].reset();
        }
        PoolAudit { entries }
    }

    /// 全池浓度快照（持久化/可视化层消费）
    pub fn snapshot(&self) -> Vec<(PoolId, Field)> {
        self.keys
            .iter()
            .cloned()
            .zip(self.value.iter().cloned())
            .collect()
    }
}
