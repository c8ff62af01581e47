// crates/wq_physics/src/sediment/bed.rs

//! 沉积床状态机
//!
//! 每个时间步经 [`SedimentBed::flux`] 走完
//! `Idle → Diagenesis → DemandSolve → FluxApply → Idle`：
//! 先按温度修正衰解沉积有机质，再对每个节点二分求解床面需氧
//! 速率（好氧层深度与需氧速率互相依赖），最后把收敛的通量经
//! 共享账本写回底层水体。求解失败记警告并沿用上一步的好氧层
//! 深度，绝不中断时间步。

use std::sync::Arc;

use serde::Serialize;
use wq_config::{SedimentConfig, SECONDS_PER_DAY};
use wq_mesh::{Layers, Topology};

use crate::chemistry::{self, ChemistryPools, PoolId};
use crate::fields::Field;
use crate::reactors::{OXYGEN_PER_CARBON, OXYGEN_PER_NITROGEN, OXYGEN_PER_SULFIDE};
use crate::sediment::demand::{solve_demand, DemandOutcome};

/// 每单位厌氧衰解碳生成硫化氢 [g S / g C]（氧当量守恒）
pub const SULFIDE_PER_CARBON: f64 = OXYGEN_PER_CARBON / OXYGEN_PER_SULFIDE;

/// 床面状态机相位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SedimentPhase {
    /// 待机，等待下一步
    Idle,
    /// 沉积有机质衰解
    Diagenesis,
    /// 需氧速率二分求解
    DemandSolve,
    /// 通量写回水柱
    FluxApply,
}

/// 一步床面通量的汇总报告
#[derive(Debug, Clone, Serialize)]
pub struct SedimentReport {
    /// 全域汇总结果：converged 为全部节点收敛，iterations 取
    /// 最大值，demand 取收敛节点均值
    pub outcome: DemandOutcome,
    /// 求解失败（沿用旧好氧层深度）的节点数
    pub failures: usize,
}

/// 沉积床：逐节点双层（好氧/厌氧）活性层
pub struct SedimentBed {
    config: SedimentConfig,
    topology: Arc<Topology>,
    layers: Arc<Layers>,
    phase: SedimentPhase,
    /// 好氧层深度 [m]，逐节点
    aerobic_depth: Vec<f64>,
    /// 沉积有机碳面密度 [g/m²]，逐节点
    deposited_carbon: Vec<f64>,
    /// 沉积有机氮面密度 [g/m²]，逐节点
    deposited_nitrogen: Vec<f64>,
    scratch: Field,
}

impl SedimentBed {
    /// 创建沉积床，初始全好氧、无沉积存量
    pub fn new(config: SedimentConfig, topology: Arc<Topology>, layers: Arc<Layers>) -> Self {
        let n = topology.n_nodes();
        let nl = layers.n_layers();
        Self {
            aerobic_depth: vec![config.total_depth; n],
            deposited_carbon: vec![0.0; n],
            deposited_nitrogen: vec![0.0; n],
            scratch: Field::new("sediment_scratch", n, nl),
            phase: SedimentPhase::Idle,
            config,
            topology,
            layers,
        }
    }

    /// 当前状态机相位
    pub fn phase(&self) -> SedimentPhase {
        self.phase
    }

    /// 节点好氧层深度 [m]
    pub fn aerobic_depth(&self, node: usize) -> f64 {
        self.aerobic_depth[node]
    }

    /// 节点厌氧层深度 [m]，与好氧层深度恒和为总厚度
    pub fn anaerobic_depth(&self, node: usize) -> f64 {
        self.config.total_depth - self.aerobic_depth[node]
    }

    /// 沉积有机碳面密度 [g/m²]
    pub fn deposited_carbon(&self) -> &[f64] {
        &self.deposited_carbon
    }

    /// 沉积有机氮面密度 [g/m²]
    pub fn deposited_nitrogen(&self) -> &[f64] {
        &self.deposited_nitrogen
    }

    /// 接收水柱沉降导出的质量 [g]，换算为面密度入库
    pub fn deposit(&mut self, carbon: &[f64], nitrogen: &[f64]) {
        for (i, node) in self.topology.nodes().iter().enumerate() {
            self.deposited_carbon[i] += carbon[i] / node.area;
            self.deposited_nitrogen[i] += nitrogen[i] / node.area;
        }
    }

    /// 推进一步：衰解 → 需求求解 → 通量写回
    pub fn flux(&mut self, pools: &mut ChemistryPools, anomaly: &Field, dt: f64) -> SedimentReport {
        let days = dt / SECONDS_PER_DAY;
        let n = self.topology.n_nodes();
        let bottom = self.layers.n_layers() - 1;
        let total = self.config.total_depth;
        let transfer = self.config.transfer_coefficient;

        // Diagenesis：逐节点温度修正衰解速率 [g/m²/d]，步内量不超存量
        self.phase = SedimentPhase::Diagenesis;
        let mut decay_c_rate = vec![0.0; n];
        let mut decay_n_rate = vec![0.0; n];
        let mut decay_c = vec![0.0; n];
        let mut decay_n = vec![0.0; n];
        for i in 0..n {
            let a = anomaly.at(i, bottom);
            let rc = self.config.diagenesis_carbon;
            let rn = self.config.diagenesis_nitrogen;
            decay_c_rate[i] = chemistry::rxn(rc.kappa, rc.theta, self.deposited_carbon[i], a);
            decay_n_rate[i] = chemistry::rxn(rn.kappa, rn.theta, self.deposited_nitrogen[i], a);
            decay_c[i] = (decay_c_rate[i] * days).min(self.deposited_carbon[i]);
            decay_n[i] = (decay_n_rate[i] * days).min(self.deposited_nitrogen[i]);
        }

        // DemandSolve：逐节点二分。需氧速率决定好氧层深度，好氧层
        // 深度又折减需氧速率，残差 f(d) = 生成(d) − d。
        self.phase = SedimentPhase::DemandSolve;
        let mut demand = vec![0.0; n];
        let mut failures = 0usize;
        let mut max_iterations = 0usize;
        let mut demand_sum = 0.0;
        let mut solved = 0usize;
        for i in 0..n {
            let potential =
                decay_c_rate[i] * OXYGEN_PER_CARBON + decay_n_rate[i] * OXYGEN_PER_NITROGEN;
            let residual = |d: f64| {
                let aerobic = (total - d / transfer).max(0.0);
                potential * (aerobic / total) - d
            };
            match solve_demand(
                self.config.demand_bracket_lo,
                self.config.demand_bracket_hi,
                residual,
            ) {
                Ok(outcome) => {
                    demand[i] = outcome.demand;
                    self.aerobic_depth[i] =
                        (total - outcome.demand / transfer).max(0.0).min(total);
                    max_iterations = max_iterations.max(outcome.iterations);
                    demand_sum += outcome.demand;
                    solved += 1;
                }
                Err(err) => {
                    log::warn!("节点 {} 床面需求求解失败: {}", i, err);
                    // 沿用上一步的好氧层深度，由其反推本步需求
                    demand[i] = (total - self.aerobic_depth[i]) * transfer;
                    failures += 1;
                }
            }
        }

        // FluxApply：经共享账本写回底层水体
        self.phase = SedimentPhase::FluxApply;

        // 耗氧：需氧速率 × 步长 / 底层厚度
        self.scratch.fill(0.0);
        for (i, node) in self.topology.nodes().iter().enumerate() {
            let thick = self.layers.layer_thickness(bottom, node.depth);
            self.scratch.set(i, bottom, demand[i] * days / thick);
        }
        pools.exchange(
            &self.scratch,
            Some(&PoolId::oxygen()),
            None,
            Some(bottom),
            None,
        );

        // 铵释放：衰解氮的溶解部分进入底层
        let ammonium_fraction = 1.0 / (1.0 + self.config.partition_aerobic);
        self.scratch.fill(0.0);
        for (i, node) in self.topology.nodes().iter().enumerate() {
            let thick = self.layers.layer_thickness(bottom, node.depth);
            self.scratch.set(i, bottom, decay_n[i] * ammonium_fraction / thick);
        }
        pools.convert(&PoolId::ammonium(), &self.scratch, 1.0, Some(bottom));

        // 硫化氢释放：厌氧份额的碳衰解按氧当量折算成硫，
        // 溶解部分逸出；好氧份额已计入需氧速率
        let sulfide_fraction = 1.0 / (1.0 + self.config.partition_anaerobic);
        self.scratch.fill(0.0);
        for (i, node) in self.topology.nodes().iter().enumerate() {
            let anaerobic = 1.0 - self.aerobic_depth[i] / total;
            let thick = self.layers.layer_thickness(bottom, node.depth);
            let released = decay_c[i] * anaerobic * SULFIDE_PER_CARBON * sulfide_fraction;
            self.scratch.set(i, bottom, released / thick);
        }
        pools.convert(
            &PoolId::hydrogen_sulfide(),
            &self.scratch,
            1.0,
            Some(bottom),
        );

        for i in 0..n {
            self.deposited_carbon[i] -= decay_c[i];
            self.deposited_nitrogen[i] -= decay_n[i];
        }

        self.phase = SedimentPhase::Idle;
        SedimentReport {
            outcome: DemandOutcome {
                converged: failures == 0,
                iterations: max_iterations,
                demand: if solved > 0 { demand_sum / solved as f64 } else { 0.0 },
            },
            failures,
        }
    }
}
