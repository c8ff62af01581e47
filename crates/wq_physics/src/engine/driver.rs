// crates/wq_physics/src/engine/driver.rs

//! 单步驱动
//!
//! [`Simulation`] 把输运算子、六个物种反应器、沉积床和共享账本
//! 组装成严格顺序的单步管线。拓扑与分层经 `Arc` 只读共享，
//! 一个 `Simulation` 实例对应一次模拟运行。

use std::sync::Arc;

use wq_config::ModelConfig;
use wq_foundation::{WqError, WqResult};
use wq_mesh::{Layers, Topology};

use crate::chemistry::{ChemistryPools, NegativePolicy, PoolId};
use crate::engine::diagnostics::StepDiagnostics;
use crate::engine::forcing::Forcing;
use crate::fields::Field;
use crate::reactors::{
    CarbonReactor, NitrogenReactor, OxygenReactor, PhosphorusReactor, SilicaReactor, SulfurReactor,
};
use crate::sediment::SedimentBed;
use crate::transport::{
    apply_vertical_flux, influx, interface_flux, omega, salinity_flux_control, Advection,
    Diffusion,
};

/// 水质模拟实例
pub struct Simulation {
    config: ModelConfig,
    topology: Arc<Topology>,
    layers: Arc<Layers>,
    pools: ChemistryPools,
    advection: Advection,
    diffusion: Diffusion,
    carbon: CarbonReactor,
    oxygen: OxygenReactor,
    nitrogen: NitrogenReactor,
    phosphorus: PhosphorusReactor,
    silica: SilicaReactor,
    sulfur: SulfurReactor,
    sediment: SedimentBed,
    salinity: Field,
    step_index: u64,
}

impl Simulation {
    /// 组装一次模拟运行
    ///
    /// 配置校验失败立即返回，不进入时间步。
    pub fn new(
        config: ModelConfig,
        topology: Arc<Topology>,
        layers: Arc<Layers>,
    ) -> WqResult<Self> {
        config
            .validate()
            .map_err(|e| WqError::config(e.to_string()))?;

        let n = topology.n_nodes();
        let nl = layers.n_layers();

        let carbon = CarbonReactor::new(config.carbon.clone(), n, nl);
        let oxygen = OxygenReactor::new(config.oxygen.clone(), n, nl);
        let nitrogen = NitrogenReactor::new(config.nitrogen.clone(), n, nl);
        let phosphorus = PhosphorusReactor::new(config.phosphorus.clone(), n, nl);
        let silica = SilicaReactor::new(config.silica.clone(), n, nl);
        let sulfur = SulfurReactor::new(config.sulfur.clone(), n, nl);

        let mut keys = carbon.keys();
        keys.extend(oxygen.keys());
        keys.extend(nitrogen.keys());
        keys.extend(phosphorus.keys());
        keys.extend(silica.keys());
        keys.extend(sulfur.keys());
        let pools = ChemistryPools::new(topology.clone(), layers.clone(), &keys)?;

        let sediment = SedimentBed::new(config.sediment.clone(), topology.clone(), layers.clone());

        Ok(Self {
            advection: Advection::new(config.transport.clone()),
            diffusion: Diffusion::new(config.transport.clone()),
            salinity: Field::new("salinity", n, nl),
            pools,
            carbon,
            oxygen,
            nitrogen,
            phosphorus,
            silica,
            sulfur,
            sediment,
            step_index: 0,
            config,
            topology,
            layers,
        })
    }

    /// 推进一个时间步，dt 为秒
    ///
    /// 管线顺序固定：输运 → 反应 → 沉积交换 → 提交。返回的诊断
    /// 携带逐池质量审计与沉积床求解报告。
    pub fn step(&mut self, forcing: &Forcing, dt: f64) -> WqResult<StepDiagnostics> {
        if !(dt > 0.0) {
            return Err(WqError::invalid_input(format!("dt 必须为正: {}", dt)));
        }
        let n = self.topology.n_nodes();
        let nl = self.layers.n_layers();
        forcing.validate(n, nl)?;

        // 1. 输运。盐度走专用的限制通量路径（在 omega 校正之前，
        //    用未校正的界面速度重构界面盐度），各池走平流/扩散。
        let exchange = influx(&self.topology, &self.layers, &forcing.u, &forcing.v);
        let raw = interface_flux(&self.topology, &self.layers, &exchange);
        let limited = salinity_flux_control(&self.topology, &self.layers, &self.salinity, &raw);
        apply_vertical_flux(&self.topology, &self.layers, &limited, &mut self.salinity, dt);

        let w = omega(&self.topology, &self.layers, &forcing.dzdt, &exchange, dt);

        for key in self.pools.keys().to_vec() {
            let value = self.pools.value(&key).clone();
            let mass = self.pools.mass_mut(&key);
            self.advection
                .vertical(&self.topology, &self.layers, &value, &w, mass, dt);
            self.advection.horizontal(
                &self.topology,
                &self.layers,
                &value,
                &forcing.u,
                &forcing.v,
                mass,
                dt,
            );
            self.diffusion
                .vertical(&self.topology, &self.layers, &value, mass, dt);
            self.diffusion
                .horizontal(&self.topology, &self.layers, &value, mass, dt);
        }
        self.pools.absorb_transport();

        // 2. 反应。各反应器读上一步 value，向 delta 累加。
        self.carbon.integrate(&mut self.pools, &forcing.anomaly, dt);
        self.oxygen.integrate(&mut self.pools, &forcing.anomaly, dt);
        self.nitrogen.integrate(&mut self.pools, &forcing.anomaly, dt);
        self.phosphorus
            .integrate(&mut self.pools, &forcing.solids, &forcing.anomaly, dt);
        self.silica
            .integrate(&mut self.pools, &forcing.solids, &forcing.anomaly, dt);
        self.sulfur.integrate(&mut self.pools, &forcing.anomaly, dt);

        // 3. 沉积物交换。碳/氮沉降入库，磷/硅沉降导出记入审计。
        let deposited_carbon = self.carbon.settle(&mut self.pools, dt);
        let deposited_nitrogen = self.nitrogen.settle(&mut self.pools, dt);
        self.phosphorus.settle(&mut self.pools, dt);
        self.silica.settle(&mut self.pools, dt);
        self.sediment.deposit(&deposited_carbon, &deposited_nitrogen);
        let sediment = self.sediment.flux(&mut self.pools, &forcing.anomaly, dt);

        // 4. 提交与审计。
        let policy = if self.config.transport.discard_negatives {
            NegativePolicy::Discard
        } else {
            NegativePolicy::Keep
        };
        let audit = self.pools.commit(policy);
        let clamped = audit.total_clamped();

        let step = self.step_index;
        self.step_index += 1;
        Ok(StepDiagnostics {
            step,
            audit,
            sediment,
            clamped,
        })
    }

    /// 盐度场
    pub fn salinity(&self) -> &Field {
        &self.salinity
    }

    /// 设置初始盐度场
    pub fn set_salinity(&mut self, salinity: Field) -> WqResult<()> {
        salinity.check_shape(self.topology.n_nodes(), self.layers.n_layers())?;
        self.salinity = salinity;
        Ok(())
    }

    /// 共享账本（初始化浓度用）
    pub fn pools_mut(&mut self) -> &mut ChemistryPools {
        &mut self.pools
    }

    /// 共享账本
    pub fn pools(&self) -> &ChemistryPools {
        &self.pools
    }

    /// 全池浓度快照
    pub fn pool_snapshot(&self) -> Vec<(PoolId, Field)> {
        self.pools.snapshot()
    }

    /// 沉积床
    pub fn sediment(&self) -> &SedimentBed {
        &self.sediment
    }

    /// 网格拓扑
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// σ 分层
    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    /// 已完成的步数
    pub fn step_index(&self) -> u64 {
        self.step_index
    }
}
