//! 场景装配与运行
//!
//! 把拓扑、地址、移动性、路由、流量与流量监控按固定顺序装配起来，
//! 运行到停止时刻后归约出报告。

mod config;
mod run;
mod world;

pub use config::ScenarioConfig;
pub use run::{Scenario, ScenarioOutcome, run_scenario};
pub use world::HetNetWorld;
