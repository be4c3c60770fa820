//! 异构 MANET 场景仿真
//!
//! 骨干 p2p + CSMA LAN + 无线小区，选择一种自组网路由协议，
//! 运行 echo 流量并输出每条流的丢包、时延、吞吐量。

use clap::Parser;
use manet_rs::ScenarioError;
use manet_rs::scenario::{ScenarioConfig, run_scenario};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(
    name = "hetnet-sim",
    about = "异构 MANET 场景仿真：p2p 骨干 + CSMA LAN + Wi-Fi 小区"
)]
struct Args {
    /// 路由协议 0:AODV, 1:DSR, 2:DSDV
    #[arg(long, allow_negative_numbers = true)]
    protocol: Option<i64>,
    /// 移动性 0:快速(28 m/s), 1:慢速(1.4 m/s)
    #[arg(long = "mobilityType", alias = "mobility-type", allow_negative_numbers = true)]
    mobility_type: Option<i64>,
    /// LAN 上额外节点数
    #[arg(long = "nCsma", alias = "n-csma")]
    n_csma: Option<usize>,
    /// 无线 STA 数
    #[arg(long = "nWifi", alias = "n-wifi")]
    n_wifi: Option<usize>,
    /// 场景配置 JSON（CLI 选项覆盖文件内容）
    #[arg(long)]
    config: Option<PathBuf>,
    /// 随机游走种子
    #[arg(long)]
    seed: Option<u64>,
    /// 仿真停止时刻（秒）
    #[arg(long)]
    stop_s: Option<f64>,
    /// 输出 JSON 报告
    #[arg(long)]
    report_json: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<(ScenarioConfig, Option<PathBuf>), ScenarioError> {
        let mut cfg = match &self.config {
            Some(path) => ScenarioConfig::from_json_file(path)?,
            None => ScenarioConfig::default(),
        };
        if let Some(v) = self.protocol {
            cfg.protocol = v;
        }
        if let Some(v) = self.mobility_type {
            cfg.mobility_type = v;
        }
        if let Some(v) = self.n_csma {
            cfg.n_csma = v;
        }
        if let Some(v) = self.n_wifi {
            cfg.n_wifi = v;
        }
        if let Some(v) = self.seed {
            cfg.seed = v;
        }
        if let Some(v) = self.stop_s {
            cfg.stop_time_s = v;
        }
        Ok((cfg, self.report_json))
    }
}

fn main() -> ExitCode {
    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let (cfg, report_json) = match args.into_config() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = match run_scenario(&cfg) {
        Ok(o) => o,
        // 未知协议：静默结束，不产生报告
        Err(ScenarioError::UnknownProtocol(v)) => {
            debug!(selector = v, "未知的路由协议，未运行仿真");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let report = &outcome.report;
    for flow in &report.flows {
        println!(
            "flow id={} src={} dst={} tx={} rx={} lost={} mean_delay_s={} throughput_mbps={}",
            flow.flow_id,
            flow.tuple.map_or_else(|| "-".to_string(), |t| t.source_address.to_string()),
            flow.tuple.map_or_else(|| "-".to_string(), |t| t.destination_address.to_string()),
            flow.tx_packets,
            flow.rx_packets,
            flow.lost_packets,
            flow.mean_delay_s,
            flow.throughput_mbps,
        );
    }
    println!(
        "done protocol={} events={} flows={} completion_time_s={}",
        outcome.protocol,
        outcome.events,
        report.flows.len(),
        report.completion_time.as_secs_f64()
    );

    if let Some(path) = report_json {
        let json = match serde_json::to_string_pretty(report) {
            Ok(j) => j,
            Err(e) => {
                eprintln!("error: failed to encode report: {e}");
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = fs::write(&path, json) {
            eprintln!("error: failed to write {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
        eprintln!("wrote report to {}", path.display());
    }
    ExitCode::SUCCESS
}
