//! 场景配置
//!
//! 所有字段都有默认值；可以从 JSON 文件加载，CLI 选项再覆盖其上。

use crate::error::ScenarioError;
use crate::topo::{CsmaParams, HetNetOpts, PointToPointParams, WifiParams};
use crate::traffic::EchoConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// 0: AODV, 1: DSR, 2: DSDV
    pub protocol: i64,
    /// 0: 快速, 1: 慢速
    pub mobility_type: i64,
    /// LAN 上除网关外的节点数
    pub n_csma: usize,
    /// 无线 STA 数
    pub n_wifi: usize,
    pub stop_time_s: f64,
    /// 随机游走种子
    pub seed: u64,
    pub address_base: Ipv4Addr,
    pub prefix_len: u8,
    pub echo: EchoConfig,
    pub backbone: PointToPointParams,
    pub lan: CsmaParams,
    pub wifi: WifiParams,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            protocol: 2,
            mobility_type: 1,
            n_csma: 3,
            n_wifi: 3,
            stop_time_s: 20.0,
            seed: 1,
            address_base: Ipv4Addr::new(10, 1, 1, 0),
            prefix_len: 24,
            echo: EchoConfig::default(),
            backbone: PointToPointParams::default(),
            lan: CsmaParams::default(),
            wifi: WifiParams::default(),
        }
    }
}

impl ScenarioConfig {
    /// 从 JSON 文件加载；缺省字段取默认值
    pub fn from_json_file(path: &Path) -> Result<Self, ScenarioError> {
        let raw = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ScenarioError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn topology_opts(&self) -> HetNetOpts {
        HetNetOpts {
            n_csma: self.n_csma,
            n_wifi: self.n_wifi,
            backbone: self.backbone.clone(),
            lan: self.lan.clone(),
            wifi: self.wifi.clone(),
        }
    }
}
