//! 场景错误类型

use crate::net::AddressError;
use crate::sim::SimTime;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    /// 未知的路由协议选择值；在构建任何状态之前终止运行
    #[error("unknown routing protocol selector {0} (expected 0, 1 or 2)")]
    UnknownProtocol(i64),

    #[error(
        "echo client window [{client_start}, {client_stop}] must start after server start {server_start} and end by server stop {server_stop}"
    )]
    InvalidTrafficWindow {
        server_start: SimTime,
        server_stop: SimTime,
        client_start: SimTime,
        client_stop: SimTime,
    },

    #[error("address plan: {0}")]
    Address(#[from] AddressError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ScenarioError {
    /// 配置类错误：运行在仿真开始之前被拒绝
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ScenarioError::UnknownProtocol(_) | ScenarioError::InvalidTrafficWindow { .. }
        )
    }
}
