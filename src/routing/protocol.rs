//! 路由协议枚举

use crate::error::ScenarioError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 表驱动协议（通过共享协议栈安装器挂载）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableDrivenProtocol {
    Aodv,
    Dsdv,
}

/// 本次运行启用的路由协议；CLI 选择值 0/1/2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingProtocolChoice {
    Aodv,
    Dsr,
    Dsdv,
}

/// 安装路径：两种结构不同的安装方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Installation {
    /// 在共享协议栈安装器上设置路由策略，再统一安装
    SharedStack(TableDrivenProtocol),
    /// 直接在每个节点上安装源路由代理
    PerNodeAgent,
}

impl RoutingProtocolChoice {
    pub fn selector(self) -> i64 {
        match self {
            RoutingProtocolChoice::Aodv => 0,
            RoutingProtocolChoice::Dsr => 1,
            RoutingProtocolChoice::Dsdv => 2,
        }
    }

    pub fn installation(self) -> Installation {
        match self {
            RoutingProtocolChoice::Aodv => Installation::SharedStack(TableDrivenProtocol::Aodv),
            RoutingProtocolChoice::Dsdv => Installation::SharedStack(TableDrivenProtocol::Dsdv),
            RoutingProtocolChoice::Dsr => Installation::PerNodeAgent,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RoutingProtocolChoice::Aodv => "AODV",
            RoutingProtocolChoice::Dsr => "DSR",
            RoutingProtocolChoice::Dsdv => "DSDV",
        }
    }
}

impl TryFrom<i64> for RoutingProtocolChoice {
    type Error = ScenarioError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(RoutingProtocolChoice::Aodv),
            1 => Ok(RoutingProtocolChoice::Dsr),
            2 => Ok(RoutingProtocolChoice::Dsdv),
            other => Err(ScenarioError::UnknownProtocol(other)),
        }
    }
}

impl fmt::Display for RoutingProtocolChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for TableDrivenProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableDrivenProtocol::Aodv => f.write_str("AODV"),
            TableDrivenProtocol::Dsdv => f.write_str("DSDV"),
        }
    }
}
