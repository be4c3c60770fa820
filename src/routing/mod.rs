//! 自组网路由协议选择与安装
//!
//! 三种协议互斥：AODV / DSDV 通过共享协议栈安装器挂载，
//! DSR 在各节点组上逐个安装代理。

mod installer;
mod protocol;
mod stacks;

pub use installer::{InstallCall, InstallReport, RoutingBackend, install_routing};
pub use protocol::{Installation, RoutingProtocolChoice, TableDrivenProtocol};
pub use stacks::{NodeRouting, ProtocolStacks};
