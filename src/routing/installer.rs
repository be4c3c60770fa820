//! 路由协议安装器
//!
//! 每种安装路径一个处理函数；无线侧条件安装只出现在 DSR 分支中。

use super::protocol::{Installation, RoutingProtocolChoice, TableDrivenProtocol};
use crate::net::{GroupKind, NodeGroup};
use crate::topo::HetTopology;
use tracing::{debug, info};

/// 路由安装的外部协作方
pub trait RoutingBackend {
    /// 在节点组上安装协议栈，并以 `protocol` 作为路由策略
    fn install_stack(&mut self, group: &NodeGroup, protocol: TableDrivenProtocol);

    /// 在节点组的每个节点上直接安装源路由代理
    fn install_source_routing(&mut self, group: &NodeGroup);
}

/// 一次组级安装调用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallCall {
    Stack {
        group: GroupKind,
        protocol: TableDrivenProtocol,
    },
    SourceRouting {
        group: GroupKind,
    },
}

impl InstallCall {
    pub fn group(&self) -> GroupKind {
        match *self {
            InstallCall::Stack { group, .. } | InstallCall::SourceRouting { group } => group,
        }
    }
}

/// 安装结果：按顺序记录实际发出的组级调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub choice: RoutingProtocolChoice,
    pub calls: Vec<InstallCall>,
    /// DSR 且没有无线设备时为 true
    pub skipped_wireless: bool,
}

/// 安装所选路由协议
#[tracing::instrument(skip(topo, backend), fields(protocol = %choice))]
pub fn install_routing(
    choice: RoutingProtocolChoice,
    topo: &HetTopology,
    backend: &mut dyn RoutingBackend,
) -> InstallReport {
    let mut report = InstallReport {
        choice,
        calls: Vec::new(),
        skipped_wireless: false,
    };
    match choice.installation() {
        Installation::SharedStack(protocol) => {
            install_shared_stack(protocol, topo, backend, &mut report)
        }
        Installation::PerNodeAgent => install_source_routed(topo, backend, &mut report),
    }
    info!(calls = report.calls.len(), "{} protocol", choice);
    report
}

/// 表驱动协议：LAN、AP、STA 依次套用同一个安装器。
///
/// 骨干组不单独安装；网关作为 LAN 首成员已经拿到协议栈。
fn install_shared_stack(
    protocol: TableDrivenProtocol,
    topo: &HetTopology,
    backend: &mut dyn RoutingBackend,
    report: &mut InstallReport,
) {
    for group in [&topo.lan, &topo.wifi_ap, &topo.wifi_stations] {
        debug!(group = %group.kind, nodes = group.len(), %protocol, "安装协议栈");
        backend.install_stack(group, protocol);
        report.calls.push(InstallCall::Stack {
            group: group.kind,
            protocol,
        });
    }
}

/// 源路由协议：骨干、LAN 必装；AP 与 STA 仅在存在无线设备时安装。
fn install_source_routed(
    topo: &HetTopology,
    backend: &mut dyn RoutingBackend,
    report: &mut InstallReport,
) {
    let mut groups = vec![&topo.backbone, &topo.lan];
    if topo.has_wireless_devices() {
        groups.push(&topo.wifi_ap);
        groups.push(&topo.wifi_stations);
    } else {
        debug!("没有无线设备，跳过无线侧 DSR 代理");
        report.skipped_wireless = true;
    }
    for group in groups {
        debug!(group = %group.kind, nodes = group.len(), "安装 DSR 代理");
        backend.install_source_routing(group);
        report
            .calls
            .push(InstallCall::SourceRouting { group: group.kind });
    }
}
