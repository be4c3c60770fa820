//! 节点路由状态

use super::installer::RoutingBackend;
use super::protocol::TableDrivenProtocol;
use crate::net::{NodeGroup, NodeId};
use std::collections::HashMap;
use tracing::trace;

/// 节点上的路由状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRouting {
    /// 协议栈 + 表驱动路由
    Table(TableDrivenProtocol),
    /// 源路由代理
    SourceRouted,
}

/// 内置的路由后端：记录每个节点挂载了什么。
///
/// 同一节点可能属于多个组；第一次安装生效，之后的重复安装被忽略。
#[derive(Debug, Default, Clone)]
pub struct ProtocolStacks {
    nodes: HashMap<NodeId, NodeRouting>,
}

impl ProtocolStacks {
    pub fn routing_of(&self, node: NodeId) -> Option<NodeRouting> {
        self.nodes.get(&node).copied()
    }

    /// 节点是否能参与转发
    pub fn is_routable(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn attach(&mut self, node: NodeId, routing: NodeRouting) {
        match self.nodes.get(&node) {
            Some(existing) => trace!(node = %node, ?existing, "节点已有路由状态，跳过"),
            None => {
                self.nodes.insert(node, routing);
            }
        }
    }
}

impl RoutingBackend for ProtocolStacks {
    fn install_stack(&mut self, group: &NodeGroup, protocol: TableDrivenProtocol) {
        for &node in group.nodes() {
            self.attach(node, NodeRouting::Table(protocol));
        }
    }

    fn install_source_routing(&mut self, group: &NodeGroup) {
        for &node in group.nodes() {
            self.attach(node, NodeRouting::SourceRouted);
        }
    }
}
