//! 节点与节点组
//!
//! 每个节点只有一个身份；节点组只是对身份的有序引用。网关节点
//! 同时带有 Backbone / Lan / WifiAp 三个成员标签，而不是三份需要同步的副本。

use super::id::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 节点组类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupKind {
    /// 点对点骨干链路两端
    Backbone,
    /// 共享总线 LAN（以网关为首成员）
    Lan,
    /// 无线终端（STA）
    WifiStations,
    /// 无线接入点
    WifiAp,
}

impl GroupKind {
    pub fn name(self) -> &'static str {
        match self {
            GroupKind::Backbone => "backbone",
            GroupKind::Lan => "lan-extension",
            GroupKind::WifiStations => "wifi-stations",
            GroupKind::WifiAp => "wifi-ap",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 节点实体
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    groups: Vec<GroupKind>,
}

impl NodeInfo {
    /// 节点所属的全部节点组（按加入顺序）
    pub fn groups(&self) -> &[GroupKind] {
        &self.groups
    }

    pub fn is_member_of(&self, kind: GroupKind) -> bool {
        self.groups.contains(&kind)
    }
}

/// 节点组：有序、具名的节点身份列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeGroup {
    pub kind: GroupKind,
    nodes: Vec<NodeId>,
}

impl NodeGroup {
    pub fn new(kind: GroupKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
        }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<NodeId> {
        self.nodes.get(idx).copied()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }
}

/// 节点注册表：分配节点身份并维护组成员关系
#[derive(Debug, Default, Clone)]
pub struct NodeRegistry {
    nodes: Vec<NodeInfo>,
}

impl NodeRegistry {
    /// 创建一个新节点并加入 `group`
    pub fn create(&mut self, name: impl Into<String>, group: &mut NodeGroup) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeInfo {
            id,
            name: name.into(),
            groups: Vec::new(),
        });
        self.add_to(id, group);
        id
    }

    /// 把已有节点加入另一个组（同一身份，多个角色）
    pub fn add_to(&mut self, id: NodeId, group: &mut NodeGroup) {
        let info = &mut self.nodes[id.0];
        if !info.groups.contains(&group.kind) {
            info.groups.push(group.kind);
        }
        if !group.nodes.contains(&id) {
            group.nodes.push(id);
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeInfo> {
        self.nodes.get(id.0)
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.nodes.get(id.0).map_or("?", |n| n.name.as_str())
    }

    pub fn groups_of(&self, id: NodeId) -> &[GroupKind] {
        self.nodes.get(id.0).map_or(&[], |n| n.groups())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeInfo> {
        self.nodes.iter()
    }
}
