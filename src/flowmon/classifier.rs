//! 五元组分类器

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;

/// 流标识符，从 1 开始按首次出现顺序分配
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlowId(pub u32);

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FiveTuple {
    pub protocol: u8,
    pub source_address: Ipv4Addr,
    pub destination_address: Ipv4Addr,
    pub source_port: u16,
    pub destination_port: u16,
}

impl fmt::Display for FiveTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{} (proto {})",
            self.source_address,
            self.source_port,
            self.destination_address,
            self.destination_port,
            self.protocol
        )
    }
}

#[derive(Debug, Default, Clone)]
pub struct FlowClassifier {
    tuples: Vec<FiveTuple>,
    ids: HashMap<FiveTuple, FlowId>,
}

impl FlowClassifier {
    /// 返回五元组对应的流 id，必要时新建
    pub fn classify(&mut self, tuple: FiveTuple) -> FlowId {
        if let Some(id) = self.ids.get(&tuple) {
            return *id;
        }
        let id = FlowId(self.tuples.len() as u32 + 1);
        self.tuples.push(tuple);
        self.ids.insert(tuple, id);
        id
    }

    pub fn find_flow(&self, id: FlowId) -> Option<FiveTuple> {
        let idx = (id.0 as usize).checked_sub(1)?;
        self.tuples.get(idx).copied()
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}
