//! 统计信息
//!
//! 定义网络层统计数据结构。

/// 网络统计信息
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stats {
    pub sent_pkts: u64,
    pub delivered_pkts: u64,
    pub delivered_bytes: u64,
    pub dropped_pkts: u64,
}
