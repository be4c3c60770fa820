//! 流量监控器
//!
//! 在 IP 层观察发送、接收与丢弃。发出后超过 `MAX_PER_HOP_DELAY` 仍未到达的
//! 包在 `check_for_lost_packets` 时计为丢失。

use super::classifier::{FiveTuple, FlowClassifier, FlowId};
use crate::net::Packet;
use crate::sim::SimTime;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

/// 在途包超过该时长视为丢失
pub const MAX_PER_HOP_DELAY: SimTime = SimTime::from_secs(10);

/// 丢包原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// 源与目的之间没有可路由路径
    NoRoute,
    /// 无线跳两端超出通信距离
    OutOfRange,
    /// 超时未到达
    Timeout,
}

/// 单条流的原始计数器
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowStats {
    pub tx_packets: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub rx_bytes: u64,
    pub lost_packets: u64,
    /// 所有已接收包的端到端时延之和
    pub delay_sum: SimTime,
    pub jitter_sum: SimTime,
    pub last_delay: Option<SimTime>,
    pub time_first_tx_packet: SimTime,
    pub time_last_tx_packet: SimTime,
    pub time_first_rx_packet: SimTime,
    pub time_last_rx_packet: SimTime,
    pub packets_dropped: BTreeMap<DropReason, u64>,
}

/// 运行结束后的单条流快照：分类器给出的五元组 + 计数器
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowRecord {
    pub flow_id: FlowId,
    pub tuple: Option<FiveTuple>,
    pub stats: FlowStats,
}

/// 流量监控协作方的查询接口
pub trait FlowStatsSource {
    fn classifier(&self) -> &FlowClassifier;
    fn flow_stats(&self) -> &BTreeMap<FlowId, FlowStats>;

    /// 按流 id 升序取全部流的快照
    fn records(&self) -> Vec<FlowRecord> {
        self.flow_stats()
            .iter()
            .map(|(&flow_id, stats)| FlowRecord {
                flow_id,
                tuple: self.classifier().find_flow(flow_id),
                stats: stats.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct Tracked {
    flow: FlowId,
    sent_at: SimTime,
}

#[derive(Debug, Default)]
pub struct FlowMonitor {
    classifier: FlowClassifier,
    stats: BTreeMap<FlowId, FlowStats>,
    in_flight: HashMap<u64, Tracked>,
}

impl FlowMonitor {
    /// 包离开源节点
    pub fn report_first_tx(&mut self, pkt: &Packet, now: SimTime) {
        let flow = self.classifier.classify(pkt.five_tuple());
        let st = self.stats.entry(flow).or_default();
        if st.tx_packets == 0 {
            st.time_first_tx_packet = now;
        }
        st.time_last_tx_packet = now;
        st.tx_packets += 1;
        st.tx_bytes += u64::from(pkt.size_bytes);
        self.in_flight.insert(pkt.id, Tracked { flow, sent_at: now });
        trace!(pkt_id = pkt.id, flow = %flow, "flowmon tx");
    }

    /// 包到达目的节点
    pub fn report_last_rx(&mut self, pkt: &Packet, now: SimTime) {
        let Some(t) = self.in_flight.remove(&pkt.id) else {
            return;
        };
        let st = self.stats.entry(t.flow).or_default();
        let delay = now.saturating_sub(t.sent_at);
        if let Some(prev) = st.last_delay {
            let jitter = SimTime(delay.0.abs_diff(prev.0));
            st.jitter_sum = st.jitter_sum.saturating_add(jitter);
        }
        st.last_delay = Some(delay);
        st.delay_sum = st.delay_sum.saturating_add(delay);
        if st.rx_packets == 0 {
            st.time_first_rx_packet = now;
        }
        st.time_last_rx_packet = now;
        st.rx_packets += 1;
        st.rx_bytes += u64::from(pkt.size_bytes);
        trace!(pkt_id = pkt.id, flow = %t.flow, delay = %delay, "flowmon rx");
    }

    /// 包在途中被丢弃；立即计入丢失
    pub fn report_drop(&mut self, pkt: &Packet, reason: DropReason) {
        let Some(t) = self.in_flight.remove(&pkt.id) else {
            return;
        };
        let st = self.stats.entry(t.flow).or_default();
        st.lost_packets += 1;
        *st.packets_dropped.entry(reason).or_default() += 1;
        debug!(pkt_id = pkt.id, flow = %t.flow, ?reason, "flowmon drop");
    }

    /// 把在途超时的包计为丢失
    pub fn check_for_lost_packets(&mut self, now: SimTime, max_delay: SimTime) {
        let expired: Vec<u64> = self
            .in_flight
            .iter()
            .filter(|(_, t)| now.saturating_sub(t.sent_at) > max_delay)
            .map(|(id, _)| *id)
            .collect();
        for id in expired {
            if let Some(t) = self.in_flight.remove(&id) {
                let st = self.stats.entry(t.flow).or_default();
                st.lost_packets += 1;
                *st.packets_dropped.entry(DropReason::Timeout).or_default() += 1;
            }
        }
        debug!(still_in_flight = self.in_flight.len(), "检查丢失的包");
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

impl FlowStatsSource for FlowMonitor {
    fn classifier(&self) -> &FlowClassifier {
        &self.classifier
    }

    fn flow_stats(&self) -> &BTreeMap<FlowId, FlowStats> {
        &self.stats
    }
}
