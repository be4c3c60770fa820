//! 流指标归约
//!
//! - 平均时延 = delay_sum / rx_packets
//! - 吞吐量 (Mbps) = rx_bytes * 8 / (last_rx - first_tx) / 1e6
//! - 完成时间 = 所有流 last_rx 的最大值
//!
//! 无法计算的指标显式标记为 `Metric::Undefined`，不会以 NaN/inf 出现在报告里，
//! 也不会中断其它流的归约。

use super::classifier::{FiveTuple, FlowClassifier, FlowId};
use super::monitor::{FlowRecord, FlowStats, FlowStatsSource};
use crate::sim::SimTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// 指标无法计算的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    NoPacketsReceived,
    NonPositiveDuration,
}

impl fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndefinedReason::NoPacketsReceived => f.write_str("no packets received"),
            UndefinedReason::NonPositiveDuration => f.write_str("non-positive duration"),
        }
    }
}

/// 派生指标：有值，或明确的“未定义”
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Metric {
    Defined(f64),
    Undefined(UndefinedReason),
}

impl Metric {
    pub fn value(self) -> Option<f64> {
        match self {
            Metric::Defined(v) => Some(v),
            Metric::Undefined(_) => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Metric::Defined(_))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Defined(v) => write!(f, "{v}"),
            Metric::Undefined(reason) => write!(f, "undefined ({reason})"),
        }
    }
}

/// 单条流的派生指标
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowMetrics {
    pub flow_id: FlowId,
    pub tuple: Option<FiveTuple>,
    pub tx_packets: u64,
    pub rx_packets: u64,
    pub lost_packets: u64,
    pub delay_sum_s: f64,
    /// 平均每包时延（秒）
    pub mean_delay_s: Metric,
    pub throughput_mbps: Metric,
    pub last_rx: SimTime,
}

impl FlowMetrics {
    pub fn from_stats(flow_id: FlowId, tuple: Option<FiveTuple>, st: &FlowStats) -> Self {
        let delay_sum_s = st.delay_sum.as_secs_f64();

        let mean_delay_s = if st.rx_packets == 0 {
            Metric::Undefined(UndefinedReason::NoPacketsReceived)
        } else {
            Metric::Defined(delay_sum_s / st.rx_packets as f64)
        };

        // 时间戳是无符号纳秒，先用有符号差值判断区间是否为正
        let duration_ns =
            i128::from(st.time_last_rx_packet.0) - i128::from(st.time_first_tx_packet.0);
        let throughput_mbps = if st.rx_packets == 0 {
            Metric::Undefined(UndefinedReason::NoPacketsReceived)
        } else if duration_ns <= 0 {
            Metric::Undefined(UndefinedReason::NonPositiveDuration)
        } else {
            let secs = duration_ns as f64 / 1e9;
            Metric::Defined(st.rx_bytes as f64 * 8.0 / secs / 1_000_000.0)
        };

        Self {
            flow_id,
            tuple,
            tx_packets: st.tx_packets,
            rx_packets: st.rx_packets,
            lost_packets: st.lost_packets,
            delay_sum_s,
            mean_delay_s,
            throughput_mbps,
            last_rx: st.time_last_rx_packet,
        }
    }
}

impl From<&FlowRecord> for FlowMetrics {
    fn from(r: &FlowRecord) -> Self {
        FlowMetrics::from_stats(r.flow_id, r.tuple, &r.stats)
    }
}

impl fmt::Display for FlowMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tuple {
            Some(t) => writeln!(
                f,
                "Flow {} ({} -> {})",
                self.flow_id, t.source_address, t.destination_address
            )?,
            None => writeln!(f, "Flow {} (unclassified)", self.flow_id)?,
        }
        writeln!(f, "  Lost Packets: {}", self.lost_packets)?;
        writeln!(f, "  Delay Sum: {} s", self.delay_sum_s)?;
        match self.mean_delay_s {
            Metric::Defined(v) => writeln!(f, "  Mean Delay: {v} s")?,
            m => writeln!(f, "  Mean Delay: {m}")?,
        }
        match self.throughput_mbps {
            Metric::Defined(v) => write!(f, "  Throughput: {v} Mbps"),
            m => write!(f, "  Throughput: {m}"),
        }
    }
}

/// 场景报告：全部流的指标 + 整体完成时间
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub flows: Vec<FlowMetrics>,
    pub completion_time: SimTime,
}

impl ScenarioReport {
    pub fn from_source(source: &dyn FlowStatsSource) -> Self {
        Self::from_records(&source.records())
    }

    /// 由流快照归约；输入顺序不影响输出顺序
    pub fn from_records(records: &[FlowRecord]) -> Self {
        let mut flows: Vec<FlowMetrics> = records.iter().map(FlowMetrics::from).collect();
        flows.sort_by_key(|m| m.flow_id);
        let completion_time = records
            .iter()
            .map(|r| r.stats.time_last_rx_packet)
            .max()
            .unwrap_or(SimTime::ZERO);
        ScenarioReport {
            flows,
            completion_time,
        }
    }

    pub fn flow(&self, id: FlowId) -> Option<&FlowMetrics> {
        self.flows.iter().find(|m| m.flow_id == id)
    }
}

/// 把原始流记录归约为报告，按流 id 升序输出
pub fn reduce(classifier: &FlowClassifier, stats: &BTreeMap<FlowId, FlowStats>) -> ScenarioReport {
    let mut flows = Vec::with_capacity(stats.len());
    let mut completion_time = SimTime::ZERO;
    for (&id, st) in stats {
        completion_time = completion_time.max(st.time_last_rx_packet);
        flows.push(FlowMetrics::from_stats(id, classifier.find_flow(id), st));
    }
    ScenarioReport {
        flows,
        completion_time,
    }
}
