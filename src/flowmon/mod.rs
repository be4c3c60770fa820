//! 流量监控与指标归约
//!
//! `FlowMonitor` 在 IP 层按五元组记录每条流的收发计数与时间戳；
//! 仿真结束后 `reduce` 把原始记录归约为丢包、平均时延、吞吐量。

mod classifier;
mod metrics;
mod monitor;

pub use classifier::{FiveTuple, FlowClassifier, FlowId};
pub use metrics::{FlowMetrics, Metric, ScenarioReport, UndefinedReason, reduce};
pub use monitor::{
    DropReason, FlowMonitor, FlowRecord, FlowStats, FlowStatsSource, MAX_PER_HOP_DELAY,
};
