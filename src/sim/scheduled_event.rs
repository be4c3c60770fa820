//! 调度事件
//!
//! 队列中的条目：执行时间 + 插入序号 + 事件本体。

use super::event::Event;
use super::time::SimTime;
use std::cmp::Ordering;

/// 调度事件。同一时刻的事件按插入序号先后执行。
pub struct ScheduledEvent {
    pub(crate) at: SimTime,
    pub(crate) seq: u64,
    pub(crate) ev: Box<dyn Event>,
}

impl ScheduledEvent {
    pub fn at(&self) -> SimTime {
        self.at
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    fn key(&self) -> (SimTime, u64) {
        (self.at, self.seq)
    }
}

// BinaryHeap 是 max-heap；(时间, 序号) 最小者优先，因此反向比较。
impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key()).reverse()
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ScheduledEvent {}
