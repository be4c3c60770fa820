//! 仿真器
//!
//! 事件驱动仿真器，维护虚拟时钟与事件队列。配置阶段只调度事件，
//! `run_until` 返回之后才允许读取运行结果。

use super::event::Event;
use super::scheduled_event::ScheduledEvent;
use super::time::SimTime;
use super::world::World;
use std::collections::BinaryHeap;
use tracing::{debug, info, trace};

/// 事件驱动仿真器：维护当前时间与事件队列。
#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_seq: u64,
    q: BinaryHeap<ScheduledEvent>,
}

impl Simulator {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 队列中尚未执行的事件数
    pub fn pending(&self) -> usize {
        self.q.len()
    }

    /// 调度事件在指定时间执行；早于当前时间的请求按当前时间处理。
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) {
        let at = at.max(self.now);
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        trace!(now = ?self.now, ?at, seq, event_type = std::any::type_name::<E>(), "调度事件");
        self.q.push(ScheduledEvent {
            at,
            seq,
            ev: Box::new(ev),
        });
    }

    /// 在当前时间之后 `delay` 调度事件
    pub fn schedule_in<E: Event>(&mut self, delay: SimTime, ev: E) {
        let at = self.now.saturating_add(delay);
        self.schedule(at, ev);
    }

    /// 运行直到事件队列为空或到达 `until`，返回执行的事件数。
    ///
    /// 返回时 `now() >= until`；晚于 `until` 的事件留在队列中不执行。
    #[tracing::instrument(skip(self, world), fields(until = %until))]
    pub fn run_until(&mut self, until: SimTime, world: &mut dyn World) -> u64 {
        info!("▶️  开始运行仿真");
        debug!(now = ?self.now, queue_size = self.q.len(), "初始状态");

        let mut executed = 0u64;
        while self.q.peek().is_some_and(|top| top.at <= until) {
            let Some(item) = self.q.pop() else { break };
            executed += 1;
            self.now = item.at;
            trace!(now = ?self.now, seq = item.seq, remaining = self.q.len(), "执行事件");
            item.ev.execute(self, world);
            world.on_tick(self);
        }
        self.now = self.now.max(until);

        info!(
            total_events = executed,
            final_time = %self.now,
            discarded = self.q.len(),
            "✅ 仿真完成"
        );
        executed
    }
}
