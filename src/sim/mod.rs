//! 仿真内核
//!
//! 事件驱动的离散时间内核：虚拟时钟、事件队列和世界接口。
//! 场景层只通过 `schedule` / `now` / `run_until` 与其交互。

mod event;
mod scheduled_event;
mod simulator;
mod time;
mod world;

pub use event::Event;
pub use scheduled_event::ScheduledEvent;
pub use simulator::Simulator;
pub use time::SimTime;
pub use world::World;
