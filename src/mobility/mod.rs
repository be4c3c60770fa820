//! 移动性
//!
//! 为每个节点组选择运动模型（网格静止 / 两档速度的随机游走），
//! 并提供一个按 1 s 周期换向的随机游走运动学引擎。

mod geometry;
mod kinematics;
mod profile;

pub use geometry::{Rectangle, Vector2};
pub use kinematics::{CourseChange, CourseChangeHook, MobilityModels, WalkEpoch};
pub use profile::{
    FAST_SPEED_MPS, GridPositionAllocator, MobilityMode, MobilityPlan, MobilityProfile,
    SLOW_SPEED_MPS, WALK_BOUNDS, select_profiles,
};
