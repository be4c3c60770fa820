//! 随机游走运动学
//!
//! 每个游走节点每隔 `EPOCH` 重新均匀抽取方向，速度恒定，碰到边界镜面反弹。
//! 位置按需计算，不逐帧推进。

use super::geometry::{Rectangle, Vector2};
use super::profile::{MobilityPlan, MobilityProfile};
use crate::net::NodeId;
use crate::scenario::HetNetWorld;
use crate::sim::{Event, SimTime, Simulator, World};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::f64::consts::TAU;
use tracing::{debug, trace};

/// 换向周期
const EPOCH: SimTime = SimTime::from_secs(1);

/// 一次航向变化
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourseChange {
    pub node: NodeId,
    pub at: SimTime,
    pub position: Vector2,
    pub velocity: Vector2,
}

/// 航向变化回调（只用于诊断输出，不影响仿真结果）
pub type CourseChangeHook = Box<dyn FnMut(&CourseChange)>;

#[derive(Debug)]
struct Walk {
    origin: Vector2,
    velocity: Vector2,
    epoch_start: SimTime,
    speed_mps: f64,
    bounds: Rectangle,
    rng: ChaCha8Rng,
}

impl Walk {
    fn position_at(&self, t: SimTime) -> Vector2 {
        let dt = t.saturating_sub(self.epoch_start).as_secs_f64();
        self.bounds.reflect(self.origin.plus(self.velocity.scaled(dt)))
    }
}

#[derive(Debug)]
enum NodeMotion {
    Constant(Vector2),
    Walk(Walk),
}

/// 运动学引擎：持有各节点的运动状态与航向回调
#[derive(Default)]
pub struct MobilityModels {
    seed: u64,
    motions: HashMap<NodeId, NodeMotion>,
    hooks: HashMap<NodeId, Vec<CourseChangeHook>>,
}

impl MobilityModels {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// 按计划安装运动模型；游走节点在 t=0 开始第一个周期
    pub fn install(&mut self, plan: &MobilityPlan, sim: &mut Simulator) {
        for (node, profile) in &plan.assignments {
            let motion = match *profile {
                MobilityProfile::Stationary { position } => NodeMotion::Constant(position),
                MobilityProfile::RandomWalk {
                    initial,
                    speed_mps,
                    bounds,
                } => {
                    let origin = bounds.clamp(initial);
                    if origin != initial {
                        debug!(node = %node, ?initial, ?origin, "初始位置超出边界，已收回");
                    }
                    sim.schedule(SimTime::ZERO, WalkEpoch { node: *node });
                    NodeMotion::Walk(Walk {
                        origin,
                        velocity: Vector2::default(),
                        epoch_start: SimTime::ZERO,
                        speed_mps,
                        bounds,
                        rng: ChaCha8Rng::seed_from_u64(node_seed(self.seed, *node)),
                    })
                }
            };
            self.motions.insert(*node, motion);
        }
    }

    /// 节点在时刻 `t` 的位置；没有运动模型的节点返回 None
    pub fn position_at(&self, node: NodeId, t: SimTime) -> Option<Vector2> {
        match self.motions.get(&node)? {
            NodeMotion::Constant(p) => Some(*p),
            NodeMotion::Walk(w) => Some(w.position_at(t)),
        }
    }

    pub fn is_mobile(&self, node: NodeId) -> bool {
        matches!(self.motions.get(&node), Some(NodeMotion::Walk(_)))
    }

    /// 注册航向变化回调
    pub fn on_course_change(&mut self, node: NodeId, hook: CourseChangeHook) {
        self.hooks.entry(node).or_default().push(hook);
    }

    /// 开始新周期：固定当前位置、抽取新方向并通知回调。返回下个周期时刻。
    pub(crate) fn advance_epoch(&mut self, node: NodeId, now: SimTime) -> Option<SimTime> {
        let Some(NodeMotion::Walk(walk)) = self.motions.get_mut(&node) else {
            return None;
        };
        walk.origin = walk.position_at(now);
        walk.epoch_start = now;
        let heading = walk.rng.gen_range(0.0..TAU);
        walk.velocity = Vector2::new(heading.cos(), heading.sin()).scaled(walk.speed_mps);

        let change = CourseChange {
            node,
            at: now,
            position: walk.origin,
            velocity: walk.velocity,
        };
        trace!(node = %node, at = %now, position = %change.position, "航向变化");
        if let Some(hooks) = self.hooks.get_mut(&node) {
            for hook in hooks.iter_mut() {
                hook(&change);
            }
        }
        Some(now.saturating_add(EPOCH))
    }
}

fn node_seed(seed: u64, node: NodeId) -> u64 {
    seed ^ (node.0 as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// 事件：游走节点进入新的换向周期
#[derive(Debug)]
pub struct WalkEpoch {
    pub node: NodeId,
}

impl Event for WalkEpoch {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = HetNetWorld::from_dyn(world);
        if let Some(next) = w.mobility.advance_epoch(self.node, sim.now()) {
            sim.schedule(next, *self);
        }
    }
}
