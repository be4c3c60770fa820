//! 移动模型选择

use super::geometry::{Rectangle, Vector2};
use crate::net::NodeId;
use crate::topo::HetTopology;
use serde::Serialize;
use tracing::{info, warn};

/// 快速档：车辆速度（m/s）
pub const FAST_SPEED_MPS: f64 = 28.0;
/// 慢速档：步行速度（m/s）
pub const SLOW_SPEED_MPS: f64 = 1.4;
/// 随机游走活动范围
pub const WALK_BOUNDS: Rectangle = Rectangle::new(-50.0, 50.0, -50.0, 50.0);

/// 移动模式选择器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MobilityMode {
    Fast,
    Slow,
    /// 无法识别的选择值：STA 只保留网格初始位置
    Unrecognized(i64),
}

impl MobilityMode {
    pub fn from_selector(v: i64) -> Self {
        match v {
            0 => MobilityMode::Fast,
            1 => MobilityMode::Slow,
            other => MobilityMode::Unrecognized(other),
        }
    }

    /// 随机游走速度；无法识别的模式没有运动策略
    pub fn walk_speed(self) -> Option<f64> {
        match self {
            MobilityMode::Fast => Some(FAST_SPEED_MPS),
            MobilityMode::Slow => Some(SLOW_SPEED_MPS),
            MobilityMode::Unrecognized(_) => None,
        }
    }
}

/// 绑定到节点上的运动策略；仿真开始前设定，运行中不变
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MobilityProfile {
    Stationary {
        position: Vector2,
    },
    RandomWalk {
        initial: Vector2,
        speed_mps: f64,
        bounds: Rectangle,
    },
}

impl MobilityProfile {
    pub fn initial_position(&self) -> Vector2 {
        match *self {
            MobilityProfile::Stationary { position } => position,
            MobilityProfile::RandomWalk { initial, .. } => initial,
        }
    }

    pub fn speed_mps(&self) -> f64 {
        match *self {
            MobilityProfile::Stationary { .. } => 0.0,
            MobilityProfile::RandomWalk { speed_mps, .. } => speed_mps,
        }
    }
}

/// 行优先网格位置分配器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPositionAllocator {
    pub min_x: f64,
    pub min_y: f64,
    pub delta_x: f64,
    pub delta_y: f64,
    pub grid_width: usize,
}

impl Default for GridPositionAllocator {
    fn default() -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            delta_x: 5.0,
            delta_y: 10.0,
            grid_width: 3,
        }
    }
}

impl GridPositionAllocator {
    /// 第 `slot` 个网格位置
    pub fn position(&self, slot: usize) -> Vector2 {
        let width = self.grid_width.max(1);
        let col = slot % width;
        let row = slot / width;
        Vector2::new(
            self.min_x + self.delta_x * col as f64,
            self.min_y + self.delta_y * row as f64,
        )
    }
}

/// 选择结果：每个带运动模型的节点一条
#[derive(Debug, Clone, Default)]
pub struct MobilityPlan {
    pub mode: Option<MobilityMode>,
    pub assignments: Vec<(NodeId, MobilityProfile)>,
}

impl MobilityPlan {
    pub fn profile_of(&self, node: NodeId) -> Option<&MobilityProfile> {
        self.assignments
            .iter()
            .find(|(n, _)| *n == node)
            .map(|(_, p)| p)
    }
}

/// 为 STA 与 AP 选择运动模型。
///
/// STA 先按网格取初始位置（槽位 0..n），再按模式覆盖为随机游走；
/// AP 取下一个网格槽位并始终静止。骨干与 LAN 节点不参与。
pub fn select_profiles(
    mode: MobilityMode,
    topo: &HetTopology,
    grid: &GridPositionAllocator,
) -> MobilityPlan {
    match mode {
        MobilityMode::Fast => info!(speed_mps = FAST_SPEED_MPS, "Node moves fast (car)"),
        MobilityMode::Slow => info!(speed_mps = SLOW_SPEED_MPS, "Node moves slow (human)"),
        MobilityMode::Unrecognized(v) => {
            warn!(selector = v, "未知的移动模式，STA 保持网格初始位置")
        }
    }

    let mut assignments = Vec::with_capacity(topo.wifi_stations.len() + topo.wifi_ap.len());
    let mut slot = 0usize;

    for &sta in topo.wifi_stations.nodes() {
        let position = grid.position(slot);
        slot += 1;
        let profile = match mode.walk_speed() {
            Some(speed_mps) => MobilityProfile::RandomWalk {
                initial: position,
                speed_mps,
                bounds: WALK_BOUNDS,
            },
            None => MobilityProfile::Stationary { position },
        };
        assignments.push((sta, profile));
    }

    for &ap in topo.wifi_ap.nodes() {
        let position = grid.position(slot);
        slot += 1;
        assignments.push((ap, MobilityProfile::Stationary { position }));
    }

    MobilityPlan {
        mode: Some(mode),
        assignments,
    }
}
