//! 平面几何：位置向量与矩形边界

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vector2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn scaled(self, k: f64) -> Vector2 {
        Vector2::new(self.x * k, self.y * k)
    }

    pub fn plus(self, other: Vector2) -> Vector2 {
        Vector2::new(self.x + other.x, self.y + other.y)
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x = {}, y = {}", self.x, self.y)
    }
}

/// 轴对齐矩形 [x_min, x_max] x [y_min, y_max]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Rectangle {
    pub const fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn contains(&self, p: Vector2) -> bool {
        (self.x_min..=self.x_max).contains(&p.x) && (self.y_min..=self.y_max).contains(&p.y)
    }

    pub fn clamp(&self, p: Vector2) -> Vector2 {
        Vector2::new(
            p.x.clamp(self.x_min, self.x_max),
            p.y.clamp(self.y_min, self.y_max),
        )
    }

    /// 把无界直线运动折回边界内（在边界处镜面反弹）
    pub fn reflect(&self, p: Vector2) -> Vector2 {
        Vector2::new(
            fold(p.x, self.x_min, self.x_max),
            fold(p.y, self.y_min, self.y_max),
        )
    }
}

fn fold(v: f64, lo: f64, hi: f64) -> f64 {
    let w = hi - lo;
    if !(w > 0.0) {
        return lo;
    }
    let mut t = (v - lo).rem_euclid(2.0 * w);
    if t > w {
        t = 2.0 * w - t;
    }
    lo + t
}
