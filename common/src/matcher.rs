//! 寸法判定モジュール
//!
//! 分類結果の寸法が目標寸法 ±許容誤差 に収まるかを判定する。
//! 幅・高さの入れ替えは行わない（応答の向きをそのまま使う）。

use crate::types::{ClassificationResult, TargetEnvelope};
use std::ops::RangeInclusive;

/// 境界計算の浮動小数点誤差の吸収幅
const BOUND_EPSILON: f64 = 1e-9;

impl TargetEnvelope {
    pub fn new(desired_width: f64, desired_height: f64, tolerance: f64) -> Self {
        Self {
            desired_width,
            desired_height,
            tolerance,
        }
    }

    /// 許容される幅の範囲（両端を含む）
    pub fn width_range(&self) -> RangeInclusive<f64> {
        bounds(self.desired_width, self.tolerance)
    }

    /// 許容される高さの範囲（両端を含む）
    pub fn height_range(&self) -> RangeInclusive<f64> {
        bounds(self.desired_height, self.tolerance)
    }

    pub fn contains(&self, width_m: f64, height_m: f64) -> bool {
        within(self.width_range(), width_m) && within(self.height_range(), height_m)
    }
}

/// 分類結果を受理するか
///
/// `NotMatch` と `MatchUnknownDims` は常に不受理
pub fn accepts(result: &ClassificationResult, envelope: &TargetEnvelope) -> bool {
    match *result {
        ClassificationResult::Match { width_m, height_m } => envelope.contains(width_m, height_m),
        ClassificationResult::NotMatch | ClassificationResult::MatchUnknownDims => false,
    }
}

fn bounds(desired: f64, tolerance: f64) -> RangeInclusive<f64> {
    desired * (1.0 - tolerance)..=desired * (1.0 + tolerance)
}

fn within(range: RangeInclusive<f64>, value: f64) -> bool {
    value >= range.start() - BOUND_EPSILON && value <= range.end() + BOUND_EPSILON
}
