//! Live calibration rules.
//!
//! Every function here is evaluated once per sample per control. The update
//! functions mutate the descriptor's "seen" state; the classification and
//! display helpers are pure.
//!
//! Seen state is monotonic over a device's lifetime: an axis's seen range only
//! widens, a button's `seen_on`/`seen_off` never reset, and a hat's direction
//! mask only gains bits.

use crate::config::CalibrationConfig;
use crate::control::{AxisInfo, ButtonInfo, HatDirection, HatInfo, HatKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How much of a control's declared range has been exercised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Coverage {
    Default,
    NearFull,
    Full,
}

/// Display value for an axis sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisReading {
    /// Whole percent of the declared range (or of the half-range toward the
    /// matching extreme, for ranges symmetric about zero).
    Percent(i32),
    /// Raw value, for ranges where a percentage is not meaningful.
    Raw(i32),
}

impl fmt::Display for AxisReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisReading::Percent(p) => write!(f, "{p}%"),
            AxisReading::Raw(v) => write!(f, "{v}"),
        }
    }
}

/// Record one axis sample.
///
/// The sample is clamped into the declared range, folded into the seen
/// extremes and pushed into the rolling history (oldest sample evicted once
/// the buffer is full). Returns the clamped value.
pub fn update_axis(axis: &mut AxisInfo, raw: i32) -> i32 {
    let (lo, hi) = ordered(axis.declared_min(), axis.declared_max());
    let value = raw.clamp(lo, hi);

    if axis.samples == 0 {
        axis.seen_min = value;
        axis.seen_max = value;
    } else {
        axis.seen_min = axis.seen_min.min(value);
        axis.seen_max = axis.seen_max.max(value);
    }
    axis.samples += 1;

    if axis.history_capacity > 0 {
        while axis.history.len() >= axis.history_capacity {
            axis.history.pop_front();
        }
        axis.history.push_back(value);
    }

    value
}

/// Classify the tested coverage of an axis.
pub fn axis_coverage(axis: &AxisInfo, cfg: &CalibrationConfig) -> Coverage {
    match (axis.seen_min(), axis.seen_max()) {
        (Some(seen_min), Some(seen_max)) => classify_range(
            seen_min,
            seen_max,
            axis.declared_min(),
            axis.declared_max(),
            cfg.near_full_fraction,
        ),
        _ => Coverage::Default,
    }
}

/// Classify a seen range against a declared range.
///
/// *Full* when both declared extremes were hit exactly; *near-full* when both
/// seen extremes lie within `near_fraction` of the declared span from their
/// declared counterparts.
pub fn classify_range(seen_min: i32, seen_max: i32, min: i32, max: i32, near_fraction: f64) -> Coverage {
    if seen_min == min && seen_max == max {
        return Coverage::Full;
    }
    let span = (max as i64 - min as i64).abs() as f64;
    let tolerance = span * near_fraction;
    let low_gap = (seen_min as i64 - min as i64).abs() as f64;
    let high_gap = (max as i64 - seen_max as i64).abs() as f64;
    if low_gap <= tolerance && high_gap <= tolerance {
        Coverage::NearFull
    } else {
        Coverage::Default
    }
}

/// Range is symmetric about zero within `tolerance` (relative).
pub fn is_symmetric(min: i32, max: i32, tolerance: f64) -> bool {
    if min >= 0 || max <= 0 {
        return false;
    }
    let ratio = (max as f64 / min as f64).abs();
    (ratio - 1.0).abs() <= tolerance
}

/// Display value for `value` on an axis declared as `[min, max]`.
///
/// - `min >= 0`: percent of the full span.
/// - range symmetric about zero: percent of the half-span toward the extreme
///   with the value's sign, reported as a magnitude (`min` → 100%).
/// - otherwise: the raw value.
///
/// A value that is not exactly at an extreme never displays as 0% or 100%;
/// it is kept `extreme_margin_percent` away from them.
pub fn axis_reading(value: i32, min: i32, max: i32, cfg: &CalibrationConfig) -> AxisReading {
    let margin = cfg.extreme_margin_percent;

    if min >= 0 {
        if max <= min {
            return AxisReading::Raw(value);
        }
        let pct = 100.0 * (value as f64 - min as f64) / (max as f64 - min as f64);
        return AxisReading::Percent(clamp_percent(pct, value == min, value == max, margin));
    }

    if is_symmetric(min, max, cfg.symmetric_tolerance) {
        let (pct, extreme) = if value >= 0 {
            (100.0 * value as f64 / max as f64, value == max)
        } else {
            (100.0 * value as f64 / min as f64, value == min)
        };
        return AxisReading::Percent(clamp_percent(pct, value == 0, extreme, margin));
    }

    AxisReading::Raw(value)
}

fn clamp_percent(pct: f64, at_zero: bool, at_full: bool, margin: i32) -> i32 {
    if at_zero {
        return 0;
    }
    if at_full {
        return 100;
    }
    let margin = margin.clamp(0, 50);
    (pct.round() as i32).clamp(margin, 100 - margin)
}

/// Record one button sample. Returns the pressed state.
pub fn update_button(button: &mut ButtonInfo, raw: u8) -> bool {
    let pressed = raw & 0x80 != 0;
    button.seen_on |= pressed;
    button.seen_off |= !pressed;
    button.last_state = pressed;
    pressed
}

/// Record one hat sample. Returns the decoded direction, if any.
///
/// Direction bits are only recorded for four-way and eight-way hats, and only
/// for directions that kind can report.
pub fn update_hat(hat: &mut HatInfo, raw: i32) -> Option<HatDirection> {
    hat.last_raw = raw;
    let direction = HatDirection::decode(raw);
    if let (Some(dir), Some(mask)) = (direction, hat.kind.full_mask()) {
        hat.seen_flags |= dir.bit() & mask;
    }
    direction
}

/// Every direction applicable to `kind` is present in `seen`.
///
/// Always `false` for [`HatKind::Other`].
pub fn hat_fully_tested(kind: HatKind, seen: u16) -> bool {
    match kind.full_mask() {
        Some(mask) => seen & mask == mask,
        None => false,
    }
}

fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl AxisInfo {
    pub fn coverage(&self, cfg: &CalibrationConfig) -> Coverage {
        axis_coverage(self, cfg)
    }
}

impl HatInfo {
    pub fn fully_tested(&self) -> bool {
        hat_fully_tested(self.kind, self.seen_flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn cfg() -> CalibrationConfig {
        CalibrationConfig::default()
    }

    #[test]
    fn first_sample_narrows_both_extremes() {
        let mut axis = AxisInfo::new("X", Uuid::nil(), 0, 1000, 8);
        update_axis(&mut axis, 400);
        assert_eq!(axis.seen_min(), Some(400));
        assert_eq!(axis.seen_max(), Some(400));
        update_axis(&mut axis, 10);
        update_axis(&mut axis, 990);
        assert_eq!(axis.seen_min(), Some(10));
        assert_eq!(axis.seen_max(), Some(990));
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let mut axis = AxisInfo::new("X", Uuid::nil(), 0, 255, 8);
        assert_eq!(update_axis(&mut axis, 300), 255);
        assert_eq!(update_axis(&mut axis, -5), 0);
        assert_eq!(axis.seen_min(), Some(0));
        assert_eq!(axis.seen_max(), Some(255));
        assert_eq!(axis.coverage(&cfg()), Coverage::Full);
    }

    #[test]
    fn history_evicts_oldest() {
        let mut axis = AxisInfo::new("X", Uuid::nil(), 0, 100, 3);
        for v in [1, 2, 3, 4, 5] {
            update_axis(&mut axis, v);
        }
        assert_eq!(axis.history().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(axis.sample_count(), 5);
    }

    #[test]
    fn coverage_levels() {
        assert_eq!(classify_range(0, 1000, 0, 1000, 0.05), Coverage::Full);
        assert_eq!(classify_range(50, 950, 0, 1000, 0.05), Coverage::NearFull);
        assert_eq!(classify_range(51, 1000, 0, 1000, 0.05), Coverage::Default);
        assert_eq!(classify_range(0, 500, 0, 1000, 0.05), Coverage::Default);
    }

    #[test]
    fn unsampled_axis_is_default_even_when_degenerate() {
        let axis = AxisInfo::new("Z", Uuid::nil(), 7, 7, 1);
        assert_eq!(axis.coverage(&cfg()), Coverage::Default);
    }

    #[test]
    fn unsigned_percent() {
        let c = cfg();
        assert_eq!(axis_reading(0, 0, 255, &c), AxisReading::Percent(0));
        assert_eq!(axis_reading(255, 0, 255, &c), AxisReading::Percent(100));
        assert_eq!(axis_reading(1, 0, 1000, &c), AxisReading::Percent(1));
        assert_eq!(axis_reading(999, 0, 1000, &c), AxisReading::Percent(99));
        assert_eq!(axis_reading(500, 0, 1000, &c), AxisReading::Percent(50));
    }

    #[test]
    fn symmetric_percent_reports_magnitude() {
        let c = cfg();
        assert_eq!(axis_reading(-32768, -32768, 32767, &c), AxisReading::Percent(100));
        assert_eq!(axis_reading(32767, -32768, 32767, &c), AxisReading::Percent(100));
        assert_eq!(axis_reading(0, -32768, 32767, &c), AxisReading::Percent(0));
        assert_eq!(axis_reading(-16384, -32768, 32767, &c), AxisReading::Percent(50));
        assert_eq!(axis_reading(32766, -32768, 32767, &c), AxisReading::Percent(99));
        assert_eq!(axis_reading(-3, -32768, 32767, &c), AxisReading::Percent(1));
    }

    #[test]
    fn oversized_margin_does_not_panic() {
        let c = CalibrationConfig {
            extreme_margin_percent: 60,
            ..cfg()
        };
        assert_eq!(axis_reading(500, 0, 1000, &c), AxisReading::Percent(50));
        assert_eq!(axis_reading(1, 0, 1000, &c), AxisReading::Percent(50));
        let c = CalibrationConfig {
            extreme_margin_percent: -5,
            ..cfg()
        };
        assert_eq!(axis_reading(1, 0, 1000, &c), AxisReading::Percent(0));
    }

    #[test]
    fn lopsided_range_shows_raw() {
        assert_eq!(axis_reading(-20, -100, 1000, &cfg()), AxisReading::Raw(-20));
        assert_eq!(AxisReading::Raw(-20).to_string(), "-20");
        assert_eq!(AxisReading::Percent(42).to_string(), "42%");
    }

    #[test]
    fn buttons_are_monotonic() {
        let mut b = ButtonInfo::new("A", Uuid::nil());
        assert!(update_button(&mut b, 0x80));
        assert!(b.seen_on() && !b.seen_off());
        assert!(!update_button(&mut b, 0x00));
        assert!(b.fully_tested());
        update_button(&mut b, 0xFF);
        assert!(b.seen_on() && b.seen_off() && b.is_pressed());
    }

    #[test]
    fn other_hats_never_record_bits() {
        let mut hat = HatInfo::new("POV", Uuid::nil(), HatKind::Other);
        for dir in HatDirection::COMPASS {
            update_hat(&mut hat, dir.raw());
        }
        update_hat(&mut hat, -1);
        assert_eq!(hat.seen_flags(), 0);
        assert!(!hat.fully_tested());
    }

    #[test]
    fn four_way_ignores_diagonals() {
        let mut hat = HatInfo::new("POV", Uuid::nil(), HatKind::FourWay);
        for raw in [-1, 0, 4500, 9000, 18000, 27000] {
            update_hat(&mut hat, raw);
        }
        assert!(!hat.has_seen(HatDirection::NorthEast));
        assert!(hat.fully_tested());
    }
}
