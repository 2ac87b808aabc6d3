//! Control descriptors.
//!
//! A device exposes an ordered set of axes, buttons and hats. Each descriptor
//! carries static data (name, type identity, declared range, byte offset into
//! the device's state record) plus "seen" calibration state that the
//! [`calibration`](crate::calibration) rules update as samples are read.
//!
//! ## Record conventions
//! - **Axes:** 4-byte little-endian signed field.
//! - **Hats:** 4-byte little-endian signed field, hundredths of a degree
//!   clockwise from north (`0..36000`), `-1` (or low word `0xFFFF`) = centered.
//! - **Buttons:** 1 byte, pressed when the high bit (`0x80`) is set.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Continuous control.
#[derive(Clone, Debug)]
pub struct AxisInfo {
    pub name: String,
    /// Object type identity (e.g. the DirectInput X-axis GUID). Nil when the
    /// transport has no such notion.
    pub guid: Uuid,
    /// Whether the transport needs an explicit poll to refresh this object.
    pub polled: bool,

    min: i32,
    max: i32,

    pub(crate) seen_min: i32,
    pub(crate) seen_max: i32,
    pub(crate) samples: u64,
    pub(crate) history: VecDeque<i32>,
    pub(crate) history_capacity: usize,

    pub(crate) offset: usize,
}

impl AxisInfo {
    /// New axis with a fixed declared range.
    ///
    /// Seen extremes start at the opposite ends of the declared range so the
    /// first recorded sample narrows both of them.
    pub fn new(name: impl Into<String>, guid: Uuid, min: i32, max: i32, history_capacity: usize) -> Self {
        Self {
            name: name.into(),
            guid,
            polled: false,
            min,
            max,
            seen_min: max,
            seen_max: min,
            samples: 0,
            history: VecDeque::with_capacity(history_capacity),
            history_capacity,
            offset: 0,
        }
    }

    pub(crate) fn at_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Declared (device-reported) minimum.
    pub fn declared_min(&self) -> i32 {
        self.min
    }

    /// Declared (device-reported) maximum.
    pub fn declared_max(&self) -> i32 {
        self.max
    }

    /// Lowest sample recorded so far, if any.
    pub fn seen_min(&self) -> Option<i32> {
        (self.samples > 0).then_some(self.seen_min)
    }

    /// Highest sample recorded so far, if any.
    pub fn seen_max(&self) -> Option<i32> {
        (self.samples > 0).then_some(self.seen_max)
    }

    /// Number of samples recorded over the device lifetime.
    pub fn sample_count(&self) -> u64 {
        self.samples
    }

    /// Rolling history, oldest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = i32> + '_ {
        self.history.iter().copied()
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    /// Byte offset of this axis in the device state record.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Two-state control.
#[derive(Clone, Debug, Default)]
pub struct ButtonInfo {
    pub name: String,
    pub guid: Uuid,
    pub polled: bool,

    pub(crate) seen_on: bool,
    pub(crate) seen_off: bool,
    pub(crate) last_state: bool,

    pub(crate) offset: usize,
}

impl ButtonInfo {
    pub fn new(name: impl Into<String>, guid: Uuid) -> Self {
        Self {
            name: name.into(),
            guid,
            ..Default::default()
        }
    }

    pub(crate) fn at_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn seen_on(&self) -> bool {
        self.seen_on
    }

    pub fn seen_off(&self) -> bool {
        self.seen_off
    }

    /// Pressed state from the most recent sample.
    pub fn is_pressed(&self) -> bool {
        self.last_state
    }

    /// Both states have been observed.
    pub fn fully_tested(&self) -> bool {
        self.seen_on && self.seen_off
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Angular resolution of a hat, derived from its reported granularity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HatKind {
    FourWay,
    EightWay,
    /// Any other resolution. No direction bookkeeping is done for these.
    Other,
}

impl HatKind {
    /// Classify from a granularity in hundredths of a degree.
    pub fn from_granularity(granularity: u32) -> Self {
        match granularity {
            4500 => HatKind::EightWay,
            9000 => HatKind::FourWay,
            _ => HatKind::Other,
        }
    }

    /// Set of direction bits a fully exercised hat of this kind has seen.
    pub fn full_mask(self) -> Option<u16> {
        let cardinals = HatDirection::Center.bit()
            | HatDirection::North.bit()
            | HatDirection::East.bit()
            | HatDirection::South.bit()
            | HatDirection::West.bit();
        match self {
            HatKind::FourWay => Some(cardinals),
            HatKind::EightWay => Some(
                cardinals
                    | HatDirection::NorthEast.bit()
                    | HatDirection::SouthEast.bit()
                    | HatDirection::SouthWest.bit()
                    | HatDirection::NorthWest.bit(),
            ),
            HatKind::Other => None,
        }
    }
}

/// One of the nine symbolic hat positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HatDirection {
    Center,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl HatDirection {
    /// Compass points in clockwise order starting at north.
    pub const COMPASS: [HatDirection; 8] = [
        HatDirection::North,
        HatDirection::NorthEast,
        HatDirection::East,
        HatDirection::SouthEast,
        HatDirection::South,
        HatDirection::SouthWest,
        HatDirection::West,
        HatDirection::NorthWest,
    ];

    /// Hundredths of a degree between neighbouring compass points.
    pub const STEP: i32 = 4500;

    /// Raw value reported for a centered hat.
    pub const CENTERED: i32 = -1;

    /// Decode a raw hat value.
    ///
    /// Returns `None` for values that are not exactly a compass point, which
    /// is what hats with a finer resolution report most of the time.
    pub fn decode(raw: i32) -> Option<Self> {
        if raw == Self::CENTERED || raw & 0xFFFF == 0xFFFF {
            return Some(HatDirection::Center);
        }
        if !(0..36000).contains(&raw) || raw % Self::STEP != 0 {
            return None;
        }
        Some(Self::COMPASS[(raw / Self::STEP) as usize])
    }

    /// Raw value a hat reports in this position.
    pub fn raw(self) -> i32 {
        match self {
            HatDirection::Center => Self::CENTERED,
            dir => {
                let idx = Self::COMPASS.iter().position(|d| *d == dir).unwrap_or(0);
                idx as i32 * Self::STEP
            }
        }
    }

    /// Bit recorded in [`HatInfo::seen_flags`] for this position.
    pub fn bit(self) -> u16 {
        match self {
            HatDirection::Center => 1,
            HatDirection::North => 1 << 1,
            HatDirection::NorthEast => 1 << 2,
            HatDirection::East => 1 << 3,
            HatDirection::SouthEast => 1 << 4,
            HatDirection::South => 1 << 5,
            HatDirection::SouthWest => 1 << 6,
            HatDirection::West => 1 << 7,
            HatDirection::NorthWest => 1 << 8,
        }
    }
}

/// POV / D-pad control.
#[derive(Clone, Debug)]
pub struct HatInfo {
    pub name: String,
    pub guid: Uuid,
    pub kind: HatKind,
    pub polled: bool,

    /// Only meaningful for [`HatKind::FourWay`] and [`HatKind::EightWay`].
    pub(crate) seen_flags: u16,
    pub(crate) last_raw: i32,

    pub(crate) offset: usize,
}

impl HatInfo {
    pub fn new(name: impl Into<String>, guid: Uuid, kind: HatKind) -> Self {
        Self {
            name: name.into(),
            guid,
            kind,
            polled: false,
            seen_flags: 0,
            last_raw: HatDirection::CENTERED,
            offset: 0,
        }
    }

    pub(crate) fn at_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn seen_flags(&self) -> u16 {
        self.seen_flags
    }

    pub fn has_seen(&self, direction: HatDirection) -> bool {
        self.seen_flags & direction.bit() != 0
    }

    /// Raw value from the most recent sample.
    pub fn last_raw(&self) -> i32 {
        self.last_raw
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// The ordered control set of one device.
#[derive(Clone, Debug, Default)]
pub struct Controls {
    pub axes: Vec<AxisInfo>,
    pub buttons: Vec<ButtonInfo>,
    pub hats: Vec<HatInfo>,
}

impl Controls {
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty() && self.buttons.is_empty() && self.hats.is_empty()
    }

    /// Total number of descriptors.
    pub fn len(&self) -> usize {
        self.axes.len() + self.buttons.len() + self.hats.len()
    }

    /// Any descriptor requires explicit polling.
    pub fn needs_polling(&self) -> bool {
        self.axes.iter().any(|a| a.polled)
            || self.buttons.iter().any(|b| b.polled)
            || self.hats.iter().any(|h| h.polled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granularity_classification() {
        assert_eq!(HatKind::from_granularity(4500), HatKind::EightWay);
        assert_eq!(HatKind::from_granularity(9000), HatKind::FourWay);
        assert_eq!(HatKind::from_granularity(1), HatKind::Other);
        assert_eq!(HatKind::from_granularity(0), HatKind::Other);
    }

    #[test]
    fn decode_compass_points() {
        assert_eq!(HatDirection::decode(0), Some(HatDirection::North));
        assert_eq!(HatDirection::decode(4500), Some(HatDirection::NorthEast));
        assert_eq!(HatDirection::decode(31500), Some(HatDirection::NorthWest));
        assert_eq!(HatDirection::decode(-1), Some(HatDirection::Center));
        assert_eq!(HatDirection::decode(0xFFFF), Some(HatDirection::Center));
        assert_eq!(HatDirection::decode(36000), None);
        assert_eq!(HatDirection::decode(1234), None);
    }

    #[test]
    fn raw_matches_decode() {
        for dir in HatDirection::COMPASS {
            assert_eq!(HatDirection::decode(dir.raw()), Some(dir));
        }
        assert_eq!(HatDirection::Center.raw(), -1);
    }

    #[test]
    fn masks() {
        assert_eq!(HatKind::FourWay.full_mask(), Some(0b0_1010_1011));
        assert_eq!(HatKind::EightWay.full_mask(), Some(0x1FF));
        assert_eq!(HatKind::Other.full_mask(), None);
    }

    #[test]
    fn fresh_axis_has_no_seen_range() {
        let axis = AxisInfo::new("X", Uuid::nil(), 0, 65535, 4);
        assert_eq!(axis.seen_min(), None);
        assert_eq!(axis.seen_max(), None);
        assert_eq!(axis.history().len(), 0);
    }
}
