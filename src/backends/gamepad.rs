//! XInput device model.
//!
//! XInput reports one fixed gamepad layout. [`XInputDevice`] re-encodes each
//! report into a DirectInput-shaped state record so the rest of the crate
//! treats both transports the same way.
//!
//! ## Record layout (40 bytes)
//! | Offset | Field | Encoding |
//! |---|---|---|
//! | 0, 4, 8, 12 | Left X, Left Y, Right X, Right Y | i32, `-32768..=32767` |
//! | 16, 20 | Left / Right trigger | i32, `0..=255` |
//! | 24 | D-pad hat | i32 hundredths of a degree, `-1` centered |
//! | 28..38 | A, B, X, Y, LB, RB, LS, RS, Back, Start | u8, `0xFF` pressed |
//!
//! Stick Y axes are passed through unmodified (up is positive).
//!
//! XInput has no acquire/poll step: [`Device::poll`] is a no-op and every
//! [`Device::state`] call queries the slot afresh.

use crate::control::{AxisInfo, ButtonInfo, Controls, HatDirection, HatInfo, HatKind};
use crate::device::{Device, DeviceId, TransportKind};
use crate::error::{Error, Result};
use crate::layout::{self, RecordWriter};
use crate::metadata::DeviceMeta;
use crate::tracker::DeviceSource;
use uuid::Uuid;

/// Number of XInput user slots.
pub const MAX_SLOTS: u32 = 4;

/// `XINPUT_GAMEPAD.wButtons` bits.
pub mod buttons {
    pub const DPAD_UP: u16 = 0x0001;
    pub const DPAD_DOWN: u16 = 0x0002;
    pub const DPAD_LEFT: u16 = 0x0004;
    pub const DPAD_RIGHT: u16 = 0x0008;
    pub const START: u16 = 0x0010;
    pub const BACK: u16 = 0x0020;
    pub const LEFT_THUMB: u16 = 0x0040;
    pub const RIGHT_THUMB: u16 = 0x0080;
    pub const LEFT_SHOULDER: u16 = 0x0100;
    pub const RIGHT_SHOULDER: u16 = 0x0200;
    pub const A: u16 = 0x1000;
    pub const B: u16 = 0x2000;
    pub const X: u16 = 0x4000;
    pub const Y: u16 = 0x8000;
}

/// Offsets into the emulated record.
pub mod record {
    pub const LEFT_X: usize = 0;
    pub const LEFT_Y: usize = 4;
    pub const RIGHT_X: usize = 8;
    pub const RIGHT_Y: usize = 12;
    pub const LEFT_TRIGGER: usize = 16;
    pub const RIGHT_TRIGGER: usize = 20;
    pub const HAT: usize = 24;
    pub const FIRST_BUTTON: usize = 28;
    /// 38 bytes of fields, padded to a DWORD boundary.
    pub const SIZE: usize = 40;
}

/// One `XINPUT_GAMEPAD` report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GamepadReport {
    pub buttons: u16,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub thumb_lx: i16,
    pub thumb_ly: i16,
    pub thumb_rx: i16,
    pub thumb_ry: i16,
}

/// XInput primitives.
pub trait XInputApi {
    /// Current report for `slot`, or `None` if nothing is connected there.
    fn gamepad_state(&self, slot: u32) -> Option<GamepadReport>;
}

/// Axis name, declared range, record offset.
const AXES: [(&str, i32, i32, usize); 6] = [
    ("Left Thumb X", -32768, 32767, record::LEFT_X),
    ("Left Thumb Y", -32768, 32767, record::LEFT_Y),
    ("Right Thumb X", -32768, 32767, record::RIGHT_X),
    ("Right Thumb Y", -32768, 32767, record::RIGHT_Y),
    ("Left Trigger", 0, 255, record::LEFT_TRIGGER),
    ("Right Trigger", 0, 255, record::RIGHT_TRIGGER),
];

/// Button name and mask, in record order starting at [`record::FIRST_BUTTON`].
const BUTTONS: [(&str, u16); 10] = [
    ("A", buttons::A),
    ("B", buttons::B),
    ("X", buttons::X),
    ("Y", buttons::Y),
    ("Left Shoulder", buttons::LEFT_SHOULDER),
    ("Right Shoulder", buttons::RIGHT_SHOULDER),
    ("Left Stick", buttons::LEFT_THUMB),
    ("Right Stick", buttons::RIGHT_THUMB),
    ("Back", buttons::BACK),
    ("Start", buttons::START),
];

/// Fixed display identities, one per slot.
const SLOT_GUIDS: [Uuid; MAX_SLOTS as usize] = [
    Uuid::from_u128(0xBC4F9F2C_3AD4_492D_AD19_91ED4230BA7D),
    Uuid::from_u128(0x7F043942_AADC_4A39_A72E_00DE774EEDC0),
    Uuid::from_u128(0xE1E1B5AC_7246_4478_A61F_945DA8E242A9),
    Uuid::from_u128(0xBBFF57E9_12E1_4433_9A1E_6CDBEE7AA122),
];

/// Synthetic identity for an XInput slot.
pub fn slot_guid(slot: u32) -> Option<Uuid> {
    SLOT_GUIDS.get(slot as usize).copied()
}

/// Translate D-pad bits into a hat value (hundredths of a degree, `-1` centered).
///
/// Diagonals need exactly two orthogonal bits; contradictory combinations
/// (up+down, left+right) read as centered.
pub fn dpad_to_hat(buttons: u16) -> i32 {
    let up = buttons & buttons::DPAD_UP != 0;
    let down = buttons & buttons::DPAD_DOWN != 0;
    let left = buttons & buttons::DPAD_LEFT != 0;
    let right = buttons & buttons::DPAD_RIGHT != 0;

    let direction = match (up, down, left, right) {
        (true, false, false, false) => HatDirection::North,
        (true, false, false, true) => HatDirection::NorthEast,
        (false, false, false, true) => HatDirection::East,
        (false, true, false, true) => HatDirection::SouthEast,
        (false, true, false, false) => HatDirection::South,
        (false, true, true, false) => HatDirection::SouthWest,
        (false, false, true, false) => HatDirection::West,
        (true, false, true, false) => HatDirection::NorthWest,
        _ => HatDirection::Center,
    };
    direction.raw()
}

/// Encode a report into the emulated record.
pub fn emulate_record(report: &GamepadReport) -> Vec<u8> {
    let mut w = RecordWriter::new(record::SIZE);

    w.put_i32(record::LEFT_X, report.thumb_lx as i32);
    w.put_i32(record::LEFT_Y, report.thumb_ly as i32);
    w.put_i32(record::RIGHT_X, report.thumb_rx as i32);
    w.put_i32(record::RIGHT_Y, report.thumb_ry as i32);
    w.put_i32(record::LEFT_TRIGGER, report.left_trigger as i32);
    w.put_i32(record::RIGHT_TRIGGER, report.right_trigger as i32);
    w.put_i32(record::HAT, dpad_to_hat(report.buttons));

    for (i, &(_, mask)) in BUTTONS.iter().enumerate() {
        let byte = if report.buttons & mask != 0 { 0xFF } else { 0x00 };
        w.put_u8(record::FIRST_BUTTON + i, byte);
    }

    w.finish()
}

/// An XInput-backed [`Device`] (slot `0..4`).
pub struct XInputDevice<A: XInputApi> {
    api: A,
    slot: u32,
    name: String,
    controls: Controls,
    connected: bool,
}

impl<A: XInputApi> XInputDevice<A> {
    /// Build the fixed control set for `slot`.
    ///
    /// Fails with [`Error::NotConnected`] if the slot is empty.
    pub fn new(api: A, slot: u32, history_capacity: usize) -> Result<Self> {
        if slot >= MAX_SLOTS || api.gamepad_state(slot).is_none() {
            return Err(Error::NotConnected { slot });
        }

        let axes = AXES
            .iter()
            .map(|&(name, min, max, offset)| {
                AxisInfo::new(name, Uuid::nil(), min, max, history_capacity).at_offset(offset)
            })
            .collect();
        let buttons = BUTTONS
            .iter()
            .enumerate()
            .map(|(i, &(name, _))| ButtonInfo::new(name, Uuid::nil()).at_offset(record::FIRST_BUTTON + i))
            .collect();
        let hats = vec![HatInfo::new("D-Pad", Uuid::nil(), HatKind::EightWay).at_offset(record::HAT)];

        debug_assert_eq!(
            layout::pad_to_dword(record::FIRST_BUTTON + BUTTONS.len()),
            record::SIZE
        );

        Ok(Self {
            api,
            slot,
            name: format!("XInput {}", slot + 1),
            controls: Controls { axes, buttons, hats },
            connected: true,
        })
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }
}

impl<A: XInputApi> Device for XInputDevice<A> {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> DeviceId {
        DeviceId::Slot(self.slot)
    }

    fn metadata(&self) -> DeviceMeta {
        DeviceMeta {
            instance: slot_guid(self.slot),
            product_name: Some(self.name.clone()),
            slot: Some(self.slot),
            record_size: record::SIZE,
            ..DeviceMeta::new(TransportKind::XInput)
        }
    }

    fn controls(&self) -> &Controls {
        &self.controls
    }

    fn controls_mut(&mut self) -> &mut Controls {
        &mut self.controls
    }

    fn poll(&mut self) -> bool {
        true
    }

    fn state(&mut self) -> Vec<u8> {
        match self.api.gamepad_state(self.slot) {
            Some(report) => {
                if !self.connected {
                    log::debug!("xinput slot {} reconnected", self.slot);
                    self.connected = true;
                }
                emulate_record(&report)
            }
            None => {
                if self.connected {
                    log::debug!("xinput slot {} disconnected", self.slot);
                    self.connected = false;
                }
                Vec::new()
            }
        }
    }
}

/// [`DeviceSource`] over the XInput slots, keyed by slot index.
pub struct XInputSource<A: XInputApi + Clone> {
    api: A,
    history_capacity: usize,
}

impl<A: XInputApi + Clone> XInputSource<A> {
    pub fn new(api: A, history_capacity: usize) -> Self {
        Self {
            api,
            history_capacity,
        }
    }
}

impl<A: XInputApi + Clone + 'static> DeviceSource for XInputSource<A> {
    type Key = u32;
    type Instance = u32;
    type Device = XInputDevice<A>;

    /// Slots with a connected controller.
    fn enumerate(&mut self) -> Result<Vec<u32>> {
        Ok((0..MAX_SLOTS)
            .filter(|&slot| self.api.gamepad_state(slot).is_some())
            .collect())
    }

    fn key(slot: &u32) -> u32 {
        *slot
    }

    fn create(&mut self, slot: &u32) -> Result<Self::Device> {
        XInputDevice::new(self.api.clone(), *slot, self.history_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StateRecord;

    #[test]
    fn cardinals_and_diagonals() {
        use buttons::*;
        assert_eq!(dpad_to_hat(0), -1);
        assert_eq!(dpad_to_hat(DPAD_UP), 0);
        assert_eq!(dpad_to_hat(DPAD_UP | DPAD_RIGHT), 4500);
        assert_eq!(dpad_to_hat(DPAD_RIGHT), 9000);
        assert_eq!(dpad_to_hat(DPAD_DOWN | DPAD_RIGHT), 13500);
        assert_eq!(dpad_to_hat(DPAD_DOWN), 18000);
        assert_eq!(dpad_to_hat(DPAD_DOWN | DPAD_LEFT), 22500);
        assert_eq!(dpad_to_hat(DPAD_LEFT), 27000);
        assert_eq!(dpad_to_hat(DPAD_UP | DPAD_LEFT), 31500);
    }

    #[test]
    fn contradictions_are_centered() {
        use buttons::*;
        assert_eq!(dpad_to_hat(DPAD_UP | DPAD_DOWN), -1);
        assert_eq!(dpad_to_hat(DPAD_LEFT | DPAD_RIGHT), -1);
        assert_eq!(dpad_to_hat(DPAD_UP | DPAD_LEFT | DPAD_RIGHT), -1);
    }

    #[test]
    fn dpad_bits_do_not_leak_into_buttons() {
        let report = GamepadReport {
            buttons: buttons::DPAD_UP | buttons::START,
            ..Default::default()
        };
        let bytes = emulate_record(&report);
        let rec = StateRecord::new(&bytes);
        let pressed: Vec<_> = (0..BUTTONS.len())
            .filter(|i| rec.read_u8(record::FIRST_BUTTON + i) == Some(0xFF))
            .map(|i| BUTTONS[i].0)
            .collect();
        assert_eq!(pressed, vec!["Start"]);
        assert_eq!(rec.read_i32(record::HAT), Some(0));
    }

    #[test]
    fn slot_guids_are_distinct() {
        let guids: Vec<_> = (0..MAX_SLOTS).filter_map(slot_guid).collect();
        assert_eq!(guids.len(), 4);
        for (i, a) in guids.iter().enumerate() {
            assert!(guids[i + 1..].iter().all(|b| b != a));
        }
        assert_eq!(slot_guid(MAX_SLOTS), None);
    }

    #[test]
    fn slot_guids_match_known_identities() {
        assert_eq!(
            slot_guid(0).map(|g| g.hyphenated().to_string()),
            Some("bc4f9f2c-3ad4-492d-ad19-91ed4230ba7d".to_string())
        );
        assert_eq!(
            slot_guid(3).map(|g| g.hyphenated().to_string()),
            Some("bbff57e9-12e1-4433-9a1e-6cdbee7aa122".to_string())
        );
    }
}
