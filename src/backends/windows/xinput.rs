#![cfg(all(target_os = "windows", feature = "xinput"))]

//! Windows XInput transport.
//!
//! Many Xbox-style controllers show up both as a DirectInput/HID device and as
//! an XInput slot (0–3). XInput gives the standardized layout, so it is
//! tracked separately from DirectInput; the user sees both.

use crate::backends::gamepad::{GamepadReport, XInputApi};

// Windows XInput FFI.
use windows_sys::Win32::Foundation::ERROR_SUCCESS;
use windows_sys::Win32::UI::Input::XboxController::{XInputGetState, XINPUT_STATE};

/// The system XInput API. Stateless; copies are free.
#[derive(Clone, Copy, Debug, Default)]
pub struct XInput;

impl XInputApi for XInput {
    fn gamepad_state(&self, slot: u32) -> Option<GamepadReport> {
        // FFI struct: must be manually zeroed
        let mut state: XINPUT_STATE = unsafe { std::mem::zeroed() };

        // Returns ERROR_DEVICE_NOT_CONNECTED for empty slots.
        let res = unsafe { XInputGetState(slot, &mut state) };
        if res != ERROR_SUCCESS {
            return None;
        }

        let gp = state.Gamepad;
        Some(GamepadReport {
            buttons: gp.wButtons as u16,
            left_trigger: gp.bLeftTrigger,
            right_trigger: gp.bRightTrigger,
            thumb_lx: gp.sThumbLX,
            thumb_ly: gp.sThumbLY,
            thumb_rx: gp.sThumbRX,
            thumb_ry: gp.sThumbRY,
        })
    }
}
