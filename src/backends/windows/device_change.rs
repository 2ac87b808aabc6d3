#![cfg(target_os = "windows")]

//! `WM_DEVICECHANGE` recognition.
//!
//! The host application owns the window and its message loop. It forwards
//! messages here and marks the trackers stale when this returns `true`:
//!
//! ```ignore
//! if stickcheck::backends::windows::is_device_change(msg, wparam) {
//!     for h in &stale_handles {
//!         h.mark();
//!     }
//! }
//! ```

use windows_sys::Win32::UI::WindowsAndMessaging::WM_DEVICECHANGE;

// Local constants (avoid relying on module exports that vary by windows-sys version)
const DBT_DEVNODES_CHANGED: usize = 0x0007;
const DBT_DEVICEARRIVAL: usize = 0x8000;
const DBT_DEVICEREMOVECOMPLETE: usize = 0x8004;

/// `msg`/`wparam` describe a device topology change.
pub fn is_device_change(msg: u32, wparam: usize) -> bool {
    msg == WM_DEVICECHANGE
        && matches!(
            wparam,
            DBT_DEVNODES_CHANGED | DBT_DEVICEARRIVAL | DBT_DEVICEREMOVECOMPLETE
        )
}
