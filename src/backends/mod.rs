//! Input backends for `stickcheck`.
//!
//! - [`legacy`]: DirectInput device model (dynamic record layout).
//! - [`gamepad`]: XInput device model (fixed layout re-encoded as a
//!   DirectInput-shaped record).
//! - [`virtual_input`]: in-memory implementations of both transports.
//! - `windows`: the real OS transports, plus a `WM_DEVICECHANGE` helper.
//!
//! # Feature flags
//! - **`directinput`**: enables the Windows DirectInput transport.
//! - **`xinput`**: enables the Windows XInput transport.
//!
//! The device models themselves are platform independent; only the OS glue is
//! gated.

pub mod gamepad;
pub mod legacy;
pub mod virtual_input;

#[cfg(target_os = "windows")]
#[cfg_attr(docsrs, doc(cfg(target_os = "windows")))]
pub mod windows;
