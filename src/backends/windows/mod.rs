#![cfg(target_os = "windows")]

//! Windows transports.
//!
//! - **DirectInput 8** ([`DirectInput`]) for every attached game controller
//! - **XInput** ([`XInput`]) for Xbox-style controllers in slots 0–3
//! - **WM_DEVICECHANGE** recognition for hot-plug ([`is_device_change`])
//!
//! Most users should not interact with these directly. Prefer
//! [`SystemManager::discover`](crate::manager::SystemManager::discover), then
//! `sample_all()` once per frame.
//!
//! Window creation and the message loop belong to the host application; it
//! forwards messages to [`is_device_change`] and marks the trackers stale.

pub mod device_change;
#[cfg(feature = "directinput")]
pub mod dinput;
#[cfg(feature = "xinput")]
pub mod xinput;

pub use device_change::is_device_change;
#[cfg(feature = "directinput")]
pub use dinput::{DirectInput, DirectInputJoystick};
#[cfg(feature = "xinput")]
pub use xinput::XInput;
