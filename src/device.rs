//! Device abstraction.
//!
//! A [`Device`] is one attached controller reached through one transport. All
//! transports expose the same contract: an ordered control set whose byte
//! offsets describe the layout of the buffer returned by [`Device::state`].
//!
//! # Identity
//! [`DeviceId`] is transport-scoped:
//! - DirectInput devices are keyed by their 128-bit instance GUID.
//! - XInput devices are keyed by their user slot (`0..4`).

use crate::control::Controls;
use crate::metadata::DeviceMeta;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Transport a device was reached through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportKind {
    DirectInput,
    XInput,
}

/// Transport-scoped device identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceId {
    Instance(Uuid),
    Slot(u32),
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceId::Instance(guid) => write!(f, "dinput:{{{}}}", guid.hyphenated()),
            DeviceId::Slot(slot) => write!(f, "xinput:{slot}"),
        }
    }
}

pub trait Device {
    /// User-facing name. Trackers sort by this.
    fn name(&self) -> &str;

    fn id(&self) -> DeviceId;

    fn metadata(&self) -> DeviceMeta;

    fn controls(&self) -> &Controls;

    /// Mutable access for the calibration rules.
    fn controls_mut(&mut self) -> &mut Controls;

    /// Ask the transport to refresh its cached state, where it needs that.
    ///
    /// `false` means the state may be stale; callers render anyway.
    fn poll(&mut self) -> bool;

    /// Current raw state record.
    ///
    /// Empty when the device has no layout or the read failed; callers must
    /// check before decoding fields.
    fn state(&mut self) -> Vec<u8>;
}
