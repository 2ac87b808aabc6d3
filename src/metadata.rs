//! Device metadata snapshot.
//!
//! [`DeviceMeta`] is a lightweight, cloneable description of a device suitable
//! for display and logging. Backends populate what they know; unknown fields
//! remain `None`.
//!
//! # Conventions
//! - `instance` is the DirectInput instance GUID, or the fixed synthetic GUID
//!   of an XInput slot. It is display identity; tracking uses
//!   [`DeviceId`](crate::device::DeviceId).
//! - `product` is the DirectInput product GUID (VID/PID are packed into it).

use crate::device::TransportKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot of metadata describing a single device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceMeta {
    pub transport: TransportKind,

    /// Instance identity (real or synthetic).
    pub instance: Option<Uuid>,

    /// DirectInput product GUID, if known.
    pub product: Option<Uuid>,

    /// Product name reported by the driver.
    pub product_name: Option<String>,

    /// Instance name reported by the driver (DirectInput only).
    pub instance_name: Option<String>,

    /// XInput user slot.
    pub slot: Option<u32>,

    /// At least one object needs an explicit poll before reads.
    pub needs_polling: bool,

    /// Size of the state record in bytes.
    pub record_size: usize,
}

impl DeviceMeta {
    pub fn new(transport: TransportKind) -> Self {
        Self {
            transport,
            instance: None,
            product: None,
            product_name: None,
            instance_name: None,
            slot: None,
            needs_polling: false,
            record_size: 0,
        }
    }

    /// Vendor and product IDs packed into a DirectInput product GUID.
    ///
    /// DirectInput stores `PID << 16 | VID` in the first GUID field for HID
    /// devices.
    pub fn vid_pid(&self) -> Option<(u16, u16)> {
        let product = self.product?;
        let data1 = product.as_fields().0;
        Some(((data1 & 0xFFFF) as u16, (data1 >> 16) as u16))
    }
}
