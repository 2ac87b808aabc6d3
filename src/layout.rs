//! Packed state-record layout.
//!
//! DirectInput lets the caller choose the binary layout `GetDeviceState` fills.
//! This module builds that layout from a device's enumerated controls and
//! decodes records field by field.
//!
//! ## Layout rules
//! 1. Axes first, 4 bytes each.
//! 2. Hats next, 4 bytes each. DirectInput requires POV fields to be
//!    DWORD-aligned, so they must precede the 1-byte button fields.
//! 3. Buttons last, 1 byte each.
//! 4. Total size rounded up to a multiple of 4.
//!
//! Records are decoded with explicit bounds-checked little-endian reads; no
//! field is ever read by casting the buffer.

use crate::control::Controls;
use uuid::Uuid;

/// DirectInput `GUID_XAxis`.
pub const GUID_X_AXIS: Uuid = Uuid::from_u128(0xA36D02E0_C9F3_11CF_BFC7_444553540000);
/// DirectInput `GUID_YAxis`.
pub const GUID_Y_AXIS: Uuid = Uuid::from_u128(0xA36D02E1_C9F3_11CF_BFC7_444553540000);
/// DirectInput `GUID_ZAxis`.
pub const GUID_Z_AXIS: Uuid = Uuid::from_u128(0xA36D02E2_C9F3_11CF_BFC7_444553540000);
/// DirectInput `GUID_RxAxis`.
pub const GUID_RX_AXIS: Uuid = Uuid::from_u128(0xA36D02F4_C9F3_11CF_BFC7_444553540000);
/// DirectInput `GUID_RyAxis`.
pub const GUID_RY_AXIS: Uuid = Uuid::from_u128(0xA36D02F5_C9F3_11CF_BFC7_444553540000);
/// DirectInput `GUID_RzAxis`.
pub const GUID_RZ_AXIS: Uuid = Uuid::from_u128(0xA36D02E3_C9F3_11CF_BFC7_444553540000);
/// DirectInput `GUID_Slider`.
pub const GUID_SLIDER: Uuid = Uuid::from_u128(0xA36D02E4_C9F3_11CF_BFC7_444553540000);

/// Preferred axis order.
pub const AXIS_ORDER: [Uuid; 7] = [
    GUID_X_AXIS,
    GUID_Y_AXIS,
    GUID_Z_AXIS,
    GUID_RX_AXIS,
    GUID_RY_AXIS,
    GUID_RZ_AXIS,
    GUID_SLIDER,
];

/// Bytes per axis / hat field.
pub const WIDE_FIELD: usize = 4;
/// Bytes per button field.
pub const BUTTON_FIELD: usize = 1;

/// Category of an object in a data format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Axis,
    Button,
    Hat,
}

/// One entry of the object/offset table handed to the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectFormat {
    /// Object type identity; the transport binds this entry to the next
    /// unassigned object of the same kind and type.
    pub guid: Uuid,
    pub kind: ObjectKind,
    pub offset: u32,
}

/// A complete record layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataFormat {
    pub objects: Vec<ObjectFormat>,
    /// Total record size in bytes (multiple of 4).
    pub size: u32,
}

/// Reorder axes by their position in [`AXIS_ORDER`].
///
/// The sort is stable: recognized axes are ordered among themselves and axes
/// with other identities keep their enumeration order, after the recognized
/// ones.
pub fn sort_axes_canonically(controls: &mut Controls) {
    controls.axes.sort_by_key(|axis| {
        AXIS_ORDER
            .iter()
            .position(|g| *g == axis.guid)
            .unwrap_or(AXIS_ORDER.len())
    });
}

/// Assign byte offsets to every control and build the matching format.
pub fn assign_offsets(controls: &mut Controls) -> DataFormat {
    let mut objects = Vec::with_capacity(controls.len());
    let mut offset = 0usize;

    for axis in &mut controls.axes {
        axis.offset = offset;
        objects.push(ObjectFormat {
            guid: axis.guid,
            kind: ObjectKind::Axis,
            offset: offset as u32,
        });
        offset += WIDE_FIELD;
    }
    for hat in &mut controls.hats {
        hat.offset = offset;
        objects.push(ObjectFormat {
            guid: hat.guid,
            kind: ObjectKind::Hat,
            offset: offset as u32,
        });
        offset += WIDE_FIELD;
    }
    for button in &mut controls.buttons {
        button.offset = offset;
        objects.push(ObjectFormat {
            guid: button.guid,
            kind: ObjectKind::Button,
            offset: offset as u32,
        });
        offset += BUTTON_FIELD;
    }

    DataFormat {
        objects,
        size: pad_to_dword(offset) as u32,
    }
}

/// Round `len` up to the next multiple of 4.
pub fn pad_to_dword(len: usize) -> usize {
    (len + 3) & !3
}

/// Read-only view of a state record.
#[derive(Clone, Copy, Debug)]
pub struct StateRecord<'a>(&'a [u8]);

impl<'a> StateRecord<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 4-byte little-endian signed field at `offset`, if in bounds.
    pub fn read_i32(&self, offset: usize) -> Option<i32> {
        let end = offset.checked_add(WIDE_FIELD)?;
        let bytes = self.0.get(offset..end)?;
        Some(i32::from_le_bytes(bytes.try_into().ok()?))
    }

    /// 1-byte field at `offset`, if in bounds.
    pub fn read_u8(&self, offset: usize) -> Option<u8> {
        self.0.get(offset).copied()
    }
}

/// Builds a state record in place.
#[derive(Clone, Debug)]
pub struct RecordWriter {
    buf: Vec<u8>,
}

impl RecordWriter {
    /// Zeroed record of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self { buf: vec![0; size] }
    }

    /// Write a 4-byte field. Returns `false` (and writes nothing) if out of bounds.
    pub fn put_i32(&mut self, offset: usize, value: i32) -> bool {
        match offset
            .checked_add(WIDE_FIELD)
            .and_then(|end| self.buf.get_mut(offset..end))
        {
            Some(slot) => {
                slot.copy_from_slice(&value.to_le_bytes());
                true
            }
            None => false,
        }
    }

    /// Write a 1-byte field. Returns `false` if out of bounds.
    pub fn put_u8(&mut self, offset: usize, value: u8) -> bool {
        match self.buf.get_mut(offset) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
