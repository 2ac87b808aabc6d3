//! Per-frame device sampling.
//!
//! [`sample_device`] is what a presentation loop calls once per frame for each
//! tracked device: poll, read the state record, decode every control at its
//! offset and run it through the calibration rules. The result is an owned,
//! serializable [`DeviceSnapshot`] a UI can render without touching the
//! device again.
//!
//! # Semantics
//! - Calibration state is updated as a side effect of sampling.
//! - An empty state record yields a snapshot with `readable == false` and no
//!   controls; nothing is updated. The UI shows "could not read controller
//!   state" for those.
//! - A field whose offset falls outside the record is skipped.

use crate::calibration::{self, AxisReading, Coverage};
use crate::config::CalibrationConfig;
use crate::control::{HatDirection, HatKind};
use crate::device::{Device, DeviceId};
use crate::layout::StateRecord;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisSnapshot {
    pub name: String,
    pub value: i32,
    pub reading: AxisReading,
    pub min: i32,
    pub max: i32,
    pub seen_min: Option<i32>,
    pub seen_max: Option<i32>,
    pub coverage: Coverage,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ButtonSnapshot {
    pub name: String,
    pub pressed: bool,
    pub seen_on: bool,
    pub seen_off: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HatSnapshot {
    pub name: String,
    pub kind: HatKind,
    pub raw: i32,
    pub direction: Option<HatDirection>,
    pub seen_flags: u16,
    pub fully_tested: bool,
}

/// One device, one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub id: DeviceId,
    pub name: String,
    /// `false` when the state record could not be read this frame.
    pub readable: bool,
    /// Result of the explicit poll (always `true` for transports without one).
    pub polled: bool,
    pub axes: Vec<AxisSnapshot>,
    pub buttons: Vec<ButtonSnapshot>,
    pub hats: Vec<HatSnapshot>,
}

impl DeviceSnapshot {
    /// Every control has been fully exercised.
    ///
    /// `Other`-kind hats can never be fully tested, so devices with one never
    /// report `true`.
    pub fn fully_tested(&self) -> bool {
        self.readable
            && self.axes.iter().all(|a| a.coverage == Coverage::Full)
            && self.buttons.iter().all(|b| b.seen_on && b.seen_off)
            && self.hats.iter().all(|h| h.fully_tested)
    }
}

/// Sample one device and update its calibration state.
pub fn sample_device(device: &mut dyn Device, cfg: &CalibrationConfig) -> DeviceSnapshot {
    let polled = device.poll();
    let bytes = device.state();

    let mut snap = DeviceSnapshot {
        id: device.id(),
        name: device.name().to_string(),
        readable: !bytes.is_empty(),
        polled,
        axes: Vec::new(),
        buttons: Vec::new(),
        hats: Vec::new(),
    };
    if bytes.is_empty() {
        return snap;
    }

    let record = StateRecord::new(&bytes);
    let controls = device.controls_mut();

    for axis in &mut controls.axes {
        let Some(raw) = record.read_i32(axis.offset()) else {
            log::debug!("{}: axis {} outside record", snap.name, axis.name);
            continue;
        };
        let value = calibration::update_axis(axis, raw);
        snap.axes.push(AxisSnapshot {
            name: axis.name.clone(),
            value,
            reading: calibration::axis_reading(value, axis.declared_min(), axis.declared_max(), cfg),
            min: axis.declared_min(),
            max: axis.declared_max(),
            seen_min: axis.seen_min(),
            seen_max: axis.seen_max(),
            coverage: calibration::axis_coverage(axis, cfg),
        });
    }

    for hat in &mut controls.hats {
        let Some(raw) = record.read_i32(hat.offset()) else {
            log::debug!("{}: hat {} outside record", snap.name, hat.name);
            continue;
        };
        let direction = calibration::update_hat(hat, raw);
        snap.hats.push(HatSnapshot {
            name: hat.name.clone(),
            kind: hat.kind,
            raw,
            direction,
            seen_flags: hat.seen_flags(),
            fully_tested: hat.fully_tested(),
        });
    }

    for button in &mut controls.buttons {
        let Some(raw) = record.read_u8(button.offset()) else {
            log::debug!("{}: button {} outside record", snap.name, button.name);
            continue;
        };
        let pressed = calibration::update_button(button, raw);
        snap.buttons.push(ButtonSnapshot {
            name: button.name.clone(),
            pressed,
            seen_on: button.seen_on(),
            seen_off: button.seen_off(),
        });
    }

    snap
}

/// Owned snapshot of every device sampled in one frame, in display order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot(pub Vec<DeviceSnapshot>);

impl Snapshot {
    pub fn get(&self, id: DeviceId) -> Option<&DeviceSnapshot> {
        self.0.iter().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceSnapshot> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<DeviceSnapshot> {
        self.0
    }

    /// Pretty JSON rendering, for diagnostics output.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
