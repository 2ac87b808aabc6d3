//! In-memory transports.
//!
//! [`VirtualDirectInput`] and [`VirtualXInput`] implement the DirectInput and
//! XInput primitive traits without touching the OS. Clones share state, so a
//! test (or demo) keeps one clone to plug/unplug devices and drive control
//! values while a tracker owns another.
//!
//! The DirectInput side binds a registered data format the way DirectInput
//! does: each format entry takes the next unbound object of the same kind and
//! type GUID.

use crate::backends::gamepad::{GamepadReport, XInputApi, MAX_SLOTS};
use crate::backends::legacy::{DirectInputApi, DirectInputHandle, InstanceInfo, ObjectInstance};
use crate::error::{Error, Result};
use crate::layout::{DataFormat, ObjectKind, RecordWriter};
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

/// Error code reported by virtual primitives (`DIERR_INPUTLOST`).
pub const VIRTUAL_ERROR: i32 = 0x8007_001Eu32 as i32;

/// `GUID_Button`.
pub const GUID_BUTTON: Uuid = Uuid::from_u128(0xA36D02F0_C9F3_11CF_BFC7_444553540000);
/// `GUID_POV`.
pub const GUID_POV: Uuid = Uuid::from_u128(0xA36D02F2_C9F3_11CF_BFC7_444553540000);
/// `GUID_Unknown`.
pub const GUID_UNKNOWN: Uuid = Uuid::from_u128(0xA36D02F3_C9F3_11CF_BFC7_444553540000);

/// Object definition for a virtual joystick.
#[derive(Clone, Debug)]
pub struct VirtualObject {
    pub name: String,
    pub guid_type: Uuid,
    pub kind: Option<ObjectKind>,
    pub range: (i32, i32),
    pub granularity: u32,
    pub polled: bool,
}

impl VirtualObject {
    pub fn axis(name: &str, guid_type: Uuid, min: i32, max: i32) -> Self {
        Self {
            name: name.into(),
            guid_type,
            kind: Some(ObjectKind::Axis),
            range: (min, max),
            granularity: 1,
            polled: false,
        }
    }

    pub fn button(name: &str) -> Self {
        Self {
            name: name.into(),
            guid_type: GUID_BUTTON,
            kind: Some(ObjectKind::Button),
            range: (0, 0x80),
            granularity: 1,
            polled: false,
        }
    }

    /// Hat with the given granularity (4500 = eight-way, 9000 = four-way).
    pub fn hat(name: &str, granularity: u32) -> Self {
        Self {
            name: name.into(),
            guid_type: GUID_POV,
            kind: Some(ObjectKind::Hat),
            range: (-1, 35999),
            granularity,
            polled: false,
        }
    }

    /// An object that is neither axis, button nor hat (e.g. a collection).
    pub fn other(name: &str) -> Self {
        Self {
            name: name.into(),
            guid_type: GUID_UNKNOWN,
            kind: None,
            range: (0, 0),
            granularity: 0,
            polled: false,
        }
    }

    pub fn polled(mut self) -> Self {
        self.polled = true;
        self
    }
}

struct Joystick {
    info: InstanceInfo,
    objects: Vec<VirtualObject>,
    /// Current value per object (axis/hat value, or button byte).
    values: Vec<i32>,
    /// Record offset bound to each object by the registered format.
    bound: Vec<Option<usize>>,
    record_size: usize,
    acquired: bool,
    fail_acquire: bool,
    fail_reads: bool,
    polls: usize,
}

impl Joystick {
    fn bind(&mut self, format: &DataFormat) {
        self.bound = vec![None; self.objects.len()];
        for entry in &format.objects {
            let slot = self.objects.iter().enumerate().position(|(i, o)| {
                self.bound[i].is_none() && o.kind == Some(entry.kind) && o.guid_type == entry.guid
            });
            if let Some(i) = slot {
                self.bound[i] = Some(entry.offset as usize);
            }
        }
        self.record_size = format.size as usize;
    }

    fn record(&self) -> Vec<u8> {
        let mut w = RecordWriter::new(self.record_size);
        for ((object, value), offset) in self.objects.iter().zip(&self.values).zip(&self.bound) {
            let Some(offset) = *offset else { continue };
            match object.kind {
                Some(ObjectKind::Button) => w.put_u8(offset, *value as u8),
                Some(_) => w.put_i32(offset, *value),
                None => false,
            };
        }
        w.finish()
    }
}

#[derive(Default)]
struct Bus {
    devices: Vec<Joystick>,
    created: usize,
    fail_enumerate: bool,
}

impl Bus {
    fn find(&mut self, instance: &Uuid) -> Option<&mut Joystick> {
        self.devices.iter_mut().find(|d| d.info.instance == *instance)
    }
}

/// Virtual DirectInput root. Clones share the same set of joysticks.
#[derive(Clone, Default)]
pub struct VirtualDirectInput {
    bus: Rc<RefCell<Bus>>,
}

impl VirtualDirectInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plug in a joystick. Initial values: axes at their minimum, hats
    /// centered, buttons released.
    pub fn attach(&self, instance: Uuid, product_name: &str, objects: Vec<VirtualObject>) {
        let values = objects
            .iter()
            .map(|o| match o.kind {
                Some(ObjectKind::Axis) => o.range.0,
                Some(ObjectKind::Hat) => -1,
                _ => 0,
            })
            .collect();
        let count = objects.len();
        self.bus.borrow_mut().devices.push(Joystick {
            info: InstanceInfo {
                instance,
                product: Uuid::nil(),
                product_name: product_name.into(),
                instance_name: product_name.into(),
            },
            objects,
            values,
            bound: vec![None; count],
            record_size: 0,
            acquired: false,
            fail_acquire: false,
            fail_reads: false,
            polls: 0,
        });
    }

    /// Unplug a joystick. Open handles start failing.
    pub fn detach(&self, instance: &Uuid) {
        self.bus.borrow_mut().devices.retain(|d| d.info.instance != *instance);
    }

    /// Set the raw value of the named object. Returns `false` if not found.
    pub fn set_value(&self, instance: &Uuid, object: &str, value: i32) -> bool {
        let mut bus = self.bus.borrow_mut();
        let Some(dev) = bus.find(instance) else {
            return false;
        };
        match dev.objects.iter().position(|o| o.name == object) {
            Some(i) => {
                dev.values[i] = value;
                true
            }
            None => false,
        }
    }

    pub fn set_fail_acquire(&self, instance: &Uuid, fail: bool) {
        if let Some(dev) = self.bus.borrow_mut().find(instance) {
            dev.fail_acquire = fail;
        }
    }

    pub fn set_fail_reads(&self, instance: &Uuid, fail: bool) {
        if let Some(dev) = self.bus.borrow_mut().find(instance) {
            dev.fail_reads = fail;
        }
    }

    pub fn set_fail_enumerate(&self, fail: bool) {
        self.bus.borrow_mut().fail_enumerate = fail;
    }

    pub fn is_acquired(&self, instance: &Uuid) -> bool {
        self.bus
            .borrow_mut()
            .find(instance)
            .map(|d| d.acquired)
            .unwrap_or(false)
    }

    /// Number of explicit polls the named device received.
    pub fn poll_count(&self, instance: &Uuid) -> usize {
        self.bus.borrow_mut().find(instance).map(|d| d.polls).unwrap_or(0)
    }

    /// Number of `create_device` calls so far.
    pub fn created(&self) -> usize {
        self.bus.borrow().created
    }
}

impl DirectInputApi for VirtualDirectInput {
    type Handle = VirtualJoystickHandle;

    fn attached_devices(&mut self) -> Result<Vec<InstanceInfo>> {
        let bus = self.bus.borrow();
        if bus.fail_enumerate {
            return Err(Error::transport("EnumDevices", VIRTUAL_ERROR));
        }
        Ok(bus.devices.iter().map(|d| d.info.clone()).collect())
    }

    fn create_device(&mut self, instance: &Uuid) -> Result<VirtualJoystickHandle> {
        let mut bus = self.bus.borrow_mut();
        if bus.find(instance).is_none() {
            return Err(Error::transport("CreateDevice", VIRTUAL_ERROR));
        }
        bus.created += 1;
        Ok(VirtualJoystickHandle {
            bus: Rc::clone(&self.bus),
            instance: *instance,
        })
    }
}

/// Handle to one virtual joystick.
pub struct VirtualJoystickHandle {
    bus: Rc<RefCell<Bus>>,
    instance: Uuid,
}

impl VirtualJoystickHandle {
    fn with<T>(&self, op: &'static str, f: impl FnOnce(&mut Joystick) -> Result<T>) -> Result<T> {
        let mut bus = self.bus.borrow_mut();
        match bus.find(&self.instance) {
            Some(dev) => f(dev),
            None => Err(Error::transport(op, VIRTUAL_ERROR)),
        }
    }
}

impl DirectInputHandle for VirtualJoystickHandle {
    fn objects(&mut self) -> Result<Vec<ObjectInstance>> {
        self.with("EnumObjects", |dev| {
            Ok(dev
                .objects
                .iter()
                .enumerate()
                .map(|(i, o)| ObjectInstance {
                    name: o.name.clone(),
                    guid_type: o.guid_type,
                    object_id: i as u32,
                    kind: o.kind,
                    polled: o.polled,
                })
                .collect())
        })
    }

    fn range(&mut self, object: &ObjectInstance) -> Result<(i32, i32)> {
        self.with("GetProperty(DIPROP_RANGE)", |dev| {
            dev.objects
                .get(object.object_id as usize)
                .map(|o| o.range)
                .ok_or(Error::transport("GetProperty(DIPROP_RANGE)", VIRTUAL_ERROR))
        })
    }

    fn granularity(&mut self, object: &ObjectInstance) -> Result<u32> {
        self.with("GetProperty(DIPROP_GRANULARITY)", |dev| {
            dev.objects
                .get(object.object_id as usize)
                .map(|o| o.granularity)
                .ok_or(Error::transport("GetProperty(DIPROP_GRANULARITY)", VIRTUAL_ERROR))
        })
    }

    fn set_data_format(&mut self, format: &DataFormat) -> Result<()> {
        self.with("SetDataFormat", |dev| {
            dev.bind(format);
            Ok(())
        })
    }

    fn acquire(&mut self) -> Result<()> {
        self.with("Acquire", |dev| {
            if dev.fail_acquire {
                return Err(Error::transport("Acquire", VIRTUAL_ERROR));
            }
            dev.acquired = true;
            Ok(())
        })
    }

    fn unacquire(&mut self) -> Result<()> {
        self.with("Unacquire", |dev| {
            dev.acquired = false;
            Ok(())
        })
    }

    fn poll(&mut self) -> Result<()> {
        self.with("Poll", |dev| {
            if dev.fail_reads {
                return Err(Error::transport("Poll", VIRTUAL_ERROR));
            }
            dev.polls += 1;
            Ok(())
        })
    }

    fn device_state(&mut self, buf: &mut [u8]) -> Result<()> {
        self.with("GetDeviceState", |dev| {
            if dev.fail_reads || !dev.acquired || buf.len() != dev.record_size {
                return Err(Error::transport("GetDeviceState", VIRTUAL_ERROR));
            }
            buf.copy_from_slice(&dev.record());
            Ok(())
        })
    }
}

/// Virtual XInput slots. Clones share the same slots.
#[derive(Clone, Default)]
pub struct VirtualXInput {
    slots: Rc<RefCell<[Option<GamepadReport>; MAX_SLOTS as usize]>>,
}

impl VirtualXInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect a controller (idle report) in `slot`.
    pub fn connect(&self, slot: u32) {
        self.set(slot, GamepadReport::default());
    }

    pub fn disconnect(&self, slot: u32) {
        if let Some(s) = self.slots.borrow_mut().get_mut(slot as usize) {
            *s = None;
        }
    }

    /// Replace the report for `slot` (connecting it if needed).
    pub fn set(&self, slot: u32, report: GamepadReport) {
        if let Some(s) = self.slots.borrow_mut().get_mut(slot as usize) {
            *s = Some(report);
        }
    }
}

impl XInputApi for VirtualXInput {
    fn gamepad_state(&self, slot: u32) -> Option<GamepadReport> {
        self.slots.borrow().get(slot as usize).copied().flatten()
    }
}
