//! DirectInput device model.
//!
//! [`DirectInputDevice`] turns a device's enumerated objects into a control
//! set and a matching packed record layout, registers that layout with the
//! transport and holds exclusive access for its lifetime.
//!
//! The OS calls are behind two traits so the layout logic is platform
//! independent:
//! - [`DirectInputApi`]: enumerate attached game controllers, open one.
//! - [`DirectInputHandle`]: per-device object enumeration, properties, data
//!   format, acquire/unacquire, poll, state read.
//!
//! The Windows implementation lives in `backends::windows::dinput`; an
//! in-memory one in [`virtual_input`](crate::backends::virtual_input).

use crate::control::{AxisInfo, ButtonInfo, Controls, HatInfo, HatKind};
use crate::device::{Device, DeviceId, TransportKind};
use crate::error::{Error, Result};
use crate::layout::{self, DataFormat, ObjectKind};
use crate::metadata::DeviceMeta;
use crate::tracker::DeviceSource;
use uuid::Uuid;

/// One attached device as reported by enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceInfo {
    pub instance: Uuid,
    pub product: Uuid,
    pub product_name: String,
    pub instance_name: String,
}

/// One object (control) on a device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectInstance {
    pub name: String,
    /// Object type identity (`GUID_XAxis`, `GUID_Button`, ...).
    pub guid_type: Uuid,
    /// Transport-specific object id used for property lookups.
    pub object_id: u32,
    /// `None` for objects that are neither axis, button nor hat.
    pub kind: Option<ObjectKind>,
    /// Object needs an explicit poll to refresh.
    pub polled: bool,
}

/// Per-device DirectInput primitives.
pub trait DirectInputHandle {
    fn objects(&mut self) -> Result<Vec<ObjectInstance>>;

    /// Logical `(min, max)` of an axis.
    fn range(&mut self, object: &ObjectInstance) -> Result<(i32, i32)>;

    /// Angular granularity of a hat, in hundredths of a degree.
    fn granularity(&mut self, object: &ObjectInstance) -> Result<u32>;

    fn set_data_format(&mut self, format: &DataFormat) -> Result<()>;

    fn acquire(&mut self) -> Result<()>;

    fn unacquire(&mut self) -> Result<()>;

    fn poll(&mut self) -> Result<()>;

    /// Fill `buf` (exactly the registered record size) with current state.
    fn device_state(&mut self, buf: &mut [u8]) -> Result<()>;
}

/// DirectInput root object.
pub trait DirectInputApi {
    type Handle: DirectInputHandle + 'static;

    /// Attached game controllers.
    fn attached_devices(&mut self) -> Result<Vec<InstanceInfo>>;

    fn create_device(&mut self, instance: &Uuid) -> Result<Self::Handle>;
}

/// A DirectInput-backed [`Device`].
pub struct DirectInputDevice<H: DirectInputHandle> {
    handle: H,
    info: InstanceInfo,
    controls: Controls,
    needs_polling: bool,
    record_size: usize,
    acquired: bool,
}

impl<H: DirectInputHandle> DirectInputDevice<H> {
    /// Enumerate controls, register the record layout and acquire the device.
    ///
    /// Any failure here is a construction failure; nothing is acquired when
    /// this returns `Err`.
    pub fn new(info: InstanceInfo, mut handle: H, history_capacity: usize) -> Result<Self> {
        let mut controls = Controls::default();

        for object in handle.objects()? {
            let Some(kind) = object.kind else {
                continue;
            };
            match kind {
                ObjectKind::Axis => {
                    let (min, max) = handle.range(&object)?;
                    let mut axis = AxisInfo::new(object.name, object.guid_type, min, max, history_capacity);
                    axis.polled = object.polled;
                    controls.axes.push(axis);
                }
                ObjectKind::Button => {
                    let mut button = ButtonInfo::new(object.name, object.guid_type);
                    button.polled = object.polled;
                    controls.buttons.push(button);
                }
                ObjectKind::Hat => {
                    let granularity = handle.granularity(&object)?;
                    let mut hat = HatInfo::new(
                        object.name,
                        object.guid_type,
                        HatKind::from_granularity(granularity),
                    );
                    hat.polled = object.polled;
                    controls.hats.push(hat);
                }
            }
        }

        layout::sort_axes_canonically(&mut controls);
        let format = layout::assign_offsets(&mut controls);
        let needs_polling = controls.needs_polling();

        log::debug!(
            "{}: {} axes, {} buttons, {} hats, record {} bytes, polled={}",
            info.product_name,
            controls.axes.len(),
            controls.buttons.len(),
            controls.hats.len(),
            format.size,
            needs_polling
        );

        handle.set_data_format(&format)?;
        handle.acquire().map_err(|e| match e {
            Error::Transport { code, .. } => Error::Acquire(code),
            other => other,
        })?;

        Ok(Self {
            handle,
            info,
            controls,
            needs_polling,
            record_size: format.size as usize,
            acquired: true,
        })
    }

    pub fn instance(&self) -> &InstanceInfo {
        &self.info
    }

    pub fn needs_polling(&self) -> bool {
        self.needs_polling
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }
}

impl<H: DirectInputHandle> Drop for DirectInputDevice<H> {
    fn drop(&mut self) {
        if self.acquired {
            if let Err(e) = self.handle.unacquire() {
                log::warn!("{}: unacquire failed: {e}", self.info.product_name);
            }
            self.acquired = false;
        }
    }
}

impl<H: DirectInputHandle> Device for DirectInputDevice<H> {
    fn name(&self) -> &str {
        &self.info.product_name
    }

    fn id(&self) -> DeviceId {
        DeviceId::Instance(self.info.instance)
    }

    fn metadata(&self) -> DeviceMeta {
        DeviceMeta {
            instance: Some(self.info.instance),
            product: Some(self.info.product),
            product_name: Some(self.info.product_name.clone()),
            instance_name: Some(self.info.instance_name.clone()),
            needs_polling: self.needs_polling,
            record_size: self.record_size,
            ..DeviceMeta::new(TransportKind::DirectInput)
        }
    }

    fn controls(&self) -> &Controls {
        &self.controls
    }

    fn controls_mut(&mut self) -> &mut Controls {
        &mut self.controls
    }

    /// No-op unless some object is polled.
    fn poll(&mut self) -> bool {
        if !self.needs_polling {
            return true;
        }
        match self.handle.poll() {
            Ok(()) => true,
            Err(e) => {
                log::debug!("{}: poll failed: {e}", self.info.product_name);
                false
            }
        }
    }

    fn state(&mut self) -> Vec<u8> {
        if self.record_size == 0 {
            return Vec::new();
        }
        let mut buf = vec![0u8; self.record_size];
        match self.handle.device_state(&mut buf) {
            Ok(()) => buf,
            Err(e) => {
                log::debug!("{}: state read failed: {e}", self.info.product_name);
                Vec::new()
            }
        }
    }
}

/// [`DeviceSource`] over a [`DirectInputApi`], keyed by instance GUID.
pub struct DirectInputSource<A: DirectInputApi> {
    api: A,
    history_capacity: usize,
}

impl<A: DirectInputApi> DirectInputSource<A> {
    pub fn new(api: A, history_capacity: usize) -> Self {
        Self {
            api,
            history_capacity,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}

impl<A: DirectInputApi> DeviceSource for DirectInputSource<A> {
    type Key = Uuid;
    type Instance = InstanceInfo;
    type Device = DirectInputDevice<A::Handle>;

    fn enumerate(&mut self) -> Result<Vec<InstanceInfo>> {
        self.api.attached_devices()
    }

    fn key(instance: &InstanceInfo) -> Uuid {
        instance.instance
    }

    fn create(&mut self, instance: &InstanceInfo) -> Result<Self::Device> {
        let handle = self.api.create_device(&instance.instance)?;
        DirectInputDevice::new(instance.clone(), handle, self.history_capacity)
    }
}
