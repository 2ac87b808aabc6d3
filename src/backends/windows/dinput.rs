#![cfg(all(target_os = "windows", feature = "directinput"))]

//! Windows DirectInput 8 transport.
//!
//! Thin COM wrappers implementing [`DirectInputApi`] / [`DirectInputHandle`].
//! Everything interesting (layout, offsets, calibration) happens in
//! [`legacy`](crate::backends::legacy); this module only converts between
//! DirectInput structs and the crate's types.
//!
//! ## Notes
//! - Only attached game controllers (`DI8DEVCLASS_GAMECTRL`) are enumerated.
//! - Object properties are looked up by object id (`DIPH_BYID`).
//! - The data format registers object *types* with `DIDFT_ANYINSTANCE`, so
//!   DirectInput binds each entry to the next unbound object of that type.

use std::ffi::c_void;
use std::mem::size_of;

use uuid::Uuid;
use windows::core::{Interface, GUID, PCWSTR};
use windows::Win32::Devices::HumanInterfaceDevice::{
    DirectInput8Create, IDirectInput8W, IDirectInputDevice8W, DIDATAFORMAT, DIDEVICEINSTANCEW,
    DIDEVICEOBJECTINSTANCEW, DIOBJECTDATAFORMAT, DIPROPDWORD, DIPROPHEADER, DIPROPRANGE,
};
use windows::Win32::Foundation::{BOOL, HINSTANCE};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;

use crate::backends::legacy::{DirectInputApi, DirectInputHandle, InstanceInfo, ObjectInstance};
use crate::error::{Error, Result};
use crate::layout::{DataFormat, ObjectKind};

// Local constants (avoid relying on module exports that vary by windows version)
const DIRECTINPUT_VERSION: u32 = 0x0800;
const DI8DEVCLASS_GAMECTRL: u32 = 4;
const DIEDFL_ATTACHEDONLY: u32 = 0x0000_0001;
const DIENUM_CONTINUE: i32 = 1;

const DIDFT_AXIS: u32 = 0x0000_0003;
const DIDFT_BUTTON: u32 = 0x0000_000C;
const DIDFT_POV: u32 = 0x0000_0010;
const DIDFT_ANYINSTANCE: u32 = 0x00FF_FF00;
const DIDOI_POLLED: u32 = 0x0000_8000;
const DIDF_ABSAXIS: u32 = 0x0000_0001;
const DIPH_BYID: u32 = 2;

// MAKEDIPROP(n): property ids are small integers passed as GUID pointers.
const DIPROP_GRANULARITY: *const GUID = 3 as *const GUID;
const DIPROP_RANGE: *const GUID = 4 as *const GUID;

const E_POINTER: i32 = 0x8000_4003u32 as i32;

fn hr(op: &'static str) -> impl Fn(windows::core::Error) -> Error {
    move |e| Error::transport(op, e.code().0)
}

fn to_uuid(guid: &GUID) -> Uuid {
    Uuid::from_u128(guid.to_u128())
}

fn to_guid(uuid: &Uuid) -> GUID {
    GUID::from_u128(uuid.as_u128())
}

fn wide_to_string(wide: &[u16]) -> String {
    let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    String::from_utf16_lossy(&wide[..len])
}

fn prop_header<T>(object_id: u32) -> DIPROPHEADER {
    DIPROPHEADER {
        dwSize: size_of::<T>() as u32,
        dwHeaderSize: size_of::<DIPROPHEADER>() as u32,
        dwObj: object_id,
        dwHow: DIPH_BYID,
    }
}

unsafe extern "system" fn collect_device(instance: *mut DIDEVICEINSTANCEW, ctx: *mut c_void) -> BOOL {
    let out = &mut *(ctx as *mut Vec<DIDEVICEINSTANCEW>);
    if let Some(instance) = instance.as_ref() {
        out.push(*instance);
    }
    BOOL(DIENUM_CONTINUE)
}

unsafe extern "system" fn collect_object(object: *mut DIDEVICEOBJECTINSTANCEW, ctx: *mut c_void) -> BOOL {
    let out = &mut *(ctx as *mut Vec<DIDEVICEOBJECTINSTANCEW>);
    if let Some(object) = object.as_ref() {
        out.push(*object);
    }
    BOOL(DIENUM_CONTINUE)
}

/// The system DirectInput 8 root object.
pub struct DirectInput {
    di: IDirectInput8W,
}

impl DirectInput {
    pub fn new() -> Result<Self> {
        let module = unsafe { GetModuleHandleW(PCWSTR::null()) }.map_err(hr("GetModuleHandleW"))?;
        let mut raw: *mut c_void = std::ptr::null_mut();
        unsafe {
            DirectInput8Create(
                HINSTANCE(module.0),
                DIRECTINPUT_VERSION,
                &IDirectInput8W::IID,
                &mut raw,
                None,
            )
        }
        .map_err(hr("DirectInput8Create"))?;
        if raw.is_null() {
            return Err(Error::transport("DirectInput8Create", E_POINTER));
        }
        let di = unsafe { IDirectInput8W::from_raw(raw) };
        Ok(Self { di })
    }
}

impl DirectInputApi for DirectInput {
    type Handle = DirectInputJoystick;

    fn attached_devices(&mut self) -> Result<Vec<InstanceInfo>> {
        let mut raw: Vec<DIDEVICEINSTANCEW> = Vec::new();
        unsafe {
            self.di.EnumDevices(
                DI8DEVCLASS_GAMECTRL,
                Some(collect_device),
                &mut raw as *mut _ as *mut c_void,
                DIEDFL_ATTACHEDONLY,
            )
        }
        .map_err(hr("EnumDevices"))?;

        Ok(raw
            .iter()
            .map(|d| InstanceInfo {
                instance: to_uuid(&d.guidInstance),
                product: to_uuid(&d.guidProduct),
                product_name: wide_to_string(&d.tszProductName),
                instance_name: wide_to_string(&d.tszInstanceName),
            })
            .collect())
    }

    fn create_device(&mut self, instance: &Uuid) -> Result<DirectInputJoystick> {
        let guid = to_guid(instance);
        let mut device: Option<IDirectInputDevice8W> = None;
        unsafe { self.di.CreateDevice(&guid, &mut device, None) }.map_err(hr("CreateDevice"))?;
        let device = device.ok_or(Error::transport("CreateDevice", E_POINTER))?;
        Ok(DirectInputJoystick { device })
    }
}

/// One opened DirectInput device.
pub struct DirectInputJoystick {
    device: IDirectInputDevice8W,
}

impl DirectInputHandle for DirectInputJoystick {
    fn objects(&mut self) -> Result<Vec<ObjectInstance>> {
        let mut raw: Vec<DIDEVICEOBJECTINSTANCEW> = Vec::new();
        unsafe {
            self.device.EnumObjects(
                Some(collect_object),
                &mut raw as *mut _ as *mut c_void,
                DIDFT_AXIS | DIDFT_BUTTON | DIDFT_POV,
            )
        }
        .map_err(hr("EnumObjects"))?;

        Ok(raw
            .iter()
            .map(|o| {
                let kind = if o.dwType & DIDFT_AXIS != 0 {
                    Some(ObjectKind::Axis)
                } else if o.dwType & DIDFT_BUTTON != 0 {
                    Some(ObjectKind::Button)
                } else if o.dwType & DIDFT_POV != 0 {
                    Some(ObjectKind::Hat)
                } else {
                    None
                };
                ObjectInstance {
                    name: wide_to_string(&o.tszName),
                    guid_type: to_uuid(&o.guidType),
                    object_id: o.dwType,
                    kind,
                    polled: o.dwFlags & DIDOI_POLLED != 0,
                }
            })
            .collect())
    }

    fn range(&mut self, object: &ObjectInstance) -> Result<(i32, i32)> {
        let mut range = DIPROPRANGE {
            diph: prop_header::<DIPROPRANGE>(object.object_id),
            lMin: 0,
            lMax: 0,
        };
        unsafe { self.device.GetProperty(DIPROP_RANGE, &mut range.diph) }
            .map_err(hr("GetProperty(DIPROP_RANGE)"))?;
        Ok((range.lMin, range.lMax))
    }

    fn granularity(&mut self, object: &ObjectInstance) -> Result<u32> {
        let mut granularity = DIPROPDWORD {
            diph: prop_header::<DIPROPDWORD>(object.object_id),
            dwData: 0,
        };
        unsafe { self.device.GetProperty(DIPROP_GRANULARITY, &mut granularity.diph) }
            .map_err(hr("GetProperty(DIPROP_GRANULARITY)"))?;
        Ok(granularity.dwData)
    }

    fn set_data_format(&mut self, format: &DataFormat) -> Result<()> {
        // Both vectors must outlive the SetDataFormat call.
        let guids: Vec<GUID> = format.objects.iter().map(|o| to_guid(&o.guid)).collect();
        let mut objects: Vec<DIOBJECTDATAFORMAT> = format
            .objects
            .iter()
            .zip(&guids)
            .map(|(o, guid)| DIOBJECTDATAFORMAT {
                pguid: if o.guid.is_nil() {
                    std::ptr::null()
                } else {
                    guid as *const GUID
                },
                dwOfs: o.offset,
                dwType: DIDFT_ANYINSTANCE
                    | match o.kind {
                        ObjectKind::Axis => DIDFT_AXIS,
                        ObjectKind::Button => DIDFT_BUTTON,
                        ObjectKind::Hat => DIDFT_POV,
                    },
                dwFlags: 0,
            })
            .collect();

        let mut df = DIDATAFORMAT {
            dwSize: size_of::<DIDATAFORMAT>() as u32,
            dwObjSize: size_of::<DIOBJECTDATAFORMAT>() as u32,
            dwFlags: DIDF_ABSAXIS,
            dwDataSize: format.size,
            dwNumObjs: objects.len() as u32,
            rgodf: objects.as_mut_ptr(),
        };
        unsafe { self.device.SetDataFormat(&mut df) }.map_err(hr("SetDataFormat"))
    }

    fn acquire(&mut self) -> Result<()> {
        unsafe { self.device.Acquire() }.map_err(hr("Acquire"))
    }

    fn unacquire(&mut self) -> Result<()> {
        unsafe { self.device.Unacquire() }.map_err(hr("Unacquire"))
    }

    fn poll(&mut self) -> Result<()> {
        unsafe { self.device.Poll() }.map_err(hr("Poll"))
    }

    fn device_state(&mut self, buf: &mut [u8]) -> Result<()> {
        unsafe {
            self.device
                .GetDeviceState(buf.len() as u32, buf.as_mut_ptr() as *mut c_void)
        }
        .map_err(hr("GetDeviceState"))
    }
}
