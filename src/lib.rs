//! stickcheck: controller tester core for Windows game controllers.
//!
//! Enumerates DirectInput and XInput controllers, keeps them tracked across
//! hot-plug, decodes their state every frame and records how much of each
//! control's range has been exercised.
//!
//! The OS calls sit behind small traits ([`backends::legacy::DirectInputApi`],
//! [`backends::gamepad::XInputApi`]) so everything above them also runs on the
//! in-memory transports in [`backends::virtual_input`].
//!
//! ```ignore
//! let mut manager = stickcheck::SystemManager::discover(TesterConfig::default())?;
//! loop {
//!     let frame = manager.sample_all();
//!     // render `frame`
//! }
//! ```

pub mod backends;
pub mod calibration;
pub mod config;
pub mod control;
pub mod device;
pub mod error;
pub mod layout;
pub mod manager;
pub mod metadata;
pub mod snapshot;
pub mod tracker;

pub use calibration::{AxisReading, Coverage};
pub use config::{CalibrationConfig, TesterConfig};
pub use control::{AxisInfo, ButtonInfo, Controls, HatDirection, HatInfo, HatKind};
pub use device::*;
pub use error::{Error, Result};
pub use manager::*;
pub use metadata::DeviceMeta;
pub use snapshot::{DeviceSnapshot, Snapshot};
pub use tracker::{DeviceSource, DeviceTracker, StaleHandle};
