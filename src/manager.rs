//! Application context.
//!
//! [`Manager`] owns one [`DeviceTracker`] per transport and is the only thing a
//! presentation loop needs to hold. There is no global device state: create a
//! manager, keep it for the lifetime of the window, and forward OS
//! device-change notifications to [`Manager::mark_stale`] (or to the handles
//! from [`Manager::stale_handles`] if the notification arrives elsewhere).

use crate::config::TesterConfig;
use crate::device::Device;
use crate::snapshot::{sample_device, Snapshot};
use crate::tracker::{DeviceSource, DeviceTracker, StaleHandle};

/// Owns the DirectInput and XInput trackers and the tester config.
pub struct Manager<D: DeviceSource, X: DeviceSource> {
    directinput: DeviceTracker<D>,
    xinput: DeviceTracker<X>,
    config: TesterConfig,
}

impl<D: DeviceSource, X: DeviceSource> Manager<D, X> {
    pub fn new(directinput: D, xinput: X, config: TesterConfig) -> Self {
        Self {
            directinput: DeviceTracker::new(directinput),
            xinput: DeviceTracker::new(xinput),
            config,
        }
    }

    pub fn config(&self) -> &TesterConfig {
        &self.config
    }

    /// All devices: DirectInput first, then XInput, each sorted by name.
    pub fn devices(&mut self) -> Vec<&mut dyn Device> {
        let mut out: Vec<&mut dyn Device> = Vec::new();
        for d in self.directinput.devices() {
            out.push(d);
        }
        for d in self.xinput.devices() {
            out.push(d);
        }
        out
    }

    /// Sample every device once; see [`sample_device`].
    pub fn sample_all(&mut self) -> Snapshot {
        let cfg = self.config.calibration.clone();
        Snapshot(
            self.devices()
                .into_iter()
                .map(|d| sample_device(d, &cfg))
                .collect(),
        )
    }

    /// Force both trackers to re-enumerate on next access.
    pub fn mark_stale(&self) {
        self.directinput.mark_stale();
        self.xinput.mark_stale();
    }

    pub fn stale_handles(&self) -> [StaleHandle; 2] {
        [self.directinput.stale_handle(), self.xinput.stale_handle()]
    }

    pub fn directinput(&mut self) -> &mut DeviceTracker<D> {
        &mut self.directinput
    }

    pub fn xinput(&mut self) -> &mut DeviceTracker<X> {
        &mut self.xinput
    }
}

#[cfg(all(target_os = "windows", feature = "directinput", feature = "xinput"))]
mod system {
    use super::Manager;
    use crate::backends::gamepad::XInputSource;
    use crate::backends::legacy::DirectInputSource;
    use crate::backends::windows::{DirectInput, XInput};
    use crate::config::TesterConfig;
    use crate::error::Result;

    /// Manager over the real Windows transports.
    pub type SystemManager = Manager<DirectInputSource<DirectInput>, XInputSource<XInput>>;

    impl SystemManager {
        /// Open DirectInput and set up both trackers. Devices are enumerated
        /// on first access.
        pub fn discover(config: TesterConfig) -> Result<Self> {
            config.validate()?;
            let capacity = config.history_capacity();
            let dinput = DirectInput::new()?;
            Ok(Manager::new(
                DirectInputSource::new(dinput, capacity),
                XInputSource::new(XInput, capacity),
                config,
            ))
        }
    }
}

#[cfg(all(target_os = "windows", feature = "directinput", feature = "xinput"))]
pub use system::SystemManager;
