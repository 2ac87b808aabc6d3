//! Generic hot-plug aware device registry.
//!
//! A [`DeviceTracker`] owns the live devices of one transport. It re-enumerates
//! lazily: an OS device-change notification only flips a stale flag (through a
//! [`StaleHandle`]), and the next [`DeviceTracker::devices`] call diffs the
//! freshly enumerated instances against what is tracked.
//!
//! Devices whose key survives a refresh are left untouched, so a hot-plug
//! event for one controller never resets calibration on the others.

use crate::device::Device;
use crate::error::Result;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Transport-specific half of a tracker: enumerate, key, create.
pub trait DeviceSource {
    /// Identity used to match enumerated instances with tracked devices.
    type Key: PartialEq + Debug;
    /// What enumeration yields for one available device.
    type Instance;
    type Device: Device + 'static;

    /// Currently available instances.
    fn enumerate(&mut self) -> Result<Vec<Self::Instance>>;

    fn key(instance: &Self::Instance) -> Self::Key;

    /// Build a device for a newly seen instance.
    fn create(&mut self, instance: &Self::Instance) -> Result<Self::Device>;
}

/// Cloneable handle that marks a tracker stale.
///
/// Safe to call from a window procedure or any other thread; the tracker only
/// reacts on its next read.
#[derive(Clone, Debug)]
pub struct StaleHandle(Arc<AtomicBool>);

impl StaleHandle {
    fn new(stale: bool) -> Self {
        Self(Arc::new(AtomicBool::new(stale)))
    }

    pub fn mark(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stale(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

/// Live devices of one transport, kept in sync with enumeration.
pub struct DeviceTracker<S: DeviceSource> {
    source: S,
    /// Insertion-ordered so name ties keep a stable order.
    entries: Vec<(S::Key, S::Device)>,
    stale: StaleHandle,
}

impl<S: DeviceSource> DeviceTracker<S> {
    /// New tracker. Starts stale, so the first read enumerates.
    pub fn new(source: S) -> Self {
        Self {
            source,
            entries: Vec::new(),
            stale: StaleHandle::new(true),
        }
    }

    /// All tracked devices, refreshing first if stale.
    ///
    /// Sorted by name (byte-wise, case-sensitive); devices with equal names
    /// keep the order they were first tracked in.
    pub fn devices(&mut self) -> Vec<&mut S::Device> {
        if self.stale.is_stale() {
            self.refresh();
        }
        let mut out: Vec<&mut S::Device> = self.entries.iter_mut().map(|(_, d)| d).collect();
        out.sort_by(|a, b| a.name().cmp(b.name()));
        out
    }

    /// Re-enumerate and diff against the tracked set.
    ///
    /// - Tracked keys no longer enumerated are dropped (releasing the device).
    /// - New keys are constructed through the source; failures are logged and
    ///   the instance is skipped until the next refresh.
    /// - Keys present on both sides are left untouched.
    ///
    /// If enumeration itself fails the tracked set is kept and the tracker
    /// stays stale.
    pub fn refresh(&mut self) {
        self.stale.take();

        let instances = match self.source.enumerate() {
            Ok(list) => list,
            Err(e) => {
                log::warn!("device enumeration failed: {e}");
                self.stale.mark();
                return;
            }
        };
        let keys: Vec<S::Key> = instances.iter().map(S::key).collect();

        self.entries.retain(|(key, device)| {
            let keep = keys.contains(key);
            if !keep {
                log::info!("device removed: {} ({key:?})", device.name());
            }
            keep
        });

        for (instance, key) in instances.iter().zip(keys) {
            if self.entries.iter().any(|(k, _)| *k == key) {
                continue;
            }
            match self.source.create(instance) {
                Ok(device) => {
                    log::info!("device added: {} ({key:?})", device.name());
                    self.entries.push((key, device));
                }
                Err(e) => log::warn!("could not open device {key:?}: {e}"),
            }
        }

        log::debug!("refresh complete: {} device(s) tracked", self.entries.len());
    }

    /// Mark the device list as out of date.
    pub fn mark_stale(&self) {
        self.stale.mark();
    }

    pub fn is_stale(&self) -> bool {
        self.stale.is_stale()
    }

    /// Handle for hot-plug notifications.
    pub fn stale_handle(&self) -> StaleHandle {
        self.stale.clone()
    }

    /// Tracked keys in insertion order. Does not refresh.
    pub fn keys(&self) -> impl Iterator<Item = &S::Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Tracked device by key. Does not refresh.
    pub fn get(&self, key: &S::Key) -> Option<&S::Device> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, d)| d)
    }

    pub fn get_mut(&mut self, key: &S::Key) -> Option<&mut S::Device> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, d)| d)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
