use stickcheck::backends::legacy::DirectInputSource;
use stickcheck::backends::virtual_input::{VirtualDirectInput, VirtualObject};
use stickcheck::calibration::{axis_reading, update_axis, update_hat};
use stickcheck::layout::GUID_X_AXIS;
use stickcheck::snapshot::sample_device;
use stickcheck::{
    AxisInfo, AxisReading, CalibrationConfig, Coverage, Device, DeviceTracker, HatDirection, HatInfo,
    HatKind,
};
use uuid::Uuid;

#[test]
fn hat_needs_center_to_be_fully_tested() {
    let mut hat = HatInfo::new("POV", Uuid::nil(), HatKind::EightWay);
    assert_eq!(hat.seen_flags(), 0);

    for dir in HatDirection::COMPASS {
        update_hat(&mut hat, dir.raw());
    }
    assert!(!hat.fully_tested());

    update_hat(&mut hat, -1);
    assert!(hat.fully_tested());
}

#[test]
fn four_way_hat_completes_without_diagonals() {
    let mut hat = HatInfo::new("POV", Uuid::nil(), HatKind::FourWay);
    for raw in [0, 9000, 18000, 27000, -1] {
        update_hat(&mut hat, raw);
    }
    assert!(hat.fully_tested());
}

#[test]
fn between_compass_points_records_nothing() {
    let mut hat = HatInfo::new("POV", Uuid::nil(), HatKind::EightWay);
    assert_eq!(update_hat(&mut hat, 1250), None);
    assert_eq!(hat.seen_flags(), 0);
    assert_eq!(hat.last_raw(), 1250);
}

#[test]
fn symmetric_axis_percentages() {
    let cfg = CalibrationConfig::default();
    assert_eq!(axis_reading(-32768, -32768, 32767, &cfg), AxisReading::Percent(100));
    assert_eq!(axis_reading(0, -32768, 32767, &cfg), AxisReading::Percent(0));
    assert_eq!(axis_reading(32767, -32768, 32767, &cfg), AxisReading::Percent(100));
    // One step off an extreme never displays as 100%.
    assert_eq!(axis_reading(32766, -32768, 32767, &cfg), AxisReading::Percent(99));
}

#[test]
fn custom_margin_widens_the_clamp() {
    let cfg = CalibrationConfig {
        extreme_margin_percent: 5,
        ..CalibrationConfig::default()
    };
    assert_eq!(axis_reading(1, 0, 1000, &cfg), AxisReading::Percent(5));
    assert_eq!(axis_reading(999, 0, 1000, &cfg), AxisReading::Percent(95));
    assert_eq!(axis_reading(1000, 0, 1000, &cfg), AxisReading::Percent(100));
}

#[test]
fn seen_range_stays_inside_declared_range() {
    let mut axis = AxisInfo::new("X", Uuid::nil(), -100, 100, 4);
    for raw in [5, -400, 12, 900, -7] {
        update_axis(&mut axis, raw);
        let (lo, hi) = (axis.seen_min().unwrap_or(0), axis.seen_max().unwrap_or(0));
        assert!(lo <= hi);
        assert!(lo >= -100 && hi <= 100);
    }
    assert_eq!(axis.coverage(&CalibrationConfig::default()), Coverage::Full);
    assert_eq!(axis.history().collect::<Vec<_>>(), [-100, 12, 100, -7]);
}

#[test]
fn coverage_progresses_while_sampling_a_device() {
    let bus = VirtualDirectInput::new();
    let id = Uuid::from_u128(0xCA1);
    bus.attach(
        id,
        "Throttle",
        vec![VirtualObject::axis("X Axis", GUID_X_AXIS, 0, 1000)],
    );
    let mut t = DeviceTracker::new(DirectInputSource::new(bus.clone(), 60));
    let cfg = CalibrationConfig::default();

    let mut coverage = |value: i32| {
        bus.set_value(&id, "X Axis", value);
        let dev = t.devices().pop().expect("device");
        sample_device(dev, &cfg).axes[0].coverage
    };

    assert_eq!(coverage(500), Coverage::Default);
    assert_eq!(coverage(30), Coverage::Default);
    assert_eq!(coverage(970), Coverage::NearFull);
    assert_eq!(coverage(0), Coverage::NearFull);
    assert_eq!(coverage(1000), Coverage::Full);
    // Monotonic: moving back to the middle keeps full coverage.
    assert_eq!(coverage(500), Coverage::Full);

    let dev = t.get(&id).expect("tracked");
    assert_eq!(dev.controls().axes[0].sample_count(), 6);
}
