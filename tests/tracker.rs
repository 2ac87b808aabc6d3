use stickcheck::backends::legacy::DirectInputSource;
use stickcheck::backends::virtual_input::{VirtualDirectInput, VirtualObject};
use stickcheck::layout::{GUID_X_AXIS, GUID_Y_AXIS};
use stickcheck::{Device, DeviceTracker};
use uuid::Uuid;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn stick() -> Vec<VirtualObject> {
    vec![
        VirtualObject::axis("X Axis", GUID_X_AXIS, 0, 65535),
        VirtualObject::axis("Y Axis", GUID_Y_AXIS, 0, 65535),
        VirtualObject::button("Button 0"),
    ]
}

fn guid(n: u128) -> Uuid {
    Uuid::from_u128(0x1000 + n)
}

fn tracker(bus: &VirtualDirectInput) -> DeviceTracker<DirectInputSource<VirtualDirectInput>> {
    DeviceTracker::new(DirectInputSource::new(bus.clone(), 16))
}

fn names(t: &mut DeviceTracker<DirectInputSource<VirtualDirectInput>>) -> Vec<String> {
    t.devices().iter().map(|d| d.name().to_string()).collect()
}

#[test]
fn first_read_enumerates() {
    init();
    let bus = VirtualDirectInput::new();
    bus.attach(guid(1), "Stick", stick());
    let mut t = tracker(&bus);
    assert!(t.is_stale());
    assert_eq!(t.devices().len(), 1);
    assert!(!t.is_stale());
    assert!(bus.is_acquired(&guid(1)));
}

#[test]
fn hot_plug_keeps_surviving_devices() {
    init();
    let bus = VirtualDirectInput::new();
    bus.attach(guid(1), "A", stick());
    bus.attach(guid(2), "B", stick());
    let mut t = tracker(&bus);
    assert_eq!(names(&mut t), ["A", "B"]);

    // Exercise B so it has calibration state worth keeping.
    bus.set_value(&guid(2), "X Axis", 65535);
    for d in t.devices() {
        stickcheck::snapshot::sample_device(d, &Default::default());
    }
    let before = t.get(&guid(2)).map(|d| d.controls().axes[0].seen_max());
    assert_eq!(before, Some(Some(65535)));

    bus.detach(&guid(1));
    bus.attach(guid(3), "C", stick());
    t.mark_stale();
    assert_eq!(names(&mut t), ["B", "C"]);

    let after = t.get(&guid(2)).map(|d| d.controls().axes[0].seen_max());
    assert_eq!(after, before);
    // A, B and C opened once each.
    assert_eq!(bus.created(), 3);
}

#[test]
fn refresh_without_changes_is_idempotent() {
    init();
    let bus = VirtualDirectInput::new();
    bus.attach(guid(1), "A", stick());
    let mut t = tracker(&bus);
    t.devices();
    t.mark_stale();
    t.devices();
    t.refresh();
    assert_eq!(t.len(), 1);
    assert_eq!(bus.created(), 1);
}

#[test]
fn sorted_by_name_with_stable_ties() {
    init();
    let bus = VirtualDirectInput::new();
    bus.attach(guid(1), "Wheel", stick());
    bus.attach(guid(2), "Pad", stick());
    bus.attach(guid(3), "Pad", stick());
    bus.attach(guid(4), "Arcade", stick());
    let mut t = tracker(&bus);

    let ids: Vec<_> = t.devices().iter().map(|d| d.id()).collect();
    assert_eq!(
        ids,
        [
            stickcheck::DeviceId::Instance(guid(4)),
            stickcheck::DeviceId::Instance(guid(2)),
            stickcheck::DeviceId::Instance(guid(3)),
            stickcheck::DeviceId::Instance(guid(1)),
        ]
    );
}

#[test]
fn stale_handle_marks_from_elsewhere() {
    init();
    let bus = VirtualDirectInput::new();
    let mut t = tracker(&bus);
    assert!(t.devices().is_empty());

    let handle = t.stale_handle();
    bus.attach(guid(1), "Late", stick());
    // Not re-enumerated until marked.
    assert!(t.devices().is_empty());

    std::thread::spawn(move || handle.mark()).join().ok();
    assert_eq!(names(&mut t), ["Late"]);
}

#[test]
fn enumeration_failure_keeps_tracked_set() {
    init();
    let bus = VirtualDirectInput::new();
    bus.attach(guid(1), "A", stick());
    let mut t = tracker(&bus);
    assert_eq!(t.devices().len(), 1);

    bus.set_fail_enumerate(true);
    t.mark_stale();
    assert_eq!(t.devices().len(), 1);
    assert!(t.is_stale());

    bus.set_fail_enumerate(false);
    bus.detach(&guid(1));
    assert!(t.devices().is_empty());
    assert!(!t.is_stale());
}

#[test]
fn construction_failure_is_skipped_and_retried() {
    init();
    let bus = VirtualDirectInput::new();
    bus.attach(guid(1), "Busy", stick());
    bus.attach(guid(2), "Free", stick());
    bus.set_fail_acquire(&guid(1), true);
    let mut t = tracker(&bus);

    assert_eq!(names(&mut t), ["Free"]);
    assert!(t.get(&guid(1)).is_none());

    bus.set_fail_acquire(&guid(1), false);
    t.mark_stale();
    assert_eq!(names(&mut t), ["Busy", "Free"]);
}
