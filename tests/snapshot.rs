use stickcheck::backends::gamepad::{buttons, GamepadReport, XInputSource};
use stickcheck::backends::legacy::DirectInputSource;
use stickcheck::backends::virtual_input::{VirtualDirectInput, VirtualObject, VirtualXInput};
use stickcheck::layout::{GUID_X_AXIS, GUID_Y_AXIS};
use stickcheck::snapshot::DeviceSnapshot;
use stickcheck::{AxisReading, DeviceId, HatDirection, Manager, TesterConfig};
use uuid::Uuid;

type VirtualManager = Manager<DirectInputSource<VirtualDirectInput>, XInputSource<VirtualXInput>>;

const STICK: Uuid = Uuid::from_u128(0x5717C);

fn setup() -> (VirtualDirectInput, VirtualXInput, VirtualManager) {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = TesterConfig::default();
    let capacity = config.history_capacity();
    let dinput = VirtualDirectInput::new();
    let xinput = VirtualXInput::new();
    let manager = Manager::new(
        DirectInputSource::new(dinput.clone(), capacity),
        XInputSource::new(xinput.clone(), capacity),
        config,
    );
    (dinput, xinput, manager)
}

#[test]
fn directinput_before_xinput() {
    let (dinput, xinput, mut manager) = setup();
    xinput.connect(0);
    dinput.attach(
        STICK,
        "Zeta Stick",
        vec![
            VirtualObject::axis("X Axis", GUID_X_AXIS, -32768, 32767),
            VirtualObject::axis("Y Axis", GUID_Y_AXIS, -32768, 32767),
            VirtualObject::button("Fire"),
        ],
    );

    let frame = manager.sample_all();
    let ids: Vec<DeviceId> = frame.iter().map(|d| d.id).collect();
    assert_eq!(ids, [DeviceId::Instance(STICK), DeviceId::Slot(0)]);
    assert!(frame.iter().all(|d| d.readable));
}

#[test]
fn frame_reflects_current_values() {
    let (dinput, xinput, mut manager) = setup();
    dinput.attach(
        STICK,
        "Stick",
        vec![
            VirtualObject::axis("X Axis", GUID_X_AXIS, -32768, 32767),
            VirtualObject::hat("Hat", 4500),
            VirtualObject::button("Fire"),
        ],
    );
    xinput.set(
        0,
        GamepadReport {
            buttons: buttons::DPAD_LEFT | buttons::START,
            right_trigger: 255,
            ..Default::default()
        },
    );
    dinput.set_value(&STICK, "X Axis", -32768);
    dinput.set_value(&STICK, "Hat", 9000);
    dinput.set_value(&STICK, "Fire", 0x80);

    let frame = manager.sample_all();

    let stick = frame.get(DeviceId::Instance(STICK)).expect("stick");
    assert_eq!(stick.axes[0].reading, AxisReading::Percent(100));
    assert_eq!(stick.hats[0].direction, Some(HatDirection::East));
    assert!(stick.buttons[0].pressed);
    assert!(stick.buttons[0].seen_on && !stick.buttons[0].seen_off);

    let pad = frame.get(DeviceId::Slot(0)).expect("pad");
    assert_eq!(pad.hats[0].direction, Some(HatDirection::West));
    let start = pad.buttons.iter().find(|b| b.name == "Start").expect("start");
    assert!(start.pressed);
    let rt = pad.axes.iter().find(|a| a.name == "Right Trigger").expect("trigger");
    assert_eq!(rt.reading, AxisReading::Percent(100));
}

#[test]
fn unreadable_device_is_reported_not_updated() {
    let (dinput, _xinput, mut manager) = setup();
    dinput.attach(STICK, "Stick", vec![VirtualObject::button("Fire")]);
    manager.sample_all();

    dinput.set_fail_reads(&STICK, true);
    dinput.set_value(&STICK, "Fire", 0x80);
    let frame = manager.sample_all();
    let snap: &DeviceSnapshot = frame.get(DeviceId::Instance(STICK)).expect("stick");
    assert!(!snap.readable);
    assert!(snap.buttons.is_empty());
    assert!(!snap.fully_tested());

    let dev = manager.directinput().get(&STICK).expect("tracked");
    use stickcheck::Device;
    assert!(!dev.controls().buttons[0].seen_on());
}

#[test]
fn fully_tested_after_exercising_everything() {
    let (dinput, _xinput, mut manager) = setup();
    dinput.attach(
        STICK,
        "Pedals",
        vec![
            VirtualObject::axis("X Axis", GUID_X_AXIS, 0, 255),
            VirtualObject::hat("Hat", 9000),
            VirtualObject::button("Fire"),
        ],
    );

    for (x, hat, fire) in [(0, -1, 0), (255, 0, 0x80), (10, 9000, 0), (10, 18000, 0), (10, 27000, 0)] {
        dinput.set_value(&STICK, "X Axis", x);
        dinput.set_value(&STICK, "Hat", hat);
        dinput.set_value(&STICK, "Fire", fire);
        let frame = manager.sample_all();
        let done = frame.get(DeviceId::Instance(STICK)).map(|d| d.fully_tested());
        assert_eq!(done, Some(hat == 27000));
    }
}

#[test]
fn hot_plug_through_stale_handles() {
    let (dinput, xinput, mut manager) = setup();
    assert!(manager.sample_all().is_empty());

    xinput.connect(1);
    dinput.attach(STICK, "Stick", vec![VirtualObject::button("Fire")]);
    assert!(manager.sample_all().is_empty());

    for handle in manager.stale_handles() {
        handle.mark();
    }
    assert_eq!(manager.sample_all().len(), 2);

    dinput.detach(&STICK);
    manager.mark_stale();
    let frame = manager.sample_all();
    assert_eq!(frame.len(), 1);
    assert!(frame.get(DeviceId::Slot(1)).is_some());
}

#[test]
fn snapshot_serializes() {
    let (_dinput, xinput, mut manager) = setup();
    xinput.connect(0);
    let frame = manager.sample_all();
    let json = frame.to_json().expect("json");
    assert!(json.contains("\"XInput 1\""));
    let back: stickcheck::Snapshot = serde_json::from_str(&json).expect("parse");
    assert_eq!(back, frame);
}
