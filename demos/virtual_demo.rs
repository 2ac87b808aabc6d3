use stickcheck::backends::gamepad::{buttons, GamepadReport, XInputSource};
use stickcheck::backends::legacy::DirectInputSource;
use stickcheck::backends::virtual_input::{VirtualDirectInput, VirtualObject, VirtualXInput};
use stickcheck::layout::{GUID_X_AXIS, GUID_Y_AXIS};
use stickcheck::{Manager, TesterConfig};
use uuid::Uuid;

fn main() {
    env_logger::init();

    // Create a virtual joystick and a virtual XInput pad
    let dinput = VirtualDirectInput::new();
    let xinput = VirtualXInput::new();
    let stick = Uuid::from_u128(0xDE40);
    dinput.attach(
        stick,
        "Demo Virtual Stick",
        vec![
            VirtualObject::axis("X Axis", GUID_X_AXIS, 0, 65535),
            VirtualObject::axis("Y Axis", GUID_Y_AXIS, 0, 65535),
            VirtualObject::hat("Hat Switch", 4500),
            VirtualObject::button("Trigger"),
        ],
    );
    xinput.connect(0);

    let config = TesterConfig::default();
    let capacity = config.history_capacity();
    let mut manager = Manager::new(
        DirectInputSource::new(dinput.clone(), capacity),
        XInputSource::new(xinput.clone(), capacity),
        config,
    );

    // Inject some sample input
    dinput.set_value(&stick, "X Axis", 49152);
    dinput.set_value(&stick, "Hat Switch", 13500);
    dinput.set_value(&stick, "Trigger", 0x80);
    xinput.set(
        0,
        GamepadReport {
            buttons: buttons::A | buttons::DPAD_UP,
            thumb_lx: -16384,
            ..Default::default()
        },
    );

    // Sample one frame and print it
    let frame = manager.sample_all();
    match frame.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("could not serialize snapshot: {e}"),
    }
}
