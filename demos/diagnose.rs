//! Lists every attached controller with its metadata and control layout.

#[cfg(all(windows, feature = "directinput", feature = "xinput"))]
fn main() {
    use stickcheck::{Device, SystemManager, TesterConfig};

    env_logger::init();
    let mut manager = SystemManager::discover(TesterConfig::default()).expect("open DirectInput");

    for d in manager.devices() {
        let meta = d.metadata();
        println!("== {} ({}) ==", d.name(), d.id());
        if let Some((vid, pid)) = meta.vid_pid() {
            println!("  VID:PID={vid:04x}:{pid:04x}");
        }
        println!(
            "  record={} bytes polled={} instance={:?}",
            meta.record_size, meta.needs_polling, meta.instance_name
        );

        let c = d.controls();
        for a in &c.axes {
            println!(
                "  axis   @{:02} {:?} range=[{}..{}] polled={}",
                a.offset(),
                a.name,
                a.declared_min(),
                a.declared_max(),
                a.polled
            );
        }
        for h in &c.hats {
            println!("  hat    @{:02} {:?} kind={:?}", h.offset(), h.name, h.kind);
        }
        for b in &c.buttons {
            println!("  button @{:02} {:?}", b.offset(), b.name);
        }
    }
}

#[cfg(not(all(windows, feature = "directinput", feature = "xinput")))]
fn main() {
    eprintln!("diagnose needs Windows with the directinput and xinput features");
}
