//! Samples every controller at the configured frame rate and prints a line
//! per device whenever its readings change.
//!
//! Pass a TOML config path as the first argument to override the defaults.

#[cfg(all(windows, feature = "directinput", feature = "xinput"))]
fn main() {
    use std::collections::HashMap;
    use std::time::{Duration, Instant};
    use stickcheck::{DeviceId, SystemManager, TesterConfig};

    env_logger::init();
    let config = match std::env::args().nth(1) {
        Some(path) => TesterConfig::load(path).expect("load config"),
        None => TesterConfig::default(),
    };
    let frame = Duration::from_secs(1) / config.max_fps.max(1);
    let mut manager = SystemManager::discover(config).expect("open DirectInput");

    // No window here, so hot-plug is picked up by re-enumerating periodically.
    let rescan_every = Duration::from_secs(2);
    let mut last_rescan = Instant::now();
    let mut last_lines: HashMap<DeviceId, String> = HashMap::new();

    loop {
        let started = Instant::now();
        if last_rescan.elapsed() >= rescan_every {
            manager.mark_stale();
            last_rescan = Instant::now();
        }

        for dev in manager.sample_all().iter() {
            let line = if !dev.readable {
                "could not read controller state".to_string()
            } else {
                let axes: Vec<String> = dev
                    .axes
                    .iter()
                    .map(|a| format!("{}={} {:?}", a.name, a.reading, a.coverage))
                    .collect();
                let hats: Vec<String> = dev
                    .hats
                    .iter()
                    .map(|h| format!("{}={:?}", h.name, h.direction))
                    .collect();
                let pressed: Vec<&str> = dev
                    .buttons
                    .iter()
                    .filter(|b| b.pressed)
                    .map(|b| b.name.as_str())
                    .collect();
                format!(
                    "{} | {} | pressed: {:?}{}",
                    axes.join(", "),
                    hats.join(", "),
                    pressed,
                    if dev.fully_tested() { " | fully tested" } else { "" }
                )
            };
            if last_lines.get(&dev.id) != Some(&line) {
                println!("[{}] {}", dev.name, line);
                last_lines.insert(dev.id, line);
            }
        }

        if let Some(rest) = frame.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }
}

#[cfg(not(all(windows, feature = "directinput", feature = "xinput")))]
fn main() {
    eprintln!("poll needs Windows with the directinput and xinput features");
}
