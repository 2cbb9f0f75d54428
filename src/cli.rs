use anyhow::{Result, anyhow};
use log::{info, warn};
use pico_args::Arguments;
use std::{
    env, fs,
    io::{self, Read},
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use retroview::{
    ControllerState, Decoder, Session,
    config::{Profile, ProfileStore},
    dispatch::StateChange,
    smoothing::MouseSmoother,
    source::FrameReader,
};

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    // First free arg is the subcommand
    let subcmd: Option<String> = pargs.free_from_str().ok();

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.free_from_str().ok();
            if let Some(t) = topic {
                print_subcmd_help(&t);
            } else {
                print_help();
            }
            Ok(())
        }

        Some("formats") => {
            let formats: Vec<_> = Decoder::ALL
                .iter()
                .map(|d| serde_json::json!({"name": d.name(), "mouse": d.uses_smoothing()}))
                .collect();
            print_response(&serde_json::json!({"ok": true, "data": {"formats": formats}}));
            Ok(())
        }

        Some("decode") => {
            let bits = pargs.contains("--bits");
            let format: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: retroview decode [--bits] <format> <frame>"))?;
            let text: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: retroview decode [--bits] <format> <frame>"))?;
            let decoder = Decoder::from_name(&format)?;
            let frame = if bits { bits_frame(&text)? } else { text.into_bytes() };
            let resp = match decoder.decode(&frame, &mut MouseSmoother::default()) {
                Some(st) => serde_json::json!({"ok": true, "data": state_json(&st)}),
                None => serde_json::json!({"ok": false, "error": "unrecognized frame"}),
            };
            print_response(&resp);
            Ok(())
        }

        Some("replay") => {
            let profile = profile_from_args(&mut pargs)?;
            let frame_ms: u64 = pargs.opt_value_from_str("--frame-ms")?.unwrap_or(16);
            let input: Option<String> = pargs.free_from_str().ok();
            let mut session = Session::from_profile(&profile)?;
            let now = replay(&mut session, open_input(input.as_deref())?, frame_ms)?;
            print_response(&summary(&session, now));
            Ok(())
        }

        Some("watch") => {
            let profile = profile_from_args(&mut pargs)?;
            let device: PathBuf = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: retroview watch [--profile <name>] <device>"))?;
            let mut session = Session::from_profile(&profile)?;
            let now = watch(&mut session, &device)?;
            print_response(&summary(&session, now));
            Ok(())
        }

        Some("list") => {
            let store = ProfileStore::load_or_install_default()?;
            let list = store.list_profiles();
            print_response(
                &serde_json::json!({"ok": true, "data": {"profiles": list, "active": store.active_name}}),
            );
            Ok(())
        }

        Some("use") => {
            let name: String = pargs
                .free_from_str()
                .map_err(|_| anyhow!("usage: retroview use <profile_name>"))?;
            let mut store = ProfileStore::load_or_install_default()?;
            let resp = match store.set_active(&name) {
                Ok(_) => serde_json::json!({"ok": true, "data": {"active_profile": store.active_name}}),
                Err(e) => serde_json::json!({"ok": false, "error": e.to_string()}),
            };
            print_response(&resp);
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

/// `--file <path>` wins over `--profile <name>`; neither means the active
/// profile.
fn profile_from_args(pargs: &mut Arguments) -> Result<Profile> {
    let file: Option<PathBuf> = pargs.opt_value_from_str("--file")?;
    let name: Option<String> = pargs.opt_value_from_str("--profile")?;
    if let Some(path) = file {
        return Profile::from_path(&path);
    }
    let store = ProfileStore::load_or_install_default()?;
    match name {
        Some(n) => store.load(&n),
        None => Ok(store.profile),
    }
}

fn open_input(input: Option<&str>) -> Result<Box<dyn Read>> {
    match input {
        None | Some("-") => Ok(Box::new(io::stdin())),
        Some(path) => {
            let f = fs::File::open(path).map_err(|e| anyhow!("failed to open {path}: {e}"))?;
            Ok(Box::new(f))
        }
    }
}

/// Feed a capture through the session on a synthetic clock of `frame_ms`
/// per frame. Returns the final timestamp.
fn replay<R: Read>(session: &mut Session, input: R, frame_ms: u64) -> Result<u64> {
    let mut reader = FrameReader::new(input);
    let mut now = 0;
    let mut frame_no = 0u64;
    while let Some(frame) = reader.poll()? {
        session.tick(&frame, now, Some(frame_no));
        session.sweep(now);
        frame_no += 1;
        now += frame_ms;
    }
    info!("replay: {} frames, {} ms", reader.frames(), now);
    Ok(now)
}

/// Read a live device until it disconnects or we get SIGINT/SIGTERM.
fn watch(session: &mut Session, device: &Path) -> Result<u64> {
    use signal_hook::consts::{SIGINT, SIGTERM};

    let stop = Arc::new(AtomicBool::new(false));
    for sig in [SIGINT, SIGTERM] {
        // a second signal while we are stuck in a read exits hard
        signal_hook::flag::register_conditional_shutdown(sig, 1, Arc::clone(&stop))?;
        signal_hook::flag::register(sig, Arc::clone(&stop))?;
    }

    let f = fs::File::open(device).map_err(|e| anyhow!("failed to open {}: {e}", device.display()))?;
    info!(
        "watch: reading {} as {}",
        device.display(),
        session.decoder().name()
    );

    let start = Instant::now();
    let mut reader = FrameReader::new(f);
    let mut now = 0u64;
    while !stop.load(Ordering::Relaxed) {
        let frame = match reader.poll() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                info!("watch: {} disconnected", device.display());
                break;
            }
            Err(e) => {
                warn!("watch: {e}");
                break;
            }
        };
        now = start.elapsed().as_millis() as u64;
        if let Some(changes) = session.tick(&frame, now, Some(reader.frames())) {
            log_changes(&changes);
        }
        session.sweep(now);
    }
    Ok(now)
}

fn log_changes(changes: &[StateChange]) {
    for c in changes {
        info!(
            "{:>8} ms  {:<10} {}",
            c.time,
            c.input,
            if c.pressed { "down" } else { "up" }
        );
    }
}

/// `0`/`1` characters to 0x00/0x01 bytes, for the byte-per-bit formats.
fn bits_frame(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| match c {
            '0' => Ok(0u8),
            '1' => Ok(1u8),
            other => Err(anyhow!("--bits frames only take 0 and 1, got '{other}'")),
        })
        .collect()
}

fn state_json(st: &ControllerState) -> serde_json::Value {
    let buttons: serde_json::Map<_, _> = st
        .button_names()
        .iter()
        .map(|n| (n.clone(), serde_json::Value::Bool(st.button(n))))
        .collect();
    let analogs: serde_json::Map<_, _> = st
        .analog_names()
        .iter()
        .filter_map(|n| {
            st.analog(n)
                .map(|a| (n.clone(), serde_json::json!({"value": a.value, "raw": a.raw})))
        })
        .collect();
    let aux = st.aux().map(|bytes| {
        bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" ")
    });
    serde_json::json!({"buttons": buttons, "analogs": analogs, "aux": aux})
}

fn summary(session: &Session, now: u64) -> serde_json::Value {
    let stats = session.filter().stats();
    serde_json::json!({
        "ok": true,
        "data": {
            "format": session.decoder().name(),
            "now_ms": now,
            "counters": session.counters(),
            "filter": {
                "frames": stats.frames,
                "filtered": stats.filtered,
                "reverted": stats.reverted,
            },
            "inputs": session.snapshot(now),
            "last_state": session.last_state().map(state_json),
        }
    })
}

fn print_help() {
    println!(
        r#"retroview — retro controller input display core

USAGE:
  retroview help [command]                       Show general or command-specific help
  retroview formats                              List controller formats
  retroview decode [--bits] <format> <frame>     Decode a single frame
  retroview replay [--profile <name>|--file <path>] [--frame-ms N] [capture|-]
                                                 Run a capture through the pipeline
  retroview watch [--profile <name>|--file <path>] <device>
                                                 Read a live adapter until Ctrl-C
  retroview list                                 List profiles
  retroview use <name>                           Switch active profile

TIPS:
  - Profiles: ~/.config/retroview/profiles
  - Active profile pointer: ~/.config/retroview/active
  - RUST_LOG=debug shows filter reverts, RUST_LOG=trace unrecognized frames
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "formats" => println!("usage: retroview formats\nLists the decoder names a profile can use."),
        "decode" => println!(
            "usage: retroview decode [--bits] <format> <frame>\nDecodes one frame. With --bits, '0'/'1' characters become 0x00/0x01 bytes."
        ),
        "replay" => println!(
            "usage: retroview replay [--profile <name>|--file <path>] [--frame-ms N] [capture|-]\nFeeds a newline-delimited capture through decode, filter and history on a fixed clock, then prints per-input state and timeline segments."
        ),
        "watch" => println!(
            "usage: retroview watch [--profile <name>|--file <path>] <device>\nReads frames from a serial device and logs press/release transitions."
        ),
        "list" => println!("usage: retroview list\nLists available profiles and the active one."),
        "use" => println!("usage: retroview use <name>\nSwitches the active profile to <name>."),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}

fn print_response(v: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(v).unwrap_or_default());
}

#[cfg(test)]
mod tests {
    use super::*;
    use retroview::{filter::FilterConfig, timeline::TimelineConfig};

    #[test]
    fn bits_frame_parses_zero_one_text() {
        assert_eq!(bits_frame("1010 0000").ok(), Some(vec![1, 0, 1, 0, 0, 0, 0, 0]));
        assert_eq!(bits_frame("1,1").ok(), Some(vec![1, 1]));
        assert!(bits_frame("102").is_err());
    }

    #[test]
    fn replay_runs_capture_on_fixed_clock() {
        let mut session = Session::new(
            Decoder::from_name("nes").expect("nes"),
            ["a", "select"],
            FilterConfig::default(),
            TimelineConfig::default(),
        );
        let mut capture = Vec::new();
        for _ in 0..10 {
            capture.extend_from_slice(&[1, 0, 1, 0, 0, 0, 0, 0, b'\n']);
        }
        capture.extend_from_slice(b"junk\n");
        let now = replay(&mut session, &capture[..], 10).expect("replay");
        assert_eq!(now, 110);

        let counters = session.counters();
        assert_eq!(counters.recognized, 10);
        assert_eq!(counters.unrecognized, 1);
        let a = session.view("a", now).expect("a");
        assert!(a.pressed);
        assert_eq!(a.pressed_ms, 110);
        assert_eq!(a.presses_last_second, 1);
    }

    #[test]
    fn state_json_lists_as_given_names() {
        let st = Decoder::from_name("nes")
            .ok()
            .and_then(|d| d.decode(&[1, 0, 0, 0, 0, 0, 0, 0], &mut MouseSmoother::default()))
            .expect("frame");
        let v = state_json(&st);
        assert_eq!(v["buttons"]["a"], serde_json::Value::Bool(true));
        assert!(v["buttons"].get("A").is_none());
        assert!(v["aux"].is_null());
    }
}
