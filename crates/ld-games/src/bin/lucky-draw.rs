//! Terminal front end for the lucky-draw games
//!
//! One command per line: `<game> <action> [arg]`. State persists under
//! the platform config directory, so sessions pick up where they left
//! off. Reveals run on the instant profile; the animations belong to the
//! graphical front ends.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use ld_core::{LogSink, NotificationSink};
use ld_games::{
    GachaController, PickerController, RevealProfile, ScratchController, SlotController,
    SlotMode, WheelController, WheelMode,
};
use ld_state::{JsonFileStore, LogEntry};

const USAGE: &str = "\
commands:
  gacha   draw | undo | log [n] | export | import <file> | reset
  picker  pick | undo | clear | log [n] | export | import <file> | reset
  wheel   spin | undo | dup on|off | mode person|prize | clear | log [n] | export | import <file> | reset
  slot    spin | mode pool|weight | log [n] | export | import <file> | reset
  scratch card | reveal | session | log [n] | export | import <file> | reset
  quit";

struct Games {
    gacha: GachaController<JsonFileStore>,
    picker: PickerController<JsonFileStore>,
    wheel: WheelController<JsonFileStore>,
    slot: SlotController<JsonFileStore>,
    scratch: ScratchController<JsonFileStore>,
}

impl Games {
    fn new(store: JsonFileStore, sink: Arc<dyn NotificationSink>) -> Self {
        let mut gacha = GachaController::new(store.clone(), sink.clone());
        let mut picker = PickerController::new(store.clone(), sink.clone());
        let mut wheel = WheelController::new(store.clone(), sink.clone());
        let mut slot = SlotController::new(store.clone(), sink.clone());
        let scratch = ScratchController::new(store, sink);

        gacha.set_profile(RevealProfile::Instant);
        picker.set_profile(RevealProfile::Instant);
        wheel.set_profile(RevealProfile::Instant);
        slot.set_profile(RevealProfile::Instant);

        Self {
            gacha,
            picker,
            wheel,
            slot,
            scratch,
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("starting lucky-draw");

    let sink: Arc<dyn NotificationSink> = Arc::new(LogSink);
    let mut games = Games::new(JsonFileStore::default_location(), sink);

    println!("{USAGE}");
    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let mut parts = line.split_whitespace();
        let (game, action) = match (parts.next(), parts.next()) {
            (Some("quit" | "exit"), _) => break,
            (Some(game), Some(action)) => (game, action),
            _ => {
                println!("{USAGE}");
                continue;
            }
        };
        let arg = parts.next();
        dispatch(&mut games, game, action, arg);
    }
}

fn dispatch(games: &mut Games, game: &str, action: &str, arg: Option<&str>) {
    match (game, action) {
        ("gacha", "draw") => {
            if games.gacha.draw() {
                games.gacha.tick(0.0);
                print_latest(games.gacha.logs().recent(1));
            }
        }
        ("gacha", "undo") => {
            games.gacha.undo();
        }
        ("gacha", "log") => print_log(games.gacha.logs().recent(parse_count(arg))),
        ("gacha", "export") => export(games.gacha.export()),
        ("gacha", "import") => import(arg, |raw| games.gacha.import(raw)),
        ("gacha", "reset") => games.gacha.reset(),

        ("picker", "pick") => {
            if games.picker.pick() {
                games.picker.tick(0.0);
                print_latest(games.picker.logs().recent(1));
            }
        }
        ("picker", "undo") => {
            games.picker.undo();
        }
        ("picker", "clear") => games.picker.clear_drawn(),
        ("picker", "log") => print_log(games.picker.logs().recent(parse_count(arg))),
        ("picker", "export") => export(games.picker.export()),
        ("picker", "import") => import(arg, |raw| games.picker.import(raw)),
        ("picker", "reset") => games.picker.reset(),

        ("wheel", "spin") => {
            if games.wheel.spin() {
                games.wheel.tick(0.0);
                print_latest(games.wheel.logs().recent(1));
            }
        }
        ("wheel", "undo") => {
            games.wheel.undo();
        }
        ("wheel", "dup") => games.wheel.set_allow_duplicate(arg == Some("on")),
        ("wheel", "mode") => games.wheel.set_mode(match arg {
            Some("prize") => WheelMode::Prize,
            _ => WheelMode::Person,
        }),
        ("wheel", "clear") => games.wheel.clear_drawn(),
        ("wheel", "log") => print_log(games.wheel.logs().recent(parse_count(arg))),
        ("wheel", "export") => export(games.wheel.export()),
        ("wheel", "import") => import(arg, |raw| games.wheel.import(raw)),
        ("wheel", "reset") => games.wheel.reset(),

        ("slot", "spin") => {
            if games.slot.spin() {
                games.slot.tick(0.0);
                print_latest(games.slot.logs().recent(1));
            }
        }
        ("slot", "mode") => games.slot.set_mode(match arg {
            Some("weight") => SlotMode::Weight,
            _ => SlotMode::Pool,
        }),
        ("slot", "log") => print_log(games.slot.logs().recent(parse_count(arg))),
        ("slot", "export") => export(games.slot.export()),
        ("slot", "import") => import(arg, |raw| games.slot.import(raw)),
        ("slot", "reset") => games.slot.reset(),

        ("scratch", "card") => {
            if games.scratch.prepare_card() {
                println!("card ready, scratch it with: scratch reveal");
            }
        }
        ("scratch", "reveal") => {
            if let Some(result) = games.scratch.reveal() {
                println!("-> {}", result.prize);
            } else {
                println!("no card on the table");
            }
        }
        ("scratch", "session") => games.scratch.new_session(),
        ("scratch", "log") => print_log(games.scratch.logs().recent(parse_count(arg))),
        ("scratch", "export") => export(games.scratch.export()),
        ("scratch", "import") => import(arg, |raw| games.scratch.import(raw)),
        ("scratch", "reset") => games.scratch.reset(),

        _ => println!("{USAGE}"),
    }
}

fn parse_count(arg: Option<&str>) -> usize {
    arg.and_then(|a| a.parse().ok()).unwrap_or(10)
}

fn print_latest(entries: &[LogEntry]) {
    if let Some(entry) = entries.first() {
        println!("-> {}", entry.result);
    }
}

fn print_log(entries: &[LogEntry]) {
    if entries.is_empty() {
        println!("(no history)");
    }
    for entry in entries {
        println!("{}  {:8}  {}", entry.timestamp, entry.action, entry.result);
    }
}

fn export(result: ld_core::LdResult<(String, String)>) {
    match result {
        Ok((filename, text)) => match std::fs::write(&filename, text) {
            Ok(()) => println!("wrote {filename}"),
            Err(e) => println!("write failed: {e}"),
        },
        Err(e) => println!("export failed: {e}"),
    }
}

fn import(arg: Option<&str>, apply: impl FnOnce(&str) -> ld_core::LdResult<()>) {
    let Some(path) = arg else {
        println!("usage: <game> import <file>");
        return;
    };
    match std::fs::read_to_string(path) {
        Ok(raw) => {
            if apply(&raw).is_ok() {
                println!("imported {path}");
            }
        }
        Err(e) => println!("read failed: {e}"),
    }
}
