// Keywire CLI
// Inspect the layout-derived key map, inject keys and watch key events

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use keywire_core::input::list_keyboards;
use keywire_core::output::{Emission, EmissionLog, MemoryBackend};
use keywire_core::{
    key_from_name, KeyEvent, KeyWithModifier, LayoutIdentity, Listener, Modifier, Sender,
    SenderBuilder, Settings,
};

/// Layout-aware keyboard injection and key listening
#[derive(Parser, Debug)]
#[command(name = "keywire")]
#[command(version)]
#[command(about = "Layout-aware keyboard injection and key listening", long_about = None)]
struct Args {
    /// Settings file (default: ~/.config/keywire/settings.toml)
    #[arg(short, long, value_name = "FILE", global = true)]
    settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Record emissions in memory and print them instead of touching uinput
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the key -> code map for the active layout
    Keys,
    /// Print the layout in use and where it came from
    Layout,
    /// Press and release a key, e.g. `Ctrl+Shift+T` or `Enter`
    Tap { combo: String },
    /// Hold modifiers around a single key tap, e.g. `Ctrl+C`
    Combo { combo: String },
    /// Type text, by direct injection when available, else key by key
    Type { text: String },
    /// Print key events until interrupted
    Listen,
    /// List keyboard devices
    Devices,
    /// Print a commented default settings file
    DefaultSettings,
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<Settings> {
    match path {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("loading settings from {}", path.display())),
        None => Settings::load_default().context("loading default settings"),
    }
}

fn build_sender(settings: &Settings, dry_run: bool) -> (Sender, Option<EmissionLog>) {
    let builder = SenderBuilder::from_settings(settings);
    if dry_run {
        let backend = MemoryBackend::new();
        let log = backend.log();
        (builder.backend(backend).build(), Some(log))
    } else {
        (builder.build(), None)
    }
}

fn print_emissions(log: Option<EmissionLog>) {
    let Some(log) = log else {
        return;
    };
    for emission in log.all() {
        match emission {
            Emission::Key { code, down } => {
                println!("key {:>3} {}", code, if down { "down" } else { "up" })
            }
            Emission::Sync => println!("sync"),
            Emission::Text(text) => println!("text {:?}", text),
        }
    }
}

/// Tap each character, adding Shift for capitals
fn type_by_keys(sender: &mut Sender, text: &str) -> bool {
    let mut ok = true;
    for c in text.chars() {
        let Some(key) = key_from_name(&c.to_string()) else {
            log::warn!("No key for {:?}, skipping", c);
            ok = false;
            continue;
        };
        let mods = if c.is_ascii_uppercase() {
            Modifier::SHIFT
        } else {
            Modifier::NONE
        };
        ok &= sender.tap(KeyWithModifier::new(key, mods));
    }
    ok
}

fn run_listen(settings: &Settings) -> anyhow::Result<()> {
    let listener = Listener::from_settings(settings);
    listener
        .try_start(|event: KeyEvent| {
            println!(
                "{:<5} {:<14} mods={:<16} char={}",
                if event.pressed { "down" } else { "up" },
                event.key.to_string(),
                event.mods.to_string(),
                event.codepoint.map(|c| format!("{:?}", c)).unwrap_or_default()
            );
        })
        .context("starting listener")?;

    println!("Listening. Press Ctrl+C to exit.");
    let mut signals = Signals::new([SIGINT, SIGTERM]).context("installing signal handler")?;
    loop {
        if signals.pending().next().is_some() {
            break;
        }
        if !listener.is_listening() {
            listener.stop();
            bail!("listener stopped unexpectedly");
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    listener.stop();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let settings = load_settings(args.settings.as_ref())?;

    match args.command {
        Command::Keys => {
            let (sender, _) = build_sender(&settings, true);
            println!("# layout: {}", sender.layout());
            for (key, code) in sender.key_map().iter() {
                println!("{:<16} {}", key.to_string(), code);
            }
        }
        Command::Layout => {
            let source = if settings.layout_override().is_some() {
                "settings"
            } else {
                "detected"
            };
            let layout: LayoutIdentity = settings.resolve_layout();
            println!("{} ({})", layout, source);
        }
        Command::Tap { combo } => {
            let combo: KeyWithModifier = combo.parse()?;
            let (mut sender, log) = build_sender(&settings, args.dry_run);
            let ok = sender.tap(combo);
            print_emissions(log);
            if !ok {
                bail!("failed to tap {}", combo);
            }
        }
        Command::Combo { combo } => {
            let combo: KeyWithModifier = combo.parse()?;
            let (mut sender, log) = build_sender(&settings, args.dry_run);
            let ok = sender.combo(combo.required_mods, combo.key);
            print_emissions(log);
            if !ok {
                bail!("failed to send {}", combo);
            }
        }
        Command::Type { text } => {
            let (mut sender, log) = build_sender(&settings, args.dry_run);
            let ok = sender.type_text(&text) || type_by_keys(&mut sender, &text);
            print_emissions(log);
            if !ok {
                bail!("some characters could not be typed");
            }
        }
        Command::Listen => run_listen(&settings)?,
        Command::Devices => {
            let keyboards = list_keyboards();
            if keyboards.is_empty() {
                println!("No keyboards found (is /dev/input readable?)");
            }
            for keyboard in keyboards {
                println!(
                    "{}  {}{}",
                    keyboard.path,
                    keyboard.name,
                    if keyboard.is_virtual { "  [virtual]" } else { "" }
                );
            }
        }
        Command::DefaultSettings => print!("{}", keywire_core::settings::default_settings_content()),
    }

    Ok(())
}
