use std::fs::File;
use std::path::Path;
use std::process;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use ascii_circles::{config::AnimationConfig, engine::CommandInterpreter, player::Player};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const PLAY_USAGE: &str = "ascii-circles play [--config <file.json>] [--log <file>] [--seed <n>]";
const KEYS_USAGE: &str = "ascii-circles keys [--config <file.json>]";
const CONFIG_USAGE: &str = "ascii-circles config";

#[derive(Default)]
struct Options {
    config: Option<String>,
    log: Option<String>,
    seed: Option<u64>,
}

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("play") => {
            let options = parse_options(args, PLAY_USAGE)?;
            play(options)
        }
        Some("keys") => {
            let options = parse_options(args, KEYS_USAGE)?;
            keys(options)
        }
        Some("config") => {
            println!("{}", serde_json::to_string_pretty(&AnimationConfig::default())?);
            Ok(())
        }
        _ => bail!(
            "ASCII Circles — drifting circles in the terminal\n\nUsage:\n  {PLAY_USAGE}\n  {KEYS_USAGE}\n  {CONFIG_USAGE}"
        ),
    }
}

fn parse_options(mut args: impl Iterator<Item = String>, usage: &str) -> Result<Options> {
    let mut options = Options::default();
    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--config" => options.config = Some(args.next().context(usage.to_string())?),
            "--log" => options.log = Some(args.next().context(usage.to_string())?),
            "--seed" => {
                let raw = args.next().context(usage.to_string())?;
                let seed = raw
                    .parse()
                    .with_context(|| format!("Invalid seed {raw:?}"))?;
                options.seed = Some(seed);
            }
            other => bail!("Unexpected argument {other:?}\n\nUsage:\n  {usage}"),
        }
    }
    Ok(options)
}

fn init_logging(path: &str) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {path}"))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_config(options: &Options) -> Result<AnimationConfig> {
    let mut config = AnimationConfig::load(options.config.as_deref().map(Path::new))?;
    if options.seed.is_some() {
        config.seed = options.seed;
    }
    Ok(config)
}

fn play(options: Options) -> Result<()> {
    // Raw mode owns the terminal, so logs only go to a file.
    if let Some(path) = &options.log {
        init_logging(path)?;
    }
    let settings = load_config(&options)?
        .validate()
        .context("Invalid configuration")?;

    let mut player = Player::new(settings)?;
    player.play()
}

fn keys(options: Options) -> Result<()> {
    let settings = load_config(&options)?
        .validate()
        .context("Invalid configuration")?;
    let interpreter = CommandInterpreter::new(settings.keymap);
    println!("{}", interpreter.help_text());
    println!("  {:<12} quit", settings.quit.to_string());
    Ok(())
}
