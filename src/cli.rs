use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};

pub const USAGE: &str = "Usage: ascii-typewriter <text_file_path> [--font <plain|block|PATH>] [--delay <SECONDS>] [--config <PATH>] [--log-file <PATH>]";

pub const HELP: &str = "ascii-typewriter — types a text file out character by character

Usage:
  ascii-typewriter <text_file_path> [OPTIONS]

Options:
  --font <plain|block|PATH>  Font name or JSON bitmap font file (default: plain)
  --delay <SECONDS>          Initial per-character delay (minimum 0.01)
  --config <PATH>            JSON player config
  --log-file <PATH>          Write log output to a file instead of stderr
  -h, --help                 Show this help

Keys:
  any key  start (on the splash screen)
  Up       type faster
  Down     type slower
  Esc      quit

Logging:
  Warnings (such as lines the font cannot draw) go to stderr, which is
  the terminal being drawn on, and can garble the screen. Pass
  --log-file to keep them off it. RUST_LOG sets the log level.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    pub text_path: PathBuf,
    pub font: Option<String>,
    pub delay: Option<f64>,
    pub config: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play(Args),
    Help,
}

pub fn parse<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut text_path = None;
    let mut parsed = Args::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--font" => parsed.font = Some(value(&mut args, "--font")?),
            "--delay" => {
                let raw = value(&mut args, "--delay")?;
                let delay = raw
                    .parse::<f64>()
                    .with_context(|| format!("Invalid --delay {raw:?}\n{USAGE}"))?;
                parsed.delay = Some(delay);
            }
            "--config" => parsed.config = Some(value(&mut args, "--config")?.into()),
            "--log-file" => parsed.log_file = Some(value(&mut args, "--log-file")?.into()),
            flag if flag.starts_with("--") => bail!("Unknown option {flag}\n{USAGE}"),
            path => {
                if text_path.is_some() {
                    bail!("Unexpected argument {path:?}\n{USAGE}");
                }
                text_path = Some(PathBuf::from(path));
            }
        }
    }

    parsed.text_path = text_path.ok_or_else(|| anyhow!(USAGE))?;
    Ok(Command::Play(parsed))
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .with_context(|| format!("{flag} needs a value\n{USAGE}"))
}
