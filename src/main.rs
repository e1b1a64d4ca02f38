use std::fs::File;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};

use ascii_typewriter::{
    cli::{self, Command, HELP},
    config::PlayerConfig,
    font::Font,
    player::Player,
    source::TextSource,
    surface::{Surface, TerminalSurface},
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = match cli::parse(std::env::args().skip(1))? {
        Command::Help => {
            println!("{HELP}");
            return Ok(());
        }
        Command::Play(args) => args,
    };

    init_logging(args.log_file.as_deref())?;

    let mut config = match &args.config {
        Some(path) => PlayerConfig::load(path)?,
        None => PlayerConfig::default(),
    };
    if let Some(font) = args.font {
        config.font = font;
    }
    if let Some(delay) = args.delay {
        config.delay = delay;
    }
    let config = config.normalized();

    let font = Font::load(&config.font, config.tab_width)?;
    let source = TextSource::load(&args.text_path)?;

    // Everything above fails before the terminal is touched.
    let mut surface = TerminalSurface::open()?;
    let size = surface.size()?;
    let mut player = Player::new(&source, &config, font, size);
    player.run(&mut surface)
}

// Logging setup lives in the binary so the library stays unopinionated.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}
