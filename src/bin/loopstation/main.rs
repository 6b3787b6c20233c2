//! loopstation - terminal loop station
//!
//! Run with: cargo run --bin loopstation
//!
//! Logs go to `loopstation.log` in the working directory (the terminal
//! belongs to the UI). Set `RUST_LOG=debug` for realtime engine records.

mod app;
mod audio;
mod ui;

use std::{fs::File, sync::Mutex};

use color_eyre::eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "loopstation.log";

fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging()?;

    let audio = audio::start().wrap_err("failed to start audio output")?;

    let mut terminal = ratatui::init();
    let result = app::App::new(audio.handle, audio.scope).run(&mut terminal);
    ratatui::restore();

    // Keep the stream alive until the UI exits.
    drop(audio.stream);
    result
}

fn init_logging() -> Result<()> {
    let file = File::create(LOG_FILE).wrap_err_with(|| format!("failed to create {LOG_FILE}"))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
