//! iterast CLI
//!
//! Usage: iterast [--no-clear] <SCRIPT>

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use iterast::config::OutputFormat;
use iterast::presentation::Cli;
use iterast::{Config, Interpreter, ScriptParser, WatchOptions, WatchUseCase};

mod ui;

use ui::render::TerminalSink;
use ui::terminal::{color_enabled, detect_capabilities};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, warnings) = Config::load_for_script(&cli.script)
        .with_context(|| format!("failed to load configuration for {}", cli.script.display()))?;
    ui::output::print_config_warnings(&warnings);
    if cli.no_clear {
        config.output.clear = false;
    }

    let caps = detect_capabilities();
    let sink = TerminalSink::new(
        config.output.format,
        color_enabled(config.output.color, caps),
        caps.is_tty,
    );

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    if config.output.format == OutputFormat::Text && caps.is_tty {
        eprintln!("Type 'r' + Enter for a full reload, Ctrl+C to stop");
    }

    let options = WatchOptions::new(&cli.script)
        .with_config(&config)
        .with_operator_input(true);
    let executor = Interpreter::for_script(&cli.script);

    WatchUseCase::new(options)
        .start(ScriptParser::new(), executor, running, |event| sink.emit(event))
        .with_context(|| format!("failed to watch {}", cli.script.display()))?;

    Ok(())
}
