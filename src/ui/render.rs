//! Log sink for reload events
//!
//! Text lines (`[reset]`, `[eval] x = 1`, ...) or one JSON object per line.

use std::io::{self, Write};

use crossterm::style::{Color, Stylize};
use iterast::application::ReloadEvent;
use iterast::config::OutputFormat;

use super::terminal::clear_screen;
use super::theme::colors;

/// Formats a single event as one log line
#[derive(Debug, Clone, Copy)]
pub struct EventRenderer {
    format: OutputFormat,
    color: bool,
}

impl EventRenderer {
    pub fn new(format: OutputFormat, color: bool) -> Self {
        Self { format, color }
    }

    pub fn render(&self, event: &ReloadEvent) -> String {
        match self.format {
            OutputFormat::Json => event.to_json(),
            OutputFormat::Text => self.render_text(event),
        }
    }

    fn render_text(&self, event: &ReloadEvent) -> String {
        let line = event.to_string();
        let Some(color) = tag_color(event).filter(|_| self.color) else {
            return line;
        };

        // Only the bracketed tag is coloured; statement text stays verbatim.
        match line.split_once("] ") {
            Some((tag, rest)) => {
                let tag = format!("{tag}]");
                format!("{} {rest}", tag.as_str().with(color))
            }
            None => line.as_str().with(color).to_string(),
        }
    }
}

fn tag_color(event: &ReloadEvent) -> Option<Color> {
    match event {
        ReloadEvent::Exception { .. }
        | ReloadEvent::SyntaxError { .. }
        | ReloadEvent::Unreadable { .. } => Some(colors::ERROR),
        ReloadEvent::Reset { .. } | ReloadEvent::FullReload => Some(colors::WARNING),
        ReloadEvent::Reload { .. } => Some(colors::INFO),
        ReloadEvent::WatchStarted { .. } | ReloadEvent::Shutdown => Some(colors::DIM),
        ReloadEvent::Eval { .. } => None,
    }
}

/// Writes rendered events to the terminal
///
/// In text mode failures go to stderr and everything else to stdout; JSON
/// mode keeps the whole stream on stdout.
pub struct TerminalSink {
    renderer: EventRenderer,
    format: OutputFormat,
    clear_terminal: bool,
}

impl TerminalSink {
    /// `clear_terminal` should only be true when stdout is a terminal
    pub fn new(format: OutputFormat, color: bool, clear_terminal: bool) -> Self {
        Self {
            renderer: EventRenderer::new(format, color),
            format,
            clear_terminal: clear_terminal && format == OutputFormat::Text,
        }
    }

    pub fn emit(&self, event: ReloadEvent) {
        let _ = self.emit_to(&event, &mut io::stdout().lock(), &mut io::stderr().lock());
    }

    pub(crate) fn emit_to(
        &self,
        event: &ReloadEvent,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> io::Result<()> {
        if self.clear_terminal && matches!(event, ReloadEvent::Reset { clear_screen: true }) {
            clear_screen(out)?;
        }

        let line = self.renderer.render(event);
        if self.format == OutputFormat::Text && event.is_error() {
            writeln!(err, "{line}")
        } else {
            writeln!(out, "{line}")?;
            out.flush()
        }
    }
}
