//! Single-line password reveal for the CLI.

use std::io::Write;

use crossterm::cursor::{MoveToColumn, MoveToPreviousLine};
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use sitepass_core::{Passcode, SecretDisplay};
use zeroize::Zeroizing;

/// Renders the revealed password and its countdown on the current line,
/// redrawing in place on every transition.
pub struct LineDisplay<W: Write> {
    out: W,
    text: Zeroizing<String>,
}

impl<W: Write> LineDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            text: Zeroizing::new(String::new()),
        }
    }

    /// The user pressed Enter, so the cursor sits one line below ours.
    pub fn rewind_line(&mut self) {
        if let Err(e) = self.out.queue(MoveToPreviousLine(1)) {
            tracing::warn!("terminal write failed: {e}");
        }
    }

    /// Terminate the line once the reveal is over.
    pub fn finish(&mut self) {
        let result = writeln!(self.out).and_then(|()| self.out.flush());
        if let Err(e) = result {
            tracing::warn!("terminal write failed: {e}");
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn redraw(&mut self, status: &str) {
        let result = self
            .out
            .queue(MoveToColumn(0))
            .and_then(|out| out.queue(Clear(ClearType::CurrentLine)))
            .and_then(|out| out.queue(Print(self.text.as_str())))
            .and_then(|out| out.queue(Print(status)))
            .and_then(|out| out.flush());
        if let Err(e) = result {
            tracing::warn!("terminal write failed: {e}");
        }
    }
}

impl<W: Write> SecretDisplay for LineDisplay<W> {
    fn show(&mut self, secret: &Passcode) {
        self.text = Zeroizing::new(secret.as_str().to_string());
    }

    fn clear(&mut self, placeholder: &str) {
        self.text = Zeroizing::new(placeholder.to_string());
    }

    fn countdown(&mut self, remaining: u32) {
        if remaining == 0 {
            self.redraw("");
        } else {
            self.redraw(&format!("   ({remaining}s, Enter to hide)"));
        }
    }
}
