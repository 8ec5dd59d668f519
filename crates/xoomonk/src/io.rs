//! Pluggable sinks for `print` output.
//!
//! A small trait so host applications can capture or discard interpreter output instead of
//! writing straight to stdout, plus a couple of stock implementations. No redirect-stack
//! machinery: Xoomonk has no context-manager construct to redirect, so a plain trait object
//! covers every use this crate has for it.

use std::io::{self, Write as _};

/// Receives the text produced by `print`, `print char`, and `print string`.
///
/// Implementations write raw bytes; the evaluator is responsible for deciding what to
/// write and when (decimal rendering, the single character for `print char`, the literal
/// string, and the trailing newline unless suppressed by `;`).
pub trait PrintWriter {
    /// Writes a chunk of output verbatim.
    fn write_str(&mut self, text: &str);

    /// Writes a single newline.
    fn write_newline(&mut self) {
        self.write_str("\n");
    }
}

/// Writes directly to process stdout.
#[derive(Debug, Default)]
pub struct StdPrint;

impl PrintWriter for StdPrint {
    fn write_str(&mut self, text: &str) {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        let _ = lock.write_all(text.as_bytes());
    }
}

/// Collects output into an owned `String`; used by tests and embedders that want the
/// program's output back as a value instead of as a side effect.
#[derive(Debug, Default)]
pub struct CollectStringPrint(String);

impl CollectStringPrint {
    #[must_use]
    pub fn new() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn output(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_output(self) -> String {
        self.0
    }
}

impl PrintWriter for CollectStringPrint {
    fn write_str(&mut self, text: &str) {
        self.0.push_str(text);
    }
}

/// Discards all output; useful for benchmarking or when only the final value matters.
#[derive(Debug, Default)]
pub struct NoPrint;

impl PrintWriter for NoPrint {
    fn write_str(&mut self, _text: &str) {}
}
