//! Reporting channel for lexical errors.

use std::fmt;

/// Receives lexical errors as the scanner finds them.
///
/// The scanner never inspects what the sink does with a report; scanning
/// always continues after `record` returns.
pub trait ErrorSink {
    /// Record one error at the given 1-indexed line.
    fn record(&mut self, line: usize, message: &str);
}

/// A recorded lexical error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] Error: {}", self.line, self.message)
    }
}

impl ErrorSink for Vec<Diagnostic> {
    fn record(&mut self, line: usize, message: &str) {
        self.push(Diagnostic {
            line,
            message: message.to_string(),
        });
    }
}

impl<S: ErrorSink + ?Sized> ErrorSink for &mut S {
    fn record(&mut self, line: usize, message: &str) {
        (**self).record(line, message);
    }
}
