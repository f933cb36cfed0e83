//! Per-engine diagnostic output
//!
//! Each engine instance is given its own [`DiagnosticSink`] at construction
//! time and writes its verbose output there. Silencing one transfer never
//! touches the process-wide stderr, so concurrent transfers cannot undo each
//! other's redirection.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Clone)]
enum Target {
    Discard,
    Stderr,
    Writer(Arc<Mutex<Box<dyn Write + Send>>>),
}

/// Writable destination for engine diagnostics
#[derive(Clone)]
pub struct DiagnosticSink {
    target: Target,
}

impl DiagnosticSink {
    /// Swallow everything
    pub fn discard() -> Self {
        Self {
            target: Target::Discard,
        }
    }

    /// Forward to the process stderr
    pub fn stderr() -> Self {
        Self {
            target: Target::Stderr,
        }
    }

    /// Forward to a caller-owned writer (log file, in-app console, ...)
    pub fn from_writer<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            target: Target::Writer(Arc::new(Mutex::new(Box::new(writer)))),
        }
    }

    pub fn is_discard(&self) -> bool {
        matches!(self.target, Target::Discard)
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::discard()
    }
}

impl fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.target {
            Target::Discard => "discard",
            Target::Stderr => "stderr",
            Target::Writer(_) => "writer",
        };
        f.debug_tuple("DiagnosticSink").field(&name).finish()
    }
}

impl Write for DiagnosticSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.target {
            Target::Discard => Ok(buf.len()),
            Target::Stderr => io::stderr().write(buf),
            Target::Writer(w) => w.lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &self.target {
            Target::Discard => Ok(()),
            Target::Stderr => io::stderr().flush(),
            Target::Writer(w) => w.lock().flush(),
        }
    }
}
