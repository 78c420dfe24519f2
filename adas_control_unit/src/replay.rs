//! JSON-lines tick input reader for offline replay.
//!
//! One [`TickInput`] per line. Blank lines and lines starting with `#` are
//! skipped.

use std::io::BufRead;

use adas_common::drive::command::TickInput;
use thiserror::Error;

/// Replay input error.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("replay I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("replay line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Iterator over tick inputs read from a buffered source.
#[derive(Debug)]
pub struct ReplayReader<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> ReplayReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// 1-based number of the last line read.
    #[inline]
    pub const fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for ReplayReader<R> {
    type Item = Result<TickInput, ReplayError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line += 1,
                Err(e) => return Some(Err(e.into())),
            }

            let trimmed = self.buf.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            return Some(serde_json::from_str(trimmed).map_err(|source| ReplayError::Parse {
                line: self.line,
                source,
            }));
        }
    }
}
