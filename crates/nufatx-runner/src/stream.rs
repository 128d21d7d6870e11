//! JSON-lines event stream reader.
//!
//! The first non-blank line of a stream is the run header ([`RunInfo`]);
//! every further non-blank line is one [`Event`]. Attribute values are
//! externally tagged, for example:
//!
//! ```text
//! {"weight_names":["CV"],"attributes":{"NuHepMC.Conventions":{"string_vec":["E.C.2"]}}}
//! {"number":0,"weights":[1.0],"particles":[{"pid":1000060120,"status":20}],"attributes":{"TotXS":{"double":12.5}}}
//! ```

use std::io::BufRead;

use nufatx_types::{Event, RunInfo};

use crate::error::RunnerError;

/// Iterator over the events of a JSON-lines stream.
pub struct EventStream<R> {
    lines: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> EventStream<R> {
    /// Read the run header and return it with an iterator over the events.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::EmptyStream`] if there is no header line,
    /// [`RunnerError::Parse`] if the header is not a valid run header, or
    /// [`RunnerError::Io`] if reading fails.
    pub fn open(reader: R) -> Result<(RunInfo, Self), RunnerError> {
        let mut stream = Self {
            lines: reader.lines(),
            line: 0,
        };
        let (line, text) = stream.next_line().ok_or(RunnerError::EmptyStream)??;
        let run = serde_json::from_str(&text).map_err(|source| RunnerError::Parse { line, source })?;
        Ok((run, stream))
    }

    /// The next non-blank line and its one-based number.
    fn next_line(&mut self) -> Option<Result<(usize, String), RunnerError>> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(source) => return Some(Err(RunnerError::Io { source })),
            };
            self.line = self.line.saturating_add(1);
            if !text.trim().is_empty() {
                return Some(Ok((self.line, text)));
            }
        }
    }
}

impl<R: BufRead> Iterator for EventStream<R> {
    type Item = Result<Event, RunnerError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_line()?.and_then(|(line, text)| {
            serde_json::from_str(&text).map_err(|source| RunnerError::Parse { line, source })
        }))
    }
}
