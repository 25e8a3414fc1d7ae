//! # Asciiv3 Text I/O
//!
//! Line-oriented event files. Each line starts with a one-letter tag:
//!
//! ```text
//! HepMC::Version 3.02.06
//! HepMC::Asciiv3-START_EVENT_LISTING
//! W nominal muR_up                    run: weight names
//! T Pythia\|8.310\|                   run: tool (name, version, description)
//! A ecm 13000                         run: attribute
//! E 1 2 3 @ 0 0 0 0                   event number, vertices, particles, position
//! U GEV MM                            units
//! W 1.0 0.5                           weights
//! A 0 alphaQCD 0.118                  attribute of owner 0 (event)
//! P 1 0 2212 0 0 6500 6500 0.938 4    id, mother, pid, px py pz e, mass, status
//! V -1 0 [1,2] @ 0 0 0.1 0.1          id, status, incoming ids, position
//! P 3 -1 21 ...
//! HepMC::Asciiv3-END_EVENT_LISTING
//! ```
//!
//! A particle's mother is either a vertex id (negative), the id of a single
//! mother particle whose end vertex is implicit (positive), or 0 for beams.
//! Attribute values and tool lines escape `\` as `\\` and newlines as `\|`.

mod fields;
pub mod reader;
pub mod writer;

use std::sync::Arc;

use crate::event::Event;
use crate::run_info::RunInfo;
use crate::Result;

pub use reader::AsciiReader;
pub use writer::AsciiWriter;

/// Format version written in the file header.
pub const FORMAT_VERSION: &str = "3.02.06";

pub(crate) const HEADER_START: &str = "HepMC::Asciiv3-START_EVENT_LISTING";
pub(crate) const HEADER_END: &str = "HepMC::Asciiv3-END_EVENT_LISTING";

// ============================================================================
// Reader / Writer contracts
// ============================================================================

/// A source of events.
pub trait Reader {
    /// Fill `evt` with the next record. `Ok(false)` at end of input.
    ///
    /// On error `evt` is left empty and the reader is marked failed.
    fn read_event(&mut self, evt: &mut Event) -> Result<bool>;

    /// Skip `n` records. `Ok(false)` if the input ended first.
    fn skip(&mut self, n: usize) -> Result<bool>;

    fn failed(&self) -> bool;

    fn run_info(&self) -> &Arc<RunInfo>;

    /// Iterate over the remaining records.
    fn events(&mut self) -> Events<'_, Self>
    where
        Self: Sized,
    {
        Events { reader: self }
    }
}

/// A sink of events.
pub trait Writer {
    fn write_event(&mut self, evt: &Event) -> Result<()>;

    fn set_run_info(&mut self, run_info: Arc<RunInfo>);

    /// Write the footer and flush. Later writes fail.
    fn close(&mut self) -> Result<()>;
}

/// Iterator over the records of a [`Reader`]. Stops after the first error.
pub struct Events<'r, R: Reader> {
    reader: &'r mut R,
}

impl<R: Reader> Iterator for Events<'_, R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut evt = Event::new();
        match self.reader.read_event(&mut evt) {
            Ok(true) => Some(Ok(evt)),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

// ============================================================================
// Escaping
// ============================================================================

/// `\` → `\\`, newline → `\|`.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\|"),
            c => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape`]. A trailing lone backslash is kept.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('|') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
