use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{error::ParseError, Format, Netlist};

pub mod flat;
pub mod graph;

pub use flat::parse as parse_flat;
pub use graph::parse as parse_graph;

/// A parsed netlist together with the lines that were dropped on the way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<T> {
    pub netlist: T,
    /// Number of lines read, blank ones included
    pub lines_read: usize,
    /// 1-based numbers of non-blank lines that matched no grammar
    pub skipped: Vec<usize>,
}

impl<T> Parsed<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<U> {
        Parsed {
            netlist: f(self.netlist),
            lines_read: self.lines_read,
            skipped: self.skipped,
        }
    }
}

/// Opens `path` and parses it with the grammar its extension selects.
///
/// Returns `Ok(None)` for files that are neither format; the caller decides
/// how to treat them. Failing to open or read the file is the only error.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Option<Parsed<Netlist>>, ParseError> {
    let path = path.as_ref();
    let parsed = match Format::detect(path) {
        Format::Graph => graph::parse(BufReader::new(File::open(path)?))?.map(Netlist::from),
        Format::Flat => flat::parse(BufReader::new(File::open(path)?))?.map(Netlist::from),
        Format::Unknown => return Ok(None),
    };
    Ok(Some(parsed))
}

/// Streams `reader` one line at a time, handing each trimmed non-blank line
/// to `parse_line`. A `false` return marks the line as skipped.
fn parse_lines<R, T>(
    mut reader: R,
    format: Format,
    mut parse_line: impl FnMut(&mut T, &str) -> bool,
) -> Result<Parsed<T>, ParseError>
where
    R: BufRead,
    T: Default,
{
    let mut netlist = T::default();
    let mut skipped = Vec::new();
    let mut buf = Vec::new();
    let mut lines_read = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        lines_read += 1;

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !parse_line(&mut netlist, line) {
            tracing::debug!(?format, line = lines_read, "skipping unrecognised line");
            skipped.push(lines_read);
        }
    }

    tracing::debug!(
        ?format,
        lines_read,
        skipped = skipped.len(),
        "finished parsing netlist"
    );
    Ok(Parsed {
        netlist,
        lines_read,
        skipped,
    })
}
