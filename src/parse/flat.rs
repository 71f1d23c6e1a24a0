//! Flat format: one packed test-point record per line,
//! `<net> <component> <pin> PA<n>X<x>Y<y>...R<rot> S<side>`.

use std::io::BufRead;

use crate::{
    error::ParseError,
    lexer::{tokenize, Token, TokenKind},
    FlatNetlist, Format, PinRecord,
};

use super::{parse_lines, Parsed};

/// Parses a flat-format netlist from `reader`.
///
/// Records keep file order; grouping by net happens when the netlist is
/// flattened into chunks.
pub fn parse<R: BufRead>(reader: R) -> Result<Parsed<FlatNetlist>, ParseError> {
    let parsed = parse_lines(reader, Format::Flat, |netlist: &mut FlatNetlist, line| {
        match parse_record(line) {
            Some(record) => {
                netlist.pins.push(record);
                true
            }
            None => false,
        }
    })?;
    tracing::debug!(pins = parsed.netlist.pins.len(), "parsed flat netlist");
    Ok(parsed)
}

/// Finds the first run of fields `net component pin` followed by a
/// positional block. Boilerplate before or after the run is ignored.
fn parse_record(line: &str) -> Option<PinRecord> {
    let fields = fields(line);
    fields.windows(4).find_map(|window| {
        let [(_, net), (_, component), (_, pin), (block_start, _)] = window else {
            return None;
        };
        if !component.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return None;
        }
        let pin = parse_pin(pin)?;
        let block = parse_block(&line[*block_start..])?;
        Some(PinRecord {
            net: net.to_string(),
            component: component.to_string(),
            pin,
            x: block.x,
            y: block.y,
            rotation: block.rotation,
            side: block.side.to_owned(),
        })
    })
}

/// Whitespace-separated fields with their byte offsets
fn fields(line: &str) -> Vec<(usize, &str)> {
    let mut fields = Vec::new();
    let mut start = None;
    for (i, c) in line.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                fields.push((s, &line[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        fields.push((s, &line[s..]));
    }
    fields
}

/// `-?<digits>`; a leading `+` is not accepted
fn parse_pin(pin: &str) -> Option<i64> {
    let digits = pin.strip_prefix('-').unwrap_or(pin);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    pin.parse().ok()
}

struct Block<'a> {
    x: i64,
    y: i64,
    rotation: u32,
    side: &'a str,
}

/// `PA<digits>X<uint>Y<uint>`, then the last `R<uint> S<side>` pair on the line
fn parse_block(block: &str) -> Option<Block<'_>> {
    let tokens = tokenize(block);
    let [pad, x, y, rest @ ..] = tokens.as_slice() else {
        return None;
    };
    let unsigned =
        |token: &Token, kind: TokenKind| token.kind == kind && !token.is_signed(block);
    if pad.kind != TokenKind::Pad || !unsigned(x, TokenKind::X) || !unsigned(y, TokenKind::Y) {
        return None;
    }

    let (r, s) = rest.windows(3).rev().find_map(|triple| match triple {
        [r, gap, s]
            if r.kind == TokenKind::R && gap.kind == TokenKind::Gap && s.kind == TokenKind::S =>
        {
            Some((r, s))
        }
        _ => None,
    })?;

    Some(Block {
        x: x.digits(block).parse().ok()?,
        y: y.digits(block).parse().ok()?,
        rotation: r.digits(block).parse().ok()?,
        side: s.digits(block),
    })
}
