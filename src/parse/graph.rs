//! Graph format: `P <key> <value>` property lines followed by
//! `<netid><netname> <component> <geometry>` net lines.

use std::io::BufRead;

use crate::{
    error::ParseError,
    lexer::{tokenize, Token, TokenKind},
    Format, GraphNetlist, Metadata, Pin, Placement,
};

use super::{parse_lines, Parsed};

/// Parses a graph-format netlist from `reader`.
///
/// Lines matching neither the property nor the net-line grammar are dropped
/// and their numbers reported in [`Parsed::skipped`].
pub fn parse<R: BufRead>(reader: R) -> Result<Parsed<GraphNetlist>, ParseError> {
    let parsed = parse_lines(reader, Format::Graph, parse_line)?;
    tracing::debug!(
        components = parsed.netlist.components().len(),
        nets = parsed.netlist.nets().len(),
        properties = parsed.netlist.metadata().len(),
        "parsed graph netlist"
    );
    Ok(parsed)
}

fn parse_line(netlist: &mut GraphNetlist, line: &str) -> bool {
    if let Some(rest) = line.strip_prefix("P ") {
        return parse_property(netlist.metadata_mut(), rest);
    }
    match parse_net_line(line) {
        Some(pin) => {
            netlist.add_pin(pin);
            true
        }
        None => false,
    }
}

fn parse_property(metadata: &mut Metadata, rest: &str) -> bool {
    let Some((key, value)) = split_field(rest.trim_start()) else {
        return false;
    };
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return false;
    }
    metadata.insert(key, value);
    true
}

fn parse_net_line(line: &str) -> Option<Pin> {
    let (head, rest) = split_field(line)?;
    let id_len = head
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(head.len());
    if id_len == 0 {
        return None;
    }
    let (net_id, net_name) = head.split_at(id_len);

    let (component, geometry) = split_field(rest)?;
    if component.is_empty() || geometry.is_empty() {
        return None;
    }

    Some(Pin {
        net_id: net_id.to_owned(),
        net_name: net_name.to_owned(),
        component: component.to_owned(),
        geometry: geometry.to_owned(),
        placement: parse_placement(geometry),
    })
}

/// Splits off the first whitespace-delimited field
fn split_field(s: &str) -> Option<(&str, &str)> {
    let (field, rest) = s.split_once(char::is_whitespace)?;
    Some((field, rest.trim_start()))
}

/// Locates `X<int>Y<int>`, then the first `R<uint>` after it, then the first
/// `S<token>` after that. Anything may sit between the anchors.
fn parse_placement(geometry: &str) -> Option<Placement> {
    let tokens = tokenize(geometry);
    let packed = |token: &Token, kind: TokenKind| token.kind == kind && !token.is_spaced(geometry);

    let at = tokens
        .windows(2)
        .position(|pair| packed(&pair[0], TokenKind::X) && packed(&pair[1], TokenKind::Y))?;
    let rest = &tokens[at + 2..];
    let r = rest.iter().position(|token| token.kind == TokenKind::R)?;
    let s = rest[r + 1..]
        .iter()
        .find(|token| token.kind == TokenKind::S)?;

    Some(Placement {
        x: tokens[at].digits(geometry).parse().ok()?,
        y: tokens[at + 1].digits(geometry).parse().ok()?,
        rotation: rest[r].digits(geometry).parse().ok()?,
        symbol: s.digits(geometry).to_owned(),
    })
}
