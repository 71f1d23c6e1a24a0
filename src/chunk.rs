use std::{collections::HashMap, fmt::Display};

use crate::{Component, FlatNetlist, GraphNetlist, Metadata, Net, Netlist, Pin, PinRecord};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chunk(String);

impl Chunk {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Chunk {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Chunk> for String {
    fn from(value: Chunk) -> Self {
        value.0
    }
}

/// Graph netlists yield metadata, then components, then nets; flat netlists
/// one chunk per net. Both in first-seen order.
pub fn flatten(netlist: &Netlist) -> Vec<Chunk> {
    match netlist {
        Netlist::Graph(graph) => flatten_graph(graph),
        Netlist::Flat(flat) => flatten_flat(flat),
    }
}

pub fn flatten_graph(netlist: &GraphNetlist) -> Vec<Chunk> {
    let metadata = (!netlist.metadata().is_empty()).then(|| metadata_chunk(netlist.metadata()));
    metadata
        .into_iter()
        .chain(netlist.components().iter().map(component_chunk))
        .chain(netlist.nets().iter().map(net_chunk))
        .collect()
}

pub fn flatten_flat(netlist: &FlatNetlist) -> Vec<Chunk> {
    let mut groups: Vec<(&str, Vec<&PinRecord>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for record in &netlist.pins {
        let i = *index.entry(record.net.as_str()).or_insert_with(|| {
            groups.push((record.net.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[i].1.push(record);
    }

    groups
        .into_iter()
        .map(|(net, records)| {
            let lines: Vec<String> = records.into_iter().map(record_line).collect();
            Chunk(format!("Net: {net}\n{}", lines.join("\n")))
        })
        .collect()
}

fn metadata_chunk(metadata: &Metadata) -> Chunk {
    let lines: Vec<String> = metadata.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    Chunk(format!("Metadata:\n{}", lines.join("\n")))
}

fn component_chunk(component: &Component) -> Chunk {
    let lines: Vec<String> = component.pins.iter().map(pin_line).collect();
    Chunk(format!("Component: {}\n{}", component.id, lines.join("\n")))
}

fn pin_line(pin: &Pin) -> String {
    match &pin.placement {
        Some(p) => format!(
            "Pin connected to net '{}' (ID: {}) at ({}, {}), rotation {}, symbol {}",
            pin.net_name, pin.net_id, p.x, p.y, p.rotation, p.symbol
        ),
        None => format!(
            "Pin connected to net '{}' (ID: {}), geometry unavailable",
            pin.net_name, pin.net_id
        ),
    }
}

fn net_chunk(net: &Net) -> Chunk {
    let header = match &net.name {
        Some(name) => format!("Net: {} ({name})", net.id),
        None => format!("Net: {}", net.id),
    };
    Chunk(format!(
        "{header}\nConnected components: {}",
        net.connections.join(", ")
    ))
}

fn record_line(record: &PinRecord) -> String {
    format!(
        "Component {}, Pin {}, Pos ({},{}), Rot {}, Side {}",
        record.component, record.pin, record.x, record.y, record.rotation, record.side
    )
}
