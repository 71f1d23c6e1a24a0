use std::collections::HashMap;

pub mod chunk;
pub mod document;
mod error;
pub mod format;
mod lexer;
pub mod parse;
pub mod pipeline;

pub use chunk::Chunk;
pub use error::{Error, ParseError};
pub use format::Format;
pub use parse::{parse_file, Parsed};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Netlist {
    Graph(GraphNetlist),
    Flat(FlatNetlist),
}

impl Netlist {
    pub fn format(&self) -> Format {
        match self {
            Netlist::Graph(_) => Format::Graph,
            Netlist::Flat(_) => Format::Flat,
        }
    }
}

impl From<GraphNetlist> for Netlist {
    fn from(value: GraphNetlist) -> Self {
        Netlist::Graph(value)
    }
}

impl From<FlatNetlist> for Netlist {
    fn from(value: FlatNetlist) -> Self {
        Netlist::Flat(value)
    }
}

/// `P` line properties. Keys keep their first position; a repeated key
/// replaces the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Position of a pin, in raw file units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    /// Degrees, not range checked
    pub rotation: u32,
    pub symbol: String,
}

/// One net line of a graph-format netlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    pub net_id: String,
    /// Empty when the net line carries no name
    pub net_name: String,
    pub component: String,
    pub geometry: String,
    /// `None` when the geometry lacks any of the X, Y, R or S anchors
    pub placement: Option<Placement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub id: String,
    pub pins: Vec<Pin>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Net {
    pub id: String,
    pub name: Option<String>,
    pub connections: Vec<String>,
}

/// Components and nets iterate in the order they were first seen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphNetlist {
    metadata: Metadata,
    components: Vec<Component>,
    nets: Vec<Net>,
    component_index: HashMap<String, usize>,
    net_index: HashMap<String, usize>,
}

impl GraphNetlist {
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.component_index.get(id).map(|&i| &self.components[i])
    }

    pub fn net(&self, id: &str) -> Option<&Net> {
        self.net_index.get(id).map(|&i| &self.nets[i])
    }

    pub(crate) fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    pub(crate) fn add_pin(&mut self, pin: Pin) {
        let next = self.nets.len();
        let i = *self.net_index.entry(pin.net_id.clone()).or_insert(next);
        if i == next {
            self.nets.push(Net {
                id: pin.net_id.clone(),
                name: None,
                connections: vec![],
            });
        }
        let net = &mut self.nets[i];
        net.name = (!pin.net_name.is_empty()).then(|| pin.net_name.clone());
        net.connections.push(pin.component.clone());

        let next = self.components.len();
        let i = *self
            .component_index
            .entry(pin.component.clone())
            .or_insert(next);
        if i == next {
            self.components.push(Component {
                id: pin.component.clone(),
                pins: vec![],
            });
        }
        self.components[i].pins.push(pin);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinRecord {
    pub net: String,
    pub component: String,
    /// Pin number as written; the sign is kept
    pub pin: i64,
    pub x: i64,
    pub y: i64,
    pub rotation: u32,
    pub side: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatNetlist {
    pub pins: Vec<PinRecord>,
}
