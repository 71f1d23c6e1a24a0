use std::path::Path;

/// The interchange format of a netlist file, decided by its extension alone
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// Property header plus net/component/geometry records (`.d356`)
    Graph,
    /// Packed per-pin test-point records (`.ipc`)
    Flat,
    /// Not a netlist
    Unknown,
}

impl Format {
    pub fn detect(path: impl AsRef<Path>) -> Self {
        let Some(ext) = path.as_ref().extension().and_then(|ext| ext.to_str()) else {
            return Self::Unknown;
        };
        if ext.eq_ignore_ascii_case("d356") {
            Self::Graph
        } else if ext.eq_ignore_ascii_case("ipc") {
            Self::Flat
        } else {
            Self::Unknown
        }
    }
}
