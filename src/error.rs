use crate::spec::Io;
use thiserror::Error;

/// Lookup and mutation failures on a single graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Unit '{0}' not found")]
    UnitNotFound(String),

    #[error("Unit '{0}' already exists")]
    DuplicateUnit(String),

    #[error("Unit '{0}' is not a graph unit")]
    NotAGraph(String),

    #[error("Unit '{unit_id}' has no {io} pin '{pin_id}'")]
    UnitPinNotFound {
        unit_id: String,
        io: Io,
        pin_id: String,
    },

    #[error("Merge '{0}' not found")]
    MergeNotFound(String),

    #[error("Merge '{0}' already exists")]
    DuplicateMerge(String),

    #[error("Exposed {io} pin '{pin_id}' not found")]
    PinNotFound { io: Io, pin_id: String },

    #[error("Exposed {io} pin '{pin_id}' already exists")]
    DuplicatePin { io: Io, pin_id: String },

    #[error("Exposed {io} pin '{pin_id}' has no plug '{sub_pin_id}'")]
    PlugNotFound {
        io: Io,
        pin_id: String,
        sub_pin_id: String,
    },

    #[error("Merge '{merge_id}' references unit '{unit_id}', which is not in the graph")]
    DanglingMergeUnit { merge_id: String, unit_id: String },

    #[error("Plug '{sub_pin_id}' of exposed {io} pin '{pin_id}' references missing '{target}'")]
    DanglingPlug {
        io: Io,
        pin_id: String,
        sub_pin_id: String,
        target: String,
    },
}

/// Errors raised while moving a subgraph between two graphs.
///
/// Nothing is rolled back: an error after the first mutation leaves both
/// graphs in the state reached so far.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Selected unit '{0}' is not present in the source graph")]
    MissingUnit(String),

    #[error("Selected merge '{0}' is not present in the source graph")]
    MissingMerge(String),

    #[error("Selected plug '{sub_pin_id}' of {io} pin '{pin_id}' is not present in the source graph")]
    MissingPlug {
        io: Io,
        pin_id: String,
        sub_pin_id: String,
    },

    #[error("Not implemented: {0}")]
    Unsupported(&'static str),
}

/// Errors that can occur when reading or writing graph documents.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to parse graph JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Could not access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
