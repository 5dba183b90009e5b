//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the graft crate,
//! including the [`GraphLike`] trait that the mutation methods live on.
//!
//! # Example
//!
//! ```rust,no_run
//! use graft::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let mut doc = GraphDocument::from_file("path/to/host.json")?;
//! let report = doc.graph.explode_unit("box")?;
//! println!("{}", report);
//! doc.save("path/to/host.json")?;
//! # Ok(())
//! # }
//! ```

// Data model
pub use crate::spec::{
    ExposedPinSpec, ExposedPinsSpec, Io, IoOf, MergeSpec, MergesSpec, OuterPlug, Pin,
    PlugBinding, SELF, SubPinSpec, Unit,
};

// Graphs
pub use crate::document::GraphDocument;
pub use crate::graph::{Graph, GraphLike};

// Move plans
pub use crate::collapse::{
    CollapseMap, ConnectOpt, GraphSelection, LinkRef, NextLink, NextMergePin, NextPlug,
    NextUnitPin, PlugRef, inline_plan,
};

// Engine
pub use crate::engine::{
    Direction, MoveReport, Scopes, SubgraphMove, encapsulate, inline, move_subgraph,
};

// Error types
pub use crate::error::{DocumentError, GraphError, MoveError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
