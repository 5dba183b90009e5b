//! # Graft - Structural Editing for Dataflow Graphs
//!
//! **Graft** moves parts of a live dataflow graph between a host graph and
//! the nested graph of one of its units. The same engine runs both ways:
//!
//! 1.  **Encapsulate**: lift a selection of units, merges and boundary plugs
//!     out of a host and into a graph unit, rewiring every connection that
//!     crosses the new boundary through boundary pins.
//! 2.  **Inline**: splice the contents of a graph unit back into its host,
//!     reconnecting the host wiring that reached the unit to the units that
//!     were inside it.
//!
//! A move is described by a [`collapse::CollapseMap`]: what moves, what each
//! id becomes on the other side, and which merges and boundary pins stand in
//! for the connections that were cut. For inlining, [`collapse::inline_plan`]
//! derives that map from the graphs themselves.
//!
//! ## Quick Start
//!
//! ```rust
//! use graft::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let mut host = Graph::new()
//!     .with_unit("x", Unit::new("source").with_output("o", Pin::new("number")))
//!     .with_unit("y", Unit::new("sink").with_input("i", Pin::new("number")))
//!     .with_unit("box", Unit::graph("box", Graph::new()))
//!     .with_merge(
//!         "m",
//!         MergeSpec::new()
//!             .with_pin("x", Io::Output, "o")
//!             .with_pin("y", Io::Input, "i"),
//!     );
//!
//! // Move `y` into `box`; its input surfaces as the boundary pin `i`.
//! let map = CollapseMap::new(GraphSelection::units(["y"]))
//!     .with_unit_pin("y", Io::Input, "i", NextUnitPin::exposed("i", "0").merged("m", None));
//! let report = host.encapsulate_into("box", map)?;
//! println!("{}", report);
//!
//! // And dissolve `box` again.
//! host.explode_unit("box")?;
//! assert!(host.has_unit("y"));
//! assert!(host.has_merge_pin("m", "y", Io::Input, "i"));
//! # Ok(())
//! # }
//! # run_example().unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! - `graft-cli`: builds the `graft-cli` binary, which applies a move to a
//!   graph document on disk.

pub mod collapse;
pub mod document;
pub mod engine;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod spec;
