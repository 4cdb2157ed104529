//! # Posetgraph
//!
//! Posetgraph is a small directed-graph algebra kernel: labeled directed
//! graphs and the handful of algorithms needed to turn an arbitrary directed
//! graph into a partial order.
//!
//! - [`LabeledDirectedGraph`]: mutable graph with string labels on vertices and
//!   edges, arena-backed with dense [`VertexIndex`] ids.
//! - [`algorithms`]: topological sort, strongly connected components,
//!   condensation, transitive closure and reduction. The traversals use
//!   explicit stacks, so deep graphs do not exhaust the call stack.
//! - [`Poset`]: the partial order of a DAG with ancestor, descendant and
//!   covering queries.
//!
//! ```
//! use posetgraph::{LabeledDirectedGraph, Poset};
//!
//! let mut g = LabeledDirectedGraph::new();
//! g.add_edge(1, 2);
//! g.add_edge(2, 3);
//! g.add_edge(3, 1);
//! g.add_edge(3, 4);
//!
//! let condensed = g.condensation();
//! assert_eq!(condensed.len(), 2);
//!
//! let poset = Poset::new(condensed.graph()).unwrap();
//! let cycle = condensed.component_of(&1).unwrap();
//! let tail = condensed.component_of(&4).unwrap();
//! assert!(poset.less(&cycle, &tail));
//! ```

pub mod typed_vec;

pub mod algorithms;
pub mod error;
pub mod graph;
pub mod poset;

pub use algorithms::{
    condensation, strongly_connected_components, topological_sort, transitive_closure,
    transitive_reduction, Condensation,
};
pub use error::{ArenaError, GraphError};
pub use graph::{dot::DotOptions, LabeledDirectedGraph, VertexIndex, VertexVec};
pub use poset::Poset;
