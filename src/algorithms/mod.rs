//! # Graph Algorithms
//!
//! Traversal-based algorithms over directed graphs. Every algorithm is
//! available in two forms:
//!
//! - as a free function over a vertex collection and an *adjacency function*
//!   (`FnMut(&V) -> impl IntoIterator<Item = V>`), for callers whose graph is
//!   implicit or computed lazily;
//! - as a method on [`LabeledDirectedGraph`](crate::graph::LabeledDirectedGraph),
//!   which traverses the arena directly.
//!
//! All traversals are iterative and keep their work list on the heap, so graph
//! size is bounded by memory and not by call-stack depth.
//!
//! ## Available Algorithms
//!
//! - [`topological_order`]: postorder topological sort with cycle detection
//! - [`scc`]: strongly connected components (iterative Tarjan)
//! - [`condensation`]: quotient DAG over the strongly connected components
//! - [`transitive_ops`]: transitive closure and transitive reduction of a DAG

use std::hash::Hash;

use indexmap::IndexSet;

use crate::graph::{LabeledDirectedGraph, VertexIndex};

pub mod condensation;
pub mod scc;
pub mod topological_order;
pub mod transitive_ops;

pub use condensation::{condensation, Condensation};
pub use scc::strongly_connected_components;
pub use topological_order::topological_sort;
pub use transitive_ops::{transitive_closure, transitive_reduction};

/// Work-list entry of the explicit-stack depth-first traversals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Visit {
    /// First visit: discover the vertex and schedule its children.
    Enter(usize),
    /// All children are done: finish the vertex.
    Exit(usize),
}

/// Out-neighbours over dense `usize` ids.
///
/// Ids are handed out contiguously from zero. An implementation may discover
/// new vertices while answering [`successors`](DenseAdjacency::successors), in
/// which case [`len`](DenseAdjacency::len) grows.
pub(crate) trait DenseAdjacency {
    fn len(&self) -> usize;

    fn successors(&mut self, vertex: usize) -> Vec<usize>;
}

pub(crate) struct GraphAdjacency<'a, V>(pub &'a LabeledDirectedGraph<V>);

impl<V> DenseAdjacency for GraphAdjacency<'_, V> {
    fn len(&self) -> usize {
        self.0.n_vertices()
    }

    fn successors(&mut self, vertex: usize) -> Vec<usize> {
        self.0.successors(VertexIndex(vertex)).map(|t| t.0).collect()
    }
}

/// Interns the vertices of an adjacency function on first sight.
pub(crate) struct LazyAdjacency<V, F> {
    vertices: IndexSet<V>,
    adjacencies: F,
}

impl<V, F, A> LazyAdjacency<V, F>
where
    V: Clone + Eq + Hash,
    F: FnMut(&V) -> A,
    A: IntoIterator<Item = V>,
{
    /// Interns `roots` in order and returns the adjacency together with the
    /// ids of the roots (duplicates collapsed).
    pub(crate) fn new(roots: impl IntoIterator<Item = V>, adjacencies: F) -> (Self, Vec<usize>) {
        let mut vertices = IndexSet::new();
        let mut root_ids = Vec::new();
        for root in roots {
            let (id, inserted) = vertices.insert_full(root);
            if inserted {
                root_ids.push(id);
            }
        }
        (
            LazyAdjacency {
                vertices,
                adjacencies,
            },
            root_ids,
        )
    }

    pub(crate) fn vertex(&self, id: usize) -> Option<&V> {
        self.vertices.get_index(id)
    }

    /// Maps ids back to vertices.
    pub(crate) fn resolve(&self, ids: impl IntoIterator<Item = usize>) -> Vec<V> {
        ids.into_iter()
            .filter_map(|id| self.vertex(id).cloned())
            .collect()
    }

    pub(crate) fn into_vertices(self) -> IndexSet<V> {
        self.vertices
    }
}

impl<V, F, A> DenseAdjacency for LazyAdjacency<V, F>
where
    V: Clone + Eq + Hash,
    F: FnMut(&V) -> A,
    A: IntoIterator<Item = V>,
{
    fn len(&self) -> usize {
        self.vertices.len()
    }

    fn successors(&mut self, vertex: usize) -> Vec<usize> {
        let Some(v) = self.vertices.get_index(vertex).cloned() else {
            return Vec::new();
        };
        (self.adjacencies)(&v)
            .into_iter()
            .map(|w| self.vertices.insert_full(w).0)
            .collect()
    }
}

/// Routes `tracing` output of the algorithms to the test harness. Filter with
/// `RUST_LOG`, e.g. `RUST_LOG=posetgraph=trace`.
#[cfg(test)]
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
