//! # Condensation
//!
//! The quotient of a directed graph by its strongly connected components.
//! Component `i` is the `i`-th component in the sinks-first order of
//! [`strongly_connected_components`](super::strongly_connected_components), and
//! becomes vertex `i` of the condensed graph. Every edge between two different
//! components is materialized once, with an empty label; edges inside a
//! component are absorbed.
//!
//! The condensed graph is acyclic for any input, and since sinks are numbered
//! first every edge `i → j` satisfies `j < i`.

use std::hash::Hash;

use ahash::AHashMap;
use tracing::{debug, instrument};

use super::scc::{decompose, Decomposition};
use crate::graph::{LabeledDirectedGraph, VertexIndex};

/// A condensed graph together with the vertex → component mapping.
#[derive(Clone, Debug)]
pub struct Condensation<V> {
    graph: LabeledDirectedGraph<usize>,
    mapping: AHashMap<V, usize>,
    components: Vec<Vec<V>>,
}

impl<V: Clone + Eq + Hash> Condensation<V> {
    fn build(decomposition: Decomposition, mut resolve: impl FnMut(usize) -> Option<V>) -> Self {
        let component_ids = decomposition.component_ids();
        let n_components = decomposition.components.len();

        let mut graph = LabeledDirectedGraph::with_capacity(n_components);
        for c in 0..n_components {
            graph.add_vertex(c);
        }

        for (c, members) in decomposition.components.iter().enumerate() {
            for &v in members {
                for &w in &decomposition.children[v] {
                    let target = component_ids[w];
                    if target != c {
                        graph.add_edge_by_index(VertexIndex(c), VertexIndex(target), String::new());
                    }
                }
            }
        }

        let components: Vec<Vec<V>> = decomposition
            .components
            .into_iter()
            .map(|members| members.into_iter().filter_map(&mut resolve).collect())
            .collect();

        let mapping = components
            .iter()
            .enumerate()
            .flat_map(|(c, members)| members.iter().map(move |v| (v.clone(), c)))
            .collect();

        debug!(
            components = n_components,
            edges = graph.n_edges(),
            "condensation built"
        );
        Condensation {
            graph,
            mapping,
            components,
        }
    }

    /// The component containing `vertex`.
    pub fn component_of(&self, vertex: &V) -> Option<usize> {
        self.mapping.get(vertex).copied()
    }
}

impl<V> Condensation<V> {
    /// The acyclic graph over component indices.
    pub fn graph(&self) -> &LabeledDirectedGraph<usize> {
        &self.graph
    }

    pub fn mapping(&self) -> &AHashMap<V, usize> {
        &self.mapping
    }

    pub fn components(&self) -> &[Vec<V>] {
        &self.components
    }

    /// The vertices of component `component`.
    pub fn members(&self, component: usize) -> Option<&[V]> {
        self.components.get(component).map(Vec::as_slice)
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn into_graph(self) -> LabeledDirectedGraph<usize> {
        self.graph
    }
}

/// Condenses the graph given by `vertices` and `adjacencies`. Vertices
/// reachable from `vertices` take part as well.
#[instrument(level = "debug", skip_all)]
pub fn condensation<V, I, F, A>(vertices: I, adjacencies: F) -> Condensation<V>
where
    V: Clone + Eq + Hash,
    I: IntoIterator<Item = V>,
    F: FnMut(&V) -> A,
    A: IntoIterator<Item = V>,
{
    let (decomposition, interned) = decompose(vertices, adjacencies);
    Condensation::build(decomposition, |i| interned.get(i).cloned())
}

impl<V: Clone + Eq + Hash> LabeledDirectedGraph<V> {
    #[instrument(level = "debug", skip_all, fields(vertices = self.n_vertices()))]
    pub fn condensation(&self) -> Condensation<V> {
        Condensation::build(self.decompose(), |i| self.vertex(VertexIndex(i)).cloned())
    }
}
