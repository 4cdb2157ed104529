//! # Labeled Directed Graphs
//!
//! [`LabeledDirectedGraph`] stores a simple directed graph over vertices of an
//! arbitrary hashable type, with a string label on every vertex and on every
//! edge. Self-loops are allowed; parallel edges are not (re-adding an edge
//! overwrites its label).
//!
//! ## Storage
//!
//! Vertices live in an arena: each inserted vertex gets a dense
//! [`VertexIndex`] in insertion order and keeps it for the lifetime of the
//! graph. The vertex values themselves are kept in an [`IndexSet`], which is
//! the bidirectional value ↔ index table. Labels and adjacency are stored by
//! index in [`VertexVec`]s, so traversals never hash vertex values.
//!
//! Out-adjacency of a vertex is an [`IndexMap`] from target index to edge
//! label, which keeps adjacency duplicate-free and makes every enumeration
//! (vertices, edges, DOT export) deterministic for a given construction order.
//!
//! Every transform ([`transpose`](LabeledDirectedGraph::transpose),
//! [`induced_subgraph`](LabeledDirectedGraph::induced_subgraph), the
//! transitive operations, condensation) returns a freshly owned graph.

use std::collections::VecDeque;
use std::hash::Hash;

use bitvec::prelude::*;
use indexmap::{IndexMap, IndexSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
#[cfg(feature = "serde")]
use crate::error::ArenaError;

pub mod dot;

crate::define_indexed_vec!(
    /// Dense, insertion-ordered id of a vertex inside one
    /// [`LabeledDirectedGraph`].
    pub struct VertexIndex;

    /// A vector indexed by [`VertexIndex`].
    pub struct VertexVec;
);

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(bound(serialize = "V: Serialize")))]
pub struct LabeledDirectedGraph<V> {
    vertices: IndexSet<V>,
    labels: VertexVec<String>,
    adjacency: VertexVec<IndexMap<VertexIndex, String>>,
}

impl<V> Default for LabeledDirectedGraph<V> {
    fn default() -> Self {
        LabeledDirectedGraph {
            vertices: IndexSet::new(),
            labels: VertexVec::new(),
            adjacency: VertexVec::new(),
        }
    }
}

// Index-level access, no hashing required.
impl<V> LabeledDirectedGraph<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n_vertices: usize) -> Self {
        LabeledDirectedGraph {
            vertices: IndexSet::with_capacity(n_vertices),
            labels: VertexVec::with_capacity(n_vertices),
            adjacency: VertexVec::with_capacity(n_vertices),
        }
    }

    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn n_edges(&self) -> usize {
        self.adjacency.iter().map(|(_, adj)| adj.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterates over the vertices in index (insertion) order.
    pub fn vertices(&self) -> indexmap::set::Iter<'_, V> {
        self.vertices.iter()
    }

    pub fn vertex_indices(&self) -> impl DoubleEndedIterator<Item = VertexIndex> + ExactSizeIterator {
        self.labels.indices()
    }

    /// The vertex stored at `index`, if any.
    pub fn vertex(&self, index: VertexIndex) -> Option<&V> {
        self.vertices.get_index(index.0)
    }

    pub fn label_at(&self, index: VertexIndex) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Out-neighbours of the vertex at `index`, in the order the edges were
    /// first added.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not belong to this graph.
    pub fn successors(&self, index: VertexIndex) -> impl ExactSizeIterator<Item = VertexIndex> + '_ {
        self.adjacency[index].keys().copied()
    }

    /// All edges as `(source, target, label)` index triples, ordered by source
    /// index and then by adjacency order.
    pub fn edge_indices(&self) -> impl Iterator<Item = (VertexIndex, VertexIndex, &str)> + '_ {
        self.adjacency.iter().flat_map(|(source, adj)| {
            adj.iter()
                .map(move |(target, label)| (source, *target, label.as_str()))
        })
    }

    /// All edges with their labels, ordered like [`edge_indices`](Self::edge_indices).
    pub fn labeled_edges(&self) -> impl Iterator<Item = (&V, &V, &str)> + '_ {
        self.edge_indices().filter_map(|(source, target, label)| {
            Some((self.vertex(source)?, self.vertex(target)?, label))
        })
    }

    /// The complete list of directed edges `(u, v)`.
    pub fn edges(&self) -> Vec<(&V, &V)> {
        self.labeled_edges().map(|(u, v, _)| (u, v)).collect()
    }

    /// Records `source → target` between two existing vertices.
    ///
    /// Callers guarantee both indices belong to this graph.
    pub(crate) fn add_edge_by_index(
        &mut self,
        source: VertexIndex,
        target: VertexIndex,
        label: String,
    ) {
        debug_assert!(target.0 < self.vertices.len());
        self.adjacency[source].insert(target, label);
    }

    pub(crate) fn edge_label_by_index(&self, source: VertexIndex, target: VertexIndex) -> Option<&str> {
        self.adjacency[source].get(&target).map(String::as_str)
    }

    pub(crate) fn has_edge_by_index(&self, source: VertexIndex, target: VertexIndex) -> bool {
        self.adjacency[source].contains_key(&target)
    }
}

impl<V: Clone + Eq + Hash> LabeledDirectedGraph<V> {
    pub fn index_of(&self, vertex: &V) -> Option<VertexIndex> {
        self.vertices.get_index_of(vertex).map(VertexIndex)
    }

    pub fn contains_vertex(&self, vertex: &V) -> bool {
        self.vertices.contains(vertex)
    }

    pub fn contains_edge(&self, source: &V, target: &V) -> bool {
        match (self.index_of(source), self.index_of(target)) {
            (Some(s), Some(t)) => self.has_edge_by_index(s, t),
            _ => false,
        }
    }

    fn require(&self, vertex: &V) -> Result<VertexIndex, GraphError<V>> {
        self.index_of(vertex)
            .ok_or_else(|| GraphError::VertexNotFound {
                vertex: vertex.clone(),
            })
    }

    /// Adds `vertex` with an empty label. Does nothing if it is already present.
    pub fn add_vertex(&mut self, vertex: V) -> VertexIndex {
        self.add_labeled_vertex(vertex, "")
    }

    /// Adds `vertex` with `label`. If the vertex is already present nothing
    /// changes: in particular its existing label is kept.
    pub fn add_labeled_vertex(&mut self, vertex: V, label: impl Into<String>) -> VertexIndex {
        let (index, inserted) = self.vertices.insert_full(vertex);
        if inserted {
            self.labels.push(label.into());
            self.adjacency.push(IndexMap::new());
        }
        VertexIndex(index)
    }

    /// Adds the edge `source → target` with an empty label, inserting missing
    /// endpoints.
    pub fn add_edge(&mut self, source: V, target: V) {
        self.add_labeled_edge(source, target, "")
    }

    /// Adds the edge `source → target`, inserting missing endpoints with empty
    /// labels. An existing edge between the same endpoints gets its label
    /// overwritten.
    pub fn add_labeled_edge(&mut self, source: V, target: V, label: impl Into<String>) {
        let s = self.add_vertex(source);
        let t = self.add_vertex(target);
        self.add_edge_by_index(s, t, label.into());
    }

    /// Removes `source → target` and returns its label. Absent edges are
    /// ignored.
    pub fn remove_edge(&mut self, source: &V, target: &V) -> Option<String> {
        let s = self.index_of(source)?;
        let t = self.index_of(target)?;
        self.adjacency[s].shift_remove(&t)
    }

    pub fn vertex_label(&self, vertex: &V) -> Result<&str, GraphError<V>> {
        let i = self.require(vertex)?;
        Ok(&self.labels[i])
    }

    pub fn set_vertex_label(
        &mut self,
        vertex: &V,
        label: impl Into<String>,
    ) -> Result<(), GraphError<V>> {
        let i = self.require(vertex)?;
        self.labels[i] = label.into();
        Ok(())
    }

    pub fn edge_label(&self, source: &V, target: &V) -> Result<&str, GraphError<V>> {
        let not_found = || GraphError::EdgeNotFound {
            from: source.clone(),
            to: target.clone(),
        };
        let s = self.index_of(source).ok_or_else(not_found)?;
        let t = self.index_of(target).ok_or_else(not_found)?;
        self.edge_label_by_index(s, t).ok_or_else(not_found)
    }

    /// The unique vertex carrying `label`.
    ///
    /// Returns `Ok(None)` if no vertex has that label and
    /// [`GraphError::AmbiguousLabel`] if several do.
    pub fn vertex_with_label(&self, label: &str) -> Result<Option<&V>, GraphError<V>> {
        let mut matching = self
            .labels
            .iter()
            .filter(|(_, l)| l.as_str() == label)
            .map(|(i, _)| i);
        let Some(first) = matching.next() else {
            return Ok(None);
        };
        let others = matching.count();
        if others > 0 {
            return Err(GraphError::AmbiguousLabel {
                label: label.to_owned(),
                count: others + 1,
            });
        }
        Ok(self.vertex(first))
    }

    /// Out-neighbours `{ u : vertex → u }`.
    pub fn adjacencies(
        &self,
        vertex: &V,
    ) -> Result<impl ExactSizeIterator<Item = &V> + '_, GraphError<V>> {
        let i = self.require(vertex)?;
        Ok(self.adjacency[i]
            .keys()
            .map(move |t| &self.vertices[t.0]))
    }

    /// A graph with the same vertices, indices and vertex labels but no edges.
    pub(crate) fn vertex_skeleton(&self) -> Self {
        LabeledDirectedGraph {
            vertices: self.vertices.clone(),
            labels: self.labels.clone(),
            adjacency: self.labels.iter().map(|_| IndexMap::new()).collect(),
        }
    }

    /// A new graph with every edge reversed. Vertex labels are kept and every
    /// edge label moves onto the reversed edge.
    pub fn transpose(&self) -> Self {
        let mut transposed = self.vertex_skeleton();
        for (source, target, label) in self.edge_indices() {
            transposed.add_edge_by_index(target, source, label.to_owned());
        }
        transposed
    }

    /// The subgraph induced by the vertices satisfying `predicate`.
    ///
    /// Labels are kept; self-loops are dropped.
    pub fn induced_subgraph(&self, mut predicate: impl FnMut(&V) -> bool) -> Self {
        let mut sub = LabeledDirectedGraph::new();
        let mut kept: VertexVec<Option<VertexIndex>> = VertexVec::from_elem(None, self.n_vertices());
        for (i, v) in self.vertices.iter().enumerate() {
            if predicate(v) {
                let index = VertexIndex(i);
                kept[index] = Some(sub.add_labeled_vertex(v.clone(), self.labels[index].clone()));
            }
        }
        for (source, target, label) in self.edge_indices() {
            if source == target {
                continue;
            }
            if let (Some(s), Some(t)) = (kept[source], kept[target]) {
                sub.add_edge_by_index(s, t, label.to_owned());
            }
        }
        sub
    }

    /// Whether a directed path leads from `source` to `target`. Every vertex
    /// reaches itself.
    pub fn is_reachable(&self, source: &V, target: &V) -> bool {
        let (Some(s), Some(t)) = (self.index_of(source), self.index_of(target)) else {
            return false;
        };
        if s == t {
            return true;
        }

        let mut seen = bitvec![usize, Lsb0; 0; self.n_vertices()];
        let mut queue = VecDeque::from([s]);
        seen.set(s.0, true);

        while let Some(current) = queue.pop_front() {
            for next in self.successors(current) {
                if next == t {
                    return true;
                }
                if !seen[next.0] {
                    seen.set(next.0, true);
                    queue.push_back(next);
                }
            }
        }
        false
    }

    /// Builds a graph from an edge list, inserting endpoints in the order they
    /// first appear.
    pub fn from_edges(edges: impl IntoIterator<Item = (V, V)>) -> Self {
        let mut graph = LabeledDirectedGraph::new();
        graph.extend(edges);
        graph
    }
}

/// The serialized arena, checked before it becomes a graph.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
#[serde(bound(deserialize = "V: Deserialize<'de> + Eq + Hash"))]
struct RawGraph<V> {
    vertices: IndexSet<V>,
    labels: VertexVec<String>,
    adjacency: VertexVec<IndexMap<VertexIndex, String>>,
}

#[cfg(feature = "serde")]
impl<V> RawGraph<V> {
    fn validate(self) -> Result<LabeledDirectedGraph<V>, ArenaError> {
        let vertices = self.vertices.len();
        if self.labels.len() != vertices {
            return Err(ArenaError::LabelCount {
                vertices,
                labels: self.labels.len(),
            });
        }
        if self.adjacency.len() != vertices {
            return Err(ArenaError::AdjacencyCount {
                vertices,
                lists: self.adjacency.len(),
            });
        }
        for (from, adj) in &self.adjacency {
            if let Some(to) = adj.keys().find(|t| t.0 >= vertices) {
                return Err(ArenaError::DanglingEdge {
                    from,
                    to: *to,
                    vertices,
                });
            }
        }
        Ok(LabeledDirectedGraph {
            vertices: self.vertices,
            labels: self.labels,
            adjacency: self.adjacency,
        })
    }
}

#[cfg(feature = "serde")]
impl<'de, V> Deserialize<'de> for LabeledDirectedGraph<V>
where
    V: Deserialize<'de> + Eq + Hash,
{
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawGraph::deserialize(deserializer)?
            .validate()
            .map_err(serde::de::Error::custom)
    }
}

impl<V: Clone + Eq + Hash> Extend<(V, V)> for LabeledDirectedGraph<V> {
    fn extend<T: IntoIterator<Item = (V, V)>>(&mut self, iter: T) {
        for (source, target) in iter {
            self.add_edge(source, target);
        }
    }
}

impl<V: Clone + Eq + Hash> FromIterator<(V, V)> for LabeledDirectedGraph<V> {
    fn from_iter<T: IntoIterator<Item = (V, V)>>(iter: T) -> Self {
        Self::from_edges(iter)
    }
}

/// Graphs compare equal when they have the same vertices with the same labels
/// and the same labeled edges, regardless of insertion order.
impl<V: Eq + Hash> PartialEq for LabeledDirectedGraph<V> {
    fn eq(&self, other: &Self) -> bool {
        if self.vertices.len() != other.vertices.len() {
            return false;
        }
        self.vertices.iter().enumerate().all(|(i, v)| {
            let Some(j) = other.vertices.get_index_of(v) else {
                return false;
            };
            let (i, j) = (VertexIndex(i), VertexIndex(j));
            if self.labels[i] != other.labels[j] {
                return false;
            }
            let (mine, theirs) = (&self.adjacency[i], &other.adjacency[j]);
            mine.len() == theirs.len()
                && mine.iter().all(|(t, label)| {
                    other
                        .vertices
                        .get_index_of(&self.vertices[t.0])
                        .and_then(|ot| theirs.get(&VertexIndex(ot)))
                        == Some(label)
                })
        })
    }
}

impl<V: Eq + Hash> Eq for LabeledDirectedGraph<V> {}
