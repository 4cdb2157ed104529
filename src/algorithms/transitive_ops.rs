//! # Transitive Operations
//!
//! Transitive closure and transitive reduction of a directed acyclic graph.
//!
//! Both operations first run the postorder traversal of
//! [`topological_order`](super::topological_order). That doubles as the
//! acyclicity check: a graph with a cycle is rejected with
//! [`GraphError::Cyclic`] before anything is built. Reading the postorder
//! backwards gives a topological order `topo`, and each vertex `v` is then
//! handled by one forward sweep over `topo` starting at `v`:
//!
//! - **closure** propagates a reachability mark along the sweep and emits
//!   `v → u` for every marked `u ≠ v`;
//! - **reduction** relaxes single-source longest-path distances (unit edge
//!   weights) along the sweep and keeps exactly the edges `v → u` whose
//!   longest distance is `1`. An edge with a longer alternative path is
//!   implied by that path and therefore redundant.
//!
//! Both results are new graphs over the same vertices, indices and vertex
//! labels as the input. Edges present in the input keep their label, edges
//! introduced by the closure carry the empty label, and self-loops are
//! dropped.
//!
//! For a DAG with `V` vertices and `E` edges both run in `O(V·(V+E))`.

use std::hash::Hash;

use bitvec::prelude::*;
use tracing::{debug, instrument};

use crate::{
    error::GraphError,
    graph::{LabeledDirectedGraph, VertexIndex, VertexVec},
};

/// A topological order and the position of every vertex in it.
struct TopoPositions {
    order: Vec<VertexIndex>,
    position: VertexVec<usize>,
}

impl TopoPositions {
    fn of<V: Clone + Eq + Hash>(graph: &LabeledDirectedGraph<V>) -> Result<Self, GraphError<V>> {
        let mut order = graph.postorder_indices()?;
        order.reverse();

        let mut position = VertexVec::from_elem(0, graph.n_vertices());
        for (p, &v) in order.iter().enumerate() {
            position[v] = p;
        }
        Ok(TopoPositions { order, position })
    }

    /// `v` followed by every vertex after it in the order.
    fn starting_at(&self, v: VertexIndex) -> &[VertexIndex] {
        &self.order[self.position[v]..]
    }
}

impl<V: Clone + Eq + Hash> LabeledDirectedGraph<V> {
    /// The transitive closure: an edge `u → v` for every pair with a directed
    /// path from `u` to `v`, `u ≠ v`.
    ///
    /// # Errors
    ///
    /// [`GraphError::Cyclic`] if the graph is not acyclic.
    ///
    /// # Examples
    ///
    /// ```
    /// use posetgraph::LabeledDirectedGraph;
    ///
    /// let g = LabeledDirectedGraph::from_edges([(1, 2), (2, 3)]);
    /// let closure = g.transitive_closure().unwrap();
    /// assert!(closure.contains_edge(&1, &3));
    /// assert_eq!(closure.n_edges(), 3);
    /// ```
    #[instrument(level = "debug", skip_all, fields(vertices = self.n_vertices(), edges = self.n_edges()))]
    pub fn transitive_closure(&self) -> Result<Self, GraphError<V>> {
        let topo = TopoPositions::of(self)?;
        let mut closure = self.vertex_skeleton();
        let mut reachable = bitvec![usize, Lsb0; 0; self.n_vertices()];

        for v in self.vertex_indices() {
            reachable.fill(false);
            reachable.set(v.0, true);
            let sweep = topo.starting_at(v);

            for &u in sweep {
                if reachable[u.0] {
                    for w in self.successors(u) {
                        reachable.set(w.0, true);
                    }
                }
            }

            for w in self.successors(v) {
                if w != v {
                    let label = self.edge_label_by_index(v, w).unwrap_or_default();
                    closure.add_edge_by_index(v, w, label.to_owned());
                }
            }
            for &u in &sweep[1..] {
                if reachable[u.0] && !closure.has_edge_by_index(v, u) {
                    closure.add_edge_by_index(v, u, String::new());
                }
            }
        }

        debug!(edges = closure.n_edges(), "transitive closure built");
        Ok(closure)
    }

    /// The transitive reduction: the unique smallest subgraph with the same
    /// reachability relation.
    ///
    /// An edge `u → v` survives iff the longest path from `u` to `v` has length
    /// one.
    ///
    /// # Errors
    ///
    /// [`GraphError::Cyclic`] if the graph is not acyclic.
    ///
    /// # Examples
    ///
    /// ```
    /// use posetgraph::LabeledDirectedGraph;
    ///
    /// let g = LabeledDirectedGraph::from_edges([(1, 2), (2, 3), (1, 3)]);
    /// let reduction = g.transitive_reduction().unwrap();
    /// assert!(!reduction.contains_edge(&1, &3));
    /// assert_eq!(reduction.n_edges(), 2);
    /// ```
    #[instrument(level = "debug", skip_all, fields(vertices = self.n_vertices(), edges = self.n_edges()))]
    pub fn transitive_reduction(&self) -> Result<Self, GraphError<V>> {
        let topo = TopoPositions::of(self)?;
        let mut reduction = self.vertex_skeleton();
        let mut distance: VertexVec<Option<usize>> = VertexVec::from_elem(None, self.n_vertices());

        for v in self.vertex_indices() {
            distance.iter_mut().for_each(|(_, d)| *d = None);
            distance[v] = Some(0);

            for &u in topo.starting_at(v) {
                let Some(d) = distance[u] else {
                    continue;
                };
                for w in self.successors(u) {
                    if w != u && distance[w].map_or(true, |dw| dw < d + 1) {
                        distance[w] = Some(d + 1);
                    }
                }
            }

            for w in self.successors(v) {
                if w != v && distance[w] == Some(1) {
                    let label = self.edge_label_by_index(v, w).unwrap_or_default();
                    reduction.add_edge_by_index(v, w, label.to_owned());
                }
            }
        }

        debug!(edges = reduction.n_edges(), "transitive reduction built");
        Ok(reduction)
    }

    /// The strict order relation of `elements` as a graph: an edge `a → b`
    /// whenever `a < b`. Equal elements are merged.
    ///
    /// The result is transitively closed for a consistent [`PartialOrd`]; pass
    /// it through [`transitive_reduction`](Self::transitive_reduction) to get
    /// the Hasse diagram.
    pub fn partial_order(elements: impl IntoIterator<Item = V>) -> Self
    where
        V: PartialOrd,
    {
        let mut graph = LabeledDirectedGraph::new();
        for element in elements {
            graph.add_vertex(element);
        }

        let indices: Vec<VertexIndex> = graph.vertex_indices().collect();
        for &i in &indices {
            for &j in &indices {
                let (Some(a), Some(b)) = (graph.vertex(i), graph.vertex(j)) else {
                    continue;
                };
                if i != j && a < b {
                    graph.add_edge_by_index(i, j, String::new());
                }
            }
        }
        graph
    }
}

/// Transitive closure of `graph`. See [`LabeledDirectedGraph::transitive_closure`].
pub fn transitive_closure<V: Clone + Eq + Hash>(
    graph: &LabeledDirectedGraph<V>,
) -> Result<LabeledDirectedGraph<V>, GraphError<V>> {
    graph.transitive_closure()
}

/// Transitive reduction of `graph`. See [`LabeledDirectedGraph::transitive_reduction`].
pub fn transitive_reduction<V: Clone + Eq + Hash>(
    graph: &LabeledDirectedGraph<V>,
) -> Result<LabeledDirectedGraph<V>, GraphError<V>> {
    graph.transitive_reduction()
}

#[cfg(test)]
mod test {
    use similar_asserts::assert_eq;

    use super::{transitive_closure, transitive_reduction};
    use crate::{error::GraphError, graph::LabeledDirectedGraph};

    fn chain_with_shortcut() -> LabeledDirectedGraph<i32> {
        LabeledDirectedGraph::from_edges([(1, 2), (2, 3), (1, 3)])
    }

    #[test]
    fn shortcut_is_reduced_and_closure_keeps_all() {
        let g = chain_with_shortcut();

        let reduction = transitive_reduction(&g).unwrap();
        assert_eq!(reduction.edges(), vec![(&1, &2), (&2, &3)]);

        let closure = transitive_closure(&g).unwrap();
        assert_eq!(closure.edges(), vec![(&1, &2), (&1, &3), (&2, &3)]);
    }

    #[test]
    fn closure_adds_missing_edges() {
        let g = LabeledDirectedGraph::from_edges([("a", "b"), ("b", "c"), ("c", "d")]);
        let closure = g.transitive_closure().unwrap();
        assert_eq!(closure.n_edges(), 6);
        assert!(closure.contains_edge(&"a", &"d"));
        assert!(closure.contains_edge(&"b", &"d"));
        assert!(!closure.contains_edge(&"d", &"a"));
    }

    #[test]
    fn operations_are_idempotent() {
        crate::algorithms::init_tracing();
        let g = LabeledDirectedGraph::from_edges([
            (0, 1),
            (0, 2),
            (1, 3),
            (2, 3),
            (0, 3),
            (3, 4),
            (1, 4),
        ]);
        let closure = g.transitive_closure().unwrap();
        assert_eq!(closure.transitive_closure().unwrap(), closure);

        let reduction = g.transitive_reduction().unwrap();
        assert_eq!(reduction.transitive_reduction().unwrap(), reduction);
        assert_eq!(reduction.n_edges(), 5);

        assert_eq!(reduction.transitive_closure().unwrap(), closure);
        assert_eq!(closure.transitive_reduction().unwrap(), reduction);
    }

    #[test]
    fn labels_survive() {
        let mut g = LabeledDirectedGraph::new();
        g.add_labeled_vertex("a", "top");
        g.add_labeled_edge("a", "b", "ab");
        g.add_labeled_edge("b", "c", "bc");
        g.add_labeled_edge("a", "c", "ac");

        let reduction = g.transitive_reduction().unwrap();
        assert_eq!(reduction.vertex_label(&"a").unwrap(), "top");
        assert_eq!(reduction.edge_label(&"b", &"c").unwrap(), "bc");

        let closure = reduction.transitive_closure().unwrap();
        assert_eq!(closure.edge_label(&"a", &"b").unwrap(), "ab");
        assert_eq!(closure.edge_label(&"a", &"c").unwrap(), "");
    }

    #[test]
    fn closure_of_reduction_differs_only_in_labels() {
        let mut g = LabeledDirectedGraph::new();
        g.add_labeled_edge(0, 1, "0<1");
        g.add_labeled_edge(0, 2, "0<2");
        g.add_labeled_edge(1, 2, "1<2");

        let direct = g.transitive_closure().unwrap();
        let rebuilt = g.transitive_reduction().unwrap().transitive_closure().unwrap();
        assert_eq!(direct.edge_label(&0, &2).unwrap(), "0<2");
        assert_eq!(rebuilt.edge_label(&0, &2).unwrap(), "");
        assert_eq!(rebuilt.edge_label(&0, &1).unwrap(), "0<1");
        assert_eq!(rebuilt.edge_label(&1, &2).unwrap(), "1<2");

        let sorted = |g: &LabeledDirectedGraph<i32>| {
            let mut edges = g.edges().into_iter().map(|(u, v)| (*u, *v)).collect::<Vec<_>>();
            edges.sort_unstable();
            edges
        };
        assert_eq!(sorted(&direct), sorted(&rebuilt));
        assert_ne!(direct, rebuilt);
    }

    #[test]
    fn input_is_untouched_and_self_loops_dropped() {
        let mut g = chain_with_shortcut();
        g.add_edge(2, 2);
        let before = g.clone();

        let reduction = g.transitive_reduction().unwrap();
        let closure = g.transitive_closure().unwrap();
        assert_eq!(g, before);
        assert!(!reduction.contains_edge(&2, &2));
        assert!(!closure.contains_edge(&2, &2));
    }

    #[test]
    fn cycles_are_rejected() {
        let g = LabeledDirectedGraph::from_edges([(1, 2), (2, 3), (3, 1)]);
        let err = g.transitive_reduction().unwrap_err();
        assert_eq!(
            err,
            GraphError::Cyclic {
                cycle: vec![1, 2, 3]
            }
        );
        assert!(g.transitive_closure().unwrap_err().is_cyclic());
    }

    #[test]
    fn divisibility_hasse_diagram() {
        let order = LabeledDirectedGraph::partial_order([1u32, 2, 3, 4, 6, 12].map(Divides));
        assert_eq!(order.n_edges(), 12);

        let hasse = order.transitive_reduction().unwrap();
        insta::assert_snapshot!(hasse.dot(), @r#"
        digraph {
          0 [label=""];
          1 [label=""];
          2 [label=""];
          3 [label=""];
          4 [label=""];
          5 [label=""];
          0 -> 1 [label=""];
          0 -> 2 [label=""];
          1 -> 3 [label=""];
          1 -> 4 [label=""];
          2 -> 4 [label=""];
          3 -> 5 [label=""];
          4 -> 5 [label=""];
        }
        "#);
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    struct Divides(u32);

    impl PartialOrd for Divides {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
            use std::cmp::Ordering;
            if self.0 == other.0 {
                Some(Ordering::Equal)
            } else if other.0 % self.0 == 0 {
                Some(Ordering::Less)
            } else if self.0 % other.0 == 0 {
                Some(Ordering::Greater)
            } else {
                None
            }
        }
    }
}
