//! # Topological Order
//!
//! Depth-first postorder over a directed acyclic graph. A vertex is appended to
//! the result exactly once, after every vertex reachable from it, so for each
//! edge `u → v` the sequence lists `v` before `u` (descendants first). Read it
//! in reverse for a dependencies-first order.
//!
//! The traversal doubles as the acyclicity check of the crate: reaching a
//! vertex that is still on the active depth-first path means the graph has a
//! cycle, which is reported as [`GraphError::Cyclic`] together with the
//! vertices of that cycle. Self-loops are ignored.

use std::hash::Hash;

use bitvec::prelude::*;
use tracing::{debug, instrument, trace};

use super::{DenseAdjacency, GraphAdjacency, LazyAdjacency, Visit};
use crate::{
    error::GraphError,
    graph::{LabeledDirectedGraph, VertexIndex},
};

/// Bookkeeping of one postorder traversal.
struct TopoState {
    stack: Vec<Visit>,
    entered: BitVec,
    finished: BitVec,
    /// Vertices entered but not yet finished, root first.
    path: Vec<usize>,
    order: Vec<usize>,
}

impl TopoState {
    fn new(n: usize) -> Self {
        TopoState {
            stack: Vec::new(),
            entered: bitvec![usize, Lsb0; 0; n],
            finished: bitvec![usize, Lsb0; 0; n],
            path: Vec::new(),
            order: Vec::with_capacity(n),
        }
    }

    fn grow(&mut self, n: usize) {
        if n > self.entered.len() {
            self.entered.resize(n, false);
            self.finished.resize(n, false);
        }
    }

    /// The cycle closed by an edge from the top of the path to `back`.
    fn cycle_to(&self, back: usize) -> Vec<usize> {
        let start = self
            .path
            .iter()
            .rposition(|&v| v == back)
            .unwrap_or_default();
        self.path[start..].to_vec()
    }

    /// Runs the traversal from every root in order. On a cycle returns the
    /// ids along it.
    fn run(
        mut self,
        adjacency: &mut impl DenseAdjacency,
        roots: impl IntoIterator<Item = usize>,
    ) -> Result<Vec<usize>, Vec<usize>> {
        for root in roots {
            if self.entered[root] {
                continue;
            }
            self.stack.push(Visit::Enter(root));

            while let Some(visit) = self.stack.pop() {
                match visit {
                    Visit::Enter(v) => {
                        if self.entered[v] {
                            continue;
                        }
                        self.entered.set(v, true);
                        self.path.push(v);
                        self.stack.push(Visit::Exit(v));

                        let children = adjacency.successors(v);
                        self.grow(adjacency.len());
                        for w in children {
                            if w == v {
                                continue;
                            }
                            if !self.entered[w] {
                                self.stack.push(Visit::Enter(w));
                            } else if !self.finished[w] {
                                return Err(self.cycle_to(w));
                            }
                        }
                    }
                    Visit::Exit(v) => {
                        self.finished.set(v, true);
                        self.path.pop();
                        self.order.push(v);
                    }
                }
            }
        }
        Ok(self.order)
    }
}

/// Postorder of `vertices` and everything reachable from them.
///
/// `adjacencies` is called at most once per vertex. Roots are traversed in the
/// order given; siblings in the order `adjacencies` yields them. For every edge
/// `u → v` met during the traversal `v` precedes `u` in the result.
///
/// # Errors
///
/// [`GraphError::Cyclic`] if a directed cycle (other than a self-loop) is
/// reachable from `vertices`.
///
/// # Examples
///
/// ```
/// use posetgraph::algorithms::topological_sort;
///
/// let edges = [(1, 2), (2, 3), (2, 4), (4, 5), (3, 5), (1, 5)];
/// let order = topological_sort([1, 2, 3, 4, 5], |v: &i32| {
///     edges.iter().filter(|(s, _)| s == v).map(|(_, t)| *t).collect::<Vec<_>>()
/// })
/// .unwrap();
/// assert_eq!(order.first(), Some(&5));
/// assert_eq!(order.last(), Some(&1));
/// ```
#[instrument(level = "debug", skip_all)]
pub fn topological_sort<V, I, F, A>(vertices: I, adjacencies: F) -> Result<Vec<V>, GraphError<V>>
where
    V: Clone + Eq + Hash,
    I: IntoIterator<Item = V>,
    F: FnMut(&V) -> A,
    A: IntoIterator<Item = V>,
{
    let (mut adjacency, roots) = LazyAdjacency::new(vertices, adjacencies);
    let state = TopoState::new(adjacency.len());
    match state.run(&mut adjacency, roots) {
        Ok(order) => {
            debug!(vertices = order.len(), "topological sort finished");
            Ok(adjacency.resolve(order))
        }
        Err(cycle) => {
            debug!(length = cycle.len(), "cycle found during topological sort");
            Err(GraphError::Cyclic {
                cycle: adjacency.resolve(cycle),
            })
        }
    }
}

impl<V: Clone + Eq + Hash> LabeledDirectedGraph<V> {
    /// Postorder over all vertices as indices, roots taken in index order.
    pub(crate) fn postorder_indices(&self) -> Result<Vec<VertexIndex>, GraphError<V>> {
        let mut adjacency = GraphAdjacency(self);
        let state = TopoState::new(self.n_vertices());
        match state.run(&mut adjacency, 0..self.n_vertices()) {
            Ok(order) => Ok(order.into_iter().map(VertexIndex).collect()),
            Err(cycle) => {
                trace!(?cycle, "graph is not acyclic");
                Err(GraphError::Cyclic {
                    cycle: cycle
                        .into_iter()
                        .filter_map(|i| self.vertex(VertexIndex(i)).cloned())
                        .collect(),
                })
            }
        }
    }

    /// Postorder over all vertices: every vertex comes after all vertices it
    /// reaches.
    ///
    /// # Errors
    ///
    /// [`GraphError::Cyclic`] if the graph has a cycle other than a self-loop.
    #[instrument(level = "debug", skip_all, fields(vertices = self.n_vertices()))]
    pub fn topological_sort(&self) -> Result<Vec<&V>, GraphError<V>> {
        Ok(self
            .postorder_indices()?
            .into_iter()
            .filter_map(|i| self.vertex(i))
            .collect())
    }

    /// Whether the graph has no directed cycle. Self-loops do not count.
    pub fn is_acyclic(&self) -> bool {
        self.postorder_indices().is_ok()
    }
}

#[cfg(test)]
mod test {
    use ahash::AHashMap;

    use super::topological_sort;
    use crate::{error::GraphError, graph::LabeledDirectedGraph};

    fn adjacency_of(edges: &[(i32, i32)]) -> impl FnMut(&i32) -> Vec<i32> + '_ {
        move |v: &i32| {
            edges
                .iter()
                .filter(|(s, _)| s == v)
                .map(|(_, t)| *t)
                .collect()
        }
    }

    fn positions<T: Eq + std::hash::Hash + Copy>(order: &[T]) -> AHashMap<T, usize> {
        order.iter().enumerate().map(|(i, v)| (*v, i)).collect()
    }

    #[test]
    fn descendants_come_first() {
        let edges = [(1, 2), (2, 3), (2, 4), (4, 5), (3, 5), (1, 5)];
        let order = topological_sort([1, 2, 3, 4, 5], adjacency_of(&edges)).unwrap();
        assert_eq!(order.len(), 5);

        let mut reversed = order.clone();
        reversed.reverse();
        let pos = positions(&reversed);
        assert!(pos[&1] < pos[&2]);
        assert!(pos[&2] < pos[&3]);
        assert!(pos[&2] < pos[&4]);
        assert!(pos[&4] < pos[&5]);
        assert!(pos[&3] < pos[&5]);

        let pos = positions(&order);
        for (u, v) in edges {
            assert!(pos[&v] < pos[&u], "{v} should precede {u}");
        }
    }

    #[test]
    fn includes_reachable_vertices_outside_input() {
        let edges = [(1, 2), (2, 3)];
        let order = topological_sort([1], adjacency_of(&edges)).unwrap();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[test]
    fn disconnected_roots_in_input_order() {
        let order = topological_sort([7, 3, 9], |_: &i32| Vec::new()).unwrap();
        assert_eq!(order, vec![7, 3, 9]);
    }

    #[test]
    fn adjacency_called_once_per_vertex() {
        let edges = [(1, 2), (1, 3), (2, 4), (3, 4)];
        let mut calls = AHashMap::new();
        let order = topological_sort([1, 2, 3, 4], |v: &i32| {
            *calls.entry(*v).or_insert(0) += 1;
            edges
                .iter()
                .filter(|(s, _)| s == v)
                .map(|(_, t)| *t)
                .collect::<Vec<_>>()
        })
        .unwrap();
        assert_eq!(order.len(), 4);
        assert!(calls.values().all(|&c| c == 1));
    }

    #[test]
    fn self_loops_are_ignored() {
        let edges = [(1, 1), (1, 2), (2, 2)];
        let order = topological_sort([1], adjacency_of(&edges)).unwrap();
        assert_eq!(order, vec![2, 1]);
    }

    #[test]
    fn cycle_is_reported() {
        crate::algorithms::init_tracing();
        let edges = [(0, 1), (1, 2), (2, 3), (3, 1)];
        let err = topological_sort([0], adjacency_of(&edges)).unwrap_err();
        let GraphError::Cyclic { cycle } = err else {
            panic!("expected a cycle, got {err:?}");
        };
        assert_eq!(cycle, vec![1, 2, 3]);
    }

    #[test]
    fn graph_method_and_acyclicity() {
        let mut g = LabeledDirectedGraph::from_edges([("a", "b"), ("b", "c"), ("a", "c")]);
        assert_eq!(g.topological_sort().unwrap(), vec![&"c", &"b", &"a"]);
        assert!(g.is_acyclic());

        g.add_edge("c", "a");
        assert!(!g.is_acyclic());
        let err = g.topological_sort().unwrap_err();
        assert!(err.is_cyclic());
    }

    #[test]
    fn long_chain_does_not_overflow() {
        let n = 200_000usize;
        let g = LabeledDirectedGraph::from_edges((0..n - 1).map(|i| (i, i + 1)));
        let order = g.topological_sort().unwrap();
        assert_eq!(order.len(), n);
        assert_eq!(*order[0], n - 1);
        assert_eq!(*order[n - 1], 0);
    }
}
