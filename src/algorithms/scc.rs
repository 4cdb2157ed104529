//! # Strongly Connected Components
//!
//! Tarjan's algorithm run over an explicit work stack. Each vertex gets a
//! discovery index and a lowlink; a vertex whose lowlink equals its own index
//! after all its children are done is the root of a component, which is then
//! cut off the component stack and committed.
//!
//! Components come out sinks first: if an edge leads from component `A` into a
//! different component `B`, then `B` is emitted before `A`. Inside a component
//! the vertices are listed in discovery order, root first.

use std::hash::Hash;

use bitvec::prelude::*;
use tracing::{debug, instrument};

use super::{DenseAdjacency, GraphAdjacency, LazyAdjacency, Visit};
use crate::graph::{LabeledDirectedGraph, VertexIndex};

const UNVISITED: usize = usize::MAX;

/// Components over dense ids, together with the adjacency lists the traversal
/// fetched for every vertex.
pub(crate) struct Decomposition {
    pub components: Vec<Vec<usize>>,
    pub children: Vec<Vec<usize>>,
}

impl Decomposition {
    /// Component position of every dense id.
    pub fn component_ids(&self) -> Vec<usize> {
        let mut ids = vec![0; self.children.len()];
        for (c, members) in self.components.iter().enumerate() {
            for &v in members {
                ids[v] = c;
            }
        }
        ids
    }
}

struct TarjanState {
    index: Vec<usize>,
    lowlink: Vec<usize>,
    committed: BitVec,
    children: Vec<Vec<usize>>,
    component_stack: Vec<usize>,
    counter: usize,
    stack: Vec<Visit>,
    components: Vec<Vec<usize>>,
}

impl TarjanState {
    fn new(n: usize) -> Self {
        TarjanState {
            index: vec![UNVISITED; n],
            lowlink: vec![0; n],
            committed: bitvec![usize, Lsb0; 0; n],
            children: vec![Vec::new(); n],
            component_stack: Vec::new(),
            counter: 0,
            stack: Vec::new(),
            components: Vec::new(),
        }
    }

    fn grow(&mut self, n: usize) {
        if n > self.index.len() {
            self.index.resize(n, UNVISITED);
            self.lowlink.resize(n, 0);
            self.committed.resize(n, false);
            self.children.resize(n, Vec::new());
        }
    }

    fn enter(&mut self, v: usize, adjacency: &mut impl DenseAdjacency) {
        self.index[v] = self.counter;
        self.lowlink[v] = self.counter;
        self.counter += 1;
        self.component_stack.push(v);
        self.stack.push(Visit::Exit(v));

        let children = adjacency.successors(v);
        self.grow(adjacency.len());
        for &w in &children {
            if self.index[w] == UNVISITED {
                self.stack.push(Visit::Enter(w));
            }
        }
        self.children[v] = children;
    }

    fn exit(&mut self, v: usize) {
        let low = self.children[v]
            .iter()
            .filter(|&&w| !self.committed[w])
            .map(|&w| self.lowlink[w])
            .fold(self.lowlink[v], usize::min);
        self.lowlink[v] = low;

        if low == self.index[v] {
            let start = self
                .component_stack
                .iter()
                .rposition(|&u| u == v)
                .unwrap_or_default();
            let component = self.component_stack.split_off(start);
            for &u in &component {
                self.committed.set(u, true);
            }
            self.components.push(component);
        }
    }

    fn run(
        mut self,
        adjacency: &mut impl DenseAdjacency,
        roots: impl IntoIterator<Item = usize>,
    ) -> Decomposition {
        for root in roots {
            if self.index[root] != UNVISITED {
                continue;
            }
            self.stack.push(Visit::Enter(root));

            while let Some(visit) = self.stack.pop() {
                match visit {
                    Visit::Enter(v) => {
                        if self.index[v] == UNVISITED {
                            self.enter(v, adjacency);
                        }
                    }
                    Visit::Exit(v) => self.exit(v),
                }
            }
        }
        Decomposition {
            components: self.components,
            children: self.children,
        }
    }
}

pub(crate) fn decompose<V, I, F, A>(vertices: I, adjacencies: F) -> (Decomposition, Vec<V>)
where
    V: Clone + Eq + Hash,
    I: IntoIterator<Item = V>,
    F: FnMut(&V) -> A,
    A: IntoIterator<Item = V>,
{
    let (mut adjacency, roots) = LazyAdjacency::new(vertices, adjacencies);
    let state = TarjanState::new(adjacency.len());
    let decomposition = state.run(&mut adjacency, roots);
    (decomposition, adjacency.into_vertices().into_iter().collect())
}

/// Partitions `vertices`, and every vertex reachable from them, into strongly
/// connected components.
///
/// Components are returned sinks first. The adjacency function is called once
/// per vertex; roots are visited in the order given.
///
/// ```
/// use posetgraph::algorithms::strongly_connected_components;
///
/// let edges = [(1, 2), (2, 3), (3, 1), (3, 4), (4, 5)];
/// let components = strongly_connected_components([1, 2, 3, 4, 5], |v: &i32| {
///     edges.iter().filter(|(s, _)| s == v).map(|(_, t)| *t).collect::<Vec<_>>()
/// });
/// assert_eq!(components, vec![vec![5], vec![4], vec![1, 2, 3]]);
/// ```
#[instrument(level = "debug", skip_all)]
pub fn strongly_connected_components<V, I, F, A>(vertices: I, adjacencies: F) -> Vec<Vec<V>>
where
    V: Clone + Eq + Hash,
    I: IntoIterator<Item = V>,
    F: FnMut(&V) -> A,
    A: IntoIterator<Item = V>,
{
    let (decomposition, interned) = decompose(vertices, adjacencies);
    debug!(
        vertices = interned.len(),
        components = decomposition.components.len(),
        "strongly connected components found"
    );
    decomposition
        .components
        .into_iter()
        .map(|component| component.into_iter().map(|i| interned[i].clone()).collect())
        .collect()
}

impl<V> LabeledDirectedGraph<V> {
    pub(crate) fn decompose(&self) -> Decomposition {
        let state = TarjanState::new(self.n_vertices());
        state.run(&mut GraphAdjacency(self), 0..self.n_vertices())
    }

    /// The strongly connected components of the whole graph, sinks first.
    #[instrument(level = "debug", skip_all, fields(vertices = self.n_vertices()))]
    pub fn strongly_connected_components(&self) -> Vec<Vec<&V>> {
        let decomposition = self.decompose();
        debug!(components = decomposition.components.len());
        decomposition
            .components
            .into_iter()
            .map(|component| {
                component
                    .into_iter()
                    .filter_map(|i| self.vertex(VertexIndex(i)))
                    .collect()
            })
            .collect()
    }
}
