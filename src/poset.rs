//! # Partially Ordered Sets
//!
//! A [`Poset`] is the partial order generated by a directed acyclic graph:
//! `u < v` iff there is a non-empty directed path from `u` to `v`. Larger
//! elements sit further along the edges.
//!
//! Construction computes four graphs once and never touches them again:
//!
//! | graph         | edge `x → y` means          | built as                  |
//! |---------------|-----------------------------|---------------------------|
//! | `descendants` | `x < y`                     | transitive closure        |
//! | `ancestors`   | `y < x`                     | transpose of the closure  |
//! | `children`    | `y` covers `x`              | transitive reduction      |
//! | `parents`     | `x` covers `y`              | transpose of the reduction|
//!
//! Every relation query is then a single adjacency lookup. The `children`
//! graph is the Hasse diagram of the order.

use std::hash::Hash;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::{
    error::GraphError,
    graph::{dot::DotOptions, LabeledDirectedGraph},
};

#[derive(Clone, Debug)]
pub struct Poset<V> {
    descendants: LabeledDirectedGraph<V>,
    ancestors: LabeledDirectedGraph<V>,
    children: LabeledDirectedGraph<V>,
    parents: LabeledDirectedGraph<V>,
}

impl<V: Clone + Eq + Hash> Poset<V> {
    /// The poset in which `x ≤ y` iff `dag` has a path from `x` to `y`.
    ///
    /// Vertex labels of `dag` are kept on the Hasse diagram.
    ///
    /// # Errors
    ///
    /// [`GraphError::Cyclic`] if `dag` has a cycle.
    #[instrument(level = "debug", skip_all, fields(vertices = dag.n_vertices(), edges = dag.n_edges()))]
    pub fn new(dag: &LabeledDirectedGraph<V>) -> Result<Self, GraphError<V>> {
        let descendants = dag.transitive_closure()?;
        let ancestors = descendants.transpose();
        let children = dag.transitive_reduction()?;
        let parents = children.transpose();
        debug!(
            relations = descendants.n_edges(),
            covers = children.n_edges(),
            "poset built"
        );

        Ok(Poset {
            descendants,
            ancestors,
            children,
            parents,
        })
    }

    /// The poset of `elements` under their [`PartialOrd`]. Equal elements are
    /// merged.
    ///
    /// # Errors
    ///
    /// [`GraphError::Cyclic`] if the comparison is not a strict partial order
    /// (for instance `a < b` and `b < a` both hold).
    ///
    /// ```
    /// use posetgraph::Poset;
    ///
    /// let sets = [0b00u8, 0b01, 0b10, 0b11];
    /// # #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    /// # struct Bits(u8);
    /// # impl PartialOrd for Bits {
    /// #     fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
    /// #         use std::cmp::Ordering::*;
    /// #         let both = self.0 & other.0;
    /// #         match (both == self.0, both == other.0) {
    /// #             (true, true) => Some(Equal),
    /// #             (true, false) => Some(Less),
    /// #             (false, true) => Some(Greater),
    /// #             (false, false) => None,
    /// #         }
    /// #     }
    /// # }
    /// let poset = Poset::from_partial_order(sets.map(Bits)).unwrap();
    /// assert!(poset.less(&Bits(0b01), &Bits(0b11)));
    /// assert!(!poset.less(&Bits(0b01), &Bits(0b10)));
    /// assert_eq!(poset.hasse_diagram().n_edges(), 4);
    /// ```
    pub fn from_partial_order(elements: impl IntoIterator<Item = V>) -> Result<Self, GraphError<V>>
    where
        V: PartialOrd,
    {
        Self::new(&LabeledDirectedGraph::partial_order(elements))
    }

    pub fn contains(&self, v: &V) -> bool {
        self.descendants.contains_vertex(v)
    }

    /// The elements directly below `v`: `{ u : v covers u }`.
    pub fn parents(&self, v: &V) -> Result<impl ExactSizeIterator<Item = &V> + '_, GraphError<V>> {
        self.parents.adjacencies(v)
    }

    /// The elements directly above `v`: `{ u : u covers v }`.
    pub fn children(&self, v: &V) -> Result<impl ExactSizeIterator<Item = &V> + '_, GraphError<V>> {
        self.children.adjacencies(v)
    }

    /// `{ u : u < v }`
    pub fn ancestors(&self, v: &V) -> Result<impl ExactSizeIterator<Item = &V> + '_, GraphError<V>> {
        self.ancestors.adjacencies(v)
    }

    /// `{ u : v < u }`
    pub fn descendants(
        &self,
        v: &V,
    ) -> Result<impl ExactSizeIterator<Item = &V> + '_, GraphError<V>> {
        self.descendants.adjacencies(v)
    }

    /// Whether `u < v`. False when either is not an element.
    pub fn less(&self, u: &V, v: &V) -> bool {
        self.descendants.contains_edge(u, v)
    }

    /// The members of `subset` with nothing strictly greater in `subset`.
    ///
    /// Subset order is kept and repeated members are reported once. Values
    /// that are not elements of the poset are incomparable to everything and
    /// therefore maximal.
    pub fn maximal<'a>(&self, subset: impl IntoIterator<Item = &'a V>) -> Vec<&'a V>
    where
        V: 'a,
    {
        let subset = subset.into_iter().unique().collect_vec();
        subset
            .iter()
            .copied()
            .filter(|u| !subset.iter().any(|v| self.less(u, v)))
            .collect()
    }

    /// The members of `subset` with nothing strictly smaller in `subset`.
    pub fn minimal<'a>(&self, subset: impl IntoIterator<Item = &'a V>) -> Vec<&'a V>
    where
        V: 'a,
    {
        let subset = subset.into_iter().unique().collect_vec();
        subset
            .iter()
            .copied()
            .filter(|u| !subset.iter().any(|v| self.less(v, u)))
            .collect()
    }
}

impl<V> Poset<V> {
    /// The elements in the order of the source graph.
    pub fn vertices(&self) -> impl ExactSizeIterator<Item = &V> + '_ {
        self.descendants.vertices()
    }

    pub fn len(&self) -> usize {
        self.descendants.n_vertices()
    }

    pub fn is_empty(&self) -> bool {
        self.descendants.is_empty()
    }

    /// The covering relation: an edge `u → v` iff `v` covers `u`.
    pub fn hasse_diagram(&self) -> &LabeledDirectedGraph<V> {
        &self.children
    }

    /// DOT text of the Hasse diagram.
    pub fn dot(&self) -> String {
        self.children.dot()
    }

    pub fn dot_with(&self, options: &DotOptions) -> String {
        self.children.dot_with(options)
    }
}

impl<'a, V> IntoIterator for &'a Poset<V> {
    type Item = &'a V;
    type IntoIter = indexmap::set::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.descendants.vertices()
    }
}
