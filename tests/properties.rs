use ahash::AHashMap;
use itertools::Itertools;
use posetgraph::{topological_sort, GraphError, LabeledDirectedGraph, Poset};
use proptest::prelude::*;

const MAX_VERTICES: u32 = 14;

/// Arbitrary directed graph: self-loops, cycles and parallel insertions
/// included. Every vertex in `0..n` is present.
fn arb_graph() -> impl Strategy<Value = LabeledDirectedGraph<u32>> {
    (1..MAX_VERTICES).prop_flat_map(|n| {
        prop::collection::vec((0..n, 0..n), 0..(3 * n as usize)).prop_map(move |edges| {
            let mut g = LabeledDirectedGraph::with_capacity(n as usize);
            for v in 0..n {
                g.add_vertex(v);
            }
            g.extend(edges);
            g
        })
    })
}

/// Arbitrary DAG. Edges go up in a hidden order given by a random
/// permutation, so insertion order is unrelated to the topological order.
fn arb_dag() -> impl Strategy<Value = LabeledDirectedGraph<u32>> {
    (1..MAX_VERTICES).prop_flat_map(|n| {
        let perm = Just((0..n).collect_vec()).prop_shuffle();
        let edges = prop::collection::vec((0..n, 0..n), 0..(3 * n as usize));
        (perm, edges).prop_map(move |(perm, edges)| {
            let mut g = LabeledDirectedGraph::with_capacity(n as usize);
            for v in 0..n {
                g.add_vertex(v);
            }
            for (a, b) in edges {
                if a != b {
                    let (lo, hi) = (a.min(b), a.max(b));
                    g.add_labeled_edge(perm[lo as usize], perm[hi as usize], format!("{lo}<{hi}"));
                }
            }
            g
        })
    })
}

fn adjacency(g: &LabeledDirectedGraph<u32>) -> impl FnMut(&u32) -> Vec<u32> + '_ {
    move |v: &u32| {
        g.adjacencies(v)
            .map(|it| it.copied().collect())
            .unwrap_or_default()
    }
}

fn edge_set(g: &LabeledDirectedGraph<u32>) -> Vec<(u32, u32)> {
    g.edges().into_iter().map(|(u, v)| (*u, *v)).sorted().collect()
}

fn positions<'a>(order: impl IntoIterator<Item = &'a u32>) -> AHashMap<u32, usize> {
    order
        .into_iter()
        .enumerate()
        .map(|(i, v)| (*v, i))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn components_partition_the_vertices(g in arb_graph()) {
        let components = g.strongly_connected_components();
        let covered = components.iter().flatten().map(|v| **v).sorted().collect_vec();
        let all = g.vertices().copied().sorted().collect_vec();
        prop_assert_eq!(covered, all);
        prop_assert!(components.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn components_are_mutually_reachable_classes(g in arb_graph()) {
        let component: AHashMap<u32, usize> = g
            .strongly_connected_components()
            .iter()
            .enumerate()
            .flat_map(|(i, c)| c.iter().map(move |v| (**v, i)))
            .collect();

        for (u, v) in g.vertices().tuple_combinations() {
            let mutual = g.is_reachable(u, v) && g.is_reachable(v, u);
            prop_assert_eq!(component[u] == component[v], mutual, "{} {}", u, v);
        }
    }

    #[test]
    fn components_come_out_sinks_first(g in arb_graph()) {
        let free = posetgraph::strongly_connected_components(g.vertices().copied(), adjacency(&g));
        let component: AHashMap<u32, usize> = free
            .iter()
            .enumerate()
            .flat_map(|(i, c)| c.iter().map(move |v| (*v, i)))
            .collect();
        for (u, v) in g.edges() {
            prop_assert!(component[v] <= component[u]);
        }
    }

    #[test]
    fn condensation_is_an_acyclic_quotient(g in arb_graph()) {
        let c = g.condensation();
        prop_assert!(c.graph().is_acyclic());
        prop_assert_eq!(c.mapping().len(), g.n_vertices());

        for (u, v) in g.edges() {
            let (cu, cv) = (c.component_of(u).unwrap(), c.component_of(v).unwrap());
            prop_assert!(cu == cv || c.graph().contains_edge(&cu, &cv));
        }
        for (i, j) in c.graph().edges() {
            prop_assert!(j < i);
            let witnessed = c.members(*i).unwrap().iter().any(|u| {
                g.adjacencies(u).unwrap().any(|v| c.component_of(v) == Some(*j))
            });
            prop_assert!(witnessed);
        }
    }

    #[test]
    fn topological_sort_respects_edges(g in arb_dag()) {
        let order = topological_sort(g.vertices().copied(), adjacency(&g)).unwrap();
        prop_assert_eq!(order.len(), g.n_vertices());

        let pos = positions(&order);
        for (u, v) in g.edges() {
            prop_assert!(pos[v] < pos[u]);
        }
    }

    #[test]
    fn cycles_are_reported_exactly_when_present(g in arb_graph()) {
        let singletons = g.condensation().len() == g.n_vertices();
        match g.topological_sort() {
            Ok(order) => {
                prop_assert!(singletons);
                prop_assert_eq!(order.len(), g.n_vertices());
            }
            Err(GraphError::Cyclic { cycle }) => {
                prop_assert!(!singletons);
                prop_assert!(cycle.len() >= 2);
                for (u, v) in cycle.iter().circular_tuple_windows() {
                    prop_assert!(g.contains_edge(u, v));
                }
            }
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }

    #[test]
    fn closure_is_reachability(g in arb_dag()) {
        let closure = g.transitive_closure().unwrap();
        for u in g.vertices() {
            for v in g.vertices() {
                let expected = u != v && g.is_reachable(u, v);
                prop_assert_eq!(closure.contains_edge(u, v), expected);
            }
        }
        prop_assert_eq!(closure.transitive_closure().unwrap(), closure);
    }

    #[test]
    fn reduction_is_minimal_and_equivalent(g in arb_dag()) {
        let reduction = g.transitive_reduction().unwrap();
        prop_assert_eq!(reduction.transitive_reduction().unwrap(), reduction.clone());
        // Closure edges missing from the reduction come back unlabeled, so
        // only the edge sets are compared.
        prop_assert_eq!(
            edge_set(&reduction.transitive_closure().unwrap()),
            edge_set(&g.transitive_closure().unwrap())
        );

        for (u, v) in reduction.edges() {
            prop_assert!(g.contains_edge(u, v));
            prop_assert_eq!(reduction.edge_label(u, v).unwrap(), g.edge_label(u, v).unwrap());

            let mut without = reduction.clone();
            without.remove_edge(u, v);
            prop_assert!(!without.is_reachable(u, v));
        }
    }

    #[test]
    fn poset_is_a_strict_order(g in arb_dag()) {
        let p = Poset::new(&g).unwrap();
        let elements = p.vertices().collect_vec();

        for &a in &elements {
            prop_assert!(!p.less(a, a));
            for &b in &elements {
                if p.less(a, b) {
                    prop_assert!(!p.less(b, a));
                    prop_assert!(p.ancestors(b).unwrap().contains(&a));
                    prop_assert!(p.descendants(a).unwrap().contains(&b));
                }
                for &c in &elements {
                    if p.less(a, b) && p.less(b, c) {
                        prop_assert!(p.less(a, c));
                    }
                }
            }
        }

        for &a in &elements {
            for b in p.children(a).unwrap() {
                prop_assert!(p.parents(b).unwrap().contains(&a));
                prop_assert!(p.less(a, b));
            }
        }

        let maximal = p.maximal(elements.iter().copied());
        prop_assert!(!maximal.is_empty());
        for m in maximal {
            prop_assert_eq!(p.descendants(m).unwrap().len(), 0);
        }
        for m in p.minimal(elements.iter().copied()) {
            prop_assert_eq!(p.ancestors(m).unwrap().len(), 0);
        }
    }

    #[test]
    fn extremes_of_random_subsets(
        g in arb_dag(),
        picks in prop::collection::vec(0..MAX_VERTICES, 0..20),
    ) {
        let p = Poset::new(&g).unwrap();
        let subset = picks.into_iter().filter(|v| *v < g.n_vertices() as u32).collect_vec();
        let members = subset.iter().unique().collect_vec();

        let expected_maximal = members
            .iter()
            .copied()
            .filter(|u| !members.iter().any(|v| u != v && g.is_reachable(u, v)))
            .collect_vec();
        let expected_minimal = members
            .iter()
            .copied()
            .filter(|u| !members.iter().any(|v| u != v && g.is_reachable(v, u)))
            .collect_vec();

        prop_assert_eq!(p.maximal(subset.iter()), expected_maximal);
        prop_assert_eq!(p.minimal(subset.iter()), expected_minimal);
    }
}
