use thiserror::Error;

use crate::graph::VertexIndex;

/// Errors raised by graph lookups and by the algorithms that require a DAG.
///
/// The error is generic over the vertex type so that the offending vertices
/// are handed back to the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError<V> {
    /// A vertex lookup missed.
    #[error("vertex {vertex:?} not found")]
    VertexNotFound { vertex: V },

    /// An edge lookup missed.
    #[error("edge {from:?} -> {to:?} not found")]
    EdgeNotFound { from: V, to: V },

    /// A label lookup matched more than one vertex.
    #[error("label {label:?} is carried by {count} vertices")]
    AmbiguousLabel { label: String, count: usize },

    /// An operation that requires a directed acyclic graph was handed a graph
    /// with a cycle. `cycle` lists the vertices of one such cycle in path
    /// order; its last vertex has an edge back to the first.
    #[error("graph contains a cycle: {cycle:?}")]
    Cyclic { cycle: Vec<V> },
}

/// A serialized graph whose arena tables disagree with each other.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    #[error("{labels} labels for {vertices} vertices")]
    LabelCount { vertices: usize, labels: usize },

    #[error("{lists} adjacency lists for {vertices} vertices")]
    AdjacencyCount { vertices: usize, lists: usize },

    #[error("edge {from} -> {to} points outside the {vertices} vertices")]
    DanglingEdge {
        from: VertexIndex,
        to: VertexIndex,
        vertices: usize,
    },
}

impl<V> GraphError<V> {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GraphError::VertexNotFound { .. } | GraphError::EdgeNotFound { .. }
        )
    }

    pub fn is_cyclic(&self) -> bool {
        matches!(self, GraphError::Cyclic { .. })
    }

    /// Maps the vertices carried by the error, e.g. to report them in a
    /// caller's own vocabulary.
    pub fn map_vertices<W>(self, mut f: impl FnMut(V) -> W) -> GraphError<W> {
        match self {
            GraphError::VertexNotFound { vertex } => GraphError::VertexNotFound { vertex: f(vertex) },
            GraphError::EdgeNotFound { from, to } => GraphError::EdgeNotFound {
                from: f(from),
                to: f(to),
            },
            GraphError::AmbiguousLabel { label, count } => {
                GraphError::AmbiguousLabel { label, count }
            }
            GraphError::Cyclic { cycle } => GraphError::Cyclic {
                cycle: cycle.into_iter().map(f).collect(),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::GraphError;

    #[test]
    fn messages() {
        let e: GraphError<&str> = GraphError::EdgeNotFound { from: "a", to: "b" };
        assert_eq!(e.to_string(), r#"edge "a" -> "b" not found"#);
        assert!(e.is_not_found());

        let e: GraphError<u32> = GraphError::Cyclic {
            cycle: vec![1, 2, 3],
        };
        assert_eq!(e.to_string(), "graph contains a cycle: [1, 2, 3]");
        assert!(e.is_cyclic());

        let e: GraphError<u32> = GraphError::AmbiguousLabel {
            label: "x".into(),
            count: 2,
        };
        assert_eq!(e.to_string(), r#"label "x" is carried by 2 vertices"#);
    }

    #[test]
    fn map_vertices_keeps_variant() {
        let e: GraphError<u32> = GraphError::VertexNotFound { vertex: 4 };
        let mapped = e.map_vertices(|v| format!("v{v}"));
        assert_eq!(
            mapped,
            GraphError::VertexNotFound {
                vertex: "v4".to_string()
            }
        );
    }
}
