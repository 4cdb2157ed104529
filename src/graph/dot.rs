//! # DOT export
//!
//! Serializes a [`LabeledDirectedGraph`] into the
//! [DOT language](https://graphviz.org/doc/info/lang.html) so an external
//! renderer (Graphviz) can draw it. The output declares one vertex per line and
//! one edge per line, each with a quoted `label` attribute:
//!
//! ```text
//! digraph {
//!   0 [label="a"];
//!   1 [label="b"];
//!   0 -> 1 [label="x"];
//! }
//! ```
//!
//! Vertices are named by their [`VertexIndex`](super::VertexIndex), so the
//! text only depends on the construction order of the graph and re-renders are
//! reproducible. What gets emitted around the declarations is controlled by
//! [`DotOptions`].

use super::LabeledDirectedGraph;

/// Rendering options for the DOT export.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DotOptions {
    /// Graph name written after `digraph`.
    pub name: Option<String>,
    /// Graph-level `key=value;` statements written before the declarations.
    pub graph_attributes: Vec<(String, String)>,
    /// Leave out the attribute list of vertices and edges whose label is empty.
    pub omit_empty_labels: bool,
}

impl DotOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.graph_attributes.push((key.into(), value.into()));
        self
    }

    pub fn omit_empty_labels(mut self, omit: bool) -> Self {
        self.omit_empty_labels = omit;
        self
    }

    fn label_attr(&self, label: &str) -> Option<String> {
        if self.omit_empty_labels && label.is_empty() {
            None
        } else {
            Some(format!("label={}", quote(label)))
        }
    }
}

/// Quotes a DOT string, escaping `"` and `\`. Line breaks become the `\n`
/// escape so every statement stays on one line.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

impl<V> LabeledDirectedGraph<V> {
    pub fn dot(&self) -> String {
        self.dot_with(&DotOptions::default())
    }

    pub fn dot_with(&self, options: &DotOptions) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.dot_serialize_fmt(&mut out, options);
        out
    }

    pub fn dot_serialize_fmt(
        &self,
        writer: &mut impl std::fmt::Write,
        options: &DotOptions,
    ) -> Result<(), std::fmt::Error> {
        match &options.name {
            Some(name) => writeln!(writer, "digraph {} {{", quote(name))?,
            None => writeln!(writer, "digraph {{")?,
        }

        for (key, value) in &options.graph_attributes {
            writeln!(writer, "  {key}={};", quote(value))?;
        }

        for index in self.vertex_indices() {
            let label = self.label_at(index).unwrap_or_default();
            match options.label_attr(label) {
                Some(attr) => writeln!(writer, "  {index} [{attr}];")?,
                None => writeln!(writer, "  {index};")?,
            }
        }

        for (source, target, label) in self.edge_indices() {
            match options.label_attr(label) {
                Some(attr) => writeln!(writer, "  {source} -> {target} [{attr}];")?,
                None => writeln!(writer, "  {source} -> {target};")?,
            }
        }

        writeln!(writer, "}}")?;
        Ok(())
    }

    pub fn dot_serialize_io(
        &self,
        writer: &mut impl std::io::Write,
        options: &DotOptions,
    ) -> Result<(), std::io::Error> {
        let mut buffer = String::new();
        self.dot_serialize_fmt(&mut buffer, options)
            .map_err(std::io::Error::other)?;
        writer.write_all(buffer.as_bytes())
    }
}
