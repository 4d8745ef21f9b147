use std::io::Write;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, ensure};
use tract_core::internal::*;

#[derive(Debug, Clone, Default)]
pub struct DotOptions {
    /// Also draw constant nodes and their edges.
    pub konst: bool,
    /// Label edges with the outlet facts.
    pub facts: bool,
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Write a typed graph in Graphviz dot format.
pub fn render_dot(
    model: &TypedModel,
    name: &str,
    options: &DotOptions,
    w: &mut dyn Write,
) -> TractResult<()> {
    let inputs = model.input_outlets()?;
    let outputs = model.output_outlets()?;
    let hidden = |id: usize| !options.konst && model.node(id).op.name() == "Const";
    writeln!(w, "digraph \"{}\" {{", escape(name))?;
    writeln!(w, "  rankdir=TB;")?;
    writeln!(w, "  node [shape=box, style=rounded, fontname=\"Helvetica\"];")?;
    writeln!(w, "  edge [fontname=\"Helvetica\", fontsize=10];")?;
    for &id in &model.eval_order()? {
        if hidden(id) {
            continue;
        }
        let node = model.node(id);
        let label = format!("{}\\n{}", escape(&node.name), escape(&node.op.name()));
        let mut attrs = vec![format!("label=\"{label}\"")];
        if inputs.iter().any(|o| o.node == id) {
            attrs.push("shape=ellipse".to_string());
        }
        if outputs.iter().any(|o| o.node == id) {
            attrs.push("peripheries=2".to_string());
        }
        writeln!(w, "  n{} [{}];", id, attrs.join(", "))?;
    }
    for &id in &model.eval_order()? {
        for input in &model.node(id).inputs {
            if hidden(input.node) || hidden(id) {
                continue;
            }
            if options.facts {
                let fact = escape(&format!("{:?}", model.outlet_fact(*input)?));
                writeln!(w, "  n{} -> n{} [label=\"{}\"];", input.node, id, fact)?;
            } else {
                writeln!(w, "  n{} -> n{};", input.node, id)?;
            }
        }
    }
    writeln!(w, "}}")?;
    Ok(())
}

/// Convert a dot file to SVG with the external `dot` program.
pub fn render_svg(dot: &Path, svg: &Path) -> TractResult<()> {
    debug!("Running dot -Tsvg {dot:?} -o {svg:?}");
    let status = Command::new("dot")
        .arg("-Tsvg")
        .arg(dot)
        .arg("-o")
        .arg(svg)
        .status()
        .context("Failed to call dot, is Graphviz installed?")?;
    ensure!(status.success(), "dot exited with {status}");
    Ok(())
}
