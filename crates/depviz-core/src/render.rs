//! Graph rendering: Graphviz DOT text and a self-contained HTML page.
//!
//! The HTML page embeds d3-graphviz and a series of DOT snapshots that
//! reveal the graph incrementally, starting from the leaves and
//! climbing parent connections one level per snapshot; a slider steps
//! through them.

use crate::crawler::PackageGraph;
use std::collections::{BTreeSet, HashSet};
use std::fmt::Write as _;

/// Render the whole graph as one DOT digraph, edges walked from the
/// roots down. An edge-seen set keeps cyclic graphs from looping and
/// collapses multi-edges to a single drawn line.
#[must_use]
pub fn to_dot(graph: &PackageGraph) -> String {
    let mut out = String::from("digraph G {\n");

    for handle in graph.all_nodes() {
        let _ = writeln!(
            out,
            "{} [label=\"{}\"]",
            handle.index(),
            escape(handle.node().package_id())
        );
    }
    out.push('\n');

    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut stack: Vec<usize> = graph.root_nodes().map(|h| h.index()).collect();

    while let Some(index) = stack.pop() {
        for connection in graph.handle(index).children_connections() {
            let pair = (index, connection.end.index());
            if seen.insert(pair) {
                let _ = writeln!(out, "{} -> {}", pair.0, pair.1);
                stack.push(pair.1);
            }
        }
    }

    out.push_str("}\n");
    out
}

/// Render the interactive HTML visualization.
#[must_use]
pub fn to_html(graph: &PackageGraph) -> String {
    let mut html = String::from(HTML_TEMPLATE_START);
    for snapshot in snapshots(graph) {
        let _ = write!(html, "[\nString.raw`digraph {{\n{snapshot}}}`\n],\n");
    }
    html.push_str(HTML_TEMPLATE_END);
    html
}

/// The successive DOT bodies: first the bare leaves, then one more
/// level of parent connections per entry until nothing new appears.
fn snapshots(graph: &PackageGraph) -> Vec<String> {
    let mut declared: HashSet<usize> = HashSet::new();
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut body = String::new();
    let mut frames = Vec::new();

    let leaves: Vec<usize> = graph.leaf_nodes().map(|h| h.index()).collect();
    for &leaf in &leaves {
        declare(graph, &mut body, &mut declared, leaf);
    }
    frames.push(body.clone());

    let mut frontier: BTreeSet<usize> = leaves.into_iter().collect();
    loop {
        let mut next: BTreeSet<usize> = BTreeSet::new();
        let mut changed = false;

        for &index in &frontier {
            for connection in graph.handle(index).parent_connections() {
                let parent = connection.end.index();
                next.insert(parent);
                if seen.insert((parent, index)) {
                    declare(graph, &mut body, &mut declared, parent);
                    declare(graph, &mut body, &mut declared, index);
                    let _ = writeln!(body, "{parent} -> {index}");
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
        frames.push(body.clone());
        frontier = next;
    }

    frames
}

fn declare(graph: &PackageGraph, body: &mut String, declared: &mut HashSet<usize>, index: usize) {
    if declared.insert(index) {
        let _ = writeln!(
            body,
            "{index} [label=\"{}\"]",
            escape(graph.handle(index).node().package_id())
        );
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

const HTML_TEMPLATE_START: &str = r##"<!DOCTYPE html>
<meta charset="utf-8">
<body>
<script src="https://unpkg.com/d3@5.0.0/dist/d3.min.js"></script>
<script src="https://unpkg.com/@hpcc-js/wasm@1.6.0/dist/index.min.js" type="application/javascript/"></script>
<script src="https://unpkg.com/d3-graphviz@3.2.0/build/d3-graphviz.js"></script>
<div id="graph" style="text-align: center;"></div>
<script>

var dotIndex = 0;
var graphviz = d3.select("#graph").graphviz()
    .transition(function () {
        return d3.transition("main")
            .ease(d3.easeLinear)
            .delay(250)
            .duration(250);
    })
    .on("initEnd", render);

function updateValue(e) {
  innerDiv.textContent = e.target.value;
  dotIndex = e.target.value;
  render();
}

function render() {
    var dotLines = dots[dotIndex];
    var dot = dotLines[0];
    graphviz
        .renderDot(dot);
}

var dots = [
"##;

const HTML_TEMPLATE_END: &str = r#"];

let div = document.createElement('div');
let innerDiv = document.createElement('div');
    innerDiv.id = "val";
    innerDiv.textContent = 0;
let slider = document.createElement('input');
    slider.id = "depth";
    slider.type = 'range';
    slider.min = 0;
    slider.max = dots.length - 1;
    slider.value = 0;
    slider.step = 1;

slider.addEventListener('input', updateValue);

div.appendChild(slider);
div.appendChild(innerDiv);
document.body.prepend(div);
</script>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DependencyEdge, GraphBuilder, PackageNode};
    use semver::Version;

    fn node(id: &str) -> PackageNode {
        PackageNode::new(id, Version::parse("1.0.0").unwrap(), "", None)
    }

    fn edge(parent: &str, child: &str) -> DependencyEdge {
        DependencyEdge::new("^1.0.0", parent, child)
    }

    /// a -> b -> c
    fn chain_graph() -> PackageGraph {
        let mut builder = GraphBuilder::new();
        builder.add_child_connection(node("a"), node("b"), edge("a", "b"));
        builder.add_child_connection(node("b"), node("c"), edge("b", "c"));
        builder.build()
    }

    #[test]
    fn test_dot_contains_all_nodes_and_edges() {
        let dot = to_dot(&chain_graph());

        assert!(dot.starts_with("digraph G {"));
        assert!(dot.contains("[label=\"a\"]"));
        assert!(dot.contains("[label=\"b\"]"));
        assert!(dot.contains("[label=\"c\"]"));
        assert_eq!(dot.matches(" -> ").count(), 2);
    }

    #[test]
    fn test_dot_terminates_on_cycles() {
        let mut builder = GraphBuilder::new();
        builder.add_child_connection(node("x"), node("y"), edge("x", "y"));
        builder.add_child_connection(node("y"), node("x"), edge("y", "x"));
        let graph = builder.build();

        // No roots exist in a pure cycle, so only node declarations
        // appear; the point is that this returns at all.
        let dot = to_dot(&graph);
        assert!(dot.contains("[label=\"x\"]"));
    }

    #[test]
    fn test_dot_collapses_multi_edges() {
        let mut builder = GraphBuilder::new();
        builder.add_child_connection(node("a"), node("b"), DependencyEdge::new("^1.0.0", "a", "b"));
        builder.add_child_connection(node("a"), node("b"), DependencyEdge::new("^2.0.0", "a", "b"));
        let dot = to_dot(&builder.build());

        assert_eq!(dot.matches(" -> ").count(), 1);
    }

    #[test]
    fn test_html_snapshots_grow_from_leaves() {
        let frames = snapshots(&chain_graph());

        // Leaves only, then one parent level per frame: c | b->c | a->b.
        assert_eq!(frames.len(), 3);
        assert!(frames[0].contains("[label=\"c\"]"));
        assert!(!frames[0].contains("->"));
        assert!(frames[1].contains("-> "));
        assert!(frames[2].contains("[label=\"a\"]"));

        // Frames are cumulative.
        assert!(frames[2].contains("[label=\"c\"]"));
    }

    #[test]
    fn test_html_page_structure() {
        let html = to_html(&chain_graph());
        assert!(html.contains("d3-graphviz"));
        assert!(html.contains("String.raw`digraph {"));
        assert!(html.contains("slider.addEventListener"));
    }
}
