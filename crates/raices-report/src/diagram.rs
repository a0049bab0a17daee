//! Flow diagram - two-column SVG of the focus edges
//!
//! Node slots follow the label-list layout: every source label then every
//! target label, each edge pointing at the first occurrence of its labels.
//! Slots no edge points at are not drawn.

use crate::error::Result;
use minijinja::{AutoEscape, Environment};
use raices_domain::{Category, FlowEdges, Taxonomy};
use serde::Serialize;

const FLOW_TEMPLATE: &str = include_str!("../templates/flow.svg");

const TITLE: &str = "Tu Mapa de Sanación";
const WIDTH: f64 = 780.0;
const LEFT_X: f64 = 230.0;
const RIGHT_X: f64 = 530.0;
const NODE_WIDTH: f64 = 20.0;
const NODE_HEIGHT: f64 = 20.0;
const ROW: f64 = 30.0;
const TOP: f64 = 40.0;
const LABEL_GAP: f64 = 8.0;

/// A drawn node
#[derive(Debug, Clone, Serialize)]
pub struct DiagramNode {
    /// Node label
    pub label: String,

    /// Category of the label
    pub category: Category,

    /// Fill colour
    pub color: &'static str,

    /// Slot in the source-then-target label list
    pub slot: usize,

    /// Top-left x
    pub x: f64,

    /// Top-left y
    pub y: f64,

    /// Label anchor x
    pub label_x: f64,

    /// SVG `text-anchor` for the label
    pub anchor: &'static str,
}

/// A drawn link between two node slots
#[derive(Debug, Clone, Serialize)]
pub struct DiagramLink {
    /// Source slot
    pub source: usize,

    /// Target slot
    pub target: usize,

    /// Source label
    pub source_label: String,

    /// Target label
    pub target_label: String,

    /// Edge weight
    pub weight: f64,

    /// SVG path data
    pub path: String,

    /// Stroke width, proportional to the weight
    pub stroke_width: f64,

    /// Stroke colour (the source node's colour)
    pub color: &'static str,
}

/// Layout of a flow diagram, ready to render
#[derive(Debug, Clone, Serialize)]
pub struct FlowDiagram {
    title: &'static str,
    width: f64,
    height: f64,
    title_x: f64,
    node_width: f64,
    node_height: f64,
    nodes: Vec<DiagramNode>,
    links: Vec<DiagramLink>,
}

impl FlowDiagram {
    /// Lay out the diagram for `edges`
    pub fn from_edges(edges: &FlowEdges, taxonomy: &Taxonomy) -> Self {
        let positions = edges.link_positions();
        let split = edges.sources.len();

        let mut used: Vec<usize> = positions.iter().flat_map(|&(s, t)| [s, t]).collect();
        used.sort_unstable();
        used.dedup();

        let mut nodes = Vec::with_capacity(used.len());
        let (mut left_rows, mut right_rows) = (0usize, 0usize);
        for slot in used {
            let (label, left) = if slot < split {
                (&edges.sources[slot], true)
            } else {
                (&edges.targets[slot - split], false)
            };
            let row = if left { &mut left_rows } else { &mut right_rows };
            let y = TOP + *row as f64 * ROW;
            *row += 1;

            let category = taxonomy.categorize(label);
            nodes.push(DiagramNode {
                label: label.clone(),
                category,
                color: category.color(),
                slot,
                x: if left { LEFT_X } else { RIGHT_X },
                y,
                label_x: if left {
                    LEFT_X - LABEL_GAP
                } else {
                    RIGHT_X + NODE_WIDTH + LABEL_GAP
                },
                anchor: if left { "end" } else { "start" },
            });
        }

        let links = positions
            .iter()
            .zip(edges.iter())
            .filter_map(|(&(s, t), (source_label, target_label, weight))| {
                let from = nodes.iter().find(|n| n.slot == s)?;
                let to = nodes.iter().find(|n| n.slot == t)?;
                let x1 = from.x + NODE_WIDTH;
                let y1 = from.y + NODE_HEIGHT / 2.0;
                let x2 = to.x;
                let y2 = to.y + NODE_HEIGHT / 2.0;
                let cx = (x1 + x2) / 2.0;
                Some(DiagramLink {
                    source: s,
                    target: t,
                    source_label: source_label.to_string(),
                    target_label: target_label.to_string(),
                    weight,
                    path: format!(
                        "M{x1:.1},{y1:.1} C{cx:.1},{y1:.1} {cx:.1},{y2:.1} {x2:.1},{y2:.1}"
                    ),
                    stroke_width: (2.0 * weight).clamp(1.0, NODE_HEIGHT),
                    color: from.color,
                })
            })
            .collect();

        let rows = left_rows.max(right_rows) as f64;
        Self {
            title: TITLE,
            width: WIDTH,
            height: TOP + rows * ROW + NODE_HEIGHT,
            title_x: WIDTH / 2.0,
            node_width: NODE_WIDTH,
            node_height: NODE_HEIGHT,
            nodes,
            links,
        }
    }

    /// Whether there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Drawn nodes
    pub fn nodes(&self) -> &[DiagramNode] {
        &self.nodes
    }

    /// Drawn links
    pub fn links(&self) -> &[DiagramLink] {
        &self.links
    }

    /// Render as standalone SVG markup; empty diagrams render as ""
    pub fn to_svg(&self) -> Result<String> {
        if self.is_empty() {
            return Ok(String::new());
        }

        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_template("flow.svg", FLOW_TEMPLATE)?;
        let svg = env.get_template("flow.svg")?.render(self)?;
        Ok(svg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raices_domain::{select_focus, Edge, Graph, SelectionMode};

    fn edges(mode: SelectionMode) -> FlowEdges {
        let graph = Graph::from_edges(&[
            Edge::new("La Casa", "El Mundo", 2.0),
            Edge::new("La Casa", "Miedo <Profundo>", 1.0),
        ]);
        select_focus(&graph, &["La Casa"], mode)
    }

    #[test]
    fn test_layout_deduplicated() {
        let diagram = FlowDiagram::from_edges(&edges(SelectionMode::Deduplicated), &Taxonomy::default());

        // One source slot shared by both links, two target slots
        assert_eq!(diagram.links().len(), 2);
        assert_eq!(diagram.nodes().len(), 3);
        assert_eq!(diagram.links()[0].source, diagram.links()[1].source);

        let casa = diagram.nodes().iter().find(|n| n.label == "La Casa").unwrap();
        assert_eq!(casa.category, Category::RootCard);
        assert_eq!(casa.color, "#F28E2B");
        assert_eq!(casa.anchor, "end");
    }

    #[test]
    fn test_layout_mirrored_keeps_every_link() {
        let diagram = FlowDiagram::from_edges(&edges(SelectionMode::Mirrored), &Taxonomy::default());
        assert_eq!(diagram.links().len(), 4);
    }

    #[test]
    fn test_stroke_scales_with_weight() {
        let diagram = FlowDiagram::from_edges(&edges(SelectionMode::Deduplicated), &Taxonomy::default());
        let heavy = diagram.links().iter().find(|l| l.weight == 2.0).unwrap();
        let light = diagram.links().iter().find(|l| l.weight == 1.0).unwrap();
        assert!(heavy.stroke_width > light.stroke_width);
    }

    #[test]
    fn test_svg_escapes_labels() {
        let diagram = FlowDiagram::from_edges(&edges(SelectionMode::Deduplicated), &Taxonomy::default());
        let svg = diagram.to_svg().unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Tu Mapa de Sanación"));
        assert!(svg.contains("Miedo &lt;Profundo&gt;"));
        assert!(!svg.contains("<Profundo>"));
        assert!(svg.contains("#E15759"));
    }

    #[test]
    fn test_empty_diagram() {
        let diagram = FlowDiagram::from_edges(&FlowEdges::default(), &Taxonomy::default());
        assert!(diagram.is_empty());
        assert_eq!(diagram.to_svg().unwrap(), "");
    }
}
