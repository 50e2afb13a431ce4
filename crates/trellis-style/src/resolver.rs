//! Top-down style resolution.
//!
//! Each node starts from the defaults for its kind, takes the inheritable
//! properties of its parent, then applies its own explicit entries.

use crate::resolved::{Edges, ResolvedNode, ResolvedStyle, ResolvedStyleTree};
use trellis_core::{Alignment, Color, Direction, Distribution, Length, Node, NodeKind};

/// Resolve the style of every node in `root`.
///
/// The walk keeps its own stack, so any tree a reader accepts resolves.
pub fn resolve(root: &Node) -> ResolvedStyleTree<'_> {
    let mut nodes: Vec<ResolvedNode<'_>> = Vec::new();
    let mut stack: Vec<(&Node, Option<usize>)> = vec![(root, None)];

    while let Some((node, parent)) = stack.pop() {
        let index = nodes.len();
        let mut style = kind_defaults(node.kind());
        if let Some(parent) = parent {
            style.inherit_from(&nodes[parent].style);
            nodes[parent].children.push(index);
        }
        if let Some(block) = node.style() {
            for (property, value) in block.canonical() {
                style.apply(property, value);
            }
        }

        nodes.push(ResolvedNode { node, style, children: Vec::with_capacity(node.children().len()) });
        stack.extend(node.children().iter().rev().map(|child| (child, Some(index))));
    }

    log::debug!(target: "trellis_style", "resolved styles for {} nodes", nodes.len());
    ResolvedStyleTree { nodes }
}

/// Defaults for a node of `kind` before inheritance and explicit styles.
pub fn kind_defaults(kind: NodeKind) -> ResolvedStyle {
    let mut style = ResolvedStyle::default();
    match kind {
        NodeKind::Row => style.direction = Direction::Row,
        NodeKind::Column | NodeKind::Container => style.direction = Direction::Column,
        NodeKind::Center => {
            style.justify_content = Distribution::Center;
            style.align_items = Alignment::Center;
        }
        NodeKind::Button => {
            style.padding = Edges::symmetric(Length::Fixed(8.0), Length::Fixed(16.0));
            style.background_color = Color::rgb(0xe0, 0xe0, 0xe0);
        }
        NodeKind::Input => {
            style.padding = Edges::uniform(Length::Fixed(4.0));
            style.border_width = Length::Fixed(1.0);
        }
        NodeKind::Text | NodeKind::Image | NodeKind::Checkbox | NodeKind::Slider => {}
    }
    style
}
