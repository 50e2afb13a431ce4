//! The component tree.

use crate::errors::ConstructionError;
use crate::style::{Property, StyleBlock, StyleValue};
use crate::types::Rect;
use std::collections::HashSet;
use std::fmt;

/// The closed set of component kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    Container,
    Row,
    Column,
    Center,
    Text,
    Button,
    Image,
    Input,
    Checkbox,
    Slider,
}

impl NodeKind {
    pub const ALL: [NodeKind; 10] = [
        NodeKind::Container,
        NodeKind::Row,
        NodeKind::Column,
        NodeKind::Center,
        NodeKind::Text,
        NodeKind::Button,
        NodeKind::Image,
        NodeKind::Input,
        NodeKind::Checkbox,
        NodeKind::Slider,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Container => "Container",
            NodeKind::Row => "Row",
            NodeKind::Column => "Column",
            NodeKind::Center => "Center",
            NodeKind::Text => "Text",
            NodeKind::Button => "Button",
            NodeKind::Image => "Image",
            NodeKind::Input => "Input",
            NodeKind::Checkbox => "Checkbox",
            NodeKind::Slider => "Slider",
        }
    }

    pub fn from_name(name: &str) -> Option<NodeKind> {
        NodeKind::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<NodeKind> {
        NodeKind::ALL.get(tag as usize).copied()
    }

    /// Maximum number of children, `None` meaning unbounded.
    pub fn max_children(self) -> Option<usize> {
        match self {
            NodeKind::Container | NodeKind::Row | NodeKind::Column => None,
            NodeKind::Center => Some(1),
            NodeKind::Text
            | NodeKind::Button
            | NodeKind::Image
            | NodeKind::Input
            | NodeKind::Checkbox
            | NodeKind::Slider => Some(0),
        }
    }

    pub fn is_container(self) -> bool {
        self.max_children() != Some(0)
    }

    /// The payload a freshly created node of this kind carries.
    pub fn default_payload(self) -> Payload {
        match self {
            NodeKind::Container | NodeKind::Row | NodeKind::Column | NodeKind::Center => Payload::None,
            NodeKind::Text | NodeKind::Button => Payload::Text(String::new()),
            NodeKind::Image => Payload::Image { source: String::new(), width: 0.0, height: 0.0 },
            NodeKind::Input => Payload::Input { value: String::new(), placeholder: String::new() },
            NodeKind::Checkbox => Payload::Checkbox { label: String::new(), checked: false },
            NodeKind::Slider => Payload::Slider { value: 0.0, min: 0.0, max: 1.0 },
        }
    }
}

/// Identity of a node, unique within one construction session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind-specific content.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Payload {
    None,
    /// Label of a Text or Button.
    Text(String),
    /// Image source with its intrinsic size.
    Image { source: String, width: f64, height: f64 },
    Input { value: String, placeholder: String },
    Checkbox { label: String, checked: bool },
    Slider { value: f64, min: f64, max: f64 },
}

impl Payload {
    /// Whether this payload is valid for `kind`.
    pub fn fits(&self, kind: NodeKind) -> bool {
        matches!(
            (kind, self),
            (NodeKind::Container | NodeKind::Row | NodeKind::Column | NodeKind::Center, Payload::None)
                | (NodeKind::Text | NodeKind::Button, Payload::Text(_))
                | (NodeKind::Image, Payload::Image { .. })
                | (NodeKind::Input, Payload::Input { .. })
                | (NodeKind::Checkbox, Payload::Checkbox { .. })
                | (NodeKind::Slider, Payload::Slider { .. })
        )
    }

    fn is_finite(&self) -> bool {
        match self {
            Payload::Image { width, height, .. } => width.is_finite() && height.is_finite(),
            Payload::Slider { value, min, max } => value.is_finite() && min.is_finite() && max.is_finite(),
            _ => true,
        }
    }

    /// The text shown for this node, if it has any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s),
            Payload::Input { value, placeholder } => Some(if value.is_empty() { placeholder.as_str() } else { value.as_str() }),
            Payload::Checkbox { label, .. } => Some(label),
            _ => None,
        }
    }
}

/// A component in the tree.
///
/// Children are owned; the tree has no back-pointers. `computed_rect` is
/// written by layout. Style and payload changes clear it for the whole
/// subtree; adding or removing a child clears it on this node and on the
/// attached or detached child.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    kind: NodeKind,
    id: NodeId,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    style: Option<StyleBlock>,
    payload: Payload,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    computed_rect: Option<Rect>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    children: Vec<Node>,
}

impl Node {
    /// Assemble a node from decoded parts. Readers use this; application
    /// code should go through a [`Session`] so ids stay unique.
    pub fn from_parts(kind: NodeKind, id: NodeId, payload: Payload) -> Result<Node, ConstructionError> {
        if !payload.fits(kind) {
            return Err(ConstructionError::PayloadMismatch { kind });
        }
        if !payload.is_finite() {
            return Err(ConstructionError::NonFinitePayload { kind });
        }
        Ok(Node {
            kind,
            id,
            style: None,
            payload,
            computed_rect: None,
            children: Vec::new(),
        })
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn style(&self) -> Option<&StyleBlock> {
        self.style.as_ref()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn computed_rect(&self) -> Option<Rect> {
        self.computed_rect
    }

    /// The explicit value of `property`, if set on this node.
    pub fn style_value(&self, property: Property) -> Option<&StyleValue> {
        self.style.as_ref().and_then(|s| s.get(property))
    }

    pub fn set_style(
        &mut self,
        property: Property,
        value: impl Into<StyleValue>,
    ) -> Result<&mut Self, ConstructionError> {
        let value = value.into();
        value.check(property)?;
        self.style.get_or_insert_with(StyleBlock::new).set(property, value)?;
        self.invalidate();
        Ok(self)
    }

    /// Replace the whole style block. Every entry is checked first.
    pub fn set_style_block(&mut self, style: Option<StyleBlock>) -> Result<&mut Self, ConstructionError> {
        if let Some(block) = &style {
            block.check()?;
        }
        self.style = style.filter(|b| !b.is_empty());
        self.invalidate();
        Ok(self)
    }

    pub fn clear_style(&mut self, property: Property) -> Option<StyleValue> {
        let removed = self.style.as_mut().and_then(|s| s.remove(property));
        if self.style.as_ref().is_some_and(StyleBlock::is_empty) {
            self.style = None;
        }
        if removed.is_some() {
            self.invalidate();
        }
        removed
    }

    pub fn set_payload(&mut self, payload: Payload) -> Result<&mut Self, ConstructionError> {
        if !payload.fits(self.kind) {
            return Err(ConstructionError::PayloadMismatch { kind: self.kind });
        }
        if !payload.is_finite() {
            return Err(ConstructionError::NonFinitePayload { kind: self.kind });
        }
        self.payload = payload;
        self.invalidate();
        Ok(self)
    }

    /// Append a child. Constant time: only this node's rect and the child's
    /// own rect are cleared.
    pub fn append_child(&mut self, mut child: Node) -> Result<&mut Self, ConstructionError> {
        self.check_capacity(self.children.len() + 1)?;
        child.computed_rect = None;
        self.children.push(child);
        self.computed_rect = None;
        Ok(self)
    }

    pub fn insert_child(&mut self, index: usize, mut child: Node) -> Result<&mut Self, ConstructionError> {
        self.check_capacity(self.children.len() + 1)?;
        let index = index.min(self.children.len());
        child.computed_rect = None;
        self.children.insert(index, child);
        self.computed_rect = None;
        Ok(self)
    }

    pub fn remove_child(&mut self, index: usize) -> Option<Node> {
        if index >= self.children.len() {
            return None;
        }
        let mut child = self.children.remove(index);
        child.computed_rect = None;
        self.computed_rect = None;
        Some(child)
    }

    /// Builder form of [`Node::set_style`].
    pub fn with_style(mut self, property: Property, value: impl Into<StyleValue>) -> Result<Self, ConstructionError> {
        self.set_style(property, value)?;
        Ok(self)
    }

    /// Builder form of [`Node::append_child`].
    pub fn with_child(mut self, child: Node) -> Result<Self, ConstructionError> {
        self.append_child(child)?;
        Ok(self)
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Result<Self, ConstructionError> {
        for child in children {
            self.append_child(child)?;
        }
        Ok(self)
    }

    /// Store a layout result. Only layout and readers call this.
    pub fn set_computed_rect(&mut self, rect: Option<Rect>) {
        self.computed_rect = rect;
    }

    /// Mutable access to children for layout passes that write rects.
    ///
    /// Structure cannot change through this slice.
    pub fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    fn check_capacity(&self, count: usize) -> Result<(), ConstructionError> {
        match self.kind.max_children() {
            Some(0) if count > 0 => Err(ConstructionError::LeafCannotHaveChildren { kind: self.kind }),
            Some(max) if count > max => Err(ConstructionError::TooManyChildren { kind: self.kind, max }),
            _ => Ok(()),
        }
    }

    /// Clear computed rects of this node and its subtree.
    pub fn invalidate(&mut self) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            node.computed_rect = None;
            stack.extend(node.children.iter_mut());
        }
    }

    /// Clear every computed rect in the tree if `id` is part of it.
    ///
    /// Returns whether the node was found. Changing one node can move any
    /// other node, so the whole tree is invalidated.
    pub fn mark_dirty(&mut self, id: NodeId) -> bool {
        if self.find(id).is_none() {
            return false;
        }
        self.invalidate();
        true
    }

    /// Pre-order traversal.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.iter().find(|n| n.id == id)
    }

    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.id == id {
                return Some(node);
            }
            stack.extend(node.children.iter_mut().rev());
        }
        None
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Number of levels, a single node being depth 1.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        max
    }

    pub fn max_id(&self) -> NodeId {
        self.iter().map(|n| n.id).max().unwrap_or(self.id)
    }

    /// Check structural rules and id uniqueness over the whole tree.
    ///
    /// Trees built through the mutators are always structurally valid, but
    /// ids can collide when nodes from different sessions are combined, and
    /// deserialized trees bypass the mutators.
    pub fn validate(&self) -> Result<(), ConstructionError> {
        let mut seen = HashSet::new();
        for node in self.iter() {
            if !seen.insert(node.id) {
                return Err(ConstructionError::DuplicateId { id: node.id });
            }
            if !node.payload.fits(node.kind) {
                return Err(ConstructionError::PayloadMismatch { kind: node.kind });
            }
            if !node.payload.is_finite() {
                return Err(ConstructionError::NonFinitePayload { kind: node.kind });
            }
            node.check_capacity(node.children.len())?;
            if let Some(style) = &node.style {
                style.check()?;
            }
        }
        Ok(())
    }
}

// Readers accept trees of any depth, so cloning, comparing, and dropping
// must not recurse.
impl Clone for Node {
    fn clone(&self) -> Self {
        // Reverse pre-order visits every subtree before its root, with later
        // siblings first, so each node finds its children on top of `built`.
        let order: Vec<&Node> = self.iter().collect();
        let mut built: Vec<Node> = Vec::with_capacity(order.len());
        for node in order.into_iter().rev() {
            let split = built.len().saturating_sub(node.children.len());
            let children: Vec<Node> = built.drain(split..).rev().collect();
            built.push(Node {
                kind: node.kind,
                id: node.id,
                style: node.style.clone(),
                payload: node.payload.clone(),
                computed_rect: node.computed_rect,
                children,
            });
        }
        built.pop().unwrap_or_else(|| Node {
            kind: self.kind,
            id: self.id,
            style: self.style.clone(),
            payload: self.payload.clone(),
            computed_rect: self.computed_rect,
            children: Vec::new(),
        })
    }
}

impl PartialEq for Node {
    /// Two trees are equal when their pre-order sequences match node for
    /// node, child counts included.
    fn eq(&self, other: &Node) -> bool {
        let mut left = self.iter();
        let mut right = other.iter();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) if a.same_fields(b) => {}
                _ => return false,
            }
        }
    }
}

impl Node {
    fn same_fields(&self, other: &Node) -> bool {
        self.kind == other.kind
            && self.id == other.id
            && self.style == other.style
            && self.payload == other.payload
            && self.computed_rect == other.computed_rect
            && self.children.len() == other.children.len()
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// Pre-order iterator over a tree.
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Allocates node ids for one tree-building session.
#[derive(Debug, Clone)]
pub struct Session {
    next_id: u32,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Continue allocating after the highest id in `tree`.
    pub fn resume_after(tree: &Node) -> Self {
        Self { next_id: tree.max_id().0.saturating_add(1) }
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create a node with the default payload for its kind.
    pub fn create(&mut self, kind: NodeKind) -> Node {
        Node {
            kind,
            id: self.next_id(),
            style: None,
            payload: kind.default_payload(),
            computed_rect: None,
            children: Vec::new(),
        }
    }

    pub fn container(&mut self) -> Node {
        self.create(NodeKind::Container)
    }

    pub fn row(&mut self) -> Node {
        self.create(NodeKind::Row)
    }

    pub fn column(&mut self) -> Node {
        self.create(NodeKind::Column)
    }

    pub fn center(&mut self) -> Node {
        self.create(NodeKind::Center)
    }

    pub fn text(&mut self, content: impl Into<String>) -> Node {
        let mut node = self.create(NodeKind::Text);
        node.payload = Payload::Text(content.into());
        node
    }

    pub fn button(&mut self, label: impl Into<String>) -> Node {
        let mut node = self.create(NodeKind::Button);
        node.payload = Payload::Text(label.into());
        node
    }

    pub fn input(&mut self, value: impl Into<String>, placeholder: impl Into<String>) -> Node {
        let mut node = self.create(NodeKind::Input);
        node.payload = Payload::Input { value: value.into(), placeholder: placeholder.into() };
        node
    }

    pub fn checkbox(&mut self, label: impl Into<String>, checked: bool) -> Node {
        let mut node = self.create(NodeKind::Checkbox);
        node.payload = Payload::Checkbox { label: label.into(), checked };
        node
    }

    pub fn image(&mut self, source: impl Into<String>, width: f64, height: f64) -> Result<Node, ConstructionError> {
        let mut node = self.create(NodeKind::Image);
        node.set_payload(Payload::Image { source: source.into(), width, height })?;
        Ok(node)
    }

    pub fn slider(&mut self, value: f64, min: f64, max: f64) -> Result<Node, ConstructionError> {
        let mut node = self.create(NodeKind::Slider);
        node.set_payload(Payload::Slider { value, min, max })?;
        Ok(node)
    }
}
