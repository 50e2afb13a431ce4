//! Layout computation from a resolved style tree.
//!
//! Layout runs in two passes over the tree:
//! 1. **Intrinsic** (bottom-up): the content size of every node
//! 2. **Placement** (top-down): each container sizes and positions its
//!    children inside its own final box
//!
//! Both passes sweep the pre-order node list of the resolved tree instead
//! of recursing, so depth is unbounded. They are generic over
//! [`LayoutScalar`]; [`LayoutOptions::domain`] picks the instantiation once
//! per call.

use glam::DVec2;
use smallvec::SmallVec;
use std::ops::Range;

use trellis_core::{Alignment, Direction, Distribution, Length, NodeKind, Payload, Rect, Wrap};
use trellis_style::{ResolvedNode, ResolvedStyle, ResolvedStyleTree};

use crate::flex::{clamp_size, cross_offset, distribute, main_offsets, used_space, FlexItem};
use crate::measure::{FontProperties, TextMeasure};
use crate::scalar::{Fixed, LayoutScalar};
use crate::tree::LaidOutTree;

/// Checkbox glyph edge length.
const CHECKBOX_BOX: f64 = 16.0;
/// Space between a checkbox glyph and its label.
const CHECKBOX_SPACING: f64 = 8.0;
const INPUT_SIZE: (f64, f64) = (200.0, 24.0);
const SLIDER_SIZE: (f64, f64) = (160.0, 24.0);

/// Arithmetic used for every layout computation in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericDomain {
    /// IEEE-754 double precision.
    #[default]
    Float,
    /// 16 fractional bits; bit-identical on every platform.
    Fixed,
}

/// Options for layout computation.
#[derive(Debug, Clone, Default)]
pub struct LayoutOptions {
    pub domain: NumericDomain,
}

impl LayoutOptions {
    pub fn with_domain(mut self, domain: NumericDomain) -> Self {
        self.domain = domain;
        self
    }
}

/// Space offered to the root node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvailableSize {
    pub width: f64,
    pub height: f64,
}

impl AvailableSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl From<DVec2> for AvailableSize {
    fn from(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// Compute the geometry of every node.
///
/// Layout never fails: sizes that would come out negative clamp to zero.
/// The returned tree is a copy of the input with `computed_rect` set on
/// every node, in absolute coordinates rooted at the tree root.
pub fn layout<M>(
    tree: &ResolvedStyleTree<'_>,
    available: AvailableSize,
    measure: &M,
    options: &LayoutOptions,
) -> LaidOutTree
where
    M: TextMeasure + ?Sized,
{
    log::debug!(
        target: "trellis_layout",
        "layout root {} ({} nodes) in {}x{} ({:?})",
        tree.root().node.id(),
        tree.len(),
        available.width,
        available.height,
        options.domain
    );

    let rects = match options.domain {
        NumericDomain::Float => LayoutEngine::<f64, M>::new(measure).run(tree, available),
        NumericDomain::Fixed => LayoutEngine::<Fixed, M>::new(measure).run(tree, available),
    };

    // Rects come back in pre-order, the order `Node::iter` walks.
    let mut root = tree.root().node.clone();
    let mut rects = rects.into_iter();
    let mut stack = vec![&mut root];
    while let Some(node) = stack.pop() {
        node.set_computed_rect(rects.next());
        stack.extend(node.children_mut().iter_mut().rev());
    }
    LaidOutTree::new(root)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn main(direction: Direction) -> Axis {
        match direction {
            Direction::Row => Axis::Horizontal,
            Direction::Column => Axis::Vertical,
        }
    }

    fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// Size, min and max lengths of `style` along this axis.
    fn lengths(self, style: &ResolvedStyle) -> (Length, Length, Length) {
        match self {
            Axis::Horizontal => (style.width, style.min_width, style.max_width),
            Axis::Vertical => (style.height, style.min_height, style.max_height),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Size<T> {
    width: T,
    height: T,
}

impl<T: Copy> Size<T> {
    fn get(&self, axis: Axis) -> T {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    fn from_axes(main_axis: Axis, main: T, cross: T) -> Self {
        match main_axis {
            Axis::Horizontal => Size { width: main, height: cross },
            Axis::Vertical => Size { width: cross, height: main },
        }
    }

    fn both(f: impl Fn(Axis) -> T) -> Self {
        Size { width: f(Axis::Horizontal), height: f(Axis::Vertical) }
    }
}

/// A node's final box and what percentages of its children resolve against.
#[derive(Debug, Clone, Copy, Default)]
struct Frame<S> {
    x: S,
    y: S,
    size: Size<S>,
    definite: Size<bool>,
    /// Inner size of the nearest definite ancestor.
    anchor: Size<Option<S>>,
    /// Whether the parent was indefinite on each axis.
    in_auto_parent: Size<bool>,
}

impl<S: LayoutScalar> Frame<S> {
    fn root(size: Size<S>) -> Self {
        Frame {
            x: S::ZERO,
            y: S::ZERO,
            size,
            definite: Size { width: true, height: true },
            anchor: Size::default(),
            in_auto_parent: Size::default(),
        }
    }

    fn is_definite(&self, axis: Axis) -> bool {
        self.definite.get(axis)
    }

    /// The base for percentages of children on `axis`.
    ///
    /// A definite box is its own base. An auto box inside a definite parent
    /// has none, so percentages resolve to zero. An auto box inside another
    /// auto box defers to the nearest definite ancestor.
    fn reference(&self, axis: Axis) -> Option<S> {
        if self.is_definite(axis) {
            Some(self.size.get(axis))
        } else if self.in_auto_parent.get(axis) {
            self.anchor.get(axis)
        } else {
            None
        }
    }

    /// The content box once `insets` are taken off.
    fn inset(&self, insets: &Insets<S>) -> Frame<S> {
        Frame {
            x: self.x + insets.left,
            y: self.y + insets.top,
            size: Size::both(|axis| (self.size.get(axis) - insets.along(axis)).non_negative()),
            ..*self
        }
    }

    /// A child box at `(x, y)` relative to this content box.
    fn child(&self, x: S, y: S, size: Size<S>, definite: Size<bool>) -> Frame<S> {
        Frame {
            x: self.x + x,
            y: self.y + y,
            size,
            definite,
            anchor: Size::both(|axis| {
                if self.is_definite(axis) {
                    Some(self.size.get(axis))
                } else {
                    self.anchor.get(axis)
                }
            }),
            in_auto_parent: Size::both(|axis| !self.is_definite(axis)),
        }
    }

    fn to_rect(self) -> Rect {
        Rect::new(
            self.x.to_f64(),
            self.y.to_f64(),
            self.size.width.to_f64(),
            self.size.height.to_f64(),
        )
    }
}

/// Space on each edge of a box.
#[derive(Debug, Clone, Copy)]
struct Insets<S> {
    top: S,
    right: S,
    bottom: S,
    left: S,
}

impl<S: LayoutScalar> Insets<S> {
    /// Padding plus border. Percentages resolve against `reference`, the
    /// node's own width, and count as zero while it is unknown.
    fn of(style: &ResolvedStyle, reference: Option<S>) -> Self {
        let edge = |l: Length| resolve(l, reference).unwrap_or(S::ZERO).non_negative();
        let border = edge(style.border_width);
        Insets {
            top: edge(style.padding.top) + border,
            right: edge(style.padding.right) + border,
            bottom: edge(style.padding.bottom) + border,
            left: edge(style.padding.left) + border,
        }
    }

    /// Margins. Percentages on every edge resolve against the parent's
    /// content width.
    fn margin(style: &ResolvedStyle, reference: Option<S>) -> Self {
        let edge = |l: Length| resolve(l, reference).unwrap_or(S::ZERO).non_negative();
        Insets {
            top: edge(style.margin.top),
            right: edge(style.margin.right),
            bottom: edge(style.margin.bottom),
            left: edge(style.margin.left),
        }
    }

    fn along(&self, axis: Axis) -> S {
        match axis {
            Axis::Horizontal => self.left + self.right,
            Axis::Vertical => self.top + self.bottom,
        }
    }

    fn start(&self, axis: Axis) -> S {
        match axis {
            Axis::Horizontal => self.left,
            Axis::Vertical => self.top,
        }
    }
}

fn resolve<S: LayoutScalar>(length: Length, reference: Option<S>) -> Option<S> {
    match length {
        Length::Fixed(v) => Some(S::from_f64(v)),
        Length::Percent(p) => reference.map(|r| r.percent(p)),
        Length::Auto => None,
    }
}

/// What a child adds to its parent's intrinsic size on `axis`, margins
/// included. Percentages cannot resolve before the parent is sized.
fn contribution<S: LayoutScalar>(style: &ResolvedStyle, intrinsic: Size<S>, axis: Axis) -> S {
    let size = match axis.lengths(style).0 {
        Length::Percent(_) => S::ZERO,
        _ => intrinsic.get(axis),
    };
    size + Insets::<S>::margin(style, None).along(axis)
}

struct LayoutEngine<'m, S, M: ?Sized> {
    measure: &'m M,
    _scalar: std::marker::PhantomData<S>,
}

impl<'m, S, M> LayoutEngine<'m, S, M>
where
    S: LayoutScalar,
    M: TextMeasure + ?Sized,
{
    fn new(measure: &'m M) -> Self {
        Self { measure, _scalar: std::marker::PhantomData }
    }

    /// Rects of every node in pre-order.
    fn run(&self, tree: &ResolvedStyleTree<'_>, available: AvailableSize) -> Vec<Rect> {
        let nodes = tree.nodes();

        // Children always follow their parent, so a reverse sweep measures
        // every child before its parent.
        let mut intrinsic: Vec<Size<S>> = vec![Size::default(); nodes.len()];
        for index in (0..nodes.len()).rev() {
            let size = self.measure_node(nodes, &nodes[index], &intrinsic);
            intrinsic[index] = size;
        }

        let avail = Size::both(|axis| {
            let value = match axis {
                Axis::Horizontal => available.width,
                Axis::Vertical => available.height,
            };
            S::from_f64(value).non_negative()
        });
        // The root fills the available space unless sized explicitly.
        let root = tree.root();
        let root_size = Size::both(|axis| {
            let (size, min, max) = axis.lengths(&root.style);
            let reference = Some(avail.get(axis));
            let value = resolve(size, reference).unwrap_or(avail.get(axis));
            clamp_size(value, resolve(min, reference), resolve(max, reference))
        });

        let mut frames: Vec<Frame<S>> = vec![Frame::default(); nodes.len()];
        if let Some(first) = frames.first_mut() {
            *first = Frame::root(root_size);
        }

        let mut rects = Vec::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            let frame = frames[index];
            rects.push(frame.to_rect());
            if node.children.is_empty() {
                continue;
            }

            let inner = frame.inset(&Insets::of(&node.style, Some(frame.size.width)));
            let placed = match node.node.kind() {
                NodeKind::Center => center_children(nodes, node, &intrinsic, &inner),
                _ => flex_children(nodes, node, &intrinsic, &inner),
            };
            for (&child, child_frame) in node.children.iter().zip(placed) {
                frames[child] = child_frame;
            }
        }
        rects
    }

    // ------------------------------------------------------------------
    // Intrinsic pass
    // ------------------------------------------------------------------

    fn measure_node(&self, nodes: &[ResolvedNode<'_>], node: &ResolvedNode<'_>, intrinsic: &[Size<S>]) -> Size<S> {
        let style = &node.style;
        let fixed = Size::both(|axis| match axis.lengths(style) {
            (Length::Fixed(v), min, max) => Some(clamp_size(S::from_f64(v), resolve(min, None), resolve(max, None))),
            _ => None,
        });
        let insets = Insets::of(style, fixed.width);
        let inner = Size::both(|axis| fixed.get(axis).map(|v| (v - insets.along(axis)).non_negative()));
        let content = self.content_size(nodes, node, intrinsic, inner);

        Size::both(|axis| {
            fixed.get(axis).unwrap_or_else(|| {
                let (_, min, max) = axis.lengths(style);
                clamp_size(content.get(axis) + insets.along(axis), resolve(min, None), resolve(max, None))
            })
        })
    }

    /// Size of a node's content. `inner` holds its content box size on the
    /// axes where that is already fixed.
    fn content_size(
        &self,
        nodes: &[ResolvedNode<'_>],
        node: &ResolvedNode<'_>,
        intrinsic: &[Size<S>],
        inner: Size<Option<S>>,
    ) -> Size<S> {
        let style = &node.style;
        let children = || node.children.iter().map(|&i| (&nodes[i].style, intrinsic[i]));
        match (node.node.kind(), node.node.payload()) {
            (NodeKind::Center, _) => Size::both(|axis| {
                children()
                    .map(|(child, size)| contribution(child, size, axis))
                    .fold(S::ZERO, S::max)
            }),
            (NodeKind::Container | NodeKind::Row | NodeKind::Column, _) => {
                let main_axis = Axis::main(style.direction);
                let cross_axis = main_axis.cross();
                let gap = resolve(style.gap, None).unwrap_or(S::ZERO).non_negative();
                let main = used_space(children().map(|(child, size)| contribution(child, size, main_axis)), gap);
                let cross = match inner.get(main_axis) {
                    // Break lines the way placement will, and stack them.
                    Some(available) if style.wrap == Wrap::Wrap => {
                        let gap = resolve(style.gap, Some(available)).unwrap_or(S::ZERO).non_negative();
                        let items: Vec<FlexItem<S>> = children()
                            .map(|(child, size)| flex_item(child, size, main_axis, Some(available), None))
                            .collect();
                        let lines = break_lines(&items, available, gap);
                        let extents = lines.iter().map(|line| {
                            children()
                                .skip(line.start)
                                .take(line.len())
                                .map(|(child, size)| contribution(child, size, cross_axis))
                                .fold(S::ZERO, S::max)
                        });
                        used_space(extents, gap)
                    }
                    _ => children()
                        .map(|(child, size)| contribution(child, size, cross_axis))
                        .fold(S::ZERO, S::max),
                };
                Size::from_axes(main_axis, main, cross)
            }
            (NodeKind::Image, Payload::Image { width, height, .. }) => Size {
                width: S::from_f64(*width),
                height: S::from_f64(*height),
            },
            (NodeKind::Input, _) => Size { width: S::from_f64(INPUT_SIZE.0), height: S::from_f64(INPUT_SIZE.1) },
            (NodeKind::Slider, _) => Size { width: S::from_f64(SLIDER_SIZE.0), height: S::from_f64(SLIDER_SIZE.1) },
            (NodeKind::Checkbox, Payload::Checkbox { label, .. }) => {
                let glyph = S::from_f64(CHECKBOX_BOX);
                if label.is_empty() {
                    return Size { width: glyph, height: glyph };
                }
                let text = self.measure_text(label, style);
                Size {
                    width: glyph + S::from_f64(CHECKBOX_SPACING) + text.width,
                    height: glyph.max(text.height),
                }
            }
            (_, payload) => match payload.text() {
                Some(text) => self.measure_text(text, style),
                None => Size::default(),
            },
        }
    }

    fn measure_text(&self, text: &str, style: &ResolvedStyle) -> Size<S> {
        let measured = self.measure.measure(text, &FontProperties::from_style(style));
        Size {
            width: S::from_f64(measured.width).non_negative(),
            height: S::from_f64(measured.height).non_negative(),
        }
    }
}

// ----------------------------------------------------------------------
// Placement pass
// ----------------------------------------------------------------------

/// Size of a child on one axis when it neither grows nor stretches, and
/// whether that size is definite.
fn natural_size<S: LayoutScalar>(style: &ResolvedStyle, intrinsic: Size<S>, axis: Axis, inner: &Frame<S>) -> (S, bool) {
    let (size, min, max) = axis.lengths(style);
    let reference = inner.reference(axis);
    let (value, definite) = match size {
        Length::Fixed(v) => (S::from_f64(v), true),
        Length::Percent(p) => (reference.map(|r| r.percent(p)).unwrap_or(S::ZERO), reference.is_some()),
        Length::Auto => (intrinsic.get(axis), false),
    };
    (clamp_size(value, resolve(min, reference), resolve(max, reference)), definite)
}

fn center_children<S: LayoutScalar>(
    nodes: &[ResolvedNode<'_>],
    node: &ResolvedNode<'_>,
    intrinsic: &[Size<S>],
    inner: &Frame<S>,
) -> Vec<Frame<S>> {
    node.children
        .iter()
        .map(|&i| {
            let child = &nodes[i].style;
            let margin = Insets::margin(child, inner.reference(Axis::Horizontal));
            let (width, def_w) = natural_size(child, intrinsic[i], Axis::Horizontal, inner);
            let (height, def_h) = natural_size(child, intrinsic[i], Axis::Vertical, inner);
            let outer = |size: S, axis: Axis| size + margin.along(axis);
            inner.child(
                cross_offset(Alignment::Center, outer(width, Axis::Horizontal), inner.size.width) + margin.left,
                cross_offset(Alignment::Center, outer(height, Axis::Vertical), inner.size.height) + margin.top,
                Size { width, height },
                Size { width: def_w, height: def_h },
            )
        })
        .collect()
}

fn flex_children<S: LayoutScalar>(
    nodes: &[ResolvedNode<'_>],
    node: &ResolvedNode<'_>,
    intrinsic: &[Size<S>],
    inner: &Frame<S>,
) -> Vec<Frame<S>> {
    let style = &node.style;
    let main_axis = Axis::main(style.direction);
    let cross_axis = main_axis.cross();
    let inner_main = inner.size.get(main_axis);
    let inner_cross = inner.size.get(cross_axis);
    let main_definite = inner.is_definite(main_axis);
    let cross_definite = inner.is_definite(cross_axis);
    let main_reference = inner.reference(main_axis);
    let margin_reference = inner.reference(Axis::Horizontal);
    let gap = resolve(style.gap, Some(inner_main)).unwrap_or(S::ZERO).non_negative();

    let child_style = |index: usize| &nodes[node.children[index]].style;
    let margins: Vec<Insets<S>> = (0..node.children.len())
        .map(|index| Insets::margin(child_style(index), margin_reference))
        .collect();
    let mut items: Vec<FlexItem<S>> = node
        .children
        .iter()
        .map(|&i| flex_item(&nodes[i].style, intrinsic[i], main_axis, main_reference, margin_reference))
        .collect();

    let lines = if style.wrap == Wrap::Wrap && main_definite {
        break_lines(&items, inner_main, gap)
    } else {
        let mut single = SmallVec::new();
        single.push(0..items.len());
        single
    };

    log::trace!(
        target: "trellis_layout",
        "{} {:?}: {} children in {} lines, inner {:?}x{:?}",
        node.node.id(),
        style.direction,
        items.len(),
        lines.len(),
        inner.size.width,
        inner.size.height
    );

    let mut frames = Vec::with_capacity(items.len());
    let mut line_start = S::ZERO;
    for line in lines.iter().cloned() {
        let grew = distribute(&mut items[line.clone()], inner_main, gap);

        // Cross size of each item before stretching.
        let mut cross: SmallVec<[(S, bool, bool); 8]> = SmallVec::new();
        for index in line.clone() {
            let child = child_style(index);
            let stretch = style.align_items == Alignment::Stretch && cross_axis.lengths(child).0.is_auto();
            let (size, definite) = natural_size(child, intrinsic[node.children[index]], cross_axis, inner);
            cross.push((size, definite, stretch));
        }

        // A single line spans the whole container; wrapped lines are as
        // tall as their tallest item.
        let extent = if lines.len() == 1 {
            inner_cross
        } else {
            line.clone()
                .zip(&cross)
                .map(|(index, (size, _, _))| *size + margins[index].along(cross_axis))
                .fold(S::ZERO, S::max)
        };

        let sizes: SmallVec<[S; 8]> = items[line.clone()].iter().map(|i| i.main + i.margin).collect();
        let justify = if grew { Distribution::Start } else { style.justify_content };
        let offsets = main_offsets(justify, &sizes, inner_main, gap);

        for (k, index) in line.clone().enumerate() {
            let child = child_style(index);
            let item = &items[index];
            let margin = &margins[index];
            let (mut cross_size, mut cross_def, stretch) = cross[k];
            if stretch {
                let (_, min, max) = cross_axis.lengths(child);
                let reference = inner.reference(cross_axis);
                cross_size = clamp_size(extent - margin.along(cross_axis), resolve(min, reference), resolve(max, reference));
                cross_def = cross_definite;
            }

            let main_pos = offsets[k] + margin.start(main_axis);
            let cross_pos = line_start
                + cross_offset(style.align_items, cross_size + margin.along(cross_axis), extent)
                + margin.start(cross_axis);
            let main_def = match main_axis.lengths(child).0 {
                Length::Fixed(_) => true,
                Length::Percent(_) => main_reference.is_some(),
                Length::Auto => item.grow > 0.0 && main_definite,
            };

            let (x, y) = match main_axis {
                Axis::Horizontal => (main_pos, cross_pos),
                Axis::Vertical => (cross_pos, main_pos),
            };
            frames.push(inner.child(
                x,
                y,
                Size::from_axes(main_axis, item.main, cross_size),
                Size::from_axes(main_axis, main_def, cross_def),
            ));
        }

        line_start = line_start + extent + gap;
    }
    frames
}

/// Main-axis sizing inputs of one child. `reference` is the base for a
/// percentage size, `margin_reference` the base for percentage margins.
fn flex_item<S: LayoutScalar>(
    style: &ResolvedStyle,
    intrinsic: Size<S>,
    main_axis: Axis,
    reference: Option<S>,
    margin_reference: Option<S>,
) -> FlexItem<S> {
    let (size, min, max) = main_axis.lengths(style);
    let natural = intrinsic.get(main_axis);
    let (base, flexible) = match size {
        Length::Fixed(v) => (S::from_f64(v), false),
        Length::Percent(p) => (reference.map(|r| r.percent(p)).unwrap_or(S::ZERO), false),
        Length::Auto if style.flex_grow > 0.0 => (S::ZERO, true),
        Length::Auto => (natural, true),
    };
    let min = resolve(min, reference);
    let max = resolve(max, reference);
    FlexItem {
        base,
        hypothetical: clamp_size(if size.is_auto() { natural } else { base }, min, max),
        margin: Insets::margin(style, margin_reference).along(main_axis),
        grow: style.flex_grow.max(0.0),
        shrink: style.flex_shrink.max(0.0),
        flexible,
        min,
        max,
        main: base,
    }
}

/// Greedy line breaking: an item starts a new line when it would overflow
/// the current one. Every line holds at least one item.
fn break_lines<S: LayoutScalar>(items: &[FlexItem<S>], available: S, gap: S) -> SmallVec<[Range<usize>; 4]> {
    let mut lines = SmallVec::new();
    let mut start = 0;
    let mut used = S::ZERO;
    for (index, item) in items.iter().enumerate() {
        let outer = item.hypothetical + item.margin;
        if index > start && used + gap + outer > available {
            lines.push(start..index);
            start = index;
            used = outer;
        } else if index == start {
            used = outer;
        } else {
            used = used + gap + outer;
        }
    }
    if start < items.len() {
        lines.push(start..items.len());
    }
    if lines.is_empty() {
        lines.push(0..0);
    }
    lines
}
