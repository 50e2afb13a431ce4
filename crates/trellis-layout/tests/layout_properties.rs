//! Property tests for the layout engine over generated trees.

use proptest::prelude::*;
use trellis_core::{Alignment, Distribution, Length, Node, Property, Session, Wrap};
use trellis_layout::{layout, AvailableSize, FontProperties, LaidOutTree, LayoutOptions, NumericDomain, TextSize};

#[derive(Debug, Clone)]
enum Shape {
    Text(String),
    Box {
        row: bool,
        width: Length,
        height: Length,
        grow: f64,
        padding: f64,
        margin: f64,
        gap: f64,
        justify: Distribution,
        align: Alignment,
        wrap: bool,
        children: Vec<Shape>,
    },
}

fn length() -> impl Strategy<Value = Length> {
    prop_oneof![
        Just(Length::Auto),
        (-50.0..400.0f64).prop_map(Length::Fixed),
        (0.0..150.0f64).prop_map(Length::Percent),
    ]
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = "[a-z ]{0,12}".prop_map(Shape::Text);
    leaf.prop_recursive(4, 40, 5, |inner| {
        (
            any::<bool>(),
            length(),
            length(),
            prop_oneof![Just(0.0), 0.0..3.0f64],
            0.0..20.0f64,
            0.0..12.0f64,
            0.0..10.0f64,
            proptest::sample::select(Distribution::ALL),
            proptest::sample::select(Alignment::ALL),
            any::<bool>(),
            prop::collection::vec(inner, 0..5),
        )
            .prop_map(|(row, width, height, grow, padding, margin, gap, justify, align, wrap, children)| Shape::Box {
                row,
                width,
                height,
                grow,
                padding,
                margin,
                gap,
                justify,
                align,
                wrap,
                children,
            })
    })
}

fn build(shape: &Shape, s: &mut Session) -> Node {
    match shape {
        Shape::Text(text) => s.text(text.clone()),
        Shape::Box { row, width, height, grow, padding, margin, gap, justify, align, wrap, children } => {
            let mut node = if *row { s.row() } else { s.column() };
            node.set_style(Property::Width, *width).unwrap();
            node.set_style(Property::Height, *height).unwrap();
            node.set_style(Property::FlexGrow, *grow).unwrap();
            node.set_style(Property::PaddingLeft, Length::px(*padding)).unwrap();
            node.set_style(Property::PaddingTop, Length::px(*padding)).unwrap();
            node.set_style(Property::MarginLeft, Length::px(*margin)).unwrap();
            node.set_style(Property::MarginBottom, Length::px(*margin)).unwrap();
            node.set_style(Property::Gap, Length::px(*gap)).unwrap();
            node.set_style(Property::JustifyContent, *justify).unwrap();
            node.set_style(Property::AlignItems, *align).unwrap();
            node.set_style(Property::Wrap, if *wrap { Wrap::Wrap } else { Wrap::NoWrap }).unwrap();
            for child in children {
                let child = build(child, s);
                node.append_child(child).unwrap();
            }
            node
        }
    }
}

fn measure(text: &str, font: &FontProperties) -> TextSize {
    TextSize::new(text.chars().count() as f64 * font.size * 0.6, font.size * 1.25)
}

fn run(tree: &Node, available: (f64, f64), domain: NumericDomain) -> LaidOutTree {
    let resolved = trellis_style::resolve(tree);
    layout(
        &resolved,
        AvailableSize::new(available.0, available.1),
        &measure,
        &LayoutOptions::default().with_domain(domain),
    )
}

fn domain() -> impl Strategy<Value = NumericDomain> {
    prop_oneof![Just(NumericDomain::Float), Just(NumericDomain::Fixed)]
}

proptest! {
    #[test]
    fn layout_is_deterministic(shape in shape(), w in -100.0..1200.0f64, h in -100.0..900.0f64, domain in domain()) {
        let tree = build(&shape, &mut Session::new());
        let first: Vec<_> = run(&tree, (w, h), domain).iter().collect();
        let second: Vec<_> = run(&tree, (w, h), domain).iter().collect();
        prop_assert_eq!(first.len(), tree.node_count());
        for ((id_a, a), (id_b, b)) in first.iter().zip(&second) {
            prop_assert_eq!(id_a, id_b);
            prop_assert_eq!(a.x.to_bits(), b.x.to_bits());
            prop_assert_eq!(a.y.to_bits(), b.y.to_bits());
            prop_assert_eq!(a.width.to_bits(), b.width.to_bits());
            prop_assert_eq!(a.height.to_bits(), b.height.to_bits());
        }
    }

    #[test]
    fn sizes_are_never_negative(shape in shape(), w in -100.0..1200.0f64, h in -100.0..900.0f64, domain in domain()) {
        let tree = build(&shape, &mut Session::new());
        for (_, rect) in run(&tree, (w, h), domain).iter() {
            prop_assert!(rect.width >= 0.0, "negative width {:?}", rect);
            prop_assert!(rect.height >= 0.0, "negative height {:?}", rect);
        }
    }

    #[test]
    fn fixed_domain_lands_on_grid(shape in shape(), w in 0.0..1200.0f64, h in 0.0..900.0f64) {
        let tree = build(&shape, &mut Session::new());
        let step = 1.0 / 65536.0;
        for (_, rect) in run(&tree, (w, h), NumericDomain::Fixed).iter() {
            for v in [rect.x, rect.y, rect.width, rect.height] {
                prop_assert_eq!((v / step).fract(), 0.0);
            }
        }
    }
}

#[test]
fn input_tree_is_left_untouched() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut s = Session::new();
    let tree = s.row().with_child(s.text("hello")).unwrap();
    let laid_out = run(&tree, (300.0, 200.0), NumericDomain::Float);
    assert!(tree.computed_rect().is_none());
    assert!(laid_out.root().computed_rect().is_some());
}

#[test]
fn public_types_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Node>();
    assert_send_sync::<Session>();
    assert_send_sync::<trellis_style::ResolvedStyleTree<'static>>();
    assert_send_sync::<LaidOutTree>();
    assert_send_sync::<LayoutOptions>();
    assert_send_sync::<trellis_layout::EstimatedTextMeasure>();
}
