//! Round-trip identity of every codec over generated trees.

use proptest::prelude::*;
use trellis_core::{
    Alignment, Color, Direction, Distribution, Length, Node, NodeKind, Property, Rect, Session, StyleBlock, StyleValue,
    TextAlign, ValueKind, Wrap,
};
use trellis_io::{read_binary, read_text, write_binary, write_text};

/// Every finite f64, including subnormals and negative zero.
fn finite() -> impl Strategy<Value = f64> {
    use proptest::num::f64::{NEGATIVE, NORMAL, POSITIVE, SUBNORMAL, ZERO};
    prop_oneof![
        POSITIVE | NEGATIVE | NORMAL | SUBNORMAL | ZERO,
        Just(-0.0),
        Just(0.1),
        -1000.0..1000.0f64,
    ]
}

fn value(kind: ValueKind) -> BoxedStrategy<StyleValue> {
    match kind {
        ValueKind::Length => prop_oneof![
            Just(StyleValue::Length(Length::Auto)),
            finite().prop_map(|v| StyleValue::Length(Length::Fixed(v))),
            finite().prop_map(|v| StyleValue::Length(Length::Percent(v))),
        ]
        .boxed(),
        ValueKind::Color => any::<[u8; 4]>()
            .prop_map(|[r, g, b, a]| StyleValue::Color(Color::rgba(r, g, b, a)))
            .boxed(),
        ValueKind::Number => finite().prop_map(StyleValue::Number).boxed(),
        ValueKind::Text => any::<String>().prop_map(StyleValue::Text).boxed(),
        ValueKind::Direction => proptest::sample::select(Direction::ALL).prop_map(StyleValue::Direction).boxed(),
        ValueKind::Distribution => {
            proptest::sample::select(Distribution::ALL).prop_map(StyleValue::Distribution).boxed()
        }
        ValueKind::Alignment => proptest::sample::select(Alignment::ALL).prop_map(StyleValue::Alignment).boxed(),
        ValueKind::Wrap => proptest::sample::select(Wrap::ALL).prop_map(StyleValue::Wrap).boxed(),
        ValueKind::TextAlign => proptest::sample::select(TextAlign::ALL).prop_map(StyleValue::TextAlign).boxed(),
    }
}

fn style() -> impl Strategy<Value = Option<StyleBlock>> {
    let entry = proptest::sample::select(Property::all().collect::<Vec<_>>())
        .prop_flat_map(|p| value(p.kind()).prop_map(move |v| (p, v)));
    proptest::option::of(prop::collection::vec(entry, 1..6)).prop_map(|entries| {
        entries.map(|entries| {
            let mut block = StyleBlock::new();
            for (p, v) in entries {
                block.set(p, v).unwrap();
            }
            block
        })
    })
}

fn rect() -> impl Strategy<Value = Option<Rect>> {
    proptest::option::of((finite(), finite(), finite(), finite()).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h)))
}

#[derive(Debug, Clone)]
enum Leaf {
    Text(String),
    Button(String),
    Image(String, f64, f64),
    Input(String, String),
    Checkbox(String, bool),
    Slider(f64, f64, f64),
}

#[derive(Debug, Clone)]
enum Shape {
    Leaf(Leaf, Option<StyleBlock>, Option<Rect>),
    Parent(NodeKind, Vec<Shape>, Option<StyleBlock>, Option<Rect>),
}

fn leaf() -> impl Strategy<Value = Leaf> {
    prop_oneof![
        any::<String>().prop_map(Leaf::Text),
        any::<String>().prop_map(Leaf::Button),
        (any::<String>(), finite(), finite()).prop_map(|(s, w, h)| Leaf::Image(s, w, h)),
        (any::<String>(), any::<String>()).prop_map(|(v, p)| Leaf::Input(v, p)),
        (any::<String>(), any::<bool>()).prop_map(|(l, c)| Leaf::Checkbox(l, c)),
        (finite(), finite(), finite()).prop_map(|(v, min, max)| Leaf::Slider(v, min, max)),
    ]
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = (leaf(), style(), rect()).prop_map(|(l, s, r)| Shape::Leaf(l, s, r));
    leaf.prop_recursive(4, 32, 4, |inner| {
        (
            proptest::sample::select(vec![NodeKind::Container, NodeKind::Row, NodeKind::Column, NodeKind::Center]),
            prop::collection::vec(inner, 0..4),
            style(),
            rect(),
        )
            .prop_map(|(kind, mut children, s, r)| {
                if kind == NodeKind::Center {
                    children.truncate(1);
                }
                Shape::Parent(kind, children, s, r)
            })
    })
}

fn build(shape: &Shape, session: &mut Session) -> Node {
    let mut tree = assemble(shape, session);
    // Attaching a child clears its rect, so rects go on last.
    let mut rects = Vec::new();
    collect_rects(shape, &mut rects);
    let mut stack = vec![&mut tree];
    let mut rects = rects.into_iter();
    while let Some(node) = stack.pop() {
        node.set_computed_rect(rects.next().flatten());
        stack.extend(node.children_mut().iter_mut().rev());
    }
    tree
}

fn assemble(shape: &Shape, session: &mut Session) -> Node {
    let (mut node, style) = match shape {
        Shape::Leaf(leaf, style, _) => {
            let node = match leaf {
                Leaf::Text(t) => session.text(t.clone()),
                Leaf::Button(t) => session.button(t.clone()),
                Leaf::Image(s, w, h) => session.image(s.clone(), *w, *h).unwrap(),
                Leaf::Input(v, p) => session.input(v.clone(), p.clone()),
                Leaf::Checkbox(l, c) => session.checkbox(l.clone(), *c),
                Leaf::Slider(v, min, max) => session.slider(*v, *min, *max).unwrap(),
            };
            (node, style)
        }
        Shape::Parent(kind, children, style, _) => {
            let mut node = session.create(*kind);
            for child in children {
                let child = assemble(child, session);
                node.append_child(child).unwrap();
            }
            (node, style)
        }
    };
    node.set_style_block(style.clone()).unwrap();
    node
}

fn collect_rects(shape: &Shape, out: &mut Vec<Option<Rect>>) {
    match shape {
        Shape::Leaf(_, _, rect) => out.push(*rect),
        Shape::Parent(_, children, _, rect) => {
            out.push(*rect);
            for child in children {
                collect_rects(child, out);
            }
        }
    }
}

proptest! {
    #[test]
    fn text_round_trip(shape in shape()) {
        let tree = build(&shape, &mut Session::new());
        let restored = read_text(&write_text(&tree)).unwrap();
        prop_assert_eq!(&restored, &tree);
        // binary bytes are bit-exact, so this also covers -0.0 and friends
        prop_assert_eq!(write_binary(&restored), write_binary(&tree));
    }

    #[test]
    fn binary_round_trip(shape in shape()) {
        let tree = build(&shape, &mut Session::new());
        let bytes = write_binary(&tree);
        let restored = read_binary(&bytes).unwrap();
        prop_assert_eq!(&restored, &tree);
        prop_assert_eq!(write_binary(&restored), bytes);
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_round_trip(shape in shape()) {
        let tree = build(&shape, &mut Session::new());
        let restored = trellis_io::read_json(&trellis_io::write_json(&tree).unwrap()).unwrap();
        prop_assert_eq!(write_binary(&restored), write_binary(&tree));
    }

    #[test]
    fn truncated_binary_never_panics(shape in shape(), cut in any::<prop::sample::Index>()) {
        let bytes = write_binary(&build(&shape, &mut Session::new()));
        let len = cut.index(bytes.len());
        prop_assert!(read_binary(&bytes[..len]).is_err());
    }
}

#[test]
fn deep_trees_round_trip() {
    let mut session = Session::new();
    let mut node = session.text("bottom");
    for _ in 0..10_000 {
        node = session.container().with_child(node).unwrap();
    }
    let restored = read_binary(&write_binary(&node)).unwrap();
    assert_eq!(restored.depth(), 10_001);
    let restored = read_text(&write_text(&node)).unwrap();
    assert_eq!(restored.depth(), 10_001);
    assert_eq!(write_binary(&restored), write_binary(&node));
}
