//! End-to-end behavior of the interchange formats.

use trellis_core::{
    Color, Distribution, FormatError, Length, Node, ParseError, Payload, Property, Rect, Session, StyleBlock,
    TrellisError,
};
use trellis_io::{
    detect_format, parse_text, read_any, read_binary, read_text, write_binary, write_text, write_text_with, Format,
    TextOptions,
};

fn login_form() -> Node {
    let mut s = Session::new();
    let mut column = s.column();
    column.set_style(Property::Gap, Length::px(8.0)).unwrap();
    column.set_style(Property::PaddingTop, Length::px(12.0)).unwrap();
    column.set_style(Property::BackgroundColor, Color::from_hex("#202020").unwrap()).unwrap();

    let title = s.text("Sign in").with_style(Property::FontSize, Length::px(20.0)).unwrap();
    let user = s.input("", "user name");
    let remember = s.checkbox("Remember me", true);
    let mut row = s.row().with_style(Property::JustifyContent, Distribution::End).unwrap();
    row.append_child(s.button("Cancel")).unwrap();
    row.append_child(s.button("OK")).unwrap();

    column.with_children([title, user, remember, row]).unwrap()
}

#[test]
fn text_snapshot() {
    let options = TextOptions::default().with_metadata("generator", "trellis-io");
    insta::assert_snapshot!(write_text_with(&login_form(), &options), @r###"
    trellis 1.0
    @meta {
      generator: "trellis-io";
    }
    Column #1 {
      paddingTop: 12;
      gap: 8;
      backgroundColor: #202020ff;
      Text #2 = "Sign in" {
        fontSize: 20;
      }
      Input #3 = input("", "user name");
      Checkbox #4 = checkbox("Remember me", true);
      Row #5 {
        justifyContent: end;
        Button #6 = "Cancel";
        Button #7 = "OK";
      }
    }
    "###);
}

#[test]
fn hand_written_document() {
    let _ = env_logger::builder().is_test(true).try_init();
    let doc = parse_text(
        r#"trellis 1.0
// a comment
@meta { author: "someone"; }
Center #10 {
  alignItems: center;
  color: white;
  fontFamily: "Fira \"Sans\"";
  Image #11 = image("logo.png", 64, 32) {
    width: auto;
    @rect 0 0 64 32;
  }
}
"#,
    )
    .unwrap();

    assert_eq!(doc.meta["author"], "someone");
    let image = &doc.root.children()[0];
    assert_eq!(image.payload(), &Payload::Image { source: "logo.png".into(), width: 64.0, height: 32.0 });
    assert_eq!(image.computed_rect(), Some(Rect::new(0.0, 0.0, 64.0, 32.0)));
    assert_eq!(
        doc.root.style_value(Property::FontFamily).and_then(|v| v.as_text()),
        Some("Fira \"Sans\"")
    );

    // named colors come back out in canonical form
    assert!(write_text(&doc.root).contains("color: #ffffffff;"));
}

#[test]
fn shared_styles_are_stored_once() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut s = Session::new();
    let styles: Vec<StyleBlock> = [10.0, 20.0, 30.0]
        .into_iter()
        .map(|h| {
            StyleBlock::new()
                .with(Property::Height, Length::px(h))
                .unwrap()
                .with(Property::BackgroundColor, Color::rgb(40, 40, 40))
                .unwrap()
                .with(Property::PaddingLeft, Length::px(4.0))
                .unwrap()
        })
        .collect();

    let mut list = s.column();
    list.set_style_block(Some(styles[0].clone())).unwrap();
    for i in 0..99 {
        let mut item = s.text(format!("item {}", i % 5));
        item.set_style_block(Some(styles[i % 3].clone())).unwrap();
        list.append_child(item).unwrap();
    }
    assert_eq!(list.node_count(), 100);
    assert!(list.iter().all(|node| node.style().is_some()));

    let bytes = write_binary(&list);
    let style_count = u32::from_le_bytes(bytes[14..18].try_into().unwrap());
    let string_count = u32::from_le_bytes(bytes[10..14].try_into().unwrap());
    assert_eq!(style_count, 3);
    assert_eq!(string_count, 5);
    assert!(bytes.len() < write_text(&list).len());
    assert_eq!(read_binary(&bytes).unwrap(), list);
}

#[test]
fn corrupted_magic_is_rejected() {
    let mut bytes = write_binary(&login_form());
    bytes[..4].copy_from_slice(b"TRLX");
    assert_eq!(read_binary(&bytes), Err(FormatError::BadMagic { found: b"TRLX".to_vec() }));
    assert_eq!(detect_format(&bytes), None);
}

#[test]
fn newer_major_versions_are_rejected() {
    let mut bytes = write_binary(&login_form());
    bytes[4..6].copy_from_slice(&2u16.to_le_bytes());
    assert!(matches!(read_binary(&bytes), Err(FormatError::UnsupportedVersion { major: 2, .. })));

    let text = write_text(&login_form()).replacen("trellis 1.0", "trellis 2.1", 1);
    assert_eq!(
        read_text(&text),
        Err(ParseError::UnsupportedVersion { major: 2, minor: 1, line: 1, column: 9 })
    );
}

#[test]
fn newer_minor_versions_are_accepted() {
    let mut bytes = write_binary(&login_form());
    bytes[6..8].copy_from_slice(&9u16.to_le_bytes());
    assert_eq!(read_binary(&bytes).unwrap(), login_form());
}

#[test]
fn read_any_reports_the_failing_layer() {
    assert_eq!(detect_format(&write_binary(&login_form())), Some(Format::Binary));
    let err = read_any(b"trellis 1.0\nRow #1 { width: ; }").unwrap_err();
    assert!(matches!(err, TrellisError::Parse(ParseError::InvalidValue { line: 2, .. })));
    let err = read_any(b"TRLB\x01\x00").unwrap_err();
    assert!(matches!(err, TrellisError::Format(FormatError::Truncated { offset: 6, .. })));
}
