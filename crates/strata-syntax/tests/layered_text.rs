mod common;
use common::*;

use strata_syntax::parse_text;
use strata_text::Text;

fn call_grammar() -> Grammar {
    let mut builder = GrammarBuilder::new();
    let call = builder.key("call");
    let args = builder.key("args");
    builder
        .rule("call")
        .is((token_type(TokenType::IDENTIFIER), "(", args, ")"))
        .unwrap();
    builder
        .rule("args")
        .is(one_or_more(token_type(TokenType::NUMBER)))
        .unwrap();
    builder.build(call).unwrap()
}

#[test]
fn test_tokens_resolve_through_expansions() {
    init_tracing();
    // main.c: `call(ARGS)`, with ARGS expanding to `1 2 3`
    let expansion = Text::transformed(
        Text::located("<ARGS>", "1 2 3"),
        Text::located_at("main.c", "ARGS", 1, 6),
    );
    let unit = Text::composite([
        Text::located("main.c", "call("),
        expansion,
        Text::located_at("main.c", ")", 1, 10),
    ]);
    assert_eq!(unit.to_string(), "call(1 2 3)");

    let parsed = parse_text(&call_grammar(), &unit).unwrap();
    let root = parsed.root();
    let args = root.find_first_child("args").unwrap();

    let location = parsed.node_location(args).unwrap();
    insta::assert_snapshot!(location.to_string(), @"<ARGS>:1:1 (from main.c:1:6)");
    assert_eq!(location.depth(), 1);

    let three = args.last_token().unwrap();
    assert_eq!(parsed.location(three).unwrap().column(), 5);

    let close = root.last_token().unwrap();
    assert_eq!(parsed.location(close).unwrap().to_string(), "main.c:1:10");
    assert_eq!(parsed.node_location(root).unwrap().to_string(), "main.c:1:1");
    assert_eq!(parsed.into_root().name(), "call");
}

#[test]
fn test_error_offset_resolves_in_text() {
    let text = Text::composite([
        Text::located("defs.h", "call(1\n"),
        Text::located_at("main.c", "2 ;)", 4, 3),
    ]);
    let error = parse_text(&call_grammar(), &text).unwrap_err();
    let ParseError::UnexpectedToken { offset, found, .. } = &error else {
        panic!("unexpected {error:?}");
    };
    assert_eq!(found, ";");

    let location = text.location(*offset as usize).unwrap();
    assert_eq!(location.to_string(), "main.c:4:5");
}
