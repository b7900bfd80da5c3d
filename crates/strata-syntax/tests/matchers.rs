mod common;
use common::*;

use strata_syntax::parser::{Backtrack, MatchError};
use strata_syntax::ParsingState;

fn single_rule(body: impl Into<Expr>) -> Grammar {
    let mut builder = GrammarBuilder::new();
    let root = builder.key("root");
    builder.rule("root").is(body).unwrap();
    builder.build(root).unwrap()
}

#[test]
fn test_failed_match_leaves_state_untouched() {
    let grammar = single_rule(first_of([("a", "b", "c"), ("a", "b", "d")]));
    let tokens = lex("a b e");
    let mut state = ParsingState::new(&tokens);
    state.pop().unwrap();
    let before = state.index();

    let outcome = grammar.match_rule(grammar.root(), &mut state);
    assert_eq!(outcome, Err(MatchError::Backtrack(Backtrack::Mismatch)));
    assert_eq!(state.index(), before);

    let mut state = ParsingState::new(&tokens);
    assert!(grammar.match_rule(grammar.root(), &mut state).is_err());
    assert_eq!(state.index(), 0);
    assert_eq!(state.furthest_index(), 2);
    assert_eq!(state.expected(), &["\"c\"", "\"d\""]);
}

#[test]
fn test_longest_one_picks_first_of_longest() {
    let mut builder = GrammarBuilder::new();
    let root = builder.key("root");
    let three = builder.key("three");
    let five = builder.key("five");
    let also_five = builder.key("also_five");
    builder
        .rule("root")
        .is(longest_one([three, five, also_five]))
        .unwrap();
    builder.rule("three").is(("a", "b", "c")).unwrap();
    builder.rule("five").is(("a", "b", "c", "d", "e")).unwrap();
    builder
        .rule("also_five")
        .is(("a", "b", "c", "d", any_token()))
        .unwrap();
    let grammar = builder.build(root).unwrap();

    let root = parse(&grammar, "a b c d e").unwrap();
    assert_eq!(root.children().len(), 1);
    assert_eq!(root.children()[0].name(), "five");

    let root = parse(&grammar, "a b c").unwrap();
    assert_eq!(root.children()[0].name(), "three");

    assert!(parse(&grammar, "x").is_err());
}

#[test]
fn test_longest_one_prefers_longer_over_earlier() {
    let mut builder = GrammarBuilder::new();
    let root = builder.key("root");
    let short = builder.key("short");
    let long = builder.key("long");
    builder
        .rule("root")
        .is((longest_one([short, long]), zero_or_more(any_token())))
        .unwrap();
    builder.rule("short").is(("a", "b")).unwrap();
    builder.rule("long").is(("a", "b", "c", "d")).unwrap();
    let grammar = builder.build(root).unwrap();

    let root = parse(&grammar, "a b c d").unwrap();
    insta::assert_snapshot!(dump(&root), @r#"
    root
      long
        IDENTIFIER "a"@1:0
        IDENTIFIER "b"@1:2
        IDENTIFIER "c"@1:4
        IDENTIFIER "d"@1:6
    "#);

    let root = parse(&grammar, "a b c x").unwrap();
    assert_eq!(root.children()[0].name(), "short");
    assert_eq!(root.children().len(), 3);
}

#[test]
fn test_adjacent_requires_touching_tokens() {
    let grammar = single_rule(("abcd", adjacent("x")));

    let touching = [token("abcd", 2, 6), token("x", 2, 10)];
    let root = grammar.parse(&touching).unwrap();
    insta::assert_snapshot!(dump(&root), @r#"
    root
      ID "abcd"@2:6
      adjacent
        ID "x"@2:10
    "#);

    let spaced = [token("abcd", 2, 6), token("x", 2, 11)];
    assert!(grammar.parse(&spaced).is_err());

    let next_line = [token("abcd", 2, 6), token("x", 3, 10)];
    assert!(grammar.parse(&next_line).is_err());
}

#[test]
fn test_adjacent_failure_is_reported_at_the_detached_token() {
    let grammar = single_rule(("abcd", adjacent("x")));
    let spaced = [token("abcd", 2, 6), token("x", 2, 11)];
    let error = grammar.parse(&spaced).unwrap_err();
    assert_eq!(error.index(), Some(1));
    assert_eq!(error.to_string(), r#"expected adjacent("x"), got "x" at 2:12"#);
}

#[test]
fn test_adjacent_needs_a_previous_token() {
    let grammar = single_rule(adjacent("x"));
    let error = grammar.parse(&[token("x", 1, 0)]).unwrap_err();
    assert_eq!(error.index(), Some(0));
    assert_eq!(error.to_string(), r#"expected adjacent("x"), got "x" at 1:1"#);
}

#[test]
fn test_till_accumulates_words() {
    let grammar = single_rule(till("END"));

    let root = parse(&grammar, "foo bar baz END").unwrap();
    insta::assert_snapshot!(dump(&root), @r#"
    root
      till
        WORDS "foo bar baz "@1:0
        IDENTIFIER "END"@1:12
    "#);
    let words = root.children()[0].children()[0].token().unwrap();
    assert_eq!(words.token_type, TokenType::words());
    assert_eq!(root.children()[0].children()[0].token_range(), 0..3);

    let error = parse(&grammar, "foo bar").unwrap_err();
    assert_eq!(error.to_string(), r#"unexpected end of input, expected "END""#);

    let tokens = lex("foo bar");
    let mut state = ParsingState::new(&tokens);
    let outcome = grammar.match_rule(grammar.root(), &mut state);
    assert_eq!(outcome, Err(MatchError::Backtrack(Backtrack::EndOfInput)));
    assert_eq!(state.index(), 0);
}

#[test]
fn test_strict_or_rejects_ambiguity() {
    let grammar = single_rule(strict_or([("a", "b").into(), sequence(["a".into(), any_token()])]));

    let root = parse(&grammar, "a c").unwrap();
    assert_eq!(root.children().len(), 2);

    let error = parse(&grammar, "a b").unwrap_err();
    assert_eq!(
        error,
        ParseError::AmbiguousAlternatives {
            index: 0,
            matcher: r#"strictOr(("a" "b") | ("a" any token))"#.to_string(),
        }
    );

    assert!(parse(&grammar, "b").is_err());
}

#[test]
fn test_lookahead_consumes_nothing() {
    let grammar = single_rule((not("end"), next(token_type(TokenType::IDENTIFIER)), any_token(), end_of_input()));

    let root = parse(&grammar, "begin").unwrap();
    assert_eq!(root.children().len(), 1);
    assert_eq!(root.token_range(), 0..1);

    let error = parse(&grammar, "end").unwrap_err();
    assert_eq!(error.to_string(), r#"expected not "end", got "end" at 1:1"#);
    assert!(parse(&grammar, "42").is_err());
}

#[test]
fn test_optional_and_repetitions() {
    let grammar = single_rule((optional("-"), one_or_more(token_type(TokenType::NUMBER)), zero_or_more(";")));

    assert_eq!(parse(&grammar, "1 2 3").unwrap().children().len(), 3);
    assert_eq!(parse(&grammar, "- 1 ; ;").unwrap().children().len(), 4);
    assert!(parse(&grammar, "-").is_err());
    assert!(parse(&grammar, ";").is_err());
}

#[test]
fn test_regex_matches_whole_token() {
    let grammar = single_rule(one_or_more(regex("[a-z]+_id")));
    assert!(parse(&grammar, "user_id order_id").is_ok());
    assert!(parse(&grammar, "user_id_2").is_err());
}
