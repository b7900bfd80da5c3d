mod common;
use common::*;

#[test]
fn test_skip_policies_collapse_chains() {
    let grammar = arithmetic();
    let root = parse(&grammar, "1 + 2 * 3").unwrap();
    insta::assert_snapshot!(dump(&root), @r#"
    expr
      NUMBER "1"@1:0
      PUNCTUATOR "+"@1:2
      term
        NUMBER "2"@1:4
        PUNCTUATOR "*"@1:6
        NUMBER "3"@1:8
    "#);
}

#[test]
fn test_parenthesized_expression() {
    let grammar = arithmetic();
    let root = parse(&grammar, "(1 + 2) * 3").unwrap();
    assert!(root.is_skipped());
    insta::assert_snapshot!(dump(&root), @r#"
    expr
      term
        PUNCTUATOR "("@1:0
        expr
          NUMBER "1"@1:1
          PUNCTUATOR "+"@1:3
          NUMBER "2"@1:5
        PUNCTUATOR ")"@1:6
        PUNCTUATOR "*"@1:8
        NUMBER "3"@1:10
    "#);
}

#[test]
fn test_single_operand_collapses_to_leaf() {
    let grammar = arithmetic();
    let root = parse(&grammar, "7").unwrap();
    assert_eq!(root.name(), "expr");
    assert!(root.is_skipped());
    assert_eq!(root.children().len(), 1);
    assert_eq!(root.children()[0].token_value(), Some("7"));
    assert_eq!(root.token_range(), 0..1);
}

#[test]
fn test_nested_single_child_rules_collapse_in_one_pass() {
    let mut builder = GrammarBuilder::new();
    let statement = builder.key("statement");
    let wrapper = builder.key("wrapper");
    let inner = builder.key("inner");
    builder.rule("statement").is(("print", wrapper)).unwrap();
    builder.rule("wrapper").is(inner).unwrap().skip_if_one_child();
    builder
        .rule("inner")
        .is(token_type(TokenType::NUMBER))
        .unwrap()
        .skip_if_one_child();
    let grammar = builder.build(statement).unwrap();

    let root = parse(&grammar, "print 42").unwrap();
    insta::assert_snapshot!(dump(&root), @r#"
    statement
      IDENTIFIER "print"@1:0
      NUMBER "42"@1:6
    "#);
}

#[test]
fn test_error_reports_furthest_expectations() {
    let grammar = arithmetic();
    let error = parse(&grammar, "1 + * 3").unwrap_err();
    assert_eq!(error.to_string(), r#"expected one of NUMBER, "(", got "*" at 1:5"#);
    assert_eq!(error.index(), Some(2));

    let error = parse(&grammar, "1 +").unwrap_err();
    assert_eq!(
        error,
        ParseError::UnexpectedEnd {
            index: 2,
            expected: vec!["NUMBER".into(), "\"(\"".into()],
        }
    );
}

#[test]
fn test_trailing_input_is_an_error() {
    let grammar = arithmetic();
    let error = parse(&grammar, "1 2").unwrap_err();
    assert!(matches!(
        error,
        ParseError::UnexpectedToken { index: 1, ref found, .. } if found == "2"
    ));
}

#[test]
fn test_rule_cannot_be_redefined() {
    let mut builder = GrammarBuilder::new();
    builder.rule("statement").is("foo").unwrap();
    let error = builder.rule("statement").is("bar").unwrap_err();
    assert_eq!(
        error,
        GrammarError::AlreadyDefined {
            rule: "statement".into()
        }
    );
    assert_eq!(
        error.to_string(),
        "rule 'statement' has already been defined somewhere in the grammar"
    );
}

#[test]
fn test_referenced_rule_must_be_defined() {
    let mut builder = GrammarBuilder::new();
    let list = builder.key("list");
    let item = builder.key("item");
    builder.rule("list").is(("[", item, "]")).unwrap();
    let error = builder.build(list).unwrap_err();
    assert_eq!(error.to_string(), "rule 'item' hasn't been defined");
}

#[test]
fn test_rules_may_be_defined_after_use() {
    let mut builder = GrammarBuilder::new();
    let list = builder.key("list");
    let item = builder.key("item");
    builder
        .rule("list")
        .is(("[", item, zero_or_more((",", item)), "]"))
        .unwrap();
    builder.rule("item").is(first_of([token_type(TokenType::NUMBER), list.into()])).unwrap();
    let grammar = builder.build(list).unwrap();

    let root = parse(&grammar, "[1, [2, 3], 4]").unwrap();
    let items: Vec<_> = root.find_children("item").collect();
    assert_eq!(items.len(), 3);
    assert_eq!(items[1].children()[0].name(), "list");
    assert_eq!(root.tokens().count(), 11);
}

#[test]
fn test_overrides_wrap_base_definition() {
    let mut builder = GrammarBuilder::new();
    let value = builder.key("value");
    builder
        .rule("value")
        .is(token_type(TokenType::NUMBER))
        .unwrap()
        .override_with(|base| first_of([base, token_type(TokenType::STRING)]))
        .override_with(|base| sequence([base, optional(";")]));
    let grammar = builder.build(value).unwrap();

    assert_eq!(
        grammar.matcher(value).unwrap().to_string(),
        r#"((NUMBER | STRING) ";"?)"#
    );
    assert!(parse(&grammar, "42").is_ok());
    assert!(parse(&grammar, "'text' ;").is_ok());
    assert!(parse(&grammar, "name").is_err());
}

#[test]
fn test_mocked_rule_matches_its_name() {
    let mut builder = GrammarBuilder::new();
    let call = builder.key("call");
    let arguments = builder.key("arguments");
    builder.rule("call").is(("f", "(", arguments, ")")).unwrap();
    builder.rule("arguments").mock().unwrap();
    let grammar = builder.build(call).unwrap();

    let root = parse(&grammar, "f(arguments)").unwrap();
    insta::assert_snapshot!(dump(&root), @r#"
    call
      IDENTIFIER "f"@1:0
      PUNCTUATOR "("@1:1
      arguments
        IDENTIFIER "arguments"@1:2
      PUNCTUATOR ")"@1:11
    "#);
    assert!(parse(&grammar, "f(1)").is_err());
}

#[test]
fn test_left_recursion_hits_depth_limit() {
    let mut builder = GrammarBuilder::new();
    let expr = builder.key("expr");
    builder
        .rule("expr")
        .is(first_of([(expr, "+", token_type(TokenType::NUMBER)).into(), token_type(TokenType::NUMBER)]))
        .unwrap();
    let grammar = builder.build(expr).unwrap();

    let config = ParserConfig {
        max_depth: 64,
        ..ParserConfig::default()
    };
    let error = grammar.parse_with(&config, &lex("1 + 2")).unwrap_err();
    assert_eq!(
        error,
        ParseError::RecursionLimit {
            rule: "expr".into(),
            limit: 64
        }
    );
    assert_eq!(error.index(), None);
}

#[test]
fn test_left_recursion_with_default_config_is_an_error() {
    let mut builder = GrammarBuilder::new();
    let expr = builder.key("expr");
    builder
        .rule("expr")
        .is(first_of([(expr, "+", token_type(TokenType::NUMBER)).into(), token_type(TokenType::NUMBER)]))
        .unwrap();
    let grammar = builder.build(expr).unwrap();

    let error = grammar.parse(&lex("1 + 2")).unwrap_err();
    assert_eq!(
        error,
        ParseError::RecursionLimit {
            rule: "expr".into(),
            limit: strata_syntax::config::DEFAULT_MAX_DEPTH,
        }
    );
}

#[test]
fn test_deeply_nested_input_parses_with_default_config() {
    let grammar = arithmetic();
    let levels = 150;
    let source = format!("{}1{}", "(".repeat(levels), ")".repeat(levels));

    let root = parse(&grammar, &source).unwrap();
    assert_eq!(root.tokens().count(), 2 * levels + 1);
    let nested_terms = root.descendants().filter(|node| node.name() == "term").count();
    assert_eq!(nested_terms, levels);

    let too_deep = format!("{}1{}", "(".repeat(200), ")".repeat(200));
    assert!(matches!(
        parse(&grammar, &too_deep),
        Err(ParseError::RecursionLimit { .. })
    ));
}

#[test]
fn test_parse_from_inner_rule() {
    let grammar = arithmetic();
    let term = grammar.key("term").unwrap();
    let node = grammar
        .parse_rule(term, &ParserConfig::default(), &lex("2 * 3"))
        .unwrap();
    assert_eq!(node.name(), "term");
    assert_eq!(node.children().len(), 3);
    assert!(grammar.parse_rule(term, &ParserConfig::default(), &lex("2 + 3")).is_err());
}

#[test]
fn test_grammar_is_shared_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Grammar>();

    let grammar = arithmetic();
    std::thread::scope(|scope| {
        let handles: Vec<_> = ["1 + 2", "3 * (4 - 5)", "6 / 7 / 8"]
            .into_iter()
            .map(|source| {
                let grammar = &grammar;
                scope.spawn(move || grammar.parse(&lex(source)).is_ok())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    });
}
