//! Tests for the predicate tokenizer and parser.
use nagare::ast::{BinaryOp, Expression, Value};
use nagare::compiler::{MAX_NESTING_DEPTH, TokenKind, compile, tokenize};
use nagare::error::ParseError;

fn lexemes(source: &str) -> Vec<String> {
    tokenize(source).into_iter().map(|t| t.text).collect()
}

#[test]
fn test_tokenize_comparison_chain() {
    assert_eq!(
        lexemes("x > 0 && y <= 10"),
        vec!["x", ">", "0", "&&", "y", "<=", "10"]
    );
}

#[test]
fn test_tokenize_prefers_longest_operator() {
    assert_eq!(lexemes("a===b"), vec!["a", "===", "b"]);
    assert_eq!(lexemes("a!==b"), vec!["a", "!==", "b"]);
    assert_eq!(lexemes("!a"), vec!["!", "a"]);
}

#[test]
fn test_tokenize_kinds_and_positions() {
    let tokens = tokenize("flag || 'hi' == 2.5");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Ident,
            TokenKind::Operator,
            TokenKind::Str,
            TokenKind::Operator,
            TokenKind::Number
        ]
    );
    assert_eq!(tokens[2].position, 8);
    assert_eq!(tokens[2].text, "'hi'");
}

#[test]
fn test_tokenize_booleans_are_not_identifiers() {
    let tokens = tokenize("true && truthy");
    assert_eq!(tokens[0].kind, TokenKind::Bool);
    assert_eq!(tokens[2].kind, TokenKind::Ident);
}

#[test]
fn test_tokenize_skips_unknown_characters() {
    assert_eq!(lexemes("x = 1 ; @ é"), vec!["x", "1"]);
}

#[test]
fn test_parse_precedence() {
    let expr = compile("1 + 2 * 3").unwrap();
    let expected = Expression::binary(
        BinaryOp::Add,
        Expression::Const(Value::Number(1.0)),
        Expression::binary(
            BinaryOp::Multiply,
            Expression::Const(Value::Number(2.0)),
            Expression::Const(Value::Number(3.0)),
        ),
    );
    assert_eq!(expr, expected);
}

#[test]
fn test_parse_left_associative() {
    let expr = compile("10 - 4 - 3").unwrap();
    let Expression::Binary(BinaryOp::Subtract, left, right) = expr else {
        panic!("expected a subtraction at the root");
    };
    assert!(matches!(*left, Expression::Binary(BinaryOp::Subtract, _, _)));
    assert_eq!(*right, Expression::Const(Value::Number(3.0)));
}

#[test]
fn test_parse_or_binds_looser_than_and() {
    let expr = compile("a || b && c").unwrap();
    assert!(matches!(
        expr,
        Expression::Binary(BinaryOp::Or, _, ref right)
            if matches!(**right, Expression::Binary(BinaryOp::And, _, _))
    ));
}

#[test]
fn test_parse_string_unescape() {
    let expr = compile(r#""say \"hi\"""#).unwrap();
    assert_eq!(expr, Expression::Const(Value::Str("say \"hi\"".into())));
}

#[test]
fn test_empty_source_is_false() {
    assert_eq!(compile("").unwrap(), Expression::Const(Value::Bool(false)));
    assert_eq!(compile("   ").unwrap(), Expression::Const(Value::Bool(false)));
}

#[test]
fn test_parse_errors() {
    assert!(matches!(
        compile("((unbalanced"),
        Err(ParseError::ExpectedToken { .. })
    ));
    assert!(matches!(
        compile("x > 0 )"),
        Err(ParseError::TrailingTokens { position: 6, .. })
    ));
    assert!(matches!(
        compile("* 3"),
        Err(ParseError::UnexpectedToken { position: 0, .. })
    ));
}

#[test]
fn test_nesting_limit() {
    let deep = format!("{}1{}", "(".repeat(MAX_NESTING_DEPTH + 1), ")".repeat(MAX_NESTING_DEPTH + 1));
    assert!(matches!(compile(&deep), Err(ParseError::NestingTooDeep { .. })));

    let shallow = format!("{}1{}", "(".repeat(8), ")".repeat(8));
    assert_eq!(compile(&shallow).unwrap(), Expression::Const(Value::Number(1.0)));
}
