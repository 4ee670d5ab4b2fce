//! Tests for predicate evaluation and the fail-safe predicate service.
mod common;
use common::*;
use nagare::prelude::*;

fn eval(source: &str, context: &Context) -> Value {
    Evaluator::evaluate(&compile(source).unwrap(), context)
}

#[test]
fn test_arithmetic_precedence() {
    let ctx = Context::new();
    assert_eq!(eval("1 + 2 * 3", &ctx), Value::Number(7.0));
    assert_eq!(eval("(1 + 2) * 3", &ctx), Value::Number(9.0));
    assert_eq!(eval("10 - 4 - 3", &ctx), Value::Number(3.0));
    assert_eq!(eval("7 % 4", &ctx), Value::Number(3.0));
}

#[test]
fn test_identifier_lookup() {
    let ctx = context_of(&[("x", 5.0), ("y", 10.0)]);
    assert!(Evaluator::evaluate_predicate_safe("x > 0 && y <= 10", &ctx));
    assert!(!Evaluator::evaluate_predicate_safe("x > 0 && y < 10", &ctx));
}

#[test]
fn test_missing_identifier_coerces_to_zero_and_false() {
    let ctx = Context::new();
    assert_eq!(eval("missing + 1", &ctx), Value::Number(1.0));
    assert!(!Evaluator::evaluate_predicate_safe("missing", &ctx));
    assert!(Evaluator::evaluate_predicate_safe("!missing", &ctx));
}

#[test]
fn test_string_coercion() {
    let ctx = Context::new();
    assert_eq!(eval("'4' * '2'", &ctx), Value::Number(8.0));
    assert_eq!(eval("'abc' + 1", &ctx), Value::Number(1.0));
    assert_eq!(eval("true + true", &ctx), Value::Number(2.0));
}

#[test]
fn test_loose_and_strict_equality() {
    let ctx = Context::new();
    assert!(Evaluator::evaluate_predicate_safe("'5' == 5", &ctx));
    assert!(!Evaluator::evaluate_predicate_safe("'5' === 5", &ctx));
    assert!(Evaluator::evaluate_predicate_safe("'5' !== 5", &ctx));
    assert!(Evaluator::evaluate_predicate_safe("5 === 5", &ctx));
    assert!(Evaluator::evaluate_predicate_safe("'a' != 'b'", &ctx));
}

#[test]
fn test_division_by_zero_is_not_an_error() {
    let ctx = Context::new();
    assert_eq!(eval("1 / 0", &ctx), Value::Number(f64::INFINITY));
    assert!(!Evaluator::evaluate_predicate_safe("false && (1/0 > 0)", &ctx));
    assert!(Evaluator::evaluate_predicate_safe("true || (1/0 > 0)", &ctx));
}

#[test]
fn test_unparsable_predicates_are_false() {
    let ctx = context_of(&[("x", 5.0)]);
    for source in ["((unbalanced", "x > 0 )", "* 2", "(x"] {
        assert!(
            !Evaluator::evaluate_predicate_safe(source, &ctx),
            "'{}' should be false",
            source
        );
    }
}

#[test]
fn test_context_from_lenient_json() {
    let ctx = Context::from_json_lenient(r#"{"x": 5, "name": "bob", "ok": true, "nothing": null}"#);
    assert_eq!(ctx.get("x"), Value::Number(5.0));
    assert_eq!(ctx.get("name"), Value::Str("bob".into()));
    assert_eq!(ctx.get("ok"), Value::Bool(true));
    assert_eq!(ctx.get("nothing"), Value::Null);
    assert_eq!(ctx.get("absent"), Value::Undefined);

    assert!(Context::from_json_lenient("{not json").is_empty());
    assert!(Context::from_json_lenient("[1, 2]").is_empty());
    assert!(Context::from_json_lenient("").is_empty());
}

#[test]
fn test_explain_reports_identifier_values() {
    let ctx = context_of(&[("x", 5.0)]);
    let explanation = Evaluator::explain("x > 0", &ctx).unwrap();
    assert!(explanation.result);
    assert_eq!(explanation.reason, "x (was 5) > 0");
}

#[test]
fn test_explain_omits_short_circuited_side() {
    let ctx = context_of(&[("x", -1.0), ("y", 3.0)]);
    let explanation = Evaluator::explain("x > 0 && y > 0", &ctx).unwrap();
    assert!(!explanation.result);
    assert_eq!(explanation.reason, "x (was -1) > 0");
}

#[test]
fn test_explain_unparsable_is_none() {
    assert!(Evaluator::explain("((", &Context::new()).is_none());
}
