use crate::ast::{EvaluationTrace, LeafSource, Value};
use std::fmt::Write;

/// Renders an [`EvaluationTrace`] as the predicate source annotated with the
/// values identifiers had, e.g. `x (was 5) > 0`.
pub struct TraceFormatter;

impl TraceFormatter {
    /// Operands skipped by a short-circuiting `&&`/`||` are left out, so the
    /// text shows only what decided the result.
    pub fn format_trace(trace: &EvaluationTrace) -> String {
        let mut out = String::new();
        Self::write_node(&mut out, trace, 0);
        out
    }

    /// Parentheses are added only where the parent binds tighter than `trace`.
    fn write_node(out: &mut String, trace: &EvaluationTrace, parent_precedence: u8) {
        let precedence = trace.precedence();
        let parenthesize = precedence < parent_precedence;
        if parenthesize {
            out.push('(');
        }

        match trace {
            EvaluationTrace::BinaryOp {
                op, left, right, ..
            } => {
                Self::write_node(out, left, precedence);
                if right.is_evaluated() {
                    let _ = write!(out, " {} ", op.symbol());
                    // Left-associative: an equal-precedence right operand keeps its parentheses.
                    Self::write_node(out, right, precedence + 1);
                }
            }
            EvaluationTrace::UnaryOp { op, child, .. } => {
                out.push_str(op.symbol());
                Self::write_node(out, child, precedence);
            }
            EvaluationTrace::Leaf {
                source: LeafSource::Identifier(name),
                value,
            } => {
                let _ = write!(out, "{} (was {})", name, Self::quoted(value));
            }
            EvaluationTrace::Leaf {
                source: LeafSource::Literal,
                value,
            } => out.push_str(&Self::quoted(value)),
            EvaluationTrace::NotEvaluated => {}
        }

        if parenthesize {
            out.push(')');
        }
    }

    /// Strings are quoted so `'5'` and `5` read differently.
    fn quoted(value: &Value) -> String {
        match value {
            Value::Str(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }
}
