use super::Context;
use crate::ast::{BinaryOp, EvaluationTrace, Expression, LeafSource, UnaryOp, Value};

// This macro generates the outcome of a binary operation on coerced numbers.
macro_rules! eval_op {
    ($l:ident, $r:ident, $op:tt, number) => {
        Value::Number($l.coerce_number() $op $r.coerce_number())
    };
    ($l:ident, $r:ident, $op:tt, bool) => {
        Value::Bool($l.coerce_number() $op $r.coerce_number())
    };
}

/// The core recursive engine for evaluating a single AST against a context.
///
/// Evaluation is total: every operator coerces its operands instead of
/// failing, so both entry points return a value rather than a `Result`.
pub(super) struct AstEngine<'a> {
    expression: &'a Expression,
    context: &'a Context,
}

impl<'a> AstEngine<'a> {
    pub(super) fn new(expression: &'a Expression, context: &'a Context) -> Self {
        Self {
            expression,
            context,
        }
    }

    /// Evaluates the AST to its value.
    pub(super) fn evaluate(&self) -> Value {
        self.evaluate_recursive(self.expression)
    }

    /// Evaluates the AST and returns a trace of the execution.
    pub(super) fn trace(&self) -> EvaluationTrace {
        self.trace_recursive(self.expression)
    }

    fn evaluate_recursive(&self, expr: &Expression) -> Value {
        match expr {
            Expression::Const(value) => value.clone(),
            Expression::Ident(name) => self.context.get(name),
            Expression::Unary(op, operand) => apply_unary(*op, &self.evaluate_recursive(operand)),
            Expression::Binary(op, l, r) => {
                let left = self.evaluate_recursive(l);
                let right = self.evaluate_recursive(r);
                apply_binary(*op, &left, &right)
            }
        }
    }

    fn trace_recursive(&self, expr: &Expression) -> EvaluationTrace {
        match expr {
            Expression::Const(value) => EvaluationTrace::Leaf {
                source: LeafSource::Literal,
                value: value.clone(),
            },
            Expression::Ident(name) => EvaluationTrace::Leaf {
                source: LeafSource::Identifier(name.clone()),
                value: self.context.get(name),
            },
            Expression::Unary(op, operand) => {
                let child = self.trace_recursive(operand);
                let outcome = apply_unary(*op, &child.get_outcome());
                EvaluationTrace::UnaryOp {
                    op: *op,
                    child: Box::new(child),
                    outcome,
                }
            }
            Expression::Binary(op, l, r) => {
                let left = self.trace_recursive(l);
                let left_value = left.get_outcome();

                // The right side cannot change a decided `&&`/`||`.
                let decided = match op {
                    BinaryOp::And if !left_value.is_truthy() => Some(false),
                    BinaryOp::Or if left_value.is_truthy() => Some(true),
                    _ => None,
                };
                if let Some(result) = decided {
                    return EvaluationTrace::BinaryOp {
                        op: *op,
                        left: Box::new(left),
                        right: Box::new(EvaluationTrace::NotEvaluated),
                        outcome: Value::Bool(result),
                    };
                }

                let right = self.trace_recursive(r);
                let outcome = apply_binary(*op, &left_value, &right.get_outcome());
                EvaluationTrace::BinaryOp {
                    op: *op,
                    left: Box::new(left),
                    right: Box::new(right),
                    outcome,
                }
            }
        }
    }
}

fn apply_unary(op: UnaryOp, operand: &Value) -> Value {
    match op {
        UnaryOp::Not => Value::Bool(!operand.is_truthy()),
    }
}

fn apply_binary(op: BinaryOp, l: &Value, r: &Value) -> Value {
    match op {
        // --- Arithmetic Operations ---
        BinaryOp::Add => eval_op!(l, r, +, number),
        BinaryOp::Subtract => eval_op!(l, r, -, number),
        BinaryOp::Multiply => eval_op!(l, r, *, number),
        BinaryOp::Divide => eval_op!(l, r, /, number),
        BinaryOp::Remainder => eval_op!(l, r, %, number),

        // --- Comparison Operations ---
        BinaryOp::Less => eval_op!(l, r, <, bool),
        BinaryOp::LessEqual => eval_op!(l, r, <=, bool),
        BinaryOp::Greater => eval_op!(l, r, >, bool),
        BinaryOp::GreaterEqual => eval_op!(l, r, >=, bool),

        // --- Equality ---
        BinaryOp::LooseEqual => Value::Bool(l.loose_eq(r)),
        BinaryOp::LooseNotEqual => Value::Bool(!l.loose_eq(r)),
        BinaryOp::StrictEqual => Value::Bool(l.strict_eq(r)),
        BinaryOp::StrictNotEqual => Value::Bool(!l.strict_eq(r)),

        // --- Logical Operations ---
        BinaryOp::And => Value::Bool(l.is_truthy() && r.is_truthy()),
        BinaryOp::Or => Value::Bool(l.is_truthy() || r.is_truthy()),
    }
}
