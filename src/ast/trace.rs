use super::{BinaryOp, UnaryOp, Value};

/// Where a leaf value came from.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafSource {
    Literal,
    Identifier(String),
}

/// A record of how an expression was evaluated, including intermediate values.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationTrace {
    BinaryOp {
        op: BinaryOp,
        left: Box<EvaluationTrace>,
        right: Box<EvaluationTrace>,
        outcome: Value,
    },
    UnaryOp {
        op: UnaryOp,
        child: Box<EvaluationTrace>,
        outcome: Value,
    },
    Leaf {
        source: LeafSource,
        value: Value,
    },
    NotEvaluated,
}

impl EvaluationTrace {
    pub fn get_outcome(&self) -> Value {
        match self {
            EvaluationTrace::BinaryOp { outcome, .. } => outcome.clone(),
            EvaluationTrace::UnaryOp { outcome, .. } => outcome.clone(),
            EvaluationTrace::Leaf { value, .. } => value.clone(),
            EvaluationTrace::NotEvaluated => Value::Undefined,
        }
    }

    /// `false` for an operand skipped by a short-circuiting `&&`/`||`.
    pub fn is_evaluated(&self) -> bool {
        !matches!(self, EvaluationTrace::NotEvaluated)
    }

    /// Binding strength used to decide where a rendered trace needs parentheses.
    pub fn precedence(&self) -> u8 {
        match self {
            EvaluationTrace::BinaryOp { op, .. } => op.precedence(),
            EvaluationTrace::UnaryOp { .. } => 7,
            EvaluationTrace::Leaf { .. } | EvaluationTrace::NotEvaluated => 8,
        }
    }
}
