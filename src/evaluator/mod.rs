use crate::ast::{EvaluationTrace, Expression, Value};
use crate::compiler;
use crate::trace::TraceFormatter;
use ahash::AHashMap;

mod engine;

use engine::AstEngine;

const TRACING_TARGET: &str = "nagare::evaluator";

/// Variable bindings that identifiers in a predicate are resolved against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    bindings: AHashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object into a context.
    ///
    /// Malformed JSON, or JSON that is not an object, yields an empty
    /// context instead of an error. Blank input is treated as `{}`.
    pub fn from_json_lenient(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(serde_json::Value::Object(map)) => map
                .iter()
                .map(|(name, value)| (name.clone(), Value::from(value)))
                .collect(),
            Ok(other) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    kind = json_kind(&other),
                    "Context JSON is not an object, using an empty context"
                );
                Self::default()
            }
            Err(err) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    error = %err,
                    "Context JSON failed to parse, using an empty context"
                );
                Self::default()
            }
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.bindings.insert(name.into(), value.into());
    }

    /// Looks up a binding; missing names are [`Value::Undefined`].
    pub fn get(&self, name: &str) -> Value {
        self.bindings.get(name).cloned().unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// The outcome of a predicate together with a human-readable account of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub result: bool,
    pub value: Value,
    pub reason: String,
    pub trace: EvaluationTrace,
}

/// Evaluates predicate expressions against a [`Context`].
///
/// This is the fail-safe boundary between user-written predicates and the
/// interpreter: nothing that goes wrong inside a predicate escapes as an
/// error, a broken predicate is simply "condition not met".
pub struct Evaluator;

impl Evaluator {
    /// Evaluates an already parsed expression to its runtime value.
    pub fn evaluate(expression: &Expression, context: &Context) -> Value {
        AstEngine::new(expression, context).evaluate()
    }

    /// Evaluates an already parsed expression and records how each part was computed.
    pub fn trace(expression: &Expression, context: &Context) -> EvaluationTrace {
        AstEngine::new(expression, context).trace()
    }

    /// Tokenizes, parses and evaluates `source`, coercing the result to a boolean.
    ///
    /// Returns `false` for any predicate that fails to parse.
    pub fn evaluate_predicate_safe(source: &str, context: &Context) -> bool {
        match compiler::compile(source) {
            Ok(expression) => {
                let result = Self::evaluate(&expression, context).is_truthy();
                tracing::trace!(
                    target: TRACING_TARGET,
                    predicate = source,
                    result,
                    "Predicate evaluated"
                );
                result
            }
            Err(err) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    predicate = source,
                    error = %err,
                    "Predicate failed to parse, treating it as false"
                );
                false
            }
        }
    }

    /// Like [`Evaluator::evaluate_predicate_safe`], but explains the outcome.
    ///
    /// Returns `None` when the predicate does not parse.
    pub fn explain(source: &str, context: &Context) -> Option<Explanation> {
        let expression = compiler::compile(source).ok()?;
        let trace = Self::trace(&expression, context);
        let value = trace.get_outcome();
        Some(Explanation {
            result: value.is_truthy(),
            reason: TraceFormatter::format_trace(&trace),
            value,
            trace,
        })
    }
}
