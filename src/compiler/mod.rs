//! Front end of the predicate language: source text to [`Expression`].

use crate::ast::Expression;
use crate::error::ParseError;

pub mod lexer;
pub mod parser;

pub use lexer::{Token, TokenKind, tokenize};
pub use parser::{MAX_NESTING_DEPTH, MAX_TOKENS, parse};

/// Tokenizes and parses a predicate in one go.
///
/// ```rust
/// use nagare::ast::{BinaryOp, Expression};
///
/// let ast = nagare::compiler::compile("x > 0").unwrap();
/// assert!(matches!(ast, Expression::Binary(BinaryOp::Greater, _, _)));
/// ```
pub fn compile(source: &str) -> Result<Expression, ParseError> {
    let tokens = tokenize(source);
    parse(&tokens)
}
