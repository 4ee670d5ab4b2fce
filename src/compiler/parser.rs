use super::lexer::{Token, TokenKind, unescape_string};
use crate::ast::{BinaryOp, Expression, Value};
use crate::error::ParseError;

/// Maximum number of nested parentheses and `!` operators.
pub const MAX_NESTING_DEPTH: usize = 128;
/// Maximum number of tokens a single predicate may contain.
pub const MAX_TOKENS: usize = 2048;

const EQUALITY_OPS: [BinaryOp; 4] = [
    BinaryOp::LooseEqual,
    BinaryOp::LooseNotEqual,
    BinaryOp::StrictEqual,
    BinaryOp::StrictNotEqual,
];
const RELATIONAL_OPS: [BinaryOp; 4] = [
    BinaryOp::Less,
    BinaryOp::LessEqual,
    BinaryOp::Greater,
    BinaryOp::GreaterEqual,
];
const ADDITIVE_OPS: [BinaryOp; 2] = [BinaryOp::Add, BinaryOp::Subtract];
const MULTIPLICATIVE_OPS: [BinaryOp; 3] =
    [BinaryOp::Multiply, BinaryOp::Divide, BinaryOp::Remainder];

/// Parses a token stream into an [`Expression`].
///
/// Grammar, lowest binding first:
///
/// ```text
/// or_expr  := and_expr ( '||' and_expr )*
/// and_expr := eq_expr  ( '&&' eq_expr )*
/// eq_expr  := rel_expr ( ('=='|'!='|'==='|'!==') rel_expr )*
/// rel_expr := add_expr ( ('<'|'<='|'>'|'>=') add_expr )*
/// add_expr := mul_expr ( ('+'|'-') mul_expr )*
/// mul_expr := unary    ( ('*'|'/'|'%') unary )*
/// unary    := '!' unary | primary
/// primary  := literal | identifier | '(' or_expr ')'
/// ```
///
/// A primary position at the end of input yields the constant `false`, so an
/// empty predicate parses to `false`. Tokens left over after a complete
/// expression are rejected.
pub fn parse(tokens: &[Token]) -> Result<Expression, ParseError> {
    if tokens.len() > MAX_TOKENS {
        return Err(ParseError::TooManyTokens {
            count: tokens.len(),
            limit: MAX_TOKENS,
        });
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expression = parser.parse_or()?;

    match parser.peek() {
        Some(token) => Err(ParseError::TrailingTokens {
            token: token.text.clone(),
            position: token.position,
        }),
        None => Ok(expression),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn expect(&mut self, symbol: &str) -> Result<(), ParseError> {
        match self.advance() {
            Some(token) if token.is_operator(symbol) => Ok(()),
            other => Err(ParseError::ExpectedToken {
                expected: symbol.to_string(),
                found: other.map_or("end of input".to_string(), |t| format!("'{}'", t.text)),
            }),
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Returns the operator at the cursor if it belongs to `ops`.
    fn match_operator(&self, ops: &[BinaryOp]) -> Option<BinaryOp> {
        let token = self.peek()?;
        if token.kind != TokenKind::Operator {
            return None;
        }
        BinaryOp::from_symbol(&token.text).filter(|op| ops.contains(op))
    }

    /// One left-associative precedence level.
    fn parse_level(
        &mut self,
        ops: &[BinaryOp],
        next: fn(&mut Self) -> Result<Expression, ParseError>,
    ) -> Result<Expression, ParseError> {
        let mut left = next(self)?;
        while let Some(op) = self.match_operator(ops) {
            self.advance();
            let right = next(self)?;
            left = Expression::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expression, ParseError> {
        self.parse_level(&[BinaryOp::Or], Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Expression, ParseError> {
        self.parse_level(&[BinaryOp::And], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<Expression, ParseError> {
        self.parse_level(&EQUALITY_OPS, Self::parse_relational)
    }

    fn parse_relational(&mut self) -> Result<Expression, ParseError> {
        self.parse_level(&RELATIONAL_OPS, Self::parse_additive)
    }

    fn parse_additive(&mut self) -> Result<Expression, ParseError> {
        self.parse_level(&ADDITIVE_OPS, Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, ParseError> {
        self.parse_level(&MULTIPLICATIVE_OPS, Self::parse_unary)
    }

    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        match self.peek() {
            Some(token) if token.is_operator("!") => {
                self.advance();
                self.enter()?;
                let operand = self.parse_unary()?;
                self.leave();
                Ok(Expression::not(operand))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        let Some(token) = self.peek() else {
            return Ok(Expression::Const(Value::Bool(false)));
        };

        match token.kind {
            TokenKind::Operator if token.text == "(" => {
                self.advance();
                self.enter()?;
                let inner = self.parse_or()?;
                self.expect(")")?;
                self.leave();
                Ok(inner)
            }
            TokenKind::Number => {
                self.advance();
                let number = token
                    .text
                    .parse::<f64>()
                    .map_err(|_| unexpected(token))?;
                Ok(Expression::Const(Value::Number(number)))
            }
            TokenKind::Str => {
                self.advance();
                Ok(Expression::Const(Value::Str(unescape_string(&token.text))))
            }
            TokenKind::Bool => {
                self.advance();
                Ok(Expression::Const(Value::Bool(token.text == "true")))
            }
            TokenKind::Ident => {
                self.advance();
                Ok(Expression::Ident(token.text.clone()))
            }
            TokenKind::Operator => Err(unexpected(token)),
        }
    }
}

fn unexpected(token: &Token) -> ParseError {
    ParseError::UnexpectedToken {
        token: token.text.clone(),
        position: token.position,
    }
}
