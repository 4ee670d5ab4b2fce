use super::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Unary operators of the predicate language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
        }
    }
}

/// Binary operators of the predicate language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,

    // Relational
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // Equality
    LooseEqual,
    LooseNotEqual,
    StrictEqual,
    StrictNotEqual,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    /// Maps an operator token onto its operator, if it is one.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Subtract,
            "*" => BinaryOp::Multiply,
            "/" => BinaryOp::Divide,
            "%" => BinaryOp::Remainder,
            "<" => BinaryOp::Less,
            "<=" => BinaryOp::LessEqual,
            ">" => BinaryOp::Greater,
            ">=" => BinaryOp::GreaterEqual,
            "==" => BinaryOp::LooseEqual,
            "!=" => BinaryOp::LooseNotEqual,
            "===" => BinaryOp::StrictEqual,
            "!==" => BinaryOp::StrictNotEqual,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::LooseEqual => "==",
            BinaryOp::LooseNotEqual => "!=",
            BinaryOp::StrictEqual => "===",
            BinaryOp::StrictNotEqual => "!==",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Binding strength, higher binds tighter. Mirrors the parser's grammar levels.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::LooseEqual
            | BinaryOp::LooseNotEqual
            | BinaryOp::StrictEqual
            | BinaryOp::StrictNotEqual => 3,
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => 4,
            BinaryOp::Add | BinaryOp::Subtract => 5,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Remainder => 6,
        }
    }
}

/// The Abstract Syntax Tree of a parsed predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Const(Value),
    Ident(String),
    Unary(UnaryOp, Box<Expression>),
    Binary(BinaryOp, Box<Expression>, Box<Expression>),
}

impl Expression {
    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary(op, Box::new(left), Box::new(right))
    }

    pub fn not(operand: Expression) -> Self {
        Expression::Unary(UnaryOp::Not, Box::new(operand))
    }

    /// Collects every identifier the expression reads from its context.
    pub fn get_identifiers(&self, names: &mut BTreeSet<String>) {
        match self {
            Expression::Ident(name) => {
                names.insert(name.clone());
            }
            Expression::Unary(_, operand) => operand.get_identifiers(names),
            Expression::Binary(_, l, r) => {
                l.get_identifiers(names);
                r.get_identifiers(names);
            }
            Expression::Const(_) => {}
        }
    }
}

/// A wrapper to display an expression as an indented tree.
pub struct DisplayExpression<'a> {
    pub expr: &'a Expression,
}

impl<'a> fmt::Display for DisplayExpression<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_as_tree(self.expr, f, "", true)
    }
}

impl<'a> DisplayExpression<'a> {
    fn fmt_as_tree(
        &self,
        expr: &Expression,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        write!(f, "{}{}", prefix, node_marker)?;

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

        match expr {
            Expression::Const(Value::Str(s)) => writeln!(f, "Const: {:?}", s)?,
            Expression::Const(v) => writeln!(f, "Const: {}", v)?,
            Expression::Ident(name) => writeln!(f, "Ident: {}", name)?,
            Expression::Unary(op, operand) => {
                writeln!(f, "Unary ({})", op.symbol())?;
                self.fmt_as_tree(operand, f, &child_prefix, true)?;
            }
            Expression::Binary(op, l, r) => {
                writeln!(f, "Binary ({})", op.symbol())?;
                self.fmt_as_tree(l, f, &child_prefix, false)?;
                self.fmt_as_tree(r, f, &child_prefix, true)?;
            }
        }
        Ok(())
    }
}
