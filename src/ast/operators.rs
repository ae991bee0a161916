//! Comparison operators for `property OP value` expressions.

use std::fmt;

/// Closed set of comparison operators.
///
/// The surface syntax accepts two spellings of not-equal, `!=` and `<>`;
/// both decode to [`Op::Neq`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Op {
    /// Canonical symbol for the operator, also used as its serialization
    /// tag. `Neq` always renders as `!=`, never `<>`.
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Neq => "!=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
        }
    }

    /// Decode a surface token, including the `<>` alias.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "=" => Some(Op::Eq),
            "!=" | "<>" => Some(Op::Neq),
            "<" => Some(Op::Lt),
            "<=" => Some(Op::Le),
            ">" => Some(Op::Gt),
            ">=" => Some(Op::Ge),
            _ => None,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
