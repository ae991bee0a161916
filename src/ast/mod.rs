//! AST types for the search-query language.
//!
//! A parse produces one owned [`Expr`] tree: nodes hold their children
//! exclusively, children keep left-to-right source order, and nothing is
//! mutated after the parse returns. The tree serializes as nested
//! single-key tagged mappings (see the `Serialize` impls), the shape
//! downstream consumers such as SQL builders match on.

mod operators;
pub use operators::Op;

mod values;
pub use values::Value;

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A parsed query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Conjunction, in source order. Never constructed with fewer than two
    /// children: a solitary expression stays unwrapped.
    And(Vec<Expr>),
    /// Disjunction of the two operands combined at its `OR`. Chained ORs
    /// nest left-to-right rather than flattening.
    Or(Vec<Expr>),
    /// Negation of exactly one operand.
    Not(Box<Expr>),
    /// `property OP value`.
    Comparison {
        property: String,
        operator: Op,
        value: Value,
    },
    /// `property:expr`. The scoped expression may be any variant, which is
    /// what makes `color:(red OR white)` work.
    Scope { property: String, expr: Box<Expr> },
    /// A bare value with no property: free-text search.
    Keyword(Value),
}

impl Expr {
    pub fn and(children: Vec<Expr>) -> Self {
        Expr::And(children)
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(vec![left, right])
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }

    pub fn comparison(property: impl Into<String>, operator: Op, value: Value) -> Self {
        Expr::Comparison {
            property: property.into(),
            operator,
            value,
        }
    }

    pub fn scope(property: impl Into<String>, expr: Expr) -> Self {
        Expr::Scope {
            property: property.into(),
            expr: Box::new(expr),
        }
    }

    pub fn keyword(value: Value) -> Self {
        Expr::Keyword(value)
    }
}

#[derive(Serialize)]
struct ComparisonBody<'a> {
    property: &'a str,
    value: &'a Value,
}

#[derive(Serialize)]
struct ScopeBody<'a> {
    property: &'a str,
    expr: &'a Expr,
}

#[derive(Serialize)]
struct KeywordBody<'a> {
    value: &'a Value,
}

/// Each variant serializes as a single-key mapping: `and`/`or` carry an
/// array of children, `not` the negated expression, an operator symbol a
/// `{property, value}` body, `:` a `{property, expr}` body, and `keyword`
/// a `{value}` body.
impl Serialize for Expr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Expr::And(children) => map.serialize_entry("and", children)?,
            Expr::Or(children) => map.serialize_entry("or", children)?,
            Expr::Not(expr) => map.serialize_entry("not", expr)?,
            Expr::Comparison {
                property,
                operator,
                value,
            } => map.serialize_entry(operator.symbol(), &ComparisonBody { property, value })?,
            Expr::Scope { property, expr } => {
                map.serialize_entry(":", &ScopeBody { property, expr })?
            }
            Expr::Keyword(value) => map.serialize_entry("keyword", &KeywordBody { value })?,
        }
        map.end()
    }
}

#[derive(Deserialize)]
struct ComparisonFields {
    property: String,
    value: Value,
}

#[derive(Deserialize)]
struct ScopeFields {
    property: String,
    expr: Expr,
}

#[derive(Deserialize)]
struct KeywordFields {
    value: Value,
}

impl<'de> Deserialize<'de> for Expr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ExprVisitor;

        impl<'de> Visitor<'de> for ExprVisitor {
            type Value = Expr;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a single-key tagged expression mapping")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Expr, A::Error>
            where
                A: MapAccess<'de>,
            {
                let tag: String = map
                    .next_key()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let expr = match tag.as_str() {
                    "and" => Expr::And(map.next_value()?),
                    "or" => Expr::Or(map.next_value()?),
                    "not" => Expr::Not(Box::new(map.next_value()?)),
                    ":" => {
                        let fields: ScopeFields = map.next_value()?;
                        Expr::Scope {
                            property: fields.property,
                            expr: Box::new(fields.expr),
                        }
                    }
                    "keyword" => {
                        let fields: KeywordFields = map.next_value()?;
                        Expr::Keyword(fields.value)
                    }
                    other => match Op::from_token(other) {
                        Some(operator) => {
                            let fields: ComparisonFields = map.next_value()?;
                            Expr::Comparison {
                                property: fields.property,
                                operator,
                                value: fields.value,
                            }
                        }
                        None => {
                            return Err(de::Error::custom(format!(
                                "unknown expression tag {other:?}"
                            )))
                        }
                    },
                };
                if map.next_key::<String>()?.is_some() {
                    return Err(de::Error::custom(
                        "expected a single-key expression mapping",
                    ));
                }
                Ok(expr)
            }
        }

        deserializer.deserialize_map(ExprVisitor)
    }
}
