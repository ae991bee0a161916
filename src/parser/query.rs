//! Grammar recognition and the walk that drives tree construction.
//!
//! pest recognizes the whole input first (ordered choice with
//! backtracking, so events from abandoned alternatives never fire), then
//! the walk below replays the successful match top to bottom, applying one
//! [`TreeBuilder`] operation at each structural point: a property pushes
//! its name, `OR` combines immediately, a closing parenthesis pops a
//! frame, and every expression sequence ends with the AND fold.

use chrono::{DateTime, NaiveDate, Utc};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use super::builder::TreeBuilder;
use super::error::ParseError;
use crate::ast::{Expr, Op, Value};

#[derive(Parser)]
#[grammar = "parser/grammar.pest"]
pub struct QueryParser;

impl QueryParser {
    /// Parse a query string into an expression tree.
    pub fn parse_query(input: &str) -> Result<Expr, ParseError> {
        let mut pairs = Self::parse(Rule::program, input)
            .map_err(|e| ParseError::from_pest(Box::new(e), input.to_string()))?;

        let program = pairs
            .next()
            .ok_or_else(|| ParseError::internal("grammar guarantees a program pair"))?;

        let mut builder = TreeBuilder::new();
        for pair in program.into_inner() {
            match pair.as_rule() {
                Rule::exprs => Self::walk_exprs(pair, &mut builder)
                    .map_err(|e| e.with_source(input.to_string()))?,
                Rule::EOI => {}
                rule => {
                    return Err(ParseError::internal(format!(
                        "unexpected rule {rule:?} under program"
                    )))
                }
            }
        }
        Ok(builder.finalize()?)
    }

    /// Apply an expression sequence: every term leaves one expression on
    /// the stack, OR terms reduce immediately, and the trailing fold turns
    /// whatever remains into a conjunction.
    fn walk_exprs(pair: Pair<'_, Rule>, builder: &mut TreeBuilder) -> Result<(), ParseError> {
        for term in pair.into_inner() {
            match term.as_rule() {
                Rule::expr => Self::walk_expr(term, builder)?,
                Rule::and_term => Self::walk_expr(Self::only_child(term)?, builder)?,
                Rule::or_term => {
                    Self::walk_expr(Self::only_child(term)?, builder)?;
                    builder.combine_or()?;
                }
                rule => {
                    return Err(ParseError::internal(format!(
                        "unexpected rule {rule:?} in expression sequence"
                    )))
                }
            }
        }
        builder.reduce_and()?;
        Ok(())
    }

    fn walk_expr(pair: Pair<'_, Rule>, builder: &mut TreeBuilder) -> Result<(), ParseError> {
        let inner = Self::only_child(pair)?;
        match inner.as_rule() {
            Rule::property_expr => Self::walk_property_expr(inner, builder),
            Rule::group => {
                builder.push_frame();
                Self::walk_exprs(Self::only_child(inner)?, builder)?;
                builder.pop_frame()?;
                Ok(())
            }
            Rule::not_expr => {
                Self::walk_expr(Self::only_child(inner)?, builder)?;
                builder.negate()?;
                Ok(())
            }
            Rule::keyword => {
                let value = Self::decode_value(Self::only_child(inner)?)?;
                builder.push_value(value);
                builder.keyword()?;
                Ok(())
            }
            rule => Err(ParseError::internal(format!(
                "unexpected rule {rule:?} as expression"
            ))),
        }
    }

    fn walk_property_expr(
        pair: Pair<'_, Rule>,
        builder: &mut TreeBuilder,
    ) -> Result<(), ParseError> {
        let mut inner = pair.into_inner();

        let property = inner
            .next()
            .ok_or_else(|| ParseError::internal("grammar guarantees a property name"))?;
        builder.push_property(property.as_str());

        let tail = inner
            .next()
            .ok_or_else(|| ParseError::internal("grammar guarantees a comparison or scope"))?;
        match tail.as_rule() {
            Rule::comparison => {
                let mut parts = tail.into_inner();
                let op_pair = parts
                    .next()
                    .ok_or_else(|| ParseError::internal("grammar guarantees an operator"))?;
                let op = Op::from_token(op_pair.as_str()).ok_or_else(|| {
                    ParseError::internal(format!(
                        "unrecognized operator token {:?}",
                        op_pair.as_str()
                    ))
                })?;
                builder.push_operator(op);

                let value_pair = parts
                    .next()
                    .ok_or_else(|| ParseError::internal("grammar guarantees a value"))?;
                let value = Self::decode_value(value_pair)?;
                builder.push_value(value);

                builder.comparison()?;
            }
            Rule::scope => {
                Self::walk_expr(Self::only_child(tail)?, builder)?;
                builder.scope()?;
            }
            rule => {
                return Err(ParseError::internal(format!(
                    "unexpected rule {rule:?} after property"
                )))
            }
        }
        Ok(())
    }

    /// Decode a matched `value` pair into a typed literal. The grammar has
    /// already committed to the variant; only the payload can still be
    /// rejected (impossible dates, integer overflow).
    fn decode_value(pair: Pair<'_, Rule>) -> Result<Value, ParseError> {
        let inner = Self::only_child(pair)?;
        match inner.as_rule() {
            Rule::time => Self::decode_time(Self::only_child(inner)?),
            Rule::float => inner
                .as_str()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| {
                    ParseError::invalid_literal(inner.as_span(), "float literal out of range")
                }),
            Rule::integer => inner
                .as_str()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| {
                    ParseError::invalid_literal(inner.as_span(), "integer literal out of range")
                }),
            Rule::boolean => Ok(Value::Bool(inner.as_str() == "true")),
            Rule::string => {
                let content = Self::only_child(inner)?;
                match content.as_rule() {
                    Rule::bare_string => Ok(Value::String(content.as_str().to_string())),
                    Rule::quoted_string => {
                        let text = Self::only_child(content)?;
                        Ok(Value::String(text.as_str().to_string()))
                    }
                    rule => Err(ParseError::internal(format!(
                        "unexpected rule {rule:?} as string"
                    ))),
                }
            }
            rule => Err(ParseError::internal(format!(
                "unexpected rule {rule:?} as value"
            ))),
        }
    }

    fn decode_time(pair: Pair<'_, Rule>) -> Result<Value, ParseError> {
        let text = pair.as_str();
        match pair.as_rule() {
            Rule::time_datetime => DateTime::parse_from_rfc3339(text)
                .map(|t| Value::Time(t.with_timezone(&Utc)))
                .map_err(|_| {
                    ParseError::invalid_literal(
                        pair.as_span(),
                        format!("{text:?} is not a valid timestamp"),
                    )
                }),
            Rule::time_date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| Value::Time(naive.and_utc()))
                .ok_or_else(|| {
                    ParseError::invalid_literal(
                        pair.as_span(),
                        format!("{text:?} is not a valid calendar date"),
                    )
                }),
            rule => Err(ParseError::internal(format!(
                "unexpected rule {rule:?} as timestamp"
            ))),
        }
    }

    fn only_child(pair: Pair<'_, Rule>) -> Result<Pair<'_, Rule>, ParseError> {
        let rule = pair.as_rule();
        pair.into_inner().next().ok_or_else(|| {
            ParseError::internal(format!("grammar guarantees {rule:?} has an inner pair"))
        })
    }
}
