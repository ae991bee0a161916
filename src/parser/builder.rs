//! Stack machine that assembles the expression tree.
//!
//! The recognizer reports structural events in source order; each event
//! maps to one method here. Partially-built comparisons put property
//! names, operators, and values on the operand stack before the reduction
//! that consumes them, so the stack is heterogeneous — but every pop goes
//! through a typed accessor, and a mismatch surfaces as a [`StackError`]
//! instead of a cast failure.
//!
//! A builder belongs to a single parse: [`TreeBuilder::finalize`] consumes
//! it and yields the one finished expression.

use log::trace;
use thiserror::Error;

use crate::ast::{Expr, Op, Value};

/// Operand stack entry.
#[derive(Debug)]
enum StackItem {
    Expr(Expr),
    Property(String),
    Op(Op),
    Value(Value),
}

impl StackItem {
    fn kind(&self) -> &'static str {
        match self {
            StackItem::Expr(_) => "expression",
            StackItem::Property(_) => "property name",
            StackItem::Op(_) => "operator",
            StackItem::Value(_) => "value",
        }
    }
}

/// Stack invariant violation at a reduction point.
///
/// Reaching one of these means the grammar and the builder disagree about
/// event order. That is a defect in this crate, never a property of the
/// input; well-formed event sequences cannot trigger it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid builder state in {operation}: expected {expected}, found {found}")]
pub struct StackError {
    pub operation: &'static str,
    pub expected: &'static str,
    pub found: String,
}

impl StackError {
    fn new(operation: &'static str, expected: &'static str, found: impl Into<String>) -> Self {
        StackError {
            operation,
            expected,
            found: found.into(),
        }
    }
}

/// Operand stack plus a stack of saved outer stacks for parenthesized
/// groups.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    operands: Vec<StackItem>,
    frames: Vec<Vec<StackItem>>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_property(&mut self, name: &str) {
        trace!("push_property {name:?}");
        self.operands.push(StackItem::Property(name.to_string()));
    }

    pub fn push_operator(&mut self, op: Op) {
        trace!("push_operator {op}");
        self.operands.push(StackItem::Op(op));
    }

    pub fn push_value(&mut self, value: Value) {
        trace!("push_value {value}");
        self.operands.push(StackItem::Value(value));
    }

    /// Fold the whole operand stack into a conjunction, preserving source
    /// order. Runs once at the end of every expression sequence, top-level
    /// or parenthesized. A single operand stays as-is: a solitary
    /// expression never becomes a one-element `And`.
    pub fn reduce_and(&mut self) -> Result<(), StackError> {
        trace!("reduce_and");
        if self.operands.len() == 1 {
            return Ok(());
        }
        let items = std::mem::take(&mut self.operands);
        if items.is_empty() {
            return Err(StackError::new(
                "reduce_and",
                "at least one expression",
                "empty stack",
            ));
        }
        let mut children = Vec::with_capacity(items.len());
        for item in items {
            match item {
                StackItem::Expr(expr) => children.push(expr),
                other => return Err(StackError::new("reduce_and", "expression", other.kind())),
            }
        }
        self.operands.push(StackItem::Expr(Expr::And(children)));
        Ok(())
    }

    /// Combine the top two expressions into a disjunction. Runs at each
    /// `OR`, so a disjunction takes only its immediate neighbors and
    /// chained ORs nest left-to-right. This eager reduction is what gives
    /// OR tighter binding than the deferred AND fold.
    pub fn combine_or(&mut self) -> Result<(), StackError> {
        trace!("combine_or");
        let right = self.pop_expr("combine_or")?;
        let left = self.pop_expr("combine_or")?;
        self.operands.push(StackItem::Expr(Expr::Or(vec![left, right])));
        Ok(())
    }

    /// Open a parenthesized group: save the operand stack and start fresh.
    pub fn push_frame(&mut self) {
        trace!("push_frame");
        self.frames.push(std::mem::take(&mut self.operands));
    }

    /// Close a parenthesized group. The inner stack must hold exactly the
    /// one reduced expression, which lands on the restored outer stack.
    pub fn pop_frame(&mut self) -> Result<(), StackError> {
        trace!("pop_frame");
        if self.operands.len() != 1 {
            return Err(StackError::new(
                "pop_frame",
                "exactly one expression",
                format!("{} operands", self.operands.len()),
            ));
        }
        let expr = self.pop_expr("pop_frame")?;
        self.operands = self.frames.pop().ok_or_else(|| {
            StackError::new("pop_frame", "a saved frame", "no frames")
        })?;
        self.operands.push(StackItem::Expr(expr));
        Ok(())
    }

    pub fn negate(&mut self) -> Result<(), StackError> {
        trace!("negate");
        let expr = self.pop_expr("negate")?;
        self.operands.push(StackItem::Expr(Expr::Not(Box::new(expr))));
        Ok(())
    }

    /// Reduce `property OP value`. Pop order is strict: value first (most
    /// recently pushed), then operator, then property name.
    pub fn comparison(&mut self) -> Result<(), StackError> {
        trace!("comparison");
        let value = self.pop_value("comparison")?;
        let operator = self.pop_operator("comparison")?;
        let property = self.pop_property("comparison")?;
        self.operands.push(StackItem::Expr(Expr::Comparison {
            property,
            operator,
            value,
        }));
        Ok(())
    }

    /// Reduce `property:expr`.
    pub fn scope(&mut self) -> Result<(), StackError> {
        trace!("scope");
        let expr = self.pop_expr("scope")?;
        let property = self.pop_property("scope")?;
        self.operands.push(StackItem::Expr(Expr::Scope {
            property,
            expr: Box::new(expr),
        }));
        Ok(())
    }

    /// Reduce a bare value into a keyword expression.
    pub fn keyword(&mut self) -> Result<(), StackError> {
        trace!("keyword");
        let value = self.pop_value("keyword")?;
        self.operands.push(StackItem::Expr(Expr::Keyword(value)));
        Ok(())
    }

    /// Consume the builder: no saved frames may remain and the operand
    /// stack must hold exactly the finished expression.
    pub fn finalize(mut self) -> Result<Expr, StackError> {
        trace!("finalize");
        if !self.frames.is_empty() {
            return Err(StackError::new(
                "finalize",
                "no saved frames",
                format!("{} frames", self.frames.len()),
            ));
        }
        if self.operands.len() != 1 {
            return Err(StackError::new(
                "finalize",
                "exactly one expression",
                format!("{} operands", self.operands.len()),
            ));
        }
        self.pop_expr("finalize")
    }

    fn pop_expr(&mut self, operation: &'static str) -> Result<Expr, StackError> {
        match self.operands.pop() {
            Some(StackItem::Expr(expr)) => Ok(expr),
            Some(other) => Err(StackError::new(operation, "expression", other.kind())),
            None => Err(StackError::new(operation, "expression", "empty stack")),
        }
    }

    fn pop_value(&mut self, operation: &'static str) -> Result<Value, StackError> {
        match self.operands.pop() {
            Some(StackItem::Value(value)) => Ok(value),
            Some(other) => Err(StackError::new(operation, "value", other.kind())),
            None => Err(StackError::new(operation, "value", "empty stack")),
        }
    }

    fn pop_operator(&mut self, operation: &'static str) -> Result<Op, StackError> {
        match self.operands.pop() {
            Some(StackItem::Op(op)) => Ok(op),
            Some(other) => Err(StackError::new(operation, "operator", other.kind())),
            None => Err(StackError::new(operation, "operator", "empty stack")),
        }
    }

    fn pop_property(&mut self, operation: &'static str) -> Result<String, StackError> {
        match self.operands.pop() {
            Some(StackItem::Property(name)) => Ok(name),
            Some(other) => Err(StackError::new(operation, "property name", other.kind())),
            None => Err(StackError::new(operation, "property name", "empty stack")),
        }
    }
}
