//! Parse errors, using miette for diagnostics.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use super::builder::StackError;
use super::query::Rule;

/// Error type for query parsing. Exactly one of these is produced per
/// failed parse; no partial tree ever escapes.
#[derive(Debug, Clone, Diagnostic, Error)]
pub enum ParseError {
    /// The input did not match the grammar. Position is the furthest point
    /// the recognizer reached while backtracking, 1-based.
    #[error("parse error near {rule} (line {line} col {col} - line {end_line} col {end_col}): {snippet:?}")]
    #[diagnostic(code(search_query::syntax))]
    Syntax {
        #[source_code]
        src: String,
        #[label("{expected_msg}")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
        expected_msg: String,
        rule: &'static str,
        snippet: String,
        line: usize,
        col: usize,
        end_line: usize,
        end_col: usize,
    },

    /// A literal matched the surface grammar but does not decode to a
    /// usable value — an impossible calendar date, an out-of-range
    /// integer. Still a property of the input, so still user-facing.
    #[error("invalid literal at line {line}, column {col}: {reason}")]
    #[diagnostic(code(search_query::invalid_literal))]
    InvalidLiteral {
        #[source_code]
        src: String,
        #[label("{reason}")]
        span: SourceSpan,
        reason: String,
        line: usize,
        col: usize,
    },

    /// The grammar and the tree builder disagreed about event order, or a
    /// matched pair had an impossible shape. A defect in this crate, never
    /// a problem with the input.
    #[error("internal parser error: {message}")]
    #[diagnostic(code(search_query::internal))]
    Internal {
        message: String,
        #[source_code]
        src: String,
    },
}

/// Extension trait for span location extraction.
pub trait SpanExt {
    fn to_location(&self) -> (usize, usize);
    fn to_source_span(&self) -> SourceSpan;
}

impl SpanExt for pest::Span<'_> {
    #[inline]
    fn to_location(&self) -> (usize, usize) {
        self.start_pos().line_col()
    }

    #[inline]
    fn to_source_span(&self) -> SourceSpan {
        (self.start(), self.end() - self.start()).into()
    }
}

/// Map grammar rules to the names users see in messages.
fn rule_name(rule: &Rule) -> &'static str {
    match rule {
        Rule::program => "query",
        Rule::exprs => "expression sequence",
        Rule::and_term => "AND clause",
        Rule::or_term => "OR clause",
        Rule::expr => "expression",
        Rule::property_expr => "property expression",
        Rule::comparison => "comparison",
        Rule::scope => "scoped expression",
        Rule::group => "parenthesized group",
        Rule::not_expr => "NOT expression",
        Rule::keyword => "keyword",
        Rule::property | Rule::ident => "property name",
        Rule::operator => "comparison operator",
        Rule::value => "value",
        Rule::time | Rule::time_datetime => "timestamp",
        Rule::time_date | Rule::date_digits => "date",
        Rule::float => "float",
        Rule::integer => "integer",
        Rule::boolean => "boolean",
        Rule::string | Rule::bare_string => "string",
        Rule::quoted_string => "quoted string",
        Rule::quoted_inner => "string content",
        Rule::WHITESPACE => "whitespace",
        Rule::COMMENT => "comment",
        Rule::EOI => "end of input",
    }
}

/// Contextual help for the most common failure shapes.
fn help_text(positives: &[Rule], found_eoi: bool) -> Option<String> {
    if positives.is_empty() {
        return None;
    }

    if positives.contains(&Rule::value) {
        if found_eoi {
            return Some("add a value after the operator, like: pages < 500".to_string());
        }
        return Some(
            "expected a literal here (timestamp, number, boolean, or string)".to_string(),
        );
    }

    if positives.contains(&Rule::expr) && found_eoi {
        return Some("the query ends in the middle of an expression".to_string());
    }

    if positives.contains(&Rule::EOI) {
        return Some(
            "unexpected trailing input; check for unbalanced parentheses or quotes".to_string(),
        );
    }

    None
}

/// The rest of the offending line, starting at the failure position.
fn offending_snippet(src: &str, start: usize) -> String {
    let rest = &src[start.min(src.len())..];
    rest.split(|c| c == '\r' || c == '\n')
        .next()
        .unwrap_or("")
        .to_string()
}

impl ParseError {
    /// Translate a pest error into a syntax error. Pest already reports
    /// the rightmost failure position and the rules it expected there.
    pub fn from_pest(pest_err: Box<pest::error::Error<Rule>>, src: String) -> Self {
        use pest::error::{ErrorVariant, InputLocation, LineColLocation};

        let (start, end) = match pest_err.location {
            InputLocation::Pos(pos) => (pos, pos),
            InputLocation::Span((start, end)) => (start, end),
        };

        // Non-zero width span so miette's arrow has something to point at.
        // At end of input, point back at the last character.
        let span: SourceSpan = if start >= src.len() && start > 0 {
            (start - 1, 1).into()
        } else if start < src.len() {
            (start, end.saturating_sub(start).max(1)).into()
        } else {
            (0, 0).into()
        };

        let ((line, col), (end_line, end_col)) = match pest_err.line_col {
            LineColLocation::Pos(pos) => (pos, pos),
            LineColLocation::Span(start, end) => (start, end),
        };

        let (rule, expected_msg, help) = match &pest_err.variant {
            ErrorVariant::ParsingError {
                positives,
                negatives: _,
            } => {
                let found_eoi = start >= src.len();
                let rule = positives
                    .first()
                    .map(rule_name)
                    .unwrap_or("end of input");

                let mut names: Vec<&str> = positives.iter().map(rule_name).collect();
                names.dedup();
                let expected_msg = match names.len() {
                    0 => "unexpected input".to_string(),
                    1 => format!("expected {}", names[0]),
                    2..=3 => format!("expected one of: {}", names.join(", ")),
                    _ => format!("expected one of: {}, ...", names[..3].join(", ")),
                };

                (rule, expected_msg, help_text(positives, found_eoi))
            }
            ErrorVariant::CustomError { message } => ("input", message.clone(), None),
        };

        let snippet = offending_snippet(&src, start);

        ParseError::Syntax {
            src,
            span,
            help,
            expected_msg,
            rule,
            snippet,
            line,
            col,
            end_line,
            end_col,
        }
    }

    /// A literal that matched the grammar but failed to decode. Source
    /// text is attached later via [`ParseError::with_source`].
    pub fn invalid_literal(span: pest::Span<'_>, reason: impl Into<String>) -> Self {
        let (line, col) = span.to_location();
        ParseError::InvalidLiteral {
            src: String::new(),
            span: span.to_source_span(),
            reason: reason.into(),
            line,
            col,
        }
    }

    /// An internal consistency failure.
    pub fn internal(message: impl Into<String>) -> Self {
        ParseError::Internal {
            message: message.into(),
            src: String::new(),
        }
    }

    /// Attach the query text for diagnostic rendering.
    pub fn with_source(mut self, source: String) -> Self {
        match &mut self {
            ParseError::Syntax { src, .. }
            | ParseError::InvalidLiteral { src, .. }
            | ParseError::Internal { src, .. } => *src = source,
        }
        self
    }
}

impl From<StackError> for ParseError {
    fn from(err: StackError) -> Self {
        ParseError::internal(err.to_string())
    }
}
