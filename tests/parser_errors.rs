use search_query::{parse, ParseError};

// ==============================================================================

#[test]
fn empty_input_fails() {
    assert!(parse("").is_err(), "empty input should fail");
    assert!(parse("   \t  ").is_err(), "whitespace-only input should fail");
    assert!(parse("# just a comment").is_err(), "comment-only input should fail");
}

#[test]
fn unterminated_quote_fails() {
    assert!(parse(r#"title:"Harry"#).is_err());
    assert!(parse(r#""unclosed"#).is_err());
}

#[test]
fn unbalanced_parentheses_fail() {
    assert!(parse("(blue").is_err(), "dangling open paren should fail");
    assert!(parse("blue )").is_err(), "stray close paren should fail");
    assert!(parse("color:(red OR white").is_err());
}

#[test]
fn incomplete_comparisons_fail() {
    assert!(parse("pages <").is_err(), "missing value should fail");
    assert!(parse("< 5").is_err(), "missing property should fail");
    assert!(parse("pages 500 <").is_err());
}

#[test]
fn numbers_require_a_nonzero_leading_digit() {
    assert!(parse("0").is_err());
    assert!(parse("012").is_err());
    assert!(parse("pages < 0500").is_err());
}

#[test]
fn syntax_errors_carry_one_based_positions() {
    match parse("blue\n)") {
        Err(ParseError::Syntax { line, col, .. }) => {
            assert_eq!(line, 2);
            assert_eq!(col, 1);
        }
        other => panic!("expected a syntax error, got {other:?}"),
    }

    match parse("") {
        Err(ParseError::Syntax { line, col, .. }) => {
            assert_eq!(line, 1);
            assert_eq!(col, 1);
        }
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[test]
fn syntax_error_message_names_rule_and_span() {
    let err = parse("pages <").unwrap_err();
    let message = err.to_string();
    assert!(
        message.starts_with("parse error near"),
        "unexpected message: {message}"
    );
    assert!(message.contains("line 1 col"), "unexpected message: {message}");
}

#[test]
fn impossible_dates_are_invalid_literals() {
    for input in ["date < 1965-13-01", "date < 1965-02-30", "2020-00-10"] {
        match parse(input) {
            Err(ParseError::InvalidLiteral { .. }) => {}
            other => panic!("expected invalid literal for {input:?}, got {other:?}"),
        }
    }
}

#[test]
fn impossible_timestamps_are_invalid_literals() {
    match parse("created >= 2020-05-06T25:00:00Z") {
        Err(ParseError::InvalidLiteral { .. }) => {}
        other => panic!("expected invalid literal, got {other:?}"),
    }
}

#[test]
fn out_of_range_integers_are_invalid_literals() {
    // One past i64::MAX, and a 20-digit literal in keyword position.
    for input in ["pages < 9223372036854775808", "99999999999999999999"] {
        match parse(input) {
            Err(ParseError::InvalidLiteral { line, col, .. }) => {
                assert_eq!(line, 1, "failed for input: {input}");
                assert!(col >= 1, "failed for input: {input}");
            }
            other => panic!("expected invalid literal for {input:?}, got {other:?}"),
        }
    }
}

#[test]
fn in_range_integer_extremes_still_parse() {
    assert!(parse("pages < 9223372036854775807").is_ok());
}

#[test]
fn invalid_literal_errors_carry_the_source() {
    match parse("date < 1965-13-01") {
        Err(ParseError::InvalidLiteral { src, .. }) => {
            assert_eq!(src, "date < 1965-13-01");
        }
        other => panic!("expected invalid literal, got {other:?}"),
    }
}
