use chrono::{TimeZone, Utc};
use search_query::ast::{Expr, Op, Value};
use search_query::parse;

fn kw(s: &str) -> Expr {
    Expr::keyword(Value::String(s.to_string()))
}

fn date(y: i32, m: u32, d: u32) -> Value {
    Value::Time(Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap())
}

// ==============================================================================

#[test]
fn bare_keyword() {
    assert_eq!(parse("blue").unwrap(), kw("blue"));
}

#[test]
fn negated_keyword() {
    assert_eq!(parse("NOT white").unwrap(), Expr::not(kw("white")));
}

#[test]
fn explicit_or() {
    assert_eq!(parse("blue OR red").unwrap(), Expr::or(kw("blue"), kw("red")));
}

#[test]
fn juxtaposition_is_conjunction() {
    assert_eq!(
        parse("blue guitar").unwrap(),
        Expr::and(vec![kw("blue"), kw("guitar")])
    );
}

#[test]
fn explicit_and_equals_juxtaposition() {
    let juxtaposed = parse("blue guitar").unwrap();
    let explicit = parse("blue AND guitar").unwrap();
    assert_eq!(explicit, juxtaposed);
    assert_eq!(
        explicit,
        Expr::and(vec![parse("blue").unwrap(), parse("guitar").unwrap()])
    );
}

#[test]
fn scope_and_time_comparison() {
    assert_eq!(
        parse("model:gibson date < 1965-01-01").unwrap(),
        Expr::and(vec![
            Expr::scope("model", kw("gibson")),
            Expr::comparison("date", Op::Lt, date(1965, 1, 1)),
        ])
    );
}

#[test]
fn quoted_scope_and_integer_comparison() {
    assert_eq!(
        parse(r#"title:"Harry Potter" AND pages<500"#).unwrap(),
        Expr::and(vec![
            Expr::scope("title", kw("Harry Potter")),
            Expr::comparison("pages", Op::Lt, Value::Integer(500)),
        ])
    );
}

#[test]
fn grouped_disjunction_under_scope() {
    assert_eq!(
        parse("beverage:wine color:(red OR white) NOT country:france").unwrap(),
        Expr::and(vec![
            Expr::scope("beverage", kw("wine")),
            Expr::scope("color", Expr::or(kw("red"), kw("white"))),
            Expr::not(Expr::scope("country", kw("france"))),
        ])
    );
}

#[test]
fn boolean_keywords() {
    assert_eq!(
        parse("true false").unwrap(),
        Expr::and(vec![
            Expr::keyword(Value::Bool(true)),
            Expr::keyword(Value::Bool(false)),
        ])
    );
}

// NOT cat AND dogs OR horses --> (NOT cat) AND (dogs OR horses)
#[test]
fn or_combines_its_immediate_neighbors() {
    assert_eq!(
        parse("NOT cat AND dogs OR horses").unwrap(),
        Expr::and(vec![
            Expr::not(kw("cat")),
            Expr::or(kw("dogs"), kw("horses")),
        ])
    );
}

// NOT cat OR dogs AND horses --> ((NOT cat) OR dogs) AND horses
#[test]
fn or_before_and_still_combines_neighbors() {
    assert_eq!(
        parse("NOT cat OR dogs AND horses").unwrap(),
        Expr::and(vec![
            Expr::or(Expr::not(kw("cat")), kw("dogs")),
            kw("horses"),
        ])
    );
}

#[test]
fn chained_or_nests_left() {
    assert_eq!(
        parse("a OR b OR c").unwrap(),
        Expr::or(Expr::or(kw("a"), kw("b")), kw("c"))
    );
}

#[test]
fn not_binds_tighter_than_juxtaposition() {
    assert_eq!(
        parse("NOT a b").unwrap(),
        Expr::and(vec![Expr::not(kw("a")), kw("b")])
    );
}

#[test]
fn dotted_property_path() {
    assert_eq!(
        parse("users.user_id = xxx").unwrap(),
        Expr::comparison("users.user_id", Op::Eq, Value::String("xxx".to_string()))
    );
}

#[test]
fn not_equal_spellings_parse_identically() {
    let bang = parse("x != 1").unwrap();
    let angle = parse("x <> 1").unwrap();
    assert_eq!(bang, angle);
    assert_eq!(bang, Expr::comparison("x", Op::Neq, Value::Integer(1)));
}

#[test]
fn every_operator_parses() {
    let cases = [
        ("pages = 500", Op::Eq),
        ("pages != 500", Op::Neq),
        ("pages < 500", Op::Lt),
        ("pages <= 500", Op::Le),
        ("pages > 500", Op::Gt),
        ("pages >= 500", Op::Ge),
    ];
    for (input, op) in cases {
        assert_eq!(
            parse(input).unwrap(),
            Expr::comparison("pages", op, Value::Integer(500)),
            "failed for input: {input}"
        );
    }
}

#[test]
fn datetime_comparison() {
    assert_eq!(
        parse("created >= 2020-05-06T07:08:09Z").unwrap(),
        Expr::comparison(
            "created",
            Op::Ge,
            Value::Time(Utc.with_ymd_and_hms(2020, 5, 6, 7, 8, 9).unwrap()),
        )
    );
}

#[test]
fn nested_scope() {
    assert_eq!(
        parse("a:b:c").unwrap(),
        Expr::scope("a", Expr::scope("b", kw("c")))
    );
}

#[test]
fn parenthesized_single_expression_stays_unwrapped() {
    assert_eq!(parse("(blue)").unwrap(), kw("blue"));
    assert_eq!(parse("((blue))").unwrap(), kw("blue"));
}

#[test]
fn group_participates_in_conjunction() {
    assert_eq!(
        parse("(a OR b) c").unwrap(),
        Expr::and(vec![Expr::or(kw("a"), kw("b")), kw("c")])
    );
}

#[test]
fn negated_group() {
    assert_eq!(
        parse("NOT (a b)").unwrap(),
        Expr::not(Expr::and(vec![kw("a"), kw("b")]))
    );
}

#[test]
fn comments_and_newlines_are_spacing() {
    assert_eq!(
        parse("blue # favorite color\nred").unwrap(),
        Expr::and(vec![kw("blue"), kw("red")])
    );
    assert_eq!(
        parse("\tblue\r\nred # trailing comment").unwrap(),
        Expr::and(vec![kw("blue"), kw("red")])
    );
    assert_eq!(parse("  blue  ").unwrap(), kw("blue"));
}

#[test]
fn scope_whitespace_is_flexible() {
    assert_eq!(
        parse("model : gibson").unwrap(),
        Expr::scope("model", kw("gibson"))
    );
    assert_eq!(
        parse("pages<500").unwrap(),
        Expr::comparison("pages", Op::Lt, Value::Integer(500))
    );
}
