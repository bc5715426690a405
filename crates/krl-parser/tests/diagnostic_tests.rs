//! Located error messages

use krl_parser::{parse, parse_expression, parse_with_options, ParseError, ParseOptions};

const SELECT_BLAH: &str =
    "//test parse error reporting\nruleset rs {\n  rule r0 {\n    select blah\n  }\n}";

#[test]
fn test_select_without_when() {
    let options = ParseOptions::default().with_filename("select-blah.krl");
    let err = parse_with_options(SELECT_BLAH, &options).unwrap_err();
    assert_eq!(
        err.to_string(),
        "No possible parsings\nselect-blah.krl:4:12\n \n    select blah\n           ^"
    );

    let loc = err.location().expect("location");
    assert_eq!(loc.filename.as_deref(), Some("select-blah.krl"));
    assert_eq!(loc.line, 4);
    assert_eq!(loc.col, 12);
    assert_eq!(
        loc.excerpt,
        "//test parse error reporting\nruleset rs {\n  rule r0 {\n    select blah\n           ^\n  }\n}"
    );
}

#[test]
fn test_fixed_source_parses() {
    let src = SELECT_BLAH.replace("select blah", "select when a b setting(c)");
    assert!(parse(&src).is_ok());
}

#[test]
fn test_without_filename() {
    let err = parse("ruleset rs {\n  rule r0 {\n    select blah\n  }\n}").unwrap_err();
    assert_eq!(
        err.to_string(),
        "No possible parsings\n:3:12\n \n    select blah\n           ^"
    );
    assert_eq!(err.location().unwrap().filename, None);
}

#[test]
fn test_lex_error_is_located() {
    let options = ParseOptions::default().with_filename("lex.krl");
    let err = parse_with_options("a = 1;\nb = \"open", &options).unwrap_err();
    assert!(matches!(err, ParseError::Lex { offset: 11, .. }));
    assert_eq!(
        err.to_string(),
        "Unterminated string\nlex.krl:2:5\n \nb = \"open\n    ^"
    );
}

#[test]
fn test_unexpected_character() {
    let err = parse("a # b").unwrap_err();
    assert_eq!(err.offset(), Some(2));
    assert!(err.to_string().starts_with("Unexpected character\n"));
    assert_eq!(err.location().unwrap().col, 3);
}

#[test]
fn test_columns_count_characters() {
    let err = parse("\"é\" \"ü\" )").unwrap_err();
    let loc = err.location().unwrap();
    assert_eq!(loc.line, 1);
    assert_eq!(loc.col, 5);
}

#[test]
fn test_early_end_has_no_location() {
    let err = parse("ruleset rs {").unwrap_err();
    assert_eq!(err.offset(), None);
    assert!(err.location().is_none());
    assert_eq!(err.to_string(), "No possible parsings");
}

#[test]
fn test_where_error_location() {
    let src = "ruleset rs {\n  rule r0 {\n    select when a b where\n  }\n}";
    let err = parse(src).unwrap_err();
    let loc = err.location().unwrap();
    assert_eq!((loc.line, loc.col), (4, 3));
}

#[test]
fn test_expression_errors_are_located() {
    let err = parse_expression("1 +\n* 2").unwrap_err();
    let loc = err.location().unwrap();
    assert_eq!((loc.line, loc.col), (2, 1));
    assert!(err.to_string().ends_with("\n* 2\n^"));
}

#[test]
fn test_ambiguity_is_not_located() {
    let err = ParseError::Ambiguity { count: 2 };
    let located = krl_parser::diagnostic::locate(err.clone(), "a", Some("f.krl"));
    assert_eq!(located, err);
    assert_eq!(located.to_string(), "Parsing Ambiguity: 2 parsings found");
}
