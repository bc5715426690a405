//! Expression parsing: precedence, literals, escapes and locations

use krl_core::*;
use krl_parser::{parse, parse_expression};

fn expr(src: &str) -> Expr {
    parse_expression(src).unwrap_or_else(|e| panic!("parse failed for {:?}: {}", src, e))
}

/// S-expression rendering of an expression tree
fn sexp(e: &Expr) -> String {
    match &e.node {
        ExprKind::Identifier(v) => v.clone(),
        ExprKind::DomainIdentifier { domain, value } => format!("{}:{}", domain, value),
        ExprKind::String(s) => format!("{:?}", s),
        ExprKind::Number(n) => n.to_string(),
        ExprKind::Boolean(b) => b.to_string(),
        ExprKind::RegExp { pattern, flags } => format!("re#{}#{}", pattern, flags),
        ExprKind::Chevron(parts) => format!("(<< {})", list(parts)),
        ExprKind::Array(items) => format!("[{}]", list(items)),
        ExprKind::Map(pairs) => {
            let pairs: Vec<_> = pairs
                .iter()
                .map(|p| format!("{} {}", sexp(&p.key), sexp(&p.value)))
                .collect();
            format!("{{{}}}", pairs.join(" "))
        }
        ExprKind::Unary { op, arg } => format!("({} {})", op.as_str(), sexp(arg)),
        ExprKind::Infix { op, left, right } => {
            format!("({} {} {})", op.as_str(), sexp(left), sexp(right))
        }
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => format!("(=> {} {} {})", sexp(test), sexp(consequent), sexp(alternate)),
        ExprKind::Member {
            object,
            property,
            method,
        } => {
            let op = match method {
                MemberMethod::Dot => ".",
                MemberMethod::Index => "[]",
                MemberMethod::Path => "{}",
            };
            format!("({} {} {})", op, sexp(object), sexp(property))
        }
        ExprKind::Application { callee, args } => {
            let args: Vec<_> = args
                .args
                .iter()
                .map(|a| match a {
                    Argument::Positional(e) => sexp(e),
                    Argument::Named(n) => format!("(= {} {})", n.id.value, sexp(&n.value)),
                })
                .collect();
            if args.is_empty() {
                format!("(call {})", sexp(callee))
            } else {
                format!("(call {} {})", sexp(callee), args.join(" "))
            }
        }
        ExprKind::Function { params, body } => {
            let params: Vec<_> = params.params.iter().map(|p| p.id.value.as_str()).collect();
            format!("(fn ({}) {} stmts)", params.join(" "), body.len())
        }
    }
}

fn list(items: &[Expr]) -> String {
    items.iter().map(sexp).collect::<Vec<_>>().join(" ")
}

fn s(src: &str) -> String {
    sexp(&expr(src))
}

// ----------------------------------------------------------------------------
// Precedence
// ----------------------------------------------------------------------------

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(s("a+b+c"), "(+ (+ a b) c)");
    assert_eq!(s("a+b*c"), "(+ a (* b c))");
    assert_eq!(s("a*b+c"), "(+ (* a b) c)");
    assert_eq!(s("a - b - c"), "(- (- a b) c)");
    assert_eq!(s("a / b % c"), "(% (/ a b) c)");
    assert_eq!(s("(a + b) * c"), "(* (+ a b) c)");
    assert_eq!(s("a - -b"), "(- a (- b))");
}

#[test]
fn test_logical_precedence() {
    assert_eq!(s("a || b && c"), "(|| a (&& b c))");
    assert_eq!(s("a && b || c"), "(|| (&& a b) c)");
    assert_eq!(s("a * b < c && d"), "(&& (< (* a b) c) d)");
    assert_eq!(s("a == b != c"), "(!= (== a b) c)");
}

#[test]
fn test_comparison_words() {
    assert_eq!(s("a like re#x#i"), "(like a re#x#i)");
    assert_eq!(s("a cmp b"), "(cmp a b)");
    assert_eq!(s("a >< b"), "(>< a b)");
    assert_eq!(s("a <=> b"), "(<=> a b)");
    assert_eq!(s("a <= b"), "(<= a b)");
    assert_eq!(s("a >= b"), "(>= a b)");
}

#[test]
fn test_unary() {
    assert_eq!(s("not a"), "(not a)");
    assert_eq!(s("not not a"), "(not (not a))");
    assert_eq!(s("-a * b"), "(* (- a) b)");
    assert_eq!(s("+a"), "(+ a)");
    assert_eq!(s("nota"), "nota");
    assert_eq!(s("not nota"), "(not nota)");
}

#[test]
fn test_conditional() {
    assert_eq!(s("a => b | c"), "(=> a b c)");
    assert_eq!(s("a=>b|c=>d|e"), "(=> a b (=> c d e))");
    assert_eq!(s("a || b => c + 1 | d"), "(=> (|| a b) (+ c 1) d)");
}

// ----------------------------------------------------------------------------
// Postfix
// ----------------------------------------------------------------------------

#[test]
fn test_member_chains() {
    assert_eq!(s("a.b"), "(. a b)");
    assert_eq!(s("a[0]"), "([] a 0)");
    assert_eq!(s("a{\"b\"}"), "({} a \"b\")");
    assert_eq!(s("a.b[c]{d}"), "({} ([] (. a b) c) d)");
    assert_eq!(s("one().two()"), "(call (. (call one) two))");
    assert_eq!(s("f(1)(2)"), "(call (call f 1) 2)");
}

#[test]
fn test_member_needs_plain_identifier() {
    let err = parse_expression("blah.ent:name").unwrap_err();
    assert!(err.to_string().starts_with("No possible parsings"));
    assert_eq!(err.offset(), Some(5));
}

#[test]
fn test_arguments() {
    assert_eq!(s("foo()"), "(call foo)");
    assert_eq!(s("foo(1, 2,)"), "(call foo 1 2)");
    assert_eq!(s("foo(1, b = 2)"), "(call foo 1 (= b 2))");
    assert_eq!(s("foo(a == b)"), "(call foo (== a b))");

    let e = expr("foo(1, b = 2)");
    let ExprKind::Application { args, .. } = &e.node else {
        panic!("expected application");
    };
    assert_eq!(args.span, Span::new(3, 13));
    assert_eq!(args.args[0].span(), Span::new(4, 5));
    let Argument::Named(named) = &args.args[1] else {
        panic!("expected named argument");
    };
    assert_eq!(named.span, Span::new(7, 12));
    assert_eq!(named.id.span, Span::new(7, 8));
    assert_eq!(named.value.span, Span::new(11, 12));
}

#[test]
fn test_domain_identifier() {
    let e = expr("ent:name");
    assert_eq!(e.span, Span::new(0, 8));
    assert_eq!(
        e.node,
        ExprKind::DomainIdentifier {
            domain: "ent".into(),
            value: "name".into()
        }
    );

    assert_eq!(
        s("event:attr(\"name\").klog(\"hi\")"),
        "(call (. (call event:attr \"name\") klog) \"hi\")"
    );
}

// ----------------------------------------------------------------------------
// Literals
// ----------------------------------------------------------------------------

#[test]
fn test_numbers_and_booleans() {
    assert_eq!(expr("123").node, ExprKind::Number(123.0));
    assert_eq!(expr("1.50").node, ExprKind::Number(1.5));
    assert_eq!(expr(".5").node, ExprKind::Number(0.5));
    assert_eq!(s("-1.2"), "(- 1.2)");
    assert_eq!(expr("true").node, ExprKind::Boolean(true));
    assert_eq!(expr("false").node, ExprKind::Boolean(false));
}

#[test]
fn test_arrays_and_maps() {
    assert_eq!(s("[]"), "[]");
    assert_eq!(s("[  ]"), "[]");
    assert_eq!(s("[1, 2, 3]"), "[1 2 3]");
    assert_eq!(s("[1, 2,]"), "[1 2]");
    assert_eq!(s("[[1], []]"), "[[1] []]");
    assert_eq!(s("{}"), "{}");
    assert_eq!(s("{   }"), "{}");
    assert_eq!(s("{\"a\": 1}"), "{\"a\" 1}");
    assert_eq!(
        s("{ \"one\"  :   2  , \"  three  \"   : 4  }"),
        "{\"one\" 2 \"  three  \" 4}"
    );
    assert_eq!(s("{\"a\": 1,}"), "{\"a\" 1}");

    let e = expr("{\"a\": [1]}");
    let ExprKind::Map(pairs) = &e.node else {
        panic!("expected map");
    };
    assert_eq!(pairs[0].span, Span::new(1, 9));
    assert_eq!(pairs[0].key.span, Span::new(1, 4));
    assert_eq!(pairs[0].value.span, Span::new(6, 9));
}

#[test]
fn test_map_keys_must_be_strings() {
    assert!(parse_expression("{a: 1}").is_err());
    assert!(parse_expression("[1 2]").is_err());
}

#[test]
fn test_functions() {
    assert_eq!(s("function(){}"), "(fn () 0 stmts)");
    assert_eq!(s("function(   ){}"), "(fn () 0 stmts)");
    assert_eq!(s("function(){   }"), "(fn () 0 stmts)");
    assert_eq!(s("function(a, b){a + b}"), "(fn (a b) 1 stmts)");
    assert_eq!(s("function(a,){a; b;}"), "(fn (a) 2 stmts)");

    let e = expr("function(a, b = 2){c = a + b; c}");
    let ExprKind::Function { params, body } = &e.node else {
        panic!("expected function");
    };
    assert_eq!(params.span, Span::new(9, 17));
    assert!(params.params[0].default.is_none());
    assert_eq!(params.params[1].span, Span::new(12, 17));
    assert_eq!(
        params.params[1].default.as_ref().map(|d| d.node.clone()),
        Some(ExprKind::Number(2.0))
    );
    assert!(matches!(body[0].node, StmtKind::Declaration { .. }));
    assert!(matches!(body[1].node, StmtKind::Expression(_)));
}

// ----------------------------------------------------------------------------
// Escapes
// ----------------------------------------------------------------------------

fn string_value(src: &str) -> String {
    match expr(src).node {
        ExprKind::String(v) => v,
        other => panic!("expected string, got {:?}", other),
    }
}

fn regex_pattern(src: &str) -> String {
    match expr(src).node {
        ExprKind::RegExp { pattern, .. } => pattern,
        other => panic!("expected regex, got {:?}", other),
    }
}

fn chevron_parts(src: &str) -> Vec<ExprKind> {
    match expr(src).node {
        ExprKind::Chevron(parts) => parts.into_iter().map(|p| p.node).collect(),
        other => panic!("expected chevron, got {:?}", other),
    }
}

fn text(v: &str) -> ExprKind {
    ExprKind::String(v.to_string())
}

#[test]
fn test_string_escapes() {
    assert_eq!(string_value(r##""one\"""##), r#"one""#);
    assert_eq!(string_value(r##""one\>\>+two\>""##), r#"one\>\>+two\>"#);
    assert_eq!(string_value(r##""one\#{""##), r#"one\#{"#);
    assert_eq!(string_value(r##""one\#""##), r#"one\#"#);
    assert_eq!(string_value(r##""one\{""##), r#"one\{"#);
    assert_eq!(string_value(r##""one\\""##), r#"one\"#);
}

#[test]
fn test_chevron_escapes() {
    assert_eq!(chevron_parts(r##"<<one\">>"##), [text(r#"one\""#)]);
    assert_eq!(chevron_parts(r##"<<one\>\>+two\>>>"##), [text("one>>+two>")]);
    assert_eq!(chevron_parts(r##"<<one\#{>>"##), [text("one#{")]);
    assert_eq!(chevron_parts(r##"<<one\#>>"##), [text(r#"one\#"#)]);
    assert_eq!(chevron_parts(r##"<<one\{>>"##), [text(r#"one\{"#)]);
    assert_eq!(
        chevron_parts(r##"<<one\\#{0}+two\\>>"##),
        [text(r#"one\"#), ExprKind::Number(0.0), text(r#"+two\"#)]
    );
}

#[test]
fn test_regex_escapes() {
    assert_eq!(regex_pattern(r##"re#one\"#"##), r#"one\""#);
    assert_eq!(regex_pattern(r##"re#one\>\>+two\>#"##), r#"one\>\>+two\>"#);
    assert_eq!(regex_pattern(r##"re#one\#{#"##), "one#{");
    assert_eq!(regex_pattern(r##"re#one\##"##), "one#");
    assert_eq!(regex_pattern(r##"re#one\{#"##), r#"one\{"#);
    assert_eq!(regex_pattern(r##"re#one\\#"##), r#"one\\"#);
}

#[test]
fn test_regex_flags() {
    assert_eq!(s("re#^a.b$#gi"), "re#^a.b$#gi");
    assert_eq!(s("re#x#"), "re#x#");
}

// ----------------------------------------------------------------------------
// Chevrons
// ----------------------------------------------------------------------------

#[test]
fn test_chevron_interpolation_locations() {
    let e = expr("<<hi #{name}!>>");
    assert_eq!(e.span, Span::new(0, 15));
    let ExprKind::Chevron(parts) = &e.node else {
        panic!("expected chevron");
    };
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], Spanned::new(text("hi "), Span::new(2, 5)));
    assert_eq!(
        parts[1],
        Spanned::new(ExprKind::Identifier("name".into()), Span::new(7, 11))
    );
    assert_eq!(parts[2], Spanned::new(text("!"), Span::new(12, 13)));
}

#[test]
fn test_chevron_empty_text_is_dropped() {
    assert_eq!(chevron_parts("<<>>"), Vec::<ExprKind>::new());
    assert_eq!(
        chevron_parts("<<#{a}#{b}>>"),
        [
            ExprKind::Identifier("a".into()),
            ExprKind::Identifier("b".into())
        ]
    );
}

#[test]
fn test_chevron_interpolates_expressions() {
    assert_eq!(s("<<#{a + 1}>>"), "(<< (+ a 1))");
    assert_eq!(s("<<#{ {\"a\": 1}{\"a\"} }>>"), "(<< ({} {\"a\" 1} \"a\"))");
}

#[test]
fn test_nested_chevrons() {
    let e = expr("<<a#{<<b#{c}>>}>>");
    assert_eq!(s("<<a#{<<b#{c}>>}>>"), "(<< \"a\" (<< \"b\" c))");
    let ExprKind::Chevron(parts) = &e.node else {
        panic!("expected chevron");
    };
    assert_eq!(parts[1].span, Span::new(5, 14));
    let ExprKind::Chevron(inner) = &parts[1].node else {
        panic!("expected inner chevron");
    };
    assert_eq!(inner[0].span, Span::new(7, 8));
    assert_eq!(inner[1].span, Span::new(10, 11));
}

#[test]
fn test_interpolation_error_points_at_close() {
    let err = parse_expression("<<#{1 +}>>").unwrap_err();
    assert_eq!(err.offset(), Some(7));
    assert!(err.to_string().starts_with("No possible parsings"));

    let err = parse_expression("<<#{}>>").unwrap_err();
    assert_eq!(err.offset(), Some(4));
}

// ----------------------------------------------------------------------------
// Locations
// ----------------------------------------------------------------------------

#[test]
fn test_statement_locations_exclude_padding() {
    for src in [
        "name",
        "\"some string\"",
        "-1.2",
        "a => b | c",
        "function(a){b}",
        "a [ 1  ]",
        "a {[ \"a\", \"b\"] }",
        "<<x #{y} z>>",
        "re#a#i",
    ] {
        let padded = format!("\n  {}  \n ", src);
        let program = parse(&padded).unwrap_or_else(|e| panic!("{:?}: {}", src, e));
        let stmts = program.statements();
        assert_eq!(stmts.len(), 1, "{:?}", src);
        assert_eq!(stmts[0].span.slice(&padded), Some(src), "{:?}", src);
    }
}

#[test]
fn test_comments_are_skipped() {
    let program = parse("1; //some comment\n2/*annother comment*/;3").unwrap();
    let spans: Vec<_> = program.statements().iter().map(|s| s.span).collect();
    assert_eq!(
        spans,
        [Span::new(0, 1), Span::new(18, 19), Span::new(40, 41)]
    );
}

#[test]
fn test_infix_location() {
    let e = expr("a + b * c");
    assert_eq!(e.span, Span::new(0, 9));
    let ExprKind::Infix { left, right, .. } = &e.node else {
        panic!("expected infix");
    };
    assert_eq!(left.span, Span::new(0, 1));
    assert_eq!(right.span, Span::new(4, 9));
}

#[test]
fn test_parenthesised_span_is_inner() {
    let e = expr("( a )");
    assert_eq!(e.span, Span::new(2, 3));
}

#[test]
fn test_statement_lists() {
    let program = parse("  one  (  ) ;  two  (  )  ").unwrap();
    let stmts = program.statements();
    assert_eq!(stmts.len(), 2);
    assert_eq!(stmts[0].span, Span::new(2, 11));
    assert_eq!(stmts[1].span, Span::new(15, 24));

    assert!(parse("").unwrap().statements().is_empty());
    assert_eq!(parse("a; b;").unwrap().statements().len(), 2);
    assert!(parse("a b").is_err());
}

#[test]
fn test_declarations_in_statement_lists() {
    let program = parse("a = 1; b.c = a").unwrap();
    let stmts = program.statements();
    assert_eq!(stmts[0].node.op(), Some("="));
    assert_eq!(stmts[0].span, Span::new(0, 5));
    let StmtKind::Declaration { left, .. } = &stmts[1].node else {
        panic!("expected declaration");
    };
    assert_eq!(sexp(left), "(. b c)");
}
