//! Event expression scenarios

use krl_core::*;
use krl_parser::parse;

fn select(src: &str) -> Event {
    let program = parse(&format!("ruleset one {{rule two {{select when {}}}}}", src))
        .unwrap_or_else(|e| panic!("parse failed for {:?}: {}", src, e));
    let Program::Ruleset(mut rs) = program else {
        panic!("expected ruleset");
    };
    rs.rules.remove(0).select.expect("select").event
}

/// Compact rendering: base events as `domain:type`, operators as lists
fn render(e: &Event) -> String {
    match &e.node {
        EventKind::Expression(ee) => format!("{}:{}", ee.event_domain.value, ee.event_type.value),
        EventKind::Operator { op, args } => {
            let args: Vec<_> = args.iter().map(render).collect();
            format!("({} {})", op.as_str(), args.join(" "))
        }
        EventKind::Any { count, args } => {
            let args: Vec<_> = args.iter().map(render).collect();
            let ExprKind::Number(n) = count.node else {
                panic!("expected number");
            };
            format!("(any {} {})", n, args.join(" "))
        }
        EventKind::Group { op, n, event } => {
            let ExprKind::Number(n) = n.node else {
                panic!("expected number");
            };
            let op = match op {
                GroupOp::Count => "count",
                GroupOp::Repeat => "repeat",
            };
            format!("({} {} {})", op, n, render(event))
        }
    }
}

fn base(e: &Event) -> &EventExpression {
    match &e.node {
        EventKind::Expression(ee) => ee,
        other => panic!("expected event expression, got {:?}", other),
    }
}

#[test]
fn test_base_event_location() {
    let event = select("a b");
    assert_eq!(event.span, Span::new(35, 38));
    let ee = base(&event);
    assert_eq!(ee.event_domain.span, Span::new(35, 36));
    assert_eq!(ee.event_type.span, Span::new(37, 38));
    assert!(ee.event_attrs.is_empty());
    assert!(ee.where_clause.is_none());
    assert!(ee.setting.is_empty());
    assert!(ee.aggregator.is_none());
}

#[test]
fn test_or_location() {
    let event = select("a b or c d");
    assert_eq!(event.span, Span::new(35, 45));
    let EventKind::Operator { op, args } = &event.node else {
        panic!("expected operator");
    };
    assert_eq!(*op, EventOp::Or);
    assert_eq!(args[0].span, Span::new(35, 38));
    assert_eq!(args[1].span, Span::new(42, 45));
}

#[test]
fn test_binary_operators() {
    assert_eq!(render(&select("d a or d b")), "(or d:a d:b)");
    assert_eq!(render(&select("a a and b b")), "(and a:a b:b)");
    assert_eq!(render(&select("a a before b b")), "(before a:a b:b)");
    assert_eq!(render(&select("a a then b b")), "(then a:a b:b)");
    assert_eq!(render(&select("a a after b b")), "(after a:a b:b)");
}

#[test]
fn test_operator_precedence() {
    assert_eq!(render(&select("a a or b b or c c")), "(or (or a:a b:b) c:c)");
    assert_eq!(render(&select("a a or b b and c c")), "(or a:a (and b:b c:c))");
    assert_eq!(render(&select("a a and b b or c c")), "(or (and a:a b:b) c:c)");
    assert_eq!(
        render(&select("a a before b b and c c")),
        "(and (before a:a b:b) c:c)"
    );
    assert_eq!(
        render(&select("(a a or b b) and c c")),
        "(and (or a:a b:b) c:c)"
    );
}

#[test]
fn test_between() {
    assert_eq!(
        render(&select("a a between(b b, c c)")),
        "(between a:a b:b c:c)"
    );
    assert_eq!(
        render(&select("a a not between ( b b, c c )")),
        "(not between a:a b:b c:c)"
    );
    assert_eq!(
        render(&select("a a between(b b, c c) or d d")),
        "(or (between a:a b:b c:c) d:d)"
    );
}

#[test]
fn test_prefix_operators() {
    assert_eq!(
        render(&select("and(a a, b b, c c)")),
        "(and a:a b:b c:c)"
    );
    assert_eq!(
        render(&select("before(a a, b b or c c)")),
        "(before a:a (or b:b c:c))"
    );
    assert_eq!(
        render(&select("any 2 (a a, b b, c c)")),
        "(any 2 a:a b:b c:c)"
    );
    assert!(parse("ruleset r{rule x{select when or(a a)}}").is_err());
}

#[test]
fn test_attribute_matches() {
    let event = select("web pageview url re#/archives/(\\d+)#i title re#(.*)#");
    let ee = base(&event);
    assert_eq!(ee.event_attrs.len(), 2);
    assert_eq!(ee.event_attrs[0].key.value, "url");
    assert_eq!(
        ee.event_attrs[0].value.node,
        ExprKind::RegExp {
            pattern: "/archives/(\\d+)".into(),
            flags: "i".into()
        }
    );
}

#[test]
fn test_where_and_setting() {
    let event = select("a b where re#(.*)#");
    let ee = base(&event);
    assert!(ee.event_attrs.is_empty());
    assert!(matches!(
        ee.where_clause.as_ref().unwrap().node,
        ExprKind::RegExp { .. }
    ));

    let event = select("a b c re#x# where c > 3 setting(x, y)");
    let ee = base(&event);
    assert_eq!(ee.event_attrs.len(), 1);
    assert!(ee.where_clause.is_some());
    let names: Vec<_> = ee.setting.iter().map(|i| i.value.as_str()).collect();
    assert_eq!(names, ["x", "y"]);
}

#[test]
fn test_bare_regex_is_not_an_attribute() {
    let err = parse("ruleset a{rule b{select when Domain TypeAttrib re#(.*)#}}").unwrap_err();
    assert!(!err.is_ambiguity());
    assert!(err.to_string().starts_with("No possible parsings"));
}

#[test]
fn test_groups_and_aggregators() {
    let event = select("count 3 (a b) max(m)");
    assert_eq!(render(&event), "(count 3 a:b)");
    let EventKind::Group { event: inner, .. } = &event.node else {
        panic!("expected group");
    };
    let agg = base(inner).aggregator.as_ref().unwrap();
    assert_eq!(agg.op, AggregateOp::Max);
    assert_eq!(agg.args[0].value, "m");
    // The inner event reaches over its aggregator; the group covers both.
    assert_eq!(event.span, Span::new(35, 55));
    assert_eq!(agg.span, Span::new(49, 55));
    assert_eq!(inner.span, Span::new(44, 55));

    for (src, op) in [
        ("repeat 1 (a b) push(c)", AggregateOp::Push),
        ("repeat 1 (a b) max(c)", AggregateOp::Max),
        ("count 1 (a b) min(c)", AggregateOp::Min),
        ("count 1 (a b) sum(c)", AggregateOp::Sum),
        ("count 1 (a b) avg(c)", AggregateOp::Avg),
    ] {
        let event = select(src);
        let EventKind::Group { event: inner, .. } = &event.node else {
            panic!("expected group for {}", src);
        };
        assert_eq!(base(inner).aggregator.as_ref().unwrap().op, op);
    }
}

#[test]
fn test_aggregator_then_action() {
    let src = "ruleset a{rule b{select when repeat 5 (c d) max(  e  ) noop()}}";
    let program = parse(src).unwrap();
    let rule = &program.as_ruleset().unwrap().rules[0];
    let ab = rule.action_block.as_ref().unwrap();
    assert_eq!(ab.actions.len(), 1);
    let EventKind::Group { event, .. } = &rule.select.as_ref().unwrap().event.node else {
        panic!("expected group");
    };
    assert!(base(event).aggregator.is_some());
}

#[test]
fn test_aggregator_name_as_action() {
    // Not directly after a group, `min(c)` is an ordinary action.
    let src = "ruleset a{rule b{select when a b min(c);}}";
    let program = parse(src).unwrap();
    let rule = &program.as_ruleset().unwrap().rules[0];
    let action = &rule.action_block.as_ref().unwrap().actions[0];
    assert!(matches!(&action.action.node, ExprKind::Identifier(v) if v == "min"));

    let src = "ruleset a{rule b{select when count 1 (a b) noop();}}";
    assert!(parse(src).is_ok());
}

#[test]
fn test_group_needs_a_base_event() {
    assert!(parse("ruleset a{rule b{select when count 2 (a b or c d)}}").is_err());
}
