//! Reducers: one small function per production shape
//!
//! Child indices follow the right-hand side of the production, terminals
//! included. `r.span` covers every token the production matched.

use super::value::{ActionSet, Reduction, Value};
use super::{Nt, GRAMMAR};
use crate::engine::{self, Input};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{ChevronPart, SpannedToken, Token};
use krl_core::*;

type Reduced = ParseResult<Value>;

fn expr(kind: ExprKind, span: Span) -> Reduced {
    Ok(Value::Expr(Spanned::new(kind, span)))
}

fn stmt(kind: StmtKind, span: Span) -> Reduced {
    Ok(Value::Stmt(Spanned::new(kind, span)))
}

fn event(kind: EventKind, span: Span) -> Reduced {
    Ok(Value::Event(Spanned::new(kind, span)))
}

fn unexpected(tok: &SpannedToken, wanted: &str) -> ParseError {
    ParseError::internal(format!(
        "expected {} at {}, found `{}`",
        wanted, tok.start, tok.token
    ))
}

// ----------------------------------------------------------------------------
// Plumbing
// ----------------------------------------------------------------------------

pub(super) fn nothing(_: &mut Reduction) -> Reduced {
    Ok(Value::Unit)
}

pub(super) fn first(r: &mut Reduction) -> Reduced {
    r.take(0)
}

pub(super) fn second(r: &mut Reduction) -> Reduced {
    r.take(1)
}

pub(super) fn third(r: &mut Reduction) -> Reduced {
    r.take(2)
}

pub(super) fn list_empty(_: &mut Reduction) -> Reduced {
    Ok(Value::List(Vec::new()))
}

pub(super) fn list_first(r: &mut Reduction) -> Reduced {
    Ok(Value::List(vec![r.take(0)?]))
}

/// `item sep item`
pub(super) fn list_pair(r: &mut Reduction) -> Reduced {
    Ok(Value::List(vec![r.take(0)?, r.take(2)?]))
}

fn push(r: &mut Reduction, list: usize, item: usize) -> Reduced {
    let mut items = r.take(list)?.into_list()?;
    items.push(r.take(item)?);
    Ok(Value::List(items))
}

/// `list item`
pub(super) fn list_push_next(r: &mut Reduction) -> Reduced {
    push(r, 0, 1)
}

/// `list sep item`
pub(super) fn list_push_sep(r: &mut Reduction) -> Reduced {
    push(r, 0, 2)
}

pub(super) fn ident_second(r: &mut Reduction) -> Reduced {
    r.ident(1).map(Value::Ident)
}

pub(super) fn ident_third(r: &mut Reduction) -> Reduced {
    r.ident(2).map(Value::Ident)
}

// ----------------------------------------------------------------------------
// Program and ruleset
// ----------------------------------------------------------------------------

pub(super) fn program_ruleset(r: &mut Reduction) -> Reduced {
    Ok(Value::Program(Program::Ruleset(r.ruleset(0)?)))
}

pub(super) fn program_statements(r: &mut Reduction) -> Reduced {
    Ok(Value::Program(Program::Statements(
        r.list(0, Value::into_stmt)?,
    )))
}

pub(super) fn ruleset(r: &mut Reduction) -> Reduced {
    Ok(Value::Ruleset(Ruleset {
        rid: r.ruleset_id(1)?,
        meta: r.opt(3, Value::into_meta)?,
        global: r.list(4, Value::into_stmt)?,
        rules: r.list(5, Value::into_rule)?,
        span: r.span,
    }))
}

pub(super) fn ruleset_id(r: &mut Reduction) -> Reduced {
    Ok(Value::RulesetId(RulesetId {
        value: r.text(0)?,
        span: r.span,
    }))
}

pub(super) fn rid_start(r: &mut Reduction) -> Reduced {
    r.word(0).map(Value::Text)
}

pub(super) fn rid_join(r: &mut Reduction) -> Reduced {
    let mut rid = r.text(0)?;
    rid.push_str(&r.word(1)?);
    rid.push_str(&r.word(2)?);
    Ok(Value::Text(rid))
}

pub(super) fn meta(r: &mut Reduction) -> Reduced {
    Ok(Value::Meta(RulesetMeta {
        properties: r.list(2, Value::into_meta_prop)?,
        span: r.span,
    }))
}

fn meta_property(r: &Reduction, key: Keyword, value: MetaValue) -> Reduced {
    Ok(Value::MetaProp(MetaProperty {
        key,
        value,
        span: r.span,
    }))
}

/// The key as written, renamed to its canonical form
fn canonical_key(r: &mut Reduction, canonical: &str) -> ParseResult<Keyword> {
    let mut key = r.keyword(0)?;
    key.value = canonical.to_string();
    Ok(key)
}

pub(super) fn meta_expr(r: &mut Reduction) -> Reduced {
    let key = r.keyword(0)?;
    let value = MetaValue::Expr(r.expr(1)?);
    meta_property(r, key, value)
}

pub(super) fn meta_key(r: &mut Reduction) -> Reduced {
    let key = canonical_key(r, "keys")?;
    let value = MetaValue::Key {
        name: r.keyword(1)?,
        value: r.expr(2)?,
    };
    meta_property(r, key, value)
}

pub(super) fn meta_logging(r: &mut Reduction) -> Reduced {
    let key = r.keyword(0)?;
    let switch = r.token(1)?;
    let on = switch.token.symbol() == Some("on");
    let value = MetaValue::Expr(Spanned::new(ExprKind::Boolean(on), switch.span()));
    meta_property(r, key, value)
}

pub(super) fn meta_use(r: &mut Reduction) -> Reduced {
    let key = r.keyword(0)?;
    let value = MetaValue::Use {
        kind: r.keyword(1)?,
        rid: r.ruleset_id(2)?,
        version: r.opt(3, Value::into_expr)?,
        alias: r.opt(4, Value::into_ident)?,
        with: r.opt(5, Value::into_stmts)?,
    };
    meta_property(r, key, value)
}

pub(super) fn meta_errors(r: &mut Reduction) -> Reduced {
    let key = r.keyword(0)?;
    let value = MetaValue::Errors {
        rid: r.ruleset_id(2)?,
        version: r.opt(3, Value::into_expr)?,
    };
    meta_property(r, key, value)
}

pub(super) fn meta_provides(r: &mut Reduction) -> Reduced {
    let key = canonical_key(r, "provides")?;
    let value = MetaValue::Provides {
        operator: None,
        ids: r.list(1, Value::into_identifier)?,
        rulesets: Vec::new(),
    };
    meta_property(r, key, value)
}

pub(super) fn meta_provides_keys(r: &mut Reduction) -> Reduced {
    let key = canonical_key(r, "provides")?;
    let value = MetaValue::Provides {
        operator: Some(r.keyword(1)?),
        ids: r.list(2, Value::into_identifier)?,
        rulesets: r.list(4, Value::into_ruleset_id)?,
    };
    meta_property(r, key, value)
}

pub(super) fn meta_shares(r: &mut Reduction) -> Reduced {
    let key = canonical_key(r, "shares")?;
    let value = MetaValue::Shares {
        ids: r.list(1, Value::into_identifier)?,
    };
    meta_property(r, key, value)
}

pub(super) fn meta_configure(r: &mut Reduction) -> Reduced {
    let key = r.keyword(0)?;
    let value = MetaValue::Configure {
        declarations: r.list(2, Value::into_stmt)?,
    };
    meta_property(r, key, value)
}

pub(super) fn version(r: &mut Reduction) -> Reduced {
    let tok = r.token(1)?;
    string_literal(tok).map(Value::Expr)
}

// ----------------------------------------------------------------------------
// Rules
// ----------------------------------------------------------------------------

pub(super) fn rule(r: &mut Reduction) -> Reduced {
    Ok(Value::Rule(Rule {
        name: r.ident(1)?,
        rule_state: r.rule_state(2)?,
        select: r.opt(4, Value::into_select)?,
        foreach: r.list(5, Value::into_foreach)?,
        prelude: r.list(6, Value::into_stmt)?,
        action_block: r.opt(7, Value::into_action_block)?,
        postlude: r.opt(8, Value::into_postlude)?,
        span: r.span,
    }))
}

pub(super) fn rule_active(_: &mut Reduction) -> Reduced {
    Ok(Value::RuleState(RuleState::Active))
}

pub(super) fn rule_inactive(_: &mut Reduction) -> Reduced {
    Ok(Value::RuleState(RuleState::Inactive))
}

pub(super) fn rule_select(r: &mut Reduction) -> Reduced {
    Ok(Value::Select(RuleSelect {
        event: r.event(2)?,
        within: r.opt(3, Value::into_within)?,
        span: r.span,
    }))
}

pub(super) fn within(r: &mut Reduction) -> Reduced {
    Ok(Value::Within(EventWithin {
        expression: r.expr(1)?,
        time_period: r.text(2)?,
        span: r.span,
    }))
}

pub(super) fn time_period(r: &mut Reduction) -> Reduced {
    r.word(0).map(Value::Text)
}

pub(super) fn foreach(r: &mut Reduction) -> Reduced {
    Ok(Value::ForEach(RuleForEach {
        expression: r.expr(1)?,
        setting: r.list(4, Value::into_identifier)?,
        span: r.span,
    }))
}

fn postlude(
    r: &mut Reduction,
    fired: Option<usize>,
    notfired: Option<usize>,
    always: Option<usize>,
) -> Reduced {
    let mut body = |at: Option<usize>| -> ParseResult<Option<Vec<Stmt>>> {
        at.map(|i| r.list(i, Value::into_stmt)).transpose()
    };
    let fired = body(fired)?;
    let notfired = body(notfired)?;
    let always = body(always)?;
    Ok(Value::Postlude(RulePostlude {
        fired,
        notfired,
        always,
        span: r.span,
    }))
}

/// Whether the postlude opens with `fired` (rather than `notfired`)
fn opens_fired(r: &mut Reduction) -> ParseResult<bool> {
    Ok(r.word(0)? == "fired")
}

pub(super) fn postlude_always(r: &mut Reduction) -> Reduced {
    postlude(r, None, None, Some(1))
}

pub(super) fn postlude_phase(r: &mut Reduction) -> Reduced {
    if opens_fired(r)? {
        postlude(r, Some(1), None, None)
    } else {
        postlude(r, None, Some(1), None)
    }
}

pub(super) fn postlude_phase_else(r: &mut Reduction) -> Reduced {
    if opens_fired(r)? {
        postlude(r, Some(1), Some(3), None)
    } else {
        postlude(r, Some(3), Some(1), None)
    }
}

pub(super) fn postlude_phase_finally(r: &mut Reduction) -> Reduced {
    if opens_fired(r)? {
        postlude(r, Some(1), None, Some(3))
    } else {
        postlude(r, None, Some(1), Some(3))
    }
}

pub(super) fn postlude_phase_else_finally(r: &mut Reduction) -> Reduced {
    if opens_fired(r)? {
        postlude(r, Some(1), Some(3), Some(5))
    } else {
        postlude(r, Some(3), Some(1), Some(5))
    }
}

// ----------------------------------------------------------------------------
// Statements
// ----------------------------------------------------------------------------

pub(super) fn statement_expression(r: &mut Reduction) -> Reduced {
    let e = r.expr(0)?;
    let span = e.span;
    stmt(StmtKind::Expression(e), span)
}

pub(super) fn declaration(r: &mut Reduction) -> Reduced {
    let kind = StmtKind::Declaration {
        left: r.expr(0)?,
        right: r.expr(2)?,
    };
    stmt(kind, r.span)
}

/// `with` bindings may use any word on the left, `and` included
pub(super) fn with_declaration(r: &mut Reduction) -> Reduced {
    let kind = StmtKind::Declaration {
        left: r.ident(0)?.into_expr(),
        right: r.expr(2)?,
    };
    stmt(kind, r.span)
}

pub(super) fn defaction(r: &mut Reduction) -> Reduced {
    let def = DefAction {
        id: r.ident(0)?,
        params: r.parameters(4)?,
        body: r.list(7, Value::into_stmt)?,
        action_block: r.action_block(8)?,
        returns: r.list(9, Value::into_expr)?,
    };
    stmt(StmtKind::DefAction(def), r.span)
}

pub(super) fn persistent_assign(r: &mut Reduction) -> Reduced {
    let kind = StmtKind::PersistentVariableAssignment {
        left: domain_expr(r.token(0)?)?,
        path_expression: None,
        right: r.expr(2)?,
    };
    stmt(kind, r.span)
}

pub(super) fn persistent_assign_path(r: &mut Reduction) -> Reduced {
    let kind = StmtKind::PersistentVariableAssignment {
        left: domain_expr(r.token(0)?)?,
        path_expression: Some(r.expr(2)?),
        right: r.expr(5)?,
    };
    stmt(kind, r.span)
}

pub(super) fn clear(r: &mut Reduction) -> Reduced {
    let kind = StmtKind::ClearPersistentVariable {
        variable: domain_expr(r.token(1)?)?,
    };
    stmt(kind, r.span)
}

pub(super) fn raise(r: &mut Reduction) -> Reduced {
    let kind = StmtKind::RaiseEvent {
        event_domain: r.ident(1)?,
        event_type: r.expr(3)?,
        for_rid: r.opt(4, Value::into_expr)?,
        event_attrs: r.opt(5, Value::into_expr)?,
    };
    stmt(kind, r.span)
}

fn schedule(r: &mut Reduction, timing: fn(Expr) -> ScheduleTiming) -> Reduced {
    let kind = StmtKind::ScheduleEvent {
        event_domain: r.ident(1)?,
        event_type: r.expr(3)?,
        timing: timing(r.expr(5)?),
        event_attrs: r.opt(6, Value::into_expr)?,
        setting: r.opt(7, Value::into_ident)?,
    };
    stmt(kind, r.span)
}

pub(super) fn schedule_at(r: &mut Reduction) -> Reduced {
    schedule(r, ScheduleTiming::At)
}

pub(super) fn schedule_repeat(r: &mut Reduction) -> Reduced {
    schedule(r, ScheduleTiming::Repeat)
}

pub(super) fn log_statement(r: &mut Reduction) -> Reduced {
    let kind = StmtKind::Log {
        level: r.log_level(1)?,
        expression: r.expr(2)?,
    };
    stmt(kind, r.span)
}

pub(super) fn error_statement(r: &mut Reduction) -> Reduced {
    let kind = StmtKind::Error {
        level: r.log_level(1)?,
        expression: r.expr(2)?,
    };
    stmt(kind, r.span)
}

pub(super) fn log_level(r: &mut Reduction) -> Reduced {
    let word = r.word(0)?;
    LogLevel::from_word(&word)
        .map(Value::LogLevel)
        .ok_or_else(|| ParseError::internal(format!("unknown log level `{}`", word)))
}

pub(super) fn last(r: &mut Reduction) -> Reduced {
    stmt(StmtKind::Last, r.span)
}

pub(super) fn guard_on_final(r: &mut Reduction) -> Reduced {
    let kind = StmtKind::Guard {
        condition: GuardCondition::OnFinal,
        statement: Box::new(r.stmt(0)?),
    };
    stmt(kind, r.span)
}

pub(super) fn guard_if(r: &mut Reduction) -> Reduced {
    let kind = StmtKind::Guard {
        condition: GuardCondition::If(r.expr(2)?),
        statement: Box::new(r.stmt(0)?),
    };
    stmt(kind, r.span)
}

// ----------------------------------------------------------------------------
// Actions
// ----------------------------------------------------------------------------

fn block(r: &mut Reduction, condition: Option<Expr>, set: usize) -> Reduced {
    let set = r.action_set(set)?;
    Ok(Value::ActionBlock(ActionBlock {
        condition,
        block_type: set.block_type,
        discriminant: set.discriminant,
        actions: set.actions,
        span: r.span,
    }))
}

pub(super) fn action_block(r: &mut Reduction) -> Reduced {
    block(r, None, 0)
}

pub(super) fn action_block_if(r: &mut Reduction) -> Reduced {
    let condition = r.expr(1)?;
    block(r, Some(condition), 3)
}

pub(super) fn action_set_single(r: &mut Reduction) -> Reduced {
    Ok(Value::ActionSet(ActionSet {
        block_type: BlockType::Every,
        discriminant: None,
        actions: vec![r.action(0)?],
    }))
}

fn action_list(r: &mut Reduction, block_type: BlockType) -> Reduced {
    Ok(Value::ActionSet(ActionSet {
        block_type,
        discriminant: None,
        actions: r.list(2, Value::into_action)?,
    }))
}

pub(super) fn action_set_every(r: &mut Reduction) -> Reduced {
    action_list(r, BlockType::Every)
}

pub(super) fn action_set_sample(r: &mut Reduction) -> Reduced {
    action_list(r, BlockType::Sample)
}

pub(super) fn action_set_choose(r: &mut Reduction) -> Reduced {
    Ok(Value::ActionSet(ActionSet {
        block_type: BlockType::Choose,
        discriminant: Some(r.expr(1)?),
        actions: r.list(3, Value::into_action)?,
    }))
}

pub(super) fn action(r: &mut Reduction) -> Reduced {
    Ok(Value::Action(Action {
        label: None,
        action: r.expr(0)?,
        args: r.arguments(1)?,
        setting: r.list(2, Value::into_identifier)?,
        span: r.span,
    }))
}

pub(super) fn action_labeled(r: &mut Reduction) -> Reduced {
    let mut action = r.action(2)?;
    action.label = Some(r.ident(0)?);
    action.span = r.span;
    Ok(Value::Action(action))
}

// ----------------------------------------------------------------------------
// Events
// ----------------------------------------------------------------------------

fn event_op(word: &str) -> ParseResult<EventOp> {
    EventOp::from_word(word)
        .ok_or_else(|| ParseError::internal(format!("unknown event operator `{}`", word)))
}

pub(super) fn event_infix(r: &mut Reduction) -> Reduced {
    let op = event_op(&r.word(1)?)?;
    let args = vec![r.event(0)?, r.event(2)?];
    event(EventKind::Operator { op, args }, r.span)
}

pub(super) fn event_between(r: &mut Reduction) -> Reduced {
    let args = vec![r.event(0)?, r.event(3)?, r.event(5)?];
    let op = EventOp::Between;
    event(EventKind::Operator { op, args }, r.span)
}

pub(super) fn event_not_between(r: &mut Reduction) -> Reduced {
    let args = vec![r.event(0)?, r.event(4)?, r.event(6)?];
    let op = EventOp::NotBetween;
    event(EventKind::Operator { op, args }, r.span)
}

pub(super) fn event_prefix(r: &mut Reduction) -> Reduced {
    let op = event_op(&r.word(0)?)?;
    let args = r.list(2, Value::into_event)?;
    event(EventKind::Operator { op, args }, r.span)
}

pub(super) fn event_any(r: &mut Reduction) -> Reduced {
    let count = number_literal(r.token(1)?)?;
    let args = r.list(3, Value::into_event)?;
    event(EventKind::Any { count, args }, r.span)
}

pub(super) fn event_expression(r: &mut Reduction) -> Reduced {
    let ee = EventExpression {
        event_domain: r.ident(0)?,
        event_type: r.ident(1)?,
        event_attrs: r.list(2, Value::into_attr)?,
        where_clause: r.opt(3, Value::into_expr)?,
        setting: r.list(4, Value::into_identifier)?,
        aggregator: None,
    };
    event(EventKind::Expression(ee), r.span)
}

pub(super) fn attribute_match(r: &mut Reduction) -> Reduced {
    Ok(Value::Attr(AttributeMatch {
        key: r.ident(0)?,
        value: regexp_literal(r.token(1)?)?,
        span: r.span,
    }))
}

pub(super) fn event_group(r: &mut Reduction) -> Reduced {
    let op = match r.word(0)?.as_str() {
        "count" => GroupOp::Count,
        _ => GroupOp::Repeat,
    };
    let n = number_literal(r.token(1)?)?;
    let mut inner = r.event(3)?;
    if let Some(agg) = r.opt(5, Value::into_aggregator)? {
        inner.span = inner.span.merge(agg.span);
        match &mut inner.node {
            EventKind::Expression(ee) => ee.aggregator = Some(agg),
            _ => return Err(ParseError::internal("aggregator on a non-base event")),
        }
    }
    let kind = EventKind::Group {
        op,
        n,
        event: Box::new(inner),
    };
    event(kind, r.span)
}

pub(super) fn aggregator(r: &mut Reduction) -> Reduced {
    let word = r.word(0)?;
    let op = AggregateOp::from_word(&word)
        .ok_or_else(|| ParseError::internal(format!("unknown aggregator `{}`", word)))?;
    Ok(Value::Aggregator(EventAggregator {
        op,
        args: r.list(2, Value::into_identifier)?,
        span: r.span,
    }))
}

// ----------------------------------------------------------------------------
// Expressions
// ----------------------------------------------------------------------------

pub(super) fn conditional(r: &mut Reduction) -> Reduced {
    let kind = ExprKind::Conditional {
        test: Box::new(r.expr(0)?),
        consequent: Box::new(r.expr(2)?),
        alternate: Box::new(r.expr(4)?),
    };
    expr(kind, r.span)
}

pub(super) fn infix(r: &mut Reduction) -> Reduced {
    let word = r.word(1)?;
    let op = InfixOp::from_symbol(&word)
        .ok_or_else(|| ParseError::internal(format!("unknown operator `{}`", word)))?;
    let kind = ExprKind::Infix {
        op,
        left: Box::new(r.expr(0)?),
        right: Box::new(r.expr(2)?),
    };
    expr(kind, r.span)
}

pub(super) fn unary(r: &mut Reduction) -> Reduced {
    let word = r.word(0)?;
    let op = UnaryOp::from_symbol(&word)
        .ok_or_else(|| ParseError::internal(format!("unknown operator `{}`", word)))?;
    let kind = ExprKind::Unary {
        op,
        arg: Box::new(r.expr(1)?),
    };
    expr(kind, r.span)
}

fn member(r: &mut Reduction, property: Expr, method: MemberMethod) -> Reduced {
    let kind = ExprKind::Member {
        object: Box::new(r.expr(0)?),
        property: Box::new(property),
        method,
    };
    expr(kind, r.span)
}

pub(super) fn member_dot(r: &mut Reduction) -> Reduced {
    let property = r.ident(2)?.into_expr();
    member(r, property, MemberMethod::Dot)
}

pub(super) fn member_index(r: &mut Reduction) -> Reduced {
    let property = r.expr(2)?;
    member(r, property, MemberMethod::Index)
}

pub(super) fn member_path(r: &mut Reduction) -> Reduced {
    let property = r.expr(2)?;
    member(r, property, MemberMethod::Path)
}

pub(super) fn application(r: &mut Reduction) -> Reduced {
    let kind = ExprKind::Application {
        callee: Box::new(r.expr(0)?),
        args: r.arguments(1)?,
    };
    expr(kind, r.span)
}

pub(super) fn arguments(r: &mut Reduction) -> Reduced {
    Ok(Value::Arguments(Arguments {
        args: r.list(1, Value::into_argument)?,
        span: r.span,
    }))
}

pub(super) fn argument_positional(r: &mut Reduction) -> Reduced {
    Ok(Value::Argument(Argument::Positional(r.expr(0)?)))
}

pub(super) fn argument_named(r: &mut Reduction) -> Reduced {
    Ok(Value::Argument(Argument::Named(NamedArgument {
        id: r.ident(0)?,
        value: r.expr(2)?,
        span: r.span,
    })))
}

pub(super) fn function(r: &mut Reduction) -> Reduced {
    let kind = ExprKind::Function {
        params: r.parameters(2)?,
        body: r.list(5, Value::into_stmt)?,
    };
    expr(kind, r.span)
}

pub(super) fn parameters_empty(r: &mut Reduction) -> Reduced {
    Ok(Value::Parameters(Parameters {
        params: Vec::new(),
        span: r.span,
    }))
}

pub(super) fn parameters(r: &mut Reduction) -> Reduced {
    Ok(Value::Parameters(Parameters {
        params: r.list(0, Value::into_param)?,
        span: r.span,
    }))
}

pub(super) fn parameter(r: &mut Reduction) -> Reduced {
    Ok(Value::Param(Parameter {
        id: r.ident(0)?,
        default: None,
        span: r.span,
    }))
}

pub(super) fn parameter_default(r: &mut Reduction) -> Reduced {
    Ok(Value::Param(Parameter {
        id: r.ident(0)?,
        default: Some(r.expr(2)?),
        span: r.span,
    }))
}

// ----------------------------------------------------------------------------
// Literals
// ----------------------------------------------------------------------------

pub(super) fn identifier(r: &mut Reduction) -> Reduced {
    r.ident(0).map(|id| Value::Expr(id.into_expr()))
}

fn domain_expr(tok: SpannedToken) -> ParseResult<Expr> {
    let span = tok.span();
    match tok.token {
        Token::DomainIdent(d) => Ok(Spanned::new(
            ExprKind::DomainIdentifier {
                domain: d.domain,
                value: d.name,
            },
            span,
        )),
        _ => Err(unexpected(&tok, "a domain identifier")),
    }
}

pub(super) fn domain_identifier(r: &mut Reduction) -> Reduced {
    domain_expr(r.token(0)?).map(Value::Expr)
}

fn number_literal(tok: SpannedToken) -> ParseResult<Expr> {
    match tok.token {
        Token::Number(n) => Ok(Spanned::new(ExprKind::Number(n), tok.span())),
        _ => Err(unexpected(&tok, "a number")),
    }
}

fn string_literal(tok: SpannedToken) -> ParseResult<Expr> {
    let span = tok.span();
    match tok.token {
        Token::Str(s) => Ok(Spanned::new(ExprKind::String(s), span)),
        _ => Err(unexpected(&tok, "a string")),
    }
}

fn regexp_literal(tok: SpannedToken) -> ParseResult<Expr> {
    let span = tok.span();
    match tok.token {
        Token::RegExp(re) => Ok(Spanned::new(
            ExprKind::RegExp {
                pattern: re.pattern,
                flags: re.flags,
            },
            span,
        )),
        _ => Err(unexpected(&tok, "a regular expression")),
    }
}

pub(super) fn number(r: &mut Reduction) -> Reduced {
    number_literal(r.token(0)?).map(Value::Expr)
}

pub(super) fn string(r: &mut Reduction) -> Reduced {
    string_literal(r.token(0)?).map(Value::Expr)
}

pub(super) fn regexp(r: &mut Reduction) -> Reduced {
    regexp_literal(r.token(0)?).map(Value::Expr)
}

pub(super) fn boolean(r: &mut Reduction) -> Reduced {
    let value = r.word(0)? == "true";
    expr(ExprKind::Boolean(value), r.span)
}

/// Text parts become strings; each interpolation is parsed as an expression
/// on its own, reporting a premature end at its closing brace.
pub(super) fn chevron(r: &mut Reduction) -> Reduced {
    let tok = r.token(0)?;
    let parts = match tok.token {
        Token::Chevron(parts) => parts,
        _ => return Err(unexpected(&tok, "a chevron")),
    };
    let mut values = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            ChevronPart::Text { value, start, end } => {
                values.push(Spanned::new(ExprKind::String(value), Span::new(start, end)));
            }
            ChevronPart::Interpolation { tokens, close, .. } => {
                let input = Input::new(tokens, close, Some(close));
                values.push(engine::run(&GRAMMAR, Nt::Expression, input)?.into_expr()?);
            }
        }
    }
    expr(ExprKind::Chevron(values), r.span)
}

pub(super) fn array_empty(r: &mut Reduction) -> Reduced {
    expr(ExprKind::Array(Vec::new()), r.span)
}

pub(super) fn array(r: &mut Reduction) -> Reduced {
    let items = r.list(1, Value::into_expr)?;
    expr(ExprKind::Array(items), r.span)
}

pub(super) fn map_empty(r: &mut Reduction) -> Reduced {
    expr(ExprKind::Map(Vec::new()), r.span)
}

pub(super) fn map(r: &mut Reduction) -> Reduced {
    let pairs = r.list(1, Value::into_map_pair)?;
    expr(ExprKind::Map(pairs), r.span)
}

pub(super) fn map_pair(r: &mut Reduction) -> Reduced {
    Ok(Value::MapPair(MapKeyValuePair {
        key: string_literal(r.token(0)?)?,
        value: r.expr(2)?,
        span: r.span,
    }))
}
