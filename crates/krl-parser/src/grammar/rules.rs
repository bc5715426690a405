//! The KRL productions
//!
//! Binary operators are layered by precedence, loosest first, with left
//! recursion for left associativity. Optional parts are nullable
//! nonterminals whose empty production reduces to nothing.

use super::reduce::*;
use super::{contiguous, not_group_aggregator, Grammar, Nt, Reducer, Symbol, Term};

const fn n(nt: Nt) -> Symbol {
    Symbol::N(nt)
}

const fn p(text: &'static str) -> Symbol {
    Symbol::T(Term::Punct(text))
}

const fn w(word: &'static str) -> Symbol {
    Symbol::T(Term::Word(word))
}

const IDENT: Symbol = Symbol::T(Term::Ident);
const SYMBOL: Symbol = Symbol::T(Term::Symbol);
const NUMBER: Symbol = Symbol::T(Term::Number);
const STRING: Symbol = Symbol::T(Term::Str);
const REGEXP: Symbol = Symbol::T(Term::RegExp);
const CHEVRON: Symbol = Symbol::T(Term::Chevron);
const DOMAIN: Symbol = Symbol::T(Term::DomainIdent);
const PERSISTENT: Symbol = Symbol::T(Term::Persistent);

const TIME_PERIODS: &[&str] = &[
    "years", "year", "months", "month", "weeks", "week", "days", "day", "hours", "hour",
    "minutes", "minute", "seconds", "second",
];

pub(super) fn define(g: &mut Grammar) {
    use Nt::*;

    g.rule(Main, &[n(Ruleset)], program_ruleset);
    g.rule(Main, &[n(StatementList)], program_statements);

    // ------------------------------------------------------------------
    // Ruleset and meta
    // ------------------------------------------------------------------
    g.rule(
        Ruleset,
        &[w("ruleset"), n(RulesetId), p("{"), n(MetaOpt), n(GlobalOpt), n(Rules), p("}")],
        ruleset,
    );
    g.guarded(RulesetId, &[n(RidParts)], ruleset_id, contiguous);
    g.rule(RidParts, &[SYMBOL], rid_start);
    g.rule(RidParts, &[n(RidParts), p("."), SYMBOL], rid_join);
    g.rule(RidParts, &[n(RidParts), p("-"), SYMBOL], rid_join);

    g.rule(MetaOpt, &[], nothing);
    g.rule(MetaOpt, &[n(Meta)], first);
    g.rule(Meta, &[w("meta"), p("{"), n(MetaProps), p("}")], meta);
    g.rule(MetaProps, &[], list_empty);
    g.rule(MetaProps, &[n(MetaProps), n(MetaProp)], list_push_next);

    for key in ["name", "description", "author"] {
        g.rule(MetaProp, &[w(key), n(MetaText)], meta_expr);
    }
    g.rule(MetaText, &[STRING], string);
    g.rule(MetaText, &[CHEVRON], chevron);
    g.rule(MetaProp, &[w("keys"), SYMBOL, n(Expression)], meta_key);
    g.rule(MetaProp, &[w("key"), SYMBOL, n(Expression)], meta_key);
    g.rule(MetaProp, &[w("logging"), w("on")], meta_logging);
    g.rule(MetaProp, &[w("logging"), w("off")], meta_logging);
    g.rule(
        MetaProp,
        &[w("use"), w("module"), n(RulesetId), n(VersionOpt), n(AliasOpt), n(WithOpt)],
        meta_use,
    );
    g.rule(
        MetaProp,
        &[w("errors"), w("to"), n(RulesetId), n(VersionOpt)],
        meta_errors,
    );
    for key in ["provides", "provide"] {
        g.rule(MetaProp, &[w(key), n(IdList)], meta_provides);
        g.rule(
            MetaProp,
            &[w(key), w("keys"), n(IdList), w("to"), n(RidList)],
            meta_provides_keys,
        );
    }
    for key in ["shares", "share"] {
        g.rule(MetaProp, &[w(key), n(IdList)], meta_shares);
    }
    g.rule(
        MetaProp,
        &[w("configure"), w("using"), n(ConfigDecls)],
        meta_configure,
    );

    g.rule(VersionOpt, &[], nothing);
    g.rule(VersionOpt, &[w("version"), STRING], version);
    g.rule(AliasOpt, &[], nothing);
    g.rule(AliasOpt, &[w("alias"), IDENT], ident_second);
    g.rule(WithOpt, &[], nothing);
    g.rule(WithOpt, &[w("with"), n(WithSpaced)], second);
    g.rule(WithOpt, &[w("with"), n(WithAnded)], second);
    g.rule(WithSpaced, &[n(WithDecl)], list_first);
    g.rule(WithSpaced, &[n(WithSpaced), n(WithDecl)], list_push_next);
    g.rule(WithAnded, &[n(WithDecl), w("and"), n(WithDecl)], list_pair);
    g.rule(WithAnded, &[n(WithAnded), w("and"), n(WithDecl)], list_push_sep);
    g.rule(WithDecl, &[SYMBOL, p("="), n(Expression)], with_declaration);
    g.rule(ConfigDecls, &[n(Declaration)], list_first);
    g.rule(ConfigDecls, &[n(ConfigDecls), n(Declaration)], list_push_next);

    g.rule(IdList, &[IDENT], list_first);
    g.rule(IdList, &[n(IdList), p(","), IDENT], list_push_sep);
    g.rule(RidList, &[n(RulesetId)], list_first);
    g.rule(RidList, &[n(RidList), p(","), n(RulesetId)], list_push_sep);

    g.rule(GlobalOpt, &[], nothing);
    g.rule(GlobalOpt, &[w("global"), p("{"), n(DeclList), p("}")], third);

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------
    g.rule(DeclList, &[], list_empty);
    g.rule(DeclList, &[n(DeclList), n(DeclItem)], list_push_next);
    g.rule(DeclItem, &[n(DeclOrDef)], first);
    g.rule(DeclItem, &[n(DeclOrDef), p(";")], first);
    g.rule(DeclOrDef, &[n(Declaration)], first);
    g.rule(DeclOrDef, &[n(DefAction)], first);

    g.rule(Declaration, &[n(DeclLhs), p("="), n(Expression)], declaration);
    g.rule(DeclLhs, &[IDENT], identifier);
    g.rule(DeclLhs, &[DOMAIN], domain_identifier);
    g.rule(DeclLhs, &[n(DeclLhs), p("."), IDENT], member_dot);
    g.rule(DeclLhs, &[n(DeclLhs), p("["), n(Expression), p("]")], member_index);
    g.rule(DeclLhs, &[n(DeclLhs), p("{"), n(Expression), p("}")], member_path);

    g.rule(
        DefAction,
        &[
            IDENT,
            p("="),
            w("defaction"),
            p("("),
            n(Params),
            p(")"),
            p("{"),
            n(PlainDecls),
            n(ActionBlock),
            n(ReturnsOpt),
            p("}"),
        ],
        defaction,
    );
    g.rule(PlainDecls, &[], list_empty);
    g.rule(PlainDecls, &[n(PlainDecls), n(PlainDeclItem)], list_push_next);
    g.rule(PlainDeclItem, &[n(Declaration)], first);
    g.rule(PlainDeclItem, &[n(Declaration), p(";")], first);
    g.rule(ReturnsOpt, &[], nothing);
    g.rule(ReturnsOpt, &[w("return"), n(ExprList)], second);
    g.rule(ReturnsOpt, &[w("returns"), n(ExprList)], second);
    g.rule(ExprList, &[n(Expression)], list_first);
    g.rule(ExprList, &[n(ExprList), p(","), n(Expression)], list_push_sep);

    // ------------------------------------------------------------------
    // Rules
    // ------------------------------------------------------------------
    g.rule(Rules, &[], list_empty);
    g.rule(Rules, &[n(Rules), n(Rule)], list_push_next);
    g.rule(
        Rule,
        &[
            w("rule"),
            IDENT,
            n(RuleStateOpt),
            p("{"),
            n(SelectOpt),
            n(ForEachs),
            n(PreludeOpt),
            n(ActionBlockOpt),
            n(PostludeOpt),
            p("}"),
        ],
        rule,
    );
    g.rule(RuleStateOpt, &[], rule_active);
    g.rule(RuleStateOpt, &[w("is"), w("active")], rule_active);
    g.rule(RuleStateOpt, &[w("is"), w("inactive")], rule_inactive);

    g.rule(SelectOpt, &[], nothing);
    g.rule(SelectOpt, &[n(RuleSelect)], first);
    g.rule(
        RuleSelect,
        &[w("select"), w("when"), n(EventOr), n(WithinOpt)],
        rule_select,
    );
    g.rule(WithinOpt, &[], nothing);
    g.rule(
        WithinOpt,
        &[w("within"), n(Expression), n(TimePeriod)],
        within,
    );
    for &period in TIME_PERIODS {
        g.rule(TimePeriod, &[w(period)], time_period);
    }

    g.rule(ForEachs, &[], list_empty);
    g.rule(ForEachs, &[n(ForEachs), n(ForEach)], list_push_next);
    g.rule(
        ForEach,
        &[w("foreach"), n(Expression), w("setting"), p("("), n(IdList), p(")")],
        foreach,
    );

    g.rule(PreludeOpt, &[], nothing);
    g.rule(PreludeOpt, &[w("pre"), p("{"), n(DeclList), p("}")], third);
    g.rule(ActionBlockOpt, &[], nothing);
    g.rule(ActionBlockOpt, &[n(ActionBlock)], first);
    g.rule(PostludeOpt, &[], nothing);
    g.rule(PostludeOpt, &[n(Postlude)], first);

    // ------------------------------------------------------------------
    // Postlude
    // ------------------------------------------------------------------
    g.rule(Postlude, &[w("always"), n(PostBody)], postlude_always);
    for phase in ["fired", "notfired"] {
        g.rule(Postlude, &[w(phase), n(PostBody)], postlude_phase);
        g.rule(
            Postlude,
            &[w(phase), n(PostBody), w("else"), n(PostBody)],
            postlude_phase_else,
        );
        g.rule(
            Postlude,
            &[w(phase), n(PostBody), w("finally"), n(PostBody)],
            postlude_phase_finally,
        );
        g.rule(
            Postlude,
            &[
                w(phase),
                n(PostBody),
                w("else"),
                n(PostBody),
                w("finally"),
                n(PostBody),
            ],
            postlude_phase_else_finally,
        );
    }
    g.rule(PostBody, &[p("{"), n(PostStmts), p("}")], second);
    g.rule(PostStmts, &[], list_empty);
    g.rule(PostStmts, &[n(PostSeq)], first);
    g.rule(PostStmts, &[n(PostSeq), p(";")], first);
    g.rule(PostSeq, &[n(PostStmt)], list_first);
    g.rule(PostSeq, &[n(PostSeq), p(";"), n(PostStmt)], list_push_sep);
    g.rule(PostStmt, &[n(PostCore)], first);
    g.rule(PostStmt, &[n(PostCore), w("on"), w("final")], guard_on_final);
    g.rule(PostStmt, &[n(PostCore), w("if"), n(Expression)], guard_if);

    g.rule(PostCore, &[n(Statement)], first);
    g.rule(PostCore, &[n(PersistentAssign)], first);
    g.rule(PostCore, &[n(ClearStmt)], first);
    g.rule(PostCore, &[n(RaiseStmt)], first);
    g.rule(PostCore, &[n(ScheduleStmt)], first);
    g.rule(PostCore, &[n(LogStmt)], first);
    g.rule(PostCore, &[n(ErrorStmt)], first);
    g.rule(PostCore, &[w("last")], last);

    g.rule(
        PersistentAssign,
        &[PERSISTENT, p(":="), n(Expression)],
        persistent_assign,
    );
    g.rule(
        PersistentAssign,
        &[PERSISTENT, p("{"), n(Expression), p("}"), p(":="), n(Expression)],
        persistent_assign_path,
    );
    g.rule(ClearStmt, &[w("clear"), PERSISTENT], clear);
    g.rule(
        RaiseStmt,
        &[
            w("raise"),
            IDENT,
            w("event"),
            n(Expression),
            n(ForOpt),
            n(AttributesOpt),
        ],
        raise,
    );
    g.rule(ForOpt, &[], nothing);
    g.rule(ForOpt, &[w("for"), n(Expression)], second);
    g.rule(AttributesOpt, &[], nothing);
    g.rule(AttributesOpt, &[w("attributes"), n(Expression)], second);
    for (timing, reducer) in [("at", schedule_at as Reducer), ("repeat", schedule_repeat)] {
        g.rule(
            ScheduleStmt,
            &[
                w("schedule"),
                IDENT,
                w("event"),
                n(Expression),
                w(timing),
                n(Expression),
                n(AttributesOpt),
                n(ScheduleSettingOpt),
            ],
            reducer,
        );
    }
    g.rule(ScheduleSettingOpt, &[], nothing);
    g.rule(
        ScheduleSettingOpt,
        &[w("setting"), p("("), IDENT, p(")")],
        ident_third,
    );
    g.rule(LogStmt, &[w("log"), n(LogLevel), n(Expression)], log_statement);
    g.rule(ErrorStmt, &[w("error"), n(LogLevel), n(Expression)], error_statement);
    for level in ["error", "warn", "info", "debug"] {
        g.rule(LogLevel, &[w(level)], log_level);
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------
    g.rule(ActionBlock, &[n(ActionSet)], action_block);
    g.rule(
        ActionBlock,
        &[w("if"), n(Expression), w("then"), n(ActionSet)],
        action_block_if,
    );
    g.rule(ActionSet, &[n(ActionItem)], action_set_single);
    g.rule(
        ActionSet,
        &[w("every"), p("{"), n(ActionList), p("}")],
        action_set_every,
    );
    g.rule(
        ActionSet,
        &[w("sample"), p("{"), n(ActionList), p("}")],
        action_set_sample,
    );
    g.rule(
        ActionSet,
        &[w("choose"), n(Expression), p("{"), n(ActionList), p("}")],
        action_set_choose,
    );
    g.rule(ActionList, &[n(ActionItem)], list_first);
    g.rule(ActionList, &[n(ActionList), n(ActionItem)], list_push_next);
    g.rule(ActionItem, &[n(Action)], first);
    g.rule(ActionItem, &[n(Action), p(";")], first);
    g.rule(Action, &[n(ActionCore)], first);
    g.rule(Action, &[IDENT, p("=>"), n(ActionCore)], action_labeled);
    g.guarded(
        ActionCore,
        &[n(ActionName), n(Arguments), n(SettingOpt)],
        action,
        not_group_aggregator,
    );
    g.rule(ActionName, &[IDENT], identifier);
    g.rule(ActionName, &[DOMAIN], domain_identifier);
    g.rule(SettingOpt, &[], nothing);
    g.rule(SettingOpt, &[w("setting"), p("("), n(IdList), p(")")], third);

    // ------------------------------------------------------------------
    // Events, loosest first
    // ------------------------------------------------------------------
    g.rule(EventOr, &[n(EventOr), w("or"), n(EventAnd)], event_infix);
    g.rule(EventOr, &[n(EventAnd)], first);
    g.rule(EventAnd, &[n(EventAnd), w("and"), n(EventSeq)], event_infix);
    g.rule(EventAnd, &[n(EventSeq)], first);
    for op in ["before", "then", "after"] {
        g.rule(EventSeq, &[n(EventSeq), w(op), n(EventBetween)], event_infix);
    }
    g.rule(EventSeq, &[n(EventBetween)], first);
    g.rule(
        EventBetween,
        &[
            n(EventPrimary),
            w("between"),
            p("("),
            n(EventOr),
            p(","),
            n(EventOr),
            p(")"),
        ],
        event_between,
    );
    g.rule(
        EventBetween,
        &[
            n(EventPrimary),
            w("not"),
            w("between"),
            p("("),
            n(EventOr),
            p(","),
            n(EventOr),
            p(")"),
        ],
        event_not_between,
    );
    g.rule(EventBetween, &[n(EventPrimary)], first);

    g.rule(EventPrimary, &[n(EventBase)], first);
    g.rule(EventPrimary, &[p("("), n(EventOr), p(")")], second);
    g.rule(EventPrimary, &[n(EventGroup)], first);
    for op in ["or", "and", "before", "then", "after"] {
        g.rule(
            EventPrimary,
            &[w(op), p("("), n(EventList), p(")")],
            event_prefix,
        );
    }
    g.rule(
        EventPrimary,
        &[w("any"), NUMBER, p("("), n(EventList), p(")")],
        event_any,
    );
    g.rule(EventList, &[n(EventOr), p(","), n(EventOr)], list_pair);
    g.rule(EventList, &[n(EventList), p(","), n(EventOr)], list_push_sep);

    g.rule(
        EventBase,
        &[IDENT, IDENT, n(AttrMatches), n(WhereOpt), n(SettingOpt)],
        event_expression,
    );
    g.rule(AttrMatches, &[], list_empty);
    g.rule(AttrMatches, &[n(AttrMatches), n(AttrMatch)], list_push_next);
    g.rule(AttrMatch, &[IDENT, REGEXP], attribute_match);
    g.rule(WhereOpt, &[], nothing);
    g.rule(WhereOpt, &[w("where"), n(Expression)], second);

    for op in ["count", "repeat"] {
        g.rule(
            EventGroup,
            &[w(op), NUMBER, p("("), n(EventBase), p(")"), n(AggregatorOpt)],
            event_group,
        );
    }
    g.rule(AggregatorOpt, &[], nothing);
    g.rule(AggregatorOpt, &[n(Aggregator)], first);
    for op in ["min", "max", "sum", "avg", "push"] {
        g.rule(Aggregator, &[w(op), p("("), n(IdList), p(")")], aggregator);
    }

    // ------------------------------------------------------------------
    // Expressions, loosest first
    // ------------------------------------------------------------------
    g.rule(Expression, &[n(OrExpr)], first);
    g.rule(
        Expression,
        &[n(OrExpr), p("=>"), n(OrExpr), p("|"), n(Expression)],
        conditional,
    );
    g.rule(OrExpr, &[n(OrExpr), p("||"), n(AndExpr)], infix);
    g.rule(OrExpr, &[n(AndExpr)], first);
    g.rule(AndExpr, &[n(AndExpr), p("&&"), n(CmpExpr)], infix);
    g.rule(AndExpr, &[n(CmpExpr)], first);
    for op in ["<", ">", "<=", ">=", "==", "!=", "<=>", "><"] {
        g.rule(CmpExpr, &[n(CmpExpr), p(op), n(AddExpr)], infix);
    }
    for op in ["like", "cmp"] {
        g.rule(CmpExpr, &[n(CmpExpr), w(op), n(AddExpr)], infix);
    }
    g.rule(CmpExpr, &[n(AddExpr)], first);
    for op in ["+", "-"] {
        g.rule(AddExpr, &[n(AddExpr), p(op), n(MulExpr)], infix);
    }
    g.rule(AddExpr, &[n(MulExpr)], first);
    for op in ["*", "/", "%"] {
        g.rule(MulExpr, &[n(MulExpr), p(op), n(Unary)], infix);
    }
    g.rule(MulExpr, &[n(Unary)], first);
    g.rule(Unary, &[w("not"), n(Unary)], unary);
    g.rule(Unary, &[p("-"), n(Unary)], unary);
    g.rule(Unary, &[p("+"), n(Unary)], unary);
    g.rule(Unary, &[n(Postfix)], first);

    g.rule(Postfix, &[n(Primary)], first);
    g.rule(Postfix, &[n(Postfix), p("."), IDENT], member_dot);
    g.rule(Postfix, &[n(Postfix), p("["), n(Expression), p("]")], member_index);
    g.rule(Postfix, &[n(Postfix), p("{"), n(Expression), p("}")], member_path);
    g.rule(Postfix, &[n(Postfix), n(Arguments)], application);

    g.rule(Primary, &[IDENT], identifier);
    g.rule(Primary, &[DOMAIN], domain_identifier);
    g.rule(Primary, &[NUMBER], number);
    g.rule(Primary, &[STRING], string);
    g.rule(Primary, &[REGEXP], regexp);
    g.rule(Primary, &[CHEVRON], chevron);
    g.rule(Primary, &[w("true")], boolean);
    g.rule(Primary, &[w("false")], boolean);
    g.rule(Primary, &[n(ArrayLit)], first);
    g.rule(Primary, &[n(MapLit)], first);
    g.rule(Primary, &[n(Function)], first);
    g.rule(Primary, &[p("("), n(Expression), p(")")], second);

    g.rule(ArrayLit, &[p("["), p("]")], array_empty);
    g.rule(ArrayLit, &[p("["), n(ExprItems), p("]")], array);
    g.rule(ArrayLit, &[p("["), n(ExprItems), p(","), p("]")], array);
    g.rule(ExprItems, &[n(Expression)], list_first);
    g.rule(ExprItems, &[n(ExprItems), p(","), n(Expression)], list_push_sep);
    g.rule(MapLit, &[p("{"), p("}")], map_empty);
    g.rule(MapLit, &[p("{"), n(MapPairs), p("}")], map);
    g.rule(MapLit, &[p("{"), n(MapPairs), p(","), p("}")], map);
    g.rule(MapPairs, &[n(MapPair)], list_first);
    g.rule(MapPairs, &[n(MapPairs), p(","), n(MapPair)], list_push_sep);
    g.rule(MapPair, &[STRING, p(":"), n(Expression)], map_pair);

    g.rule(
        Function,
        &[
            w("function"),
            p("("),
            n(Params),
            p(")"),
            p("{"),
            n(StatementList),
            p("}"),
        ],
        function,
    );
    g.rule(Params, &[], parameters_empty);
    g.rule(Params, &[n(ParamList)], parameters);
    g.rule(Params, &[n(ParamList), p(",")], parameters);
    g.rule(ParamList, &[n(Param)], list_first);
    g.rule(ParamList, &[n(ParamList), p(","), n(Param)], list_push_sep);
    g.rule(Param, &[IDENT], parameter);
    g.rule(Param, &[IDENT, p("="), n(Expression)], parameter_default);

    g.rule(Arguments, &[p("("), n(ArgList), p(")")], arguments);
    g.rule(ArgList, &[], list_empty);
    g.rule(ArgList, &[n(ArgSeq)], first);
    g.rule(ArgList, &[n(ArgSeq), p(",")], first);
    g.rule(ArgSeq, &[n(Arg)], list_first);
    g.rule(ArgSeq, &[n(ArgSeq), p(","), n(Arg)], list_push_sep);
    g.rule(Arg, &[n(Expression)], argument_positional);
    g.rule(Arg, &[IDENT, p("="), n(Expression)], argument_named);

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------
    g.rule(StatementList, &[], list_empty);
    g.rule(StatementList, &[n(StmtSeq)], first);
    g.rule(StatementList, &[n(StmtSeq), p(";")], first);
    g.rule(StmtSeq, &[n(Statement)], list_first);
    g.rule(StmtSeq, &[n(StmtSeq), p(";"), n(Statement)], list_push_sep);
    g.rule(Statement, &[n(Expression)], statement_expression);
    g.rule(Statement, &[n(Declaration)], first);
}
