//! Declarative grammar table
//!
//! The grammar is a flat list of productions over [`Nt`] nonterminals and
//! [`Term`] terminal classes. Each production names a reducer that builds an
//! AST fragment from its children, and may carry a guard that vetoes a
//! completed match by looking at the surrounding tokens. The table is built
//! once per process and shared read-only by every parse.

mod reduce;
mod rules;
pub(crate) mod value;

use crate::error::ParseResult;
use crate::lexer::{SpannedToken, Token};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::LazyLock;
use value::{Reduction, Value};

pub(crate) static GRAMMAR: LazyLock<Grammar> = LazyLock::new(|| Grammar::build(rules::define));

/// Words that never parse as identifiers
const RESERVED: &[&str] = &[
    "ruleset", "meta", "global", "rule", "select", "when", "where", "setting", "within",
    "foreach", "pre", "fired", "notfired", "always", "else", "finally", "if", "then", "every",
    "choose", "sample", "or", "and", "before", "after", "between", "not", "any", "count",
    "repeat", "function", "defaction", "return", "returns", "true", "false", "like", "cmp",
    "last",
];

/// Calls that attach to a preceding event group
const AGGREGATORS: &[&str] = &["min", "max", "sum", "avg", "push"];

pub(crate) fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum Nt {
    Main,
    // ruleset and meta
    Ruleset,
    RulesetId,
    RidParts,
    MetaOpt,
    Meta,
    MetaProps,
    MetaProp,
    MetaText,
    VersionOpt,
    AliasOpt,
    WithOpt,
    WithSpaced,
    WithAnded,
    WithDecl,
    ConfigDecls,
    IdList,
    RidList,
    GlobalOpt,
    // declarations
    DeclList,
    DeclItem,
    DeclOrDef,
    Declaration,
    DeclLhs,
    DefAction,
    PlainDecls,
    PlainDeclItem,
    ReturnsOpt,
    ExprList,
    // rules
    Rules,
    Rule,
    RuleStateOpt,
    SelectOpt,
    RuleSelect,
    WithinOpt,
    TimePeriod,
    ForEachs,
    ForEach,
    PreludeOpt,
    ActionBlockOpt,
    PostludeOpt,
    // postlude
    Postlude,
    PostBody,
    PostStmts,
    PostSeq,
    PostStmt,
    PostCore,
    PersistentAssign,
    ClearStmt,
    RaiseStmt,
    ForOpt,
    AttributesOpt,
    ScheduleStmt,
    ScheduleSettingOpt,
    LogStmt,
    ErrorStmt,
    LogLevel,
    // actions
    ActionBlock,
    ActionSet,
    ActionList,
    ActionItem,
    Action,
    ActionCore,
    ActionName,
    SettingOpt,
    // events
    EventOr,
    EventAnd,
    EventSeq,
    EventBetween,
    EventPrimary,
    EventBase,
    EventList,
    AttrMatches,
    AttrMatch,
    WhereOpt,
    EventGroup,
    AggregatorOpt,
    Aggregator,
    // expressions
    Expression,
    OrExpr,
    AndExpr,
    CmpExpr,
    AddExpr,
    MulExpr,
    Unary,
    Postfix,
    Primary,
    ArrayLit,
    ExprItems,
    MapLit,
    MapPairs,
    MapPair,
    Function,
    Params,
    ParamList,
    Param,
    Arguments,
    ArgList,
    ArgSeq,
    Arg,
    StatementList,
    StmtSeq,
    Statement,
}

/// Class of tokens a terminal position accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Term {
    /// Punctuation or operator with this exact text
    Punct(&'static str),
    /// A symbol with this exact text
    Word(&'static str),
    /// A symbol that is not reserved
    Ident,
    /// Any symbol, reserved or not
    Symbol,
    Number,
    Str,
    RegExp,
    Chevron,
    DomainIdent,
    /// `ent:x` or `app:x`
    Persistent,
}

impl Term {
    pub(crate) fn matches(&self, token: &Token) -> bool {
        match (self, token) {
            (Term::Punct(p), tok) => tok.punct() == Some(*p),
            (Term::Word(w), Token::Symbol(s)) => s == w,
            (Term::Ident, Token::Symbol(s)) => !is_reserved(s),
            (Term::Symbol, Token::Symbol(_)) => true,
            (Term::Number, Token::Number(_)) => true,
            (Term::Str, Token::Str(_)) => true,
            (Term::RegExp, Token::RegExp(_)) => true,
            (Term::Chevron, Token::Chevron(_)) => true,
            (Term::DomainIdent, Token::DomainIdent(_)) => true,
            (Term::Persistent, Token::DomainIdent(d)) => d.domain == "ent" || d.domain == "app",
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Symbol {
    N(Nt),
    T(Term),
}

pub(crate) type Reducer = fn(&mut Reduction) -> ParseResult<Value>;

/// Vetoes a completed match of `tokens[start..end]`
pub(crate) type Guard = fn(&[SpannedToken], usize, usize) -> bool;

pub(crate) struct Production {
    pub lhs: Nt,
    pub rhs: Vec<Symbol>,
    pub reducer: Reducer,
    pub guard: Option<Guard>,
}

pub(crate) struct Grammar {
    productions: Vec<Production>,
    by_lhs: FxHashMap<Nt, Vec<usize>>,
    nullable: FxHashSet<Nt>,
}

impl Grammar {
    /// Collect the productions `define` declares and derive the nullable set
    pub(crate) fn build(define: fn(&mut Grammar)) -> Self {
        let mut g = Self {
            productions: Vec::new(),
            by_lhs: FxHashMap::default(),
            nullable: FxHashSet::default(),
        };
        define(&mut g);
        g.compute_nullable();
        g
    }

    fn add(&mut self, lhs: Nt, rhs: &[Symbol], reducer: Reducer, guard: Option<Guard>) {
        self.by_lhs
            .entry(lhs)
            .or_default()
            .push(self.productions.len());
        self.productions.push(Production {
            lhs,
            rhs: rhs.to_vec(),
            reducer,
            guard,
        });
    }

    pub(crate) fn rule(&mut self, lhs: Nt, rhs: &[Symbol], reducer: Reducer) {
        self.add(lhs, rhs, reducer, None);
    }

    pub(crate) fn guarded(&mut self, lhs: Nt, rhs: &[Symbol], reducer: Reducer, guard: Guard) {
        self.add(lhs, rhs, reducer, Some(guard));
    }

    fn compute_nullable(&mut self) {
        let Grammar {
            productions,
            nullable,
            ..
        } = self;
        loop {
            let mut changed = false;
            for p in productions.iter() {
                if nullable.contains(&p.lhs) {
                    continue;
                }
                let all_nullable = p.rhs.iter().all(|s| match s {
                    Symbol::N(nt) => nullable.contains(nt),
                    Symbol::T(_) => false,
                });
                if all_nullable {
                    nullable.insert(p.lhs);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    pub(crate) fn production(&self, id: usize) -> &Production {
        &self.productions[id]
    }

    pub(crate) fn productions_for(&self, nt: Nt) -> &[usize] {
        self.by_lhs.get(&nt).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn is_nullable(&self, nt: Nt) -> bool {
        self.nullable.contains(&nt)
    }

    pub(crate) fn len(&self) -> usize {
        self.productions.len()
    }
}

// ----------------------------------------------------------------------------
// Guards
// ----------------------------------------------------------------------------

/// Ruleset ids are written without whitespace: `io.picolabs.hello`
fn contiguous(tokens: &[SpannedToken], start: usize, end: usize) -> bool {
    tokens[start..end].windows(2).all(|w| w[0].end == w[1].start)
}

/// An unlabeled action named like an aggregator cannot directly follow a
/// `count|repeat <n> ( ... )` group; that call belongs to the group.
fn not_group_aggregator(tokens: &[SpannedToken], start: usize, _end: usize) -> bool {
    let is_aggregator_name = tokens
        .get(start)
        .and_then(|t| t.token.symbol())
        .is_some_and(|s| AGGREGATORS.contains(&s));
    if !is_aggregator_name || start == 0 || tokens[start - 1].token != Token::RParen {
        return true;
    }

    let mut depth = 0usize;
    let mut k = start - 1;
    loop {
        match tokens[k].token {
            Token::RParen => depth += 1,
            Token::LParen => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
        if k == 0 {
            return true;
        }
        k -= 1;
    }

    let closes_group = k >= 2
        && matches!(tokens[k - 1].token, Token::Number(_))
        && matches!(tokens[k - 2].token.symbol(), Some("count" | "repeat"));
    !closes_group
}
