//! Abstract Syntax Tree for KRL
//!
//! Every node carries the span of the source text it was built from. Nodes
//! that wrap a kind enum use [`Spanned`], the rest hold a `span` field.

use crate::span::{Span, Spanned};
use serde::{Deserialize, Serialize};

/// Result of parsing one source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Program {
    /// `ruleset <rid> { ... }`
    Ruleset(Ruleset),
    /// A bare `;`-separated statement list (expression files, REPL input)
    Statements(Vec<Stmt>),
}

impl Program {
    pub fn as_ruleset(&self) -> Option<&Ruleset> {
        match self {
            Program::Ruleset(rs) => Some(rs),
            Program::Statements(_) => None,
        }
    }

    pub fn statements(&self) -> &[Stmt] {
        match self {
            Program::Ruleset(_) => &[],
            Program::Statements(stmts) => stmts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    pub rid: RulesetId,
    pub meta: Option<RulesetMeta>,
    pub global: Vec<Stmt>,
    pub rules: Vec<Rule>,
    pub span: Span,
}

/// Dotted ruleset identifier such as `io.picolabs.hello-world`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesetId {
    pub value: String,
    pub span: Span,
}

/// A plain name in binding position (rule names, labels, parameters, settings)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub value: String,
    pub span: Span,
}

impl Identifier {
    pub fn into_expr(self) -> Expr {
        Spanned::new(ExprKind::Identifier(self.value), self.span)
    }
}

/// A bare word used as a key (`keys`, `provides`, meta property names)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub value: String,
    pub span: Span,
}

// ----------------------------------------------------------------------------
// Meta
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesetMeta {
    pub properties: Vec<MetaProperty>,
    pub span: Span,
}

/// One `meta { ... }` entry. The key is normalised (`key` becomes `keys`,
/// `provide` becomes `provides`, `share` becomes `shares`) but keeps the span
/// of the word as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaProperty {
    pub key: Keyword,
    pub value: MetaValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetaValue {
    /// `name`, `description`, `author` and `logging on|off`
    Expr(Expr),
    /// `keys <name> <value>`
    Key { name: Keyword, value: Expr },
    /// `use module <rid> [version "1"] [alias x] [with a = 1 ...]`
    Use {
        kind: Keyword,
        rid: RulesetId,
        version: Option<Expr>,
        alias: Option<Identifier>,
        with: Option<Vec<Stmt>>,
    },
    /// `errors to <rid> [version "1"]`
    Errors {
        rid: RulesetId,
        version: Option<Expr>,
    },
    /// `provides a, b` or `provides keys a, b to r1, r2`
    Provides {
        operator: Option<Keyword>,
        ids: Vec<Identifier>,
        rulesets: Vec<RulesetId>,
    },
    /// `shares a, b`
    Shares { ids: Vec<Identifier> },
    /// `configure using a = 1 b = 2`
    Configure { declarations: Vec<Stmt> },
}

// ----------------------------------------------------------------------------
// Rules
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleState {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: Identifier,
    pub rule_state: RuleState,
    pub select: Option<RuleSelect>,
    pub foreach: Vec<RuleForEach>,
    pub prelude: Vec<Stmt>,
    pub action_block: Option<ActionBlock>,
    pub postlude: Option<RulePostlude>,
    pub span: Span,
}

/// `select when <event> [within <expr> <period>]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSelect {
    pub event: Event,
    pub within: Option<EventWithin>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventWithin {
    pub expression: Expr,
    /// Period word as written, e.g. `minutes`
    pub time_period: String,
    pub span: Span,
}

/// `foreach <expr> setting(a, b)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleForEach {
    pub expression: Expr,
    pub setting: Vec<Identifier>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulePostlude {
    pub fired: Option<Vec<Stmt>>,
    pub notfired: Option<Vec<Stmt>>,
    pub always: Option<Vec<Stmt>>,
    pub span: Span,
}

// ----------------------------------------------------------------------------
// Events
// ----------------------------------------------------------------------------

pub type Event = Spanned<EventKind>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// `domain type attr re#..# where <expr> setting(x)`
    Expression(EventExpression),
    /// Boolean and temporal combination, n-ary, arguments in source order
    Operator { op: EventOp, args: Vec<Event> },
    /// `any <n> (e1, e2, ...)`
    Any { count: Expr, args: Vec<Event> },
    /// `count <n> (...)` or `repeat <n> (...)`
    Group {
        op: GroupOp,
        n: Expr,
        event: Box<Event>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventExpression {
    pub event_domain: Identifier,
    pub event_type: Identifier,
    pub event_attrs: Vec<AttributeMatch>,
    pub where_clause: Option<Expr>,
    pub setting: Vec<Identifier>,
    /// Set only inside a `count`/`repeat` group. The event's span then
    /// stretches to the end of the aggregator.
    pub aggregator: Option<EventAggregator>,
}

/// `name re#pattern#`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeMatch {
    pub key: Identifier,
    pub value: Expr,
    pub span: Span,
}

/// `max(a, b)` after an event group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAggregator {
    pub op: AggregateOp,
    pub args: Vec<Identifier>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventOp {
    Or,
    And,
    Before,
    Then,
    After,
    Between,
    NotBetween,
}

impl EventOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventOp::Or => "or",
            EventOp::And => "and",
            EventOp::Before => "before",
            EventOp::Then => "then",
            EventOp::After => "after",
            EventOp::Between => "between",
            EventOp::NotBetween => "not between",
        }
    }

    pub fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "or" => EventOp::Or,
            "and" => EventOp::And,
            "before" => EventOp::Before,
            "then" => EventOp::Then,
            "after" => EventOp::After,
            "between" => EventOp::Between,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupOp {
    Count,
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateOp {
    Min,
    Max,
    Sum,
    Avg,
    Push,
}

impl AggregateOp {
    pub fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "min" => AggregateOp::Min,
            "max" => AggregateOp::Max,
            "sum" => AggregateOp::Sum,
            "avg" => AggregateOp::Avg,
            "push" => AggregateOp::Push,
            _ => return None,
        })
    }
}

// ----------------------------------------------------------------------------
// Actions
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockType {
    Every,
    Choose,
    Sample,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionBlock {
    /// `if <condition> then ...`
    pub condition: Option<Expr>,
    pub block_type: BlockType,
    /// Only set for `choose`
    pub discriminant: Option<Expr>,
    pub actions: Vec<Action>,
    pub span: Span,
}

/// `[label =>] name(args) [setting(a, b)]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub label: Option<Identifier>,
    pub action: Expr,
    pub args: Arguments,
    pub setting: Vec<Identifier>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arguments {
    pub args: Vec<Argument>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Argument {
    Positional(Expr),
    Named(NamedArgument),
}

impl Argument {
    pub fn span(&self) -> Span {
        match self {
            Argument::Positional(e) => e.span,
            Argument::Named(n) => n.span,
        }
    }
}

/// `name = value` inside an argument list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedArgument {
    pub id: Identifier,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub params: Vec<Parameter>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: Identifier,
    pub default: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefAction {
    pub id: Identifier,
    pub params: Parameters,
    pub body: Vec<Stmt>,
    pub action_block: ActionBlock,
    pub returns: Vec<Expr>,
}

// ----------------------------------------------------------------------------
// Statements
// ----------------------------------------------------------------------------

pub type Stmt = Spanned<StmtKind>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    /// A bare expression; the span excludes any trailing `;`
    Expression(Expr),
    /// `left = right`
    Declaration { left: Expr, right: Expr },
    /// `name = defaction(...) { ... }`
    DefAction(DefAction),
    /// `ent:name := value` or `ent:name{path} := value`
    PersistentVariableAssignment {
        left: Expr,
        path_expression: Option<Expr>,
        right: Expr,
    },
    /// `clear ent:name`
    ClearPersistentVariable { variable: Expr },
    /// `raise domain event type [for rid] [attributes attrs]`
    RaiseEvent {
        event_domain: Identifier,
        event_type: Expr,
        for_rid: Option<Expr>,
        event_attrs: Option<Expr>,
    },
    /// `schedule domain event type (at time | repeat timespec) ...`
    ScheduleEvent {
        timing: ScheduleTiming,
        event_domain: Identifier,
        event_type: Expr,
        event_attrs: Option<Expr>,
        setting: Option<Identifier>,
    },
    /// `log info <expr>`
    Log { level: LogLevel, expression: Expr },
    /// `error warn <expr>`
    Error { level: LogLevel, expression: Expr },
    /// `<stmt> on final` or `<stmt> if <expr>`
    Guard {
        condition: GuardCondition,
        statement: Box<Stmt>,
    },
    /// `last`
    Last,
}

impl StmtKind {
    /// Assignment operator for statements that have one.
    pub fn op(&self) -> Option<&'static str> {
        match self {
            StmtKind::Declaration { .. } => Some("="),
            StmtKind::PersistentVariableAssignment { .. } => Some(":="),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScheduleTiming {
    At(Expr),
    Repeat(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GuardCondition {
    OnFinal,
    If(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "error" => LogLevel::Error,
            "warn" => LogLevel::Warn,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            _ => return None,
        })
    }
}

// ----------------------------------------------------------------------------
// Expressions
// ----------------------------------------------------------------------------

pub type Expr = Spanned<ExprKind>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Identifier(String),
    /// `ent:name`, `event:attr`
    DomainIdentifier {
        domain: String,
        value: String,
    },
    String(String),
    Number(f64),
    Boolean(bool),
    RegExp {
        pattern: String,
        flags: String,
    },
    /// Template text; parts alternate between `String` and interpolated
    /// expressions, with empty text parts dropped
    Chevron(Vec<Expr>),
    Array(Vec<Expr>),
    Map(Vec<MapKeyValuePair>),
    Unary {
        op: UnaryOp,
        arg: Box<Expr>,
    },
    Infix {
        op: InfixOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `test => consequent | alternate`
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        method: MemberMethod,
    },
    Application {
        callee: Box<Expr>,
        args: Arguments,
    },
    Function {
        params: Parameters,
        body: Vec<Stmt>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapKeyValuePair {
    pub key: Expr,
    pub value: Expr,
    pub span: Span,
}

/// How a member expression addresses its property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberMethod {
    /// `a.b`
    Dot,
    /// `a[b]`
    Index,
    /// `a{b}`
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Plus,
    Minus,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        Some(match s {
            "not" => UnaryOp::Not,
            "+" => UnaryOp::Plus,
            "-" => UnaryOp::Minus,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfixOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    /// `<=>`
    Spaceship,
    Cmp,
    Like,
    /// `><`
    Contains,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl InfixOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfixOp::Or => "||",
            InfixOp::And => "&&",
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
            InfixOp::Lt => "<",
            InfixOp::Le => "<=",
            InfixOp::Gt => ">",
            InfixOp::Ge => ">=",
            InfixOp::Spaceship => "<=>",
            InfixOp::Cmp => "cmp",
            InfixOp::Like => "like",
            InfixOp::Contains => "><",
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Mod => "%",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        Some(match s {
            "||" => InfixOp::Or,
            "&&" => InfixOp::And,
            "==" => InfixOp::Eq,
            "!=" => InfixOp::NotEq,
            "<" => InfixOp::Lt,
            "<=" => InfixOp::Le,
            ">" => InfixOp::Gt,
            ">=" => InfixOp::Ge,
            "<=>" => InfixOp::Spaceship,
            "cmp" => InfixOp::Cmp,
            "like" => InfixOp::Like,
            "><" => InfixOp::Contains,
            "+" => InfixOp::Add,
            "-" => InfixOp::Sub,
            "*" => InfixOp::Mul,
            "/" => InfixOp::Div,
            "%" => InfixOp::Mod,
            _ => return None,
        })
    }
}
