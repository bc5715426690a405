//! Fragments passed between reducers

use crate::error::{ParseError, ParseResult};
use crate::lexer::{SpannedToken, Token};
use krl_core::*;

/// Body of an action block before the optional `if ... then` is applied
#[derive(Debug)]
pub(crate) struct ActionSet {
    pub block_type: BlockType,
    pub discriminant: Option<Expr>,
    pub actions: Vec<Action>,
}

fn mismatch(expected: &str, found: &Value) -> ParseError {
    ParseError::internal(format!(
        "expected {} fragment, found {}",
        expected,
        found.describe()
    ))
}

macro_rules! fragments {
    ($($variant:ident($ty:ty) => $into:ident $(, $take:ident)?;)*) => {
        /// A partially built piece of syntax tree
        #[derive(Debug, Default)]
        pub(crate) enum Value {
            /// An optional part that was absent
            #[default]
            Unit,
            List(Vec<Value>),
            $($variant($ty),)*
        }

        impl Value {
            fn describe(&self) -> &'static str {
                match self {
                    Value::Unit => "nothing",
                    Value::List(_) => "list",
                    $(Value::$variant(_) => stringify!($variant),)*
                }
            }

            $(
                pub(crate) fn $into(self) -> ParseResult<$ty> {
                    match self {
                        Value::$variant(v) => Ok(v),
                        other => Err(mismatch(stringify!($variant), &other)),
                    }
                }
            )*
        }

        impl Reduction {
            $($(
                pub(crate) fn $take(&mut self, i: usize) -> ParseResult<$ty> {
                    self.take(i)?.$into()
                }
            )?)*
        }
    };
}

fragments! {
    Token(SpannedToken) => into_token, token;
    Text(String) => into_text, text;
    Ident(Identifier) => into_ident;
    Expr(Expr) => into_expr, expr;
    Stmt(Stmt) => into_stmt, stmt;
    MapPair(MapKeyValuePair) => into_map_pair;
    Argument(Argument) => into_argument;
    Arguments(Arguments) => into_arguments, arguments;
    Param(Parameter) => into_param;
    Parameters(Parameters) => into_parameters, parameters;
    Event(Event) => into_event, event;
    Attr(AttributeMatch) => into_attr;
    Aggregator(EventAggregator) => into_aggregator;
    Within(EventWithin) => into_within;
    Select(RuleSelect) => into_select;
    ForEach(RuleForEach) => into_foreach;
    Action(Action) => into_action, action;
    ActionSet(ActionSet) => into_action_set, action_set;
    ActionBlock(ActionBlock) => into_action_block, action_block;
    Postlude(RulePostlude) => into_postlude;
    RuleState(RuleState) => into_rule_state, rule_state;
    Rule(Rule) => into_rule;
    RulesetId(RulesetId) => into_ruleset_id, ruleset_id;
    Ruleset(Ruleset) => into_ruleset, ruleset;
    MetaProp(MetaProperty) => into_meta_prop;
    Meta(RulesetMeta) => into_meta;
    LogLevel(LogLevel) => into_log_level, log_level;
    Program(Program) => into_program;
}

impl Value {
    pub(crate) fn into_list(self) -> ParseResult<Vec<Value>> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(mismatch("list", &other)),
        }
    }

    /// A symbol token as an identifier, or an already built identifier
    pub(crate) fn into_identifier(self) -> ParseResult<Identifier> {
        match self {
            Value::Token(SpannedToken {
                token: Token::Symbol(value),
                start,
                end,
            }) => Ok(Identifier {
                value,
                span: Span::new(start, end),
            }),
            other => other.into_ident(),
        }
    }

    pub(crate) fn into_stmts(self) -> ParseResult<Vec<Stmt>> {
        self.into_list()?
            .into_iter()
            .map(Value::into_stmt)
            .collect()
    }
}

/// Children of one completed production and the span they cover
pub(crate) struct Reduction {
    children: Vec<Value>,
    pub span: Span,
}

impl Reduction {
    pub(crate) fn new(children: Vec<Value>, span: Span) -> Self {
        Self { children, span }
    }

    pub(crate) fn take(&mut self, i: usize) -> ParseResult<Value> {
        self.children
            .get_mut(i)
            .map(std::mem::take)
            .ok_or_else(|| ParseError::internal(format!("missing child {}", i)))
    }

    /// `None` for an absent optional part
    pub(crate) fn opt<T>(
        &mut self,
        i: usize,
        f: fn(Value) -> ParseResult<T>,
    ) -> ParseResult<Option<T>> {
        match self.take(i)? {
            Value::Unit => Ok(None),
            v => f(v).map(Some),
        }
    }

    pub(crate) fn list<T>(
        &mut self,
        i: usize,
        f: fn(Value) -> ParseResult<T>,
    ) -> ParseResult<Vec<T>> {
        match self.take(i)? {
            Value::Unit => Ok(Vec::new()),
            v => v.into_list()?.into_iter().map(f).collect(),
        }
    }

    pub(crate) fn ident(&mut self, i: usize) -> ParseResult<Identifier> {
        self.take(i)?.into_identifier()
    }

    /// Text of a symbol or punctuation token
    pub(crate) fn word(&mut self, i: usize) -> ParseResult<String> {
        let tok = self.token(i)?;
        match tok.token {
            Token::Symbol(s) => Ok(s),
            other => other
                .punct()
                .map(str::to_string)
                .ok_or_else(|| ParseError::internal(format!("expected a word, found {}", other))),
        }
    }

    pub(crate) fn keyword(&mut self, i: usize) -> ParseResult<Keyword> {
        let id = self.ident(i)?;
        Ok(Keyword {
            value: id.value,
            span: id.span,
        })
    }
}
