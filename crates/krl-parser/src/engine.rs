//! Earley chart parser
//!
//! Recognition fills one item set per token boundary. Nullable nonterminals
//! are advanced over at prediction time, so completions of empty matches
//! never need to be replayed. Once the chart accepts, derivations of the
//! start symbol are counted over the chart, and only a unique derivation is
//! walked to run the reducers.

use crate::error::{ParseError, ParseResult};
use crate::grammar::value::{Reduction, Value};
use crate::grammar::{Grammar, Nt, Symbol};
use crate::lexer::SpannedToken;
use crate::resolver;
use krl_core::Span;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

/// Significant tokens of one parse and where that input stops
pub(crate) struct Input {
    tokens: Vec<SpannedToken>,
    /// Byte offset just past the input
    end: usize,
    /// Offset blamed when the input stops too early, if any
    eof: Option<usize>,
}

impl Input {
    pub(crate) fn new(tokens: Vec<SpannedToken>, end: usize, eof: Option<usize>) -> Self {
        let tokens = tokens
            .into_iter()
            .filter(|t| !t.token.is_trivia())
            .collect();
        Self { tokens, end, eof }
    }

    fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Source span of tokens `i..j`; empty matches sit at the next token.
    fn span(&self, i: usize, j: usize) -> Span {
        if i < j {
            Span::new(self.tokens[i].start, self.tokens[j - 1].end)
        } else {
            Span::empty_at(self.tokens.get(i).map_or(self.end, |t| t.start))
        }
    }
}

/// A production with a dot position, started at token `origin`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Item {
    prod: u32,
    dot: u32,
    origin: u32,
}

impl Item {
    fn new(prod: usize, dot: usize, origin: usize) -> Self {
        Self {
            prod: prod as u32,
            dot: dot as u32,
            origin: origin as u32,
        }
    }

    fn advance(self) -> Self {
        Self {
            dot: self.dot + 1,
            ..self
        }
    }

    fn back(self) -> Self {
        Self {
            dot: self.dot - 1,
            ..self
        }
    }
}

#[derive(Default)]
struct ItemSet {
    items: Vec<Item>,
    seen: FxHashSet<Item>,
    /// Items whose next symbol is the key
    waiting: FxHashMap<Nt, Vec<Item>>,
}

impl ItemSet {
    fn insert(&mut self, item: Item) {
        if self.seen.insert(item) {
            self.items.push(item);
        }
    }
}

struct Chart<'a> {
    grammar: &'a Grammar,
    input: &'a Input,
    sets: Vec<ItemSet>,
}

impl<'a> Chart<'a> {
    fn new(grammar: &'a Grammar, input: &'a Input) -> Self {
        let sets = (0..=input.len()).map(|_| ItemSet::default()).collect();
        Self {
            grammar,
            input,
            sets,
        }
    }

    fn contains(&self, set: usize, item: Item) -> bool {
        self.sets[set].seen.contains(&item)
    }

    fn is_complete(&self, item: Item) -> bool {
        item.dot as usize == self.grammar.production(item.prod as usize).rhs.len()
    }

    /// Add `item` to set `j`, unless it completes a match its guard rejects
    fn add(&mut self, j: usize, item: Item) {
        let prod = self.grammar.production(item.prod as usize);
        if item.dot as usize == prod.rhs.len() {
            if let Some(guard) = prod.guard {
                if !guard(&self.input.tokens, item.origin as usize, j) {
                    return;
                }
            }
        }
        self.sets[j].insert(item);
    }

    fn recognize(&mut self, start: Nt) -> ParseResult<()> {
        let grammar = self.grammar;
        for &p in grammar.productions_for(start) {
            self.add(0, Item::new(p, 0, 0));
        }

        let n = self.input.len();
        for j in 0..=n {
            self.process(j);
            trace!(set = j, items = self.sets[j].items.len(), "item set");
            if j < n && self.sets[j + 1].items.is_empty() {
                let tok = &self.input.tokens[j];
                return Err(ParseError::no_parse(
                    Some(tok.start),
                    Some(&tok.token.to_string()),
                ));
            }
        }

        if self.accepting(start).next().is_none() {
            return Err(ParseError::no_parse(self.input.eof, None));
        }
        Ok(())
    }

    fn process(&mut self, j: usize) {
        let grammar = self.grammar;
        let mut k = 0;
        while k < self.sets[j].items.len() {
            let item = self.sets[j].items[k];
            k += 1;
            let prod = grammar.production(item.prod as usize);
            match prod.rhs.get(item.dot as usize) {
                None => {
                    let origin = item.origin as usize;
                    let parents = self.sets[origin]
                        .waiting
                        .get(&prod.lhs)
                        .cloned()
                        .unwrap_or_default();
                    for parent in parents {
                        self.add(j, parent.advance());
                    }
                }
                Some(Symbol::N(nt)) => {
                    let nt = *nt;
                    self.sets[j].waiting.entry(nt).or_default().push(item);
                    for &p in grammar.productions_for(nt) {
                        self.add(j, Item::new(p, 0, j));
                    }
                    if grammar.is_nullable(nt) {
                        self.add(j, item.advance());
                    }
                }
                Some(Symbol::T(term)) => {
                    if let Some(tok) = self.input.tokens.get(j) {
                        if term.matches(&tok.token) {
                            self.add(j + 1, item.advance());
                        }
                    }
                }
            }
        }
    }

    /// Complete items of `start` spanning the whole input
    fn accepting(&self, start: Nt) -> impl Iterator<Item = Item> + '_ {
        self.sets[self.input.len()]
            .items
            .iter()
            .copied()
            .filter(move |&item| {
                item.origin == 0
                    && self.grammar.production(item.prod as usize).lhs == start
                    && self.is_complete(item)
            })
    }

    fn item_count(&self) -> usize {
        self.sets.iter().map(|s| s.items.len()).sum()
    }
}

/// One way to split an item at `end`: the prefix item ending at `mid`,
/// and the completed child over `mid..end` when the last symbol is a
/// nonterminal
type Split = (Item, usize, Option<Item>);

/// Pending work while building a tree
enum Task {
    /// Expand the derivation of a nonterminal over `i..j`
    Expand(Nt, usize, usize),
    /// Push the token at this index
    Shift(usize),
    /// Run the reducer of a production over `i..j` on the values on top
    Reduce(usize, usize, usize),
}

/// Derivation counting and tree building over a finished chart.
///
/// Both walks keep their own stacks, so nesting depth and list length are
/// bounded by memory only.
struct Forest<'c, 'a> {
    chart: &'c Chart<'a>,
    /// Complete items of each set by left-hand side
    done: Vec<FxHashMap<Nt, Vec<Item>>>,
    /// `None` while the entry is being evaluated
    ways: FxHashMap<(Item, u32), Option<u64>>,
}

impl<'c, 'a> Forest<'c, 'a> {
    fn new(chart: &'c Chart<'a>) -> Self {
        let grammar = chart.grammar;
        let done = chart
            .sets
            .iter()
            .map(|set| {
                let mut by_lhs: FxHashMap<Nt, Vec<Item>> = FxHashMap::default();
                for &item in set.items.iter().filter(|&&item| chart.is_complete(item)) {
                    let lhs = grammar.production(item.prod as usize).lhs;
                    by_lhs.entry(lhs).or_default().push(item);
                }
                by_lhs
            })
            .collect();
        Self {
            chart,
            done,
            ways: FxHashMap::default(),
        }
    }

    /// Complete items of `nt` in set `end`
    fn completed(&self, nt: Nt, end: usize) -> impl Iterator<Item = Item> + '_ {
        self.done[end].get(&nt).into_iter().flatten().copied()
    }

    /// `ways` when it needs no evaluation. An entry still being evaluated
    /// is only reachable through a derivation cycle and reads as unknown.
    fn known(&self, item: Item, end: usize) -> Option<u64> {
        if !self.chart.contains(end, item) {
            return Some(0);
        }
        if item.dot == 0 {
            return Some(u64::from(item.origin as usize == end));
        }
        self.ways.get(&(item, end as u32)).copied().flatten()
    }

    fn splits(&self, item: Item, end: usize) -> Vec<Split> {
        let prev = item.back();
        let prod = self.chart.grammar.production(item.prod as usize);
        match prod.rhs[prev.dot as usize] {
            Symbol::T(_) if end > item.origin as usize => vec![(prev, end - 1, None)],
            Symbol::T(_) => Vec::new(),
            Symbol::N(nt) => self
                .completed(nt, end)
                .filter(|c| c.origin >= item.origin)
                .map(|c| (prev, c.origin as usize, Some(c)))
                .collect(),
        }
    }

    /// Number of ways the symbols before the dot of `item` derive the
    /// tokens `item.origin..end`
    fn ways(&mut self, item: Item, end: usize) -> u64 {
        if let Some(n) = self.known(item, end) {
            return n;
        }
        let mut stack = vec![(item, end, false)];
        while let Some((item, end, expanded)) = stack.pop() {
            let key = (item, end as u32);
            if expanded {
                let mut total = 0u64;
                for (prev, mid, child) in self.splits(item, end) {
                    let left = self.known(prev, mid).unwrap_or(0);
                    let right = child.map_or(1, |c| self.known(c, end).unwrap_or(0));
                    total = total.saturating_add(left.saturating_mul(right));
                }
                self.ways.insert(key, Some(total));
                continue;
            }
            if self.ways.contains_key(&key) {
                continue;
            }
            self.ways.insert(key, None);
            stack.push((item, end, true));
            for (prev, mid, child) in self.splits(item, end) {
                let parts = std::iter::once((prev, mid)).chain(child.map(|c| (c, end)));
                for (dep, at) in parts {
                    let pending = !self.ways.contains_key(&(dep, at as u32));
                    if pending && self.known(dep, at).is_none() {
                        stack.push((dep, at, false));
                    }
                }
            }
        }
        self.known(item, end).unwrap_or(0)
    }

    /// Complete items of `nt` over tokens `i..j`
    fn spanning(&self, nt: Nt, i: usize, j: usize) -> Vec<Item> {
        self.completed(nt, j)
            .filter(|c| c.origin as usize == i)
            .collect()
    }

    /// Number of derivations of `nt` over tokens `i..j`
    fn count(&mut self, nt: Nt, i: usize, j: usize) -> u64 {
        self.spanning(nt, i, j)
            .into_iter()
            .fold(0, |acc, c| acc.saturating_add(self.ways(c, j)))
    }

    /// Run the reducers along the derivation of `nt` over `i..j`. The
    /// caller has established that exactly one exists.
    fn build(&mut self, nt: Nt, i: usize, j: usize) -> ParseResult<Value> {
        let grammar = self.chart.grammar;
        let input = self.chart.input;
        let mut tasks = vec![Task::Expand(nt, i, j)];
        let mut values: Vec<Value> = Vec::new();

        while let Some(task) = tasks.pop() {
            match task {
                Task::Shift(at) => values.push(Value::Token(input.tokens[at].clone())),
                Task::Expand(nt, i, j) => {
                    let complete = self
                        .spanning(nt, i, j)
                        .into_iter()
                        .find(|&c| self.ways(c, j) > 0)
                        .ok_or_else(|| {
                            ParseError::internal(format!("no derivation of {:?}", nt))
                        })?;
                    tasks.push(Task::Reduce(complete.prod as usize, i, j));
                    // Children are found right to left, which leaves the
                    // leftmost one on top of the stack.
                    self.expand(complete, j, &mut tasks)?;
                }
                Task::Reduce(prod, i, j) => {
                    let production = grammar.production(prod);
                    let at = values
                        .len()
                        .checked_sub(production.rhs.len())
                        .ok_or_else(|| ParseError::internal("reducer is short of children"))?;
                    let children = values.split_off(at);
                    let mut reduction = Reduction::new(children, input.span(i, j));
                    values.push((production.reducer)(&mut reduction)?);
                }
            }
        }

        match (values.pop(), values.is_empty()) {
            (Some(value), true) => Ok(value),
            _ => Err(ParseError::internal("derivation left stray values")),
        }
    }

    /// Queue the children of the complete `item` ending at `end`
    fn expand(&mut self, complete: Item, end: usize, tasks: &mut Vec<Task>) -> ParseResult<()> {
        let grammar = self.chart.grammar;
        let prod = grammar.production(complete.prod as usize);
        let mut item = complete;
        let mut end = end;
        while item.dot > 0 {
            let prev = item.back();
            match prod.rhs[prev.dot as usize] {
                Symbol::T(_) => {
                    end = end
                        .checked_sub(1)
                        .ok_or_else(|| ParseError::internal("token before the input"))?;
                    tasks.push(Task::Shift(end));
                }
                Symbol::N(child) => {
                    let mid = self
                        .splits(item, end)
                        .into_iter()
                        .find_map(|(prev, mid, c)| {
                            let c = c?;
                            (self.ways(prev, mid) > 0 && self.ways(c, end) > 0).then_some(mid)
                        })
                        .ok_or_else(|| {
                            ParseError::internal(format!("no split for {:?} before {}", child, end))
                        })?;
                    tasks.push(Task::Expand(child, mid, end));
                    end = mid;
                }
            }
            item = prev;
        }
        Ok(())
    }
}

/// Parse `input` as `start` and reduce its unique derivation.
pub(crate) fn run(grammar: &Grammar, start: Nt, input: Input) -> ParseResult<Value> {
    let mut chart = Chart::new(grammar, &input);
    chart.recognize(start)?;
    debug!(
        tokens = input.len(),
        items = chart.item_count(),
        productions = grammar.len(),
        "chart accepted"
    );

    let n = input.len();
    let mut forest = Forest::new(&chart);
    let derivations = forest.count(start, 0, n);
    debug!(derivations, ?start, "counted derivations");
    resolver::resolve(derivations)?;
    forest.build(start, 0, n)
}
