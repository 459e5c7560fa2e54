// Grammar model
//
//  Copyright (C) 2014-2023 Ryan Specialty, LLC.
//
//  This file is part of forkscan.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.


//! Grammars composed of terminals and productions.
//!
//! A [`Grammar`] is a named, immutable collection of [`Terminal`]s and
//!   [`Production`]s along with the sets of terminals and productions that
//!   are valid at the start of a scan.
//! Grammars are constructed using a [`GrammarBuilder`],
//!   which validates the definition and fails fast with a
//!   [`GrammarError`] before any input is ever scanned.
//!
//! ```
//! use forkscan::grammar::{GrammarBuilder, Part, Production, Terminal};
//!
//! # fn main() -> Result<(), forkscan::grammar::GrammarError> {
//! let grammar = GrammarBuilder::new("calc")
//!     .terminal(Terminal::new("NUMBER", "[0-9]+")?)
//!     .terminal(Terminal::literal("PLUS", "+")?)
//!     .terminal(Terminal::new("WS", r"[ \t]+")?.skip())
//!     .production(Production::new(
//!         "sum",
//!         [
//!             Part::terminal("NUMBER"),
//!             Part::terminal("PLUS"),
//!             Part::terminal("NUMBER"),
//!         ],
//!     ))
//!     .start_production("sum")
//!     .build()?;
//!
//! assert_eq!("calc", grammar.name());
//! assert_eq!(3, grammar.start_terminals().len());
//! let number = grammar.terminal_id("NUMBER").unwrap();
//! assert!(grammar
//!     .first_terminals("sum")
//!     .is_some_and(|first| first.contains(number)));
//! # Ok(())
//! # }
//! ```
//!
//! Multiple grammars may coexist,
//!   each addressed by name.
//! A production that names a [context](Production::context) delegates the
//!   region of input it governs to the grammar of that name;
//!     references made by such a production are resolved against the
//!     target grammar,
//!       and so can only be validated once all grammars are known
//!       (see [`Lexer::reset`](crate::lexer::Lexer::reset)).
//!
//! Left recursion is rejected,
//!   since leftmost derivations are followed eagerly as tokens arrive;
//!     this also guarantees that every FIRST set is well-defined.

mod error;
mod production;
mod terminal;

pub use error::GrammarError;
pub use production::{Part, Production};
pub use terminal::{
    Order, Terminal, LEXERPATH_MERGE, LEXERPATH_REMOVED, RESERVED_NAMES,
    UNKNOWN,
};

use fixedbitset::FixedBitSet;
use fxhash::{FxHashMap, FxHashSet};
use petgraph::{
    algo::{tarjan_scc, toposort},
    graph::{DiGraph, NodeIndex},
};
use std::{
    fmt::{self, Display},
    rc::Rc,
};

/// Index of a [`Terminal`] within its [`Grammar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerminalId(u32);

impl TerminalId {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    fn from_usize(i: usize) -> Self {
        Self(i as u32)
    }
}

/// Index of a [`Production`] within its [`Grammar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductionId(u32);

impl ProductionId {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    fn from_usize(i: usize) -> Self {
        Self(i as u32)
    }
}

/// A set of terminals of a single [`Grammar`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TerminalSet(FixedBitSet);

impl TerminalSet {
    pub fn with_capacity(n: usize) -> Self {
        Self(FixedBitSet::with_capacity(n))
    }

    /// A set containing every terminal id below `n`.
    fn full(n: usize) -> Self {
        let mut set = FixedBitSet::with_capacity(n);
        set.insert_range(..);

        Self(set)
    }

    pub fn insert(&mut self, id: TerminalId) {
        let i = id.as_usize();

        if i >= self.0.len() {
            self.0.grow(i + 1);
        }

        self.0.insert(i);
    }

    pub fn contains(&self, id: TerminalId) -> bool {
        self.0.contains(id.as_usize())
    }

    pub fn union_with(&mut self, other: &TerminalSet) {
        self.0.union_with(&other.0);
    }

    pub fn len(&self) -> usize {
        self.0.count_ones(..)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Terminal ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = TerminalId> + '_ {
        self.0.ones().map(TerminalId::from_usize)
    }
}

impl FromIterator<TerminalId> for TerminalSet {
    fn from_iter<I: IntoIterator<Item = TerminalId>>(iter: I) -> Self {
        let mut set = Self::default();

        for id in iter {
            set.insert(id);
        }

        set
    }
}

/// A named, immutable collection of terminals and productions.
///
/// See the [module-level documentation](self) for more information.
#[derive(Debug)]
pub struct Grammar {
    name: String,

    terminals: Vec<Rc<Terminal>>,
    terminal_ix: FxHashMap<String, TerminalId>,

    productions: Vec<Production>,

    /// Alternatives for each production name,
    ///   in declaration order.
    alternatives: FxHashMap<String, Vec<ProductionId>>,

    /// Terminals valid at the start of a scan.
    ///
    /// If none were declared,
    ///   this contains every terminal of the grammar.
    start_terminals: TerminalSet,

    start_productions: Vec<String>,

    /// Terminals that are lexed but never participate in recognition.
    skip: TerminalSet,

    /// Terminals that may begin each production name,
    ///   considering only alternatives that do not delegate to another
    ///   grammar.
    first: FxHashMap<String, TerminalSet>,
}

impl Grammar {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Terminals in declaration order.
    pub fn terminals(&self) -> &[Rc<Terminal>] {
        &self.terminals
    }

    pub fn terminal(&self, name: &str) -> Option<&Rc<Terminal>> {
        self.terminal_id(name).and_then(|id| self.terminal_by_id(id))
    }

    pub fn terminal_id(&self, name: &str) -> Option<TerminalId> {
        self.terminal_ix.get(name).copied()
    }

    pub fn terminal_by_id(&self, id: TerminalId) -> Option<&Rc<Terminal>> {
        self.terminals.get(id.as_usize())
    }

    /// Productions in declaration order.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, id: ProductionId) -> Option<&Production> {
        self.productions.get(id.as_usize())
    }

    /// Whether this grammar performs any production recognition at all.
    ///
    /// A grammar without productions is purely lexical.
    pub fn has_productions(&self) -> bool {
        !self.productions.is_empty()
    }

    /// Ids of the alternatives for the production name `name`.
    pub fn alternatives(&self, name: &str) -> &[ProductionId] {
        self.alternatives.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Alternatives for the production name `name`,
    ///   in declaration order.
    pub fn productions_named<'a>(
        &'a self,
        name: &str,
    ) -> impl Iterator<Item = &'a Production> + 'a {
        self.alternatives(name)
            .iter()
            .filter_map(move |id| self.production(*id))
    }

    pub fn start_terminals(&self) -> &TerminalSet {
        &self.start_terminals
    }

    pub fn start_productions(&self) -> &[String] {
        &self.start_productions
    }

    /// Terminals marked [skip](Terminal::skip).
    pub fn skip_terminals(&self) -> &TerminalSet {
        &self.skip
    }

    /// Terminals that may begin the production name `name`.
    ///
    /// Alternatives that delegate to another grammar do not contribute,
    ///   since their input belongs to that grammar.
    pub fn first_terminals(&self, name: &str) -> Option<&TerminalSet> {
        self.first.get(name)
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grammar `{}`", self.name)
    }
}

/// Validating constructor for [`Grammar`].
///
/// Grammars are read-only once built,
///   so all of their definition is provided here.
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    name: String,
    terminals: Vec<Terminal>,
    productions: Vec<Production>,
    start_terminals: Vec<String>,
    start_productions: Vec<String>,
}

impl GrammarBuilder {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn terminal(mut self, terminal: Terminal) -> Self {
        self.terminals.push(terminal);
        self
    }

    pub fn production(mut self, production: Production) -> Self {
        self.productions.push(production);
        self
    }

    /// Restrict the terminals valid at the start of a scan.
    ///
    /// If no start terminals are declared,
    ///   all terminals are valid.
    pub fn start_terminal<S: Into<String>>(mut self, name: S) -> Self {
        self.start_terminals.push(name.into());
        self
    }

    /// Declare a production name as valid at the start of a parse.
    pub fn start_production<S: Into<String>>(mut self, name: S) -> Self {
        self.start_productions.push(name.into());
        self
    }

    /// Validate the definition and produce an immutable [`Grammar`].
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let Self {
            name,
            terminals,
            productions,
            start_terminals,
            start_productions,
        } = self;

        let terminal_ix = Self::index_terminals(&name, &terminals)?;
        let alternatives = Self::index_alternatives(&productions);

        for prod in &productions {
            Self::check_production(&name, prod, &terminal_ix, &alternatives)?;
        }

        let start_terminals = match start_terminals.len() {
            0 => TerminalSet::full(terminals.len()),
            _ => start_terminals
                .iter()
                .map(|t| {
                    terminal_ix.get(t).copied().ok_or_else(|| {
                        GrammarError::UndefinedTerminal {
                            grammar: name.clone(),
                            terminal: t.clone(),
                        }
                    })
                })
                .collect::<Result<_, _>>()?,
        };

        let mut seen = FxHashSet::default();
        let mut start_prods = Vec::with_capacity(start_productions.len());

        for p in start_productions {
            if !alternatives.contains_key(&p) {
                return Err(GrammarError::UndefinedProduction {
                    grammar: name,
                    production: p,
                });
            }

            if seen.insert(p.clone()) {
                start_prods.push(p);
            }
        }

        let first =
            Self::first_sets(&name, &productions, &alternatives, &terminal_ix)?;

        let skip = terminals
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_skip())
            .map(|(i, _)| TerminalId::from_usize(i))
            .collect();

        Ok(Grammar {
            name,
            terminals: terminals.into_iter().map(Rc::new).collect(),
            terminal_ix,
            productions,
            alternatives,
            start_terminals,
            start_productions: start_prods,
            skip,
            first,
        })
    }

    fn index_terminals(
        grammar: &str,
        terminals: &[Terminal],
    ) -> Result<FxHashMap<String, TerminalId>, GrammarError> {
        let mut ix = FxHashMap::default();

        for (i, t) in terminals.iter().enumerate() {
            if t.is_reserved() {
                return Err(GrammarError::ReservedName(t.name().into()));
            }

            let id = TerminalId::from_usize(i);

            if ix.insert(t.name().to_string(), id).is_some() {
                return Err(GrammarError::DuplicateTerminal {
                    grammar: grammar.into(),
                    terminal: t.name().into(),
                });
            }
        }

        Ok(ix)
    }

    fn index_alternatives(
        productions: &[Production],
    ) -> FxHashMap<String, Vec<ProductionId>> {
        let mut alts = FxHashMap::<String, Vec<ProductionId>>::default();

        for (i, prod) in productions.iter().enumerate() {
            alts.entry(prod.name().to_string())
                .or_default()
                .push(ProductionId::from_usize(i));
        }

        alts
    }

    fn check_production(
        grammar: &str,
        prod: &Production,
        terminal_ix: &FxHashMap<String, TerminalId>,
        alternatives: &FxHashMap<String, Vec<ProductionId>>,
    ) -> Result<(), GrammarError> {
        if prod.parts().is_empty() {
            return Err(GrammarError::EmptyProduction {
                grammar: grammar.into(),
                production: prod.name().into(),
            });
        }

        if let Some(i) = prod.binding() {
            if !matches!(prod.parts().get(i), Some(Part::Terminal(_))) {
                return Err(GrammarError::InvalidBinding {
                    grammar: grammar.into(),
                    production: prod.name().into(),
                    index: i,
                });
            }
        }

        // Delegated references resolve against another grammar.
        if prod.context_tag().is_some() {
            return Ok(());
        }

        for part in prod.parts() {
            match part {
                Part::Terminal(t) if !terminal_ix.contains_key(t) => {
                    return Err(GrammarError::UndefinedTerminal {
                        grammar: grammar.into(),
                        terminal: t.clone(),
                    })
                }
                Part::Production(p) if !alternatives.contains_key(p) => {
                    return Err(GrammarError::UndefinedProduction {
                        grammar: grammar.into(),
                        production: p.clone(),
                    })
                }
                _ => (),
            }
        }

        Ok(())
    }

    /// Compute FIRST for every production name.
    ///
    /// The left-corner graph has an edge from each production name to the
    ///   production name that begins any of its (non-delegating)
    ///   alternatives.
    /// A cycle in this graph is left recursion.
    /// Otherwise,
    ///   processing names in reverse topological order guarantees that
    ///   each name's dependencies are computed before it is.
    fn first_sets(
        grammar: &str,
        productions: &[Production],
        alternatives: &FxHashMap<String, Vec<ProductionId>>,
        terminal_ix: &FxHashMap<String, TerminalId>,
    ) -> Result<FxHashMap<String, TerminalSet>, GrammarError> {
        let mut graph = DiGraph::<&str, ()>::new();
        let mut nodes = FxHashMap::<&str, NodeIndex>::default();

        // Declaration order,
        //   for deterministic error reporting.
        for prod in productions {
            nodes
                .entry(prod.name())
                .or_insert_with(|| graph.add_node(prod.name()));
        }

        for prod in productions {
            if prod.context_tag().is_some() {
                continue;
            }

            if let Some(Part::Production(dep)) = prod.first_part() {
                if let (Some(&from), Some(&to)) =
                    (nodes.get(prod.name()), nodes.get(dep.as_str()))
                {
                    graph.update_edge(from, to, ());
                }
            }
        }

        let order = toposort(&graph, None)
            .map_err(|_| Self::left_recursion(grammar, &graph))?;

        let mut first = FxHashMap::<String, TerminalSet>::default();

        for node in order.into_iter().rev() {
            let name = graph[node];
            let mut set = TerminalSet::with_capacity(terminal_ix.len());

            let alts = alternatives.get(name).map(Vec::as_slice).unwrap_or(&[]);

            for prod in alts.iter().map(|id| &productions[id.as_usize()]) {
                if prod.context_tag().is_some() {
                    continue;
                }

                match prod.first_part() {
                    Some(Part::Terminal(t)) => {
                        if let Some(&id) = terminal_ix.get(t) {
                            set.insert(id);
                        }
                    }
                    Some(Part::Production(dep)) => {
                        if let Some(dep_first) = first.get(dep) {
                            set.union_with(dep_first);
                        }
                    }
                    None => (),
                }
            }

            first.insert(name.to_string(), set);
        }

        Ok(first)
    }

    fn left_recursion(
        grammar: &str,
        graph: &DiGraph<&str, ()>,
    ) -> GrammarError {
        let mut cycle = tarjan_scc(graph)
            .into_iter()
            .find(|scc| {
                scc.len() > 1
                    || scc.first().is_some_and(|&n| graph.contains_edge(n, n))
            })
            .unwrap_or_default();

        cycle.sort();

        GrammarError::LeftRecursion {
            grammar: grammar.into(),
            cycle: cycle.into_iter().map(|n| graph[n].to_string()).collect(),
        }
    }
}
