// Production recognition
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


//! Incremental production recognition.
//!
//! Each lexer path carries a [`PathContext`]:
//!   a bounded stack of active grammars and an LL-style stack of
//!   [`Expect`]ations describing what the path must see next.
//! Tokens are fed one at a time as they are lexed;
//!   recognition never looks ahead and never backtracks.
//! Where more than one leftmost derivation could begin with a token,
//!   each derivation becomes its own path,
//!     in the same way that ambiguous lexemes do.
//!
//! Expectations are resolved against the grammar in which the expecting
//!   production's parts are defined.
//! A production that delegates to another grammar resolves its parts in
//!   that grammar;
//!     such a production is _entered_ before any of its input is lexed
//!     (see [`ParserState::settle`](super::state::ParserState::settle)),
//!     which is what restricts lexing of its region to the embedded
//!     grammar.

use super::{
    path::PathId,
    scope::ScopeId,
    state::{ContextState, GrammarId, Registry},
};
use crate::{
    global,
    grammar::{Part, Production, ProductionId, TerminalId},
    span::Span,
    sym::SymbolId,
};
use arrayvec::ArrayVec;
use std::{
    fmt::{self, Display},
    rc::Rc,
};

/// A completed production on a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionMatch {
    path: PathId,
    grammar: String,
    production: String,
    span: Span,
    text: String,
}

impl ProductionMatch {
    pub(super) fn new(
        path: PathId,
        grammar: &str,
        production: &str,
        span: Span,
        text: String,
    ) -> Self {
        Self {
            path,
            grammar: grammar.into(),
            production: production.into(),
            span,
            text,
        }
    }

    /// Path on which the production was recognized.
    pub fn path(&self) -> PathId {
        self.path
    }

    /// Name of the grammar defining the production.
    pub fn grammar(&self) -> &str {
        &self.grammar
    }

    pub fn production(&self) -> &str {
        &self.production
    }

    /// Span of the first token of the production.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Source text from the first through the last token of the
    ///   production,
    ///     including anything skipped between them.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Display for ProductionMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{} at {} on {}",
            self.grammar, self.production, self.span, self.path
        )
    }
}

/// A lexed token as seen by the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Lexeme {
    /// Grammar with which the token was lexed.
    pub grammar: GrammarId,

    /// [`None`] for unmatched input.
    pub terminal: Option<TerminalId>,

    pub skip: bool,
    pub value: SymbolId,
    pub span: Span,
}

/// What a path requires next.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) enum Expect {
    /// A specific terminal of `grammar`.
    Terminal {
        grammar: GrammarId,
        terminal: TerminalId,
        /// Whether the text of the terminal is the binding of the
        ///   enclosing production.
        bind: bool,
    },

    /// Any alternative of the production name `name` of `grammar`.
    Nonterminal {
        grammar: GrammarId,
        name: Rc<str>,
        /// Whether the delegated grammar of the alternatives has already
        ///   been pushed.
        entered: bool,
    },

    /// All parts of the production have been seen.
    Done {
        grammar: GrammarId,
        prod: ProductionId,
        start: Span,
        binding: Option<(SymbolId, Span)>,
    },

    /// Leave the grammar context that was entered for a delegating
    ///   production.
    Leave,
}

pub(super) type GrammarStack =
    ArrayVec<GrammarId, { global::MAX_CONTEXT_DEPTH }>;

/// Merge key component for a path's recognition state.
pub(super) type ContextKey = (GrammarStack, Vec<Expect>);

/// Outcome of feeding a token to a [`PathContext`].
#[derive(Debug)]
pub(super) enum Recognition {
    /// The token does not participate in recognition.
    Ignored,

    /// The token was consumed.
    ///
    /// Each context is an additional derivation of the same token that
    ///   must be forked onto its own path.
    Accepted(Vec<PathContext>),

    /// The token cannot continue any derivation of this path;
    ///   the path context is unchanged.
    Rejected,
}

/// One production of a leftmost derivation.
#[derive(Debug, Clone, Copy)]
struct Step {
    /// Grammar defining the production.
    grammar: GrammarId,
    prod: ProductionId,
    /// Grammar in which the production's parts are resolved.
    parts_in: GrammarId,
}

/// Recognition state of a single path.
#[derive(Debug, Clone)]
pub(super) struct PathContext {
    pub grammars: GrammarStack,
    pub stack: Vec<Expect>,
    pub scope: ScopeId,
    pub matches: Vec<ProductionMatch>,
}

impl PathContext {
    pub fn new(base: GrammarId, scope: ScopeId) -> Self {
        let mut grammars = GrammarStack::new();
        grammars.push(base);

        Self {
            grammars,
            stack: Vec::new(),
            scope,
            matches: Vec::new(),
        }
    }

    /// Grammar governing the path's current region of input.
    pub fn grammar(&self) -> Option<GrammarId> {
        self.grammars.last().copied()
    }

    pub fn base(&self) -> Option<GrammarId> {
        self.grammars.first().copied()
    }

    pub fn key(&self) -> ContextKey {
        (self.grammars.clone(), self.stack.clone())
    }

    /// Feed a lexed token.
    pub fn recognize(
        &mut self,
        reg: &Registry,
        flags: &ContextState,
        lx: &Lexeme,
    ) -> Recognition {
        let terminal = match lx.terminal {
            Some(t) if !lx.skip => t,
            _ => return Recognition::Ignored,
        };

        match self.stack.last() {
            Some(Expect::Terminal {
                grammar,
                terminal: expected,
                bind,
            }) => {
                if (*grammar, *expected) != (lx.grammar, terminal) {
                    return Recognition::Rejected;
                }

                let bind = *bind;
                self.stack.pop();

                if bind {
                    self.bind(lx);
                }

                Recognition::Accepted(Vec::new())
            }

            Some(Expect::Nonterminal {
                grammar,
                name,
                entered,
            }) => {
                let (grammar, name) = (*grammar, Rc::clone(name));
                let into = if *entered { self.grammar() } else { None };

                let mut derivation = Derivation::new(reg, flags, lx);
                derivation.derive(grammar, &name, into);

                let chains = derivation.chains;

                if chains.is_empty() {
                    return Recognition::Rejected;
                }

                self.stack.pop();
                Recognition::Accepted(self.apply_chains(reg, chains, lx))
            }

            None => {
                let start = match self.grammar().and_then(|id| reg.get(id)) {
                    Some(g) => g.start_productions(),
                    None => return Recognition::Ignored,
                };

                if start.is_empty() {
                    return Recognition::Ignored;
                }

                let mut derivation = Derivation::new(reg, flags, lx);

                if let Some(g) = self.grammar() {
                    for name in start {
                        derivation.derive(g, name, None);
                    }
                }

                let chains = derivation.chains;

                if chains.is_empty() {
                    return Recognition::Rejected;
                }

                Recognition::Accepted(self.apply_chains(reg, chains, lx))
            }

            // Completed and leaving expectations never remain on top of
            //   the stack between tokens.
            Some(Expect::Done { .. } | Expect::Leave) => Recognition::Rejected,
        }
    }

    /// Abandon partial recognition state,
    ///   leaving every entered context,
    ///   and retry `lx` from the start productions of the base grammar.
    ///
    /// Alternative derivations are not forked during recovery.
    pub fn recover(
        &mut self,
        reg: &Registry,
        flags: &ContextState,
        lx: &Lexeme,
        root: ScopeId,
    ) -> bool {
        if let Some(base) = self.base() {
            self.grammars.truncate(1);
            debug_assert_eq!(Some(base), self.grammar());
        }

        self.stack.clear();
        self.scope = root;

        matches!(self.recognize(reg, flags, lx), Recognition::Accepted(_))
    }

    /// Apply the first derivation to this context and each remaining
    ///   derivation to a copy of it.
    fn apply_chains(
        &mut self,
        reg: &Registry,
        chains: Vec<Vec<Step>>,
        lx: &Lexeme,
    ) -> Vec<PathContext> {
        let snapshot = match chains.len() {
            1 => None,
            _ => Some(self.clone()),
        };

        let mut chains = chains.into_iter();

        if let Some(first) = chains.next() {
            self.apply(reg, &first, lx);
        }

        chains
            .filter_map(|chain| {
                let mut alt = snapshot.clone()?;
                alt.apply(reg, &chain, lx);
                Some(alt)
            })
            .collect()
    }

    /// Expand a leftmost derivation ending in the terminal of `lx`,
    ///   consuming that terminal.
    fn apply(&mut self, reg: &Registry, chain: &[Step], lx: &Lexeme) {
        for step in chain {
            let Some(prod) = reg.production(step.grammar, step.prod) else {
                continue;
            };

            // The entered grammar is left once the delegating production
            //   completes.
            if prod.context_tag().is_some() {
                self.stack.push(Expect::Leave);
            }

            self.stack.push(Expect::Done {
                grammar: step.grammar,
                prod: step.prod,
                start: lx.span,
                binding: None,
            });

            let parts_g = reg.get(step.parts_in);
            let parts = prod.parts().iter().enumerate().skip(1).rev();

            for (i, part) in parts {
                let expect = match part {
                    Part::Terminal(t) => {
                        let Some(terminal) =
                            parts_g.and_then(|g| g.terminal_id(t))
                        else {
                            continue;
                        };

                        Expect::Terminal {
                            grammar: step.parts_in,
                            terminal,
                            bind: prod.binding() == Some(i),
                        }
                    }
                    Part::Production(name) => Expect::Nonterminal {
                        grammar: step.parts_in,
                        name: Rc::from(name.as_str()),
                        entered: false,
                    },
                };

                self.stack.push(expect);
            }
        }

        let innermost = chain
            .last()
            .and_then(|step| reg.production(step.grammar, step.prod));

        if innermost.and_then(Production::binding) == Some(0) {
            self.bind(lx);
        }
    }

    /// Record `lx` as the binding of the innermost incomplete production.
    fn bind(&mut self, lx: &Lexeme) {
        let done = self
            .stack
            .iter_mut()
            .rev()
            .find(|e| matches!(e, Expect::Done { .. }));

        if let Some(Expect::Done { binding, .. }) = done {
            *binding = Some((lx.value, lx.span));
        }
    }
}

/// Leftmost derivations of a single token.
struct Derivation<'a> {
    reg: &'a Registry,
    flags: &'a ContextState,
    lx: &'a Lexeme,

    /// Derivation currently being explored.
    prefix: Vec<Step>,

    /// Complete derivations,
    ///   in order of discovery.
    chains: Vec<Vec<Step>>,
}

impl<'a> Derivation<'a> {
    fn new(reg: &'a Registry, flags: &'a ContextState, lx: &'a Lexeme) -> Self {
        Self {
            reg,
            flags,
            lx,
            prefix: Vec::new(),
            chains: Vec::new(),
        }
    }

    /// Collect every leftmost derivation of the production name `name` of
    ///   `grammar` that begins with the terminal of the token.
    ///
    /// Alternatives that delegate to another grammar are eligible only
    ///   once that grammar has been entered (`into`),
    ///     and a derivation crosses into it at most once;
    ///       with left recursion rejected at grammar construction,
    ///       this guarantees termination.
    fn derive(
        &mut self,
        grammar: GrammarId,
        name: &str,
        into: Option<GrammarId>,
    ) {
        let (reg, lx) = (self.reg, self.lx);

        let Some(g) = reg.get(grammar) else {
            return;
        };

        for &prod_id in g.alternatives(name) {
            let Some(prod) = g.production(prod_id) else {
                continue;
            };

            if let Some(flag) = prod.guard_flag() {
                if !self.flags.get(flag) {
                    continue;
                }
            }

            let (parts_in, next_into) = match (prod.context_tag(), into) {
                (None, into) => (grammar, into),
                (Some(ctx), Some(into)) if reg.id_of(ctx) == Some(into) => {
                    (into, None)
                }
                _ => continue,
            };

            let Some(parts_g) = reg.get(parts_in) else {
                continue;
            };

            let step = Step {
                grammar,
                prod: prod_id,
                parts_in,
            };

            // Tokens are lexed only by the governing grammar.
            let governed = parts_in == lx.grammar;

            match prod.first_part() {
                Some(Part::Terminal(t)) => {
                    if governed && parts_g.terminal_id(t) == lx.terminal {
                        self.prefix.push(step);
                        self.chains.push(self.prefix.clone());
                        self.prefix.pop();
                    }
                }

                Some(Part::Production(dep)) => {
                    // FIRST sets do not cross grammars,
                    //   so a path on its way into an entered grammar
                    //   is pruned only by the derivation itself.
                    let begins = match next_into {
                        Some(_) => true,
                        None => {
                            governed
                                && parts_g
                                    .first_terminals(dep)
                                    .zip(lx.terminal)
                                    .is_some_and(|(f, t)| f.contains(t))
                        }
                    };

                    if begins {
                        self.prefix.push(step);
                        self.derive(parts_in, dep, next_into);
                        self.prefix.pop();
                    }
                }

                None => (),
            }
        }
    }
}
