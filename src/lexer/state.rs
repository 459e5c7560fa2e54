// Parser state
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


//! State shared by all paths of a [`Lexer`](super::Lexer).
//!
//! [`ParserState`] owns:
//!
//!   - the registry of named grammars,
//!       one of which is the base grammar that every path starts in;
//!   - named boolean context flags ([`ContextState`]);
//!   - the table of production callbacks;
//!   - the recognition context of each live path
//!       (its grammar stack and expectations);
//!       and
//!   - the hierarchical symbol table.
//!
//! Nothing here is process-global;
//!   independent lexers never interfere with one another.

use super::{
    path::PathId,
    recognize::{
        ContextKey, Expect, Lexeme, PathContext, ProductionMatch, Recognition,
    },
    scope::{ScopeId, SymbolTable},
    LexerError,
};
use crate::{
    global,
    grammar::{
        Grammar, GrammarError, Part, Production, ProductionId, TerminalSet,
    },
    source::SourceContainer,
    span::Span,
    sym::SymbolId,
};
use fxhash::FxHashMap;
use std::{
    fmt::{self, Debug},
    mem::take,
    rc::Rc,
};

/// Index of a [`Grammar`] registered with a [`Lexer`](super::Lexer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GrammarId(global::GrammarIdSize);

impl GrammarId {
    fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Grammars addressable by name.
///
/// Registering a grammar under an existing name replaces it while
///   retaining its [`GrammarId`].
#[derive(Debug, Default)]
pub(super) struct Registry {
    grammars: Vec<Rc<Grammar>>,
    by_name: FxHashMap<String, GrammarId>,
}

impl Registry {
    pub fn register(&mut self, grammar: Grammar) -> GrammarId {
        match self.by_name.get(grammar.name()) {
            Some(&id) => {
                self.grammars[id.as_usize()] = Rc::new(grammar);
                id
            }
            None => {
                let id =
                    GrammarId(self.grammars.len() as global::GrammarIdSize);

                self.by_name.insert(grammar.name().to_string(), id);
                self.grammars.push(Rc::new(grammar));
                id
            }
        }
    }

    pub fn get(&self, id: GrammarId) -> Option<&Rc<Grammar>> {
        self.grammars.get(id.as_usize())
    }

    pub fn id_of(&self, name: &str) -> Option<GrammarId> {
        self.by_name.get(name).copied()
    }

    pub fn production(
        &self,
        grammar: GrammarId,
        prod: ProductionId,
    ) -> Option<&Production> {
        self.get(grammar)?.production(prod)
    }

    /// Grammars that a leftmost derivation of the production name `name`
    ///   of `grammar` may enter before its first token.
    ///
    /// Alternatives are followed through their leftmost production
    ///   references until an alternative either delegates to another
    ///   grammar or begins with a terminal of `grammar` itself.
    /// Alternatives whose guard flag is unset are not followed.
    pub fn entry(
        &self,
        grammar: GrammarId,
        name: &str,
        flags: &ContextState,
    ) -> Entry {
        let mut entry = Entry::default();
        self.collect_entry(grammar, name, flags, &mut entry);

        entry
    }

    fn collect_entry(
        &self,
        grammar: GrammarId,
        name: &str,
        flags: &ContextState,
        entry: &mut Entry,
    ) {
        let Some(g) = self.get(grammar) else {
            return;
        };

        for prod in g.productions_named(name) {
            if prod.guard_flag().is_some_and(|flag| !flags.get(flag)) {
                continue;
            }

            match (prod.context_tag(), prod.first_part()) {
                (Some(ctx), _) => {
                    let target = self.id_of(ctx);

                    if let Some(id) = target {
                        if !entry.targets.contains(&id) {
                            entry.targets.push(id);
                        }
                    }
                }
                (None, Some(Part::Production(dep))) => {
                    self.collect_entry(grammar, dep, flags, entry)
                }
                (None, _) => entry.local = true,
            }
        }
    }

    /// Terminals of `into` that may begin the production name `name` of
    ///   `grammar` once `into` has been entered on its behalf.
    fn entered_first(
        &self,
        grammar: GrammarId,
        name: &str,
        into: GrammarId,
        set: &mut TerminalSet,
    ) {
        let (Some(g), Some(target)) = (self.get(grammar), self.get(into))
        else {
            return;
        };

        for prod in g.productions_named(name) {
            match (prod.context_tag(), prod.first_part()) {
                (Some(ctx), Some(part)) if self.id_of(ctx) == Some(into) => {
                    match part {
                        Part::Terminal(t) => {
                            if let Some(id) = target.terminal_id(t) {
                                set.insert(id);
                            }
                        }
                        Part::Production(dep) => {
                            if let Some(first) = target.first_terminals(dep) {
                                set.union_with(first);
                            }
                        }
                    }
                }
                (None, Some(Part::Production(dep))) => {
                    self.entered_first(grammar, dep, into, set)
                }
                _ => (),
            }
        }
    }

    /// Resolve every reference made by delegating productions against the
    ///   grammar it delegates to.
    pub fn validate(&self) -> Result<(), GrammarError> {
        for g in &self.grammars {
            for prod in g.productions() {
                let Some(ctx) = prod.context_tag() else {
                    continue;
                };

                let target = self.id_of(ctx).and_then(|id| self.get(id));

                let Some(target) = target else {
                    return Err(GrammarError::UndefinedGrammar {
                        production: prod.name().into(),
                        context: ctx.into(),
                    });
                };

                Self::validate_parts(target, prod)?;
            }
        }

        Ok(())
    }

    fn validate_parts(
        target: &Grammar,
        prod: &Production,
    ) -> Result<(), GrammarError> {
        for part in prod.parts() {
            match part {
                Part::Terminal(t) if target.terminal_id(t).is_none() => {
                    return Err(GrammarError::UndefinedTerminal {
                        grammar: target.name().into(),
                        terminal: t.clone(),
                    });
                }
                Part::Production(p) if target.alternatives(p).is_empty() => {
                    return Err(GrammarError::UndefinedProduction {
                        grammar: target.name().into(),
                        production: p.clone(),
                    });
                }
                _ => (),
            }
        }

        Ok(())
    }
}

/// Result of [`Registry::entry`].
#[derive(Debug, Default, PartialEq, Eq)]
pub(super) struct Entry {
    /// Distinct grammars to enter,
    ///   in order of discovery.
    pub targets: Vec<GrammarId>,

    /// Whether some derivation begins without entering another grammar.
    pub local: bool,
}

/// Named boolean flags.
///
/// Flags that have never been set read as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextState {
    flags: FxHashMap<String, bool>,
}

impl ContextState {
    pub fn get(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn set<S: Into<String>>(&mut self, name: S, value: bool) {
        self.flags.insert(name.into(), value);
    }

    /// Every flag that has been set,
    ///   in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Semantic action invoked with the matched text,
///   the context flags,
///   and the position of a completed production.
pub type Callback = Box<dyn FnMut(&str, &ContextState, Span)>;

/// A completed production awaiting its callback.
#[derive(Debug)]
struct PendingCallback {
    production: String,
    text: String,
    span: Span,
}

/// See the [module-level documentation](self) for more information.
#[derive(Default)]
pub(super) struct ParserState {
    registry: Registry,

    /// Grammar that every path starts in.
    base: Option<GrammarId>,

    flags: ContextState,
    callbacks: FxHashMap<String, Callback>,
    pending: Vec<PendingCallback>,

    paths: FxHashMap<PathId, PathContext>,
    symbols: SymbolTable,

    /// Root scope of the base grammar for the current scan.
    root: Option<ScopeId>,

    /// Matches of paths that reached the end of input.
    completed: Vec<ProductionMatch>,
}

impl ParserState {
    /// Register `grammar` and make it the base grammar.
    pub fn set_active_grammar(&mut self, grammar: Grammar) {
        self.base = Some(self.registry.register(grammar));
    }

    /// Register `grammar` without changing the base grammar.
    pub fn add_grammar(&mut self, grammar: Grammar) {
        self.registry.register(grammar);
    }

    /// Make the registered grammar `name` the base grammar.
    pub fn select_grammar(&mut self, name: &str) -> Result<(), LexerError> {
        match self.registry.id_of(name) {
            Some(id) => {
                self.base = Some(id);
                Ok(())
            }
            None => Err(LexerError::UnknownGrammar(name.into())),
        }
    }

    pub fn active_grammar(&self) -> Option<&Rc<Grammar>> {
        self.base.and_then(|id| self.registry.get(id))
    }

    pub fn grammar(&self, id: GrammarId) -> Option<&Rc<Grammar>> {
        self.registry.get(id)
    }

    /// Ensure that a scan can begin.
    pub fn validate(&self) -> Result<(), LexerError> {
        if self.base.is_none() {
            return Err(LexerError::NoActiveGrammar);
        }

        self.registry.validate().map_err(LexerError::from)
    }

    /// Forget every path,
    ///   all symbols,
    ///   and all completed matches.
    pub fn reset_paths(&mut self) {
        self.paths.clear();
        self.symbols.clear();
        self.completed.clear();
        self.pending.clear();

        self.root = self.base.map(|_| self.symbols.root());
    }

    /// Begin recognition for a new start path.
    pub fn start_path(&mut self, path: PathId) {
        if let (Some(base), Some(root)) = (self.base, self.root) {
            self.paths.insert(path, PathContext::new(base, root));
        }
    }

    /// Copy the recognition state of `parent` to a new path `child`.
    pub fn fork_path(&mut self, parent: PathId, child: PathId) {
        if let Some(ctx) = self.paths.get(&parent).cloned() {
            self.adopt(parent, child, ctx);
        }
    }

    /// Give the new path `child` the recognition state `ctx`,
    ///   derived from `parent`.
    pub fn adopt(&mut self, parent: PathId, child: PathId, ctx: PathContext) {
        self.paths.insert(child, ctx);
        self.symbols.fork(parent, child);
    }

    /// Discard a path that was invalidated or merged away.
    pub fn remove_path(&mut self, path: PathId) {
        self.paths.remove(&path);
        self.symbols.retract(path);
    }

    /// Retain the matches of a path that reached the end of input.
    pub fn finish_path(&mut self, path: PathId) {
        if let Some(ctx) = self.paths.remove(&path) {
            self.completed.extend(ctx.matches);
        }

        self.symbols.retract(path);
    }

    pub fn take_completed(&mut self) -> Vec<ProductionMatch> {
        take(&mut self.completed)
    }

    /// Grammar governing `path` and the terminals it expects next.
    ///
    /// The expected terminals are those that can continue the path's
    ///   derivation,
    ///     along with the skip terminals of the governing grammar.
    /// They are [`None`] when recognition places no restriction on the
    ///   path,
    ///     in which case the start terminals of the grammar apply.
    pub fn valid_terminals_for(
        &self,
        path: PathId,
    ) -> Option<(GrammarId, &Rc<Grammar>, Option<TerminalSet>)> {
        let ctx = self.paths.get(&path)?;
        let id = ctx.grammar()?;
        let grammar = self.registry.get(id)?;

        Some((id, grammar, self.expected(ctx, id, grammar)))
    }

    fn expected(
        &self,
        ctx: &PathContext,
        id: GrammarId,
        grammar: &Grammar,
    ) -> Option<TerminalSet> {
        let mut set = TerminalSet::default();

        match ctx.stack.last() {
            Some(Expect::Terminal {
                grammar: g,
                terminal,
                ..
            }) if *g == id => set.insert(*terminal),

            Some(Expect::Nonterminal {
                grammar: g,
                name,
                entered: false,
            }) if *g == id => {
                if let Some(first) = grammar.first_terminals(name) {
                    set.union_with(first);
                }
            }

            Some(Expect::Nonterminal {
                grammar: g,
                name,
                entered: true,
            }) => self.registry.entered_first(*g, name, id, &mut set),

            None if !grammar.start_productions().is_empty() => {
                for name in grammar.start_productions() {
                    if let Some(first) = grammar.first_terminals(name) {
                        set.union_with(first);
                    }
                }
            }

            _ => return None,
        }

        set.union_with(grammar.skip_terminals());
        Some(set)
    }

    pub fn merge_key(&self, path: PathId) -> Option<ContextKey> {
        self.paths.get(&path).map(PathContext::key)
    }

    /// Feed a token lexed on `path`.
    ///
    /// Accepted tokens must be followed by [`Self::settle`].
    pub fn recognize(&mut self, path: PathId, lx: &Lexeme) -> Recognition {
        let Self {
            paths,
            registry,
            flags,
            ..
        } = self;

        match paths.get_mut(&path) {
            Some(ctx) => ctx.recognize(registry, flags, lx),
            None => Recognition::Ignored,
        }
    }

    /// Recover a path that rejected `lx` along with every other path.
    pub fn recover(
        &mut self,
        path: PathId,
        lx: &Lexeme,
        src: &SourceContainer,
    ) {
        let Self {
            paths,
            registry,
            flags,
            root,
            ..
        } = self;

        let recovered = match (paths.get_mut(&path), *root) {
            (Some(ctx), Some(root)) => ctx.recover(registry, flags, lx, root),
            _ => false,
        };

        // Alternative entries are not forked during recovery.
        if recovered {
            self.settle(path, lx.span, src);
        }
    }

    /// Complete finished productions,
    ///   leave finished contexts,
    ///   and enter the context of the next expected production if it
    ///   begins in another grammar.
    ///
    /// `last` is the span of the token most recently consumed by `path`.
    /// Callbacks for completed productions are queued until
    ///   [`Self::flush_callbacks`].
    ///
    /// If the expected production can begin in more than one way,
    ///   `path` enters the first grammar that it may begin in and the
    ///   remaining ways are returned as recognition states to be forked
    ///   onto new paths.
    pub fn settle(
        &mut self,
        path: PathId,
        last: Span,
        src: &SourceContainer,
    ) -> Vec<PathContext> {
        let Self {
            paths,
            registry,
            symbols,
            pending,
            flags,
            ..
        } = self;

        let mut forks = Vec::new();

        let Some(ctx) = paths.get_mut(&path) else {
            return forks;
        };

        loop {
            match ctx.stack.last() {
                Some(Expect::Done { .. }) => {
                    let Some(Expect::Done {
                        grammar,
                        prod,
                        start,
                        binding,
                    }) = ctx.stack.pop()
                    else {
                        break;
                    };

                    let g = registry.get(grammar);
                    let p = registry.production(grammar, prod);

                    let (Some(g), Some(p)) = (g, p) else {
                        continue;
                    };

                    if let Some((name, span)) = binding {
                        symbols.declare(ctx.scope, name, span, path);
                    }

                    let text = src
                        .slice_between(start, last)
                        .unwrap_or_default()
                        .to_string();

                    pending.push(PendingCallback {
                        production: p.name().into(),
                        text: text.clone(),
                        span: start,
                    });

                    ctx.matches.push(ProductionMatch::new(
                        path,
                        g.name(),
                        p.name(),
                        start,
                        text,
                    ));
                }

                Some(Expect::Leave) => {
                    ctx.stack.pop();
                    ctx.grammars.pop();
                    ctx.scope = symbols.parent(ctx.scope).unwrap_or(ctx.scope);
                }

                Some(Expect::Nonterminal {
                    grammar,
                    name,
                    entered: false,
                }) => {
                    let entry = registry.entry(*grammar, name, flags);
                    let mut targets = entry.targets.into_iter();

                    let Some(first) = targets.next() else {
                        break;
                    };

                    let snapshot = match (entry.local, targets.len()) {
                        (false, 0) => None,
                        _ => Some(ctx.clone()),
                    };

                    if let Some(snapshot) = snapshot {
                        for into in targets {
                            let mut alt = snapshot.clone();

                            if enter(&mut alt, into, symbols) {
                                forks.push(alt);
                            }
                        }

                        if entry.local {
                            forks.push(snapshot);
                        }
                    }

                    enter(ctx, first, symbols);
                    break;
                }

                _ => break,
            }
        }

        forks
    }

    /// Invoke callbacks for every production completed since the last
    ///   flush,
    ///     in order of completion.
    pub fn flush_callbacks(&mut self) {
        for PendingCallback {
            production,
            text,
            span,
        } in take(&mut self.pending)
        {
            if let Some(callback) = self.callbacks.get_mut(&production) {
                callback(&text, &self.flags, span);
            }
        }
    }

    pub fn register_callback(
        &mut self,
        production: String,
        callback: Callback,
    ) {
        self.callbacks.insert(production, callback);
    }

    pub fn clear_callbacks(&mut self) {
        self.callbacks.clear();
    }

    pub fn set_context_state(&mut self, name: String, value: bool) {
        self.flags.set(name, value);
    }

    pub fn get_context_state(&self, name: &str) -> bool {
        self.flags.get(name)
    }

    pub fn context_state(&self) -> &ContextState {
        &self.flags
    }

    pub fn declare_symbol(
        &mut self,
        path: PathId,
        name: SymbolId,
        span: Span,
    ) -> bool {
        match self.paths.get(&path) {
            Some(ctx) => {
                self.symbols.declare(ctx.scope, name, span, path);
                true
            }
            None => false,
        }
    }

    pub fn lookup_symbol(&self, path: PathId, name: SymbolId) -> Option<Span> {
        let ctx = self.paths.get(&path)?;
        self.symbols.lookup(ctx.scope, name, path)
    }
}

/// Enter the grammar `into` on behalf of the production name expected on
///   top of the stack of `ctx`.
///
/// Returns `false` if the context stack of `ctx` is full,
///   in which case the path will reject its next token.
fn enter(
    ctx: &mut PathContext,
    into: GrammarId,
    symbols: &mut SymbolTable,
) -> bool {
    if ctx.grammars.try_push(into).is_err() {
        return false;
    }

    if let Some(Expect::Nonterminal { entered, .. }) = ctx.stack.last_mut() {
        *entered = true;
    }

    ctx.scope = symbols.open(ctx.scope);
    true
}

impl Debug for ParserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserState")
            .field("registry", &self.registry)
            .field("base", &self.base)
            .field("flags", &self.flags)
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .field("paths", &self.paths)
            .field("symbols", &self.symbols)
            .finish_non_exhaustive()
    }
}
