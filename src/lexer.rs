// Multi-path lexer
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


//! Multi-path lexing and production recognition.
//!
//! A [`Lexer`] scans a [`SourceContainer`] by maintaining a set of
//!   parallel _paths_,
//!     each representing one hypothesis about how the input has been
//!     tokenized and parsed so far.
//! Lexical and syntactic ambiguity are resolved without backtracking:
//!   where more than one interpretation is possible,
//!     the path _forks_;
//!   paths that reconverge are _merged_;
//!   and paths that can no longer be viable are _invalidated_.
//!
//! The lexer is a pull-based generator.
//! Each call to [`Lexer::next_batch`]
//!   (or each iteration of [`Lexer::next_tokens`])
//!   performs a single step:
//!
//!   1. Paths invalidated since the last step are released,
//!        optionally emitting [`LEXERPATH_REMOVED`] tokens;
//!   2. Paths sharing a position and recognition state are merged into the
//!        oldest of them,
//!          optionally emitting [`LEXERPATH_MERGE`] tokens;
//!   3. Every remaining path is advanced by one token in path creation
//!        order,
//!          forking a new path for each additional match;
//!          and
//!   4. The resulting batch of tokens is yielded,
//!        even if it is empty.
//!
//! Input that no terminal of the governing grammar matches produces a
//!   single-character [`UNKNOWN`] token;
//!     the scan always makes progress and never fails.
//! A path that reaches the end of input closes silently.
//! Scanning ends once no path remains.
//!
//! ```
//! use forkscan::grammar::{GrammarBuilder, Terminal};
//! use forkscan::lexer::{Lexer, LexerConfig};
//! use forkscan::source::SourceContainer;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut lexer = Lexer::new(LexerConfig::default());
//!
//! lexer.set_active_grammar(
//!     GrammarBuilder::new("words")
//!         .terminal(Terminal::new("WORD", "[a-z]+")?)
//!         .terminal(Terminal::new("WS", " +")?)
//!         .build()?,
//! );
//!
//! lexer.load_source(SourceContainer::new("hello world"));
//! lexer.reset()?;
//!
//! let batches = lexer.next_tokens().collect::<Vec<_>>();
//! let values = batches
//!     .iter()
//!     .flatten()
//!     .map(|tok| tok.terminal().name())
//!     .collect::<Vec<_>>();
//!
//! assert_eq!(vec!["WORD", "WS", "WORD"], values);
//! # Ok(())
//! # }
//! ```
//!
//! Productions are recognized incrementally on each path as tokens are
//!   produced
//!     (see [`recognize`]).
//! While a path is within a production,
//!   only terminals that can continue it are attempted;
//!     should none match,
//!       the whole grammar is attempted so that the path can be rejected.
//! When a production that begins in an embedded grammar is expected,
//!   that grammar is pushed onto the path's context stack and governs
//!   lexing until the production completes;
//!     if it may begin in more than one grammar,
//!       the path forks once for each.
//! Each path has its own context stack,
//!   so paths in different contexts never interfere.
//!
//! Lexer Paths and Memory
//! ======================
//! Path records are pooled
//!   (see [`crate::mem::Pool`])
//!   and referenced only by [`PathId`];
//!     the lexer never holds a reference to a released record.
//! Token values are interned
//!   (see [`crate::sym`]),
//!   so repeated lexemes are stored once and compare by [`SymbolId`].

mod config;
mod matcher;
mod path;
mod recognize;
mod scope;
mod state;
mod trace;

pub use config::LexerConfig;
pub use path::{LexerPath, PathId};
pub use recognize::ProductionMatch;
pub use state::{Callback, ContextState, GrammarId};

use crate::{
    global,
    grammar::{
        Grammar, GrammarError, Terminal, TerminalSet, LEXERPATH_MERGE,
        LEXERPATH_REMOVED, UNKNOWN,
    },
    mem::{Pool, PoolIx, PoolStats},
    source::SourceContainer,
    span::Span,
    sym::{DefaultInterner, SymbolId},
};
use fxhash::FxHashMap;
use matcher::{match_terminals, TerminalMatch};
use recognize::{Lexeme, PathContext, Recognition};
use state::ParserState;
use std::{
    collections::{btree_map, hash_map::Entry, BTreeMap},
    error::Error,
    fmt::{self, Display},
    iter,
    mem::take,
    rc::Rc,
};
use trace::LexerTrace;

#[cfg(not(any(test, feature = "parser-trace-stderr")))]
type DefaultTrace = trace::VoidTrace;
#[cfg(any(test, feature = "parser-trace-stderr"))]
type DefaultTrace = trace::HumanReadableTrace;

/// A single lexeme produced on a single path.
///
/// Tokens are never mutated after creation.
/// Token values are interned by the [`Lexer`] that produced them;
///   see [`Lexer::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    path: PathId,
    terminal: Rc<Terminal>,
    value: SymbolId,
    span: Span,
}

impl Token {
    /// Path that produced this token.
    pub fn path(&self) -> PathId {
        self.path
    }

    pub fn terminal(&self) -> &Rc<Terminal> {
        &self.terminal
    }

    /// Interned text of the token.
    ///
    /// For [`LEXERPATH_MERGE`] tokens this is the decimal id of the
    ///   surviving path;
    ///     for [`LEXERPATH_REMOVED`] tokens it is empty.
    pub fn value(&self) -> SymbolId {
        self.value
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Zero-indexed line of the token.
    pub fn line(&self) -> usize {
        self.span.line() as usize
    }

    /// Zero-indexed byte column of the token.
    pub fn col(&self) -> usize {
        self.span.col() as usize
    }

    /// Whether this token describes path lifecycle rather than input.
    pub fn is_lifecycle(&self) -> bool {
        matches!(self.terminal.name(), LEXERPATH_MERGE | LEXERPATH_REMOVED)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at {} on {}",
            self.terminal, self.value, self.span, self.path
        )
    }
}

/// Failure to begin or perform a scan.
///
/// Conditions local to a single path never produce errors.
#[derive(Debug, PartialEq)]
pub enum LexerError {
    /// A grammar definition is invalid.
    Grammar(GrammarError),

    /// No base grammar has been set.
    NoActiveGrammar,

    /// No grammar has been registered by the given name.
    UnknownGrammar(String),

    /// No source has been loaded.
    NoSource,
}

impl Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grammar(e) => e.fmt(f),
            Self::NoActiveGrammar => write!(f, "no active grammar"),
            Self::UnknownGrammar(name) => {
                write!(f, "unknown grammar `{name}`")
            }
            Self::NoSource => write!(f, "no source loaded"),
        }
    }
}

impl Error for LexerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grammar(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GrammarError> for LexerError {
    fn from(e: GrammarError) -> Self {
        Self::Grammar(e)
    }
}

/// Multi-path lexer and production recognizer.
///
/// See the [module-level documentation](self) for more information.
pub struct Lexer {
    config: LexerConfig,
    state: ParserState,
    interner: DefaultInterner,
    pool: Pool<LexerPath>,

    /// Live paths in creation order.
    active: BTreeMap<PathId, PoolIx>,

    /// Paths removed from [`Self::active`] whose records are released at
    ///   the beginning of the next step.
    pending_invalidation: Vec<(PathId, PoolIx)>,

    next_path_id: global::PathIdSize,
    steps: usize,

    source: Option<Rc<SourceContainer>>,

    removed: Rc<Terminal>,
    merge: Rc<Terminal>,
    unknown: Rc<Terminal>,

    trace: DefaultTrace,
}

impl Lexer {
    pub fn new(config: LexerConfig) -> Self {
        Self {
            config,
            state: ParserState::default(),
            interner: Self::new_interner(&config),
            pool: Pool::new(config.pool_soft_capacity, LexerPath::default),
            active: BTreeMap::new(),
            pending_invalidation: Vec::new(),
            next_path_id: 0,
            steps: 0,
            source: None,
            removed: Rc::new(Terminal::reserved(LEXERPATH_REMOVED)),
            merge: Rc::new(Terminal::reserved(LEXERPATH_MERGE)),
            unknown: Rc::new(Terminal::reserved(UNKNOWN)),
            trace: DefaultTrace::default(),
        }
    }

    fn new_interner(config: &LexerConfig) -> DefaultInterner {
        DefaultInterner::with_capacity(
            global::INIT_INTERNER_CAPACITY,
            config.initial_arena_size,
        )
    }

    pub fn config(&self) -> &LexerConfig {
        &self.config
    }

    /// Register `grammar` and make it the base grammar for subsequent
    ///   scans.
    ///
    /// A grammar registered under an existing name replaces it.
    /// Changes take effect on the next [`Self::reset`].
    pub fn set_active_grammar(&mut self, grammar: Grammar) {
        self.state.set_active_grammar(grammar);
    }

    /// Register an embedded grammar that productions may delegate to.
    pub fn add_grammar(&mut self, grammar: Grammar) {
        self.state.add_grammar(grammar);
    }

    /// Make the registered grammar `name` the base grammar.
    pub fn select_grammar(&mut self, name: &str) -> Result<(), LexerError> {
        self.state.select_grammar(name)
    }

    pub fn active_grammar_name(&self) -> Option<&str> {
        self.state.active_grammar().map(|g| g.name())
    }

    /// Provide the source for subsequent scans.
    ///
    /// Scanning begins with [`Self::reset`].
    pub fn load_source(&mut self, source: SourceContainer) {
        self.source = Some(Rc::new(source));
    }

    pub fn source(&self) -> Option<&SourceContainer> {
        self.source.as_deref()
    }

    /// Begin a new scan of the loaded source.
    ///
    /// All grammars are validated,
    ///   every path is released to the pool,
    ///   interned values of any prior scan are discarded,
    ///   and a single start path is created at the start of the source.
    pub fn reset(&mut self) -> Result<(), LexerError> {
        self.state.validate()?;

        if self.source.is_none() {
            return Err(LexerError::NoSource);
        }

        self.release_all();
        self.interner.clear();
        self.state.reset_paths();
        self.next_path_id = 0;
        self.steps = 0;

        let (id, _) = self.new_path(0, 0);
        self.state.start_path(id);

        Ok(())
    }

    /// Release every path,
    ///   the pool's records,
    ///   all interned values,
    ///   and the source.
    ///
    /// The lexer may be used again after loading a source and calling
    ///   [`Self::reset`].
    pub fn dispose(&mut self) {
        self.release_all();
        self.pool.clear();
        self.state.reset_paths();
        self.interner = DefaultInterner::new();
        self.source = None;
    }

    fn release_all(&mut self) {
        self.active.clear();
        self.pending_invalidation.clear();
        self.pool.drain();
    }

    /// Acquire a path record positioned at `line` and `col`.
    fn new_path(&mut self, line: usize, col: usize) -> (PathId, PoolIx) {
        let id = PathId::new(self.next_path_id);
        self.next_path_id += 1;

        let ix = self.pool.acquire();

        if let Some(path) = self.pool.get_mut(ix) {
            path.start(id, line, col);
        }

        self.active.insert(id, ix);
        (id, ix)
    }

    fn release_path(&mut self, ix: PoolIx) {
        let result = self.pool.release(ix);
        debug_assert!(result.is_ok(), "{result:?}");
    }

    fn position(&self, ix: PoolIx) -> (usize, usize) {
        self.pool
            .get(ix)
            .map(|path| (path.line(), path.col()))
            .unwrap_or_default()
    }

    /// Whether a new path may be created.
    fn can_fork(&self) -> bool {
        self.active.len() < self.config.max_paths
    }

    /// Produce the next batch of tokens.
    ///
    /// Returns [`None`] once no path is active and no invalidation is
    ///   pending;
    ///     otherwise a batch is returned even if it is empty.
    pub fn next_batch(&mut self) -> Option<Vec<Token>> {
        if self.active.is_empty() && self.pending_invalidation.is_empty() {
            return None;
        }

        self.steps += 1;
        self.trace.trace_step_begin(
            self.steps,
            self.active.len(),
            self.pending_invalidation.len(),
        );

        let mut batch = Vec::new();

        self.flush_invalidations(&mut batch);
        self.merge_paths(&mut batch);
        self.advance_paths(&mut batch);

        self.trace.trace_step_end(&batch, self.active.len());

        Some(batch)
    }

    /// Lazily iterate over token batches.
    pub fn next_tokens(&mut self) -> Batches<'_> {
        Batches { lexer: self }
    }

    /// Scan `source` to completion using the registered grammar
    ///   `grammar_name` as the base grammar,
    ///     returning the productions recognized by every path that reached
    ///     the end of input.
    ///
    /// Matches are ordered by the order in which their paths closed,
    ///   then by order of completion.
    pub fn parse(
        &mut self,
        grammar_name: &str,
        source: SourceContainer,
    ) -> Result<Vec<ProductionMatch>, LexerError> {
        self.select_grammar(grammar_name)?;
        self.load_source(source);
        self.reset()?;

        while self.next_batch().is_some() {}

        Ok(self.state.take_completed())
    }

    fn flush_invalidations(&mut self, batch: &mut Vec<Token>) {
        for (id, ix) in take(&mut self.pending_invalidation) {
            if self.config.return_lexer_path_tokens {
                let (line, col) = self.position(ix);

                batch.push(Token {
                    path: id,
                    terminal: Rc::clone(&self.removed),
                    value: self.interner.intern(""),
                    span: Span::from_usize(line, col, 0),
                });
            }

            self.release_path(ix);
        }
    }

    /// Merge paths sharing a position and recognition state into the
    ///   oldest of them.
    fn merge_paths(&mut self, batch: &mut Vec<Token>) {
        let mut seen = FxHashMap::default();
        let mut merged = Vec::new();

        for (&id, &ix) in &self.active {
            let (line, col) = self.position(ix);
            let key = (line, col, self.state.merge_key(id));

            match seen.entry(key) {
                Entry::Occupied(survivor) => {
                    merged.push((id, ix, *survivor.get()))
                }
                Entry::Vacant(v) => {
                    v.insert(id);
                }
            }
        }

        for (id, ix, survivor) in merged {
            self.trace.trace_merge(id, survivor);

            self.active.remove(&id);
            self.state.remove_path(id);

            if self.config.return_lexer_path_tokens {
                let (line, col) = self.position(ix);
                let value = survivor.as_u32().to_string();

                batch.push(Token {
                    path: id,
                    terminal: Rc::clone(&self.merge),
                    value: self.interner.intern(&value),
                    span: Span::from_usize(line, col, 0),
                });
            }

            self.release_path(ix);
        }
    }

    /// Advance every active path by one token.
    fn advance_paths(&mut self, batch: &mut Vec<Token>) {
        let Some(src) = self.source.clone() else {
            return;
        };

        let ids = self
            .active
            .iter()
            .map(|(&id, &ix)| (id, ix))
            .collect::<Vec<_>>();

        let mut viable = false;
        let mut rejected = Vec::new();

        for (id, ix) in ids {
            let Some((line, col)) = self.seek(id, ix, &src) else {
                continue;
            };

            let Some((gid, grammar, expected)) = self.valid_terminals(id)
            else {
                self.close_path(id, ix);
                continue;
            };

            let suffix = src
                .line(line)
                .and_then(|l| l.suffix(col))
                .unwrap_or_default();

            let start = grammar.start_terminals();
            let valid = expected.as_ref().unwrap_or(start);
            let mut matches = match_terminals(&grammar, valid, suffix);

            // Nothing that the path expects is here;
            //   lex with the whole grammar so that the recognizer rejects
            //   the path rather than skipping over the input.
            if matches.is_empty() && expected.is_some() {
                matches = match_terminals(&grammar, start, suffix);
            }

            // Unmatched input does not make a path viable.
            if matches.is_empty() {
                self.emit_unknown(id, ix, (line, col), suffix, batch);
                continue;
            }

            // Forks copy the position and recognition state of the path
            //   before it consumes its own match.
            let mut targets = vec![(id, ix, &matches[0])];

            for m in &matches[1..] {
                if !self.can_fork() {
                    self.trace.trace_fork_refused(
                        id,
                        &m.terminal,
                        self.config.max_paths,
                    );
                    continue;
                }

                let (fid, fix) = self.new_path(line, col);
                self.state.fork_path(id, fid);
                self.trace.trace_fork(id, fid, &m.terminal);

                targets.push((fid, fix, m));
            }

            for (pid, pix, m) in targets {
                let lx = self.emit_match(pid, pix, gid, (line, col), m, batch);
                let next = (line, col + m.len());

                match self.consume(pid, next, &lx, m, &src, batch) {
                    true => viable = true,
                    false => rejected.push((pid, lx)),
                }
            }
        }

        // Paths that cannot continue are discarded only when some other
        //   path can;
        //     otherwise every path recovers and scanning continues.
        if viable {
            for (id, _) in rejected {
                self.invalidate_lexer_path(id);
            }
        } else {
            for (id, lx) in rejected {
                self.state.recover(id, &lx, &src);
            }

            self.state.flush_callbacks();
        }
    }

    /// Position `id` at its next unconsumed byte,
    ///   skipping past exhausted lines.
    ///
    /// Paths that have exhausted the input are closed.
    fn seek(
        &mut self,
        id: PathId,
        ix: PoolIx,
        src: &SourceContainer,
    ) -> Option<(usize, usize)> {
        let (mut line, mut col) = self.position(ix);

        loop {
            match src.line(line) {
                Some(l) if col < l.len() => break,
                Some(_) if line + 1 < src.line_count() => {
                    line += 1;
                    col = 0;
                }
                _ => {
                    self.close_path(id, ix);
                    return None;
                }
            }
        }

        if let Some(path) = self.pool.get_mut(ix) {
            path.set_position(line, col);
        }

        Some((line, col))
    }

    /// Grammar governing `id` and the terminals it expects,
    ///   if recognition restricts them.
    fn valid_terminals(
        &self,
        id: PathId,
    ) -> Option<(GrammarId, Rc<Grammar>, Option<TerminalSet>)> {
        self.state
            .valid_terminals_for(id)
            .map(|(gid, g, expected)| (gid, Rc::clone(g), expected))
    }

    /// Silently retire a path that reached the end of input.
    fn close_path(&mut self, id: PathId, ix: PoolIx) {
        self.trace.trace_close(id);

        self.active.remove(&id);
        self.state.finish_path(id);
        self.release_path(ix);
    }

    /// Emit a one-character [`UNKNOWN`] token and advance past it.
    ///
    /// Unmatched input never participates in recognition.
    fn emit_unknown(
        &mut self,
        id: PathId,
        ix: PoolIx,
        (line, col): (usize, usize),
        suffix: &str,
        batch: &mut Vec<Token>,
    ) {
        let len = suffix.chars().next().map_or(1, char::len_utf8);
        let text = suffix.get(..len).unwrap_or_default();

        let value = self.interner.intern(text);
        let span = Span::from_usize(line, col, len);

        if let Some(path) = self.pool.get_mut(ix) {
            path.advance(len);
        }

        batch.push(Token {
            path: id,
            terminal: Rc::clone(&self.unknown),
            value,
            span,
        });
    }

    /// Emit a token for `m` on path `id` and advance past it.
    fn emit_match(
        &mut self,
        id: PathId,
        ix: PoolIx,
        gid: GrammarId,
        (line, col): (usize, usize),
        m: &TerminalMatch,
        batch: &mut Vec<Token>,
    ) -> Lexeme {
        let value = self.interner.intern(m.text);
        let span = Span::from_usize(line, col, m.len());

        if let Some(path) = self.pool.get_mut(ix) {
            path.advance(m.len());
        }

        batch.push(Token {
            path: id,
            terminal: Rc::clone(&m.terminal),
            value,
            span,
        });

        Lexeme {
            grammar: gid,
            terminal: Some(m.id),
            skip: m.terminal.is_skip(),
            value,
            span,
        }
    }

    /// Feed a token to the recognizer of `id`,
    ///   forking a path for each additional derivation and for each
    ///   additional way of entering an embedded grammar.
    ///
    /// Returns whether the path remains viable.
    fn consume(
        &mut self,
        id: PathId,
        pos: (usize, usize),
        lx: &Lexeme,
        m: &TerminalMatch,
        src: &SourceContainer,
        batch: &mut Vec<Token>,
    ) -> bool {
        let alts = match self.state.recognize(id, lx) {
            Recognition::Ignored => return true,
            Recognition::Rejected => return false,
            Recognition::Accepted(alts) => alts,
        };

        // Adopted before settling so that forks do not inherit
        //   declarations made by productions completed on `id`.
        let mut forked = Vec::with_capacity(alts.len());

        for ctx in alts {
            if let Some(fid) = self.fork_context(id, ctx, pos, lx, m, batch) {
                forked.push(fid);
            }
        }

        for pid in iter::once(id).chain(forked) {
            for ctx in self.state.settle(pid, lx.span, src) {
                self.fork_context(pid, ctx, pos, lx, m, batch);
            }
        }

        self.state.flush_callbacks();
        true
    }

    /// Create a path at `line` and `col` with the recognition state `ctx`,
    ///   derived from `parent`,
    ///   that has consumed the same token as `parent`.
    fn fork_context(
        &mut self,
        parent: PathId,
        ctx: PathContext,
        (line, col): (usize, usize),
        lx: &Lexeme,
        m: &TerminalMatch,
        batch: &mut Vec<Token>,
    ) -> Option<PathId> {
        if !self.can_fork() {
            self.trace.trace_fork_refused(
                parent,
                &m.terminal,
                self.config.max_paths,
            );
            return None;
        }

        let (fid, _) = self.new_path(line, col);
        self.state.adopt(parent, fid, ctx);
        self.trace.trace_fork(parent, fid, &m.terminal);

        batch.push(Token {
            path: fid,
            terminal: Rc::clone(&m.terminal),
            value: lx.value,
            span: lx.span,
        });

        Some(fid)
    }

    /// Terminate the path `id`.
    ///
    /// The path is removed immediately and its record released at the
    ///   beginning of the next step.
    /// Returns `false` if no such path is active.
    pub fn invalidate_lexer_path(&mut self, id: PathId) -> bool {
        match self.active.remove(&id) {
            Some(ix) => {
                self.trace.trace_invalidate(id);

                self.state.remove_path(id);
                self.pending_invalidation.push((id, ix));
                true
            }
            None => false,
        }
    }

    /// Grammar governing `path` and the terminals valid at its position.
    ///
    /// While `path` is recognizing a production,
    ///   only terminals that can continue it are valid,
    ///     along with the grammar's skip terminals.
    /// Otherwise the start terminals of the grammar are valid.
    pub fn valid_terminals_for(
        &self,
        path: PathId,
    ) -> Option<(&Grammar, TerminalSet)> {
        self.state.valid_terminals_for(path).map(|(_, g, expected)| {
            let valid =
                expected.unwrap_or_else(|| g.start_terminals().clone());

            (g.as_ref(), valid)
        })
    }

    /// Register a callback to be invoked whenever a production named
    ///   `production` completes on any path.
    ///
    /// A callback replaces any existing callback for the same production.
    /// Callbacks observe a completed production;
    ///   they cannot affect the state of any path.
    pub fn register_callback<S, F>(&mut self, production: S, callback: F)
    where
        S: Into<String>,
        F: FnMut(&str, &ContextState, Span) + 'static,
    {
        self.state
            .register_callback(production.into(), Box::new(callback));
    }

    pub fn clear_callbacks(&mut self) {
        self.state.clear_callbacks();
    }

    pub fn set_context_state<S: Into<String>>(&mut self, name: S, value: bool) {
        self.state.set_context_state(name.into(), value);
    }

    /// Value of the context flag `name`;
    ///   flags that have never been set are `false`.
    pub fn get_context_state(&self, name: &str) -> bool {
        self.state.get_context_state(name)
    }

    pub fn context_state(&self) -> &ContextState {
        self.state.context_state()
    }

    /// Declare `name` in the current scope of `path` at the path's
    ///   current position.
    ///
    /// Returns `false` if no such path is active.
    pub fn declare_symbol(&mut self, path: PathId, name: &str) -> bool {
        let Some(&ix) = self.active.get(&path) else {
            return false;
        };

        let (line, col) = self.position(ix);
        let sym = self.interner.intern(name);

        self.state
            .declare_symbol(path, sym, Span::from_usize(line, col, name.len()))
    }

    /// Span of the declaration of `name` visible to `path`,
    ///   searching from the path's current scope outward.
    pub fn lookup_symbol(&self, path: PathId, name: &str) -> Option<Span> {
        let sym = self.interner.intern_soft(name)?;
        self.state.lookup_symbol(path, sym)
    }

    /// Resolve an interned token value.
    pub fn resolve(&self, sym: SymbolId) -> Option<&str> {
        self.interner.index_lookup(sym)
    }

    /// Live paths in creation order.
    pub fn active_paths(&self) -> ActivePaths<'_> {
        ActivePaths {
            lexer: self,
            iter: self.active.iter(),
        }
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new(LexerConfig::default())
    }
}

/// Lazy sequence of token batches produced by [`Lexer::next_tokens`].
///
/// The sequence ends once the lexer has no paths remaining;
///   it may be restarted using [`Lexer::reset`].
pub struct Batches<'a> {
    lexer: &'a mut Lexer,
}

impl<'a> Iterator for Batches<'a> {
    type Item = Vec<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lexer.next_batch()
    }
}

/// Live paths of a [`Lexer`] in creation order.
pub struct ActivePaths<'a> {
    lexer: &'a Lexer,
    iter: btree_map::Iter<'a, PathId, PoolIx>,
}

impl<'a> Iterator for ActivePaths<'a> {
    type Item = &'a LexerPath;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter
            .by_ref()
            .find_map(|(_, &ix)| self.lexer.pool.get(ix))
    }
}

#[cfg(test)]
mod test;
