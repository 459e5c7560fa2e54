// Lexer tracing
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


//! Tracing for lexing operations.
//!
//! This provides human-readable traces on standard error for every step
//!   of a [`Lexer`](super::Lexer) and for every fork,
//!     merge,
//!     invalidation,
//!     and closure of a path.
//! These traces are provided automatically when `cfg(test)`,
//!   which means that they are automatically included in the output of any
//!   test failure.
//!
//! Outside of tests,
//!   this can be enabled at build time using the `parser-trace-stderr`
//!   feature flag.
//!
//! _These traces are not meant to be machine-readable!_
//! Do not try to use the human-readable traces in that way since the format
//!   is subject to change without notice.

use super::{PathId, Token};
use crate::grammar::Terminal;

pub(super) trait LexerTrace: Default {
    /// Output the upper portion of a step trace.
    ///
    /// There is no means to return an error and a failure to output the
    ///   trace should not interrupt processing.
    fn trace_step_begin(&mut self, step: usize, active: usize, pending: usize);

    /// Output the lower portion of a step trace,
    ///   including the batch that was yielded.
    fn trace_step_end(&mut self, batch: &[Token], active: usize);

    /// A new path was created from `parent`.
    fn trace_fork(
        &mut self,
        parent: PathId,
        child: PathId,
        terminal: &Terminal,
    );

    /// A fork from `parent` was refused because `max_paths` were already
    ///   live.
    fn trace_fork_refused(
        &mut self,
        parent: PathId,
        terminal: &Terminal,
        max_paths: usize,
    );

    fn trace_merge(&mut self, merged: PathId, survivor: PathId);
    fn trace_invalidate(&mut self, path: PathId);
    fn trace_close(&mut self, path: PathId);
}

/// Perform no tracing.
///
/// This should be used by default for non-test builds,
///   since tracing can incur a significant performance cost.
#[derive(Debug, PartialEq, Default)]
pub struct VoidTrace;

impl LexerTrace for VoidTrace {
    fn trace_step_begin(&mut self, _: usize, _: usize, _: usize) {}
    fn trace_step_end(&mut self, _: &[Token], _: usize) {}
    fn trace_fork(&mut self, _: PathId, _: PathId, _: &Terminal) {}
    fn trace_fork_refused(&mut self, _: PathId, _: &Terminal, _: usize) {}
    fn trace_merge(&mut self, _: PathId, _: PathId) {}
    fn trace_invalidate(&mut self, _: PathId) {}
    fn trace_close(&mut self, _: PathId) {}
}

/// Human-readable [`LexerTrace`].
///
/// Note: if one of these trace blocks does not fully output,
///   then you may have a `Display::fmt` or `Debug::fmt` panic in
///   [`Token`].
///
/// See [module-level](super) documentation for more information.
#[derive(Debug, PartialEq, Default)]
pub struct HumanReadableTrace;

impl LexerTrace for HumanReadableTrace {
    fn trace_step_begin(&mut self, step: usize, active: usize, pending: usize) {
        eprint!(
            "\
[Lexer::next_batch] step {step}
| ==> {active} active path(s), {pending} pending invalidation
|\n"
        );
    }

    fn trace_step_end(&mut self, batch: &[Token], active: usize) {
        for tok in batch {
            eprint!(
                "\
| ==> tok: {tok}
|  |  {tok:?}\n"
            );
        }

        eprint!(
            "\
|
| ==> {active} active path(s) after step\n"
        );

        #[allow(unused_variables)]
        let cfg = ""; // so that this compiles without matching cfg
        #[cfg(feature = "parser-trace-stderr")]
        #[allow(unused_variables)]
        let cfg = "feature = \"parser-trace-stderr\"";
        #[cfg(test)] // takes precedence if both are set
        let cfg = "test";
        eprint!(
            "= note: this trace was output as a debugging aid \
                because `cfg({cfg})`.\n\n",
        );
    }

    fn trace_fork(
        &mut self,
        parent: PathId,
        child: PathId,
        terminal: &Terminal,
    ) {
        eprintln!("| ==> fork: {parent} -> {child} on {terminal}");
    }

    fn trace_fork_refused(
        &mut self,
        parent: PathId,
        terminal: &Terminal,
        max_paths: usize,
    ) {
        eprintln!(
            "| ==> fork refused: {parent} on {terminal} \
                ({max_paths} path(s) live)"
        );
    }

    fn trace_merge(&mut self, merged: PathId, survivor: PathId) {
        eprintln!("| ==> merge: {merged} into {survivor}");
    }

    fn trace_invalidate(&mut self, path: PathId) {
        eprintln!("| ==> invalidate: {path}");
    }

    fn trace_close(&mut self, path: PathId) {
        eprintln!("| ==> close: {path}");
    }
}
