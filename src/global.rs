// Global constants across the entirety of the lexing core
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

//! System-wide static configuration.
//!
//! This module provides a system-wide configuration.
//! Subsystems should reference these values rather than defining their own
//!   and risk incompatibilities or maintenance issues as requirements
//!   change.
//!
//! By convention,
//!   import this entire module rather than individual members and reference
//!   them as `global::foo` to emphasize their nature and risk.
//!
//! Runtime configuration of a [`Lexer`](crate::lexer::Lexer) is provided
//!   by [`LexerConfig`](crate::lexer::LexerConfig),
//!     whose defaults are defined here.

use std::num;

/// A size capable of representing every interned string of a single scan
///   session.
pub type SymSize = u32;

/// A non-zero equivalent of [`SymSize`].
pub type NonZeroSymSize = num::NonZeroU32;

/// A size capable of representing every lexer path ever created during a
///   single scan.
///
/// Path identifiers are retired rather than reused,
///   so this must accommodate every fork of a scan,
///     not just the paths that are live at any one time.
pub type PathIdSize = u32;

/// A size capable of representing every grammar registered with a single
///   lexer.
pub type GrammarIdSize = u16;

/// A size capable of representing line numbers and byte columns within a
///   single source container.
pub type SourcePosSize = u32;

/// Initial capacity in bytes of the arena backing interned token values.
///
/// The arena grows as needed;
///   this merely avoids a series of small allocations at the start of a
///   scan.
pub const DEFAULT_INITIAL_ARENA_SIZE: usize = 64 * 1024;

/// Number of [`LexerPath`](crate::lexer::LexerPath) records that are
///   pre-allocated by the path pool.
///
/// Typical ambiguity widths are small;
///   exceeding this capacity is permitted but counted as overflow.
pub const DEFAULT_POOL_SOFT_CAPACITY: usize = 32;

/// Maximum number of lexer paths that may be live at once before new
///   forks are refused.
pub const DEFAULT_MAX_PATHS: usize = 256;

/// Maximum nesting depth of embedded grammar contexts on a single path.
///
/// Context stacks are stored inline,
///   so this also determines the size of each path's context record.
pub const MAX_CONTEXT_DEPTH: usize = 8;

/// Initial capacity of the interner's string-to-symbol map.
pub const INIT_INTERNER_CAPACITY: usize = 1024;
