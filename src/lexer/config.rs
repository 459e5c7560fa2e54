// Lexer configuration
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


//! Runtime configuration of a [`Lexer`](super::Lexer).

use crate::global;

/// Options recognized by a [`Lexer`](super::Lexer).
///
/// Defaults are defined by [`global`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerConfig {
    /// Emit [`LEXERPATH_REMOVED`](crate::grammar::LEXERPATH_REMOVED) and
    ///   [`LEXERPATH_MERGE`](crate::grammar::LEXERPATH_MERGE) tokens as
    ///   paths are invalidated and merged.
    pub return_lexer_path_tokens: bool,

    /// Initial size in bytes of the arena backing interned token values.
    pub initial_arena_size: usize,

    /// Number of path records pre-allocated by the path pool.
    pub pool_soft_capacity: usize,

    /// Maximum number of concurrently live paths.
    ///
    /// Forks that would exceed this bound are refused;
    ///   the preferred match always advances the existing path,
    ///   so the scan still makes progress.
    pub max_paths: usize,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            return_lexer_path_tokens: false,
            initial_arena_size: global::DEFAULT_INITIAL_ARENA_SIZE,
            pool_soft_capacity: global::DEFAULT_POOL_SOFT_CAPACITY,
            max_paths: global::DEFAULT_MAX_PATHS,
        }
    }
}

impl LexerConfig {
    pub fn with_lexer_path_tokens(self, enabled: bool) -> Self {
        Self {
            return_lexer_path_tokens: enabled,
            ..self
        }
    }

    /// Bound the number of concurrently live paths.
    ///
    /// A bound of `0` is treated as `1`,
    ///   since the start path must always exist.
    pub fn with_max_paths(self, max_paths: usize) -> Self {
        Self {
            max_paths: max_paths.max(1),
            ..self
        }
    }
}
