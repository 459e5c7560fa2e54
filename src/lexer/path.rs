// Lexer paths
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


//! Pooled lexer path records.
//!
//! A [`LexerPath`] represents one parallel hypothesis about how the input
//!   has been tokenized so far.
//! Paths are referenced externally only by their [`PathId`];
//!   the records themselves live in a [`Pool`](crate::mem::Pool) and are
//!   recycled as paths are merged,
//!     invalidated,
//!     or closed.

use crate::{global, mem::Poolable};
use std::fmt::{self, Display};

/// Externally stable identifier of a [`LexerPath`].
///
/// Identifiers are assigned in creation order and are never reused within
///   a single scan,
///     so ordering by [`PathId`] is ordering by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathId(global::PathIdSize);

assert_eq_size!(PathId, global::PathIdSize);

impl PathId {
    /// Identifier of a path record that is not in use.
    pub const NOTSET: PathId = PathId(global::PathIdSize::MAX);

    pub(super) fn new(id: global::PathIdSize) -> Self {
        debug_assert!(id != Self::NOTSET.0, "PathId range exhausted");
        Self(id)
    }

    pub fn as_u32(self) -> global::PathIdSize {
        self.0
    }

    pub fn is_set(self) -> bool {
        self != Self::NOTSET
    }
}

impl Display for PathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NOTSET => write!(f, "path #NOTSET"),
            Self(id) => write!(f, "path #{id}"),
        }
    }
}

/// One parallel tokenization hypothesis.
///
/// Positions are a zero-indexed line number and a byte column within that
///   line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerPath {
    id: PathId,
    line: usize,
    col: usize,
    in_use: bool,
}

impl LexerPath {
    pub fn id(&self) -> PathId {
        self.id
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn col(&self) -> usize {
        self.col
    }

    /// Assign an identity and position to a freshly acquired record.
    pub(super) fn start(&mut self, id: PathId, line: usize, col: usize) {
        debug_assert!(self.in_use && !self.id.is_set());

        self.id = id;
        self.line = line;
        self.col = col;
    }

    pub(super) fn set_position(&mut self, line: usize, col: usize) {
        self.line = line;
        self.col = col;
    }

    /// Advance by `len` bytes within the current line.
    pub(super) fn advance(&mut self, len: usize) {
        self.col += len;
    }
}

impl Default for LexerPath {
    fn default() -> Self {
        Self {
            id: PathId::NOTSET,
            line: 0,
            col: 0,
            in_use: false,
        }
    }
}

impl Poolable for LexerPath {
    fn reset(&mut self) {
        self.id = PathId::NOTSET;
        self.line = 0;
        self.col = 0;
    }

    fn in_use(&self) -> bool {
        self.in_use
    }

    fn set_in_use(&mut self, in_use: bool) {
        self.in_use = in_use;
    }
}
