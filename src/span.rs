// Source positions
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


//! Positions of lexemes within a [`SourceContainer`](crate::source).
//!
//! A [`Span`] identifies a region of a single source line by its
//!   zero-indexed line number,
//!   its zero-indexed byte column within that line,
//!   and its length in bytes.
//! Spans never cross line boundaries,
//!   since the lexer never matches across them.
//!
//! Columns are byte offsets,
//!   _not_ character offsets;
//!     they can be used directly to slice the line they refer to.
//!
//! ```
//! use forkscan::span::Span;
//!
//! let span = Span::new(2, 6, 3);
//!
//! assert_eq!(2, span.line());
//! assert_eq!(6, span.col());
//! assert_eq!(3, span.len());
//! assert_eq!(9, span.end_col());
//! assert_eq!("2:6+3", span.to_string());
//! ```

use crate::global;
use std::fmt::{self, Display};

/// Size of each [`Span`] component.
pub type SpanPosSize = global::SourcePosSize;

/// A byte interval within a single source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    line: SpanPosSize,
    col: SpanPosSize,
    len: SpanPosSize,
}

assert_eq_size!(Span, [SpanPosSize; 3]);

impl Span {
    pub const fn new(
        line: SpanPosSize,
        col: SpanPosSize,
        len: SpanPosSize,
    ) -> Self {
        Self { line, col, len }
    }

    /// Create a span from `usize` components,
    ///   saturating at the maximum representable value.
    ///
    /// Sources large enough to saturate are far beyond what a single
    ///   scan is intended to handle,
    ///     but saturating is preferable to panicking mid-scan.
    pub fn from_usize(line: usize, col: usize, len: usize) -> Self {
        let sat =
            |x: usize| SpanPosSize::try_from(x).unwrap_or(SpanPosSize::MAX);

        Self::new(sat(line), sat(col), sat(len))
    }

    /// Zero-length span at the given position.
    pub const fn at(line: SpanPosSize, col: SpanPosSize) -> Self {
        Self::new(line, col, 0)
    }

    pub fn line(&self) -> SpanPosSize {
        self.line
    }

    pub fn col(&self) -> SpanPosSize {
        self.col
    }

    pub fn len(&self) -> SpanPosSize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Column immediately following the last byte of this span.
    pub fn end_col(&self) -> SpanPosSize {
        self.col.saturating_add(self.len)
    }
}

impl Display for Span {
    /// Format as `line:col+len`.
    ///
    /// Lines and columns are zero-indexed,
    ///   matching their representation in tokens.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}+{}", self.line, self.col, self.len)
    }
}
