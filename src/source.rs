// Line-indexed source text
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


//! Line-indexed source text.
//!
//! A [`SourceContainer`] owns the text of a single scan and indexes it
//!   into zero-indexed lines.
//! Lines are delimited by `\n`;
//!   a `\r` immediately preceding the delimiter is not part of the line.
//! Line content is always borrowed from the container,
//!   never copied per access.
//!
//! ```
//! use forkscan::source::SourceContainer;
//!
//! let src = SourceContainer::new("foo\r\nbar\n");
//!
//! assert_eq!(3, src.line_count());
//! assert_eq!(Some("foo"), src.line(0).map(|l| l.content()));
//! assert_eq!(Some("bar"), src.line(1).map(|l| l.content()));
//! assert_eq!(Some(""), src.line(2).map(|l| l.content()));
//! assert!(src.line(3).is_none());
//! ```
//!
//! A container is immutable for the duration of a scan;
//!   a new container is constructed for each (re)parse.

use crate::span::Span;
use memchr::memchr_iter;
use std::{fmt::Display, ops::Range};

/// Source text pre-split into zero-indexed lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContainer {
    text: String,

    /// Byte range of each line within `text`,
    ///   excluding line terminators.
    lines: Vec<Range<usize>>,
}

impl SourceContainer {
    /// Take ownership of `text` and index its lines.
    ///
    /// There is always at least one line,
    ///   even for empty text;
    ///     text ending in a newline has a final empty line.
    pub fn new<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        let bytes = text.as_bytes();

        let mut lines = Vec::new();
        let mut start = 0;

        for nl in memchr_iter(b'\n', bytes) {
            lines.push(start..Self::strip_cr(bytes, start, nl));
            start = nl + 1;
        }

        lines.push(start..bytes.len());

        Self { text, lines }
    }

    fn strip_cr(bytes: &[u8], start: usize, end: usize) -> usize {
        match end {
            end if end > start && bytes[end - 1] == b'\r' => end - 1,
            end => end,
        }
    }

    /// Retrieve the line with the zero-indexed line number `n`,
    ///   if it exists.
    pub fn line(&self, n: usize) -> Option<SourceLine<'_>> {
        self.lines.get(n).map(|range| SourceLine {
            number: n,
            content: &self.text[range.clone()],
        })
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Iterate over each line in order.
    pub fn lines(&self) -> impl Iterator<Item = SourceLine<'_>> + '_ {
        self.lines
            .iter()
            .enumerate()
            .map(|(number, range)| SourceLine {
                number,
                content: &self.text[range.clone()],
            })
    }

    /// The complete source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte offset into [`Self::text`] of the given line and byte column.
    ///
    /// Columns may refer to the position immediately following the last
    ///   byte of a line.
    /// Positions beyond that,
    ///   or lines that do not exist,
    ///   yield [`None`].
    pub fn offset_of(&self, line: usize, col: usize) -> Option<usize> {
        self.lines
            .get(line)
            .filter(|range| range.start + col <= range.end)
            .map(|range| range.start + col)
    }

    /// Source text from the start of `start` up to the end of `end`,
    ///   including any line terminators between them.
    ///
    /// This is used to recover the complete text of a construct that
    ///   spans multiple tokens and possibly multiple lines.
    /// If either span does not lie within the source,
    ///   or if `end` ends before `start` begins,
    ///   the result is [`None`].
    pub fn slice_between(&self, start: Span, end: Span) -> Option<&str> {
        let from =
            self.offset_of(start.line() as usize, start.col() as usize)?;
        let to = self.offset_of(end.line() as usize, end.end_col() as usize)?;

        self.text.get(from..to)
    }
}

impl Display for SourceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "source of {} line(s)", self.line_count())
    }
}

/// A single line of a [`SourceContainer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'s> {
    number: usize,
    content: &'s str,
}

impl<'s> SourceLine<'s> {
    /// Zero-indexed line number.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Content of the line,
    ///   excluding its terminator.
    pub fn content(&self) -> &'s str {
        self.content
    }

    /// Length of the line in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Content of the line beginning at byte column `col`.
    ///
    /// This is [`None`] if `col` is beyond the end of the line or does
    ///   not fall on a character boundary.
    pub fn suffix(&self, col: usize) -> Option<&'s str> {
        self.content.get(col..)
    }
}
