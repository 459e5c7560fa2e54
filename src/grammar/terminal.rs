// Grammar terminals
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


//! Lexical patterns.
//!
//! A [`Terminal`] names a regular expression that is matched against the
//!   remaining text of a source line.
//! Patterns are always anchored at the start of the text they are matched
//!   against;
//!     a terminal never skips input.

use super::GrammarError;
use regex::Regex;
use std::fmt::{self, Display};

/// Emitted when a lexer path is invalidated.
pub const LEXERPATH_REMOVED: &str = "LEXERPATH_REMOVED";

/// Emitted when a lexer path is merged into another.
pub const LEXERPATH_MERGE: &str = "LEXERPATH_MERGE";

/// Emitted for a single character that no valid terminal matches.
pub const UNKNOWN: &str = "UNKNOWN";

/// Names that may not be used by grammar terminals.
pub const RESERVED_NAMES: [&str; 3] =
    [LEXERPATH_REMOVED, LEXERPATH_MERGE, UNKNOWN];

/// Preference of a [`Terminal`] when several terminals match at the same
///   position.
///
/// Order-important terminals are preferred over order-irrelevant ones,
///   and lower ranks are preferred over higher.
/// Ties are broken by declaration order within the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Order {
    Important(u32),
    #[default]
    Irrelevant,
}

/// A named lexical pattern.
///
/// Terminals are immutable once constructed.
#[derive(Debug, Clone)]
pub struct Terminal {
    name: String,

    /// Compiled pattern anchored at the start of input.
    ///
    /// Reserved terminals have no pattern and never match.
    pattern: Option<Regex>,

    /// Pattern as provided by the user,
    ///   before anchoring.
    source: Option<String>,

    order: Order,

    /// Lexed normally but never participates in production recognition.
    skip: bool,
}

impl Terminal {
    /// Compile a terminal matching the regular expression `pattern`.
    ///
    /// The pattern is implicitly anchored to the start of input;
    ///   it need not (but may) begin with `^`.
    pub fn new<S: Into<String>>(
        name: S,
        pattern: &str,
    ) -> Result<Self, GrammarError> {
        let name = name.into();

        if RESERVED_NAMES.contains(&name.as_str()) {
            return Err(GrammarError::ReservedName(name));
        }

        match Regex::new(&format!("^(?:{pattern})")) {
            Ok(re) => Ok(Self {
                name,
                pattern: Some(re),
                source: Some(pattern.to_string()),
                order: Order::Irrelevant,
                skip: false,
            }),
            Err(e) => Err(GrammarError::InvalidPattern(name, e)),
        }
    }

    /// Compile a terminal matching exactly the string `text`.
    pub fn literal<S: Into<String>>(
        name: S,
        text: &str,
    ) -> Result<Self, GrammarError> {
        Self::new(name, &regex::escape(text))
    }

    /// A terminal used only to label tokens produced by the lexer itself.
    pub(crate) fn reserved(name: &'static str) -> Self {
        debug_assert!(RESERVED_NAMES.contains(&name));

        Self {
            name: name.to_string(),
            pattern: None,
            source: None,
            order: Order::Irrelevant,
            skip: false,
        }
    }

    /// Prefer this terminal with the given rank.
    pub fn ordered(self, rank: u32) -> Self {
        Self {
            order: Order::Important(rank),
            ..self
        }
    }

    /// Mark this terminal as a skip terminal
    ///   (e.g. whitespace or comments).
    pub fn skip(self) -> Self {
        Self { skip: true, ..self }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pattern as originally provided.
    pub fn pattern(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn is_skip(&self) -> bool {
        self.skip
    }

    /// Whether this is one of the [`RESERVED_NAMES`].
    pub fn is_reserved(&self) -> bool {
        self.pattern.is_none()
    }

    /// Match against the beginning of `suffix`.
    ///
    /// A zero-length match is not a match,
    ///   so that every successful match makes progress.
    pub fn match_at<'s>(&self, suffix: &'s str) -> Option<&'s str> {
        self.pattern
            .as_ref()?
            .find(suffix)
            .filter(|m| m.start() == 0 && !m.is_empty())
            .map(|m| m.as_str())
    }
}

impl PartialEq for Terminal {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.source == other.source
            && self.order == other.order
            && self.skip == other.skip
    }
}

impl Eq for Terminal {}

impl Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
