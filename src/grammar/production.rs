// Grammar productions
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


//! Grammar rules.
//!
//! A [`Production`] is a named, ordered,
//!   non-empty sequence of [`Part`]s.
//! Several productions may share a name,
//!   in which case they are alternatives of one another and are tried in
//!   declaration order.
//!
//! A production may _delegate_ to another grammar by way of
//!   [`Production::context`];
//!     its parts then name terminals and productions of that other
//!     grammar,
//!       and the region of input it governs is lexed exclusively by that
//!       grammar.

use std::fmt::{self, Display};

/// A single element of a [`Production`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Part {
    /// Reference to a [`Terminal`](super::Terminal) by name.
    Terminal(String),

    /// Reference to a production name.
    Production(String),
}

impl Part {
    pub fn terminal<S: Into<String>>(name: S) -> Self {
        Self::Terminal(name.into())
    }

    pub fn production<S: Into<String>>(name: S) -> Self {
        Self::Production(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Terminal(name) | Self::Production(name) => name,
        }
    }
}

impl Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal(name) => write!(f, "{name}"),
            Self::Production(name) => write!(f, "<{name}>"),
        }
    }
}

/// A named grammar rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    name: String,
    parts: Vec<Part>,

    /// Name of the grammar this production delegates to.
    context: Option<String>,

    /// Name of a context flag that must be set for this production to be
    ///   considered.
    guard: Option<String>,

    /// Index of the terminal part whose text is declared as a symbol
    ///   when this production completes.
    binding: Option<usize>,
}

impl Production {
    pub fn new<S, I>(name: S, parts: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = Part>,
    {
        Self {
            name: name.into(),
            parts: parts.into_iter().collect(),
            context: None,
            guard: None,
            binding: None,
        }
    }

    /// Delegate the parts of this production to the grammar `grammar`.
    pub fn context<S: Into<String>>(self, grammar: S) -> Self {
        Self {
            context: Some(grammar.into()),
            ..self
        }
    }

    /// Consider this production only while the context flag `flag` is
    ///   set.
    pub fn guard<S: Into<String>>(self, flag: S) -> Self {
        Self {
            guard: Some(flag.into()),
            ..self
        }
    }

    /// Declare the text of the terminal at `part_index` as a symbol in the
    ///   current scope when this production completes.
    pub fn binds(self, part_index: usize) -> Self {
        Self {
            binding: Some(part_index),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Name of the grammar that this production delegates to,
    ///   if any.
    pub fn context_tag(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn guard_flag(&self) -> Option<&str> {
        self.guard.as_deref()
    }

    pub fn binding(&self) -> Option<usize> {
        self.binding
    }

    /// The leftmost part,
    ///   which determines what input may begin this production.
    pub fn first_part(&self) -> Option<&Part> {
        self.parts.first()
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :=", self.name)?;

        for part in &self.parts {
            write!(f, " {part}")?;
        }

        if let Some(ctx) = &self.context {
            write!(f, " @{ctx}")?;
        }

        Ok(())
    }
}
