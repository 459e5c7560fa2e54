// Grammar construction errors
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


//! Errors raised while constructing or validating grammars.
//!
//! These are defects in grammar definitions and are always reported
//!   before any input is scanned.

use crate::fmt::{AndConjList, DisplayWrapper, ListDisplayWrapper, TtQuote};
use std::{error::Error, fmt::Display};

#[derive(Debug, Clone, PartialEq)]
pub enum GrammarError {
    /// Terminal pattern failed to compile.
    InvalidPattern(String, regex::Error),

    /// A grammar attempted to define a terminal using a name reserved by
    ///   the lexer.
    ReservedName(String),

    /// A terminal name was defined more than once within a grammar.
    DuplicateTerminal { grammar: String, terminal: String },

    /// A production has no parts.
    EmptyProduction { grammar: String, production: String },

    /// A terminal reference could not be resolved within `grammar`.
    UndefinedTerminal { grammar: String, terminal: String },

    /// A production reference could not be resolved within `grammar`.
    UndefinedProduction { grammar: String, production: String },

    /// A production delegates to a grammar that has not been registered.
    UndefinedGrammar { production: String, context: String },

    /// A production binds a part that does not exist or is not a
    ///   terminal.
    InvalidBinding {
        grammar: String,
        production: String,
        index: usize,
    },

    /// The named productions derive themselves without consuming input.
    LeftRecursion { grammar: String, cycle: Vec<String> },
}

impl Display for GrammarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPattern(name, e) => write!(
                f,
                "invalid pattern for terminal {}: {e}",
                TtQuote::wrap(name),
            ),
            Self::ReservedName(name) => {
                write!(f, "terminal name {} is reserved", TtQuote::wrap(name))
            }
            Self::DuplicateTerminal { grammar, terminal } => write!(
                f,
                "terminal {} defined more than once in grammar {}",
                TtQuote::wrap(terminal),
                TtQuote::wrap(grammar),
            ),
            Self::EmptyProduction {
                grammar,
                production,
            } => write!(
                f,
                "production {} of grammar {} has no parts",
                TtQuote::wrap(production),
                TtQuote::wrap(grammar),
            ),
            Self::UndefinedTerminal { grammar, terminal } => write!(
                f,
                "undefined terminal {} in grammar {}",
                TtQuote::wrap(terminal),
                TtQuote::wrap(grammar),
            ),
            Self::UndefinedProduction {
                grammar,
                production,
            } => write!(
                f,
                "undefined production {} in grammar {}",
                TtQuote::wrap(production),
                TtQuote::wrap(grammar),
            ),
            Self::UndefinedGrammar {
                production,
                context,
            } => write!(
                f,
                "production {} delegates to undefined grammar {}",
                TtQuote::wrap(production),
                TtQuote::wrap(context),
            ),
            Self::InvalidBinding {
                grammar,
                production,
                index,
            } => write!(
                f,
                "production {} of grammar {} binds part {index}, \
                    which is not a terminal",
                TtQuote::wrap(production),
                TtQuote::wrap(grammar),
            ),
            Self::LeftRecursion { grammar, cycle } => write!(
                f,
                "left recursion in grammar {} among productions {}",
                TtQuote::wrap(grammar),
                AndConjList::<TtQuote>::wrap(cycle),
            ),
        }
    }
}

impl Error for GrammarError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPattern(_, e) => Some(e),
            _ => None,
        }
    }
}
