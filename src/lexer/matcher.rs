// Terminal matching
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


//! Matching of terminals against source text.
//!
//! Every valid terminal is attempted at a path's position,
//!   and every successful match is retained;
//!     ordering determines only which match is _primary_
//!       (advances the existing path)
//!       and the order in which the remaining matches fork new paths.

use crate::grammar::{Grammar, Order, Terminal, TerminalId, TerminalSet};
use std::rc::Rc;

/// A successful match of a terminal against the beginning of an input
///   suffix.
///
/// Matches are ephemeral and are consumed immediately to produce tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct TerminalMatch<'s> {
    pub id: TerminalId,
    pub terminal: Rc<Terminal>,
    pub text: &'s str,
}

impl<'s> TerminalMatch<'s> {
    pub fn len(&self) -> usize {
        self.text.len()
    }
}

/// Attempt each terminal of `valid` against the beginning of `suffix`.
///
/// Matches are ordered with order-important terminals first by ascending
///   rank,
///     followed by order-irrelevant terminals;
///     terminals of equal preference retain their declaration order.
/// The first match,
///   if any,
///   is the primary match.
pub(super) fn match_terminals<'s>(
    grammar: &Grammar,
    valid: &TerminalSet,
    suffix: &'s str,
) -> Vec<TerminalMatch<'s>> {
    let mut matches = valid
        .iter()
        .filter_map(|id| {
            let terminal = grammar.terminal_by_id(id)?;

            terminal.match_at(suffix).map(|text| TerminalMatch {
                id,
                terminal: Rc::clone(terminal),
                text,
            })
        })
        .collect::<Vec<_>>();

    // Stable sort,
    //   so ties retain declaration (id) order.
    matches.sort_by_key(|m| preference(m.terminal.order()));
    matches
}

/// Sort key for [`Order`],
///   lowest preferred.
fn preference(order: Order) -> (u8, u32) {
    match order {
        Order::Important(rank) => (0, rank),
        Order::Irrelevant => (1, 0),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grammar::GrammarBuilder;

    fn names(matches: &[TerminalMatch]) -> Vec<(String, String)> {
        matches
            .iter()
            .map(|m| (m.terminal.name().to_string(), m.text.to_string()))
            .collect()
    }

    fn grammar(terminals: Vec<Terminal>) -> Grammar {
        terminals
            .into_iter()
            .fold(GrammarBuilder::new("g"), GrammarBuilder::terminal)
            .build()
            .unwrap()
    }

    #[test]
    fn no_match() {
        let g = grammar(vec![Terminal::new("NUM", "[0-9]+").unwrap()]);

        assert!(match_terminals(&g, g.start_terminals(), "#").is_empty());
    }

    #[test]
    fn all_matches_retained_in_declaration_order() {
        let g = grammar(vec![
            Terminal::new("IDENT", "[a-z]+").unwrap(),
            Terminal::literal("IF", "if").unwrap(),
        ]);

        assert_eq!(
            vec![
                ("IDENT".into(), "iffy".into()),
                ("IF".into(), "if".into()),
            ],
            names(&match_terminals(&g, g.start_terminals(), "iffy")),
        );
    }

    #[test]
    fn order_important_preferred_by_rank() {
        let g = grammar(vec![
            Terminal::new("IDENT", "[a-z]+").unwrap(),
            Terminal::literal("IF", "if").unwrap().ordered(2),
            Terminal::new("I", "i").unwrap().ordered(1),
            Terminal::new("IFX", "if?").unwrap().ordered(1),
        ]);

        assert_eq!(
            vec![
                ("I".into(), "i".into()),
                ("IFX".into(), "if".into()),
                ("IF".into(), "if".into()),
                ("IDENT".into(), "if".into()),
            ],
            names(&match_terminals(&g, g.start_terminals(), "if")),
        );
    }

    #[test]
    fn only_valid_terminals_attempted() {
        let g = GrammarBuilder::new("g")
            .terminal(Terminal::new("A", "a").unwrap())
            .terminal(Terminal::new("AA", "a+").unwrap())
            .start_terminal("AA")
            .build()
            .unwrap();

        assert_eq!(
            vec![("AA".into(), "aaa".into())],
            names(&match_terminals(&g, g.start_terminals(), "aaa")),
        );
    }
}
