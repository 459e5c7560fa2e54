// Multi-path lexing core
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


//! A multi-path lexing and parsing core for composable grammars.
//!
//! Source text is tokenized by a [`Lexer`](lexer::Lexer) that pursues
//!   every plausible interpretation of ambiguous input in parallel
//!   rather than committing to one and backtracking.
//! Grammars ([`grammar`]) may embed one another,
//!   such as a stylesheet region within a markup document;
//!     each hypothesis tracks its own stack of active grammars,
//!       so regions are lexed only by the grammar that governs them.
//!
//! The hot path of a scan is the creation and destruction of these
//!   hypotheses and the storage of the lexemes they produce,
//!     which are served by pooled records and arena-backed string
//!     interning respectively ([`mem`], [`sym`]).

// We build docs for private items.
#![allow(rustdoc::private_intra_doc_links)]

pub mod global;

#[macro_use]
extern crate static_assertions;

pub mod fmt;
pub mod grammar;
pub mod lexer;
pub mod mem;
pub mod source;
pub mod span;
pub mod sym;
