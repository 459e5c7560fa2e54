// Memory substrate
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

//! Memory substrate for the lexer.
//!
//!   - [`Arena`] - Bulk allocation without per-object deallocation,
//!       backed by [`bumpalo`].
//!       This is the storage for the [string interner](crate::sym).
//!   - [`Pool`] - A free list of reusable records implementing
//!       [`Poolable`],
//!         addressed by [`PoolIx`] rather than by reference.
//!
//! Lexer paths are forked and merged at token granularity,
//!   making path records the hottest allocation site of a scan under
//!   heavy ambiguity.
//! The pool eliminates allocator round-trips for those records,
//!   and the arena does the same for interned token values.

mod arena;
mod pool;

pub use arena::Arena;
pub use pool::{Pool, PoolError, PoolIx, PoolStats, Poolable};
