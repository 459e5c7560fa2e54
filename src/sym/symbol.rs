// String internment symbol objects
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

//! Symbol objects representing interned strings.
//!
//! See the [parent module](super) for more information.

use crate::global;
use std::fmt::{self, Debug, Display};

/// Unique symbol identifier produced by an
///   [`ArenaInterner`](super::ArenaInterner).
///
/// This newtype helps to prevent other indexes from being used where a
///   symbol index is expected.
///
/// The index `0` is never valid,
///   which allows us to have `Option<SymbolId>` at no space cost.
///
/// To resolve a [`SymbolId`] into the string that it represents,
///   see [`ArenaInterner::index_lookup`](super::ArenaInterner::index_lookup).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(global::NonZeroSymSize);

assert_eq_size!(Option<SymbolId>, SymbolId, global::SymSize);

impl SymbolId {
    /// Construct a symbol from its index,
    ///   or [`None`] if the index is `0`.
    pub(super) fn from_index(index: usize) -> Option<SymbolId> {
        global::SymSize::try_from(index)
            .ok()
            .and_then(global::NonZeroSymSize::new)
            .map(SymbolId)
    }

    pub fn as_usize(self) -> usize {
        self.0.get() as usize
    }

    /// Construct index from a non-zero value for testing.
    ///
    /// Panics
    /// ------
    /// Will panic if `n == 0`.
    #[cfg(test)]
    pub fn test_from_int(n: global::SymSize) -> SymbolId {
        SymbolId(global::NonZeroSymSize::new(n).unwrap())
    }
}

impl From<SymbolId> for usize {
    fn from(value: SymbolId) -> usize {
        value.as_usize()
    }
}

impl Display for SymbolId {
    /// Symbols cannot be resolved without their interner,
    ///   so only the index is displayed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}
