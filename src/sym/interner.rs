// String interner
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

//! Arena-backed string interner.
//!
//! See the [parent module](super) for more information.

use super::SymbolId;
use crate::mem::Arena;
use fxhash::FxBuildHasher;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::BuildHasher;

/// Maps token text to [`SymbolId`]s,
///   storing each distinct string once in an [`Arena`].
///
/// Interned strings live until the interner is dropped or
///   [cleared](ArenaInterner::clear),
///     which is exactly the lifetime of a scan;
///       nothing is ever freed individually,
///       and the strings never move.
///
/// Equal strings always yield equal symbols,
///   so token values compare as integers.
/// See also [`DefaultInterner`].
pub struct ArenaInterner<S = FxBuildHasher>
where
    S: BuildHasher + Default,
{
    /// Interned strings by [`SymbolId`].
    ///
    /// The first index must always be populated during initialization to
    ///   ensure that [`SymbolId`] will never be `0`.
    ///
    /// These string slices are stored in `arena`;
    ///   the `'static` lifetime is a lie that is never exposed outside of
    ///   this struct
    ///     (see [`ArenaInterner::copy_slice_into_arena`]).
    strings: RefCell<Vec<&'static str>>,

    /// Symbol of each interned string.
    map: RefCell<HashMap<&'static str, SymbolId, S>>,

    /// Backing storage of `strings` and `map` keys.
    ///
    /// This must be declared after the fields that reference its
    ///   contents so that it is dropped last.
    arena: Arena,
}

impl<S> ArenaInterner<S>
where
    S: BuildHasher + Default,
{
    /// An interner that allocates only on first use.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// An interner with room for `capacity` symbols before rehashing and
    ///   an arena pre-allocated to `arena_bytes`.
    ///
    /// The arena grows in chunks without copying;
    ///   the map rehashes on growth.
    #[inline]
    pub fn with_capacity(capacity: usize, arena_bytes: usize) -> Self {
        let mut strings = Vec::<_>::with_capacity(capacity + 1);

        // Index 0 is never a valid SymbolId.
        strings.push("");

        Self {
            strings: RefCell::new(strings),
            map: RefCell::new(HashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
            arena: Arena::with_capacity(arena_bytes),
        }
    }

    fn get_next_symbol_id(syms: &[&'static str]) -> SymbolId {
        match SymbolId::from_index(syms.len()) {
            Some(id) => id,
            // Billions of distinct token values within a single scan
            //   would have exhausted memory long before this point.
            None => panic!("internal error: SymbolId range exhausted"),
        }
    }

    /// Copy a string slice into the arena,
    ///   erasing the arena's lifetime.
    ///
    /// Safety
    /// ======
    /// The arena never moves or frees individual allocations,
    ///   and is only reset by [`ArenaInterner::clear`] (which requires
    ///   exclusive access and discards every slice along with it)
    ///   or by dropping the interner.
    /// Slices escape this struct only through
    ///   [`ArenaInterner::index_lookup`],
    ///     which reborrows them for the lifetime of `&self`.
    #[inline]
    fn copy_slice_into_arena(&self, value: &str) -> &'static str {
        let copy: &str = self.arena.alloc_str(value);

        unsafe { &*(copy as *const str) }
    }

    /// Symbol for `value`,
    ///   copying it into the arena if it has not yet been seen.
    ///
    /// See also [`intern_soft`](ArenaInterner::intern_soft).
    pub fn intern(&self, value: &str) -> SymbolId {
        let mut map = self.map.borrow_mut();

        if let Some(sym) = map.get(value) {
            return *sym;
        }

        let mut syms = self.strings.borrow_mut();

        let id = Self::get_next_symbol_id(&syms);
        let clone = self.copy_slice_into_arena(value);

        map.insert(clone, id);
        syms.push(clone);

        id
    }

    /// Symbol for `value` only if it has already been interned.
    #[inline]
    pub fn intern_soft(&self, value: &str) -> Option<SymbolId> {
        self.map.borrow().get(value).copied()
    }

    #[inline]
    pub fn contains(&self, value: &str) -> bool {
        self.map.borrow().contains_key(value)
    }

    /// Number of distinct strings interned.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text of `index`,
    ///   or [`None`] if this interner did not produce it.
    pub fn index_lookup(&self, index: SymbolId) -> Option<&str> {
        self.strings.borrow().get(index.as_usize()).copied()
    }

    /// Number of bytes held by the backing arena.
    pub fn arena_bytes(&self) -> usize {
        self.arena.allocated_bytes()
    }

    /// Forget every interned string and reclaim arena memory.
    ///
    /// Every previously produced [`SymbolId`] becomes meaningless.
    pub fn clear(&mut self) {
        self.map.get_mut().clear();

        let strings = self.strings.get_mut();
        strings.truncate(1);

        self.arena.reset();
    }
}

impl<S: BuildHasher + Default> Default for ArenaInterner<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BuildHasher + Default> Debug for ArenaInterner<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ArenaInterner: {} symbols, {:?}]", self.len(), self.arena)
    }
}

/// Recommended interner configuration.
///
/// This uses the [Fx Hash][fxhash] hashing function.
/// If denial of service is not a concern,
///   then this will outperform the default
///     [`DefaultHasher`](std::collections::hash_map::DefaultHasher)
///     (which uses SipHash at the time of writing).
/// Token values originate from the source being scanned and are hashed
///   at token granularity,
///     so hashing cost dominates over resistance to collision attacks.
pub type DefaultInterner = ArenaInterner<FxBuildHasher>;
