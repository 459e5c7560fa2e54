// Arena allocator
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

//! Bump arena.
//!
//! See the [parent module](super) for more information.

use bumpalo::Bump;
use std::fmt::{self, Debug};

/// A growable region of memory from which allocations are carved without
///   individual deallocation.
///
/// Memory is reclaimed all at once,
///   either by [`Arena::reset`] or by dropping the arena.
/// Allocations never move,
///   so references into the arena are stable for as long as the arena is
///   neither reset nor dropped;
///     the borrow checker enforces this for the references returned here,
///     since [`Arena::reset`] requires exclusive access.
pub struct Arena {
    bump: Bump,
}

impl Arena {
    /// Create an arena with no pre-allocated backing region.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an arena with a pre-allocated backing region of at least
    ///   `bytes` bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bump: Bump::with_capacity(bytes),
        }
    }

    /// Copy a string slice into the arena.
    #[inline]
    pub fn alloc_str(&self, value: &str) -> &str {
        self.bump.alloc_str(value)
    }

    /// Total number of bytes held by the arena's backing region,
    ///   including unused capacity.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    /// Reclaim every allocation,
    ///   retaining the largest backing chunk for reuse.
    pub fn reset(&mut self) {
        self.bump.reset();
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Arena: {} bytes]", self.allocated_bytes())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    type Sut = Arena;

    #[test]
    fn copies_strings_into_arena() {
        let sut = Sut::new();
        let src = String::from("foo");

        let copy = sut.alloc_str(&src);
        drop(src);

        assert_eq!("foo", copy);
    }

    #[test]
    fn pre_allocates_requested_capacity() {
        let sut = Sut::with_capacity(4096);

        assert!(sut.allocated_bytes() >= 4096);
    }

    #[test]
    fn allocations_are_stable_across_growth() {
        let sut = Sut::with_capacity(16);

        let first = sut.alloc_str("first");
        let first_ptr = first.as_ptr();

        // Force at least one new chunk.
        for i in 0..1024 {
            sut.alloc_str(&i.to_string());
        }

        assert_eq!(first_ptr, first.as_ptr());
        assert_eq!("first", first);
    }

    #[test]
    fn reset_retains_backing_memory() {
        let mut sut = Sut::with_capacity(1024);
        sut.alloc_str("foo");

        sut.reset();

        assert!(sut.allocated_bytes() > 0);
    }
}
