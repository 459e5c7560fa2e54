// Object pool
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

//! Pool of reusable records.
//!
//! A [`Pool`] owns a contiguous slab of records and a free list of the
//!   indexes of records that are not in use.
//! Records are addressed by [`PoolIx`] rather than by reference,
//!   so that the owner of an index does not hold a borrow of the pool;
//!     this avoids ownership cycles between structures that refer to the
//!     same record
//!       (such as a map of active records and a list of records pending
//!         release).
//!
//! ```
//! use forkscan::mem::{Pool, Poolable};
//!
//! #[derive(Default)]
//! struct Rec {
//!     val: u32,
//!     used: bool,
//! }
//!
//! impl Poolable for Rec {
//!     fn reset(&mut self) {
//!         self.val = 0;
//!     }
//!
//!     fn in_use(&self) -> bool {
//!         self.used
//!     }
//!
//!     fn set_in_use(&mut self, in_use: bool) {
//!         self.used = in_use;
//!     }
//! }
//!
//! let mut pool = Pool::new(2, Rec::default);
//!
//! let ix = pool.acquire();
//! pool.get_mut(ix).unwrap().val = 5;
//! pool.release(ix).unwrap();
//!
//! // Released records are reset before reuse.
//! let again = pool.acquire();
//! assert_eq!(ix, again);
//! assert_eq!(0, pool.get(again).unwrap().val);
//! ```

use std::{error::Error, fmt::Display};

/// A record that can be recycled by a [`Pool`].
pub trait Poolable {
    /// Return the record to its canonical initial state.
    ///
    /// This must not alter the in-use flag;
    ///   the pool manages that flag itself.
    fn reset(&mut self);

    /// Whether the record is currently handed out by its pool.
    fn in_use(&self) -> bool;

    /// Set the in-use flag.
    ///
    /// This is intended to be called only by [`Pool`].
    fn set_in_use(&mut self, in_use: bool);
}

/// Index of a record within a [`Pool`].
///
/// An index is meaningful only to the pool that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolIx(u32);

assert_eq_size!(PoolIx, u32);

impl PoolIx {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl Display for PoolIx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Counters describing the lifetime activity of a [`Pool`].
///
/// Over the course of any complete workload,
///   `acquired - released` is the number of records still in use;
///     a drained pool must therefore have `acquired == released`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Number of successful [`Pool::acquire`] calls.
    pub acquired: usize,

    /// Number of successful [`Pool::release`] calls.
    pub released: usize,

    /// Number of records produced by the factory.
    pub created: usize,

    /// Number of records created beyond the soft capacity.
    pub overflow: usize,
}

impl PoolStats {
    /// Number of records acquired but not yet released.
    pub fn outstanding(&self) -> usize {
        self.acquired - self.released
    }
}

/// A free list of reusable [`Poolable`] records.
///
/// See the [module-level documentation](self) for more information.
pub struct Pool<T: Poolable> {
    /// Every record ever created by this pool,
    ///   whether or not it is in use.
    slots: Vec<T>,

    /// Indexes of records that are not in use.
    ///
    /// This is used as a stack,
    ///   so the most recently released record is the next acquired,
    ///   which is the one most likely to still be in cache.
    free: Vec<PoolIx>,

    /// Produces new records when the free list is empty.
    factory: fn() -> T,

    /// Number of records pre-allocated by the pool;
    ///   records created beyond this are counted as overflow.
    soft_capacity: usize,

    stats: PoolStats,
}

impl<T: Poolable> Pool<T> {
    /// Create a pool pre-populated with `soft_capacity` records produced
    ///   by `factory`.
    pub fn new(soft_capacity: usize, factory: fn() -> T) -> Self {
        let mut pool = Self {
            slots: Vec::with_capacity(soft_capacity),
            free: Vec::with_capacity(soft_capacity),
            factory,
            soft_capacity,
            stats: PoolStats::default(),
        };

        pool.prefill();
        pool
    }

    /// Populate the free list up to the soft capacity.
    ///
    /// Indexes are pushed in reverse so that records are handed out in
    ///   ascending order,
    ///     which keeps acquisition order deterministic.
    fn prefill(&mut self) {
        let start = self.slots.len();

        for _ in start..self.soft_capacity {
            let rec = self.create();
            self.slots.push(rec);
        }

        self.free
            .extend((start..self.slots.len()).rev().map(Self::ix_from));
    }

    fn create(&mut self) -> T {
        self.stats.created += 1;

        let mut rec = (self.factory)();
        rec.reset();
        rec.set_in_use(false);
        rec
    }

    fn ix_from(i: usize) -> PoolIx {
        // Exceeding this range means we have billions of live paths,
        //   at which point memory would have long been exhausted.
        PoolIx(i as u32)
    }

    /// Acquire a reset record,
    ///   creating one if the free list is empty.
    pub fn acquire(&mut self) -> PoolIx {
        let ix = match self.free.pop() {
            Some(ix) => ix,
            None => {
                if self.slots.len() >= self.soft_capacity {
                    self.stats.overflow += 1;
                }

                let rec = self.create();
                self.slots.push(rec);
                Self::ix_from(self.slots.len() - 1)
            }
        };

        let rec = &mut self.slots[ix.as_usize()];
        debug_assert!(!rec.in_use(), "free list contained in-use record {ix}");
        rec.set_in_use(true);

        self.stats.acquired += 1;
        ix
    }

    /// Reset a record and return it to the free list.
    ///
    /// Releasing a record that is not in use is an error,
    ///   which guards against double-release;
    ///     the pool is left unchanged in that case.
    pub fn release(&mut self, ix: PoolIx) -> Result<(), PoolError> {
        let rec = self
            .slots
            .get_mut(ix.as_usize())
            .ok_or(PoolError::OutOfRange(ix))?;

        if !rec.in_use() {
            return Err(PoolError::NotInUse(ix));
        }

        rec.reset();
        rec.set_in_use(false);
        self.free.push(ix);

        self.stats.released += 1;
        Ok(())
    }

    /// Reference an in-use record.
    ///
    /// Records on the free list are not observable.
    pub fn get(&self, ix: PoolIx) -> Option<&T> {
        self.slots.get(ix.as_usize()).filter(|rec| rec.in_use())
    }

    /// Mutably reference an in-use record.
    pub fn get_mut(&mut self, ix: PoolIx) -> Option<&mut T> {
        self.slots.get_mut(ix.as_usize()).filter(|rec| rec.in_use())
    }

    /// Release every record that is in use.
    ///
    /// Returns the number of records released.
    pub fn drain(&mut self) -> usize {
        let in_use = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, rec)| rec.in_use())
            .map(|(i, _)| Self::ix_from(i))
            .collect::<Vec<_>>();

        in_use
            .into_iter()
            .filter(|ix| self.release(*ix).is_ok())
            .count()
    }

    /// Drop every record held by the pool,
    ///   including those in use.
    ///
    /// Outstanding [`PoolIx`]s are invalidated.
    /// The pool remains usable and creates records on demand;
    ///   statistics are reset.
    pub fn clear(&mut self) {
        self.slots = Vec::new();
        self.free = Vec::new();
        self.stats = PoolStats::default();
    }

    /// Number of records currently in use.
    pub fn in_use_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Number of records held by the pool.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn soft_capacity(&self) -> usize {
        self.soft_capacity
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

/// Misuse of a [`Pool`].
#[derive(Debug, PartialEq, Eq)]
pub enum PoolError {
    /// The record is already on the free list.
    NotInUse(PoolIx),

    /// The index was not produced by this pool.
    OutOfRange(PoolIx),
}

impl Display for PoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInUse(ix) => {
                write!(f, "pool record {ix} released while not in use")
            }
            Self::OutOfRange(ix) => {
                write!(f, "pool record {ix} does not exist")
            }
        }
    }
}

impl Error for PoolError {}
