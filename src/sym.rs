// String internment system
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

//! String internment system.
//!
//! Interned strings are represented by an integer [`SymbolId`],
//!   created by an [`ArenaInterner`].
//!
//!   - [`ArenaInterner`] - Intern pool backed by an [arena](crate::mem::Arena)
//!       for fast and stable allocation.
//!   - [`DefaultInterner`] - The currently recommended intern pool
//!       configuration,
//!         using the [Fx Hash][fxhash] hashing function.
//!
//! Interners represent symbols as integer values which allows for `O(1)`
//!   comparison of any arbitrary interned value,
//!     regardless of length.
//! Lexers intern the value of every token they emit,
//!   so that the many repeated identifiers and keywords of a source file
//!   are stored once and compared by identity.
//!
//! ```
//! use forkscan::sym::DefaultInterner;
//!
//! // Inputs to be interned
//! let a = "foo";
//! let b = &"foo".to_string();
//! let c = "foobar";
//! let d = &c[0..3];
//!
//! // Interners employ interior mutability and so do not need to be
//! // declared `mut`
//! let interner = DefaultInterner::new();
//!
//! let (ia, ib, ic, id) = (
//!     interner.intern(a),
//!     interner.intern(b),
//!     interner.intern(c),
//!     interner.intern(d),
//! );
//!
//! assert_eq!(ia, ib);
//! assert_eq!(ia, id);
//! assert_ne!(ia, ic);
//!
//! // Only "foo" and "foobar" are interned
//! assert_eq!(2, interner.len());
//! assert!(interner.contains("foo"));
//! assert!(!interner.contains("something else"));
//!
//! // Symbols can be looked up by index.
//! assert_eq!(Some("foo"), interner.index_lookup(ia));
//! ```
//!
//! Internment Mechanism
//! ====================
//! 1. Strings are compared against the existing intern pool using a
//!      [`HashMap`](std::collections::HashMap).
//! 2. If a string has not yet been interned:
//!    - A new integer [`SymbolId`] index is allocated;
//!    - The string is copied into the arena-backed pool at that new index;
//!        and
//!    - The string is hashed and will resolve to the new [`SymbolId`] for
//!        future lookups and internment attempts.
//! 3. Otherwise, the existing [`SymbolId`] associated with the provided
//!      string is returned.
//!
//! [`SymbolId`] is monotonically increasing from 1,
//!   and uses a non-zero integer so that `Option<SymbolId>` requires no
//!   additional space.
//!
//! Unlike a global interner,
//!   each interner here is owned by the system that uses it
//!     (one per [`Lexer`](crate::lexer::Lexer)),
//!   so that independent lexers do not share state.
//! Consequently,
//!   nothing prevents a [`SymbolId`] of one interner from being looked up
//!   in another;
//!     symbols should not leave the lexer that produced them without
//!     being resolved.
//!
//! This implementation was heavily motivated by [Rustc's own internment
//!   system][rustc-intern].
//!
//! [rustc-intern]: https://doc.rust-lang.org/nightly/nightly-rustc/src/rustc_span/symbol.rs.html

mod interner;
mod symbol;

pub use interner::{ArenaInterner, DefaultInterner};
pub use symbol::SymbolId;
