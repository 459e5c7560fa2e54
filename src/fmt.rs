// Display formatting utilities
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

//! Composable formatting of names within diagnostics.
//!
//! A [`DisplayWrapper`] is a type that decorates any [`Display`] value;
//!   wrappers nest,
//!     so `Tt<Raw>` quotes a raw value.
//! A [`ListDisplayWrapper`] renders a slice as an English list,
//!   applying an item wrapper to each element.
//!
//! ```
//! # use forkscan::fmt::*;
//! let cycle = ["expr", "term", "factor"];
//!
//! assert_eq!(
//!    AndConjList::<TtQuote>::wrap(&cycle).to_string(),
//!    "`expr`, `term`, and `factor`",
//! );
//!
//! assert_eq!(
//!     OrConjList::<Raw>::wrap(&["KEYWORD", "IDENTIFIER"]).to_string(),
//!     "KEYWORD or IDENTIFIER",
//! );
//! ```

use std::{
    fmt::{Display, Formatter, Result},
    marker::PhantomData,
};

/// Decorator for a [`Display`]-able value.
pub trait DisplayWrapper {
    fn fmt<T: Display>(inner: T, f: &mut Formatter) -> Result;

    /// Bind `inner` to this wrapper,
    ///   producing a value usable with [`format!`] and friends.
    fn wrap<T: Display>(inner: T) -> Wrap<Self, T> {
        Wrap {
            inner,
            _phantom: PhantomData,
        }
    }
}

/// A value bound to a [`DisplayWrapper`].
pub struct Wrap<W: DisplayWrapper + ?Sized, T: Display> {
    inner: T,
    _phantom: PhantomData<W>,
}

impl<W: DisplayWrapper + ?Sized, T: Display> Display for Wrap<W, T> {
    fn fmt(&self, f: &mut Formatter) -> Result {
        W::fmt(&self.inner, f)
    }
}

/// No decoration.
pub struct Raw;

impl DisplayWrapper for Raw {
    fn fmt<T: Display>(inner: T, f: &mut Formatter) -> Result {
        inner.fmt(f)
    }
}

/// Backtick quoting,
///   as for a name that would be set in a monospace font.
///
/// Backticks within the value are not escaped.
pub struct Tt<W: DisplayWrapper>(PhantomData<W>);

impl<W: DisplayWrapper> DisplayWrapper for Tt<W> {
    fn fmt<T: Display>(inner: T, f: &mut Formatter) -> Result {
        f.write_str("`")?;
        W::fmt(inner, f)?;
        f.write_str("`")
    }
}

pub type TtQuote = Tt<Raw>;

/// Word joining the final two items of a [`ConjList`].
pub trait Conjunction {
    const TERM: &'static str;
}

pub struct And;
pub struct Or;

impl Conjunction for And {
    const TERM: &'static str = "and";
}

impl Conjunction for Or {
    const TERM: &'static str = "or";
}

/// Renders a slice of [`Display`]-able values.
///
/// Slices are used rather than iterators since [`Display::fmt`] receives
///   its data by shared reference.
pub trait ListDisplayWrapper {
    fn fmt<T: Display>(list: &[T], f: &mut Formatter) -> Result;

    /// Bind `list` to this wrapper.
    fn wrap<T: Display>(list: &[T]) -> ListWrap<Self, T> {
        ListWrap {
            list,
            _phantom: PhantomData,
        }
    }
}

/// English list joined by the conjunction `C`,
///   with each item decorated by `W`.
///
/// Three or more items use a serial comma ("a, b, and c");
///   a pair does not ("a and b").
pub struct ConjList<C: Conjunction, W: DisplayWrapper>(PhantomData<(C, W)>);

impl<C: Conjunction, W: DisplayWrapper> ListDisplayWrapper
    for ConjList<C, W>
{
    fn fmt<T: Display>(list: &[T], f: &mut Formatter) -> Result {
        let last = list.len().saturating_sub(1);

        for (i, item) in list.iter().enumerate() {
            match i {
                0 => (),
                1 if last == 1 => write!(f, " {} ", C::TERM)?,
                i if i == last => write!(f, ", {} ", C::TERM)?,
                _ => f.write_str(", ")?,
            }

            W::fmt(item, f)?;
        }

        Ok(())
    }
}

pub type AndConjList<W> = ConjList<And, W>;
pub type OrConjList<W> = ConjList<Or, W>;

/// A slice bound to a [`ListDisplayWrapper`].
pub struct ListWrap<'a, W: ListDisplayWrapper + ?Sized, T: Display> {
    list: &'a [T],
    _phantom: PhantomData<W>,
}

impl<'a, W: ListDisplayWrapper + ?Sized, T: Display> Display
    for ListWrap<'a, W, T>
{
    fn fmt(&self, f: &mut Formatter) -> Result {
        W::fmt(self.list, f)
    }
}
