// Hierarchical symbol table
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


//! Hierarchical symbol visibility across grammar contexts.
//!
//! Each entry into an embedded grammar opens a child [`Scope`] of the
//!   path's current scope.
//! Lookups walk from a scope toward the root,
//!   so an embedded region sees the declarations of the contexts that
//!   enclose it,
//!     but not the reverse.
//!
//! Scopes are shared by all paths and addressed by [`ScopeId`];
//!   each declaration records the paths that made it,
//!     so that a path that is invalidated or merged away can have its
//!     declarations retracted without disturbing other paths.

use super::path::PathId;
use crate::{span::Span, sym::SymbolId};
use fxhash::FxHashMap;

/// Index of a [`Scope`] within a [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    fn as_usize(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,

    /// Declaring paths and the span of each path's declaration.
    decls: FxHashMap<SymbolId, Vec<(PathId, Span)>>,
}

#[derive(Debug, Default)]
pub(super) struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    /// Open a new root scope.
    pub fn root(&mut self) -> ScopeId {
        self.push(None)
    }

    /// Open a child scope of `parent`.
    pub fn open(&mut self, parent: ScopeId) -> ScopeId {
        self.push(Some(parent))
    }

    fn push(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);

        self.scopes.push(Scope {
            parent,
            decls: FxHashMap::default(),
        });

        id
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes.get(scope.as_usize())?.parent
    }

    /// Declare `name` in `scope` on behalf of `path`.
    ///
    /// A path redeclaring a name in the same scope retains its original
    ///   declaration.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: SymbolId,
        span: Span,
        path: PathId,
    ) {
        if let Some(s) = self.scopes.get_mut(scope.as_usize()) {
            let owners = s.decls.entry(name).or_default();

            if !owners.iter().any(|(p, _)| *p == path) {
                owners.push((path, span));
            }
        }
    }

    /// Find the declaration of `name` visible to `path` from `scope`,
    ///   searching enclosing scopes outward.
    pub fn lookup(
        &self,
        scope: ScopeId,
        name: SymbolId,
        path: PathId,
    ) -> Option<Span> {
        let mut cur = Some(scope);

        while let Some(id) = cur {
            let s = self.scopes.get(id.as_usize())?;

            let found = s.decls.get(&name).and_then(|owners| {
                owners.iter().find(|(p, _)| *p == path).map(|(_, span)| *span)
            });

            if found.is_some() {
                return found;
            }

            cur = s.parent;
        }

        None
    }

    /// Make every declaration of `parent` visible to `child` as well.
    pub fn fork(&mut self, parent: PathId, child: PathId) {
        for s in &mut self.scopes {
            for owners in s.decls.values_mut() {
                let inherited = owners
                    .iter()
                    .find(|(p, _)| *p == parent)
                    .map(|(_, span)| *span);

                if let Some(span) = inherited {
                    owners.push((child, span));
                }
            }
        }
    }

    /// Remove every declaration made by `path`.
    pub fn retract(&mut self, path: PathId) {
        for s in &mut self.scopes {
            s.decls.retain(|_, owners| {
                owners.retain(|(p, _)| *p != path);
                !owners.is_empty()
            });
        }
    }

    pub fn clear(&mut self) {
        self.scopes.clear();
    }
}
