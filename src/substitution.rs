//! # Substitutions
//!
//! Substitutions are first-class kernel objects.  Semantically, a
//! substitution is a finite ordered vector of term replacements together with
//! a non-negative *shift*: index `i ∈ 1..m` is replaced by the `i`-th
//! element, whilst indices `i > m` become `i - m + shift`.  Working with de
//! Bruijn indices, this single notion subsumes substitution-proper, weakening
//! and index relocation.
//!
//! Several representations of the same semantic object co-exist, and all
//! satisfy the same algebraic contract:
//!
//! - A *raw* substitution stores its replacement vector and shift directly.
//! - A *composition* `σ ∘ τ` represents the substitution that first acts as
//!   `τ` and then as `σ`.  Its replacements are materialized lazily, one
//!   index at a time, as suspensions of `τ`'s replacements against `σ`; the
//!   point of this representation is that nested suspensions
//!   `((t | τ) | σ)` collapse to `(t | σ ∘ τ)` without traversing `t`.
//! - An *extension* `σ · t` prepends a new replacement for index one, so
//!   index `1` selects `t` and subsequent indices select `σ`'s replacements.
//!   Extensions arise when a substitution is pushed underneath a binder.
//! - A *normalized* substitution forces each replacement to normal form on
//!   demand.  Normalizing is idempotent.
//!
//! As with terms, recursive references are handles into the kernel's heaps,
//! and the algebra itself (length, shift, replacement lookup, and application
//! to a term) lives in the runtime state where the heaps are accessible.
//!
//! # Authors
//!
//! The Cumulus Development Team.
//!
//! # Copyright
//!
//! Copyright (c) The Cumulus Development Team, 2021.  All rights reserved (r).
//! Please see the `LICENSE.markdown` file in the *Cumulus* root directory for
//! licensing information.

use crate::handle::{tags, Handle};
use lazy_static::lazy_static;

////////////////////////////////////////////////////////////////////////////////
// Substitutions, proper.
////////////////////////////////////////////////////////////////////////////////

/// Cumulus substitutions.  These are either raw replacement vectors,
/// compositions, extensions, or normalized views.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Substitution {
    /// A raw substitution: an explicit vector of replacement terms, together
    /// with a shift applied to all remaining indices.
    ///
    /// Note that the kernel ensures that none of the `elements` handles
    /// dangle.
    Raw {
        /// Handles to the replacement terms.  Index `i` is replaced by
        /// `elements[i - 1]`.
        elements: Vec<Handle<tags::Term>>,
        /// The amount by which indices beyond the replacement vector are
        /// raised.
        shift: usize,
    },
    /// A lazy composition of two substitutions: the substitution that acts
    /// first as `inner` and then as `outer`.
    ///
    /// Note that the kernel ensures that neither the `outer` nor `inner`
    /// handles dangle.
    Composition {
        /// A handle to the substitution applied second.
        outer: Handle<tags::Substitution>,
        /// A handle to the substitution applied first.
        inner: Handle<tags::Substitution>,
    },
    /// An extension of a substitution with a new replacement for index one.
    ///
    /// Note that the kernel ensures that neither the `base` nor `element`
    /// handles dangle.
    Extension {
        /// A handle to the substitution being extended.
        base: Handle<tags::Substitution>,
        /// A handle to the replacement term selected by index one.
        element: Handle<tags::Term>,
    },
    /// A normalized view of a substitution: each replacement is forced to
    /// normal form when looked up.
    ///
    /// Note that the kernel ensures that the `base` handle does not dangle.
    Normalized {
        /// A handle to the underlying substitution.
        base: Handle<tags::Substitution>,
    },
}

impl Substitution {
    /// Creates a new raw substitution from a replacement vector and a shift.
    /// Note that this function does not check that the element handles
    /// point-to registered terms in the kernel's heaps.  This is assumed to
    /// be done "upstream" of this function.
    #[inline]
    pub fn raw(elements: Vec<Handle<tags::Term>>, shift: usize) -> Self {
        Substitution::Raw { elements, shift }
    }

    /// Creates a new lazy composition of `outer` with `inner`.  Note that
    /// this function does not check that the handles point-to registered
    /// substitutions in the kernel's heaps.  This is assumed to be done
    /// "upstream" of this function.
    #[inline]
    pub fn composition<T, U>(outer: T, inner: U) -> Self
    where
        T: Into<Handle<tags::Substitution>>,
        U: Into<Handle<tags::Substitution>>,
    {
        Substitution::Composition {
            outer: outer.into(),
            inner: inner.into(),
        }
    }

    /// Creates a new extension of `base` with the replacement `element` for
    /// index one.  Note that this function does not check that the handles
    /// point-to registered objects in the kernel's heaps.  This is assumed to
    /// be done "upstream" of this function.
    #[inline]
    pub fn extension<T, U>(base: T, element: U) -> Self
    where
        T: Into<Handle<tags::Substitution>>,
        U: Into<Handle<tags::Term>>,
    {
        Substitution::Extension {
            base: base.into(),
            element: element.into(),
        }
    }

    /// Creates a new normalized view of `base`.  Note that this function does
    /// not check that the handle points-to a registered substitution in the
    /// kernel's heaps.  This is assumed to be done "upstream" of this
    /// function.
    #[inline]
    pub fn normalized<T>(base: T) -> Self
    where
        T: Into<Handle<tags::Substitution>>,
    {
        Substitution::Normalized { base: base.into() }
    }

    /// Returns `Some((elements, shift))` iff the substitution is a raw
    /// substitution.
    pub fn split_raw(&self) -> Option<(&Vec<Handle<tags::Term>>, &usize)> {
        if let Substitution::Raw { elements, shift } = self {
            Some((elements, shift))
        } else {
            None
        }
    }

    /// Returns `Some((outer, inner))` iff the substitution is a composition.
    pub fn split_composition(
        &self,
    ) -> Option<(&Handle<tags::Substitution>, &Handle<tags::Substitution>)>
    {
        if let Substitution::Composition { outer, inner } = self {
            Some((outer, inner))
        } else {
            None
        }
    }

    /// Returns `Some((base, element))` iff the substitution is an extension.
    pub fn split_extension(
        &self,
    ) -> Option<(&Handle<tags::Substitution>, &Handle<tags::Term>)> {
        if let Substitution::Extension { base, element } = self {
            Some((base, element))
        } else {
            None
        }
    }

    /// Returns `Some(base)` iff the substitution is a normalized view.
    pub fn split_normalized(&self) -> Option<&Handle<tags::Substitution>> {
        if let Substitution::Normalized { base } = self {
            Some(base)
        } else {
            None
        }
    }

    /// Returns `true` iff the substitution is a raw substitution.
    #[inline]
    pub fn is_raw(&self) -> bool {
        self.split_raw().is_some()
    }

    /// Returns `true` iff the substitution is a normalized view.
    #[inline]
    pub fn is_normalized(&self) -> bool {
        self.split_normalized().is_some()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Primitive substitutions.
////////////////////////////////////////////////////////////////////////////////

lazy_static! {
    /// The identity substitution: no replacements, no shift.  Applying it to
    /// any term produces an equal term.
    pub static ref SUBSTITUTION_IDENTITY: Substitution =
        Substitution::raw(Vec::new(), 0);
    /// The unit shift substitution: no replacements, raising every index by
    /// one.  Composed onto a substitution when it is pushed underneath a
    /// binder.
    pub static ref SUBSTITUTION_SHIFT: Substitution =
        Substitution::raw(Vec::new(), 1);
}

////////////////////////////////////////////////////////////////////////////////
// Tests.
////////////////////////////////////////////////////////////////////////////////
