//! # Kernel object handles
//!
//! Kernel objects, terms and substitutions alike, are owned by the kernel's
//! runtime state, and everything outside of the tables (including other kernel
//! objects) needs some way of naming the object that should be manipulated.
//! In Cumulus, we use *handles* for this purpose, which are simply machine
//! words indexing the kernel's heaps.  Recursive term formation is broken by
//! making every recursive reference to another term or substitution an
//! indirection through these heaps: an `Application` node, for example,
//! contains two handles pointing-to other objects, and it is a basic kernel
//! invariant that these internal pointers never "dangle".
//!
//! A handful of primitive kernel objects are pre-allocated at fixed handles,
//! as they are recreated constantly during normalization: the identity
//! substitution, the unit shift substitution used when pushing a substitution
//! underneath a binder, and the two lowest universes.
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

use std::{
    fmt,
    fmt::{Display, Formatter},
    marker::PhantomData,
    ops::Deref,
};

////////////////////////////////////////////////////////////////////////////////
// Handle tags.
////////////////////////////////////////////////////////////////////////////////

/// This module contains dummy types that are used as type-parameters to the
/// parameterized `Handle` struct, defined below, which allow us to distinguish
/// between handles used for different purposes within the kernel.  This,
/// though handles are really just represented as machine words, allows us to
/// statically avoid mixing up handles that are assumed to point to a term with
/// those assumed to point to a substitution.
pub mod tags {
    /// The handle tag for terms.
    #[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
    pub struct Term;

    /// The handle tag for substitutions.
    #[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
    pub struct Substitution;

    /// This is a dummy trait which will allow us to assert that a particular
    /// type parameter may indeed be instantiated exclusively with a handle
    /// tag.
    pub trait IsTag {}

    impl IsTag for Term {}

    impl IsTag for Substitution {}
}

////////////////////////////////////////////////////////////////////////////////
// Tagged handles.
////////////////////////////////////////////////////////////////////////////////

/// Kernel handles consist of a machine word, which acts as the handle-proper,
/// along with some phantom data which binds the `T` type-parameter to the
/// machine word, and which is used to tag the handle with, using some instance
/// of the `IsTag` trait.  This allows us to statically distinguish between
/// handles that are assumed to point to terms from those that are assumed to
/// point to substitutions, within the kernel.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Handle<T>
where
    T: tags::IsTag,
{
    /// We use the Rust `usize` type as our handle type.  Note that on modern
    /// 64-bit systems this is implemented as a 64-bit unsigned integer.
    handle: usize,
    /// The phantom data binding the tag type, `T`.
    marker: PhantomData<T>,
}

/// The upper-bound (exclusive) of the preallocated handles.
pub const PREALLOCATED_HANDLE_UPPER_BOUND: usize = 4;

/// Returns `true` iff the handle is a pre-allocated handle built into the
/// kernel.
#[inline]
pub fn is_preallocated<T>(handle: &Handle<T>) -> bool
where
    T: tags::IsTag,
{
    **handle < PREALLOCATED_HANDLE_UPPER_BOUND
}

////////////////////////////////////////////////////////////////////////////////
// Pre-allocated handles for kernel objects.
////////////////////////////////////////////////////////////////////////////////

/// A pre-allocated handle used to refer to the identity substitution, with no
/// replacements and no shift.
pub const PREALLOCATED_HANDLE_SUBSTITUTION_IDENTITY: Handle<tags::Substitution> =
    Handle {
        handle: 0,
        marker: PhantomData,
    };
/// A pre-allocated handle used to refer to the unit shift substitution, with
/// no replacements and a shift of one.
pub const PREALLOCATED_HANDLE_SUBSTITUTION_SHIFT: Handle<tags::Substitution> =
    Handle {
        handle: 1,
        marker: PhantomData,
    };
/// A pre-allocated handle used to refer to the universe at level zero.
pub const PREALLOCATED_HANDLE_TERM_UNIVERSE_ZERO: Handle<tags::Term> = Handle {
    handle: 2,
    marker: PhantomData,
};
/// A pre-allocated handle used to refer to the universe at level one, the type
/// of the universe at level zero.
pub const PREALLOCATED_HANDLE_TERM_UNIVERSE_ONE: Handle<tags::Term> = Handle {
    handle: 3,
    marker: PhantomData,
};

////////////////////////////////////////////////////////////////////////////////
// Trait implementations.
////////////////////////////////////////////////////////////////////////////////

/// Dereferencing a `Handle` simply returns its associated machine word.
impl<T> Deref for Handle<T>
where
    T: tags::IsTag,
{
    type Target = usize;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}

/// Injection from machine words into the `Handle` type.
impl<T> From<usize> for Handle<T>
where
    T: tags::IsTag,
{
    #[inline]
    fn from(handle: usize) -> Self {
        Handle {
            handle,
            marker: PhantomData,
        }
    }
}

/// Pretty-printing for term handles.
impl Display for Handle<tags::Term> {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} (term handle)", self.handle)
    }
}

/// Pretty-printing for substitution handles.
impl Display for Handle<tags::Substitution> {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} (substitution handle)", self.handle)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests.
////////////////////////////////////////////////////////////////////////////////

/// Tests for handle-related functionality.
#[cfg(test)]
mod test {
    use crate::handle::{
        is_preallocated, tags, Handle, PREALLOCATED_HANDLE_SUBSTITUTION_IDENTITY,
        PREALLOCATED_HANDLE_TERM_UNIVERSE_ZERO, PREALLOCATED_HANDLE_UPPER_BOUND,
    };

    /// Tests that all pre-allocated handles are recognized as such, and that
    /// freshly-issued handles are not.
    #[test]
    pub fn handle_test0() {
        assert!(is_preallocated(&PREALLOCATED_HANDLE_SUBSTITUTION_IDENTITY));
        assert!(is_preallocated(&PREALLOCATED_HANDLE_TERM_UNIVERSE_ZERO));

        let fresh: Handle<tags::Term> =
            Handle::from(PREALLOCATED_HANDLE_UPPER_BOUND);

        assert!(!is_preallocated(&fresh));
    }

    /// Tests that the injection from machine words into handles is inverted by
    /// dereferencing.
    #[test]
    pub fn handle_test1() {
        let handle: Handle<tags::Substitution> = Handle::from(42);

        assert_eq!(*handle, 42);
    }
}
