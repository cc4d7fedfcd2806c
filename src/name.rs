//! # Names
//!
//! Cumulus uses a locally-nameless representation for its implementation of
//! the dependently-typed λ-calculus: *bound* variables are represented by de
//! Bruijn indices, whilst *global* declarations are referred to by name.  (An
//! alternative would have been a fully name-carrying syntax, as used by HOL
//! Light, at the cost of implementing capture-avoiding substitution and fresh
//! name generation.)  One consequence of this design decision is that names
//! play two very different roles inside the kernel: on a global reference a
//! name is authoritative, and uniquely identifies a declaration in the global
//! context, whereas on a binder or a bound variable a name is merely a *hint*,
//! recorded for the benefit of pretty-printers and completely ignored by the
//! equality judgement.
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

////////////////////////////////////////////////////////////////////////////////
// Names and related material.
////////////////////////////////////////////////////////////////////////////////

/// We use Rust `String` values to represent names.  Note that binder
/// name-hints may be empty, for example on the vacuous product `(T -> B)`,
/// but names of global declarations are always non-empty identifiers.
pub type Name = String;
