//! # Cumulus: a proof-checking kernel for a Pure Type System
//!
//! *Cumulus* is the trusted kernel of a small dependently-typed λ-calculus: a
//! Pure Type System with a tower of universes `type[0] : type[1] : …`,
//! dependent products, lambda-abstractions, and application.  The kernel's
//! job is to represent well-formed terms, infer their types, and reduce them
//! to normal form under β-reduction, and nothing else: concrete-syntax
//! parsing, the translation from named variables to de Bruijn indices, and
//! all human-facing display live in the untrusted driver that sits on top of
//! this library.
//!
//! Three design decisions shape the implementation:
//!
//! - **Explicit substitutions.**  Substitution is not a meta-level operation
//!   but a first-class kernel object, with lazy composition, extension, and
//!   normalized views, and a dedicated term constructor suspending a term
//!   against a pending substitution.  β-reduction contracts a redex by
//!   suspending the lambda body against its argument, and nested suspensions
//!   collapse by composing their substitutions without traversing the term.
//! - **Handle-indexed heaps.**  All kernel objects live in tables owned by
//!   the runtime state and reference each other through tagged handles, with
//!   maximal sharing of structurally-equal objects.  Reduction progress is
//!   memoized by monotone forwarding tables keyed on those handles, so work
//!   done for one query benefits every later query that reaches a shared
//!   sub-term.
//! - **Substitution-time type checking.**  Type inference never compares an
//!   argument's type against a product's domain; instead, every replacement
//!   of a bound variable during substitution verifies that the replacement's
//!   type matches the type expected at the site.  This places the check
//!   exactly where the β-rule needs it, once, and gives the kernel a single
//!   switch (unsafe mode) to trade the check away for speed.
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

pub mod declaration;
/// Error codes used to indicate recoverable failures of kernel operations.
pub mod error_code;
/// Handles used to uniquely identify kernel objects.  Various pre-allocated
/// handles are also defined in this module, used to refer to primitive kernel
/// objects.
pub mod handle;
pub mod kernel_panic;
pub mod name;
pub mod runtime_state;
pub mod substitution;
pub mod term;
