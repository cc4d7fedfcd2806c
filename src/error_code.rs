//! # Error codes
//!
//! Every fallible kernel operation returns a defined error code describing
//! why the operation failed.  The set of codes is closed: callers can match
//! exhaustively on the failure kind, and each code carries enough context
//! (the offending name, the offending term, the discovered and the expected
//! type) to render a single-line diagnostic.
//!
//! Note that error codes describe *recoverable* failures of kernel
//! operations.  Violations of internal kernel invariants, such as a
//! registered object containing a dangling handle, are unrecoverable and
//! abort with a kernel panic instead (see the `kernel_panic` module).
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

use crate::{
    handle::{tags, Handle},
    name::Name,
};
use std::fmt::{Display, Error as DisplayError, Formatter};

////////////////////////////////////////////////////////////////////////////////
// Error codes.
////////////////////////////////////////////////////////////////////////////////

/// Error codes, used for passing back information on why a kernel operation
/// failed.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ErrorCode {
    /* Dangling objects. */
    /// A handle was supplied that did not reference a registered term.
    NoSuchTermRegistered,
    /// A handle was supplied that did not reference a registered substitution.
    NoSuchSubstitutionRegistered,
    /* Global context related errors. */
    /// A global reference points at no declaration in the global context.
    UnknownVariable(Name),
    /// An attempt was made to re-declare a name that is already bound in the
    /// global context.
    VariableExists(Name),
    /* Typing related errors. */
    /// A term that was required to be a universe was not.
    TypeExpected(Handle<tags::Term>),
    /// A term that was required to be a product was not.
    ProductExpected(Handle<tags::Term>),
    /// The substitution-time consistency check failed: a replacement term's
    /// type did not match the type expected for the bound variable it
    /// replaces.
    TypeMismatch {
        /// The replacement term whose type was checked.
        term: Handle<tags::Term>,
        /// The normalized type of the replacement term.
        actual: Handle<tags::Term>,
        /// The normalized type expected at the substitution site.
        expected: Handle<tags::Term>,
    },
    /* Term formation errors. */
    /// A term passed to a function as an argument was not well-formed, for
    /// example a bound variable with a zero de Bruijn index.
    TermNotWellformed,
    /* Resource errors. */
    /// Reduction of the given term did not terminate within the configured
    /// recursion bound.
    RecursionLimitExceeded(Handle<tags::Term>),
}

////////////////////////////////////////////////////////////////////////////////
// Trait implementations.
////////////////////////////////////////////////////////////////////////////////

/// Pretty-printing for kernel errors.  Terms embedded in an error are
/// rendered as their handles; the driver, which can resolve handles back into
/// concrete syntax, renders friendlier diagnostics on top of these.
impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter) -> Result<(), DisplayError> {
        match self {
            ErrorCode::NoSuchTermRegistered => {
                write!(f, "No such term registered.")
            }
            ErrorCode::NoSuchSubstitutionRegistered => {
                write!(f, "No such substitution registered.")
            }
            ErrorCode::UnknownVariable(name) => {
                write!(f, "Unknown variable: {}.", name)
            }
            ErrorCode::VariableExists(name) => {
                write!(f, "Variable exists: {}.", name)
            }
            ErrorCode::TypeExpected(term) => {
                write!(f, "Type expected: {}.", term)
            }
            ErrorCode::ProductExpected(term) => {
                write!(f, "Product expected: {}.", term)
            }
            ErrorCode::TypeMismatch {
                term,
                actual,
                expected,
            } => write!(
                f,
                "Type mismatch: {} : {}, expected {}.",
                term, actual, expected
            ),
            ErrorCode::TermNotWellformed => {
                write!(f, "Term not well-formed.")
            }
            ErrorCode::RecursionLimitExceeded(term) => {
                write!(f, "Recursion limit exceeded while reducing {}.", term)
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests.
////////////////////////////////////////////////////////////////////////////////
