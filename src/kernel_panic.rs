//! # Kernel panics and kernel logging
//!
//! The Cumulus kernel has two failure modes: ordinarily a kernel operation
//! will produce a defined error code in response to some recoverable error.
//! For example, if passed a handle that "dangles", and does not point to any
//! registered kernel object, the operation will abort and return an
//! appropriate error code back to the caller, diagnosing the issue.
//!
//! Unfortunately, however, there may be situations where some internal
//! invariant within the kernel fails: for example if any of our internal
//! heaps fail to be *inductive*, and contain an object which itself points-to
//! another object which does not exist in another kernel heap.  In these
//! cases, we have hit an internal kernel error, which is unrecoverable, and
//! must abort at runtime with a *kernel panic*.
//!
//! This module contains the user-facing messages raised on a kernel panic,
//! along with the small logging shims, built on top of the `log` facade, that
//! the rest of the kernel uses to report on its progress.
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

use log::{error, info};

////////////////////////////////////////////////////////////////////////////////
// Kernel panic messages.
////////////////////////////////////////////////////////////////////////////////

/// Error message produced during a kernel panic due to the kernel running out
/// of fresh handles.
pub const HANDLE_EXHAUST_ERROR: &str =
    "Kernel invariant failed: handles have been exhausted.";

/// Error message produced during a kernel panic due to the kernel running out
/// of universe levels.
pub const UNIVERSE_EXHAUST_ERROR: &str =
    "Kernel invariant failed: universe levels have been exhausted.";

/// Error message produced during a kernel panic due to the kernel
/// encountering a registered kernel-object with a dangling handle.
pub const DANGLING_HANDLE_ERROR: &str =
    "Kernel invariant failed: dangling handle.";

/// Error message produced during a kernel panic due to a substitution being
/// asked for a replacement outside of its domain.
pub const SUBSTITUTION_DOMAIN_ERROR: &str =
    "Kernel invariant failed: substitution index out of range.";

/// Error message produced during a kernel panic due to a weak-head normal
/// form failing to have the constructor that head reduction established.
pub const HEAD_SHAPE_ERROR: &str =
    "Kernel invariant failed: weak-head normal form changed shape.";

////////////////////////////////////////////////////////////////////////////////
// Logging and panicking.
////////////////////////////////////////////////////////////////////////////////

/// Logs an informational message describing the kernel operation currently
/// being performed.
#[inline]
pub fn kernel_info<T>(message: T)
where
    T: AsRef<str>,
{
    info!("{}", message.as_ref());
}

/// Logs an error message describing why the kernel operation currently being
/// performed is about to fail.
#[inline]
pub fn kernel_error<T>(message: T)
where
    T: AsRef<str>,
{
    error!("{}", message.as_ref());
}

/// Aborts the process with a kernel panic.  Used when an internal kernel
/// invariant has failed, which can never be the result of mere user input.
#[inline]
pub fn kernel_panic(message: &str) -> ! {
    error!("{}", message);
    panic!("{}", message);
}
