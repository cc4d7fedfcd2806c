//! # Driver errors
//!
//! Lexical and syntactic failures are raised outside the kernel and never
//! enter it; they are reported against the offending token and the session
//! continues.
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

use std::fmt::{Display, Error as DisplayError, Formatter};

////////////////////////////////////////////////////////////////////////////////
// Parsing errors.
////////////////////////////////////////////////////////////////////////////////

/// A lexical or syntactic error, reported against the rendering of the token
/// (or character) at which parsing failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsingError {
    /// The rendering of the offending token.
    token: String,
}

impl ParsingError {
    /// Creates a new parsing error at the given token rendering.
    #[inline]
    pub fn at(token: &str) -> Self {
        ParsingError {
            token: String::from(token),
        }
    }

    /// Creates a new parsing error at the end of the input line.
    #[inline]
    pub fn at_end() -> Self {
        Self::at("end of input")
    }
}

impl Display for ParsingError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), DisplayError> {
        write!(f, "Parsing error at token {}.", self.token)
    }
}
