//! # Parse trees and the de Bruijn translation
//!
//! The parser produces a named parse tree, and a separate translation pass
//! turns it into kernel terms.  The translation resolves every name
//! occurrence by scoping: a name bound by an enclosing binder becomes a bound
//! variable whose de Bruijn index counts the binders standing between the
//! occurrence and its binder, and every other name is looked up in the
//! kernel's global context.
//!
//! Each bound-variable occurrence is stamped with its binder's declared type
//! *shifted to the occurrence site*.  The binder annotation was translated
//! outside the binder, so at an occurrence with index `k` the annotation's
//! free indices are off by exactly `k`; suspending the annotation against a
//! pure shift of `k` produces the type as the occurrence's own context sees
//! it, which is the invariant the kernel's substitution-time type check
//! relies on.
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

use cumulus::{
    error_code::ErrorCode,
    handle::{tags, Handle},
    runtime_state::RuntimeState,
};

////////////////////////////////////////////////////////////////////////////////
// Parse trees.
////////////////////////////////////////////////////////////////////////////////

/// A term of the concrete syntax, with named variables.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseTerm {
    /// A universe literal, `type[n]`.
    Universe(usize),
    /// A name occurrence, resolved by the translation pass.
    Name(String),
    /// A product, `(x : tau) -> body`, or `tau -> body` with an empty binder
    /// name for the vacuous form.
    Product {
        /// The binder name, possibly empty.
        name: String,
        /// The domain annotation.
        tau: Box<ParseTerm>,
        /// The range, in the scope of the binder.
        body: Box<ParseTerm>,
    },
    /// A lambda-abstraction, `(x : tau) => body`.
    Lambda {
        /// The binder name.
        name: String,
        /// The argument annotation.
        tau: Box<ParseTerm>,
        /// The body, in the scope of the binder.
        body: Box<ParseTerm>,
    },
    /// An application by juxtaposition, `left right`.
    Application {
        /// The function part.
        left: Box<ParseTerm>,
        /// The argument part.
        right: Box<ParseTerm>,
    },
}

/// A statement of the concrete syntax.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseStatement {
    /// `parameter id : T`: declare an opaque constant.
    Parameter {
        /// The declared name.
        name: String,
        /// The declared type.
        tau: ParseTerm,
    },
    /// `definition id := e`: declare a definition, inferring its type.
    Definition {
        /// The declared name.
        name: String,
        /// The body.
        body: ParseTerm,
    },
    /// `definition id : T := e`: declare a definition at a stated type.
    TypedDefinition {
        /// The declared name.
        name: String,
        /// The stated type.
        tau: ParseTerm,
        /// The body.
        body: ParseTerm,
    },
    /// `check e`: infer and normalize the type of a term.
    Check(ParseTerm),
    /// `evaluate e`: normalize a term.
    Evaluate(ParseTerm),
    /// A bare expression, translated and echoed.
    Expression(ParseTerm),
    /// `context`: list the global context.
    Context,
    /// `quit`: end the session.
    Quit,
    /// `silently s`: execute a statement without printing its result.
    Silently(Box<ParseStatement>),
    /// A blank or comment-only line.
    Empty,
}

////////////////////////////////////////////////////////////////////////////////
// The translation pass.
////////////////////////////////////////////////////////////////////////////////

/// One entry of the binder stack carried through the translation: the binder
/// name together with its annotation as translated at the binder's own site.
struct Binder {
    name: String,
    annotation: Handle<tags::Term>,
}

/// Translates a parse tree into a registered kernel term.  Free names
/// resolve to global references, failing with `ErrorCode::UnknownVariable` if
/// undeclared; bound names become indexed variables stamped with their
/// binder's annotation shifted to the occurrence site.
pub fn translate(
    state: &mut RuntimeState,
    term: &ParseTerm,
) -> Result<Handle<tags::Term>, ErrorCode> {
    translate_with(state, term, &mut Vec::new())
}

fn translate_with(
    state: &mut RuntimeState,
    term: &ParseTerm,
    binders: &mut Vec<Binder>,
) -> Result<Handle<tags::Term>, ErrorCode> {
    match term {
        ParseTerm::Universe(level) => Ok(state.term_register_universe(*level)),
        ParseTerm::Name(name) => {
            let position = binders
                .iter()
                .rposition(|binder| &binder.name == name);

            match position {
                Some(position) => {
                    let index = binders.len() - position;
                    let annotation = binders[position].annotation.clone();
                    let shift = state.substitution_register_raw(
                        Vec::<Handle<tags::Term>>::new(),
                        index,
                    )?;
                    let tau =
                        state.term_register_suspension(annotation, shift)?;

                    state.term_register_variable(name.clone(), tau, index)
                }
                None => state.term_register_global(name.clone()),
            }
        }
        ParseTerm::Product { name, tau, body } => {
            let annotation = translate_with(state, tau, binders)?;

            binders.push(Binder {
                name: name.clone(),
                annotation: annotation.clone(),
            });
            let range = translate_with(state, body, binders);
            binders.pop();

            state.term_register_product(name.clone(), annotation, range?)
        }
        ParseTerm::Lambda { name, tau, body } => {
            let annotation = translate_with(state, tau, binders)?;

            binders.push(Binder {
                name: name.clone(),
                annotation: annotation.clone(),
            });
            let range = translate_with(state, body, binders);
            binders.pop();

            state.term_register_lambda(name.clone(), annotation, range?)
        }
        ParseTerm::Application { left, right } => {
            let left = translate_with(state, left, binders)?;
            let right = translate_with(state, right, binders)?;

            state.term_register_application(left, right)
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests.
////////////////////////////////////////////////////////////////////////////////
