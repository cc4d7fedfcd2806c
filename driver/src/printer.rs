//! # Term display
//!
//! Renders kernel terms back into concrete syntax for the user.  Universes
//! print as `type[n]`, global references by their names, and bound variables
//! as `name[k]`, exposing the de Bruijn index alongside the recorded hint.
//! Products print as `((x : T) -> B)` when the bound variable occurs in the
//! range and as `(T -> B)` otherwise; lambda-abstractions always print their
//! binder, `((x : T) => b)`.
//!
//! Suspensions only reach the printer when an un-normalized term is echoed,
//! and are rendered as `(t | s)` with a summary of the pending substitution.
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
    handle::{tags, Handle},
    runtime_state::RuntimeState,
    substitution::Substitution,
    term::Term,
};

////////////////////////////////////////////////////////////////////////////////
// Term display.
////////////////////////////////////////////////////////////////////////////////

/// Renders the term pointed-to by `handle`.  A dangling handle renders as
/// `<dangling>`; this cannot arise for terms produced by the kernel, but the
/// printer has no business panicking over it.
pub fn display_term(
    state: &RuntimeState,
    handle: &Handle<tags::Term>,
) -> String {
    let trm = match state.resolve_term_handle(handle) {
        Ok(trm) => trm,
        Err(_dangling) => return String::from("<dangling>"),
    };

    match trm {
        Term::Universe { level } => format!("type[{}]", level),
        Term::Global { name } => name.clone(),
        Term::Variable { name, index, .. } => format!("{}[{}]", name, index),
        Term::Product { name, tau, body } => {
            if name.is_empty() || !occurs(state, body, 1) {
                format!(
                    "({} -> {})",
                    display_term(state, tau),
                    display_term(state, body)
                )
            } else {
                format!(
                    "(({} : {}) -> {})",
                    name,
                    display_term(state, tau),
                    display_term(state, body)
                )
            }
        }
        Term::Lambda { name, tau, body } => format!(
            "(({} : {}) => {})",
            name,
            display_term(state, tau),
            display_term(state, body)
        ),
        Term::Application { left, right } => format!(
            "({} {})",
            display_term(state, left),
            display_term(state, right)
        ),
        Term::Suspension { term, substitution } => format!(
            "({} | {})",
            display_term(state, term),
            display_substitution(state, substitution)
        ),
    }
}

/// Renders a summary of the substitution pointed-to by `handle`.
fn display_substitution(
    state: &RuntimeState,
    handle: &Handle<tags::Substitution>,
) -> String {
    let sigma = match state.resolve_substitution_handle(handle) {
        Ok(sigma) => sigma,
        Err(_dangling) => return String::from("<dangling>"),
    };

    match sigma {
        Substitution::Raw { elements, shift } => {
            let mut rendered: Vec<String> = elements
                .iter()
                .map(|element| display_term(state, element))
                .collect();
            rendered.push(format!("shift {}", shift));

            rendered.join(", ")
        }
        Substitution::Composition { outer, inner } => format!(
            "({}) . ({})",
            display_substitution(state, outer),
            display_substitution(state, inner)
        ),
        Substitution::Extension { base, element } => format!(
            "{}, ({})",
            display_term(state, element),
            display_substitution(state, base)
        ),
        Substitution::Normalized { base } => {
            display_substitution(state, base)
        }
    }
}

/// Returns `true` iff the bound variable at de Bruijn `depth` occurs in the
/// term pointed-to by `handle`.  Occurrences inside a pending substitution
/// are not chased; the printer only ever asks this of normalized ranges,
/// which contain no suspensions.
fn occurs(
    state: &RuntimeState,
    handle: &Handle<tags::Term>,
    depth: usize,
) -> bool {
    let trm = match state.resolve_term_handle(handle) {
        Ok(trm) => trm,
        Err(_dangling) => return false,
    };

    match trm {
        Term::Universe { .. } | Term::Global { .. } => false,
        Term::Variable { index, .. } => *index == depth,
        Term::Product { tau, body, .. } | Term::Lambda { tau, body, .. } => {
            occurs(state, tau, depth) || occurs(state, body, depth + 1)
        }
        Term::Application { left, right } => {
            occurs(state, left, depth) || occurs(state, right, depth)
        }
        Term::Suspension { term, .. } => occurs(state, term, depth),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests.
////////////////////////////////////////////////////////////////////////////////

/// Tests for term display.
#[cfg(test)]
mod test {
    use crate::{
        parser::parse_statement,
        printer::display_term,
        syntax::{self, ParseStatement},
    };
    use cumulus::{
        handle::{tags, Handle},
        runtime_state::RuntimeState,
    };

    /// Parses an expression statement and translates it, returning the
    /// registered term.
    fn registered(
        state: &mut RuntimeState,
        line: &str,
    ) -> Handle<tags::Term> {
        match parse_statement(line).unwrap() {
            ParseStatement::Expression(term) => {
                syntax::translate(state, &term).unwrap()
            }
            _otherwise => panic!("not an expression statement"),
        }
    }

    /// Tests that universes, globals, and bound variables render in concrete
    /// syntax.
    #[test]
    pub fn printer_test0() {
        let mut state = RuntimeState::new();
        let universe = state.term_register_universe(0);

        assert_eq!(display_term(&state, &universe), "type[0]");

        let reference = state
            .global_register_parameter("N", universe.clone())
            .unwrap();

        assert_eq!(display_term(&state, &reference), "N");

        let variable = state
            .term_register_variable("x", universe, 2)
            .unwrap();

        assert_eq!(display_term(&state, &variable), "x[2]");
    }

    /// Tests that a dependent product prints its binder whilst a vacuous one
    /// does not: in the normalized type of the polymorphic identity, the
    /// outer product is dependent and the inner one is vacuous in its own
    /// bound variable.
    #[test]
    pub fn printer_test1() {
        let mut state = RuntimeState::new();

        let id =
            registered(&mut state, "(A : type[0]) => (x : A) => x");
        let tau = state.term_check(id).unwrap();

        assert_eq!(
            display_term(&state, &tau),
            "((A : type[0]) -> (A[1] -> A[2]))"
        );
    }

    /// Tests the display of an instantiated identity: a lambda whose binder
    /// annotation has been rewritten to the concrete domain.
    #[test]
    pub fn printer_test2() {
        let mut state = RuntimeState::new();
        let universe = state.term_register_universe(0);
        state.global_register_parameter("N", universe).unwrap();

        let redex =
            registered(&mut state, "((A : type[0]) => (x : A) => x) N");
        let result = state.term_evaluate(redex).unwrap();

        assert_eq!(display_term(&state, &result), "((x : N) => x[1])");
    }
}
