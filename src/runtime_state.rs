//! # The runtime state
//!
//! *Note that this is trusted code.*
//!
//! The runtime state owns the kernel's heaps (the term-table and the
//! substitution-table, both indexed by handles) together with the global
//! context of declarations and the kernel's reduction caches.  All recursive
//! term functionality lives here, where the heaps are accessible: the
//! substitution algebra, the eager and weak-head normalization engines, type
//! inference, and the judgmental equality.
//!
//! ## Maximal sharing
//!
//! The kernel enforces maximal sharing on its heaps: any attempt to register
//! a previously-registered object (up-to syntactic equality) returns the
//! handle pointing to the existing registration.  Registration therefore
//! becomes linear in the number of registered objects, but every handle is a
//! unique reference to its object, and reduction progress recorded against a
//! handle is automatically shared by every occurrence of that object.
//!
//! ## Progress forwarding
//!
//! Reduction progress is memoized by *forwarding*: the `current` table maps a
//! term handle to the most advanced eagerly-reduced form the kernel has seen
//! for it, and lookups chase (and path-compress) these links before doing any
//! new work.  A separate table, `heads`, forwards to weak-head normal forms.
//! Both tables are monotone, in that entries are only ever advanced and
//! never rolled back, and they are semantically invisible: they change how
//! fast a normal form is reached, never which normal form.  The `types` table likewise
//! caches inferred types.  Progress recorded by sub-computations of a failing
//! operation remains valid, since it was established before the failure.
//!
//! ## The substitution-time type check
//!
//! When application of a substitution replaces a bound variable, the kernel
//! checks that the normalized type of the replacement matches the normalized
//! type expected at the substitution site.  This check is what makes the
//! typing rule for applications sound: type inference itself never compares
//! an argument's type with a product's domain, leaving the comparison to the
//! substitution the rule produces.  The check is the kernel's principal
//! performance knob and can be switched off ("unsafe mode"), in which case
//! the kernel trusts its callers to only ever build well-typed redexes.
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
    declaration::Declaration,
    error_code::ErrorCode,
    handle::{
        tags, Handle, PREALLOCATED_HANDLE_SUBSTITUTION_IDENTITY,
        PREALLOCATED_HANDLE_SUBSTITUTION_SHIFT,
        PREALLOCATED_HANDLE_TERM_UNIVERSE_ONE,
        PREALLOCATED_HANDLE_TERM_UNIVERSE_ZERO,
        PREALLOCATED_HANDLE_UPPER_BOUND,
    },
    kernel_panic::{
        kernel_error, kernel_info, kernel_panic, DANGLING_HANDLE_ERROR,
        HANDLE_EXHAUST_ERROR, HEAD_SHAPE_ERROR, SUBSTITUTION_DOMAIN_ERROR,
        UNIVERSE_EXHAUST_ERROR,
    },
    name::Name,
    substitution::{Substitution, SUBSTITUTION_IDENTITY, SUBSTITUTION_SHIFT},
    term::Term,
};
use std::{borrow::Borrow, collections::HashMap};

////////////////////////////////////////////////////////////////////////////////
// Useful constants.
////////////////////////////////////////////////////////////////////////////////

/// The default bound on the depth of recursive kernel computations.  Reaching
/// the bound aborts the computation with `ErrorCode::RecursionLimitExceeded`
/// rather than overflowing the process stack.  The driver may raise this for
/// pathologically deep terms.
pub const DEFAULT_RECURSION_LIMIT: usize = 10_000;

////////////////////////////////////////////////////////////////////////////////
// The runtime state.
////////////////////////////////////////////////////////////////////////////////

/// The runtime state of the kernel, containing the various tables of kernel
/// objects, indexed by handles, the global context of declarations, and the
/// reduction caches.  The driver manipulates this state.
#[derive(Clone, Debug)]
pub struct RuntimeState {
    /// The next handle to issue by the runtime state when a new kernel object
    /// is registered.
    next_handle: usize,
    /// The table of terms.  The kernel enforces maximal sharing, wherein any
    /// attempt to register a previously-registered term means that the handle
    /// pointing to the registered term is returned.
    terms: HashMap<Handle<tags::Term>, Term>,
    /// The table of substitutions, with the same maximal-sharing discipline
    /// as the term-table.
    substitutions: HashMap<Handle<tags::Substitution>, Substitution>,
    /// The global context: an append-only association of names to
    /// declarations.
    globals: HashMap<Name, Declaration>,
    /// The names of the global context in order of declaration, for
    /// client-facing context listings.
    declaration_order: Vec<Name>,
    /// Monotone forwarding of term handles to the most advanced
    /// eagerly-reduced form seen so far.
    current: HashMap<Handle<tags::Term>, Handle<tags::Term>>,
    /// Monotone forwarding of term handles to the most advanced weak-head
    /// reduced form seen so far.
    heads: HashMap<Handle<tags::Term>, Handle<tags::Term>>,
    /// Cache of inferred types.
    types: HashMap<Handle<tags::Term>, Handle<tags::Term>>,
    /// Whether the substitution-time type check is disabled.
    unsafe_substitution: bool,
    /// The configured bound on the depth of recursive kernel computations.
    recursion_limit: usize,
    /// The current depth of recursive kernel computations.
    depth: usize,
}

impl RuntimeState {
    /// Creates a new, empty runtime state, populated only with the
    /// pre-allocated primitive kernel objects.
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    /// Issues a fresh handle.  Callers should not rely on this returning
    /// consecutive handles.
    ///
    /// Will **panic** if issued handles are exhausted.
    fn issue_handle<T>(&mut self) -> Handle<T>
    where
        T: tags::IsTag,
    {
        let next = self.next_handle;

        match self.next_handle.checked_add(1) {
            None => kernel_panic(HANDLE_EXHAUST_ERROR),
            Some(incremented) => self.next_handle = incremented,
        }

        Handle::from(next)
    }

    ////////////////////////////////////////////////////////////////////////////
    // Recursion accounting.
    ////////////////////////////////////////////////////////////////////////////

    /// Notes entry into a recursive kernel computation rooted at `handle`.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::RecursionLimitExceeded)` if the configured
    /// recursion limit has been reached.
    fn descend(
        &mut self,
        handle: &Handle<tags::Term>,
    ) -> Result<(), ErrorCode> {
        if self.depth >= self.recursion_limit {
            kernel_error(format!(
                "Recursion limit {} exceeded at {}.",
                self.recursion_limit, handle
            ));

            return Err(ErrorCode::RecursionLimitExceeded(handle.clone()));
        }

        self.depth += 1;

        Ok(())
    }

    /// Notes exit from a recursive kernel computation.  Every `descend` is
    /// paired with exactly one `ascend`, on the error path included, so the
    /// depth counter is consistent after an error has unwound.
    #[inline]
    fn ascend(&mut self) {
        self.depth -= 1;
    }

    ////////////////////////////////////////////////////////////////////////////
    // Progress forwarding.
    ////////////////////////////////////////////////////////////////////////////

    /// Chases forwarding links in `map` from `handle` to the most advanced
    /// form recorded, path-compressing the chain as it goes.
    fn advance_through(
        map: &mut HashMap<Handle<tags::Term>, Handle<tags::Term>>,
        handle: Handle<tags::Term>,
    ) -> Handle<tags::Term> {
        let mut target = handle.clone();

        while let Some(next) = map.get(&target) {
            target = next.clone();
        }

        if target != handle {
            map.insert(handle, target.clone());
        }

        target
    }

    /// Records in `map` that `from` reduces to `to`.  Forwarding a handle to
    /// itself is never recorded, keeping the forwarding chains acyclic.
    fn forward_through(
        map: &mut HashMap<Handle<tags::Term>, Handle<tags::Term>>,
        from: &Handle<tags::Term>,
        to: &Handle<tags::Term>,
    ) {
        if from != to {
            map.insert(from.clone(), to.clone());
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    // Term registration and resolution.
    ////////////////////////////////////////////////////////////////////////////

    /// Admits a term into the runtime state's term-table.  If the term is
    /// already registered (up-to syntactic equality) in the term-table, then
    /// the existing handle is returned, to enforce sharing.
    ///
    /// Functions calling this should ensure that all handles embedded in the
    /// term argument are registered before calling.
    fn admit_term(&mut self, trm: Term) -> Handle<tags::Term> {
        for (handle, registered) in self.terms.iter() {
            if registered == &trm {
                return handle.clone();
            }
        }

        let handle = self.issue_handle();
        self.terms.insert(handle.clone(), trm);

        handle
    }

    /// Admits a substitution into the runtime state's substitution-table,
    /// with the same sharing discipline as `admit_term`.
    fn admit_substitution(
        &mut self,
        sigma: Substitution,
    ) -> Handle<tags::Substitution> {
        for (handle, registered) in self.substitutions.iter() {
            if registered == &sigma {
                return handle.clone();
            }
        }

        let handle = self.issue_handle();
        self.substitutions.insert(handle.clone(), sigma);

        handle
    }

    /// Returns `Ok(trm)` iff the handle points to a term, `trm`, in the
    /// runtime state's term-table.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::NoSuchTermRegistered)` if `handle` does not
    /// point-to any term in the runtime state's term-table.
    pub fn resolve_term_handle<T>(&self, handle: T) -> Result<&Term, ErrorCode>
    where
        T: Borrow<Handle<tags::Term>>,
    {
        self.terms.get(handle.borrow()).ok_or_else(|| {
            kernel_error(format!("Dangling handle: {}.", handle.borrow()));

            ErrorCode::NoSuchTermRegistered
        })
    }

    /// Returns `Ok(sigma)` iff the handle points to a substitution, `sigma`,
    /// in the runtime state's substitution-table.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::NoSuchSubstitutionRegistered)` if `handle`
    /// does not point-to any substitution in the runtime state's
    /// substitution-table.
    pub fn resolve_substitution_handle<T>(
        &self,
        handle: T,
    ) -> Result<&Substitution, ErrorCode>
    where
        T: Borrow<Handle<tags::Substitution>>,
    {
        self.substitutions.get(handle.borrow()).ok_or_else(|| {
            kernel_error(format!("Dangling handle: {}.", handle.borrow()));

            ErrorCode::NoSuchSubstitutionRegistered
        })
    }

    /// Returns `true` iff the handle points to a term registered with the
    /// runtime state.
    #[inline]
    pub fn term_is_registered<T>(&self, handle: T) -> bool
    where
        T: Borrow<Handle<tags::Term>>,
    {
        self.terms.contains_key(handle.borrow())
    }

    /// Returns `true` iff the handle points to a substitution registered with
    /// the runtime state.
    #[inline]
    pub fn substitution_is_registered<T>(&self, handle: T) -> bool
    where
        T: Borrow<Handle<tags::Substitution>>,
    {
        self.substitutions.contains_key(handle.borrow())
    }

    /// Registers the universe at level `level` in the runtime state's
    /// term-table.  Returns the handle of the newly-allocated term (or the
    /// existing handle, if the universe already appears in the term-table).
    #[inline]
    pub fn term_register_universe(&mut self, level: usize) -> Handle<tags::Term> {
        kernel_info(format!("Registering universe at level {}.", level));

        self.admit_term(Term::universe(level))
    }

    /// Registers a reference to the global declaration named `name`.  Returns
    /// `Ok(handle)`, where `handle` is the handle of the newly-allocated term,
    /// if registration is successful.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::UnknownVariable)` if `name` is not declared in
    /// the runtime state's global context.
    pub fn term_register_global<T>(
        &mut self,
        name: T,
    ) -> Result<Handle<tags::Term>, ErrorCode>
    where
        T: Into<Name>,
    {
        let name = name.into();

        kernel_info(format!("Registering global reference to {}.", name));

        if !self.global_is_registered(&name) {
            kernel_error("Name is not declared in the global context.");

            return Err(ErrorCode::UnknownVariable(name));
        }

        Ok(self.admit_term(Term::global(name)))
    }

    /// Registers a bound variable with name hint `name`, type `tau`, and de
    /// Bruijn index `index` in the runtime state's term-table.  The type must
    /// be the variable's type as seen in the term's own context.  Returns
    /// `Ok(handle)`, where `handle` is the handle of the newly-allocated
    /// term, if registration is successful.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::TermNotWellformed)` if `index` is zero.
    ///
    /// Returns `Err(ErrorCode::NoSuchTermRegistered)` if `tau` does not
    /// point-to a term in the runtime state's term-table.
    pub fn term_register_variable<T, U>(
        &mut self,
        name: T,
        tau: U,
        index: usize,
    ) -> Result<Handle<tags::Term>, ErrorCode>
    where
        T: Into<Name>,
        U: Into<Handle<tags::Term>>,
    {
        let tau = tau.into();

        kernel_info(format!("Registering bound variable at index {}.", index));

        if index == 0 {
            kernel_error("Bound variable indices start at one.");

            return Err(ErrorCode::TermNotWellformed);
        }

        self.resolve_term_handle(&tau)?;

        Ok(self.admit_term(Term::variable(name, tau, index)))
    }

    /// Registers a product with binder name hint `name`, domain `tau`, and
    /// range `body` in the runtime state's term-table.  Returns `Ok(handle)`,
    /// where `handle` is the handle of the newly-allocated term, if
    /// registration is successful.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::NoSuchTermRegistered)` if either `tau` or
    /// `body` does not point-to a term in the runtime state's term-table.
    pub fn term_register_product<T, U, V>(
        &mut self,
        name: T,
        tau: U,
        body: V,
    ) -> Result<Handle<tags::Term>, ErrorCode>
    where
        T: Into<Name>,
        U: Into<Handle<tags::Term>>,
        V: Into<Handle<tags::Term>>,
    {
        let tau = tau.into();
        let body = body.into();

        kernel_info(format!(
            "Registering product with domain {} and range {}.",
            tau, body
        ));

        self.resolve_term_handle(&tau)?;
        self.resolve_term_handle(&body)?;

        Ok(self.admit_term(Term::product(name, tau, body)))
    }

    /// Registers a lambda-abstraction with binder name hint `name`, argument
    /// type `tau`, and body `body` in the runtime state's term-table.
    /// Returns `Ok(handle)`, where `handle` is the handle of the
    /// newly-allocated term, if registration is successful.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::NoSuchTermRegistered)` if either `tau` or
    /// `body` does not point-to a term in the runtime state's term-table.
    pub fn term_register_lambda<T, U, V>(
        &mut self,
        name: T,
        tau: U,
        body: V,
    ) -> Result<Handle<tags::Term>, ErrorCode>
    where
        T: Into<Name>,
        U: Into<Handle<tags::Term>>,
        V: Into<Handle<tags::Term>>,
    {
        let tau = tau.into();
        let body = body.into();

        kernel_info(format!(
            "Registering lambda with argument type {} and body {}.",
            tau, body
        ));

        self.resolve_term_handle(&tau)?;
        self.resolve_term_handle(&body)?;

        Ok(self.admit_term(Term::lambda(name, tau, body)))
    }

    /// Registers an application of `left` to `right` in the runtime state's
    /// term-table.  Returns `Ok(handle)`, where `handle` is the handle of the
    /// newly-allocated term, if registration is successful.  Note that no
    /// type-checking is performed at registration time: an ill-typed
    /// application is detected when its type is inferred, or when the β-redex
    /// it participates in is contracted.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::NoSuchTermRegistered)` if either `left` or
    /// `right` does not point-to a term in the runtime state's term-table.
    pub fn term_register_application<T, U>(
        &mut self,
        left: T,
        right: U,
    ) -> Result<Handle<tags::Term>, ErrorCode>
    where
        T: Into<Handle<tags::Term>>,
        U: Into<Handle<tags::Term>>,
    {
        let left = left.into();
        let right = right.into();

        kernel_info(format!("Registering application of {} to {}.", left, right));

        self.resolve_term_handle(&left)?;
        self.resolve_term_handle(&right)?;

        Ok(self.admit_term(Term::application(left, right)))
    }

    /// Registers a suspension of the term `term` against the substitution
    /// `substitution` in the runtime state's term-table.  Returns
    /// `Ok(handle)`, where `handle` is the handle of the newly-allocated
    /// term, if registration is successful.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::NoSuchTermRegistered)` if `term` does not
    /// point-to a term in the runtime state's term-table.
    ///
    /// Returns `Err(ErrorCode::NoSuchSubstitutionRegistered)` if
    /// `substitution` does not point-to a substitution in the runtime state's
    /// substitution-table.
    pub fn term_register_suspension<T, U>(
        &mut self,
        term: T,
        substitution: U,
    ) -> Result<Handle<tags::Term>, ErrorCode>
    where
        T: Into<Handle<tags::Term>>,
        U: Into<Handle<tags::Substitution>>,
    {
        let term = term.into();
        let substitution = substitution.into();

        kernel_info(format!(
            "Registering suspension of {} against {}.",
            term, substitution
        ));

        self.resolve_term_handle(&term)?;
        self.resolve_substitution_handle(&substitution)?;

        Ok(self.admit_term(Term::suspension(term, substitution)))
    }

    ////////////////////////////////////////////////////////////////////////////
    // Substitution registration.
    ////////////////////////////////////////////////////////////////////////////

    /// Registers a raw substitution with replacement vector `elements` and
    /// shift `shift` in the runtime state's substitution-table.  Returns
    /// `Ok(handle)`, where `handle` is the handle of the newly-allocated
    /// substitution, if registration is successful.  Note that registering
    /// the empty replacement vector with shift zero returns the pre-allocated
    /// identity substitution.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::NoSuchTermRegistered)` if any handle appearing
    /// in `elements` does not point-to a term in the runtime state's
    /// term-table.
    pub fn substitution_register_raw<T>(
        &mut self,
        elements: Vec<T>,
        shift: usize,
    ) -> Result<Handle<tags::Substitution>, ErrorCode>
    where
        T: Into<Handle<tags::Term>>,
    {
        let elements: Vec<Handle<tags::Term>> =
            elements.into_iter().map(|element| element.into()).collect();

        kernel_info(format!(
            "Registering raw substitution with {} replacements and shift {}.",
            elements.len(),
            shift
        ));

        for element in elements.iter() {
            self.resolve_term_handle(element)?;
        }

        Ok(self.admit_substitution(Substitution::raw(elements, shift)))
    }

    /// Registers the lazy composition of `outer` with `inner` in the runtime
    /// state's substitution-table.  Returns `Ok(handle)`, where `handle` is
    /// the handle of the newly-allocated substitution, if registration is
    /// successful.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::NoSuchSubstitutionRegistered)` if either
    /// `outer` or `inner` does not point-to a substitution in the runtime
    /// state's substitution-table.
    pub fn substitution_register_composition<T, U>(
        &mut self,
        outer: T,
        inner: U,
    ) -> Result<Handle<tags::Substitution>, ErrorCode>
    where
        T: Into<Handle<tags::Substitution>>,
        U: Into<Handle<tags::Substitution>>,
    {
        let outer = outer.into();
        let inner = inner.into();

        kernel_info(format!("Registering composition of {} with {}.", outer, inner));

        self.resolve_substitution_handle(&outer)?;
        self.resolve_substitution_handle(&inner)?;

        Ok(self.admit_substitution(Substitution::composition(outer, inner)))
    }

    /// Registers the extension of `base` with the replacement `element` for
    /// index one in the runtime state's substitution-table.  Returns
    /// `Ok(handle)`, where `handle` is the handle of the newly-allocated
    /// substitution, if registration is successful.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::NoSuchSubstitutionRegistered)` if `base` does
    /// not point-to a substitution in the runtime state's substitution-table.
    ///
    /// Returns `Err(ErrorCode::NoSuchTermRegistered)` if `element` does not
    /// point-to a term in the runtime state's term-table.
    pub fn substitution_register_extension<T, U>(
        &mut self,
        base: T,
        element: U,
    ) -> Result<Handle<tags::Substitution>, ErrorCode>
    where
        T: Into<Handle<tags::Substitution>>,
        U: Into<Handle<tags::Term>>,
    {
        let base = base.into();
        let element = element.into();

        kernel_info(format!("Registering extension of {} with {}.", base, element));

        self.resolve_substitution_handle(&base)?;
        self.resolve_term_handle(&element)?;

        Ok(self.admit_substitution(Substitution::extension(base, element)))
    }

    /// Registers the normalized view of the substitution pointed-to by
    /// `handle`, forcing each replacement to normal form on demand.
    /// Normalizing is idempotent: the normalized view of a normalized view is
    /// the original normalized view.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::NoSuchSubstitutionRegistered)` if `handle`
    /// does not point-to a substitution in the runtime state's
    /// substitution-table.
    pub fn substitution_normalize<T>(
        &mut self,
        handle: T,
    ) -> Result<Handle<tags::Substitution>, ErrorCode>
    where
        T: Into<Handle<tags::Substitution>>,
    {
        let handle = handle.into();

        if self.resolve_substitution_handle(&handle)?.is_normalized() {
            Ok(handle)
        } else {
            Ok(self.admit_substitution(Substitution::normalized(handle)))
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    // The substitution algebra.
    ////////////////////////////////////////////////////////////////////////////

    /// Returns the length of the replacement vector of the substitution
    /// pointed-to by `handle`.  For a composition the length is derived from
    /// the components: writing `m` and `s` for the length and shift of the
    /// inner substitution and `n` for the length of the outer one, the
    /// composition replaces `n - s + m` indices when `s < n`, and `m` indices
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::NoSuchSubstitutionRegistered)` if `handle`
    /// does not point-to a substitution in the runtime state's
    /// substitution-table.
    pub fn substitution_length<T>(&self, handle: T) -> Result<usize, ErrorCode>
    where
        T: Borrow<Handle<tags::Substitution>>,
    {
        match self.resolve_substitution_handle(handle.borrow())? {
            Substitution::Raw { elements, .. } => Ok(elements.len()),
            Substitution::Extension { base, .. } => {
                Ok(self.substitution_length(base)? + 1)
            }
            Substitution::Normalized { base } => self.substitution_length(base),
            Substitution::Composition { outer, inner } => {
                let inner_shift = self.substitution_shift(inner)?;
                let outer_length = self.substitution_length(outer)?;
                let inner_length = self.substitution_length(inner)?;

                if inner_shift < outer_length {
                    Ok(outer_length - inner_shift + inner_length)
                } else {
                    Ok(inner_length)
                }
            }
        }
    }

    /// Returns the shift of the substitution pointed-to by `handle`.  For a
    /// composition: writing `s` for the inner shift, `n` for the outer length
    /// and `r` for the outer shift, the composition's shift is `r` when
    /// `s < n`, and `r + s - n` otherwise.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::NoSuchSubstitutionRegistered)` if `handle`
    /// does not point-to a substitution in the runtime state's
    /// substitution-table.
    pub fn substitution_shift<T>(&self, handle: T) -> Result<usize, ErrorCode>
    where
        T: Borrow<Handle<tags::Substitution>>,
    {
        match self.resolve_substitution_handle(handle.borrow())? {
            Substitution::Raw { shift, .. } => Ok(*shift),
            Substitution::Extension { base, .. } => self.substitution_shift(base),
            Substitution::Normalized { base } => self.substitution_shift(base),
            Substitution::Composition { outer, inner } => {
                let inner_shift = self.substitution_shift(inner)?;
                let outer_length = self.substitution_length(outer)?;
                let outer_shift = self.substitution_shift(outer)?;

                if inner_shift < outer_length {
                    Ok(outer_shift)
                } else {
                    Ok(outer_shift + inner_shift - outer_length)
                }
            }
        }
    }

    /// Returns the replacement selected by `index` from the substitution
    /// pointed-to by `handle`.  Replacements of compositions are materialized
    /// lazily, as suspensions of the inner substitution's replacements
    /// against the outer substitution; replacements of normalized views are
    /// forced to normal form.  Maximal sharing of the term-table acts as the
    /// materialization cache: looking the same replacement up twice yields
    /// the same handle, and any reduction progress made on it is shared.
    ///
    /// Will **panic** if `index` is not contained in the interval
    /// `1..=substitution_length(handle)`.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::NoSuchSubstitutionRegistered)` if `handle`
    /// does not point-to a substitution in the runtime state's
    /// substitution-table.  Other error codes propagate from normalizing the
    /// replacements of a normalized view.
    pub fn substitution_element<T>(
        &mut self,
        handle: T,
        index: usize,
    ) -> Result<Handle<tags::Term>, ErrorCode>
    where
        T: Borrow<Handle<tags::Substitution>>,
    {
        if index == 0 {
            kernel_panic(SUBSTITUTION_DOMAIN_ERROR);
        }

        let sigma = self.resolve_substitution_handle(handle.borrow())?.clone();

        match sigma {
            Substitution::Raw { elements, .. } => match elements.get(index - 1)
            {
                Some(element) => Ok(element.clone()),
                None => kernel_panic(SUBSTITUTION_DOMAIN_ERROR),
            },
            Substitution::Extension { base, element } => {
                if index == 1 {
                    Ok(element)
                } else {
                    self.substitution_element(&base, index - 1)
                }
            }
            Substitution::Normalized { base } => {
                let element = self.substitution_element(&base, index)?;

                self.term_normalize(element)
            }
            Substitution::Composition { outer, inner } => {
                let inner_shift = self.substitution_shift(&inner)?;
                let outer_length = self.substitution_length(&outer)?;
                let inner_length = self.substitution_length(&inner)?;

                if inner_shift >= outer_length || index <= inner_length {
                    let element = self.substitution_element(&inner, index)?;

                    Ok(self.admit_term(Term::suspension(element, outer)))
                } else {
                    self.substitution_element(
                        &outer,
                        index + inner_shift - inner_length,
                    )
                }
            }
        }
    }

    /// Applies the substitution pointed-to by `sigma` to the term pointed-to
    /// by `term`, rewriting bound variables by their replacements and
    /// delaying work under binders and suspensions.  When a bound variable is
    /// replaced and unsafe mode is off, the replacement's normalized type is
    /// checked against the normalized type expected at the substitution site.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::TypeMismatch)` if the substitution-time type
    /// check fails.
    ///
    /// Returns `Err(ErrorCode::RecursionLimitExceeded)` if the configured
    /// recursion bound is reached.
    ///
    /// Returns `Err(ErrorCode::NoSuchTermRegistered)` or
    /// `Err(ErrorCode::NoSuchSubstitutionRegistered)` if either argument
    /// handle dangles.
    pub fn substitution_apply<T, U>(
        &mut self,
        sigma: T,
        term: U,
    ) -> Result<Handle<tags::Term>, ErrorCode>
    where
        T: Into<Handle<tags::Substitution>>,
        U: Into<Handle<tags::Term>>,
    {
        let sigma = sigma.into();
        let term = term.into();

        self.descend(&term)?;
        let result = self.substitution_apply_inner(sigma, term);
        self.ascend();

        result
    }

    fn substitution_apply_inner(
        &mut self,
        sigma: Handle<tags::Substitution>,
        term: Handle<tags::Term>,
    ) -> Result<Handle<tags::Term>, ErrorCode> {
        self.resolve_substitution_handle(&sigma)?;

        let trm = self.resolve_term_handle(&term)?.clone();

        match trm {
            Term::Universe { .. } | Term::Global { .. } => Ok(term),
            Term::Variable { name, tau, index } => {
                let length = self.substitution_length(&sigma)?;

                if index <= length {
                    let replacement =
                        self.substitution_element(&sigma, index)?;

                    if self.unsafe_substitution {
                        return Ok(replacement);
                    }

                    let expected = self.substitution_apply(sigma, tau)?;
                    let expected = self.term_normalize(expected)?;
                    let actual = self.term_type_infer(replacement.clone())?;
                    let actual = self.term_normalize(actual)?;

                    if self.term_is_identical(&expected, &actual)? {
                        Ok(replacement)
                    } else {
                        kernel_error(format!(
                            "Replacement {} has type {}, expected {}.",
                            replacement, actual, expected
                        ));

                        Err(ErrorCode::TypeMismatch {
                            term: replacement,
                            actual,
                            expected,
                        })
                    }
                } else {
                    let shift = self.substitution_shift(&sigma)?;
                    let tau =
                        self.admit_term(Term::suspension(tau, sigma));

                    Ok(self.admit_term(Term::variable(
                        name,
                        tau,
                        index - length + shift,
                    )))
                }
            }
            Term::Application { left, right } => {
                let left = self.substitution_apply(sigma.clone(), left)?;
                let right = self.substitution_apply(sigma, right)?;

                Ok(self.admit_term(Term::application(left, right)))
            }
            Term::Product { name, tau, body } => {
                let (tau, body) =
                    self.substitution_apply_binder(sigma, &name, tau, body)?;

                Ok(self.admit_term(Term::product(name, tau, body)))
            }
            Term::Lambda { name, tau, body } => {
                let (tau, body) =
                    self.substitution_apply_binder(sigma, &name, tau, body)?;

                Ok(self.admit_term(Term::lambda(name, tau, body)))
            }
            Term::Suspension {
                term: suspended,
                substitution,
            } => {
                let composed = self.admit_substitution(
                    Substitution::composition(sigma, substitution),
                );

                Ok(self.admit_term(Term::suspension(suspended, composed)))
            }
        }
    }

    /// Pushes a substitution underneath one binder: the substitution is
    /// composed with the unit shift, then extended with a fresh variable at
    /// index one standing for the newly-bound variable, whose recorded type
    /// is the binder's domain suspended against the lifted substitution.
    /// Returns the suspended domain and body of the rewritten binder.
    fn substitution_apply_binder(
        &mut self,
        sigma: Handle<tags::Substitution>,
        name: &Name,
        tau: Handle<tags::Term>,
        body: Handle<tags::Term>,
    ) -> Result<(Handle<tags::Term>, Handle<tags::Term>), ErrorCode> {
        let lifted = self.admit_substitution(Substitution::composition(
            PREALLOCATED_HANDLE_SUBSTITUTION_SHIFT,
            sigma.clone(),
        ));
        let bound_tau =
            self.admit_term(Term::suspension(tau.clone(), lifted.clone()));
        let bound =
            self.admit_term(Term::variable(name.clone(), bound_tau, 1));
        let extended = self
            .admit_substitution(Substitution::extension(lifted, bound));

        let tau = self.admit_term(Term::suspension(tau, sigma));
        let body = self.admit_term(Term::suspension(body, extended));

        Ok((tau, body))
    }

    ////////////////////////////////////////////////////////////////////////////
    // Normalization.
    ////////////////////////////////////////////////////////////////////////////

    /// Reduces the term pointed-to by `handle` to eager normal form: no
    /// β-redex, no suspension, and no unfoldable global reference remains
    /// anywhere in the result.  Progress is forwarded through the `current`
    /// table, so work done on a term (or any shared sub-term) by an earlier
    /// query is not repeated.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::UnknownVariable)` if a global reference in the
    /// term points at no declaration.
    ///
    /// Returns `Err(ErrorCode::RecursionLimitExceeded)` if the configured
    /// recursion bound is reached.
    ///
    /// Other error codes propagate from the substitution applications
    /// performed during reduction.
    pub fn term_normalize<T>(
        &mut self,
        handle: T,
    ) -> Result<Handle<tags::Term>, ErrorCode>
    where
        T: Into<Handle<tags::Term>>,
    {
        let handle = handle.into();

        self.descend(&handle)?;
        let result = self.term_normalize_inner(&handle);
        self.ascend();

        result
    }

    fn term_normalize_inner(
        &mut self,
        handle: &Handle<tags::Term>,
    ) -> Result<Handle<tags::Term>, ErrorCode> {
        let target = Self::advance_through(&mut self.current, handle.clone());
        let trm = self.resolve_term_handle(&target)?.clone();

        let result = match trm {
            Term::Universe { .. } | Term::Variable { .. } => target.clone(),
            Term::Global { name } => {
                let unfolding = match self.globals.get(&name) {
                    Some(declaration) => declaration.body().cloned(),
                    None => {
                        kernel_error(format!("Unknown global: {}.", name));

                        return Err(ErrorCode::UnknownVariable(name));
                    }
                };

                match unfolding {
                    Some(body) => self.term_normalize(body)?,
                    None => target.clone(),
                }
            }
            Term::Product { name, tau, body } => {
                let tau = self.term_normalize(tau)?;
                let body = self.term_normalize(body)?;

                self.admit_term(Term::product(name, tau, body))
            }
            Term::Lambda { name, tau, body } => {
                let tau = self.term_normalize(tau)?;
                let body = self.term_normalize(body)?;

                self.admit_term(Term::lambda(name, tau, body))
            }
            Term::Application { left, right } => {
                let left = self.term_normalize_weak_head(left)?;

                if self.resolve_term_handle(&left)?.is_lambda() {
                    let left = self.term_normalize(left)?;
                    let body = match self
                        .resolve_term_handle(&left)?
                        .split_lambda()
                    {
                        Some((_name, _tau, body)) => body.clone(),
                        None => kernel_panic(HEAD_SHAPE_ERROR),
                    };
                    let right = self.term_normalize(right)?;
                    let sigma = self.admit_substitution(Substitution::raw(
                        vec![right],
                        0,
                    ));
                    let redex =
                        self.admit_term(Term::suspension(body, sigma));

                    self.term_normalize(redex)?
                } else {
                    let left = self.term_normalize(left)?;
                    let right = self.term_normalize(right)?;

                    self.admit_term(Term::application(left, right))
                }
            }
            Term::Suspension { term, substitution } => {
                let substitution =
                    self.substitution_normalize(substitution)?;
                let term = self.term_normalize(term)?;
                let applied = self.substitution_apply(substitution, term)?;

                self.term_normalize(applied)?
            }
        };

        Self::forward_through(&mut self.current, &target, &result);
        Self::forward_through(&mut self.current, handle, &result);

        Ok(result)
    }

    /// Reduces the term pointed-to by `handle` to weak-head normal form: the
    /// topmost constructor of the result is not reducible: not a suspension,
    /// not an application of a lambda-abstraction, and not a reference to a
    /// global definition.  Sub-terms are left untouched.  Progress is
    /// forwarded through the `heads` table.
    ///
    /// # Errors
    ///
    /// As for `term_normalize`.
    pub fn term_normalize_weak_head<T>(
        &mut self,
        handle: T,
    ) -> Result<Handle<tags::Term>, ErrorCode>
    where
        T: Into<Handle<tags::Term>>,
    {
        let handle = handle.into();

        self.descend(&handle)?;
        let result = self.term_normalize_weak_head_inner(&handle);
        self.ascend();

        result
    }

    fn term_normalize_weak_head_inner(
        &mut self,
        handle: &Handle<tags::Term>,
    ) -> Result<Handle<tags::Term>, ErrorCode> {
        let target = Self::advance_through(&mut self.heads, handle.clone());
        let trm = self.resolve_term_handle(&target)?.clone();

        let result = match trm {
            Term::Universe { .. }
            | Term::Variable { .. }
            | Term::Product { .. }
            | Term::Lambda { .. } => target.clone(),
            Term::Global { name } => {
                let unfolding = match self.globals.get(&name) {
                    Some(declaration) => declaration.body().cloned(),
                    None => {
                        kernel_error(format!("Unknown global: {}.", name));

                        return Err(ErrorCode::UnknownVariable(name));
                    }
                };

                match unfolding {
                    Some(body) => self.term_normalize_weak_head(body)?,
                    None => target.clone(),
                }
            }
            Term::Application { left, right } => {
                let left = self.term_normalize_weak_head(left)?;
                let body = self
                    .resolve_term_handle(&left)?
                    .split_lambda()
                    .map(|(_name, _tau, body)| body.clone());

                match body {
                    Some(body) => {
                        let sigma = self.admit_substitution(
                            Substitution::raw(vec![right], 0),
                        );
                        let redex =
                            self.admit_term(Term::suspension(body, sigma));

                        self.term_normalize_weak_head(redex)?
                    }
                    None => {
                        self.admit_term(Term::application(left, right))
                    }
                }
            }
            Term::Suspension { term, substitution } => {
                let applied = self.substitution_apply(substitution, term)?;

                self.term_normalize_weak_head(applied)?
            }
        };

        Self::forward_through(&mut self.heads, &target, &result);
        Self::forward_through(&mut self.heads, handle, &result);

        Ok(result)
    }

    ////////////////////////////////////////////////////////////////////////////
    // Type inference.
    ////////////////////////////////////////////////////////////////////////////

    /// Infers the type of the term pointed-to by `handle`, returning a handle
    /// to the type term.  Inferred types are cached.  Note that the rule for
    /// applications does not compare the argument's type with the product's
    /// domain: the comparison is performed by the substitution-time type
    /// check when the returned suspension is eventually pushed through the
    /// range (and is skipped entirely in unsafe mode).
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::TypeExpected)` if the domain or range of a
    /// product fails to be a universe.
    ///
    /// Returns `Err(ErrorCode::ProductExpected)` if the function part of an
    /// application fails to have product type.
    ///
    /// Returns `Err(ErrorCode::UnknownVariable)` if a global reference points
    /// at no declaration.
    ///
    /// Returns `Err(ErrorCode::RecursionLimitExceeded)` if the configured
    /// recursion bound is reached.
    pub fn term_type_infer<T>(
        &mut self,
        handle: T,
    ) -> Result<Handle<tags::Term>, ErrorCode>
    where
        T: Into<Handle<tags::Term>>,
    {
        let handle = handle.into();

        if let Some(cached) = self.types.get(&handle) {
            return Ok(cached.clone());
        }

        self.descend(&handle)?;
        let result = self.term_type_infer_inner(&handle);
        self.ascend();

        let result = result?;
        self.types.insert(handle, result.clone());

        Ok(result)
    }

    fn term_type_infer_inner(
        &mut self,
        handle: &Handle<tags::Term>,
    ) -> Result<Handle<tags::Term>, ErrorCode> {
        let target = Self::advance_through(&mut self.current, handle.clone());

        if &target != handle {
            return self.term_type_infer(target);
        }

        let trm = self.resolve_term_handle(&target)?.clone();

        match trm {
            Term::Universe { level } => match level.checked_add(1) {
                None => kernel_panic(UNIVERSE_EXHAUST_ERROR),
                Some(level) => Ok(self.admit_term(Term::universe(level))),
            },
            Term::Global { name } => self
                .globals
                .get(&name)
                .map(|declaration| declaration.tau().clone())
                .ok_or_else(|| {
                    kernel_error(format!("Unknown global: {}.", name));

                    ErrorCode::UnknownVariable(name.clone())
                }),
            Term::Variable { tau, .. } => Ok(tau),
            Term::Product { tau, body, .. } => {
                let tau_level = self.term_universe_level(tau)?;
                let body_level = self.term_universe_level(body)?;

                Ok(self
                    .admit_term(Term::universe(tau_level.max(body_level))))
            }
            Term::Lambda { name, tau, body } => {
                let body_tau = self.term_type_infer(body)?;

                Ok(self.admit_term(Term::product(name, tau, body_tau)))
            }
            Term::Application { left, right } => {
                let left_tau = self.term_type_infer(left.clone())?;
                let left_tau = self.term_normalize_weak_head(left_tau)?;

                let range = match self
                    .resolve_term_handle(&left_tau)?
                    .split_product()
                {
                    Some((_name, _tau, body)) => body.clone(),
                    None => {
                        kernel_error(format!(
                            "Applied term {} does not have product type.",
                            left
                        ));

                        return Err(ErrorCode::ProductExpected(left));
                    }
                };

                let sigma = self
                    .admit_substitution(Substitution::raw(vec![right], 0));

                Ok(self.admit_term(Term::suspension(range, sigma)))
            }
            Term::Suspension { term, substitution } => {
                let term_tau = self.term_type_infer(term)?;

                Ok(self
                    .admit_term(Term::suspension(term_tau, substitution)))
            }
        }
    }

    /// Returns the universe level that the term pointed-to by `handle`
    /// inhabits.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::TypeExpected)` if the weak-head normal form of
    /// the term's type is not a universe.
    fn term_universe_level(
        &mut self,
        handle: Handle<tags::Term>,
    ) -> Result<usize, ErrorCode> {
        let tau = self.term_type_infer(handle.clone())?;
        let tau = self.term_normalize_weak_head(tau)?;

        match self.resolve_term_handle(&tau)?.split_universe() {
            Some(level) => Ok(*level),
            None => {
                kernel_error(format!("Term {} is not a type.", handle));

                Err(ErrorCode::TypeExpected(handle))
            }
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    // Judgmental equality.
    ////////////////////////////////////////////////////////////////////////////

    /// Returns `Ok(true)` iff the terms pointed-to by `left` and `right` are
    /// syntactically identical, modulo α-equivalence: bound variables are
    /// compared by de Bruijn index alone, and binders by their domains and
    /// bodies, with name hints ignored throughout.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::NoSuchTermRegistered)` if either handle does
    /// not point-to a term in the runtime state's term-table.
    pub fn term_is_identical<T>(
        &self,
        left: T,
        right: T,
    ) -> Result<bool, ErrorCode>
    where
        T: Borrow<Handle<tags::Term>>,
    {
        let left_trm = self.resolve_term_handle(left.borrow())?;
        let right_trm = self.resolve_term_handle(right.borrow())?;

        if left.borrow() == right.borrow() {
            return Ok(true);
        }

        match (left_trm, right_trm) {
            (
                Term::Universe { level: left_level },
                Term::Universe { level: right_level },
            ) => Ok(left_level == right_level),
            (
                Term::Global { name: left_name },
                Term::Global { name: right_name },
            ) => Ok(left_name == right_name),
            (
                Term::Variable {
                    index: left_index, ..
                },
                Term::Variable {
                    index: right_index, ..
                },
            ) => Ok(left_index == right_index),
            (
                Term::Product {
                    tau: left_tau,
                    body: left_body,
                    ..
                },
                Term::Product {
                    tau: right_tau,
                    body: right_body,
                    ..
                },
            ) => Ok(self.term_is_identical(left_tau, right_tau)?
                && self.term_is_identical(left_body, right_body)?),
            (
                Term::Lambda {
                    tau: left_tau,
                    body: left_body,
                    ..
                },
                Term::Lambda {
                    tau: right_tau,
                    body: right_body,
                    ..
                },
            ) => Ok(self.term_is_identical(left_tau, right_tau)?
                && self.term_is_identical(left_body, right_body)?),
            (
                Term::Application {
                    left: left_function,
                    right: left_argument,
                },
                Term::Application {
                    left: right_function,
                    right: right_argument,
                },
            ) => Ok(self.term_is_identical(left_function, right_function)?
                && self.term_is_identical(left_argument, right_argument)?),
            (
                Term::Suspension {
                    term: left_term,
                    substitution: left_substitution,
                },
                Term::Suspension {
                    term: right_term,
                    substitution: right_substitution,
                },
            ) => Ok(self.term_is_identical(left_term, right_term)?
                && self.substitution_is_identical(
                    left_substitution,
                    right_substitution,
                )?),
            _otherwise => Ok(false),
        }
    }

    /// Returns `Ok(true)` iff the substitutions pointed-to by `left` and
    /// `right` are identical.  Two raw substitutions are identical when their
    /// shifts agree and their replacement vectors are pointwise identical;
    /// substitutions in other representations are identical only when they
    /// are the same registered object.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::NoSuchSubstitutionRegistered)` if either
    /// handle does not point-to a substitution in the runtime state's
    /// substitution-table.
    pub fn substitution_is_identical<T>(
        &self,
        left: T,
        right: T,
    ) -> Result<bool, ErrorCode>
    where
        T: Borrow<Handle<tags::Substitution>>,
    {
        let left_sigma = self.resolve_substitution_handle(left.borrow())?;
        let right_sigma = self.resolve_substitution_handle(right.borrow())?;

        if left.borrow() == right.borrow() {
            return Ok(true);
        }

        match (left_sigma, right_sigma) {
            (
                Substitution::Raw {
                    elements: left_elements,
                    shift: left_shift,
                },
                Substitution::Raw {
                    elements: right_elements,
                    shift: right_shift,
                },
            ) => {
                if left_shift != right_shift
                    || left_elements.len() != right_elements.len()
                {
                    return Ok(false);
                }

                for (left_element, right_element) in
                    left_elements.iter().zip(right_elements.iter())
                {
                    if !self.term_is_identical(left_element, right_element)? {
                        return Ok(false);
                    }
                }

                Ok(true)
            }
            _otherwise => Ok(false),
        }
    }

    /// Returns `Ok(true)` iff the terms pointed-to by `left` and `right` are
    /// judgmentally equal: both are reduced to normal form, and the normal
    /// forms are compared for syntactic identity.
    ///
    /// # Errors
    ///
    /// As for `term_normalize`.
    pub fn term_is_equal<T>(
        &mut self,
        left: T,
        right: T,
    ) -> Result<bool, ErrorCode>
    where
        T: Into<Handle<tags::Term>>,
    {
        let left = self.term_normalize(left.into())?;
        let right = self.term_normalize(right.into())?;

        self.term_is_identical(&left, &right)
    }

    ////////////////////////////////////////////////////////////////////////////
    // The global context.
    ////////////////////////////////////////////////////////////////////////////

    /// Registers a new parameter (an opaque constant) named `name`, with
    /// declared type `tau`, in the runtime state's global context.  Returns
    /// `Ok(handle)`, where `handle` points to a global reference to the new
    /// declaration, if registration is successful.  On failure the global
    /// context is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::VariableExists)` if `name` is already declared
    /// in the global context.
    ///
    /// Returns `Err(ErrorCode::TypeExpected)` if the inferred type of `tau`
    /// does not weak-head reduce to a universe.
    ///
    /// Other error codes propagate from inferring the type of `tau`.
    pub fn global_register_parameter<T, U>(
        &mut self,
        name: T,
        tau: U,
    ) -> Result<Handle<tags::Term>, ErrorCode>
    where
        T: Into<Name>,
        U: Into<Handle<tags::Term>>,
    {
        let name = name.into();
        let tau = tau.into();

        kernel_info(format!(
            "Registering parameter {} with type {}.",
            name, tau
        ));

        if self.globals.contains_key(&name) {
            kernel_error("A declaration with this name already exists.");

            return Err(ErrorCode::VariableExists(name));
        }

        let sort = self.term_type_infer(tau.clone())?;
        let sort = self.term_normalize_weak_head(sort)?;

        if !self.resolve_term_handle(&sort)?.is_universe() {
            kernel_error("The declared type of a parameter is not a type.");

            return Err(ErrorCode::TypeExpected(tau));
        }

        self.globals.insert(name.clone(), Declaration::parameter(tau));
        self.declaration_order.push(name.clone());

        Ok(self.admit_term(Term::global(name)))
    }

    /// Registers a new definition named `name`, with body `body` and declared
    /// type inferred from the body, in the runtime state's global context.
    /// Returns `Ok(handle)`, where `handle` points to a global reference to
    /// the new declaration, if registration is successful.  On failure the
    /// global context is left unchanged.
    ///
    /// Note that the body is translated and type-checked before the name is
    /// bound, so a definition can refer to every earlier declaration but
    /// never to itself: the global context always forms a directed acyclic
    /// graph.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::VariableExists)` if `name` is already declared
    /// in the global context.
    ///
    /// Other error codes propagate from inferring the type of `body`.
    pub fn global_register_definition<T, U>(
        &mut self,
        name: T,
        body: U,
    ) -> Result<Handle<tags::Term>, ErrorCode>
    where
        T: Into<Name>,
        U: Into<Handle<tags::Term>>,
    {
        let name = name.into();
        let body = body.into();

        kernel_info(format!(
            "Registering definition {} with body {}.",
            name, body
        ));

        if self.globals.contains_key(&name) {
            kernel_error("A declaration with this name already exists.");

            return Err(ErrorCode::VariableExists(name));
        }

        let tau = self.term_type_infer(body.clone())?;

        self.globals
            .insert(name.clone(), Declaration::definition(tau, body));
        self.declaration_order.push(name.clone());

        Ok(self.admit_term(Term::global(name)))
    }

    /// Registers a new definition named `name`, with body `body` and *stated*
    /// type `tau`, in the runtime state's global context.  Returns
    /// `Ok(handle)`, where `handle` points to a global reference to the new
    /// declaration, if registration is successful.
    ///
    /// **Warning**: the stated type is recorded as-is and is *not* verified
    /// against the body.  A client can therefore seal an inhabitant of the
    /// wrong type into the global context.
    /// TODO: decide `term_is_equal(term_type_infer(body), tau)` here and
    /// reject mismatches.
    ///
    /// # Errors
    ///
    /// Returns `Err(ErrorCode::VariableExists)` if `name` is already declared
    /// in the global context.
    ///
    /// Returns `Err(ErrorCode::NoSuchTermRegistered)` if either `tau` or
    /// `body` does not point-to a term in the runtime state's term-table.
    pub fn global_register_typed_definition<T, U, V>(
        &mut self,
        name: T,
        tau: U,
        body: V,
    ) -> Result<Handle<tags::Term>, ErrorCode>
    where
        T: Into<Name>,
        U: Into<Handle<tags::Term>>,
        V: Into<Handle<tags::Term>>,
    {
        let name = name.into();
        let tau = tau.into();
        let body = body.into();

        kernel_info(format!(
            "Registering typed definition {} with type {} and body {}.",
            name, tau, body
        ));

        if self.globals.contains_key(&name) {
            kernel_error("A declaration with this name already exists.");

            return Err(ErrorCode::VariableExists(name));
        }

        self.resolve_term_handle(&tau)?;
        self.resolve_term_handle(&body)?;

        self.globals
            .insert(name.clone(), Declaration::definition(tau, body));
        self.declaration_order.push(name.clone());

        Ok(self.admit_term(Term::global(name)))
    }

    /// Returns `Some(declaration)` iff `name` is declared in the runtime
    /// state's global context.
    #[inline]
    pub fn global_resolve<T>(&self, name: T) -> Option<&Declaration>
    where
        T: Borrow<Name>,
    {
        self.globals.get(name.borrow())
    }

    /// Returns `true` iff `name` is declared in the runtime state's global
    /// context.
    #[inline]
    pub fn global_is_registered<T>(&self, name: T) -> bool
    where
        T: Borrow<Name>,
    {
        self.global_resolve(name).is_some()
    }

    /// Returns the declarations of the global context, in declaration order.
    pub fn global_context(
        &self,
    ) -> impl Iterator<Item = (&Name, &Declaration)> {
        self.declaration_order.iter().map(move |name| {
            match self.globals.get(name) {
                Some(declaration) => (name, declaration),
                None => kernel_panic(DANGLING_HANDLE_ERROR),
            }
        })
    }

    ////////////////////////////////////////////////////////////////////////////
    // Driver-facing composites.
    ////////////////////////////////////////////////////////////////////////////

    /// Infers the type of the term pointed-to by `handle` and reduces it to
    /// normal form.
    ///
    /// # Errors
    ///
    /// As for `term_type_infer` and `term_normalize`.
    #[inline]
    pub fn term_check<T>(
        &mut self,
        handle: T,
    ) -> Result<Handle<tags::Term>, ErrorCode>
    where
        T: Into<Handle<tags::Term>>,
    {
        let tau = self.term_type_infer(handle.into())?;

        self.term_normalize(tau)
    }

    /// Reduces the term pointed-to by `handle` to normal form.
    ///
    /// # Errors
    ///
    /// As for `term_normalize`.
    #[inline]
    pub fn term_evaluate<T>(
        &mut self,
        handle: T,
    ) -> Result<Handle<tags::Term>, ErrorCode>
    where
        T: Into<Handle<tags::Term>>,
    {
        self.term_normalize(handle.into())
    }

    ////////////////////////////////////////////////////////////////////////////
    // Configuration.
    ////////////////////////////////////////////////////////////////////////////

    /// Enables or disables unsafe substitution mode.  When enabled, the
    /// substitution-time type check is skipped and the kernel trusts its
    /// callers to only ever build well-typed redexes.
    pub fn set_unsafe_substitution(&mut self, enabled: bool) {
        kernel_info(format!("Unsafe substitution mode set to {}.", enabled));

        self.unsafe_substitution = enabled;
    }

    /// Returns `true` iff unsafe substitution mode is enabled.
    #[inline]
    pub fn is_unsafe_substitution(&self) -> bool {
        self.unsafe_substitution
    }

    /// Sets the bound on the depth of recursive kernel computations.
    pub fn set_recursion_limit(&mut self, limit: usize) {
        kernel_info(format!("Recursion limit set to {}.", limit));

        self.recursion_limit = limit;
    }

    /// Returns the configured bound on the depth of recursive kernel
    /// computations.
    #[inline]
    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }
}

/// The default runtime state contains no declarations and no user terms, only
/// the pre-allocated primitive objects: the identity and unit shift
/// substitutions, and the two lowest universes.
impl Default for RuntimeState {
    fn default() -> Self {
        let mut terms = HashMap::new();

        terms.insert(PREALLOCATED_HANDLE_TERM_UNIVERSE_ZERO, Term::universe(0));
        terms.insert(PREALLOCATED_HANDLE_TERM_UNIVERSE_ONE, Term::universe(1));

        let mut substitutions = HashMap::new();

        substitutions.insert(
            PREALLOCATED_HANDLE_SUBSTITUTION_IDENTITY,
            SUBSTITUTION_IDENTITY.clone(),
        );
        substitutions.insert(
            PREALLOCATED_HANDLE_SUBSTITUTION_SHIFT,
            SUBSTITUTION_SHIFT.clone(),
        );

        RuntimeState {
            next_handle: PREALLOCATED_HANDLE_UPPER_BOUND,
            terms,
            substitutions,
            globals: HashMap::new(),
            declaration_order: Vec::new(),
            current: HashMap::new(),
            heads: HashMap::new(),
            types: HashMap::new(),
            unsafe_substitution: false,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            depth: 0,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests.
////////////////////////////////////////////////////////////////////////////////

/// Tests for the substitution algebra, the normalization engines, type
/// inference, judgmental equality, and the global context.
#[cfg(test)]
mod test {
    use crate::{
        error_code::ErrorCode,
        handle::{
            tags, Handle, PREALLOCATED_HANDLE_SUBSTITUTION_IDENTITY,
            PREALLOCATED_HANDLE_TERM_UNIVERSE_ONE,
            PREALLOCATED_HANDLE_TERM_UNIVERSE_ZERO,
        },
        runtime_state::RuntimeState,
        term::Term,
    };

    /// Creates a fresh runtime state for a test, wiring the `log` facade to
    /// the test harness output.
    fn state() -> RuntimeState {
        let _ = env_logger::builder().is_test(true).try_init();

        RuntimeState::new()
    }

    /// Declares the parameter `name : type[0]` and returns a handle to the
    /// global reference.
    fn base_type(state: &mut RuntimeState, name: &str) -> Handle<tags::Term> {
        let universe = state.term_register_universe(0);

        state
            .global_register_parameter(name, universe)
            .expect("declaring a base type failed")
    }

    /// Declares the parameter `name : tau` and returns a handle to the global
    /// reference.
    fn inhabitant(
        state: &mut RuntimeState,
        name: &str,
        tau: Handle<tags::Term>,
    ) -> Handle<tags::Term> {
        state
            .global_register_parameter(name, tau)
            .expect("declaring an inhabitant failed")
    }

    /// Builds the polymorphic identity function,
    /// `(A : type[0]) => (x : A) => x`, with each bound variable carrying its
    /// type shifted to the occurrence site.
    fn identity_function(
        state: &mut RuntimeState,
        outer_hint: &str,
        inner_hint: &str,
    ) -> Handle<tags::Term> {
        let universe = state.term_register_universe(0);
        let shift = state
            .substitution_register_raw(Vec::<Handle<tags::Term>>::new(), 1)
            .unwrap();

        let domain_tau = state
            .term_register_suspension(universe.clone(), shift.clone())
            .unwrap();
        let domain = state
            .term_register_variable(outer_hint, domain_tau, 1)
            .unwrap();

        let argument_tau = state
            .term_register_suspension(domain.clone(), shift)
            .unwrap();
        let argument = state
            .term_register_variable(inner_hint, argument_tau, 1)
            .unwrap();

        let inner = state
            .term_register_lambda(inner_hint, domain, argument)
            .unwrap();

        state
            .term_register_lambda(outer_hint, universe, inner)
            .unwrap()
    }

    /// Builds the monomorphic identity function on the type pointed-to by
    /// `tau`, `(x : tau) => x`.
    fn identity_function_at(
        state: &mut RuntimeState,
        tau: Handle<tags::Term>,
    ) -> Handle<tags::Term> {
        let shift = state
            .substitution_register_raw(Vec::<Handle<tags::Term>>::new(), 1)
            .unwrap();
        let argument_tau =
            state.term_register_suspension(tau.clone(), shift).unwrap();
        let argument = state
            .term_register_variable("x", argument_tau, 1)
            .unwrap();

        state.term_register_lambda("x", tau, argument).unwrap()
    }

    /// Tests that registering the same term twice yields the same handle, and
    /// that the lowest universes resolve to their pre-allocated handles.
    #[test]
    pub fn sharing_test0() {
        let mut state = state();

        let first = state.term_register_universe(0);
        let second = state.term_register_universe(0);

        assert_eq!(first, second);
        assert_eq!(first, PREALLOCATED_HANDLE_TERM_UNIVERSE_ZERO);
        assert_eq!(
            state.term_register_universe(1),
            PREALLOCATED_HANDLE_TERM_UNIVERSE_ONE
        );
    }

    /// Tests that structurally-equal compound terms share a single handle.
    #[test]
    pub fn sharing_test1() {
        let mut state = state();

        let tau = base_type(&mut state, "N");
        let witness = inhabitant(&mut state, "y", tau.clone());

        let first = state
            .term_register_application(tau.clone(), witness.clone())
            .unwrap();
        let second =
            state.term_register_application(tau, witness).unwrap();

        assert_eq!(first, second);
    }

    /// Tests that applying the identity substitution leaves a term
    /// judgmentally unchanged.
    #[test]
    pub fn apply_test0() {
        let mut state = state();

        let id = identity_function(&mut state, "A", "x");
        let applied = state
            .substitution_apply(PREALLOCATED_HANDLE_SUBSTITUTION_IDENTITY, id.clone())
            .unwrap();

        assert!(state.term_is_equal(applied, id).unwrap());
    }

    /// Tests the substitution homomorphism: pushing a substitution through a
    /// term eagerly and suspending the term against it normalize to identical
    /// results.
    #[test]
    pub fn apply_test1() {
        let mut state = state();

        let tau = base_type(&mut state, "N");
        let universe = state.term_register_universe(0);
        let variable = state
            .term_register_variable("z", universe, 1)
            .unwrap();
        let sigma = state
            .substitution_register_raw(vec![tau], 0)
            .unwrap();

        let eager = state
            .substitution_apply(sigma.clone(), variable.clone())
            .unwrap();
        let eager = state.term_normalize(eager).unwrap();

        let suspended = state
            .term_register_suspension(variable, sigma)
            .unwrap();
        let suspended = state.term_normalize(suspended).unwrap();

        assert!(state.term_is_identical(&eager, &suspended).unwrap());
    }

    /// Tests that applying two substitutions in sequence agrees with applying
    /// their lazy composition.
    #[test]
    pub fn apply_test2() {
        let mut state = state();

        let first_type = base_type(&mut state, "A");
        let second_type = base_type(&mut state, "B");

        let universe = state.term_register_universe(0);
        let one = state
            .term_register_variable("u", universe.clone(), 1)
            .unwrap();
        let two = state
            .term_register_variable("v", universe, 2)
            .unwrap();
        let term = state.term_register_application(one, two).unwrap();

        let inner = state
            .substitution_register_raw(vec![first_type], 0)
            .unwrap();
        let outer = state
            .substitution_register_raw(vec![second_type], 0)
            .unwrap();

        let stepwise = state
            .substitution_apply(inner.clone(), term.clone())
            .unwrap();
        let stepwise = state
            .substitution_apply(outer.clone(), stepwise)
            .unwrap();

        let composition = state
            .substitution_register_composition(outer, inner)
            .unwrap();
        let composed =
            state.substitution_apply(composition, term).unwrap();

        assert!(state.term_is_equal(stepwise, composed).unwrap());
    }

    /// Tests that the substitution-time type check rejects a replacement of
    /// the wrong type.
    #[test]
    pub fn apply_test3() {
        let mut state = state();

        let first_type = base_type(&mut state, "N");
        let second_type = base_type(&mut state, "M");
        let witness = inhabitant(&mut state, "m", second_type);

        let variable = state
            .term_register_variable("x", first_type, 1)
            .unwrap();
        let sigma = state
            .substitution_register_raw(vec![witness], 0)
            .unwrap();

        let result = state.substitution_apply(sigma, variable);

        assert!(matches!(result, Err(ErrorCode::TypeMismatch { .. })));
    }

    /// Tests that unsafe substitution mode skips the substitution-time type
    /// check.
    #[test]
    pub fn apply_test4() {
        let mut state = state();

        let first_type = base_type(&mut state, "N");
        let second_type = base_type(&mut state, "M");
        let witness = inhabitant(&mut state, "m", second_type);

        let variable = state
            .term_register_variable("x", first_type, 1)
            .unwrap();
        let sigma = state
            .substitution_register_raw(vec![witness.clone()], 0)
            .unwrap();

        state.set_unsafe_substitution(true);

        assert_eq!(
            state.substitution_apply(sigma, variable).unwrap(),
            witness
        );
    }

    /// Tests the composition length and shift accounting on shifted
    /// substitutions.
    #[test]
    pub fn composition_test0() {
        let mut state = state();

        let tau = base_type(&mut state, "N");
        let witness = inhabitant(&mut state, "y", tau);

        let inner = state
            .substitution_register_raw(Vec::<Handle<tags::Term>>::new(), 2)
            .unwrap();
        let outer = state
            .substitution_register_raw(vec![witness], 1)
            .unwrap();
        let composition = state
            .substitution_register_composition(outer, inner)
            .unwrap();

        assert_eq!(state.substitution_length(&composition).unwrap(), 0);
        assert_eq!(state.substitution_shift(&composition).unwrap(), 2);
    }

    /// Tests β-contraction through the full identity chain: the polymorphic
    /// identity applied to a type and an inhabitant reduces to the
    /// inhabitant.
    #[test]
    pub fn normalize_test0() {
        let mut state = state();

        let tau = base_type(&mut state, "N");
        let witness = inhabitant(&mut state, "y", tau.clone());

        let id = identity_function(&mut state, "A", "x");
        let instantiated =
            state.term_register_application(id, tau).unwrap();
        let redex = state
            .term_register_application(instantiated, witness.clone())
            .unwrap();

        let result = state.term_evaluate(redex).unwrap();

        assert_eq!(result, witness);
    }

    /// Tests that normalization is idempotent.
    #[test]
    pub fn normalize_test1() {
        let mut state = state();

        let tau = base_type(&mut state, "N");
        let id = identity_function(&mut state, "A", "x");
        let redex = state.term_register_application(id, tau).unwrap();

        let once = state.term_normalize(redex).unwrap();
        let twice = state.term_normalize(once.clone()).unwrap();

        assert_eq!(once, twice);
    }

    /// Tests the shape of an instantiated identity: applying the polymorphic
    /// identity to a declared type yields a lambda whose domain is that type
    /// and whose body is the bound variable at index one.
    #[test]
    pub fn normalize_test2() {
        let mut state = state();

        let tau = base_type(&mut state, "N");
        let id = identity_function(&mut state, "A", "x");
        let redex =
            state.term_register_application(id, tau.clone()).unwrap();

        let result = state.term_evaluate(redex).unwrap();

        let (name, domain, body) = match state
            .resolve_term_handle(&result)
            .unwrap()
            .split_lambda()
        {
            Some((name, domain, body)) => {
                (name.clone(), domain.clone(), body.clone())
            }
            None => panic!("instantiated identity is not a lambda"),
        };

        assert_eq!(name, "x");
        assert_eq!(domain, tau);

        match state.resolve_term_handle(&body).unwrap() {
            Term::Variable { index, .. } => assert_eq!(*index, 1),
            _otherwise => panic!("body is not a bound variable"),
        }
    }

    /// Tests the β rule directly: contracting a redex agrees with suspending
    /// the lambda body against the argument.
    #[test]
    pub fn normalize_test3() {
        let mut state = state();

        let tau = base_type(&mut state, "N");
        let witness = inhabitant(&mut state, "y", tau.clone());

        let id = identity_function_at(&mut state, tau);
        let redex = state
            .term_register_application(id.clone(), witness.clone())
            .unwrap();
        let contracted = state.term_normalize(redex).unwrap();

        let body = match state
            .resolve_term_handle(&id)
            .unwrap()
            .split_lambda()
        {
            Some((_name, _tau, body)) => body.clone(),
            None => panic!("identity is not a lambda"),
        };
        let sigma = state
            .substitution_register_raw(vec![witness], 0)
            .unwrap();
        let suspended =
            state.term_register_suspension(body, sigma).unwrap();
        let suspended = state.term_normalize(suspended).unwrap();

        assert!(state.term_is_identical(&contracted, &suspended).unwrap());
    }

    /// Tests that a reference to a global definition unfolds to the
    /// definition's body during normalization, whilst a parameter is
    /// irreducible.
    #[test]
    pub fn normalize_test4() {
        let mut state = state();

        let tau = base_type(&mut state, "N");

        let id = identity_function(&mut state, "A", "x");
        let definition = state
            .global_register_definition("id", id.clone())
            .unwrap();

        let unfolded = state.term_evaluate(definition).unwrap();
        let expected = state.term_evaluate(id).unwrap();

        assert!(state.term_is_identical(&unfolded, &expected).unwrap());
        assert_eq!(state.term_evaluate(tau.clone()).unwrap(), tau);
    }

    /// Tests that weak-head normalization stops at the outermost lambda,
    /// leaving sub-terms suspended, and that eager normalization agrees with
    /// it judgmentally.
    #[test]
    pub fn weak_head_test0() {
        let mut state = state();

        let tau = base_type(&mut state, "N");
        let id = identity_function(&mut state, "A", "x");
        let redex = state.term_register_application(id, tau).unwrap();

        let head = state.term_normalize_weak_head(redex.clone()).unwrap();

        assert!(state.resolve_term_handle(&head).unwrap().is_lambda());

        let full = state.term_normalize(redex).unwrap();

        assert!(!state.term_is_identical(&head, &full).unwrap());
        assert!(state.term_is_equal(head, full).unwrap());
    }

    /// Tests that weak-head normalization unfolds global definitions.
    #[test]
    pub fn weak_head_test1() {
        let mut state = state();

        let id = identity_function(&mut state, "A", "x");
        let definition =
            state.global_register_definition("id", id.clone()).unwrap();

        let head = state.term_normalize_weak_head(definition).unwrap();

        assert_eq!(head, id);
    }

    /// Tests the universe hierarchy: `type[n] : type[n+1]` for every level.
    #[test]
    pub fn infer_test0() {
        let mut state = state();

        for level in 0..32 {
            let universe = state.term_register_universe(level);
            let tau = state.term_type_infer(universe).unwrap();
            let expected = state.term_register_universe(level + 1);

            assert_eq!(tau, expected);
        }
    }

    /// Tests the inferred type of the polymorphic identity: a product of a
    /// universe domain and a dependent product range, inhabiting `type[1]`.
    #[test]
    pub fn infer_test1() {
        let mut state = state();

        let id = identity_function(&mut state, "A", "x");
        let tau = state.term_check(id).unwrap();

        let (domain, range) = match state
            .resolve_term_handle(&tau)
            .unwrap()
            .split_product()
        {
            Some((_name, domain, range)) => (domain.clone(), range.clone()),
            None => panic!("identity type is not a product"),
        };

        assert_eq!(domain, PREALLOCATED_HANDLE_TERM_UNIVERSE_ZERO);

        let (inner_domain, inner_range) = match state
            .resolve_term_handle(&range)
            .unwrap()
            .split_product()
        {
            Some((_name, domain, range)) => (domain.clone(), range.clone()),
            None => panic!("identity range is not a product"),
        };

        match state.resolve_term_handle(&inner_domain).unwrap() {
            Term::Variable { index, .. } => assert_eq!(*index, 1),
            _otherwise => panic!("inner domain is not a bound variable"),
        }
        match state.resolve_term_handle(&inner_range).unwrap() {
            Term::Variable { index, .. } => assert_eq!(*index, 2),
            _otherwise => panic!("inner range is not a bound variable"),
        }

        let sort = state.term_check(tau).unwrap();

        assert_eq!(sort, PREALLOCATED_HANDLE_TERM_UNIVERSE_ONE);
    }

    /// Tests that a bound variable's inferred type is the type it carries.
    #[test]
    pub fn infer_test2() {
        let mut state = state();

        let tau = base_type(&mut state, "N");
        let variable = state
            .term_register_variable("z", tau.clone(), 1)
            .unwrap();

        assert_eq!(state.term_type_infer(variable).unwrap(), tau);
    }

    /// Tests that applying a term without product type is rejected.
    #[test]
    pub fn infer_test3() {
        let mut state = state();

        let tau = base_type(&mut state, "N");
        let witness = inhabitant(&mut state, "y", tau.clone());
        let application = state
            .term_register_application(tau.clone(), witness)
            .unwrap();

        assert_eq!(
            state.term_type_infer(application),
            Err(ErrorCode::ProductExpected(tau))
        );
    }

    /// Tests that a product whose domain is not a type is rejected.
    #[test]
    pub fn infer_test4() {
        let mut state = state();

        let tau = base_type(&mut state, "M");
        let witness = inhabitant(&mut state, "m", tau);
        let universe = state.term_register_universe(0);
        let product = state
            .term_register_product("z", witness.clone(), universe)
            .unwrap();

        assert_eq!(
            state.term_type_infer(product),
            Err(ErrorCode::TypeExpected(witness))
        );
    }

    /// Tests that the type of an application is the product range suspended
    /// against the argument, and that it normalizes to the instantiated
    /// range.
    #[test]
    pub fn infer_test5() {
        let mut state = state();

        let tau = base_type(&mut state, "N");
        let id = identity_function(&mut state, "A", "x");
        let application = state
            .term_register_application(id, tau.clone())
            .unwrap();

        let inferred = state.term_type_infer(application.clone()).unwrap();

        assert!(state
            .resolve_term_handle(&inferred)
            .unwrap()
            .is_suspension());

        let normalized = state.term_check(application).unwrap();
        let expected = state
            .term_register_product("x", tau.clone(), tau)
            .unwrap();

        assert!(state.term_is_identical(&normalized, &expected).unwrap());
    }

    /// Tests that binder name hints are irrelevant to identity, equality, and
    /// typing.
    #[test]
    pub fn equality_test0() {
        let mut state = state();

        let first = identity_function(&mut state, "A", "x");
        let second = identity_function(&mut state, "B", "argument");

        assert!(state.term_is_identical(&first, &second).unwrap());
        assert!(state.term_is_equal(first.clone(), second.clone()).unwrap());

        let first_tau = state.term_check(first).unwrap();
        let second_tau = state.term_check(second).unwrap();

        assert!(state.term_is_identical(&first_tau, &second_tau).unwrap());
    }

    /// Tests that judgmental equality is an equivalence relation on
    /// well-typed terms.
    #[test]
    pub fn equality_test1() {
        let mut state = state();

        let tau = base_type(&mut state, "N");
        let witness = inhabitant(&mut state, "y", tau.clone());

        let id = identity_function_at(&mut state, tau.clone());
        let redex = state
            .term_register_application(id, witness.clone())
            .unwrap();

        // Reflexivity.
        assert!(state
            .term_is_equal(redex.clone(), redex.clone())
            .unwrap());

        // Symmetry.
        assert!(state.term_is_equal(redex.clone(), witness.clone()).unwrap());
        assert!(state.term_is_equal(witness.clone(), redex.clone()).unwrap());

        // Transitivity, through a differently-shaped second redex built from
        // the polymorphic identity.
        let polymorphic = identity_function(&mut state, "A", "x");
        let instantiated = state
            .term_register_application(polymorphic, tau)
            .unwrap();
        let second_redex = state
            .term_register_application(instantiated, witness.clone())
            .unwrap();

        assert!(state
            .term_is_equal(redex.clone(), second_redex.clone())
            .unwrap());
        assert!(state.term_is_equal(second_redex, witness).unwrap());
    }

    /// Tests that a declared parameter checks at its declared type.
    #[test]
    pub fn global_test0() {
        let mut state = state();

        let reference = base_type(&mut state, "N");

        assert_eq!(
            state.term_check(reference).unwrap(),
            PREALLOCATED_HANDLE_TERM_UNIVERSE_ZERO
        );
    }

    /// Tests that re-declaring a name fails, and that the failing declaration
    /// leaves the global context untouched.
    #[test]
    pub fn global_test1() {
        let mut state = state();

        let reference = base_type(&mut state, "N");
        let recorded = state
            .global_resolve(&String::from("N"))
            .unwrap()
            .clone();
        let population = state.global_context().count();

        let universe = state.term_register_universe(1);
        let result = state.global_register_parameter("N", universe);

        assert_eq!(
            result,
            Err(ErrorCode::VariableExists(String::from("N")))
        );
        assert_eq!(state.global_context().count(), population);
        assert_eq!(
            state.global_resolve(&String::from("N")).unwrap(),
            &recorded
        );
        assert_eq!(
            state.term_check(reference).unwrap(),
            PREALLOCATED_HANDLE_TERM_UNIVERSE_ZERO
        );
    }

    /// Tests that a parameter whose declared type is not a type is rejected
    /// without touching the global context.
    #[test]
    pub fn global_test2() {
        let mut state = state();

        let tau = base_type(&mut state, "M");
        let witness = inhabitant(&mut state, "m", tau);
        let population = state.global_context().count();

        let result = state.global_register_parameter("P", witness.clone());

        assert_eq!(result, Err(ErrorCode::TypeExpected(witness)));
        assert!(!state.global_is_registered(&String::from("P")));
        assert_eq!(state.global_context().count(), population);
    }

    /// Tests that re-defining a name fails with the first definition left
    /// intact.
    #[test]
    pub fn global_test3() {
        let mut state = state();

        let _ = base_type(&mut state, "N");
        let id = identity_function(&mut state, "A", "x");
        let reference =
            state.global_register_definition("id", id).unwrap();
        let first_tau = state.term_check(reference.clone()).unwrap();

        let second = identity_function(&mut state, "B", "z");
        let result = state.global_register_definition("id", second);

        assert_eq!(
            result,
            Err(ErrorCode::VariableExists(String::from("id")))
        );
        assert_eq!(state.term_check(reference).unwrap(), first_tau);
    }

    /// Tests that a typed definition records its stated type without
    /// verifying the body against it.
    #[test]
    pub fn global_test4() {
        let mut state = state();

        let tau = base_type(&mut state, "N");
        let universe = state.term_register_universe(0);

        // The body `type[0]` does not inhabit `N`, but the kernel records
        // the declaration regardless.
        let reference = state
            .global_register_typed_definition("bad", tau.clone(), universe)
            .unwrap();

        assert_eq!(state.term_check(reference).unwrap(), tau);
    }

    /// Tests that the global context listing preserves declaration order.
    #[test]
    pub fn global_test5() {
        let mut state = state();

        let _ = base_type(&mut state, "N");
        let _ = base_type(&mut state, "M");
        let tau = state.term_register_global("N").unwrap();
        let _ = inhabitant(&mut state, "y", tau);

        let names: Vec<String> = state
            .global_context()
            .map(|(name, _declaration)| name.clone())
            .collect();

        assert_eq!(names, vec!["N", "M", "y"]);
    }

    /// Tests that a reference to an undeclared name is rejected at
    /// registration time.
    #[test]
    pub fn global_test6() {
        let mut state = state();

        assert_eq!(
            state.term_register_global("ghost"),
            Err(ErrorCode::UnknownVariable(String::from("ghost")))
        );
    }

    /// Tests that malformed or dangling registrations are rejected.
    #[test]
    pub fn wellformed_test0() {
        let mut state = state();

        let universe = state.term_register_universe(0);
        let dangling: Handle<tags::Term> = Handle::from(987_654);
        let dangling_sigma: Handle<tags::Substitution> = Handle::from(987_655);

        assert_eq!(
            state.term_register_variable("x", universe.clone(), 0),
            Err(ErrorCode::TermNotWellformed)
        );
        assert_eq!(
            state.term_register_variable("x", dangling.clone(), 1),
            Err(ErrorCode::NoSuchTermRegistered)
        );
        assert_eq!(
            state.term_register_application(universe.clone(), dangling.clone()),
            Err(ErrorCode::NoSuchTermRegistered)
        );
        assert_eq!(
            state.substitution_register_raw(vec![dangling], 0),
            Err(ErrorCode::NoSuchTermRegistered)
        );
        assert_eq!(
            state.term_register_suspension(universe, dangling_sigma),
            Err(ErrorCode::NoSuchSubstitutionRegistered)
        );
    }

    /// Tests that runaway reduction is stopped by the recursion limit, and
    /// that the kernel remains usable afterwards.
    #[test]
    pub fn recursion_test0() {
        let mut state = state();

        let tau = base_type(&mut state, "N");
        let witness = inhabitant(&mut state, "y", tau.clone());

        let mut term = witness;
        for _chain in 0..64 {
            let id = identity_function_at(&mut state, tau.clone());
            term = state.term_register_application(id, term).unwrap();
        }

        state.set_recursion_limit(24);

        assert!(matches!(
            state.term_normalize(term),
            Err(ErrorCode::RecursionLimitExceeded(_))
        ));

        // The depth counter unwound cleanly, so small reductions still work.
        assert_eq!(state.term_evaluate(tau.clone()).unwrap(), tau);
    }

    /// Tests that reduction progress recorded for a term is shared by later
    /// queries.
    #[test]
    pub fn progress_test0() {
        let mut state = state();

        let tau = base_type(&mut state, "N");
        let id = identity_function(&mut state, "A", "x");
        let redex = state.term_register_application(id, tau).unwrap();

        let first = state.term_normalize(redex.clone()).unwrap();
        let second = state.term_normalize(redex.clone()).unwrap();
        let third = state.term_normalize_weak_head(redex).unwrap();

        assert_eq!(first, second);
        assert!(state.term_is_equal(first, third).unwrap());
    }
}
