//! The multicast delegate.
//!
//! A [`Delegate`] is an ordered list of [`Binding`]s that is called as if it
//! were a single function. All bindings share one [`Signature`]: the first
//! binding sets it, and every later binding must match it exactly.
//!
//! # States
//!
//! - **Empty**: no bindings, no signature constraint.
//! - **Bound**: one or more bindings, constrained by the first one's
//!   signature.
//!
//! Removing the last binding (or calling [`Delegate::remove_all`]) returns the
//! delegate to Empty, after which any signature may be bound again.
//!
//! # Partial mutation
//!
//! With the default [`MutationPolicy::Partial`], `merge` and `replace` are not
//! transactional. A merge that fails on its third element keeps the first two;
//! a replace whose bind fails leaves the delegate empty. Set
//! [`MutationPolicy::Atomic`] to stage these mutations instead.
//!
//! Invocation is never rolled back: if the third of five operations fails,
//! the first two have already run.
//!
//! # Threading
//!
//! A delegate is single-threaded (`!Send`, `!Sync`) and does no locking.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::slice;

use tracing::{debug, trace, warn};

use crate::binding::Binding;
use crate::config::{DeadReceiverPolicy, DelegateConfig, MutationPolicy};
use crate::error::{DelegateError, DelegateResult, MismatchKind};
use crate::operation::{self, Operation, Receiver};
use crate::signature::{join_types, ArgList, Signature, TypeTag};


/// An ordered set of (receiver, operation) bindings invoked together.
#[derive(Debug, Clone, Default)]
pub struct Delegate {
    bindings: Vec<Binding>,
    config: DelegateConfig,
}

impl Delegate {
    /// Creates an empty delegate with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty delegate with the given configuration.
    pub fn with_config(config: DelegateConfig) -> Self {
        Self {
            bindings: Vec::new(),
            config,
        }
    }

    /// Creates a delegate holding every binding of `source`.
    pub fn from_delegate(source: &Delegate) -> DelegateResult<Self> {
        let mut delegate = Self::with_config(source.config);
        delegate.merge(source)?;
        Ok(delegate)
    }

    /// Creates a delegate bound to a single operation.
    pub fn bound<T: Receiver>(receiver: &Rc<RefCell<T>>, name: &str) -> DelegateResult<Self> {
        let mut delegate = Self::new();
        delegate.bind(receiver, name)?;
        Ok(delegate)
    }

    pub fn config(&self) -> &DelegateConfig {
        &self.config
    }

    /// Resolves `name` on the receiver's type and appends the binding.
    ///
    /// Fails if the name is empty, the type declares no such operation, or
    /// the operation's signature differs from the one already bound.
    pub fn bind<T: Receiver>(&mut self, receiver: &Rc<RefCell<T>>, name: &str) -> DelegateResult<()> {
        let operation = operation::resolve::<T>(name)?;
        admit(&mut self.bindings, Binding::new(receiver, operation, name))?;
        debug!("Bound `{}` on `{}` ({} bindings)", name, TypeTag::of::<T>(), self.bindings.len());
        Ok(())
    }

    /// Appends every binding of `source`, in order, without re-resolving.
    ///
    /// Each element is checked against the signature like [`Delegate::bind`].
    /// Under [`MutationPolicy::Partial`] a failing element leaves the ones
    /// accepted before it in place.
    pub fn merge(&mut self, source: &Delegate) -> DelegateResult<()> {
        self.merge_bindings(source.iter().cloned())
    }

    /// Like [`Delegate::merge`], for bindings gathered from any number of
    /// delegates.
    pub fn merge_bindings<I>(&mut self, bindings: I) -> DelegateResult<()>
    where
        I: IntoIterator<Item = Binding>,
    {
        let incoming: Vec<Binding> = bindings.into_iter().collect();
        if incoming.is_empty() {
            return Err(DelegateError::EmptySource);
        }
        let count = incoming.len();

        match self.config.mutation_policy {
            MutationPolicy::Partial => {
                for binding in incoming {
                    admit(&mut self.bindings, binding)?;
                }
            }
            MutationPolicy::Atomic => {
                let mut staged = self.bindings.clone();
                for binding in incoming {
                    admit(&mut staged, binding)?;
                }
                self.bindings = staged;
            }
        }

        debug!("Merged {} bindings ({} bindings)", count, self.bindings.len());
        Ok(())
    }

    /// Clears the delegate, then binds `name` on `receiver`.
    pub fn replace<T: Receiver>(&mut self, receiver: &Rc<RefCell<T>>, name: &str) -> DelegateResult<()> {
        match self.config.mutation_policy {
            MutationPolicy::Partial => {
                self.remove_all();
                self.bind(receiver, name)
            }
            MutationPolicy::Atomic => {
                let operation = operation::resolve::<T>(name)?;
                self.bindings = vec![Binding::new(receiver, operation, name)];
                debug!("Replaced bindings with `{}` on `{}`", name, TypeTag::of::<T>());
                Ok(())
            }
        }
    }

    /// Clears the delegate, then merges `source`.
    pub fn replace_from(&mut self, source: &Delegate) -> DelegateResult<()> {
        match self.config.mutation_policy {
            MutationPolicy::Partial => {
                self.remove_all();
                self.merge(source)
            }
            MutationPolicy::Atomic => {
                let mut staged = Delegate::with_config(self.config);
                staged.merge(source)?;
                self.bindings = staged.bindings;
                Ok(())
            }
        }
    }

    /// Removes every binding named like `name` resolves to on `receiver`.
    ///
    /// Removal is keyed by name only: bindings of *other* receivers that share
    /// the name are removed too. `name` must still resolve on the receiver's
    /// type.
    pub fn unbind<T: Receiver>(&mut self, receiver: &Rc<RefCell<T>>, name: &str) -> DelegateResult<()> {
        let probe = Delegate::bound(receiver, name)?;
        self.unbind_name(probe.bindings[0].name())
    }

    /// Removes every binding whose name equals `name`.
    pub fn unbind_name(&mut self, name: &str) -> DelegateResult<()> {
        if name.is_empty() {
            return Err(DelegateError::EmptyName);
        }

        let before = self.bindings.len();
        self.bindings.retain(|binding| binding.name() != name);
        let removed = before - self.bindings.len();

        if removed == 0 {
            return Err(DelegateError::NotFound {
                name: name.to_string(),
            });
        }

        debug!("Unbound {} bindings named `{}`", removed, name);
        Ok(())
    }

    /// Removes every binding named like the first binding of `source`.
    pub fn unbind_delegate(&mut self, source: &Delegate) -> DelegateResult<()> {
        let first = source.bindings.first().ok_or(DelegateError::EmptySource)?;
        self.unbind_name(first.name())
    }

    /// Calls every bound operation in order with `args`, discarding results.
    ///
    /// Pass `()` for operations without parameters.
    pub fn invoke<A: ArgList>(&self, args: A) -> DelegateResult<()> {
        self.dispatch(&args)?;
        Ok(())
    }

    /// Calls every bound operation in order with `args` and returns the result
    /// of the last one.
    ///
    /// Returns `Ok(None)` when the delegate is empty. `R` must be the bound
    /// return type.
    pub fn call<R: 'static, A: ArgList>(&self, args: A) -> DelegateResult<Option<R>> {
        let requested = TypeTag::of::<R>();
        let bound = self.signature().map(|s| s.return_type);
        if let Some(expected) = bound {
            if expected != requested {
                return Err(DelegateError::ResultTypeMismatch {
                    expected,
                    found: requested,
                });
            }
        }

        match self.dispatch(&args)? {
            Some(last) => last
                .downcast::<R>()
                .map(|value| Some(*value))
                .map_err(|_| DelegateError::ResultTypeMismatch {
                    expected: bound.unwrap_or(requested),
                    found: requested,
                }),
            None => Ok(None),
        }
    }

    /// Runs every binding and hands back the last result produced.
    fn dispatch<A: ArgList>(&self, args: &A) -> DelegateResult<Option<Box<dyn Any>>> {
        if let Some(signature) = self.signature() {
            let supplied = A::param_types();
            if signature.params != supplied {
                return Err(DelegateError::ArgumentMismatch {
                    expected: signature.params_display(),
                    found: join_types(&supplied),
                });
            }
        }

        let erased = args.as_dyn();
        let mut last = None;
        for (index, binding) in self.bindings.iter().enumerate() {
            if !binding.is_live() && self.config.dead_receivers == DeadReceiverPolicy::Skip {
                warn!("Skipping `{}` at {}: receiver dropped", binding.name(), index);
                continue;
            }
            trace!("Invoking `{}` at {}", binding.name(), index);
            last = Some(binding.invoke(&erased)?);
        }
        Ok(last)
    }

    /// The signature every binding shares, or `None` when empty.
    pub fn signature(&self) -> Option<&Signature> {
        self.bindings.first().map(|b| b.operation().signature())
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn binding(&self, index: usize) -> DelegateResult<&Binding> {
        self.bindings.get(index).ok_or(DelegateError::IndexOutOfRange {
            index,
            len: self.bindings.len(),
        })
    }

    /// The receiver at `index`. Fails with `DeadReceiver` if it was dropped.
    pub fn receiver(&self, index: usize) -> DelegateResult<Rc<dyn Any>> {
        let binding = self.binding(index)?;
        binding.receiver().ok_or_else(|| DelegateError::DeadReceiver {
            operation: binding.name().to_string(),
        })
    }

    pub fn operation(&self, index: usize) -> DelegateResult<&Operation> {
        Ok(self.binding(index)?.operation())
    }

    pub fn name(&self, index: usize) -> DelegateResult<&str> {
        Ok(self.binding(index)?.name())
    }

    pub fn iter(&self) -> slice::Iter<'_, Binding> {
        self.bindings.iter()
    }

    /// Drops bindings whose receiver no longer exists. Returns how many were
    /// removed.
    pub fn prune_dead(&mut self) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(Binding::is_live);
        let pruned = before - self.bindings.len();
        if pruned > 0 {
            debug!("Pruned {} dead bindings", pruned);
        }
        pruned
    }

    /// Removes every binding. Never fails.
    pub fn remove_all(&mut self) {
        self.bindings.clear();
    }
}

impl<'a> IntoIterator for &'a Delegate {
    type Item = &'a Binding;
    type IntoIter = slice::Iter<'a, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

/// Appends `binding` if its signature matches the first binding's.
fn admit(bindings: &mut Vec<Binding>, binding: Binding) -> DelegateResult<()> {
    if let Some(first) = bindings.first() {
        let expected = first.operation().signature();
        let found = binding.operation().signature();

        let kind = if expected.return_type != found.return_type {
            Some(MismatchKind::ReturnType)
        } else if expected.params != found.params {
            Some(MismatchKind::Parameters)
        } else {
            None
        };

        if let Some(kind) = kind {
            return Err(DelegateError::SignatureMismatch {
                operation: binding.name().to_string(),
                kind,
                expected: expected.clone(),
                found: found.clone(),
            });
        }
    }

    bindings.push(binding);
    Ok(())
}
