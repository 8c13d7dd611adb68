//! Name-based operation lookup on receiver types.
//!
//! A type becomes bindable by implementing [`Receiver`], which lists the
//! operations it exposes by name in an [`OperationTable`]. The table is the
//! only way a delegate finds operations: there is no runtime introspection.
//!
//! # Overloads
//!
//! A table may declare several operations under the same name. Resolution
//! picks the *last* one declared, so in practice only one operation per name
//! is usable from a delegate. Give overloads distinct names.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::error::{DelegateError, DelegateResult};
use crate::signature::{ArgList, Signature, TypeTag};

/// A type whose operations can be bound into a delegate by name.
///
/// ```
/// use multicast::{OperationTable, Receiver};
///
/// struct Counter {
///     value: i64,
/// }
///
/// impl Receiver for Counter {
///     fn operations() -> OperationTable<Self> {
///         OperationTable::new()
///             .method("increment", |c: &mut Counter, (by,): (i64,)| {
///                 c.value += by;
///                 c.value
///             })
///             .method("value", |c: &mut Counter, (): ()| c.value)
///     }
/// }
/// ```
pub trait Receiver: Any {
    /// The operations this type declares, in declaration order.
    fn operations() -> OperationTable<Self>
    where
        Self: Sized;
}

type ErasedFn = dyn Fn(&dyn Any, &[&dyn Any]) -> DelegateResult<Box<dyn Any>>;

/// A resolved, type-erased operation.
///
/// Cloning is cheap; clones share the underlying callable.
#[derive(Clone)]
pub struct Operation {
    name: Rc<str>,
    receiver_type: TypeTag,
    signature: Signature,
    call: Rc<ErasedFn>,
}

impl Operation {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type this operation was declared on.
    pub fn receiver_type(&self) -> TypeTag {
        self.receiver_type
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Calls the operation on `receiver`, which must be the `RefCell` of the
    /// declaring type.
    pub(crate) fn call(&self, receiver: &dyn Any, args: &[&dyn Any]) -> DelegateResult<Box<dyn Any>> {
        (self.call)(receiver, args)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("receiver_type", &self.receiver_type.name())
            .field("signature", &self.signature.to_string())
            .finish()
    }
}

/// The operations a [`Receiver`] type exposes, keyed by name.
pub struct OperationTable<T> {
    entries: Vec<Operation>,
    _receiver: PhantomData<fn(&mut T)>,
}

impl<T: Receiver> OperationTable<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            _receiver: PhantomData,
        }
    }

    /// Declares an infallible operation.
    pub fn method<A, R, F>(self, name: &str, f: F) -> Self
    where
        A: ArgList,
        R: 'static,
        F: Fn(&mut T, A) -> R + 'static,
    {
        self.fallible(name, move |this: &mut T, args: A| {
            Ok::<R, std::convert::Infallible>(f(this, args))
        })
    }

    /// Declares an operation that can fail.
    ///
    /// The signature records `R`, not the `Result`. An `Err` returned by the
    /// operation surfaces from the delegate as [`DelegateError::Operation`].
    pub fn fallible<A, R, E, F>(mut self, name: &str, f: F) -> Self
    where
        A: ArgList,
        R: 'static,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
        F: Fn(&mut T, A) -> Result<R, E> + 'static,
    {
        let op_name: Rc<str> = Rc::from(name);
        let signature = Signature::of::<A, R>();
        let expected = signature.params_display();
        let captured = Rc::clone(&op_name);

        let call = move |receiver: &dyn Any, args: &[&dyn Any]| -> DelegateResult<Box<dyn Any>> {
            let cell = receiver
                .downcast_ref::<RefCell<T>>()
                .ok_or_else(|| DelegateError::ReceiverType {
                    operation: captured.to_string(),
                    expected: TypeTag::of::<T>(),
                })?;
            let args = A::from_dyn(args).ok_or_else(|| DelegateError::ArgumentMismatch {
                expected: expected.clone(),
                found: format!("{} argument(s)", args.len()),
            })?;
            let mut this = cell
                .try_borrow_mut()
                .map_err(|_| DelegateError::ReceiverBusy {
                    operation: captured.to_string(),
                })?;
            let out = f(&mut *this, args).map_err(|e| DelegateError::Operation(e.into()))?;
            Ok(Box::new(out) as Box<dyn Any>)
        };

        self.entries.push(Operation {
            name: op_name,
            receiver_type: TypeTag::of::<T>(),
            signature,
            call: Rc::new(call),
        });
        self
    }

    /// Finds the operation called `name`. When several share the name, the
    /// last declared wins.
    pub fn lookup(&self, name: &str) -> Option<&Operation> {
        self.entries.iter().rev().find(|op| op.name() == name)
    }

    /// Resolves `name`, reporting why resolution failed.
    pub fn resolve(&self, name: &str) -> DelegateResult<Operation> {
        if name.is_empty() {
            return Err(DelegateError::EmptyName);
        }
        if self.entries.is_empty() {
            return Err(DelegateError::NoOperations {
                receiver: TypeTag::of::<T>().name(),
            });
        }
        self.lookup(name)
            .cloned()
            .ok_or_else(|| DelegateError::OperationNotFound {
                receiver: TypeTag::of::<T>().name(),
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declared operation names, in declaration order (duplicates included).
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|op| op.name())
    }
}

impl<T: Receiver> Default for OperationTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves `name` on `T`'s operation table.
pub fn resolve<T: Receiver>(name: &str) -> DelegateResult<Operation> {
    T::operations().resolve(name)
}
