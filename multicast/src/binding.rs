//! A single (receiver, operation, name) entry of a delegate.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::{DelegateError, DelegateResult};
use crate::operation::{Operation, Receiver};

/// One bound operation.
///
/// The binding does not keep its receiver alive. Receivers are owned by the
/// caller as `Rc<RefCell<T>>`; the binding holds a weak handle and upgrades it
/// for each call.
#[derive(Clone)]
pub struct Binding {
    receiver: Weak<dyn Any>,
    operation: Operation,
    name: String,
}

impl Binding {
    pub(crate) fn new<T: Receiver>(receiver: &Rc<RefCell<T>>, operation: Operation, name: &str) -> Self {
        let erased: Rc<dyn Any> = receiver.clone();
        Self {
            receiver: Rc::downgrade(&erased),
            operation,
            name: name.to_string(),
        }
    }

    /// The receiver, or `None` if it has been dropped.
    pub fn receiver(&self) -> Option<Rc<dyn Any>> {
        self.receiver.upgrade()
    }

    /// The receiver as its concrete type, if it is still alive and is a `T`.
    pub fn receiver_as<T: Receiver>(&self) -> Option<Rc<RefCell<T>>> {
        self.receiver.upgrade()?.downcast::<RefCell<T>>().ok()
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// The name the operation was bound under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_live(&self) -> bool {
        self.receiver.strong_count() > 0
    }

    /// Whether this binding targets the same receiver object as `other`.
    pub fn same_receiver(&self, other: &Binding) -> bool {
        Weak::ptr_eq(&self.receiver, &other.receiver)
    }

    pub(crate) fn invoke(&self, args: &[&dyn Any]) -> DelegateResult<Box<dyn Any>> {
        let receiver = self.receiver.upgrade().ok_or_else(|| DelegateError::DeadReceiver {
            operation: self.name.clone(),
        })?;
        self.operation.call(&*receiver, args)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("receiver_type", &self.operation.receiver_type().name())
            .field("live", &self.is_live())
            .finish()
    }
}
