//! Multicast Delegates
//!
//! A [`Delegate`] collects (receiver, named operation) bindings and calls them
//! together as if they were one function reference.
//!
//! # Features
//!
//! - Operations are looked up by name in a per-type [`OperationTable`]
//! - Every binding in a delegate shares one [`Signature`]
//! - Invocation runs bindings in registration order
//! - [`Delegate::call`] returns the result of the last binding
//! - Receivers are never owned by the delegate
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use multicast::{Delegate, OperationTable, Receiver};
//!
//! struct Label {
//!     text: String,
//! }
//!
//! impl Receiver for Label {
//!     fn operations() -> OperationTable<Self> {
//!         OperationTable::new().method("render", |l: &mut Label, (): ()| l.text.clone())
//!     }
//! }
//!
//! let first = Rc::new(RefCell::new(Label { text: "first".into() }));
//! let second = Rc::new(RefCell::new(Label { text: "second".into() }));
//!
//! let mut delegate = Delegate::bound(&first, "render")?;
//! delegate.bind(&second, "render")?;
//!
//! assert_eq!(delegate.len(), 2);
//! assert_eq!(delegate.call::<String, _>(())?, Some("second".to_string()));
//! # Ok::<(), multicast::DelegateError>(())
//! ```

pub mod binding;
pub mod config;
pub mod delegate;
pub mod error;
pub mod operation;
pub mod signature;

pub use binding::Binding;
pub use config::{DeadReceiverPolicy, DelegateConfig, MutationPolicy};
pub use delegate::Delegate;
pub use error::{DelegateError, DelegateResult, MismatchKind};
pub use operation::{Operation, OperationTable, Receiver};
pub use signature::{ArgList, Signature, TypeTag};
