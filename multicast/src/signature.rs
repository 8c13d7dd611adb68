//! Runtime signatures for bound operations.
//!
//! Every operation in a delegate must share one [`Signature`]. Since the
//! operations are type-erased once they are resolved, the signature is
//! recorded as a list of [`TypeTag`]s and compared at bind time.
//!
//! Argument lists are plain tuples. [`ArgList`] is implemented for tuples of
//! up to six `Clone + 'static` elements; `()` is the empty argument list.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A runtime descriptor for a Rust type.
///
/// Two tags are equal when they describe the same type. The type name is
/// only kept for display.
#[derive(Debug, Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// The tag for `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// The call signature of an operation: parameter types and return type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Parameter types, in order.
    pub params: Vec<TypeTag>,
    /// Return type.
    pub return_type: TypeTag,
}

impl Signature {
    /// The signature of an operation taking `A` and returning `R`.
    pub fn of<A: ArgList, R: 'static>() -> Self {
        Self {
            params: A::param_types(),
            return_type: TypeTag::of::<R>(),
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Renders the parameter list without parentheses, e.g. `i32, String`.
    pub fn params_display(&self) -> String {
        join_types(&self.params)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn({}) -> {}", self.params_display(), self.return_type)
    }
}

pub(crate) fn join_types(types: &[TypeTag]) -> String {
    types
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// An argument list that can be passed to every operation in a delegate.
///
/// The delegate hands each bound operation its own copy of the arguments,
/// which is why elements must be `Clone`.
pub trait ArgList: 'static {
    /// The parameter types this list supplies, in order.
    fn param_types() -> Vec<TypeTag>;

    /// The elements, type-erased.
    fn as_dyn(&self) -> Vec<&dyn Any>;

    /// Rebuilds the list from type-erased elements by cloning them.
    ///
    /// Returns `None` if the length or any element type does not match.
    fn from_dyn(args: &[&dyn Any]) -> Option<Self>
    where
        Self: Sized;
}

macro_rules! impl_arg_list {
    ($len:expr; $($name:ident : $idx:tt),*) => {
        impl<$($name: Clone + 'static),*> ArgList for ($($name,)*) {
            fn param_types() -> Vec<TypeTag> {
                vec![$(TypeTag::of::<$name>()),*]
            }

            fn as_dyn(&self) -> Vec<&dyn Any> {
                vec![$(&self.$idx as &dyn Any),*]
            }

            fn from_dyn(args: &[&dyn Any]) -> Option<Self> {
                if args.len() != $len {
                    return None;
                }
                Some(($(args[$idx].downcast_ref::<$name>()?.clone(),)*))
            }
        }
    };
}

impl_arg_list!(0;);
impl_arg_list!(1; A: 0);
impl_arg_list!(2; A: 0, B: 1);
impl_arg_list!(3; A: 0, B: 1, C: 2);
impl_arg_list!(4; A: 0, B: 1, C: 2, D: 3);
impl_arg_list!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
impl_arg_list!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_signature_display() {
        let sig = Signature::of::<(i32, u8), bool>();
        assert_eq!(sig.to_string(), "fn(i32, u8) -> bool");
        assert_eq!(sig.arity(), 2);

        let unit = Signature::of::<(), ()>();
        assert_eq!(unit.to_string(), "fn() -> ()");
    }

    #[test]
    fn test_signature_equality_is_by_type() {
        assert_eq!(Signature::of::<(i32,), i32>(), Signature::of::<(i32,), i32>());
        assert_ne!(Signature::of::<(i32,), i32>(), Signature::of::<(i64,), i32>());
        assert_ne!(Signature::of::<(i32,), i32>(), Signature::of::<(i32,), ()>());
        assert_ne!(Signature::of::<(i32,), i32>(), Signature::of::<(i32, i32), i32>());
    }

    #[test]
    fn test_arg_list_roundtrip_through_dyn() {
        let args = (7u8, "hello".to_string(), vec![1, 2]);
        let erased = args.as_dyn();
        assert_eq!(erased.len(), 3);

        let rebuilt = <(u8, String, Vec<i32>)>::from_dyn(&erased);
        assert_eq!(rebuilt, Some(args.clone()));
    }

    #[test]
    fn test_arg_list_rejects_wrong_shape() {
        let args = (1i32, 2i32);
        let erased = args.as_dyn();

        assert!(<(i32,)>::from_dyn(&erased).is_none());
        assert!(<(i32, i64)>::from_dyn(&erased).is_none());
        assert!(<()>::from_dyn(&erased).is_none());
        assert_eq!(<()>::from_dyn(&[]), Some(()));
    }
}
