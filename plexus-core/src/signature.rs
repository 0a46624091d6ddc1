//! Call shapes used to disambiguate same-named operations.

use crate::value::{TypeTag, Value};
use std::{any::Any, fmt, sync::Arc};

/// The type-arity descriptor of an operation.
///
/// A signature is the ordered list of parameter tags plus an optional return
/// tag. A signature without a return tag describes a procedure.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    params: Arc<[TypeTag]>,
    returns: Option<TypeTag>,
}

impl Signature {
    /// A procedure taking `params`.
    pub fn procedure(params: impl Into<Arc<[TypeTag]>>) -> Self {
        Self {
            params: params.into(),
            returns: None,
        }
    }

    /// A function taking `params` and returning a value tagged `returns`.
    pub fn function(params: impl Into<Arc<[TypeTag]>>, returns: TypeTag) -> Self {
        Self {
            params: params.into(),
            returns: Some(returns),
        }
    }

    /// Procedure signature for the parameter tuple `Args`.
    pub fn of_procedure<Args: ArgList>() -> Self {
        Self::procedure(Args::tags())
    }

    /// Function signature for the parameter tuple `Args` returning `R`.
    pub fn of_function<Args: ArgList, R: Any>() -> Self {
        Self::function(Args::tags(), TypeTag::of::<R>())
    }

    /// Procedure signature matching the tags of `args`.
    pub fn procedure_for(args: &[Value]) -> Self {
        Self::procedure(args.iter().map(Value::tag).collect::<Vec<_>>())
    }

    /// Function signature matching the tags of `args` and returning `R`.
    pub fn function_for<R: Any>(args: &[Value]) -> Self {
        Self::function(
            args.iter().map(Value::tag).collect::<Vec<_>>(),
            TypeTag::of::<R>(),
        )
    }

    /// Parameter tags in order.
    pub fn params(&self) -> &[TypeTag] {
        &self.params
    }

    /// Return tag, or `None` for procedures.
    pub fn returns(&self) -> Option<TypeTag> {
        self.returns
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Whether this is a procedure signature.
    pub fn is_procedure(&self) -> bool {
        self.returns.is_none()
    }

    /// Whether `args` carry exactly the parameter tags of this signature.
    pub fn accepts(&self, args: &[Value]) -> bool {
        args.len() == self.params.len()
            && args.iter().zip(self.params.iter()).all(|(a, p)| a.tag() == *p)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        for (i, tag) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{tag}")?;
        }
        f.write_str(")")?;
        if let Some(ret) = self.returns {
            write!(f, " -> {ret}")?;
        }
        Ok(())
    }
}

/// Composite identity of a bound operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OperationKey {
    /// Operation name.
    pub name: Arc<str>,
    /// Requested call shape.
    pub signature: Signature,
}

impl OperationKey {
    /// Create a key.
    pub fn new(name: impl Into<Arc<str>>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            signature,
        }
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.signature)
    }
}

/// A tuple of parameter types with a known list of tags.
pub trait ArgList {
    /// Tags of the tuple members in order.
    fn tags() -> Vec<TypeTag>;
}

macro_rules! impl_arg_list {
    ($($ty:ident),*) => {
        impl<$($ty: Any),*> ArgList for ($($ty,)*) {
            fn tags() -> Vec<TypeTag> {
                vec![$(TypeTag::of::<$ty>()),*]
            }
        }
    };
}

impl_arg_list!();
impl_arg_list!(A1);
impl_arg_list!(A1, A2);
impl_arg_list!(A1, A2, A3);
impl_arg_list!(A1, A2, A3, A4);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_procedure_and_function_differ() {
        let proc_sig = Signature::of_procedure::<(i32,)>();
        let func_sig = Signature::of_function::<(i32,), i32>();
        assert_ne!(proc_sig, func_sig);
        assert!(proc_sig.is_procedure());
        assert_eq!(func_sig.returns(), Some(TypeTag::of::<i32>()));
    }

    #[test]
    fn test_signature_from_args() {
        let args = [Value::new(1u8), Value::new(String::new())];
        assert_eq!(
            Signature::procedure_for(&args),
            Signature::of_procedure::<(u8, String)>()
        );
        assert_eq!(
            Signature::function_for::<bool>(&args),
            Signature::of_function::<(u8, String), bool>()
        );
    }

    #[test]
    fn test_accepts_checks_arity_and_tags() {
        let sig = Signature::of_procedure::<(u8, u16)>();
        assert!(sig.accepts(&[Value::new(1u8), Value::new(2u16)]));
        assert!(!sig.accepts(&[Value::new(1u8)]));
        assert!(!sig.accepts(&[Value::new(2u16), Value::new(1u8)]));
    }

    #[test]
    fn test_display() {
        let sig = Signature::of_function::<(u8,), bool>();
        assert_eq!(sig.to_string(), "fn(u8) -> bool");
        assert_eq!(Signature::of_procedure::<()>().to_string(), "fn()");
    }
}
