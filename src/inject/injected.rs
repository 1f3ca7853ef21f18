//! Declared types that can receive a resolved value.

use std::sync::Arc;

use crate::declaration::Parameter;
use crate::error::{GraphError, GraphResult};
use crate::provider::{AnyArc, Lazy, Provider, ProviderRef};
use crate::signature::Access;

/// A resolved injection value before it is converted to its declared type.
pub enum Argument {
    /// The produced instance, for `Arc<T>` declarations
    Instance(AnyArc),
    /// The provider itself, for `Provider<T>` declarations
    Provider(ProviderRef),
    /// A memoizing provider private to one injection site, for `Lazy<T>`
    Lazy(ProviderRef),
    /// No binding exists and the declaration is nullable
    Absent,
}

impl Argument {
    fn kind(&self) -> &'static str {
        match self {
            Argument::Instance(_) => "instance",
            Argument::Provider(_) => "provider",
            Argument::Lazy(_) => "lazy",
            Argument::Absent => "absent",
        }
    }
}

impl std::fmt::Debug for Argument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Argument").field(&self.kind()).finish()
    }
}

/// A Rust type usable as the declared type of a field or parameter.
///
/// | Declared type        | Target | Access     | Nullable |
/// |----------------------|--------|------------|----------|
/// | `Arc<T>`             | `T`    | `Instance` | no       |
/// | `Provider<T>`        | `T`    | `Provider` | no       |
/// | `Lazy<T>`            | `T`    | `Lazy`     | no       |
/// | `Option<D>`          | as `D` | as `D`     | yes      |
pub trait Injected: Clone + Send + Sync + 'static {
    type Target: Send + Sync + 'static;
    const ACCESS: Access;
    const NULLABLE: bool = false;

    fn from_argument(argument: &Argument) -> GraphResult<Self>;
}

fn mismatch<D>() -> GraphError {
    GraphError::TypeMismatch(std::any::type_name::<D>())
}

impl<T: Send + Sync + 'static> Injected for Arc<T> {
    type Target = T;
    const ACCESS: Access = Access::Instance;

    fn from_argument(argument: &Argument) -> GraphResult<Self> {
        match argument {
            Argument::Instance(value) => value.clone().downcast::<T>().map_err(|_| mismatch::<T>()),
            _ => Err(mismatch::<Self>()),
        }
    }
}

impl<T: Send + Sync + 'static> Injected for Provider<T> {
    type Target = T;
    const ACCESS: Access = Access::Provider;

    fn from_argument(argument: &Argument) -> GraphResult<Self> {
        match argument {
            Argument::Provider(provider) => Ok(Provider::new(provider.clone())),
            _ => Err(mismatch::<Self>()),
        }
    }
}

impl<T: Send + Sync + 'static> Injected for Lazy<T> {
    type Target = T;
    const ACCESS: Access = Access::Lazy;

    fn from_argument(argument: &Argument) -> GraphResult<Self> {
        match argument {
            Argument::Lazy(provider) => Ok(Lazy::new(provider.clone())),
            _ => Err(mismatch::<Self>()),
        }
    }
}

impl<D: Injected> Injected for Option<D> {
    type Target = D::Target;
    const ACCESS: Access = D::ACCESS;
    const NULLABLE: bool = true;

    fn from_argument(argument: &Argument) -> GraphResult<Self> {
        match argument {
            Argument::Absent => Ok(None),
            other => D::from_argument(other).map(Some),
        }
    }
}

/// An ordered parameter list, implemented for tuples of [`Injected`] types.
pub trait Parameters: Clone + Send + Sync + Sized + 'static {
    /// Parameter declarations in order.
    fn declarations() -> Vec<Parameter>;

    /// Converts resolved arguments into the typed tuple.
    fn extract(arguments: &[Argument]) -> GraphResult<Self>;
}

macro_rules! parameters_tuple ({ $($param:ident)* } => {
    #[allow(clippy::unused_unit)]
    impl<$($param: Injected,)*> Parameters for ($($param,)*) {
        #[inline]
        fn declarations() -> Vec<Parameter> {
            vec![$(Parameter::of::<$param>(),)*]
        }

        #[inline]
        #[allow(unused_mut)]
        fn extract(arguments: &[Argument]) -> GraphResult<Self> {
            let mut _arguments = arguments.iter();
            Ok(($(
                $param::from_argument(_arguments.next().ok_or_else(mismatch::<Self>)?)?,
            )*))
        }
    }
});

parameters_tuple! {}
parameters_tuple! { A }
parameters_tuple! { A B }
parameters_tuple! { A B C }
parameters_tuple! { A B C D }
parameters_tuple! { A B C D E }
parameters_tuple! { A B C D E F }
parameters_tuple! { A B C D E F G }
parameters_tuple! { A B C D E F G H }
