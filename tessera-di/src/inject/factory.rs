//! Generic constructor functions

/// A trait that describes a generic constructor function
/// whose parameters are resolved by the container
pub trait GenericFactory<Args>: Send + Sync + 'static {
    /// A type of object that will be constructed
    type Output;

    /// Calls the constructor with already resolved arguments
    fn call(&self, args: Args) -> Self::Output;
}

impl<F, R> GenericFactory<()> for F
where
    F: Fn() -> R + Send + Sync + 'static
{
    type Output = R;

    #[inline]
    fn call(&self, _: ()) -> Self::Output {
        self()
    }
}

macro_rules! define_generic_factory ({ $($param:ident)* } => {
    impl<F, R, $($param,)*> GenericFactory<($($param,)*)> for F
    where
        F: Fn($($param),*) -> R + Send + Sync + 'static,
    {
        type Output = R;

        #[inline]
        #[allow(non_snake_case)]
        fn call(&self, ($($param,)*): ($($param,)*)) -> Self::Output {
            (self)($($param,)*)
        }
    }
});

define_generic_factory! { T1 }
define_generic_factory! { T1 T2 }
define_generic_factory! { T1 T2 T3 }
define_generic_factory! { T1 T2 T3 T4 }
define_generic_factory! { T1 T2 T3 T4 T5 }
define_generic_factory! { T1 T2 T3 T4 T5 T6 }
