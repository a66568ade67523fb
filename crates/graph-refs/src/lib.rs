pub mod error;
pub mod introspect;
pub mod markers;
pub mod schema;

pub use error::*;
pub use introspect::*;
pub use markers::*;
pub use schema::*;

pub use graph_refs_macros::Referable;

/// Declares one or more type-level names for use with `Attr<T, N>` and
/// `ContextRef<N>`.
///
/// Example Usage: literal_name! {
///   Arn = "Arn";
///   Region = "region";
/// }
///
/// Each entry expands to a unit struct implementing [`LiteralName`], so the
/// name can appear as a marker type parameter in a field declaration.
#[macro_export]
macro_rules! literal_name {
    ($($vis:vis $name:ident = $value:literal);+ $(;)?) => {
        $(
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            $vis struct $name;

            impl $crate::LiteralName for $name {
                const NAME: &'static str = $value;
            }
        )+
    };
}
