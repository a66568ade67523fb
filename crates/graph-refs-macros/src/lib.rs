extern crate proc_macro;

use proc_macro::TokenStream;

mod referable;

/// Derives `graph_refs::Referable` for a struct with named fields.
///
/// Each field's declared type is transported into the runtime
/// type-expression model: the marker types (`Ref`, `Attr`, `RefList`,
/// `RefMap`, `ContextRef`) become marker expressions, `Option<Marker>`
/// becomes the optional convention, and anything else becomes a plain
/// expression. Classification happens at runtime over that model, not here.
///
/// Supported attributes:
/// - `#[referable(extends = Base)]` on the struct: fields inherited from
///   `Base` are visible through this type, with redeclared names shadowing
///   the base declaration.
/// - `#[referable(skip)]` on a field: omit it from the declaration list.
#[proc_macro_derive(Referable, attributes(referable))]
pub fn derive_referable(item: TokenStream) -> TokenStream {
    referable::expand(item)
}
