use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;

use crate::error::MarkerError;
use crate::schema::{Referable, TypeExpr, TypeKey};

/// The five marker shapes a field's declared type can carry.
///
/// This is the origin tag of a [`Marker`] instantiation: classification
/// compares against it directly instead of parsing type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MarkerKind {
    /// A reference to an instance of a record type.
    Ref,
    /// A reference to a named attribute of a record type.
    Attr,
    /// An ordered collection of references to one record type.
    RefList,
    /// A collection whose values reference one record type; keys are opaque.
    RefMap,
    /// A reference to a value supplied externally at resolution time.
    ContextRef,
}

impl MarkerKind {
    /// Exact parameter count this shape accepts.
    pub fn arity(self) -> usize {
        match self {
            MarkerKind::Ref | MarkerKind::RefList | MarkerKind::ContextRef => 1,
            MarkerKind::Attr | MarkerKind::RefMap => 2,
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarkerKind::Ref => "Ref",
            MarkerKind::Attr => "Attr",
            MarkerKind::RefList => "RefList",
            MarkerKind::RefMap => "RefMap",
            MarkerKind::ContextRef => "ContextRef",
        };
        f.write_str(name)
    }
}

/// One parameter of a marker instantiation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Param {
    /// A record type parameter.
    Type(TypeKey),
    /// A plain name parameter.
    Name(String),
    /// A name wrapped in the single-literal-value convention.
    Literal(Box<Param>),
}

impl Param {
    pub fn name(value: impl Into<String>) -> Self {
        Param::Name(value.into())
    }

    pub fn literal(inner: Param) -> Self {
        Param::Literal(Box::new(inner))
    }

    /// Unwraps the literal convention down to a plain name string.
    ///
    /// Returns `None` for type parameters, however deeply wrapped.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Param::Name(value) => Some(value),
            Param::Literal(inner) => inner.as_name(),
            Param::Type(_) => None,
        }
    }

    pub fn as_type(&self) -> Option<TypeKey> {
        match self {
            Param::Type(key) => Some(*key),
            _ => None,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Type(key) => f.write_str(key.short_name()),
            Param::Name(value) => write!(f, "\"{value}\""),
            Param::Literal(inner) => inner.fmt(f),
        }
    }
}

/// A marker shape applied to concrete parameters, e.g. "reference to
/// `Network`" or "attribute reference to `Role`'s `Arn`".
///
/// Immutable once constructed. Two instantiations with the same kind and
/// parameters are equal and hash identically, so they collapse when stored
/// in sets during deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Marker {
    kind: MarkerKind,
    params: Vec<Param>,
}

impl Marker {
    /// Builds an instantiation from a dynamic parameter list, validating
    /// arity for the shape.
    pub fn new(kind: MarkerKind, params: Vec<Param>) -> Result<Self, MarkerError> {
        let expected = kind.arity();
        if params.len() != expected {
            return Err(MarkerError::Arity {
                kind,
                expected,
                got: params.len(),
            });
        }
        Ok(Self { kind, params })
    }

    pub fn reference(target: TypeKey) -> Self {
        Self {
            kind: MarkerKind::Ref,
            params: vec![Param::Type(target)],
        }
    }

    pub fn attribute(target: TypeKey, name: Param) -> Self {
        Self {
            kind: MarkerKind::Attr,
            params: vec![Param::Type(target), name],
        }
    }

    pub fn list(target: TypeKey) -> Self {
        Self {
            kind: MarkerKind::RefList,
            params: vec![Param::Type(target)],
        }
    }

    pub fn map(key: TypeKey, value: TypeKey) -> Self {
        Self {
            kind: MarkerKind::RefMap,
            params: vec![Param::Type(key), Param::Type(value)],
        }
    }

    pub fn context(name: Param) -> Self {
        Self {
            kind: MarkerKind::ContextRef,
            params: vec![name],
        }
    }

    /// The shape this instantiation was produced from.
    pub fn kind(&self) -> MarkerKind {
        self.kind
    }

    /// The ordered parameters exactly as supplied.
    pub fn params(&self) -> &[Param] {
        &self.params
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<", self.kind)?;
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            param.fmt(f)?;
        }
        f.write_str(">")
    }
}

/// A name carried at the type level, for `Attr<T, N>` and `ContextRef<N>`
/// declarations. Declare one with [`literal_name!`](crate::literal_name).
pub trait LiteralName {
    const NAME: &'static str;
}

/// A declared-type marker that can report its runtime [`Marker`]
/// instantiation.
pub trait MarkerType {
    fn marker() -> Marker;

    fn type_expr() -> TypeExpr {
        TypeExpr::Marker(Self::marker())
    }
}

/// A typed reference to an instance of `T`.
///
/// At runtime this is a zero-sized type marker; it carries no value. The
/// introspection engine recovers the target type from the instantiation it
/// reports through [`MarkerType`].
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Ref<T: Referable> {
    phantom: PhantomData<T>,
}

impl<T: Referable> MarkerType for Ref<T> {
    fn marker() -> Marker {
        Marker::reference(TypeKey::of::<T>())
    }
}

/// A typed reference to the attribute named `N` of `T`.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Attr<T: Referable, N: LiteralName> {
    phantom: PhantomData<(T, N)>,
}

impl<T: Referable, N: LiteralName> MarkerType for Attr<T, N> {
    fn marker() -> Marker {
        // Type-level names arrive wrapped in the literal convention;
        // classification unwraps them to a plain string.
        Marker::attribute(TypeKey::of::<T>(), Param::literal(Param::name(N::NAME)))
    }
}

/// An ordered collection whose elements each reference `T`.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct RefList<T: Referable> {
    phantom: PhantomData<T>,
}

impl<T: Referable> MarkerType for RefList<T> {
    fn marker() -> Marker {
        Marker::list(TypeKey::of::<T>())
    }
}

/// A collection whose values each reference `V`. The key type is not
/// inspected.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct RefMap<K: 'static, V: Referable> {
    phantom: PhantomData<(K, V)>,
}

impl<K: 'static, V: Referable> MarkerType for RefMap<K, V> {
    fn marker() -> Marker {
        Marker::map(TypeKey::opaque::<K>(), TypeKey::of::<V>())
    }
}

/// A reference to a value supplied by the caller at resolution time, not to
/// another record type in the graph.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct ContextRef<N: LiteralName> {
    phantom: PhantomData<N>,
}

impl<N: LiteralName> MarkerType for ContextRef<N> {
    fn marker() -> Marker {
        Marker::context(Param::literal(Param::name(N::NAME)))
    }
}
