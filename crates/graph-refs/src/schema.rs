use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

use crate::markers::Marker;

/// Runtime identity of a record type: a `TypeId` plus the type name and an
/// optional field resolver.
///
/// Equality and hashing use the `TypeId` only, so keys built through
/// [`TypeKey::of`] and [`TypeKey::opaque`] for the same type collapse in
/// sets. A key without a resolver is still a valid traversal node; it simply
/// resolves to no field declarations.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    resolver: Option<fn() -> Vec<FieldDecl>>,
}

impl TypeKey {
    /// Key for an introspectable record type.
    pub fn of<T: Referable>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            resolver: Some(<T as Referable>::fields),
        }
    }

    /// Key for a type with no visible field declarations.
    ///
    /// Extraction on an opaque key yields an empty classification map, and a
    /// transitive walk reaching one records the key and moves on.
    pub fn opaque<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            resolver: None,
        }
    }

    /// The absence-type sentinel used as the target of context references.
    pub fn unit() -> Self {
        Self::opaque::<()>()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type name with module paths and generic arguments stripped.
    pub fn short_name(&self) -> &'static str {
        // Generic arguments carry module paths of their own, so cut them off
        // before taking the last segment.
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }

    pub fn is_unit(&self) -> bool {
        self.id == TypeId::of::<()>()
    }

    pub fn is_introspectable(&self) -> bool {
        self.resolver.is_some()
    }

    /// Resolved field declarations, or `None` when the key is opaque.
    ///
    /// Computed fresh on every call; nothing is cached on the key.
    pub fn fields(&self) -> Option<Vec<FieldDecl>> {
        self.resolver.map(|resolve| resolve())
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl Serialize for TypeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

/// A field's declared-type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// One of the five marker shapes applied to parameters.
    Marker(Marker),
    /// A union of expressions. Only the optional convention — exactly one
    /// non-absent member, at most two members total — is ever classified.
    Union(Vec<TypeExpr>),
    /// The absence member of a union.
    Absent,
    /// An ordinary non-reference type.
    Plain(TypeKey),
}

impl TypeExpr {
    pub fn plain<T: ?Sized + 'static>() -> Self {
        TypeExpr::Plain(TypeKey::opaque::<T>())
    }

    /// Wraps `inner` in the optional convention: a two-member union with
    /// absence.
    pub fn optional(inner: TypeExpr) -> Self {
        TypeExpr::Union(vec![inner, TypeExpr::Absent])
    }

    pub fn union(members: Vec<TypeExpr>) -> Self {
        TypeExpr::Union(members)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Marker(marker) => marker.fmt(f),
            TypeExpr::Union(members) => {
                for (index, member) in members.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" | ")?;
                    }
                    member.fmt(f)?;
                }
                Ok(())
            }
            TypeExpr::Absent => f.write_str("None"),
            TypeExpr::Plain(key) => f.write_str(key.short_name()),
        }
    }
}

/// One declared field: name plus declared-type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    name: &'static str,
    expr: TypeExpr,
}

impl FieldDecl {
    pub fn new(name: &'static str, expr: TypeExpr) -> Self {
        Self { name, expr }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn expr(&self) -> &TypeExpr {
        &self.expr
    }
}

/// A record type whose field declarations are visible to the introspection
/// engine.
///
/// Normally implemented through `#[derive(Referable)]`, which emits
/// [`own_fields`](Referable::own_fields) in declaration order and wires
/// `#[referable(extends = Base)]` into [`base`](Referable::base). Implement
/// it by hand to build declarations dynamically.
pub trait Referable: Sized + 'static {
    /// Fields declared directly on this type, in declaration order.
    fn own_fields() -> Vec<FieldDecl>;

    /// The base type this one inherits fields from, if any.
    fn base() -> Option<TypeKey> {
        None
    }

    /// The complete resolved field set: base fields first, a redeclared name
    /// shadowing the base entry in place, new fields appended.
    fn fields() -> Vec<FieldDecl> {
        resolve_fields(Self::base(), Self::own_fields())
    }

    fn type_key() -> TypeKey {
        TypeKey::of::<Self>()
    }
}

/// Merges a base type's resolved fields with a type's own declarations.
pub fn resolve_fields(base: Option<TypeKey>, own: Vec<FieldDecl>) -> Vec<FieldDecl> {
    let mut resolved = base.and_then(|key| key.fields()).unwrap_or_default();
    for decl in own {
        match resolved
            .iter_mut()
            .find(|existing| existing.name() == decl.name())
        {
            Some(existing) => *existing = decl,
            None => resolved.push(decl),
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BaseThing;

    impl Referable for BaseThing {
        fn own_fields() -> Vec<FieldDecl> {
            vec![
                FieldDecl::new("alpha", TypeExpr::plain::<String>()),
                FieldDecl::new("beta", TypeExpr::plain::<u8>()),
            ]
        }
    }

    struct DerivedThing;

    impl Referable for DerivedThing {
        fn own_fields() -> Vec<FieldDecl> {
            vec![
                FieldDecl::new("beta", TypeExpr::plain::<i64>()),
                FieldDecl::new("gamma", TypeExpr::plain::<bool>()),
            ]
        }

        fn base() -> Option<TypeKey> {
            Some(TypeKey::of::<BaseThing>())
        }
    }

    #[test]
    fn shadowed_fields_keep_base_position() {
        let fields = DerivedThing::fields();
        let names: Vec<&str> = fields.iter().map(|decl| decl.name()).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
        assert_eq!(fields[1].expr(), &TypeExpr::plain::<i64>());
    }

    #[test]
    fn keys_for_the_same_type_collapse() {
        assert_eq!(TypeKey::of::<BaseThing>(), TypeKey::opaque::<BaseThing>());
        assert_ne!(TypeKey::of::<BaseThing>(), TypeKey::of::<DerivedThing>());
    }

    #[test]
    fn short_names_drop_paths_and_generic_arguments() {
        assert_eq!(TypeKey::opaque::<String>().short_name(), "String");
        assert_eq!(TypeKey::opaque::<Vec<u8>>().short_name(), "Vec");
        assert_eq!(
            TypeKey::opaque::<std::collections::HashMap<String, u32>>().short_name(),
            "HashMap"
        );
    }

    #[test]
    fn opaque_keys_resolve_no_fields() {
        assert!(TypeKey::opaque::<String>().fields().is_none());
        assert!(!TypeKey::opaque::<String>().is_introspectable());
    }
}
