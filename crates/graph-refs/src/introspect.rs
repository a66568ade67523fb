use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::markers::{Marker, MarkerKind};
use crate::schema::{Referable, TypeExpr, TypeKey};

/// Metadata for one reference-carrying field, as recovered by
/// [`extract_refs`].
///
/// `target` is always a concrete type key except for context references,
/// where it is the unit sentinel — dependency computation filters context
/// entries by flag rather than by inspecting the target. Built fresh on
/// every extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefInfo {
    /// The field carrying the reference.
    pub field: &'static str,
    /// The referenced record type; the unit sentinel only for context
    /// references.
    pub target: TypeKey,
    /// Attribute name for `Attr`, context value name for `ContextRef`.
    pub attr: Option<String>,
    pub is_list: bool,
    pub is_map: bool,
    pub is_optional: bool,
    pub is_context: bool,
}

impl RefInfo {
    fn simple(field: &'static str, target: TypeKey) -> Self {
        Self {
            field,
            target,
            attr: None,
            is_list: false,
            is_map: false,
            is_optional: false,
            is_context: false,
        }
    }
}

/// Extracts reference metadata for every reference-carrying field of `T`.
///
/// Fields whose declared type matches none of the five marker shapes (after
/// optional unwrapping) are absent from the map. Iteration order mirrors the
/// resolved declaration order of `T`.
pub fn refs_of<T: Referable>() -> IndexMap<&'static str, RefInfo> {
    extract_refs(TypeKey::of::<T>())
}

/// Dynamic-entry extraction over a [`TypeKey`].
///
/// Total by construction: an opaque key resolves to no field declarations
/// and yields an empty map, so callers can probe arbitrary keys
/// speculatively.
pub fn extract_refs(key: TypeKey) -> IndexMap<&'static str, RefInfo> {
    let mut refs = IndexMap::new();
    let Some(decls) = key.fields() else {
        return refs;
    };
    for decl in decls {
        if let Some(info) = classify(decl.name(), decl.expr()) {
            refs.insert(decl.name(), info);
        }
    }
    refs
}

fn classify(field: &'static str, expr: &TypeExpr) -> Option<RefInfo> {
    match expr {
        TypeExpr::Union(members) => classify_union(field, members),
        TypeExpr::Marker(marker) => classify_marker(field, marker),
        TypeExpr::Absent | TypeExpr::Plain(_) => None,
    }
}

/// Strict optional convention: exactly two members, exactly one of them
/// non-absent. Any other union shape is left unclassified rather than
/// guessed at.
fn classify_union(field: &'static str, members: &[TypeExpr]) -> Option<RefInfo> {
    if members.len() != 2 {
        return None;
    }
    let mut non_absent = members
        .iter()
        .filter(|member| !matches!(member, TypeExpr::Absent));
    let inner = non_absent.next()?;
    if non_absent.next().is_some() {
        return None;
    }
    let inner_info = classify(field, inner)?;
    Some(RefInfo {
        is_optional: true,
        ..inner_info
    })
}

fn classify_marker(field: &'static str, marker: &Marker) -> Option<RefInfo> {
    match (marker.kind(), marker.params()) {
        (MarkerKind::Ref, [target]) => Some(RefInfo::simple(field, target.as_type()?)),
        (MarkerKind::Attr, [target, name]) => Some(RefInfo {
            attr: Some(name.as_name()?.to_string()),
            ..RefInfo::simple(field, target.as_type()?)
        }),
        (MarkerKind::RefList, [target]) => Some(RefInfo {
            is_list: true,
            ..RefInfo::simple(field, target.as_type()?)
        }),
        // The key parameter is not inspected; the value type is the target.
        (MarkerKind::RefMap, [_, value]) => Some(RefInfo {
            is_map: true,
            ..RefInfo::simple(field, value.as_type()?)
        }),
        (MarkerKind::ContextRef, [name]) => Some(RefInfo {
            attr: Some(name.as_name()?.to_string()),
            is_context: true,
            ..RefInfo::simple(field, TypeKey::unit())
        }),
        _ => None,
    }
}

/// Record types `T` references directly, or transitively when `transitive`
/// is set.
pub fn dependencies_of<T: Referable>(transitive: bool) -> HashSet<TypeKey> {
    dependencies(TypeKey::of::<T>(), transitive)
}

/// Dependency set for an arbitrary [`TypeKey`].
///
/// Context references never contribute. In transitive mode the walk is an
/// iterative visited-set work list: every key is expanded at most once, so
/// cyclic graphs and diamonds terminate, and a non-introspectable node
/// simply contributes no further keys without aborting the rest of the
/// walk.
pub fn dependencies(key: TypeKey, transitive: bool) -> HashSet<TypeKey> {
    let direct = direct_dependencies(key);
    if !transitive {
        return direct;
    }

    let mut visited: HashSet<TypeKey> = HashSet::new();
    let mut pending: Vec<TypeKey> = direct.into_iter().collect();
    while let Some(current) = pending.pop() {
        if !visited.insert(current) {
            continue;
        }
        pending.extend(
            direct_dependencies(current)
                .into_iter()
                .filter(|dep| !visited.contains(dep)),
        );
    }
    visited
}

fn direct_dependencies(key: TypeKey) -> HashSet<TypeKey> {
    let mut deps: HashSet<TypeKey> = extract_refs(key)
        .into_values()
        .filter(|info| !info.is_context)
        .map(|info| info.target)
        .collect();
    // A hand-built Ref can still aim at the unit sentinel.
    deps.remove(&TypeKey::unit());
    deps
}
