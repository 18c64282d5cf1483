//
// naming.rs
// The MDSE REST Compiler
//

//! Naming conventions shared by every stage: collection paths,
//! singular and plural resource names, and the inverse inference of
//! a resource name from a route path.
//!
//! Pluralization is deliberately naive: an ASCII `s` is appended,
//! and inference strips exactly one trailing `s`. Irregular plurals
//! (`Person` → `persons`) are therefore produced verbatim, and names
//! that already end in `s` round-trip only through the case-insensitive
//! resolution in `resolve_resource()`.

/// The lowercase singular form of a resource name, e.g. `producto`.
pub fn singular(resource: &str) -> String {
    resource.to_lowercase()
}

/// The lowercase plural form of a resource name, e.g. `productos`.
pub fn plural(resource: &str) -> String {
    singular(resource) + "s"
}

/// The collection path of a resource, e.g. `/productos`.
pub fn base_path(resource: &str) -> String {
    format!("/{}", plural(resource))
}

/// The resource-qualified name of a path parameter, e.g. `producto_id`.
pub fn id_param(resource: &str) -> String {
    format!("{}_id", singular(resource))
}

/// The name of the in-memory collection a service keeps for a resource.
pub fn collection_name(resource: &str) -> String {
    format!("{}_db", plural(resource))
}

/// Returns the first non-empty segment of a route path, with any
/// surrounding quotes and slashes removed.
pub fn first_segment(path: &str) -> &str {
    path.trim_matches(|c| c == '/' || c == '"')
        .split('/')
        .next()
        .unwrap_or("")
}

/// Infers the resource name a path belongs to, from its first segment:
/// one trailing `s` is stripped and the first character is uppercased,
/// so `/productos/{id}` yields `Producto` and `/order_items` yields
/// `Order_item`.
pub fn infer_resource(path: &str) -> String {
    let segment = first_segment(path).to_lowercase();
    let stem = segment.strip_suffix('s').unwrap_or(&segment);
    let mut chars = stem.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Finds the declared resource name that a path refers to. Candidates
/// are compared case-insensitively against the inferred name, so
/// `OrderItem` is found for `/orderitems` and `Status` is found for
/// `/statuss`. The declared spelling wins.
pub fn resolve_resource<'a, I>(path: &str, candidates: I) -> Option<&'a str>
    where I: IntoIterator<Item=&'a str> {

    let inferred = infer_resource(path).to_lowercase();

    candidates.into_iter().find(|name| name.to_lowercase() == inferred)
}

/// Rewrites the single `{placeholder}` of a path to `{replacement}`.
/// Paths without a placeholder are returned unchanged.
pub fn specialize_placeholder(path: &str, replacement: &str) -> String {
    match (path.find('{'), path.find('}')) {
        (Some(open), Some(close)) if open < close => format!(
            "{}{{{}}}{}",
            &path[..open],
            replacement,
            &path[close + 1..],
        ),
        _ => path.to_owned(),
    }
}

/// Returns `true` if the path contains a `{placeholder}`.
pub fn has_placeholder(path: &str) -> bool {
    path.contains('{') && path.contains('}')
}
