//! Deterministic node identifiers.
//!
//! Every identifier is rebuilt from the entity's semantic key, never from
//! a counter, so inserting the same logical entity twice lands on the same
//! node.

pub const CLASS_PREFIX: &str = "class";
pub const METHOD_PREFIX: &str = "method";
pub const FIELD_PREFIX: &str = "field";
pub const ENDPOINT_PREFIX: &str = "endpoint";
pub const ANNOTATION_PREFIX: &str = "annotation";

/// Joins a package and a simple name into a fully-qualified name.
pub fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", package, name)
    }
}

/// Last dotted segment of a qualified name.
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

pub fn class_id(fqn: &str) -> String {
    format!("{}:{}", CLASS_PREFIX, fqn)
}

pub fn method_id(class_name: &str, method: &str) -> String {
    format!("{}:{}.{}", METHOD_PREFIX, class_name, method)
}

pub fn field_id(class_name: &str, field: &str) -> String {
    format!("{}:{}.{}", FIELD_PREFIX, class_name, field)
}

pub fn endpoint_id(http_method: &str, path: &str) -> String {
    format!("{}:{}:{}", ENDPOINT_PREFIX, http_method, path)
}

pub fn annotation_id(name: &str) -> String {
    format!("{}:{}", ANNOTATION_PREFIX, name)
}

/// Adds `prefix:` to `raw` unless it already carries it.
///
/// Lets callers pass either `field:com.x.Foo.baz` or `com.x.Foo.baz`.
pub fn with_prefix(prefix: &str, raw: &str) -> String {
    match raw.split_once(':') {
        Some((head, _)) if head == prefix => raw.to_string(),
        _ => format!("{}:{}", prefix, raw),
    }
}
