//! Endpoint derivation from Spring-style mapping annotations.

use crate::ids;
use crate::records::{
    AnnotationUse, ClassRecord, EndpointParam, EndpointRecord, MethodRecord, ParamSource,
};

/// Mapping annotation → HTTP verb.
///
/// `RequestMapping` maps to `REQUEST` unless its `method` element names a verb.
pub const MAPPING_ANNOTATIONS: &[(&str, &str)] = &[
    ("GetMapping", "GET"),
    ("PostMapping", "POST"),
    ("PutMapping", "PUT"),
    ("DeleteMapping", "DELETE"),
    ("PatchMapping", "PATCH"),
    ("RequestMapping", "REQUEST"),
];

const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// Looks up the verb for a mapping annotation name.
pub fn http_verb_for(annotation: &str) -> Option<&'static str> {
    let name = ids::simple_name(annotation.trim_start_matches('@'));
    MAPPING_ANNOTATIONS
        .iter()
        .find(|(ann, _)| *ann == name)
        .map(|(_, verb)| *verb)
}

/// Derives one endpoint per mapping annotation on `method`.
///
/// Annotations outside [`MAPPING_ANNOTATIONS`] are ignored. The class-level
/// `RequestMapping` path, if any, prefixes every derived path.
pub fn derive_endpoints(class: &ClassRecord, method: &MethodRecord) -> Vec<EndpointRecord> {
    let prefix = class
        .annotations
        .iter()
        .find(|a| a.is("RequestMapping"))
        .and_then(mapped_path);

    let mut endpoints = Vec::new();
    for annotation in &method.annotations {
        let Some(verb) = http_verb_for(&annotation.name) else {
            continue;
        };

        let http_method = annotation
            .value("method")
            .and_then(|m| list_values(m).into_iter().next())
            .map(|m| ids::simple_name(&m).to_ascii_uppercase())
            .unwrap_or_else(|| verb.to_string());

        let path = match (prefix.as_deref(), mapped_path(annotation).as_deref()) {
            (None, None) => format!(
                "/{}/{}",
                class.name.to_ascii_lowercase(),
                method.name
            ),
            (Some(base), None) => join_paths(base, ""),
            (None, Some(own)) => join_paths("", own),
            (Some(base), Some(own)) => join_paths(base, own),
        };

        endpoints.push(EndpointRecord {
            http_method,
            path,
            handler_method: method.name.clone(),
            handler_class: class.fqn(),
            params: endpoint_params(method),
            consumes: media_types(annotation, "consumes"),
            produces: media_types(annotation, "produces"),
        });
    }
    endpoints
}

/// First path from the `value` or `path` element.
fn mapped_path(annotation: &AnnotationUse) -> Option<String> {
    annotation
        .value("value")
        .or_else(|| annotation.value("path"))
        .and_then(|raw| list_values(raw).into_iter().next())
}

fn media_types(annotation: &AnnotationUse, key: &str) -> Vec<String> {
    let types = annotation.value(key).map(list_values).unwrap_or_default();
    if types.is_empty() {
        vec![DEFAULT_MEDIA_TYPE.to_string()]
    } else {
        types
    }
}

fn endpoint_params(method: &MethodRecord) -> Vec<EndpointParam> {
    method
        .parameters
        .iter()
        .map(|param| {
            let bound = param.annotations.iter().find_map(|a| {
                let source = match a.simple_name() {
                    "PathVariable" => ParamSource::Path,
                    "RequestParam" => ParamSource::Query,
                    "RequestBody" => ParamSource::Body,
                    "RequestHeader" => ParamSource::Header,
                    _ => return None,
                };
                let name = a
                    .value("value")
                    .or_else(|| a.value("name"))
                    .and_then(|v| list_values(v).into_iter().next());
                Some((source, name))
            });

            let (source, name) = bound.unwrap_or((ParamSource::Query, None));
            EndpointParam {
                name: name.unwrap_or_else(|| param.name.clone()),
                param_type: param.param_type.clone(),
                source,
            }
        })
        .collect()
}

/// Splits an element value such as `{"/a", "/b"}` into unquoted items.
fn list_values(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    let inner = match raw.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
        Some(items) => items,
        None => raw,
    };
    inner
        .split(',')
        .map(|item| item.trim().trim_matches('"').trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn join_paths(base: &str, own: &str) -> String {
    let segments: Vec<&str> = [base, own]
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}
