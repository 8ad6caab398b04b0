//! The input document: `{"urls": [...], "objects": [...]}`.
//!
//! Extraction is permissive. Entries that `check` reports as structurally
//! broken are skipped here without a second report, so the rest of the
//! document still flows through the pipeline.

use crate::diagnostics::Diagnostics;
use crate::error::IssueKind;
use crate::naming::fix_url_path;
use crate::pointer::Pointer;
use serde::Deserialize;
use std::fmt;

/// HTTP verbs an endpoint may define, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const ALL: [Self; 5] = [Self::Get, Self::Post, Self::Put, Self::Patch, Self::Delete];

    /// Key of the method inside a URL entry.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Get => "Get",
            Self::Post => "Post",
            Self::Put => "Put",
            Self::Patch => "Patch",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A response (or prototype) as written in the schema: either `"$object"` or
/// `{"200+": "$object", "keyPath": "objects"}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ResponseSpec {
    Bare(String),
    Structured(serde_json::Map<String, serde_json::Value>),
}

/// One verb of one endpoint, as written in the schema.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MethodDefinition {
    #[serde(default)]
    pub request: Option<String>,

    #[serde(default)]
    pub response: Option<ResponseSpec>,

    #[serde(default)]
    pub prototype: Option<ResponseSpec>,

    #[serde(default)]
    pub parameters: Option<String>,

    #[serde(default)]
    pub doc: Option<String>,

    /// Authorization tags, e.g. `"tastypieauth,optional"`.
    #[serde(default, rename = "#meta")]
    pub meta: Option<String>,
}

/// An endpoint with a normalized path (no leading slash, trailing slash).
#[derive(Debug, Clone, PartialEq)]
pub struct UrlDefinition {
    pub location: Pointer,
    pub path: String,
    pub doc: Option<String>,
    pub methods: Vec<(HttpMethod, Pointer, MethodDefinition)>,
}

/// A `urls` entry without `url`: a response binding applied to every URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RootResponse {
    pub location: Pointer,
    pub response: ResponseSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UrlEntry {
    Url(UrlDefinition),
    RootResponse(RootResponse),
}

/// One attribute line of an object definition before type resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    pub location: Pointer,
    pub name: String,
    pub raw: String,
}

/// One `{"$name": {...}}` entry of `objects`, `$` removed from the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub location: Pointer,
    pub name: String,
    pub meta: Option<String>,
    pub fields: Vec<RawField>,
}

/// The whole input document in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDocument {
    pub urls: Vec<UrlEntry>,
    pub objects: Vec<ObjectEntry>,
}

impl SchemaDocument {
    /// Extracts everything well formed from a parsed document.
    pub fn from_value(value: &serde_json::Value, diagnostics: &mut Diagnostics) -> Self {
        let root: Pointer = Pointer::root();
        let urls: Vec<UrlEntry> = value
            .get("urls")
            .and_then(serde_json::Value::as_array)
            .map(|entries| {
                let urls_path: Pointer = root.child("urls");
                entries
                    .iter()
                    .enumerate()
                    .filter_map(|(i, entry)| {
                        parse_url_entry(entry, &urls_path.index(i), diagnostics)
                    })
                    .collect()
            })
            .unwrap_or_default();

        let objects: Vec<ObjectEntry> = value
            .get("objects")
            .and_then(serde_json::Value::as_array)
            .map(|entries| {
                let objects_path: Pointer = root.child("objects");
                entries
                    .iter()
                    .enumerate()
                    .flat_map(|(i, entry)| parse_object_entry(entry, &objects_path.index(i)))
                    .collect()
            })
            .unwrap_or_default();

        Self { urls, objects }
    }
}

fn parse_url_entry(
    entry: &serde_json::Value,
    location: &Pointer,
    diagnostics: &mut Diagnostics,
) -> Option<UrlEntry> {
    let obj: &serde_json::Map<String, serde_json::Value> = entry.as_object()?;

    let Some(url) = obj.get("url").and_then(serde_json::Value::as_str) else {
        let mut binding: serde_json::Map<String, serde_json::Value> = obj.clone();
        binding.remove("doc");
        binding.remove("#meta");
        return Some(UrlEntry::RootResponse(RootResponse {
            location: location.clone(),
            response: ResponseSpec::Structured(binding),
        }));
    };

    let mut methods: Vec<(HttpMethod, Pointer, MethodDefinition)> = Vec::new();
    for method in HttpMethod::ALL {
        let Some(raw_method) = obj.get(method.key()) else {
            continue;
        };
        let method_path: Pointer = location.child(method.key());
        match serde_json::from_value::<MethodDefinition>(raw_method.clone()) {
            Ok(definition) => methods.push((method, method_path, definition)),
            Err(e) => diagnostics.report(&method_path, IssueKind::MalformedMethod(e.to_string())),
        }
    }

    Some(UrlEntry::Url(UrlDefinition {
        location: location.clone(),
        path: fix_url_path(url),
        doc: obj
            .get("doc")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string),
        methods,
    }))
}

fn parse_object_entry(entry: &serde_json::Value, location: &Pointer) -> Vec<ObjectEntry> {
    let Some(obj) = entry.as_object() else {
        return Vec::new();
    };
    obj.iter()
        .filter_map(|(key, fields)| {
            let name: &str = key.strip_prefix('$')?;
            let fields: &serde_json::Map<String, serde_json::Value> = fields.as_object()?;
            let object_path: Pointer = location.child(key);
            let meta: Option<String> = fields
                .get("#meta")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string);
            let raw_fields: Vec<RawField> = fields
                .iter()
                .filter(|(field_name, _)| field_name.as_str() != "#meta")
                .filter_map(|(field_name, raw)| {
                    Some(RawField {
                        location: object_path.child(field_name),
                        name: field_name.clone(),
                        raw: raw.as_str()?.to_string(),
                    })
                })
                .collect();
            Some(ObjectEntry {
                location: object_path,
                name: name.to_string(),
                meta,
                fields: raw_fields,
            })
        })
        .collect()
}
