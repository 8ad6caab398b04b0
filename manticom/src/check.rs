//! Root-structure checks on the raw document.
//!
//! Walks the parsed JSON (as `serde_json::Value`) and reports every structural
//! problem without stopping. Extraction in `schema` then skips what is reported
//! here, so a partly malformed document still generates.

use crate::diagnostics::Diagnostics;
use crate::error::IssueKind;
use crate::pointer::Pointer;
use std::collections::BTreeSet;

/// Keys a URL entry may carry.
const KNOWN_URL_KEYS: &[&str] = &[
    "url", "keyPath", "doc", "#meta", "get", "post", "put", "patch", "delete",
];

fn known_url_keys() -> BTreeSet<&'static str> {
    KNOWN_URL_KEYS.iter().copied().collect()
}

/// Reports structural problems of the whole document.
pub fn check_schema(value: &serde_json::Value, diagnostics: &mut Diagnostics) {
    let root: Pointer = Pointer::root();

    for member in ["urls", "objects"] {
        if value.get(member).is_none() {
            diagnostics.report(&root, IssueKind::MissingRootMember(member.to_string()));
        }
    }

    if let Some(urls) = value.get("urls") {
        let urls_path: Pointer = root.child("urls");
        match urls.as_array() {
            Some(entries) => {
                let known: BTreeSet<&'static str> = known_url_keys();
                for (i, entry) in entries.iter().enumerate() {
                    check_url_entry(entry, &urls_path.index(i), &known, diagnostics);
                }
            }
            None => diagnostics.report(&urls_path, IssueKind::UrlsNotArray),
        }
    }

    if let Some(objects) = value.get("objects") {
        let objects_path: Pointer = root.child("objects");
        match objects.as_array() {
            Some(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    check_object_entry(entry, &objects_path.index(i), diagnostics);
                }
            }
            None => diagnostics.report(&objects_path, IssueKind::ObjectsNotArray),
        }
    }
}

fn check_url_entry(
    entry: &serde_json::Value,
    path: &Pointer,
    known: &BTreeSet<&'static str>,
    diagnostics: &mut Diagnostics,
) {
    let Some(obj) = entry.as_object() else {
        diagnostics.report(path, IssueKind::UrlEntryNotObject);
        return;
    };

    if !obj.contains_key("url") && !obj.contains_key("keyPath") {
        diagnostics.report(path, IssueKind::UrlEntryMissingUrl);
    }

    let Some(url) = obj.get("url") else {
        // Root responses carry arbitrary status keys.
        return;
    };
    if url.as_str() == Some("nil") {
        diagnostics.report(&path.child("url"), IssueKind::UrlNamedNil);
    }
    for key in obj.keys() {
        if !known.contains(key.as_str()) {
            diagnostics.report(&path.child(key), IssueKind::UnknownUrlKey(key.clone()));
        }
    }
}

fn check_object_entry(entry: &serde_json::Value, path: &Pointer, diagnostics: &mut Diagnostics) {
    let Some(obj) = entry.as_object() else {
        diagnostics.report(path, IssueKind::ObjectEntryNotObject);
        return;
    };
    if obj.len() != 1 {
        diagnostics.report(path, IssueKind::ObjectEntryNotSingleKey(obj.len()));
    }

    for (name, fields) in obj {
        let object_path: Pointer = path.child(name);
        if !name.starts_with('$') {
            diagnostics.report(&object_path, IssueKind::ObjectNameMissingPrefix(name.clone()));
            continue;
        }
        let Some(fields) = fields.as_object() else {
            diagnostics.report(&object_path, IssueKind::ObjectFieldsNotObject(name.clone()));
            continue;
        };
        for (field_name, raw) in fields {
            if !raw.is_string() {
                diagnostics.report(
                    &object_path.child(field_name),
                    IssueKind::AttributeNotString(field_name.clone()),
                );
            }
        }
    }
}
