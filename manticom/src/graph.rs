//! Builds the table of known objects from the `objects` list.
//!
//! Definitions are processed in declaration order and a `$` reference may only
//! name an object defined earlier. That keeps the reference graph acyclic and
//! makes declaration order a valid dependency order.

use crate::attribute::{self, AttributeError, ResolvedAttribute, SemanticType, TypeRef};
use crate::diagnostics::Diagnostics;
use crate::error::IssueKind;
use crate::naming::titlecase;
use crate::schema::{ObjectEntry, RawField};
use std::collections::BTreeMap;

/// A primitive field of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub semantic_type: SemanticType,
    pub is_primary: bool,
    pub is_optional: bool,
    pub is_array: bool,
}

impl Attribute {
    #[must_use]
    pub fn runtime_type(&self) -> &'static str {
        if self.is_array {
            "NSArray"
        } else {
            self.semantic_type.runtime_type()
        }
    }

    #[must_use]
    pub fn storage_type(&self) -> &'static str {
        if self.is_array {
            "NSUndefinedAttributeType"
        } else {
            self.semantic_type.storage_type()
        }
    }
}

/// A field holding another object (one-to-one) or a list of them (one-to-many).
/// The target is referenced by name; the graph owns every definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubclassRef {
    pub field_name: String,
    pub target: String,
    pub is_array: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDefinition {
    pub var_name: String,
    pub class_name: String,
    pub attrs: Vec<Attribute>,
    pub subclasses: Vec<SubclassRef>,
    /// Persisted entity rather than a transient object.
    pub is_cached: bool,
}

impl ObjectDefinition {
    /// The first attribute flagged primary. Later primary flags are ignored.
    #[must_use]
    pub fn primary_key(&self) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.is_primary)
    }
}

/// Every accepted object definition, in declaration order, indexed by name.
#[derive(Debug, Clone, Default)]
pub struct ObjectGraph {
    objects: Vec<ObjectDefinition>,
    index: BTreeMap<String, usize>,
}

impl ObjectGraph {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ObjectDefinition> {
        self.position(name).map(|i| &self.objects[i])
    }

    /// Declaration index of `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn at(&self, position: usize) -> Option<&ObjectDefinition> {
        self.objects.get(position)
    }

    #[must_use]
    pub fn objects(&self) -> &[ObjectDefinition] {
        &self.objects
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn insert(&mut self, definition: ObjectDefinition) {
        self.index
            .insert(definition.var_name.clone(), self.objects.len());
        self.objects.push(definition);
    }
}

/// Resolves every object entry in order. Bad fields are reported and dropped;
/// the rest of the object is kept.
pub fn build(entries: &[ObjectEntry], diagnostics: &mut Diagnostics) -> ObjectGraph {
    let mut graph = ObjectGraph::default();

    for entry in entries {
        if graph.position(&entry.name).is_some() {
            diagnostics.report(
                &entry.location,
                IssueKind::DuplicateObject(entry.name.clone()),
            );
            continue;
        }

        let is_cached: bool = entry
            .meta
            .as_deref()
            .is_some_and(|meta| parse_meta(meta, entry, diagnostics));

        let mut attrs: Vec<Attribute> = Vec::new();
        let mut subclasses: Vec<SubclassRef> = Vec::new();
        for field in &entry.fields {
            let Some(resolved) = resolve_field(field, diagnostics) else {
                continue;
            };
            match resolved.type_ref {
                TypeRef::Primitive(semantic_type) => {
                    if resolved.flags.array {
                        diagnostics.report(
                            &field.location,
                            IssueKind::UntestedPrimitiveArray(field.name.clone()),
                        );
                    }
                    attrs.push(Attribute {
                        name: field.name.clone(),
                        semantic_type,
                        is_primary: resolved.flags.primary,
                        is_optional: resolved.flags.optional,
                        is_array: resolved.flags.array,
                    });
                }
                TypeRef::Object(target) => {
                    if resolved.flags.primary {
                        diagnostics.report(
                            &field.location,
                            IssueKind::InvalidObjectAttribute {
                                attribute: field.name.clone(),
                                flag: "primary",
                            },
                        );
                    }
                    if resolved.flags.optional {
                        diagnostics.report(
                            &field.location,
                            IssueKind::InvalidObjectAttribute {
                                attribute: field.name.clone(),
                                flag: "optional",
                            },
                        );
                    }
                    if graph.position(&target).is_none() {
                        diagnostics.report(
                            &field.location,
                            IssueKind::ForwardReference {
                                attribute: field.name.clone(),
                                target,
                            },
                        );
                        continue;
                    }
                    subclasses.push(SubclassRef {
                        field_name: field.name.clone(),
                        target,
                        is_array: resolved.flags.array,
                    });
                }
            }
        }

        tracing::debug!(
            object = %entry.name,
            attrs = attrs.len(),
            subclasses = subclasses.len(),
            is_cached,
            "resolved object"
        );
        graph.insert(ObjectDefinition {
            var_name: entry.name.clone(),
            class_name: titlecase(&entry.name),
            attrs,
            subclasses,
            is_cached,
        });
    }

    graph
}

/// Returns whether the `#meta` tags mark the object as cached.
fn parse_meta(meta: &str, entry: &ObjectEntry, diagnostics: &mut Diagnostics) -> bool {
    let mut is_cached: bool = false;
    for tag in meta.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if tag == "cached" {
            is_cached = true;
        } else {
            diagnostics.report(
                &entry.location.child("#meta"),
                IssueKind::UnknownMetaTag(tag.to_string()),
            );
        }
    }
    is_cached
}

fn resolve_field(field: &RawField, diagnostics: &mut Diagnostics) -> Option<ResolvedAttribute> {
    match attribute::resolve(&field.raw) {
        Ok(resolved) => {
            if !resolved.ignored.is_empty() {
                diagnostics.report(
                    &field.location,
                    IssueKind::AmbiguousAttribute {
                        attribute: field.name.clone(),
                        extra: resolved.ignored.clone(),
                    },
                );
            }
            Some(resolved)
        }
        Err(error) => {
            let type_name: String = match error {
                AttributeError::MissingType => String::new(),
                AttributeError::UnknownType(type_name) => type_name,
            };
            diagnostics.report(
                &field.location,
                IssueKind::UnknownType {
                    attribute: field.name.clone(),
                    type_name,
                },
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaDocument;

    fn build_from(objects: serde_json::Value) -> (ObjectGraph, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let document: SchemaDocument = SchemaDocument::from_value(
            &serde_json::json!({ "urls": [], "objects": objects }),
            &mut diagnostics,
        );
        let graph: ObjectGraph = build(&document.objects, &mut diagnostics);
        (graph, diagnostics)
    }

    #[test]
    fn primitive_fields_become_attributes() {
        let (graph, diagnostics) = build_from(serde_json::json!([
            { "$user": { "username": "string,primarykey", "email": "string", "age": "integer,optional" } }
        ]));
        assert!(diagnostics.issues().is_empty());
        let user: &ObjectDefinition = graph.get("user").unwrap();
        assert_eq!(user.class_name, "User");
        assert_eq!(user.attrs.len(), 3);
        assert_eq!(user.primary_key().map(|a| a.name.as_str()), Some("username"));
        assert!(user.attrs[2].is_optional);
        assert_eq!(user.attrs[2].runtime_type(), "NSNumber");
        assert_eq!(user.attrs[0].storage_type(), "NSStringAttributeType");
    }

    #[test]
    fn backward_references_become_subclasses() {
        let (graph, diagnostics) = build_from(serde_json::json!([
            { "$tag": { "name": "string" } },
            { "$post": { "title": "string", "tags": "array,$tag", "cover": "$tag" } }
        ]));
        assert!(diagnostics.issues().is_empty());
        let post: &ObjectDefinition = graph.get("post").unwrap();
        assert_eq!(
            post.subclasses,
            vec![
                SubclassRef {
                    field_name: "tags".to_string(),
                    target: "tag".to_string(),
                    is_array: true,
                },
                SubclassRef {
                    field_name: "cover".to_string(),
                    target: "tag".to_string(),
                    is_array: false,
                },
            ]
        );
    }

    #[test]
    fn forward_references_always_fail() {
        let (graph, diagnostics) = build_from(serde_json::json!([
            { "$post": { "author": "$user" } },
            { "$user": { "username": "string" } }
        ]));
        assert!(diagnostics.any(|k| matches!(
            k,
            IssueKind::ForwardReference { target, .. } if target == "user"
        )));
        assert!(graph.get("post").unwrap().subclasses.is_empty());
        assert!(graph.get("user").is_some());
    }

    #[test]
    fn self_reference_is_a_forward_reference() {
        let (graph, diagnostics) = build_from(serde_json::json!([
            { "$node": { "parent": "$node" } }
        ]));
        assert!(diagnostics.any(|k| matches!(k, IssueKind::ForwardReference { .. })));
        assert!(graph.get("node").unwrap().subclasses.is_empty());
    }

    #[test]
    fn object_reference_cannot_be_primary_or_optional() {
        let (graph, diagnostics) = build_from(serde_json::json!([
            { "$tag": { "name": "string" } },
            { "$post": { "tag": "$tag,primary,optional" } }
        ]));
        let flags: Vec<&'static str> = diagnostics
            .issues()
            .iter()
            .filter_map(|i| match &i.kind {
                IssueKind::InvalidObjectAttribute { flag, .. } => Some(*flag),
                _ => None,
            })
            .collect();
        assert_eq!(flags, vec!["primary", "optional"]);
        assert_eq!(graph.get("post").unwrap().subclasses.len(), 1);
    }

    #[test]
    fn unknown_type_drops_only_that_field() {
        let (graph, diagnostics) = build_from(serde_json::json!([
            { "$user": { "id": "uuid", "email": "string" } }
        ]));
        assert!(diagnostics.any(|k| matches!(
            k,
            IssueKind::UnknownType { type_name, .. } if type_name == "uuid"
        )));
        let names: Vec<&str> = graph
            .get("user")
            .unwrap()
            .attrs
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["email"]);
    }

    #[test]
    fn cached_meta_tag_is_recognized_and_others_warned() {
        let (graph, diagnostics) = build_from(serde_json::json!([
            { "$user": { "#meta": "cached,versioned", "email": "string" } }
        ]));
        assert!(graph.get("user").unwrap().is_cached);
        assert!(diagnostics.any(|k| *k == IssueKind::UnknownMetaTag("versioned".to_string())));
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn primitive_array_is_untested_but_kept() {
        let (graph, diagnostics) = build_from(serde_json::json!([
            { "$user": { "nicknames": "string,array" } }
        ]));
        let attr: &Attribute = &graph.get("user").unwrap().attrs[0];
        assert_eq!(attr.runtime_type(), "NSArray");
        assert_eq!(attr.storage_type(), "NSUndefinedAttributeType");
        assert!(diagnostics.any(|k| matches!(k, IssueKind::UntestedPrimitiveArray(_))));
    }

    #[test]
    fn first_primary_attribute_wins() {
        let (graph, _) = build_from(serde_json::json!([
            { "$user": { "username": "string,primary", "email": "string,primary" } }
        ]));
        assert_eq!(
            graph.get("user").unwrap().primary_key().map(|a| a.name.as_str()),
            Some("username")
        );
    }

    #[test]
    fn duplicate_object_keeps_first_definition() {
        let (graph, diagnostics) = build_from(serde_json::json!([
            { "$user": { "email": "string" } },
            { "$user": { "phone": "string" } }
        ]));
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.get("user").unwrap().attrs[0].name, "email");
        assert!(diagnostics.any(|k| matches!(k, IssueKind::DuplicateObject(_))));
    }

    #[test]
    fn ambiguous_attribute_warns_and_keeps_first_token() {
        let (graph, diagnostics) = build_from(serde_json::json!([
            { "$user": { "age": "integer,string" } }
        ]));
        assert_eq!(
            graph.get("user").unwrap().attrs[0].semantic_type,
            SemanticType::Integer
        );
        assert!(diagnostics.any(|k| matches!(k, IssueKind::AmbiguousAttribute { .. })));
    }
}
