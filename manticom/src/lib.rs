//! Generate `RestKit` object mappings, object classes and data-model accessors
//! from a JSON endpoint schema.
//!
//! A schema has two members: `urls`, the endpoints with their per-method
//! request/response bindings, and `objects`, the named data objects. The
//! pipeline checks the raw document, builds the object graph, compiles the
//! routes, computes the request and response closures and renders everything.
//! Problems are collected as [`Issue`]s rather than aborting the run.

pub mod attribute;
pub mod check;
pub mod closure;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod graph;
pub mod naming;
pub mod output;
pub mod pointer;
pub mod route;
pub mod schema;
pub mod settings;

pub use emit::ObjectFiles;
pub use error::{Issue, IssueKind, ManticomError, SchemaError, Severity};
pub use output::WriteReport;
pub use settings::GenerateSettings;

use crate::closure::Closure;
use crate::diagnostics::Diagnostics;
use crate::emit::DataModel;
use crate::graph::ObjectGraph;
use crate::pointer::Pointer;
use crate::route::CompiledRoutes;
use crate::schema::SchemaDocument;
use std::io::Write;
use std::path::Path;

/// Everything one run produces, before anything touches the file system.
#[derive(Debug, Clone)]
pub struct Generation {
    /// One `.h`/`.m` pair per object in the union of the request and response
    /// closures, dependencies first.
    pub objects: Vec<ObjectFiles>,
    pub data_model_header: String,
    pub data_model_body: String,
    /// Every warning and error found, in the order reported.
    pub issues: Vec<Issue>,
}

/// Runs the whole pipeline in memory.
///
/// # Errors
///
/// Returns `ManticomError::JsonError` if `schema_json` is not valid JSON, and
/// `ManticomError::SchemaError` if `settings.deny_errors` is set and any
/// error-severity issue was found.
pub fn generate(
    schema_json: &str,
    settings: &GenerateSettings,
) -> Result<Generation, ManticomError> {
    let value: serde_json::Value = serde_json::from_str(schema_json)?;
    let mut diagnostics = Diagnostics::new();

    check::check_schema(&value, &mut diagnostics);
    let document: SchemaDocument = SchemaDocument::from_value(&value, &mut diagnostics);
    let graph: ObjectGraph = graph::build(&document.objects, &mut diagnostics);
    let mut routes: CompiledRoutes = route::compile(&document.urls, &graph, &mut diagnostics);

    let requests: Closure = closure::closure(&routes.request_objects, &graph);
    let responses: Closure = closure::closure(&routes.response_objects, &graph);
    let all: Closure = requests.union(&responses);
    all.report_dangling(&Pointer::root().child("urls"), &mut diagnostics);
    routes.retain_resolved(&graph);

    if settings.deny_errors {
        diagnostics.deny_errors()?;
    }

    let objects: Vec<ObjectFiles> = all
        .objects(&graph)
        .map(emit::object_files)
        .collect::<Result<_, _>>()?;

    let model = DataModel {
        graph: &graph,
        routes: &routes,
        requests: &requests,
        responses: &responses,
    };
    let mut header: Vec<u8> = Vec::new();
    model.write_header(&mut header)?;
    let mut body: Vec<u8> = Vec::new();
    model.write_body(&mut body)?;

    tracing::debug!(
        objects = objects.len(),
        requests = requests.len(),
        responses = responses.len(),
        issues = diagnostics.issues().len(),
        "generated"
    );

    Ok(Generation {
        objects,
        data_model_header: String::from_utf8_lossy(&header).into_owned(),
        data_model_body: String::from_utf8_lossy(&body).into_owned(),
        issues: diagnostics.into_issues(),
    })
}

/// Generates from a schema string and writes `MachineDataModel.m` to `writer`.
///
/// The writer can be any type implementing `Write`, such as `File`, `Vec<u8>`,
/// or `Stdout`, so the body can be inspected without touching the file system.
///
/// # Errors
///
/// Returns the errors of [`generate`], or `ManticomError::IoError` if writing
/// to `writer` fails.
pub fn generate_to_writer<W: Write>(
    schema_json: &str,
    writer: &mut W,
    settings: &GenerateSettings,
) -> Result<(), ManticomError> {
    let generation: Generation = generate(schema_json, settings)?;
    writer.write_all(generation.data_model_body.as_bytes())?;
    Ok(())
}

/// Generates from a schema file and writes the result into `project_dir`.
///
/// # Errors
///
/// Returns `ManticomError::IoError` if reading the schema or writing the
/// project fails, plus the errors of [`generate`].
pub fn generate_from_file(
    input_path: impl AsRef<Path>,
    project_dir: impl AsRef<Path>,
    settings: &GenerateSettings,
) -> Result<WriteReport, ManticomError> {
    let schema_json: String = std::fs::read_to_string(input_path)?;
    let generation: Generation = generate(&schema_json, settings)?;
    output::write_project(project_dir.as_ref(), &generation, settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blog_schema() -> String {
        serde_json::json!({
            "urls": [
                { "400+": "$error", "keyPath": "error" },
                {
                    "url": "posts/",
                    "doc": "Blog posts",
                    "get": { "response": { "200+": "$post", "keyPath": "objects" } },
                    "post": { "request": "$post", "response": "$post", "#meta": "basicauth" }
                },
                {
                    "url": "posts/:slug/",
                    "delete": { "prototype": "$post", "#meta": "oauth,optional" }
                }
            ],
            "objects": [
                { "$error": { "message": "string" } },
                { "$author": { "username": "string,primarykey", "#meta": "cached" } },
                { "$post": { "slug": "string,primary", "title": "string", "author": "$author" } },
                { "$unused": { "flag": "boolean" } }
            ]
        })
        .to_string()
    }

    #[test]
    fn generates_only_reachable_objects() {
        let generation: Generation = generate(&blog_schema(), &GenerateSettings::default()).unwrap();
        let classes: Vec<&str> = generation
            .objects
            .iter()
            .map(|o| o.class_name.as_str())
            .collect();
        assert_eq!(classes, vec!["Error", "Author", "Post"]);
        assert!(generation.data_model_header.contains("@interface MachineDataModel : NSObject"));
        assert!(generation.data_model_header.contains("// Blog posts"));
        assert!(generation.data_model_body.contains("-(void) deletePostsSlugWithSlug:(NSString*)slug success:"));
        assert!(generation.data_model_header.contains("-(void) getAllPostsWithSuccess:"));
        assert!(generation.data_model_body.contains("[sharedMgr getObjectsAtPath:@\"posts/\" parameters:nil"));
        assert!(generation.data_model_body.contains("if ([AppModel sharedModel].apikey) {"));
    }

    #[test]
    fn lenient_run_keeps_going_and_reports() {
        let schema: String = serde_json::json!({
            "urls": [
                { "url": "users/", "get": { "response": "$user" } },
                { "url": "ghosts/", "get": { "response": "$ghost" } },
                { "url": "sessions/", "delete": { "response": "$user" } }
            ],
            "objects": [{ "$user": { "name": "string", "karma": "float,optional" } }]
        })
        .to_string();
        let generation: Generation = generate(&schema, &GenerateSettings::default()).unwrap();

        assert_eq!(generation.objects.len(), 1);
        assert!(generation.issues.iter().any(|i| i.kind
            == IssueKind::DanglingReference(vec!["ghost".to_string()])));
        assert!(generation
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::MissingPrimaryKeyForDelete));
        assert!(!generation.data_model_body.contains("ghostResponseMapping"));
        assert!(generation.data_model_body.contains("getAllUsersWithSuccess"));
    }

    #[test]
    fn strict_run_returns_every_error() {
        let schema: String = serde_json::json!({
            "urls": [{ "url": "items/", "delete": { "response": "$item" } }],
            "objects": [
                { "$item": { "name": "strnig", "parent": "$later" } },
                { "$later": { "name": "string" } }
            ]
        })
        .to_string();
        let settings = GenerateSettings {
            deny_errors: true,
            ..GenerateSettings::default()
        };
        let Err(ManticomError::SchemaError(error)) = generate(&schema, &settings) else {
            panic!("expected a schema error");
        };
        let kinds: Vec<&IssueKind> = error.issues.iter().map(|i| &i.kind).collect();
        assert_eq!(kinds.len(), 3, "{kinds:?}");
        assert!(matches!(kinds[0], IssueKind::UnknownType { .. }));
        assert!(matches!(kinds[1], IssueKind::ForwardReference { .. }));
        assert_eq!(kinds[2], &IssueKind::MissingPrimaryKeyForDelete);
        assert!(error.issues.iter().all(|i| i.severity() == Severity::Error));
    }

    #[test]
    fn warnings_alone_do_not_fail_strict_mode() {
        let schema: String = serde_json::json!({
            "urls": [{ "url": "me/", "get": { "response": "$user" } }],
            "objects": [{ "$user": { "username": "string,primary", "#meta": "cached,fast" } }]
        })
        .to_string();
        let settings = GenerateSettings {
            deny_errors: true,
            ..GenerateSettings::default()
        };
        let generation: Generation = generate(&schema, &settings).unwrap();
        assert!(generation.issues.iter().all(|i| i.severity() == Severity::Warning));
        assert!(!generation.issues.is_empty());
    }

    #[test]
    fn invalid_json_is_a_json_error() {
        let result = generate("{ not json", &GenerateSettings::default());
        assert!(matches!(result, Err(ManticomError::JsonError(_))));
    }

    #[test]
    fn generate_to_writer_writes_the_data_model_body() {
        let mut out: Vec<u8> = Vec::new();
        generate_to_writer(&blog_schema(), &mut out, &GenerateSettings::default()).unwrap();
        let body: String = String::from_utf8(out).unwrap();
        assert!(body.starts_with("//\n//  MachineDataModel.m\n"));
        assert!(body.contains("RKEntityMapping* authorResponseMapping"));
        assert!(body.contains("keyPath:@\"objects\" statusCodes:successCodes"));
        assert!(body.trim_end().ends_with("@end"));
    }

    #[test]
    fn generate_from_file_writes_the_project() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("schema.json");
        std::fs::write(&input, blog_schema()).unwrap();
        let project = dir.path().join("App");

        let report: WriteReport =
            generate_from_file(&input, &project, &GenerateSettings::default()).unwrap();

        assert_eq!(
            report.added,
            vec!["Author.h", "Author.m", "Error.h", "Error.m", "Post.h", "Post.m"]
        );
        assert!(project.join("Machine/MachineDataModel.h").is_file());
        assert!(project.join("Machine/MachineDataModel.m").is_file());
    }

    #[test]
    fn output_is_deterministic() {
        let settings = GenerateSettings::default();
        let first: Generation = generate(&blog_schema(), &settings).unwrap();
        let second: Generation = generate(&blog_schema(), &settings).unwrap();
        assert_eq!(first.data_model_body, second.data_model_body);
        assert_eq!(first.objects, second.objects);
    }
}
