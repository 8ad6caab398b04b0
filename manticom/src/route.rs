//! Compiles URL entries into descriptors and accessor methods.
//!
//! Every `request`/`response` binding becomes a descriptor registered with the
//! object manager. Every method that passes its policy checks additionally
//! becomes an accessor: `get` reads, `delete` removes by primary key, and
//! `post`/`put`/`patch` send a request object.

use crate::diagnostics::Diagnostics;
use crate::error::IssueKind;
use crate::graph::{Attribute, ObjectDefinition, ObjectGraph};
use crate::naming::{make_suffix, titlecase};
use crate::pointer::Pointer;
use crate::schema::{HttpMethod, MethodDefinition, ResponseSpec, UrlDefinition, UrlEntry};
use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::LazyLock;

/// Status-code class a response binding applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusBucket {
    Success,
    Redirect,
    ClientFailure,
    ServerFailure,
    Code(u16),
}

impl StatusBucket {
    /// Parses `200+`, `300+`, `400+`, `500+` or a literal status code.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        let bucket = match key {
            "200+" => Self::Success,
            "300+" => Self::Redirect,
            "400+" => Self::ClientFailure,
            "500+" => Self::ServerFailure,
            code => return code.parse::<u16>().ok().map(Self::Code),
        };
        Some(bucket)
    }

    /// Expression evaluating to the matching index set inside `setupMapping`.
    #[must_use]
    pub fn index_set(self) -> String {
        match self {
            Self::Success => "successCodes".to_string(),
            Self::Redirect => "redirectCodes".to_string(),
            Self::ClientFailure => "failCodes".to_string(),
            Self::ServerFailure => "serverFailCodes".to_string(),
            Self::Code(code) => format!("[NSIndexSet indexSetWithIndex:{code}]"),
        }
    }
}

/// A resolved `response` (or `prototype`) binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBinding {
    pub bucket: StatusBucket,
    pub key_path: Option<String>,
    /// Object name without `$`.
    pub object: String,
}

/// Strips the `$` from an object reference.
pub fn parse_reference(raw: &str, path: &Pointer, diagnostics: &mut Diagnostics) -> Option<String> {
    match raw.strip_prefix('$') {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => {
            diagnostics.report(path, IssueKind::MalformedReference(raw.to_string()));
            None
        }
    }
}

/// Resolves a bare `"$object"` or a structured `{"<bucket>": "$object", "keyPath": ...}`.
pub fn parse_response(
    spec: &ResponseSpec,
    path: &Pointer,
    diagnostics: &mut Diagnostics,
) -> Option<ResponseBinding> {
    let binding: &serde_json::Map<String, serde_json::Value> = match spec {
        ResponseSpec::Bare(raw) => {
            return Some(ResponseBinding {
                bucket: StatusBucket::Success,
                key_path: None,
                object: parse_reference(raw, path, diagnostics)?,
            });
        }
        ResponseSpec::Structured(binding) => binding,
    };

    let key_path: Option<String> = binding
        .get("keyPath")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string);
    let buckets: Vec<(&String, &serde_json::Value)> =
        binding.iter().filter(|(key, _)| *key != "keyPath").collect();

    let Some((bucket_key, object)) = buckets.first().copied() else {
        diagnostics.report(path, IssueKind::MalformedResponse);
        return None;
    };
    if buckets.len() > 1 {
        diagnostics.report(
            path,
            IssueKind::AmbiguousResponse(buckets.iter().map(|(k, _)| (*k).clone()).collect()),
        );
    }

    let bucket_path: Pointer = path.child(bucket_key);
    let Some(bucket) = StatusBucket::parse(bucket_key) else {
        diagnostics.report(&bucket_path, IssueKind::InvalidStatusBucket(bucket_key.clone()));
        return None;
    };
    let Some(raw_object) = object.as_str() else {
        diagnostics.report(&bucket_path, IssueKind::MalformedResponse);
        return None;
    };

    Some(ResponseBinding {
        bucket,
        key_path,
        object: parse_reference(raw_object, &bucket_path, diagnostics)?,
    })
}

/// Authorization scheme applied before a request is sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthKind {
    /// Clears any authorization header left from a previous call.
    #[default]
    None,
    Basic,
    OAuth,
    /// Username plus API key, the `TastyPie` scheme.
    TastyPie,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthScheme {
    pub kind: AuthKind,
    /// Only authorize when credentials are present; clear otherwise.
    pub optional: bool,
}

/// Parses a method's `#meta` tags into an auth scheme.
pub fn parse_auth(meta: Option<&str>, path: &Pointer, diagnostics: &mut Diagnostics) -> AuthScheme {
    let mut scheme = AuthScheme::default();
    let Some(meta) = meta else {
        return scheme;
    };

    let mut kinds: Vec<(AuthKind, &str)> = Vec::new();
    for tag in meta.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match tag {
            "optional" => scheme.optional = true,
            "basic" | "basicauth" => kinds.push((AuthKind::Basic, tag)),
            "oauth" => kinds.push((AuthKind::OAuth, tag)),
            "tastypie" | "tastypieauth" => kinds.push((AuthKind::TastyPie, tag)),
            "none" => {}
            other => diagnostics.report(
                &path.child("#meta"),
                IssueKind::UnknownMetaTag(other.to_string()),
            ),
        }
    }

    if kinds.len() > 1 {
        diagnostics.report(
            &path.child("#meta"),
            IssueKind::AmbiguousAuth(kinds.iter().map(|(_, t)| (*t).to_string()).collect()),
        );
    }
    for preferred in [AuthKind::Basic, AuthKind::OAuth, AuthKind::TastyPie] {
        if kinds.iter().any(|(kind, _)| *kind == preferred) {
            scheme.kind = preferred;
            break;
        }
    }
    scheme
}

/// Registers a request object for a URL and method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub name: String,
    pub object: String,
    pub method: HttpMethod,
    pub path: String,
}

/// Registers a response object for a URL (or every URL), method and status bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDescriptor {
    pub name: String,
    pub object: String,
    /// `None` matches any method.
    pub method: Option<HttpMethod>,
    /// `None` matches any path.
    pub path: Option<String>,
    pub key_path: Option<String>,
    pub bucket: StatusBucket,
}

/// One argument of a generated accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub type_name: String,
}

impl Argument {
    fn from_attribute(attribute: &Attribute) -> Self {
        Self {
            name: attribute.name.clone(),
            type_name: attribute.runtime_type().to_string(),
        }
    }
}

/// Where the request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathTarget {
    Literal(String),
    /// `prefix` with the primary key appended as the last path segment.
    WithPrimaryKey { prefix: String, key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    Read,
    /// Builds `class_name` from the arguments named in `fields`, then sends it.
    Write {
        class_name: String,
        fields: Vec<String>,
    },
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledMethod {
    pub method: HttpMethod,
    pub doc: Option<String>,
    pub accessor: Accessor,
    /// Every argument in selector order; the primary key, when bound, is first.
    pub arguments: Vec<Argument>,
    /// Arguments sent as query/body parameters rather than object fields.
    pub parameters: Vec<Argument>,
    pub target: PathTarget,
    pub auth: AuthScheme,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledUrl {
    pub path: String,
    pub doc: Option<String>,
    pub methods: Vec<CompiledMethod>,
}

/// Everything compiled from `urls`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledRoutes {
    pub urls: Vec<CompiledUrl>,
    pub request_descriptors: Vec<RequestDescriptor>,
    /// URL-specific descriptors first, then root descriptors.
    pub response_descriptors: Vec<ResponseDescriptor>,
    pub request_objects: BTreeSet<String>,
    pub response_objects: BTreeSet<String>,
}

impl CompiledRoutes {
    /// Drops descriptors whose object is not in the graph so emission never
    /// references an undeclared mapping.
    pub fn retain_resolved(&mut self, graph: &ObjectGraph) {
        self.request_descriptors
            .retain(|d| graph.get(&d.object).is_some());
        self.response_descriptors
            .retain(|d| graph.get(&d.object).is_some());
    }
}

/// Compiles all URL entries against the object graph.
pub fn compile(
    entries: &[UrlEntry],
    graph: &ObjectGraph,
    diagnostics: &mut Diagnostics,
) -> CompiledRoutes {
    let mut compiler = Compiler {
        graph,
        diagnostics,
        routes: CompiledRoutes::default(),
        used_names: BTreeSet::new(),
    };

    let mut root_descriptors: Vec<ResponseDescriptor> = Vec::new();
    for entry in entries {
        match entry {
            UrlEntry::Url(url) => compiler.compile_url(url),
            UrlEntry::RootResponse(root) => {
                let Some(binding) =
                    parse_response(&root.response, &root.location, compiler.diagnostics)
                else {
                    continue;
                };
                let name: String =
                    compiler.unique_name(&format!("{}_Response_{}", binding.object, make_suffix("nil")));
                compiler.routes.response_objects.insert(binding.object.clone());
                root_descriptors.push(ResponseDescriptor {
                    name,
                    object: binding.object,
                    method: None,
                    path: None,
                    key_path: binding.key_path,
                    bucket: binding.bucket,
                });
            }
        }
    }
    compiler.routes.response_descriptors.extend(root_descriptors);

    tracing::debug!(
        urls = compiler.routes.urls.len(),
        requests = compiler.routes.request_descriptors.len(),
        responses = compiler.routes.response_descriptors.len(),
        "compiled routes"
    );
    compiler.routes
}

struct Compiler<'a> {
    graph: &'a ObjectGraph,
    diagnostics: &'a mut Diagnostics,
    routes: CompiledRoutes,
    used_names: BTreeSet<String>,
}

impl<'a> Compiler<'a> {
    fn unique_name(&mut self, base: &str) -> String {
        let mut name: String = base.to_string();
        let mut counter: usize = 2;
        while self.used_names.contains(&name) {
            name = format!("{base}_{counter}");
            counter += 1;
        }
        self.used_names.insert(name.clone());
        name
    }

    fn lookup(&mut self, name: &str, path: &Pointer) -> Option<&'a ObjectDefinition> {
        let found: Option<&'a ObjectDefinition> = self.graph.get(name);
        if found.is_none() {
            self.diagnostics
                .report(path, IssueKind::UnknownObject(name.to_string()));
        }
        found
    }

    fn compile_url(&mut self, url: &UrlDefinition) {
        let mut methods: Vec<CompiledMethod> = Vec::new();
        for (method, path, definition) in &url.methods {
            let request: Option<String> = self.register_request(url, *method, path, definition);
            let response: Option<ResponseBinding> =
                self.register_response(url, *method, path, definition);
            if let Some(compiled) = self.compile_method(
                url,
                *method,
                path,
                definition,
                request.as_deref(),
                response.as_ref(),
            ) {
                methods.push(compiled);
            }
        }
        self.routes.urls.push(CompiledUrl {
            path: url.path.clone(),
            doc: url.doc.clone().filter(|d| !d.is_empty()),
            methods,
        });
    }

    fn register_request(
        &mut self,
        url: &UrlDefinition,
        method: HttpMethod,
        path: &Pointer,
        definition: &MethodDefinition,
    ) -> Option<String> {
        let raw: &str = definition.request.as_deref()?;
        let object: String = parse_reference(raw, &path.child("request"), self.diagnostics)?;
        let name: String = self.unique_name(&format!(
            "{object}_Request{}_{}",
            method.title(),
            make_suffix(&url.path)
        ));
        self.routes.request_objects.insert(object.clone());
        self.routes.request_descriptors.push(RequestDescriptor {
            name,
            object: object.clone(),
            method,
            path: url.path.clone(),
        });
        Some(object)
    }

    fn register_response(
        &mut self,
        url: &UrlDefinition,
        method: HttpMethod,
        path: &Pointer,
        definition: &MethodDefinition,
    ) -> Option<ResponseBinding> {
        let spec: &ResponseSpec = definition.response.as_ref()?;
        let binding: ResponseBinding =
            parse_response(spec, &path.child("response"), self.diagnostics)?;
        let code: String = match binding.bucket {
            StatusBucket::Code(code) => code.to_string(),
            _ => String::new(),
        };
        let name: String = self.unique_name(&format!(
            "{}_Response{}{code}_{}",
            binding.object,
            method.title(),
            make_suffix(&url.path)
        ));
        self.routes.response_objects.insert(binding.object.clone());
        self.routes.response_descriptors.push(ResponseDescriptor {
            name,
            object: binding.object.clone(),
            method: Some(method),
            path: Some(url.path.clone()),
            key_path: binding.key_path.clone(),
            bucket: binding.bucket,
        });
        Some(binding)
    }

    fn compile_method(
        &mut self,
        url: &UrlDefinition,
        method: HttpMethod,
        path: &Pointer,
        definition: &MethodDefinition,
        request: Option<&str>,
        response: Option<&ResponseBinding>,
    ) -> Option<CompiledMethod> {
        let auth: AuthScheme = parse_auth(definition.meta.as_deref(), path, self.diagnostics);
        let parameters: Vec<Argument> = self.resolve_parameters(path, definition);
        let prototype_key: Option<Attribute> = self.resolve_prototype(path, definition);

        let (accessor, primary_key, fields): (Accessor, Option<Attribute>, Vec<Argument>) =
            match method {
                HttpMethod::Get => {
                    let Some(response) = response else {
                        self.diagnostics
                            .report(path, IssueKind::MissingResponse(method.key()));
                        return None;
                    };
                    if request.is_some() {
                        self.diagnostics
                            .report(path, IssueKind::ConflictingRequestResponse);
                        return None;
                    }
                    let key: Option<Attribute> = prototype_key.or_else(|| {
                        self.primary_key_of(&response.object)
                            .filter(|k| path_variables(&url.path).iter().any(|(_, v)| *v == k.name))
                    });
                    (Accessor::Read, key, Vec::new())
                }
                HttpMethod::Delete => {
                    let key: Option<Attribute> = if definition.prototype.is_some() {
                        prototype_key
                    } else {
                        response.and_then(|r| self.primary_key_of(&r.object))
                    };
                    if key.is_none() {
                        self.diagnostics
                            .report(path, IssueKind::MissingPrimaryKeyForDelete);
                        return None;
                    }
                    (Accessor::Delete, key, Vec::new())
                }
                HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => {
                    let Some(request) = request else {
                        self.diagnostics
                            .report(path, IssueKind::MissingRequest(method.key()));
                        return None;
                    };
                    let object: &ObjectDefinition =
                        self.lookup(request, &path.child("request"))?;
                    let key: Option<Attribute> =
                        prototype_key.or_else(|| object.primary_key().cloned());
                    let accessor = Accessor::Write {
                        class_name: object.class_name.clone(),
                        fields: object_field_names(object),
                    };
                    (accessor, key, write_fields(object))
                }
            };

        let mut arguments: Vec<Argument> = Vec::new();
        if let Some(key) = &primary_key {
            arguments.push(Argument::from_attribute(key));
        }
        arguments.extend(fields);
        let object_arguments: BTreeSet<String> =
            arguments.iter().map(|a| a.name.clone()).collect();
        arguments.extend(parameters.iter().cloned());

        let accessor: Accessor = match accessor {
            Accessor::Write { class_name, fields } => Accessor::Write {
                class_name,
                fields: fields
                    .into_iter()
                    .filter(|f| object_arguments.contains(f))
                    .collect(),
            },
            other => other,
        };

        let target: PathTarget = self.decorate_path(&url.path, primary_key.as_ref(), method, path);
        Some(CompiledMethod {
            method,
            doc: definition.doc.clone().filter(|d| !d.is_empty()),
            accessor,
            arguments,
            parameters,
            target,
            auth,
        })
    }

    fn primary_key_of(&self, object: &str) -> Option<Attribute> {
        self.graph.get(object)?.primary_key().cloned()
    }

    fn resolve_parameters(&mut self, path: &Pointer, definition: &MethodDefinition) -> Vec<Argument> {
        let Some(raw) = definition.parameters.as_deref() else {
            return Vec::new();
        };
        let parameters_path: Pointer = path.child("parameters");
        let Some(name) = parse_reference(raw, &parameters_path, self.diagnostics) else {
            return Vec::new();
        };
        let Some(object) = self.lookup(&name, &parameters_path) else {
            return Vec::new();
        };
        let arguments: Vec<Argument> = object.attrs.iter().map(Argument::from_attribute).collect();
        if !object.subclasses.is_empty() {
            self.diagnostics
                .report(&parameters_path, IssueKind::NonPrimitiveParameter(name));
        }
        arguments
    }

    fn resolve_prototype(&mut self, path: &Pointer, definition: &MethodDefinition) -> Option<Attribute> {
        let spec: &ResponseSpec = definition.prototype.as_ref()?;
        let prototype_path: Pointer = path.child("prototype");
        let binding: ResponseBinding = parse_response(spec, &prototype_path, self.diagnostics)?;
        self.lookup(&binding.object, &prototype_path)?
            .primary_key()
            .cloned()
    }

    fn decorate_path(
        &mut self,
        url: &str,
        primary_key: Option<&Attribute>,
        method: HttpMethod,
        path: &Pointer,
    ) -> PathTarget {
        let variables: Vec<(Range<usize>, String)> = path_variables(url);
        let Some(key) = primary_key else {
            for (_, variable) in variables {
                self.diagnostics
                    .report(path, IssueKind::UnboundPathVariable(variable));
            }
            return PathTarget::Literal(url.to_string());
        };

        if method != HttpMethod::Delete && !variables.iter().any(|(_, v)| *v == key.name) {
            self.diagnostics
                .report(path, IssueKind::PrimaryKeyNotInPath(key.name.clone()));
        }

        let mut prefix: String = String::with_capacity(url.len());
        let mut cursor: usize = 0;
        for (range, variable) in variables {
            if variable == key.name {
                prefix.push_str(&url[cursor..range.start]);
                cursor = range.end;
            } else {
                self.diagnostics
                    .report(path, IssueKind::UnboundPathVariable(variable));
            }
        }
        prefix.push_str(&url[cursor..]);
        let prefix: String = prefix.trim_end_matches('/').to_string();

        PathTarget::WithPrimaryKey {
            prefix,
            key: key.name.clone(),
        }
    }
}

/// Request-object arguments: non-primary attributes, then object fields.
fn write_fields(object: &ObjectDefinition) -> Vec<Argument> {
    object
        .attrs
        .iter()
        .filter(|a| !a.is_primary)
        .map(Argument::from_attribute)
        .chain(object.subclasses.iter().map(|s| Argument {
            name: s.field_name.clone(),
            type_name: titlecase(&s.target),
        }))
        .collect()
}

/// Attribute and object field names in declaration order.
fn object_field_names(object: &ObjectDefinition) -> Vec<String> {
    object
        .attrs
        .iter()
        .map(|a| a.name.clone())
        .chain(object.subclasses.iter().map(|s| s.field_name.clone()))
        .collect()
}

static PATH_VARIABLE: LazyLock<regress::Regex> = LazyLock::new(|| {
    regress::Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").expect("path variable pattern is valid")
});

/// `:name` tokens of a path with their byte ranges.
#[must_use]
pub fn path_variables(path: &str) -> Vec<(Range<usize>, String)> {
    PATH_VARIABLE
        .find_iter(path)
        .filter_map(|m| {
            let name: Range<usize> = m.group(1)?;
            Some((m.range(), path[name].to_string()))
        })
        .collect()
}
