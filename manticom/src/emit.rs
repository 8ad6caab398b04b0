//! Renders resolved objects and compiled routes as Objective-C source for the
//! `RestKit` mapping layer.
//!
//! Nothing here resolves or validates. Every function writes what it is given,
//! in the order it is given, so the same input always produces byte-identical
//! output.

use crate::closure::Closure;
use crate::graph::{ObjectDefinition, ObjectGraph};
use crate::naming::{parameter_name, safety_name, titlecase, underscore_to_camel};
use crate::route::{
    Accessor, Argument, AuthKind, AuthScheme, CompiledMethod, CompiledRoutes, CompiledUrl,
    PathTarget,
};
use crate::schema::HttpMethod;
use std::collections::BTreeSet;
use std::io::Write;

const BLOCK_SIGNATURE: &str = ":(void (^)(RKObjectRequestOperation *operation, RKMappingResult *mappingResult))success failure:(void (^)(RKObjectRequestOperation *operation, NSError *error))failure";

const CLEAR_AUTHORIZATION: &str = "[sharedMgr.HTTPClient clearAuthorizationHeader];";

/// Header and body source of one generated object class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectFiles {
    pub class_name: String,
    pub header: String,
    pub body: String,
}

impl ObjectFiles {
    #[must_use]
    pub fn header_file_name(&self) -> String {
        format!("{}.h", self.class_name)
    }

    #[must_use]
    pub fn body_file_name(&self) -> String {
        format!("{}.m", self.class_name)
    }
}

/// Renders the `.h`/`.m` pair for one object.
///
/// # Errors
///
/// Returns an error if formatting into the in-memory buffers fails.
pub fn object_files(object: &ObjectDefinition) -> std::io::Result<ObjectFiles> {
    let mut header: Vec<u8> = Vec::new();
    write_object_header(object, &mut header)?;
    let mut body: Vec<u8> = Vec::new();
    write_object_body(object, &mut body)?;
    Ok(ObjectFiles {
        class_name: object.class_name.clone(),
        header: String::from_utf8_lossy(&header).into_owned(),
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn write_banner<W: Write>(file_name: &str, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "//")?;
    writeln!(writer, "//  {file_name}")?;
    writeln!(writer, "//")?;
    writeln!(writer, "//  Generated by manticom.")?;
    writeln!(writer, "//")?;
    writeln!(writer)?;
    Ok(())
}

/// Writes the `@interface` of an object.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_object_header<W: Write>(object: &ObjectDefinition, writer: &mut W) -> std::io::Result<()> {
    let base: &str = if object.is_cached {
        "NSManagedObject"
    } else {
        "NSObject"
    };

    write_banner(&format!("{}.h", object.class_name), writer)?;
    writeln!(writer, "#import <Foundation/Foundation.h>")?;
    let mut imported: BTreeSet<&str> = BTreeSet::new();
    for subclass in &object.subclasses {
        if imported.insert(subclass.target.as_str()) {
            writeln!(writer, "#import \"{}.h\"", titlecase(&subclass.target))?;
        }
    }
    writeln!(writer)?;
    writeln!(writer)?;
    writeln!(writer, "@interface {} : {base}", object.class_name)?;
    writeln!(writer)?;
    for attribute in &object.attrs {
        writeln!(
            writer,
            "@property(nonatomic, retain) {}* {};",
            attribute.runtime_type(),
            safety_name(&attribute.name)
        )?;
    }
    for subclass in &object.subclasses {
        let target: String = titlecase(&subclass.target);
        if subclass.is_array {
            writeln!(
                writer,
                "@property(nonatomic, retain) NSArray* {}; // NSArray containing {target}",
                safety_name(&subclass.field_name)
            )?;
        } else {
            writeln!(
                writer,
                "@property(nonatomic, retain) {target}* {};",
                safety_name(&subclass.field_name)
            )?;
        }
    }
    writeln!(writer)?;
    writeln!(writer, "@end")?;
    Ok(())
}

/// Writes the `@implementation` of an object: `@dynamic` accessors for cached
/// entities, `@synthesize` for transient objects.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_object_body<W: Write>(object: &ObjectDefinition, writer: &mut W) -> std::io::Result<()> {
    let statement: &str = if object.is_cached {
        "@dynamic"
    } else {
        "@synthesize"
    };

    write_banner(&format!("{}.m", object.class_name), writer)?;
    writeln!(writer, "#import \"{}.h\"", object.class_name)?;
    writeln!(writer)?;
    writeln!(writer)?;
    writeln!(writer, "@implementation {}", object.class_name)?;
    writeln!(writer)?;
    let fields = object
        .attrs
        .iter()
        .map(|a| &a.name)
        .chain(object.subclasses.iter().map(|s| &s.field_name));
    for field in fields {
        writeln!(writer, "{statement} {};", safety_name(field))?;
    }
    writeln!(writer)?;
    writeln!(writer, "@end")?;
    Ok(())
}

fn write_attribute_dictionary<W: Write>(
    mapping: &str,
    entries: &[(String, String)],
    writer: &mut W,
) -> std::io::Result<()> {
    if entries.is_empty() {
        return Ok(());
    }
    writeln!(writer, "[{mapping} addAttributeMappingsFromDictionary:@{{")?;
    let lines: Vec<String> = entries
        .iter()
        .map(|(from, to)| format!("    @\"{from}\":@\"{to}\""))
        .collect();
    writeln!(writer, "{}}}];", lines.join(",\n"))?;
    Ok(())
}

/// Writes the mapping from wire keys to properties used for responses.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_response_mapping<W: Write>(object: &ObjectDefinition, writer: &mut W) -> std::io::Result<()> {
    let mapping: String = format!("{}ResponseMapping", object.var_name);
    if object.is_cached {
        writeln!(
            writer,
            "RKEntityMapping* {mapping} = [RKEntityMapping mappingForEntityForName:@\"{}\" inManagedObjectStore:managedObjectStore];",
            object.class_name
        )?;
    } else {
        writeln!(
            writer,
            "RKObjectMapping* {mapping} = [RKObjectMapping mappingForClass:[{} class]];",
            object.class_name
        )?;
    }

    let entries: Vec<(String, String)> = object
        .attrs
        .iter()
        .map(|a| (a.name.clone(), safety_name(&a.name)))
        .collect();
    write_attribute_dictionary(&mapping, &entries, writer)?;

    if let Some(key) = object.primary_key() {
        // Only entity mappings support identification attributes.
        let prefix: &str = if object.is_cached { "" } else { "// " };
        writeln!(
            writer,
            "{prefix}{mapping}.identificationAttributes = @[@\"{}\"];",
            safety_name(&key.name)
        )?;
    }

    for subclass in &object.subclasses {
        writeln!(
            writer,
            "[{mapping} addPropertyMapping:[RKRelationshipMapping relationshipMappingFromKeyPath:@\"{field}\" toKeyPath:@\"{field}\" withMapping:{}ResponseMapping]];",
            subclass.target,
            field = subclass.field_name,
        )?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Writes the mapping from properties to wire keys used for requests.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_request_mapping<W: Write>(object: &ObjectDefinition, writer: &mut W) -> std::io::Result<()> {
    let mapping: String = format!("{}RequestMapping", object.var_name);
    writeln!(writer, "RKObjectMapping* {mapping} = [RKObjectMapping requestMapping];")?;

    let entries: Vec<(String, String)> = object
        .attrs
        .iter()
        .map(|a| (safety_name(&a.name), a.name.clone()))
        .collect();
    write_attribute_dictionary(&mapping, &entries, writer)?;

    for subclass in &object.subclasses {
        writeln!(
            writer,
            "[{mapping} addPropertyMapping:[RKRelationshipMapping relationshipMappingFromKeyPath:@\"{field}\" toKeyPath:@\"{field}\" withMapping:{}RequestMapping]];",
            subclass.target,
            field = subclass.field_name,
        )?;
    }
    writeln!(writer)?;
    Ok(())
}

fn restkit_method(method: Option<HttpMethod>) -> &'static str {
    match method {
        None => "RKRequestMethodAny",
        Some(HttpMethod::Get) => "RKRequestMethodGET",
        Some(HttpMethod::Post) => "RKRequestMethodPOST",
        Some(HttpMethod::Put) => "RKRequestMethodPUT",
        Some(HttpMethod::Patch) => "RKRequestMethodPATCH",
        Some(HttpMethod::Delete) => "RKRequestMethodDELETE",
    }
}

fn quoted_or_nil(value: Option<&str>) -> String {
    value.map_or_else(|| "nil".to_string(), |v| format!("@\"{v}\""))
}

/// Writes every request and response descriptor, grouped by URL, then the
/// manager configuration that registers them.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_descriptors<W: Write>(routes: &CompiledRoutes, writer: &mut W) -> std::io::Result<()> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for url in &routes.urls {
        let path: &str = url.path.as_str();
        if !seen.insert(path) {
            continue;
        }
        let mut first: bool = true;
        for method in HttpMethod::ALL {
            let responses = routes
                .response_descriptors
                .iter()
                .filter(|d| d.path.as_deref() == Some(path) && d.method == Some(method));
            for descriptor in responses {
                if first {
                    writeln!(writer, "\n// Mapping for {path}\n")?;
                    first = false;
                }
                writeln!(
                    writer,
                    "RKResponseDescriptor* {} = [RKResponseDescriptor responseDescriptorWithMapping:{}ResponseMapping method:{} pathPattern:@\"{path}\" keyPath:{} statusCodes:{}];",
                    descriptor.name,
                    descriptor.object,
                    restkit_method(descriptor.method),
                    quoted_or_nil(descriptor.key_path.as_deref()),
                    descriptor.bucket.index_set(),
                )?;
            }
            let requests = routes
                .request_descriptors
                .iter()
                .filter(|d| d.path == path && d.method == method);
            for descriptor in requests {
                if first {
                    writeln!(writer, "\n// Mapping for {path}\n")?;
                    first = false;
                }
                writeln!(
                    writer,
                    "RKRequestDescriptor* {} = [RKRequestDescriptor requestDescriptorWithMapping:{}RequestMapping objectClass:[{} class] rootKeyPath:nil method:{}];",
                    descriptor.name,
                    descriptor.object,
                    titlecase(&descriptor.object),
                    restkit_method(Some(descriptor.method)),
                )?;
            }
        }
    }

    let mut roots = routes
        .response_descriptors
        .iter()
        .filter(|d| d.path.is_none())
        .peekable();
    if roots.peek().is_some() {
        writeln!(writer, "\n// Responses applied to any URL\n")?;
    }
    for descriptor in roots {
        writeln!(
            writer,
            "RKResponseDescriptor* {} = [RKResponseDescriptor responseDescriptorWithMapping:{}ResponseMapping method:{} pathPattern:nil keyPath:{} statusCodes:{}];",
            descriptor.name,
            descriptor.object,
            restkit_method(descriptor.method),
            quoted_or_nil(descriptor.key_path.as_deref()),
            descriptor.bucket.index_set(),
        )?;
    }

    let request_names: Vec<&str> = routes
        .request_descriptors
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    let response_names: Vec<&str> = routes
        .response_descriptors
        .iter()
        .map(|d| d.name.as_str())
        .collect();

    writeln!(writer)?;
    writeln!(writer, "// Configure RestKit to handle requests and responses")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "NSString* strBase = [NSString stringWithFormat:@\"%@%@\", BASE_URL, API_URL];"
    )?;
    writeln!(writer, "NSURL* url = [NSURL URLWithString:strBase];")?;
    writeln!(writer, "RKObjectManager* manager = [RKObjectManager managerWithBaseURL:url];")?;
    writeln!(writer, "manager.requestSerializationMIMEType = RKMIMETypeJSON;")?;
    writeln!(writer, "manager.managedObjectStore = managedObjectStore;")?;
    writeln!(
        writer,
        "[manager addRequestDescriptorsFromArray:@[{}]];",
        request_names.join(", ")
    )?;
    writeln!(
        writer,
        "[manager addResponseDescriptorsFromArray:@[{}]];",
        response_names.join(", ")
    )?;
    writeln!(writer)?;
    Ok(())
}

/// Selector prefix up to and including `With`.
fn selector_base(url: &CompiledUrl, method: &CompiledMethod) -> String {
    let camel: String = underscore_to_camel(&url.path);
    match method.accessor {
        Accessor::Read => format!("getAll{camel}With"),
        Accessor::Delete => format!("delete{camel}With"),
        Accessor::Write { .. } => format!("{}{camel}With", method.method.key()),
    }
}

fn write_signature<W: Write>(
    url: &CompiledUrl,
    method: &CompiledMethod,
    writer: &mut W,
) -> std::io::Result<()> {
    write!(writer, "-(void) {}", selector_base(url, method))?;
    for (i, argument) in method.arguments.iter().enumerate() {
        write!(
            writer,
            "{}:({}*){} ",
            parameter_name(&argument.name, i == 0),
            argument.type_name,
            safety_name(&argument.name)
        )?;
    }
    let label: &str = if method.arguments.is_empty() {
        "Success"
    } else {
        "success"
    };
    write!(writer, "{label}{BLOCK_SIGNATURE}")?;
    Ok(())
}

/// Builds `paramDict` from the non-nil parameters and returns the expression
/// to pass as `parameters:`.
fn write_parameter_dictionary<W: Write>(
    parameters: &[Argument],
    writer: &mut W,
) -> std::io::Result<&'static str> {
    if parameters.is_empty() {
        return Ok("nil");
    }
    writeln!(
        writer,
        "NSMutableDictionary* paramDict = [NSMutableDictionary dictionaryWithCapacity:{}];",
        parameters.len()
    )?;
    for parameter in parameters {
        let local: String = safety_name(&parameter.name);
        writeln!(writer, "if ({local}) {{")?;
        writeln!(writer, "[paramDict setObject:{local} forKey:@\"{}\"];", parameter.name)?;
        writeln!(writer, "}}")?;
    }
    Ok("paramDict")
}

/// Writes the authorization preamble of an accessor.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_auth<W: Write>(auth: AuthScheme, writer: &mut W) -> std::io::Result<()> {
    let (guard, call): (&str, &str) = match auth.kind {
        AuthKind::None => {
            writeln!(writer, "{CLEAR_AUTHORIZATION}")?;
            return Ok(());
        }
        AuthKind::Basic => (
            "[AppModel sharedModel].user && [AppModel sharedModel].user.username && [AppModel sharedModel].password",
            "[sharedMgr.HTTPClient setAuthorizationHeaderWithUsername:[AppModel sharedModel].user.username password:[AppModel sharedModel].password];",
        ),
        AuthKind::OAuth => (
            "[AppModel sharedModel].apikey",
            "[sharedMgr.HTTPClient setAuthorizationHeaderWithToken:[AppModel sharedModel].apikey];",
        ),
        AuthKind::TastyPie => (
            "[AppModel sharedModel].user && [AppModel sharedModel].user.username && [AppModel sharedModel].apikey",
            "[sharedMgr.HTTPClient setAuthorizationHeaderWithTastyPieUsername:[AppModel sharedModel].user.username andToken:[AppModel sharedModel].apikey];",
        ),
    };

    if auth.optional {
        writeln!(writer, "if ({guard}) {{")?;
        writeln!(writer, "{call}")?;
        writeln!(writer, "}} else {{")?;
        writeln!(writer, "{CLEAR_AUTHORIZATION}")?;
        writeln!(writer, "}}")?;
    } else {
        writeln!(writer, "{call}")?;
    }
    Ok(())
}

/// Writes the `fullUrl` line when needed and returns the path expression.
fn write_path<W: Write>(target: &PathTarget, writer: &mut W) -> std::io::Result<String> {
    match target {
        PathTarget::Literal(path) => Ok(format!("@\"{path}\"")),
        PathTarget::WithPrimaryKey { prefix, key } => {
            writeln!(
                writer,
                "NSString* fullUrl = [NSString stringWithFormat:@\"{prefix}/%@/\", {}];",
                safety_name(key)
            )?;
            Ok("fullUrl".to_string())
        }
    }
}

/// Writes the accessor declaration for the data-model header, preceded by the
/// method's doc comment.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_method_declaration<W: Write>(
    url: &CompiledUrl,
    method: &CompiledMethod,
    writer: &mut W,
) -> std::io::Result<()> {
    if let Some(doc) = &method.doc {
        writeln!(writer, "// {doc}")?;
    }
    write_signature(url, method, writer)?;
    writeln!(writer, ";")?;
    writeln!(writer)?;
    Ok(())
}

/// Writes the accessor definition for the data-model body.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_method_definition<W: Write>(
    url: &CompiledUrl,
    method: &CompiledMethod,
    writer: &mut W,
) -> std::io::Result<()> {
    write_signature(url, method, writer)?;
    writeln!(writer, " {{")?;
    writeln!(writer, "RKObjectManager* sharedMgr = [RKObjectManager sharedManager];")?;

    if let Accessor::Write { class_name, fields } = &method.accessor {
        writeln!(writer, "{class_name}* obj = [{class_name} new];")?;
        for field in fields {
            let local: String = safety_name(field);
            writeln!(writer, "obj.{local} = {local};")?;
        }
        writeln!(writer)?;
    }

    let parameters: &str = write_parameter_dictionary(&method.parameters, writer)?;
    write_auth(method.auth, writer)?;
    let path: String = write_path(&method.target, writer)?;

    match &method.accessor {
        Accessor::Read => writeln!(
            writer,
            "[sharedMgr getObjectsAtPath:{path} parameters:{parameters} success:success failure:failure];"
        )?,
        Accessor::Delete => writeln!(
            writer,
            "[sharedMgr deleteObject:nil path:{path} parameters:{parameters} success:success failure:failure];"
        )?,
        Accessor::Write { .. } => {
            writeln!(
                writer,
                "[sharedMgr {}Object:obj path:{path} parameters:{parameters} success:^(RKObjectRequestOperation *operation, RKMappingResult *mappingResult) {{",
                method.method.key()
            )?;
            writeln!(writer, "    success(operation, mappingResult); }}")?;
            writeln!(writer, "    failure:failure];")?;
        }
    }
    writeln!(writer, "}}")?;
    writeln!(writer)?;
    Ok(())
}

/// The aggregate `MachineDataModel` pair: mappings for the request and
/// response closures, descriptors, and one accessor per compiled method.
#[derive(Debug, Clone, Copy)]
pub struct DataModel<'a> {
    pub graph: &'a ObjectGraph,
    pub routes: &'a CompiledRoutes,
    pub requests: &'a Closure,
    pub responses: &'a Closure,
}

impl DataModel<'_> {
    /// Writes `MachineDataModel.h`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `writer` fails.
    pub fn write_header<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        write_banner("MachineDataModel.h", writer)?;
        writeln!(writer, "#import <Foundation/Foundation.h>")?;
        writeln!(writer, "#import <RestKit/RestKit.h>")?;
        writeln!(writer)?;
        writeln!(writer, "@interface MachineDataModel : NSObject")?;
        writeln!(writer)?;
        writeln!(writer, "+ (MachineDataModel*)sharedModel;")?;
        writeln!(writer)?;
        writeln!(writer, "+ (BOOL)isDefined: (id) object;")?;
        writeln!(writer)?;
        writeln!(writer, "-(void)setupMapping;")?;

        for url in &self.routes.urls {
            writeln!(writer, "\n// Operations for `{}`", url.path)?;
            if let Some(doc) = &url.doc {
                writeln!(writer, "// {doc}")?;
            }
            writeln!(writer)?;
            for method in &url.methods {
                write_method_declaration(url, method, writer)?;
            }
        }

        writeln!(writer, "@end")?;
        Ok(())
    }

    /// Writes `MachineDataModel.m`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `writer` fails.
    pub fn write_body<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        write_banner("MachineDataModel.m", writer)?;
        writeln!(writer, "#import \"MachineDataModel.h\"")?;
        writeln!(writer)?;
        writeln!(writer, "#import <RestKit/RestKit.h>")?;
        writeln!(
            writer,
            "#import <AFNetworking-TastyPie/AFNetworking+ApiKeyAuthentication.h>"
        )?;
        writeln!(writer)?;
        writeln!(writer, "#import \"AppModel.h\"")?;
        writeln!(writer)?;
        for object in self.requests.union(self.responses).objects(self.graph) {
            writeln!(writer, "#import \"{}.h\"", object.class_name)?;
        }
        writeln!(writer)?;
        writeln!(writer, "@implementation MachineDataModel")?;
        writeln!(writer)?;
        writeln!(writer, "+ (MachineDataModel*)sharedModel {{")?;
        writeln!(writer, "  static MachineDataModel *sharedModel = nil;")?;
        writeln!(writer, "  static dispatch_once_t onceToken;")?;
        writeln!(writer, "  dispatch_once(&onceToken, ^{{")?;
        writeln!(writer, "    sharedModel = [[self alloc] init];")?;
        writeln!(writer, "  }});")?;
        writeln!(writer, "  return sharedModel;")?;
        writeln!(writer, "}}")?;
        writeln!(writer)?;
        writeln!(writer, "+(BOOL) isDefined: (id) object {{")?;
        writeln!(writer, "  return object != nil && object != [NSNull null];")?;
        writeln!(writer, "}}")?;
        writeln!(writer)?;
        writeln!(writer, "#pragma mark -")?;
        writeln!(writer, "#pragma mark Machine Mappings")?;
        writeln!(writer)?;
        self.write_setup_mapping(writer)?;

        for url in &self.routes.urls {
            writeln!(writer, "\n// Operations for `{}`\n", url.path)?;
            for method in &url.methods {
                write_method_definition(url, method, writer)?;
            }
        }

        writeln!(writer)?;
        writeln!(writer, "@end")?;
        Ok(())
    }

    fn write_setup_mapping<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "-(void)setupMapping {{")?;
        writeln!(
            writer,
            "NSIndexSet *successCodes = RKStatusCodeIndexSetForClass(RKStatusCodeClassSuccessful);"
        )?;
        writeln!(
            writer,
            "NSIndexSet *failCodes = RKStatusCodeIndexSetForClass(RKStatusCodeClassClientError);"
        )?;
        writeln!(
            writer,
            "NSIndexSet *serverFailCodes = RKStatusCodeIndexSetForClass(RKStatusCodeClassServerError);"
        )?;
        writeln!(
            writer,
            "NSIndexSet *redirectCodes = RKStatusCodeIndexSetForClass(RKStatusCodeClassRedirection);"
        )?;
        writeln!(writer)?;
        writeln!(writer, "// managed object manager")?;
        writeln!(writer, "NSError* error = nil;")?;
        writeln!(
            writer,
            "NSManagedObjectModel *managedObjectModel = [NSManagedObjectModel mergedModelFromBundles:nil];"
        )?;
        writeln!(
            writer,
            "RKManagedObjectStore *managedObjectStore = [[RKManagedObjectStore alloc] initWithManagedObjectModel:managedObjectModel];"
        )?;
        writeln!(
            writer,
            "BOOL success = RKEnsureDirectoryExistsAtPath(RKApplicationDataDirectory(), &error);"
        )?;
        writeln!(writer, "if (! success) {{")?;
        writeln!(
            writer,
            "    RKLogError(@\"Failed to create Application Data Directory at path '%@': %@\", RKApplicationDataDirectory(), error);"
        )?;
        writeln!(writer, "}}")?;
        writeln!(
            writer,
            "NSString *path = [RKApplicationDataDirectory() stringByAppendingPathComponent:DATABASE_FILE];"
        )?;
        writeln!(
            writer,
            "NSPersistentStore *persistentStore = [managedObjectStore addSQLitePersistentStoreAtPath:path fromSeedDatabaseAtPath:nil withConfiguration:nil options:nil error:&error];"
        )?;
        writeln!(writer, "if (! persistentStore) {{")?;
        writeln!(
            writer,
            "    RKLogError(@\"Failed adding persistent store at path '%@': %@\", path, error);"
        )?;
        writeln!(writer, "}}")?;
        writeln!(writer, "[managedObjectStore createManagedObjectContexts];")?;
        writeln!(writer)?;
        writeln!(writer, "// RestKit object mappings")?;
        writeln!(writer)?;

        for object in self.requests.objects(self.graph) {
            write_request_mapping(object, writer)?;
        }
        for object in self.responses.objects(self.graph) {
            write_response_mapping(object, writer)?;
        }
        write_descriptors(self.routes, writer)?;
        writeln!(writer, "}}")?;
        Ok(())
    }
}
