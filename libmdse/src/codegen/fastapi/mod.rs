//
// codegen/fastapi/mod.rs
// The MDSE REST Compiler
//

//! The FastAPI backend: Pydantic models for the schemas, and a FastAPI
//! application with in-memory collections for the routes.

mod schemas;
mod routes;

use std::fmt::Write;
use crate::error::{ Error, Result };
use crate::psm::*;
use crate::naming;
use crate::codegen::{ CodegenParams, WriterProvider, write_artifact };

pub use self::schemas::emit_schemas;
pub use self::routes::emit_main;


const RULE: &str = "# ==========================================================";

/// Words that cannot name a Python class, attribute or variable.
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await",
    "break", "class", "continue", "def", "del", "elif", "else", "except",
    "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Names the generated modules import; a schema must not shadow them.
const IMPORTED_NAMES: &[&str] = &[
    "BaseModel", "FastAPI", "HTTPException", "List", "datetime",
];

/// Renders both Python modules, then writes them through `wp`.
pub fn generate_code(psm: &PsmModel, params: &CodegenParams, wp: &mut WriterProvider<'_>) -> Result<()> {
    // Render everything first, so that an invalid model leaves no files behind
    let schemas = emit_schemas(psm, params)?;
    let service = emit_main(psm, params)?;

    write_artifact(wp, &format!("{}.py", params.schemas_module), &schemas)?;
    write_artifact(wp, &format!("{}.py", params.service_module), &service)
}

/// Writes the "generated, do not edit" banner of a file.
fn write_banner(out: &mut String, title: &str, psm: &PsmModel, notes: &[&str]) -> Result<()> {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "# {} - GENERATED AUTOMATICALLY", title)?;
    writeln!(out, "# Source: psm {} {}  |  DO NOT EDIT", psm.platform, psm.name)?;
    writeln!(out, "{}", RULE)?;

    if !notes.is_empty() {
        for note in notes {
            writeln!(out, "# {}", note)?;
        }

        writeln!(out, "{}", RULE)?;
    }

    writeln!(out).map_err(From::from)
}

/// Checks that every schema and field name can be used verbatim as a
/// Python identifier in the generated modules.
fn check_identifiers(psm: &PsmModel) -> Result<()> {
    for schema in &psm.schemas {
        if PYTHON_KEYWORDS.contains(&schema.name.as_str()) {
            return Err(identifier_error(format!(
                "Schema '{}' is a reserved word in Python", schema.name
            )))
        }

        if IMPORTED_NAMES.contains(&schema.name.as_str()) {
            return Err(identifier_error(format!(
                "Schema '{}' would shadow a name imported by the service", schema.name
            )))
        }

        if let Some(field) = schema.fields.iter().find(|f| PYTHON_KEYWORDS.contains(&f.name.as_str())) {
            return Err(identifier_error(format!(
                "Field '{}' of schema '{}' is a reserved word in Python", field.name, schema.name
            )))
        }
    }

    Ok(())
}

fn identifier_error(message: String) -> Error {
    Error::Semantic { message, range: None }
}

/// Finds the schema a route operates on, based on its path.
fn route_schema<'a>(psm: &'a PsmModel, route: &RouteDecl) -> Result<&'a SchemaDecl> {
    let names = psm.schemas.iter().map(|schema| schema.name.as_str());

    naming::resolve_resource(&route.path, names)
        .and_then(|name| psm.schema(name))
        .ok_or_else(|| Error::Semantic {
            message: format!(
                "Route {} {} refers to resource '{}', which has no schema",
                route.method,
                route.path,
                naming::infer_resource(&route.path),
            ),
            range: None,
        })
}

/// Checks that the body and response of a route use declared schemas,
/// that it has the parameters its method needs, and returns the schema
/// of the resource it operates on.
fn check_route<'a>(psm: &'a PsmModel, route: &RouteDecl) -> Result<&'a SchemaDecl> {
    let needs_param = route.method != HttpMethod::Post && route.method != HttpMethod::Get;
    let needs_body = route.method.has_body();

    if needs_param && route.path_param.is_none() {
        return Err(semantic_error(route, "has no path parameter"))
    }

    if needs_body && route.body.is_none() {
        return Err(semantic_error(route, "has no body"))
    }

    let mut referenced = route.body.iter().chain(match route.response {
        PsmResponse::Entity(ref name) | PsmResponse::List(ref name) => Some(name),
        PsmResponse::Map => None,
    });

    if let Some(name) = referenced.find(|name| psm.schema(name).is_none()) {
        return Err(semantic_error(route, &format!("uses undeclared schema '{}'", name)))
    }

    route_schema(psm, route)
}

fn semantic_error(route: &RouteDecl, problem: &str) -> Error {
    Error::Semantic {
        message: format!("Route {} {} {}", route.method, route.path, problem),
        range: None,
    }
}
