//
// codegen/fastapi/routes.rs
// The MDSE REST Compiler
//

//! The FastAPI application: in-memory collections and route handlers.

use std::fmt::Write;
use heck::ToSnakeCase;
use crate::error::Result;
use crate::psm::*;
use crate::lexer::quote;
use crate::naming;
use crate::codegen::CodegenParams;
use super::{ write_banner, check_identifiers, check_route };


/// Name of the handler argument that receives the request body.
const BODY_ARG: &str = "data";

/// Renders the service module, with one handler per route of `psm`.
pub fn emit_main(psm: &PsmModel, params: &CodegenParams) -> Result<String> {
    check_identifiers(psm)?;

    // Resolve every route up front, so that nothing is rendered for an
    // inconsistent model.
    let resolved = psm.routes.iter().map(
        |route| check_route(psm, route).map(|schema| (route, schema))
    ).collect::<Result<Vec<_>>>()?;

    let mut out = String::new();
    let run_note = format!("  uvicorn {}:app --reload", params.service_module);

    write_banner(&mut out, "FASTAPI APPLICATION", psm, &[
        "To run:",
        "  pip install fastapi uvicorn",
        &run_note,
    ])?;

    writeln!(out, "from fastapi import FastAPI, HTTPException")?;
    writeln!(out, "from typing import List")?;

    let mut schema_names: Vec<_> = psm.schemas.iter().map(|schema| schema.name.as_str()).collect();
    schema_names.sort();

    if !schema_names.is_empty() {
        writeln!(out, "from {} import {}", params.schemas_module, schema_names.join(", "))?;
    }

    writeln!(out)?;
    writeln!(out, "app = FastAPI(title={}, version={})", quote(&psm.name), quote(&params.api_version))?;

    if !psm.schemas.is_empty() {
        writeln!(out)?;
        writeln!(out, "# In-memory storage")?;

        for schema in &psm.schemas {
            writeln!(out, "{}: List[{}] = []", naming::collection_name(&schema.name), schema.name)?;
        }
    }

    for (route, schema) in resolved {
        write_route(&mut out, route, schema)?;
    }

    Ok(out)
}

fn handler_name(route: &RouteDecl) -> String {
    format!("{} {}", route.method.name(), route.path).to_snake_case()
}

fn write_route(out: &mut String, route: &RouteDecl, schema: &SchemaDecl) -> Result<()> {
    writeln!(out)?;
    writeln!(out)?;

    write!(
        out,
        "@app.{}({}, response_model={}",
        route.method.name().to_lowercase(),
        quote(&route.path),
        route.response,
    )?;

    if route.status != 200 {
        write!(out, ", status_code={}", route.status)?;
    }

    writeln!(out, ")")?;

    let mut args = Vec::with_capacity(2);

    if let Some(ref param) = route.path_param {
        args.push(format!("{}: {}", param.name, param.ty));
    }

    if let Some(ref body) = route.body {
        args.push(format!("{}: {}", BODY_ARG, body));
    }

    writeln!(out, "def {}({}):", handler_name(route), args.join(", "))?;
    writeln!(out, "    \"\"{}\"\"", quote(&route.summary))?;

    write_handler_body(out, route, schema)
}

fn write_handler_body(out: &mut String, route: &RouteDecl, schema: &SchemaDecl) -> Result<()> {
    let db = naming::collection_name(&schema.name);
    let not_found = quote(&format!("{} not found", schema.name));
    let id = route.path_param.as_ref().map(|param| param.name.as_str());

    match (route.method, id) {
        (HttpMethod::Get, None) => {
            writeln!(out, "    return {}", db)?;
        },
        (HttpMethod::Get, Some(id)) => match schema.identity {
            Identity::Positional => {
                write_bounds_check(out, id, &db, &not_found)?;
                writeln!(out, "    return {}[{}]", db, id)?;
            },
            Identity::Field(ref key) => {
                writeln!(out, "    item = next((x for x in {} if x.{} == {}), None)", db, key, id)?;
                writeln!(out, "    if item is None:")?;
                writeln!(out, "        raise HTTPException(status_code=404, detail={})", not_found)?;
                writeln!(out, "    return item")?;
            },
        },
        (HttpMethod::Post, _) => {
            writeln!(out, "    {}.append({})", db, BODY_ARG)?;
            writeln!(out, "    return {}", BODY_ARG)?;
        },
        (HttpMethod::Put, Some(id)) => {
            write_bounds_check(out, id, &db, &not_found)?;
            writeln!(out, "    {}[{}] = {}", db, id, BODY_ARG)?;
            writeln!(out, "    return {}", BODY_ARG)?;
        },
        (HttpMethod::Delete, Some(id)) => {
            let message = quote(&format!("{} deleted successfully", schema.name));
            write_bounds_check(out, id, &db, &not_found)?;
            writeln!(out, "    {}.pop({})", db, id)?;
            writeln!(out, "    return {{\"message\": {}}}", message)?;
        },
        (method, None) => bug!("{} route {} was not validated", method, route.path),
    }

    Ok(())
}

fn write_bounds_check(out: &mut String, id: &str, db: &str, not_found: &str) -> Result<()> {
    writeln!(out, "    if {id} < 0 or {id} >= len({db}):", id = id, db = db)?;
    writeln!(out, "        raise HTTPException(status_code=404, detail={})", not_found)?;
    Ok(())
}
