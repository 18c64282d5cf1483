//
// codegen/fastapi/schemas.rs
// The MDSE REST Compiler
//

//! Pydantic models, one per schema.

use std::fmt::Write;
use crate::error::Result;
use crate::psm::*;
use crate::rules;
use crate::util::grapheme_count;
use crate::codegen::CodegenParams;
use super::{ write_banner, check_identifiers };


/// Column at which the type annotation of a field starts.
const FIELD_COLUMN: usize = 14;

/// Renders the Pydantic models of every schema in `psm`.
pub fn emit_schemas(psm: &PsmModel, _params: &CodegenParams) -> Result<String> {
    check_identifiers(psm)?;

    let mut out = String::new();

    write_banner(&mut out, "PYDANTIC SCHEMAS", psm, &[])?;

    writeln!(out, "from pydantic import BaseModel")?;

    if uses_datetime(psm) {
        writeln!(out, "from datetime import datetime")?;
    }

    for schema in &psm.schemas {
        write_schema(&mut out, schema)?;
    }

    Ok(out)
}

fn uses_datetime(psm: &PsmModel) -> bool {
    psm.schemas.iter().flat_map(|schema| &schema.fields).any(
        |field| field.ty == ConcreteType::DateTime
    )
}

fn write_schema(out: &mut String, schema: &SchemaDecl) -> Result<()> {
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "class {}(BaseModel):", schema.name)?;

    if schema.fields.is_empty() {
        writeln!(out, "    pass")?;
        return Ok(())
    }

    for field in &schema.fields {
        let pad = FIELD_COLUMN.saturating_sub(grapheme_count(&field.name)).max(1);
        writeln!(out, "    {}{:pad$}: {}", field.name, "", field.ty, pad = pad)?;
    }

    writeln!(out)?;
    writeln!(out, "    class Config:")?;
    writeln!(out, "        json_schema_extra = {{")?;
    writeln!(out, "            \"example\": {{")?;

    for field in &schema.fields {
        writeln!(out, "                \"{}\": {},", field.name, rules::example_value(&field.name, field.ty))?;
    }

    writeln!(out, "            }}")?;
    writeln!(out, "        }}")?;

    Ok(())
}
