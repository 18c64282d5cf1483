//
// codegen/mod.rs
// The MDSE REST Compiler
//

//! CodeGen, the backend of the compiler. This is the model-to-text
//! stage that turns a platform-specific model into the source files
//! of a runnable service for the platform the model targets.

mod fastapi;

use std::io;
use std::rc::Rc;
use std::cell::RefCell;
use crate::error::Result;
use crate::psm::{ PsmModel, Platform };

pub use self::fastapi::{ emit_schemas, emit_main };


/// A bunch of centralized settings governing the behavior of CodeGen.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CodegenParams {
    /// The version string the generated service reports about itself.
    pub api_version: String,
    /// The name of the module holding the generated schemas, without
    /// extension. The service module imports the schemas from here.
    pub schemas_module: String,
    /// The name of the generated service module, without extension.
    pub service_module: String,
}

impl Default for CodegenParams {
    fn default() -> Self {
        CodegenParams {
            api_version: "1.0.0".to_owned(),
            schemas_module: "schemas".to_owned(),
            service_module: "main".to_owned(),
        }
    }
}

/// Functions of this type are expected to yield an `io::Write` that
/// CodeGen can write to. The string parameter is the file name of the
/// artifact, e.g. `schemas.py`. The provider may borrow its state,
/// e.g. a registry of opened files, for the lifetime `'a`.
pub type WriterProvider<'a> = dyn FnMut(&str) -> Result<Rc<RefCell<dyn io::Write>>> + 'a;


/// Given the PSM of a service, and some configuration parameters,
/// generates the source code of the service and writes each file
/// into an `io::Write` obtained from `wp`.
///
/// # Arguments:
///
/// * `psm`: the platform-specific model of the service.
/// * `params`: code generation parameters; see the docs for `CodegenParams`.
/// * `wp`: a provider of `io::Write`s that will accumulate generated code.
///
/// # Return value:
///
/// * `Ok(())`, if code generation completed successfully.
/// * `Err(Error)`, if an error occurred. This is typically an I/O error
///   (`Error::IO`) or an `Error::Semantic` caused by a route that refers
///   to a schema the model does not declare.
///
/// Nothing is written unless every artifact could be generated.
pub fn generate_code(psm: &PsmModel, params: &CodegenParams, wp: &mut WriterProvider<'_>) -> Result<()> {
    match psm.platform {
        Platform::FastApi => fastapi::generate_code(psm, params, wp),
    }
}

/// Writes a complete artifact and flushes it.
fn write_artifact(wp: &mut WriterProvider<'_>, name: &str, text: &str) -> Result<()> {
    let rc = wp(name)?;
    let mut wr = rc.try_borrow_mut().map_err(
        |error| unreachable_error!(format!("writer of {} is already in use: {}", name, error))
    )?;

    wr.write_all(text.as_bytes())?;
    wr.flush().map_err(From::from)
}
