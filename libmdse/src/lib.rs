//
// lib.rs
// The MDSE REST Compiler
//

//! This library provides the programmatic interface for the MDSE REST
//! Compiler, a model-driven generator that turns a terse description of
//! resources into a runnable REST service. The compilation pipeline goes
//! through three models, each of which has its own textual grammar, so a
//! run can be started, inspected, or resumed at any stage:
//!
//! * `lexer` tokenizes the sources of every model.
//! * `parser` turns tokens into one of the models below.
//! * `reqir`, the requirements model: resources, their operations and
//!   abstractly-typed fields.
//! * `pimgen` lowers requirements into…
//! * `pim`, the Platform-Independent Model: model classes and HTTP endpoints.
//! * `psmgen` specializes the PIM for a service framework, yielding…
//! * `psm`, the Platform-Specific Model: schemas with concrete types, and
//!   routes with status codes and resource-qualified path parameters.
//! * `codegen`, the back-end that generates the source code of the service.
//! * `rules` holds the static tables that drive each lowering stage.
//! * `naming` derives collection, path and parameter names from resources.
//! * `util` contains miscellaneous helper types and functions.
//! * `error` contains type definitions for uniformly describing syntactic,
//!   semantic, and internal compiler errors.

#![crate_name="mdse"]
#![crate_type="rlib"]
#![deny(missing_debug_implementations, missing_copy_implementations,
        trivial_casts, trivial_numeric_casts,
        unsafe_code,
        unstable_features,
        unused_import_braces, unused_qualifications, missing_docs)]

pub mod util;
#[macro_use]
pub mod error;
pub mod lexer;
pub mod naming;
pub mod reqir;
pub mod pim;
pub mod psm;
pub mod rules;
pub mod parser;
pub mod pimgen;
pub mod psmgen;
pub mod codegen;
