//
// error.rs
// The MDSE REST Compiler
//

//! This module defines types for representing possible errors
//! that may be generated while compiling requirements, PIM, or
//! PSM sources. It also provides macros for reporting internal
//! errors in a way that is consistent across modules.

use std::io;
use std::fmt;
use std::result;
use crate::util::{ Diagnostic, DiagnosticKind, Range };


/// Internal helper for macros `bug!()` and `lazy_bug!()`.
macro_rules! unreachable_error {
    ($msg: expr) => {
        $crate::error::Error::Unreachable {
            message: $msg,
            file: file!(),
            line: line!() as usize,
        }
    }
}

/// Indicates a compiler error. Makes the current function return
/// an `Error::Unreachable`. This is basically a non-panicking
/// substitute for the standard `unreachable!()` macro.
macro_rules! bug {
    ($msg: expr) => {
        return Err(unreachable_error!($msg.to_owned()))
    };
    ($fmt: expr, $($args: tt)*) => {
        return Err(unreachable_error!(format!($fmt, $($args)*)))
    };
}

/// Similar to `bug!()`, but it yields a closure that returns an
/// `Error::Unreachable`. Useful with `Option::ok_or_else()`.
macro_rules! lazy_bug {
    ($msg: expr) => {
        || unreachable_error!($msg.to_owned())
    };
    ($fmt: expr, $($args: tt)*) => {
        || unreachable_error!(format!($fmt, $($args)*))
    };
}


/// An error that may occur while compiling a model. This can be
/// either a user-induced error (e.g. a syntax error in a requirements
/// file), or an Internal Compiler Error (abbreviated ICE), i.e. a bug.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error, probably coming from the OS.
    #[error("I/O error: {0}")]
    IO(#[from] io::Error),
    /// Writing generated text into an in-memory buffer failed.
    #[error("Formatting error: {0}")]
    Fmt(#[from] fmt::Error),
    /// Some unreachable code was reached as a result of a bug. ICE.
    #[error("Internal Compiler Error: Reached unreachable code: {message}, in file {file}, line {line}. This is a bug.")]
    Unreachable {
        /// Description of the bug.
        message: String,
        /// Source file inside the compiler that caused the bug.
        file: &'static str,
        /// Source line index within the offending file.
        line: usize,
    },
    /// The source text does not conform to its grammar.
    #[error("Syntax Error: {message}")]
    Syntax {
        /// Description of the syntax error.
        message: String,
        /// The human-readable source range associated with the error.
        range: Range,
    },
    /// The source is well-formed but does not make sense, e.g. a
    /// route refers to a resource that has no schema.
    #[error("Semantic Error: {message}")]
    Semantic {
        /// Description of the semantic error.
        message: String,
        /// If available, the human-readable source range associated
        /// with the error. Errors found after parsing carry `None`.
        range: Option<Range>,
    },
}

/// Convenience type alias for expressing `Result`s of compiler `Error`s.
pub type Result<T> = result::Result<T, Error>;


impl Error {
    /// Writes an error object as a nicely-formatted, user-readable
    /// error message, including source file names and locations.
    ///
    /// # Arguments:
    ///
    /// * `wr`: the `io::Write` that the error will be printed to.
    /// * `sources`: the name of each source component (e.g. file),
    ///   indexed by `Location::src_idx`.
    pub fn pretty_print<P: AsRef<str>>(&self, wr: &mut dyn io::Write, sources: &[P]) -> io::Result<()> {
        let range = match *self {
            Error::IO(_)                  => None,
            Error::Fmt(_)                 => None,
            Error::Unreachable { .. }     => None,
            Error::Syntax   { range, .. } => Some(range),
            Error::Semantic { range, .. } => range,
        };
        let source = range.and_then(|r| sources.get(r.start.src_idx));

        match (range, source) {
            (Some(r), Some(name)) => write!(
                wr,
                "\n\n    In file {}, near {}:\n",
                Diagnostic::new(name.as_ref(), DiagnosticKind::Highlight),
                Diagnostic::new(r, DiagnosticKind::Highlight),
            )?,
            _ => write!(wr, "\n\n")?,
        }

        write!(wr, "        {}\n\n", Diagnostic::new(self, DiagnosticKind::Error))
    }
}
