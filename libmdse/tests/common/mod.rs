//
// tests/common/mod.rs
// The MDSE REST Compiler
//

#![deny(missing_debug_implementations, missing_copy_implementations,
        trivial_casts, trivial_numeric_casts,
        unsafe_code,
        unstable_features,
        unused_import_braces, unused_qualifications)]
#![allow(dead_code)]

use regex::Regex;
use mdse::error::Error;
use mdse::util::{ Location, Range };


/// The running example: an online shop with a fully-featured resource,
/// a partial one, and one that declares an operation nobody understands.
pub const TIENDA_ONLINE: &str = r#"
# Requirements of the online shop
api TiendaOnline {
    resource Producto {
        operations : list, get, create, update, delete
        fields {
            nombre     : Text
            precio     : Number
            stock      : Number
            disponible : Bool
        }
    }

    resource Cliente {
        operations : list, get, create
        fields {
            nombre : Text
            email  : Text
            edad   : Number
        }
    }

    resource Pedido {
        operations : list, get, create, update, delete, archive
        fields {
            numero : Number
            total  : Number
            estado : Text
            fecha  : Date
        }
    }
}
"#;

#[derive(Debug)]
pub struct InvalidTestCase {
    pub source:  &'static str,
    pub marker:  &'static str,
    pub message: &'static str,
}

impl InvalidTestCase {
    #[allow(non_upper_case_globals)]
    pub fn error_range(&self) -> Range {
        lazy_static! {
            static ref regex: Regex = Regex::new(r"^ *(\^_*\^) *$").unwrap();
        }

        let m = regex.captures(self.marker).unwrap().get(1).unwrap();
        let start_index = 1 + m.start();
        let end_index = 1 + m.end() - 1;

        oneline_range(0, start_index..end_index)
    }
}

pub fn oneline_range(src_idx: usize, char_range: std::ops::Range<usize>) -> Range {
    Range {
        start: Location { src_idx, line: 1, column: char_range.start },
        end:   Location { src_idx, line: 1, column: char_range.end   },
    }
}

/// Splits an error into its message and range, for comparison against
/// an `InvalidTestCase`. Errors without a range are a test failure.
pub fn message_and_range(error: Error) -> (String, Range) {
    match error {
        Error::Syntax { message, range } => (message, range),
        Error::Semantic { message, range: Some(range) } => (message, range),
        other => panic!("Expected an error with a source range, got: {}", other),
    }
}
