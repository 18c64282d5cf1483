//
// tests/parser.rs
// The MDSE REST Compiler
//

#![cfg(test)]
#![deny(missing_debug_implementations, missing_copy_implementations,
        trivial_casts, trivial_numeric_casts,
        unsafe_code,
        unstable_features,
        unused_import_braces, unused_qualifications)]

#[macro_use]
extern crate lazy_static;

mod common;

use mdse::lexer;
use mdse::parser::*;
use mdse::reqir::*;
use mdse::pim::*;
use mdse::psm::*;
use mdse::error::*;
use mdse::util::{ Location, Range };
use common::*;


fn test_invalid_cases<T, F>(test_cases: &[InvalidTestCase], parse: F)
    where T: std::fmt::Debug,
          F: Fn(&str) -> Result<T> {

    for case in test_cases {
        let error = match parse(case.source) {
            Ok(model) => panic!("Invalid source was accepted: {}\n{:#?}", case.source, model),
            Err(error) => error,
        };
        let (message, range) = message_and_range(error);

        assert_eq!(message, case.message, "source: {}", case.source);
        assert_eq!(range, case.error_range(), "source: {}", case.source);
    }
}

//
// Requirements
//

#[test]
fn requirements_of_online_shop() {
    let req = requirements_from_str(TIENDA_ONLINE).unwrap();

    assert_eq!(req.name, "TiendaOnline");
    assert_eq!(
        req.resources.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        vec!["Producto", "Cliente", "Pedido"]
    );

    let producto = &req.resources[0];

    assert_eq!(producto.operations, vec!["list", "get", "create", "update", "delete"]);
    assert_eq!(producto.fields, vec![
        FieldDecl { name: "nombre".to_owned(),     ty: AbstractType::Text   },
        FieldDecl { name: "precio".to_owned(),     ty: AbstractType::Number },
        FieldDecl { name: "stock".to_owned(),      ty: AbstractType::Number },
        FieldDecl { name: "disponible".to_owned(), ty: AbstractType::Bool   },
    ]);

    // Unknown operations are not rejected by the parser
    assert_eq!(req.resources[2].operations.last().map(String::as_str), Some("archive"));
    assert_eq!(req.resources[2].fields[3].ty, AbstractType::Date);
}

#[test]
fn requirements_without_operations_or_resources() {
    let empty = requirements_from_str("api Nada { }").unwrap();

    assert_eq!(empty, RequirementsModel { name: "Nada".to_owned(), resources: Vec::new() });

    let req = requirements_from_str(
        "api Catalogo { resource Categoria { fields { nombre : Text } } }"
    ).unwrap();

    assert!(req.resources[0].operations.is_empty());
    assert_eq!(req.resources[0].fields.len(), 1);
}

#[test]
fn invalid_requirements() {
    test_invalid_cases(&[
        InvalidTestCase {
            source:  "api { }",
            marker:  "    ^^",
            message: "Expected identifier; found '{'",
        },
        InvalidTestCase {
            source:  "api X { resource R { fields { a : Texto } } }",
            marker:  "                                  ^____^",
            message: "Expected one of Text, Number, Bool, Date; found 'Texto'",
        },
        InvalidTestCase {
            source:  "api X { resource R { operations : list, fields { } } }",
            marker:  "                                               ^^",
            message: "Expected 'fields'; found '{'",
        },
        InvalidTestCase {
            source:  "api X { } }",
            marker:  "          ^^",
            message: "Expected end of input; found '}'",
        },
        InvalidTestCase {
            source:  "api X { resource R { fields { a : Text a : Bool } } }",
            marker:  "                                       ^^",
            message: "Duplicate field 'a' in 'R'",
        },
    ], requirements_from_str);
}

#[test]
fn unexpected_end_of_input() {
    match requirements_from_str("api X {") {
        Err(Error::Syntax { message, range }) => {
            let eof = Location { src_idx: 0, line: 1, column: 8 };
            assert_eq!(message, "Expected '}'; found end of input");
            assert_eq!(range, Range { start: eof, end: eof });
        },
        other => panic!("Expected a syntax error, got {:?}", other),
    }

    match parse_requirements(&[]) {
        Err(Error::Syntax { message, .. }) => assert_eq!(message, "Expected 'api'; found end of input"),
        other => panic!("Expected a syntax error, got {:?}", other),
    }
}

//
// PIM
//

const PIM_SOURCE: &str = r#"
pim Tienda {
    modelClass Producto {
        nombre : Text
        precio : Number
    }

    endpoint GET /productos {
        summary  : "List all productos"
        params   : none
        response : List[Producto]
    }

    endpoint PUT /productos/{id} {
        summary  : "Update an existing producto"
        params   : id:Number, body:Producto
        response : Producto
    }

    endpoint DELETE /productos/{id} {
        summary  : "Delete a producto"
        params   : id:Number
        response : Message
    }
}
"#;

#[test]
fn pim_endpoints() {
    let pim = pim_from_str(PIM_SOURCE).unwrap();

    assert_eq!(pim.name, "Tienda");
    assert_eq!(pim.model_classes.len(), 1);
    assert_eq!(pim.endpoints.len(), 3);

    let list = &pim.endpoints[0];
    assert_eq!(list.method, HttpMethod::Get);
    assert_eq!(list.path, "/productos");
    assert!(list.params.is_empty());
    assert_eq!(list.response, ResponseType::List("Producto".to_owned()));

    let update = &pim.endpoints[1];
    assert_eq!(update.path, "/productos/{id}");
    assert_eq!(update.summary, "Update an existing producto");
    assert_eq!(update.params, vec![
        Param { name: "id".to_owned(),   ty: TypeRef::Primitive(AbstractType::Number) },
        Param { name: "body".to_owned(), ty: TypeRef::Entity("Producto".to_owned()) },
    ]);

    assert_eq!(pim.endpoints[2].response, ResponseType::Message);
}

#[test]
fn invalid_pim() {
    test_invalid_cases(&[
        InvalidTestCase {
            source:  "pim X { endpoint PATCH /xs { } }",
            marker:  "                 ^____^",
            message: "Expected one of GET, POST, PUT, DELETE; found 'PATCH'",
        },
        InvalidTestCase {
            source:  "pim X { endpoint GET xs { } }",
            marker:  "                     ^_^",
            message: "Expected path; found 'xs'",
        },
        InvalidTestCase {
            source:  "pim X { endpoint GET /xs { summary : List } }",
            marker:  "                                     ^___^",
            message: "Expected string literal; found 'List'",
        },
    ], pim_from_str);
}

//
// PSM
//

const PSM_SOURCE: &str = r#"
psm fastapi Tienda {
    schema Pedido key numero {
        numero : int
        fecha  : datetime
    }

    route GET "/pedidos/{pedido_id}" {
        summary    : "Get a pedido by ID"
        path_param : pedido_id:int
        response   : Pedido
        status     : 200
    }

    route POST "/pedidos" {
        summary    : "Create a new pedido"
        body       : Pedido
        response   : Pedido
        status     : 201
    }

    route DELETE "/pedidos/{pedido_id}" {
        summary    : "Delete a pedido"
        path_param : pedido_id:int
        response   : dict
        status     : 200
    }
}
"#;

#[test]
fn psm_schemas_and_routes() {
    let psm = psm_from_str(PSM_SOURCE).unwrap();

    assert_eq!(psm.platform, Platform::FastApi);
    assert_eq!(psm.schemas[0].identity, Identity::Field("numero".to_owned()));
    assert_eq!(psm.schemas[0].fields[1].ty, ConcreteType::DateTime);

    let get = &psm.routes[0];
    assert_eq!(get.path, "/pedidos/{pedido_id}");
    assert_eq!(get.path_param, Some(PathParam { name: "pedido_id".to_owned(), ty: ConcreteType::Integer }));
    assert_eq!(get.body, None);

    let post = &psm.routes[1];
    assert_eq!(post.path_param, None);
    assert_eq!(post.body.as_ref().map(String::as_str), Some("Pedido"));
    assert_eq!(post.status, 201);

    assert_eq!(psm.routes[2].response, PsmResponse::Map);
}

#[test]
fn invalid_psm() {
    test_invalid_cases(&[
        InvalidTestCase {
            source:  "psm django Tienda { }",
            marker:  "    ^_____^",
            message: "Unsupported platform 'django'",
        },
        InvalidTestCase {
            source:  "psm fastapi T { schema S key id { n : int } }",
            marker:  "                             ^_^",
            message: "Key 'id' is not a field of 'S'",
        },
        InvalidTestCase {
            source:  "psm fastapi T { schema S { n : integer } }",
            marker:  "                               ^______^",
            message: "Expected one of str, int, float, bool, datetime; found 'integer'",
        },
        InvalidTestCase {
            source:  r#"psm fastapi T { route GET "/s" { summary : "" response : dict status : 99999 } }"#,
            marker:  r#"                                                                       ^____^"#,
            message: "Invalid status code 99999",
        },
    ], psm_from_str);
}

#[test]
fn tokens_of_several_sources() {
    // Models may be split across files; locations keep track of which one
    let sources = ["api Tienda {", "resource Producto { fields { a : Bool a : Bool } } }"];
    let tokens = lexer::lex_significant(&sources).unwrap();

    match parse_requirements(&tokens) {
        Err(Error::Semantic { message, range: Some(range) }) => {
            assert_eq!(message, "Duplicate field 'a' in 'Producto'");
            assert_eq!(range, oneline_range(1, 39..40));
        },
        other => panic!("Expected a semantic error, got {:?}", other),
    }
}
