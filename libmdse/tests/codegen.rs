//
// tests/codegen.rs
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

use std::io;
use std::rc::Rc;
use std::cell::RefCell;
use std::collections::BTreeMap;
use itertools::Itertools;
use mdse::parser::{ requirements_from_str, psm_from_str };
use mdse::pimgen::generate_pim;
use mdse::psm::*;
use mdse::psmgen::*;
use mdse::codegen::*;
use mdse::error::*;
use common::*;


fn tienda_psm() -> PsmModel {
    let req = requirements_from_str(TIENDA_ONLINE).unwrap();
    generate_psm(&generate_pim(&req).pim, &LoweringParams::default()).unwrap()
}

/// Runs CodeGen with in-memory writers, returning the text of each file.
fn generate_files(psm: &PsmModel, params: &CodegenParams) -> Result<BTreeMap<String, String>> {
    let mut buffers = Vec::new();

    generate_code(psm, params, &mut |name: &str| {
        let buf = Rc::new(RefCell::new(Vec::<u8>::new()));
        let writer: Rc<RefCell<dyn io::Write>> = buf.clone();
        buffers.push((name.to_owned(), buf));
        Ok(writer)
    })?;

    Ok(buffers.into_iter().map(|(name, buf)| {
        let text = String::from_utf8(buf.borrow().clone()).unwrap();
        (name, text)
    }).collect())
}

/// Returns the lines of the handler defined by `def_name`, up to the next blank line.
fn handler<'a>(main: &'a str, def_name: &str) -> Vec<&'a str> {
    let header = format!("def {}(", def_name);

    main.lines()
        .skip_while(|line| !line.starts_with(&header))
        .take_while(|line| !line.is_empty())
        .collect()
}

#[test]
fn writes_schemas_and_service() {
    let files = generate_files(&tienda_psm(), &CodegenParams::default()).unwrap();

    assert_eq!(files.keys().collect::<Vec<_>>(), vec!["main.py", "schemas.py"]);
    assert!(files.values().all(|text| text.contains("DO NOT EDIT")));
}

#[test]
fn pydantic_schemas() {
    let schemas = emit_schemas(&tienda_psm(), &CodegenParams::default()).unwrap();

    assert!(schemas.contains("from pydantic import BaseModel\nfrom datetime import datetime\n"));
    assert!(schemas.contains("class Producto(BaseModel):\n    nombre        : str\n    precio        : float\n"));
    assert!(schemas.contains("    stock         : int\n    disponible    : bool\n"));
    assert!(schemas.contains("    fecha         : datetime\n"));

    // Example values: well-known ones first, then by type
    assert!(schemas.contains("                \"nombre\": \"Laptop Pro\",\n"));
    assert!(schemas.contains("                \"numero\": 1001,\n"));
    assert!(schemas.contains("                \"fecha\": \"2024-01-15\",\n"));

    let order: Vec<_> = schemas.lines().filter(|line| line.starts_with("class ")).collect();
    assert_eq!(order, vec![
        "class Producto(BaseModel):",
        "class Cliente(BaseModel):",
        "class Pedido(BaseModel):",
    ]);
}

#[test]
fn datetime_is_imported_only_when_used() {
    let psm = psm_from_str(r#"
        psm fastapi Notas {
            schema Nota {
                texto       : str
                prioridad   : int
                descripcion_larga_del_contenido : str
            }
        }
    "#).unwrap();
    let schemas = emit_schemas(&psm, &CodegenParams::default()).unwrap();

    assert!(!schemas.contains("datetime"));
    assert!(schemas.contains("                \"texto\": \"texto ejemplo\",\n"));
    assert!(schemas.contains("\"prioridad\": 1,"));

    // Long names are still separated from their type
    assert!(schemas.contains("    descripcion_larga_del_contenido : str\n"));
}

#[test]
fn service_preamble() {
    let psm = tienda_psm();
    let main = emit_main(&psm, &CodegenParams::default()).unwrap();
    let names = psm.schemas.iter().map(|schema| schema.name.as_str()).sorted().join(", ");

    assert!(main.contains("from fastapi import FastAPI, HTTPException\n"));
    assert!(main.contains(&format!("from schemas import {}\n", names)));
    assert_eq!(names, "Cliente, Pedido, Producto");
    assert!(main.contains("app = FastAPI(title=\"TiendaOnline\", version=\"1.0.0\")\n"));
    assert!(main.contains("productos_db: List[Producto] = []\nclientes_db: List[Cliente] = []\npedidos_db: List[Pedido] = []\n"));
}

#[test]
fn route_decorators() {
    let main = emit_main(&tienda_psm(), &CodegenParams::default()).unwrap();

    assert!(main.contains("@app.get(\"/productos\", response_model=List[Producto])\ndef get_productos():\n"));
    assert!(main.contains("@app.post(\"/productos\", response_model=Producto, status_code=201)\ndef post_productos(data: Producto):\n"));
    assert!(main.contains("@app.put(\"/productos/{producto_id}\", response_model=Producto)\ndef put_productos_producto_id(producto_id: int, data: Producto):\n"));
    assert!(main.contains("@app.delete(\"/productos/{producto_id}\", response_model=dict)\n"));
    assert!(main.contains("    \"\"\"Get a producto by ID\"\"\"\n"));
    assert_eq!(main.matches("@app.").count(), 13);
}

#[test]
fn handlers_check_bounds_before_indexing() {
    let main = emit_main(&tienda_psm(), &CodegenParams::default()).unwrap();
    let guard = "    if producto_id < 0 or producto_id >= len(productos_db):";
    let not_found = "        raise HTTPException(status_code=404, detail=\"Producto not found\")";

    assert_eq!(handler(&main, "get_productos_producto_id")[2..], [
        guard,
        not_found,
        "    return productos_db[producto_id]",
    ]);
    assert_eq!(handler(&main, "put_productos_producto_id")[2..], [
        guard,
        not_found,
        "    productos_db[producto_id] = data",
        "    return data",
    ]);
    assert_eq!(handler(&main, "delete_productos_producto_id")[2..], [
        guard,
        not_found,
        "    productos_db.pop(producto_id)",
        "    return {\"message\": \"Producto deleted successfully\"}",
    ]);
    assert_eq!(handler(&main, "post_productos")[2..], [
        "    productos_db.append(data)",
        "    return data",
    ]);
}

#[test]
fn business_key_lookup() {
    let main = emit_main(&tienda_psm(), &CodegenParams::default()).unwrap();

    assert_eq!(handler(&main, "get_pedidos_pedido_id")[2..], [
        "    item = next((x for x in pedidos_db if x.numero == pedido_id), None)",
        "    if item is None:",
        "        raise HTTPException(status_code=404, detail=\"Pedido not found\")",
        "    return item",
    ]);
}

#[test]
fn empty_model() {
    let psm = PsmModel {
        platform: Platform::FastApi,
        name: "Vacia".to_owned(),
        schemas: vec![],
        routes: vec![],
    };
    let files = generate_files(&psm, &CodegenParams::default()).unwrap();

    assert!(!files["main.py"].contains("from schemas import"));
    assert!(!files["main.py"].contains("@app."));
    assert!(!files["schemas.py"].contains("class "));
}

#[test]
fn module_names_are_configurable() {
    let params = CodegenParams {
        api_version: "2.1.0".to_owned(),
        schemas_module: "models".to_owned(),
        service_module: "app".to_owned(),
    };
    let files = generate_files(&tienda_psm(), &params).unwrap();
    let service = &files["app.py"];

    assert!(files.contains_key("models.py"));
    assert!(service.contains("from models import Cliente, Pedido, Producto\n"));
    assert!(service.contains("version=\"2.1.0\""));
    assert!(service.contains("uvicorn app:app --reload"));
}

#[test]
fn route_without_schema_writes_nothing() {
    let mut psm = tienda_psm();
    psm.schemas.retain(|schema| schema.name != "Cliente");

    let mut requested = Vec::new();
    let result = generate_code(&psm, &CodegenParams::default(), &mut |name: &str| {
        requested.push(name.to_owned());
        let writer: Rc<RefCell<dyn io::Write>> = Rc::new(RefCell::new(io::sink()));
        Ok(writer)
    });

    match result {
        Err(Error::Semantic { message, range: None }) => {
            assert_eq!(message, "Route GET /clientes uses undeclared schema 'Cliente'");
        },
        other => panic!("Expected a semantic error, got {:?}", other),
    }

    assert!(requested.is_empty());
}

#[test]
fn route_without_path_parameter() {
    let mut psm = tienda_psm();
    let delete = psm.routes.iter_mut().find(|route| route.method == HttpMethod::Delete).unwrap();
    delete.path_param = None;

    match emit_main(&psm, &CodegenParams::default()) {
        Err(Error::Semantic { message, .. }) => {
            assert_eq!(message, "Route DELETE /productos/{producto_id} has no path parameter");
        },
        other => panic!("Expected a semantic error, got {:?}", other),
    }
}

#[test]
fn output_is_deterministic() {
    let psm = tienda_psm();
    let params = CodegenParams::default();

    assert_eq!(generate_files(&psm, &params).unwrap(), generate_files(&psm, &params).unwrap());
}

#[test]
fn python_keywords_are_rejected() {
    let source = "api Agenda { resource Evento { operations : list fields { from : Text class : Number } } }";
    let req = requirements_from_str(source).unwrap();
    let psm = generate_psm(&generate_pim(&req).pim, &LoweringParams::default()).unwrap();
    let expected = "Field 'from' of schema 'Evento' is a reserved word in Python";

    match emit_schemas(&psm, &CodegenParams::default()) {
        Err(Error::Semantic { message, range: None }) => assert_eq!(message, expected),
        other => panic!("Expected a semantic error, got {:?}", other),
    }

    match generate_files(&psm, &CodegenParams::default()) {
        Err(Error::Semantic { message, range: None }) => assert_eq!(message, expected),
        other => panic!("Expected a semantic error, got {:?}", other),
    }
}

#[test]
fn schemas_must_not_shadow_imports() {
    let req = requirements_from_str("api Listas { resource List { fields { nombre : Text } } }").unwrap();
    let psm = generate_psm(&generate_pim(&req).pim, &LoweringParams::default()).unwrap();

    match emit_main(&psm, &CodegenParams::default()) {
        Err(Error::Semantic { message, .. }) => {
            assert_eq!(message, "Schema 'List' would shadow a name imported by the service");
        },
        other => panic!("Expected a semantic error, got {:?}", other),
    }
}

/// Hands out in-memory files and keeps them, like a driver would.
#[derive(Debug, Default)]
struct BufferRegistry {
    files: BTreeMap<String, Rc<RefCell<Vec<u8>>>>,
}

impl BufferRegistry {
    fn writer(&mut self, name: &str) -> Result<Rc<RefCell<dyn io::Write>>> {
        let buf = self.files.entry(name.to_owned()).or_insert_with(Default::default);
        let writer: Rc<RefCell<dyn io::Write>> = buf.clone();
        Ok(writer)
    }
}

#[test]
fn writer_provider_may_borrow_its_state() {
    let mut registry = BufferRegistry::default();

    generate_code(&tienda_psm(), &CodegenParams::default(), &mut |name: &str| registry.writer(name)).unwrap();

    assert_eq!(registry.files.keys().join(" "), "main.py schemas.py");
    assert!(registry.files.values().all(|buf| !buf.borrow().is_empty()));
}
