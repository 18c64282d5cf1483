//
// psm.rs
// The MDSE REST Compiler
//

//! Defines the Platform-Specific Model: schemas with concrete field
//! types, and routes with status codes and resource-qualified path
//! parameters, ready to be turned into source code for one platform.

use std::fmt::{ self, Display, Formatter };
use std::str::FromStr;
use crate::lexer::quote;

pub use crate::pim::HttpMethod;


/// The service framework a PSM targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    /// FastAPI with Pydantic models.
    FastApi,
}

impl Platform {
    /// The tag of the platform in PSM sources and file names.
    pub fn name(self) -> &'static str {
        match self {
            Platform::FastApi => "fastapi",
        }
    }
}

impl FromStr for Platform {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fastapi" => Ok(Platform::FastApi),
            _         => Err(()),
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Concrete primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConcreteType {
    /// A character string.
    String,
    /// A signed integer.
    Integer,
    /// A floating-point number.
    Float,
    /// A boolean.
    Bool,
    /// A date and time of day.
    DateTime,
}

impl ConcreteType {
    /// Every concrete type, in declaration order.
    pub const ALL: [ConcreteType; 5] = [
        ConcreteType::String,
        ConcreteType::Integer,
        ConcreteType::Float,
        ConcreteType::Bool,
        ConcreteType::DateTime,
    ];

    /// The spelling of this type in FastAPI PSM sources, which is
    /// also its Python annotation.
    pub fn name(self) -> &'static str {
        match self {
            ConcreteType::String   => "str",
            ConcreteType::Integer  => "int",
            ConcreteType::Float    => "float",
            ConcreteType::Bool     => "bool",
            ConcreteType::DateTime => "datetime",
        }
    }
}

impl FromStr for ConcreteType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConcreteType::ALL.iter().cloned().find(|ty| ty.name() == s).ok_or(())
    }
}

impl Display for ConcreteType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a generated "get by id" handler locates an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// The path parameter is an index into the collection.
    Positional,
    /// The path parameter is compared with the value of the named
    /// business-key field of each entry.
    Field(String),
}

impl Default for Identity {
    fn default() -> Self {
        Identity::Positional
    }
}

/// A concretely-typed field of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaField {
    /// The name of the field.
    pub name: String,
    /// The concrete type of the field.
    pub ty: ConcreteType,
}

/// A record type of the generated service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaDecl {
    /// The name of the schema, identical to the model class name.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<SchemaField>,
    /// The lookup strategy used by routes of this resource.
    pub identity: Identity,
}

/// A path parameter of a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathParam {
    /// Resource-qualified name, e.g. `producto_id`.
    pub name: String,
    /// Concrete type of the parameter.
    pub ty: ConcreteType,
}

/// What a route responds with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PsmResponse {
    /// A single entity of the named schema.
    Entity(String),
    /// A list of entities of the named schema.
    List(String),
    /// A generic key-value map.
    Map,
}

/// Spelling of the generic map response type in FastAPI PSM sources.
pub const MAP_TYPE_NAME: &str = "dict";

impl Display for PsmResponse {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            PsmResponse::Entity(ref name) => f.write_str(name),
            PsmResponse::List(ref name)   => write!(f, "List[{}]", name),
            PsmResponse::Map              => f.write_str(MAP_TYPE_NAME),
        }
    }
}

/// A fully specified route of the generated service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteDecl {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The path, with its placeholder renamed after the resource.
    pub path: String,
    /// Human-readable description of the route.
    pub summary: String,
    /// The path parameter, if the path has a placeholder.
    pub path_param: Option<PathParam>,
    /// The name of the body's schema, for `POST` and `PUT`.
    pub body: Option<String>,
    /// The response type.
    pub response: PsmResponse,
    /// The HTTP status code of a successful response.
    pub status: u16,
}

/// The root of the Platform-Specific Model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PsmModel {
    /// The targeted service framework.
    pub platform: Platform,
    /// The name of the API.
    pub name: String,
    /// One schema per model class, in class order.
    pub schemas: Vec<SchemaDecl>,
    /// One route per endpoint, in endpoint order.
    pub routes: Vec<RouteDecl>,
}

impl PsmModel {
    /// Looks up a schema by its exact name.
    pub fn schema(&self, name: &str) -> Option<&SchemaDecl> {
        self.schemas.iter().find(|schema| schema.name == name)
    }
}

/// Renders the model in the `psm` grammar, so that
/// `parser::parse_psm()` accepts the output.
impl Display for PsmModel {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "psm {} {} {{", self.platform, self.name)?;
        writeln!(f)?;

        for schema in &self.schemas {
            match schema.identity {
                Identity::Positional     => writeln!(f, "    schema {} {{", schema.name)?,
                Identity::Field(ref key) => writeln!(f, "    schema {} key {} {{", schema.name, key)?,
            }

            for field in &schema.fields {
                writeln!(f, "        {} : {}", field.name, field.ty)?;
            }

            writeln!(f, "    }}")?;
            writeln!(f)?;
        }

        for route in &self.routes {
            writeln!(f, "    route {} {} {{", route.method, quote(&route.path))?;
            writeln!(f, "        summary    : {}", quote(&route.summary))?;

            if let Some(ref param) = route.path_param {
                writeln!(f, "        path_param : {}:{}", param.name, param.ty)?;
            }

            if let Some(ref body) = route.body {
                writeln!(f, "        body       : {}", body)?;
            }

            writeln!(f, "        response   : {}", route.response)?;
            writeln!(f, "        status     : {}", route.status)?;
            writeln!(f, "    }}")?;
            writeln!(f)?;
        }

        writeln!(f, "}}")
    }
}
