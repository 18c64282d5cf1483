//
// pim.rs
// The MDSE REST Compiler
//

//! Defines the Platform-Independent Model: model classes and HTTP
//! endpoints, still expressed in terms of abstract types. The PIM
//! says *what* the service exposes without committing to a framework.

use std::fmt::{ self, Display, Formatter };
use std::str::FromStr;
use crate::lexer::quote;

pub use crate::reqir::{ AbstractType, FieldDecl };


/// The HTTP verbs an endpoint may be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpMethod {
    /// `GET`: read a collection or a single entry.
    Get,
    /// `POST`: create an entry.
    Post,
    /// `PUT`: replace an entry.
    Put,
    /// `DELETE`: remove an entry.
    Delete,
}

impl HttpMethod {
    /// Every method, in declaration order.
    pub const ALL: [HttpMethod; 4] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
    ];

    /// The upper-case spelling used in model sources, e.g. `POST`.
    pub fn name(self) -> &'static str {
        match self {
            HttpMethod::Get    => "GET",
            HttpMethod::Post   => "POST",
            HttpMethod::Put    => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Returns `true` if requests with this method carry an entity body.
    pub fn has_body(self) -> bool {
        match self {
            HttpMethod::Post | HttpMethod::Put  => true,
            HttpMethod::Get | HttpMethod::Delete => false,
        }
    }
}

impl FromStr for HttpMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL.iter().cloned().find(|m| m.name() == s).ok_or(())
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A model class: the platform-independent shape of one resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelClassDecl {
    /// The name of the class, identical to the resource name.
    pub name: String,
    /// Verbatim copy of the resource's fields.
    pub fields: Vec<FieldDecl>,
}

/// The type of an endpoint parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// One of the abstract primitives, e.g. `Number` for an `id`.
    Primitive(AbstractType),
    /// A model class, referenced by name.
    Entity(String),
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            TypeRef::Primitive(ty)    => write!(f, "{}", ty),
            TypeRef::Entity(ref name) => f.write_str(name),
        }
    }
}

/// A named endpoint parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    /// The name of the parameter, `id` or `body`.
    pub name: String,
    /// The type of the parameter.
    pub ty: TypeRef,
}

impl Display for Param {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.ty)
    }
}

/// What an endpoint responds with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResponseType {
    /// A single entity of the named class.
    Entity(String),
    /// A list of entities of the named class.
    List(String),
    /// A confirmation message, not tied to any class.
    Message,
}

/// Spelling of the `Message` sentinel in PIM sources.
pub const MESSAGE_TYPE_NAME: &str = "Message";

impl Display for ResponseType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            ResponseType::Entity(ref name) => f.write_str(name),
            ResponseType::List(ref name)   => write!(f, "List[{}]", name),
            ResponseType::Message          => f.write_str(MESSAGE_TYPE_NAME),
        }
    }
}

/// An HTTP endpoint descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointDecl {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The path template; contains at most one `{id}` placeholder.
    pub path: String,
    /// Human-readable description of the endpoint.
    pub summary: String,
    /// At most two parameters: `id` first, then `body`.
    pub params: Vec<Param>,
    /// The response type.
    pub response: ResponseType,
}

/// The root of the Platform-Independent Model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PimModel {
    /// The name of the API.
    pub name: String,
    /// One model class per resource, in resource order.
    pub model_classes: Vec<ModelClassDecl>,
    /// Endpoints, grouped by resource, in operation order.
    pub endpoints: Vec<EndpointDecl>,
}

/// Renders the model in the `pim` grammar, so that
/// `parser::parse_pim()` accepts the output.
impl Display for PimModel {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "pim {} {{", self.name)?;
        writeln!(f)?;

        for class in &self.model_classes {
            writeln!(f, "    modelClass {} {{", class.name)?;

            for field in &class.fields {
                writeln!(f, "        {}", field)?;
            }

            writeln!(f, "    }}")?;
            writeln!(f)?;
        }

        for endpoint in &self.endpoints {
            let params = if endpoint.params.is_empty() {
                "none".to_owned()
            } else {
                endpoint.params.iter().map(Param::to_string).collect::<Vec<_>>().join(", ")
            };

            writeln!(f, "    endpoint {} {} {{", endpoint.method, endpoint.path)?;
            writeln!(f, "        summary  : {}", quote(&endpoint.summary))?;
            writeln!(f, "        params   : {}", params)?;
            writeln!(f, "        response : {}", endpoint.response)?;
            writeln!(f, "    }}")?;
            writeln!(f)?;
        }

        writeln!(f, "}}")
    }
}
