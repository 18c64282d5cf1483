//
// reqir.rs
// The MDSE REST Compiler
//

//! The Requirements IR: resources, the abstract operations an
//! analyst wants to expose on them, and their field declarations.
//! This is what the `api` grammar parses into and what the
//! requirements-to-PIM lowering consumes.

use std::fmt::{ self, Display, Formatter };
use std::str::FromStr;


/// The abstract primitive types a field may have. These survive
/// unchanged into the PIM and are lowered to concrete types in the PSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AbstractType {
    /// Free-form text.
    Text,
    /// Any number; integral or not is decided during PSM lowering.
    Number,
    /// A truth value.
    Bool,
    /// A point in time.
    Date,
}

impl AbstractType {
    /// Every abstract type, in declaration order.
    pub const ALL: [AbstractType; 4] = [
        AbstractType::Text,
        AbstractType::Number,
        AbstractType::Bool,
        AbstractType::Date,
    ];

    /// The keyword this type is spelled with in model sources.
    pub fn name(self) -> &'static str {
        match self {
            AbstractType::Text   => "Text",
            AbstractType::Number => "Number",
            AbstractType::Bool   => "Bool",
            AbstractType::Date   => "Date",
        }
    }
}

impl FromStr for AbstractType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AbstractType::ALL.iter().cloned().find(|ty| ty.name() == s).ok_or(())
    }
}

impl Display for AbstractType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named, abstractly-typed field of a resource or model class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDecl {
    /// The name of the field, unique within its owner.
    pub name: String,
    /// The abstract type of the field.
    pub ty: AbstractType,
}

impl Display for FieldDecl {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} : {}", self.name, self.ty)
    }
}

/// A resource of the API, e.g. `Producto`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceDecl {
    /// The name of the resource, used verbatim as a type name later.
    pub name: String,
    /// Operation names in declaration order. These are not validated
    /// at parse time; unknown ones are skipped by the PIM lowering.
    pub operations: Vec<String>,
    /// Field declarations in declaration order.
    pub fields: Vec<FieldDecl>,
}

/// The root of the Requirements IR.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequirementsModel {
    /// The name of the API.
    pub name: String,
    /// Resources in declaration order.
    pub resources: Vec<ResourceDecl>,
}

/// Renders the model in the `api` grammar, so that
/// `parser::parse_requirements()` accepts the output.
impl Display for RequirementsModel {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "api {} {{", self.name)?;

        for resource in &self.resources {
            writeln!(f)?;
            writeln!(f, "    resource {} {{", resource.name)?;

            if !resource.operations.is_empty() {
                writeln!(f, "        operations : {}", resource.operations.join(", "))?;
            }

            writeln!(f, "        fields {{")?;

            for field in &resource.fields {
                writeln!(f, "            {}", field)?;
            }

            writeln!(f, "        }}")?;
            writeln!(f, "    }}")?;
        }

        writeln!(f)?;
        writeln!(f, "}}")
    }
}
