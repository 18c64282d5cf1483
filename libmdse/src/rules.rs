//
// rules.rs
// The MDSE REST Compiler
//

//! The static rule tables that drive every lowering stage. Each
//! concern has exactly one table and one lookup function, so that
//! the stages themselves are plain folds over these rules and the
//! rules can be enumerated and tested on their own.

use crate::pim::{ AbstractType, HttpMethod };
use crate::psm::ConcreteType;


//
// Requirements -> PIM: operations
//

/// The shape of an endpoint's response, before a resource name is
/// substituted into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResponseTemplate {
    /// `{name}`
    Entity,
    /// `List[{name}]`
    List,
    /// `Message`
    Message,
}

/// Describes the endpoint an abstract operation turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationRule {
    /// The lower-case operation name this rule is keyed by.
    pub operation: &'static str,
    /// The HTTP method of the endpoint.
    pub method: HttpMethod,
    /// Whether the endpoint path ends in an `{id}` placeholder.
    pub has_id: bool,
    /// Whether the endpoint takes the resource as a `body` parameter.
    pub has_body: bool,
    /// The response of the endpoint.
    pub response: ResponseTemplate,
}

/// The closed set of operations understood by the PIM lowering.
pub static OPERATION_RULES: &[OperationRule] = &[
    OperationRule {
        operation: "list",
        method:    HttpMethod::Get,
        has_id:    false,
        has_body:  false,
        response:  ResponseTemplate::List,
    },
    OperationRule {
        operation: "get",
        method:    HttpMethod::Get,
        has_id:    true,
        has_body:  false,
        response:  ResponseTemplate::Entity,
    },
    OperationRule {
        operation: "create",
        method:    HttpMethod::Post,
        has_id:    false,
        has_body:  true,
        response:  ResponseTemplate::Entity,
    },
    OperationRule {
        operation: "update",
        method:    HttpMethod::Put,
        has_id:    true,
        has_body:  true,
        response:  ResponseTemplate::Entity,
    },
    OperationRule {
        operation: "delete",
        method:    HttpMethod::Delete,
        has_id:    true,
        has_body:  false,
        response:  ResponseTemplate::Message,
    },
];

/// Summary templates, keyed like `OPERATION_RULES`.
/// `{singular}` and `{plural}` are substituted with resource names.
pub static SUMMARY_RULES: &[(&str, &str)] = &[
    ("list",   "List all {plural}"),
    ("get",    "Get a {singular} by ID"),
    ("create", "Create a new {singular}"),
    ("update", "Update an existing {singular}"),
    ("delete", "Delete a {singular}"),
];

/// Normalizes an operation name for lookup in the tables above.
pub fn normalize_operation(operation: &str) -> String {
    operation.trim().to_lowercase()
}

/// Looks up the rule for an operation, ignoring case.
pub fn operation_rule(operation: &str) -> Option<&'static OperationRule> {
    let key = normalize_operation(operation);
    OPERATION_RULES.iter().find(|rule| rule.operation == key)
}

/// Renders the summary of an operation, or `None` if the operation
/// has no summary template.
pub fn summary(operation: &str, singular: &str, plural: &str) -> Option<String> {
    let key = normalize_operation(operation);

    SUMMARY_RULES.iter().find(|&&(op, _)| op == key).map(
        |&(_, template)| template.replace("{singular}", singular).replace("{plural}", plural)
    )
}

//
// PIM -> PSM: types and status codes
//

/// How `Number` fields are lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumberLowering {
    /// Fields whose name is listed in `INTEGER_FIELDS` become integers,
    /// everything else becomes a float.
    ByFieldName,
    /// Every `Number` field becomes a float, regardless of its name.
    /// This is the output of earlier releases of the generator.
    FloatOnly,
}

impl Default for NumberLowering {
    fn default() -> Self {
        NumberLowering::ByFieldName
    }
}

/// Default lowering of each abstract type.
pub static TYPE_RULES: &[(AbstractType, ConcreteType)] = &[
    (AbstractType::Text,   ConcreteType::String),
    (AbstractType::Number, ConcreteType::Float),
    (AbstractType::Bool,   ConcreteType::Bool),
    (AbstractType::Date,   ConcreteType::DateTime),
];

/// Names of `Number` fields that hold whole numbers.
pub static INTEGER_FIELDS: &[&str] = &["id", "stock", "edad", "numero"];

/// Lowers the abstract type of a field to a concrete type. This is the
/// only place where the integer override is applied.
pub fn lower_type(field: &str, ty: AbstractType, policy: NumberLowering) -> ConcreteType {
    let is_integer_field = || {
        let name = field.to_lowercase();
        INTEGER_FIELDS.iter().any(|&f| f == name)
    };

    if ty == AbstractType::Number && policy == NumberLowering::ByFieldName && is_integer_field() {
        return ConcreteType::Integer;
    }

    TYPE_RULES.iter()
        .find(|&&(abs, _)| abs == ty)
        .map_or(ConcreteType::String, |&(_, concrete)| concrete)
}

/// Status codes of successful responses, by method.
pub static STATUS_RULES: &[(HttpMethod, u16)] = &[
    (HttpMethod::Get,    200),
    (HttpMethod::Post,   201),
    (HttpMethod::Put,    200),
    (HttpMethod::Delete, 200),
];

/// Status code of methods missing from `STATUS_RULES`.
pub const DEFAULT_STATUS: u16 = 200;

/// Returns the status code of a successful response to `method`.
pub fn status_code(method: HttpMethod) -> u16 {
    STATUS_RULES.iter()
        .find(|&&(m, _)| m == method)
        .map_or(DEFAULT_STATUS, |&(_, code)| code)
}

//
// PSM -> code: example values
//

/// Example values of well-known fields, as Python literals.
pub static EXAMPLE_VALUES: &[(&str, &str)] = &[
    ("nombre",     "\"Laptop Pro\""),
    ("email",      "\"usuario@ejemplo.com\""),
    ("precio",     "999.99"),
    ("total",      "150.00"),
    ("stock",      "42"),
    ("edad",       "30"),
    ("numero",     "1001"),
    ("estado",     "\"pendiente\""),
    ("fecha",      "\"2024-01-15\""),
    ("disponible", "True"),
];

/// Returns an illustrative Python literal for a field: a well-known
/// value if the field name has one, otherwise one based on its type.
pub fn example_value(field: &str, ty: ConcreteType) -> String {
    if let Some(&(_, value)) = EXAMPLE_VALUES.iter().find(|&&(name, _)| name == field) {
        return value.to_owned()
    }

    match ty {
        ConcreteType::String   => format!("\"{} ejemplo\"", field.replace('\\', "\\\\").replace('"', "\\\"")),
        ConcreteType::Integer  => "1".to_owned(),
        ConcreteType::Float    => "0.0".to_owned(),
        ConcreteType::Bool     => "True".to_owned(),
        ConcreteType::DateTime => "\"2024-01-15T00:00:00\"".to_owned(),
    }
}
