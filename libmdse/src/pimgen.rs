//
// pimgen.rs
// The MDSE REST Compiler
//

//! PIMGen, the first lowering stage. It turns the abstract operations
//! of every resource in a requirements model into HTTP endpoints, and
//! every resource into a model class. The lowering is a pure function
//! of its input; every operation yields exactly one `OperationOutcome`,
//! so that ignored operations are reported instead of vanishing.

use tracing::{ debug, info, warn };
use crate::reqir::{ RequirementsModel, ResourceDecl };
use crate::pim::*;
use crate::rules::{ self, OperationRule, ResponseTemplate };
use crate::naming;


/// What happened to one declared operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
    /// The operation produced the endpoint at `index` in `PimModel::endpoints`.
    Emitted {
        /// The resource that declared the operation.
        resource: String,
        /// The operation, as spelled in the source.
        operation: String,
        /// Position of the generated endpoint.
        index: usize,
    },
    /// The operation was ignored.
    Skipped {
        /// The resource that declared the operation.
        resource: String,
        /// The operation, as spelled in the source.
        operation: String,
        /// Why it was ignored.
        reason: String,
    },
}

impl OperationOutcome {
    /// Returns `true` if an endpoint was generated.
    pub fn is_emitted(&self) -> bool {
        match *self {
            OperationOutcome::Emitted { .. } => true,
            OperationOutcome::Skipped { .. } => false,
        }
    }
}

/// The result of lowering a requirements model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PimGen {
    /// The generated platform-independent model.
    pub pim: PimModel,
    /// One outcome per declared operation, in declaration order.
    pub outcomes: Vec<OperationOutcome>,
}

impl PimGen {
    /// Iterates over the outcomes of operations that were ignored.
    pub fn skipped(&self) -> impl Iterator<Item=&OperationOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_emitted())
    }
}

/// Lowers a requirements model to a platform-independent model.
///
/// # Arguments:
///
/// * `req`: the requirements model, as parsed from an `api` source.
///
/// # Return value:
///
/// The PIM, with one model class per resource and one endpoint per
/// recognized operation, along with the outcome of every operation.
pub fn generate_pim(req: &RequirementsModel) -> PimGen {
    let model_classes = req.resources.iter().map(generate_model_class).collect();
    let mut endpoints = Vec::new();
    let mut outcomes = Vec::new();

    for resource in &req.resources {
        debug!(resource = %resource.name, operations = ?resource.operations, "lowering resource");

        for operation in &resource.operations {
            let outcome = match generate_endpoint(resource, operation) {
                Some(endpoint) => {
                    endpoints.push(endpoint);
                    OperationOutcome::Emitted {
                        resource: resource.name.clone(),
                        operation: operation.clone(),
                        index: endpoints.len() - 1,
                    }
                },
                None => {
                    warn!(resource = %resource.name, operation = %operation, "skipping unknown operation");
                    OperationOutcome::Skipped {
                        resource: resource.name.clone(),
                        operation: operation.clone(),
                        reason: format!("unknown operation '{}'", operation),
                    }
                },
            };

            outcomes.push(outcome);
        }
    }

    let pim = PimModel {
        name: req.name.clone(),
        model_classes,
        endpoints,
    };

    info!(
        model_classes = pim.model_classes.len(),
        endpoints = pim.endpoints.len(),
        "generated PIM for {}", pim.name
    );

    PimGen { pim, outcomes }
}

fn generate_model_class(resource: &ResourceDecl) -> ModelClassDecl {
    ModelClassDecl {
        name: resource.name.clone(),
        fields: resource.fields.clone(),
    }
}

/// Builds the endpoint of one operation of a resource, or returns
/// `None` if the operation is not in `rules::OPERATION_RULES`.
pub fn generate_endpoint(resource: &ResourceDecl, operation: &str) -> Option<EndpointDecl> {
    let rule = rules::operation_rule(operation)?;
    let singular = naming::singular(&resource.name);
    let plural = naming::plural(&resource.name);
    let summary = rules::summary(rule.operation, &singular, &plural)?;
    let base_path = naming::base_path(&resource.name);

    let path = if rule.has_id {
        format!("{}/{{id}}", base_path)
    } else {
        base_path
    };

    Some(EndpointDecl {
        method: rule.method,
        path,
        summary,
        params: generate_params(rule, &resource.name),
        response: generate_response(rule, &resource.name),
    })
}

// `id` always comes before `body`.
fn generate_params(rule: &OperationRule, resource: &str) -> Vec<Param> {
    let mut params = Vec::with_capacity(2);

    if rule.has_id {
        params.push(Param {
            name: "id".to_owned(),
            ty: TypeRef::Primitive(AbstractType::Number),
        });
    }

    if rule.has_body {
        params.push(Param {
            name: "body".to_owned(),
            ty: TypeRef::Entity(resource.to_owned()),
        });
    }

    params
}

fn generate_response(rule: &OperationRule, resource: &str) -> ResponseType {
    match rule.response {
        ResponseTemplate::Entity  => ResponseType::Entity(resource.to_owned()),
        ResponseTemplate::List    => ResponseType::List(resource.to_owned()),
        ResponseTemplate::Message => ResponseType::Message,
    }
}
