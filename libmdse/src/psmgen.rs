//
// psmgen.rs
// The MDSE REST Compiler
//

//! PSMGen, the second lowering stage. It specializes a platform-
//! independent model for a service framework: abstract field types
//! become concrete ones, routes get status codes and resource-qualified
//! path parameters, and each schema gets an explicit lookup strategy.

use tracing::{ debug, info };
use crate::error::{ Error, Result };
use crate::pim::{ PimModel, ModelClassDecl, EndpointDecl, ResponseType };
use crate::psm::*;
use crate::rules::{ self, NumberLowering };
use crate::naming;


/// Settings governing the PIM to PSM lowering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoweringParams {
    /// The platform to be targeted.
    pub platform: Platform,
    /// How `Number` fields are lowered. See `NumberLowering`.
    pub number_lowering: NumberLowering,
    /// Field names that identify an entry by value. A schema having one
    /// of these fields is looked up by that field instead of by position;
    /// earlier entries take precedence over later ones.
    pub business_keys: Vec<String>,
}

impl Default for LoweringParams {
    fn default() -> Self {
        LoweringParams {
            platform: Platform::FastApi,
            number_lowering: NumberLowering::default(),
            business_keys: vec!["numero".to_owned()],
        }
    }
}

/// Lowers a platform-independent model to a platform-specific model.
///
/// # Arguments:
///
/// * `pim`: the platform-independent model.
/// * `params`: lowering parameters; see the docs for `LoweringParams`.
///
/// # Return value:
///
/// * `Ok(PsmModel)`, with one schema per model class and one route per
///   endpoint, in the same order.
/// * `Err(Error::Semantic)` if an endpoint path does not name any of the
///   model classes.
pub fn generate_psm(pim: &PimModel, params: &LoweringParams) -> Result<PsmModel> {
    let schemas = pim.model_classes.iter().map(|class| generate_schema(class, params)).collect();
    let routes = pim.endpoints.iter().map(|ep| generate_route(pim, ep)).collect::<Result<_>>()?;

    let psm = PsmModel {
        platform: params.platform,
        name: pim.name.clone(),
        schemas,
        routes,
    };

    info!(
        platform = %psm.platform,
        schemas = psm.schemas.len(),
        routes = psm.routes.len(),
        "generated PSM for {}", psm.name
    );

    Ok(psm)
}

/// Lowers the fields of a model class and decides its lookup strategy.
pub fn generate_schema(class: &ModelClassDecl, params: &LoweringParams) -> SchemaDecl {
    let fields: Vec<_> = class.fields.iter().map(|field| SchemaField {
        name: field.name.clone(),
        ty: rules::lower_type(&field.name, field.ty, params.number_lowering),
    }).collect();

    let identity = params.business_keys.iter()
        .find(|key| fields.iter().any(|field| &field.name == *key))
        .map_or(Identity::Positional, |key| Identity::Field(key.clone()));

    debug!(schema = %class.name, identity = ?identity, "lowered model class");

    SchemaDecl {
        name: class.name.clone(),
        fields,
        identity,
    }
}

/// Lowers one endpoint. The resource is inferred from the path, and
/// must be one of the model classes of `pim`.
pub fn generate_route(pim: &PimModel, endpoint: &EndpointDecl) -> Result<RouteDecl> {
    let class_names = pim.model_classes.iter().map(|class| class.name.as_str());
    let resource = naming::resolve_resource(&endpoint.path, class_names).ok_or_else(
        || Error::Semantic {
            message: format!(
                "Path '{}' refers to resource '{}', which has no model class",
                endpoint.path,
                naming::infer_resource(&endpoint.path),
            ),
            range: None,
        }
    )?;

    let (path, path_param) = if naming::has_placeholder(&endpoint.path) {
        let name = naming::id_param(resource);
        let path = naming::specialize_placeholder(&endpoint.path, &name);
        (path, Some(PathParam { name, ty: ConcreteType::Integer }))
    } else {
        (endpoint.path.clone(), None)
    };

    let body = if endpoint.method.has_body() {
        Some(resource.to_owned())
    } else {
        None
    };

    let response = match endpoint.response {
        ResponseType::Entity(ref name) => PsmResponse::Entity(name.clone()),
        ResponseType::List(ref name)   => PsmResponse::List(name.clone()),
        ResponseType::Message          => PsmResponse::Map,
    };

    debug!(method = %endpoint.method, path = %path, resource, "lowered endpoint");

    Ok(RouteDecl {
        method: endpoint.method,
        path,
        summary: endpoint.summary.clone(),
        path_param,
        body,
        response,
        status: rules::status_code(endpoint.method),
    })
}
