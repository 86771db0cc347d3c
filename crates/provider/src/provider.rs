//! CloudAMQP Provider
//!
//! Boundary between the host framework and the resource handlers. The host
//! speaks in untyped state values and diagnostics; everything below this
//! module works with typed models and `Result`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::client::{CloudAmqpClient, InstanceApi};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::resources::instance::{self, InstanceResource};
use crate::resources::Resource;
use crate::schema::{self, Schema};
use crate::state::{make_state, optional_string, string_value, DynamicValue};

/// Attributes whose value is only known once the remote object exists
const CARRIED_OVER: &[&str] = &["id", "url", "apikey"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Problem reported back to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    pub attribute: Option<String>,
}

impl Diagnostic {
    pub fn error(err: &Error) -> Self {
        Self {
            severity: Severity::Error,
            summary: err.summary().to_string(),
            detail: err.to_string(),
            attribute: err.attribute().map(str::to_string),
        }
    }
}

/// Schemas served to the host
#[derive(Debug, Clone)]
pub struct ProviderSchemas {
    pub provider: Schema,
    pub resource_schemas: HashMap<String, Schema>,
}

/// Result of planning a change
#[derive(Debug, Clone)]
pub struct PlanResponse {
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of any operation that hands state back to the host
///
/// A null `new_state` tells the host the resource does not exist.
#[derive(Debug, Clone)]
pub struct StateResponse {
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

impl StateResponse {
    fn ok(new_state: DynamicValue) -> Self {
        Self {
            new_state,
            diagnostics: vec![],
        }
    }

    fn failed(new_state: DynamicValue, err: &Error) -> Self {
        Self {
            new_state,
            diagnostics: vec![Diagnostic::error(err)],
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}

/// CloudAMQP Terraform provider
#[derive(Clone, Default)]
pub struct CloudAmqpProvider {
    /// API client, installed by `configure`
    api: Arc<RwLock<Option<Arc<dyn InstanceApi>>>>,
}

impl CloudAmqpProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider preconfigured with an API implementation
    pub fn with_api(api: Arc<dyn InstanceApi>) -> Self {
        Self {
            api: Arc::new(RwLock::new(Some(api))),
        }
    }

    async fn get_api(&self) -> Result<Arc<dyn InstanceApi>> {
        self.api.read().await.clone().ok_or(Error::NotConfigured)
    }

    pub fn get_provider_schema(&self) -> ProviderSchemas {
        debug!("GetProviderSchema called");

        ProviderSchemas {
            provider: schema::provider_schema(),
            resource_schemas: [(
                InstanceResource::type_name().to_string(),
                InstanceResource::schema(),
            )]
            .into_iter()
            .collect(),
        }
    }

    /// Build the API client from the provider block and environment
    pub async fn configure(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        info!("ConfigureProvider called");

        match client_config(config).and_then(CloudAmqpClient::new) {
            Ok(client) => {
                info!("Using CloudAMQP API at {}", client.base_url());
                let api: Arc<dyn InstanceApi> = Arc::new(client);
                *self.api.write().await = Some(api);
                vec![]
            }
            Err(e) => {
                debug!("Failed to configure provider: {}", e);
                vec![Diagnostic::error(&e)]
            }
        }
    }

    pub fn validate_resource_config(
        &self,
        type_name: &str,
        config: &DynamicValue,
    ) -> Vec<Diagnostic> {
        debug!("ValidateResourceConfig called for {}", type_name);

        let result = match type_name {
            instance::TYPE_NAME => validate::<InstanceResource>(config),
            _ => Err(Error::UnknownResourceType(type_name.to_string())),
        };

        match result {
            Ok(()) => vec![],
            Err(e) => vec![Diagnostic::error(&e)],
        }
    }

    pub fn plan_resource_change(
        &self,
        type_name: &str,
        prior_state: &DynamicValue,
        proposed_new_state: &DynamicValue,
    ) -> PlanResponse {
        debug!("PlanResourceChange called for {}", type_name);

        match type_name {
            instance::TYPE_NAME => plan::<InstanceResource>(prior_state, proposed_new_state),
            _ => PlanResponse {
                planned_state: proposed_new_state.clone(),
                requires_replace: vec![],
                diagnostics: vec![Diagnostic::error(&Error::UnknownResourceType(
                    type_name.to_string(),
                ))],
            },
        }
    }

    /// Create, update or delete depending on which of prior and planned state are null
    pub async fn apply_resource_change(
        &self,
        type_name: &str,
        prior_state: &DynamicValue,
        planned_state: &DynamicValue,
    ) -> StateResponse {
        info!("ApplyResourceChange called for {}", type_name);

        let api = match self.get_api().await {
            Ok(api) => api,
            Err(e) => return StateResponse::failed(prior_state.clone(), &e),
        };

        match type_name {
            instance::TYPE_NAME => {
                apply::<InstanceResource>(api.as_ref(), prior_state, planned_state).await
            }
            _ => StateResponse::failed(
                prior_state.clone(),
                &Error::UnknownResourceType(type_name.to_string()),
            ),
        }
    }

    pub async fn read_resource(
        &self,
        type_name: &str,
        current_state: &DynamicValue,
    ) -> StateResponse {
        info!("ReadResource called for {}", type_name);

        let api = match self.get_api().await {
            Ok(api) => api,
            Err(e) => return StateResponse::failed(current_state.clone(), &e),
        };

        match type_name {
            instance::TYPE_NAME => read::<InstanceResource>(api.as_ref(), current_state).await,
            _ => StateResponse::failed(
                current_state.clone(),
                &Error::UnknownResourceType(type_name.to_string()),
            ),
        }
    }

    pub async fn import_resource_state(&self, type_name: &str, id: &str) -> StateResponse {
        info!("ImportResourceState called for {} with ID {}", type_name, id);

        let api = match self.get_api().await {
            Ok(api) => api,
            Err(e) => return StateResponse::failed(DynamicValue::Null, &e),
        };

        // Create a minimal state with just the ID and let read fill in the rest
        let initial_state = make_state(vec![("id", string_value(id))]);

        let response = match type_name {
            instance::TYPE_NAME => read::<InstanceResource>(api.as_ref(), &initial_state).await,
            _ => {
                return StateResponse::failed(
                    DynamicValue::Null,
                    &Error::UnknownResourceType(type_name.to_string()),
                )
            }
        };

        if response.new_state.is_null() && !response.has_errors() {
            return StateResponse {
                new_state: DynamicValue::Null,
                diagnostics: vec![Diagnostic {
                    severity: Severity::Error,
                    summary: "Cannot import non-existent remote object".to_string(),
                    detail: format!("No {} with ID {} exists", type_name, id),
                    attribute: None,
                }],
            };
        }

        response
    }
}

fn client_config(config: &DynamicValue) -> Result<ClientConfig> {
    Ok(ClientConfig::resolve(
        optional_string(config, "apikey")?,
        optional_string(config, "baseurl")?,
    ))
}

fn validate<R: Resource>(config: &DynamicValue) -> Result<()> {
    R::schema().check_config(config)?;
    R::from_config(config)?;
    Ok(())
}

fn plan<R: Resource>(prior: &DynamicValue, proposed: &DynamicValue) -> PlanResponse {
    let requires_replace: Vec<String> = R::schema()
        .requires_replace(prior, proposed)
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut planned = proposed.clone();

    // An in-place update keeps the identity and credentials of the existing object
    if requires_replace.is_empty() {
        if let (Some(prior), DynamicValue::Map(attrs)) = (prior.as_map(), &mut planned) {
            for key in CARRIED_OVER {
                if let Some(value) = prior.get(*key) {
                    attrs.insert(key.to_string(), value.clone());
                }
            }
        }
    }

    PlanResponse {
        planned_state: planned,
        requires_replace,
        diagnostics: vec![],
    }
}

async fn apply<R: Resource>(
    api: &dyn InstanceApi,
    prior: &DynamicValue,
    planned: &DynamicValue,
) -> StateResponse {
    match (prior.is_null(), planned.is_null()) {
        // Create
        (true, false) => {
            let mut model = match R::from_config(planned) {
                Ok(model) => model,
                Err(e) => return StateResponse::failed(DynamicValue::Null, &e),
            };

            // A failed follow-up read still leaves an identifier worth keeping
            let result = R::create(api, &mut model).await;
            finish::<R>(&model, result)
        }
        // Delete
        (false, true) => {
            let mut model = match R::from_state(prior) {
                Ok(model) => model,
                Err(e) => return StateResponse::failed(prior.clone(), &e),
            };

            match R::delete(api, &mut model).await {
                Ok(()) => StateResponse::ok(DynamicValue::Null),
                Err(e) => StateResponse::failed(prior.clone(), &e),
            }
        }
        // Update
        (false, false) => {
            let prior_id = match R::from_state(prior) {
                Ok(prior_model) => R::id(&prior_model),
                Err(e) => return StateResponse::failed(prior.clone(), &e),
            };
            let mut model = match R::from_config(planned) {
                Ok(model) => model,
                Err(e) => return StateResponse::failed(prior.clone(), &e),
            };
            R::set_id(&mut model, prior_id);

            match R::update(api, &mut model).await {
                Ok(()) => StateResponse::ok(R::to_state(&model)),
                Err(e) => StateResponse::failed(prior.clone(), &e),
            }
        }
        // No change
        (true, true) => StateResponse::ok(DynamicValue::Null),
    }
}

async fn read<R: Resource>(api: &dyn InstanceApi, current: &DynamicValue) -> StateResponse {
    if current.is_null() {
        return StateResponse::ok(DynamicValue::Null);
    }

    let mut model = match R::from_state(current) {
        Ok(model) => model,
        Err(e) => return StateResponse::failed(current.clone(), &e),
    };

    match R::read(api, &mut model).await {
        Ok(()) => StateResponse::ok(R::to_state(&model)),
        Err(e) => StateResponse::failed(current.clone(), &e),
    }
}

fn finish<R: Resource>(model: &R::Model, result: Result<()>) -> StateResponse {
    let state = R::to_state(model);
    match result {
        Ok(()) => StateResponse::ok(state),
        Err(e) => StateResponse::failed(state, &e),
    }
}
