//! CloudAMQP instance resource

use std::fmt;

use tracing::debug;

use super::Resource;
use crate::client::{CreateInstanceParams, Instance, InstanceApi, UpdateInstanceParams};
use crate::error::{Error, Result};
use crate::schema::{self, Schema};
use crate::state::{
    make_state, optional_int, optional_int_value, optional_string, optional_string_value,
    required_string, string_value, DynamicValue,
};

pub const TYPE_NAME: &str = "cloudamqp_instance";

/// Typed state of a `cloudamqp_instance`
#[derive(Clone, Default, PartialEq, Eq)]
pub struct InstanceModel {
    /// Decimal form of the remote instance id, `None` while absent
    pub id: Option<String>,
    pub name: String,
    pub plan: String,
    pub region: String,
    pub vpc_subnet: Option<String>,
    pub nodes: Option<i64>,
    pub rmq_version: Option<String>,
    pub url: Option<String>,
    pub apikey: Option<String>,
}

impl fmt::Debug for InstanceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceModel")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("plan", &self.plan)
            .field("region", &self.region)
            .field("vpc_subnet", &self.vpc_subnet)
            .field("nodes", &self.nodes)
            .field("rmq_version", &self.rmq_version)
            .finish_non_exhaustive()
    }
}

impl InstanceModel {
    /// State holding only an identifier, as produced by an import
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Parse the persisted identifier back into the API id
    pub fn remote_id(&self) -> Result<i64> {
        let id = self.id.as_deref().unwrap_or_default();
        id.parse().map_err(|source| Error::InvalidId {
            id: id.to_string(),
            source,
        })
    }

    pub fn create_params(&self) -> CreateInstanceParams {
        CreateInstanceParams {
            name: self.name.clone(),
            plan: self.plan.clone(),
            region: self.region.clone(),
            vpc_subnet: self.vpc_subnet.clone(),
            nodes: self.nodes,
            rmq_version: self.rmq_version.clone(),
        }
    }

    // vpc_subnet is force-new; rmq_version is only honoured at creation
    pub fn update_params(&self) -> UpdateInstanceParams {
        UpdateInstanceParams {
            name: self.name.clone(),
            plan: self.plan.clone(),
            nodes: self.nodes,
        }
    }

    /// Overwrite the fields the API is authoritative for
    fn apply_record(&mut self, instance: &Instance) {
        self.id = Some(instance.id.to_string());
        self.name = instance.name.clone();
        self.region = instance.region.clone();
        self.plan = instance.plan.clone();
        self.url = Some(instance.url.clone());
        self.apikey = Some(instance.apikey.clone());
    }

    fn decode(value: &DynamicValue, strict: bool) -> Result<Self> {
        let field = |name: &'static str| -> Result<String> {
            if strict {
                required_string(value, name)
            } else {
                Ok(optional_string(value, name)?.unwrap_or_default())
            }
        };

        Ok(Self {
            id: optional_string(value, "id")?,
            name: field("name")?,
            plan: field("plan")?,
            region: field("region")?,
            vpc_subnet: optional_string(value, "vpc_subnet")?,
            nodes: optional_int(value, "nodes")?,
            rmq_version: optional_string(value, "rmq_version")?,
            url: optional_string(value, "url")?,
            apikey: optional_string(value, "apikey")?,
        })
    }
}

/// Handler for `cloudamqp_instance`
pub struct InstanceResource;

#[async_trait::async_trait]
impl Resource for InstanceResource {
    type Model = InstanceModel;

    fn type_name() -> &'static str {
        TYPE_NAME
    }

    fn schema() -> Schema {
        schema::instance_schema()
    }

    fn from_config(config: &DynamicValue) -> Result<InstanceModel> {
        InstanceModel::decode(config, true)
    }

    fn from_state(state: &DynamicValue) -> Result<InstanceModel> {
        InstanceModel::decode(state, false)
    }

    fn id(model: &InstanceModel) -> Option<String> {
        model.id.clone()
    }

    fn set_id(model: &mut InstanceModel, id: Option<String>) {
        model.id = id;
    }

    fn to_state(model: &InstanceModel) -> DynamicValue {
        let Some(id) = model.id.as_deref() else {
            return DynamicValue::Null;
        };

        make_state(vec![
            ("id", string_value(id)),
            ("name", string_value(&model.name)),
            ("plan", string_value(&model.plan)),
            ("region", string_value(&model.region)),
            ("vpc_subnet", optional_string_value(model.vpc_subnet.as_deref())),
            ("nodes", optional_int_value(model.nodes)),
            ("rmq_version", optional_string_value(model.rmq_version.as_deref())),
            ("url", optional_string_value(model.url.as_deref())),
            ("apikey", optional_string_value(model.apikey.as_deref())),
        ])
    }

    /// Creates the instance, then reads it back to fill in the computed
    /// attributes. When that read fails the identifier is kept.
    async fn create(api: &dyn InstanceApi, model: &mut InstanceModel) -> Result<()> {
        let instance = api.create_instance(&model.create_params()).await?;

        model.id = Some(instance.id.to_string());
        Self::read(api, model).await
    }

    /// Refreshes the model from the API. An instance the API reports as
    /// missing clears the identifier; any other failure is returned.
    async fn read(api: &dyn InstanceApi, model: &mut InstanceModel) -> Result<()> {
        let id = model.remote_id()?;

        match api.get_instance(id).await {
            Ok(instance) => {
                model.apply_record(&instance);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                model.id = None;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(api: &dyn InstanceApi, model: &mut InstanceModel) -> Result<()> {
        let id = model.remote_id()?;

        debug!("Updating CloudAMQP instance {}", model.name);

        api.update_instance(id, &model.update_params())
            .await
            .map_err(|source| Error::UpdateFailed {
                name: model.name.clone(),
                source,
            })?;

        Self::read(api, model).await
    }

    async fn delete(api: &dyn InstanceApi, model: &mut InstanceModel) -> Result<()> {
        let id = model.remote_id()?;

        api.delete_instance(id).await?;
        model.id = None;
        Ok(())
    }
}
