//! Resource Implementations
//!
//! Implements the CRUD operations for each resource type.

pub mod instance;

use crate::client::InstanceApi;
use crate::error::Result;
use crate::schema::Schema;
use crate::state::DynamicValue;

/// Trait for resource operations
///
/// Each operation works on the typed model in place. The model is the
/// managed state: an operation that fails must leave it as it found it,
/// except where documented on the implementation.
#[async_trait::async_trait]
pub trait Resource {
    /// Typed form of the resource state
    type Model: Send;

    /// Resource type name
    fn type_name() -> &'static str;

    /// Declared attributes
    fn schema() -> Schema;

    /// Decode user configuration or a planned state, enforcing required attributes
    fn from_config(config: &DynamicValue) -> Result<Self::Model>;

    /// Decode persisted state
    fn from_state(state: &DynamicValue) -> Result<Self::Model>;

    /// Persisted identifier, if the remote object exists
    fn id(model: &Self::Model) -> Option<String>;

    fn set_id(model: &mut Self::Model, id: Option<String>);

    /// Encode the model; a model without an identifier encodes to null
    fn to_state(model: &Self::Model) -> DynamicValue;

    /// Create a new resource
    async fn create(api: &dyn InstanceApi, model: &mut Self::Model) -> Result<()>;

    /// Refresh an existing resource
    async fn read(api: &dyn InstanceApi, model: &mut Self::Model) -> Result<()>;

    /// Push changes to an existing resource
    async fn update(api: &dyn InstanceApi, model: &mut Self::Model) -> Result<()>;

    /// Delete a resource
    async fn delete(api: &dyn InstanceApi, model: &mut Self::Model) -> Result<()>;
}
