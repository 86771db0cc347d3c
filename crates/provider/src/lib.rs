
//! CloudAMQP Terraform Provider
//!
//! This crate implements the `cloudamqp_instance` resource: the schema the
//! host framework plans against, the create/read/update/delete handlers,
//! and a client for the CloudAMQP management API.

pub mod client;
pub mod config;
pub mod error;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod state;

pub use client::{CloudAmqpClient, Instance, InstanceApi};
pub use config::ClientConfig;
pub use error::{ApiError, Error, Result};
pub use provider::{CloudAmqpProvider, Diagnostic, Severity, StateResponse};
pub use resources::instance::{InstanceModel, InstanceResource};
pub use resources::Resource;
