//! Resource and provider schemas
//!
//! Declares the attributes the host framework plans against. The host owns
//! diffing and redaction; this module only carries the annotations and the
//! one diff rule the provider must answer itself (force-replace).

use serde::Serialize;

use crate::error::{Error, Result};
use crate::state::DynamicValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Number,
}

/// A single schema attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: AttributeType,
    pub description: &'static str,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    /// Changing the value destroys and recreates the resource
    pub force_new: bool,
}

impl Attribute {
    fn new(name: &'static str, ty: AttributeType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            description,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            force_new: false,
        }
    }

    pub fn required_string(name: &'static str, description: &'static str) -> Self {
        Self {
            required: true,
            ..Self::new(name, AttributeType::String, description)
        }
    }

    pub fn optional_string(name: &'static str, description: &'static str) -> Self {
        Self {
            optional: true,
            ..Self::new(name, AttributeType::String, description)
        }
    }

    pub fn optional_int(name: &'static str, description: &'static str) -> Self {
        Self {
            optional: true,
            ..Self::new(name, AttributeType::Number, description)
        }
    }

    pub fn computed_string(name: &'static str, description: &'static str) -> Self {
        Self {
            computed: true,
            ..Self::new(name, AttributeType::String, description)
        }
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Set by the provider only, never by configuration
    pub fn is_read_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

/// Schema for a resource type or the provider block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub version: i64,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn v0() -> Self {
        Self {
            version: 0,
            attributes: vec![],
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Reject configuration that sets a read-only attribute
    pub fn check_config(&self, config: &DynamicValue) -> Result<()> {
        for attr in self.attributes.iter().filter(|a| a.is_read_only()) {
            if config.get(attr.name).is_some_and(|v| !v.is_null()) {
                return Err(Error::ComputedField(attr.name));
            }
        }
        Ok(())
    }

    /// Force-new attributes whose value differs between prior state and the proposal
    pub fn requires_replace(
        &self,
        prior: &DynamicValue,
        proposed: &DynamicValue,
    ) -> Vec<&'static str> {
        if prior.is_null() || proposed.is_null() {
            return vec![];
        }

        self.attributes
            .iter()
            .filter(|a| a.force_new)
            .filter(|a| normalized(prior.get(a.name)) != normalized(proposed.get(a.name)))
            .map(|a| a.name)
            .collect()
    }
}

// Unset optionals show up as either null or "" depending on where the value came from
fn normalized(value: Option<&DynamicValue>) -> Option<&DynamicValue> {
    match value {
        None | Some(DynamicValue::Null) => None,
        Some(DynamicValue::String(s)) if s.is_empty() => None,
        other => other,
    }
}

/// Schema of the `cloudamqp_instance` resource
pub fn instance_schema() -> Schema {
    Schema::v0()
        .with_attribute(Attribute::required_string("name", "Name of the instance"))
        .with_attribute(Attribute::required_string(
            "plan",
            "Name of the plan, valid options are: \
             lemur, tiger, bunny, rabbit, panda, ape, hippo, lion",
        ))
        .with_attribute(Attribute::required_string(
            "region",
            "Name of the region you want to create your instance in",
        ))
        .with_attribute(
            Attribute::optional_string(
                "vpc_subnet",
                "Dedicated VPC subnet, shouldn't overlap with your current VPC's subnet",
            )
            .force_new(),
        )
        .with_attribute(Attribute::optional_int(
            "nodes",
            "Number of nodes in cluster (plan must support it)",
        ))
        .with_attribute(Attribute::optional_string("rmq_version", "RabbitMQ version"))
        .with_attribute(
            Attribute::computed_string("url", "URL of the CloudAMQP instance").sensitive(),
        )
        .with_attribute(
            Attribute::computed_string("apikey", "API key for the CloudAMQP instance").sensitive(),
        )
}

/// Schema of the provider configuration block
pub fn provider_schema() -> Schema {
    Schema::v0()
        .with_attribute(
            Attribute::optional_string(
                "apikey",
                "Account API key, defaults to the CLOUDAMQP_APIKEY environment variable",
            )
            .sensitive(),
        )
        .with_attribute(Attribute::optional_string(
            "baseurl",
            "Management API endpoint, defaults to CLOUDAMQP_BASEURL or the public endpoint",
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{make_state, string_value};

    #[test]
    fn test_instance_schema_annotations() {
        let schema = instance_schema();
        assert_eq!(schema.attributes.len(), 8);

        for name in ["name", "plan", "region"] {
            assert!(schema.attribute(name).unwrap().required, "{} should be required", name);
        }

        let subnet = schema.attribute("vpc_subnet").unwrap();
        assert!(subnet.optional && subnet.force_new);

        assert_eq!(schema.attribute("nodes").unwrap().ty, AttributeType::Number);

        for name in ["url", "apikey"] {
            let attr = schema.attribute(name).unwrap();
            assert!(attr.computed && attr.sensitive && attr.is_read_only());
        }

        let forced: Vec<_> = schema
            .attributes
            .iter()
            .filter(|a| a.force_new)
            .map(|a| a.name)
            .collect();
        assert_eq!(forced, vec!["vpc_subnet"]);
    }

    #[test]
    fn test_plan_description_lists_every_plan() {
        let plans = ["lemur", "tiger", "bunny", "rabbit", "panda", "ape", "hippo", "lion"];

        let schema = instance_schema();
        let description = schema.attribute("plan").unwrap().description;
        assert!(description.starts_with("Name of the plan, valid options are: lemur, "));
        for plan in plans {
            assert!(description.contains(plan));
        }
    }

    #[test]
    fn test_check_config_rejects_computed_values() {
        let schema = instance_schema();
        let config = make_state(vec![
            ("name", string_value("test-rmq")),
            ("apikey", string_value("k")),
        ]);

        assert!(matches!(
            schema.check_config(&config),
            Err(Error::ComputedField("apikey"))
        ));

        let config = make_state(vec![
            ("name", string_value("test-rmq")),
            ("url", DynamicValue::Null),
        ]);
        assert!(schema.check_config(&config).is_ok());
    }

    #[test]
    fn test_requires_replace_on_subnet_change() {
        let schema = instance_schema();
        let prior = make_state(vec![
            ("plan", string_value("lemur")),
            ("vpc_subnet", string_value("10.0.0.0/24")),
        ]);
        let proposed = make_state(vec![
            ("plan", string_value("tiger")),
            ("vpc_subnet", string_value("10.1.0.0/24")),
        ]);

        assert_eq!(schema.requires_replace(&prior, &proposed), vec!["vpc_subnet"]);
    }

    #[test]
    fn test_requires_replace_ignores_mutable_fields_and_unset_noise() {
        let schema = instance_schema();
        let prior = make_state(vec![
            ("plan", string_value("lemur")),
            ("vpc_subnet", string_value("")),
        ]);
        let proposed = make_state(vec![
            ("plan", string_value("tiger")),
            ("vpc_subnet", DynamicValue::Null),
        ]);

        assert!(schema.requires_replace(&prior, &proposed).is_empty());
        assert!(schema.requires_replace(&DynamicValue::Null, &proposed).is_empty());
    }

    #[test]
    fn test_provider_schema_marks_key_sensitive() {
        let schema = provider_schema();
        assert!(schema.attribute("apikey").unwrap().sensitive);
        assert!(!schema.attribute("baseurl").unwrap().sensitive);
    }
}
