use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::reflect::{Binding, Function, Parameter, Structure};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureJson {
    pub name: String,
    pub members: Vec<ParameterJson>,
}

impl StructureJson {
    pub fn from_structure(structure: &Structure) -> Self {
        Self {
            name: structure.name.clone(),
            members: structure.members.iter().map(ParameterJson::from_parameter).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionJson {
    pub name: String,
    pub inputs: Vec<ParameterJson>,
    pub attributes: BTreeMap<String, FunctionAttributeValue>,
}

impl FunctionJson {
    pub fn from_function(function: &Function) -> Self {
        let attributes = function
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), FunctionAttributeValue::from_value(value)))
            .collect();

        Self {
            name: function.name.clone(),
            inputs: function.inputs.iter().map(ParameterJson::from_parameter).collect(),
            attributes,
        }
    }
}

/// `true` for flags like `@vertex`, the argument text otherwise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FunctionAttributeValue {
    Flag(bool),
    Value(String),
}

impl FunctionAttributeValue {
    pub fn from_value(value: &str) -> Self {
        if value.is_empty() {
            Self::Flag(true)
        } else {
            Self::Value(value.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterJson {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// repeated attribute names collapse to the last one
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl ParameterJson {
    pub fn from_parameter(parameter: &Parameter) -> Self {
        let attributes = parameter
            .attributes
            .iter()
            .map(|attribute| {
                let value = AttributeValue::from_attribute(&attribute.name, &attribute.value);
                (attribute.name.clone(), value)
            })
            .collect();

        Self {
            name: parameter.name.clone(),
            ty: parameter.ty.clone(),
            attributes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Location(u32),
    Text(String),
}

impl AttributeValue {
    /// `location` is written as a number, everything else as its raw text
    pub fn from_attribute(name: &str, value: &str) -> Self {
        match (name, value.parse()) {
            ("location", Ok(location)) => Self::Location(location),
            _ => Self::Text(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingJson {
    pub binding: u32,
    pub group: u32,
    pub name: String,
    pub binding_type: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl BindingJson {
    pub fn from_binding(binding: &Binding) -> Self {
        Self {
            binding: binding.binding,
            group: binding.group,
            name: binding.name.clone(),
            binding_type: binding.binding_type.clone(),
            ty: binding.ty.clone(),
        }
    }
}
