/*
 * convert.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Conversion between ConfigNode and serde_json::Value.
 */

use crate::types::{ConfigNode, Scalar};
use serde_json::{Map, Value};

impl From<Value> for ConfigNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ConfigNode::Scalar(Scalar::Null),
            Value::Bool(b) => ConfigNode::Scalar(Scalar::Bool(b)),
            Value::Number(n) => ConfigNode::Scalar(Scalar::Number(n)),
            Value::String(s) => ConfigNode::Scalar(Scalar::String(s)),
            Value::Array(items) => {
                ConfigNode::Sequence(items.into_iter().map(ConfigNode::from).collect())
            }
            Value::Object(map) => ConfigNode::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, ConfigNode::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<ConfigNode> for Value {
    fn from(node: ConfigNode) -> Self {
        match node {
            ConfigNode::Scalar(Scalar::Null) => Value::Null,
            ConfigNode::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            ConfigNode::Scalar(Scalar::Number(n)) => Value::Number(n),
            ConfigNode::Scalar(Scalar::String(s)) => Value::String(s),
            ConfigNode::Sequence(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            ConfigNode::Mapping(map) => {
                let mut object = Map::new();
                for (key, child) in map {
                    object.insert(key, Value::from(child));
                }
                Value::Object(object)
            }
        }
    }
}
