//! Values returned by facade reads

use connect_core::{Function, RawValue, StateError, StateResult};
use serde_json::Value;

use crate::meta::MetaValue;
use crate::node::StateNode;

/// Result of reading a key through a [`StateNode`]
#[derive(Debug, Clone)]
pub enum StateValue {
    /// Null, bool, number or string, returned unwrapped
    Primitive(RawValue),
    /// Nested map or list, wrapped as a child node
    Node(StateNode),
    /// Callable taking explicit arguments, e.g. a parameterized derived entry
    Accessor(Function),
    /// Structured result of a derived entry. It has no location in the raw
    /// tree, so it is returned as plain data.
    Computed(RawValue),
    /// Reserved metadata
    Meta(MetaValue),
}

impl StateValue {
    /// Classify what a derived entry returned
    pub(crate) fn from_computed(value: RawValue) -> Self {
        match value {
            RawValue::Function(function) => StateValue::Accessor(function),
            value if value.is_primitive() => StateValue::Primitive(value),
            value => StateValue::Computed(value),
        }
    }
    
    pub fn kind(&self) -> &'static str {
        match self {
            StateValue::Primitive(raw) | StateValue::Computed(raw) => raw.kind(),
            StateValue::Node(_) => "node",
            StateValue::Accessor(_) => "function",
            StateValue::Meta(_) => "meta",
        }
    }
    
    pub fn is_node(&self) -> bool {
        matches!(self, StateValue::Node(_))
    }
    
    pub fn as_node(&self) -> Option<&StateNode> {
        match self {
            StateValue::Node(node) => Some(node),
            _ => None,
        }
    }
    
    pub fn into_node(self) -> Option<StateNode> {
        match self {
            StateValue::Node(node) => Some(node),
            _ => None,
        }
    }
    
    pub fn as_meta(&self) -> Option<&MetaValue> {
        match self {
            StateValue::Meta(meta) => Some(meta),
            _ => None,
        }
    }
    
    fn as_data(&self) -> Option<&RawValue> {
        match self {
            StateValue::Primitive(raw) | StateValue::Computed(raw) => Some(raw),
            _ => None,
        }
    }
    
    pub fn as_str(&self) -> Option<&str> {
        self.as_data().and_then(RawValue::as_str)
    }
    
    pub fn as_i64(&self) -> Option<i64> {
        self.as_data().and_then(RawValue::as_i64)
    }
    
    pub fn as_u64(&self) -> Option<u64> {
        self.as_data().and_then(RawValue::as_u64)
    }
    
    pub fn as_f64(&self) -> Option<f64> {
        self.as_data().and_then(RawValue::as_f64)
    }
    
    pub fn as_bool(&self) -> Option<bool> {
        self.as_data().and_then(RawValue::as_bool)
    }
    
    pub fn is_null(&self) -> bool {
        self.as_data().map(RawValue::is_null).unwrap_or(false)
    }
    
    /// Call an accessor with explicit arguments
    pub fn call(&self, args: &[RawValue]) -> StateResult<RawValue> {
        match self {
            StateValue::Accessor(function) => function.call(args).map_err(StateError::Callable),
            other => Err(StateError::NotCallable(other.kind())),
        }
    }
    
    /// The raw value behind this read. Nodes report their current raw value.
    pub fn to_raw(&self) -> StateResult<RawValue> {
        match self {
            StateValue::Primitive(raw) | StateValue::Computed(raw) => Ok(raw.clone()),
            StateValue::Node(node) => node.raw(),
            StateValue::Accessor(function) => Ok(RawValue::Function(function.clone())),
            StateValue::Meta(meta) => Ok(meta.to_raw()),
        }
    }
    
    pub fn to_json(&self) -> StateResult<Value> {
        Ok(self.to_raw()?.to_json())
    }
}
