//! Registry entry metadata (spec §3 "NodeMetadata", §4.1).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Describes one input or output port a node type exposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortDescriptor {
    pub name: String,
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl PortDescriptor {
    #[must_use]
    pub fn main() -> Self {
        Self {
            name: "main".to_string(),
            required: true,
            description: None,
        }
    }

    #[must_use]
    pub fn new(name: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            required,
            description: None,
        }
    }
}

/// The kind of trigger a node exposes, per the node executor contract (§6.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Webhook,
    Polling,
    Schedule,
    Event,
}

/// Registry entry for a node type: type, category, port descriptors,
/// property schema, and the `isTrigger` flag that distinguishes entry
/// points from ordinary nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub node_type: String,
    pub display_name: String,
    pub description: String,
    pub category: String,
    pub inputs: Vec<PortDescriptor>,
    pub outputs: Vec<PortDescriptor>,
    /// Tree describing the shape of a valid `config`. Kept as a JSON value
    /// rather than a dedicated schema type — the executor only needs it for
    /// documentation and external tooling, never to evaluate it itself.
    #[serde(default)]
    pub property_schema: Value,
    pub is_trigger: bool,
    #[serde(default)]
    pub trigger_kind: Option<TriggerKind>,
}

impl NodeMetadata {
    #[must_use]
    pub fn new(node_type: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            display_name: display_name.into(),
            description: String::new(),
            category: "general".to_string(),
            inputs: vec![PortDescriptor::main()],
            outputs: vec![PortDescriptor::main()],
            property_schema: Value::Null,
            is_trigger: false,
            trigger_kind: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn with_inputs(mut self, inputs: Vec<PortDescriptor>) -> Self {
        self.inputs = inputs;
        self
    }

    #[must_use]
    pub fn with_outputs(mut self, outputs: Vec<PortDescriptor>) -> Self {
        self.outputs = outputs;
        self
    }

    #[must_use]
    pub fn with_property_schema(mut self, schema: Value) -> Self {
        self.property_schema = schema;
        self
    }

    #[must_use]
    pub fn as_trigger(mut self, kind: TriggerKind) -> Self {
        self.is_trigger = true;
        self.trigger_kind = Some(kind);
        self
    }
}
