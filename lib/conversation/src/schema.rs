//! Translation of tool definitions into model-facing input schemas.

use crate::tool::ToolDefinition;
use serde_json::{Map, Value as JsonValue, json};
use spa_receptionist_ai::ToolSchema;

/// Translates tool definitions into the schemas advertised to the model.
///
/// Each parameter becomes a property typed `number` or `string`, described by
/// its hint, and every parameter is required. Order follows the input.
#[must_use]
pub fn translate(definitions: &[ToolDefinition]) -> Vec<ToolSchema> {
    definitions.iter().map(translate_one).collect()
}

fn translate_one(definition: &ToolDefinition) -> ToolSchema {
    let mut properties = Map::new();
    for (name, spec) in &definition.parameters {
        properties.insert(
            name.clone(),
            json!({
                "type": spec.kind().as_str(),
                "description": spec.hint(),
            }),
        );
    }
    let required: Vec<&String> = definition.parameters.keys().collect();

    ToolSchema {
        name: definition.name.clone(),
        description: definition.description.clone(),
        input_schema: json!({
            "type": "object",
            "properties": JsonValue::Object(properties),
            "required": required,
        }),
    }
}
