//! Menu lookup tool implementation
//!
//! Serves the restaurant chat server's fixed daily menu. Lookup is
//! case-insensitive on the category and answers with a fallback string for
//! anything off the menu, so the tool itself never fails.

use crate::config::Config;
use crate::tools::{Tool, ToolDescription, ToolError};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Answer for categories the menu does not cover
const NO_MENU_FOUND: &str = "No Menu Found";

/// Today's menu, keyed by lowercase category
static MENU: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("breakfast", "Egg Dosa, Idly, Chutney"),
        ("lunch", "Sangati and chicken curry"),
        ("dinner", "Chapati and Egg bhurji"),
    ])
});

/// Daily menu tool for the restaurant assistant
pub struct GetMenuTool;

impl Default for GetMenuTool {
    fn default() -> Self {
        Self::new()
    }
}

impl GetMenuTool {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a category to its menu text (pure function)
    fn lookup_menu(category: &str) -> &'static str {
        MENU.get(category.to_lowercase().as_str())
            .copied()
            .unwrap_or(NO_MENU_FOUND)
    }
}

#[async_trait]
impl Tool for GetMenuTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: "get_menu".to_string(),
            description: "Returns the final answer for today's menu for the given category (breakfast,lunch or dinner). Use this tool to directly answer the user's menu question.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "category": {
                        "type": "string",
                        "description": "Type of food. Example: breakfast, lunch, dinner"
                    }
                },
                "required": ["category"],
                "additionalProperties": false
            }),
        }
    }

    async fn initialize(&mut self, _config: &Config) -> Result<(), ToolError> {
        Ok(())
    }

    async fn execute(&self, parameters: &Value) -> Result<Value, ToolError> {
        let category = parameters
            .get("category")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ToolError::ExecutionError("Missing required parameter: category".to_string())
            })?;

        Ok(Value::String(Self::lookup_menu(category).to_string()))
    }
}
