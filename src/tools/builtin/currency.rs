//! Currency conversion tool implementation
//!
//! Fetches a live rate table from the open exchange rate API and converts an
//! amount between two currency codes. The computed result stays structured;
//! protocol boundaries turn it into confirmation text through
//! [`Tool::render`].

use crate::config::Config;
use crate::tools::{render_payload, Tool, ToolDescription, ToolError};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Default exchange rate API, overridable through `[rates] base_url`
const DEFAULT_BASE_URL: &str = "https://open.er-api.com";

/// Arguments for a conversion request
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConvertCurrencyParams {
    /// Amount to convert, e.g: 100, 200
    pub amount: f64,
    /// source currency code e.g: USD
    pub from: String,
    /// target currency code e.g: INR
    pub to: String,
}

/// Computed conversion, rendered to text at the protocol boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub converted: f64,
    pub rate: f64,
}

/// Subset of the rate API response the tool reads
#[derive(Debug, Deserialize)]
struct RateResponse {
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// Currency conversion tool backed by open.er-api.com
pub struct ConvertCurrencyTool {
    client: Option<reqwest::Client>,
    base_url: String,
}

impl Default for ConvertCurrencyTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvertCurrencyTool {
    pub fn new() -> Self {
        Self {
            client: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Build the rate endpoint for a source currency (pure function)
    ///
    /// Currency codes are uppercased on the wire; error messages keep the
    /// caller's original spelling.
    fn rate_url(base_url: &str, from: &str) -> String {
        format!("{}/v6/latest/{}", base_url, from.to_uppercase())
    }

    /// Compute the conversion from a fetched rate table (pure function)
    fn convert(
        params: &ConvertCurrencyParams,
        rates: &HashMap<String, f64>,
    ) -> Result<ConversionResult, ToolError> {
        let to_upper = params.to.to_uppercase();
        let rate = rates.get(&to_upper).copied().ok_or_else(|| {
            ToolError::ExecutionError(format!("Invalid target currency: {}", params.to))
        })?;

        Ok(ConversionResult {
            amount: params.amount,
            from: params.from.to_uppercase(),
            to: to_upper,
            converted: params.amount * rate,
            rate,
        })
    }

    /// Format a conversion as the confirmation text callers see (pure function)
    fn format_conversion(result: &ConversionResult) -> String {
        format!(
            "✔ Converted {} {} → {:.2} {}\n(Exchange Rate: 1 {} = {} {})",
            result.amount, result.from, result.converted, result.to, result.from, result.rate,
            result.to
        )
    }
}

#[async_trait]
impl Tool for ConvertCurrencyTool {
    fn describe(&self) -> ToolDescription {
        let schema = schemars::schema_for!(ConvertCurrencyParams);
        ToolDescription {
            name: "convert_currency".to_string(),
            description: "Convert amount from one currency to another currency".to_string(),
            parameters: serde_json::to_value(schema).expect("Schema should be serializable"),
        }
    }

    async fn initialize(&mut self, config: &Config) -> Result<(), ToolError> {
        self.base_url = config.rates.base_url.trim_end_matches('/').to_string();
        self.client = Some(
            reqwest::Client::builder()
                .build()
                .map_err(|e| ToolError::InitializationError(e.to_string()))?,
        );

        Ok(())
    }

    async fn execute(&self, parameters: &Value) -> Result<Value, ToolError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ToolError::ExecutionError("Tool not initialized".to_string()))?;

        let params: ConvertCurrencyParams = serde_json::from_value(parameters.clone())
            .map_err(|e| ToolError::ExecutionError(format!("Invalid parameters: {e}")))?;

        tracing::debug!(
            amount = params.amount,
            from = %params.from,
            to = %params.to,
            "Converting currency"
        );

        let response = client
            .get(Self::rate_url(&self.base_url, &params.from))
            .send()
            .await
            .map_err(|e| ToolError::ExecutionError(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionError(format!(
                "Failed to fetch exchange rate for {}",
                params.from
            )));
        }

        let body: RateResponse = response
            .json()
            .await
            .map_err(|e| ToolError::ExecutionError(format!("Failed to parse response: {e}")))?;

        let result = Self::convert(&params, &body.rates)?;

        serde_json::to_value(&result)
            .map_err(|e| ToolError::ExecutionError(format!("Failed to serialize result: {e}")))
    }

    fn render(&self, payload: &Value) -> String {
        match serde_json::from_value::<ConversionResult>(payload.clone()) {
            Ok(result) => Self::format_conversion(&result),
            Err(_) => render_payload(payload),
        }
    }

    async fn shutdown(&mut self) -> Result<(), ToolError> {
        self.client = None;
        Ok(())
    }
}
