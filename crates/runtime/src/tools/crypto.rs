//! Cryptocurrency price tools backed by a quote source.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::model::ToolSpec;
use crate::tools::{Tool, ToolArguments, ToolError, ToolRegistry};

pub const CRYPTOCOMPARE_BASE_URL: &str = "https://min-api.cryptocompare.com";

/// Something that can quote a USD price for an asset code.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// The `RAW.PRICE` value for `code`, as the source reported it.
    async fn usd_price(&self, code: &str) -> Result<Value, ToolError>;
}

/// CryptoCompare average-price endpoint.
#[derive(Debug, Clone)]
pub struct CryptoCompare {
    client: reqwest::Client,
    base_url: String,
}

impl CryptoCompare {
    pub fn new() -> Self {
        Self::with_base_url(CRYPTOCOMPARE_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Use a preconfigured HTTP client instead of a default one.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self, code: &str) -> Result<reqwest::Url, ToolError> {
        let base = format!("{}/data/generateAvg", self.base_url.trim_end_matches('/'));
        reqwest::Url::parse_with_params(&base, [("fsym", code), ("tsym", "USD"), ("e", "coinbase")])
            .map_err(|e| ToolError::Execution(format!("bad quote url: {e}")))
    }

    async fn fetch(&self, code: &str) -> Result<Value, ToolError> {
        let url = self.endpoint(code)?;
        debug!(%url, "fetching quote");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ToolError::Execution(format!(
                "quote source returned {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        extract_price(&body)
    }
}

impl Default for CryptoCompare {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteSource for CryptoCompare {
    async fn usd_price(&self, code: &str) -> Result<Value, ToolError> {
        let result = self.fetch(code).await;
        if let Err(e) = &result {
            warn!(code, error = %e, "price lookup failed");
        }
        result
    }
}

/// Pull `RAW.PRICE` out of a quote body.
fn extract_price(body: &Value) -> Result<Value, ToolError> {
    body.get("RAW")
        .filter(|raw| raw.is_object())
        .ok_or_else(|| ToolError::Execution("response has no RAW section".into()))?
        .get("PRICE")
        .filter(|price| !price.is_null())
        .cloned()
        .ok_or_else(|| ToolError::Execution("RAW section has no PRICE".into()))
}

/// Render a price the way the source reported it (`67000`, `0.0712`).
fn render_price(price: &Value) -> Result<String, ToolError> {
    match price {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        other => Err(ToolError::Execution(format!("unexpected price value {other}"))),
    }
}

/// Current bitcoin price; takes no arguments.
pub struct BitcoinPrice {
    source: Arc<dyn QuoteSource>,
}

impl BitcoinPrice {
    pub const NAME: &'static str = "get_bitcoin_price";

    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for BitcoinPrice {
    fn spec(&self) -> ToolSpec {
        ToolSpec::without_parameters(Self::NAME, "Returns the current price of bitcoin")
    }

    async fn execute(&self, _args: ToolArguments) -> Result<String, ToolError> {
        let price = self.source.usd_price("BTC").await?;
        Ok(format!("The price of bitcoin is ${}", render_price(&price)?))
    }
}

/// Price of any cryptocurrency given its display name and code.
pub struct CryptoPrice {
    source: Arc<dyn QuoteSource>,
}

impl CryptoPrice {
    pub const NAME: &'static str = "get_crypto_price";

    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for CryptoPrice {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: Self::NAME.into(),
            description: "Returns the current price of a cryptocurrency given its name and code"
                .into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "currency": {
                        "type": "string",
                        "description": "The name of the cryptocurrency, e.g., Bitcoin"
                    },
                    "currency_code": {
                        "type": "string",
                        "description": "The code of the cryptocurrency, e.g., BTC"
                    }
                },
                "required": ["currency", "currency_code"]
            }),
        }
    }

    async fn execute(&self, args: ToolArguments) -> Result<String, ToolError> {
        let currency = args.required_str("currency")?;
        let code = args.required_str("currency_code")?;
        let price = self.source.usd_price(code).await?;
        Ok(format!("The price of {currency} is ${}", render_price(&price)?))
    }
}

/// Registry with both price tools sharing one quote source.
pub fn default_registry(source: Arc<dyn QuoteSource>) -> ToolRegistry {
    ToolRegistry::new()
        .with_tool(BitcoinPrice::new(Arc::clone(&source)))
        .with_tool(CryptoPrice::new(source))
}
