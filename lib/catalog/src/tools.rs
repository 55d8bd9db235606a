//! Catalog lookup tools.
//!
//! Output is plain text meant to be read by the model, which rephrases it for
//! the caller. A catalog that fails to load is treated as empty.

use crate::service::{Service, dollars};
use crate::source::CatalogSource;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use spa_receptionist_conversation::{Tool, ToolDefinition, ToolError, ToolRegistry};
use std::fmt::Write;
use std::sync::Arc;
use tracing::warn;

async fn load_or_empty(source: &dyn CatalogSource) -> Vec<Service> {
    match source.load().await {
        Ok(services) => services,
        Err(e) => {
            warn!(error = %e, "failed to load catalog");
            Vec::new()
        }
    }
}

fn string_arg<'a>(tool: &str, arguments: &'a JsonValue, key: &str) -> Result<&'a str, ToolError> {
    arguments[key]
        .as_str()
        .ok_or_else(|| ToolError::InvalidInput {
            name: tool.to_string(),
            reason: format!("'{key}' must be a string"),
        })
}

fn number_arg(tool: &str, arguments: &JsonValue, key: &str) -> Result<f64, ToolError> {
    let value = &arguments[key];
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| ToolError::InvalidInput {
            name: tool.to_string(),
            reason: format!("'{key}' must be a number"),
        })
}

/// Lists every service with price and duration.
pub struct GetAllServices {
    source: Arc<dyn CatalogSource>,
}

impl GetAllServices {
    #[must_use]
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for GetAllServices {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "get_all_services",
            "Get the complete list of spa services with prices and duration",
        )
    }

    async fn execute(&self, _arguments: &JsonValue) -> Result<String, ToolError> {
        let services = load_or_empty(self.source.as_ref()).await;
        if services.is_empty() {
            return Ok("Sorry, I couldn't load our services right now.".to_string());
        }

        let mut out = String::from("✨ SPA SERVICES ✨\n\n");
        for service in &services {
            let _ = writeln!(out, "• {} - {}", service.name, service.price_label());
            let _ = writeln!(out, "  Duration: {}\n", service.duration);
        }
        Ok(out)
    }
}

/// Looks up one service by name, exact match first, then substring.
pub struct GetServiceInfo {
    source: Arc<dyn CatalogSource>,
}

impl GetServiceInfo {
    #[must_use]
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for GetServiceInfo {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("get_service_info", "Get details about a specific service")
            .with_param("service_name", "string - Name of the service")
    }

    async fn execute(&self, arguments: &JsonValue) -> Result<String, ToolError> {
        let wanted = string_arg("get_service_info", arguments, "service_name")?;
        let needle = wanted.to_lowercase();
        let services = load_or_empty(self.source.as_ref()).await;

        if let Some(service) = services.iter().find(|s| s.name.to_lowercase() == needle) {
            return Ok(format!(
                "{}\nPrice: {}\nDuration: {}",
                service.name,
                service.price_label(),
                service.duration
            ));
        }

        let matches: Vec<&Service> = services
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .collect();
        if matches.is_empty() {
            return Ok(format!("Sorry, I couldn't find '{wanted}' in our services."));
        }

        let mut out = String::from("Did you mean:\n");
        for service in matches {
            let _ = writeln!(out, "• {} ({})", service.name, service.price_label());
        }
        Ok(out)
    }
}

/// Lists services at or under a price.
pub struct SearchByPrice {
    source: Arc<dyn CatalogSource>,
}

impl SearchByPrice {
    #[must_use]
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for SearchByPrice {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("search_by_price", "Find services under a specific price")
            .with_param("max_price", "number - Maximum price")
    }

    async fn execute(&self, arguments: &JsonValue) -> Result<String, ToolError> {
        let max_price = number_arg("search_by_price", arguments, "max_price")?;
        let services = load_or_empty(self.source.as_ref()).await;

        let affordable: Vec<&Service> = services.iter().filter(|s| s.price <= max_price).collect();
        if affordable.is_empty() {
            return Ok(format!(
                "Sorry, we don't have services under {}.",
                dollars(max_price)
            ));
        }

        let mut out = format!("Services under {}:\n\n", dollars(max_price));
        for service in affordable {
            let _ = writeln!(
                out,
                "• {} - {} ({})",
                service.name,
                service.price_label(),
                service.duration
            );
        }
        Ok(out)
    }
}

/// Groups services into nail, hair and spa sections.
pub struct GetServiceCategories {
    source: Arc<dyn CatalogSource>,
}

impl GetServiceCategories {
    #[must_use]
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }
}

fn is_nail(name: &str) -> bool {
    name.contains("nail") || name == "manicure" || name == "pedicure"
}

fn is_hair(name: &str) -> bool {
    name.contains("hair") || name.contains("blowout")
}

fn is_spa(name: &str) -> bool {
    name == "facial" || name == "massage"
}

fn in_category(services: &[Service], matches: fn(&str) -> bool) -> Vec<&Service> {
    services
        .iter()
        .filter(|s| matches(&s.name.to_lowercase()))
        .collect()
}

fn write_section(out: &mut String, heading: &str, services: &[&Service]) {
    if services.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading}");
    for service in services {
        let _ = writeln!(out, "  • {} - {}", service.name, service.price_label());
    }
}

#[async_trait]
impl Tool for GetServiceCategories {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "get_service_categories",
            "Get services organized by category (nails, hair, spa treatments)",
        )
    }

    async fn execute(&self, _arguments: &JsonValue) -> Result<String, ToolError> {
        let services = load_or_empty(self.source.as_ref()).await;
        let nails = in_category(&services, is_nail);
        let hair = in_category(&services, is_hair);
        let spa = in_category(&services, is_spa);

        let mut out = String::from("📋 SERVICES BY CATEGORY\n\n");
        write_section(&mut out, "💅 NAIL SERVICES:", &nails);
        if !nails.is_empty() {
            out.push('\n');
        }
        write_section(&mut out, "💇 HAIR SERVICES:", &hair);
        if !hair.is_empty() {
            out.push('\n');
        }
        write_section(&mut out, "🧖 SPA TREATMENTS:", &spa);
        Ok(out)
    }
}

/// Builds a registry holding every catalog tool.
#[must_use]
pub fn catalog_registry(source: Arc<dyn CatalogSource>) -> ToolRegistry {
    ToolRegistry::new()
        .with_tool(GetAllServices::new(source.clone()))
        .with_tool(GetServiceInfo::new(source.clone()))
        .with_tool(SearchByPrice::new(source.clone()))
        .with_tool(GetServiceCategories::new(source))
}
