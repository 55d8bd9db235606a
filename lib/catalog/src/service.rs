//! Service catalog entries.

use serde::{Deserialize, Serialize};

/// One bookable spa service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Display name, e.g. "Facial".
    pub name: String,
    /// Price in dollars.
    pub price: f64,
    /// Human-readable duration, e.g. "60 min".
    pub duration: String,
}

impl Service {
    #[must_use]
    pub fn new(name: impl Into<String>, price: f64, duration: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price,
            duration: duration.into(),
        }
    }

    /// Price as spoken in tool output: `$80`, `$42.5`.
    #[must_use]
    pub fn price_label(&self) -> String {
        dollars(self.price)
    }
}

/// Formats an amount with a leading dollar sign and no trailing `.0`.
#[must_use]
pub fn dollars(amount: f64) -> String {
    format!("${amount}")
}

/// The catalog document: `{"services": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub services: Vec<Service>,
}

impl Catalog {
    /// Parses a catalog document.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the document does not match the schema.
    pub fn from_json(document: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_prices_have_no_fraction() {
        assert_eq!(Service::new("Facial", 80.0, "60 min").price_label(), "$80");
        assert_eq!(dollars(42.5), "$42.5");
    }

    #[test]
    fn parses_integer_and_float_prices() {
        let catalog = Catalog::from_json(
            r#"{"services": [
                {"name": "Facial", "price": 80, "duration": "60 min"},
                {"name": "Manicure", "price": 35.5, "duration": "30 min"}
            ]}"#,
        )
        .expect("parse");

        assert_eq!(catalog.services.len(), 2);
        assert_eq!(catalog.services[0].price, 80.0);
        assert_eq!(catalog.services[1].price_label(), "$35.5");
    }

    #[test]
    fn rejects_missing_services_key() {
        assert!(Catalog::from_json(r#"{"items": []}"#).is_err());
    }
}
