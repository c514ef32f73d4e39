//! Output types for firm catalog tools
//!
//! These types are used as the return values from catalog tool methods.
//! They are serialized to JSON strings for the MCP protocol, and can be
//! deserialized in tests for type-safe validation.

use serde::{Deserialize, Serialize};

use crate::firms::catalog::LocationFilters;
use crate::firms::sheets::FormOptions;
use crate::firms::types::Firm;

/// Output from get_firm_details operation
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GetFirmDetailsOutput {
    pub firm: Firm,
}

impl GetFirmDetailsOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Output from list_firms operation
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ListFirmsOutput {
    pub firms: Vec<Firm>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
}

impl ListFirmsOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Output from list_filters operation
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ListFiltersOutput {
    #[serde(flatten)]
    pub filters: LocationFilters,
}

impl ListFiltersOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Output from form_options operation
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FormOptionsOutput {
    #[serde(flatten)]
    pub options: FormOptions,
}

impl FormOptionsOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Output from health operation
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthOutput {
    pub status: String,
    pub total_firms: usize,
    pub index_ready: bool,
    pub source: String,
    /// RFC 3339 load time
    pub loaded_at: String,
}

impl HealthOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Error output for catalog tools
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FirmErrorOutput {
    pub error: String,
}

impl FirmErrorOutput {
    /// Create a new error output
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize error"}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firms::catalog::CountryRegion;

    #[test]
    fn test_filters_output_is_flat() {
        let output = ListFiltersOutput {
            filters: LocationFilters {
                countries: vec!["Chile".to_string()],
                regions: vec!["LATAM".to_string()],
                mapping: vec![CountryRegion {
                    country: "Chile".to_string(),
                    region: "LATAM".to_string(),
                }],
            },
        };

        let value: serde_json::Value = serde_json::from_str(&output.to_json()).unwrap();
        assert_eq!(value["countries"][0], "Chile");
        assert_eq!(value["mapping"][0]["region"], "LATAM");

        let back: ListFiltersOutput = serde_json::from_str(&output.to_json()).unwrap();
        assert_eq!(back, output);
    }

    #[test]
    fn test_error_output() {
        let output = FirmErrorOutput::new("Firm not found: 42");
        assert_eq!(output.to_json(), r#"{"error":"Firm not found: 42"}"#);
    }
}
