use std::sync::Arc;

use rmcp::schemars;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::firms::catalog::Catalog;
use crate::firms::outputs::{
    FirmErrorOutput, FormOptionsOutput, GetFirmDetailsOutput, HealthOutput, ListFiltersOutput,
    ListFirmsOutput,
};

/// Default page size of list_firms
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Largest page list_firms returns
pub const MAX_LIST_LIMIT: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetFirmDetailsParams {
    #[schemars(description = "The id of the firm, as returned by search results")]
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListFirmsParams {
    #[schemars(description = "Only firms in this country (exact name)")]
    pub country: Option<String>,
    #[schemars(description = "Only firms in this region (exact name)")]
    pub region: Option<String>,
    #[schemars(description = "Number of firms to skip (default 0)")]
    pub offset: Option<usize>,
    #[schemars(description = "Maximum number of firms to return (default 100, max 1000)")]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct FirmTools {
    catalog: Arc<Catalog>,
}

impl FirmTools {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Full record of one firm
    pub async fn get_firm_details(&self, params: GetFirmDetailsParams) -> String {
        let id = params.id.trim();
        if id.is_empty() {
            return FirmErrorOutput::new("Missing id").to_json();
        }

        match self.catalog.find_by_id(id) {
            Some(firm) => GetFirmDetailsOutput { firm: firm.clone() }.to_json(),
            None => FirmErrorOutput::new(format!("Firm not found: {id}")).to_json(),
        }
    }

    /// Page through firms, optionally filtered by location
    pub async fn list_firms(&self, params: ListFirmsParams) -> String {
        let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        if limit > MAX_LIST_LIMIT {
            return FirmErrorOutput::new(format!("Limit must not exceed {MAX_LIST_LIMIT}"))
                .to_json();
        }
        let offset = params.offset.unwrap_or(0);

        let filtered = self
            .catalog
            .filter_by_location(params.country.as_deref(), params.region.as_deref());
        let total = filtered.len();
        let firms: Vec<_> = filtered.into_iter().skip(offset).take(limit).collect();
        let has_more = offset.saturating_add(firms.len()) < total;

        ListFirmsOutput {
            firms,
            total,
            offset,
            limit,
            has_more,
        }
        .to_json()
    }

    /// Countries, regions and country/region pairs present in the catalog
    pub async fn list_filters(&self) -> String {
        ListFiltersOutput {
            filters: self.catalog.filters(),
        }
        .to_json()
    }

    /// Countries and areas offered by the intake form
    pub async fn form_options(&self) -> String {
        FormOptionsOutput {
            options: self.catalog.form_options().clone(),
        }
        .to_json()
    }

    /// Liveness report
    pub async fn health(&self, index_ready: bool) -> String {
        HealthOutput {
            status: "ok".to_string(),
            total_firms: self.catalog.len(),
            index_ready,
            source: self.catalog.source().to_string(),
            loaded_at: self.catalog.loaded_at().to_rfc3339(),
        }
        .to_json()
    }
}
