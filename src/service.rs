use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

use crate::firms::dictionary::load_dictionary_or_empty;
use crate::firms::tools::{FirmTools, GetFirmDetailsParams, ListFirmsParams};
use crate::firms::{Catalog, FirmSource};
use crate::search::tools::{
    ExpandQueryParams, QuickTagsParams, SearchByTagParams, SearchFirmsParams, SearchTools,
};
use crate::search::{SearchConfig, SearchEngine};

#[derive(Debug, Clone)]
pub struct FirmFinderService {
    firm_tools: FirmTools,
    search_tools: SearchTools,
    tool_router: ToolRouter<Self>,
}

impl FirmFinderService {
    /// Assemble the service from an already loaded catalog. Without an
    /// engine, search tools answer with a "not ready" error.
    pub fn new(catalog: Arc<Catalog>, engine: Option<Arc<SearchEngine>>) -> Self {
        Self {
            firm_tools: FirmTools::new(catalog),
            search_tools: SearchTools::new(engine),
            tool_router: Self::tool_router(),
        }
    }

    /// Load firms and the dictionary, then build the search engine.
    /// Any failure here is a startup failure.
    pub async fn initialize(
        source: &FirmSource,
        dictionary_path: Option<&Path>,
        config: SearchConfig,
    ) -> Result<Self> {
        let catalog = source.load().await?;
        let dictionary = load_dictionary_or_empty(dictionary_path);

        let engine: SearchEngine = SearchEngine::build(catalog.firms(), &dictionary, config)
            .context("Failed to build search engine")?;

        Ok(Self::new(Arc::new(catalog), Some(Arc::new(engine))))
    }
}

#[tool_router]
impl FirmFinderService {
    // Search tools
    #[tool(
        description = "Search law firms with a free-text query. The query is expanded with synonyms (e.g. 'medio ambiente' also looks for 'environment', 'esg') and matched fuzzily against firm name, tags, practice area, description, country and region, so typos and missing accents are tolerated. Results are ordered by rank tier (best firms first) and then by closeness, and each result explains which fields and terms matched."
    )]
    pub async fn search_firms(&self, params: Parameters<SearchFirmsParams>) -> String {
        self.search_tools.search_firms(params.0).await
    }

    #[tool(
        description = "Show the normalized terms a query expands to before searching. Useful to understand why search_firms returned a result or to debug synonym rules."
    )]
    pub async fn expand_query(&self, params: Parameters<ExpandQueryParams>) -> String {
        self.search_tools.expand_query(params.0).await
    }

    #[tool(
        description = "Find firms carrying a tag exactly, ignoring case and accents. Use after quick_tags to list every firm with one specialty. All results have relevance 100 and are ordered by rank tier."
    )]
    pub async fn search_by_tag(&self, params: Parameters<SearchByTagParams>) -> String {
        self.search_tools.search_by_tag(params.0).await
    }

    #[tool(
        description = "List the most frequent tags (specialties) with their counts, optionally restricted to one country or region. Good starting point to discover what the directory covers."
    )]
    pub async fn quick_tags(&self, params: Parameters<QuickTagsParams>) -> String {
        self.search_tools.quick_tags(params.0).await
    }

    #[tool(
        description = "Statistics about the indexed firms: totals, firms with tags and rankings, unique tags, countries and areas, the rank tier histogram and query cache counters."
    )]
    pub async fn index_stats(&self) -> String {
        self.search_tools.index_stats().await
    }

    #[tool(
        description = "Report the loaded synonym rule groups, the number of terms in the firm dictionary graph and a sample expansion."
    )]
    pub async fn synonym_stats(&self) -> String {
        self.search_tools.synonym_stats().await
    }

    // Catalog tools
    #[tool(
        description = "Get the full record of one firm by id, including testimonials, key clients and work highlights. The id comes from search results."
    )]
    pub async fn get_firm_details(&self, params: Parameters<GetFirmDetailsParams>) -> String {
        self.firm_tools.get_firm_details(params.0).await
    }

    #[tool(
        description = "List firms page by page, optionally filtered by exact country and region names as returned by list_filters."
    )]
    pub async fn list_firms(&self, params: Parameters<ListFirmsParams>) -> String {
        self.firm_tools.list_firms(params.0).await
    }

    #[tool(
        description = "List the countries, regions and country/region pairs present in the directory, for use as filters."
    )]
    pub async fn list_filters(&self) -> String {
        self.firm_tools.list_filters().await
    }

    #[tool(
        description = "List the countries and practice areas offered by the intake form."
    )]
    pub async fn form_options(&self) -> String {
        self.firm_tools.form_options().await
    }

    #[tool(description = "Check that the server is up and whether the search index is ready.")]
    pub async fn health(&self) -> String {
        self.firm_tools
            .health(self.search_tools.is_ready())
            .await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for FirmFinderService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "MCP server for finding law firms in a spreadsheet-backed directory. Use search_firms for free-text needs (Spanish or English, typos tolerated); it returns ranked results with an explanation of what matched. Use quick_tags to discover specialties and search_by_tag to list every firm with one of them. Use get_firm_details with a result id for the full record, and list_filters or list_firms to browse by country and region. expand_query, index_stats and synonym_stats help diagnose unexpected results.".to_string(),
            ),
            ..Default::default()
        }
    }
}
