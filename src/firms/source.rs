//! Where firms are loaded from.
//!
//! Three sources are supported:
//! - a JSON file holding an array of firm records,
//! - a directory of exported sheet value ranges (`results.json` and,
//!   optionally, `tags_conceptos.json`),
//! - the Google Sheets values API, read with an API key.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};

use crate::firms::catalog::Catalog;
use crate::firms::sheets::{
    CONCEPT_TAGS_RANGE, FormOptions, RESULTS_RANGE, ValueRange, concept_tags_by_firm,
    form_options, group_firm_rows,
};
use crate::firms::types::Firm;

/// Base URL of the Sheets values API
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// File holding the results range inside an export directory
pub const RESULTS_EXPORT_FILE: &str = "results.json";

/// File holding the concept tags range inside an export directory
pub const CONCEPT_TAGS_EXPORT_FILE: &str = "tags_conceptos.json";

/// A configured firm source
#[derive(Debug, Clone)]
pub enum FirmSource {
    /// JSON array of firm records
    FirmsFile(PathBuf),
    /// Directory of exported value ranges
    SheetExports(PathBuf),
    /// Live spreadsheet
    Spreadsheet {
        spreadsheet_id: String,
        api_key: String,
    },
}

impl FirmSource {
    /// Pick a source from the command line options; exactly one must be given
    pub fn from_options(
        firms_file: Option<PathBuf>,
        data_dir: Option<PathBuf>,
        spreadsheet_id: Option<String>,
        api_key: Option<String>,
    ) -> Result<Self> {
        match (firms_file, data_dir, spreadsheet_id) {
            (Some(path), None, None) => Ok(Self::FirmsFile(path)),
            (None, Some(dir), None) => Ok(Self::SheetExports(dir)),
            (None, None, Some(spreadsheet_id)) => {
                let api_key = api_key
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| anyhow!("An API key is required to read a spreadsheet"))?;
                Ok(Self::Spreadsheet {
                    spreadsheet_id,
                    api_key,
                })
            }
            (None, None, None) => {
                bail!("No firm source configured: use --firms-file, --data-dir or --spreadsheet-id")
            }
            _ => bail!("Only one of --firms-file, --data-dir or --spreadsheet-id may be given"),
        }
    }

    /// Description safe to log (never includes the API key)
    pub fn describe(&self) -> String {
        match self {
            Self::FirmsFile(path) => format!("firms file {}", path.display()),
            Self::SheetExports(dir) => format!("sheet exports in {}", dir.display()),
            Self::Spreadsheet { spreadsheet_id, .. } => format!("spreadsheet {spreadsheet_id}"),
        }
    }

    /// Load every firm and the form options
    pub async fn load(&self) -> Result<Catalog> {
        tracing::info!("Loading firms from {}", self.describe());

        let (firms, options) = match self {
            Self::FirmsFile(path) => (load_firms_file(path).await?, FormOptions::default()),
            Self::SheetExports(dir) => load_sheet_exports(dir).await?,
            Self::Spreadsheet {
                spreadsheet_id,
                api_key,
            } => SheetsClient::new(spreadsheet_id, api_key)?.load().await?,
        };

        let with_tags = firms.iter().filter(|f| f.has_tags()).count();
        tracing::info!("Loaded {} firms ({} with tags)", firms.len(), with_tags);

        Ok(Catalog::new(firms, options, self.describe()))
    }
}

/// Read a JSON array of firm records
pub async fn load_firms_file(path: &Path) -> Result<Vec<Firm>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read firms file: {}", path.display()))?;
    let firms: Vec<Firm> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse firms file: {}", path.display()))?;
    Ok(firms)
}

async fn read_value_range(path: &Path) -> Result<ValueRange> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read sheet export: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse sheet export: {}", path.display()))
}

/// Group the exported results range, merging in concept tags when exported
pub async fn load_sheet_exports(dir: &Path) -> Result<(Vec<Firm>, FormOptions)> {
    let results = read_value_range(&dir.join(RESULTS_EXPORT_FILE)).await?;

    let concept_path = dir.join(CONCEPT_TAGS_EXPORT_FILE);
    let concept = if concept_path.is_file() {
        read_value_range(&concept_path).await?
    } else {
        tracing::warn!(
            "No concept tags export at {}, firms keep their own tags only",
            concept_path.display()
        );
        ValueRange::default()
    };

    let firms = group_firm_rows(&results, &concept_tags_by_firm(&concept));
    Ok((firms, form_options(&concept)))
}

/// Minimal reader for the Sheets values API
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: reqwest::Client,
    spreadsheet_id: String,
    api_key: String,
}

impl SheetsClient {
    pub fn new(spreadsheet_id: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            spreadsheet_id: spreadsheet_id.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// URL of the values endpoint for `range`
    pub fn values_url(&self, range: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(SHEETS_API_BASE).context("Invalid Sheets API base URL")?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Sheets API base URL cannot have path segments"))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(range);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Fetch one range
    pub async fn fetch_range(&self, range: &str) -> Result<ValueRange> {
        let url = self.values_url(range)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to request range {range}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Sheets API returned {} for range {}", status, range);
        }

        response
            .json::<ValueRange>()
            .await
            .with_context(|| format!("Failed to decode range {range}"))
    }

    /// Fetch and group both sheets. The concept tags sheet is optional.
    pub async fn load(&self) -> Result<(Vec<Firm>, FormOptions)> {
        let results = self.fetch_range(RESULTS_RANGE).await?;
        let concept = match self.fetch_range(CONCEPT_TAGS_RANGE).await {
            Ok(range) => range,
            Err(e) => {
                tracing::warn!("Concept tags unavailable, continuing without them: {:#}", e);
                ValueRange::default()
            }
        };

        let firms = group_firm_rows(&results, &concept_tags_by_firm(&concept));
        Ok((firms, form_options(&concept)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_options_requires_exactly_one() {
        assert!(FirmSource::from_options(None, None, None, None).is_err());
        assert!(
            FirmSource::from_options(Some("a.json".into()), Some("dir".into()), None, None)
                .is_err()
        );
        assert!(FirmSource::from_options(None, None, Some("sheet".into()), None).is_err());
        assert!(matches!(
            FirmSource::from_options(None, Some("dir".into()), None, None),
            Ok(FirmSource::SheetExports(_))
        ));
    }

    #[test]
    fn test_describe_hides_api_key() {
        let source = FirmSource::Spreadsheet {
            spreadsheet_id: "abc".to_string(),
            api_key: "secret".to_string(),
        };
        assert!(!source.describe().contains("secret"));
    }

    #[test]
    fn test_values_url_encodes_range() {
        let client = SheetsClient::new("sheet-id", "k3y").unwrap();
        let url = client.values_url(CONCEPT_TAGS_RANGE).unwrap();
        let text = url.as_str();
        assert!(text.starts_with("https://sheets.googleapis.com/v4/spreadsheets/sheet-id/values/"));
        assert!(!text.contains(' '));
        assert!(text.ends_with("?key=k3y"));
    }

    #[tokio::test]
    async fn test_load_firms_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("firms.json");
        std::fs::write(
            &path,
            r#"[{"id": 1, "firm": "Andes Legal", "country": "Perú", "tags": "minería; agua"}]"#,
        )
        .unwrap();

        let catalog = FirmSource::FirmsFile(path).load().await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.firms()[0].tags_normalized, vec!["mineria", "agua"]);
    }

    #[tokio::test]
    async fn test_load_sheet_exports_without_concept_tags() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(RESULTS_EXPORT_FILE),
            r#"{"range": "Results3!A2:K", "values": [["Chile", "Energía", "Green Energy", "", "", "", "", "1", "solar"]]}"#,
        )
        .unwrap();

        let catalog = FirmSource::SheetExports(dir.path().to_path_buf())
            .load()
            .await
            .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.firms()[0].id, "0");
        assert!(catalog.form_options().countries.is_empty());
    }

    #[tokio::test]
    async fn test_missing_results_export_fails() {
        let dir = TempDir::new().unwrap();
        assert!(
            FirmSource::SheetExports(dir.path().to_path_buf())
                .load()
                .await
                .is_err()
        );
    }
}
