//! Blocking HTTP client for the GBIF occurrence service.
//!
//! Compiled only with the `remote` cargo feature. All calls block the
//! caller and perform no retries; transport and status failures surface
//! as [`SpeciesError::Service`].

use log::{debug, info};
use serde::Deserialize;

use crate::error::SpeciesError;
use crate::gbif::OccurrencePage;
use crate::occurrence::Occurrence;

/// Response of the species match endpoint; only the fields the client
/// uses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NameMatch {
    #[serde(default)]
    usage_key: Option<i64>,
    #[serde(default)]
    match_type: Option<String>,
    #[serde(default)]
    scientific_name: Option<String>,
}

/// A blocking client for the GBIF REST API.
pub struct GbifClient {
    base_url: String,
    timeout_ms: u64,
    page_size: u64,
}

impl Default for GbifClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GbifClient {
    /// A client against the public API with a 30 s timeout and
    /// 300-record pages (the service maximum).
    pub fn new() -> Self {
        Self {
            base_url: "https://api.gbif.org/v1".to_string(),
            timeout_ms: 30_000,
            page_size: 300,
        }
    }

    /// Point the client at a different service root (mirrors, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the request timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Override the page size.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn get(&self, url: &str) -> Result<String, SpeciesError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .build()
            .map_err(|e| SpeciesError::Service {
                detail: e.to_string(),
            })?;
        debug!("GET {url}");
        let response = client.get(url).send().map_err(|e| SpeciesError::Service {
            detail: format!("request to {url} failed: {e}"),
        })?;
        if !response.status().is_success() {
            return Err(SpeciesError::Service {
                detail: format!("{url} answered {}", response.status()),
            });
        }
        response.text().map_err(|e| SpeciesError::Service {
            detail: format!("reading body of {url}: {e}"),
        })
    }

    /// Resolve a scientific name to its backbone taxon key.
    pub fn match_species(&self, name: &str) -> Result<i64, SpeciesError> {
        let url = format!(
            "{}/species/match?name={}",
            self.base_url,
            urlencode(name)
        );
        let body = self.get(&url)?;
        let matched: NameMatch = serde_json::from_str(&body).map_err(|e| SpeciesError::Parse {
            detail: format!("species match: {e}"),
        })?;
        match (matched.match_type.as_deref(), matched.usage_key) {
            (Some("NONE"), _) | (_, None) => Err(SpeciesError::NoMatch {
                name: name.to_string(),
            }),
            (_, Some(key)) => {
                info!(
                    "matched '{name}' to taxon {key} ({})",
                    matched.scientific_name.as_deref().unwrap_or("?")
                );
                Ok(key)
            }
        }
    }

    /// Fetch one occurrence page.
    pub fn fetch_page(&self, taxon_key: i64, offset: u64) -> Result<OccurrencePage, SpeciesError> {
        let url = format!(
            "{}/occurrence/search?taxonKey={taxon_key}&limit={}&offset={offset}",
            self.base_url, self.page_size
        );
        let body = self.get(&url)?;
        crate::gbif::parse_occurrence_page(&body)
    }

    /// Fetch every occurrence record of a taxon, paging until the
    /// service signals the end of the listing (or hands back an empty
    /// page, whichever comes first).
    pub fn fetch_all_occurrences(&self, taxon_key: i64) -> Result<Vec<Occurrence>, SpeciesError> {
        let mut records = Vec::new();
        let mut offset = 0u64;
        loop {
            let page = self.fetch_page(taxon_key, offset)?;
            let fetched = page.results.len() as u64;
            records.extend(page.results.iter().cloned());
            debug!(
                "page at offset {offset}: {fetched} records (total {})",
                records.len()
            );
            if page.is_last() {
                break;
            }
            offset += fetched;
        }
        Ok(records)
    }
}

/// Percent-encode the characters that matter in a query value.
fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}
