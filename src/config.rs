use anyhow::{anyhow, Context, Result};
use scraper::Selector;
use url::Url;

/// Base used for relative links when the listing is read from disk.
pub const DEFAULT_LOCAL_BASE_URL: &str = "https://www.uni-potsdam.de";

/// CSS selectors locating the job ads on a listing page.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    pub heading: String,
    pub container: String,
    pub item: String,
    pub anchor: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            heading: "h1".to_string(),
            container: "div.up-content-link-box".to_string(),
            item: "li".to_string(),
            anchor: "a.up-document-link".to_string(),
        }
    }
}

/// Compiled form of [`ListingSelectors`].
pub struct CompiledSelectors {
    pub heading: Selector,
    pub container: Selector,
    pub item: Selector,
    pub anchor: Selector,
}

impl ListingSelectors {
    pub fn compile(&self) -> Result<CompiledSelectors> {
        Ok(CompiledSelectors {
            heading: parse_selector(&self.heading)?,
            container: parse_selector(&self.container)?,
            item: parse_selector(&self.item)?,
            anchor: parse_selector(&self.anchor)?,
        })
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector '{}': {}", css, e))
}

#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub selectors: ListingSelectors,
    pub local_base_url: Url,
    pub dry_run: bool,
}

impl HarvestConfig {
    pub fn new(local_base_url: &str, dry_run: bool) -> Result<Self> {
        let local_base_url = Url::parse(local_base_url)
            .with_context(|| format!("Invalid base URL: {}", local_base_url))?;
        Ok(Self {
            selectors: ListingSelectors::default(),
            local_base_url,
            dry_run,
        })
    }
}
