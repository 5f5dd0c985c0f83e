use model::entities::PeriodKey;
use serde::{Deserialize, Serialize};

/// Caller-supplied options for one parse pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    /// First non-skipped row is the header.
    pub has_headers: bool,
    /// Leading rows to discard before the header (title banners etc.).
    pub skip_rows: usize,
    /// Year used when no date column exists; falls back to the current UTC
    /// year when unset. Always surfaces as an `INFERRED_YEAR` warning.
    pub default_year: Option<i32>,
    /// Site name assigned to rows without site data.
    pub default_site: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            has_headers: true,
            skip_rows: 0,
            default_year: None,
            default_site: "Unassigned site".to_string(),
        }
    }
}

impl ParseOptions {
    pub fn with_default_year(mut self, year: i32) -> Self {
        self.default_year = Some(year);
        self
    }

    pub fn with_default_site(mut self, site: &str) -> Self {
        self.default_site = site.to_string();
        self
    }
}

/// Caller-supplied options for one commit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportOptions {
    /// Create missing sites and periods instead of skipping their drafts.
    pub auto_create: bool,
    /// Force every draft into this period; when unset each draft resolves
    /// its own (year, quarter).
    pub target_period: Option<PeriodKey>,
}

impl ImportOptions {
    pub fn auto_create() -> Self {
        ImportOptions {
            auto_create: true,
            target_period: None,
        }
    }

    pub fn with_target_period(mut self, key: PeriodKey) -> Self {
        self.target_period = Some(key);
        self
    }
}
