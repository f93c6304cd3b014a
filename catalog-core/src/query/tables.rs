use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("identifier pattern is valid")
});

/// Physical table names of the catalog schema.
///
/// Names are interpolated into query text, so they are only obtainable
/// through [`TableNames::new`], which accepts plain (optionally
/// schema-qualified) SQL identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTableNames")]
pub struct TableNames {
    media_content: String,
    asset: String,
}

#[derive(Deserialize)]
struct RawTableNames {
    media_content: String,
    asset: String,
}

impl TryFrom<RawTableNames> for TableNames {
    type Error = CatalogError;

    fn try_from(raw: RawTableNames) -> Result<Self> {
        Self::new(raw.media_content, raw.asset)
    }
}

impl TableNames {
    pub fn new(
        media_content: impl Into<String>,
        asset: impl Into<String>,
    ) -> Result<Self> {
        let media_content = validate_identifier(media_content.into())?;
        let asset = validate_identifier(asset.into())?;
        Ok(Self {
            media_content,
            asset,
        })
    }

    pub fn media_content(&self) -> &str {
        &self.media_content
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            media_content: "media_content".to_string(),
            asset: "asset".to_string(),
        }
    }
}

fn validate_identifier(name: String) -> Result<String> {
    if IDENTIFIER.is_match(&name) {
        Ok(name)
    } else {
        Err(CatalogError::InvalidIdentifier(name))
    }
}
