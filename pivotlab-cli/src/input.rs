//! Input documents: linear problems and matrices in JSON or YAML.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Serialization format of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Format implied by the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(DocumentFormat::Json),
            Some("yaml" | "yml") => Ok(DocumentFormat::Yaml),
            _ => bail!(
                "cannot tell the format of {}: expected a .json, .yaml or .yml file",
                path.display()
            ),
        }
    }
}

/// Matrix document for `inverse`, `rank` and `solve`.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixInput {
    /// Row-major coefficient matrix.
    pub matrix: Vec<Vec<f64>>,
    /// Right-hand side, required by `solve`.
    #[serde(default)]
    pub rhs: Option<Vec<f64>>,
}

/// Read and deserialize a document, choosing the parser by extension.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = DocumentFormat::from_path(path)?;
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_document(&text, format).with_context(|| format!("failed to parse {}", path.display()))
}

/// Deserialize a document from text.
pub fn parse_document<T: DeserializeOwned>(text: &str, format: DocumentFormat) -> Result<T> {
    Ok(match format {
        DocumentFormat::Json => serde_json::from_str(text)?,
        DocumentFormat::Yaml => serde_yaml::from_str(text)?,
    })
}
