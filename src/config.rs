// =============================================================================
// CONFIG — Configuration du moteur
// =============================================================================
//
// Chargée depuis un fichier JSON ; tout champ absent prend sa valeur
// par défaut :
//
//   {
//     "max_selector_depth": 32,
//     "log_filter": "sparsefields=info",
//     "pretty": false
//   }
//
// =============================================================================

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::selector::DEFAULT_MAX_DEPTH;
use crate::error::{QueryError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Profondeur maximale d'imbrication des accolades d'un sélecteur
    pub max_selector_depth: usize,
    /// Filtre de journalisation utilisé quand RUST_LOG est absent
    pub log_filter: String,
    /// Sortie JSON indentée (CLI)
    pub pretty: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_selector_depth: DEFAULT_MAX_DEPTH,
            log_filter: "sparsefields=info".to_string(),
            pretty: false,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        if config.max_selector_depth == 0 {
            return Err(QueryError::Config("max_selector_depth doit être >= 1".into()));
        }
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| QueryError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }
}
