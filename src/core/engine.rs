// =============================================================================
// ENGINE — Le contrat offert à l'appelant
// =============================================================================
//
// Le pipeline complet d'une requête de liste :
//
//   fields ──parse──► chemins ──normalize──► chemins relatifs à la racine
//                                               │
//                                             plan ──► FetchPlan
//                                               │
//   DataSource::fetch(handle, plan) ──► enregistrements ──project──► JSON
//
// Sans sélecteur (ou sélecteur vide), chaque enregistrement est rendu
// avec sa projection par défaut, sans passer par le pipeline.
//
// L'analyse du sélecteur précède la recherche de l'entité : un sélecteur
// invalide est signalé avant une entité inconnue.
//
// Le moteur ne garde aucun état mutable entre deux requêtes ; il peut
// être partagé entre threads si la DataSource le permet.
//
// =============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value as Json};
use tracing::{info, warn};

use super::normalize::normalize;
use super::path::FieldPath;
use super::plan::{plan, FetchPlan};
use super::project::project;
use super::record::Record;
use super::registry::{EntityHandle, Registry};
use super::selector::parse_with_depth;
use crate::backend::DataSource;
use crate::config::EngineConfig;
use crate::error::{QueryError, Result};

/// Résultat de la préparation d'une requête, avant tout chargement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub root: String,
    /// Chemins normalisés, triés
    pub paths: BTreeSet<FieldPath>,
    pub fetch: FetchPlan,
}

impl QueryPlan {
    pub fn to_json(&self) -> Json {
        serde_json::json!({
            "root": self.root,
            "paths": self.paths.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
            "eager": self.fetch.eager.iter().collect::<Vec<_>>(),
        })
    }
}

impl fmt::Display for QueryPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "racine  : {}", self.root)?;
        let paths: Vec<String> = self.paths.iter().map(|p| p.to_string()).collect();
        writeln!(f, "chemins : {}", paths.join(", "))?;
        write!(f, "plan    : {}", self.fetch)
    }
}

/// Le moteur de projection creuse.
pub struct QueryEngine<S: DataSource> {
    registry: Arc<Registry>,
    source: S,
    config: EngineConfig,
}

impl<S: DataSource> QueryEngine<S> {
    pub fn new(registry: Arc<Registry>, source: S) -> Self {
        QueryEngine {
            registry,
            source,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn handle(&self, root: &str) -> Result<&EntityHandle> {
        self.registry.handle(root).inspect_err(|_| {
            warn!(entity = root, "entité inconnue");
        })
    }

    /// parse → normalize → plan, sans charger de données.
    pub fn prepare(&self, root: &str, selector: &str) -> Result<QueryPlan> {
        let parsed = parse_with_depth(selector, self.config.max_selector_depth)?;
        self.handle(root)?;
        let paths = normalize(&self.registry, &parsed, root)?;
        let fetch = plan(&self.registry, &paths, root)?;
        Ok(QueryPlan {
            root: root.to_string(),
            paths,
            fetch,
        })
    }

    /// Même chose que `prepare` : sert à afficher ce qui serait chargé.
    pub fn explain(&self, root: &str, selector: &str) -> Result<QueryPlan> {
        self.prepare(root, selector)
    }

    /// Liste tous les enregistrements de `root`, projetés selon `fields`.
    pub fn list(&self, root: &str, fields: Option<&str>) -> Result<Vec<Map<String, Json>>> {
        let result = match fields {
            Some(selector) if !selector.is_empty() => {
                let query = self.prepare(root, selector)?;
                let handle = self.handle(root)?;
                let records = self.source.fetch(handle, &query.fetch)?;
                project(&records, &query.paths)
            }
            _ => {
                let handle = self.handle(root)?;
                let records = self.source.fetch(handle, &FetchPlan::root_only(root))?;
                records.iter().map(Record::default_projection).collect()
            }
        };
        info!(entity = root, source = self.source.name(), records = result.len(), "liste servie");
        Ok(result)
    }

    /// Un enregistrement par clé primaire, en projection par défaut.
    pub fn get(&self, root: &str, id: i64) -> Result<Map<String, Json>> {
        let handle = self.handle(root)?;
        let record = self
            .source
            .find(handle, id)?
            .ok_or_else(|| QueryError::not_found(root, id))?;
        info!(entity = root, id, source = self.source.name(), "enregistrement servi");
        Ok(record.default_projection())
    }
}
