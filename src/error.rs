// =============================================================================
// ERROR — Taxonomie des erreurs du moteur de projection
// =============================================================================
//
// Trois erreurs sont "côté client" et doivent rester distinguables pour
// qu'une couche HTTP puisse les traduire en codes différents :
//   InvalidSelector → sélecteur mal formé (400)
//   UnknownEntity   → entité racine absente du registre (404)
//   NotFound        → enregistrement individuel introuvable (404)
//
// Les deux autres (InvalidSchema, Config) sont des erreurs de démarrage.
//
// Un champ absent pendant la projection n'est JAMAIS une erreur :
// il est simplement omis du résultat.
//
// =============================================================================

use thiserror::Error;

use crate::core::validate::ValidationError;

/// Résultat standard du crate.
pub type Result<T> = std::result::Result<T, QueryError>;

/// Erreurs remontées à l'appelant.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Sélecteur syntaxiquement invalide (identifiant, accolades...).
    #[error("sélecteur invalide : {reason}")]
    InvalidSelector { reason: String },

    /// L'entité racine demandée n'existe pas dans le registre.
    #[error("l'entité '{entity}' n'existe pas")]
    UnknownEntity { entity: String },

    /// Enregistrement introuvable (recherche par identifiant).
    #[error("{entity}[{id}] introuvable")]
    NotFound { entity: String, id: i64 },

    /// Le schéma ou les données ne passent pas la validation.
    #[error("schéma invalide : {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    InvalidSchema(Vec<ValidationError>),

    /// Configuration illisible.
    #[error("configuration invalide : {0}")]
    Config(String),
}

impl QueryError {
    pub fn invalid_selector(reason: impl Into<String>) -> Self {
        QueryError::InvalidSelector { reason: reason.into() }
    }

    pub fn unknown_entity(entity: impl Into<String>) -> Self {
        QueryError::UnknownEntity { entity: entity.into() }
    }

    pub fn not_found(entity: impl Into<String>, id: i64) -> Self {
        QueryError::NotFound { entity: entity.into(), id }
    }

    /// Code stable, lisible par une machine.
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::InvalidSelector { .. } => "invalid_selector",
            QueryError::UnknownEntity { .. } => "unknown_entity",
            QueryError::NotFound { .. } => "not_found",
            QueryError::InvalidSchema(_) => "invalid_schema",
            QueryError::Config(_) => "config",
        }
    }

    /// Statut HTTP suggéré pour une couche de routage externe.
    pub fn status_code(&self) -> u16 {
        match self {
            QueryError::InvalidSelector { .. } => 400,
            QueryError::UnknownEntity { .. } | QueryError::NotFound { .. } => 404,
            QueryError::InvalidSchema(_) | QueryError::Config(_) => 500,
        }
    }

    /// L'erreur est-elle imputable à la requête du client ?
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::Config(err.to_string())
    }
}

impl From<std::io::Error> for QueryError {
    fn from(err: std::io::Error) -> Self {
        QueryError::Config(err.to_string())
    }
}
