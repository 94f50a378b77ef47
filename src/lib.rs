// =============================================================================
// SPARSEFIELDS — Projection creuse d'enregistrements relationnels
// =============================================================================
//
// Un client demande exactement les champs qu'il veut, relations
// comprises, avec un sélecteur compact :
//
//   GET /orders?fields=orders{id,status,users{username}}
//
//   [{"id": 1, "status": "pending", "user": {"username": "john_doe"}}, ...]
//
// Architecture :
//   core/     → parseur, normalisation, plan de chargement, projection
//   backend/  → accès aux données (mémoire) et traduction SQL du plan
//   seed      → schéma et données d'exemple (commandes)
//   config    → configuration du moteur
//   error     → les erreurs remontées à l'appelant
//
// =============================================================================

pub mod core;
pub mod backend;
pub mod config;
pub mod error;
pub mod seed;

pub use crate::backend::memory::MemorySource;
pub use crate::backend::DataSource;
pub use crate::config::EngineConfig;
pub use crate::core::engine::{QueryEngine, QueryPlan};
pub use crate::error::{QueryError, Result};
