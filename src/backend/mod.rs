// =============================================================================
// BACKEND — Le collaborateur d'accès aux données
// =============================================================================
//
// Le cœur (module core) ne sait PAS où vivent les données. Il formule un
// plan de chargement (FetchPlan) et le confie à une DataSource, qui lui
// rend des enregistrements implémentant le trait Record.
//
//   memory → données en mémoire (Instance), relations résolues à la demande
//   sql    → traduction d'un FetchPlan en requêtes SQL (explication)
//
// Un seul appel `fetch` par requête : la racine ET ses relations de
// premier niveau planifiées. Les sauts plus profonds sont la
// responsabilité de l'enregistrement renvoyé (chargement paresseux).
//
// Les politiques de reprise, délai ou annulation appartiennent à
// l'implémentation de DataSource, pas au cœur.
//
// =============================================================================

pub mod memory;
pub mod sql;

use crate::core::plan::FetchPlan;
use crate::core::record::Record;
use crate::core::registry::EntityHandle;
use crate::error::Result;

/// Trait abstrait pour toutes les sources de données.
pub trait DataSource {
    /// Type d'enregistrement renvoyé, qui peut emprunter la source
    type Record<'a>: Record
    where
        Self: 'a;

    /// Charge tous les enregistrements de l'entité racine, avec les
    /// relations de premier niveau du plan préchargées.
    fn fetch(&self, handle: &EntityHandle, plan: &FetchPlan) -> Result<Vec<Self::Record<'_>>>;

    /// Charge un enregistrement par sa clé primaire.
    fn find(&self, handle: &EntityHandle, id: i64) -> Result<Option<Self::Record<'_>>>;

    /// Nom de la source (pour les journaux)
    fn name(&self) -> &str;
}
