// =============================================================================
// CORE — Le pipeline de projection creuse
// =============================================================================
//
// Ce module regroupe toute la logique pure : aucune E/S, aucune base de
// données. Les données arrivent par le trait Record, fourni par un backend.
//
// Architecture :
//   typeside  → les types primitifs (String, Integer, Float, Boolean)
//   path      → un chemin pointé (`user.username`)
//   schema    → entités, attributs, FK et collections inverses
//   registry  → les entités racines validées et leurs alias
//   instance  → des données concrètes en mémoire
//   validate  → la vérification de cohérence
//   record    → la capacité "lire un champ nommé"
//   selector  → le parseur de sélecteurs (`orders{id,users{username}}`)
//   normalize → réécriture des chemins relativement à la racine
//   plan      → le plan de chargement anticipé
//   project   → assemblage des objets imbriqués
//   engine    → le contrat offert à l'appelant (list, get, explain)
//
// =============================================================================

pub mod typeside;
pub mod path;
pub mod schema;
pub mod registry;
pub mod instance;
pub mod validate;
pub mod record;
pub mod selector;
pub mod normalize;
pub mod plan;
pub mod project;
pub mod engine;

#[cfg(test)]
mod proptest_tests;
