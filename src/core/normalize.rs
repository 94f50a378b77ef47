// =============================================================================
// NORMALIZE — Réécriture des chemins relativement à l'entité racine
// =============================================================================
//
// Deux réécritures, appliquées à chaque chemin :
//
//   1. Si le premier segment est le nom de l'entité racine, on le retire :
//        racine `orders` :  orders.status → status
//      (le client peut envelopper toute sa requête dans `orders{...}`)
//
//   2. Si le (nouveau) premier segment est un nom de collection pluriel
//      connu pour cette entité, on le remplace par le nom de relation :
//        racine `orders` :  users.username → user.username
//
// Un chemin qui devient vide (`orders` seul) est abandonné.
// Seul le premier segment est réécrit : les segments suivants sont
// conservés tels quels.
//
// =============================================================================

use std::collections::BTreeSet;

use tracing::debug;

use super::path::FieldPath;
use super::registry::{EntityHandle, Registry};
use crate::error::Result;

/// Normalise les chemins pour l'entité racine `root`.
pub fn normalize(
    registry: &Registry,
    paths: &BTreeSet<FieldPath>,
    root: &str,
) -> Result<BTreeSet<FieldPath>> {
    let handle = registry.handle(root)?;
    let normalized: BTreeSet<FieldPath> = paths
        .iter()
        .filter_map(|path| normalize_path(handle, path))
        .collect();
    debug!(root, before = paths.len(), after = normalized.len(), "chemins normalisés");
    Ok(normalized)
}

/// Normalise un seul chemin ; None s'il ne reste rien.
pub fn normalize_path(handle: &EntityHandle, path: &FieldPath) -> Option<FieldPath> {
    let mut segments = path.segments();
    if segments.first().is_some_and(|s| *s == handle.root) {
        segments = &segments[1..];
    }

    let (first, tail) = segments.split_first()?;
    let first = handle.alias(first).unwrap_or(first.as_str());
    FieldPath::new(std::iter::once(first).chain(tail.iter().map(String::as_str)))
}
