// =============================================================================
// PLAN — Plan de chargement anticipé (eager loading)
// =============================================================================
//
// Avant d'aller chercher les données, on détermine quelles relations de
// PREMIER NIVEAU doivent être chargées avec les enregistrements racines,
// en un seul appel groupé :
//
//   chemins : status, user.username, product.name
//   plan    : { product, user }
//
// Un chemin de longueur > 1 désigne une relation par son premier segment ;
// on ne la retient que si le schéma confirme que c'est bien une relation
// (FK ou collection inverse). `id.x` ne produit donc rien.
//
// LIMITE : seules les relations de premier niveau sont planifiées. Les
// sauts suivants (`user.orders.product`) sont résolus à la demande par
// le collaborateur d'accès aux données, pendant la projection.
//
// =============================================================================

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use super::path::FieldPath;
use super::registry::Registry;
use crate::error::Result;

/// Les relations à charger avec l'entité racine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchPlan {
    /// Nom racine pluriel (`orders`)
    pub root: String,
    /// Relations de premier niveau, nom singulier (`user`)
    pub eager: BTreeSet<String>,
}

impl FetchPlan {
    /// Plan sans relation anticipée
    pub fn root_only(root: &str) -> Self {
        FetchPlan { root: root.to_string(), eager: BTreeSet::new() }
    }
}

impl fmt::Display for FetchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        if !self.eager.is_empty() {
            write!(f, " + [{}]", self.eager.iter().cloned().collect::<Vec<_>>().join(", "))?;
        }
        Ok(())
    }
}

/// Calcule le plan de chargement pour des chemins déjà normalisés.
pub fn plan(registry: &Registry, paths: &BTreeSet<FieldPath>, root: &str) -> Result<FetchPlan> {
    let handle = registry.handle(root)?;
    let eager = paths
        .iter()
        .filter(|path| path.is_nested())
        .map(|path| path.first())
        .filter(|relation| registry.is_relation(handle, relation))
        .map(str::to_string)
        .collect();

    let plan = FetchPlan { root: root.to_string(), eager };
    debug!(%plan, "plan de chargement");
    Ok(plan)
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn plan_for(paths: &[&str], root: &str) -> Vec<String> {
        let registry = Registry::new(seed::shop_schema()).unwrap();
        let input: BTreeSet<FieldPath> = paths.iter().filter_map(|p| FieldPath::parse_dotted(p)).collect();
        plan(&registry, &input, root).unwrap().eager.into_iter().collect()
    }

    #[test]
    fn test_first_level_relations() {
        assert_eq!(plan_for(&["user.username", "product.name"], "orders"), vec!["product", "user"]);
    }

    #[test]
    fn test_scalars_only() {
        assert!(plan_for(&["status"], "orders").is_empty());
    }

    #[test]
    fn test_bare_relation_not_planned() {
        assert!(plan_for(&["user"], "orders").is_empty());
    }

    #[test]
    fn test_non_relation_prefix_ignored() {
        assert!(plan_for(&["status.length", "ghost.name"], "orders").is_empty());
    }

    #[test]
    fn test_deep_chain_plans_first_hop_only() {
        assert_eq!(plan_for(&["user.orders.product.name"], "orders"), vec!["user"]);
    }

    #[test]
    fn test_collection_relation() {
        assert_eq!(plan_for(&["orders.status"], "users"), vec!["orders"]);
    }

    #[test]
    fn test_unknown_entity() {
        let registry = Registry::new(seed::shop_schema()).unwrap();
        assert!(plan(&registry, &BTreeSet::new(), "ghosts").is_err());
    }

    #[test]
    fn test_display() {
        let mut p = FetchPlan::root_only("orders");
        assert_eq!(p.to_string(), "orders");
        p.eager.insert("user".into());
        assert_eq!(p.to_string(), "orders + [user]");
    }
}
