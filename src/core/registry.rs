// =============================================================================
// REGISTRY — Le registre immuable des entités racines
// =============================================================================
//
// Le registre associe à chaque nom d'entité racine (pluriel : `orders`)
// l'entité du schéma correspondante, ainsi qu'une table d'ALIAS qui
// réécrit un nom de collection pluriel en nom de relation singulier :
//
//   racine `orders` :  users → user, products → product, addresses → address
//
// Les alias sont dérivés des FK sortantes de chaque entité : une FK
// `user : Order -> User` donne l'alias `users` (collection de User) → `user`.
// Une entité sans FK sortante (User) n'a donc aucun alias, et `orders`
// reste `orders` (sa collection inverse) quand la racine est `users`.
//
// Construit UNE fois au démarrage, validé, puis partagé en lecture
// seule (Arc<Registry>) entre toutes les requêtes.
//
// =============================================================================

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::schema::{Edge, Schema};
use super::validate::validate_schema;
use crate::error::{QueryError, Result};

/// Poignée vers une entité racine, transmise au collaborateur d'accès aux données.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityHandle {
    /// Nom racine pluriel (`orders`)
    pub root: String,
    /// Nom du nœud dans le schéma (`Order`)
    pub node: String,
    /// Alias : collection plurielle → relation singulière
    aliases: HashMap<String, String>,
}

impl EntityHandle {
    /// Réécrit un nom de collection en nom de relation, s'il existe un alias
    pub fn alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Le registre des entités.
#[derive(Debug, Clone)]
pub struct Registry {
    schema: Schema,
    entities: BTreeMap<String, EntityHandle>,
}

impl Registry {
    /// Valide le schéma et indexe chaque entité par sa collection.
    pub fn new(schema: Schema) -> Result<Self> {
        validate_schema(&schema).map_err(QueryError::InvalidSchema)?;

        let mut entities = BTreeMap::new();
        for node in schema.nodes.values() {
            let aliases = derive_aliases(&schema, &node.name);
            debug!(root = %node.collection, aliases = aliases.len(), "entité enregistrée");
            entities.insert(node.collection.clone(), EntityHandle {
                root: node.collection.clone(),
                node: node.name.clone(),
                aliases,
            });
        }

        Ok(Registry { schema, entities })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Retrouve une entité racine, ou UnknownEntity
    pub fn handle(&self, root: &str) -> Result<&EntityHandle> {
        self.entities
            .get(root)
            .ok_or_else(|| QueryError::unknown_entity(root))
    }

    /// Noms des entités racines, triés
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Le nom désigne-t-il une relation (FK ou collection inverse) de l'entité ?
    pub fn is_relation(&self, handle: &EntityHandle, name: &str) -> bool {
        self.schema
            .field_kind(&handle.node, name)
            .is_some_and(|kind| kind.is_relation())
    }
}

/// Une FK sortante vers un nœud donne l'alias `collection(cible) → nom_fk`.
/// Si plusieurs FK visent le même nœud, l'alias serait ambigu : on l'omet.
fn derive_aliases(schema: &Schema, node: &str) -> HashMap<String, String> {
    let mut by_target: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in schema.relations_of(node) {
        if let Edge::ForeignKey { name, target, .. } = edge {
            by_target.entry(target.as_str()).or_default().push(name.as_str());
        }
    }

    by_target
        .into_iter()
        .filter_map(|(target, fks)| match fks.as_slice() {
            [fk] => schema
                .nodes
                .get(target)
                .map(|t| (t.collection.clone(), fk.to_string())),
            _ => None,
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::typeside::BaseType;
    use crate::seed;

    #[test]
    fn test_seed_registry_roots() {
        let registry = Registry::new(seed::shop_schema()).unwrap();
        let roots: Vec<&str> = registry.roots().collect();
        assert_eq!(roots, vec!["addresses", "orders", "products", "users"]);
    }

    #[test]
    fn test_unknown_entity() {
        let registry = Registry::new(seed::shop_schema()).unwrap();
        let err = registry.handle("ghosts").unwrap_err();
        assert!(matches!(err, QueryError::UnknownEntity { ref entity } if entity == "ghosts"));
    }

    #[test]
    fn test_aliases_derived_from_fks() {
        let registry = Registry::new(seed::shop_schema()).unwrap();
        let orders = registry.handle("orders").unwrap();
        assert_eq!(orders.alias("users"), Some("user"));
        assert_eq!(orders.alias("products"), Some("product"));
        assert_eq!(orders.alias("addresses"), Some("address"));
        assert_eq!(orders.alias("orders"), None);

        let users = registry.handle("users").unwrap();
        assert_eq!(users.aliases().count(), 0);
    }

    #[test]
    fn test_is_relation() {
        let registry = Registry::new(seed::shop_schema()).unwrap();
        let orders = registry.handle("orders").unwrap();
        assert!(registry.is_relation(orders, "user"));
        assert!(!registry.is_relation(orders, "status"));
        assert!(!registry.is_relation(orders, "user_id"));

        let users = registry.handle("users").unwrap();
        assert!(registry.is_relation(users, "orders"));
    }

    #[test]
    fn test_ambiguous_alias_is_dropped() {
        let mut s = Schema::new("Market");
        s.add_node("Sale", "sales")
         .add_node("User", "users")
         .add_attribute("id", "Sale", BaseType::Integer)
         .add_attribute("id", "User", BaseType::Integer)
         .add_fk("buyer", "Sale", "User", "buyer_id", "purchases")
         .add_fk("seller", "Sale", "User", "seller_id", "sales");
        let registry = Registry::new(s).unwrap();
        let sales = registry.handle("sales").unwrap();
        assert_eq!(sales.alias("users"), None);
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let mut s = Schema::new("Broken");
        s.add_node("Order", "orders")
         .add_fk("user", "Order", "User", "user_id", "orders");
        let err = Registry::new(s).unwrap_err();
        assert_eq!(err.code(), "invalid_schema");
    }
}
