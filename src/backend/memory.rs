// =============================================================================
// MEMORY — Source de données en mémoire
// =============================================================================
//
// Sert les requêtes DIRECTEMENT depuis une Instance, sans base de données.
//
// CHARGEMENT :
//   1. `fetch` parcourt toutes les lignes de l'entité racine (ordre des clés)
//   2. Pour chaque relation du plan, la cible est résolue tout de suite
//      et stockée dans l'enregistrement (préchargement)
//   3. Toute autre relation rencontrée pendant la projection est résolue
//      à la demande : c'est un chargement PARESSEUX, compté dans FetchStats
//
// Les compteurs rendent visible l'effet du plan : une requête dont toutes
// les relations de premier niveau sont planifiées ne déclenche aucun
// chargement paresseux à ce niveau.
//
// =============================================================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use super::DataSource;
use crate::core::instance::{EntityData, Instance, RowId};
use crate::core::plan::FetchPlan;
use crate::core::record::{Field, Record};
use crate::core::registry::{EntityHandle, Registry};
use crate::core::schema::{FieldKind, Schema};
use crate::core::typeside::Value;
use crate::core::validate::validate_instance;
use crate::error::{QueryError, Result};

/// Compteurs cumulés depuis la création de la source.
#[derive(Debug, Default)]
pub struct FetchStats {
    batches: AtomicUsize,
    rows: AtomicUsize,
    eager_loads: AtomicUsize,
    lazy_loads: AtomicUsize,
}

/// Photographie des compteurs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetchStatsSnapshot {
    pub batches: usize,
    pub rows: usize,
    pub eager_loads: usize,
    pub lazy_loads: usize,
}

impl FetchStats {
    pub fn snapshot(&self) -> FetchStatsSnapshot {
        FetchStatsSnapshot {
            batches: self.batches.load(Ordering::Relaxed),
            rows: self.rows.load(Ordering::Relaxed),
            eager_loads: self.eager_loads.load(Ordering::Relaxed),
            lazy_loads: self.lazy_loads.load(Ordering::Relaxed),
        }
    }
}

/// Relation préchargée
#[derive(Debug, Clone, PartialEq, Eq)]
enum Preloaded {
    One(Option<RowId>),
    Many(Vec<RowId>),
}

/// Source de données en mémoire.
#[derive(Debug)]
pub struct MemorySource {
    registry: Arc<Registry>,
    instance: Instance,
    stats: FetchStats,
}

impl MemorySource {
    /// Valide l'instance contre le schéma du registre.
    pub fn new(registry: Arc<Registry>, instance: Instance) -> Result<Self> {
        validate_instance(&instance, registry.schema()).map_err(QueryError::InvalidSchema)?;
        debug!(instance = %instance.name, rows = instance.total_rows(), "source en mémoire prête");
        Ok(MemorySource {
            registry,
            instance,
            stats: FetchStats::default(),
        })
    }

    pub fn stats(&self) -> FetchStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    fn schema(&self) -> &Schema {
        self.registry.schema()
    }

    fn table(&self, node: &str) -> Option<&EntityData> {
        self.instance.data.get(node)
    }

    /// Résout une relation d'une ligne (FK ou collection inverse).
    fn resolve(&self, node: &str, row: RowId, relation: &str) -> Option<Preloaded> {
        match self.schema().field_kind(node, relation)? {
            FieldKind::Relation { .. } => Some(Preloaded::One(
                self.table(node).and_then(|t| t.get_fk(row, relation)),
            )),
            FieldKind::Collection { source, fk } => Some(Preloaded::Many(
                self.table(source)
                    .map(|t| t.rows_pointing_to(fk, row))
                    .unwrap_or_default(),
            )),
            FieldKind::Attribute(_) | FieldKind::FkColumn { .. } => None,
        }
    }

    fn record<'a>(&'a self, node: &'a str, row: RowId) -> RowRecord<'a> {
        RowRecord {
            source: self,
            node,
            row,
            preloaded: HashMap::new(),
        }
    }
}

impl DataSource for MemorySource {
    type Record<'a> = RowRecord<'a>;

    fn fetch(&self, handle: &EntityHandle, plan: &FetchPlan) -> Result<Vec<RowRecord<'_>>> {
        let node = self.registry.handle(&handle.root)?.node.as_str();
        let rows = self.table(node).map(|t| t.row_ids()).unwrap_or_default();

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let mut record = self.record(node, row);
            for relation in &plan.eager {
                if let Some(loaded) = self.resolve(node, row, relation) {
                    record.preloaded.insert(relation.clone(), loaded);
                    self.stats.eager_loads.fetch_add(1, Ordering::Relaxed);
                }
            }
            records.push(record);
        }

        self.stats.batches.fetch_add(1, Ordering::Relaxed);
        self.stats.rows.fetch_add(records.len(), Ordering::Relaxed);
        debug!(%plan, rows = records.len(), "chargement groupé");
        Ok(records)
    }

    fn find(&self, handle: &EntityHandle, id: i64) -> Result<Option<RowRecord<'_>>> {
        let node = self.registry.handle(&handle.root)?.node.as_str();
        let found = self.table(node).is_some_and(|t| t.contains(id));
        self.stats.batches.fetch_add(1, Ordering::Relaxed);
        Ok(found.then(|| self.record(node, id)))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Un enregistrement qui emprunte la source en mémoire.
#[derive(Debug, Clone)]
pub struct RowRecord<'a> {
    source: &'a MemorySource,
    node: &'a str,
    row: RowId,
    preloaded: HashMap<String, Preloaded>,
}

impl<'a> RowRecord<'a> {
    pub fn row_id(&self) -> RowId {
        self.row
    }

    fn relation(&self, name: &str) -> Option<Preloaded> {
        if let Some(loaded) = self.preloaded.get(name) {
            return Some(loaded.clone());
        }
        let loaded = self.source.resolve(self.node, self.row, name)?;
        self.source.stats.lazy_loads.fetch_add(1, Ordering::Relaxed);
        trace!(entity = self.node, row = self.row, relation = name, "chargement paresseux");
        Some(loaded)
    }
}

impl<'a> Record for RowRecord<'a> {
    fn entity(&self) -> &str {
        self.node
    }

    fn scalar_fields(&self) -> &[String] {
        self.source.schema().scalar_fields(self.node)
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.source.schema().field_kind(self.node, name).is_some()
    }

    fn get_attribute(&self, name: &str) -> Option<Field<Self>> {
        let source = self.source;
        let table = source.table(self.node);
        let field = match source.schema().field_kind(self.node, name)? {
            FieldKind::Attribute(_) => Field::Scalar(
                table
                    .and_then(|t| t.get_attr(self.row, name))
                    .cloned()
                    .unwrap_or(Value::Null),
            ),
            FieldKind::FkColumn { fk } => Field::Scalar(
                table
                    .and_then(|t| t.get_fk(self.row, fk))
                    .map_or(Value::Null, Value::Integer),
            ),
            FieldKind::Relation { target } => match self.relation(name)? {
                Preloaded::One(row) => Field::One(row.map(|r| source.record(target, r))),
                Preloaded::Many(_) => return None,
            },
            FieldKind::Collection { source: from, .. } => match self.relation(name)? {
                Preloaded::Many(rows) => {
                    Field::Many(rows.into_iter().map(|r| source.record(from, r)).collect())
                }
                Preloaded::One(_) => return None,
            },
        };
        Some(field)
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use std::collections::BTreeSet;

    fn source() -> MemorySource {
        let registry = seed::shop_registry().unwrap();
        seed::shop_source(registry).unwrap()
    }

    fn orders(source: &MemorySource) -> EntityHandle {
        source.registry.handle("orders").unwrap().clone()
    }

    #[test]
    fn test_fetch_all_in_key_order() {
        let src = source();
        let records = src.fetch(&orders(&src), &FetchPlan::root_only("orders")).unwrap();
        let ids: Vec<RowId> = records.iter().map(|r| r.row_id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(src.stats().batches, 1);
        assert_eq!(src.stats().rows, 5);
    }

    #[test]
    fn test_scalar_and_fk_column() {
        let src = source();
        let records = src.fetch(&orders(&src), &FetchPlan::root_only("orders")).unwrap();
        let first = &records[0];
        assert!(matches!(
            first.get_attribute("status"),
            Some(Field::Scalar(Value::String(ref s))) if s == "pending"
        ));
        assert!(matches!(first.get_attribute("user_id"), Some(Field::Scalar(Value::Integer(1)))));
        assert!(first.has_attribute("user"));
        assert!(!first.has_attribute("ghost"));
        assert!(first.get_attribute("ghost").is_none());
    }

    #[test]
    fn test_eager_relation_avoids_lazy_load() {
        let src = source();
        let plan = FetchPlan {
            root: "orders".into(),
            eager: BTreeSet::from(["user".to_string()]),
        };
        let records = src.fetch(&orders(&src), &plan).unwrap();
        assert_eq!(src.stats().eager_loads, 5);

        for record in &records {
            assert!(matches!(record.get_attribute("user"), Some(Field::One(Some(_)))));
        }
        assert_eq!(src.stats().lazy_loads, 0);

        let _ = records[0].get_attribute("product");
        assert_eq!(src.stats().lazy_loads, 1);
    }

    #[test]
    fn test_collection_relation() {
        let src = source();
        let users = src.registry.handle("users").unwrap().clone();
        let john = src.find(&users, 1).unwrap().unwrap();
        match john.get_attribute("orders") {
            Some(Field::Many(orders)) => {
                let ids: Vec<RowId> = orders.iter().map(|o| o.row_id()).collect();
                assert_eq!(ids, vec![1, 3]);
            }
            other => panic!("collection attendue, obtenu {:?}", other),
        }
    }

    #[test]
    fn test_find_missing() {
        let src = source();
        assert!(src.find(&orders(&src), 99).unwrap().is_none());
    }

    #[test]
    fn test_default_projection() {
        let src = source();
        let order = src.find(&orders(&src), 2).unwrap().unwrap();
        let projection = order.default_projection();
        let keys: Vec<&String> = projection.keys().collect();
        assert_eq!(keys, vec!["id", "status", "user_id", "product_id", "address_id"]);
    }

    #[test]
    fn test_invalid_instance_rejected() {
        let registry = seed::shop_registry().unwrap();
        let mut instance = Instance::new("Broken", registry.schema());
        instance.insert_with_id("Order", 1, HashMap::new(), HashMap::from([("user".into(), 42)])).unwrap();
        let err = MemorySource::new(registry, instance).unwrap_err();
        assert_eq!(err.code(), "invalid_schema");
    }
}
