// =============================================================================
// SQL PLANNER — Traduction d'un FetchPlan en requêtes SQL
// =============================================================================
//
// ┌──────────────────────────────────────────────────────────────────┐
// │ Sélecteur : id, status, users{username}                          │
// │ Plan      : orders + [user]                                      │
// │                                                                  │
// │ SQL (select-in, 2 requêtes, aucun JOIN) :                        │
// │   SELECT "orders"."id", "orders"."status", ... FROM "orders";    │
// │   SELECT "users"."id", ... FROM "users"                          │
// │   WHERE "users"."id" IN (SELECT "orders"."user_id"               │
// │                          FROM "orders");                         │
// │                                                                  │
// │ Collection inverse (racine users, plan users + [orders]) :       │
// │   SELECT ... FROM "orders"                                       │
// │   WHERE "orders"."user_id" IN (SELECT "users"."id"               │
// │                                FROM "users");                    │
// └──────────────────────────────────────────────────────────────────┘
//
// Les relations non planifiées n'apparaissent pas : elles seront
// chargées à la demande, une requête par enregistrement.
//
// =============================================================================

use crate::backend::sql::SqlDialect;
use crate::core::plan::FetchPlan;
use crate::core::registry::Registry;
use crate::core::schema::{Edge, FieldKind};
use crate::error::Result;

/// Résultat de la planification SQL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlPlan {
    /// Les requêtes, dans l'ordre d'exécution
    pub statements: Vec<String>,
    /// Explication de chaque requête de relation
    pub explanation: Vec<String>,
}

impl std::fmt::Display for SqlPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for stmt in &self.statements {
            writeln!(f, "{}", stmt)?;
        }
        writeln!(f, "-- {} requête(s)", self.statements.len())?;
        for exp in &self.explanation {
            writeln!(f, "-- {}", exp)?;
        }
        Ok(())
    }
}

/// Planificateur SQL : traduit un FetchPlan en requêtes select-in.
pub struct SqlPlanner<'a, D: SqlDialect + ?Sized> {
    dialect: &'a D,
    registry: &'a Registry,
}

impl<'a, D: SqlDialect + ?Sized> SqlPlanner<'a, D> {
    pub fn new(dialect: &'a D, registry: &'a Registry) -> Self {
        SqlPlanner { dialect, registry }
    }

    pub fn plan_fetch(&self, plan: &FetchPlan) -> Result<SqlPlan> {
        let handle = self.registry.handle(&plan.root)?;
        let schema = self.registry.schema();
        let root_table = plan.root.as_str();

        let mut statements = vec![format!(
            "SELECT {} FROM {};",
            self.columns(&handle.node, root_table),
            self.dialect.quote_identifier(root_table),
        )];
        let mut explanation = Vec::new();

        for relation in &plan.eager {
            match schema.field_kind(&handle.node, relation) {
                Some(FieldKind::Relation { target }) => {
                    let Some(Edge::ForeignKey { column, .. }) = schema.edge(&handle.node, relation) else {
                        continue;
                    };
                    let target_table = self.table_of(target);
                    statements.push(format!(
                        "SELECT {} FROM {} WHERE {} IN (SELECT {} FROM {});",
                        self.columns(target, &target_table),
                        self.dialect.quote_identifier(&target_table),
                        self.qualified(&target_table, "id"),
                        self.qualified(root_table, column),
                        self.dialect.quote_identifier(root_table),
                    ));
                    explanation.push(format!(
                        "{} : {} -> {} via {}", relation, handle.node, target, column
                    ));
                }
                Some(FieldKind::Collection { source, fk }) => {
                    let Some(Edge::ForeignKey { column, .. }) = schema.edge(source, fk) else {
                        continue;
                    };
                    let source_table = self.table_of(source);
                    statements.push(format!(
                        "SELECT {} FROM {} WHERE {} IN (SELECT {} FROM {});",
                        self.columns(source, &source_table),
                        self.dialect.quote_identifier(&source_table),
                        self.qualified(&source_table, column),
                        self.qualified(root_table, "id"),
                        self.dialect.quote_identifier(root_table),
                    ));
                    explanation.push(format!(
                        "{} : collection de {} via {}", relation, source, column
                    ));
                }
                _ => {}
            }
        }

        Ok(SqlPlan { statements, explanation })
    }

    fn table_of(&self, node: &str) -> String {
        self.registry
            .schema()
            .nodes
            .get(node)
            .map_or_else(|| node.to_string(), |n| n.collection.clone())
    }

    fn qualified(&self, table: &str, column: &str) -> String {
        format!(
            "{}.{}",
            self.dialect.quote_identifier(table),
            self.dialect.quote_identifier(column)
        )
    }

    fn columns(&self, node: &str, table: &str) -> String {
        let fields = self.registry.schema().scalar_fields(node);
        if fields.is_empty() {
            return format!("{}.*", self.dialect.quote_identifier(table));
        }
        fields
            .iter()
            .map(|f| self.qualified(table, f))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
