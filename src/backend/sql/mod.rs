// =============================================================================
// BACKEND SQL — Traduction d'un plan de chargement en SQL
// =============================================================================
//
// Ce module traduit un FetchPlan en requêtes SQL concrètes, dans la
// forme qu'émet un ORM pour un chargement anticipé "select-in" :
//
//   1 requête pour la racine
//   + 1 requête par relation planifiée (WHERE ... IN (sous-requête))
//
// Il sert à EXPLIQUER un plan ; l'exécution reste l'affaire de la
// DataSource.
//
// Le trait SqlDialect encapsule les différences entre moteurs SQL.
//
// =============================================================================

pub mod planner;

/// Dialecte SQL — les différences entre les moteurs SQL.
pub trait SqlDialect {
    /// Nom du dialecte
    fn dialect_name(&self) -> &'static str;

    /// Quote un identifiant (table, colonne)
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

// ─── SQLite ──────────────────────────────────────────────────────────────────

pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn dialect_name(&self) -> &'static str {
        "SQLite"
    }
}

// ─── PostgreSQL ──────────────────────────────────────────────────────────────

pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn dialect_name(&self) -> &'static str {
        "PostgreSQL"
    }
}

// ─── MySQL ───────────────────────────────────────────────────────────────────
//
// MySQL quote les identifiants avec des backticks.

pub struct MySqlDialect;

impl SqlDialect for MySqlDialect {
    fn dialect_name(&self) -> &'static str {
        "MySQL"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }
}

/// Retrouve un dialecte par son nom (insensible à la casse)
pub fn dialect_by_name(name: &str) -> Option<Box<dyn SqlDialect>> {
    match name.to_lowercase().as_str() {
        "sqlite" => Some(Box::new(SqliteDialect)),
        "postgres" | "postgresql" => Some(Box::new(PostgresDialect)),
        "mysql" => Some(Box::new(MySqlDialect)),
        _ => None,
    }
}
