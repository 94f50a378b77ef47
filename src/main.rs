// =============================================================================
// SPARSEFIELDS — Point d'entrée : le moteur sur les données d'exemple
// =============================================================================
//
//   sparsefields list orders --fields 'orders{id,users{username}}'
//   sparsefields get products 2
//   sparsefields explain orders --fields 'status,users{username}' --dialect postgres
//   sparsefields schema
//
// La sortie standard ne reçoit que du JSON ; les journaux vont sur la
// sortie d'erreur. En cas d'erreur, le corps JSON porte le code et le
// statut de l'erreur, comme le ferait une couche HTTP.
//
// =============================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value as Json};
use tracing_subscriber::EnvFilter;

use sparsefields::backend::sql::dialect_by_name;
use sparsefields::backend::sql::planner::SqlPlanner;
use sparsefields::{seed, EngineConfig, MemorySource, QueryEngine, QueryError};

#[derive(Parser, Debug)]
#[command(name = "sparsefields")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Fichier de configuration JSON
    #[arg(short, long, env = "SPARSEFIELDS_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Liste les enregistrements d'une entité
    List {
        /// Entité racine (nom pluriel : orders, users...)
        entity: String,

        /// Sélecteur de champs, ex. `orders{id,users{username}}`
        #[arg(short, long)]
        fields: Option<String>,
    },

    /// Un enregistrement par identifiant
    Get { entity: String, id: i64 },

    /// Affiche les chemins, le plan de chargement et le SQL correspondant
    Explain {
        entity: String,

        #[arg(short, long)]
        fields: String,

        /// sqlite, postgres ou mysql
        #[arg(short, long, default_value = "sqlite")]
        dialect: String,
    },

    /// Affiche le schéma et les données d'exemple
    Schema,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let registry = seed::shop_registry()?;
    let source = seed::shop_source(registry.clone())?;
    let engine = QueryEngine::new(registry, source).with_config(config);

    match run(&engine, cli.command) {
        Ok(body) => {
            print_json(&body, engine.config().pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let Some(query_err) = err.downcast_ref::<QueryError>() else {
                return Err(err);
            };
            let body = json!({
                "error": query_err.code(),
                "detail": query_err.to_string(),
                "status": query_err.status_code(),
            });
            print_json(&body, engine.config().pretty)?;
            Ok(if query_err.is_client_error() { ExitCode::from(2) } else { ExitCode::FAILURE })
        }
    }
}

fn run(engine: &QueryEngine<MemorySource>, command: Commands) -> Result<Json> {
    let body = match command {
        Commands::List { entity, fields } => {
            let rows = engine.list(&entity, fields.as_deref())?;
            Json::Array(rows.into_iter().map(Json::Object).collect())
        }
        Commands::Get { entity, id } => Json::Object(engine.get(&entity, id)?),
        Commands::Explain { entity, fields, dialect } => {
            let sql_dialect = dialect_by_name(&dialect)
                .ok_or_else(|| anyhow!("dialecte SQL inconnu : {}", dialect))?;
            let query = engine.explain(&entity, &fields)?;
            let sql = SqlPlanner::new(sql_dialect.as_ref(), engine.registry()).plan_fetch(&query.fetch)?;
            json!({
                "query": query.to_json(),
                "dialect": sql_dialect.dialect_name(),
                "sql": sql.statements,
                "explanation": sql.explanation,
            })
        }
        Commands::Schema => {
            let registry = engine.registry();
            json!({
                "roots": registry.roots().collect::<Vec<_>>(),
                "schema": registry.schema().to_string(),
                "data": engine.source().instance().display(registry.schema()),
            })
        }
    };
    Ok(body)
}

fn print_json(body: &Json, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(body)?
    } else {
        serde_json::to_string(body)?
    };
    println!("{}", text);
    Ok(())
}
