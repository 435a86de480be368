// [libs/infra/graph-store/src/schema.rs]
//! Table definitions for the typed property graph (§3, §4.2).

use libsql::Connection;
use tracing::{debug, info, instrument};

const TABLES: &[(&str, &str)] = &[
    (
        "missions",
        r#"
        CREATE TABLE IF NOT EXISTS missions (
            id TEXT PRIMARY KEY,
            target_domain TEXT NOT NULL,
            mode TEXT NOT NULL,
            status TEXT NOT NULL,
            current_phase TEXT,
            seed_subdomains TEXT NOT NULL,
            options TEXT NOT NULL,
            progress TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
    "#,
    ),
    (
        "nodes",
        r#"
        CREATE TABLE IF NOT EXISTS nodes (
            id TEXT NOT NULL,
            mission_id TEXT NOT NULL,
            node_type TEXT NOT NULL,
            properties TEXT NOT NULL,
            evidence TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (mission_id, id)
        );
    "#,
    ),
    (
        "edges",
        r#"
        CREATE TABLE IF NOT EXISTS edges (
            id TEXT NOT NULL,
            mission_id TEXT NOT NULL,
            relation TEXT NOT NULL,
            source_id TEXT NOT NULL,
            target_id TEXT NOT NULL,
            properties TEXT NOT NULL,
            created_at TEXT NOT NULL,
            dangling INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (mission_id, id)
        );
    "#,
    ),
    (
        "mission_logs",
        r#"
        CREATE TABLE IF NOT EXISTS mission_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            mission_id TEXT NOT NULL,
            level TEXT NOT NULL,
            message TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
    "#,
    ),
];

const INDEXES: &[(&str, &str)] = &[
    ("idx_nodes_mission_type", "CREATE INDEX IF NOT EXISTS idx_nodes_mission_type ON nodes(mission_id, node_type);"),
    ("idx_edges_mission", "CREATE INDEX IF NOT EXISTS idx_edges_mission ON edges(mission_id);"),
    ("idx_logs_mission", "CREATE INDEX IF NOT EXISTS idx_logs_mission ON mission_logs(mission_id);"),
];

#[instrument(skip(connection))]
pub async fn apply_schema(connection: &Connection) -> Result<(), libsql::Error> {
    for (name, sql) in TABLES {
        debug!("creating table {name}");
        connection.execute(sql, ()).await?;
    }
    for (name, sql) in INDEXES {
        debug!("creating index {name}");
        connection.execute(sql, ()).await?;
    }
    info!("schema synchronized");
    Ok(())
}
