use neo4rs::query;
use tracing::{info, warn};

use crate::GraphClient;

/// Idempotent schema setup, run at the start of every importer.
pub async fn migrate(client: &GraphClient) -> Result<(), neo4rs::Error> {
    let g = &client.graph;

    info!("Running schema migrations...");

    let constraints = [
        "CREATE CONSTRAINT tweet_id IF NOT EXISTS FOR (t:Tweet) REQUIRE t.id IS UNIQUE",
        "CREATE CONSTRAINT user_screen_name IF NOT EXISTS FOR (u:User) REQUIRE u.screen_name IS UNIQUE",
    ];
    for c in &constraints {
        run_ignoring_exists(g, c).await?;
    }

    let indexes = [
        "CREATE INDEX tag_name IF NOT EXISTS FOR (t:Tag) ON (t.name)",
        "CREATE INDEX link_url IF NOT EXISTS FOR (l:Link) ON (l.url)",
        "CREATE INDEX repository_id IF NOT EXISTS FOR (r:Repository) ON (r.id)",
        "CREATE INDEX user_id IF NOT EXISTS FOR (u:User) ON (u.id)",
        "CREATE INDEX group_id IF NOT EXISTS FOR (g:Group) ON (g.id)",
        "CREATE INDEX event_id IF NOT EXISTS FOR (e:Event) ON (e.id)",
    ];
    for idx in &indexes {
        run_ignoring_exists(g, idx).await?;
    }

    info!("Schema migrations complete");
    Ok(())
}

/// Graphs populated before named schema objects existed carry unnamed
/// equivalents, which Neo4j reports as conflicts even with `IF NOT EXISTS`.
async fn run_ignoring_exists(g: &neo4rs::Graph, cypher: &str) -> Result<(), neo4rs::Error> {
    match g.run(query(cypher)).await {
        Ok(_) => Ok(()),
        Err(e) => {
            let msg = e.to_string().to_lowercase();
            if msg.contains("already exists") || msg.contains("equivalent") {
                warn!(statement = %cypher.chars().take(80).collect::<String>(), "Already exists (skipped)");
                Ok(())
            } else {
                Err(e)
            }
        }
    }
}
