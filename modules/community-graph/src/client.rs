use neo4rs::{ConfigBuilder, Graph};

/// Thin wrapper around neo4rs::Graph providing connection setup.
///
/// Each job invocation opens one client and drops it on exit, which closes
/// the pooled connections.
#[derive(Clone)]
pub struct GraphClient {
    pub(crate) graph: Graph,
}

impl GraphClient {
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self, neo4rs::Error> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .fetch_size(500)
            .max_connections(2)
            .build()?;
        let graph = Graph::connect(config).await?;
        Ok(Self { graph })
    }

    pub fn inner(&self) -> &Graph {
        &self.graph
    }
}
