//! Spawns a real gateway on a random port.

use api_gateway::config::Config;
use api_gateway::routes::{self, AppState};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct TestGateway {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestGateway {
    /// Spawn a gateway configured from `vars` as if they were the environment.
    pub async fn spawn(vars: &[(&str, &str)]) -> Result<Self, anyhow::Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let config = Config::from_vars(&vars)?;
        let state = Arc::new(AppState::new(config)?);
        let app = routes::build_routes(state, PrometheusBuilder::new().build_recorder().handle());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test gateway error: {}", e);
            }
        });

        Ok(Self { addr, handle })
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// GET `path` with an optional bearer token.
    pub async fn get(
        &self,
        path: &str,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response, anyhow::Error> {
        let mut request = reqwest::Client::new().get(format!("{}{}", self.url(), path));
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
