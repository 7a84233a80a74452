#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use item_api::app::{app, AppState};
use item_api::auth::hash_password;
use item_api::config::{AppConfig, DatabaseConfig};
use item_api::database::{DatabaseManager, SqliteUserRepository, UserRepository};

pub const USERNAME: &str = "tester";
pub const PASSWORD: &str = "correct-horse";

/// A real server on a free port, backed by its own in-memory database with
/// one active user.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    pub config: AppConfig,
    pub db: DatabaseManager,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = AppConfig {
            secret_key: "integration-test-secret".to_string(),
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
                connection_timeout: 5,
            },
            ..AppConfig::default()
        };

        let db = DatabaseManager::connect(&config.database).await?;
        db.migrate().await?;
        SqliteUserRepository::new(db.pool().clone())
            .create(USERNAME, &hash_password(PASSWORD)?)
            .await?;

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        let router = app(AppState::new(config.clone(), &db));
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            config,
            db,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/api/health/")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn users(&self) -> SqliteUserRepository {
        SqliteUserRepository::new(self.db.pool().clone())
    }

    /// POST /api/token/ and return `(access, refresh)`.
    pub async fn obtain_tokens(&self, username: &str, password: &str) -> Result<(String, String)> {
        let res = self
            .client
            .post(self.url("/api/token/"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "token request failed: {}", res.status());

        let body = res.json::<Value>().await?;
        let access = body["access"].as_str().context("missing access")?.to_string();
        let refresh = body["refresh"].as_str().context("missing refresh")?.to_string();
        Ok((access, refresh))
    }

    pub async fn access_token(&self) -> Result<String> {
        Ok(self.obtain_tokens(USERNAME, PASSWORD).await?.0)
    }

    pub async fn create_item(&self, token: &str, name: &str, price: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/api/items/"))
            .bearer_auth(token)
            .json(&json!({ "name": name, "price": price }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
        Ok(res.json::<Value>().await?)
    }

    /// Number of items as reported by the list endpoint.
    pub async fn item_count(&self, token: &str) -> Result<u64> {
        let body = self
            .client
            .get(self.url("/api/items/"))
            .bearer_auth(token)
            .send()
            .await?
            .json::<Value>()
            .await?;
        body["count"].as_u64().context("missing count")
    }

    pub async fn deactivate(&self, username: &str) -> Result<()> {
        self.users().set_active(username, false).await?;
        Ok(())
    }
}
