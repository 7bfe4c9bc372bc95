use crate::{Result, TestInfraError};
use sqlx::mysql::MySqlPoolOptions;
use std::time::Duration;
use tether_storage::MySqlRepository;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::ImageExt;
use testcontainers::{ContainerAsync, GenericImage};
use typed_builder::TypedBuilder;

const MYSQL_PORT: u16 = 3306;

/// Settings for the disposable `tether` database and the pool opened on it.
#[derive(Debug, Clone, TypedBuilder)]
pub struct MysqlConfig {
    #[builder(default = "tether".to_string(), setter(into))]
    database: String,
    #[builder(default = "tether".to_string(), setter(into))]
    username: String,
    #[builder(default = "tether".to_string(), setter(into))]
    password: String,
    #[builder(default = 5)]
    max_connections: u32,
    /// MySQL logs readiness before it accepts client connections, so the
    /// first pool connects are retried.
    #[builder(default = 20)]
    connect_attempts: u32,
    #[builder(default = Duration::from_millis(500))]
    connect_backoff: Duration,
}

/// A MySQL container holding the `short_links` schema.
pub struct MySqlServer {
    container: ContainerAsync<GenericImage>,
    config: MysqlConfig,
}

impl MySqlServer {
    /// Starts a MySQL container for the link store.
    pub async fn new(config: MysqlConfig) -> Result<Self> {
        let container = GenericImage::new("mysql", "8.4")
            .with_exposed_port(MYSQL_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stderr("ready for connections"))
            .with_env_var("MYSQL_DATABASE", config.database.as_str())
            .with_env_var("MYSQL_USER", config.username.as_str())
            .with_env_var("MYSQL_PASSWORD", config.password.as_str())
            .with_env_var("MYSQL_ROOT_PASSWORD", "root")
            .start()
            .await?;

        Ok(Self { container, config })
    }

    pub async fn database_url(&self) -> Result<String> {
        let host = self.container.get_host().await?;
        let port = self.container.get_host_port_ipv4(MYSQL_PORT).await?;
        Ok(format!(
            "mysql://{}:{}@{}:{}/{}",
            self.config.username, self.config.password, host, port, self.config.database
        ))
    }

    /// Opens a pool on the container and creates the `short_links` table.
    ///
    /// Every call returns a repository over a fresh pool on the same
    /// database, so tests can simulate independent gateway processes.
    pub async fn repository(&self) -> Result<MySqlRepository> {
        let url = self.database_url().await?;
        let repository = MySqlRepository::new(self.connect_with_retry(&url).await?);
        repository.ensure_schema().await?;
        Ok(repository)
    }

    async fn connect_with_retry(&self, url: &str) -> Result<sqlx::MySqlPool> {
        let attempts = self.config.connect_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match MySqlPoolOptions::new()
                .max_connections(self.config.max_connections)
                .connect(url)
                .await
            {
                Ok(pool) => return Ok(pool),
                Err(source) if attempt >= attempts => {
                    return Err(TestInfraError::Connect { attempts, source });
                }
                Err(_) => tokio::time::sleep(self.config.connect_backoff).await,
            }
        }
    }
}
