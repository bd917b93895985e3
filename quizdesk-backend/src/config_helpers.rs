use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use quizdesk_ai::OpenAiSettings;
use quizdesk_config::{Config, DatabaseConfig, ExplanationsConfig, OpenAiConfig};
use quizdesk_db::{DbConnectionConfig, SqlQuestionRepository};
use quizdesk_job_queue::QueueSettings;

use crate::state::Storage;

const IN_MEMORY_SQLITE: &str = "sqlite::memory:";

/// Build database connection config from application config.
pub fn database_config_from_config(cfg: &DatabaseConfig) -> DbConnectionConfig {
    let url = cfg.url.trim();
    let url = if url.is_empty() { IN_MEMORY_SQLITE } else { url };
    DbConnectionConfig::new(url).with_max_connections(cfg.max_connections)
}

pub fn queue_settings_from_config(cfg: &ExplanationsConfig) -> QueueSettings {
    QueueSettings::default()
        .with_max_retries(cfg.max_retries)
        .with_retry_delay_base(Duration::from_millis(cfg.retry_delay_base_ms))
        .with_batch_size(cfg.batch_size)
        .with_subject(cfg.subject.clone())
        .with_level(cfg.level.clone())
}

pub fn openai_settings_from_config(cfg: &OpenAiConfig) -> OpenAiSettings {
    OpenAiSettings {
        api_key: cfg.api_key.clone(),
        base_url: cfg.base_url.clone(),
        model: cfg.model.clone(),
        temperature: cfg.temperature,
        max_tokens: None,
        timeout: Duration::from_secs(cfg.timeout_secs),
    }
}

/// Open SQLite storage, or fall back to process memory when allowed.
pub async fn connect_storage(cfg: &Config) -> anyhow::Result<Storage> {
    let db_cfg = database_config_from_config(&cfg.database);
    match SqlQuestionRepository::connect(&db_cfg).await {
        Ok(repository) => {
            tracing::info!(
                db_url = %db_cfg.url,
                db_max_connections = db_cfg.max_connections,
                "question storage opened"
            );
            Ok(Storage::new(repository))
        }
        Err(error) if cfg.database.fallback_to_memory => {
            tracing::warn!(
                %error,
                db_url = %db_cfg.url,
                "database unavailable, serving questions from memory"
            );
            Ok(Storage::in_memory())
        }
        Err(error) => Err(anyhow::anyhow!(
            "failed to open database {}: {error}",
            db_cfg.url
        )),
    }
}

/// Parse host:port into a SocketAddr, with fallback to 0.0.0.0.
pub fn parse_bind_address(host: &str, port: u16) -> SocketAddr {
    host.parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, port))
        .or_else(|_| host.parse::<SocketAddr>())
        .or_else(|_| {
            host.trim_matches(|c| c == '[' || c == ']')
                .parse::<Ipv6Addr>()
                .map(|ip| SocketAddr::new(IpAddr::V6(ip), port))
        })
        .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], port)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_address_variants() {
        assert_eq!(
            parse_bind_address("127.0.0.1", 6100),
            SocketAddr::from(([127, 0, 0, 1], 6100))
        );
        assert_eq!(
            parse_bind_address("[::1]", 80),
            SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 80)
        );
        assert_eq!(
            parse_bind_address("quiz.local", 9000),
            SocketAddr::from(([0, 0, 0, 0], 9000))
        );
    }

    #[test]
    fn queue_settings_follow_config() {
        let cfg = ExplanationsConfig {
            max_retries: 1,
            retry_delay_base_ms: 250,
            batch_size: 0,
            subject: "history".into(),
            level: "university".into(),
        };
        let settings = queue_settings_from_config(&cfg);
        assert_eq!(settings.max_retries, 1);
        assert_eq!(settings.retry_delay(2), Duration::from_millis(500));
        assert_eq!(settings.batch_size, 1);
        assert_eq!(settings.subject, "history");
    }

    #[test]
    fn blank_database_url_means_memory() {
        let cfg = DatabaseConfig {
            url: "  ".into(),
            max_connections: 3,
            fallback_to_memory: true,
        };
        let db = database_config_from_config(&cfg);
        assert!(db.is_in_memory());
        assert_eq!(db.max_connections, 3);
    }

    #[tokio::test]
    async fn unreachable_database_falls_back_to_memory() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A directory cannot be opened as a database file.
        let mut cfg = Config::default();
        cfg.database.url = format!("sqlite://{}", dir.path().display());

        let storage = connect_storage(&cfg).await.expect("fallback");
        assert_eq!(storage.backend(), "memory");

        cfg.database.fallback_to_memory = false;
        assert!(connect_storage(&cfg).await.is_err());
    }
}
