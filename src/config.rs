use std::env;

pub const DEFAULT_DB_PORT: u16 = 5432;

/// Postgres connection parameters, read from the environment.
///
/// Host and password are both required for live mode; if either is absent
/// the gateway stays in fallback mode for the whole session.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: Option<String>,
    pub port: u16,
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl DbConfig {
    pub fn from_env() -> Self {
        let port = match env::var("DB_PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "DB_PORT is not a valid port, using default");
                DEFAULT_DB_PORT
            }),
            Err(_) => DEFAULT_DB_PORT,
        };

        Self {
            host: non_empty(env::var("DB_HOST").ok()),
            port,
            name: non_empty(env::var("DB_NAME").ok()),
            user: non_empty(env::var("DB_USER").ok()),
            password: non_empty(env::var("DB_PASSWORD").ok()),
        }
    }

    /// Whether enough is configured to attempt a live connection.
    pub fn is_complete(&self) -> bool {
        self.host.is_some() && self.password.is_some()
    }
}

/// All recognized configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub db: DbConfig,
    pub campaign_trigger_webhook: Option<String>,
    pub user_activity_webhook: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            db: DbConfig::from_env(),
            campaign_trigger_webhook: non_empty(env::var("CAMPAIGN_TRIGGER_WEBHOOK").ok()),
            user_activity_webhook: non_empty(env::var("USER_ACTIVITY_WEBHOOK").ok()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_host_or_password_means_incomplete() {
        let mut config = DbConfig {
            host: Some("db.internal".to_string()),
            port: DEFAULT_DB_PORT,
            name: Some("saas".to_string()),
            user: Some("app".to_string()),
            password: Some("secret".to_string()),
        };
        assert!(config.is_complete());

        config.password = None;
        assert!(!config.is_complete());

        config.password = Some("secret".to_string());
        config.host = None;
        assert!(!config.is_complete());
    }

    #[test]
    fn blank_values_count_as_absent() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(
            non_empty(Some("https://hooks.internal/x".to_string())).as_deref(),
            Some("https://hooks.internal/x")
        );
    }
}
