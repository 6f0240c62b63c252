/// Configuration management for the portfolio admin service
///
/// Handles server binding, database location, blob storage root and mail settings.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Blob storage for uploaded cover images
    pub storage: StorageConfig,
    /// Outbound notification mail
    pub mail: MailConfig,
    /// Lead generation on project creation
    pub leads: LeadConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// SQLite database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Base directory for the database file (default: "data")
    pub data_dir: String,
    /// Database file name inside `data_dir` (default: "portfolio.db")
    pub file_name: String,
}

/// Public disk where uploaded files land
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the public disk (default: "data/public")
    pub public_root: String,
}

/// Mail transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Fixed operator address that receives new-lead notifications
    pub operator_address: String,
    /// Sender address used on outbound messages
    pub from_address: String,
    /// Mail relay endpoint; when unset messages are written to the log
    pub relay_url: Option<String>,
}

/// Extended variant switch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadConfig {
    /// Create a Lead and send a notification for every new project
    pub enabled: bool,
}

impl DatabaseConfig {
    /// Full path of the SQLite database file
    pub fn database_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join(&self.file_name)
    }
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env_or("PORTFOLIO_HOST", "0.0.0.0"),
                port: env_or("PORTFOLIO_PORT", "3004").parse().unwrap_or(3004),
            },
            database: DatabaseConfig {
                data_dir: env_or("PORTFOLIO_DATA_DIR", "data"),
                file_name: env_or("PORTFOLIO_DB_FILE", "portfolio.db"),
            },
            storage: StorageConfig {
                public_root: env_or("PORTFOLIO_PUBLIC_ROOT", "data/public"),
            },
            mail: MailConfig {
                operator_address: env_or("PORTFOLIO_OPERATOR_EMAIL", "operator@portfolio.local"),
                from_address: env_or("PORTFOLIO_MAIL_FROM", "noreply@portfolio.local"),
                relay_url: std::env::var("PORTFOLIO_MAIL_RELAY_URL")
                    .ok()
                    .filter(|url| !url.trim().is_empty()),
            },
            leads: LeadConfig {
                enabled: parse_flag(
                    "PORTFOLIO_LEADS_ENABLED",
                    &env_or("PORTFOLIO_LEADS_ENABLED", "true"),
                    true,
                ),
            },
        }
    }
}

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

/// Boolean switch accepting true/false, 1/0, yes/no and on/off
fn parse_flag(key: &str, value: &str, fallback: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        other => {
            tracing::warn!("⚠️ Unrecognised value '{}' for {}, using {}", other, key, fallback);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_path_joins_dir_and_file() {
        let db = DatabaseConfig {
            data_dir: "var/lib".to_string(),
            file_name: "admin.db".to_string(),
        };
        assert_eq!(db.database_path(), std::path::Path::new("var/lib").join("admin.db"));
    }

    #[test]
    fn flag_accepts_common_spellings() {
        for value in ["true", "1", "yes", "ON", " Yes "] {
            assert!(parse_flag("FLAG", value, false), "{value}");
        }
        for value in ["false", "0", "no", "Off"] {
            assert!(!parse_flag("FLAG", value, true), "{value}");
        }
    }

    #[test]
    fn unrecognised_flag_falls_back() {
        assert!(parse_flag("FLAG", "maybe", true));
        assert!(!parse_flag("FLAG", "maybe", false));
    }
}
