mod file_config;

pub use file_config::{FileConfig, NotificationsConfig, PaginationConfig, UploadsConfig};

use crate::document::{UploadPolicy, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_FILE_SIZE_MB};
use crate::notifications::{LogNotifier, MailRelayNotifier, Notifier};
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_SENDER_NAME: &str = "Portal Team";
pub const DEFAULT_FROM_ADDRESS: &str = "no-reply@docportal.local";
pub const DEFAULT_RELAY_TIMEOUT_SEC: u64 = 10;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub media_path: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub mail_relay_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub media_path: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,

    pub pagination: PaginationSettings,
    pub uploads: UploadSettings,
    pub notifications: NotificationSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationSettings {
    pub moderation_page_size: usize,
    pub catalog_page_size: usize,
    pub user_page_size: usize,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            moderation_page_size: 10,
            catalog_page_size: 12,
            user_page_size: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettings {
    pub max_file_size_mb: u64,
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

impl UploadSettings {
    pub fn policy(&self) -> UploadPolicy {
        UploadPolicy::new(self.max_file_size_mb, self.allowed_extensions.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    /// Emails are only logged when no relay is configured.
    pub relay_url: Option<String>,
    pub from_address: String,
    pub timeout_sec: u64,
    pub sender_name: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            relay_url: None,
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
            timeout_sec: DEFAULT_RELAY_TIMEOUT_SEC,
            sender_name: DEFAULT_SENDER_NAME.to_string(),
        }
    }
}

impl NotificationSettings {
    pub fn build_notifier(&self) -> Result<Arc<dyn Notifier>> {
        Ok(match &self.relay_url {
            Some(url) => Arc::new(MailRelayNotifier::new(
                url.clone(),
                self.from_address.clone(),
                self.sender_name.clone(),
                self.timeout_sec,
            )?),
            None => Arc::new(LogNotifier::new(self.sender_name.clone())),
        })
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let media_path = file
            .media_path
            .map(PathBuf::from)
            .or_else(|| cli.media_path.clone())
            .unwrap_or_else(|| db_dir.clone());

        let port = file.port.unwrap_or(cli.port);

        let logging_level = match file.logging_level {
            Some(s) => match parse_logging_level(&s) {
                Some(level) => level,
                None => bail!("Invalid logging_level '{}' in config file", s),
            },
            None => cli.logging_level.clone(),
        };

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let pagination_file = file.pagination.unwrap_or_default();
        let defaults = PaginationSettings::default();
        let pagination = PaginationSettings {
            moderation_page_size: positive(
                "pagination.moderation_page_size",
                pagination_file
                    .moderation_page_size
                    .unwrap_or(defaults.moderation_page_size),
            )?,
            catalog_page_size: positive(
                "pagination.catalog_page_size",
                pagination_file
                    .catalog_page_size
                    .unwrap_or(defaults.catalog_page_size),
            )?,
            user_page_size: positive(
                "pagination.user_page_size",
                pagination_file
                    .user_page_size
                    .unwrap_or(defaults.user_page_size),
            )?,
        };

        let uploads_file = file.uploads.unwrap_or_default();
        let upload_defaults = UploadSettings::default();
        let uploads = UploadSettings {
            max_file_size_mb: positive(
                "uploads.max_file_size_mb",
                uploads_file
                    .max_file_size_mb
                    .unwrap_or(upload_defaults.max_file_size_mb) as usize,
            )? as u64,
            allowed_extensions: uploads_file
                .allowed_extensions
                .unwrap_or(upload_defaults.allowed_extensions),
        };
        if uploads.allowed_extensions.is_empty() {
            bail!("uploads.allowed_extensions must not be empty");
        }

        let notifications_file = file.notifications.unwrap_or_default();
        let notification_defaults = NotificationSettings::default();
        let notifications = NotificationSettings {
            relay_url: notifications_file
                .relay_url
                .or_else(|| cli.mail_relay_url.clone()),
            from_address: notifications_file
                .from_address
                .unwrap_or(notification_defaults.from_address),
            timeout_sec: positive(
                "notifications.timeout_sec",
                notifications_file
                    .timeout_sec
                    .unwrap_or(notification_defaults.timeout_sec) as usize,
            )? as u64,
            sender_name: notifications_file
                .sender_name
                .unwrap_or(notification_defaults.sender_name),
        };

        Ok(Self {
            db_dir,
            media_path,
            port,
            logging_level,
            frontend_dir_path,
            pagination,
            uploads,
            notifications,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_dir.join("portal.db")
    }
}

fn positive(field: &str, value: usize) -> Result<usize> {
    if value == 0 {
        bail!("{} must be greater than zero", field);
    }
    Ok(value)
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
