use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub auth: AuthSettings,
    pub stream: StreamSettings,
    pub attendance: AttendanceSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    /// IANA zone name used to decide which calendar day a check-in falls on.
    pub timezone: String,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub issuer: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Password accounts; identities are backed by a member record.
    Verified,
    /// Name/email entry only; nothing is checked server-side.
    Unverified,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    pub mode: AuthMode,
    /// Emails that receive the admin role when they register.
    pub admin_emails: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StreamSettings {
    pub default_channel_id: String,
    pub default_title: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AttendanceSettings {
    pub list_limit: i64,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("VIGIL")
                    .list_separator(",")
                    .with_list_parse_key("auth.admin_emails")
                    .with_list_parse_key("app.cors_origins")
                    .try_parsing(true),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.timezone", "UTC")?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "vigil")?
            .set_default("jwt.secret", "change-me-in-production")?
            .set_default("jwt.access_token_ttl_secs", 3600)?
            .set_default("jwt.refresh_token_ttl_secs", 604800)?
            .set_default("jwt.issuer", "vigil")?
            .set_default("auth.mode", "verified")?
            .set_default("auth.admin_emails", Vec::<String>::new())?
            .set_default("stream.default_channel_id", "UCR4c-NsIGhMqV8W-E-Q5N6A")?
            .set_default("stream.default_title", "Sunday Service")?
            .set_default("attendance.list_limit", 100)?
            .build()?;

        config.try_deserialize()
    }
}
