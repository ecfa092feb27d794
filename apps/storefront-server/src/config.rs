//! Server configuration from command line flags and environment variables.

use clap::Parser;
use std::path::PathBuf;
use storefront::notify::SmtpConfig;
use uuid::Uuid;

#[derive(Debug, Clone, Parser)]
#[command(name = "storefront-server")]
#[command(about = "App storefront API - downloads, publishing and support tickets")]
#[command(version)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDRESS", default_value = "127.0.0.1:3000")]
    pub bind: String,

    /// Tracing filter directives
    #[arg(
        long,
        env = "RUST_LOG",
        default_value = "storefront_server=debug,storefront=debug,tower_http=info"
    )]
    pub log_filter: String,

    /// Directory holding the JSON record store and uploaded files
    #[arg(long, env = "STOREFRONT_DATA_DIR", default_value = "storefront_data")]
    pub data_dir: PathBuf,

    /// URL prefix under which uploaded files are served
    #[arg(long, env = "PUBLIC_FILES_URL", default_value = "http://127.0.0.1:3000/files")]
    pub public_files_url: String,

    /// Hosted backend project URL; with a service key, replaces the local stores
    #[arg(long, env = "SUPABASE_URL")]
    pub backend_url: Option<String>,

    #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
    pub service_key: Option<String>,

    /// Bucket for package binaries on the hosted backend
    #[arg(long, env = "STORAGE_BUCKET", default_value = "app-files")]
    pub storage_bucket: String,

    #[arg(long, env = "SMTP_HOST", default_value = "smtp.gmail.com")]
    pub smtp_host: String,

    #[arg(long, env = "SMTP_PORT", default_value_t = 465)]
    pub smtp_port: u16,

    /// SMTP login; email delivery is disabled when unset
    #[arg(long, env = "EMAIL_USER")]
    pub email_user: Option<String>,

    #[arg(long, env = "EMAIL_APP_PASSWORD", hide_env_values = true)]
    pub email_password: Option<String>,

    /// Sender address, defaults to the SMTP login
    #[arg(long, env = "EMAIL_FROM")]
    pub email_from: Option<String>,

    /// Users granted the admin role at startup
    #[arg(long = "admin-user", env = "ADMIN_USER_IDS", value_delimiter = ',')]
    pub admin_users: Vec<Uuid>,

    /// Seed an empty local store with example apps
    #[arg(long)]
    pub seed: bool,
}

impl Config {
    /// Project URL and service key when both are configured
    pub fn hosted_backend(&self) -> Option<(&str, &str)> {
        match (&self.backend_url, &self.service_key) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => {
                Some((url.as_str(), key.as_str()))
            }
            _ => None,
        }
    }

    pub fn smtp(&self) -> Option<SmtpConfig> {
        let username = self.email_user.clone().filter(|u| !u.is_empty())?;
        Some(SmtpConfig {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            username,
            password: self.email_password.clone().unwrap_or_default(),
            from: self.email_from.clone(),
        })
    }

    pub fn files_dir(&self) -> PathBuf {
        self.data_dir.join("files")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_VARS: [&str; 13] = [
        "BIND_ADDRESS",
        "RUST_LOG",
        "STOREFRONT_DATA_DIR",
        "PUBLIC_FILES_URL",
        "SUPABASE_URL",
        "SUPABASE_SERVICE_ROLE_KEY",
        "STORAGE_BUCKET",
        "SMTP_HOST",
        "SMTP_PORT",
        "EMAIL_USER",
        "EMAIL_APP_PASSWORD",
        "EMAIL_FROM",
        "ADMIN_USER_IDS",
    ];

    /// Parse without picking up whatever the developer's shell exports
    fn parse<I, T>(args: I) -> Config
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
        Config::try_parse_from(args).unwrap()
    }

    #[test]
    fn defaults_use_local_backends() {
        let config = parse(["storefront-server"]);
        assert!(config.hosted_backend().is_none());
        assert_eq!(config.smtp_port, 465);
        assert_eq!(config.files_dir(), PathBuf::from("storefront_data/files"));
    }

    #[test]
    fn parses_admin_list_and_smtp() {
        let admin = Uuid::new_v4();
        let config = parse([
            "storefront-server".to_string(),
            "--admin-user".to_string(),
            format!("{},{}", admin, admin),
            "--email-user".to_string(),
            "support@example.com".to_string(),
            "--backend-url".to_string(),
            "https://project.example.co".to_string(),
            "--service-key".to_string(),
            "secret".to_string(),
        ]);

        assert_eq!(config.admin_users, vec![admin, admin]);
        let smtp = config.smtp().unwrap();
        assert_eq!(smtp.username, "support@example.com");
        assert_eq!(smtp.host, "smtp.gmail.com");
        assert_eq!(
            config.hosted_backend(),
            Some(("https://project.example.co", "secret"))
        );
    }
}
