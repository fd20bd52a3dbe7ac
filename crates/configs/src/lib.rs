use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub webapi: WebApiConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

/// Remote Web API holding the service-type collection.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WebApiConfig {
    pub url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Identity of the catalog this instance administers; used for the
/// `<tenant>-service-types-<environment>.csv` export filename.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_tenant")]
    pub tenant: String,
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { tenant: default_tenant(), environment: default_environment() }
    }
}

fn default_request_timeout() -> u64 { 30 }
fn default_tenant() -> String { "default".to_string() }
fn default_environment() -> String { "production".to_string() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.webapi.normalize_from_env();
        self.webapi.validate()?;
        self.catalog.normalize();
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 {
                self.worker_threads = Some(4);
            }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl WebApiConfig {
    /// Fill URL and token from environment variables when the TOML left them empty.
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("WEBAPI_URL") {
                self.url = url;
            }
        }
        if self.token.is_none() {
            if let Ok(token) = std::env::var("WEBAPI_TOKEN") {
                if !token.trim().is_empty() {
                    self.token = Some(token);
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!(
                "webapi.url is empty; set it in config.toml or the WEBAPI_URL environment variable"
            ));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("webapi.url must start with http:// or https://"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("webapi.request_timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }
}

impl CatalogConfig {
    fn normalize(&mut self) {
        if self.tenant.trim().is_empty() {
            self.tenant = default_tenant();
        }
        if self.environment.trim().is_empty() {
            self.environment = default_environment();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [webapi]
            url = "https://api.example.com/api/v2"
            token = "secret"

            [catalog]
            tenant = "egi"
            environment = "devel"
        "#;
        let mut cfg: AppConfig = toml::from_str(toml).expect("parse");
        cfg.normalize_and_validate().expect("validate");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.webapi.token.as_deref(), Some("secret"));
        assert_eq!(cfg.catalog.tenant, "egi");
        assert_eq!(cfg.webapi.request_timeout_secs, 30);
    }

    #[test]
    fn missing_webapi_url_is_rejected() {
        let mut cfg = AppConfig::default();
        std::env::remove_var("WEBAPI_URL");
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn non_http_webapi_url_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.webapi.url = "ftp://api.example.com".into();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn catalog_defaults_apply() {
        let cfg = CatalogConfig::default();
        assert_eq!(cfg.tenant, "default");
        assert_eq!(cfg.environment, "production");
    }
}
