use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub display_limit: usize,
    pub astro_api_base_url: String,
    pub astro_app_id: Option<String>,
    pub astro_app_secret: Option<String>,
    pub astro_request_timeout_secs: u64,
    pub astro_user_agent: String,
    pub astro_default_lat: f64,
    pub astro_default_lon: f64,
    pub astro_default_days: u32,
    pub astro_default_body: String,
}

impl AppConfig {
    /// Returns `true` when both halves of the upstream credential pair are set.
    #[must_use]
    pub fn astro_credentials_configured(&self) -> bool {
        self.astro_app_id.is_some() && self.astro_app_secret.is_some()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("display_limit", &self.display_limit)
            .field("astro_api_base_url", &self.astro_api_base_url)
            .field("astro_app_id", &self.astro_app_id)
            .field(
                "astro_app_secret",
                &self.astro_app_secret.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "astro_request_timeout_secs",
                &self.astro_request_timeout_secs,
            )
            .field("astro_user_agent", &self.astro_user_agent)
            .field("astro_default_lat", &self.astro_default_lat)
            .field("astro_default_lon", &self.astro_default_lon)
            .field("astro_default_days", &self.astro_default_days)
            .field("astro_default_body", &self.astro_default_body)
            .finish()
    }
}
