use std::env;

/// Credentials and endpoint for the PayOS payment gateway.
///
/// All three secrets come from the environment; there are no baked-in
/// fallbacks. With empty credentials, payment-link creation fails with an
/// upstream error at request time while the rest of the server keeps working.
#[derive(Debug, Clone)]
pub struct PayOsConfig {
    pub client_id: String,
    pub api_key: String,
    pub checksum_key: String,
    pub api_url: String,
}

impl PayOsConfig {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.api_key.is_empty() && !self.checksum_key.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Public base URL used for payment return/cancel links
    pub base_url: String,
    pub dev_mode: bool,
    pub payos: PayOsConfig,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("LICENSE_SERVER_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let base_url = env::var("LICENSE_SERVER_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port));

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "license.db".to_string()),
            base_url,
            dev_mode,
            payos: PayOsConfig {
                client_id: env::var("PAYOS_CLIENT_ID").unwrap_or_default(),
                api_key: env::var("PAYOS_API_KEY").unwrap_or_default(),
                checksum_key: env::var("PAYOS_CHECKSUM_KEY").unwrap_or_default(),
                api_url: env::var("PAYOS_API_URL")
                    .unwrap_or_else(|_| "https://api-merchant.payos.vn/v2".to_string()),
            },
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
