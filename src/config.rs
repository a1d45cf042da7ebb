use std::env;
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub http_host: String,
    pub http_port: u16,
    pub pool_max_size: usize,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Build database_url from individual fields or use DATABASE_URL if provided
        let database_url = if let Ok(url) = env::var("DATABASE_URL") {
            url
        } else {
            let db_host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
            let db_port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
            let db_name = env::var("DB_NAME").unwrap_or_else(|_| "travelstay".to_string());
            let db_user = env::var("DB_USER").unwrap_or_else(|_| "travelstay".to_string());
            let db_password = env::var("DB_PASSWORD").unwrap_or_else(|_| "password".to_string());

            // URL-encode password to handle special characters
            let encoded_password = urlencoding::encode(&db_password);

            format!(
                "postgres://{}:{}@{}:{}/{}",
                db_user, encoded_password, db_host, db_port, db_name
            )
        };

        let http_host = env::var("HTTP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let http_port = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .unwrap_or(8000);

        let pool_max_size = env::var("POOL_MAX_SIZE")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "/var/log/travelstay".to_string());

        Ok(Config {
            database_url,
            http_host,
            http_port,
            pool_max_size,
            log_dir,
        })
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.http_host, self.http_port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address: {}", e))
    }
}
