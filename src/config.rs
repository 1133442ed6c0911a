use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl StorageBackend {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "inmem" => StorageBackend::Memory,
            _ => StorageBackend::Sqlite,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub storage: StorageBackend,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:gymlog.db?mode=rwc".to_string()),
            storage: StorageBackend::parse(
                &env::var("STORAGE").unwrap_or_else(|_| "sqlite".to_string()),
            ),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "6767".to_string())
                .parse()
                .unwrap_or(6767),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
