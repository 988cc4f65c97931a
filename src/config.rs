use std::net::SocketAddr;

pub struct AppConfig {
    pub bind: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env_string("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);
        let host = env_string("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let bind = format!("{host}:{port}")
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], port)));
        Self { bind }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
