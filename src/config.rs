use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        api_url: get_env_or_default("SEARCH_API_URL", "http://127.0.0.1:8888/api"),
        port: parse_env_or_default("SEARCH_PORT", 8888),
        static_dir: get_env_or_default("SEARCH_STATIC_DIR", "static"),
        request_timeout: Duration::from_millis(parse_env_or_default(
            "SEARCH_REQUEST_TIMEOUT_MS",
            5000,
        )),
        top_k: parse_env_or_default("SEARCH_TOP_K", 5),
    }
});

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub port: u16,
    pub static_dir: String,
    pub request_timeout: Duration,
    pub top_k: usize,
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env_or_default<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring unparsable value for {key}: {raw:?}");
            default
        }),
        Err(_) => default,
    }
}
