use std::env;

#[derive(Clone)]
pub struct Config {
    pub backend_url: String,
    pub backend_api_key: String,
    pub feed_url: String,
    /// Bootstrap fallback for resolving the mentor account on datasets
    /// that predate the profile role column.
    pub mentor_email: Option<String>,
}

impl Config {
    /// Reads the backend coordinates from the environment, loading `.env`
    /// first when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let backend_url =
            env::var("BACKEND_URL").unwrap_or_else(|_| "http://localhost:54321".into());
        let feed_url = env::var("FEED_URL").unwrap_or_else(|_| {
            format!(
                "{}/realtime/v1",
                backend_url
                    .replacen("https://", "wss://", 1)
                    .replacen("http://", "ws://", 1)
            )
        });
        Self {
            backend_url,
            backend_api_key: env::var("BACKEND_API_KEY").unwrap_or_default(),
            feed_url,
            mentor_email: env::var("MENTOR_EMAIL").ok(),
        }
    }
}
