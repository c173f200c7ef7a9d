use anyhow::Context;

use daybook_assistant::DEFAULT_MODEL;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub jwt_secret: String,
}

impl AppConfig {
    /// Everything is optional with a default except the Gemini key, which the
    /// assistant cannot run without.
    pub fn from_env() -> anyhow::Result<Self> {
        let gemini_api_key =
            std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY is not set")?;
        if gemini_api_key.is_empty() {
            anyhow::bail!("GEMINI_API_KEY is empty");
        }

        let gemini_model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let host = std::env::var("DAYBOOK_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("DAYBOOK_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .context("DAYBOOK_PORT must be a port number")?;
        let db_path = std::env::var("DAYBOOK_DB_PATH").unwrap_or_else(|_| "daybook.db".into());
        let jwt_secret =
            std::env::var("DAYBOOK_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());

        Ok(Self {
            gemini_api_key,
            gemini_model,
            host,
            port,
            db_path,
            jwt_secret,
        })
    }
}
