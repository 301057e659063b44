use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub seed_admin_email: String,
    pub seed_admin_password: String,
}

impl AppConfig {
    /// Load configuration from the environment. A missing `JWT_SECRET` or
    /// `DATABASE_URL` is a startup error, so a misconfigured process never
    /// reaches the first login attempt.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL is not set"))?;
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let seed_admin_email =
            env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| "admin@clinic.local".to_string());
        let seed_admin_password =
            env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            seed_admin_email,
            seed_admin_password,
        })
    }
}
