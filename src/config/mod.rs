use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub pricing: PricingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

/// Class multipliers over the Lower Class base price.
///
/// The default VIP formula multiplies the *Lower* Class price (observed
/// legacy behavior, so VIP == Upper Class with the stock multipliers).
/// Set PRICING_VIP_TIERED=true to stack the VIP multiplier on top of the
/// Upper Class price instead.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    pub upper_multiplier: f64,
    pub vip_multiplier: f64,
    pub vip_tiered: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .expect("PORT must be a valid number"),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "cinema_system=debug,tower_http=debug".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
                pool_size: env::var("DB_POOL_SIZE")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .expect("DB_POOL_SIZE must be a valid number"),
            },
            pricing: PricingConfig {
                upper_multiplier: env::var("PRICING_UPPER_MULTIPLIER")
                    .unwrap_or_else(|_| "1.2".to_string())
                    .parse()
                    .expect("PRICING_UPPER_MULTIPLIER must be a valid number"),
                vip_multiplier: env::var("PRICING_VIP_MULTIPLIER")
                    .unwrap_or_else(|_| "1.2".to_string())
                    .parse()
                    .expect("PRICING_VIP_MULTIPLIER must be a valid number"),
                vip_tiered: env::var("PRICING_VIP_TIERED")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()
                    .expect("PRICING_VIP_TIERED must be true or false"),
            },
        }
    }
}
