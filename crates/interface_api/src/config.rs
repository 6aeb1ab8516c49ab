//! API configuration

use serde::Deserialize;
use thiserror::Error;

use domain_claims::{LifecycleConfig, ScoreCard, Threshold};

/// Placeholder secret; the server warns when it is still in use
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// API configuration
///
/// Every field can be overridden with an `API_`-prefixed environment
/// variable, e.g. `API_REVIEW_THRESHOLD=0.7`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// HS256 secret shared with the login service
    pub jwt_secret: String,
    /// Tolerated clock skew when checking token expiry
    pub jwt_leeway_secs: u64,
    /// PostgreSQL URL; claims are kept in memory when unset
    pub database_url: Option<String>,
    /// Log level
    pub log_level: String,
    /// Fraud score at which a pending claim enters the review queue
    pub review_threshold: f64,
    /// Queue length when the caller gives no limit
    pub review_queue_limit: usize,
    /// Largest queue length a caller may ask for
    pub review_queue_max_limit: usize,
    /// Risk score given to claims the scorer could not rate
    pub unscored_risk_score: f64,
    /// Fraud score given to claims the scorer could not rate
    pub unscored_fraud_score: f64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let lifecycle = LifecycleConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_leeway_secs: 0,
            database_url: None,
            log_level: "info".to_string(),
            review_threshold: lifecycle.default_threshold.value(),
            review_queue_limit: lifecycle.default_queue_limit,
            review_queue_max_limit: lifecycle.max_queue_limit,
            unscored_risk_score: lifecycle.unscored.risk.value(),
            unscored_fraud_score: lifecycle.unscored.fraud.value(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let config: ApiConfig = config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Checks ranges that deserialization cannot express
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigurationError::Invalid("jwt_secret must not be empty".to_string()));
        }
        for (name, value) in [
            ("review_threshold", self.review_threshold),
            ("unscored_risk_score", self.unscored_risk_score),
            ("unscored_fraud_score", self.unscored_fraud_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigurationError::Invalid(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.review_queue_max_limit == 0 {
            return Err(ConfigurationError::Invalid(
                "review_queue_max_limit must be positive".to_string(),
            ));
        }
        if self.review_queue_limit == 0 || self.review_queue_limit > self.review_queue_max_limit {
            return Err(ConfigurationError::Invalid(format!(
                "review_queue_limit must be between 1 and {}",
                self.review_queue_max_limit
            )));
        }
        Ok(())
    }

    /// Domain tunables derived from this configuration
    pub fn lifecycle_config(&self) -> Result<LifecycleConfig, ConfigurationError> {
        self.validate()?;
        let invalid = |e: domain_claims::ClaimError| ConfigurationError::Invalid(e.to_string());
        Ok(LifecycleConfig {
            default_threshold: Threshold::new(self.review_threshold).map_err(invalid)?,
            unscored: ScoreCard::new(self.unscored_risk_score, self.unscored_fraud_score)
                .map_err(invalid)?,
            default_queue_limit: self.review_queue_limit,
            max_queue_limit: self.review_queue_max_limit,
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}
