use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

/// The token signing secret. Its `Debug` output is redacted.
#[derive(Clone)]
pub struct SigningSecret(String);

impl SigningSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("SigningSecret(**redacted**)")
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `JWT_SECRET` is unset or blank.
    MissingSecret,
    /// A variable is present but does not hold an acceptable value.
    Invalid { var: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::MissingSecret => write!(f, "JWT_SECRET must be set"),
            ConfigError::Invalid { var, value } => {
                write!(f, "{} has an invalid value: {:?}", var, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: SigningSecret,
    /// `None` issues tokens without an expiry.
    pub token_ttl: Option<Duration>,
    pub bcrypt_cost: u32,
    /// `None` selects the in-memory credential store.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .map(SigningSecret::new)
            .ok_or(ConfigError::MissingSecret)?;

        let token_ttl = match lookup("TOKEN_TTL_SECONDS") {
            None => None,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => None,
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    return Err(ConfigError::Invalid {
                        var: "TOKEN_TTL_SECONDS",
                        value: raw,
                    })
                }
            },
        };

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            None => DEFAULT_BCRYPT_COST,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(cost) if (MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) => cost,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "BCRYPT_COST",
                        value: raw,
                    })
                }
            },
        };

        let server_port = match lookup("SERVER_PORT") {
            None => 8080,
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "SERVER_PORT",
                value: raw.clone(),
            })?,
        };

        Ok(Self {
            jwt_secret,
            token_ttl,
            bcrypt_cost,
            database_url: lookup("DATABASE_URL").filter(|s| !s.trim().is_empty()),
            server_port,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
