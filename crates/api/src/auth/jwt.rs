//! Signed access-token issuance and validation.
//!
//! Access tokens are HMAC-signed JWTs carrying a [`Claims`] payload: the
//! username, the admin flag, and the collections the user may read. The
//! signing secret and algorithm come from the process configuration; a codec
//! built without them refuses to issue or validate anything.

use std::str::FromStr;

use docchat_core::claims::{Claims, Scopes};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// Default access token lifetime in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 30;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures of token issuance or validation.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Signing secret or algorithm is unset or unusable.
    #[error("JWT configuration missing: {0}")]
    Configuration(String),

    /// Bad signature, malformed token, or expired.
    #[error("Invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// The token verified but carries no subject.
    #[error("Token missing subject")]
    MissingSubject,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret used to sign and verify tokens.
    pub secret: Option<String>,
    /// Algorithm name, e.g. `HS256`.
    pub algorithm: Option<String>,
    /// Access token lifetime in minutes.
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                       | Required | Default |
    /// |-------------------------------|----------|---------|
    /// | `JWT_SECRET_KEY`              | **yes**  | --      |
    /// | `JWT_ALGORITHM`               | **yes**  | --      |
    /// | `ACCESS_TOKEN_EXPIRE_MINUTES` | no       | `30`    |
    ///
    /// Missing secret or algorithm is not reported here; see
    /// [`TokenCodec::check`].
    ///
    /// # Panics
    ///
    /// Panics if `ACCESS_TOKEN_EXPIRE_MINUTES` is not a valid integer.
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let access_token_expiry_mins: i64 = std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("ACCESS_TOKEN_EXPIRE_MINUTES must be a valid i64");

        Self {
            secret: non_empty("JWT_SECRET_KEY"),
            algorithm: non_empty("JWT_ALGORITHM"),
            access_token_expiry_mins,
        }
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Issues and validates access tokens for one signing configuration.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    config: JwtConfig,
}

impl TokenCodec {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    /// Verify the signing configuration is usable without issuing a token.
    ///
    /// Returns the same [`TokenError::Configuration`] that [`issue`](Self::issue)
    /// would, so callers can fail at startup instead of on first login.
    pub fn check(&self) -> Result<(), TokenError> {
        self.signing().map(|_| ())
    }

    /// Issue a signed token for `subject`.
    ///
    /// A single scope is stored as a one-element list. The token expires
    /// `access_token_expiry_mins` after now; a lifetime that overflows the
    /// timestamp is a configuration error.
    pub fn issue(
        &self,
        subject: &str,
        admin: bool,
        scopes: impl Into<Scopes>,
    ) -> Result<String, TokenError> {
        let (secret, algorithm) = self.signing()?;
        let exp = self
            .config
            .access_token_expiry_mins
            .checked_mul(60)
            .and_then(|ttl_secs| chrono::Utc::now().timestamp().checked_add(ttl_secs))
            .ok_or_else(|| {
                TokenError::Configuration(format!(
                    "access token lifetime of {} minutes is out of range",
                    self.config.access_token_expiry_mins
                ))
            })?;

        let claims = Claims {
            sub: subject.to_string(),
            admin,
            authorized_collections: scopes.into().into_vec(),
            exp,
        };

        Ok(encode(
            &Header::new(algorithm),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?)
    }

    /// Validate a token and return its claims.
    ///
    /// Expiry is checked with zero leeway.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let (secret, algorithm) = self.signing()?;

        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .inspect_err(|e| tracing::warn!(error = %e, "JWT decode failed"))?;

        if token_data.claims.sub.is_empty() {
            return Err(TokenError::MissingSubject);
        }
        Ok(token_data.claims)
    }

    fn signing(&self) -> Result<(&str, Algorithm), TokenError> {
        let (Some(secret), Some(algorithm)) = (&self.config.secret, &self.config.algorithm)
        else {
            return Err(TokenError::Configuration(
                "secret key or algorithm not set".into(),
            ));
        };

        let algorithm = Algorithm::from_str(algorithm).map_err(|_| {
            TokenError::Configuration(format!("unknown algorithm '{algorithm}'"))
        })?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(TokenError::Configuration(format!(
                "algorithm {algorithm:?} needs a key pair; only HS256/HS384/HS512 are supported"
            )));
        }

        Ok((secret.as_str(), algorithm))
    }
}
