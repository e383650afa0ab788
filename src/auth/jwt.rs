use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::Claims;
use crate::{
    config::JwtConfig,
    error::{AppError, AppResult},
};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Signs and verifies identity tokens with one HMAC secret, built once at startup.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(cfg: &JwtConfig) -> anyhow::Result<Self> {
        anyhow::ensure!(!cfg.secret.is_empty(), "jwt secret must not be empty");
        anyhow::ensure!(cfg.ttl_hours > 0, "jwt ttl must be positive");
        Ok(Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            ttl: Duration::hours(cfg.ttl_hours),
        })
    }

    pub fn issue(&self, user_id: Uuid) -> AppResult<String> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, user_id: Uuid, now: OffsetDateTime) -> AppResult<String> {
        let claims = Claims {
            user_id,
            exp: (now + self.ttl).unix_timestamp(),
        };
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("jwt encode: {e}")))?;
        debug!(user_id = %user_id, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    pub fn validate(&self, token: &str) -> AppResult<Uuid> {
        self.validate_at(token, OffsetDateTime::now_utc())
    }

    /// Expiry is checked here against `now` rather than inside jsonwebtoken,
    /// so a token is expired exactly when `now >= exp`, with no leeway.
    pub fn validate_at(&self, token: &str, now: OffsetDateTime) -> AppResult<Uuid> {
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            let mapped = classify(token, e.kind());
            debug!(error = %e, "jwt rejected");
            mapped
        })?;

        if now.unix_timestamp() >= data.claims.exp {
            return Err(AppError::Expired);
        }
        debug!(user_id = %data.claims.user_id, "jwt verified");
        Ok(data.claims.user_id)
    }
}

fn classify(token: &str, kind: &ErrorKind) -> AppError {
    match kind {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::MissingAlgorithm => AppError::BadSignature,
        ErrorKind::ExpiredSignature => AppError::Expired,
        _ if foreign_algorithm(token) => AppError::BadSignature,
        _ => AppError::Malformed,
    }
}

/// True when the header names an algorithm other than HS256, including names
/// jsonwebtoken refuses to parse such as `none`.
fn foreign_algorithm(token: &str) -> bool {
    let Some(segment) = token.split('.').next() else {
        return false;
    };
    let Ok(raw) = URL_SAFE_NO_PAD.decode(segment) else {
        return false;
    };
    let Ok(header) = serde_json::from_slice::<serde_json::Value>(&raw) else {
        return false;
    };
    matches!(header.get("alg").and_then(|a| a.as_str()), Some(alg) if alg != "HS256")
}
