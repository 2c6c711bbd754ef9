// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Bearer-token authentication and organization authorization.
//!
//! Tokens are verified either against an HS256 shared secret or against a
//! JSON Web Key Set selected by the token's `kid`. After verification the
//! user's `organizationId` claim must be on the allow-list.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Environment, ServiceConfig, DEFAULT_ORGANIZATION};
use crate::error::ApiError;
use crate::state::AppState;

/// Authentication and authorization failures. All map to `401`.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization: Bearer` header.
    #[error("Authentication header is empty or wrong format")]
    MissingCredentials,
    /// Signature valid but `exp` has passed.
    #[error("Token has expired")]
    Expired,
    /// Anything else wrong with the token.
    #[error("Token is invalid")]
    InvalidToken,
    /// Token valid but the organization is not admitted.
    #[error("Authorization refused for organization id {0}")]
    OrganizationRefused(String),
    /// Verification keys could not be set up.
    #[error("authorization keys are not configured: {0}")]
    KeyConfig(String),
}

/// The caller, as asserted by the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Display name.
    pub name: String,
    /// E-mail address.
    pub email: String,
    /// Organization the user belongs to.
    #[serde(rename = "organizationId")]
    pub organization_id: String,
}

impl User {
    /// The user assumed in the development environment.
    pub fn development() -> Self {
        Self {
            name: "John Doe".into(),
            email: "john@doe.com".into(),
            organization_id: DEFAULT_ORGANIZATION.into(),
        }
    }
}

enum Keys {
    Secret(DecodingKey),
    Jwks(JwkSet),
}

enum Mode {
    Development,
    Verify {
        keys: Keys,
        audience: Option<String>,
    },
}

/// Verifies bearer tokens and applies the organization allow-list.
pub struct Authorizer {
    mode: Mode,
    organizations: BTreeSet<String>,
}

impl Authorizer {
    /// Skip verification; every request runs as [`User::development`].
    pub fn development() -> Self {
        Self {
            mode: Mode::Development,
            organizations: BTreeSet::from([DEFAULT_ORGANIZATION.to_owned()]),
        }
    }

    /// Verify HS256 tokens signed with `secret`.
    pub fn with_secret(
        secret: &[u8],
        audience: Option<String>,
        organizations: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            mode: Mode::Verify {
                keys: Keys::Secret(DecodingKey::from_secret(secret)),
                audience,
            },
            organizations: organizations.into_iter().collect(),
        }
    }

    /// Verify tokens against the keys of `set`.
    pub fn with_jwks(
        set: JwkSet,
        audience: Option<String>,
        organizations: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            mode: Mode::Verify {
                keys: Keys::Jwks(set),
                audience,
            },
            organizations: organizations.into_iter().collect(),
        }
    }

    /// Build from settings. Outside development a JWK set file or a shared
    /// secret is required; the key set wins when both are given.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, AuthError> {
        let organizations = config.allowed_organizations.iter().cloned();
        if config.environment == Environment::Development {
            return Ok(Self {
                organizations: organizations.collect(),
                ..Self::development()
            });
        }
        let audience = config.allowed_token_aud.clone();
        if let Some(path) = &config.jwks_path {
            return Ok(Self::with_jwks(load_jwks(path)?, audience, organizations));
        }
        if let Some(secret) = &config.jwt_secret {
            return Ok(Self::with_secret(secret.as_bytes(), audience, organizations));
        }
        Err(AuthError::KeyConfig(
            "set SEASTATE_JWKS_PATH or SEASTATE_JWT_SECRET".into(),
        ))
    }

    /// `true` when tokens are not verified.
    pub fn is_development(&self) -> bool {
        matches!(self.mode, Mode::Development)
    }

    /// Resolve the user behind an `Authorization` header value.
    pub fn authenticate(&self, header: Option<&str>) -> Result<User, AuthError> {
        let (keys, audience) = match &self.mode {
            Mode::Development => return Ok(User::development()),
            Mode::Verify { keys, audience } => (keys, audience),
        };
        let token = bearer_token(header).ok_or(AuthError::MissingCredentials)?;
        let header = decode_header(token).map_err(|_| AuthError::InvalidToken)?;
        let (key, algorithm) = match keys {
            Keys::Secret(key) => (key.clone(), Algorithm::HS256),
            Keys::Jwks(set) => {
                let kid = header.kid.as_deref().ok_or(AuthError::InvalidToken)?;
                let jwk = set.find(kid).ok_or(AuthError::InvalidToken)?;
                let key = DecodingKey::from_jwk(jwk).map_err(|_| AuthError::InvalidToken)?;
                (key, header.alg)
            }
        };
        let mut validation = Validation::new(algorithm);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        decode::<User>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken,
            })
    }

    /// [`authenticate`](Self::authenticate), then check the organization.
    pub fn authorize(&self, header: Option<&str>) -> Result<User, AuthError> {
        let user = self.authenticate(header)?;
        if self.organizations.contains(&user.organization_id) {
            Ok(user)
        } else {
            Err(AuthError::OrganizationRefused(user.organization_id))
        }
    }
}

fn load_jwks(path: &Path) -> Result<JwkSet, AuthError> {
    let bytes = fs::read(path)
        .map_err(|err| AuthError::KeyConfig(format!("{}: {err}", path.display())))?;
    serde_json::from_slice(&bytes)
        .map_err(|err| AuthError::KeyConfig(format!("{}: {err}", path.display())))
}

fn bearer_token(header: Option<&str>) -> Option<&str> {
    let (scheme, token) = header?.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Middleware gating every `/api` route: the resolved [`User`] is stored in
/// the request extensions.
pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let user = state
        .auth
        .authorize(header)
        .inspect_err(|err| warn!(path = %request.uri().path(), %err, "request refused"))?;
    debug!(email = %user.email, organization = %user.organization_id, "request authorized");
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &[u8] = b"unit-test-secret";

    fn token(claims: &serde_json::Value) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(SECRET)).unwrap()
    }

    fn claims(org: &str, exp: u64) -> serde_json::Value {
        json!({
            "name": "Kari Nordmann",
            "email": "kari@example.com",
            "organizationId": org,
            "aud": "seastate",
            "exp": exp,
        })
    }

    fn authorizer() -> Authorizer {
        Authorizer::with_secret(
            SECRET,
            Some("seastate".into()),
            [DEFAULT_ORGANIZATION.to_owned()],
        )
    }

    #[test]
    fn bearer_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("bearer  abc ")), Some("abc"));
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(None), None);
    }

    #[test]
    fn valid_token_yields_user() {
        let t = token(&claims(DEFAULT_ORGANIZATION, get_current_timestamp() + 600));
        let user = authorizer().authorize(Some(&format!("Bearer {t}"))).unwrap();
        assert_eq!(user.email, "kari@example.com");
        assert_eq!(user.organization_id, DEFAULT_ORGANIZATION);
    }

    #[test]
    fn failures_are_classified() {
        let auth = authorizer();
        assert!(matches!(
            auth.authorize(None),
            Err(AuthError::MissingCredentials)
        ));

        let expired = token(&claims(DEFAULT_ORGANIZATION, get_current_timestamp() - 3600));
        assert!(matches!(
            auth.authorize(Some(&format!("Bearer {expired}"))),
            Err(AuthError::Expired)
        ));

        assert!(matches!(
            auth.authorize(Some("Bearer not.a.jwt")),
            Err(AuthError::InvalidToken)
        ));

        let mut wrong_aud = claims(DEFAULT_ORGANIZATION, get_current_timestamp() + 600);
        wrong_aud["aud"] = json!("someone-else");
        assert!(matches!(
            auth.authorize(Some(&format!("Bearer {}", token(&wrong_aud)))),
            Err(AuthError::InvalidToken)
        ));

        let foreign = token(&claims("other-org", get_current_timestamp() + 600));
        let err = auth
            .authorize(Some(&format!("Bearer {foreign}")))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Authorization refused for organization id other-org"
        );
    }

    #[test]
    fn production_without_keys_is_a_config_error() {
        assert!(matches!(
            Authorizer::from_config(&ServiceConfig::default()),
            Err(AuthError::KeyConfig(_))
        ));
        let dev = ServiceConfig {
            environment: Environment::Development,
            ..ServiceConfig::default()
        };
        let auth = Authorizer::from_config(&dev).unwrap();
        assert!(auth.is_development());
        assert_eq!(auth.authorize(None).unwrap(), User::development());
    }

    #[test]
    fn jwks_file_must_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");
        fs::write(&path, br#"{"keys": []}"#).unwrap();
        let cfg = ServiceConfig {
            jwks_path: Some(path),
            ..ServiceConfig::default()
        };
        let auth = Authorizer::from_config(&cfg).unwrap();
        // no key can match an empty set
        let t = token(&claims(DEFAULT_ORGANIZATION, get_current_timestamp() + 600));
        assert!(matches!(
            auth.authorize(Some(&format!("Bearer {t}"))),
            Err(AuthError::InvalidToken)
        ));

        fs::write(dir.path().join("bad.json"), b"not json").unwrap();
        let bad = ServiceConfig {
            jwks_path: Some(dir.path().join("bad.json")),
            ..ServiceConfig::default()
        };
        assert!(matches!(
            Authorizer::from_config(&bad),
            Err(AuthError::KeyConfig(_))
        ));
    }
}
