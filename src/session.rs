use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;

use crate::backend::BackendError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Claims read from the token payload. Nothing here is verified; the role is
/// only used to decide which links to show and where to redirect.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct Session {
    token: Option<String>,
    claims: Option<TokenClaims>,
}

impl Session {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        if token.is_empty() {
            return Self::guest();
        }

        let claims = decode_claims(&token);
        Self {
            token: Some(token),
            claims,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn require_token(&self) -> Result<&str, BackendError> {
        self.token().ok_or(BackendError::MissingToken)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.token.as_ref()?;
        let is_admin = self
            .claims
            .as_ref()
            .and_then(|claims| claims.role.as_deref())
            == Some("admin");
        Some(if is_admin { Role::Admin } else { Role::User })
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    pub fn display_name(&self) -> Option<&str> {
        let claims = self.claims.as_ref()?;
        [claims.name.as_deref(), claims.email.as_deref()]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
    }
}

/// Decode the middle segment of a three-part token.
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    let mut parts = token.split('.');
    let (Some(_), Some(payload), Some(_), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
pub(crate) fn token_with_claims(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}
