use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use tracing::{debug, warn};
use uuid::Uuid;

use super::claims::{Claims, TokenKind};
use crate::state::AppState;

/// Verification half of the token keys. Tokens are issued by the identity
/// service that shares `JWT_SECRET`.
#[derive(Clone)]
pub struct JwtKeys {
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let cfg = &state.config.jwt;
        Self {
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
        }
    }
}

impl JwtKeys {
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }
}

/// Caller identity taken from an access token.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Missing Authorization header".to_string(),
            ))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header".to_string(),
            ))?;

        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
            )
        })?;

        if claims.kind != TokenKind::Access {
            return Err((
                StatusCode::UNAUTHORIZED,
                "Access token required".to_string(),
            ));
        }

        Ok(AuthUser(claims.sub))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::sign;
    use super::*;
    use crate::config::AppConfig;
    use axum::http::Request;

    fn state() -> AppState {
        AppState::fake()
    }

    async fn extract(state: &AppState, header: Option<String>) -> Result<Uuid, StatusCode> {
        let mut builder = Request::builder().uri("/");
        if let Some(h) = header {
            builder = builder.header("authorization", h);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, state)
            .await
            .map(|AuthUser(id)| id)
            .map_err(|(status, _)| status)
    }

    #[tokio::test]
    async fn accepts_access_token() {
        let state = state();
        let user = Uuid::new_v4();
        let token = sign(&state.config.jwt, user, TokenKind::Access);
        assert_eq!(extract(&state, Some(format!("Bearer {token}"))).await, Ok(user));
    }

    #[tokio::test]
    async fn rejects_refresh_token() {
        let state = state();
        let token = sign(&state.config.jwt, Uuid::new_v4(), TokenKind::Refresh);
        assert_eq!(
            extract(&state, Some(format!("Bearer {token}"))).await,
            Err(StatusCode::UNAUTHORIZED)
        );
    }

    #[tokio::test]
    async fn rejects_missing_header_and_bad_scheme() {
        let state = state();
        assert_eq!(extract(&state, None).await, Err(StatusCode::UNAUTHORIZED));
        assert_eq!(
            extract(&state, Some("Basic abc".into())).await,
            Err(StatusCode::UNAUTHORIZED)
        );
    }

    #[tokio::test]
    async fn rejects_wrong_issuer_or_audience() {
        let state = state();
        let mut other = AppConfig::for_tests().jwt;
        other.issuer = "someone-else".into();
        let token = sign(&other, Uuid::new_v4(), TokenKind::Access);
        assert_eq!(
            extract(&state, Some(format!("Bearer {token}"))).await,
            Err(StatusCode::UNAUTHORIZED)
        );
    }
}
