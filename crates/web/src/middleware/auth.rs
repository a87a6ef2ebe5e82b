use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::WebError;

/// Actor resolved by the API-key check; injected as a request extension so
/// handlers can attribute writes without touching auth themselves.
#[derive(Debug, Clone, Copy)]
pub struct ActorId(pub Uuid);

pub async fn require_auth(
    State(api_keys): State<ApiKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token.and_then(|token| api_keys.resolve(token)) {
        Some(actor_id) => {
            req.extensions_mut().insert(ActorId(actor_id));
            Ok(next.run(req).await)
        }
        None => {
            tracing::warn!("Invalid API key attempt");
            Err(WebError::Unauthorized)
        }
    }
}

/// Keys are configured as comma-separated `actor-uuid:token` pairs, so a
/// valid token also identifies the acting staff user.
#[derive(Clone)]
pub struct ApiKeys {
    keys: HashMap<String, Uuid>,
}

impl ApiKeys {
    pub fn from_comma_separated(keys_str: &str) -> Self {
        let keys = keys_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|entry| {
                let (actor, token) = entry.split_once(':')?;
                let actor = Uuid::parse_str(actor.trim()).ok()?;
                let token = token.trim();
                if token.is_empty() {
                    None
                } else {
                    Some((token.to_string(), actor))
                }
            })
            .collect();

        Self { keys }
    }

    pub fn resolve(&self, token: &str) -> Option<Uuid> {
        self.keys.get(token).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_actor_token_pairs() {
        let actor = Uuid::new_v4();
        let keys = ApiKeys::from_comma_separated(&format!("{actor}:secret-1"));
        assert_eq!(keys.resolve("secret-1"), Some(actor));
    }

    #[test]
    fn test_unknown_token_is_rejected() {
        let keys = ApiKeys::from_comma_separated(&format!("{}:secret-1", Uuid::new_v4()));
        assert_eq!(keys.resolve("wrong"), None);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let actor = Uuid::new_v4();
        let keys =
            ApiKeys::from_comma_separated(&format!("not-a-uuid:tok, {actor}:good , bare,:empty"));
        assert_eq!(keys.resolve("good"), Some(actor));
        assert_eq!(keys.resolve("tok"), None);
    }
}
