//! JWT-backed identity verification over a `users` directory collection.

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{IdentityError, IdentityVerifier, VerifiedIdentity};
use crate::store::{collections, DocumentQuery, DocumentStore, StoreError};

/// Claim set carried by access tokens. The external issuer embeds the
/// directory's custom claims at sign-in, so `admin` reflects the
/// directory as of the user's last token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub admin: bool,
    pub exp: i64,
    pub iat: i64,
}

pub struct JwtIdentity {
    decoding_key: DecodingKey,
    validation: Validation,
    store: Arc<dyn DocumentStore>,
}

impl JwtIdentity {
    pub fn new(secret: &str, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
            store,
        }
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentity {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| {
                tracing::debug!("token rejected: {err}");
                IdentityError::InvalidToken
            })?;
        let claims = data.claims;
        Ok(VerifiedIdentity {
            uid: claims.sub,
            email: claims.email,
            admin: claims.admin,
        })
    }

    async fn uid_for_email(&self, email: &str) -> Result<String, IdentityError> {
        let docs = self
            .store
            .query(
                collections::USERS,
                DocumentQuery::new().filter("email", email).limit(1),
            )
            .await
            .map_err(backend)?;
        docs.into_iter()
            .next()
            .map(|doc| doc.id)
            .ok_or_else(|| IdentityError::UnknownUser(email.to_string()))
    }

    async fn grant_admin(&self, uid: &str) -> Result<(), IdentityError> {
        let mut changes = Map::new();
        changes.insert("admin".to_string(), Value::Bool(true));
        match self.store.update(collections::USERS, uid, changes).await {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound { .. }) => Err(IdentityError::UnknownUser(uid.to_string())),
            Err(err) => Err(backend(err)),
        }
    }
}

fn backend(err: StoreError) -> IdentityError {
    IdentityError::Backend(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    use crate::store::memory::MemoryStore;

    const SECRET: &str = "test-jwt-secret";

    fn token(sub: &str, email: &str, admin: bool, expires_in: Duration) -> String {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: sub.to_string(),
            email: email.to_string(),
            admin,
            exp: (now + expires_in).timestamp(),
            iat: now.timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn identity_over(store: Arc<MemoryStore>) -> JwtIdentity {
        JwtIdentity::new(SECRET, store)
    }

    #[tokio::test]
    async fn verifies_well_formed_tokens() {
        let identity = identity_over(Arc::new(MemoryStore::new()));
        let token = token("uid-1", "admin@vitae.example", true, Duration::hours(1));

        let verified = identity.verify(&token).await.unwrap();
        assert_eq!(verified.uid, "uid-1");
        assert_eq!(verified.email, "admin@vitae.example");
        assert!(verified.admin);
    }

    #[tokio::test]
    async fn rejects_expired_and_garbage_tokens() {
        let identity = identity_over(Arc::new(MemoryStore::new()));

        let expired = token("uid-1", "a@example.com", true, Duration::hours(-2));
        assert!(matches!(
            identity.verify(&expired).await,
            Err(IdentityError::InvalidToken)
        ));
        assert!(matches!(
            identity.verify("not-a-token").await,
            Err(IdentityError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn rejects_tokens_signed_with_another_secret() {
        let identity = identity_over(Arc::new(MemoryStore::new()));
        let now = Utc::now();
        let claims = AccessClaims {
            sub: "uid-1".into(),
            email: "a@example.com".into(),
            admin: true,
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };
        let forged = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"other-secret"),
        )
        .unwrap();

        assert!(matches!(
            identity.verify(&forged).await,
            Err(IdentityError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn directory_lookup_and_grant() {
        let store = Arc::new(MemoryStore::new());
        store.insert_with_id(
            collections::USERS,
            "uid-7",
            json!({ "email": "margaret@example.com", "admin": false })
                .as_object()
                .cloned()
                .unwrap(),
        );
        let identity = identity_over(store.clone());

        let uid = identity.uid_for_email("margaret@example.com").await.unwrap();
        assert_eq!(uid, "uid-7");

        identity.grant_admin(&uid).await.unwrap();
        let doc = store
            .get(collections::USERS, "uid-7")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.fields["admin"], true);

        assert!(matches!(
            identity.uid_for_email("nobody@example.com").await,
            Err(IdentityError::UnknownUser(_))
        ));
        assert!(matches!(
            identity.grant_admin("missing-uid").await,
            Err(IdentityError::UnknownUser(_))
        ));
    }
}
