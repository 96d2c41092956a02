use anyhow::Context;
use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::OffsetDateTime;
use tracing::debug;

use super::claims::{AuthClaims, UserClaim};
use crate::{error::AppError, state::AppState};

/// Ten years; anything longer is treated as a misconfiguration.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365 * 10;

/// Signing and verification keys derived from the process-wide secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_minutes: i64) -> Result<Self, AppError> {
        if secret.is_empty() {
            return Err(AppError::Configuration("JWT secret is empty".into()));
        }
        if !(1..=MAX_TTL_MINUTES).contains(&ttl_minutes) {
            return Err(AppError::Configuration(format!(
                "JWT ttl must be between 1 and {MAX_TTL_MINUTES} minutes, got {ttl_minutes}"
            )));
        }
        let ttl_secs = ttl_minutes.checked_mul(60).ok_or_else(|| {
            AppError::Configuration(format!("JWT ttl of {ttl_minutes} minutes overflows"))
        })?;
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        })
    }

    fn sign(&self, user: UserClaim, iat: i64, exp: i64) -> anyhow::Result<String> {
        let claims = AuthClaims {
            sub: user.email.clone(),
            user,
            iat,
            exp,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(sub = %claims.sub, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    fn expiry_from(&self, now: i64) -> anyhow::Result<i64> {
        now.checked_add(self.ttl_secs).context("token expiry overflows")
    }

    /// Issues a fresh token valid for the configured window.
    pub fn issue(&self, user: UserClaim) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let exp = self.expiry_from(now)?;
        self.sign(user, now, exp)
    }

    /// Re-issues from already verified claims. The new expiry never falls
    /// before the old one.
    pub fn reissue(&self, claims: &AuthClaims) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let exp = self.expiry_from(now)?.max(claims.exp);
        self.sign(claims.user.clone(), now, exp)
    }

    /// Only HS256 is accepted. A token is live only while `exp > now`.
    pub fn verify(&self, token: &str) -> Result<AuthClaims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        let data = decode::<AuthClaims>(token, &self.decoding, &validation)?;
        // jsonwebtoken still accepts exp == now
        if data.claims.exp <= OffsetDateTime::now_utc().unix_timestamp() {
            return Err(ErrorKind::ExpiredSignature.into());
        }
        debug!(sub = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserClaim {
        UserClaim {
            email: "u@example.com".into(),
            first_name: "Example".into(),
            last_name: "User".into(),
        }
    }

    fn keys() -> JwtKeys {
        JwtKeys::new("dev-secret", 60 * 24 * 7).expect("keys")
    }

    fn forge(secret: &str, alg: Algorithm, iat: i64, exp: i64) -> String {
        let claims = AuthClaims {
            user: user(),
            sub: "u@example.com".into(),
            iat,
            exp,
        };
        encode(
            &Header::new(alg),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encode")
    }

    fn now() -> i64 {
        OffsetDateTime::now_utc().unix_timestamp()
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        assert!(matches!(
            JwtKeys::new("", 10),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn non_positive_ttl_is_a_configuration_error() {
        assert!(matches!(
            JwtKeys::new("secret", 0),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn oversized_ttl_is_a_configuration_error() {
        for ttl in [MAX_TTL_MINUTES + 1, 1_000_000_000_000, i64::MAX] {
            assert!(matches!(
                JwtKeys::new("secret", ttl),
                Err(AppError::Configuration(_))
            ));
        }
    }

    #[test]
    fn longest_allowed_ttl_still_issues() {
        let keys = JwtKeys::new("secret", MAX_TTL_MINUTES).unwrap();
        let claims = keys.verify(&keys.issue(user()).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, MAX_TTL_MINUTES * 60);
    }

    #[test]
    fn reissue_of_far_future_claims_does_not_overflow() {
        let keys = keys();
        let claims = AuthClaims {
            user: user(),
            sub: "u@example.com".into(),
            iat: now(),
            exp: i64::MAX,
        };
        let refreshed = keys.reissue(&claims).unwrap();
        assert_eq!(refreshed.split('.').count(), 3);
    }

    #[test]
    fn verify_rejects_token_expiring_now() {
        let token = forge("dev-secret", Algorithm::HS256, now() - 60, now());
        let err = keys().verify(&token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let keys = keys();
        let token = keys.issue(user()).expect("issue");
        assert_eq!(token.split('.').count(), 3);

        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.user, user());
        assert_eq!(claims.sub, "u@example.com");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn payload_carries_only_the_user_snapshot() {
        let token = keys().issue(user()).unwrap();
        let claims = keys().verify(&token).unwrap();
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(
            json["user"],
            serde_json::json!({
                "email": "u@example.com",
                "firstName": "Example",
                "lastName": "User"
            })
        );
        let mut keys_in_payload: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys_in_payload.sort();
        assert_eq!(keys_in_payload, ["exp", "iat", "sub", "user"]);
    }

    #[test]
    fn verify_rejects_other_secret() {
        let token = forge("wrongSecret", Algorithm::HS256, now(), now() + 3600);
        let err = keys().verify(&token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidSignature));
    }

    #[test]
    fn verify_rejects_other_algorithm() {
        let token = forge("dev-secret", Algorithm::HS512, now(), now() + 3600);
        let err = keys().verify(&token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidAlgorithm));
    }

    #[test]
    fn verify_rejects_expired_token() {
        let token = forge("dev-secret", Algorithm::HS256, now() - 7200, now() - 10);
        let err = keys().verify(&token).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }

    #[test]
    fn verify_rejects_garbage_and_tampering() {
        let keys = keys();
        assert!(keys.verify("not-a-token").is_err());
        assert!(keys.verify("").is_err());

        let other = forge("dev-secret", Algorithm::HS256, now(), now() + 999_999);
        let other_payload = other.split('.').nth(1).unwrap().to_string();
        let token = keys.issue(user()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = &other_payload;
        assert!(keys.verify(&parts.join(".")).is_err());
    }

    #[test]
    fn reissue_never_shortens_expiry() {
        let keys = keys();
        let long_lived = forge("dev-secret", Algorithm::HS256, now(), now() + 30 * 24 * 3600);
        let claims = keys.verify(&long_lived).unwrap();

        let refreshed = keys.reissue(&claims).unwrap();
        let new_claims = keys.verify(&refreshed).unwrap();
        assert!(new_claims.exp >= claims.exp);
        assert_eq!(new_claims.user, claims.user);
    }

    #[test]
    fn reissue_extends_a_normal_token() {
        let keys = keys();
        let old = forge("dev-secret", Algorithm::HS256, now() - 3600, now() + 60);
        let claims = keys.verify(&old).unwrap();
        let new_claims = keys.verify(&keys.reissue(&claims).unwrap()).unwrap();
        assert!(new_claims.exp > claims.exp);
        assert!(new_claims.iat >= claims.iat);
    }
}
