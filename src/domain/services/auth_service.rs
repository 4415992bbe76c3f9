use std::sync::Arc;
use crate::domain::{
    models::{auth::{Claims, RefreshTokenRecord, TokenPair}, user::Account},
    ports::AuthRepository
};
use crate::error::AppError;
use crate::config::Config;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;
use chrono::{Utc, Duration};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use sha2::{Sha256, Digest};
use tracing::warn;

pub struct AuthService {
    repo: Arc<dyn AuthRepository>,
    config: Config,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(repo: Arc<dyn AuthRepository>, config: Config) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        Self { repo, config, encoding_key, decoding_key }
    }

    pub async fn login(&self, account: &Account) -> Result<TokenPair, AppError> {
        let family_id = Uuid::new_v4().to_string();
        self.issue_token_pair(account, family_id, 1).await
    }

    /// Redeems a refresh token exactly once. Presenting a token that was
    /// already used revokes every token of its family.
    pub async fn redeem_refresh_token(&self, raw_refresh_token: &str) -> Result<RefreshTokenRecord, AppError> {
        let token_hash = self.hash_token(raw_refresh_token);
        let now = Utc::now();

        let record = self.repo.find_refresh_token(&token_hash).await?
            .ok_or(AppError::Unauthorized)?;

        if record.consumed_at.is_some() {
            return self.revoke_family(&record).await;
        }

        if record.expires_at < now {
            self.repo.delete_refresh_token(&token_hash).await?;
            return Err(AppError::Unauthorized);
        }

        // Lost the race against a concurrent redemption
        if self.repo.consume_refresh_token(&token_hash, now).await? == 0 {
            return self.revoke_family(&record).await;
        }

        Ok(record)
    }

    /// Issues the next pair of a redeemed token's family.
    pub async fn rotate(&self, account: &Account, redeemed: &RefreshTokenRecord) -> Result<TokenPair, AppError> {
        self.issue_token_pair(account, redeemed.family_id.clone(), redeemed.generation_id + 1).await
    }

    async fn revoke_family(&self, record: &RefreshTokenRecord) -> Result<RefreshTokenRecord, AppError> {
        warn!("Refresh token reuse detected for user {}, revoking family {}", record.user_id, record.family_id);
        self.repo.delete_refresh_family(&record.family_id).await?;
        Err(AppError::Unauthorized)
    }

    pub async fn logout(&self, raw_refresh_token: &str) -> Result<(), AppError> {
        let token_hash = self.hash_token(raw_refresh_token);
        self.repo.delete_refresh_token(&token_hash).await
    }

    pub async fn revoke_all(&self, user_id: &str) -> Result<(), AppError> {
        self.repo.delete_for_user(user_id).await
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.auth_issuer.as_str()]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized)
    }

    async fn issue_token_pair(&self, account: &Account, family_id: String, generation_id: i32) -> Result<TokenPair, AppError> {
        let now = Utc::now();
        let exp = (now + Duration::minutes(self.config.access_token_minutes)).timestamp() as usize;

        let claims = Claims {
            iss: self.config.auth_issuer.clone(),
            sub: account.id.clone(),
            exp,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            role: account.role.clone(),
        };

        let access = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!("JWT encoding failed: {}", e);
                AppError::Internal
            })?;

        let refresh: String = rand::thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect();

        let refresh_record = RefreshTokenRecord {
            token_hash: self.hash_token(&refresh),
            user_id: account.id.clone(),
            family_id,
            generation_id,
            expires_at: now + Duration::days(self.config.refresh_token_days),
            created_at: now,
            consumed_at: None,
        };

        self.repo.create_refresh_token(&refresh_record).await?;
        Ok(TokenPair { access, refresh })
    }

    pub fn hash_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalWithMsg(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal)?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }
}
