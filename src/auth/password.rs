//! Password digesting (bcrypt), kept off the async executor threads

use anyhow::{Context, Result};
use bcrypt::{hash, verify};

pub async fn hash_password(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || hash(password, cost))
        .await
        .context("Password hashing task failed")?
        .context("Failed to hash password")
}

pub async fn verify_password(password: String, password_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify(password, &password_hash))
        .await
        .context("Password verification task failed")?
        .context("Failed to verify password")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcrypt::DEFAULT_COST;

    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let digest = hash_password("hunter22".to_string(), TEST_COST)
            .await
            .unwrap();
        assert_ne!(digest, "hunter22");

        assert!(verify_password("hunter22".to_string(), digest.clone())
            .await
            .unwrap());
        assert!(!verify_password("hunter23".to_string(), digest)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_invalid_cost_is_error() {
        assert!(hash_password("pw".to_string(), 2).await.is_err());
        assert!(DEFAULT_COST >= TEST_COST);
    }

    #[tokio::test]
    async fn test_garbage_hash_is_error() {
        assert!(verify_password("pw".to_string(), "not-a-hash".to_string())
            .await
            .is_err());
    }
}
