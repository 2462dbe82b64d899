//! Account repository for registration, lookup, and password verification

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::error::is_unique_violation;
use crate::models::{Account, NewAccount, Profile};

use super::profile::map_profile;

fn map_account(row: &PgRow) -> Account {
    Account {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
        verified: row.get("verified"),
        created_at: row.get("created_at"),
    }
}

/// Derive a custom URL for a fresh profile: a slug of the display name
/// plus a short random suffix to disambiguate.
pub fn derive_custom_url(name: &str) -> String {
    let mut slug = String::new();
    let mut last_was_hyphen = true;

    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    let slug = slug.trim_matches('-');
    let slug = if slug.is_empty() { "card" } else { slug };

    let suffix: String = rand::thread_rng()
        .sample_iter(Alphanumeric)
        .take(4)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();

    format!("{}-{}", slug, suffix)
}

/// Account repository
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    /// Create a new account repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an account and its default profile in one transaction
    ///
    /// The derived custom URL carries a random suffix; on the off chance it
    /// still collides with an existing profile, the whole transaction is
    /// retried with a fresh suffix. Duplicate-email violations propagate to
    /// the caller.
    pub async fn create(&self, new_account: &NewAccount) -> Result<(Account, Profile)> {
        info!("Creating new account for {}", new_account.email);

        // Hash the password
        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(new_account.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        let mut attempt = 0;
        loop {
            let custom_url = derive_custom_url(&new_account.name);
            match self
                .create_with_url(new_account, &password_hash, &custom_url)
                .await
            {
                Err(e) if attempt < 2 && is_unique_violation(&e, "profiles_custom_url_key") => {
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn create_with_url(
        &self,
        new_account: &NewAccount,
        password_hash: &str,
        custom_url: &str,
    ) -> Result<(Account, Profile)> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO accounts (email, name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, password_hash, verified, created_at
            "#,
        )
        .bind(&new_account.email)
        .bind(&new_account.name)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await?;

        let account = map_account(&row);

        let row = sqlx::query(
            r#"
            INSERT INTO profiles (account_id, name, custom_url)
            VALUES ($1, $2, $3)
            RETURNING id, account_id, custom_url, name, first_name, last_name, title,
                      company, department, bio, location, image_url, image_key,
                      is_public, allow_download, created_at, updated_at
            "#,
        )
        .bind(account.id)
        .bind(&account.name)
        .bind(custom_url)
        .fetch_one(&mut *tx)
        .await?;

        let profile = map_profile(&row)?;

        tx.commit().await?;
        Ok((account, profile))
    }

    /// Find an account by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, name, password_hash, verified, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_account))
    }

    /// Find an account by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, name, password_hash, verified, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_account))
    }

    /// Verify an account's password
    pub async fn verify_password(&self, account: &Account, password: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(&account.password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        let argon2 = Argon2::default();
        let result = argon2.verify_password(password.as_bytes(), &parsed_hash);

        Ok(result.is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_custom_url_slugifies_name() {
        let url = derive_custom_url("Jane Doe");
        assert!(url.starts_with("jane-doe-"), "got {}", url);
        assert_eq!(url.len(), "jane-doe-".len() + 4);
    }

    #[test]
    fn test_derive_custom_url_collapses_punctuation() {
        let url = derive_custom_url("  Dr. Jane   Q. Doe!  ");
        assert!(url.starts_with("dr-jane-q-doe-"), "got {}", url);
    }

    #[test]
    fn test_derive_custom_url_falls_back_for_empty_name() {
        let url = derive_custom_url("!!!");
        assert!(url.starts_with("card-"), "got {}", url);
    }

    #[test]
    fn test_derive_custom_url_varies_between_calls() {
        // The random suffix makes consecutive derivations distinct
        let a = derive_custom_url("Jane Doe");
        let b = derive_custom_url("Jane Doe");
        assert_ne!(a, b);
    }
}
