//! Profile repository for database operations
//!
//! Contact fields and social links are only ever written as whole batches:
//! delete-all plus insert-all inside one transaction, so readers never see
//! a half-replaced set.

use anyhow::Result;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::models::{
    ContactField, FieldKind, NewContactField, NewSocialLink, Profile, ProfilePatch, SocialLink,
};

const PROFILE_COLUMNS: &str = "id, account_id, custom_url, name, first_name, last_name, title, \
     company, department, bio, location, image_url, image_key, is_public, allow_download, \
     created_at, updated_at";

/// Map a database row into a Profile
pub(crate) fn map_profile(row: &PgRow) -> Result<Profile> {
    Ok(Profile {
        id: row.get("id"),
        account_id: row.get("account_id"),
        custom_url: row.get("custom_url"),
        name: row.get("name"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        title: row.get("title"),
        company: row.get("company"),
        department: row.get("department"),
        bio: row.get("bio"),
        location: row.get("location"),
        image_url: row.get("image_url"),
        image_key: row.get("image_key"),
        is_public: row.get("is_public"),
        allow_download: row.get("allow_download"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn map_contact_field(row: &PgRow) -> Result<ContactField> {
    let kind: String = row.get("kind");
    let kind = FieldKind::parse(&kind)
        .ok_or_else(|| anyhow::anyhow!("Unknown contact field kind: {}", kind))?;

    Ok(ContactField {
        id: row.get("id"),
        profile_id: row.get("profile_id"),
        label: row.get("label"),
        value: row.get("value"),
        kind,
        is_public: row.get("is_public"),
        order: row.get("ord"),
    })
}

fn map_social_link(row: &PgRow) -> SocialLink {
    SocialLink {
        id: row.get("id"),
        profile_id: row.get("profile_id"),
        platform: row.get("platform"),
        url: row.get("url"),
        is_public: row.get("is_public"),
        order: row.get("ord"),
    }
}

/// Profile repository
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Create a new profile repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the profile owned by an account
    pub async fn find_by_account(&self, account_id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM profiles WHERE account_id = $1",
            PROFILE_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_profile).transpose()
    }

    /// Find a public profile by id or custom URL
    ///
    /// Private profiles are indistinguishable from missing ones: both come
    /// back as None.
    pub async fn find_public(&self, identifier: &str) -> Result<Option<Profile>> {
        let row = match Uuid::parse_str(identifier) {
            Ok(id) => {
                sqlx::query(&format!(
                    "SELECT {} FROM profiles WHERE id = $1 AND is_public = TRUE",
                    PROFILE_COLUMNS
                ))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
            }
            Err(_) => {
                sqlx::query(&format!(
                    "SELECT {} FROM profiles WHERE custom_url = $1 AND is_public = TRUE",
                    PROFILE_COLUMNS
                ))
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        row.as_ref().map(map_profile).transpose()
    }

    /// Find a profile that may be publicly downloaded as a vCard
    pub async fn find_downloadable(&self, profile_id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM profiles WHERE id = $1 AND is_public = TRUE AND allow_download = TRUE",
            PROFILE_COLUMNS
        ))
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_profile).transpose()
    }

    /// Whether another account already holds this custom URL
    pub async fn custom_url_taken(&self, custom_url: &str, exclude_account: Uuid) -> Result<bool> {
        let row = sqlx::query(
            "SELECT id FROM profiles WHERE custom_url = $1 AND account_id <> $2",
        )
        .bind(custom_url)
        .bind(exclude_account)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    /// Contact fields for a profile in display order
    pub async fn contact_fields(&self, profile_id: Uuid) -> Result<Vec<ContactField>> {
        let rows = sqlx::query(
            r#"
            SELECT id, profile_id, label, value, kind, is_public, ord
            FROM contact_fields
            WHERE profile_id = $1
            ORDER BY ord ASC, created_at ASC
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_contact_field).collect()
    }

    /// Social links for a profile in display order
    pub async fn social_links(&self, profile_id: Uuid) -> Result<Vec<SocialLink>> {
        let rows = sqlx::query(
            r#"
            SELECT id, profile_id, platform, url, is_public, ord
            FROM social_links
            WHERE profile_id = $1
            ORDER BY ord ASC, created_at ASC
            "#,
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_social_link).collect())
    }

    /// Apply a partial update to an account's profile
    ///
    /// Last write wins; the unique index on custom_url is the final
    /// arbiter under concurrent updates.
    pub async fn update(&self, account_id: Uuid, patch: ProfilePatch) -> Result<Option<Profile>> {
        let Some(current) = self.find_by_account(account_id).await? else {
            return Ok(None);
        };

        let merged = current.apply(patch);

        let row = sqlx::query(&format!(
            r#"
            UPDATE profiles
            SET custom_url = $1, name = $2, first_name = $3, last_name = $4, title = $5,
                company = $6, department = $7, bio = $8, location = $9,
                is_public = $10, allow_download = $11, updated_at = now()
            WHERE account_id = $12
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(&merged.custom_url)
        .bind(&merged.name)
        .bind(&merged.first_name)
        .bind(&merged.last_name)
        .bind(&merged.title)
        .bind(&merged.company)
        .bind(&merged.department)
        .bind(&merged.bio)
        .bind(&merged.location)
        .bind(merged.is_public)
        .bind(merged.allow_download)
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Some(map_profile(&row)?))
    }

    /// Update the profile's image reference fields
    pub async fn set_image(
        &self,
        account_id: Uuid,
        image_url: Option<&str>,
        image_key: Option<&str>,
    ) -> Result<Option<Profile>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE profiles
            SET image_url = $1, image_key = $2, updated_at = now()
            WHERE account_id = $3
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        ))
        .bind(image_url)
        .bind(image_key)
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_profile).transpose()
    }

    /// Replace a profile's contact fields as one atomic batch
    pub async fn replace_contact_fields(
        &self,
        profile_id: Uuid,
        fields: &[NewContactField],
    ) -> Result<Vec<ContactField>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM contact_fields WHERE profile_id = $1")
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;

        let mut inserted = Vec::with_capacity(fields.len());
        for field in fields {
            let row = sqlx::query(
                r#"
                INSERT INTO contact_fields (profile_id, label, value, kind, is_public, ord)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, profile_id, label, value, kind, is_public, ord
                "#,
            )
            .bind(profile_id)
            .bind(&field.label)
            .bind(&field.value)
            .bind(field.kind.as_str())
            .bind(field.is_public)
            .bind(field.order)
            .fetch_one(&mut *tx)
            .await?;

            inserted.push(map_contact_field(&row)?);
        }

        touch_profile(&mut tx, profile_id).await?;
        tx.commit().await?;

        // Ascending by order; insertion order breaks ties
        inserted.sort_by_key(|field| field.order);
        Ok(inserted)
    }

    /// Replace a profile's social links as one atomic batch
    pub async fn replace_social_links(
        &self,
        profile_id: Uuid,
        links: &[NewSocialLink],
    ) -> Result<Vec<SocialLink>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM social_links WHERE profile_id = $1")
            .bind(profile_id)
            .execute(&mut *tx)
            .await?;

        let mut inserted = Vec::with_capacity(links.len());
        for link in links {
            let row = sqlx::query(
                r#"
                INSERT INTO social_links (profile_id, platform, url, is_public, ord)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, profile_id, platform, url, is_public, ord
                "#,
            )
            .bind(profile_id)
            .bind(&link.platform)
            .bind(&link.url)
            .bind(link.is_public)
            .bind(link.order)
            .fetch_one(&mut *tx)
            .await?;

            inserted.push(map_social_link(&row));
        }

        touch_profile(&mut tx, profile_id).await?;
        tx.commit().await?;

        inserted.sort_by_key(|link| link.order);
        Ok(inserted)
    }
}

/// Bump a profile's updated_at inside an open transaction
async fn touch_profile(tx: &mut Transaction<'_, Postgres>, profile_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE profiles SET updated_at = now() WHERE id = $1")
        .bind(profile_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
