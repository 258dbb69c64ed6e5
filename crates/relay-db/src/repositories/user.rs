//! PostgreSQL implementation of UserDirectory

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use relay_core::{RepoResult, UserDirectory, UserId, UserProfile};

use crate::models::UserModel;

use super::error::map_db_error;

/// PostgreSQL implementation of UserDirectory
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    #[instrument(skip(self))]
    async fn find_profile(&self, id: &UserId) -> RepoResult<Option<UserProfile>> {
        let result = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, email, first_name, last_name, image, color
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(UserProfile::from))
    }

    #[instrument(skip(self, profile), fields(user_id = %profile.id))]
    async fn upsert_profile(&self, profile: &UserProfile) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO users (id, email, first_name, last_name, image, color)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
            SET email = EXCLUDED.email,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                image = EXCLUDED.image,
                color = EXCLUDED.color
            ",
        )
        .bind(profile.id.as_str())
        .bind(&profile.email)
        .bind(profile.first_name.as_deref())
        .bind(profile.last_name.as_deref())
        .bind(profile.image.as_deref())
        .bind(profile.color)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
