//! User repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::AppResult, models::User, telegram::TelegramUser};

/// Repository for user database operations
pub struct UserRepository;

impl UserRepository {
    /// Insert a user from Telegram data, or refresh the stored profile if the
    /// Telegram ID is already known. Stamps `last_login_at`.
    pub async fn upsert_from_telegram(pool: &PgPool, tg: &TelegramUser) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                telegram_id, username, first_name, last_name, language_code,
                is_premium, photo_url, allows_write_to_pm, last_login_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT (telegram_id) DO UPDATE
            SET
                username = EXCLUDED.username,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                is_premium = EXCLUDED.is_premium,
                photo_url = EXCLUDED.photo_url,
                allows_write_to_pm = EXCLUDED.allows_write_to_pm,
                language_code = COALESCE(users.language_code, EXCLUDED.language_code),
                last_login_at = NOW(),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(tg.id)
        .bind(tg.username.as_deref())
        .bind(&tg.first_name)
        .bind(tg.last_name.as_deref())
        .bind(tg.language_code.as_deref())
        .bind(tg.is_premium)
        .bind(tg.photo_url.as_deref())
        .bind(tg.allows_write_to_pm)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Update user preferences
    pub async fn update_profile(
        pool: &PgPool,
        id: &Uuid,
        language_code: Option<&str>,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                language_code = COALESCE($2, language_code),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(language_code)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }
}
