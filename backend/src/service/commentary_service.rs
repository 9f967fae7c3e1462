use crate::api_error::ApiError;
use crate::db::DbPool;
use crate::models::commentary::{Commentary, CreateCommentaryDTO};
use crate::service::broadcaster::MatchBroadcaster;
use std::sync::Arc;
use tracing::{error, info};

/// Live commentary feed per match.
pub struct CommentaryService {
    db_pool: DbPool,
    broadcaster: Arc<MatchBroadcaster>,
}

impl CommentaryService {
    pub fn new(db_pool: DbPool, broadcaster: Arc<MatchBroadcaster>) -> Self {
        Self {
            db_pool,
            broadcaster,
        }
    }

    /// Newest entries first.
    pub async fn list_commentary(
        &self,
        match_id: i32,
        limit: i64,
    ) -> Result<Vec<Commentary>, ApiError> {
        self.ensure_match_exists(match_id).await?;

        sqlx::query_as::<_, Commentary>(
            r#"
            SELECT id, match_id, minute, sequence, period, event_type, actor, team,
                   message, metadata, tags, created_at
            FROM commentary
            WHERE match_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(match_id)
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await
        .map_err(|e| {
            error!(error = %e, match_id, "Failed to list commentary");
            ApiError::internal_error("Failed to list commentary.")
        })
    }

    pub async fn create_commentary(
        &self,
        match_id: i32,
        dto: CreateCommentaryDTO,
    ) -> Result<Commentary, ApiError> {
        self.ensure_match_exists(match_id).await?;

        let commentary = sqlx::query_as::<_, Commentary>(
            r#"
            INSERT INTO commentary (
                match_id, minute, sequence, period, event_type, actor, team,
                message, metadata, tags
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10
            )
            RETURNING id, match_id, minute, sequence, period, event_type, actor, team,
                      message, metadata, tags, created_at
            "#,
        )
        .bind(match_id)
        .bind(dto.minute)
        .bind(dto.sequence)
        .bind(dto.period)
        .bind(dto.event_type)
        .bind(dto.actor)
        .bind(dto.team)
        .bind(dto.message)
        .bind(dto.metadata)
        .bind(dto.tags)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| {
            error!(error = %e, match_id, "Failed to create commentary");
            ApiError::internal_error("Failed to create commentary.")
        })?;

        info!(
            match_id,
            commentary_id = commentary.id,
            event_type = %commentary.event_type,
            "Commentary added"
        );

        self.broadcaster.commentary_created(&commentary);

        Ok(commentary)
    }

    async fn ensure_match_exists(&self, match_id: i32) -> Result<(), ApiError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM matches WHERE id = $1)")
            .bind(match_id)
            .fetch_one(&self.db_pool)
            .await
            .map_err(|e| {
                error!(error = %e, match_id, "Failed to look up match");
                ApiError::internal_error("Failed to load match.")
            })?;

        if !exists {
            return Err(ApiError::not_found("Match not found"));
        }
        Ok(())
    }
}
