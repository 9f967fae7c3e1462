use crate::api_error::ApiError;
use crate::db::DbPool;
use crate::models::match_model::*;
use crate::service::broadcaster::MatchBroadcaster;
use crate::service::match_status::{classify, sync_status_at};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of one pass over unfinished matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub checked: usize,
    pub updated: usize,
    pub failed: usize,
}

/// What a single reconciliation did to a stored match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// Stored status already matched the clock, or the window is unusable.
    Unchanged,
    /// This caller moved the row from one status to another.
    Transitioned { from: MatchStatus, to: MatchStatus },
    /// Another writer moved the row first; the record was reloaded.
    Superseded,
}

enum StatusWriteError {
    Stale,
    Failed(ApiError),
}

/// Reconcile `record` at `now` through a conditional write.
///
/// `write(expected, next)` must apply `next` only while the stored status is
/// still `expected` and report whether it did. A lost race reloads the record
/// through `reload` instead of failing.
pub(crate) async fn reconcile_at<W, WFut, L, LFut>(
    record: &mut Match,
    now: DateTime<Utc>,
    write: W,
    reload: L,
) -> Result<Reconciled, ApiError>
where
    W: FnOnce(MatchStatus, MatchStatus) -> WFut,
    WFut: Future<Output = Result<bool, ApiError>>,
    L: FnOnce() -> LFut,
    LFut: Future<Output = Result<Option<Match>, ApiError>>,
{
    let previous = record.status;

    let outcome = sync_status_at(record, now, move |next| async move {
        match write(previous, next).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(StatusWriteError::Stale),
            Err(e) => Err(StatusWriteError::Failed(e)),
        }
    })
    .await;

    match outcome {
        Ok(status) if status == previous => Ok(Reconciled::Unchanged),
        Ok(status) => Ok(Reconciled::Transitioned {
            from: previous,
            to: status,
        }),
        Err(StatusWriteError::Stale) => {
            *record = reload()
                .await?
                .ok_or_else(|| ApiError::not_found("Match not found"))?;
            Ok(Reconciled::Superseded)
        }
        Err(StatusWriteError::Failed(e)) => Err(e),
    }
}

/// Matches persistence plus status reconciliation.
pub struct MatchService {
    db_pool: DbPool,
    broadcaster: Arc<MatchBroadcaster>,
}

/// Log the driver error and replace it with a client-safe message.
fn db_failure(message: &'static str) -> impl FnOnce(sqlx::Error) -> ApiError {
    move |e| {
        error!(error = %e, "{}", message);
        ApiError::internal_error(message)
    }
}

impl MatchService {
    pub fn new(db_pool: DbPool, broadcaster: Arc<MatchBroadcaster>) -> Self {
        Self {
            db_pool,
            broadcaster,
        }
    }

    // =============================================================================
    // QUERY METHODS
    // =============================================================================

    /// Newest matches first, statuses reconciled against the clock.
    pub async fn list_matches(&self, limit: i64) -> Result<Vec<Match>, ApiError> {
        let mut matches = sqlx::query_as::<_, Match>(
            r#"
            SELECT id, sport, home_team, away_team, status, start_time, end_time,
                   home_score, away_score, created_at
            FROM matches
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await
        .map_err(db_failure("Failed to list matches."))?;

        for record in matches.iter_mut() {
            self.sync_best_effort(record).await;
        }

        Ok(matches)
    }

    /// Fetch one match and reconcile its status.
    pub async fn get_match(&self, match_id: i32) -> Result<Match, ApiError> {
        let mut record = self
            .find_match(match_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Match not found"))?;

        self.sync_match(&mut record).await?;

        Ok(record)
    }

    async fn find_match(&self, match_id: i32) -> Result<Option<Match>, ApiError> {
        sqlx::query_as::<_, Match>(
            r#"
            SELECT id, sport, home_team, away_team, status, start_time, end_time,
                   home_score, away_score, created_at
            FROM matches
            WHERE id = $1
            "#,
        )
        .bind(match_id)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(db_failure("Failed to load match."))
    }

    // =============================================================================
    // MUTATIONS
    // =============================================================================

    /// Insert a match with its status derived from the window.
    pub async fn create_match(&self, new_match: NewMatch) -> Result<Match, ApiError> {
        // Stored status is never null: an unclassifiable window starts as scheduled.
        let status = classify(&new_match.start_time, &new_match.end_time).unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default status");
            MatchStatus::default()
        });

        let record = sqlx::query_as::<_, Match>(
            r#"
            INSERT INTO matches (
                sport, home_team, away_team, status, start_time, end_time,
                home_score, away_score
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8
            )
            RETURNING id, sport, home_team, away_team, status, start_time, end_time,
                      home_score, away_score, created_at
            "#,
        )
        .bind(&new_match.sport)
        .bind(&new_match.home_team)
        .bind(&new_match.away_team)
        .bind(status)
        .bind(new_match.start_time)
        .bind(new_match.end_time)
        .bind(new_match.home_score)
        .bind(new_match.away_score)
        .fetch_one(&self.db_pool)
        .await
        .map_err(db_failure("Failed to create match."))?;

        info!(
            match_id = record.id,
            sport = %record.sport,
            status = %record.status,
            "Match created"
        );

        self.broadcaster.match_created(&record);

        Ok(record)
    }

    pub async fn update_score(
        &self,
        match_id: i32,
        dto: UpdateScoreDTO,
    ) -> Result<Match, ApiError> {
        let mut record = sqlx::query_as::<_, Match>(
            r#"
            UPDATE matches
            SET home_score = $1,
                away_score = $2
            WHERE id = $3
            RETURNING id, sport, home_team, away_team, status, start_time, end_time,
                      home_score, away_score, created_at
            "#,
        )
        .bind(dto.home_score)
        .bind(dto.away_score)
        .bind(match_id)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(db_failure("Failed to update score."))?
        .ok_or_else(|| ApiError::not_found("Match not found"))?;

        info!(
            match_id,
            home_score = record.home_score,
            away_score = record.away_score,
            "Score updated"
        );

        // The score is committed; a status write failure must not mask it.
        self.sync_best_effort(&mut record).await;

        Ok(record)
    }

    /// Delete a match; its commentary goes with it.
    pub async fn delete_match(&self, match_id: i32) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(match_id)
            .execute(&self.db_pool)
            .await
            .map_err(db_failure("Failed to delete match."))?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Match not found"));
        }

        info!(match_id, "Match deleted");
        Ok(())
    }

    // =============================================================================
    // STATUS RECONCILIATION
    // =============================================================================

    /// Bring `record.status` in line with the clock, persisting and
    /// broadcasting only when this call performs the transition.
    pub async fn sync_match(&self, record: &mut Match) -> Result<Reconciled, ApiError> {
        let match_id = record.id;

        let outcome = reconcile_at(
            record,
            Utc::now(),
            |expected, next| self.write_status(match_id, expected, next),
            || self.find_match(match_id),
        )
        .await?;

        match outcome {
            Reconciled::Transitioned { from, to } => {
                info!(match_id, from = %from, to = %to, "Match status changed");
                self.broadcaster.status_changed(match_id, from, to);
            }
            Reconciled::Superseded => {
                debug!(match_id, status = %record.status, "Status already reconciled elsewhere");
            }
            Reconciled::Unchanged => {}
        }

        Ok(outcome)
    }

    /// [`Self::sync_match`] for callers whose own write already succeeded.
    /// Failures are logged and the record keeps its stored status.
    pub(crate) async fn sync_best_effort(&self, record: &mut Match) {
        if let Err(e) = self.sync_match(record).await {
            warn!(match_id = record.id, error = %e, "Status sync failed, keeping stored status");
        }
    }

    /// Run [`Self::sync_match`] over every match not yet finished.
    pub async fn sync_unfinished(&self) -> Result<SweepSummary, ApiError> {
        let mut records = sqlx::query_as::<_, Match>(
            r#"
            SELECT id, sport, home_team, away_team, status, start_time, end_time,
                   home_score, away_score, created_at
            FROM matches
            WHERE status <> 'finished'
            ORDER BY start_time ASC
            "#,
        )
        .fetch_all(&self.db_pool)
        .await
        .map_err(db_failure("Failed to load unfinished matches."))?;

        let mut summary = SweepSummary {
            checked: records.len(),
            ..SweepSummary::default()
        };

        for record in records.iter_mut() {
            match self.sync_match(record).await {
                Ok(Reconciled::Transitioned { .. }) => summary.updated += 1,
                Ok(_) => {}
                Err(e) => {
                    summary.failed += 1;
                    warn!(match_id = record.id, error = %e, "Status sync failed");
                }
            }
        }

        debug!(?summary, "Status sweep finished");
        Ok(summary)
    }

    /// Compare-and-set on `status`. Returns `false` when the row no longer
    /// holds `expected`.
    async fn write_status(
        &self,
        match_id: i32,
        expected: MatchStatus,
        next: MatchStatus,
    ) -> Result<bool, ApiError> {
        let result = sqlx::query("UPDATE matches SET status = $1 WHERE id = $2 AND status = $3")
            .bind(next)
            .bind(match_id)
            .bind(expected)
            .execute(&self.db_pool)
            .await
            .map_err(db_failure("Failed to update match status."))?;

        Ok(result.rows_affected() == 1)
    }
}
