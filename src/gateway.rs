use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Row};

use crate::config::DbConfig;
use crate::demo::DemoDataset;
use crate::models::{ActivityRecord, CampaignRecord, OpportunityRecord};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Read access to the relational store, with a built-in demo fallback.
///
/// The connection is established once per session. If the configuration is
/// incomplete or the connection attempt fails, the gateway stays in fallback
/// mode until the process exits; no reconnect is attempted mid-session.
/// Every read degrades to the fallback dataset (lists) or zero (counts)
/// instead of returning an error.
pub struct Gateway {
    pool: Option<PgPool>,
    demo: DemoDataset,
}

impl Gateway {
    pub async fn connect(config: &DbConfig, demo: DemoDataset) -> Self {
        if !config.is_complete() {
            tracing::warn!("database not configured, serving demo data for this session");
            return Self::offline(demo);
        }

        let mut options = PgConnectOptions::new().port(config.port);
        if let Some(host) = &config.host {
            options = options.host(host);
        }
        if let Some(name) = &config.name {
            options = options.database(name);
        }
        if let Some(user) = &config.user {
            options = options.username(user);
        }
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        match PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect_with(options)
            .await
        {
            Ok(pool) => Self {
                pool: Some(pool),
                demo,
            },
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "database connection failed, serving demo data for this session"
                );
                Self::offline(demo)
            }
        }
    }

    /// A gateway that never touches the database. Used when no credentials
    /// are configured, and by tests.
    pub fn offline(demo: DemoDataset) -> Self {
        Self { pool: None, demo }
    }

    pub fn is_live(&self) -> bool {
        self.pool.is_some()
    }

    pub fn demo(&self) -> &DemoDataset {
        &self.demo
    }

    /// Recent user activity, newest first, limit 20.
    pub async fn recent_activities(&self) -> Vec<ActivityRecord> {
        let Some(pool) = &self.pool else {
            return self.demo.activities.clone();
        };
        match fetch_activities(pool).await {
            Ok(rows) if !rows.is_empty() => rows,
            Ok(_) => {
                tracing::debug!("no live activity rows, showing demo data");
                self.demo.activities.clone()
            }
            Err(err) => {
                tracing::warn!(error = %err, "activity query failed, showing demo data");
                self.demo.activities.clone()
            }
        }
    }

    /// Recent upsell opportunities, newest first, limit 50.
    pub async fn recent_opportunities(&self) -> Vec<OpportunityRecord> {
        let Some(pool) = &self.pool else {
            return self.demo.opportunities.clone();
        };
        match fetch_opportunities(pool).await {
            Ok(rows) if !rows.is_empty() => rows,
            Ok(_) => {
                tracing::debug!("no live opportunity rows, showing demo data");
                self.demo.opportunities.clone()
            }
            Err(err) => {
                tracing::warn!(error = %err, "opportunity query failed, showing demo data");
                self.demo.opportunities.clone()
            }
        }
    }

    /// Campaign send history, newest first by sent_at, limit 50.
    pub async fn recent_campaigns(&self) -> Vec<CampaignRecord> {
        let Some(pool) = &self.pool else {
            return self.demo.campaigns.clone();
        };
        match fetch_campaigns(pool).await {
            Ok(rows) if !rows.is_empty() => rows,
            Ok(_) => {
                tracing::debug!("no live campaign rows, showing demo data");
                self.demo.campaigns.clone()
            }
            Err(err) => {
                tracing::warn!(error = %err, "campaign query failed, showing demo data");
                self.demo.campaigns.clone()
            }
        }
    }

    /// Distinct users active since the start of the current calendar day.
    /// Live mode only; the aggregator derives the demo-mode figure itself.
    pub async fn count_users_today(&self) -> i64 {
        match &self.pool {
            Some(pool) => {
                count_scalar(
                    pool,
                    "SELECT COUNT(DISTINCT user_id) FROM user_activities \
                     WHERE timestamp >= CURRENT_DATE",
                )
                .await
            }
            None => 0,
        }
    }

    /// Total campaigns ever sent. Live mode only.
    pub async fn count_campaigns(&self) -> i64 {
        match &self.pool {
            Some(pool) => count_scalar(pool, "SELECT COUNT(*) FROM campaign_history").await,
            None => 0,
        }
    }

    /// Campaigns with at least one open or click. Live mode only.
    pub async fn count_conversions(&self) -> i64 {
        match &self.pool {
            Some(pool) => {
                count_scalar(
                    pool,
                    "SELECT COUNT(*) FROM campaign_history \
                     WHERE COALESCE(open_count, 0) > 0 OR COALESCE(click_count, 0) > 0",
                )
                .await
            }
            None => 0,
        }
    }
}

async fn fetch_activities(pool: &PgPool) -> anyhow::Result<Vec<ActivityRecord>> {
    let rows = sqlx::query(
        "SELECT id, user_id, feature_used, email, timestamp \
         FROM user_activities ORDER BY timestamp DESC LIMIT 20",
    )
    .fetch_all(pool)
    .await?;

    let mut activities = Vec::with_capacity(rows.len());
    for row in rows {
        activities.push(ActivityRecord {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            feature_used: row.try_get("feature_used")?,
            email: row.try_get("email")?,
            timestamp: row.try_get("timestamp")?,
        });
    }

    Ok(activities)
}

async fn fetch_opportunities(pool: &PgPool) -> anyhow::Result<Vec<OpportunityRecord>> {
    let rows = sqlx::query(
        "SELECT id, user_id, email, recommended_feature, ai_score, reasoning, \
         created_at, status \
         FROM upsell_opportunities ORDER BY created_at DESC LIMIT 50",
    )
    .fetch_all(pool)
    .await?;

    let mut opportunities = Vec::with_capacity(rows.len());
    for row in rows {
        opportunities.push(OpportunityRecord {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            email: row.try_get("email")?,
            recommended_feature: row.try_get("recommended_feature")?,
            ai_score: row.try_get("ai_score")?,
            reasoning: row.try_get("reasoning")?,
            created_at: row.try_get("created_at")?,
            status: row.try_get("status")?,
        });
    }

    Ok(opportunities)
}

async fn fetch_campaigns(pool: &PgPool) -> anyhow::Result<Vec<CampaignRecord>> {
    let rows = sqlx::query(
        "SELECT id, opportunity_id, user_id, recommended_feature, subject_line, \
         email_message, email_to, campaign_type, ai_score, sent_at, \
         delivery_status, open_count, click_count, created_at \
         FROM campaign_history ORDER BY sent_at DESC LIMIT 50",
    )
    .fetch_all(pool)
    .await?;

    let mut campaigns = Vec::with_capacity(rows.len());
    for row in rows {
        campaigns.push(CampaignRecord {
            id: row.try_get("id")?,
            opportunity_id: row.try_get("opportunity_id")?,
            user_id: row.try_get("user_id")?,
            recommended_feature: row.try_get("recommended_feature")?,
            subject_line: row.try_get("subject_line")?,
            email_message: row.try_get("email_message")?,
            email_to: row.try_get("email_to")?,
            campaign_type: row.try_get("campaign_type")?,
            ai_score: row.try_get("ai_score")?,
            sent_at: row.try_get("sent_at")?,
            delivery_status: row.try_get("delivery_status")?,
            open_count: row.try_get("open_count")?,
            click_count: row.try_get("click_count")?,
            created_at: row.try_get("created_at")?,
        });
    }

    Ok(campaigns)
}

async fn count_scalar(pool: &PgPool, query: &str) -> i64 {
    match try_count(pool, query).await {
        Ok(count) => count,
        Err(err) => {
            tracing::warn!(error = %err, query, "aggregate query failed, counting as zero");
            0
        }
    }
}

async fn try_count(pool: &PgPool, query: &str) -> anyhow::Result<i64> {
    let row = sqlx::query(query).fetch_one(pool).await?;
    Ok(row.try_get(0)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn offline_gateway_serves_demo_rows() {
        let gateway = Gateway::offline(DemoDataset::builtin());
        assert!(!gateway.is_live());

        let activities = gateway.recent_activities().await;
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[0].user_id, "sarah_designer");

        assert_eq!(gateway.recent_opportunities().await.len(), 2);
        assert_eq!(gateway.recent_campaigns().await.len(), 1);
    }

    #[tokio::test]
    async fn fallback_mode_is_sticky_across_reads() {
        let gateway = Gateway::offline(DemoDataset::builtin());
        for _ in 0..3 {
            assert_eq!(gateway.recent_activities().await.len(), 2);
            assert!(!gateway.is_live());
        }
    }

    #[tokio::test]
    async fn offline_scalar_counts_are_zero() {
        let gateway = Gateway::offline(DemoDataset::builtin());
        assert_eq!(gateway.count_users_today().await, 0);
        assert_eq!(gateway.count_campaigns().await, 0);
        assert_eq!(gateway.count_conversions().await, 0);
    }
}
