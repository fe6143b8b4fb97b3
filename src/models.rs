use chrono::{DateTime, Utc};

/// One user interaction event, inserted by the activity webhook receiver.
#[derive(Debug, Clone)]
pub struct ActivityRecord {
    pub id: i64,
    pub user_id: String,
    pub feature_used: String,
    pub email: String,
    pub timestamp: DateTime<Utc>,
}

/// An upsell recommendation produced by the external scoring process.
#[derive(Debug, Clone)]
pub struct OpportunityRecord {
    pub id: i64,
    pub user_id: String,
    pub email: String,
    pub recommended_feature: String,
    pub ai_score: i32,
    pub reasoning: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
}

/// An outbound campaign sent to act on an opportunity.
///
/// `opportunity_id` is a soft reference: the store does not enforce it
/// against opportunity ids and neither does this crate.
#[derive(Debug, Clone)]
pub struct CampaignRecord {
    pub id: i64,
    pub opportunity_id: i64,
    pub user_id: String,
    pub recommended_feature: String,
    pub subject_line: String,
    pub email_message: String,
    pub email_to: String,
    pub campaign_type: String,
    pub ai_score: i32,
    pub sent_at: DateTime<Utc>,
    pub delivery_status: String,
    pub open_count: i32,
    pub click_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Headline KPIs, recomputed fresh on every read and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub users_today: i64,
    pub emails_sent: i64,
    pub conversions: i64,
    pub success_rate: f64,
}

/// Conversion-rate comparison against the fixed pre-agent baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentImpact {
    pub baseline: f64,
    pub live: f64,
    pub uplift: f64,
    pub relative_uplift: Option<f64>,
}
