use std::collections::HashSet;

use crate::gateway::Gateway;
use crate::models::{ActivityRecord, AgentImpact, Aggregates, CampaignRecord};

/// Conversion rate before the agent existed, in percent.
pub const BASELINE_RATE: f64 = 2.0;

/// Derive the headline KPIs from whatever source backs the gateway.
///
/// Recomputed fresh on every call so each dashboard refresh reflects the
/// current store state. Live mode asks the store for the three counts;
/// demo mode derives them from the fallback rows.
pub async fn compute_aggregates(gateway: &Gateway) -> Aggregates {
    let (users_today, emails_sent, conversions) = if gateway.is_live() {
        (
            gateway.count_users_today().await,
            gateway.count_campaigns().await,
            gateway.count_conversions().await,
        )
    } else {
        let demo = gateway.demo();
        (
            distinct_users(&demo.activities),
            demo.campaigns.len() as i64,
            clicked_campaigns(&demo.campaigns),
        )
    };

    Aggregates {
        users_today,
        emails_sent,
        conversions,
        success_rate: success_rate(conversions, emails_sent),
    }
}

/// Conversions as a percentage of emails sent, rounded to 2 decimals.
/// Zero when nothing has been sent.
pub fn success_rate(conversions: i64, emails_sent: i64) -> f64 {
    if emails_sent > 0 {
        round2(conversions as f64 / emails_sent as f64 * 100.0)
    } else {
        0.0
    }
}

/// Compare the observed conversion rate against the fixed baseline.
pub fn agent_impact(success_rate: f64) -> AgentImpact {
    let relative_uplift = if BASELINE_RATE > 0.0 {
        Some(round2((success_rate / BASELINE_RATE - 1.0) * 100.0))
    } else {
        None
    };

    AgentImpact {
        baseline: BASELINE_RATE,
        live: success_rate,
        uplift: round2(success_rate - BASELINE_RATE),
        relative_uplift,
    }
}

pub fn distinct_users(activities: &[ActivityRecord]) -> i64 {
    activities
        .iter()
        .map(|activity| activity.user_id.as_str())
        .collect::<HashSet<_>>()
        .len() as i64
}

// Demo conversions count clicks only; the live query also counts opens.
fn clicked_campaigns(campaigns: &[CampaignRecord]) -> i64 {
    campaigns
        .iter()
        .filter(|campaign| campaign.click_count > 0)
        .count() as i64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::DemoDataset;
    use chrono::Utc;

    fn activity(id: i64, user_id: &str) -> ActivityRecord {
        ActivityRecord {
            id,
            user_id: user_id.to_string(),
            feature_used: "export_report".to_string(),
            email: format!("{user_id}@example.com"),
            timestamp: Utc::now(),
        }
    }

    fn campaign(id: i64, open_count: i32, click_count: i32) -> CampaignRecord {
        CampaignRecord {
            id,
            opportunity_id: id,
            user_id: "sarah_designer".to_string(),
            recommended_feature: "Pro Exports".to_string(),
            subject_line: "Try Pro Exports".to_string(),
            email_message: "Upgrade to pro".to_string(),
            email_to: "sarah@example.com".to_string(),
            campaign_type: "email".to_string(),
            ai_score: 92,
            sent_at: Utc::now(),
            delivery_status: "sent".to_string(),
            open_count,
            click_count,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn success_rate_is_zero_without_sends() {
        assert_eq!(success_rate(0, 0), 0.0);
        assert_eq!(success_rate(5, 0), 0.0);
    }

    #[test]
    fn success_rate_rounds_to_two_decimals() {
        assert_eq!(success_rate(1, 3), 33.33);
        assert_eq!(success_rate(2, 3), 66.67);
        assert_eq!(success_rate(1, 1), 100.0);
    }

    #[test]
    fn impact_against_baseline() {
        let impact = agent_impact(100.0);
        assert_eq!(impact.baseline, 2.0);
        assert_eq!(impact.uplift, 98.0);
        assert_eq!(impact.relative_uplift, Some(4900.0));
    }

    #[test]
    fn distinct_users_ignores_duplicates() {
        let activities = vec![
            activity(1, "sarah_designer"),
            activity(2, "john_agency"),
            activity(3, "sarah_designer"),
        ];
        assert_eq!(distinct_users(&activities), 2);
    }

    #[test]
    fn demo_conversions_require_a_click() {
        let campaigns = vec![campaign(1, 3, 0), campaign(2, 0, 1)];
        assert_eq!(clicked_campaigns(&campaigns), 1);
    }

    #[tokio::test]
    async fn demo_dataset_yields_expected_kpis() {
        let gateway = Gateway::offline(DemoDataset::builtin());
        let aggregates = compute_aggregates(&gateway).await;

        assert_eq!(aggregates.users_today, 2);
        assert_eq!(aggregates.emails_sent, 1);
        assert_eq!(aggregates.conversions, 1);
        assert_eq!(aggregates.success_rate, 100.0);

        let impact = agent_impact(aggregates.success_rate);
        assert_eq!(impact.uplift, 98.0);
    }

    #[tokio::test]
    async fn opened_but_unclicked_demo_campaign_does_not_convert() {
        let mut demo = DemoDataset::builtin();
        demo.campaigns = vec![campaign(1, 2, 0)];
        let gateway = Gateway::offline(demo);

        let aggregates = compute_aggregates(&gateway).await;
        assert_eq!(aggregates.emails_sent, 1);
        assert_eq!(aggregates.conversions, 0);
        assert_eq!(aggregates.success_rate, 0.0);
    }
}
