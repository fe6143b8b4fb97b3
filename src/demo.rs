use chrono::{Duration, Utc};

use crate::models::{ActivityRecord, CampaignRecord, OpportunityRecord};

/// The fixed in-memory dataset shown when no live data source is reachable.
///
/// Rows mirror the production seed data so the dashboard demos realistically.
/// Timestamps are taken relative to now at construction time.
#[derive(Debug, Clone)]
pub struct DemoDataset {
    pub activities: Vec<ActivityRecord>,
    pub opportunities: Vec<OpportunityRecord>,
    pub campaigns: Vec<CampaignRecord>,
}

impl DemoDataset {
    pub fn builtin() -> Self {
        let now = Utc::now();

        let activities = vec![
            ActivityRecord {
                id: 1,
                user_id: "sarah_designer".to_string(),
                feature_used: "export_report".to_string(),
                email: "sarah@example.com".to_string(),
                timestamp: now,
            },
            ActivityRecord {
                id: 2,
                user_id: "john_agency".to_string(),
                feature_used: "file_share".to_string(),
                email: "john@example.com".to_string(),
                timestamp: now,
            },
        ];

        let opportunities = vec![
            OpportunityRecord {
                id: 1,
                user_id: "sarah_designer".to_string(),
                email: "sarah@example.com".to_string(),
                recommended_feature: "Pro Exports".to_string(),
                ai_score: 92,
                reasoning: "Frequent exports".to_string(),
                created_at: now,
                status: "active".to_string(),
            },
            OpportunityRecord {
                id: 2,
                user_id: "john_agency".to_string(),
                email: "john@example.com".to_string(),
                recommended_feature: "Team Plan".to_string(),
                ai_score: 65,
                reasoning: "Multiple teammates".to_string(),
                created_at: now - Duration::hours(2),
                status: "active".to_string(),
            },
        ];

        let campaigns = vec![CampaignRecord {
            id: 1,
            opportunity_id: 1,
            user_id: "sarah_designer".to_string(),
            recommended_feature: "Pro Exports".to_string(),
            subject_line: "Try Pro Exports".to_string(),
            email_message: "Upgrade to pro to export...".to_string(),
            email_to: "sarah@example.com".to_string(),
            campaign_type: "email".to_string(),
            ai_score: 92,
            sent_at: now,
            delivery_status: "sent".to_string(),
            open_count: 1,
            click_count: 1,
            created_at: now,
        }];

        Self {
            activities,
            opportunities,
            campaigns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rows_match_seed_data() {
        let demo = DemoDataset::builtin();
        assert_eq!(demo.activities.len(), 2);
        assert_eq!(demo.opportunities.len(), 2);
        assert_eq!(demo.campaigns.len(), 1);

        assert_eq!(demo.activities[0].user_id, "sarah_designer");
        assert_eq!(demo.activities[1].user_id, "john_agency");
        assert_eq!(demo.opportunities[0].ai_score, 92);
        assert_eq!(demo.opportunities[1].recommended_feature, "Team Plan");

        let campaign = &demo.campaigns[0];
        assert_eq!(campaign.opportunity_id, 1);
        assert_eq!(campaign.open_count, 1);
        assert_eq!(campaign.click_count, 1);
    }
}
