use std::fmt::Write;

use crate::models::{ActivityRecord, AgentImpact, Aggregates, CampaignRecord, OpportunityRecord};

#[derive(Debug, Clone)]
pub struct StatusSummary {
    pub status: String,
    pub count: usize,
}

pub fn summarize_status(opportunities: &[OpportunityRecord]) -> Vec<StatusSummary> {
    let mut map: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for opportunity in opportunities {
        *map.entry(opportunity.status.clone()).or_insert(0) += 1;
    }

    let mut summaries: Vec<StatusSummary> = map
        .into_iter()
        .map(|(status, count)| StatusSummary { status, count })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count).then(a.status.cmp(&b.status)));
    summaries
}

pub fn build_report(
    aggregates: &Aggregates,
    impact: &AgentImpact,
    opportunities: &[OpportunityRecord],
    campaigns: &[CampaignRecord],
    activities: &[ActivityRecord],
    live: bool,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Upsell Agent Operations Report");
    if live {
        let _ = writeln!(output, "Generated from live data.");
    } else {
        let _ = writeln!(output, "Generated from demo data (database not connected).");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Headline KPIs");
    let _ = writeln!(output, "- Active users today: {}", aggregates.users_today);
    let _ = writeln!(output, "- Emails sent: {}", aggregates.emails_sent);
    let _ = writeln!(output, "- Conversions: {}", aggregates.conversions);
    let _ = writeln!(output, "- Conversion rate: {}%", aggregates.success_rate);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Agent Impact");
    let _ = writeln!(
        output,
        "Baseline {}% -> live {}% (uplift {} pts)",
        impact.baseline, impact.live, impact.uplift
    );
    match impact.relative_uplift {
        Some(relative) => {
            let _ = writeln!(output, "Relative uplift: ~{relative}%");
        }
        None => {
            let _ = writeln!(output, "Relative uplift: n/a (no baseline)");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Opportunity Status Mix");
    let summaries = summarize_status(opportunities);
    if summaries.is_empty() {
        let _ = writeln!(output, "No opportunities recorded.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(output, "- {}: {}", summary.status, summary.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Campaign Outcomes");
    if campaigns.is_empty() {
        let _ = writeln!(output, "No campaigns recorded.");
    } else {
        let clicks: i64 = campaigns
            .iter()
            .map(|campaign| campaign.click_count as i64)
            .sum();
        let _ = writeln!(output, "- Sent: {}", campaigns.len());
        let _ = writeln!(output, "- Converted (clicks): {clicks}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Activity");
    if activities.is_empty() {
        let _ = writeln!(output, "No activity recorded.");
    } else {
        for activity in activities.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} used {} at {}",
                activity.user_id, activity.feature_used, activity.timestamp
            );
        }
    }

    output
}
