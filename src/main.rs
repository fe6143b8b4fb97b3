use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand, ValueEnum};

mod config;
mod demo;
mod gateway;
mod metrics;
mod models;
mod report;
mod webhook;

use config::Settings;
use demo::DemoDataset;
use gateway::Gateway;
use webhook::{ActivityEvent, CampaignTrigger, DispatchError, DispatchReceipt, Dispatcher, ResponseBody};

#[derive(Parser)]
#[command(name = "upsell-dashboard")]
#[command(about = "Operations dashboard for the smart upsell agent", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show headline KPIs and agent impact
    Overview,
    /// List recent user activity
    Activities,
    /// List AI upsell opportunities
    Opportunities,
    /// List campaign send history
    Campaigns,
    /// Send a user-activity event to the automation webhook
    TrackActivity {
        #[arg(long)]
        user_id: String,
        #[arg(long, value_enum)]
        feature: Feature,
        /// Defaults to <user_id>@example.com
        #[arg(long)]
        email: Option<String>,
        #[arg(long, value_enum, default_value = "free")]
        plan_type: Plan,
        /// Defaults to session_<unix-seconds>
        #[arg(long)]
        session_id: Option<String>,
    },
    /// Ask the automation workflow to launch a campaign for an opportunity
    TriggerCampaign {
        #[arg(long)]
        opportunity_id: i64,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Feature {
    ExportReport,
    FileShare,
    IntegrationSetup,
    DashboardView,
}

impl Feature {
    fn as_str(self) -> &'static str {
        match self {
            Feature::ExportReport => "export_report",
            Feature::FileShare => "file_share",
            Feature::IntegrationSetup => "integration_setup",
            Feature::DashboardView => "dashboard_view",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Plan {
    Free,
    Pro,
    Enterprise,
}

impl Plan {
    fn as_str(self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
            Plan::Enterprise => "enterprise",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();
    let gateway = Gateway::connect(&settings.db, DemoDataset::builtin()).await;

    match cli.command {
        Commands::Overview => {
            if !gateway.is_live() {
                println!("DB not connected, showing demo data.");
            }
            let aggregates = metrics::compute_aggregates(&gateway).await;
            let impact = metrics::agent_impact(aggregates.success_rate);

            println!("Active Users Today: {}", aggregates.users_today);
            println!("Emails Sent: {}", aggregates.emails_sent);
            println!("Conversions: {}", aggregates.conversions);
            println!("Conversion Rate: {}%", aggregates.success_rate);
            match impact.relative_uplift {
                Some(relative) => println!(
                    "Agent Impact: baseline {}% -> live {}% (uplift: {} pts, ~{}% relative)",
                    impact.baseline, impact.live, impact.uplift, relative
                ),
                None => println!(
                    "Agent Impact: baseline {}% -> live {}% (uplift: {} pts)",
                    impact.baseline, impact.live, impact.uplift
                ),
            }
        }
        Commands::Activities => {
            if !gateway.is_live() {
                println!("DB not connected, showing demo data.");
            }
            println!("Recent activities:");
            for activity in gateway.recent_activities().await {
                println!(
                    "- [{}] {} used {} ({})",
                    activity.timestamp, activity.user_id, activity.feature_used, activity.email
                );
            }
        }
        Commands::Opportunities => {
            if !gateway.is_live() {
                println!("DB not connected, showing demo data.");
            }
            println!("AI upsell opportunities:");
            for opportunity in gateway.recent_opportunities().await {
                println!(
                    "- #{} {} <{}> -> {} (score {}, {}): {}",
                    opportunity.id,
                    opportunity.user_id,
                    opportunity.email,
                    opportunity.recommended_feature,
                    opportunity.ai_score,
                    opportunity.status,
                    opportunity.reasoning
                );
            }
        }
        Commands::Campaigns => {
            if !gateway.is_live() {
                println!("DB not connected, showing demo data.");
            }
            println!("Campaign history:");
            for campaign in gateway.recent_campaigns().await {
                println!(
                    "- #{} \"{}\" to {} [{}] opens {} clicks {} sent {}",
                    campaign.id,
                    campaign.subject_line,
                    campaign.email_to,
                    campaign.delivery_status,
                    campaign.open_count,
                    campaign.click_count,
                    campaign.sent_at
                );
            }
        }
        Commands::TrackActivity {
            user_id,
            feature,
            email,
            plan_type,
            session_id,
        } => {
            let email = email.unwrap_or_else(|| format!("{user_id}@example.com"));
            let session_id = session_id.unwrap_or_else(|| format!("session_{}", unix_seconds()));
            let event = ActivityEvent::new(
                user_id,
                feature.as_str().to_string(),
                email,
                plan_type.as_str().to_string(),
                session_id,
            );
            let payload = serde_json::to_value(&event)?;

            let dispatcher = Dispatcher::new();
            let outcome = dispatcher
                .track_activity(settings.user_activity_webhook.as_deref(), &event)
                .await;
            print_outcome("Activity event", outcome, &payload);
        }
        Commands::TriggerCampaign { opportunity_id } => {
            let trigger = CampaignTrigger { opportunity_id };
            let payload = serde_json::to_value(trigger)?;

            let dispatcher = Dispatcher::new();
            let outcome = dispatcher
                .trigger_campaign(settings.campaign_trigger_webhook.as_deref(), &trigger)
                .await;
            print_outcome("Campaign trigger", outcome, &payload);
        }
        Commands::Report { out } => {
            let aggregates = metrics::compute_aggregates(&gateway).await;
            let impact = metrics::agent_impact(aggregates.success_rate);
            let opportunities = gateway.recent_opportunities().await;
            let campaigns = gateway.recent_campaigns().await;
            let activities = gateway.recent_activities().await;

            let report = report::build_report(
                &aggregates,
                &impact,
                &opportunities,
                &campaigns,
                &activities,
                gateway.is_live(),
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

/// Webhook failures degrade to a printed diagnostic; the attempted payload
/// is echoed on transport errors so the user can retry it by hand.
fn print_outcome(
    action: &str,
    outcome: Result<DispatchReceipt, DispatchError>,
    payload: &serde_json::Value,
) {
    match outcome {
        Ok(receipt) => {
            println!("{action} sent successfully (HTTP {}).", receipt.status);
            match receipt.body {
                ResponseBody::Json(value) => println!("{value:#}"),
                ResponseBody::Raw(_) => println!("Webhook responded (non-JSON)."),
            }
        }
        Err(DispatchError::Http { status, body }) => {
            println!("Webhook returned {status}: {body}");
        }
        Err(err @ DispatchError::Transport(_)) => {
            println!("Failed to call webhook: {err}");
            println!("Payload was: {payload:#}");
        }
        Err(err) => {
            println!("{err}");
        }
    }
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
