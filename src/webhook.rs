use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// How long an activity-tracked POST may take before it is abandoned.
pub const ACTIVITY_TIMEOUT: Duration = Duration::from_secs(8);
/// How long a campaign-trigger POST may take before it is abandoned.
pub const CAMPAIGN_TIMEOUT: Duration = Duration::from_secs(10);

/// Payload for the user-activity webhook.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEvent {
    pub user_id: String,
    pub feature: String,
    pub email: String,
    pub plan_type: String,
    pub session_id: String,
    pub timestamp: String,
}

impl ActivityEvent {
    /// Stamps the event with the current UTC time in ISO-8601.
    pub fn new(
        user_id: String,
        feature: String,
        email: String,
        plan_type: String,
        session_id: String,
    ) -> Self {
        Self {
            user_id,
            feature,
            email,
            plan_type,
            session_id,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Payload for the campaign-trigger webhook. The id must be positive;
/// anything else is rejected before a request is built.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CampaignTrigger {
    pub opportunity_id: i64,
}

/// Body of a successful webhook response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    /// The endpoint answered 2xx with something that is not JSON. Still a
    /// success, reported as-is.
    Raw(String),
}

#[derive(Debug, Clone)]
pub struct DispatchReceipt {
    pub status: u16,
    pub body: ResponseBody,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no webhook endpoint configured for this action")]
    EndpointMissing,

    #[error("opportunity id must be positive, got {0}")]
    InvalidOpportunityId(i64),

    /// Non-2xx answer. The body is preserved verbatim for diagnostics.
    #[error("webhook returned {status}: {body}")]
    Http { status: u16, body: String },

    /// Connection, DNS or timeout failure before a status was received.
    #[error("webhook call failed: {0}")]
    Transport(String),
}

/// Sends the two outbound event kinds. One best-effort attempt per call,
/// no retry; the caller reports the outcome to the user either way.
pub struct Dispatcher {
    client: reqwest::Client,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub async fn track_activity(
        &self,
        endpoint: Option<&str>,
        event: &ActivityEvent,
    ) -> Result<DispatchReceipt, DispatchError> {
        let url = endpoint.ok_or(DispatchError::EndpointMissing)?;
        self.post(url, event, ACTIVITY_TIMEOUT).await
    }

    pub async fn trigger_campaign(
        &self,
        endpoint: Option<&str>,
        trigger: &CampaignTrigger,
    ) -> Result<DispatchReceipt, DispatchError> {
        if trigger.opportunity_id <= 0 {
            return Err(DispatchError::InvalidOpportunityId(trigger.opportunity_id));
        }
        let url = endpoint.ok_or(DispatchError::EndpointMissing)?;
        self.post(url, trigger, CAMPAIGN_TIMEOUT).await
    }

    async fn post<T: Serialize>(
        &self,
        url: &str,
        payload: &T,
        timeout: Duration,
    ) -> Result<DispatchReceipt, DispatchError> {
        tracing::debug!(url, "dispatching webhook");
        let response = self
            .client
            .post(url)
            .json(payload)
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| DispatchError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| DispatchError::Transport(err.to_string()))?;

        classify(status, body)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Sole classification point for webhook answers: 2xx succeeds (JSON body
/// parsed when possible), everything else fails with the verbatim body.
pub fn classify(status: u16, body: String) -> Result<DispatchReceipt, DispatchError> {
    if (200..300).contains(&status) {
        let body = match serde_json::from_str(&body) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Raw(body),
        };
        Ok(DispatchReceipt { status, body })
    } else {
        Err(DispatchError::Http { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn created_with_json_body_succeeds() {
        let receipt = classify(201, r#"{"queued":true}"#.to_string()).unwrap();
        assert_eq!(receipt.status, 201);
        assert_eq!(receipt.body, ResponseBody::Json(json!({"queued": true})));
    }

    #[test]
    fn non_json_success_is_still_success() {
        let receipt = classify(200, "accepted".to_string()).unwrap();
        assert_eq!(receipt.body, ResponseBody::Raw("accepted".to_string()));
    }

    #[test]
    fn server_error_keeps_body_verbatim() {
        let err = classify(500, "workflow exploded".to_string()).unwrap_err();
        match err {
            DispatchError::Http { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "workflow exploded");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn zero_opportunity_id_is_rejected_locally() {
        let dispatcher = Dispatcher::new();
        // The endpoint is unroutable on purpose: a network attempt would
        // surface as Transport, not InvalidOpportunityId.
        let err = dispatcher
            .trigger_campaign(Some("http://192.0.2.1/hook"), &CampaignTrigger { opportunity_id: 0 })
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidOpportunityId(0)));
    }

    #[tokio::test]
    async fn missing_endpoint_is_a_configuration_error() {
        let dispatcher = Dispatcher::new();
        let event = ActivityEvent::new(
            "sarah_designer".to_string(),
            "export_report".to_string(),
            "sarah@example.com".to_string(),
            "pro".to_string(),
            "session_1".to_string(),
        );
        let err = dispatcher.track_activity(None, &event).await.unwrap_err();
        assert!(matches!(err, DispatchError::EndpointMissing));
    }

    #[test]
    fn activity_event_serializes_expected_fields() {
        let event = ActivityEvent::new(
            "john_agency".to_string(),
            "file_share".to_string(),
            "john@example.com".to_string(),
            "free".to_string(),
            "session_42".to_string(),
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["user_id"], "john_agency");
        assert_eq!(value["feature"], "file_share");
        assert_eq!(value["plan_type"], "free");
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn campaign_trigger_serializes_opportunity_id() {
        let value = serde_json::to_value(CampaignTrigger { opportunity_id: 7 }).unwrap();
        assert_eq!(value, json!({"opportunity_id": 7}));
    }
}
