//! Remote tournament platform connector.
//!
//! Events and their registrants originate on an external platform. The
//! registry asks a `RemoteConnector` for them and reports how many came back.
//! `StubConnector` is the offline default and never returns anything;
//! `JsonFeedConnector` serves a previously exported JSON feed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors raised by a remote connector
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Remote platform unavailable: {0}")]
    Unavailable(String),

    #[error("Unexpected remote payload: {0}")]
    Payload(#[from] serde_json::Error),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// An event as published by the remote platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub remote_id: String,
    pub name: String,
    pub url: String,
    pub start: DateTime<Utc>,
}

/// A roster entry as published by the remote platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDraft {
    pub remote_id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub dropped: bool,
}

/// A registered team as published by the remote platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDraft {
    pub remote_id: String,
    pub name: String,
    pub url: String,
    pub registration_order: i32,
    #[serde(default)]
    pub dropped: bool,
    #[serde(default)]
    pub roster: Vec<PlayerDraft>,
}

/// Source of new events and registrations
#[async_trait]
pub trait RemoteConnector: Send + Sync {
    /// Events not yet known locally
    async fn fetch_events(&self) -> RemoteResult<Vec<EventDraft>>;

    /// Teams registered for one remote event
    async fn fetch_participants(&self, remote_event_id: &str) -> RemoteResult<Vec<TeamDraft>>;
}

/// Connector that reports no remote data
#[derive(Debug, Clone, Copy, Default)]
pub struct StubConnector;

#[async_trait]
impl RemoteConnector for StubConnector {
    async fn fetch_events(&self) -> RemoteResult<Vec<EventDraft>> {
        Ok(Vec::new())
    }

    async fn fetch_participants(&self, _remote_event_id: &str) -> RemoteResult<Vec<TeamDraft>> {
        Ok(Vec::new())
    }
}

/// Exported feed: all events plus the registrants of each, keyed by remote
/// event id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteFeed {
    #[serde(default)]
    pub events: Vec<EventDraft>,
    #[serde(default)]
    pub participants: HashMap<String, Vec<TeamDraft>>,
}

/// Connector serving a static JSON feed
#[derive(Debug, Clone, Default)]
pub struct JsonFeedConnector {
    feed: RemoteFeed,
}

impl JsonFeedConnector {
    pub fn new(feed: RemoteFeed) -> Self {
        Self { feed }
    }

    pub fn from_json(json: &str) -> RemoteResult<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Reads a feed file.
    pub async fn from_file(path: impl AsRef<Path>) -> RemoteResult<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RemoteError::Unavailable(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }
}

#[async_trait]
impl RemoteConnector for JsonFeedConnector {
    async fn fetch_events(&self) -> RemoteResult<Vec<EventDraft>> {
        Ok(self.feed.events.clone())
    }

    async fn fetch_participants(&self, remote_event_id: &str) -> RemoteResult<Vec<TeamDraft>> {
        Ok(self
            .feed
            .participants
            .get(remote_event_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_returns_nothing() {
        let stub = StubConnector;
        assert!(stub.fetch_events().await.unwrap().is_empty());
        assert!(stub.fetch_participants("abc").await.unwrap().is_empty());
    }

    #[test]
    fn test_team_draft_defaults() {
        let draft: TeamDraft = serde_json::from_str(
            r#"{"remote_id":"r1","name":"Owls","url":"","registration_order":3}"#,
        )
        .unwrap();
        assert!(!draft.dropped);
        assert!(draft.roster.is_empty());
    }

    #[tokio::test]
    async fn test_json_feed() {
        let connector = JsonFeedConnector::from_json(
            r#"{
                "events": [
                    {"remote_id": "ev1", "name": "Spring Open", "url": "", "start": "2024-03-02T18:00:00Z"}
                ],
                "participants": {
                    "ev1": [
                        {"remote_id": "t1", "name": "Owls", "url": "", "registration_order": 1},
                        {"remote_id": "t2", "name": "Hawks", "url": "", "registration_order": 2, "dropped": true}
                    ]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(connector.fetch_events().await.unwrap().len(), 1);
        assert_eq!(connector.fetch_participants("ev1").await.unwrap().len(), 2);
        assert!(connector.fetch_participants("ev2").await.unwrap().is_empty());
    }

    #[test]
    fn test_malformed_feed() {
        let result = JsonFeedConnector::from_json("{\"events\": 3}");
        assert!(matches!(result, Err(RemoteError::Payload(_))));
    }
}
