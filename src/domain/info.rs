//! Information flow value objects: events, notifications, threads and chat
//!
//! An [`InfoEvent`] is routed to recipients through a [`RoutingPolicy`];
//! each delivery is tracked as a [`Notification`], and related notifications
//! are grouped into a [`CommThread`].

use super::enums::{Channel, ChatRole, EventType, NotificationStatus};
use super::errors::OptimedError;
use super::ids::{EventId, PatientId};
use super::result::Result;
use super::routing::RoutingPolicy;
use super::validate::{missing, require_non_blank, Validate};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A clinical or operational event with a JSON payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoEvent {
    event_id: EventId,
    #[serde(default)]
    patient_id: Option<PatientId>,
    event_type: EventType,
    payload: String,
    created_at: DateTime<Utc>,
}

impl InfoEvent {
    pub fn builder() -> InfoEventBuilder {
        InfoEventBuilder::default()
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn patient_id(&self) -> Option<&PatientId> {
        self.patient_id.as_ref()
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Payload as the JSON text it was created with
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Payload decoded into a caller-chosen type
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.payload)?)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Recipients registered for this event's type, in policy order
    ///
    /// # Examples
    ///
    /// ```
    /// use optimed::domain::{EventId, EventType, InfoEvent, RoutingPolicy};
    ///
    /// let policy = RoutingPolicy::new().route(EventType::LabCrit, ["RN1", "MD1"]);
    /// let event = InfoEvent::builder()
    ///     .event_id(EventId::new("EVT1").unwrap())
    ///     .event_type(EventType::LabCrit)
    ///     .payload(r#"{"K+":"6.2"}"#)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(event.route_targets(&policy), ["RN1", "MD1"]);
    /// ```
    pub fn route_targets<'p>(&self, policy: &'p RoutingPolicy) -> &'p [String] {
        policy.targets_for(self.event_type)
    }
}

impl Validate for InfoEvent {
    fn validate(&self) -> Result<()> {
        require_non_blank("event_id", self.event_id.as_str())?;
        serde_json::from_str::<serde::de::IgnoredAny>(&self.payload).map_err(|e| {
            OptimedError::Validation(format!(
                "event {} payload is not valid JSON: {e}",
                self.event_id
            ))
        })?;
        Ok(())
    }
}

/// Builder for constructing InfoEvent instances
#[derive(Debug, Default)]
pub struct InfoEventBuilder {
    event_id: Option<EventId>,
    patient_id: Option<PatientId>,
    event_type: Option<EventType>,
    payload: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl InfoEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_id(mut self, event_id: EventId) -> Self {
        self.event_id = Some(event_id);
        self
    }

    pub fn patient_id(mut self, patient_id: PatientId) -> Self {
        self.patient_id = Some(patient_id);
        self
    }

    pub fn event_type(mut self, event_type: EventType) -> Self {
        self.event_type = Some(event_type);
        self
    }

    /// Sets the payload from JSON text; checked in `build`
    pub fn payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Sets the payload from an already-structured JSON value
    pub fn payload_json(mut self, payload: &serde_json::Value) -> Self {
        self.payload = Some(payload.to_string());
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Builds the InfoEvent
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required field is missing or the
    /// payload is not well-formed JSON.
    pub fn build(self) -> Result<InfoEvent> {
        let event = InfoEvent {
            event_id: self.event_id.ok_or_else(|| missing("event_id"))?,
            patient_id: self.patient_id,
            event_type: self.event_type.ok_or_else(|| missing("event_type"))?,
            payload: self.payload.ok_or_else(|| missing("payload"))?,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        };
        event.validate()?;
        Ok(event)
    }
}

/// Delivery of an event to its recipients over one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    notification_id: String,
    event_id: EventId,
    recipients: Vec<String>,
    channel: Channel,
    status: NotificationStatus,
    delivered_at: DateTime<Utc>,
    #[serde(default)]
    ack_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn builder() -> NotificationBuilder {
        NotificationBuilder::default()
    }

    pub fn notification_id(&self) -> &str {
        &self.notification_id
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn status(&self) -> NotificationStatus {
        self.status
    }

    pub fn delivered_at(&self) -> DateTime<Utc> {
        self.delivered_at
    }

    pub fn ack_at(&self) -> Option<DateTime<Utc>> {
        self.ack_at
    }

    pub fn is_acknowledged(&self) -> bool {
        self.status == NotificationStatus::Ack
    }

    /// Returns an acknowledged copy with `ack_at` set to `ts`
    ///
    /// Acknowledging an already acknowledged notification overwrites the
    /// timestamp.
    ///
    /// # Errors
    ///
    /// Fails for a timed-out notification or when `ts` precedes delivery.
    pub fn acknowledge_at(&self, ts: DateTime<Utc>) -> Result<Notification> {
        if self.status == NotificationStatus::Timeout {
            return Err(OptimedError::Validation(format!(
                "notification {} timed out and cannot be acknowledged",
                self.notification_id
            )));
        }
        if ts < self.delivered_at {
            return Err(OptimedError::Validation(format!(
                "acknowledgment time {ts} precedes delivery {}",
                self.delivered_at
            )));
        }

        Ok(Notification {
            status: NotificationStatus::Ack,
            ack_at: Some(ts),
            ..self.clone()
        })
    }

    /// Returns a copy acknowledged at the current time
    pub fn acknowledge(&self) -> Result<Notification> {
        self.acknowledge_at(Utc::now())
    }
}

impl Validate for Notification {
    fn validate(&self) -> Result<()> {
        require_non_blank("notification_id", &self.notification_id)?;

        if self.recipients.is_empty() {
            return Err(OptimedError::Validation(format!(
                "notification {} has no recipients",
                self.notification_id
            )));
        }
        let mut seen = BTreeSet::new();
        for recipient in &self.recipients {
            require_non_blank("recipient", recipient)?;
            if !seen.insert(recipient.as_str()) {
                return Err(OptimedError::Validation(format!(
                    "notification {} lists recipient {recipient} more than once",
                    self.notification_id
                )));
            }
        }

        match (self.status, self.ack_at) {
            (NotificationStatus::Ack, None) => Err(OptimedError::Validation(format!(
                "notification {} is acknowledged but has no ack time",
                self.notification_id
            ))),
            (NotificationStatus::Ack, Some(ack)) if ack < self.delivered_at => {
                Err(OptimedError::Validation(format!(
                    "acknowledgment time {ack} precedes delivery {}",
                    self.delivered_at
                )))
            }
            (NotificationStatus::Delivered | NotificationStatus::Timeout, Some(_)) => {
                Err(OptimedError::Validation(format!(
                    "notification {} has an ack time but status is {}",
                    self.notification_id, self.status
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Builder for constructing Notification instances
#[derive(Debug, Default)]
pub struct NotificationBuilder {
    notification_id: Option<String>,
    event_id: Option<EventId>,
    recipients: Vec<String>,
    channel: Option<Channel>,
    status: Option<NotificationStatus>,
    delivered_at: Option<DateTime<Utc>>,
    ack_at: Option<DateTime<Utc>>,
}

impl NotificationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notification_id(mut self, notification_id: impl Into<String>) -> Self {
        self.notification_id = Some(notification_id.into());
        self
    }

    pub fn event_id(mut self, event_id: EventId) -> Self {
        self.event_id = Some(event_id);
        self
    }

    pub fn recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipients.push(recipient.into());
        self
    }

    /// Appends recipients, keeping their order
    pub fn recipients<I, S>(mut self, recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recipients
            .extend(recipients.into_iter().map(Into::into));
        self
    }

    pub fn channel(mut self, channel: Channel) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Sets the status (defaults to `Delivered`)
    pub fn status(mut self, status: NotificationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn delivered_at(mut self, delivered_at: DateTime<Utc>) -> Self {
        self.delivered_at = Some(delivered_at);
        self
    }

    pub fn ack_at(mut self, ack_at: DateTime<Utc>) -> Self {
        self.ack_at = Some(ack_at);
        self
    }

    /// Builds the Notification
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required field is missing, there are
    /// no recipients or a duplicate one, or the status and ack time disagree.
    pub fn build(self) -> Result<Notification> {
        let notification = Notification {
            notification_id: self
                .notification_id
                .ok_or_else(|| missing("notification_id"))?,
            event_id: self.event_id.ok_or_else(|| missing("event_id"))?,
            recipients: self.recipients,
            channel: self.channel.ok_or_else(|| missing("channel"))?,
            status: self.status.unwrap_or(NotificationStatus::Delivered),
            delivered_at: self.delivered_at.unwrap_or_else(Utc::now),
            ack_at: self.ack_at,
        };
        notification.validate()?;
        Ok(notification)
    }
}

/// A conversation grouping related notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommThread {
    thread_id: String,
    #[serde(default)]
    notifications: Vec<Notification>,
    #[serde(default)]
    owners: Vec<String>,
    opened_at: DateTime<Utc>,
    #[serde(default)]
    closed_at: Option<DateTime<Utc>>,
}

impl CommThread {
    pub fn builder() -> CommThreadBuilder {
        CommThreadBuilder::default()
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn owners(&self) -> &[String] {
        &self.owners
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// Returns a copy with `notification` appended
    ///
    /// # Examples
    ///
    /// ```
    /// use optimed::domain::{Channel, CommThread, EventId, Notification};
    ///
    /// let thread = CommThread::builder().thread_id("T1").owner("MD1").build().unwrap();
    /// let n = Notification::builder()
    ///     .notification_id("N1")
    ///     .event_id(EventId::new("EVT1").unwrap())
    ///     .recipient("MD1")
    ///     .channel(Channel::Teams)
    ///     .build()
    ///     .unwrap();
    ///
    /// let updated = thread.add_notification(n.clone());
    /// assert!(thread.notifications().is_empty());
    /// assert_eq!(updated.notifications(), &[n]);
    /// ```
    pub fn add_notification(&self, notification: Notification) -> CommThread {
        let mut notifications = self.notifications.clone();
        notifications.push(notification);
        CommThread {
            notifications,
            ..self.clone()
        }
    }

    /// Returns a closed copy of this thread
    ///
    /// # Errors
    ///
    /// Fails if the thread is already closed or `ts` precedes `opened_at`.
    pub fn close_at(&self, ts: DateTime<Utc>) -> Result<CommThread> {
        if self.is_closed() {
            return Err(OptimedError::Validation(format!(
                "thread {} is already closed",
                self.thread_id
            )));
        }
        if ts < self.opened_at {
            return Err(OptimedError::Validation(format!(
                "close time {ts} precedes opening {}",
                self.opened_at
            )));
        }

        Ok(CommThread {
            closed_at: Some(ts),
            ..self.clone()
        })
    }

    /// Returns a copy closed at the current time
    pub fn close(&self) -> Result<CommThread> {
        self.close_at(Utc::now())
    }
}

impl Validate for CommThread {
    fn validate(&self) -> Result<()> {
        require_non_blank("thread_id", &self.thread_id)?;

        if let Some(closed) = self.closed_at {
            if closed < self.opened_at {
                return Err(OptimedError::Validation(format!(
                    "close time {closed} precedes opening {}",
                    self.opened_at
                )));
            }
        }

        self.notifications.iter().try_for_each(Validate::validate)
    }
}

/// Builder for constructing CommThread instances
#[derive(Debug, Default)]
pub struct CommThreadBuilder {
    thread_id: Option<String>,
    notifications: Vec<Notification>,
    owners: Vec<String>,
    opened_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
}

impl CommThreadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn notification(mut self, notification: Notification) -> Self {
        self.notifications.push(notification);
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owners.push(owner.into());
        self
    }

    pub fn opened_at(mut self, opened_at: DateTime<Utc>) -> Self {
        self.opened_at = Some(opened_at);
        self
    }

    pub fn closed_at(mut self, closed_at: DateTime<Utc>) -> Self {
        self.closed_at = Some(closed_at);
        self
    }

    pub fn build(self) -> Result<CommThread> {
        let thread = CommThread {
            thread_id: self.thread_id.ok_or_else(|| missing("thread_id"))?,
            notifications: self.notifications,
            owners: self.owners,
            opened_at: self.opened_at.unwrap_or_else(Utc::now),
            closed_at: self.closed_at,
        };
        thread.validate()?;
        Ok(thread)
    }
}

/// One turn of a conversation with a language model
///
/// Content may be empty. Adapters attach response details such as the model
/// name and token counts through [`ChatMessage::with_metadata`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: ChatRole,
    content: String,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

impl ChatMessage {
    /// Creates a message stamped with the current time
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Attaches one metadata entry
    ///
    /// # Errors
    ///
    /// Returns a validation error when the key is blank.
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self> {
        let key = key.into();
        require_non_blank("chat message metadata key", &key)?;
        self.metadata.insert(key, value.into());
        Ok(self)
    }

    pub fn role(&self) -> ChatRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

impl Validate for ChatMessage {
    fn validate(&self) -> Result<()> {
        if self.metadata.keys().any(|k| k.trim().is_empty()) {
            return Err(OptimedError::Validation(
                "chat message metadata keys cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
