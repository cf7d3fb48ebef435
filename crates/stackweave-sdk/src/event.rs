//! Deployment lifecycle events.
//!
//! The [`Deployer`](crate::deployer::Deployer) reports progress through an
//! [`EventListener`], which keeps every event in arrival order and can
//! forward each one to a callback as it happens.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use stackweave_common::types::StackName;

/// A deployment lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DeploymentEvent {
    /// Provisioning of a stack began.
    StackStarted {
        /// Stack being provisioned.
        stack: StackName,
        /// When provisioning began.
        at: DateTime<Utc>,
    },
    /// A stack was provisioned and its outputs recorded.
    StackProvisioned {
        /// Stack that was provisioned.
        stack: StackName,
        /// Number of outputs recorded.
        outputs: usize,
        /// When provisioning finished.
        at: DateTime<Utc>,
    },
    /// Provisioning of a stack failed; no later stack is attempted.
    StackFailed {
        /// Stack that failed.
        stack: StackName,
        /// Rendered error.
        reason: String,
        /// When the failure was observed.
        at: DateTime<Utc>,
    },
}

impl DeploymentEvent {
    /// Stack the event concerns.
    pub const fn stack(&self) -> &StackName {
        match self {
            Self::StackStarted { stack, .. }
            | Self::StackProvisioned { stack, .. }
            | Self::StackFailed { stack, .. } => stack,
        }
    }

    /// When the event happened.
    pub const fn at(&self) -> DateTime<Utc> {
        match self {
            Self::StackStarted { at, .. }
            | Self::StackProvisioned { at, .. }
            | Self::StackFailed { at, .. } => *at,
        }
    }
}

type Callback = Box<dyn FnMut(&DeploymentEvent)>;

/// Collects deployment events.
#[derive(Default)]
pub struct EventListener {
    events: Vec<DeploymentEvent>,
    callback: Option<Callback>,
}

impl EventListener {
    /// Creates a listener that only records events.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a listener that also forwards every event to `callback`.
    #[must_use]
    pub fn with_callback(callback: impl FnMut(&DeploymentEvent) + 'static) -> Self {
        Self {
            events: Vec::new(),
            callback: Some(Box::new(callback)),
        }
    }

    /// Records an event.
    pub fn emit(&mut self, event: DeploymentEvent) {
        if let Some(callback) = self.callback.as_mut() {
            callback(&event);
        }
        self.events.push(event);
    }

    /// Every event recorded so far, oldest first.
    pub fn events(&self) -> &[DeploymentEvent] {
        &self.events
    }

    /// Removes and returns every recorded event.
    pub fn drain(&mut self) -> Vec<DeploymentEvent> {
        std::mem::take(&mut self.events)
    }
}

impl fmt::Debug for EventListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListener")
            .field("events", &self.events)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}
