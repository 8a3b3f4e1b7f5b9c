//! Correlation ids
//!
//! Every engine command runs under a [`RequestContext`]. Its request id is
//! stamped on the command's boundary events and on any error it returns, so
//! the events of one rewrite (walk, writes, ref publication) can be grouped
//! after the fact. A wrapping tool can hand its own trace id down through
//! `REWORD_TRACE_ID`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Environment variable read by [`RequestContext::from_env`]
pub const TRACE_ID_ENV: &str = "REWORD_TRACE_ID";

macro_rules! correlation_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Fresh time-ordered id (UUIDv7)
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

correlation_id!(
    /// Identifies one engine command invocation
    RequestId
);

correlation_id!(
    /// Identifies a larger unit of work owned by an outer caller
    TraceId
);

/// Correlation carried through one command
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub trace_id: Option<TraceId>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            trace_id: None,
        }
    }

    /// Fresh context joined to the caller's trace when `REWORD_TRACE_ID`
    /// holds a valid id; an invalid value is ignored
    pub fn from_env() -> Self {
        let ctx = Self::new();
        match std::env::var(TRACE_ID_ENV)
            .ok()
            .and_then(|value| value.trim().parse::<TraceId>().ok())
        {
            Some(trace_id) => ctx.with_trace_id(trace_id),
            None => ctx,
        }
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
