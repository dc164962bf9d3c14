//! Request/response records for driving a [`HookDispatcher`] across a process or FFI
//! boundary.
//!
//! ```
//! use keel_plugin::{HookDispatcher, HookResponse};
//!
//! let dispatcher = HookDispatcher::default();
//! let reply = dispatcher
//!     .handle_json(r#"{"type":"resolve","specifier":"react"}"#)
//!     .unwrap();
//! assert_eq!(reply, r#"{"type":"unhandled"}"#);
//! ```

use serde::{Deserialize, Serialize};

use crate::dispatch::{HookDispatcher, HookError, Loading, Resolution};
use crate::hooks::{EndArgs, LoadArgs, LoadOutcome, ResolveArgs, ResolveOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HookRequest {
    Start,
    Resolve(ResolveArgs),
    Load(LoadArgs),
    End(EndArgs),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HookResponse {
    Started,
    Resolved {
        plugin: String,
        outcome: ResolveOutcome,
    },
    Loaded {
        plugin: String,
        outcome: LoadOutcome,
    },
    Unhandled,
    Ended,
    Failed {
        error: HookError,
    },
}

impl HookDispatcher {
    pub fn handle(&self, request: &HookRequest) -> HookResponse {
        let response = match request {
            HookRequest::Start => self.run_start().map(|()| HookResponse::Started),
            HookRequest::Resolve(args) => self.resolve(args).map(|resolution| match resolution {
                Resolution::Resolved { plugin, outcome } => {
                    HookResponse::Resolved { plugin, outcome }
                }
                Resolution::Unhandled => HookResponse::Unhandled,
            }),
            HookRequest::Load(args) => self.load(args).map(|loading| match loading {
                Loading::Loaded { plugin, outcome } => HookResponse::Loaded { plugin, outcome },
                Loading::Unhandled => HookResponse::Unhandled,
            }),
            HookRequest::End(args) => self.run_end(args).map(|()| HookResponse::Ended),
        };
        response.unwrap_or_else(|error| HookResponse::Failed { error })
    }

    /// JSON in, JSON out. A request that does not parse yields a `failed` response.
    pub fn handle_json(&self, request: &str) -> serde_json::Result<String> {
        let response = match serde_json::from_str::<HookRequest>(request) {
            Ok(request) => self.handle(&request),
            Err(err) => HookResponse::Failed {
                error: HookError::MalformedRequest {
                    message: err.to_string(),
                },
            },
        };
        serde_json::to_string(&response)
    }
}
