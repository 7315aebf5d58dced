//! Post-processing hooks for relayed responses
//!
//! A route registers an ordered list of hooks; after the upstream reply
//! is wrapped into a [`ForwardedResponse`] the hooks are folded over it
//! in registration order, and the final value is what the caller sees.
//! Whether a hook receives the merged variable map is an explicit tag
//! chosen at registration time, not discovered by inspecting the
//! function.

use crate::gateway::types::ForwardedResponse;
use crate::pattern::VariableMap;

type PlainFn = dyn Fn(ForwardedResponse) -> ForwardedResponse + Send + Sync;
type VariableAwareFn = dyn Fn(ForwardedResponse, &VariableMap) -> ForwardedResponse + Send + Sync;

/// A tagged post-processing hook
pub enum Hook {
    /// Receives only the response
    Plain(Box<PlainFn>),
    /// Receives the response and the request's merged variable map
    VariableAware(Box<VariableAwareFn>),
}

impl Hook {
    pub fn plain<F>(hook: F) -> Self
    where
        F: Fn(ForwardedResponse) -> ForwardedResponse + Send + Sync + 'static,
    {
        Self::Plain(Box::new(hook))
    }

    pub fn variable_aware<F>(hook: F) -> Self
    where
        F: Fn(ForwardedResponse, &VariableMap) -> ForwardedResponse + Send + Sync + 'static,
    {
        Self::VariableAware(Box::new(hook))
    }

    /// Apply this hook; the return value replaces the response.
    pub fn apply(&self, response: ForwardedResponse, variables: &VariableMap) -> ForwardedResponse {
        match self {
            Self::Plain(hook) => hook(response),
            Self::VariableAware(hook) => hook(response, variables),
        }
    }
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("Hook::Plain"),
            Self::VariableAware(_) => f.write_str("Hook::VariableAware"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{HeaderMap, StatusCode};

    fn response(body: &'static str) -> ForwardedResponse {
        ForwardedResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    #[test]
    fn plain_hook_replaces_the_response() {
        let hook = Hook::plain(|mut response| {
            response.status = StatusCode::ACCEPTED;
            response
        });
        let out = hook.apply(response("x"), &VariableMap::new());
        assert_eq!(out.status, StatusCode::ACCEPTED);
    }

    #[test]
    fn variable_aware_hook_sees_the_merged_map() {
        let mut variables = VariableMap::new();
        variables.insert("uid", "55");

        let hook = Hook::variable_aware(|mut response, variables| {
            let uid = variables.get("uid").unwrap_or("missing");
            response.headers.insert("x-uid", uid.parse().unwrap());
            response
        });
        let out = hook.apply(response("x"), &variables);
        assert_eq!(out.headers.get("x-uid").unwrap(), "55");
    }
}
