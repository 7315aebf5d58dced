//! Route bindings: a local pattern paired with a remote pattern
//!
//! A [`RouteBinding`] is built once at startup and never mutated. The
//! local pattern is what the host router matches inbound requests
//! against; the remote pattern builds the outbound relative URL and may
//! reuse the same variable names in different positions. Compilation
//! failures abort registration.

use http::Method;
use std::collections::HashSet;

use crate::gateway::hooks::Hook;
use crate::gateway::types::{ForwardedResponse, GatewayError, GatewayResult};
use crate::pattern::{UrlPattern, VariableMap};

/// An immutable route: local pattern, remote pattern, allowed methods,
/// ordered post-processing hooks
#[derive(Debug)]
pub struct RouteBinding {
    local: UrlPattern,
    remote: UrlPattern,
    methods: Vec<Method>,
    hooks: Vec<Hook>,
}

impl RouteBinding {
    pub fn local(&self) -> &UrlPattern {
        &self.local
    }

    pub fn remote(&self) -> &UrlPattern {
        &self.remote
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Fold the registered hooks over the response, in registration order.
    pub fn post_process(
        &self,
        response: ForwardedResponse,
        variables: &VariableMap,
    ) -> ForwardedResponse {
        self.hooks
            .iter()
            .fold(response, |response, hook| hook.apply(response, variables))
    }
}

/// Builder for a [`RouteBinding`]
///
/// The remote template defaults to the local one and the method set
/// defaults to `GET`.
pub struct Route {
    local: String,
    remote: Option<String>,
    methods: Vec<Method>,
    hooks: Vec<Hook>,
}

impl Route {
    /// Start a route forwarding requests matching `local_template`.
    pub fn forward(local_template: impl Into<String>) -> Self {
        Self {
            local: local_template.into(),
            remote: None,
            methods: Vec::new(),
            hooks: Vec::new(),
        }
    }

    /// Use a different remote template (same variable names, possibly
    /// different positions).
    pub fn to(mut self, remote_template: impl Into<String>) -> Self {
        self.remote = Some(remote_template.into());
        self
    }

    /// Allow an additional method. Unset, the route accepts `GET` only.
    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Append a post-processing hook (applied in registration order).
    pub fn hook(mut self, hook: Hook) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Compile both templates and freeze the binding.
    ///
    /// Rejects a remote pattern with a path variable the local pattern
    /// never declares: such a route could never render. A remote path
    /// variable bound to a local query variable is allowed, since query
    /// variables are optional per-request.
    pub fn build(self) -> GatewayResult<RouteBinding> {
        let local = UrlPattern::compile(&self.local)?;
        let remote = match &self.remote {
            Some(template) => UrlPattern::compile(template)?,
            None => local.clone(),
        };

        let declared: HashSet<&str> = local
            .path_variable_names()
            .chain(local.query_variable_names())
            .map(|name| name.as_ref())
            .collect();
        for name in remote.path_variable_names() {
            if !declared.contains(name.as_ref()) {
                return Err(GatewayError::UnboundRemoteVariable {
                    local: self.local.clone(),
                    variable: name.to_string(),
                });
            }
        }

        let methods = if self.methods.is_empty() {
            vec![Method::GET]
        } else {
            self.methods
        };

        Ok(RouteBinding {
            local,
            remote,
            methods,
            hooks: self.hooks,
        })
    }
}
