//! Route table for the provenance backend

use crate::gateway::hooks::Hook;
use crate::gateway::route::{Route, RouteBinding};
use crate::gateway::types::GatewayResult;

/// Build the provenance route table.
pub fn routes() -> GatewayResult<Vec<RouteBinding>> {
    Ok(vec![
        // Gets the provenance of a resource.
        Route::forward("/provenance/service?target=<target>")
            .hook(Hook::variable_aware(|response, variables| {
                tracing::info!(
                    target = variables.get("target").unwrap_or("<all>"),
                    status = %response.status,
                    "provenance lookup"
                );
                response
            }))
            .build()?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn table_compiles() {
        let routes = routes().unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].methods(), &[Method::GET]);
        assert!(routes[0].local().query_variable_for_key("target").is_some());
    }
}
