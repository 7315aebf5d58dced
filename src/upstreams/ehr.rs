//! Route table for the openEHR backend
//!
//! Covers the EHR, EHR_STATUS, COMPOSITION, DIRECTORY and CONTRIBUTION
//! resources plus the query and definition (template, stored query)
//! endpoints of the openEHR REST API.

use http::Method;

use crate::gateway::route::{Route, RouteBinding};
use crate::gateway::types::GatewayResult;

/// Build the openEHR route table.
///
/// Composition routes at the same path position use the single
/// variable name `versioned_object_uid`, and retrieval by version id
/// and retrieval at a point in time share one GET route with an
/// optional `version_at_time` query parameter.
pub fn routes() -> GatewayResult<Vec<RouteBinding>> {
    let mut table = Vec::new();

    // EHR
    table.push(Route::forward("/v1/ehr").method(Method::POST).build()?);
    table.push(Route::forward("/v1/ehr/<ehr_id>").method(Method::PUT).build()?);
    table.push(Route::forward("/v1/ehr/<ehr_id>").build()?);
    table.push(
        Route::forward("/v1/ehr?subject_id=<subject_id>&subject_namespace=<subject_namespace>")
            .build()?,
    );

    // EHR_STATUS
    table.push(
        Route::forward("/v1/ehr/<ehr_id>/ehr_status?version_at_time=<version_at_time>").build()?,
    );
    table.push(Route::forward("/v1/ehr/<ehr_id>/ehr_status/<version_uid>").build()?);
    table.push(
        Route::forward("/v1/ehr/<ehr_id>/ehr_status")
            .method(Method::PUT)
            .build()?,
    );
    table.push(Route::forward("/v1/ehr/<ehr_id>/versioned_ehr_status").build()?);
    table.push(Route::forward("/v1/ehr/<ehr_id>/versioned_ehr_status/revision_history").build()?);
    table.push(
        Route::forward(
            "/v1/ehr/<ehr_id>/versioned_ehr_status/version?version_at_time=<version_at_time>",
        )
        .build()?,
    );
    table.push(Route::forward("/v1/ehr/<ehr_id>/versioned_ehr_status/version/<version_uid>").build()?);

    // COMPOSITION
    table.push(
        Route::forward("/v1/ehr/<ehr_id>/composition")
            .method(Method::POST)
            .build()?,
    );
    table.push(
        Route::forward("/v1/ehr/<ehr_id>/composition/<versioned_object_uid>")
            .method(Method::PUT)
            .build()?,
    );
    table.push(
        Route::forward("/v1/ehr/<ehr_id>/composition/<versioned_object_uid>")
            .method(Method::DELETE)
            .build()?,
    );
    // By version id, or with version_at_time by point in time.
    table.push(
        Route::forward(
            "/v1/ehr/<ehr_id>/composition/<versioned_object_uid>?version_at_time=<version_at_time>",
        )
        .build()?,
    );
    table.push(
        Route::forward("/v1/ehr/<ehr_id>/versioned_composition/<versioned_object_uid>").build()?,
    );
    table.push(
        Route::forward(
            "/v1/ehr/<ehr_id>/versioned_composition/<versioned_object_uid>/revision_history",
        )
        .build()?,
    );
    table.push(
        Route::forward(
            "/v1/ehr/<ehr_id>/versioned_composition/<versioned_object_uid>/version/<version_uid>",
        )
        .build()?,
    );
    table.push(
        Route::forward(
            "/v1/ehr/<ehr_id>/versioned_composition/<versioned_object_uid>/version?version_at_time=<version_at_time>",
        )
        .build()?,
    );

    // DIRECTORY
    table.push(
        Route::forward("/v1/ehr/<ehr_id>/directory")
            .method(Method::POST)
            .build()?,
    );
    // The preceding version_uid must be given in the If-Match header.
    table.push(
        Route::forward("/v1/ehr/<ehr_id>/directory")
            .method(Method::PUT)
            .build()?,
    );
    table.push(
        Route::forward("/v1/ehr/<ehr_id>/directory")
            .method(Method::DELETE)
            .build()?,
    );
    // With path, only the sub-FOLDER associated with that path.
    table.push(Route::forward("/v1/ehr/<ehr_id>/directory/<version_uid>?path=<path>").build()?);
    table.push(
        Route::forward("/v1/ehr/<ehr_id>/directory?version_at_time=<version_at_time>&path=<path>")
            .build()?,
    );

    // CONTRIBUTION
    table.push(
        Route::forward("/v1/ehr/<ehr_id>/contribution")
            .method(Method::POST)
            .build()?,
    );
    table.push(Route::forward("/v1/ehr/<ehr_id>/contribution/<contribution_uid>").build()?);

    // QUERY
    table.push(
        Route::forward(
            "/v1/query/aql?q=<q>&ehr_id=<ehr_id>&offset=<offset>&fetch=<fetch>&query_parameters=<query_parameters>",
        )
        .build()?,
    );
    table.push(Route::forward("/v1/query/aql").method(Method::POST).build()?);
    table.push(
        Route::forward(
            "/v1/query/<qualified_query_name>/<version>?ehr_id=<ehr_id>&offset=<offset>&fetch=<fetch>&query_parameters=<query_parameters>",
        )
        .build()?,
    );
    table.push(
        Route::forward("/v1/query/<qualified_query_name>/<version>")
            .method(Method::POST)
            .build()?,
    );

    // ADL 1.4 TEMPLATE
    table.push(
        Route::forward("/v1/definition/template/adl1.4/")
            .method(Method::POST)
            .build()?,
    );
    table.push(Route::forward("/v1/definition/template/adl1.4").build()?);
    table.push(Route::forward("/v1/definition/template/adl1.4/<template_id>").build()?);

    // ADL 2 TEMPLATE
    table.push(
        Route::forward("/v1/definition/template/adl2/?version=<version>")
            .method(Method::POST)
            .build()?,
    );
    table.push(Route::forward("/v1/definition/template/adl2").build()?);
    // Latest template version whose version has the given prefix.
    table.push(Route::forward("/v1/definition/template/adl2/<template_id>/<version_pattern>").build()?);

    // STORED QUERY
    table.push(Route::forward("/v1/definition/query/<qualified_query_name>").build()?);
    table.push(
        Route::forward("/v1/definition/query/<qualified_query_name>/<version>?type=<type>")
            .method(Method::PUT)
            .build()?,
    );
    table.push(Route::forward("/v1/definition/query/<qualified_query_name>/<version>").build()?);

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn table_compiles() {
        let routes = routes().unwrap();
        assert_eq!(routes.len(), 39);
    }

    #[test]
    fn no_path_position_carries_two_variable_names() {
        // The host router requires one name per position per path shape.
        let mut seen: HashMap<String, String> = HashMap::new();
        for route in routes().unwrap() {
            let shape = route.local().axum_path();
            let generic = shape
                .split('/')
                .map(|segment| {
                    if segment.starts_with('{') {
                        "{}"
                    } else {
                        segment
                    }
                })
                .collect::<Vec<_>>()
                .join("/");
            match seen.get(&generic) {
                Some(previous) => assert_eq!(previous, &shape),
                None => {
                    seen.insert(generic, shape);
                }
            }
        }
    }

    #[test]
    fn ad_hoc_query_binds_all_parameters() {
        let routes = routes().unwrap();
        let aql = routes
            .iter()
            .find(|route| {
                route.local().template().starts_with("/v1/query/aql?")
            })
            .unwrap();
        for key in ["q", "ehr_id", "offset", "fetch", "query_parameters"] {
            assert!(aql.local().query_variable_for_key(key).is_some());
        }
    }

    #[test]
    fn template_upload_keeps_its_trailing_slash() {
        let routes = routes().unwrap();
        let upload = routes
            .iter()
            .find(|route| route.methods() == [Method::POST] && route.local().template().contains("adl1.4"))
            .unwrap();
        assert_eq!(upload.local().axum_path(), "/v1/definition/template/adl1.4/");
    }
}
