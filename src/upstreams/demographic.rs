//! Route table for the demographic backend
//!
//! Re-exposes the versioned patient API (VERSIONED_PARTY): patient
//! versions, revision history, contributions, and the patient-to-EHR
//! association.

use http::Method;

use crate::gateway::route::{Route, RouteBinding};
use crate::gateway::types::GatewayResult;

/// Build the demographic route table.
///
/// The host router needs one canonical variable name per path
/// position, so the delete route uses `versioned_object_uid` even
/// though the value it carries is the preceding version UID.
pub fn routes() -> GatewayResult<Vec<RouteBinding>> {
    Ok(vec![
        // Creates a new versioned patient and its first version.
        Route::forward("/v1/patient").method(Method::POST).build()?,
        // Lists the IDs of all the patients in the system.
        Route::forward("/v1/patient").build()?,
        // The preceding version_uid must be given in the If-Match header.
        Route::forward("/v1/patient/<versioned_object_uid>")
            .method(Method::PUT)
            .build()?,
        Route::forward("/v1/patient/<versioned_object_uid>")
            .method(Method::DELETE)
            .build()?,
        // Without version_at_time, the latest patient version.
        Route::forward("/v1/patient/<versioned_object_uid>?version_at_time=<version_at_time>")
            .build()?,
        Route::forward("/v1/versioned_patient/<versioned_object_uid>").build()?,
        Route::forward("/v1/versioned_patient/<versioned_object_uid>/revision_history").build()?,
        Route::forward("/v1/versioned_patient/<versioned_object_uid>/version/<version_uid>")
            .build()?,
        // Without version_at_time, the latest VERSION.
        Route::forward(
            "/v1/versioned_patient/<versioned_object_uid>/version?version_at_time=<version_at_time>",
        )
        .build()?,
        // The EHR identifier associated with a given patient.
        Route::forward("/v1/versioned_patient/<versioned_object_uid>/ehr").build()?,
        Route::forward("/v1/versioned_patient/<versioned_object_uid>/ehr")
            .method(Method::PUT)
            .build()?,
        Route::forward("/v1/versioned_patient/<versioned_object_uid>/contribution/<contribution_uid>")
            .build()?,
    ])
}
