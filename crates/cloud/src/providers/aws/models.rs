//! EC2 query-API response models.
//!
//! The query API answers in XML. Element names are camelCase for successful
//! responses and PascalCase inside error documents.

use serde::Deserialize;

/// EC2 API version used for every request.
pub const EC2_API_VERSION: &str = "2016-11-15";

/// `<DescribeInstanceStatusResponse>`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeInstanceStatusResponse {
    /// Request ID.
    pub request_id: Option<String>,
    /// One `<item>` per instance that has a status record.
    #[serde(default)]
    pub instance_status_set: InstanceStatusSet,
}

/// `<instanceStatusSet>`; empty when EC2 has no record for the instance.
#[derive(Debug, Default, Deserialize)]
pub struct InstanceStatusSet {
    #[serde(rename = "item", default)]
    pub items: Vec<InstanceStatusItem>,
}

/// Status record for a single instance.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceStatusItem {
    /// Instance ID.
    pub instance_id: String,
    /// Availability zone.
    pub availability_zone: Option<String>,
    /// Instance state.
    pub instance_state: InstanceStateModel,
}

/// `<instanceState>`.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceStateModel {
    /// State code.
    pub code: i32,
    /// State name.
    pub name: String,
}

/// `<RebootInstancesResponse>`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebootInstancesResponse {
    /// Request ID.
    pub request_id: Option<String>,
    /// `false` when EC2 accepted the call but did not act on it.
    #[serde(rename = "return")]
    pub accepted: Option<bool>,
}

/// `<Response><Errors><Error>..</Error></Errors></Response>`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: ErrorList,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorList {
    #[serde(rename = "Error", default)]
    pub errors: Vec<ApiError>,
}

/// One EC2 error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiError {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl ErrorResponse {
    /// `Code: Message` of the first error, if the body is an EC2 error document.
    #[must_use]
    pub fn parse(body: &str) -> Option<String> {
        let response: Self = quick_xml::de::from_str(body).ok()?;
        response
            .errors
            .errors
            .first()
            .map(|e| format!("{}: {}", e.code, e.message))
    }
}
