//! EC2 client tests against a mock query-API endpoint serving EC2-shaped XML.

use healer_cloud::{CloudProviderError, ComputeProvider, Ec2, InstanceState};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INSTANCE_ID: &str = "i-0abc123def4567890";

async fn provider(server: &MockServer) -> Ec2 {
    Ec2::new("us-east-1").unwrap().with_endpoint(server.uri())
}

fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/xml;charset=UTF-8")
}

fn status_body(state: &str, code: u16) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<DescribeInstanceStatusResponse xmlns="http://ec2.amazonaws.com/doc/2016-11-15/">
    <requestId>8f7724cf-496f-496e-8fe3-example</requestId>
    <instanceStatusSet>
        <item>
            <instanceId>{INSTANCE_ID}</instanceId>
            <availabilityZone>us-east-1a</availabilityZone>
            <instanceState>
                <code>{code}</code>
                <name>{state}</name>
            </instanceState>
            <systemStatus>
                <status>ok</status>
                <details><item><name>reachability</name><status>passed</status></item></details>
            </systemStatus>
            <instanceStatus>
                <status>impaired</status>
            </instanceStatus>
        </item>
    </instanceStatusSet>
</DescribeInstanceStatusResponse>"#
    )
}

fn reboot_body(accepted: bool) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<RebootInstancesResponse xmlns="http://ec2.amazonaws.com/doc/2016-11-15/">
    <requestId>59dbff89-35bd-4eac-99ed-be587example</requestId>
    <return>{accepted}</return>
</RebootInstancesResponse>"#
    )
}

#[tokio::test]
async fn test_instance_state_maps_provider_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("Action", "DescribeInstanceStatus"))
        .and(query_param("InstanceId.1", INSTANCE_ID))
        .respond_with(xml(status_body("shutting-down", 32)))
        .expect(1)
        .mount(&server)
        .await;

    let state = provider(&server).await.instance_state(INSTANCE_ID).await.unwrap();
    assert_eq!(state, InstanceState::ShuttingDown);
}

#[tokio::test]
async fn test_running_instance() {
    let server = MockServer::start().await;
    Mock::given(query_param("Action", "DescribeInstanceStatus"))
        .respond_with(xml(status_body("running", 16)))
        .mount(&server)
        .await;

    let state = provider(&server).await.instance_state(INSTANCE_ID).await.unwrap();
    assert_eq!(state, InstanceState::Running);
}

#[tokio::test]
async fn test_missing_status_record_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(query_param("Action", "DescribeInstanceStatus"))
        .respond_with(xml(
            r#"<DescribeInstanceStatusResponse xmlns="http://ec2.amazonaws.com/doc/2016-11-15/">
    <requestId>req-2</requestId>
    <instanceStatusSet/>
</DescribeInstanceStatusResponse>"#
                .to_string(),
        ))
        .mount(&server)
        .await;

    let state = provider(&server).await.instance_state(INSTANCE_ID).await.unwrap();
    assert_eq!(state, InstanceState::Unknown);
}

#[tokio::test]
async fn test_unparseable_body_is_serialization_error() {
    let server = MockServer::start().await;
    Mock::given(query_param("Action", "DescribeInstanceStatus"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .await
        .instance_state(INSTANCE_ID)
        .await
        .unwrap_err();
    assert!(matches!(err, CloudProviderError::Serialization(_)));
}

#[tokio::test]
async fn test_status_server_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(query_param("Action", "DescribeInstanceStatus"))
        .respond_with(ResponseTemplate::new(503).set_body_string("throttled"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .await
        .instance_state(INSTANCE_ID)
        .await
        .unwrap_err();
    assert!(matches!(err, CloudProviderError::Api { status: 503, .. }));
}

#[tokio::test]
async fn test_reboot_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("Action", "RebootInstances"))
        .and(query_param("InstanceId.1", INSTANCE_ID))
        .respond_with(xml(reboot_body(true)))
        .expect(1)
        .mount(&server)
        .await;

    provider(&server)
        .await
        .reboot_instance(INSTANCE_ID)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reboot_returning_false_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(query_param("Action", "RebootInstances"))
        .respond_with(xml(reboot_body(false)))
        .mount(&server)
        .await;

    let err = provider(&server)
        .await
        .reboot_instance(INSTANCE_ID)
        .await
        .unwrap_err();
    assert!(matches!(err, CloudProviderError::Api { .. }));
}

#[tokio::test]
async fn test_reboot_forbidden_carries_ec2_error_code() {
    let server = MockServer::start().await;
    Mock::given(query_param("Action", "RebootInstances"))
        .respond_with(ResponseTemplate::new(403).set_body_raw(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Response><Errors><Error><Code>UnauthorizedOperation</Code><Message>You are not authorized to perform this operation.</Message></Error></Errors><RequestID>req-5</RequestID></Response>"#,
            "text/xml;charset=UTF-8",
        ))
        .mount(&server)
        .await;

    let err = provider(&server)
        .await
        .reboot_instance(INSTANCE_ID)
        .await
        .unwrap_err();
    match err {
        CloudProviderError::Auth(message) => {
            assert!(message.starts_with("UnauthorizedOperation: "), "{message}");
        }
        other => panic!("expected auth error, got {other:?}"),
    }
}
