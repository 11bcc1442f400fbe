use std::time::Duration;
use tenancy_core::config::{ChannelConfig, DEFAULT_SHUTDOWN_GRACE};
use tenancy_core::grpc::channel::{ChannelError, ManagedChannel, Teardown, Terminate, release, scoped};
use tenancy_core::grpc::client::TenancyGrpcClient;
use tenancy_core::pb::TenantCreateRequest;
use tenancy_stub::{StubTenancy, TenancyServer};
use tonic::Code;

fn create_request(id: &str) -> TenantCreateRequest {
    TenantCreateRequest {
        id: id.to_string(),
        name: "tenant id name".to_string(),
    }
}

#[tokio::test]
async fn test_calls_pass_through_and_release_is_graceful() {
    let stub = StubTenancy::new();
    let channel = ManagedChannel::new(TenancyServer::new(stub.clone()));

    let (result, teardown) = scoped(channel.clone(), DEFAULT_SHUTDOWN_GRACE, |channel| async move {
        TenancyGrpcClient::new(channel).create(create_request("t1")).await
    })
    .await;

    assert_eq!(result.unwrap().tenant.unwrap().id, "t1");
    assert_eq!(teardown, Teardown::Graceful);
    assert!(channel.is_terminated());
    assert_eq!(channel.in_flight(), 0);
}

#[tokio::test]
async fn test_shut_down_channel_rejects_new_calls() {
    let stub = StubTenancy::new();
    let channel = ManagedChannel::new(TenancyServer::new(stub.clone()));
    let mut client = TenancyGrpcClient::new(channel.clone());

    channel.shutdown();

    let err = client.create(create_request("t1")).await.unwrap_err();
    let status = err.status().unwrap();

    assert_eq!(status.code(), Code::Unknown);
    assert!(status.message().contains("shut down"));
    assert!(stub.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_release_forces_shutdown_of_hanging_call() {
    let stub = StubTenancy::hanging();
    let channel = ManagedChannel::new(TenancyServer::new(stub.clone()));

    let mut client = TenancyGrpcClient::new(channel.clone());
    let call = tokio::spawn(async move { client.create(create_request("t1")).await });

    stub.wait_for_calls(1).await;
    assert_eq!(channel.in_flight(), 1);

    let started = tokio::time::Instant::now();
    let teardown = release(&channel, Duration::from_secs(5)).await;

    assert_eq!(teardown, Teardown::Forced);
    assert!(started.elapsed() >= Duration::from_secs(5));

    let err = call.await.unwrap().unwrap_err();
    let status = err.status().unwrap();
    assert_eq!(status.code(), Code::Unknown);
    assert!(status.message().contains("aborted"));

    assert!(channel.is_terminated());
}

#[tokio::test]
async fn test_unreachable_server_errors_and_channel_is_still_released() {
    // Reserve a port, then free it so nothing listens there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ChannelConfig::default().with_connect_timeout(Duration::from_secs(1));
    let channel = ManagedChannel::connect_lazy(&format!("http://{addr}"), &config).unwrap();

    let started = std::time::Instant::now();
    let (result, teardown) = scoped(channel.clone(), DEFAULT_SHUTDOWN_GRACE, |channel| async move {
        TenancyGrpcClient::new(channel).create(create_request("t1")).await
    })
    .await;

    assert!(result.is_err());
    assert_eq!(teardown, Teardown::Graceful);
    assert!(channel.is_terminated());
    assert!(started.elapsed() < DEFAULT_SHUTDOWN_GRACE);
}

#[test]
fn test_connect_lazy_rejects_invalid_endpoint() {
    let err = ManagedChannel::connect_lazy("http://exa mple.com", &ChannelConfig::default())
        .unwrap_err();

    assert!(matches!(err, ChannelError::InvalidEndpoint(..)));
}
