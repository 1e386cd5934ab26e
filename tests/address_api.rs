//! End-to-end tests for the address service.

use campus_services::config::ServiceConfig;
use campus_services::model::FlakyDto;

mod common;

fn catalogue() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.address_service.records = vec![
        common::address(3, "Newark"),
        common::address(1, "New Brunswick"),
        common::address(2, "Camden"),
    ];
    config.address_service.flaky.failure_rate = 0.0;
    config.address_service.flaky.records = vec![FlakyDto {
        code: "F-1".into(),
        name: "lab-booking".into(),
        description: "Lab booking system".into(),
    }];
    config
}

#[tokio::test]
async fn test_lookup_found_and_not_found() {
    let (addr, shutdown) = common::start_address_service(&catalogue()).await;
    let client = common::client();

    let res = client
        .get(format!("http://{addr}/api/v1/address/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["id"], 1);
    assert_eq!(body["city"], "New Brunswick");
    assert_eq!(body["postalCode"], "08901");

    let res = client
        .get(format!("http://{addr}/api/v1/address/999"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    assert!(res.text().await.unwrap().is_empty());

    let res = client
        .get(format!("http://{addr}/api/v1/address/nolimit/2"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    shutdown.trigger();
}

#[tokio::test]
async fn test_list_keeps_configured_order() {
    let (addr, shutdown) = common::start_address_service(&catalogue()).await;

    let all: Vec<serde_json::Value> = common::client()
        .get(format!("http://{addr}/api/v1/address"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<i64> = all.iter().map(|a| a["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![3, 1, 2]);

    shutdown.trigger();
}

#[tokio::test]
async fn test_rate_limit_applies_to_standard_route_only() {
    let mut config = catalogue();
    config.address_service.rate_limit.requests_per_second = 1;
    config.address_service.rate_limit.burst_size = 2;
    let (addr, shutdown) = common::start_address_service(&config).await;
    let client = common::client();

    let mut statuses = Vec::new();
    for _ in 0..4 {
        let res = client
            .get(format!("http://{addr}/api/v1/address/1"))
            .send()
            .await
            .unwrap();
        statuses.push(res.status().as_u16());
    }
    assert_eq!(&statuses[..2], &[200, 200]);
    assert!(statuses[2..].contains(&429), "got {statuses:?}");

    for _ in 0..5 {
        let res = client
            .get(format!("http://{addr}/api/v1/address/nolimit/1"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_flaky_resources() {
    let (addr, shutdown) = common::start_address_service(&catalogue()).await;
    let client = common::client();

    let res = client
        .get(format!("http://{addr}/api/v1/flaky/F-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let dto: FlakyDto = res.json().await.unwrap();
    assert_eq!(dto.name, "lab-booking");

    let res = client
        .get(format!("http://{addr}/api/v1/flaky/F-404"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    shutdown.trigger();

    let mut always_failing = catalogue();
    always_failing.address_service.flaky.failure_rate = 1.0;
    let (addr, shutdown) = common::start_address_service(&always_failing).await;

    let res = client
        .get(format!("http://{addr}/api/v1/flaky"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 503);

    let res = client.get(format!("http://{addr}/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    shutdown.trigger();
}

#[tokio::test]
async fn test_config_updates_swap_the_catalogue() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = campus_services::Shutdown::new();
    let (updates_tx, updates) = tokio::sync::mpsc::unbounded_channel();

    let server = campus_services::AddressServer::new(&catalogue());
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, updates, rx).await;
    });
    let client = common::client();
    let url = format!("http://{addr}/api/v1/address/nolimit/9");

    assert_eq!(client.get(&url).send().await.unwrap().status(), 404);

    let mut revised = catalogue();
    revised.address_service.records.push(common::address(9, "Trenton"));
    updates_tx.send(revised).unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["city"], "Trenton");

    shutdown.trigger();
}
