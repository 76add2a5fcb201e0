#![allow(clippy::unwrap_used)]
// RouterSession end to end against a mocked Keenetic RCI endpoint.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use keenawg_core::parser::parse_peer_config_str;
use keenawg_core::{
    CancellationToken, ConnectionConfig, CoreError, InterfaceKind, ProvisionTimings, Provisioner,
    RouteReconciler, RouterApi, RouterEndpoint, RouterSession,
};

fn ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "status": [{ "status": "message" }] }))
}

async fn connected(server: &MockServer) -> RouterSession {
    Mock::given(method("GET"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;

    let endpoint = RouterEndpoint::new(
        server.uri(),
        "admin",
        SecretString::from("hunter2".to_string()),
    );
    RouterSession::connect(ConnectionConfig::new(endpoint))
        .await
        .unwrap()
}

#[tokio::test]
async fn connect_rejects_blank_credentials_before_any_request() {
    let server = MockServer::start().await;
    let endpoint = RouterEndpoint::new(server.uri(), "", SecretString::from(String::new()));

    let err = RouterSession::connect(ConnectionConfig::new(endpoint))
        .await
        .err()
        .unwrap();

    match err {
        CoreError::Validation { errors } => assert_eq!(errors.len(), 2),
        other => panic!("expected Validation, got {other:?}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn connect_maps_rejected_login_to_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth"))
        .respond_with(
            ResponseTemplate::new(401)
                .insert_header("X-NDM-Realm", "Keenetic")
                .insert_header("X-NDM-Challenge", "abc"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let endpoint = RouterEndpoint::new(
        server.uri(),
        "admin",
        SecretString::from("wrong".to_string()),
    );
    let err = RouterSession::connect(ConnectionConfig::new(endpoint))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, CoreError::Authentication { .. }), "got: {err:?}");
}

#[tokio::test]
async fn list_wireguard_filters_other_interfaces() {
    let server = MockServer::start().await;
    let session = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/rci/show/interface"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "GigabitEthernet0": { "type": "GigabitEthernet", "link": "up" },
            "Wireguard0": {
                "type": "Wireguard",
                "description": "home",
                "link": "up",
                "connected": "yes",
                "wireguard": { "peer": [{ "public-key": "peer-a" }] }
            }
        })))
        .mount(&server)
        .await;

    let all = session.list_interfaces(InterfaceKind::Any).await.unwrap();
    let wg = session
        .list_interfaces(InterfaceKind::Wireguard)
        .await
        .unwrap();

    assert_eq!(all.len(), 2);
    assert_eq!(wg.len(), 1);
    assert_eq!(wg[0].peer_keys, ["peer-a"]);
    assert_eq!(session.web_url(), format!("{}/otherConnections", server.uri()));
}

#[tokio::test]
async fn provisions_through_rci() {
    let server = MockServer::start().await;
    let session = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/rci/show/interface"))
        .and(query_param("name", "Wireguard1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "Wireguard1", "link": "up", "connected": "yes", "state": "up"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rci/show/interface"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rci/"))
        .and(body_partial_json(json!({
            "interface": { "wireguard": { "name": "office", "filename": "office.conf" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "interface": { "wireguard": { "import": { "created": "Wireguard1" } } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rci/"))
        .and(body_partial_json(json!({
            "interface": { "Wireguard1": { "wireguard": { "asc": { "jc": "4" } } } }
        })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rci/"))
        .and(body_partial_json(json!({
            "interface": { "Wireguard1": { "ip": { "global": { "auto": true } } } }
        })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rci/"))
        .and(body_partial_json(json!({ "interface": { "Wireguard1": { "up": true } } })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rci/"))
        .and(body_partial_json(json!({ "system": { "configuration": { "save": {} } } })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let mut peer = parse_peer_config_str(
        "[Interface]\nPrivateKey = a\nAddress = 10.8.0.2/32\nJc = 4\n\
         [Peer]\nPublicKey = b\nEndpoint = h:1\nAllowedIPs = 0.0.0.0/0\n",
        "office.conf",
    )
    .unwrap();
    peer.source_name = Some("office.conf".into());

    let handle = Provisioner::new(&session)
        .with_timings(ProvisionTimings {
            settle_delay: Duration::ZERO,
            poll_interval: Duration::from_millis(10),
            ready_timeout: Duration::from_secs(2),
        })
        .run(&peer, "office", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(handle.id, "Wireguard1");
}

#[tokio::test]
async fn reads_and_replaces_interface_routes() {
    let server = MockServer::start().await;
    let session = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/rci/ip/route"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "network": "10.0.0.0", "mask": "255.0.0.0", "interface": "Wireguard0", "auto": true },
            { "host": "9.9.9.9", "interface": "Wireguard5" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rci/"))
        .and(body_partial_json(json!({
            "ip": { "route": { "no": true, "network": "10.0.0.0", "mask": "255.0.0.0" } }
        })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rci/"))
        .and(body_partial_json(json!({
            "ip": { "route": { "host": "1.1.1.1", "interface": "Wireguard0", "auto": true } }
        })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rci/"))
        .and(body_partial_json(json!({ "system": { "configuration": { "save": {} } } })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/lists/hosts.bat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1.1.1.1\n"))
        .mount(&server)
        .await;

    let reconciler = RouteReconciler::new(&session);
    let current = reconciler.current_routes("Wireguard0").await.unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].destination.to_string(), "10.0.0.0/8");

    let desired = reconciler
        .load_routes(&[keenawg_core::RouteSource::Url(format!(
            "{}/lists/hosts.bat",
            server.uri()
        ))])
        .await
        .unwrap();
    let summary = reconciler
        .replace_routes("Wireguard0", &desired)
        .await
        .unwrap();

    assert_eq!((summary.deleted, summary.added), (1, 1));
}
