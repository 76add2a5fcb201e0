#![allow(clippy::unwrap_used)]
// Route reconciler against the in-memory router.

mod common;

use std::collections::HashMap;
use std::path::PathBuf;

use ipnet::IpNet;
use pretty_assertions::assert_eq;

use keenawg_core::{
    CoreError, RouteOrigin, RouteReconciler, RouteRecord, RouteSet, RouteSource, Step,
    load_route_files,
};

use common::{Call, MockRouter};

fn net(s: &str) -> IpNet {
    s.parse().unwrap()
}

fn router_route(dest: &str) -> RouteRecord {
    RouteRecord::new(net(dest), RouteOrigin::Router).bound_to("Wireguard0")
}

fn desired(dests: &[&str]) -> RouteSet {
    dests
        .iter()
        .map(|d| RouteRecord::new(net(d), RouteOrigin::Url("https://lists.example/a".into())))
        .collect()
}

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

// ── Replace ─────────────────────────────────────────────────────────

#[tokio::test]
async fn replace_deletes_all_then_adds_all() {
    let router = MockRouter {
        routes: vec![
            router_route("10.0.0.0/8"),
            router_route("172.16.0.0/12"),
            router_route("1.1.1.1/32"),
        ],
        ..MockRouter::default()
    };

    let summary = RouteReconciler::new(&router)
        .replace_routes("Wireguard0", &desired(&["8.8.8.0/24", "9.9.9.9/32"]))
        .await
        .unwrap();

    assert_eq!((summary.deleted, summary.added), (3, 2));
    assert_eq!(
        router.calls(),
        vec![
            Call::GetRoutes("Wireguard0".into()),
            Call::DeleteRoute(net("10.0.0.0/8")),
            Call::DeleteRoute(net("172.16.0.0/12")),
            Call::DeleteRoute(net("1.1.1.1/32")),
            Call::AddRoute("Wireguard0".into(), net("8.8.8.0/24")),
            Call::AddRoute("Wireguard0".into(), net("9.9.9.9/32")),
            Call::Save,
        ]
    );
}

#[tokio::test]
async fn failed_delete_stops_before_any_add() {
    let router = MockRouter {
        routes: vec![
            router_route("10.0.0.0/8"),
            router_route("172.16.0.0/12"),
            router_route("1.1.1.1/32"),
        ],
        fail_delete_at: Some(1),
        ..MockRouter::default()
    };

    let err = RouteReconciler::new(&router)
        .replace_routes("Wireguard0", &desired(&["8.8.8.0/24"]))
        .await
        .unwrap_err();

    match err {
        CoreError::RemoteCall { step, message, .. } => {
            assert_eq!(step, Step::DeleteRoute);
            assert!(message.contains("172.16.0.0/12"), "got: {message}");
        }
        other => panic!("expected RemoteCall, got {other:?}"),
    }
    assert_eq!(router.count(|c| matches!(c, Call::DeleteRoute(_))), 2);
    assert_eq!(router.count(|c| matches!(c, Call::AddRoute(..))), 0);
    assert_eq!(router.count(|c| matches!(c, Call::Save)), 0);
}

#[tokio::test]
async fn ipv6_destinations_are_rejected_before_touching_the_router() {
    let router = MockRouter {
        routes: vec![router_route("10.0.0.0/8")],
        ..MockRouter::default()
    };

    let err = RouteReconciler::new(&router)
        .replace_routes("Wireguard0", &desired(&["8.8.8.0/24", "2001:db8::/32"]))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Validation { ref errors } if errors.len() == 1));
    assert!(router.calls().is_empty());
}

#[tokio::test]
async fn clear_deletes_and_saves() {
    let router = MockRouter {
        routes: vec![router_route("10.0.0.0/8"), router_route("1.1.1.1/32")],
        ..MockRouter::default()
    };

    let deleted = RouteReconciler::new(&router)
        .clear_routes("Wireguard0")
        .await
        .unwrap();

    assert_eq!(deleted, 2);
    assert_eq!(router.calls().last(), Some(&Call::Save));
    assert_eq!(router.count(|c| matches!(c, Call::AddRoute(..))), 0);
}

// ── Load ────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_merges_sources_with_later_source_winning() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_file(&dir, "first.bat", "10.0.0.0/8\n172.16.0.0/12\n");
    let url = "https://lists.example/second.bat".to_owned();
    let router = MockRouter {
        texts: HashMap::from([(url.clone(), "10.0.0.0/8 gw=10.8.0.1\n1.1.1.1\n".to_owned())]),
        ..MockRouter::default()
    };

    let set = RouteReconciler::new(&router)
        .load_routes(&[RouteSource::File(first), RouteSource::Url(url.clone())])
        .await
        .unwrap();

    let order: Vec<String> = set.iter().map(|r| r.destination.to_string()).collect();
    assert_eq!(order, ["10.0.0.0/8", "172.16.0.0/12", "1.1.1.1/32"]);

    let merged = set.get(&net("10.0.0.0/8")).unwrap();
    assert_eq!(merged.origin, RouteOrigin::Url(url));
    assert_eq!(merged.gateway, Some("10.8.0.1".parse().unwrap()));
}

#[tokio::test]
async fn malformed_line_fails_the_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "routes.bat",
        "10.0.0.0/24\n# comment\nbad-line\n192.168.0.0/16 gw=10.0.0.1\n",
    );
    let router = MockRouter::default();

    let err = RouteReconciler::new(&router)
        .load_routes(&[RouteSource::File(path)])
        .await
        .unwrap_err();

    match err {
        CoreError::RouteSource { origin, reason } => {
            assert!(origin.ends_with("routes.bat"));
            assert!(reason.contains("line 3"), "got: {reason}");
        }
        other => panic!("expected RouteSource, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_url_fails_the_load() {
    let router = MockRouter::default();

    let err = RouteReconciler::new(&router)
        .load_routes(&[RouteSource::Url("https://lists.example/gone.bat".into())])
        .await
        .unwrap_err();

    assert!(
        matches!(err, CoreError::RouteSource { ref reason, .. } if reason.contains("404")),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn missing_file_fails_the_load() {
    let router = MockRouter::default();

    let err = RouteReconciler::new(&router)
        .load_routes(&[RouteSource::File("/nonexistent/routes.bat".into())])
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::RouteSource { .. }));
    assert!(router.calls().is_empty());
}

#[tokio::test]
async fn local_files_load_without_a_router() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_file(&dir, "a.bat", "route ADD 10.0.0.0 MASK 255.0.0.0 0.0.0.0\n");
    let b = write_file(&dir, "b.bat", "10.0.0.0/8 via 10.8.0.1\n8.8.8.8\n");

    let set = load_route_files(&[a, b.clone()]).await.unwrap();

    assert_eq!(set.len(), 2);
    assert_eq!(set.get(&net("10.0.0.0/8")).unwrap().origin, RouteOrigin::File(b));
}
