use std::sync::Arc;

use batch_job_domain::{ObjectKind, ObjectReader, OwnerResolver};
use batch_job_testing_utils::{FakeObjectReader, ObjectBuilder};

const NS: &str = "test-ns";

fn resolver(reader: &FakeObjectReader) -> OwnerResolver {
    let reader: Arc<dyn ObjectReader> = Arc::new(reader.clone());
    OwnerResolver::new(reader)
}

#[tokio::test]
async fn test_object_without_owner_is_its_own_root() {
    let reader = FakeObjectReader::new().with_object(ObjectBuilder::pod("standalone").build());

    let root = resolver(&reader)
        .resolve(&ObjectKind::pod(), NS, "standalone")
        .await
        .expect("pod itself is the root");

    assert_eq!(root.name, "standalone");
    assert_eq!(root.kind, ObjectKind::pod());
}

#[tokio::test]
async fn test_follows_chain_to_root() {
    let reader = FakeObjectReader::new()
        .with_object(
            ObjectBuilder::pod("controller-abc")
                .owned_by("apps/v1", "ReplicaSet", "rs-1")
                .build(),
        )
        .with_object(
            ObjectBuilder::new(ObjectKind::new("apps/v1", "ReplicaSet"), "rs-1")
                .owned_by("apps/v1", "Deployment", "deployment-1")
                .build(),
        )
        .with_object(
            ObjectBuilder::new(ObjectKind::new("apps/v1", "Deployment"), "deployment-1").build(),
        );

    let chain = resolver(&reader)
        .resolve_chain(&ObjectKind::pod(), NS, "controller-abc")
        .await;

    let root = chain.root.expect("deployment is the root");
    assert_eq!(root.kind.kind, "Deployment");
    assert_eq!(root.name, "deployment-1");
    let names: Vec<&str> = chain.links.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["controller-abc", "rs-1", "deployment-1"]);

    let calls = reader.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|c| c.namespace == NS));
    assert_eq!(calls[1].kind, ObjectKind::new("apps/v1", "ReplicaSet"));
}

#[tokio::test]
async fn test_only_first_owner_reference_is_followed() {
    let reader = FakeObjectReader::new()
        .with_object(
            ObjectBuilder::pod("p")
                .owned_by("batch/v1", "Job", "job-1")
                .owned_by("apps/v1", "ReplicaSet", "rs-ignored")
                .build(),
        )
        .with_object(ObjectBuilder::new(ObjectKind::new("batch/v1", "Job"), "job-1").build());

    let root = resolver(&reader)
        .resolve(&ObjectKind::pod(), NS, "p")
        .await
        .unwrap();

    assert_eq!(root.name, "job-1");
    assert!(reader.calls().iter().all(|c| c.name != "rs-ignored"));
}

#[tokio::test]
async fn test_lookup_failure_at_start_yields_no_owner() {
    let reader = FakeObjectReader::new().fail_on("missing-pod");

    let root = resolver(&reader)
        .resolve(&ObjectKind::pod(), NS, "missing-pod")
        .await;

    assert!(root.is_none());
    assert_eq!(reader.call_count(), 1);
}

#[tokio::test]
async fn test_lookup_failure_mid_chain_yields_no_owner() {
    let reader = FakeObjectReader::new()
        .with_object(
            ObjectBuilder::pod("p")
                .owned_by("apps/v1", "ReplicaSet", "rs-1")
                .build(),
        )
        .fail_on("rs-1");

    let chain = resolver(&reader)
        .resolve_chain(&ObjectKind::pod(), NS, "p")
        .await;

    assert!(chain.root.is_none());
    assert_eq!(chain.len(), 2);
}

#[tokio::test]
async fn test_cycle_terminates_without_owner() {
    let reader = FakeObjectReader::new()
        .with_object(
            ObjectBuilder::new(ObjectKind::new("example.io/v1", "Widget"), "a")
                .owned_by("example.io/v1", "Widget", "b")
                .build(),
        )
        .with_object(
            ObjectBuilder::new(ObjectKind::new("example.io/v1", "Widget"), "b")
                .owned_by("example.io/v1", "Widget", "a")
                .build(),
        );

    let chain = resolver(&reader)
        .resolve_chain(&ObjectKind::new("example.io/v1", "Widget"), NS, "a")
        .await;

    assert!(chain.root.is_none());
    assert_eq!(chain.len(), 2);
    assert_eq!(reader.call_count(), 2);
}

#[tokio::test]
async fn test_max_hops_bounds_long_chains() {
    let kind = ObjectKind::new("example.io/v1", "Widget");
    let reader = FakeObjectReader::new();
    for i in 0..10 {
        reader.insert(
            ObjectBuilder::new(kind.clone(), &format!("w{i}"))
                .owned_by("example.io/v1", "Widget", &format!("w{}", i + 1))
                .build(),
        );
    }

    let chain = resolver(&reader)
        .with_max_hops(4)
        .resolve_chain(&kind, NS, "w0")
        .await;

    assert!(chain.root.is_none());
    assert_eq!(chain.len(), 4);
}

#[tokio::test]
async fn test_resolve_pod_owner_uses_pod_kind() {
    let reader = FakeObjectReader::new().with_object(ObjectBuilder::pod("self").build());

    let owner = resolver(&reader).resolve_pod_owner(NS, "self").await;

    assert_eq!(owner.map(|o| o.name), Some("self".to_string()));
    assert_eq!(reader.calls()[0].kind, ObjectKind::pod());
}
