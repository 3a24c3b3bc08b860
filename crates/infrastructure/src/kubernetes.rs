use async_trait::async_trait;
use batch_job_domain::{EventRecorder, EventType, KubeObject, ObjectKind, ObjectReader, OwnerReference};
use batch_job_errors::{ControllerError, ControllerResult};
use k8s_openapi::api::core::v1::ObjectReference;
use kube::api::{Api, ApiResource, DynamicObject};
use kube::core::{GroupVersion, GroupVersionKind};
use kube::runtime::events::{Event, EventType as KubeEventType, Recorder, Reporter};
use kube::Client;
use tracing::{debug, warn};

/// 通过动态 API 读取任意类型的集群对象
#[derive(Clone)]
pub struct KubeObjectReader {
    client: Client,
}

impl KubeObjectReader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api_for(&self, kind: &ObjectKind, namespace: &str) -> ControllerResult<Api<DynamicObject>> {
        let gv: GroupVersion = kind.api_version.parse().map_err(|e| {
            ControllerError::Kubernetes(format!("invalid apiVersion {:?}: {}", kind.api_version, e))
        })?;
        let gvk = GroupVersionKind::gvk(&gv.group, &gv.version, &kind.kind);
        let resource = ApiResource::from_gvk(&gvk);
        Ok(Api::namespaced_with(self.client.clone(), namespace, &resource))
    }
}

#[async_trait]
impl ObjectReader for KubeObjectReader {
    async fn get(
        &self,
        kind: &ObjectKind,
        namespace: &str,
        name: &str,
    ) -> ControllerResult<KubeObject> {
        let api = self.api_for(kind, namespace)?;
        debug!(kind = %kind, namespace = %namespace, name = %name, "fetching object");
        let object = api
            .get(name)
            .await
            .map_err(|e| ControllerError::upstream_lookup(kind.kind.clone(), name, e))?;
        Ok(to_kube_object(kind, object))
    }
}

fn to_kube_object(kind: &ObjectKind, object: DynamicObject) -> KubeObject {
    let meta = object.metadata;
    let owner_references = meta
        .owner_references
        .unwrap_or_default()
        .into_iter()
        .map(|o| OwnerReference::new(o.api_version, o.kind, o.name))
        .collect();

    KubeObject {
        kind: kind.clone(),
        name: meta.name.unwrap_or_default(),
        namespace: meta.namespace,
        uid: meta.uid,
        owner_references,
        attributes: object.data,
    }
}

/// 把事件写到 Kubernetes events API
///
/// 发布失败只记录日志，调用方不感知。
#[derive(Clone)]
pub struct KubeEventRecorder {
    recorder: Recorder,
}

impl KubeEventRecorder {
    pub fn new<S: Into<String>>(client: Client, controller: S, instance: Option<String>) -> Self {
        let reporter = Reporter {
            controller: controller.into(),
            instance,
        };
        Self {
            recorder: Recorder::new(client, reporter),
        }
    }
}

fn object_reference(object: &KubeObject) -> ObjectReference {
    ObjectReference {
        api_version: Some(object.kind.api_version.clone()),
        kind: Some(object.kind.kind.clone()),
        name: Some(object.name.clone()),
        namespace: object.namespace.clone(),
        uid: object.uid.clone(),
        ..ObjectReference::default()
    }
}

#[async_trait]
impl EventRecorder for KubeEventRecorder {
    async fn event(&self, object: &KubeObject, event_type: EventType, reason: &str, message: &str) {
        let event = Event {
            type_: match event_type {
                EventType::Normal => KubeEventType::Normal,
                EventType::Warning => KubeEventType::Warning,
            },
            reason: reason.to_string(),
            note: Some(message.to_string()),
            action: reason.to_string(),
            secondary: None,
        };
        if let Err(e) = self.recorder.publish(&event, &object_reference(object)).await {
            warn!(
                object = %object.name,
                reason = %reason,
                error = %e,
                "error publishing event"
            );
        }
    }
}
