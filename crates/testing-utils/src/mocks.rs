//! Test doubles for the capability traits of the domain crate
//!
//! All doubles are in-memory and record how they were called so tests can
//! assert on side effects (lookups, emitted events, registry bookkeeping).

use async_trait::async_trait;
use batch_job_domain::{
    CallbackKind, EventRecorder, EventType, ExecutionKey, ExecutionRegistry, KubeObject,
    ObjectKind, ObjectReader,
};
use batch_job_errors::{ControllerError, ControllerResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory object reader keyed by (kind, name)
#[derive(Debug, Clone, Default)]
pub struct FakeObjectReader {
    objects: Arc<Mutex<HashMap<(String, String), KubeObject>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    calls: Arc<Mutex<Vec<LookupCall>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupCall {
    pub kind: ObjectKind,
    pub namespace: String,
    pub name: String,
}

impl FakeObjectReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, object: KubeObject) -> Self {
        self.insert(object);
        self
    }

    pub fn insert(&self, object: KubeObject) {
        self.objects
            .lock()
            .unwrap()
            .insert((object.kind.kind.clone(), object.name.clone()), object);
    }

    /// Every lookup of `name` fails, whatever the kind
    pub fn fail_on<S: Into<String>>(self, name: S) -> Self {
        self.failing.lock().unwrap().insert(name.into());
        self
    }

    pub fn calls(&self) -> Vec<LookupCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectReader for FakeObjectReader {
    async fn get(
        &self,
        kind: &ObjectKind,
        namespace: &str,
        name: &str,
    ) -> ControllerResult<KubeObject> {
        self.calls.lock().unwrap().push(LookupCall {
            kind: kind.clone(),
            namespace: namespace.to_string(),
            name: name.to_string(),
        });

        if self.failing.lock().unwrap().contains(name) {
            return Err(ControllerError::upstream_lookup(
                kind.kind.clone(),
                name,
                "injected failure",
            ));
        }

        self.objects
            .lock()
            .unwrap()
            .get(&(kind.kind.clone(), name.to_string()))
            .cloned()
            .ok_or_else(|| ControllerError::upstream_lookup(kind.kind.clone(), name, "not found"))
    }
}

/// One emitted event; `args` is `Some` when the formatted path was used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub object_name: String,
    pub event_type: EventType,
    pub reason: String,
    pub message: String,
    pub args: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingEventRecorder {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingEventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventRecorder for RecordingEventRecorder {
    async fn event(&self, object: &KubeObject, event_type: EventType, reason: &str, message: &str) {
        self.events.lock().unwrap().push(RecordedEvent {
            object_name: object.name.clone(),
            event_type,
            reason: reason.to_string(),
            message: message.to_string(),
            args: None,
        });
    }

    async fn eventf(
        &self,
        object: &KubeObject,
        event_type: EventType,
        reason: &str,
        message_fmt: &str,
        args: &[String],
    ) {
        self.events.lock().unwrap().push(RecordedEvent {
            object_name: object.name.clone(),
            event_type,
            reason: reason.to_string(),
            message: message_fmt.to_string(),
            args: Some(args.to_vec()),
        });
    }
}

/// Arrival recorded by [`StaticRegistry`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub execution_id: String,
    pub node: String,
    pub length: usize,
    pub kind: CallbackKind,
}

/// Registry with a fixed admitted set that records every call
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    admitted: Arc<Mutex<HashSet<ExecutionKey>>>,
    arrivals: Arc<Mutex<Vec<Arrival>>>,
    has_calls: Arc<AtomicUsize>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_admitted(self, node: &str, execution_id: &str) -> Self {
        self.admitted
            .lock()
            .unwrap()
            .insert(ExecutionKey::new(node, execution_id));
        self
    }

    pub fn arrivals(&self) -> Vec<Arrival> {
        self.arrivals.lock().unwrap().clone()
    }

    pub fn has_calls(&self) -> usize {
        self.has_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutionRegistry for StaticRegistry {
    async fn has(&self, node: &str, execution_id: &str) -> bool {
        self.has_calls.fetch_add(1, Ordering::SeqCst);
        self.admitted
            .lock()
            .unwrap()
            .contains(&ExecutionKey::new(node, execution_id))
    }

    async fn report_received(
        &self,
        execution_id: &str,
        node: &str,
        length: usize,
        kind: CallbackKind,
    ) {
        self.arrivals.lock().unwrap().push(Arrival {
            execution_id: execution_id.to_string(),
            node: node.to_string(),
            length,
            kind,
        });
    }
}
