use super::fixtures::{self, create_cache, Entry};
use imagekit_dnfcache::RepoCache;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing::{field::Visit, Event};
use tracing_subscriber::{layer::Context, prelude::*, Layer};

#[derive(Clone)]
struct CapturingLayer {
    events: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl<S> Layer<S> for CapturingLayer
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events
            .lock()
            .expect("events mutex poisoned")
            .push(visitor.fields);
    }
}

#[derive(Default)]
struct FieldVisitor {
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }
}

#[test]
fn eviction_is_logged_with_repo_id() {
    let tmp = TempDir::new().unwrap();
    create_cache(
        tmp.path(),
        &[Entry {
            path: format!("{}.solv", fixtures::FAKE_1),
            size: 4096,
            mtime: 10,
        }],
    );

    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(CapturingLayer {
        events: events.clone(),
    });
    let _guard = tracing::subscriber::set_default(subscriber);

    let mut cache = RepoCache::new(tmp.path(), 1).unwrap();
    cache.shrink().unwrap();

    let events = events.lock().expect("events mutex poisoned");
    let evicted: Vec<_> = events
        .iter()
        .filter(|fields| {
            fields.get("message").map(String::as_str) == Some("evicted cached repository")
        })
        .collect();
    assert_eq!(evicted.len(), 1, "events={events:?}");
    assert_eq!(evicted[0]["repo_id"], fixtures::FAKE_1);
    assert_eq!(evicted[0]["target"], "imagekit.dnfcache");
}
