//! Polling sweeps over all subscriptions

use crate::cache::DocumentCache;
use crate::fetch::DocumentSource;
use crate::link;
use crate::subscription::{Subscription, SubscriptionList, ValueStore, WatchTarget};
use anyhow::Result;
use cellwatch_core::{Document, ExtractLimits, SheetError, read_range};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Read the current text of a target from raw markup
pub fn read_target(
    raw: &str,
    target: &WatchTarget,
    limits: &ExtractLimits,
) -> cellwatch_core::Result<String> {
    let doc = Document::parse(raw)?;
    read_range(&doc, target.tab_id.as_deref(), &target.range, limits)
}

/// A watched range whose text differs from the last sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub name: String,
    pub target: WatchTarget,
    pub old: String,
    pub new: String,
}

impl Change {
    pub fn message(&self) -> String {
        format!(
            "The cell {} ({}) has changed!\n'{}' -> '{}'",
            self.name,
            link::edit_url(&self.target),
            self.old,
            self.new
        )
    }
}

/// A subscription that could not be read during a sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub name: String,
    pub error: SheetError,
}

/// Outcome of one sweep
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub checked: usize,
    pub changes: Vec<Change>,
    pub failures: Vec<Failure>,
}

/// Delivery of change notifications
pub trait Notifier {
    fn notify(&self, change: &Change) -> Result<()>;
}

/// Walks all subscriptions, fetching each document once per cycle
pub struct Monitor<S: DocumentSource, V: ValueStore> {
    source: S,
    store: V,
    cache: DocumentCache,
    limits: ExtractLimits,
    poll_interval: Duration,
}

impl<S: DocumentSource, V: ValueStore> Monitor<S, V> {
    pub fn new(source: S, store: V) -> Self {
        Self {
            source,
            store,
            cache: DocumentCache::new(),
            limits: ExtractLimits::default(),
            poll_interval: Duration::from_secs(30),
        }
    }

    pub fn with_limits(mut self, limits: ExtractLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn store(&self) -> &V {
        &self.store
    }

    /// Add `subscription` to `list`, dropping any value stored under its name
    /// so the next sweep starts from a fresh observation.
    pub fn subscribe(
        &mut self,
        list: &mut SubscriptionList,
        subscription: Subscription,
    ) -> Result<()> {
        let name = subscription.name.trim().to_string();
        list.add(subscription)?;
        self.store.forget(&name);
        Ok(())
    }

    /// Check every subscription once and record new values.
    ///
    /// Documents that cannot be fetched fail only the subscriptions
    /// referencing them; each fetched document is parsed once.
    pub fn sweep(&mut self, subscriptions: &SubscriptionList) -> SweepReport {
        self.cache.clear();
        let mut report = SweepReport::default();

        let mut by_document: BTreeMap<&str, Vec<&Subscription>> = BTreeMap::new();
        for sub in subscriptions.iter() {
            by_document
                .entry(sub.target.document_id.as_str())
                .or_default()
                .push(sub);
        }

        let mut fetched: Vec<(Arc<str>, Vec<&Subscription>)> = Vec::new();
        for (document_id, subs) in by_document {
            match self.cache.get_or_fetch(&self.source, document_id) {
                Ok(raw) => fetched.push((raw, subs)),
                Err(error) => {
                    warn!("{}", error);
                    report.failures.extend(subs.into_iter().map(|sub| Failure {
                        name: sub.name.clone(),
                        error: error.clone(),
                    }));
                }
            }
        }

        let limits = self.limits;
        let results: Vec<(&Subscription, cellwatch_core::Result<String>)> = fetched
            .par_iter()
            .flat_map_iter(|(raw, subs)| read_group(raw, subs, &limits))
            .collect();

        for (sub, result) in results {
            report.checked += 1;
            match result {
                Ok(value) => {
                    let old = self.store.update(&sub.name, &value);
                    if old != value {
                        debug!("{} changed", sub.name);
                        report.changes.push(Change {
                            name: sub.name.clone(),
                            target: sub.target.clone(),
                            old,
                            new: value,
                        });
                    }
                }
                Err(error) => {
                    warn!("{}: {}", sub.name, error);
                    report.failures.push(Failure {
                        name: sub.name.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            "Sweep done: {} checked, {} changed, {} failed",
            report.checked,
            report.changes.len(),
            report.failures.len()
        );
        report
    }

    /// Sweep repeatedly, notifying every change; stops after `cycles` sweeps when given
    pub fn run(
        &mut self,
        subscriptions: &SubscriptionList,
        notifier: &dyn Notifier,
        cycles: Option<usize>,
    ) -> Result<()> {
        let mut done = 0usize;
        loop {
            let report = self.sweep(subscriptions);
            for change in &report.changes {
                if let Err(e) = notifier.notify(change) {
                    warn!("Could not deliver change of {}: {:#}", change.name, e);
                }
            }

            done += 1;
            if cycles.is_some_and(|limit| done >= limit) {
                return Ok(());
            }
            std::thread::sleep(self.poll_interval);
        }
    }
}

/// Parse one document and read every subscription referencing it
fn read_group<'a>(
    raw: &str,
    subs: &[&'a Subscription],
    limits: &ExtractLimits,
) -> Vec<(&'a Subscription, cellwatch_core::Result<String>)> {
    let doc = match Document::parse(raw) {
        Ok(doc) => doc,
        Err(error) => {
            return subs.iter().map(|sub| (*sub, Err(error.clone()))).collect();
        }
    };
    subs.iter()
        .map(|sub| {
            let value = read_range(&doc, sub.target.tab_id.as_deref(), &sub.target.range, limits);
            (*sub, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::MemoryStore;
    use cellwatch_core::RangeReference;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct FakeSource {
        pages: RefCell<HashMap<String, String>>,
        fetches: RefCell<Vec<String>>,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                pages: RefCell::new(HashMap::new()),
                fetches: RefCell::new(Vec::new()),
            }
        }

        fn set(&self, id: &str, cells: &str) {
            let page = format!(
                r#"<div id="sheets-viewport"><div id="0"><table><tbody><tr style="height:20px">{}</tr></tbody></table></div></div>"#,
                cells
            );
            self.pages.borrow_mut().insert(id.to_string(), page);
        }
    }

    impl DocumentSource for &FakeSource {
        fn fetch(&self, document_id: &str) -> cellwatch_core::Result<String> {
            self.fetches.borrow_mut().push(document_id.to_string());
            self.pages
                .borrow()
                .get(document_id)
                .cloned()
                .ok_or_else(|| SheetError::DocumentUnavailable {
                    document: document_id.to_string(),
                    reason: "HTTP 404".to_string(),
                })
        }
    }

    struct Collect(RefCell<Vec<String>>);

    impl Notifier for Collect {
        fn notify(&self, change: &Change) -> Result<()> {
            self.0.borrow_mut().push(format!("{}:{}->{}", change.name, change.old, change.new));
            Ok(())
        }
    }

    fn subscription(name: &str, document: &str, range: &str) -> Subscription {
        Subscription {
            name: name.to_string(),
            target: WatchTarget {
                document_id: document.to_string(),
                tab_id: None,
                range: RangeReference::parse(range).unwrap(),
            },
        }
    }

    #[test]
    fn test_sweep_reports_changes_after_first_observation() {
        let source = FakeSource::new();
        source.set("doc", "<td>1</td><td>2</td>");

        let mut subs = SubscriptionList::new();
        subs.add(subscription("first", "doc", "A1")).unwrap();
        subs.add(subscription("both", "doc", "A1:B1")).unwrap();

        let mut monitor = Monitor::new(&source, MemoryStore::new());
        let report = monitor.sweep(&subs);
        assert_eq!(report.checked, 2);
        assert!(report.changes.is_empty());
        assert!(report.failures.is_empty());
        // one fetch for two subscriptions of the same document
        assert_eq!(source.fetches.borrow().len(), 1);

        source.set("doc", "<td>1</td><td>3</td>");
        let report = monitor.sweep(&subs);
        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.changes[0].name, "both");
        assert_eq!(report.changes[0].old, "1\t2");
        assert_eq!(report.changes[0].new, "1\t3");
        assert_eq!(source.fetches.borrow().len(), 2);
        assert_eq!(monitor.store().last_value("both").as_deref(), Some("1\t3"));
    }

    #[test]
    fn test_unavailable_document_fails_only_its_subscriptions() {
        let source = FakeSource::new();
        source.set("up", "<td>ok</td>");

        let mut subs = SubscriptionList::new();
        subs.add(subscription("a", "up", "A1")).unwrap();
        subs.add(subscription("b", "down", "A1")).unwrap();

        let mut monitor = Monitor::new(&source, MemoryStore::new());
        let report = monitor.sweep(&subs);
        assert_eq!(report.checked, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "b");
        assert!(matches!(
            report.failures[0].error,
            SheetError::DocumentUnavailable { .. }
        ));
        assert_eq!(monitor.store().last_value("a").as_deref(), Some("ok"));
    }

    #[test]
    fn test_resolution_failure_is_per_subscription() {
        let source = FakeSource::new();
        source.set("doc", "<td>v</td>");

        let mut subs = SubscriptionList::new();
        subs.add(subscription("good", "doc", "A1")).unwrap();
        let mut bad = subscription("bad", "doc", "A1");
        bad.target.tab_id = Some("99".to_string());
        subs.add(bad).unwrap();

        let mut monitor = Monitor::new(&source, MemoryStore::new());
        let report = monitor.sweep(&subs);
        assert_eq!(report.checked, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].error,
            SheetError::TabNotFound("99".to_string())
        );
    }

    #[test]
    fn test_run_notifies_changes() {
        let source = FakeSource::new();
        source.set("doc", "<td>same</td>");

        let mut subs = SubscriptionList::new();
        subs.add(subscription("cell", "doc", "A1")).unwrap();

        let mut monitor =
            Monitor::new(&source, MemoryStore::new()).with_poll_interval(Duration::from_millis(0));
        let notifier = Collect(RefCell::new(Vec::new()));
        monitor.run(&subs, &notifier, Some(1)).unwrap();
        assert!(notifier.0.borrow().is_empty());

        source.set("doc", "<td>other</td>");
        monitor.run(&subs, &notifier, Some(2)).unwrap();
        assert_eq!(*notifier.0.borrow(), vec!["cell:same->other".to_string()]);
    }

    #[test]
    fn test_subscribe_drops_stale_value() {
        let source = FakeSource::new();
        source.set("doc", "<td>new</td>");

        let mut store = MemoryStore::new();
        store.update("cell", "left over");

        let mut subs = SubscriptionList::new();
        let mut monitor = Monitor::new(&source, store);
        monitor
            .subscribe(&mut subs, subscription("cell", "doc", "A1"))
            .unwrap();
        assert_eq!(monitor.store().last_value("cell"), None);
        assert!(
            monitor
                .subscribe(&mut subs, subscription("cell", "doc", "B1"))
                .is_err()
        );

        let report = monitor.sweep(&subs);
        assert!(report.changes.is_empty());
        assert_eq!(monitor.store().last_value("cell").as_deref(), Some("new"));
    }

    #[test]
    fn test_change_message_links_back() {
        let change = Change {
            name: "price".to_string(),
            target: subscription("price", "d/abc", "B2").target,
            old: "1".to_string(),
            new: "2".to_string(),
        };
        let message = change.message();
        assert!(message.contains("price"));
        assert!(message.contains("https://docs.google.com/spreadsheets/d/abc/edit#range=B2:B2"));
        assert!(message.ends_with("'1' -> '2'"));
    }
}
