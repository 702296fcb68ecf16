//! The crawl frontier: which URLs have been dispatched, and at what level
//!
//! Every submission passes through [`Frontier::register`], which decides
//! atomically whether the target needs a fetch. A URL is fetched at most
//! once per capability level, and only ever upgraded from `Check` to
//! `Full`, never downgraded.

use crate::state::{Capability, CrawlTarget};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use url::Url;

/// What the frontier decided for a submitted target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Not seen at this capability before; fetch it
    Dispatch,
    /// Already handled at this capability or higher
    Skip,
}

/// Everything known about one URL
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    /// Highest capability dispatched so far
    pub highest: Capability,
    /// Distinct referrers, in discovery order
    pub referrers: Vec<Url>,
}

/// Shared registry of submitted URLs
#[derive(Debug, Default)]
pub struct Frontier {
    entries: Mutex<HashMap<String, FrontierEntry>>,
    processed: AtomicUsize,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a target and decides whether it must be fetched
    ///
    /// The referrer is recorded either way, unless it is the URL itself
    /// or already known. Each `Dispatch` counts as one processed URL.
    pub fn register(&self, target: &CrawlTarget) -> Admission {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let referrer = target.referrer.as_ref().filter(|r| **r != target.url);

        match entries.get_mut(target.url.as_str()) {
            Some(entry) => {
                if let Some(referrer) = referrer {
                    if !entry.referrers.contains(referrer) {
                        entry.referrers.push(referrer.clone());
                    }
                }
                if entry.highest >= target.capability {
                    return Admission::Skip;
                }
                entry.highest = target.capability;
            }
            None => {
                entries.insert(
                    target.url.as_str().to_string(),
                    FrontierEntry {
                        highest: target.capability,
                        referrers: referrer.into_iter().cloned().collect(),
                    },
                );
            }
        }

        self.processed.fetch_add(1, Ordering::SeqCst);
        Admission::Dispatch
    }

    /// Distinct referrers recorded for a URL
    pub fn referrers(&self, url: &Url) -> Vec<Url> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(url.as_str())
            .map(|e| e.referrers.clone())
            .unwrap_or_default()
    }

    /// Highest capability a URL has been dispatched at
    pub fn highest_capability(&self, url: &Url) -> Option<Capability> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(url.as_str()).map(|e| e.highest)
    }

    /// Number of dispatched fetches
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    /// Number of distinct URLs seen
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
