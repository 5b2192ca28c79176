//! Learned URL rewrites.
//!
//! Some services redirect every request (e.g. from an old host name to a
//! new one). Once a redirect has been observed, the differing URL prefixes
//! are remembered and substituted into later request URLs before
//! connecting, saving the extra round trip.
//!
//! Entries are never evicted or expired, and the first entry recorded for a
//! fragment wins.

use parking_lot::RwLock;
use std::sync::{Arc, LazyLock};

static SHARED: LazyLock<Arc<RedirectCache>> = LazyLock::new(|| Arc::new(RedirectCache::new()));

/// One learned substitution: `from` is replaced by `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub from: String,
    pub to: String,
}

/// Ordered, thread-safe store of learned rewrites.
#[derive(Debug, Default)]
pub struct RedirectCache {
    entries: RwLock<Vec<Rewrite>>,
}

impl RedirectCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by clients that were not given their own.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    #[must_use]
    pub fn entries(&self) -> Vec<Rewrite> {
        self.entries.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Record `from → to` unless `from` already has an entry.
    ///
    /// Returns whether the entry was added.
    pub fn record(&self, from: &str, to: &str) -> bool {
        if from.is_empty() || from == to {
            return false;
        }
        let mut entries = self.entries.write();
        if entries.iter().any(|entry| entry.from == from) {
            return false;
        }
        entries.push(Rewrite {
            from: from.to_string(),
            to: to.to_string(),
        });
        true
    }

    /// Apply the first rewrite whose fragment occurs in `url`, replacing its
    /// first occurrence. Returns `url` unchanged if nothing matches.
    #[must_use]
    pub fn rewrite(&self, url: &str) -> String {
        let entries = self.entries.read();
        for entry in entries.iter() {
            if let Some(pos) = url.find(&entry.from) {
                let rewritten = format!(
                    "{}{}{}",
                    &url[..pos],
                    entry.to,
                    &url[pos + entry.from.len()..]
                );
                tracing::info!(from = %entry.from, to = %entry.to, url = %rewritten, "applying learned redirect");
                return rewritten;
            }
        }
        url.to_string()
    }

    /// Compare the requested URL with the URL the response came from and
    /// remember the differing prefixes.
    ///
    /// The longest tail of `requested` that also occurs in `resolved` is
    /// taken as the shared part; everything before it is the rewrite.
    pub fn learn(&self, requested: &str, resolved: &str) -> Option<Rewrite> {
        let rewrite = derive_rewrite(requested, resolved)?;
        tracing::info!(old_url = requested, new_url = resolved, "request was redirected");
        if self.record(&rewrite.from, &rewrite.to) {
            tracing::debug!(from = %rewrite.from, to = %rewrite.to, "learned redirect");
            Some(rewrite)
        } else {
            None
        }
    }
}

/// Prefix substitution turning `requested` into `resolved`, if they differ.
#[must_use]
pub fn derive_rewrite(requested: &str, resolved: &str) -> Option<Rewrite> {
    if requested == resolved {
        return None;
    }
    let (start, tail) = requested
        .char_indices()
        .map(|(start, _)| (start, &requested[start..]))
        .find(|(_, tail)| resolved.contains(tail))?;
    let pos = resolved.find(tail)?;
    let from = &requested[..start];
    let to = &resolved[..pos];
    if from.is_empty() || from == to {
        return None;
    }
    Some(Rewrite {
        from: from.to_string(),
        to: to.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_host_substitution() {
        let rewrite = derive_rewrite(
            "http://old.example.com/rest/api/2/issue/7",
            "https://new.example.org/rest/api/2/issue/7",
        );
        assert_eq!(
            rewrite,
            Some(Rewrite {
                from: "http://old.example.com".into(),
                to: "https://new.example.org".into(),
            })
        );
    }

    #[test]
    fn identical_or_slash_normalized_urls_learn_nothing() {
        assert_eq!(derive_rewrite("http://a/x", "http://a/x"), None);
        assert_eq!(derive_rewrite("http://host", "http://host/"), None);
    }

    #[test]
    fn rewrite_applies_first_match_only_once() {
        let cache = RedirectCache::new();
        assert!(cache.record("http://old", "https://new"));
        assert!(cache.record("https://new", "https://newer"));
        assert_eq!(cache.rewrite("http://old/a?next=http://old/b"), "https://new/a?next=http://old/b");
        assert_eq!(cache.rewrite("ftp://other/"), "ftp://other/");
    }

    #[test]
    fn first_recorder_wins() {
        let cache = RedirectCache::new();
        assert!(cache.record("http://old", "https://new"));
        assert!(!cache.record("http://old", "https://elsewhere"));
        assert_eq!(cache.entries().len(), 1);
        assert_eq!(cache.rewrite("http://old/x"), "https://new/x");
    }

    #[test]
    fn relearning_same_redirect_is_idempotent() {
        let cache = RedirectCache::new();
        let first = cache.learn("http://old.host/p", "http://new.host/p");
        assert!(first.is_some());
        assert_eq!(cache.learn("http://old.host/p", "http://new.host/p"), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.rewrite("http://old.host/other"), "http://new.host/other");
    }

    #[test]
    fn clear_resets_cache() {
        let cache = RedirectCache::new();
        cache.record("a", "b");
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}
