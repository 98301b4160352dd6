//! # Frontier
//!
//! Breadth-first work queue of player identities for the crawl driver.
//!
//! Three guards decide whether a popped identity is processed:
//! - the cycle-visited set, cleared when a new cycle begins;
//! - the lifetime-visited set, kept for the process lifetime to avoid
//!   re-resolving identities (the cycle's seed is exempt so every cycle
//!   restarts from it);
//! - the pruned set of identities the upstream reported as not found, which
//!   are refused at enqueue time and never come back.
//!
//! The frontier is owned by the driver. Fetch tasks never touch it.

use crate::{Identity, IdentityKey};
use std::collections::{BTreeSet, VecDeque};

#[derive(Debug, Clone)]
pub struct Frontier {
    queue: VecDeque<Identity>,
    cycle_visited: BTreeSet<IdentityKey>,
    lifetime_visited: BTreeSet<IdentityKey>,
    pruned: BTreeSet<IdentityKey>,
    seed: Option<IdentityKey>,
    visit_cap: usize,
    max_queue_len: usize,
}

impl Frontier {
    /// Create an empty frontier.
    ///
    /// * `visit_cap` - identities processed per cycle
    /// * `max_queue_len` - enqueues beyond this length are dropped
    #[must_use]
    pub fn new(visit_cap: usize, max_queue_len: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            cycle_visited: BTreeSet::new(),
            lifetime_visited: BTreeSet::new(),
            pruned: BTreeSet::new(),
            seed: None,
            visit_cap,
            max_queue_len,
        }
    }

    /// Start a new cycle from `seed`.
    ///
    /// With `carry_over`, identities still queued from the previous cycle
    /// stay behind the seed; otherwise the queue is reset to the seed alone.
    /// Returns `false` if the seed has been pruned and was not queued.
    pub fn begin_cycle(&mut self, seed: Identity, carry_over: bool) -> bool {
        if !carry_over {
            self.queue.clear();
        }
        self.cycle_visited.clear();

        let key = seed.key();
        if self.pruned.contains(&key) {
            self.seed = None;
            return false;
        }
        self.seed = Some(key);
        self.queue.push_front(seed);
        true
    }

    /// Pop the next identity to process, marking it visited.
    ///
    /// Returns `None` once the queue is empty or the cycle's visit cap is
    /// reached.
    pub fn pop_next(&mut self) -> Option<Identity> {
        while self.cycle_visited.len() < self.visit_cap {
            let identity = self.queue.pop_front()?;
            let key = identity.key();
            if self.pruned.contains(&key) || self.cycle_visited.contains(&key) {
                continue;
            }
            let is_seed = self.seed.as_ref() == Some(&key);
            if !is_seed && self.lifetime_visited.contains(&key) {
                continue;
            }
            self.cycle_visited.insert(key.clone());
            self.lifetime_visited.insert(key);
            return Some(identity);
        }
        None
    }

    /// Pop up to `size` identities.
    pub fn next_batch(&mut self, size: usize) -> Vec<Identity> {
        let mut batch = Vec::with_capacity(size);
        while batch.len() < size {
            match self.pop_next() {
                Some(identity) => batch.push(identity),
                None => break,
            }
        }
        batch
    }

    /// Queue an identity. Pruned identities and overflow are refused.
    pub fn enqueue(&mut self, identity: Identity) -> bool {
        if self.queue.len() >= self.max_queue_len || self.pruned.contains(&identity.key()) {
            return false;
        }
        self.queue.push_back(identity);
        true
    }

    /// Mark an identity as permanently invalid.
    ///
    /// Copies already queued stay in place and are dropped when popped.
    pub fn prune(&mut self, identity: &Identity) {
        self.pruned.insert(identity.key());
    }

    #[must_use]
    pub fn is_pruned(&self, identity: &Identity) -> bool {
        self.pruned.contains(&identity.key())
    }

    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn cycle_visited(&self) -> usize {
        self.cycle_visited.len()
    }

    #[must_use]
    pub fn lifetime_visited(&self) -> usize {
        self.lifetime_visited.len()
    }

    #[must_use]
    pub fn pruned(&self) -> usize {
        self.pruned.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================
