use itertools::Itertools;

pub const REVEAL_SELECTORS: [&str; 9] = [
    ".section-title",
    ".hero-col-left",
    ".hero-col-right",
    ".kit-image-area",
    ".benefit-card",
    ".mini-card",
    ".product-featured-card",
    ".essential-card",
    ".footer-offer",
];

pub const HIDDEN_CLASS: &str = "fade-up-hidden";
pub const VISIBLE_CLASS: &str = "visible";
pub const REVEAL_THRESHOLD: f64 = 0.1;
/// Pulls the bottom edge of the viewport up so elements reveal slightly
/// after they start to enter.
pub const REVEAL_ROOT_MARGIN: &str = "0px 0px -50px 0px";

pub fn reveal_selector() -> String {
    REVEAL_SELECTORS.iter().join(", ")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealAction {
    /// Show the element and stop watching it.
    Reveal,
    Ignore,
}

/// One-shot reveal bookkeeping. Each watched element is revealed the first
/// time it intersects and never again.
pub struct RevealTracker<K: PartialEq> {
    watched: Vec<K>,
    revealed: usize,
}

impl<K: PartialEq> RevealTracker<K> {
    pub fn new() -> RevealTracker<K> {
        RevealTracker {
            watched: vec![],
            revealed: 0,
        }
    }

    pub fn watch(&mut self, key: K) -> bool {
        if self.watched.contains(&key) {
            return false;
        }
        self.watched.push(key);
        true
    }

    pub fn on_intersection(&mut self, key: &K, is_intersecting: bool) -> RevealAction {
        if !is_intersecting {
            return RevealAction::Ignore;
        }
        match self.watched.iter().position(|watched| watched == key) {
            Some(position) => {
                self.watched.swap_remove(position);
                self.revealed += 1;
                RevealAction::Reveal
            }
            None => RevealAction::Ignore,
        }
    }

    pub fn pending(&self) -> usize {
        self.watched.len()
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }
}

impl<K: PartialEq> Default for RevealTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}
