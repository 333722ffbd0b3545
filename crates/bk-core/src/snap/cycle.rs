//! Cycling through ordered key lists

/// Direction to step through a key list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStep {
    Next,
    Prev,
}

/// Step from `current` to the adjacent key with wraparound.
///
/// A `current` missing from `keys` is treated as index 0. Returns `None`
/// only for an empty list.
pub fn cycle_key<'a>(keys: &'a [String], current: &str, step: CycleStep) -> Option<&'a str> {
    if keys.is_empty() {
        return None;
    }
    let len = keys.len();
    let index = keys.iter().position(|k| k == current).unwrap_or(0);
    let next = match step {
        CycleStep::Next => (index + 1) % len,
        CycleStep::Prev => (index + len - 1) % len,
    };
    Some(keys[next].as_str())
}

/// Which sides of a snap to cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapCycle {
    pub next_source: bool,
    pub prev_source: bool,
    pub next_target: bool,
    pub prev_target: bool,
}

impl SnapCycle {
    /// No cycling: reuse the remembered keys
    pub fn none() -> Self {
        Self::default()
    }

    pub fn next_source() -> Self {
        Self {
            next_source: true,
            ..Self::default()
        }
    }

    pub fn prev_source() -> Self {
        Self {
            prev_source: true,
            ..Self::default()
        }
    }

    pub fn next_target() -> Self {
        Self {
            next_target: true,
            ..Self::default()
        }
    }

    pub fn prev_target() -> Self {
        Self {
            prev_target: true,
            ..Self::default()
        }
    }

    /// Whether the target side is being cycled
    pub fn cycles_target(&self) -> bool {
        self.next_target || self.prev_target
    }

    /// Apply the requested target-side steps to `key`
    pub(crate) fn step_target(&self, keys: &[String], key: String) -> String {
        Self::apply(keys, key, self.next_target, self.prev_target)
    }

    /// Apply the requested source-side steps to `key`
    pub(crate) fn step_source(&self, keys: &[String], key: String) -> String {
        Self::apply(keys, key, self.next_source, self.prev_source)
    }

    fn apply(keys: &[String], mut key: String, next: bool, prev: bool) -> String {
        for (requested, step) in [(next, CycleStep::Next), (prev, CycleStep::Prev)] {
            if requested && let Some(stepped) = cycle_key(keys, &key, step) {
                key = stepped.to_string();
            }
        }
        key
    }
}
