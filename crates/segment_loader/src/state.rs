//! The script load-state machine.
//!
//! `NotLoaded → Loading → Loaded`, monotonic. The cell is shared by `Arc`
//! between the loader and the task that performs the delayed injection.

use std::sync::atomic::{AtomicU8, Ordering};

/// Where the script injection currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoadState {
    /// Nothing has been scheduled.
    NotLoaded = 0,
    /// Injection is scheduled or in flight, or it failed.
    Loading = 1,
    /// The script was inserted.
    Loaded = 2,
}

impl LoadState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::NotLoaded,
            1 => Self::Loading,
            _ => Self::Loaded,
        }
    }
}

/// Atomic holder for a [`LoadState`].
#[derive(Debug)]
pub struct LoadStateCell(AtomicU8);

impl Default for LoadStateCell {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadStateCell {
    /// A cell in [`LoadState::NotLoaded`].
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU8::new(LoadState::NotLoaded as u8))
    }

    /// The current state.
    #[must_use]
    pub fn get(&self) -> LoadState {
        LoadState::from_raw(self.0.load(Ordering::Acquire))
    }

    /// Move `NotLoaded → Loading`.
    ///
    /// # Errors
    ///
    /// Returns the observed state if it was not `NotLoaded`.
    pub fn begin_loading(&self) -> Result<(), LoadState> {
        self.0
            .compare_exchange(
                LoadState::NotLoaded as u8,
                LoadState::Loading as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(LoadState::from_raw)
    }

    /// Move `Loading → Loaded`. Returns `false` from any other state.
    pub fn finish_loading(&self) -> bool {
        self.0
            .compare_exchange(
                LoadState::Loading as u8,
                LoadState::Loaded as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_are_monotonic() {
        let cell = LoadStateCell::new();
        assert_eq!(cell.get(), LoadState::NotLoaded);
        assert!(!cell.finish_loading());

        cell.begin_loading().unwrap();
        assert_eq!(cell.get(), LoadState::Loading);
        assert_eq!(cell.begin_loading(), Err(LoadState::Loading));

        assert!(cell.finish_loading());
        assert_eq!(cell.get(), LoadState::Loaded);
        assert_eq!(cell.begin_loading(), Err(LoadState::Loaded));
        assert!(!cell.finish_loading());
    }
}
