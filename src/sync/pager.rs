//! Per-album paging state machine.
//!
//! `Paging → EarlyStopped | Exhausted`. The counter of recent archive hits is
//! part of the state, so the stopping rule is a pure function of
//! `(cursor, counter, page length, policy)` and needs no network to test.

use crate::picasa::PageCursor;
use crate::types::SyncMode;

/// Counter value above which an incremental pass gives up on an album.
pub const EARLY_STOP_THRESHOLD: u32 = 100;

/// Whether an entry was already in the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Destination existed; nothing transferred.
    Archived,
    /// Destination was missing; fetched, or reported in a dry run.
    Missing,
}

/// Decaying count of recent archive hits: +1 per hit, -1 per miss, never
/// below zero, so a long run of new photos cannot bank credit against a
/// later run of archived ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecentHits(u32);

impl RecentHits {
    pub fn value(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn record(self, outcome: ItemOutcome) -> Self {
        match outcome {
            ItemOutcome::Archived => Self(self.0.saturating_add(1)),
            ItemOutcome::Missing => Self(self.0.saturating_sub(1)),
        }
    }
}

/// When to abandon an album early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopPolicy {
    pub threshold: u32,
    pub full_sync: bool,
}

impl StopPolicy {
    pub fn new(mode: SyncMode, threshold: u32) -> Self {
        Self {
            threshold,
            full_sync: mode.is_full(),
        }
    }

    fn should_stop_early(&self, recent: RecentHits) -> bool {
        !self.full_sync && recent.value() > self.threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerState {
    /// Fetch the page at `cursor` next.
    Paging {
        cursor: PageCursor,
        recent: RecentHits,
    },
    /// The guard tripped; `next` is the page that was not requested.
    EarlyStopped {
        next: PageCursor,
        recent: RecentHits,
    },
    /// A page of any size other than the requested one ended the album.
    Exhausted { recent: RecentHits },
}

impl PagerState {
    pub fn start(page_size: u32) -> Self {
        PagerState::Paging {
            cursor: PageCursor::first(page_size),
            recent: RecentHits::default(),
        }
    }

    /// Transition after the page at `cursor` returned `returned` entries and
    /// its outcomes left the counter at `recent`.
    ///
    /// The early-stop guard is checked before the end-of-album test.
    pub fn after_page(
        cursor: PageCursor,
        recent: RecentHits,
        returned: usize,
        policy: &StopPolicy,
    ) -> Self {
        let next = cursor.advance(returned);
        if policy.should_stop_early(recent) {
            PagerState::EarlyStopped { next, recent }
        } else if cursor.is_last_page(returned) {
            PagerState::Exhausted { recent }
        } else {
            PagerState::Paging {
                cursor: next,
                recent,
            }
        }
    }
}
