//! Sync engine: one pass over every album of a user.
//!
//! Albums are processed one after another. Each album is paged from index 1
//! with a fresh counter; every entry is checked against the archive index
//! and fetched only when missing. In incremental mode an album is abandoned
//! once its recent entries are overwhelmingly archived, on the assumption
//! that the listing keeps archived photos clustered together.

pub mod error;
pub mod pager;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use crate::archive::{self, AliasOutcome, ArchiveIndex, ArchiveLayout};
use crate::download::Transfer;
use crate::picasa::{Album, ListingSource, Photo, MAX_PAGE_SIZE};
use crate::types::SyncMode;

pub use self::error::SyncError;
use self::pager::{ItemOutcome, PagerState, StopPolicy, EARLY_STOP_THRESHOLD};

/// Engine knobs that do not change between passes.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub page_size: u32,
    pub early_stop_threshold: u32,
    pub dry_run: bool,
    /// Album titles to restrict the pass to. Empty means every album.
    pub albums: Vec<String>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            early_stop_threshold: EARLY_STOP_THRESHOLD,
            dry_run: false,
            albums: Vec::new(),
        }
    }
}

/// What one album contributed to a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumReport {
    pub pages: u32,
    pub downloaded: u64,
    pub archived: u64,
    pub skipped: u64,
    pub stopped_early: bool,
}

/// Totals of one pass.
#[derive(Debug, Clone)]
pub struct PassSummary {
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
    pub albums: u32,
    pub pages: u32,
    pub downloaded: u64,
    pub archived: u64,
    pub skipped: u64,
    pub stopped_early: u32,
}

impl PassSummary {
    fn new(started_at: DateTime<Local>) -> Self {
        Self {
            started_at,
            elapsed: Duration::ZERO,
            albums: 0,
            pages: 0,
            downloaded: 0,
            archived: 0,
            skipped: 0,
            stopped_early: 0,
        }
    }

    fn add(&mut self, report: &AlbumReport) {
        self.albums += 1;
        self.pages += report.pages;
        self.downloaded += report.downloaded;
        self.archived += report.archived;
        self.skipped += report.skipped;
        if report.stopped_early {
            self.stopped_early += 1;
        }
    }

    pub fn log(&self, dry_run: bool) {
        let verb = if dry_run {
            "would be downloaded"
        } else {
            "downloaded"
        };
        tracing::info!("── Summary ──");
        tracing::info!(
            "  {} albums, {} pages, started {}",
            self.albums,
            self.pages,
            self.started_at.format("%Y-%m-%d %H:%M:%S")
        );
        tracing::info!(
            "  {} {}, {} already archived, {} skipped",
            self.downloaded,
            verb,
            self.archived,
            self.skipped
        );
        if self.stopped_early > 0 {
            tracing::info!(
                "  {} albums stopped early (run in full mode to walk them completely)",
                self.stopped_early
            );
        }
        tracing::info!("  elapsed: {}", format_duration(self.elapsed));
    }
}

pub struct SyncEngine {
    source: Arc<dyn ListingSource>,
    index: Arc<dyn ArchiveIndex>,
    transfer: Arc<dyn Transfer>,
    layout: ArchiveLayout,
    options: SyncOptions,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("layout", &self.layout)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    pub fn new(
        source: Arc<dyn ListingSource>,
        index: Arc<dyn ArchiveIndex>,
        transfer: Arc<dyn Transfer>,
        layout: ArchiveLayout,
        options: SyncOptions,
    ) -> Self {
        Self {
            source,
            index,
            transfer,
            layout,
            options,
        }
    }

    /// Run one full pass for `owner_id`.
    ///
    /// Any listing, directory or transfer failure aborts the pass; nothing
    /// is retried here.
    pub async fn run_once(&self, owner_id: &str, mode: SyncMode) -> Result<PassSummary, SyncError> {
        let started = Instant::now();
        let mut summary = PassSummary::new(Local::now());
        let policy = StopPolicy::new(mode, self.options.early_stop_threshold);

        tracing::info!(%mode, owner = owner_id, "Starting pass");
        let albums = self.source.list_albums(owner_id).await?;
        let albums = select_albums(albums, &self.options.albums)?;
        tracing::info!(count = albums.len(), "Albums to sync");

        for album in &albums {
            if !archive::is_safe_collection_id(&album.id) {
                tracing::warn!(
                    album = %album.title,
                    id = %album.id,
                    "Skipping album whose id is not a plain directory name"
                );
                continue;
            }
            let report = self.sync_album(owner_id, album, &policy).await?;
            summary.add(&report);
        }

        summary.elapsed = started.elapsed();
        Ok(summary)
    }

    async fn sync_album(
        &self,
        owner_id: &str,
        album: &Album,
        policy: &StopPolicy,
    ) -> Result<AlbumReport, SyncError> {
        let mut report = AlbumReport::default();
        let mut state = PagerState::start(self.options.page_size);

        loop {
            match state {
                PagerState::Paging { cursor, mut recent } => {
                    let batch = self
                        .source
                        .list_photos(owner_id, &album.id, cursor)
                        .await?;
                    report.pages += 1;
                    tracing::debug!(
                        album = %album.title,
                        start_index = cursor.start_index,
                        count = batch.len(),
                        "Fetched photo page"
                    );

                    for photo in &batch {
                        match self.archive_photo(album, photo).await? {
                            Some(outcome) => {
                                match outcome {
                                    ItemOutcome::Archived => report.archived += 1,
                                    ItemOutcome::Missing => report.downloaded += 1,
                                }
                                recent = recent.record(outcome);
                            }
                            None => report.skipped += 1,
                        }
                    }

                    state = PagerState::after_page(cursor, recent, batch.len(), policy);
                }
                PagerState::EarlyStopped { next, recent } => {
                    report.stopped_early = true;
                    tracing::info!(
                        album = %album.title,
                        pages = report.pages,
                        recent_hits = recent.value(),
                        next_index = next.start_index,
                        "Found too many photos already downloaded, not going further. \
                         Run in full mode to walk the whole album."
                    );
                    break;
                }
                PagerState::Exhausted { .. } => {
                    tracing::debug!(album = %album.title, pages = report.pages, "Reached end of album");
                    break;
                }
            }
        }

        tracing::info!(
            album = %album.title,
            downloaded = report.downloaded,
            archived = report.archived,
            "Album done"
        );
        Ok(report)
    }

    /// Archive one photo if it is missing.
    ///
    /// Returns `None` for entries whose title cannot name a file; those do
    /// not move the counter.
    async fn archive_photo(
        &self,
        album: &Album,
        photo: &Photo,
    ) -> Result<Option<ItemOutcome>, SyncError> {
        if !archive::is_mappable(&archive::sanitize(&photo.title)) {
            tracing::warn!(
                album = %album.title,
                title = %photo.title,
                "Skipping photo whose title cannot be used as a file name"
            );
            return Ok(None);
        }

        let destination = self.layout.photo_path(&album.id, &photo.title);
        if self.index.exists(&album.id, &photo.title) {
            tracing::debug!("{} was already present in the archive", destination.display());
            return Ok(Some(ItemOutcome::Archived));
        }

        if self.options.dry_run {
            tracing::info!("[DRY RUN] Would download {}", destination.display());
            return Ok(Some(ItemOutcome::Missing));
        }

        let album_dir = self.layout.album_dir(&album.id);
        archive::ensure_dir(&album_dir)
            .await
            .map_err(|source| SyncError::CreateDir {
                path: album_dir.clone(),
                source,
            })?;

        match archive::link_album_alias(&self.layout, &album.id, &album.title).await {
            Ok(AliasOutcome::Created) => {
                tracing::debug!(album = %album.title, "Linked album alias");
            }
            Ok(AliasOutcome::AlreadyExists) => {}
            Err(e) => {
                tracing::warn!(
                    "Could not create symlink {}: {}",
                    self.layout.alias_path(&album.title).display(),
                    e
                );
            }
        }

        tracing::info!("Downloading {}", destination.display());
        tracing::debug!(source_uri = %photo.source_uri, "Content URI");
        self.transfer.fetch(&photo.source_uri, &destination).await?;
        Ok(Some(ItemOutcome::Missing))
    }
}

/// Keep only the albums named in `wanted`, in the order they were named.
fn select_albums(albums: Vec<Album>, wanted: &[String]) -> Result<Vec<Album>, SyncError> {
    if wanted.is_empty() {
        return Ok(albums);
    }
    let mut selected = Vec::with_capacity(wanted.len());
    for name in wanted {
        match albums.iter().find(|a| &a.title == name) {
            Some(album) => selected.push(album.clone()),
            None => {
                return Err(SyncError::UnknownAlbum {
                    name: name.clone(),
                    available: albums.iter().map(|a| a.title.clone()).collect(),
                })
            }
        }
    }
    Ok(selected)
}

fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {:02}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}
