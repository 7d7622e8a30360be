use std::path::PathBuf;
use std::sync::Arc;

/// Events emitted while building the static site, for progress reporting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The episode listing is being fetched
    FetchingListing { url: String },

    /// The listing arrived and was converted
    ListingFetched {
        total_episodes: usize,
        /// Detail pages that will be rendered
        to_render: usize,
    },

    /// The home page and episode data file were written
    IndexWritten { path: PathBuf },

    /// A detail page is being fetched and rendered
    PageStarting {
        /// Identifies the render slot (0 to max_concurrent-1)
        slot_id: usize,
        episode_id: String,
        /// Position of this page in the render queue
        page_index: usize,
        total_pages: usize,
    },

    /// A detail page was written
    PageRendered {
        /// Identifies the render slot
        slot_id: usize,
        episode_id: String,
        title: String,
        path: PathBuf,
    },

    /// A detail page could not be produced
    PageFailed {
        /// Identifies the render slot
        slot_id: usize,
        episode_id: String,
        error: String,
    },

    /// Build finished
    BuildCompleted {
        rendered_count: usize,
        skipped_count: usize,
        failed_count: usize,
    },
}

/// Trait for reporting progress events during a site build.
///
/// Implementations can use this to display progress bars, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {}
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}
