pub mod api;
pub mod duration;
pub mod episode;
pub mod error;
pub mod http;
pub mod logging;
pub mod player;
pub mod progress;
pub mod render;
pub mod site;

// Re-export main types for convenience
pub use api::{EpisodeApi, ListQuery, SortOrder};
pub use duration::format_duration;
pub use episode::Episode;
pub use error::{ApiError, BuildError, PageError, PlayerError};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use player::{MediaElement, MediaEvent, PlayerSession, PlayerState, SimulatedMedia};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
pub use render::PlayerView;
pub use site::{BuildResult, SiteOptions, build_site};
