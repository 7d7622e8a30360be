mod fetch;
mod model;

pub use fetch::{EpisodeApi, ListQuery, SortOrder};
pub use model::{ApiDuration, ApiEpisode, ApiFile, format_published_at};
