mod record;
mod slug;

pub use record::Episode;
pub use slug::{EPISODES_DIR, episode_href, episode_page_path, page_slug};
