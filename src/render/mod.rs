mod components;
mod pages;
mod view;

pub use components::{card_item, episode_list_item, player_panel};
pub use pages::{LATEST_COUNT, episode_page, home_page};
pub use view::PlayerView;
