mod media;
mod session;
mod state;

pub use media::{MediaElement, MediaEvent, SimulatedMedia};
pub use session::PlayerSession;
pub use state::PlayerState;
