mod animator;
mod controller;
mod session;
mod ticker;

pub use animator::{AnimatorEvent, ProgressAnimator, RING_DASH_ARRAY};
pub use controller::{SessionController, SessionSnapshot};
pub use session::{format_remaining, PhaseKind, SessionConfig, SessionMode};
pub use ticker::{CountdownTicker, TickerEvent};
