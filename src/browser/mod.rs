//! Page acquisition: WebDriver sessions, navigation and lazy-load scrolling.

pub mod acquisition;
pub mod session;
pub mod viewport;

pub use acquisition::{LoadOptions, LoadOutcome, PageSnapshot, load};
pub use session::{connect, with_session};
pub use viewport::{ScrollSummary, Viewport, scroll_until_stable};
