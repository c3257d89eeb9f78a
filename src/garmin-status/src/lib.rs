#[macro_use]
extern crate log;

mod browser;
pub use browser::{Browser, WebDriverBrowser};

mod error;
pub use error::BotError;

mod notify;
pub use notify::Notifier;

mod session;
pub use session::{GarminSession, SessionState};
