use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("missing required setting: {0}")]
    MissingConfig(&'static str),
    #[error("could not find the embedded login form on the sign-in page")]
    AuthFormNotFound,
    #[error("no active session; sign in first")]
    NotLoggedIn,
    #[error("notify endpoint rejected the request: {0}")]
    Notify(String),
}
