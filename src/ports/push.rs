use std::pin::Pin;

use crate::types::push::Subscription;

pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<(), SendError>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The push service answered with a non-success status.
    #[error("push service responded with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("push transport error: {0}")]
    Transport(String),
}

impl SendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            SendError::Rejected { status, .. } => Some(*status),
            SendError::Transport(_) => None,
        }
    }
}

/// Encrypts and delivers one serialized payload to one subscription.
pub trait PushSender: Send + Sync + 'static {
    fn send<'a>(&'a self, subscription: &'a Subscription, message: &'a str) -> SendFuture<'a>;
}
