pub mod push;
pub mod store;
pub mod time;
pub mod trigger;

pub use push::{PushSender, SendError, SendFuture};
pub use store::{StoreError, StoreFuture, SubscriptionStore};
pub use time::TimeProvider;
pub use trigger::{RoundTrigger, TriggerError, TriggerFuture};
