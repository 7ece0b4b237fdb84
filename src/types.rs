pub mod delivery;
pub mod notification;
pub mod push;
