//! Client side of the crosschat engine: the event-stream reader the bot
//! watches APIs with, the channel monitor that turns snapshots into
//! add/remove/update callbacks, and a thin REST client for the chat
//! commands.

pub mod client;
pub mod monitor;
pub mod sse;
