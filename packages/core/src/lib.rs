// MSL Client Core
// Client control layer over the Message Security Layer negotiation service

#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

// Модули
pub mod client;
pub mod config;
pub mod context;
pub mod control;
pub mod entityauth;
pub mod error;
pub mod keyx;
pub mod msg;
pub mod storage;
pub mod userauth;
pub mod utils;

// Re-exports для удобства
pub use client::{Client, PendingRequest};
pub use config::Config;
pub use context::ClientMslContext;
pub use control::{MessageInputStream, MslChannel, MslControl, PendingChannel};
pub use entityauth::{EntityAuthenticationData, EntityAuthenticationScheme, EntityIdentity};
pub use keyx::{KeyExchangeScheme, KeyRequestData};
pub use msg::{ErrorHeader, MessageConfig, MessageContext, Response, ResponseCode};
pub use utils::error::{MslError, Result};
