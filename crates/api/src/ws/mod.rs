//! WebSocket transport for real-time job events.
//!
//! Each connection becomes one [`EventBus`](pdfshield_events::EventBus)
//! subscriber for as long as the socket stays open.

mod handler;

pub use handler::{ws_handler, GREETING};
