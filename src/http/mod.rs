//! HTTP Transport layer for the Model Context Protocol
//!
//! Provides the external API routing, transport selection and response framing for the
//! buffered `/mcp` listener and the streaming `/mcp/stream` listener.

pub mod emitter;
pub mod handlers;
pub mod transport;
