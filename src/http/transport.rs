use std::collections::HashMap;

use axum::http::HeaderMap;

pub const TRANSPORT_QUERY_PARAM: &str = "transportType";
pub const TRANSPORT_HEADER: &str = "x-mcp-transport";
pub const STREAMABLE_HTTP: &str = "streamable-http";

/// Response framing strategy, chosen per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Buffered,
    Stream,
}

impl TransportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buffered => "buffered",
            Self::Stream => "stream",
        }
    }
}

/// Picks the streaming transport only when the query parameter or header asks for it
/// with the exact value `streamable-http`.
pub fn classify(query: &HashMap<String, String>, headers: &HeaderMap) -> TransportMode {
    let from_query = query
        .get(TRANSPORT_QUERY_PARAM)
        .is_some_and(|value| value == STREAMABLE_HTTP);
    let from_header = headers
        .get(TRANSPORT_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == STREAMABLE_HTTP);

    if from_query || from_header {
        TransportMode::Stream
    } else {
        TransportMode::Buffered
    }
}
