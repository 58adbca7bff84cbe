pub mod http;
pub mod protocol;

pub use http::{fetch_graph, spawn_dispatcher, HttpDispatcher};
pub use protocol::{ActionFamily, Completion, Endpoint, FetchError, GraphRequest};
