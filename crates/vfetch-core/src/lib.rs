pub mod config;
pub mod logging;

pub mod download;
pub mod error;
pub mod http;
pub mod normalize;
pub mod pipeline;
pub mod prune;
pub mod safety;
pub mod slug;
pub mod source;
