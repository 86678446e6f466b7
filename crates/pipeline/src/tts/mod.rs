//! Text-to-speech backends

mod http_backend;

pub use http_backend::{HttpSynthesizer, HttpTtsConfig};
