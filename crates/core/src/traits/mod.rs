//! Collaborator traits
//!
//! Every external service the assistant talks to sits behind one of these
//! traits so the pipeline can be exercised with in-memory mocks.
//!
//! ```text
//! Speech:
//!   - SpeechToText: audio bytes → transcript
//!   - TextToSpeech: text → audio handle (URL)
//!
//! Backends:
//!   - ChatbotBackend: free-text query → optional reply
//!   - ProductBackend: product and category listings
//! ```

mod backend;
mod speech;

pub use backend::{
    BackendError, ChatbotAction, ChatbotBackend, ChatbotContext, ChatbotQuery, ChatbotReply,
    ProductBackend,
};
pub use speech::{SpeechError, SpeechToText, TextToSpeech};
