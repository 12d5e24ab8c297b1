//! Backend routing, conversation sessions and reply sanitization

mod routing;
mod sanitize;
mod session;

pub use routing::BackendRouter;
pub use sanitize::ResponseSanitizer;
pub use session::ConversationSession;
