//! Conversational backends that keep server-side multi-turn state
//!
//! - [`DifyClient`]: legal knowledge service (retrieval-augmented)
//! - [`DashScopeAgent`]: cloud conversational agent for general questions
//!
//! Both answer one query per call and hand back the token that continues
//! the conversation on the next turn.

mod dashscope;
mod dify;

pub use dashscope::DashScopeAgent;
pub use dify::{DifyClient, KnowledgeBase, KnowledgeReply};
