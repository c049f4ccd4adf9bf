//! LLM Integration Module
//!
//! Client for the hosted Perplexity chat-completions endpoint.

pub mod perplexity;

// Re-export main types
pub use perplexity::{
    ChatRequest, ChatResponse, Completion, CompletionProvider, Message, PerplexityClient,
};
