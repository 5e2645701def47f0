use anyhow::{Context, Result};
use poll_promise::Promise;
use std::sync::Arc;
use std::time::Duration;

use crate::llmclient::GenerativeService;

pub const ERROR_LABEL: &str = "Error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Author {
    User(String),
    Service(String),
    Error,
}

impl Author {
    pub fn display_name(&self) -> &str {
        match self {
            Author::User(name) | Author::Service(name) => name,
            Author::Error => ERROR_LABEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub author: Author,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyState {
    Pending,
    Resolved(String),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleAlign {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleStyle {
    Own,
    Other,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub author: String,
    pub text: String,
    pub align: BubbleAlign,
    pub style: BubbleStyle,
}

struct PendingReply {
    id: u64,
    promise: Promise<Result<String>>,
}

impl PendingReply {
    fn state(&self) -> ReplyState {
        match self.promise.ready() {
            None => ReplyState::Pending,
            Some(Ok(text)) => ReplyState::Resolved(text.clone()),
            Some(Err(e)) => ReplyState::Failed(e.to_string()),
        }
    }
}

pub struct ChatSession {
    user_name: String,
    service: Arc<dyn GenerativeService>,
    reply_delay: Duration,
    turns: Vec<ChatTurn>,
    pending: Vec<PendingReply>,
    next_request_id: u64,
    scroll_to_bottom: bool,
}

impl ChatSession {
    pub fn new(user_name: String, service: Arc<dyn GenerativeService>, reply_delay: Duration) -> Self {
        Self {
            user_name,
            service,
            reply_delay,
            turns: Vec::new(),
            pending: Vec::new(),
            next_request_id: 0,
            scroll_to_bottom: false,
        }
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn reply_states(&self) -> Vec<(u64, ReplyState)> {
        self.pending.iter().map(|p| (p.id, p.state())).collect()
    }

    /// Appends the user's turn and starts a reply request. Clears `input` on success.
    pub fn send_user_message(&mut self, input: &mut String) -> bool {
        let text = input.trim().to_string();
        if text.is_empty() {
            return false;
        }

        self.push_turn(Author::User(self.user_name.clone()), text.clone());
        input.clear();
        self.request_reply(text);
        true
    }

    fn request_reply(&mut self, prompt: String) {
        let id = self.next_request_id;
        self.next_request_id += 1;

        let service = Arc::clone(&self.service);
        let delay = self.reply_delay;
        tracing::debug!(request = id, "reply requested");

        let promise = Promise::spawn_thread(format!("reply_{}", id), move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to start reply runtime")?;
            rt.block_on(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                service.generate(&prompt).await
            })
        });

        self.pending.push(PendingReply { id, promise });
    }

    /// Turns a finished request into a chat turn.
    pub fn receive_reply(&mut self, result: Result<String>) {
        match result {
            Ok(text) => {
                let label = self.service.label().to_string();
                self.push_turn(Author::Service(label), text);
            }
            Err(e) => {
                tracing::warn!(error = %e, "reply failed");
                self.push_turn(Author::Error, format!("An error occurred: {:#}", e));
            }
        }
    }

    /// Appends a turn for every request that has finished, oldest request first.
    pub fn poll_replies(&mut self) -> usize {
        let mut finished = Vec::new();
        let mut still_pending = Vec::new();
        for reply in self.pending.drain(..) {
            match reply.promise.try_take() {
                Ok(result) => finished.push(result),
                Err(promise) => still_pending.push(PendingReply {
                    id: reply.id,
                    promise,
                }),
            }
        }
        self.pending = still_pending;

        let count = finished.len();
        for result in finished {
            self.receive_reply(result);
        }
        count
    }

    /// Drops every turn. Requests still in flight keep running and land in the emptied chat.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.scroll_to_bottom = false;
    }

    pub fn bubbles(&self) -> Vec<Bubble> {
        self.turns()
            .iter()
            .map(|turn| {
                let (align, style) = match &turn.author {
                    Author::User(name) if *name == self.user_name => {
                        (BubbleAlign::Right, BubbleStyle::Own)
                    }
                    Author::Error => (BubbleAlign::Left, BubbleStyle::Error),
                    _ => (BubbleAlign::Left, BubbleStyle::Other),
                };
                Bubble {
                    author: turn.author.display_name().to_string(),
                    text: turn.text.clone(),
                    align,
                    style,
                }
            })
            .collect()
    }

    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_bottom)
    }

    fn push_turn(&mut self, author: Author, text: String) {
        self.turns.push(ChatTurn { author, text });
        self.scroll_to_bottom = true;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;

    pub(crate) struct EchoService;

    #[async_trait]
    impl GenerativeService for EchoService {
        fn label(&self) -> &str {
            "Gemini"
        }

        async fn generate(&self, prompt: &str) -> Result<String> {
            Ok(format!("echo: {}", prompt))
        }
    }
}
