use std::time::Instant;

use crate::auth::AuthError;
use crate::chat_session::{Bubble, ChatSession, ReplyState};
use crate::chatapp::{AppContext, Session};

#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Failure(String),
}

#[derive(Debug, Default)]
pub struct RegisterModal {
    pub name: String,
    pub email: String,
    pub password: String,
    pub notice: Option<Notice>,
    close_at: Option<Instant>,
    focus_requested: bool,
}

impl RegisterModal {
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }
}

pub struct ChatScreen {
    pub input: String,
    pub session: ChatSession,
}

impl ChatScreen {
    pub fn send(&mut self) -> bool {
        self.session.send_user_message(&mut self.input)
    }

    /// Empties the conversation; a half-typed message stays in the input.
    pub fn clear(&mut self) {
        self.session.clear();
    }
}

pub enum Screen {
    Login(LoginForm),
    Chat(ChatScreen),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Login { error: Option<String> },
    Chat { bubbles: Vec<Bubble>, pending: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterView {
    pub notice: Option<Notice>,
}

/// Everything the window shows for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub title: String,
    pub inner_size: [f32; 2],
    pub resizable: bool,
    pub body: Body,
    pub register: Option<RegisterView>,
}

pub struct ScreenController {
    screen: Screen,
    register: Option<RegisterModal>,
}

impl Default for ScreenController {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenController {
    pub fn new() -> Self {
        Self {
            screen: Screen::Login(LoginForm::default()),
            register: None,
        }
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn register_modal_mut(&mut self) -> Option<&mut RegisterModal> {
        self.register.as_mut()
    }

    pub fn chat_mut(&mut self) -> Option<&mut ChatScreen> {
        match &mut self.screen {
            Screen::Chat(chat) => Some(chat),
            Screen::Login(_) => None,
        }
    }

    /// Opens the registration modal, or asks the open one to take focus.
    pub fn open_register(&mut self) {
        if !matches!(self.screen, Screen::Login(_)) {
            return;
        }
        match &mut self.register {
            Some(modal) => modal.focus_requested = true,
            None => {
                self.register = Some(RegisterModal {
                    focus_requested: true,
                    ..RegisterModal::default()
                })
            }
        }
    }

    pub fn close_register(&mut self) {
        self.register = None;
    }

    pub fn submit_register(&mut self, ctx: &AppContext, now: Instant) {
        let Some(modal) = self.register.as_mut() else {
            return;
        };

        match ctx.auth.register(&modal.name, &modal.email, &modal.password) {
            Ok(_) => {
                modal.notice = Some(Notice::Success("Registration successful!".to_string()));
                modal.close_at = Some(now + ctx.config.register_dismiss_delay);
            }
            Err(e) => {
                if let AuthError::Store(source) = &e {
                    tracing::error!(error = %source, "failed to persist new user");
                }
                modal.notice = Some(Notice::Failure(e.to_string()));
            }
        }
    }

    pub fn submit_login(&mut self, ctx: &mut AppContext) {
        let Screen::Login(form) = &mut self.screen else {
            return;
        };

        match ctx.auth.login(&form.email, &form.password) {
            Ok(user) => {
                ctx.session = Some(Session {
                    user_name: user.name.clone(),
                });
                self.enter_chat(ctx, user.name);
            }
            Err(e) => form.error = Some(e.to_string()),
        }
    }

    /// Replaces the login state (and any open modal) with a fresh chat.
    pub fn enter_chat(&mut self, ctx: &AppContext, user_name: String) {
        self.register = None;
        self.screen = Screen::Chat(ChatScreen {
            input: String::new(),
            session: ChatSession::new(user_name, ctx.service.clone(), ctx.config.reply_delay),
        });
    }

    pub fn tick(&mut self, now: Instant) {
        if let Screen::Chat(chat) = &mut self.screen {
            chat.session.poll_replies();
        }
        let expired = self
            .register
            .as_ref()
            .and_then(|modal| modal.close_at)
            .is_some_and(|at| now >= at);
        if expired {
            self.register = None;
        }
    }

    pub fn view(&self, ctx: &AppContext) -> View {
        let register = self.register.as_ref().map(|modal| RegisterView {
            notice: modal.notice.clone(),
        });
        match &self.screen {
            Screen::Login(form) => View {
                title: "Chatbot - Login".to_string(),
                inner_size: [400.0, 450.0],
                resizable: false,
                body: Body::Login {
                    error: form.error.clone(),
                },
                register,
            },
            Screen::Chat(chat) => {
                let name = ctx
                    .session
                    .as_ref()
                    .map(|s| s.user_name.as_str())
                    .unwrap_or_else(|| chat.session.user_name());
                View {
                    title: format!("Gemini Chat - Logged in as {}", name),
                    inner_size: [700.0, 550.0],
                    resizable: true,
                    body: Body::Chat {
                        bubbles: chat.session.bubbles(),
                        pending: chat
                            .session
                            .reply_states()
                            .iter()
                            .filter(|(_, state)| *state == ReplyState::Pending)
                            .count(),
                    },
                    register,
                }
            }
        }
    }
}
