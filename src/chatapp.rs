use eframe::egui;
use std::sync::Arc;
use std::time::Instant;

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::llmclient::GenerativeService;
use crate::screen::{ScreenController, View};
use crate::user_store::UserStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn visuals(self) -> egui::Visuals {
        match self {
            Theme::Dark => egui::Visuals::dark(),
            Theme::Light => egui::Visuals::light(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_name: String,
}

/// State shared by every screen: settings, appearance, the logged-in user and the backends.
pub struct AppContext {
    pub config: AppConfig,
    pub theme: Theme,
    pub session: Option<Session>,
    pub auth: AuthService,
    pub service: Arc<dyn GenerativeService>,
}

impl AppContext {
    pub fn new(config: AppConfig, service: Arc<dyn GenerativeService>) -> Self {
        let auth = AuthService::new(UserStore::new(config.users_path.clone()));
        Self {
            config,
            theme: Theme::Dark,
            session: None,
            auth,
            service,
        }
    }
}

pub struct ChatApp {
    pub context: AppContext,
    pub screens: ScreenController,
    applied_theme: Option<Theme>,
    applied_chrome: Option<(String, [f32; 2], bool)>,
}

impl ChatApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, context: AppContext) -> Self {
        Self {
            context,
            screens: ScreenController::new(),
            applied_theme: None,
            applied_chrome: None,
        }
    }

    pub fn toggle_theme(&mut self) {
        self.context.theme = self.context.theme.toggled();
        tracing::debug!(theme = ?self.context.theme, "theme toggled");
    }

    pub fn submit_login(&mut self) {
        self.screens.submit_login(&mut self.context);
    }

    pub fn submit_register(&mut self) {
        self.screens.submit_register(&self.context, Instant::now());
    }

    pub fn send_message(&mut self) {
        if let Some(chat) = self.screens.chat_mut() {
            chat.send();
        }
    }

    pub fn clear_chat(&mut self) {
        if let Some(chat) = self.screens.chat_mut() {
            chat.clear();
        }
    }

    /// Advances timers and collects finished replies, then derives this frame's view.
    pub fn prepare_frame(&mut self, ctx: &egui::Context) -> View {
        self.screens.tick(Instant::now());

        if self.applied_theme != Some(self.context.theme) {
            ctx.set_visuals(self.context.theme.visuals());
            self.applied_theme = Some(self.context.theme);
        }

        let view = self.screens.view(&self.context);
        let chrome = (view.title.clone(), view.inner_size, view.resizable);
        if self.applied_chrome.as_ref() != Some(&chrome) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(chrome.0.clone()));
            ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(egui::vec2(
                chrome.1[0],
                chrome.1[1],
            )));
            ctx.send_viewport_cmd(egui::ViewportCommand::Resizable(chrome.2));
            self.applied_chrome = Some(chrome);
        }
        view
    }
}
