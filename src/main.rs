#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use anyhow::{Context, Result};
use eframe::egui;
use std::sync::Arc;

mod auth;
mod chat_session;
mod chatapp;
mod chatapp_ui;
mod config;
mod llmclient;
mod screen;
mod user_store;

use chatapp::{AppContext, ChatApp};
use config::AppConfig;
use llmclient::GeminiClient;

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "gemini_chat=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let service = Arc::new(GeminiClient::new(
        config.api_key.clone(),
        config.model.clone(),
        config.request_timeout,
    ));
    let context = AppContext::new(config, service);
    tracing::info!(
        model = %context.config.model,
        users = %context.auth.store().path().display(),
        "starting chat window"
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([400.0, 450.0])
            .with_resizable(false),
        ..Default::default()
    };

    eframe::run_native(
        "Chatbot - Login",
        options,
        Box::new(|cc| Box::new(ChatApp::new(cc, context))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))
}
