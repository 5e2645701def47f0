use eframe::egui;
use std::time::Duration;

use crate::chat_session::{Bubble, BubbleAlign, BubbleStyle};
use crate::chatapp::ChatApp;
use crate::screen::{Body, Notice, Screen};

const FIELD_WIDTH: f32 = 250.0;
const OWN_BUBBLE: egui::Color32 = egui::Color32::from_rgb(0x2b, 0x59, 0xc3);
const OTHER_BUBBLE: egui::Color32 = egui::Color32::from_rgb(0x33, 0x33, 0x33);
const ERROR_BUBBLE: egui::Color32 = egui::Color32::from_rgb(0x8b, 0x1e, 0x1e);
const BUBBLE_TEXT: egui::Color32 = egui::Color32::from_rgb(0xea, 0xea, 0xea);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    SubmitLogin,
    OpenRegister,
    SubmitRegister,
    CloseRegister,
    Send,
    Clear,
    ToggleTheme,
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Keep polling outstanding replies and the register auto-close timer
        ctx.request_repaint_after(Duration::from_millis(100));

        let view = self.prepare_frame(ctx);

        let mut action = match &view.body {
            Body::Login { error } => egui::CentralPanel::default()
                .show(ctx, |ui| self.render_login(ui, error.as_deref()))
                .inner,
            Body::Chat { bubbles, pending } => self.render_chat(ctx, bubbles, *pending),
        };

        if let Some(register) = &view.register {
            if let Some(register_action) = self.show_register_window(ctx, register.notice.as_ref()) {
                action = Some(register_action);
            }
        }

        if let Some(action) = action {
            self.apply(action);
            ctx.request_repaint();
        }
    }
}

impl ChatApp {
    fn apply(&mut self, action: Action) {
        match action {
            Action::SubmitLogin => self.submit_login(),
            Action::OpenRegister => self.screens.open_register(),
            Action::SubmitRegister => self.submit_register(),
            Action::CloseRegister => self.screens.close_register(),
            Action::Send => self.send_message(),
            Action::Clear => self.clear_chat(),
            Action::ToggleTheme => self.toggle_theme(),
        }
    }

    fn render_login(&mut self, ui: &mut egui::Ui, error: Option<&str>) -> Option<Action> {
        let Screen::Login(form) = self.screens.screen_mut() else {
            return None;
        };
        let mut action = None;

        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.label(egui::RichText::new("Welcome!").size(24.0).strong());
            ui.label(egui::RichText::new("Log in to continue").size(14.0));
            ui.add_space(20.0);

            let email = ui.add(
                egui::TextEdit::singleline(&mut form.email)
                    .hint_text("Email")
                    .desired_width(FIELD_WIDTH),
            );
            ui.add_space(10.0);
            let password = ui.add(
                egui::TextEdit::singleline(&mut form.password)
                    .hint_text("Password")
                    .password(true)
                    .desired_width(FIELD_WIDTH),
            );
            let enter_pressed = (email.lost_focus() || password.lost_focus())
                && ui.input(|i| i.key_pressed(egui::Key::Enter));

            ui.add_space(15.0);
            let login = ui.add_sized(
                [FIELD_WIDTH, 32.0],
                egui::Button::new(egui::RichText::new("Log in").strong()),
            );
            if login.clicked() || enter_pressed {
                action = Some(Action::SubmitLogin);
            }

            if ui
                .add(egui::Button::new("Don't have an account? Sign up").frame(false))
                .clicked()
            {
                action = Some(Action::OpenRegister);
            }

            if let Some(error) = error {
                ui.add_space(8.0);
                ui.colored_label(egui::Color32::RED, error);
            }
        });

        action
    }

    fn show_register_window(&mut self, ctx: &egui::Context, notice: Option<&Notice>) -> Option<Action> {
        let modal = self.screens.register_modal_mut()?;
        let focus = modal.take_focus_request();
        let window_id = egui::Id::new("register_window");
        let mut open = true;
        let mut action = None;

        egui::Window::new("User Registration")
            .id(window_id)
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .default_width(360.0)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new("Create your account").size(20.0).strong());
                    ui.add_space(10.0);

                    let name = ui.add(
                        egui::TextEdit::singleline(&mut modal.name)
                            .hint_text("Full name")
                            .desired_width(FIELD_WIDTH),
                    );
                    if focus {
                        name.request_focus();
                    }
                    ui.add_space(8.0);
                    ui.add(
                        egui::TextEdit::singleline(&mut modal.email)
                            .hint_text("Email")
                            .desired_width(FIELD_WIDTH),
                    );
                    ui.add_space(8.0);
                    ui.add(
                        egui::TextEdit::singleline(&mut modal.password)
                            .hint_text("Password")
                            .password(true)
                            .desired_width(FIELD_WIDTH),
                    );

                    ui.add_space(15.0);
                    let register = ui.add_sized(
                        [FIELD_WIDTH, 32.0],
                        egui::Button::new(egui::RichText::new("Sign up").strong()),
                    );
                    if register.clicked() {
                        action = Some(Action::SubmitRegister);
                    }

                    match notice {
                        Some(Notice::Success(text)) => {
                            ui.colored_label(egui::Color32::GREEN, text);
                        }
                        Some(Notice::Failure(text)) => {
                            ui.colored_label(egui::Color32::RED, text);
                        }
                        None => {}
                    }
                });
            });

        if focus {
            ctx.move_to_top(egui::LayerId::new(egui::Order::Middle, window_id));
        }
        if !open {
            action = Some(Action::CloseRegister);
        }
        action
    }

    fn render_chat(&mut self, ctx: &egui::Context, bubbles: &[Bubble], pending: usize) -> Option<Action> {
        let mut action = None;

        egui::TopBottomPanel::top("chat_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Gemini Chat").size(18.0).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Toggle Theme").clicked() {
                        action = Some(Action::ToggleTheme);
                    }
                    if ui.button("Clear").clicked() {
                        action = Some(Action::Clear);
                    }
                });
            });
        });

        let scroll_to_bottom = self
            .screens
            .chat_mut()
            .map(|chat| chat.session.take_scroll_request())
            .unwrap_or(false);

        egui::TopBottomPanel::bottom("chat_input").show(ctx, |ui| {
            let Some(chat) = self.screens.chat_mut() else {
                return;
            };
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let input_width = (ui.available_width() - 110.0).max(100.0);
                let input = ui.add(
                    egui::TextEdit::singleline(&mut chat.input)
                        .hint_text("Type your message...")
                        .desired_width(input_width),
                );
                let enter_pressed = input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let send = ui.add_sized(
                    [100.0, 28.0],
                    egui::Button::new(egui::RichText::new("Send").strong()),
                );
                if send.clicked() || enter_pressed {
                    action = Some(Action::Send);
                    input.request_focus();
                }
            });
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for bubble in bubbles {
                        render_bubble(ui, bubble);
                    }
                    if pending > 0 {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            if pending == 1 {
                                ui.label("Waiting for reply...");
                            } else {
                                ui.label(format!("Waiting for {} replies...", pending));
                            }
                        });
                    }
                    if scroll_to_bottom {
                        ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                    }
                });
        });

        action
    }
}

fn render_bubble(ui: &mut egui::Ui, bubble: &Bubble) {
    let align = match bubble.align {
        BubbleAlign::Right => egui::Align::Max,
        BubbleAlign::Left => egui::Align::Min,
    };
    let fill = match bubble.style {
        BubbleStyle::Own => OWN_BUBBLE,
        BubbleStyle::Other => OTHER_BUBBLE,
        BubbleStyle::Error => ERROR_BUBBLE,
    };

    ui.with_layout(egui::Layout::top_down(align), |ui| {
        ui.label(egui::RichText::new(&bubble.author).italics().size(12.0));
        let max_width = ui.available_width() * 0.75;
        egui::Frame::none()
            .fill(fill)
            .rounding(15.0)
            .inner_margin(egui::style::Margin::same(10.0))
            .show(ui, |ui| {
                ui.set_max_width(max_width);
                ui.label(egui::RichText::new(&bubble.text).color(BUBBLE_TEXT).size(14.0));
            });
    });
    ui.add_space(4.0);
}
