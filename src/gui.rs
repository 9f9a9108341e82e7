use std::path::PathBuf;
use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, RichText, Sense, ViewportCommand};

use crate::key_display::{DisplayPhase, KeyDisplay};
use crate::keyboard_hook::{KeyEdge, KeyEvent, KeyboardHook};
use crate::local_keys::LocalKeyObserver;
use crate::settings::{self, Settings};
use crate::stopwatch::{format_hms, Stopwatch};

const FALLBACK_FOREGROUND: Color32 = Color32::from_rgb(0x00, 0xFF, 0x00);

/// The overlay application: a borderless always-on-top window showing the
/// stopwatch and the chord label. Click toggles the stopwatch, drag moves
/// the window, right-click opens the settings panel.
pub struct OverlayApp {
    settings: Settings,
    settings_path: PathBuf,
    hook: KeyboardHook,
    local_keys: LocalKeyObserver,
    key_display: KeyDisplay,
    stopwatch: Stopwatch,
    show_settings: bool,
}

impl OverlayApp {
    pub fn new(settings: Settings, settings_path: PathBuf, hook: KeyboardHook) -> Self {
        let key_display = KeyDisplay::new(settings.key_display_timings());
        let mut stopwatch = Stopwatch::new();
        stopwatch.start(Instant::now());

        Self {
            settings,
            settings_path,
            hook,
            local_keys: LocalKeyObserver::new(),
            key_display,
            stopwatch,
            show_settings: false,
        }
    }

    fn apply_event(&mut self, event: KeyEvent, now: Instant) {
        match event.edge {
            KeyEdge::Down => self.key_display.on_key_down(event.key, now),
            KeyEdge::Up => self.key_display.on_key_up(event.key, now),
        }
    }

    fn settings_window(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings;
        let mut save = false;
        egui::Window::new("Settings")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.add(
                    egui::Slider::new(&mut self.settings.key_show_seconds, 0.0..=10.0)
                        .text("key show (s)"),
                );
                ui.add(
                    egui::Slider::new(&mut self.settings.key_fade_seconds, 0.0..=5.0)
                        .text("key fade (s)"),
                );
                ui.add(
                    egui::Slider::new(&mut self.settings.key_chord_hold_seconds, 0.0..=2.0)
                        .text("chord hold (s)"),
                );
                ui.add(
                    egui::Slider::new(&mut self.settings.timer_font_size, 12.0..=96.0)
                        .text("timer font size"),
                );
                ui.add(
                    egui::Slider::new(&mut self.settings.key_font_size, 10.0..=72.0)
                        .text("key font size"),
                );
                ui.add(
                    egui::Slider::new(&mut self.settings.timer_background_opacity, 0.0..=1.0)
                        .text("background opacity"),
                );
                ui.horizontal(|ui| {
                    ui.label("timer color");
                    ui.text_edit_singleline(&mut self.settings.timer_foreground);
                });
                ui.horizontal(|ui| {
                    ui.label("key color");
                    ui.text_edit_singleline(&mut self.settings.key_foreground);
                });
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        save = true;
                    }
                    if ui.button("Reset timer").clicked() {
                        self.stopwatch.reset();
                    }
                });
                if !self.hook.is_active() {
                    ui.label(
                        RichText::new("global capture unavailable; showing focused keys only")
                            .small()
                            .color(Color32::LIGHT_RED),
                    );
                }
            });
        self.show_settings = open;

        // Durations apply from the next timer start, never to one in flight.
        self.key_display
            .set_timings(self.settings.key_display_timings());

        if save {
            if let Err(err) = self.settings.save(&self.settings_path) {
                tracing::warn!(?err, "failed to save settings");
            }
        }
    }
}

impl eframe::App for OverlayApp {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        // Global hook first (its events predate this frame), then the
        // window's own input. Duplicates collapse in the held-key set.
        for event in self.hook.drain_events() {
            self.apply_event(event, now);
        }
        let local = ctx.input(|i| self.local_keys.collect(&i.events, i.modifiers));
        for event in local {
            self.apply_event(event, now);
        }
        self.key_display.tick(now);

        let background = settings::parse_color(&self.settings.timer_background, Color32::BLACK);
        let bg_alpha = (self.settings.timer_background_opacity.clamp(0.0, 1.0) * 255.0) as u8;
        let frame = egui::Frame::none()
            .fill(Color32::from_rgba_unmultiplied(
                background.r(),
                background.g(),
                background.b(),
                bg_alpha,
            ))
            .rounding(8.0)
            .inner_margin(12.0);

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            let timer_color =
                settings::parse_color(&self.settings.timer_foreground, FALLBACK_FOREGROUND);
            let key_color =
                settings::parse_color(&self.settings.key_foreground, FALLBACK_FOREGROUND);
            let opacity = self.key_display.opacity(now);

            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new(format_hms(self.stopwatch.elapsed(now)))
                        .monospace()
                        .size(self.settings.timer_font_size)
                        .color(timer_color),
                );

                // Keep the row allocated while empty so the window height
                // does not jump when a chord appears.
                let label = self.key_display.label();
                let text = if label.is_empty() { " " } else { label };
                ui.label(
                    RichText::new(text)
                        .monospace()
                        .size(self.settings.key_font_size)
                        .color(Color32::from_rgba_unmultiplied(
                            key_color.r(),
                            key_color.g(),
                            key_color.b(),
                            (opacity * 255.0) as u8,
                        )),
                );
            });

            let response = ui.interact(
                ui.max_rect(),
                egui::Id::new("overlay-surface"),
                Sense::click_and_drag(),
            );
            if response.drag_started() {
                ctx.send_viewport_cmd(ViewportCommand::StartDrag);
            }
            if response.clicked() {
                self.stopwatch.toggle(now);
            }
            if response.secondary_clicked() {
                self.show_settings = !self.show_settings;
            }
        });

        if self.show_settings {
            self.settings_window(ctx);
        }

        // The stopwatch readout and the fade both need periodic repaints;
        // wake up for the nearer of the next timer deadline or the next
        // stopwatch second.
        if self.key_display.phase() == DisplayPhase::FadingOut {
            ctx.request_repaint();
        } else {
            let delay = self
                .key_display
                .next_deadline()
                .map(|d| d.saturating_duration_since(now))
                .unwrap_or(Duration::from_millis(100))
                .min(Duration::from_millis(100));
            ctx.request_repaint_after(delay);
        }
    }
}
