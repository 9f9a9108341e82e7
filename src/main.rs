#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use eframe::egui;

use keytimer::gui::OverlayApp;
use keytimer::keyboard_hook::KeyboardHook;
use keytimer::settings::Settings;

fn main() -> anyhow::Result<()> {
    let settings_path = Settings::default_path();
    let (settings, load_err) = match Settings::load(&settings_path) {
        Ok(settings) => (settings, None),
        Err(err) => (Settings::default(), Some(err)),
    };
    keytimer::logging::init(settings.debug_logging);
    if let Some(err) = load_err {
        tracing::warn!(
            ?err,
            path = %settings_path.display(),
            "settings file unreadable; falling back to defaults"
        );
    }

    let mut hook = KeyboardHook::default();
    if let Err(err) = hook.activate() {
        tracing::warn!(
            ?err,
            "global keyboard hook unavailable; key display limited to focused window"
        );
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([320.0, 140.0])
            .with_decorations(false)
            .with_transparent(true)
            .with_always_on_top(),
        ..Default::default()
    };

    // The hook moves into the app, so its drop (and the uninstall) runs when
    // the window closes, whichever way that happens.
    let _ = eframe::run_native(
        "keytimer",
        native_options,
        Box::new(move |_cc| Box::new(OverlayApp::new(settings, settings_path, hook))),
    );
    Ok(())
}
