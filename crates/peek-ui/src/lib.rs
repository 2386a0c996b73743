use std::cell::Cell;

use kanal::AsyncReceiver;
use peek_config::overlay::OverlayConfig;
use peek_types::AppEvent;
use slint::{ComponentHandle, LogicalPosition, LogicalSize, PhysicalPosition, Weak};

pub mod layout;
pub mod presenter;
pub mod protection;

use self::layout::OverlayLayout;
use self::presenter::{OverlayPresenter, OverlaySurface};
use self::protection::DisplayProtection;

slint::include_modules!();

/// Overlay backed by the slint window, protection applied on first show
pub struct SlintSurface {
    window: Weak<OverlayWindow>,
    protection: Box<dyn DisplayProtection>,
    protected: Cell<bool>,
}

impl SlintSurface {
    pub fn new(window: Weak<OverlayWindow>, protection: Box<dyn DisplayProtection>) -> Self {
        Self {
            window,
            protection,
            protected: Cell::new(false),
        }
    }
}

impl OverlaySurface for SlintSurface {
    fn is_alive(&self) -> bool {
        self.window.upgrade().is_some()
    }

    fn hide(&self) {
        if let Some(w) = self.window.upgrade() {
            w.hide().ok();
        }
    }

    fn present(&self, text: &str, layout: &OverlayLayout) {
        let Some(w) = self.window.upgrade() else {
            return;
        };

        w.set_overlay_text(text.into());
        w.window()
            .set_size(LogicalSize::new(layout.width as f32, layout.height as f32));
        w.window()
            .set_position(LogicalPosition::new(layout.x as f32, layout.y as f32));

        if let Err(e) = w.show() {
            tracing::error!("[SLINT] Failed to show overlay: {}", e);
            return;
        }

        if !self.protected.get() {
            match self.protection.protect(w.window()) {
                Ok(()) => tracing::info!(
                    "[SLINT] Capture protection applied: {}",
                    self.protection.name()
                ),
                Err(e) => tracing::warn!("[SLINT] Capture protection failed: {:#}", e),
            }
            self.protected.set(true);
        }
    }
}

/// `#RRGGBB` to a slint color
pub fn parse_hex_color(hex: &str) -> Option<slint::Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    Some(slint::Color::from_rgb_u8(
        (value >> 16) as u8,
        (value >> 8) as u8,
        value as u8,
    ))
}

/// Build the overlay and run the slint event loop on the calling thread
///
/// Returns once `AppEvent::Shutdown` arrives or the window is closed.
pub fn run_overlay(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    config: OverlayConfig,
) -> anyhow::Result<()> {
    if let Some(renderer) = &config.renderer {
        tracing::info!("[SLINT] Selecting renderer: {}", renderer);
        slint::BackendSelector::new()
            .renderer_name(renderer.clone())
            .select()?;
    }

    let window = OverlayWindow::new()?;
    apply_style(&window, &config);

    {
        let weak = window.as_weak();
        let step = config.move_step;
        window.on_nudge(move |dx, dy| {
            if let Some(w) = weak.upgrade() {
                // Monitor bounds are physical pixels, so move in physical pixels too
                let scale = w.window().scale_factor();
                let current = w.window().position();
                let size = w.window().size();
                let position = (current.x, current.y);

                let screen = match peek_capture::monitor_at(position.0, position.1) {
                    Ok(bounds) => Some(bounds),
                    Err(e) => {
                        tracing::warn!("[SLINT] Screen bounds unavailable: {:#}", e);
                        None
                    }
                };

                let (x, y) = layout::nudge(
                    position,
                    (dx, dy),
                    (step as f32 * scale).round() as i32,
                    (size.width, size.height),
                    screen,
                );
                w.window().set_position(PhysicalPosition::new(x, y));
            }
        });
    }

    window.window().on_close_requested(|| {
        tracing::info!("[SLINT] Overlay closed");
        slint::quit_event_loop().ok();
        slint::CloseRequestResponse::HideWindow
    });

    let protection = protection::select(config.capture_protection);
    let surface = SlintSurface::new(window.as_weak(), protection);
    let mut presenter = OverlayPresenter::new(surface, config);

    slint::spawn_local(async move {
        while let Ok(event) = app_to_ui_rx.recv().await {
            match event {
                AppEvent::Display(text) => {
                    tracing::debug!("[SLINT] Display {} chars", text.len());
                    presenter.show(&text);
                }
                AppEvent::Shutdown => {
                    tracing::info!("[SLINT] Shutdown requested");
                    presenter.show("");
                    break;
                }
                AppEvent::Hotkey(_) => {}
            }
        }
        slint::quit_event_loop().ok();
    })?;

    // Starts hidden; stay alive until told to quit
    slint::run_event_loop_until_quit()?;
    drop(window);

    Ok(())
}

fn apply_style(window: &OverlayWindow, config: &OverlayConfig) {
    match parse_hex_color(&config.foreground) {
        Some(color) => window.set_text_color(color),
        None => tracing::warn!("Invalid foreground color '{}'", config.foreground),
    }
    match parse_hex_color(&config.background) {
        Some(color) => window.set_panel_color(color),
        None => tracing::warn!("Invalid background color '{}'", config.background),
    }
    window.set_text_size(config.font_size);
    window.set_inner_padding(config.padding as f32);
    window.set_panel_opacity(config.opacity.clamp(0.0, 1.0));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(
            parse_hex_color("#222222"),
            Some(slint::Color::from_rgb_u8(0x22, 0x22, 0x22))
        );
        assert_eq!(
            parse_hex_color("#E0e0E0"),
            Some(slint::Color::from_rgb_u8(0xe0, 0xe0, 0xe0))
        );
    }

    #[test]
    fn rejects_malformed_colors() {
        assert_eq!(parse_hex_color("222222"), None);
        assert_eq!(parse_hex_color("#2222"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }
}
