use peek_config::overlay::OverlayConfig;

use crate::layout::OverlayLayout;

/// The window primitives the presenter needs
pub trait OverlaySurface {
    /// `false` once the underlying window has been torn down
    fn is_alive(&self) -> bool;
    fn hide(&self);
    /// Resize, move, fill with `text` and raise
    fn present(&self, text: &str, layout: &OverlayLayout);
}

/// Owns the overlay's text; every call recomputes geometry from scratch
pub struct OverlayPresenter<S> {
    surface: S,
    config: OverlayConfig,
    current: String,
}

impl<S: OverlaySurface> OverlayPresenter<S> {
    pub fn new(surface: S, config: OverlayConfig) -> Self {
        Self {
            surface,
            config,
            current: String::new(),
        }
    }

    /// Empty text hides the overlay
    pub fn show(&mut self, text: &str) {
        if !self.surface.is_alive() {
            tracing::debug!("Overlay window is gone, dropping update");
            return;
        }

        self.current = text.to_string();

        if text.is_empty() {
            self.surface.hide();
            tracing::debug!("Overlay hidden");
            return;
        }

        let layout = OverlayLayout::compute(text, &self.config);
        tracing::debug!(
            "Overlay {}x{} at ({}, {}), {} lines",
            layout.width,
            layout.height,
            layout.x,
            layout.y,
            layout.lines
        );
        self.surface.present(text, &layout);
    }

    pub fn current_text(&self) -> &str {
        &self.current
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Hide,
        Present(String, OverlayLayout),
    }

    #[derive(Default)]
    struct RecordingSurface {
        dead: Cell<bool>,
        calls: RefCell<Vec<Call>>,
    }

    impl RecordingSurface {
        fn visible(&self) -> bool {
            matches!(self.calls.borrow().last(), Some(Call::Present(..)))
        }
    }

    impl OverlaySurface for RecordingSurface {
        fn is_alive(&self) -> bool {
            !self.dead.get()
        }

        fn hide(&self) {
            self.calls.borrow_mut().push(Call::Hide);
        }

        fn present(&self, text: &str, layout: &OverlayLayout) {
            self.calls
                .borrow_mut()
                .push(Call::Present(text.to_string(), *layout));
        }
    }

    fn presenter() -> OverlayPresenter<RecordingSurface> {
        OverlayPresenter::new(RecordingSurface::default(), OverlayConfig::default())
    }

    #[test]
    fn empty_text_hides_from_any_state() {
        let mut p = presenter();

        p.show("");
        assert!(!p.surface.visible());

        p.show("Processing...");
        assert!(p.surface.visible());
        p.show("");
        assert!(!p.surface.visible());

        p.show("");
        assert!(!p.surface.visible());
        assert_eq!(p.current_text(), "");
    }

    #[test]
    fn text_is_presented_with_fresh_layout() {
        let mut p = presenter();
        p.show("Hello");

        let calls = p.surface.calls.borrow();
        let Some(Call::Present(text, layout)) = calls.last() else {
            panic!("expected a present call");
        };
        assert_eq!(text, "Hello");
        assert_eq!(*layout, OverlayLayout::compute("Hello", &OverlayConfig::default()));
    }

    #[test]
    fn geometry_shrinks_back_for_shorter_text() {
        let mut p = presenter();
        p.show(&"long line ".repeat(30));
        p.show("ok");

        let calls = p.surface.calls.borrow();
        let Some(Call::Present(_, layout)) = calls.last() else {
            panic!("expected a present call");
        };
        assert_eq!(layout.width, 150);
    }

    #[test]
    fn torn_down_window_is_a_no_op() {
        let mut p = presenter();
        p.surface.dead.set(true);

        p.show("Hello");
        p.show("");

        assert!(p.surface.calls.borrow().is_empty());
        assert_eq!(p.current_text(), "");
    }
}
