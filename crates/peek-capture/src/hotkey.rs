use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use global_hotkey::hotkey::HotKey;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use kanal::Sender;
use peek_types::{AppEvent, HotkeyAction};
use tokio_util::sync::CancellationToken;

/// Parse a combination like `ctrl+alt+s`
pub fn parse_hotkey(combo: &str) -> Result<HotKey> {
    combo
        .parse::<HotKey>()
        .with_context(|| format!("Invalid hotkey '{combo}'"))
}

/// Owns the OS hook and every binding registered through it
///
/// Must live on the thread running the UI event loop. Dropping it
/// unregisters whatever was registered, so a half-finished setup is
/// cleaned up too.
pub struct HotkeyRegistry {
    manager: GlobalHotKeyManager,
    bindings: Vec<(HotKey, HotkeyAction)>,
}

impl HotkeyRegistry {
    pub fn new() -> Result<Self> {
        let manager = GlobalHotKeyManager::new().context("Failed to create hotkey manager")?;

        Ok(Self {
            manager,
            bindings: Vec::new(),
        })
    }

    pub fn register(&mut self, combo: &str, action: HotkeyAction) -> Result<()> {
        let hotkey = parse_hotkey(combo)?;

        self.manager
            .register(hotkey)
            .with_context(|| format!("Failed to register hotkey '{combo}'"))?;

        tracing::info!("Registered {:?} hotkey: {}", action, combo);
        self.bindings.push((hotkey, action));
        Ok(())
    }

    /// Hotkey id to action, for the listener thread
    pub fn actions(&self) -> HashMap<u32, HotkeyAction> {
        self.bindings
            .iter()
            .map(|(hotkey, action)| (hotkey.id(), *action))
            .collect()
    }

    pub fn unregister_all(&mut self) {
        for (hotkey, action) in self.bindings.drain(..) {
            if let Err(e) = self.manager.unregister(hotkey) {
                tracing::warn!("Failed to unregister {:?} hotkey: {}", action, e);
            }
        }
    }
}

impl Drop for HotkeyRegistry {
    fn drop(&mut self) {
        self.unregister_all();
    }
}

/// Forward hotkey presses to the app loop until cancelled (blocking)
pub fn listen_hotkeys(
    actions: HashMap<u32, HotkeyAction>,
    cancel: CancellationToken,
    event_tx: Sender<AppEvent>,
) {
    let receiver = GlobalHotKeyEvent::receiver();

    while !cancel.is_cancelled() {
        let Ok(event) = receiver.recv_timeout(Duration::from_millis(50)) else {
            continue;
        };

        if !matches!(event.state, HotKeyState::Pressed) {
            continue;
        }

        match actions.get(&event.id) {
            Some(action) => {
                tracing::debug!("Hotkey pressed: {:?}", action);
                if event_tx.send(AppEvent::Hotkey(*action)).is_err() {
                    tracing::warn!("App loop closed, hotkey listener exiting");
                    break;
                }
            }
            None => tracing::debug!("Ignoring unknown hotkey id {}", event.id),
        }
    }

    tracing::info!("Hotkey listener stopping");
}
