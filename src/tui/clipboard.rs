//! Clipboard abstraction layer.
//!
//! The app talks to a [`ClipboardProvider`] so key handling can be tested
//! without a system clipboard.

/// Trait for clipboard operations.
pub trait ClipboardProvider {
    /// Get text from clipboard.
    fn get_text(&mut self) -> Option<String>;

    /// Set text to clipboard.
    fn set_text(&mut self, text: String) -> bool;
}

/// System clipboard implementation using arboard.
pub struct SystemClipboard;

impl ClipboardProvider for SystemClipboard {
    fn get_text(&mut self) -> Option<String> {
        let mut cb = arboard::Clipboard::new().ok()?;
        cb.get_text().ok()
    }

    fn set_text(&mut self, text: String) -> bool {
        let mut cb = match arboard::Clipboard::new() {
            Ok(cb) => cb,
            Err(e) => {
                log::warn!("clipboard unavailable: {}", e);
                return false;
            }
        };
        cb.set_text(text).is_ok()
    }
}

/// Process-local clipboard, used when no system clipboard is reachable.
#[derive(Clone, Debug, Default)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl ClipboardProvider for MemoryClipboard {
    fn get_text(&mut self) -> Option<String> {
        self.text.clone()
    }

    fn set_text(&mut self, text: String) -> bool {
        self.text = Some(text);
        true
    }
}

/// The system clipboard when one can be opened, otherwise an in-memory one.
pub fn default_clipboard() -> Box<dyn ClipboardProvider> {
    match arboard::Clipboard::new() {
        Ok(_) => Box::new(SystemClipboard),
        Err(e) => {
            log::info!("using in-memory clipboard: {}", e);
            Box::new(MemoryClipboard::default())
        }
    }
}
