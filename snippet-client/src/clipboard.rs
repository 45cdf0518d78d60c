/// Destination for copied snippet code.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), String>;
}

/// The desktop clipboard.
pub struct SystemClipboard(arboard::Clipboard);

impl SystemClipboard {
    /// Fails when no clipboard is reachable, e.g. over SSH without a display.
    pub fn open() -> Result<Self, arboard::Error> {
        arboard::Clipboard::new().map(Self)
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), String> {
        self.0.set_text(text).map_err(|err| err.to_string())
    }
}
