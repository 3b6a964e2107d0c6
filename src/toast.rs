//! Short-lived status messages ("photo added", "memory cleared").

/// How long a message stays up, in seconds.
pub const TOAST_SECONDS: f32 = 3.0;

/// A single transient message. Showing a new one replaces the old.
#[derive(Debug, Clone, Default)]
pub struct Toast {
    message: Option<String>,
    remaining: f32,
}

impl Toast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::info!("{text}");
        self.message = Some(text);
        self.remaining = TOAST_SECONDS;
    }

    /// Count down by `delta` seconds, hiding the message when time runs out.
    pub fn tick(&mut self, delta: f32) {
        if self.message.is_none() {
            return;
        }
        self.remaining -= delta.max(0.0);
        if self.remaining <= 0.0 {
            self.message = None;
            self.remaining = 0.0;
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_expires() {
        let mut toast = Toast::new();
        toast.show("saved");
        toast.tick(2.9);
        assert_eq!(toast.message(), Some("saved"));
        toast.tick(0.2);
        assert_eq!(toast.message(), None);
    }

    #[test]
    fn test_new_message_restarts_timer() {
        let mut toast = Toast::new();
        toast.show("one");
        toast.tick(2.5);
        toast.show("two");
        toast.tick(2.5);
        assert_eq!(toast.message(), Some("two"));
    }
}
