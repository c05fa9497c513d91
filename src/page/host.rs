//! Capabilities the widget needs from whatever is displaying it.

#[cfg(test)]
use std::collections::{HashMap, VecDeque};

/// Blocking dialogs.
pub trait UserInteraction {
    /// Shows a message and waits for it to be dismissed.
    fn notify(&mut self, message: &str);
    /// Asks for a line of text; `None` when the user cancels.
    fn prompt(&mut self, message: &str) -> Option<String>;
}

/// Page navigation.
pub trait Navigator {
    /// Replaces the current page.
    fn redirect(&mut self, url: &str);
    /// Opens `url` in a new browsing context.
    fn open_new(&mut self, url: &str);
}

/// Session-scoped key/value storage owned by the embedding page.
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Option<String>;
}

pub trait Host: UserInteraction + Navigator + SessionStorage {}

impl<T: UserInteraction + Navigator + SessionStorage> Host for T {}

/// Host double that replays scripted prompt answers and records every effect.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingHost {
    session: HashMap<String, String>,
    prompt_responses: VecDeque<Option<String>>,
    prompts: Vec<String>,
    notices: Vec<String>,
    opened: Vec<String>,
    redirects: Vec<String>,
}

#[cfg(test)]
impl RecordingHost {
    pub fn new() -> Self { Self::default() }

    /// Host whose session already carries the login flag under `key`.
    pub fn logged_in(key: &str) -> Self {
        let mut host = Self::new();
        host.set_session_item(key, "true");
        host
    }

    pub fn set_session_item(&mut self, key: &str, value: &str) {
        self.session.insert(key.to_string(), value.to_string());
    }

    /// Queues the answer for the next prompt. Unqueued prompts are cancelled.
    pub fn enqueue_prompt_response(&mut self, value: Option<&str>) {
        self.prompt_responses.push_back(value.map(str::to_string));
    }

    pub fn take_notices(&mut self) -> Vec<String> { std::mem::take(&mut self.notices) }
    pub fn take_prompts(&mut self) -> Vec<String> { std::mem::take(&mut self.prompts) }
    pub fn take_opened(&mut self) -> Vec<String> { std::mem::take(&mut self.opened) }
    pub fn redirects(&self) -> &[String] { &self.redirects }
}

#[cfg(test)]
impl UserInteraction for RecordingHost {
    fn notify(&mut self, message: &str) { self.notices.push(message.to_string()); }

    fn prompt(&mut self, message: &str) -> Option<String> {
        self.prompts.push(message.to_string());
        self.prompt_responses.pop_front().flatten()
    }
}

#[cfg(test)]
impl Navigator for RecordingHost {
    fn redirect(&mut self, url: &str) { self.redirects.push(url.to_string()); }
    fn open_new(&mut self, url: &str) { self.opened.push(url.to_string()); }
}

#[cfg(test)]
impl SessionStorage for RecordingHost {
    fn get_item(&self, key: &str) -> Option<String> { self.session.get(key).cloned() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_replay_in_order_then_cancel() {
        let mut host = RecordingHost::new();
        host.enqueue_prompt_response(Some("first"));
        host.enqueue_prompt_response(None);
        assert_eq!(host.prompt("a").as_deref(), Some("first"));
        assert_eq!(host.prompt("b"), None);
        assert_eq!(host.prompt("c"), None);
        assert_eq!(host.take_prompts(), ["a", "b", "c"]);
    }

    #[test]
    fn test_session_storage() {
        let host = RecordingHost::logged_in("loggedIn");
        assert_eq!(host.get_item("loggedIn").as_deref(), Some("true"));
        assert_eq!(host.get_item("other"), None);
    }
}
