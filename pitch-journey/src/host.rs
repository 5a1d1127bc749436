//! Chat and panel hosts: a surface plus its navigation history.

use crate::content::{PanelContent, PromptContent};
use crate::error::JourneyError;
use crate::history::{
    ChatHistory, ChatHistoryPolicy, HistoryKind, PanelHistory, PanelOptions, PanelSnapshot,
    Snapshot,
};
use crate::surfaces::{ChatSurface, PanelSurface};

/// Chat prompt host. History is only touched when the caller's policy says so.
#[derive(Debug, Clone)]
pub struct ChatHost<C> {
    surface: C,
    history: ChatHistory,
    current: Option<PromptContent>,
}

impl<C: ChatSurface> ChatHost<C> {
    pub fn new(surface: C, capacity: usize) -> Self {
        Self {
            surface,
            history: ChatHistory::new(HistoryKind::Chat, capacity),
            current: None,
        }
    }

    pub fn show(&mut self, content: PromptContent, policy: ChatHistoryPolicy) {
        match policy {
            ChatHistoryPolicy::Preserve => {
                if let Some(previous) = self.current.take()
                    && !previous.same_view(&content)
                {
                    self.history.push(previous);
                }
            }
            ChatHistoryPolicy::Skip => {}
            ChatHistoryPolicy::Clear => self.history.clear(),
        }
        self.surface.render(&content);
        self.current = Some(content);
        self.sync_back_control();
    }

    /// Push the displayed prompt without replacing it.
    pub fn archive_current(&mut self) -> bool {
        let Some(current) = self.current.clone() else {
            return false;
        };
        let stored = self.history.push(current);
        self.sync_back_control();
        stored
    }

    /// Re-render the most recently recorded prompt.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::EmptyHistory`] when there is nothing to go back to.
    pub fn back(&mut self) -> Result<(), JourneyError> {
        let previous = self.history.pop()?;
        self.surface.render(&previous);
        self.current = Some(previous);
        self.sync_back_control();
        Ok(())
    }

    pub fn hide(&mut self) {
        self.surface.hide();
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.sync_back_control();
    }

    /// Forget the displayed prompt and all history.
    pub fn reset(&mut self) {
        self.surface.hide();
        self.current = None;
        self.clear_history();
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.surface.is_open()
    }

    #[must_use]
    pub const fn current(&self) -> Option<&PromptContent> {
        self.current.as_ref()
    }

    #[must_use]
    pub const fn history(&self) -> &ChatHistory {
        &self.history
    }

    #[must_use]
    pub const fn surface(&self) -> &C {
        &self.surface
    }

    pub const fn surface_mut(&mut self) -> &mut C {
        &mut self.surface
    }

    fn sync_back_control(&mut self) {
        self.surface
            .set_back_enabled(self.history.peek_non_empty());
    }
}

/// Side panel host. Showing a panel records what was on screen first.
#[derive(Debug, Clone)]
pub struct PanelHost<P> {
    surface: P,
    history: PanelHistory,
    current: Option<PanelContent>,
}

impl<P: PanelSurface> PanelHost<P> {
    pub fn new(surface: P, capacity: usize) -> Self {
        Self {
            surface,
            history: PanelHistory::new(HistoryKind::Panel, capacity),
            current: None,
        }
    }

    /// Show a new panel at the top of its body.
    pub fn show(&mut self, content: PanelContent, options: PanelOptions) {
        if options.clear_history {
            self.history.clear();
        } else if self.surface.is_open()
            && let Some(previous) = self.current.take()
            && previous != content
        {
            self.history.push(PanelSnapshot {
                content: previous,
                scroll_offset: self.surface.scroll_offset(),
            });
        }
        self.surface.render(&content, 0);
        self.current = Some(content);
        self.sync_back_control();
    }

    /// Re-render the displayed panel in place, keeping scroll and history.
    pub fn replace(&mut self, content: PanelContent) {
        let offset = self.surface.scroll_offset();
        self.surface.render(&content, offset);
        self.current = Some(content);
    }

    /// Restore the previous panel and its scroll position.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::EmptyHistory`] when there is nothing to go back to.
    pub fn back(&mut self) -> Result<(), JourneyError> {
        let snapshot = self.history.pop()?;
        self.surface
            .render(&snapshot.content, snapshot.scroll_offset);
        self.current = Some(snapshot.content);
        self.sync_back_control();
        Ok(())
    }

    pub fn hide(&mut self) {
        self.surface.hide();
    }

    pub fn reset(&mut self) {
        self.surface.hide();
        self.current = None;
        self.history.clear();
        self.sync_back_control();
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.surface.is_open()
    }

    #[must_use]
    pub const fn current(&self) -> Option<&PanelContent> {
        self.current.as_ref()
    }

    #[must_use]
    pub const fn history(&self) -> &PanelHistory {
        &self.history
    }

    #[must_use]
    pub const fn surface(&self) -> &P {
        &self.surface
    }

    pub const fn surface_mut(&mut self) -> &mut P {
        &mut self.surface
    }

    fn sync_back_control(&mut self) {
        self.surface
            .set_back_enabled(self.history.peek_non_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{PanelKind, PanelSection};
    use crate::dashboard::Breadcrumbs;
    use crate::headless::{HeadlessChat, HeadlessPanel};

    fn prompt(title: &str) -> PromptContent {
        PromptContent::new(title).line(format!("{title} body"))
    }

    fn panel(title: &str) -> PanelContent {
        PanelContent {
            kind: PanelKind::Evidence,
            title: title.to_string(),
            breadcrumbs: Breadcrumbs::new(),
            sections: vec![PanelSection::plain(vec![title.to_string()])],
        }
    }

    #[test]
    fn chat_policies_preserve_skip_and_clear() {
        let mut host = ChatHost::new(HeadlessChat::default(), 8);
        host.show(prompt("one"), ChatHistoryPolicy::Skip);
        assert!(host.history().is_empty());
        assert!(!host.surface().back_enabled);

        host.show(prompt("two"), ChatHistoryPolicy::Preserve);
        assert_eq!(host.history().len(), 1);
        assert!(host.surface().back_enabled);

        host.show(prompt("three"), ChatHistoryPolicy::Skip);
        assert_eq!(host.history().len(), 1);

        host.show(prompt("four"), ChatHistoryPolicy::Clear);
        assert!(host.history().is_empty());
        assert_eq!(host.current().unwrap().title, "four");
        assert!(!host.surface().back_enabled);
    }

    #[test]
    fn chat_preserve_does_not_record_a_rerender() {
        let mut host = ChatHost::new(HeadlessChat::default(), 8);
        host.show(prompt("same"), ChatHistoryPolicy::Skip);
        host.show(prompt("same"), ChatHistoryPolicy::Preserve);
        host.show(prompt("same"), ChatHistoryPolicy::Preserve);
        assert!(host.history().is_empty());
    }

    #[test]
    fn chat_back_restores_previous_prompt_verbatim() {
        let mut host = ChatHost::new(HeadlessChat::default(), 8);
        host.show(prompt("one"), ChatHistoryPolicy::Skip);
        host.show(prompt("two"), ChatHistoryPolicy::Preserve);
        host.back().unwrap();
        assert_eq!(host.surface().shown.as_ref(), Some(&prompt("one")));
        assert_eq!(host.current(), Some(&prompt("one")));
        assert!(matches!(
            host.back(),
            Err(JourneyError::EmptyHistory {
                stack: HistoryKind::Chat
            })
        ));
    }

    #[test]
    fn archive_records_the_displayed_prompt_once() {
        let mut host = ChatHost::new(HeadlessChat::default(), 8);
        assert!(!host.archive_current());
        host.show(prompt("one"), ChatHistoryPolicy::Skip);
        assert!(host.archive_current());
        assert!(!host.archive_current());
        assert_eq!(host.history().len(), 1);
    }

    #[test]
    fn panel_auto_pushes_the_open_panel_with_scroll() {
        let mut host = PanelHost::new(HeadlessPanel::default(), 8);
        host.show(panel("a"), PanelOptions::default());
        assert!(host.history().is_empty());

        host.surface_mut().scroll_to(120);
        host.show(panel("b"), PanelOptions::default());
        assert_eq!(host.history().len(), 1);
        assert_eq!(host.surface().scroll, 0);
        assert!(host.surface().back_enabled);

        host.back().unwrap();
        assert_eq!(host.current(), Some(&panel("a")));
        assert_eq!(host.surface().scroll, 120);
        assert!(!host.surface().back_enabled);
    }

    #[test]
    fn panel_skips_push_when_hidden_or_rerendering() {
        let mut host = PanelHost::new(HeadlessPanel::default(), 8);
        host.show(panel("a"), PanelOptions::default());
        host.show(panel("a"), PanelOptions::default());
        assert!(host.history().is_empty());

        host.hide();
        host.show(panel("b"), PanelOptions::default());
        assert!(host.history().is_empty());
    }

    #[test]
    fn panel_clear_option_drops_history() {
        let mut host = PanelHost::new(HeadlessPanel::default(), 8);
        host.show(panel("a"), PanelOptions::default());
        host.show(panel("b"), PanelOptions::default());
        host.show(panel("c"), PanelOptions::clearing());
        assert!(host.history().is_empty());
        assert!(host.back().is_err());
    }

    #[test]
    fn panel_replace_keeps_scroll_and_history() {
        let mut host = PanelHost::new(HeadlessPanel::default(), 8);
        host.show(panel("a"), PanelOptions::default());
        host.show(panel("b"), PanelOptions::default());
        host.surface_mut().scroll_to(40);
        host.replace(panel("b2"));
        assert_eq!(host.surface().scroll, 40);
        assert_eq!(host.history().len(), 1);
        assert_eq!(host.current(), Some(&panel("b2")));
    }
}
