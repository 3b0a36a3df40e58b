/// Per-tab lifecycle across SPA navigations
use super::host::{Host, Messenger};
use super::{Directive, ScanContext};
use crate::relay::{Message, Reply};
use crate::settings::ScanSettings;
use log::{debug, info};
use std::time::Duration;

/// Owns the current scan-context and detects route changes.
///
/// Every teardown bumps the generation. Drivers tag timers and observers
/// with the generation they were armed under and drop callbacks from older
/// ones.
pub struct Session<H: Host, M: Messenger> {
    host: H,
    messenger: M,
    settings: ScanSettings,
    last_url: String,
    generation: u64,
    context: Option<ScanContext<H, M>>,
}

impl<H: Host, M: Messenger> Session<H, M> {
    pub fn new(host: H, messenger: M, settings: ScanSettings) -> Self {
        Session {
            last_url: host.page_url(),
            host,
            messenger,
            settings,
            generation: 0,
            context: None,
        }
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn context(&self) -> Option<&ScanContext<H, M>> {
        self.context.as_ref()
    }

    pub fn context_mut(&mut self) -> Option<&mut ScanContext<H, M>> {
        self.context.as_mut()
    }

    /// Build a fresh context for the current page and start it.
    pub fn start(&mut self) -> Vec<Directive<H::Node>> {
        self.teardown();
        self.last_url = self.host.page_url();
        self.context = ScanContext::new(self.host.clone(), self.messenger.clone(), self.settings);
        match self.context.as_mut() {
            Some(context) => context.start(),
            None => Vec::new(),
        }
    }

    /// Document-wide mutation hook. On a URL change the current context is
    /// dropped and the delay before `start` is returned.
    pub fn on_document_changed(&mut self) -> Option<Duration> {
        let url = self.host.page_url();
        if url == self.last_url {
            return None;
        }
        info!("navigated from {} to {}", self.last_url, url);
        self.last_url = url;
        self.teardown();
        Some(self.settings.navigation_settle())
    }

    fn teardown(&mut self) {
        if self.context.take().is_some() {
            debug!("scan-context generation {} torn down", self.generation);
        }
        self.generation += 1;
    }

    /// Messages pushed to this tab. Only state broadcasts are expected.
    pub fn on_message(&mut self, message: Message) -> Reply {
        match message {
            Message::PropertyStateUpdated(update) => {
                if let Some(context) = self.context.as_mut() {
                    context.apply_state(&update);
                }
                Reply::Ack { success: true }
            }
            other => {
                debug!("content script ignoring {:?}", other);
                Reply::failure("Unsupported message")
            }
        }
    }
}
