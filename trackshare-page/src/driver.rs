//! Runs a [`ProfilePage`] against real services.
//!
//! Requests run concurrently as tokio tasks, but only the driver touches the
//! page: each completion comes back as a [`PageEvent`] and is applied in the
//! order it is received.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use trackshare_types::{ContentItem, PostId, ProfileInfo, UserId};

use crate::config::PageOptions;
use crate::page::{ContentRequest, ContentSignal, Effect, PageEvent, ProfilePage, SessionEvent};
use crate::services::{ContentService, IdentityService, SessionService};

/// The collaborators a page needs
#[derive(Clone)]
pub struct Services {
    pub session: Arc<dyn SessionService>,
    pub identity: Arc<dyn IdentityService>,
    pub content: Arc<dyn ContentService>,
}

impl Services {
    pub fn new(
        session: Arc<dyn SessionService>,
        identity: Arc<dyn IdentityService>,
        content: Arc<dyn ContentService>,
    ) -> Self {
        Self {
            session,
            identity,
            content,
        }
    }

    /// Use one backend, such as [`ApiClient`](crate::api::ApiClient), for everything
    pub fn from_backend<B>(backend: B) -> Self
    where
        B: SessionService + IdentityService + ContentService + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            session: backend.clone(),
            identity: backend.clone(),
            content: backend,
        }
    }
}

pub struct PageDriver {
    page: ProfilePage,
    services: Services,
    running: JoinSet<PageEvent>,
    events_tx: mpsc::UnboundedSender<PageEvent>,
    events_rx: mpsc::UnboundedReceiver<PageEvent>,
}

impl PageDriver {
    /// Mount a page and start whatever requests mounting calls for
    pub fn mount(
        profile_name: impl Into<String>,
        viewer_id: Option<UserId>,
        viewer_profile: Option<ProfileInfo>,
        options: PageOptions,
        services: Services,
    ) -> Self {
        let (page, effects) = ProfilePage::mount(profile_name, viewer_id, viewer_profile, options);
        let mut driver = Self::new(page, services);
        driver.spawn_all(effects);
        driver
    }

    pub fn new(page: ProfilePage, services: Services) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            page,
            services,
            running: JoinSet::new(),
            events_tx,
            events_rx,
        }
    }

    pub fn page(&self) -> &ProfilePage {
        &self.page
    }

    /// Channel for external event sources such as the session subscription
    pub fn sender(&self) -> mpsc::UnboundedSender<PageEvent> {
        self.events_tx.clone()
    }

    /// Number of requests still running
    pub fn in_flight(&self) -> usize {
        self.running.len()
    }

    pub fn dispatch(&mut self, event: PageEvent) {
        let effects = self.page.apply(event);
        self.spawn_all(effects);
    }

    pub fn notify_increment(&mut self, new_item_id: PostId, list: Vec<ContentItem>) {
        let effects = self.page.notify_increment(new_item_id, list);
        self.spawn_all(effects);
    }

    pub fn retry(&mut self) {
        let effects = self.page.retry();
        self.spawn_all(effects);
    }

    /// Wait for the next completion or external event and apply it
    pub async fn step(&mut self) {
        let event = tokio::select! {
            Some(event) = self.events_rx.recv() => event,
            Some(joined) = self.running.join_next(), if !self.running.is_empty() => {
                match joined {
                    Ok(event) => event,
                    Err(e) => {
                        log::error!(target: "api_calls", "request task failed: {}", e);
                        return;
                    }
                }
            }
        };
        self.dispatch(event);
    }

    /// Apply queued events and completions until nothing is left running
    pub async fn settle(&mut self) {
        loop {
            while let Ok(event) = self.events_rx.try_recv() {
                self.dispatch(event);
            }

            match self.running.join_next().await {
                Some(Ok(event)) => self.dispatch(event),
                Some(Err(e)) => {
                    log::error!(target: "api_calls", "request task failed: {}", e);
                }
                None => break,
            }
        }
    }

    fn spawn_all(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            log::debug!(target: "api_calls", "starting {}", effect.name());
            self.running.spawn(run_effect(self.services.clone(), effect));
        }
    }
}

async fn run_effect(services: Services, effect: Effect) -> PageEvent {
    match effect {
        Effect::LoadViewerProfile { viewer_id } => {
            match services.session.load_viewer_profile(viewer_id).await {
                Ok(profile) => PageEvent::ViewerProfile {
                    viewer_id,
                    outcome: Ok(profile),
                },
                Err(e) if e.is_unauthorized() => PageEvent::Session(SessionEvent::SignedOut),
                Err(e) => PageEvent::ViewerProfile {
                    viewer_id,
                    outcome: Err(e.to_string()),
                },
            }
        }
        Effect::ResolveOwner { token, name } => PageEvent::OwnerLookup {
            token,
            outcome: services
                .identity
                .resolve_owner_by_name(&name)
                .await
                .map_err(|e| e.to_string()),
        },
        Effect::LoadInitialContent { token, owner_id } => {
            match services.content.load_initial_content(owner_id).await {
                Ok(list) => PageEvent::Content {
                    token,
                    signal: ContentSignal::InitialList(list),
                },
                Err(e) => PageEvent::ContentFailed {
                    token,
                    request: ContentRequest::Initial,
                    reason: e.to_string(),
                },
            }
        }
        Effect::ResolveUpdatedContent {
            token,
            refresh,
            new_item_id,
            current,
        } => match services
            .content
            .resolve_updated_content(new_item_id, current)
            .await
        {
            Ok(list) => PageEvent::Content {
                token,
                signal: ContentSignal::RefreshedList { refresh, list },
            },
            Err(e) => PageEvent::ContentFailed {
                token,
                request: ContentRequest::Updated {
                    new_item_id,
                    refresh,
                },
                reason: e.to_string(),
            },
        },
    }
}
