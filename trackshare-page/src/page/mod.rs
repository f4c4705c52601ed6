//! Profile view controller.
//!
//! [`ProfilePage`] is a synchronous state machine: every asynchronous fact the
//! page learns about arrives as a [`PageEvent`], is applied in order against the
//! current state, and may produce [`Effect`]s describing the requests that
//! should be made next. Nothing in this module performs I/O.

use std::collections::VecDeque;

use trackshare_types::{ContentItem, DisplayMode, OwnerLookup, PostId, ProfileInfo, UserId};

use crate::config::PageOptions;

pub mod state;
pub use state::*;
pub mod identity;
pub mod reconciler;
pub use reconciler::{reconcile, ContentRequest, ContentSignal, Reconciliation};
pub mod session;
pub use session::SessionEvent;
pub mod tabs;
pub mod view;
pub use view::*;


/// A request the page wants made on its behalf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadViewerProfile {
        viewer_id: UserId,
    },
    ResolveOwner {
        token: RequestToken,
        name: String,
    },
    LoadInitialContent {
        token: RequestToken,
        owner_id: UserId,
    },
    ResolveUpdatedContent {
        token: RequestToken,
        refresh: u64,
        new_item_id: PostId,
        current: Vec<ContentItem>,
    },
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Effect::LoadViewerProfile { .. } => "load_viewer_profile",
            Effect::ResolveOwner { .. } => "resolve_owner",
            Effect::LoadInitialContent { .. } => "load_initial_content",
            Effect::ResolveUpdatedContent { .. } => "resolve_updated_content",
        }
    }
}

/// Everything that can change the page's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Session(SessionEvent),
    ViewerProfile {
        viewer_id: UserId,
        outcome: Result<ProfileInfo, String>,
    },
    OwnerLookup {
        token: RequestToken,
        outcome: Result<OwnerLookup, String>,
    },
    Content {
        token: RequestToken,
        signal: ContentSignal,
    },
    ContentFailed {
        token: RequestToken,
        request: ContentRequest,
        reason: String,
    },
    SelectTab(DisplayMode),
    Navigate {
        name: String,
    },
}

/// View state of one mounted profile page
#[derive(Debug, Clone)]
pub struct ProfilePage {
    profile_name: String,
    session: ViewerSession,
    target: ProfileTarget,
    content: ContentList,
    display_mode: DisplayMode,
    viewer_gate: RequestGate<UserId>,
    owner_gate: RequestGate<String>,
    content_gate: RequestGate<UserId>,
    pending: Option<PendingIncrement>,
    /// Increments waiting for the pending one to settle
    queued: VecDeque<PostId>,
    error: Option<PageError>,
    generation: u64,
    refresh_seq: u64,
    options: PageOptions,
}

impl ProfilePage {
    /// Mount the page for `profile_name`
    ///
    /// A known viewer id without a profile asks for the profile; a profile that
    /// is already available starts the owner lookup straight away.
    pub fn mount(
        profile_name: impl Into<String>,
        viewer_id: Option<UserId>,
        viewer_profile: Option<ProfileInfo>,
        options: PageOptions,
    ) -> (Self, Vec<Effect>) {
        let mut page = Self {
            profile_name: profile_name.into(),
            session: ViewerSession {
                viewer_id,
                viewer_profile: None,
            },
            target: ProfileTarget::unresolved(),
            content: ContentList::default(),
            display_mode: DisplayMode::default(),
            viewer_gate: RequestGate::default(),
            owner_gate: RequestGate::default(),
            content_gate: RequestGate::default(),
            pending: None,
            queued: VecDeque::new(),
            error: None,
            generation: 0,
            refresh_seq: 0,
            options,
        };

        log_debug!(page.options.log_config, "mounting page for {}", page.profile_name);

        let mut effects = Vec::new();
        match (viewer_profile, viewer_id) {
            (Some(profile), _) => page.sign_in(profile, &mut effects),
            (None, Some(id)) => page.request_viewer_profile(id, &mut effects),
            (None, None) => {}
        }
        (page, effects)
    }

    /// Apply one event and return the requests it makes necessary
    pub fn apply(&mut self, event: PageEvent) -> Vec<Effect> {
        let mut effects = Vec::new();

        match event {
            PageEvent::Session(SessionEvent::SignedIn(profile)) => {
                self.sign_in(profile, &mut effects)
            }
            PageEvent::Session(SessionEvent::SignedOut) => self.sign_out(),
            PageEvent::ViewerProfile { viewer_id, outcome } => {
                self.apply_viewer_profile(viewer_id, outcome, &mut effects)
            }
            PageEvent::OwnerLookup { token, outcome } => self.apply_owner_lookup(token, outcome),
            PageEvent::Content { token, signal } => {
                self.apply_content(token, signal, &mut effects)
            }
            PageEvent::ContentFailed {
                token,
                request,
                reason,
            } => self.apply_content_failure(token, request, reason, &mut effects),
            PageEvent::SelectTab(mode) => self.select(mode),
            PageEvent::Navigate { name } => self.navigate(name, &mut effects),
        }

        self.request_initial_content(&mut effects);

        for effect in &effects {
            log_api_call!(self.options.log_config, "requesting {}", effect.name());
        }
        effects
    }

    /// Report a freshly shared post together with the list the store now holds
    pub fn notify_increment(&mut self, new_item_id: PostId, list: Vec<ContentItem>) -> Vec<Effect> {
        let token = self.token();
        self.apply(PageEvent::Content {
            token,
            signal: ContentSignal::Increment { new_item_id, list },
        })
    }

    /// Clear the current error and re-issue whatever request produced it
    pub fn retry(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();

        match self.error.take() {
            Some(PageError::ViewerProfile(_)) => {
                if let Some(id) = self.session.viewer_id {
                    self.viewer_gate.reset();
                    self.request_viewer_profile(id, &mut effects);
                }
            }
            Some(PageError::OwnerLookup(_)) => {
                self.owner_gate.reset();
                self.begin_owner_lookup(&mut effects);
            }
            Some(PageError::Content(_)) => self.content_gate.reset(),
            Some(PageError::IncrementUnmatched(_)) | None => {}
        }

        self.request_initial_content(&mut effects);
        effects
    }

    /// Token for a request issued against the current state
    pub fn token(&self) -> RequestToken {
        RequestToken {
            generation: self.generation,
            owner_id: self.target.owner_id(),
        }
    }

    /// Whether a response carrying `token` still applies to this page
    pub fn is_current(&self, token: RequestToken) -> bool {
        token.generation == self.generation
            && token
                .owner_id
                .map_or(true, |owner| Some(owner) == self.target.owner_id())
    }

    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    pub fn session(&self) -> &ViewerSession {
        &self.session
    }

    pub fn target(&self) -> &ProfileTarget {
        &self.target
    }

    pub fn content(&self) -> &ContentList {
        &self.content
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn pending_increment(&self) -> Option<&PendingIncrement> {
        self.pending.as_ref()
    }

    /// New posts waiting for their turn to be refreshed
    pub fn queued_increments(&self) -> impl Iterator<Item = PostId> + '_ {
        self.queued.iter().copied()
    }

    pub fn error(&self) -> Option<&PageError> {
        self.error.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether any request gate is waiting on a response
    pub fn has_requests_in_flight(&self) -> bool {
        self.viewer_gate.is_in_flight()
            || self.owner_gate.is_in_flight()
            || self.content_gate.is_in_flight()
            || self.pending.is_some()
    }

    /// Keep a fatal error over a notice
    fn record_error(&mut self, error: PageError) {
        let keep_current = matches!(&self.error, Some(current) if current.is_fatal());
        if error.is_fatal() || !keep_current {
            self.error = Some(error);
        }
    }
}
