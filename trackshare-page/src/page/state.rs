use thiserror::Error;
use trackshare_types::{ContentItem, PostId, ProfileInfo, UserId};

/// Who is looking at the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerSession {
    pub viewer_id: Option<UserId>,
    pub viewer_profile: Option<ProfileInfo>,
}

impl ViewerSession {
    /// No session at all, not even a known id
    pub fn is_anonymous(&self) -> bool {
        self.viewer_id.is_none() && self.viewer_profile.is_none()
    }

    /// An id is known but the profile has not arrived yet
    pub fn is_pending(&self) -> bool {
        self.viewer_id.is_some() && self.viewer_profile.is_none()
    }

    pub fn is_signed_in(&self) -> bool {
        self.viewer_profile.is_some()
    }
}

/// Whose page this is.
///
/// `resolved == false` implies `found == false` and `owner_id == None`, and
/// `found` holds exactly when `owner_id` is set. Fields are private so the
/// constructors are the only way to build one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileTarget {
    owner_id: Option<UserId>,
    resolved: bool,
    found: bool,
}

impl ProfileTarget {
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn found(owner_id: UserId) -> Self {
        Self {
            owner_id: Some(owner_id),
            resolved: true,
            found: true,
        }
    }

    pub fn not_found() -> Self {
        Self {
            owner_id: None,
            resolved: true,
            found: false,
        }
    }

    pub fn owner_id(&self) -> Option<UserId> {
        self.owner_id
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn is_found(&self) -> bool {
        self.found
    }

    pub fn is_not_found(&self) -> bool {
        self.resolved && !self.found
    }
}

/// The profile's shared posts in load order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentList {
    items: Vec<ContentItem>,
}

impl ContentList {
    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: PostId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Replace the whole list
    pub fn replace(&mut self, items: Vec<ContentItem>) {
        self.items = items;
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// At-most-one-outstanding-request guard keyed by what the request was for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestGate<K> {
    #[default]
    Idle,
    InFlight(K),
    Settled(K),
}

impl<K: PartialEq> RequestGate<K> {
    /// Whether a request for `key` may be issued now
    pub fn is_open_for(&self, key: &K) -> bool {
        match self {
            RequestGate::Idle => true,
            RequestGate::InFlight(k) | RequestGate::Settled(k) => k != key,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestGate::InFlight(_))
    }

    pub fn begin(&mut self, key: K) {
        *self = RequestGate::InFlight(key);
    }

    /// Mark the request for `key` as answered; returns false if it was not in flight
    pub fn settle(&mut self, key: K) -> bool {
        let was_in_flight = matches!(self, RequestGate::InFlight(k) if *k == key);
        if was_in_flight {
            *self = RequestGate::Settled(key);
        }
        was_in_flight
    }

    pub fn reset(&mut self) {
        *self = RequestGate::Idle;
    }
}

/// A new post the reconciler is still trying to see in the held list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingIncrement {
    pub new_item_id: PostId,
    /// Held list length the outstanding refresh was computed from
    pub basis_len: usize,
    /// Refreshes issued so far
    pub refreshes: u32,
    /// Sequence number of the one refresh in flight for this increment
    pub refresh: u64,
}

/// Captured at dispatch; responses carrying an outdated token are dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    pub generation: u64,
    pub owner_id: Option<UserId>,
}

/// Failures the page shows instead of hanging
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("could not load your profile: {0}")]
    ViewerProfile(String),

    #[error("could not look up this profile: {0}")]
    OwnerLookup(String),

    #[error("could not load shared tracks: {0}")]
    Content(String),

    #[error("post {0} did not show up after refreshing")]
    IncrementUnmatched(PostId),
}

impl PageError {
    /// Fatal errors replace the page body; the rest are shown as a notice
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PageError::IncrementUnmatched(_))
    }
}
