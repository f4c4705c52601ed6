//! Content list reconciliation.
//!
//! Content reaches the page through three independent channels with no shared
//! correlation id: the initial load, an increment carrying only the id of a
//! just-shared post, and a refreshed list computed for such an increment. The
//! reducer infers intent from shape; for increments the length of the incoming
//! list against the held list is the only thing telling "not merged yet" from
//! "already merged upstream".
//!
//! | signal                    | condition                  | outcome                        |
//! |---------------------------|----------------------------|--------------------------------|
//! | `None`                    |                            | resolve the owner if needed    |
//! | `InitialList(list)`       |                            | adopt `list`                   |
//! | `Increment { id, list }`  | `list.len() == held.len()` | request an updated list for id |
//! | `Increment { id, list }`  | lengths differ             | adopt `list`                   |
//! | `RefreshedList { .. }`    | answers pending refresh    | adopt `list`, settle increment |
//!
//! Only one updated-list request is outstanding at a time. Each carries a
//! sequence number and only the answer to the current one is applied; further
//! increments queue until the pending one settles.

use trackshare_types::{ContentItem, PostId};

use super::{ContentList, Effect, PageError, PendingIncrement, ProfilePage, RequestToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSignal {
    /// Store notification with neither a list nor an increment
    None,
    InitialList(Vec<ContentItem>),
    Increment {
        new_item_id: PostId,
        list: Vec<ContentItem>,
    },
    /// Answer to the updated-content request numbered `refresh`
    RefreshedList {
        refresh: u64,
        list: Vec<ContentItem>,
    },
}

/// Which content request a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRequest {
    Initial,
    Updated { new_item_id: PostId, refresh: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    ResolveOwner,
    AdoptInitial(Vec<ContentItem>),
    /// The increment is already part of the incoming list
    AdoptAdvanced(Vec<ContentItem>),
    AdoptRefreshed {
        refresh: u64,
        list: Vec<ContentItem>,
    },
    RequestUpdated { new_item_id: PostId },
}

/// Decide what a content signal means against the held list
pub fn reconcile(held: &ContentList, signal: ContentSignal) -> Reconciliation {
    match signal {
        ContentSignal::None => Reconciliation::ResolveOwner,
        ContentSignal::InitialList(list) => Reconciliation::AdoptInitial(list),
        ContentSignal::Increment { new_item_id, list } if list.len() == held.len() => {
            Reconciliation::RequestUpdated { new_item_id }
        }
        ContentSignal::Increment { list, .. } => Reconciliation::AdoptAdvanced(list),
        ContentSignal::RefreshedList { refresh, list } => {
            Reconciliation::AdoptRefreshed { refresh, list }
        }
    }
}

impl ProfilePage {
    /// Issue the initial content load once the owner and viewer are both known
    pub(super) fn request_initial_content(&mut self, effects: &mut Vec<Effect>) {
        let Some(owner_id) = self.target.owner_id() else {
            return;
        };
        if !self.target.is_found() || !self.session.is_signed_in() {
            return;
        }
        if !self.content_gate.is_open_for(&owner_id) {
            return;
        }

        self.content_gate.begin(owner_id);
        log_content!(self.options.log_config, "loading shares of user {}", owner_id);
        effects.push(Effect::LoadInitialContent {
            token: self.token(),
            owner_id,
        });
    }

    pub(super) fn apply_content(
        &mut self,
        token: RequestToken,
        signal: ContentSignal,
        effects: &mut Vec<Effect>,
    ) {
        if !self.is_current(token) {
            log::warn!(
                target: "content",
                "dropping content signal for {:?} from generation {}",
                token.owner_id,
                token.generation
            );
            return;
        }
        if !self.session.is_signed_in() {
            log_content!(self.options.log_config, "ignoring content signal without a viewer");
            return;
        }

        match reconcile(&self.content, signal) {
            Reconciliation::ResolveOwner => self.begin_owner_lookup(effects),
            Reconciliation::AdoptInitial(list) => {
                if let Some(owner_id) = self.target.owner_id() {
                    self.content_gate.settle(owner_id);
                }
                log_content!(self.options.log_config, "adopting initial list of {}", list.len());
                self.content.replace(list);
            }
            Reconciliation::AdoptAdvanced(list) => {
                log_content!(
                    self.options.log_config,
                    "list already advanced from {} to {}",
                    self.content.len(),
                    list.len()
                );
                // A refresh still in flight settles against this list when it lands
                self.content.replace(list);
                let content = &self.content;
                self.queued.retain(|id| !content.contains(*id));
            }
            Reconciliation::AdoptRefreshed { refresh, list } => {
                self.adopt_refreshed(refresh, list, effects)
            }
            Reconciliation::RequestUpdated { new_item_id } => {
                self.request_updated(new_item_id, effects)
            }
        }
    }

    pub(super) fn apply_content_failure(
        &mut self,
        token: RequestToken,
        request: ContentRequest,
        reason: String,
        effects: &mut Vec<Effect>,
    ) {
        if !self.is_current(token) {
            log::warn!(target: "content", "dropping stale content failure: {}", reason);
            return;
        }

        match request {
            ContentRequest::Initial => {
                log::warn!(target: "content", "initial content load failed: {}", reason);
                if let Some(owner_id) = self.target.owner_id() {
                    self.content_gate.settle(owner_id);
                }
                self.record_error(PageError::Content(reason));
            }
            ContentRequest::Updated {
                new_item_id,
                refresh,
            } => {
                log::warn!(target: "content", "refresh for post {} failed: {}", new_item_id, reason);
                match self.pending {
                    Some(pending) if pending.refresh == refresh => {
                        self.retry_increment(pending, effects)
                    }
                    _ => {}
                }
            }
        }
    }

    fn request_updated(&mut self, new_item_id: PostId, effects: &mut Vec<Effect>) {
        let already_pending = matches!(self.pending, Some(p) if p.new_item_id == new_item_id);
        if already_pending || self.queued.contains(&new_item_id) {
            log_content!(self.options.log_config, "refresh for post {} already requested", new_item_id);
            return;
        }
        if let Some(pending) = self.pending {
            log_content!(
                self.options.log_config,
                "post {} waits for post {} to settle",
                new_item_id,
                pending.new_item_id
            );
            self.queued.push_back(new_item_id);
            return;
        }

        self.start_refresh(new_item_id, effects);
    }

    fn start_refresh(&mut self, new_item_id: PostId, effects: &mut Vec<Effect>) {
        if self.options.max_increment_refreshes == 0 {
            self.record_error(PageError::IncrementUnmatched(new_item_id));
            return;
        }
        self.issue_refresh(new_item_id, 1, effects);
    }

    fn adopt_refreshed(&mut self, refresh: u64, list: Vec<ContentItem>, effects: &mut Vec<Effect>) {
        let Some(pending) = self.pending.filter(|p| p.refresh == refresh) else {
            log::warn!(target: "content", "dropping refresh {} nothing is waiting for", refresh);
            return;
        };

        // A refresh computed from a list we no longer hold would drop whatever
        // arrived since.
        if self.content.len() != pending.basis_len {
            log::warn!(
                target: "content",
                "discarding refresh built on {} items, holding {}",
                pending.basis_len,
                self.content.len()
            );
        } else {
            self.content.replace(list);
        }

        if self.content.contains(pending.new_item_id) {
            log_content!(self.options.log_config, "post {} merged", pending.new_item_id);
            self.pending = None;
            if matches!(self.error, Some(PageError::IncrementUnmatched(_))) {
                self.error = None;
            }
            self.start_next_queued(effects);
            return;
        }

        self.retry_increment(pending, effects);
    }

    /// Refresh again if attempts remain, otherwise give up with a notice
    fn retry_increment(&mut self, pending: PendingIncrement, effects: &mut Vec<Effect>) {
        if pending.refreshes >= self.options.max_increment_refreshes {
            log::warn!(
                target: "content",
                "post {} still missing after {} refreshes",
                pending.new_item_id,
                pending.refreshes
            );
            self.pending = None;
            self.record_error(PageError::IncrementUnmatched(pending.new_item_id));
            self.start_next_queued(effects);
            return;
        }

        self.issue_refresh(pending.new_item_id, pending.refreshes + 1, effects);
    }

    fn start_next_queued(&mut self, effects: &mut Vec<Effect>) {
        while let Some(new_item_id) = self.queued.pop_front() {
            if self.content.contains(new_item_id) {
                log_content!(self.options.log_config, "queued post {} already held", new_item_id);
                continue;
            }
            self.start_refresh(new_item_id, effects);
            return;
        }
    }

    fn issue_refresh(&mut self, new_item_id: PostId, refreshes: u32, effects: &mut Vec<Effect>) {
        self.refresh_seq += 1;
        let pending = PendingIncrement {
            new_item_id,
            basis_len: self.content.len(),
            refreshes,
            refresh: self.refresh_seq,
        };
        log_content!(
            self.options.log_config,
            "refresh {} (#{}) for post {} against {} items",
            pending.refreshes,
            pending.refresh,
            pending.new_item_id,
            pending.basis_len
        );
        self.pending = Some(pending);
        effects.push(Effect::ResolveUpdatedContent {
            token: self.token(),
            refresh: pending.refresh,
            new_item_id,
            current: self.content.items().to_vec(),
        });
    }
}
