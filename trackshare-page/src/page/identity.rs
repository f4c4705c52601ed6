use trackshare_types::OwnerLookup;

use super::{Effect, PageError, ProfilePage, ProfileTarget, RequestToken};

impl ProfilePage {
    /// Ask for the owner of the current profile name, at most once per name
    pub(super) fn begin_owner_lookup(&mut self, effects: &mut Vec<Effect>) {
        if !self.session.is_signed_in() || self.target.is_resolved() {
            return;
        }
        if !self.owner_gate.is_open_for(&self.profile_name) {
            return;
        }

        self.owner_gate.begin(self.profile_name.clone());
        log_identity!(self.options.log_config, "resolving owner of {}", self.profile_name);
        effects.push(Effect::ResolveOwner {
            token: self.token(),
            name: self.profile_name.clone(),
        });
    }

    pub(super) fn apply_owner_lookup(
        &mut self,
        token: RequestToken,
        outcome: Result<OwnerLookup, String>,
    ) {
        if !self.is_current(token) {
            log::warn!(
                target: "identity",
                "dropping owner lookup from generation {} (now {})",
                token.generation,
                self.generation
            );
            return;
        }

        self.owner_gate.settle(self.profile_name.clone());

        match outcome {
            Ok(OwnerLookup::Found(owner_id)) => {
                log_identity!(self.options.log_config, "{} is user {}", self.profile_name, owner_id);
                self.target = ProfileTarget::found(owner_id);
            }
            Ok(OwnerLookup::NotFound) => {
                log_identity!(self.options.log_config, "no user named {}", self.profile_name);
                self.target = ProfileTarget::not_found();
            }
            Err(reason) => {
                log::warn!(target: "identity", "owner lookup for {} failed: {}", self.profile_name, reason);
                self.record_error(PageError::OwnerLookup(reason));
            }
        }
    }

    /// Point the page at a different profile name without remounting
    pub(super) fn navigate(&mut self, name: String, effects: &mut Vec<Effect>) {
        if name == self.profile_name {
            return;
        }

        log_identity!(self.options.log_config, "navigating from {} to {}", self.profile_name, name);

        self.generation += 1;
        self.profile_name = name;
        self.target = ProfileTarget::unresolved();
        self.content.clear();
        self.owner_gate.reset();
        self.content_gate.reset();
        self.pending = None;
        self.queued.clear();
        if !matches!(self.error, Some(PageError::ViewerProfile(_))) {
            self.error = None;
        }

        self.begin_owner_lookup(effects);
    }
}
