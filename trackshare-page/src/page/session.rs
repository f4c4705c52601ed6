use trackshare_types::{ProfileInfo, UserId};

use super::{Effect, PageError, ProfilePage, ProfileTarget, RequestGate, ViewerSession};

/// Discrete notifications from the session store subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(ProfileInfo),
    SignedOut,
}

impl ProfilePage {
    pub(super) fn request_viewer_profile(&mut self, viewer_id: UserId, effects: &mut Vec<Effect>) {
        if !self.viewer_gate.is_open_for(&viewer_id) {
            return;
        }
        self.viewer_gate.begin(viewer_id);
        log_session!(self.options.log_config, "loading profile of viewer {}", viewer_id);
        effects.push(Effect::LoadViewerProfile { viewer_id });
    }

    pub(super) fn sign_in(&mut self, profile: ProfileInfo, effects: &mut Vec<Effect>) {
        let first_arrival = self.session.viewer_profile.is_none();

        log_session!(
            self.options.log_config,
            "viewer {} signed in as {}",
            profile.user_id,
            profile.username
        );

        self.viewer_gate.settle(profile.user_id);
        self.session.viewer_id = Some(profile.user_id);
        self.session.viewer_profile = Some(profile);
        if matches!(self.error, Some(PageError::ViewerProfile(_))) {
            self.error = None;
        }

        if first_arrival {
            self.begin_owner_lookup(effects);
        }
    }

    /// Completion of a `LoadViewerProfile` request
    pub(super) fn apply_viewer_profile(
        &mut self,
        viewer_id: UserId,
        outcome: Result<ProfileInfo, String>,
        effects: &mut Vec<Effect>,
    ) {
        if self.viewer_gate != RequestGate::InFlight(viewer_id) {
            log::warn!(target: "session", "dropping stale profile response for viewer {}", viewer_id);
            return;
        }

        match outcome {
            Ok(profile) => self.sign_in(profile, effects),
            Err(reason) => {
                log::warn!(target: "session", "viewer profile failed to load: {}", reason);
                self.viewer_gate.settle(viewer_id);
                self.record_error(PageError::ViewerProfile(reason));
            }
        }
    }

    /// Observed sign-out: everything but the selected tab goes back to empty
    pub(super) fn sign_out(&mut self) {
        log_session!(self.options.log_config, "viewer signed out");

        self.generation += 1;
        self.session = ViewerSession::default();
        self.target = ProfileTarget::unresolved();
        self.content.clear();
        self.viewer_gate.reset();
        self.owner_gate.reset();
        self.content_gate.reset();
        self.pending = None;
        self.queued.clear();
        self.error = None;
    }
}
