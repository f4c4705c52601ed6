use trackshare_types::{ContentItem, DisplayMode, FollowType, ProfileInfo, UserId};

use super::{PageError, ProfilePage};

/// Which sub-view the page renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View<'a> {
    /// No session at all; show the sign-in surface
    Guest,
    /// Viewer id known, profile not loaded yet; render nothing
    Pending,
    /// A request failed; `viewer` is set when the site header can still be shown
    Error {
        viewer: Option<&'a ProfileInfo>,
        error: &'a PageError,
    },
    /// The requested name has no owner; still inside the signed-in shell
    NotFound { viewer: &'a ProfileInfo },
    Profile(ProfileView<'a>),
}

impl View<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            View::Guest => "guest",
            View::Pending => "pending",
            View::Error { .. } => "error",
            View::NotFound { .. } => "not_found",
            View::Profile(_) => "profile",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView<'a> {
    pub viewer: &'a ProfileInfo,
    pub header: HeaderProps<'a>,
    /// Upload editor, only on the viewer's own Shares tab
    pub show_editor: bool,
    pub body: PageBody<'a>,
    pub notice: Option<&'a PageError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderProps<'a> {
    pub viewer_id: Option<UserId>,
    /// `None` while the owner lookup is still running
    pub owner_id: Option<UserId>,
    pub username: &'a str,
    pub share_count: usize,
    pub display_mode: DisplayMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageBody<'a> {
    Shares(&'a [ContentItem]),
    FollowList {
        follow_type: FollowType,
        owner_id: Option<UserId>,
    },
    History {
        viewer_id: Option<UserId>,
        owner_id: Option<UserId>,
    },
}

impl ProfilePage {
    /// Pick the sub-view for the current state
    pub fn view(&self) -> View<'_> {
        if self.session.is_anonymous() {
            return View::Guest;
        }

        if let Some(error) = self.error.as_ref().filter(|e| e.is_fatal()) {
            return View::Error {
                viewer: self.session.viewer_profile.as_ref(),
                error,
            };
        }

        let Some(viewer) = self.session.viewer_profile.as_ref() else {
            return View::Pending;
        };

        if self.target.is_not_found() {
            return View::NotFound { viewer };
        }

        let owner_id = self.target.owner_id();
        let body = match (self.display_mode, self.display_mode.follow_type()) {
            (_, Some(follow_type)) => PageBody::FollowList {
                follow_type,
                owner_id,
            },
            (DisplayMode::History, None) => PageBody::History {
                viewer_id: self.session.viewer_id,
                owner_id,
            },
            _ => PageBody::Shares(self.content.items()),
        };

        View::Profile(ProfileView {
            viewer,
            header: HeaderProps {
                viewer_id: self.session.viewer_id,
                owner_id,
                username: &self.profile_name,
                share_count: self.content.len(),
                display_mode: self.display_mode,
            },
            show_editor: self.display_mode == DisplayMode::Shares
                && viewer.username == self.profile_name,
            body,
            notice: self.error.as_ref().filter(|e| !e.is_fatal()),
        })
    }
}
