use trackshare_types::DisplayMode;

use super::ProfilePage;

impl ProfilePage {
    /// Switch the page body; never touches content or the profile target
    pub fn select(&mut self, mode: DisplayMode) {
        if self.display_mode != mode {
            log_tabs!(
                self.options.log_config,
                "tab {} -> {}",
                self.display_mode.as_str(),
                mode.as_str()
            );
        }
        self.display_mode = mode;
    }

    pub fn select_shares(&mut self) {
        self.select(DisplayMode::Shares);
    }

    pub fn select_followers(&mut self) {
        self.select(DisplayMode::Followers);
    }

    pub fn select_following(&mut self) {
        self.select(DisplayMode::Following);
    }

    pub fn select_history(&mut self) {
        self.select(DisplayMode::History);
    }
}
