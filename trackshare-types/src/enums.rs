use serde::{Deserialize, Serialize};

/// Which body the profile page shows under its header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Shares,
    Followers,
    Following,
    History,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 4] = [
        DisplayMode::Shares,
        DisplayMode::Followers,
        DisplayMode::Following,
        DisplayMode::History,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Shares => "shares",
            DisplayMode::Followers => "followers",
            DisplayMode::Following => "following",
            DisplayMode::History => "history",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "shares" => Some(DisplayMode::Shares),
            "followers" => Some(DisplayMode::Followers),
            "following" => Some(DisplayMode::Following),
            "history" => Some(DisplayMode::History),
            _ => None,
        }
    }

    /// The follow list this mode shows, if any
    pub fn follow_type(&self) -> Option<FollowType> {
        match self {
            DisplayMode::Followers => Some(FollowType::Followers),
            DisplayMode::Following => Some(FollowType::Following),
            DisplayMode::Shares | DisplayMode::History => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowType {
    Followers,
    Following,
}

impl FollowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowType::Followers => "followers",
            FollowType::Following => "following",
        }
    }
}
