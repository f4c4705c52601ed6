// Library interface for trackshare-page
pub mod api;
pub mod config;

#[macro_use]
pub mod logging;

pub mod driver;
pub mod page;
pub mod services;

pub use driver::{PageDriver, Services};
pub use page::{Effect, PageEvent, ProfilePage, View};
