use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use trackshare_page::api::{ApiError, ApiResult};
use trackshare_page::config::PageOptions;
use trackshare_page::page::{PageBody, PageError, PageEvent, SessionEvent, View};
use trackshare_page::services::{ContentService, IdentityService, SessionService};
use trackshare_page::{PageDriver, Services};
use trackshare_types::{ContentItem, DisplayMode, OwnerLookup, PostId, ProfileInfo, UserId};

fn item(id: i64) -> ContentItem {
    ContentItem {
        id: PostId(id),
        title: format!("song {}", id),
        creator: "artist".to_string(),
        tags: Default::default(),
    }
}

fn profile(id: i64, username: &str) -> ProfileInfo {
    ProfileInfo {
        user_id: UserId(id),
        username: username.to_string(),
        bio: None,
    }
}

/// In-memory stand-in for the TrackShare server with one profile owner, alice (42)
#[derive(Default)]
struct FakeBackend {
    profiles: HashMap<UserId, ProfileInfo>,
    shares: Mutex<Vec<ContentItem>>,
    calls: Mutex<Vec<&'static str>>,
    fail_content: AtomicBool,
    lookup_gate: Option<Arc<Notify>>,
}

impl FakeBackend {
    fn new(shares: Vec<ContentItem>) -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(UserId(7), profile(7, "bob"));
        profiles.insert(UserId(42), profile(42, "alice"));
        Self {
            profiles,
            shares: Mutex::new(shares),
            ..Default::default()
        }
    }

    fn share(&self, item: ContentItem) {
        self.shares.lock().unwrap().push(item);
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }
}

#[async_trait]
impl SessionService for FakeBackend {
    async fn load_viewer_profile(&self, viewer_id: UserId) -> ApiResult<ProfileInfo> {
        self.record("load_viewer_profile");
        self.profiles
            .get(&viewer_id)
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("session expired".to_string()))
    }
}

#[async_trait]
impl IdentityService for FakeBackend {
    async fn resolve_owner_by_name(&self, name: &str) -> ApiResult<OwnerLookup> {
        self.record("resolve_owner");
        if let Some(gate) = &self.lookup_gate {
            gate.notified().await;
        }
        Ok(self
            .profiles
            .values()
            .find(|p| p.username == name)
            .map_or(OwnerLookup::NotFound, |p| OwnerLookup::Found(p.user_id)))
    }
}

#[async_trait]
impl ContentService for FakeBackend {
    async fn load_initial_content(&self, owner_id: UserId) -> ApiResult<Vec<ContentItem>> {
        self.record("load_initial_content");
        if self.fail_content.load(Ordering::SeqCst) {
            return Err(ApiError::Api("Server returned 500 error".to_string()));
        }
        if owner_id != UserId(42) {
            return Ok(Vec::new());
        }
        Ok(self.shares.lock().unwrap().clone())
    }

    async fn resolve_updated_content(
        &self,
        new_item_id: PostId,
        mut current: Vec<ContentItem>,
    ) -> ApiResult<Vec<ContentItem>> {
        self.record("resolve_updated_content");
        let stored = self
            .shares
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == new_item_id)
            .cloned();
        if let Some(stored) = stored {
            if !current.iter().any(|i| i.id == new_item_id) {
                current.push(stored);
            }
        }
        Ok(current)
    }
}

fn mount(backend: &Arc<FakeBackend>, name: &str, viewer_id: Option<i64>) -> PageDriver {
    PageDriver::mount(
        name,
        viewer_id.map(UserId),
        None,
        PageOptions::default(),
        Services::new(backend.clone(), backend.clone(), backend.clone()),
    )
}

#[tokio::test]
async fn test_full_load_makes_each_request_once() {
    let backend = Arc::new(FakeBackend::new(vec![item(1), item(2)]));
    let mut driver = mount(&backend, "alice", Some(7));

    driver.settle().await;

    assert_eq!(backend.count("load_viewer_profile"), 1);
    assert_eq!(backend.count("resolve_owner"), 1);
    assert_eq!(backend.count("load_initial_content"), 1);
    assert_eq!(driver.in_flight(), 0);
    assert!(!driver.page().has_requests_in_flight());

    match driver.page().view() {
        View::Profile(view) => {
            assert_eq!(view.viewer.username, "bob");
            assert_eq!(view.header.owner_id, Some(UserId(42)));
            assert_eq!(view.header.share_count, 2);
            assert!(!view.show_editor);
            assert_eq!(view.body, PageBody::Shares(&[item(1), item(2)]));
        }
        other => panic!("expected profile view, got {}", other.name()),
    }
}

#[tokio::test]
async fn test_unknown_name_renders_not_found() {
    let backend = Arc::new(FakeBackend::new(vec![]));
    let mut driver = mount(&backend, "nobody", Some(7));

    driver.settle().await;

    assert_eq!(driver.page().view().name(), "not_found");
    assert_eq!(backend.count("load_initial_content"), 0);
}

#[tokio::test]
async fn test_anonymous_mount_requests_nothing() {
    let backend = Arc::new(FakeBackend::new(vec![item(1)]));
    let mut driver = mount(&backend, "alice", None);

    driver.settle().await;

    assert_eq!(driver.page().view(), View::Guest);
    assert!(backend.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_session_signs_out() {
    let backend = Arc::new(FakeBackend::new(vec![item(1)]));
    let mut driver = mount(&backend, "alice", Some(999));

    driver.settle().await;

    assert_eq!(driver.page().view(), View::Guest);
    assert_eq!(backend.count("resolve_owner"), 0);
}

#[tokio::test]
async fn test_increment_on_unchanged_list_fetches_update() {
    let backend = Arc::new(FakeBackend::new(vec![item(1)]));
    let mut driver = mount(&backend, "alice", Some(42));
    driver.settle().await;

    backend.share(item(2));
    driver.notify_increment(PostId(2), vec![item(1)]);
    driver.settle().await;

    assert_eq!(backend.count("resolve_updated_content"), 1);
    assert_eq!(backend.count("load_initial_content"), 1);
    assert_eq!(driver.page().content().items(), &[item(1), item(2)][..]);
    assert!(driver.page().pending_increment().is_none());
}

#[tokio::test]
async fn test_increment_on_advanced_list_is_adopted() {
    let backend = Arc::new(FakeBackend::new(vec![item(1)]));
    let mut driver = mount(&backend, "alice", Some(42));
    driver.settle().await;

    driver.notify_increment(PostId(2), vec![item(1), item(2)]);
    driver.settle().await;

    assert_eq!(backend.count("resolve_updated_content"), 0);
    assert_eq!(driver.page().content().len(), 2);
}

#[tokio::test]
async fn test_overlapping_increments_both_land() {
    let backend = Arc::new(FakeBackend::new(vec![item(1)]));
    let mut driver = mount(&backend, "alice", Some(42));
    driver.settle().await;

    backend.share(item(2));
    backend.share(item(3));
    driver.notify_increment(PostId(2), vec![item(1)]);
    driver.notify_increment(PostId(3), vec![item(1)]);
    assert_eq!(driver.in_flight(), 1);
    driver.settle().await;

    assert_eq!(backend.count("resolve_updated_content"), 2);
    assert_eq!(driver.page().content().items(), &[item(1), item(2), item(3)][..]);
    assert!(!driver.page().has_requests_in_flight());
}

#[tokio::test]
async fn test_unmatched_increment_gives_up_with_notice() {
    let backend = Arc::new(FakeBackend::new(vec![item(1)]));
    let mut driver = mount(&backend, "alice", Some(42));
    driver.settle().await;

    driver.notify_increment(PostId(5), vec![item(1)]);
    driver.settle().await;

    assert_eq!(backend.count("resolve_updated_content"), 3);
    match driver.page().view() {
        View::Profile(view) => {
            assert_eq!(view.notice, Some(&PageError::IncrementUnmatched(PostId(5))));
            assert!(view.show_editor);
        }
        other => panic!("expected profile view, got {}", other.name()),
    }
}

#[tokio::test]
async fn test_content_failure_then_retry() {
    let backend = Arc::new(FakeBackend::new(vec![item(1)]));
    backend.fail_content.store(true, Ordering::SeqCst);
    let mut driver = mount(&backend, "alice", Some(7));
    driver.settle().await;

    assert!(matches!(
        driver.page().view(),
        View::Error { error: PageError::Content(_), .. }
    ));

    backend.fail_content.store(false, Ordering::SeqCst);
    driver.retry();
    driver.settle().await;

    assert_eq!(backend.count("load_initial_content"), 2);
    assert_eq!(driver.page().view().name(), "profile");
    assert_eq!(driver.page().content().len(), 1);
}

#[tokio::test]
async fn test_external_events_are_applied() {
    let backend = Arc::new(FakeBackend::new(vec![item(1)]));
    let mut driver = mount(&backend, "alice", Some(7));
    driver.settle().await;

    let tx = driver.sender();
    tx.send(PageEvent::SelectTab(DisplayMode::Following)).unwrap();
    driver.settle().await;

    assert_eq!(driver.page().display_mode(), DisplayMode::Following);
    assert_eq!(backend.count("load_initial_content"), 1);

    tx.send(PageEvent::Session(SessionEvent::SignedOut)).unwrap();
    driver.step().await;

    assert_eq!(driver.page().view(), View::Guest);
    assert!(driver.page().content().is_empty());
}

#[tokio::test]
async fn test_lookup_finishing_after_sign_out_is_dropped() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(FakeBackend {
        lookup_gate: Some(gate.clone()),
        ..FakeBackend::new(vec![item(1)])
    });
    let mut driver = PageDriver::mount(
        "alice",
        Some(UserId(7)),
        Some(profile(7, "bob")),
        PageOptions::default(),
        Services::new(backend.clone(), backend.clone(), backend.clone()),
    );
    assert_eq!(driver.in_flight(), 1);

    driver.dispatch(PageEvent::Session(SessionEvent::SignedOut));
    gate.notify_one();
    driver.settle().await;

    assert_eq!(driver.page().view(), View::Guest);
    assert!(!driver.page().target().is_resolved());
    assert_eq!(backend.count("load_initial_content"), 0);
}

#[tokio::test]
async fn test_navigation_loads_the_new_owner() {
    let backend = Arc::new(FakeBackend::new(vec![item(1)]));
    let mut driver = mount(&backend, "alice", Some(42));
    driver.settle().await;

    driver.dispatch(PageEvent::Navigate {
        name: "bob".to_string(),
    });
    driver.settle().await;

    assert_eq!(driver.page().profile_name(), "bob");
    assert_eq!(driver.page().target().owner_id(), Some(UserId(7)));
    assert!(driver.page().content().is_empty());
    assert_eq!(backend.count("resolve_owner"), 2);
    assert_eq!(backend.count("load_initial_content"), 2);
}
