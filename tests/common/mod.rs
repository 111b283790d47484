#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use lostfound::models::*;
use lostfound::storage::{ImageStore, ImageStoreError};
use lostfound::{ClientError, ClientResult, LostFoundApi};

// ---------------- In-memory mock API (tests only) ----------------
pub struct MockApi {
    pub authenticated: bool,
    pub profile: Option<Profile>,
    pub items: HashMap<(ItemKind, String), Item>,
    /// Per-item artificial latency, to shuffle completion order.
    pub delays_ms: HashMap<String, u64>,
    pub matches: Option<Vec<MatchedItem>>,
    pub emails: HashMap<String, String>,
    pub caption: Option<String>,
    pub created: Mutex<Vec<(ItemKind, NewItem)>>,
    pub calls: AtomicUsize,
    pub email_lookups: Mutex<HashSet<String>>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self {
            authenticated: true,
            profile: None,
            items: HashMap::new(),
            delays_ms: HashMap::new(),
            matches: None,
            emails: HashMap::new(),
            caption: None,
            created: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            email_lookups: Mutex::new(HashSet::new()),
        }
    }
}

impl MockApi {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> ClientResult<()> {
        if !self.authenticated {
            return Err(ClientError::Unauthorized);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    pub fn with_item(mut self, kind: ItemKind, item: Item) -> Self {
        self.items.insert((kind, item.id.clone()), item);
        self
    }
}

fn not_found(what: &str) -> ClientError {
    ClientError::Remote { status: 404, message: format!("{what} not found") }
}

#[async_trait::async_trait]
impl LostFoundApi for MockApi {
    async fn get_profile(&self) -> ClientResult<Profile> {
        self.enter()?;
        self.profile.clone().ok_or(ClientError::Remote { status: 500, message: "profile down".into() })
    }
    async fn get_item(&self, kind: ItemKind, id: &str) -> ClientResult<Item> {
        self.enter()?;
        if let Some(ms) = self.delays_ms.get(id) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        self.items.get(&(kind, id.to_string())).cloned().ok_or_else(|| not_found(id))
    }
    async fn create_item(&self, kind: ItemKind, payload: &NewItem) -> ClientResult<Item> {
        self.enter()?;
        self.created.lock().unwrap().push((kind, payload.clone()));
        Ok(Item {
            id: "new-1".into(),
            title: payload.title.clone(),
            description: payload.description.clone(),
            location: payload.location.clone(),
            brand: payload.brand.clone(),
            image_url: payload.image_url.clone(),
            other_info: payload.other_info.clone(),
            status: ItemStatus::Pending,
            owner_id: "me".into(),
            created_at: Utc::now(),
        })
    }
    async fn get_matches(&self, _item_id: &str, _kind: ItemKind) -> ClientResult<Vec<MatchedItem>> {
        self.enter()?;
        self.matches.clone().ok_or(ClientError::Remote { status: 500, message: "matcher down".into() })
    }
    async fn get_user_email(&self, user_id: &str) -> ClientResult<String> {
        self.enter()?;
        self.email_lookups.lock().unwrap().insert(user_id.to_string());
        self.emails.get(user_id).cloned().ok_or_else(|| not_found(user_id))
    }
    async fn generate_caption(&self, _image_url: &str) -> ClientResult<String> {
        self.enter()?;
        self.caption.clone().ok_or(ClientError::Transport("caption service timed out".into()))
    }
    async fn sign_in(&self, req: &SignInRequest) -> ClientResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if req.password == "right" { Ok("issued-token".into()) } else { Err(ClientError::Remote { status: 401, message: "Invalid credentials".into() }) }
    }
    async fn sign_up(&self, _req: &SignUpRequest) -> ClientResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("issued-token".into())
    }
}

// ---------------- In-memory Mock ImageStore (tests only) ----------------
#[derive(Default)]
pub struct MockImageStore {
    pub fail: bool,
    pub uploads: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl ImageStore for MockImageStore {
    async fn upload(&self, original_name: &str, _bytes: &[u8]) -> Result<String, ImageStoreError> {
        if self.fail {
            return Err(ImageStoreError::Other("bucket unavailable".into()));
        }
        self.uploads.lock().unwrap().push(original_name.to_string());
        Ok(format!("http://storage.local/images/image-1-{original_name}"))
    }
}

pub fn item(id: &str, day: u32) -> Item {
    Item {
        id: id.into(),
        title: format!("Item {id}"),
        description: "desc".into(),
        location: "Library".into(),
        brand: None,
        image_url: None,
        other_info: Vec::new(),
        status: ItemStatus::Active,
        owner_id: "me".into(),
        created_at: Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
    }
}

pub fn profile(lost: &[&str], found: &[&str]) -> Profile {
    Profile {
        name: "Ann".into(),
        email: "ann@college.edu".into(),
        phone: Some("+1 234 567 8900".into()),
        lost_item_ids: lost.iter().map(|s| s.to_string()).collect(),
        found_item_ids: found.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn matched(id: &str, uploader: &str, location: Option<&str>) -> MatchedItem {
    MatchedItem {
        id: id.into(),
        name: format!("Match {id}"),
        image: format!("http://img/{id}.png"),
        location: location.map(str::to_string),
        uploaded_by: uploader.into(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap(),
        description: "found near the stairs".into(),
        other_info: None,
    }
}
