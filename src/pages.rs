//! Page view-models. Each page runs its workflow on load and exposes a
//! serializable render state plus transient notices.

use serde::Serialize;
use tracing::info;

use crate::aggregate::{self, display_date, MatchResolution, PROFILE_RECENT_LIMIT};
use crate::api::LostFoundApi;
use crate::auth;
use crate::error::ClientError;
use crate::models::{ItemKind, ItemStatus, OwnedItem, Profile, ResolvedMatch};
use crate::report::{self, ReportForm};
use crate::routes::Route;
use crate::session::SessionStore;
use crate::storage::ImageStore;

pub const UNAUTHORIZED_MESSAGE: &str = "You are not authorized. Please log in.";
pub const PENDING_HINT: &str = "We'll notify you when we find a match. Please wait 48 hours.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// Toast-style notification. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(m: impl Into<String>) -> Self { Self { level: NoticeLevel::Success, message: m.into() } }
    pub fn info(m: impl Into<String>) -> Self { Self { level: NoticeLevel::Info, message: m.into() } }
    pub fn error(m: impl Into<String>) -> Self { Self { level: NoticeLevel::Error, message: m.into() } }
}

/// The first blocking notice, if any.
pub fn first_error(notices: &[Notice]) -> Option<&Notice> {
    notices.iter().find(|n| n.level == NoticeLevel::Error)
}

/// Blocking notice for a page-level failure.
fn failure_notice(err: &ClientError, fallback: &str) -> Notice {
    match err {
        ClientError::Validation(m) => Notice::error(m.clone()),
        ClientError::Unauthorized => Notice::error(UNAUTHORIZED_MESSAGE),
        _ => Notice::error(fallback),
    }
}

fn partial_notice(omitted: usize) -> Option<Notice> {
    (omitted > 0).then(|| Notice::info(format!("{omitted} item(s) could not be loaded")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    Waiting,
    Success,
    Info,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: String,
    pub tone: BadgeTone,
}

impl From<&ItemStatus> for StatusBadge {
    fn from(status: &ItemStatus) -> Self {
        let (label, tone) = match status {
            ItemStatus::Pending => ("Waiting (48h)".to_string(), BadgeTone::Waiting),
            ItemStatus::Matched => ("Match Found".to_string(), BadgeTone::Success),
            ItemStatus::Returned => ("Returned".to_string(), BadgeTone::Info),
            ItemStatus::Active => ("Active".to_string(), BadgeTone::Neutral),
            ItemStatus::Other(raw) => (raw.clone(), BadgeTone::Neutral),
        };
        Self { label, tone }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCard {
    pub id: String,
    pub kind: ItemKind,
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub other_info: Vec<String>,
    pub reported_on: String,
    pub status: ItemStatus,
    pub badge: StatusBadge,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
    pub matches_link: String,
}

impl From<&OwnedItem> for ItemCard {
    fn from(owned: &OwnedItem) -> Self {
        let item = owned.item();
        Self {
            id: item.id.clone(),
            kind: owned.kind(),
            title: item.title.clone(),
            description: item.description.clone(),
            location: item.location.clone(),
            brand: item.brand.clone(),
            image_url: item.image_url.clone(),
            other_info: item.other_info.clone(),
            reported_on: display_date(item.created_at),
            status: item.status.clone(),
            badge: StatusBadge::from(&item.status),
            hint: matches!(item.status, ItemStatus::Pending).then_some(PENDING_HINT),
            matches_link: Route::matches_for(&item.id, owned.kind()).path(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ListState<T> {
    Loaded { entries: Vec<T> },
    Failed,
}

// ---------------- Home ----------------

#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub state: ListState<ItemCard>,
    pub notices: Vec<Notice>,
}

impl HomePage {
    pub async fn load<A: LostFoundApi + ?Sized>(api: &A) -> Self {
        match aggregate::owned_items(api).await {
            Ok((_, agg)) => Self {
                state: ListState::Loaded { entries: agg.entries.iter().map(ItemCard::from).collect() },
                notices: partial_notice(agg.diagnostics.len()).into_iter().collect(),
            },
            Err(e) => Self { state: ListState::Failed, notices: vec![failure_notice(&e, "Failed to load your items")] },
        }
    }

    /// The two report entry points.
    pub fn actions() -> [Route; 2] {
        [Route::Report(ItemKind::Lost), Route::Report(ItemKind::Found)]
    }
}

// ---------------- Profile ----------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileTab {
    Active,
    History,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub matched: usize,
    pub returned: usize,
}

impl StatusCounts {
    fn tally(items: &[OwnedItem]) -> Self {
        items.iter().fold(Self::default(), |mut c, i| {
            match i.item().status {
                ItemStatus::Pending => c.pending += 1,
                ItemStatus::Matched => c.matched += 1,
                ItemStatus::Returned => c.returned += 1,
                _ => {}
            }
            c
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileHeader {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<&Profile> for ProfileHeader {
    fn from(p: &Profile) -> Self {
        Self { name: p.name.clone(), email: p.email.clone(), phone: p.phone.clone() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfilePage {
    pub header: Option<ProfileHeader>,
    /// Counted over every owned item, not only the recent ones shown.
    pub stats: StatusCounts,
    pub state: ListState<ItemCard>,
    pub notices: Vec<Notice>,
}

impl ProfilePage {
    pub async fn load<A: LostFoundApi + ?Sized>(api: &A) -> Self {
        match aggregate::owned_items(api).await {
            Ok((profile, agg)) => {
                let stats = StatusCounts::tally(&agg.entries);
                let recent = aggregate::most_recent(agg.entries, PROFILE_RECENT_LIMIT);
                Self {
                    header: Some(ProfileHeader::from(&profile)),
                    stats,
                    state: ListState::Loaded { entries: recent.iter().map(ItemCard::from).collect() },
                    notices: partial_notice(agg.diagnostics.len()).into_iter().collect(),
                }
            }
            Err(e) => Self {
                header: None,
                stats: StatusCounts::default(),
                state: ListState::Failed,
                notices: vec![failure_notice(&e, "Failed to load your profile")],
            },
        }
    }

    pub fn tab(&self, tab: ProfileTab) -> Vec<&ItemCard> {
        let ListState::Loaded { entries } = &self.state else { return Vec::new() };
        entries
            .iter()
            .filter(|c| match tab {
                ProfileTab::Active => c.status != ItemStatus::Returned,
                ProfileTab::History => c.status == ItemStatus::Returned,
            })
            .collect()
    }
}

// ---------------- Matched items ----------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MatchesState {
    Loaded { entries: Vec<ResolvedMatch> },
    NoMatches,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchedItemsPage {
    pub state: MatchesState,
    pub notices: Vec<Notice>,
}

impl MatchedItemsPage {
    /// Loads from the route parameters `:itemId` and `?type=`.
    pub async fn load<A: LostFoundApi + ?Sized>(api: &A, item_id: Option<&str>, kind: Option<&str>) -> Self {
        match aggregate::resolve_matches(api, item_id, kind).await {
            Ok(MatchResolution::NoMatches) => Self { state: MatchesState::NoMatches, notices: Vec::new() },
            Ok(MatchResolution::Matches(agg)) => Self {
                state: MatchesState::Loaded { entries: agg.entries },
                notices: Vec::new(),
            },
            Err(e) => Self { state: MatchesState::Failed, notices: vec![failure_notice(&e, "Failed to load matched items")] },
        }
    }

    pub async fn for_route<A: LostFoundApi + ?Sized>(api: &A, route: &Route) -> Self {
        match route {
            Route::MatchedItems { item_id, kind } => Self::load(api, item_id.as_deref(), kind.as_deref()).await,
            _ => Self::load(api, None, None).await,
        }
    }
}

// ---------------- Report ----------------

#[derive(Debug, Clone)]
pub struct ReportItemPage {
    pub kind: ItemKind,
    pub form: ReportForm,
    pub notices: Vec<Notice>,
}

impl ReportItemPage {
    pub fn new(kind: ItemKind) -> Self {
        Self { kind, form: ReportForm::default(), notices: Vec::new() }
    }

    pub fn heading(&self) -> &'static str {
        match self.kind {
            ItemKind::Lost => "Report Lost Item",
            ItemKind::Found => "Report Found Item",
        }
    }

    /// Submit the form. Returns where to navigate on success; on failure the
    /// form is left as is for correction.
    pub async fn submit<A: LostFoundApi + ?Sized>(&mut self, api: &A, images: Option<&dyn ImageStore>) -> Option<Route> {
        self.notices.clear();
        match report::submit_report(api, images, self.kind, &mut self.form).await {
            Ok(sub) => {
                self.notices.extend(sub.warnings.into_iter().map(Notice::info));
                self.notices.push(Notice::success("Item reported successfully!"));
                Some(Route::Home)
            }
            Err(e) => {
                let notice = match &e {
                    ClientError::ImageUpload(_) => Notice::error("Image upload failed"),
                    ClientError::Validation(m) => Notice::error(m.clone()),
                    ClientError::Unauthorized => Notice::error(UNAUTHORIZED_MESSAGE),
                    ClientError::Remote { message, .. } => Notice::error(format!("Failed to submit report: {message}")),
                    other => Notice::error(format!("Failed to submit report: {other}")),
                };
                self.notices.push(notice);
                None
            }
        }
    }
}

// ---------------- Auth ----------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

#[derive(Debug, Clone)]
pub struct AuthPage {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub notices: Vec<Notice>,
}

impl AuthPage {
    pub fn new(mode: AuthMode) -> Self {
        Self { mode, email: String::new(), password: String::new(), phone: String::new(), notices: Vec::new() }
    }

    pub fn toggle(&mut self) {
        self.mode = match self.mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        };
    }

    pub async fn submit<A: LostFoundApi + ?Sized>(&mut self, api: &A, session: &dyn SessionStore) -> Option<Route> {
        self.notices.clear();
        let result = match self.mode {
            AuthMode::SignIn => auth::sign_in(api, session, &self.email, &self.password).await,
            AuthMode::SignUp => auth::sign_up(api, session, &self.email, &self.password, Some(self.phone.as_str())).await,
        };
        match result {
            Ok(()) => {
                self.password.clear();
                info!("session established");
                self.notices.push(Notice::success(match self.mode {
                    AuthMode::SignIn => "Welcome back",
                    AuthMode::SignUp => "Account created",
                }));
                Some(Route::Home)
            }
            Err(ClientError::Validation(m)) => {
                self.notices.push(Notice::error(m));
                None
            }
            Err(ClientError::Remote { message, .. }) => {
                self.notices.push(Notice::error(message));
                None
            }
            Err(e) => {
                self.notices.push(Notice::error(format!("Authentication failed: {e}")));
                None
            }
        }
    }
}
