//! Client-side fan-out / join workflows.
//!
//! Owned-items aggregation builds a user's item list from the id lists in their
//! profile. Match resolution loads candidate matches for one item and resolves
//! each uploader's email. In both, a failing sub-fetch degrades only its own
//! entry and is reported as a [`Diagnostic`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, warn};

use crate::api::LostFoundApi;
use crate::error::{ClientError, ClientResult};
use crate::fanout::{partition, settle_all};
use crate::models::{ItemKind, MatchedItem, OwnedItem, Profile, ResolvedMatch};

/// Entries kept by the profile page.
pub const PROFILE_RECENT_LIMIT: usize = 6;
/// Shown when a match carries no location.
pub const DEFAULT_LOCATION: &str = "College Campus";
/// Shown when an uploader's email cannot be resolved.
pub const UNKNOWN_EMAIL: &str = "N/A";

/// Record of an isolated sub-fetch failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub subject: String,
    pub message: String,
}

impl Diagnostic {
    fn new(subject: impl Into<String>, err: &ClientError) -> Self {
        Self { subject: subject.into(), message: err.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregated<T> {
    pub entries: Vec<T>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Default for Aggregated<T> {
    fn default() -> Self {
        Self { entries: Vec::new(), diagnostics: Vec::new() }
    }
}

/// Fetch the profile, then every item it references. The profile is load-bearing:
/// its failure fails the whole workflow.
pub async fn owned_items<A>(api: &A) -> ClientResult<(Profile, Aggregated<OwnedItem>)>
where
    A: LostFoundApi + ?Sized,
{
    let profile = api.get_profile().await.map_err(|e| {
        error!("profile fetch failed: {e}");
        e
    })?;
    let items = items_for_profile(api, &profile).await;
    Ok((profile, items))
}

/// Fetch every referenced item concurrently. Lost items come first, then found
/// items, each in profile order. Failed fetches are omitted and recorded.
pub async fn items_for_profile<A>(api: &A, profile: &Profile) -> Aggregated<OwnedItem>
where
    A: LostFoundApi + ?Sized,
{
    let refs = profile
        .lost_item_ids
        .iter()
        .map(|id| (ItemKind::Lost, id))
        .chain(profile.found_item_ids.iter().map(|id| (ItemKind::Found, id)));
    let settled = settle_all(refs.map(|(kind, id)| ((kind, id), api.get_item(kind, id)))).await;
    let (ok, failed) = partition(settled);

    let diagnostics = failed
        .into_iter()
        .map(|((kind, id), e)| {
            warn!(item_id = %id, %kind, "item fetch failed, omitting: {e}");
            metrics::increment_counter!("lostfound_partial_failures_total", "stage" => "item");
            Diagnostic::new(format!("{kind} item {id}"), &e)
        })
        .collect();
    let entries = ok
        .into_iter()
        .map(|((kind, _), item)| OwnedItem::tagged(kind, item))
        .collect();
    Aggregated { entries, diagnostics }
}

/// Newest first (stable for equal timestamps), at most `limit` entries.
pub fn most_recent(mut items: Vec<OwnedItem>, limit: usize) -> Vec<OwnedItem> {
    items.sort_by(|a, b| b.item().created_at.cmp(&a.item().created_at));
    items.truncate(limit);
    items
}

/// Profile-page variant: the owned list sorted newest first and capped.
pub async fn recent_owned_items<A>(api: &A) -> ClientResult<Aggregated<OwnedItem>>
where
    A: LostFoundApi + ?Sized,
{
    let (_, agg) = owned_items(api).await?;
    Ok(Aggregated { entries: most_recent(agg.entries, PROFILE_RECENT_LIMIT), diagnostics: agg.diagnostics })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MatchResolution {
    NoMatches,
    Matches(Aggregated<ResolvedMatch>),
}

/// Validated route input for match resolution.
fn match_params(item_id: Option<&str>, kind: Option<&str>) -> ClientResult<(String, ItemKind)> {
    let item_id = item_id.map(str::trim).filter(|s| !s.is_empty());
    let kind = kind.map(str::trim).filter(|s| !s.is_empty());
    match (item_id, kind) {
        (Some(id), Some(kind)) => Ok((id.to_string(), kind.parse()?)),
        _ => Err(ClientError::validation("Missing item ID or type")),
    }
}

/// Load candidate matches for an item and resolve each uploader's email.
///
/// Missing parameters fail before any request. An empty match list is
/// [`MatchResolution::NoMatches`], not an error.
pub async fn resolve_matches<A>(api: &A, item_id: Option<&str>, kind: Option<&str>) -> ClientResult<MatchResolution>
where
    A: LostFoundApi + ?Sized,
{
    let (item_id, kind) = match_params(item_id, kind)?;
    let matches = api.get_matches(&item_id, kind).await.map_err(|e| {
        error!(item_id = %item_id, %kind, status = ?e.status(), "matches fetch failed: {e}");
        e
    })?;
    if matches.is_empty() {
        return Ok(MatchResolution::NoMatches);
    }

    let settled = settle_all(
        matches
            .iter()
            .enumerate()
            .map(|(i, m)| (i, api.get_user_email(&m.uploaded_by))),
    )
    .await;

    let mut diagnostics = Vec::new();
    let mut entries = Vec::with_capacity(matches.len());
    for ((_, lookup), m) in settled.into_iter().zip(matches) {
        let email = match lookup {
            Ok(email) => email,
            Err(e) => {
                warn!(user_id = %m.uploaded_by, match_id = %m.id, "uploader lookup failed: {e}");
                metrics::increment_counter!("lostfound_partial_failures_total", "stage" => "uploader");
                diagnostics.push(Diagnostic::new(format!("uploader {}", m.uploaded_by), &e));
                UNKNOWN_EMAIL.to_string()
            }
        };
        entries.push(normalize_match(m, email));
    }
    Ok(MatchResolution::Matches(Aggregated { entries, diagnostics }))
}

/// Display date, e.g. `3/10/2024`.
pub fn display_date(ts: DateTime<Utc>) -> String {
    ts.format("%-m/%-d/%Y").to_string()
}

fn normalize_match(m: MatchedItem, uploader_email: String) -> ResolvedMatch {
    let location = m
        .location
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string());
    ResolvedMatch {
        created_display: display_date(m.created_at),
        id: m.id,
        name: m.name,
        image: m.image,
        location,
        uploaded_by: m.uploaded_by,
        uploader_email,
        created_at: m.created_at,
        description: m.description,
        other_info: m.other_info.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn params_require_both_values() {
        assert!(matches!(match_params(None, Some("lost")), Err(ClientError::Validation(_))));
        assert!(matches!(match_params(Some("a"), None), Err(ClientError::Validation(_))));
        assert!(matches!(match_params(Some("  "), Some("lost")), Err(ClientError::Validation(_))));
        assert_eq!(match_params(Some("a"), Some("found")).unwrap(), ("a".to_string(), ItemKind::Found));
    }

    #[test]
    fn normalizes_location_and_date() {
        let m = MatchedItem {
            id: "m1".into(),
            name: "Wallet".into(),
            image: "x".into(),
            location: Some("   ".into()),
            uploaded_by: "u".into(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap(),
            description: "d".into(),
            other_info: None,
        };
        let r = normalize_match(m, "a@b.c".into());
        assert_eq!(r.location, DEFAULT_LOCATION);
        assert_eq!(r.created_display, "3/5/2024");
        assert!(r.other_info.is_empty());
    }
}
