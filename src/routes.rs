use crate::models::ItemKind;

/// Client-side route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Auth,
    Profile,
    Report(ItemKind),
    /// Parameters stay optional here; the page rejects missing ones.
    MatchedItems { item_id: Option<String>, kind: Option<String> },
    NotFound(String),
}

fn decode(s: &str) -> String {
    urlencoding::decode(s).map(|c| c.into_owned()).unwrap_or_else(|_| s.to_string())
}

fn query_param(query: &str, name: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| decode(v))
        .filter(|v| !v.is_empty())
}

impl Route {
    pub fn parse(location: &str) -> Route {
        let (path, query) = location.split_once('?').unwrap_or((location, ""));
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["auth"] => Route::Auth,
            ["profile"] => Route::Profile,
            ["report", kind] => match kind.parse() {
                Ok(kind) => Route::Report(kind),
                Err(_) => Route::NotFound(location.to_string()),
            },
            ["matched-items"] => Route::MatchedItems { item_id: None, kind: query_param(query, "type") },
            ["matched-items", id] => Route::MatchedItems {
                item_id: Some(decode(id)).filter(|s| !s.is_empty()),
                kind: query_param(query, "type"),
            },
            _ => Route::NotFound(location.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".into(),
            Route::Auth => "/auth".into(),
            Route::Profile => "/profile".into(),
            Route::Report(kind) => format!("/report/{kind}"),
            Route::MatchedItems { item_id, kind } => {
                let mut p = format!("/matched-items/{}", urlencoding::encode(item_id.as_deref().unwrap_or("")));
                if let Some(kind) = kind {
                    p.push_str(&format!("?type={}", urlencoding::encode(kind)));
                }
                p
            }
            Route::NotFound(raw) => raw.clone(),
        }
    }

    /// Link from an item card to its match list.
    pub fn matches_for(item_id: &str, kind: ItemKind) -> Route {
        Route::MatchedItems { item_id: Some(item_id.to_string()), kind: Some(kind.to_string()) }
    }
}
