use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use lostfound::models::ItemKind;
use lostfound::pages::{first_error, AuthMode, AuthPage, HomePage, MatchedItemsPage, Notice, NoticeLevel, ProfilePage, ProfileTab, ReportItemPage};
use lostfound::report::ImageFile;
use lostfound::routes::Route;
use lostfound::storage::build_image_store;
use lostfound::{auth, ClientConfig, FileSessionStore, HttpApi, SessionStore};

const USAGE: &str = "usage: lostfound <command>
  login <email> <password>
  register <email> <password> [phone]
  logout
  home
  profile [--history]
  matches <item-id> <lost|found>
  open <route>                      e.g. \"/matched-items/abc?type=lost\"
  report <lost|found> --title T --location L [--description D] [--brand B]
         [--image PATH] [--info LINE]... [--generate-description]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env automatically only in debug builds.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env();
    info!("API base URL: {}", config.api_base_url);
    let store = FileSessionStore::open(config.session_file.clone());
    info!("session file: {}", store.path().display());
    let session: Arc<dyn SessionStore> = Arc::new(store);
    let api = HttpApi::new(&config, session.clone())?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((cmd, rest)) = args.split_first() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    match cmd.as_str() {
        "login" | "register" => {
            let mut page = AuthPage::new(if cmd == "login" { AuthMode::SignIn } else { AuthMode::SignUp });
            page.email = rest.first().cloned().unwrap_or_default();
            page.password = rest.get(1).cloned().unwrap_or_default();
            page.phone = rest.get(2).cloned().unwrap_or_default();
            let next = page.submit(&api, session.as_ref()).await;
            finish(&page.notices, next.map(|r| r.path()))
        }
        "logout" => {
            auth::sign_out(session.as_ref())?;
            Ok(())
        }
        "home" => {
            let page = HomePage::load(&api).await;
            let actions: Vec<String> = HomePage::actions().iter().map(Route::path).collect();
            emit(&serde_json::json!({ "page": &page, "actions": actions }))?;
            finish(&page.notices, None)
        }
        "profile" => {
            let page = ProfilePage::load(&api).await;
            let tab = if rest.iter().any(|a| a == "--history") { ProfileTab::History } else { ProfileTab::Active };
            emit(&serde_json::json!({
                "header": page.header,
                "stats": page.stats,
                "items": page.tab(tab),
            }))?;
            finish(&page.notices, None)
        }
        "matches" => {
            let page = MatchedItemsPage::load(&api, rest.first().map(String::as_str), rest.get(1).map(String::as_str)).await;
            emit(&page)?;
            finish(&page.notices, None)
        }
        "open" => {
            let route = Route::parse(rest.first().map(String::as_str).unwrap_or("/"));
            match &route {
                Route::Home => emit(&HomePage::load(&api).await),
                Route::Profile => emit(&ProfilePage::load(&api).await),
                Route::MatchedItems { .. } => emit(&MatchedItemsPage::for_route(&api, &route).await),
                other => bail!("route {} has no read-only view", other.path()),
            }
        }
        "report" => {
            let kind: ItemKind = rest.first().ok_or_else(|| anyhow!("missing item type"))?.parse()?;
            let mut page = ReportItemPage::new(kind);
            fill_report_form(&mut page, &rest[1..]).await?;
            let store = build_image_store(config.storage.as_ref()).await?;
            info!("{}", page.heading());
            let next = page.submit(&api, store.as_deref()).await;
            finish(&page.notices, next.map(|r| r.path()))
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }
}

async fn fill_report_form(page: &mut ReportItemPage, args: &[String]) -> anyhow::Result<()> {
    let mut it = args.iter();
    while let Some(flag) = it.next() {
        let mut value = || it.next().cloned().ok_or_else(|| anyhow!("{flag} needs a value"));
        match flag.as_str() {
            "--title" => page.form.title = value()?,
            "--location" => page.form.location = value()?,
            "--description" => page.form.description = value()?,
            "--brand" => page.form.brand = value()?,
            "--info" => page.form.other_info.push(value()?),
            "--image" => {
                let path = value()?;
                let bytes = tokio::fs::read(&path).await.with_context(|| format!("reading {path}"))?;
                page.form.set_image(Some(ImageFile { file_name: path, bytes }));
            }
            "--generate-description" => page.form.generate_description = true,
            other => bail!("unknown flag {other}"),
        }
    }
    Ok(())
}

fn emit<T: Serialize>(view: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(view)?);
    Ok(())
}

fn finish(notices: &[Notice], navigate_to: Option<String>) -> anyhow::Result<()> {
    for n in notices.iter().filter(|n| n.level != NoticeLevel::Error) {
        eprintln!("[{:?}] {}", n.level, n.message);
    }
    if let Some(err) = first_error(notices) {
        bail!("{}", err.message);
    }
    if let Some(path) = navigate_to {
        info!("navigate to {path}");
    }
    Ok(())
}
