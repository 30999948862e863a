// Ingest pipeline: fetch external catalogs, dedupe by normalized name,
// bulk-insert what is genuinely new.

use crate::database_ops::catalog::CatalogProvider;
use crate::database_ops::db::Db;
use crate::database_ops::games::{self, Game, GameDraft};
use crate::normalization::name::clean_name;
use anyhow::{Context, Result};
use futures::future::join_all;
use std::collections::HashSet;
use tokio::sync::Mutex;

pub const DEFAULT_IOS_URL: &str =
    "https://wizz-technical-test-dev.s3.eu-west-3.amazonaws.com/ios.top100.json";
pub const DEFAULT_ANDROID_URL: &str =
    "https://wizz-technical-test-dev.s3.eu-west-3.amazonaws.com/android.top100.json";

/// One external catalog document and the platform tag stamped on its rows.
#[derive(Debug, Clone)]
pub struct CatalogSource {
    pub platform: String,
    pub url: String,
}

/// The fixed ios/android source pair, with env overrides for tests and
/// staging mirrors.
pub fn sources_from_env() -> Vec<CatalogSource> {
    use crate::util::env::env_opt;
    vec![
        CatalogSource {
            platform: "ios".to_string(),
            url: env_opt("CATALOG_IOS_URL").unwrap_or_else(|| DEFAULT_IOS_URL.to_string()),
        },
        CatalogSource {
            platform: "android".to_string(),
            url: env_opt("CATALOG_ANDROID_URL").unwrap_or_else(|| DEFAULT_ANDROID_URL.to_string()),
        },
    ]
}

/// Ingest wiring shared across worker threads.
///
/// The mutex serializes populate invocations: without it two concurrent
/// runs could both pass the dedup filter and insert duplicate names, since
/// storage enforces no uniqueness constraint.
pub struct IngestState {
    pub provider: CatalogProvider,
    pub sources: Vec<CatalogSource>,
    pub populate_lock: Mutex<()>,
}

impl IngestState {
    pub fn new(provider: CatalogProvider, sources: Vec<CatalogSource>) -> Self {
        Self {
            provider,
            sources,
            populate_lock: Mutex::new(()),
        }
    }
}

/// Fetch every configured catalog concurrently, drop drafts whose
/// normalized name is already persisted (or appeared earlier in the same
/// batch) and bulk-insert the remainder. Returns the inserted rows.
///
/// Per-platform fetch failures are already absorbed into empty batches;
/// only storage access can fail here, and it fails the whole run.
pub async fn populate(
    db: &Db,
    provider: &CatalogProvider,
    sources: &[CatalogSource],
) -> Result<Vec<Game>> {
    let batches = join_all(
        sources
            .iter()
            .map(|s| provider.fetch_platform(&s.url, &s.platform)),
    )
    .await;
    let drafts: Vec<GameDraft> = batches.into_iter().flatten().collect();
    if drafts.is_empty() {
        tracing::info!("populate: no catalog entries fetched");
        return Ok(Vec::new());
    }

    let existing = games::list_game_names(db)
        .await
        .context("loading existing game names")?;
    let mut seen: HashSet<String> = existing
        .iter()
        .map(|n| clean_name(Some(n.as_str())))
        .collect();
    let new_games = filter_new(drafts, &mut seen);

    let inserted = games::bulk_insert_games(db, &new_games)
        .await
        .context("bulk-inserting new games")?;
    tracing::info!(inserted = inserted.len(), "populate complete");
    Ok(inserted)
}

/// Keep drafts whose normalized name is not in `seen`, recording each kept
/// name so later duplicates in the same batch are dropped too. This filter
/// is the only dedup; there is no uniqueness constraint in storage.
fn filter_new(drafts: Vec<GameDraft>, seen: &mut HashSet<String>) -> Vec<GameDraft> {
    drafts
        .into_iter()
        .filter(|d| seen.insert(clean_name(Some(d.name.as_str()))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn draft(name: &str, platform: &str) -> GameDraft {
        let now = Utc::now();
        GameDraft {
            publisher_id: None,
            name: name.to_string(),
            platform: platform.to_string(),
            store_id: None,
            bundle_id: None,
            app_version: None,
            is_published: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn seen_from(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| clean_name(Some(*n))).collect()
    }

    #[test]
    fn normalization_equal_names_collide_with_existing() {
        let mut seen = seen_from(&["Pok\u{00E9}mon GO"]);
        // decomposed form of the same name
        let kept = filter_new(vec![draft("Pok\u{0065}\u{0301}mon GO", "ios")], &mut seen);
        assert!(kept.is_empty());
    }

    #[test]
    fn casing_differences_do_not_collide() {
        let mut seen = seen_from(&["Foo Bar"]);
        let kept = filter_new(vec![draft("foo bar", "ios")], &mut seen);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn disjoint_platform_batches_union_without_duplicates() {
        let mut seen = HashSet::new();
        let kept = filter_new(
            vec![
                draft("A", "ios"),
                draft("B", "ios"),
                draft("C", "android"),
                draft("D", "android"),
            ],
            &mut seen,
        );
        assert_eq!(kept.len(), 4);
    }

    #[test]
    fn intra_batch_duplicates_keep_first_occurrence() {
        let mut seen = HashSet::new();
        let kept = filter_new(
            vec![draft("Solitaire", "ios"), draft("Solitaire ", "android")],
            &mut seen,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].platform, "ios");
    }
}
