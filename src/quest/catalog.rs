//! Quest Catalog
//!
//! Loads quest JSON files from disk through the validating load path, keeps
//! the accepted quests in memory, and remembers which files were rejected
//! and why. Supports hot-reloading during development.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use super::definition::{Npc, Quest, Tier};
use super::schema::parse_quest_json;

/// A quest file that failed to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one load; swapped in as a whole
#[derive(Default)]
struct CatalogState {
    quests: HashMap<String, Arc<Quest>>,
    rejections: Vec<Rejection>,
}

/// Read-only catalog of quest definitions, keyed by file stem
pub struct QuestCatalog {
    state: RwLock<CatalogState>,
    /// Held for the duration of a load so reloads run one at a time
    reload: Mutex<()>,
    /// Directory scanned for `*.json` quest files
    quests_dir: PathBuf,
}

impl QuestCatalog {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            state: RwLock::new(CatalogState::default()),
            reload: Mutex::new(()),
            quests_dir: data_dir.join("quests"),
        }
    }

    pub fn quests_dir(&self) -> &Path {
        &self.quests_dir
    }

    /// Load every quest file, replacing whatever was loaded before.
    ///
    /// Returns the number of accepted quests. Individual bad files are
    /// recorded as rejections; only an unreadable directory is an error.
    pub async fn load_all(&self) -> Result<usize, String> {
        let _reload = self.reload.lock().await;
        info!("Loading quests from {:?}", self.quests_dir);

        let mut loaded = HashMap::new();
        let mut rejected = Vec::new();

        if self.quests_dir.exists() {
            // Collect all JSON files first, then parse them
            let mut paths = Vec::new();
            collect_quest_files(&self.quests_dir, &mut paths)?;
            paths.sort();

            for path in paths {
                match load_quest_file(&path) {
                    Ok((id, quest)) => {
                        info!("Loaded quest: {} ({})", quest.title, id);
                        if loaded.insert(id.clone(), Arc::new(quest)).is_some() {
                            warn!("Duplicate quest ID '{}' in {:?}, overwriting", id, path);
                        }
                    }
                    Err(reason) => {
                        warn!("Rejected quest {:?}: {}", path, reason);
                        rejected.push(Rejection { path, reason });
                    }
                }
            }
        } else {
            warn!("Quest directory does not exist: {:?}", self.quests_dir);
        }

        let count = loaded.len();
        info!(
            "Loaded {} quest definitions ({} rejected)",
            count,
            rejected.len()
        );

        *self.state.write().await = CatalogState {
            quests: loaded,
            rejections: rejected,
        };

        Ok(count)
    }

    /// Get a quest by ID
    pub async fn get(&self, quest_id: &str) -> Option<Arc<Quest>> {
        let state = self.state.read().await;
        state.quests.get(quest_id).cloned()
    }

    /// All quest IDs, sorted
    pub async fn ids(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut ids: Vec<String> = state.quests.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Quests handed out by a specific NPC
    pub async fn quests_for_npc(&self, npc: Npc) -> Vec<Arc<Quest>> {
        let state = self.state.read().await;
        state
            .quests
            .values()
            .filter(|q| q.associated_npc == npc)
            .cloned()
            .collect()
    }

    pub async fn quests_for_tier(&self, tier: Tier) -> Vec<Arc<Quest>> {
        let state = self.state.read().await;
        state
            .quests
            .values()
            .filter(|q| q.tier == tier)
            .cloned()
            .collect()
    }

    /// Files rejected by the most recent load
    pub async fn rejections(&self) -> Vec<Rejection> {
        self.state.read().await.rejections.clone()
    }

    /// Accepted count and rejections, taken from the same load
    pub async fn summary(&self) -> (usize, Vec<Rejection>) {
        let state = self.state.read().await;
        (state.quests.len(), state.rejections.clone())
    }

    /// Get count of loaded quests
    pub async fn count(&self) -> usize {
        self.state.read().await.quests.len()
    }

    /// Start file watcher for hot-reload
    /// Returns a channel receiver that signals when reloads occur
    pub fn start_file_watcher(
        self: &Arc<Self>,
    ) -> Result<tokio::sync::mpsc::Receiver<HotReloadEvent>, String> {
        use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
        use std::time::Duration;

        if !self.quests_dir.exists() {
            return Err(format!("Quest directory does not exist: {:?}", self.quests_dir));
        }

        // The watcher thread has no runtime of its own
        let rt = tokio::runtime::Handle::try_current()
            .map_err(|e| format!("File watcher needs a tokio runtime: {}", e))?;

        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = notify_tx.send(event);
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )
        .map_err(|e| format!("Failed to create file watcher: {}", e))?;

        watcher
            .watch(&self.quests_dir, RecursiveMode::Recursive)
            .map_err(|e| format!("Failed to watch quest directory: {}", e))?;

        info!("Quest hot-reload watcher started for {:?}", self.quests_dir);

        let (tx, rx) = tokio::sync::mpsc::channel(32);
        let catalog = Arc::clone(self);

        std::thread::spawn(move || {
            // Keep the watcher alive for as long as this thread runs
            let _watcher = watcher;

            // Channel closes when the watcher is dropped
            while let Ok(event) = notify_rx.recv() {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)) {
                    continue;
                }

                let Some(path) = event
                    .paths
                    .iter()
                    .find(|p| p.extension().is_some_and(|ext| ext == "json"))
                    .cloned()
                else {
                    continue;
                };

                info!("Detected change in {:?}, triggering reload", path);

                let catalog = Arc::clone(&catalog);
                let reply = tx.clone();
                rt.spawn(async move {
                    let event = match catalog.load_all().await {
                        Ok(_) => {
                            info!("Hot-reload completed successfully");
                            HotReloadEvent::Reloaded(path.to_string_lossy().to_string())
                        }
                        Err(e) => {
                            tracing::error!("Hot-reload failed: {}", e);
                            HotReloadEvent::Error(e)
                        }
                    };
                    let _ = reply.send(event).await;
                });

                if tx.is_closed() {
                    break;
                }
            }
        });

        Ok(rx)
    }
}

/// Recursively collect quest files (non-async to avoid boxing)
fn collect_quest_files(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<(), String> {
    let entries =
        std::fs::read_dir(dir).map_err(|e| format!("Failed to read directory {:?}: {}", dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| format!("Failed to read entry: {}", e))?;
        let path = entry.path();

        if path.is_dir() {
            collect_quest_files(&path, paths)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }

    Ok(())
}

/// Read and validate a single quest file; the ID is the file stem
fn load_quest_file(path: &Path) -> Result<(String, Quest), String> {
    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| format!("Invalid quest file name {:?}", path))?
        .to_string();

    let content =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {:?}: {}", path, e))?;

    let quest = parse_quest_json(&content).map_err(|e| e.to_string())?;
    Ok((id, quest))
}

/// Events from the hot-reload watcher
#[derive(Debug, Clone)]
pub enum HotReloadEvent {
    /// A file change triggered a successful reload
    Reloaded(String),
    /// An error occurred during reload
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn quest_json(npc: &str, tier: u8, title: &str) -> String {
        format!(
            r#"{{
  "AssociatedNpc": "{npc}",
  "Tier": {tier},
  "Title": "{title}",
  "Description": "A test quest",
  "RewardPool": [{{ "Fame": 5, "Skills": [], "TradeDeals": [] }}],
  "Conditions": [{{
    "Type": "Fetch",
    "SequenceIndex": 0,
    "CanBeAutoCompleted": false,
    "Items": [{{ "Name": "Apple", "Amount": 1 }}]
  }}]
}}"#
        )
    }

    fn setup() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let quest_dir = temp_dir.path().join("quests");
        std::fs::create_dir_all(quest_dir.join("harbor")).unwrap();
        (temp_dir, quest_dir)
    }

    #[tokio::test]
    async fn test_load_quests() {
        let (temp_dir, quest_dir) = setup();
        std::fs::write(quest_dir.join("apples.json"), quest_json("Innkeeper", 1, "Get Apples")).unwrap();
        std::fs::write(
            quest_dir.join("harbor").join("raiders.json"),
            quest_json("Captain", 3, "Raiders"),
        )
        .unwrap();
        std::fs::write(quest_dir.join("notes.txt"), "not a quest").unwrap();

        let catalog = QuestCatalog::new(temp_dir.path());
        assert_eq!(catalog.load_all().await.unwrap(), 2);

        assert_eq!(catalog.ids().await, vec!["apples".to_string(), "raiders".to_string()]);
        let quest = catalog.get("raiders").await.unwrap();
        assert_eq!(quest.title, "Raiders");
        assert_eq!(catalog.quests_for_npc(Npc::Captain).await.len(), 1);
        assert_eq!(catalog.quests_for_npc(Npc::Hunter).await.len(), 0);
        assert_eq!(catalog.quests_for_tier(Tier::One).await.len(), 1);
        assert!(catalog.rejections().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_files_are_rejected_not_fatal() {
        let (temp_dir, quest_dir) = setup();
        std::fs::write(quest_dir.join("good.json"), quest_json("Hunter", 2, "Good")).unwrap();
        std::fs::write(quest_dir.join("broken.json"), "{ nope").unwrap();
        std::fs::write(quest_dir.join("bad_tier.json"), quest_json("Hunter", 9, "Bad")).unwrap();

        let catalog = QuestCatalog::new(temp_dir.path());
        assert_eq!(catalog.load_all().await.unwrap(), 1);
        assert_eq!(catalog.count().await, 1);

        let rejections = catalog.rejections().await;
        assert_eq!(rejections.len(), 2);
        assert!(rejections[0].path.ends_with("bad_tier.json"));
        assert!(rejections[0].reason.contains("Tier"));
        assert!(rejections[1].path.ends_with("broken.json"));
        assert!(rejections[1].reason.starts_with("Malformed quest JSON"));
    }

    #[tokio::test]
    async fn test_reload_replaces_previous_contents() {
        let (temp_dir, quest_dir) = setup();
        let path = quest_dir.join("once.json");
        std::fs::write(&path, quest_json("Merchant", 1, "Once")).unwrap();

        let catalog = QuestCatalog::new(temp_dir.path());
        catalog.load_all().await.unwrap();
        assert!(catalog.get("once").await.is_some());

        std::fs::remove_file(&path).unwrap();
        assert_eq!(catalog.load_all().await.unwrap(), 0);
        assert!(catalog.get("once").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = QuestCatalog::new(temp_dir.path());
        assert_eq!(catalog.load_all().await.unwrap(), 0);

        let catalog = Arc::new(catalog);
        assert!(catalog.start_file_watcher().is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_watcher_picks_up_new_file() {
        use std::time::Duration;

        let (temp_dir, quest_dir) = setup();
        let catalog = Arc::new(QuestCatalog::new(temp_dir.path()));
        catalog.load_all().await.unwrap();
        assert_eq!(catalog.count().await, 0);

        let mut rx = catalog.start_file_watcher().unwrap();
        std::fs::write(quest_dir.join("fresh.json"), quest_json("Alchemist", 2, "Fresh")).unwrap();

        // A write can surface as several events; wait until one reload sees the whole file
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        let mut reloaded = false;
        while catalog.get("fresh").await.is_none() {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            match tokio::time::timeout(remaining, rx.recv()).await {
                Ok(Some(HotReloadEvent::Reloaded(path))) => {
                    assert!(path.ends_with("fresh.json"));
                    reloaded = true;
                }
                Ok(Some(HotReloadEvent::Error(e))) => panic!("reload failed: {}", e),
                Ok(None) => panic!("watcher channel closed"),
                Err(_) => panic!("no reload within 10s"),
            }
        }

        assert!(reloaded);
        let (count, rejections) = catalog.summary().await;
        assert_eq!(count, 1);
        assert!(rejections.is_empty());
        assert_eq!(catalog.get("fresh").await.unwrap().associated_npc, Npc::Alchemist);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_loads_leave_consistent_summary() {
        let (temp_dir, quest_dir) = setup();
        std::fs::write(quest_dir.join("good.json"), quest_json("Hunter", 2, "Good")).unwrap();
        std::fs::write(quest_dir.join("broken.json"), "{ nope").unwrap();

        let catalog = Arc::new(QuestCatalog::new(temp_dir.path()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let catalog = Arc::clone(&catalog);
                tokio::spawn(async move { catalog.load_all().await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 1);
        }

        let (count, rejections) = catalog.summary().await;
        assert_eq!(count, 1);
        assert_eq!(rejections.len(), 1);
    }
}
