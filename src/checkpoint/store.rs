use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::error::{CheckpointError, CheckpointResult};
use super::state::CrawlState;
use crate::page_extractor::{ArticleLink, ArticleRecord};

const LEDGER_FILENAME: &str = "links.json";
const RUN_PREFIX: &str = "run_";

/// Fresh run identity: `run_<UTC timestamp>`.
///
/// Lexicographic order of the ids is chronological order.
#[must_use]
pub fn new_run_id() -> String {
    format!("{RUN_PREFIX}{}", Utc::now().format("%Y%m%dT%H%M%S%.3fZ"))
}

/// Outcome of reading one checkpoint file.
enum Loaded<T> {
    Missing,
    Valid(T),
    Corrupt,
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Loaded<T> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Loaded::Missing,
        Err(e) => {
            warn!("Failed to read checkpoint file {}: {}", path.display(), e);
            return Loaded::Corrupt;
        }
    };

    match serde_json::from_str(&contents) {
        Ok(value) => Loaded::Valid(value),
        Err(e) => {
            warn!(
                "Checkpoint file {} is corrupt and left untouched: {}",
                path.display(),
                e
            );
            Loaded::Corrupt
        }
    }
}

/// Save `value` as pretty JSON using write-to-temp, sync, rename.
async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> CheckpointResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|source| CheckpointError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    let temp_path = path.with_extension("json.tmp");

    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| CheckpointError::io(&temp_path, e))?;
    file.write_all(json.as_bytes())
        .await
        .map_err(|e| CheckpointError::io(&temp_path, e))?;

    // Sync to disk before rename
    file.sync_all()
        .await
        .map_err(|e| CheckpointError::io(&temp_path, e))?;
    drop(file);

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| CheckpointError::io(path, e))?;
    Ok(())
}

/// Ledger and batch files of one run directory.
///
/// The store is the single writer of its run directory.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    run_dir: PathBuf,
    batch_size: usize,
}

impl CheckpointStore {
    /// Create run directory `<root>/<run_id>` with an empty ledger and an
    /// empty first batch.
    ///
    /// Fails with [`CheckpointError::RunExists`] rather than reuse a directory.
    pub async fn create(root: &Path, run_id: &str, batch_size: usize) -> CheckpointResult<Self> {
        fs::create_dir_all(root)
            .await
            .map_err(|e| CheckpointError::io(root, e))?;

        let run_dir = root.join(run_id);
        match fs::create_dir(&run_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(CheckpointError::RunExists(run_dir));
            }
            Err(e) => return Err(CheckpointError::io(&run_dir, e)),
        }

        let store = Self {
            run_dir,
            batch_size: batch_size.max(1),
        };
        write_json_atomic(&store.ledger_path(), &Vec::<ArticleLink>::new()).await?;
        write_json_atomic(&store.batch_path(0), &Vec::<ArticleRecord>::new()).await?;
        info!("Created run directory {}", store.run_dir.display());
        Ok(store)
    }

    /// Open an existing run directory.
    pub async fn open(run_dir: &Path, batch_size: usize) -> CheckpointResult<Self> {
        let is_dir = fs::metadata(run_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(CheckpointError::RunNotFound(run_dir.to_path_buf()));
        }
        info!("Resuming run directory {}", run_dir.display());
        Ok(Self {
            run_dir: run_dir.to_path_buf(),
            batch_size: batch_size.max(1),
        })
    }

    /// Most recent `run_*` directory under `root`, if any.
    pub async fn latest_run(root: &Path) -> CheckpointResult<Option<PathBuf>> {
        let mut entries = match fs::read_dir(root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CheckpointError::io(root, e)),
        };

        let mut latest: Option<(String, PathBuf)> = None;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CheckpointError::io(root, e))?
        {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
                continue;
            };
            if !name.starts_with(RUN_PREFIX) || !path.is_dir() {
                continue;
            }
            if latest.as_ref().is_none_or(|(best, _)| name > *best) {
                latest = Some((name, path));
            }
        }
        Ok(latest.map(|(_, path)| path))
    }

    #[must_use]
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    #[must_use]
    pub fn ledger_path(&self) -> PathBuf {
        self.run_dir.join(LEDGER_FILENAME)
    }

    #[must_use]
    pub fn batch_path(&self, index: usize) -> PathBuf {
        self.run_dir.join(format!("batch_{index:04}.json"))
    }

    /// Every link in ledger order. Empty when the ledger is missing or corrupt.
    pub async fn links(&self) -> Vec<ArticleLink> {
        match read_json(&self.ledger_path()).await {
            Loaded::Valid(links) => links,
            Loaded::Missing | Loaded::Corrupt => Vec::new(),
        }
    }

    /// Links not yet marked processed, in ledger order.
    pub async fn unprocessed_links(&self) -> Vec<ArticleLink> {
        self.links()
            .await
            .into_iter()
            .filter(|link| !link.processed)
            .collect()
    }

    /// List pages that contributed at least one link.
    pub async fn discovered_pages(&self) -> BTreeSet<u32> {
        self.links().await.iter().map(|link| link.page_num).collect()
    }

    /// Append newly discovered links, skipping urls already in the ledger.
    ///
    /// Returns how many links were added. A corrupt ledger is left untouched
    /// and nothing is added.
    pub async fn append_links(
        &self,
        state: &mut CrawlState,
        links: Vec<ArticleLink>,
        page_num: u32,
    ) -> CheckpointResult<usize> {
        let path = self.ledger_path();
        let mut ledger: Vec<ArticleLink> = match read_json(&path).await {
            Loaded::Valid(ledger) => ledger,
            Loaded::Missing => Vec::new(),
            Loaded::Corrupt => return Ok(0),
        };

        let mut known: HashSet<String> = ledger.iter().map(|l| l.url.clone()).collect();
        let mut added = 0;
        for mut link in links {
            if known.insert(link.url.clone()) {
                link.page_num = page_num;
                link.processed = false;
                ledger.push(link);
                added += 1;
            }
        }

        if added > 0 {
            write_json_atomic(&path, &ledger).await?;
        }
        state.total_articles = ledger.len();
        debug!(page_num, added, total = ledger.len(), "Ledger updated");
        Ok(added)
    }

    /// Flag `url` as processed. Returns whether the link is in the ledger.
    pub async fn mark_processed(&self, url: &str) -> CheckpointResult<bool> {
        let path = self.ledger_path();
        let mut ledger: Vec<ArticleLink> = match read_json(&path).await {
            Loaded::Valid(ledger) => ledger,
            Loaded::Missing | Loaded::Corrupt => return Ok(false),
        };

        let Some(link) = ledger.iter_mut().find(|link| link.url == url) else {
            return Ok(false);
        };
        if !link.processed {
            link.processed = true;
            write_json_atomic(&path, &ledger).await?;
        }
        Ok(true)
    }

    /// Records of batch `index`. Empty when missing or corrupt.
    pub async fn batch(&self, index: usize) -> Vec<ArticleRecord> {
        match read_json(&self.batch_path(index)).await {
            Loaded::Valid(records) => records,
            Loaded::Missing | Loaded::Corrupt => Vec::new(),
        }
    }

    /// Append `record` to batch `floor(processed / batch_size)`.
    ///
    /// The first record of a batch starts its file afresh. Returns the batch index.
    pub async fn append_article(
        &self,
        state: &mut CrawlState,
        record: ArticleRecord,
    ) -> CheckpointResult<usize> {
        let index = state.current_batch();
        let path = self.batch_path(index);

        let mut records: Vec<ArticleRecord> = if state.at_batch_boundary() {
            Vec::with_capacity(state.batch_size)
        } else {
            match read_json(&path).await {
                Loaded::Valid(records) => records,
                Loaded::Missing => {
                    warn!("Batch {} missing mid-batch, starting it afresh", path.display());
                    Vec::new()
                }
                Loaded::Corrupt => return Err(CheckpointError::Corrupt(path)),
            }
        };

        records.push(record);
        write_json_atomic(&path, &records).await?;
        state.processed_articles += 1;

        debug!(
            batch = index,
            records = records.len(),
            processed = state.processed_articles,
            "Article record appended"
        );
        Ok(index)
    }

    /// Recompute the run counters from the files on disk.
    ///
    /// A corrupt batch counts as full, so new records never land in it.
    pub async fn load_state(&self) -> CrawlState {
        let mut state = CrawlState::new(self.batch_size);
        state.total_articles = self.links().await.len();

        let mut index = 0;
        loop {
            match read_json::<Vec<ArticleRecord>>(&self.batch_path(index)).await {
                Loaded::Missing => break,
                Loaded::Valid(records) => state.processed_articles += records.len(),
                Loaded::Corrupt => state.processed_articles += state.batch_size,
            }
            index += 1;
        }

        state
    }
}
