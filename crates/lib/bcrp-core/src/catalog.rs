use std::error::Error;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bcrp_store::MetadataRow;
use tokio::sync::{Mutex, MutexGuard, OnceCell, RwLock};
use tracing::{info, warn};

use crate::client::{BcrpClient, ClientError};
use crate::search::{ResolutionPolicy, SearchCorpus, SearchEngine, SimilarityMode};

pub type FetchMetadataFuture =
    Pin<Box<dyn Future<Output = Result<Vec<MetadataRow>, CatalogError>> + Send + 'static>>;
pub type FetchMetadataFn = Arc<dyn Fn() -> FetchMetadataFuture + Send + Sync + 'static>;

/// Configuration for the metadata catalog and the engines it hands out.
#[derive(Clone)]
pub struct CatalogConfig {
    pub cache_path: Option<PathBuf>,
    pub policy: ResolutionPolicy,
    pub similarity: SimilarityMode,
    pub fetch: FetchMetadataFn,
}

impl CatalogConfig {
    #[must_use]
    pub fn new(fetch: FetchMetadataFn) -> Self {
        Self {
            cache_path: None,
            policy: ResolutionPolicy::default(),
            similarity: SimilarityMode::default(),
            fetch,
        }
    }

    /// Catalog that downloads metadata through `client`.
    #[must_use]
    pub fn from_client(client: BcrpClient) -> Self {
        Self::new(Arc::new(move || -> FetchMetadataFuture {
            let client = client.clone();
            Box::pin(async move { client.fetch_metadata().await.map_err(CatalogError::Fetch) })
        }))
    }

    #[must_use]
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn with_similarity(mut self, similarity: SimilarityMode) -> Self {
        self.similarity = similarity;
        self
    }
}

impl fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("cache_path", &self.cache_path)
            .field("policy", &self.policy)
            .field("similarity", &self.similarity)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum CatalogError {
    Fetch(ClientError),
    Cache { path: PathBuf, message: String },
    Decode(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(err) => write!(f, "failed to fetch metadata: {err}"),
            Self::Cache { path, message } => {
                write!(f, "metadata cache error at {}: {message}", path.display())
            }
            Self::Decode(message) => write!(f, "failed to decode metadata: {message}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Fetch(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ClientError> for CatalogError {
    fn from(err: ClientError) -> Self {
        Self::Fetch(err)
    }
}

impl From<tokio::task::JoinError> for CatalogError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Owner of the metadata table and the search corpus built from it.
///
/// The first query triggers a single load (cache file, then upstream). A
/// refresh downloads a new table and swaps in a new corpus snapshot; engines
/// handed out earlier keep the snapshot they were built with.
#[derive(Clone)]
pub struct MetadataCatalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    config: CatalogConfig,
    loaded: OnceCell<()>,
    snapshot: RwLock<Option<Arc<SearchCorpus>>>,
    refresh_lock: Mutex<()>,
    generation: AtomicU64,
}

impl MetadataCatalog {
    #[must_use]
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            inner: Arc::new(CatalogInner {
                config,
                loaded: OnceCell::new(),
                snapshot: RwLock::new(None),
                refresh_lock: Mutex::new(()),
                generation: AtomicU64::new(0),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.inner.config
    }

    /// Generation of the current snapshot; `0` before the first load.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.inner.loaded.initialized()
    }

    /// The installed snapshot, without triggering a load.
    pub async fn current(&self) -> Option<Arc<SearchCorpus>> {
        self.inner.snapshot.read().await.clone()
    }

    /// Returns the current corpus snapshot, loading it on first use.
    ///
    /// # Errors
    /// Returns `CatalogError` when neither the cache nor the upstream fetch
    /// produces a table. A failed load is retried on the next call.
    pub async fn snapshot(&self) -> Result<Arc<SearchCorpus>, CatalogError> {
        self.inner
            .loaded
            .get_or_try_init(|| self.initial_load())
            .await?;
        self.current()
            .await
            .ok_or_else(|| CatalogError::Decode("metadata snapshot missing".to_string()))
    }

    /// Builds a search engine over the current snapshot.
    ///
    /// # Errors
    /// Propagates load failures from [`Self::snapshot`].
    pub async fn engine(&self) -> Result<SearchEngine, CatalogError> {
        let corpus = self.snapshot().await?;
        let config = &self.inner.config;
        let engine = SearchEngine::new(corpus, config.policy);
        Ok(match config.similarity.override_strategy() {
            Some(similarity) => engine.with_similarity(similarity),
            None => engine,
        })
    }

    /// Downloads a fresh table, rewrites the cache and swaps the snapshot.
    ///
    /// # Errors
    /// Returns `CatalogError::Fetch` when the download fails; the previous
    /// snapshot stays in place.
    pub async fn refresh(&self) -> Result<Arc<SearchCorpus>, CatalogError> {
        let guard = self.inner.refresh_lock.lock().await;
        let corpus = self.fetch_and_install(&guard).await?;
        let _ = self.inner.loaded.set(());
        Ok(corpus)
    }

    async fn initial_load(&self) -> Result<(), CatalogError> {
        let guard = self.inner.refresh_lock.lock().await;
        if self.inner.snapshot.read().await.is_some() {
            // A refresh won the lock and already installed a newer table.
            return Ok(());
        }
        if let Some(path) = self.inner.config.cache_path.as_deref()
            && tokio::fs::try_exists(path).await.unwrap_or(false)
        {
            info!(path = %path.display(), "loading metadata from cache");
            match read_cache(path).await {
                Ok(rows) => {
                    self.install(&guard, rows).await?;
                    return Ok(());
                }
                Err(err) => warn!(error = %err, "failed to load metadata cache"),
            }
        }
        self.fetch_and_install(&guard).await?;
        Ok(())
    }

    async fn fetch_and_install(
        &self,
        guard: &MutexGuard<'_, ()>,
    ) -> Result<Arc<SearchCorpus>, CatalogError> {
        info!("fetching fresh metadata from upstream");
        let rows = (self.inner.config.fetch)().await?;
        if let Some(path) = self.inner.config.cache_path.as_deref() {
            match write_cache(path, &rows).await {
                Ok(()) => info!(rows = rows.len(), path = %path.display(), "metadata cached"),
                Err(err) => warn!(error = %err, "failed to write metadata cache"),
            }
        }
        self.install(guard, rows).await
    }

    /// Builds and swaps in a new snapshot. Callers hold `refresh_lock`, which
    /// makes generation numbers strictly increasing.
    async fn install(
        &self,
        _guard: &MutexGuard<'_, ()>,
        rows: Vec<MetadataRow>,
    ) -> Result<Arc<SearchCorpus>, CatalogError> {
        let generation = self.inner.generation.load(Ordering::SeqCst) + 1;
        let normalizer = self.inner.config.policy.normalizer();
        let corpus = tokio::task::spawn_blocking(move || {
            Arc::new(SearchCorpus::build(&rows, normalizer, generation))
        })
        .await?;

        let mut snapshot = self.inner.snapshot.write().await;
        *snapshot = Some(Arc::clone(&corpus));
        self.inner.generation.store(generation, Ordering::SeqCst);
        drop(snapshot);
        info!(generation, records = corpus.len(), "installed metadata snapshot");
        Ok(corpus)
    }
}

impl fmt::Debug for MetadataCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataCatalog")
            .field("config", &self.inner.config)
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

async fn read_cache(path: &Path) -> Result<Vec<MetadataRow>, CatalogError> {
    let bytes = tokio::fs::read(path).await.map_err(|err| CatalogError::Cache {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let rows = tokio::task::spawn_blocking(move || serde_json::from_slice::<Vec<MetadataRow>>(&bytes))
        .await?
        .map_err(|err| CatalogError::Decode(err.to_string()))?;
    if rows.is_empty() {
        return Err(CatalogError::Decode("metadata cache is empty".to_string()));
    }
    Ok(rows)
}

async fn write_cache(path: &Path, rows: &[MetadataRow]) -> Result<(), CatalogError> {
    let cache_err = |err: &dyn fmt::Display| CatalogError::Cache {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| cache_err(&err))?;
    }
    let bytes = serde_json::to_vec(rows).map_err(|err| cache_err(&err))?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|err| cache_err(&err))
}
