use crate::error::RepositoryError;
use crate::repository::{ActivityRepository, InsertOutcome};
use async_trait::async_trait;
use model::entities::{Activity, PeriodKey, ReportingPeriod, Site};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    sites: Vec<Site>,
    periods: Vec<ReportingPeriod>,
    activities: HashMap<String, Activity>,
}

/// File-backed repository: the whole store lives in memory and every
/// mutation rewrites a JSON snapshot. Good enough for the CLI, where store
/// sizes are small; real deployments put a database behind
/// [`ActivityRepository`] instead.
pub struct JsonFileRepository {
    path: PathBuf,
    inner: Mutex<Snapshot>,
}

impl JsonFileRepository {
    pub fn open(path: &Path) -> Result<Self, RepositoryError> {
        let snapshot = if path.exists() {
            let source = std::fs::read_to_string(path)?;
            serde_json::from_str(&source)?
        } else {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Snapshot::default()
        };
        info!(path = %path.display(), "Opened activity store");
        Ok(JsonFileRepository {
            path: path.to_path_buf(),
            inner: Mutex::new(snapshot),
        })
    }

    fn serialize(&self) -> Result<String, RepositoryError> {
        let inner = self.lock()?;
        Ok(serde_json::to_string_pretty(&*inner)?)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Snapshot>, RepositoryError> {
        self.inner
            .lock()
            .map_err(|_| RepositoryError::Lock("store mutex poisoned".into()))
    }

    async fn flush(&self) -> Result<(), RepositoryError> {
        let json = self.serialize()?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl ActivityRepository for JsonFileRepository {
    async fn find_site_by_name(&self, name: &str) -> Result<Option<Site>, RepositoryError> {
        let inner = self.lock()?;
        Ok(inner
            .sites
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn insert_site(&self, site: Site) -> Result<(), RepositoryError> {
        self.lock()?.sites.push(site);
        self.flush().await
    }

    async fn find_period(
        &self,
        key: PeriodKey,
    ) -> Result<Option<ReportingPeriod>, RepositoryError> {
        let inner = self.lock()?;
        Ok(inner
            .periods
            .iter()
            .find(|p| p.year == key.year && p.quarter == key.quarter)
            .cloned())
    }

    async fn insert_period(&self, period: ReportingPeriod) -> Result<(), RepositoryError> {
        self.lock()?.periods.push(period);
        self.flush().await
    }

    async fn insert_activity(
        &self,
        activity: Activity,
    ) -> Result<InsertOutcome, RepositoryError> {
        {
            let mut inner = self.lock()?;
            if inner.activities.contains_key(&activity.idempotency_key) {
                return Ok(InsertOutcome::Duplicate);
            }
            inner
                .activities
                .insert(activity.idempotency_key.clone(), activity);
        }
        self.flush().await?;
        Ok(InsertOutcome::Created)
    }

    async fn activities(&self) -> Result<Vec<Activity>, RepositoryError> {
        Ok(self.lock()?.activities.values().cloned().collect())
    }
}
