use crate::error::RepositoryError;
use crate::repository::{ActivityRepository, InsertOutcome};
use async_trait::async_trait;
use model::entities::{Activity, PeriodKey, ReportingPeriod, Site};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    sites: Vec<Site>,
    periods: Vec<ReportingPeriod>,
    /// Keyed by idempotency key.
    activities: HashMap<String, Activity>,
}

/// In-process repository used by tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    inner: Mutex<Inner>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, RepositoryError> {
        self.inner
            .lock()
            .map_err(|_| RepositoryError::Lock("repository mutex poisoned".into()))
    }

    pub fn site_count(&self) -> usize {
        self.inner.lock().map(|i| i.sites.len()).unwrap_or(0)
    }

    pub fn period_count(&self) -> usize {
        self.inner.lock().map(|i| i.periods.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ActivityRepository for InMemoryRepository {
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
        Ok(())
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
        Ok(())
    }

    async fn insert_activity(
        &self,
        activity: Activity,
    ) -> Result<InsertOutcome, RepositoryError> {
        let mut inner = self.lock()?;
        if inner.activities.contains_key(&activity.idempotency_key) {
            return Ok(InsertOutcome::Duplicate);
        }
        inner
            .activities
            .insert(activity.idempotency_key.clone(), activity);
        Ok(InsertOutcome::Created)
    }

    async fn activities(&self) -> Result<Vec<Activity>, RepositoryError> {
        Ok(self.lock()?.activities.values().cloned().collect())
    }
}
