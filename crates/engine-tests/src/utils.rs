#![allow(dead_code)]

use async_trait::async_trait;
use engine_core::error::RepositoryError;
use engine_core::repository::memory::InMemoryRepository;
use engine_core::repository::{ActivityRepository, InsertOutcome};
use model::entities::{Activity, PeriodKey, ReportingPeriod, Site};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A six-column export with one clean row per scope bucket.
pub const CLEAN_EXPORT: &str = "\
Date,Site,Activity Type,Scope,Quantity,Unit
2024-01-15,Main Office,ELECTRICITY,SCOPE_2,1500,kWh
2024-01-20,Main Office,NATURAL GAS,SCOPE_1,800,kWh
2024-02-02,Warehouse,FLIGHTS,SCOPE_3,3200,km
";

/// Mixed-quality export: notation keys, garbage quantities, bad dates.
pub const MESSY_EXPORT: &str = "\
Date,Site,Activity Type,Scope,Quantity,Unit
2024-01-15,Main Office,ELECTRICITY,SCOPE_2,1500,kWh
2024-01-16,Main Office,ELECTRICITY,SCOPE_2,NO,kWh
2024-01-17,Main Office,ELECTRICITY,SCOPE_2,abc,kWh
not-a-date,Main Office,ELECTRICITY,SCOPE_2,10,kWh
2024-01-19,Main Office,,SCOPE_2,10,kWh
";

/// Export with unfamiliar headers that still hit the keyword table.
pub const ALIASED_HEADERS_EXPORT: &str = "\
consumption,emission source,location
1500,ELECTRICITY,Main Office
2000,WATER,Warehouse
";

/// Wraps the in-memory repository and fails the first `failures` activity
/// inserts, for partial-failure scenarios.
pub struct FlakyRepository {
    inner: InMemoryRepository,
    failures: AtomicUsize,
}

impl FlakyRepository {
    pub fn failing_first(failures: usize) -> Arc<Self> {
        Arc::new(FlakyRepository {
            inner: InMemoryRepository::new(),
            failures: AtomicUsize::new(failures),
        })
    }
}

#[async_trait]
impl ActivityRepository for FlakyRepository {
    async fn find_site_by_name(&self, name: &str) -> Result<Option<Site>, RepositoryError> {
        self.inner.find_site_by_name(name).await
    }

    async fn insert_site(&self, site: Site) -> Result<(), RepositoryError> {
        self.inner.insert_site(site).await
    }

    async fn find_period(
        &self,
        key: PeriodKey,
    ) -> Result<Option<ReportingPeriod>, RepositoryError> {
        self.inner.find_period(key).await
    }

    async fn insert_period(&self, period: ReportingPeriod) -> Result<(), RepositoryError> {
        self.inner.insert_period(period).await
    }

    async fn insert_activity(
        &self,
        activity: Activity,
    ) -> Result<InsertOutcome, RepositoryError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(RepositoryError::Backend("injected insert failure".into()));
        }
        self.inner.insert_activity(activity).await
    }

    async fn activities(&self) -> Result<Vec<Activity>, RepositoryError> {
        self.inner.activities().await
    }
}
