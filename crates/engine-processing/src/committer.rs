use engine_config::ImportOptions;
use engine_core::error::ImportError;
use engine_core::repository::{ActivityRepository, InsertOutcome};
use model::activity::ActivityDraft;
use model::entities::{
    Activity, PeriodKey, ReportingPeriod, Site, idempotency_key,
};
use model::issue::{Issue, IssueCode};
use model::result::ImportResult;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Commits validated drafts as activity records. Drafts are processed
/// independently: one failed persistence call is recorded and skipped, not
/// a reason to abort the siblings, and a duplicate idempotency key is a
/// no-op success rather than an error.
pub struct ImportCommitter {
    repo: Arc<dyn ActivityRepository>,
    options: ImportOptions,
}

impl ImportCommitter {
    pub fn new(repo: Arc<dyn ActivityRepository>, options: ImportOptions) -> Self {
        ImportCommitter { repo, options }
    }

    pub async fn commit(
        &self,
        source_upload_id: Uuid,
        drafts: &[ActivityDraft],
    ) -> Result<ImportResult, ImportError> {
        if self.options.target_period.is_none() && !self.options.auto_create {
            return Err(ImportError::NoPeriodSelected);
        }

        let mut result = ImportResult {
            total_parsed: drafts.len() as u64,
            ..ImportResult::default()
        };
        let mut site_cache: HashMap<String, Option<Uuid>> = HashMap::new();
        let mut period_cache: HashMap<PeriodKey, Option<Uuid>> = HashMap::new();

        for draft in drafts {
            let site_id = match self.resolve_site(draft, &mut site_cache, &mut result).await {
                Ok(Some(id)) => id,
                Ok(None) => {
                    warn!(site = %draft.site_ref, "Site not found, skipping draft");
                    result.total_skipped += 1;
                    result.skip_reasons.push(
                        Issue::new(
                            IssueCode::SiteNotFound,
                            "site not found and auto-create is disabled",
                        )
                        .with_value(&draft.site_ref),
                    );
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, site = %draft.site_ref, "Site resolution failed");
                    result.total_failed += 1;
                    continue;
                }
            };

            let period_key = self
                .options
                .target_period
                .unwrap_or(PeriodKey::new(draft.period_year, draft.period_quarter));
            let period_id = match self
                .resolve_period(period_key, &mut period_cache, &mut result)
                .await
            {
                Ok(Some(id)) => id,
                Ok(None) => {
                    warn!(
                        year = period_key.year,
                        "Reporting period not found, skipping draft"
                    );
                    result.total_skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "Period resolution failed");
                    result.total_failed += 1;
                    continue;
                }
            };

            let activity = build_activity(draft, site_id, period_id, source_upload_id);
            match self.repo.insert_activity(activity).await {
                Ok(InsertOutcome::Created) => result.total_imported += 1,
                Ok(InsertOutcome::Duplicate) => {
                    info!(upload = %source_upload_id, "Duplicate activity, no-op");
                    result.total_duplicates += 1;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to persist activity");
                    result.total_failed += 1;
                }
            }
        }

        if result.total_failed > 0
            && result.total_imported == 0
            && result.total_duplicates == 0
        {
            return Err(ImportError::PartialCommitFailure {
                failed: result.total_failed,
                skipped: result.total_skipped,
            });
        }

        result.message = format!(
            "{} imported, {} duplicates, {} skipped, {} failed of {} parsed",
            result.total_imported,
            result.total_duplicates,
            result.total_skipped,
            result.total_failed,
            result.total_parsed,
        );
        info!(message = %result.message, "Commit finished");
        Ok(result)
    }

    /// Case-insensitive site resolution with auto-create. `Ok(None)` means
    /// the draft must be skipped.
    async fn resolve_site(
        &self,
        draft: &ActivityDraft,
        cache: &mut HashMap<String, Option<Uuid>>,
        result: &mut ImportResult,
    ) -> Result<Option<Uuid>, engine_core::error::RepositoryError> {
        let key = draft.site_ref.to_ascii_lowercase();
        if let Some(cached) = cache.get(&key) {
            return Ok(*cached);
        }

        let resolved = match self.repo.find_site_by_name(&draft.site_ref).await? {
            Some(site) => Some(site.id),
            None if self.options.auto_create => {
                let site = Site::new(&draft.site_ref);
                let id = site.id;
                self.repo.insert_site(site).await?;
                info!(site = %draft.site_ref, "Created site");
                result.created_site_ids.push(id);
                Some(id)
            }
            None => None,
        };
        cache.insert(key, resolved);
        Ok(resolved)
    }

    async fn resolve_period(
        &self,
        key: PeriodKey,
        cache: &mut HashMap<PeriodKey, Option<Uuid>>,
        result: &mut ImportResult,
    ) -> Result<Option<Uuid>, engine_core::error::RepositoryError> {
        if let Some(cached) = cache.get(&key) {
            return Ok(*cached);
        }

        let resolved = match self.repo.find_period(key).await? {
            Some(period) => Some(period.id),
            None if self.options.auto_create => {
                let period = ReportingPeriod::new(key.year, key.quarter);
                let id = period.id;
                self.repo.insert_period(period).await?;
                info!(year = key.year, quarter = ?key.quarter, "Created reporting period");
                result.created_period_ids.push(id);
                Some(id)
            }
            None => None,
        };
        cache.insert(key, resolved);
        Ok(resolved)
    }
}

fn build_activity(
    draft: &ActivityDraft,
    site_id: Uuid,
    period_id: Uuid,
    source_upload_id: Uuid,
) -> Activity {
    let key = idempotency_key(
        site_id,
        period_id,
        &draft.activity_type,
        draft.date_start,
        draft.date_end,
        draft.quantity,
        &draft.unit,
        source_upload_id,
    );
    Activity {
        id: Uuid::new_v4(),
        site_id,
        period_id,
        activity_type: draft.activity_type.clone(),
        scope: draft.scope,
        quantity: draft.quantity,
        exclusion: draft.exclusion,
        unit: draft.unit.clone(),
        date_start: draft.date_start,
        date_end: draft.date_end,
        notes: draft.notes.clone(),
        source_upload_id,
        idempotency_key: key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::repository::memory::InMemoryRepository;
    use model::activity::Scope;

    fn draft(site: &str, quantity: f64) -> ActivityDraft {
        ActivityDraft {
            site_ref: site.into(),
            period_year: 2024,
            period_quarter: None,
            activity_type: "ELECTRICITY".into(),
            scope: Scope::Scope2,
            quantity: Some(quantity),
            exclusion: None,
            unit: "kWh".into(),
            date_start: None,
            date_end: None,
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn test_auto_create_and_import() {
        let repo = Arc::new(InMemoryRepository::new());
        let committer = ImportCommitter::new(repo.clone(), ImportOptions::auto_create());
        let drafts = vec![draft("Main Office", 10.0), draft("main office", 20.0)];

        let result = committer.commit(Uuid::new_v4(), &drafts).await.unwrap();
        assert_eq!(result.total_imported, 2);
        assert_eq!(result.created_site_ids.len(), 1, "site cache dedupes");
        assert_eq!(result.created_period_ids.len(), 1);
        assert_eq!(repo.activities().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reimport_is_idempotent() {
        let repo = Arc::new(InMemoryRepository::new());
        let committer = ImportCommitter::new(repo.clone(), ImportOptions::auto_create());
        let upload_id = Uuid::new_v4();
        let drafts = vec![draft("Main Office", 10.0)];

        let first = committer.commit(upload_id, &drafts).await.unwrap();
        assert_eq!(first.total_imported, 1);

        let second = committer.commit(upload_id, &drafts).await.unwrap();
        assert_eq!(second.total_imported, 0);
        assert_eq!(second.total_duplicates, 1);
        assert_eq!(repo.activities().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_period_selected() {
        let repo = Arc::new(InMemoryRepository::new());
        let committer = ImportCommitter::new(repo, ImportOptions::default());

        let err = committer
            .commit(Uuid::new_v4(), &[draft("Main", 1.0)])
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::NoPeriodSelected));
    }

    #[tokio::test]
    async fn test_unknown_site_without_auto_create_is_skipped() {
        let repo = Arc::new(InMemoryRepository::new());
        repo.insert_period(ReportingPeriod::new(2024, None))
            .await
            .unwrap();
        let options = ImportOptions::default().with_target_period(PeriodKey::new(2024, None));
        let committer = ImportCommitter::new(repo.clone(), options);

        let result = committer
            .commit(Uuid::new_v4(), &[draft("Nowhere", 1.0)])
            .await
            .unwrap();
        assert_eq!(result.total_imported, 0);
        assert_eq!(result.total_skipped, 1);
        assert_eq!(result.skip_reasons.len(), 1);
        assert_eq!(result.skip_reasons[0].code, IssueCode::SiteNotFound);
        assert_eq!(result.skip_reasons[0].value.as_deref(), Some("Nowhere"));
        assert!(repo.activities().await.unwrap().is_empty());
    }
}
