use model::outcome::RowOutcome;
use model::summary::ParseSummary;

/// Single-pass fold of row outcomes into a `ParseSummary`. Deterministic:
/// the same outcome set always produces the same summary, which is what
/// makes summaries safely recomputable instead of persisted.
#[derive(Debug, Default)]
pub struct AggregationSummarizer {
    summary: ParseSummary,
}

impl AggregationSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, outcome: &RowOutcome) {
        self.summary.total_rows += 1;
        match outcome {
            RowOutcome::Error(_) => {
                self.summary.error_rows += 1;
                return;
            }
            RowOutcome::Warning(_, _) => {
                self.summary.valid_rows += 1;
                self.summary.warning_rows += 1;
            }
            RowOutcome::Valid(_) => self.summary.valid_rows += 1,
        }

        // Errors returned above; a draft is always present here.
        if let Some(draft) = outcome.draft() {
            *self
                .summary
                .counts_by_activity_type
                .entry(draft.activity_type.clone())
                .or_insert(0) += 1;
            *self.summary.counts_by_scope.entry(draft.scope).or_insert(0) += 1;

            let year = draft.period_year;
            self.summary.year_range = Some(match self.summary.year_range {
                None => (year, year),
                Some((min, max)) => (min.min(year), max.max(year)),
            });
        }
    }

    pub fn finish(self) -> ParseSummary {
        self.summary
    }

    pub fn summarize<'a>(outcomes: impl IntoIterator<Item = &'a RowOutcome>) -> ParseSummary {
        let mut summarizer = Self::new();
        for outcome in outcomes {
            summarizer.add(outcome);
        }
        summarizer.finish()
    }
}
