//! Recurring entry rollover
//!
//! A template's occurrences sit at fixed offsets from its anchor date. Each
//! run generates every occurrence due up to `today` that does not exist yet,
//! so running twice on the same day adds nothing the second time.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::audit::{AuditEntry, EntityType};
use crate::error::LedgerResult;
use crate::models::{BudgetEntry, Month};
use crate::storage::Storage;

use super::LimitService;

/// Upper bound of occurrences generated for one template in a single run
pub const MAX_CATCH_UP_PER_RUN: usize = 520;

/// Outcome of a rollover run
#[derive(Debug, Clone, Default)]
pub struct RecurrenceRun {
    pub generated: Vec<BudgetEntry>,
    /// Occurrences that already existed and were skipped
    pub skipped_existing: usize,
    /// Templates that hit the catch-up bound and still have due occurrences
    pub capped_templates: usize,
}

/// Service generating occurrences of recurring templates
pub struct RecurrenceService<'a> {
    storage: &'a Storage,
}

impl<'a> RecurrenceService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Generate every due occurrence up to and including `today`
    pub fn process_due(&self, today: NaiveDate) -> LedgerResult<RecurrenceRun> {
        let mut run = RecurrenceRun::default();
        let mut touched_months = BTreeSet::new();
        let mut templates_changed = false;

        for mut template in self.storage.entries.get_templates()? {
            let Some(mut recurrence) = template.recurrence.clone() else {
                continue;
            };
            if !recurrence.is_due(today) {
                continue;
            }

            let mut produced = 0;
            while recurrence.is_due(today) && produced < MAX_CATCH_UP_PER_RUN {
                let date = recurrence.next_date;
                if self.storage.entries.has_occurrence(template.id, date)? {
                    run.skipped_existing += 1;
                } else {
                    let occurrence = template.occurrence(date);
                    self.storage.entries.upsert(occurrence.clone())?;
                    touched_months.insert(Month::of(date));
                    run.generated.push(occurrence);
                }
                recurrence.advance();
                produced += 1;
            }

            if recurrence.is_due(today) {
                warn!(
                    template = %template.id,
                    next = %recurrence.next_date,
                    "recurring entry has more due occurrences than one run generates"
                );
                run.capped_templates += 1;
            }

            template.recurrence = Some(recurrence);
            template.touch();
            self.storage.entries.upsert(template)?;
            templates_changed = true;
        }

        if templates_changed {
            self.storage.entries.save()?;
        }

        if !run.generated.is_empty() {
            let audit: Vec<AuditEntry> = run
                .generated
                .iter()
                .map(|e| {
                    AuditEntry::create(
                        EntityType::BudgetEntry,
                        e.id.to_string(),
                        Some(e.description.clone()),
                        e,
                    )
                })
                .collect();
            self.storage.log_batch(&audit)?;

            LimitService::new(self.storage).recompute_months(touched_months)?;
            info!(count = run.generated.len(), "generated recurring entries");
        }

        Ok(run)
    }
}
