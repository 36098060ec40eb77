//! Journal entry list, lines view and lifecycle operations

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::balance::{self, Totals};
use crate::error::{CoreError, CoreResult};
use crate::models::{JournalEntry, JournalWithLines};
use crate::source::JournalStore;
use crate::types::SortDirection;
use crate::validation::{self, JournalDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JournalSortKey {
    EntryNumber,
    Date,
    Description,
    Posted,
}

impl std::str::FromStr for JournalSortKey {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(|c: char| c == '-' || c == '_', "").as_str() {
            "entrynumber" | "number" => Ok(JournalSortKey::EntryNumber),
            "date" => Ok(JournalSortKey::Date),
            "description" => Ok(JournalSortKey::Description),
            "posted" | "status" => Ok(JournalSortKey::Posted),
            _ => Err(format!("Invalid journal sort key: {}", s)),
        }
    }
}

impl JournalSortKey {
    fn compare(self, a: &JournalEntry, b: &JournalEntry) -> Ordering {
        match self {
            JournalSortKey::EntryNumber => a.entry_number.cmp(&b.entry_number),
            JournalSortKey::Date => match (a.date_naive(), b.date_naive()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => a.date.cmp(&b.date),
            },
            JournalSortKey::Description => a.description.cmp(&b.description),
            JournalSortKey::Posted => a.posted.cmp(&b.posted),
        }
    }
}

/// Search text and sort state for the journal list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalListQuery {
    pub search: String,
    pub sort: Option<(JournalSortKey, SortDirection)>,
}

impl JournalListQuery {
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    /// Choosing the current key again flips the direction
    pub fn sort_by(&mut self, key: JournalSortKey) {
        self.sort = match self.sort {
            Some((current, direction)) if current == key => Some((key, direction.reversed())),
            _ => Some((key, SortDirection::Asc)),
        };
    }

    pub fn matches(&self, entry: &JournalEntry) -> bool {
        let term = self.search.to_lowercase();
        term.is_empty()
            || entry.entry_number.to_lowercase().contains(&term)
            || entry.description.to_lowercase().contains(&term)
            || entry.date.contains(&term)
    }

    pub fn apply(&self, entries: &[JournalEntry]) -> Vec<JournalEntry> {
        let mut filtered: Vec<JournalEntry> =
            entries.iter().filter(|e| self.matches(e)).cloned().collect();
        if let Some((key, direction)) = self.sort {
            filtered.sort_by(|a, b| direction.apply(key.compare(a, b)));
        }
        filtered
    }
}

/// An entry with its lines and column totals
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalLinesView {
    #[serde(flatten)]
    pub journal: JournalWithLines,
    pub totals: Totals,
}

impl JournalLinesView {
    pub fn new(journal: JournalWithLines) -> Self {
        let totals = balance::calculate(&journal.lines);
        Self { journal, totals }
    }

    pub fn total_debit(&self) -> Decimal {
        self.totals.total_debit
    }

    pub fn total_credit(&self) -> Decimal {
        self.totals.total_credit
    }
}

/// Journal operations for one project
///
/// Drafts are validated before anything is sent, and lifecycle actions are
/// checked against the entry's current posted flag.
pub struct JournalService<S> {
    store: S,
    project: String,
}

impl<S: JournalStore> JournalService<S> {
    pub fn new(store: S, project: impl Into<String>) -> Self {
        Self {
            store,
            project: project.into(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub async fn list(&self, query: &JournalListQuery) -> CoreResult<Vec<JournalEntry>> {
        let entries = self.store.list_journals(&self.project).await?;
        Ok(query.apply(&entries))
    }

    pub async fn lines(&self, id: i64) -> CoreResult<JournalLinesView> {
        let journal = self.store.get_journal(&self.project, id).await?;
        Ok(JournalLinesView::new(journal))
    }

    /// Validate and create; returns the new entry id
    pub async fn create(&self, draft: &JournalDraft) -> CoreResult<i64> {
        let payload = validation::validate(draft)?;
        let id = self
            .store
            .create_journal(&self.project, &payload.envelope()?)
            .await?;
        log::info!("created journal {} ({}) in {}", payload.entry_number, id, self.project);
        Ok(id)
    }

    pub async fn update(&self, id: i64, draft: &JournalDraft) -> CoreResult<()> {
        let payload = validation::validate(draft)?;
        let current = self.store.get_journal(&self.project, id).await?;
        if current.entry.posted {
            return Err(CoreError::InvalidState {
                message: format!("journal {} is posted and cannot be edited", current.entry.entry_number),
            });
        }
        self.store
            .update_journal(&self.project, id, &payload.envelope()?)
            .await?;
        log::info!("updated journal {} in {}", id, self.project);
        Ok(())
    }

    pub async fn post(&self, id: i64) -> CoreResult<()> {
        let current = self.store.get_journal(&self.project, id).await?;
        if current.entry.posted {
            return Err(CoreError::InvalidState {
                message: format!("journal {} is already posted", current.entry.entry_number),
            });
        }
        self.store.post_journal(&self.project, id).await?;
        log::info!("posted journal {} in {}", id, self.project);
        Ok(())
    }

    pub async fn unpost(&self, id: i64) -> CoreResult<String> {
        let current = self.store.get_journal(&self.project, id).await?;
        if !current.entry.posted {
            return Err(CoreError::InvalidState {
                message: format!("journal {} is not posted", current.entry.entry_number),
            });
        }
        let message = self.store.unpost_journal(&self.project, id).await?;
        log::info!("unposted journal {} in {}", id, self.project);
        Ok(message)
    }

    pub async fn delete(&self, id: i64) -> CoreResult<String> {
        let message = self.store.delete_journal(&self.project, id).await?;
        log::info!("deleted journal {} in {}", id, self.project);
        Ok(message)
    }
}
