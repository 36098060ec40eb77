//! Journal drafts and the checks they must pass before submission
//!
//! A [`JournalDraft`] is an immutable value: adding or removing a line
//! produces a new draft. [`validate`] is a pure function from a draft to a
//! payload ready to send, so an unbalanced or incomplete entry can never
//! reach the backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::balance::{self, LineAmounts, Totals};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::models::{parse_date, CreateJournalDto, JournalLine, JournalWithLines};

/// Multipart field carrying the receipt image
pub const ATTACHMENT_FIELD: &str = "photo";

/// Editable line of a draft; blank amounts count as zero
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftLine {
    #[serde(default)]
    pub account_id: Option<i64>,
    #[serde(default)]
    pub debit: Option<Decimal>,
    #[serde(default)]
    pub credit: Option<Decimal>,
    #[serde(default)]
    pub description: String,
}

impl DraftLine {
    pub fn debit_line(account_id: i64, amount: Decimal) -> Self {
        Self {
            account_id: Some(account_id),
            debit: Some(amount),
            credit: Some(Decimal::ZERO),
            description: String::new(),
        }
    }

    pub fn credit_line(account_id: i64, amount: Decimal) -> Self {
        Self {
            account_id: Some(account_id),
            debit: Some(Decimal::ZERO),
            credit: Some(amount),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl LineAmounts for DraftLine {
    fn debit(&self) -> Decimal {
        self.debit.unwrap_or_default()
    }
    fn credit(&self) -> Decimal {
        self.credit.unwrap_or_default()
    }
}

/// Receipt file sent alongside the entry
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Guess the content type from the file extension
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = match file_name
            .rsplit('.')
            .next()
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("pdf") => "application/pdf",
            _ => "application/octet-stream",
        }
        .to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }
}

/// Journal entry being composed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalDraft {
    #[serde(default)]
    pub entry_number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lines: Vec<DraftLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip)]
    pub attachment: Option<Attachment>,
}

impl Default for JournalDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl JournalDraft {
    /// Empty draft with one blank line
    pub fn new() -> Self {
        Self {
            entry_number: String::new(),
            date: String::new(),
            description: String::new(),
            lines: vec![DraftLine::default()],
            photo_url: None,
            attachment: None,
        }
    }

    /// Draft for editing an existing entry
    pub fn from_entry(existing: &JournalWithLines) -> Self {
        let entry = &existing.entry;
        let date = parse_date(&entry.date)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| entry.date.clone());
        Self {
            entry_number: entry.entry_number.clone(),
            date,
            description: entry.description.clone(),
            lines: existing
                .lines
                .iter()
                .map(|line| DraftLine {
                    account_id: Some(line.account_id),
                    debit: Some(line.debit),
                    credit: Some(line.credit),
                    description: line.description.clone(),
                })
                .collect(),
            photo_url: entry.photo_url.clone(),
            attachment: None,
        }
    }

    pub fn with_header(
        &self,
        entry_number: impl Into<String>,
        date: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let mut next = self.clone();
        next.entry_number = entry_number.into();
        next.date = date.into();
        next.description = description.into();
        next
    }

    pub fn with_line(&self, line: DraftLine) -> Self {
        let mut next = self.clone();
        next.lines.push(line);
        next
    }

    /// Replace the line at `index`
    pub fn with_line_at(&self, index: usize, line: DraftLine) -> Result<Self, ValidationError> {
        if index >= self.lines.len() {
            return Err(ValidationError::line_out_of_range(index, self.lines.len()));
        }
        let mut next = self.clone();
        next.lines[index] = line;
        Ok(next)
    }

    /// Remove the line at `index`; the last remaining line cannot be removed
    pub fn without_line(&self, index: usize) -> Result<Self, ValidationError> {
        if index >= self.lines.len() {
            return Err(ValidationError::line_out_of_range(index, self.lines.len()));
        }
        if self.lines.len() == 1 {
            return Err(ValidationError::minimum_lines());
        }
        let mut next = self.clone();
        next.lines.remove(index);
        Ok(next)
    }

    pub fn with_attachment(&self, attachment: Attachment) -> Self {
        let mut next = self.clone();
        next.attachment = Some(attachment);
        next
    }

    pub fn totals(&self) -> Totals {
        balance::calculate(&self.lines)
    }
}

/// A draft that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPayload {
    pub entry_number: String,
    pub date: String,
    pub description: String,
    pub lines: Vec<JournalLine>,
    pub photo_url: Option<String>,
    pub attachment: Option<Attachment>,
    pub totals: Totals,
}

/// How the payload goes over the wire
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionEnvelope {
    Json(CreateJournalDto),
    Multipart {
        dto: CreateJournalDto,
        attachment: Attachment,
    },
}

impl ValidPayload {
    pub fn to_dto(&self) -> CoreResult<CreateJournalDto> {
        let lines_json = serde_json::to_string(&self.lines).map_err(|e| CoreError::Internal {
            message: format!("failed to serialize journal lines: {}", e),
        })?;
        Ok(CreateJournalDto {
            entry_number: self.entry_number.clone(),
            date: self.date.clone(),
            description: self.description.clone(),
            photo_url: self.photo_url.clone(),
            lines_json,
        })
    }

    /// JSON body, or a multipart form when a file is attached
    pub fn envelope(&self) -> CoreResult<SubmissionEnvelope> {
        let dto = self.to_dto()?;
        Ok(match &self.attachment {
            Some(attachment) => SubmissionEnvelope::Multipart {
                dto,
                attachment: attachment.clone(),
            },
            None => SubmissionEnvelope::Json(dto),
        })
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Check a draft and turn it into a payload
pub fn validate(draft: &JournalDraft) -> Result<ValidPayload, ValidationError> {
    if is_blank(&draft.entry_number) {
        return Err(ValidationError::missing_field("entryNumber"));
    }
    if is_blank(&draft.date) {
        return Err(ValidationError::missing_field("date"));
    }
    if is_blank(&draft.description) {
        return Err(ValidationError::missing_field("description"));
    }
    if draft.lines.is_empty() {
        return Err(ValidationError::minimum_lines());
    }

    let mut lines = Vec::with_capacity(draft.lines.len());
    for (index, line) in draft.lines.iter().enumerate() {
        let account_id = line
            .account_id
            .ok_or_else(|| ValidationError::missing_field(format!("lines[{}].accountId", index)))?;
        if line.debit() < Decimal::ZERO {
            return Err(ValidationError::negative_amount(format!("lines[{}].debit", index)));
        }
        if line.credit() < Decimal::ZERO {
            return Err(ValidationError::negative_amount(format!("lines[{}].credit", index)));
        }
        lines.push(JournalLine {
            account_id,
            debit: line.debit(),
            credit: line.credit(),
            description: line.description.clone(),
            account_name: None,
        });
    }

    let totals = balance::calculate(&lines);
    if !totals.is_balanced() {
        log::debug!(
            "rejecting draft {}: debit {} credit {}",
            draft.entry_number,
            totals.total_debit,
            totals.total_credit
        );
        return Err(ValidationError::unbalanced(totals.total_debit, totals.total_credit));
    }

    Ok(ValidPayload {
        entry_number: draft.entry_number.trim().to_string(),
        date: draft.date.trim().to_string(),
        description: draft.description.trim().to_string(),
        lines,
        photo_url: draft.photo_url.clone(),
        attachment: draft.attachment.clone(),
        totals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationKind;
    use crate::models::JournalEntry;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn draft(lines: Vec<DraftLine>) -> JournalDraft {
        JournalDraft {
            lines,
            ..JournalDraft::new().with_header("JE-001", "2024-01-15", "Office supplies")
        }
    }

    #[test]
    fn test_balanced_pair_validates() {
        let payload = validate(&draft(vec![
            DraftLine::debit_line(1, dec("100")),
            DraftLine::credit_line(2, dec("100")),
        ]))
        .unwrap();
        assert_eq!(payload.lines.len(), 2);
        assert_eq!(payload.totals.total_debit, dec("100"));
    }

    #[test]
    fn test_off_by_a_cent_is_unbalanced() {
        let err = validate(&draft(vec![
            DraftLine::debit_line(1, dec("100")),
            DraftLine::credit_line(2, dec("99.99")),
        ]))
        .unwrap_err();
        assert_eq!(err.kind, ValidationKind::UnbalancedEntry);
    }

    #[test]
    fn test_sub_cent_difference_is_balanced() {
        assert!(validate(&draft(vec![
            DraftLine::debit_line(1, dec("1000")),
            DraftLine::credit_line(2, dec("999.995")),
        ]))
        .is_ok());
    }

    #[test]
    fn test_required_header_fields() {
        let base = draft(vec![DraftLine::debit_line(1, Decimal::ZERO)]);

        let mut no_number = base.clone();
        no_number.entry_number = "  ".to_string();
        let err = validate(&no_number).unwrap_err();
        assert_eq!(err.kind, ValidationKind::MissingRequiredField);
        assert_eq!(err.field.as_deref(), Some("entryNumber"));

        let mut no_date = base.clone();
        no_date.date.clear();
        assert_eq!(validate(&no_date).unwrap_err().field.as_deref(), Some("date"));

        let mut no_description = base;
        no_description.description.clear();
        assert_eq!(
            validate(&no_description).unwrap_err().field.as_deref(),
            Some("description")
        );
    }

    #[test]
    fn test_line_without_account_names_the_line() {
        let err = validate(&draft(vec![
            DraftLine::debit_line(1, dec("5")),
            DraftLine {
                credit: Some(dec("5")),
                ..DraftLine::default()
            },
        ]))
        .unwrap_err();
        assert_eq!(err.kind, ValidationKind::MissingRequiredField);
        assert_eq!(err.field.as_deref(), Some("lines[1].accountId"));
    }

    #[test]
    fn test_no_lines_is_rejected() {
        let err = validate(&draft(vec![])).unwrap_err();
        assert_eq!(err.kind, ValidationKind::MinimumLinesViolation);
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let err = validate(&draft(vec![
            DraftLine::debit_line(1, dec("-10")),
            DraftLine::credit_line(2, dec("-10")),
        ]))
        .unwrap_err();
        assert_eq!(err.kind, ValidationKind::NegativeAmount);
        assert_eq!(err.field.as_deref(), Some("lines[0].debit"));
    }

    #[test]
    fn test_blank_amounts_count_as_zero() {
        let payload = validate(&draft(vec![DraftLine {
            account_id: Some(3),
            ..DraftLine::default()
        }]))
        .unwrap();
        assert_eq!(payload.lines[0].debit, Decimal::ZERO);
        assert_eq!(payload.lines[0].credit, Decimal::ZERO);
    }

    #[test]
    fn test_new_draft_has_one_line_that_cannot_be_removed() {
        let fresh = JournalDraft::new();
        assert_eq!(fresh.lines.len(), 1);
        let err = fresh.without_line(0).unwrap_err();
        assert_eq!(err.kind, ValidationKind::MinimumLinesViolation);
    }

    #[test]
    fn test_removing_one_of_two_leaves_one() {
        let two = JournalDraft::new().with_line(DraftLine::credit_line(9, dec("1")));
        let one = two.without_line(0).unwrap();
        assert_eq!(one.lines.len(), 1);
        assert_eq!(one.lines[0].account_id, Some(9));
        // the source draft is untouched
        assert_eq!(two.lines.len(), 2);
    }

    #[test]
    fn test_out_of_range_index() {
        let err = JournalDraft::new().without_line(3).unwrap_err();
        assert_eq!(err.kind, ValidationKind::LineOutOfRange);
        assert!(JournalDraft::new()
            .with_line_at(1, DraftLine::default())
            .is_err());
    }

    #[test]
    fn test_edit_draft_from_entry() {
        let existing = JournalWithLines {
            entry: JournalEntry {
                id: 7,
                entry_number: "JE-7".to_string(),
                date: "2024-02-10T00:00:00".to_string(),
                description: "Rent".to_string(),
                posted: false,
                created_at: None,
                photo_url: Some("/uploads/r.png".to_string()),
            },
            lines: vec![
                JournalLine {
                    account_id: 1,
                    debit: dec("500"),
                    credit: Decimal::ZERO,
                    description: String::new(),
                    account_name: Some("Rent".to_string()),
                },
                JournalLine {
                    account_id: 2,
                    debit: Decimal::ZERO,
                    credit: dec("500"),
                    description: String::new(),
                    account_name: Some("Cash".to_string()),
                },
            ],
        };
        let edit = JournalDraft::from_entry(&existing);
        assert_eq!(edit.date, "2024-02-10");
        assert_eq!(edit.lines.len(), 2);
        assert_eq!(edit.photo_url.as_deref(), Some("/uploads/r.png"));
        assert!(validate(&edit).is_ok());
    }

    #[test]
    fn test_payload_envelopes() {
        let valid = draft(vec![
            DraftLine::debit_line(1, dec("100.5")),
            DraftLine::credit_line(2, dec("100.5")),
        ]);
        let payload = validate(&valid).unwrap();
        let dto = match payload.envelope().unwrap() {
            SubmissionEnvelope::Json(dto) => dto,
            other => panic!("expected json body, got {:?}", other),
        };
        let lines: serde_json::Value = serde_json::from_str(&dto.lines_json).unwrap();
        assert_eq!(lines[0]["debit"], serde_json::json!(100.5));
        assert_eq!(lines[1]["accountId"], 2);

        let with_photo = valid.with_attachment(Attachment::from_bytes("receipt.JPG", vec![1, 2, 3]));
        match validate(&with_photo).unwrap().envelope().unwrap() {
            SubmissionEnvelope::Multipart { attachment, .. } => {
                assert_eq!(attachment.content_type, "image/jpeg");
            }
            other => panic!("expected multipart, got {:?}", other),
        }
    }
}
