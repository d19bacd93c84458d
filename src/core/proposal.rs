//! Proposal numbering.
//!
//! Proposal numbers look like `2026000710`: the year, a four digit per-year sequence and
//! the month the quote was saved in. Sequences come from the `proposal_counters` table
//! and are advanced with a single `UPDATE ... SET last_sequence = last_sequence + 1`
//! inside the caller's transaction, so two saves can never draw the same value.

use crate::{
    entities::{ProposalCounter, proposal_counter},
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, Utc};
use sea_orm::{Set, prelude::*, sea_query::Expr};
use std::{fmt, str::FromStr};
use tracing::{debug, instrument};

/// Largest sequence that fits in the four digit slot.
pub const MAX_SEQUENCE: u32 = 9999;

/// Parsed proposal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProposalNumber {
    year: i32,
    sequence: u32,
    month: u32,
}

impl ProposalNumber {
    /// Builds a proposal number, checking each component fits its slot.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] for a year outside `1000..=9999`, a sequence outside
    /// `1..=9999` or a month outside `1..=12`.
    pub fn new(year: i32, sequence: u32, month: u32) -> Result<Self> {
        if !(1000..=9999).contains(&year) {
            return Err(Error::invalid("year", format!("{year} is not a four digit year")));
        }
        if !(1..=MAX_SEQUENCE).contains(&sequence) {
            return Err(Error::invalid(
                "sequence",
                format!("{sequence} is outside 1..={MAX_SEQUENCE}"),
            ));
        }
        if !(1..=12).contains(&month) {
            return Err(Error::invalid("month", format!("{month} is not a month")));
        }
        Ok(Self {
            year,
            sequence,
            month,
        })
    }

    /// Proposal number for `sequence` issued at `issued_at`.
    ///
    /// # Errors
    /// See [`ProposalNumber::new`].
    pub fn issued_at(sequence: u32, issued_at: DateTime<Utc>) -> Result<Self> {
        Self::new(issued_at.year(), sequence, issued_at.month())
    }

    /// Year the sequence belongs to.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Per-year sequence.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Month the quote was saved in.
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for ProposalNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:04}{:02}", self.year, self.sequence, self.month)
    }
}

impl FromStr for ProposalNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != 10 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid(
                "proposal_number",
                format!("'{s}' is not ten digits (YYYY + sequence + MM)"),
            ));
        }
        let field = |range: std::ops::Range<usize>| {
            s[range]
                .parse::<u32>()
                .map_err(|e| Error::invalid("proposal_number", e.to_string()))
        };
        let year = i32::try_from(field(0..4)?)
            .map_err(|e| Error::invalid("proposal_number", e.to_string()))?;
        Self::new(year, field(4..8)?, field(8..10)?)
    }
}

/// Sequence the read-latest rule would hand out next.
///
/// If the latest proposal number belongs to `year` the next sequence follows it,
/// otherwise the year starts again at 1. Unparseable numbers count as "no quote".
/// The atomic counter uses this only to pick its starting point.
#[must_use]
pub fn legacy_next_sequence(latest: Option<&str>, year: i32) -> u32 {
    match latest.and_then(|n| n.parse::<ProposalNumber>().ok()) {
        Some(number) if number.year() == year => number.sequence() + 1,
        _ => 1,
    }
}

/// Draws the next proposal number for the year of `now`.
///
/// Must run inside the transaction that inserts the quote. The first draw of a year
/// creates the counter row, continuing from the latest stored quote of that year; a
/// concurrent first draw collides on the counter's primary key and surfaces as
/// [`Error::Conflict`].
///
/// # Errors
/// Returns [`Error::SequenceExhausted`] past 9999 quotes in a year, [`Error::Conflict`]
/// on a counter race, or a database error.
#[instrument(skip(txn))]
pub async fn allocate_proposal_number<C>(txn: &C, now: DateTime<Utc>) -> Result<ProposalNumber>
where
    C: ConnectionTrait,
{
    let year = now.year();

    let updated = ProposalCounter::update_many()
        .col_expr(
            proposal_counter::Column::LastSequence,
            Expr::col(proposal_counter::Column::LastSequence).add(1),
        )
        .col_expr(proposal_counter::Column::UpdatedAt, Expr::value(now))
        .filter(proposal_counter::Column::Year.eq(year))
        .exec(txn)
        .await?;

    if updated.rows_affected == 0 {
        let latest = crate::core::quote::find_latest_quote(txn).await?;
        let first = legacy_next_sequence(latest.as_ref().map(|q| q.proposal_number.as_str()), year);
        debug!(year, first, "Starting proposal counter");

        let counter = proposal_counter::ActiveModel {
            year: Set(year),
            last_sequence: Set(i32::try_from(first).unwrap_or(i32::MAX)),
            updated_at: Set(now),
        };
        counter.insert(txn).await?;
    }

    let counter = ProposalCounter::find_by_id(year)
        .one(txn)
        .await?
        .ok_or_else(|| Error::Database(format!("proposal counter for {year} vanished")))?;

    let sequence = u32::try_from(counter.last_sequence)
        .map_err(|_| Error::Database(format!("negative proposal counter for {year}")))?;
    if sequence > MAX_SEQUENCE {
        return Err(Error::SequenceExhausted { year });
    }

    ProposalNumber::issued_at(sequence, now)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::TimeZone;
    use sea_orm::TransactionTrait;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_format_and_parse() -> Result<()> {
        let number = ProposalNumber::new(2026, 7, 3)?;
        assert_eq!(number.to_string(), "2026000703");

        let parsed: ProposalNumber = "2026012311".parse()?;
        assert_eq!(parsed.year(), 2026);
        assert_eq!(parsed.sequence(), 123);
        assert_eq!(parsed.month(), 11);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_malformed_numbers() {
        for bad in ["", "2026", "20260001013", "2026abcd10", "2026000013", "2026000010"] {
            assert!(bad.parse::<ProposalNumber>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_sequence_over_four_digits_is_rejected() {
        assert!(ProposalNumber::new(2026, MAX_SEQUENCE + 1, 1).is_err());
        assert!(ProposalNumber::new(2026, 0, 1).is_err());
    }

    #[test]
    fn test_legacy_next_sequence() {
        assert_eq!(legacy_next_sequence(None, 2026), 1);
        assert_eq!(legacy_next_sequence(Some("2026004102"), 2026), 42);
        assert_eq!(legacy_next_sequence(Some("2025099912"), 2026), 1);
        assert_eq!(legacy_next_sequence(Some("garbage"), 2026), 1);
    }

    #[tokio::test]
    async fn test_allocate_counts_up_within_a_year() -> Result<()> {
        let db = setup_test_db().await?;

        let first = allocate_proposal_number(&db, at(2026, 3, 1)).await?;
        let second = allocate_proposal_number(&db, at(2026, 3, 2)).await?;
        let third = allocate_proposal_number(&db, at(2026, 4, 9)).await?;

        assert_eq!(first.to_string(), "2026000103");
        assert_eq!(second.to_string(), "2026000203");
        assert_eq!(third.to_string(), "2026000304");
        Ok(())
    }

    #[tokio::test]
    async fn test_allocate_restarts_each_year() -> Result<()> {
        let db = setup_test_db().await?;

        allocate_proposal_number(&db, at(2025, 12, 30)).await?;
        allocate_proposal_number(&db, at(2025, 12, 31)).await?;
        let new_year = allocate_proposal_number(&db, at(2026, 1, 1)).await?;

        assert_eq!(new_year.year(), 2026);
        assert_eq!(new_year.sequence(), 1);
        assert_eq!(new_year.month(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_allocate_inside_rolled_back_transaction_is_discarded() -> Result<()> {
        let db = setup_test_db().await?;

        let txn = db.begin().await?;
        allocate_proposal_number(&txn, at(2026, 5, 1)).await?;
        txn.rollback().await?;

        let number = allocate_proposal_number(&db, at(2026, 5, 1)).await?;
        assert_eq!(number.sequence(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_second_counter_row_for_a_year_is_retriable_conflict() -> Result<()> {
        let db = setup_test_db().await?;
        allocate_proposal_number(&db, at(2026, 5, 1)).await?;

        // What a losing first draw of the year runs into.
        let result = proposal_counter::ActiveModel {
            year: Set(2026),
            last_sequence: Set(1),
            updated_at: Set(at(2026, 5, 1)),
        }
        .insert(&db)
        .await
        .map_err(Error::from);

        let err = result.unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
        assert!(err.is_retriable());

        let next = allocate_proposal_number(&db, at(2026, 5, 2)).await?;
        assert_eq!(next.sequence(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_allocate_fails_when_year_is_exhausted() -> Result<()> {
        let db = setup_test_db().await?;

        proposal_counter::ActiveModel {
            year: Set(2026),
            last_sequence: Set(9999),
            updated_at: Set(at(2026, 1, 1)),
        }
        .insert(&db)
        .await?;

        let result = allocate_proposal_number(&db, at(2026, 6, 1)).await;
        assert!(matches!(result, Err(Error::SequenceExhausted { year: 2026 })));
        Ok(())
    }
}
