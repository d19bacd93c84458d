//! Proposal counter entity - Last issued proposal sequence, one row per year.
//! Incremented in place so concurrent saves never hand out the same number.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Proposal counter database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "proposal_counters")]
pub struct Model {
    /// Calendar year the sequence belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub year: i32,
    /// Last sequence handed out for this year
    pub last_sequence: i32,
    /// When the counter last moved
    pub updated_at: DateTimeUtc,
}

/// `ProposalCounter` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
