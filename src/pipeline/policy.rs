//! Static column policy for the loan cleaning pipeline.
//!
//! Every column the pipeline touches by name is declared here, grouped by
//! the action applied to it. The only list not known up front is the
//! dictionary-driven drop list, which [`ColumnAction::DropIfDynamicMatch`]
//! stands in for and the missing-value resolver computes at construction.

use crate::error::{PrepError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Multi-valued outcome column consumed by the target labeler.
pub const STATUS_COLUMN: &str = "loan_status";

/// Binary outcome column produced by the target labeler.
pub const TARGET_COLUMN: &str = "target";

/// Statuses that count as a default (`target == true`).
pub const DEFAULTED_STATUSES: [&str; 4] = [
    "Charged Off",
    "Default",
    "Does not meet the credit policy. Status:Charged Off",
    "Late (31-120 days)",
];

/// Statuses that count as repaid (`target == false`).
pub const NON_DEFAULTED_STATUSES: [&str; 2] = [
    "Fully Paid",
    "Does not meet the credit policy. Status:Fully Paid",
];

/// Identifier columns that are empty in every row of the public extract.
pub const EMPTY_IDENTIFIER_COLUMNS: [&str; 3] = ["id", "member_id", "url"];

pub const EMP_LENGTH_COLUMN: &str = "emp_length";

/// Sentinel written into missing employment lengths.
pub const EMP_LENGTH_SENTINEL: &str = "0 years";

pub const APPLICATION_TYPE_COLUMN: &str = "application_type";
pub const INDIVIDUAL_APPLICATION: &str = "Individual";

/// Name fragments that mark joint-applicant columns.
pub const JOINT_COLUMN_MARKERS: [&str; 2] = ["joint", "sec_app"];

/// Case-insensitive description pattern for hardship and settlement fields.
pub const SETTLEMENT_OR_HARDSHIP_PATTERN: &str = "(?i)settle|hardship";

/// Source column and the "has event" flag derived from its presence.
pub const PRESENCE_FLAGS: [(&str, &str); 5] = [
    ("mths_since_last_record", "has_public_record"),
    ("mths_since_recent_bc_dlq", "has_recent_bc_dlq"),
    ("mths_since_last_major_derog", "has_major_derog"),
    ("mths_since_recent_revol_delinq", "has_recent_revol_delinq"),
    ("mths_since_last_delinq", "has_recent_delinq"),
];

/// Name patterns whose missing values mean "zero occurrences".
pub const ZERO_FILL_PATTERNS: [ColumnPattern; 2] = [
    ColumnPattern::Prefix("num_"),
    ColumnPattern::Contains("_util"),
];

/// Open-credit activity fields, missing when the borrower has none.
pub const OPEN_CREDIT_COLUMNS: [&str; 11] = [
    "max_bal_bc",
    "open_acc_6m",
    "open_act_il",
    "open_il_12m",
    "open_il_24m",
    "total_bal_il",
    "open_rv_24m",
    "open_rv_12m",
    "inq_last_12m",
    "inq_fi",
    "total_cu_tl",
];

/// Rarely missing balance and count fields.
pub const LOW_FREQUENCY_COLUMNS: [&str; 18] = [
    "tot_cur_bal",
    "tot_coll_amt",
    "emp_length",
    "avg_cur_bal",
    "tax_liens",
    "total_rev_hi_lim",
    "total_il_high_credit_limit",
    "tot_hi_cred_lim",
    "pct_tl_nvr_dlq",
    "percent_bc_gt_75",
    "bc_open_to_buy",
    "mort_acc",
    "acc_open_past_24mths",
    "total_bc_limit",
    "total_bal_ex_mort",
    "pub_rec_bankruptcies",
    "collections_12_mths_ex_med",
    "chargeoff_within_12_mths",
];

/// Months-since-opening fields filled with zero rather than flagged.
pub const RECENCY_ZERO_FILL_COLUMNS: [&str; 6] = [
    "mo_sin_rcnt_rev_tl_op",
    "mo_sin_rcnt_tl",
    "mths_since_recent_inq",
    "mo_sin_old_rev_tl_op",
    "mo_sin_old_il_acct",
    "mths_since_recent_bc",
];

/// Date-like, payment-recency and flagged columns dropped after filling.
pub const UNINFORMATIVE_COLUMNS: [&str; 10] = [
    "next_pymnt_d",
    "last_pymnt_d",
    "last_pymnt_amnt",
    "last_credit_pull_d",
    "mths_since_rcnt_il",
    "mths_since_last_record",
    "mths_since_recent_bc_dlq",
    "mths_since_last_major_derog",
    "mths_since_recent_revol_delinq",
    "mths_since_last_delinq",
];

/// Columns populated only once the loan's outcome is known.
pub const LEAKAGE_COLUMNS: [&str; 11] = [
    "collection_recovery_fee",
    "funded_amnt",
    "funded_amnt_inv",
    "out_prncp",
    "out_prncp_inv",
    "recoveries",
    "total_pymnt",
    "total_pymnt_inv",
    "total_rec_int",
    "total_rec_late_fee",
    "total_rec_prncp",
];

/// String column, matched value, and the boolean it becomes.
pub const BOOLEAN_INDICATORS: [(&str, &str, &str); 4] = [
    ("pymnt_plan", "y", "is_payment_plan"),
    ("initial_list_status", "w", "is_whole_loan"),
    ("application_type", "Individual", "is_individual_app"),
    ("disbursement_method", "Cash", "is_cash"),
];

pub const TERM_COLUMN: &str = "term";
pub const TERM_MONTHS_COLUMN: &str = "term_months";
pub const DOMINANT_TERM: &str = "36 months";
pub const DOMINANT_TERM_FLAG: &str = "is_36_month_term";

pub const DATE_COLUMNS: [&str; 2] = ["issue_d", "earliest_cr_line"];

pub const CATEGORICAL_COLUMNS: [&str; 6] = [
    "grade",
    "sub_grade",
    "home_ownership",
    "verification_status",
    "purpose",
    "addr_state",
];

/// Free-text columns with no structured information.
pub const FREE_TEXT_COLUMNS: [&str; 4] = ["emp_title", "desc", "title", "zip_code"];

/// How a column name is matched by a policy rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPattern {
    Prefix(&'static str),
    Contains(&'static str),
}

impl ColumnPattern {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Prefix(prefix) => name.starts_with(prefix),
            Self::Contains(fragment) => name.contains(fragment),
        }
    }

    /// Names from `columns` this pattern selects, in their original order.
    pub fn select<'a>(&self, columns: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        columns
            .into_iter()
            .filter(|name| self.matches(name))
            .map(ToOwned::to_owned)
            .collect()
    }
}

/// Resolution action bound to a set of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum ColumnAction {
    /// Remove the columns outright.
    DropUnconditionally,
    /// Replace missing values with zero in the column's own type.
    ZeroFill,
    /// Add a boolean column that is true where the single source column
    /// is present.
    DerivePresenceFlag { flag: String },
    /// Remove the columns if they exist; absent names are not an error.
    DropIfDynamicMatch,
}

impl ColumnAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DropUnconditionally => "drop",
            Self::ZeroFill => "zero-fill",
            Self::DerivePresenceFlag { .. } => "presence-flag",
            Self::DropIfDynamicMatch => "dynamic-drop",
        }
    }

    /// Apply this action to `columns` of a lazy frame.
    ///
    /// `schema` is the frame's current schema; zero-fill uses it to pick a
    /// fill literal that matches each column's type.
    ///
    /// # Errors
    ///
    /// A presence flag names one output column, so it fails unless exactly
    /// one source column is given.
    pub fn apply(&self, lf: LazyFrame, schema: &Schema, columns: &[String]) -> Result<LazyFrame> {
        Ok(match self {
            Self::DropUnconditionally | Self::DropIfDynamicMatch => {
                let keep: Vec<Expr> = schema
                    .iter_names()
                    .filter(|name| !columns.iter().any(|c| c == name.as_str()))
                    .map(|name| col(name.as_str()))
                    .collect();
                lf.select(keep)
            }
            Self::ZeroFill => {
                let fills: Vec<Expr> = columns
                    .iter()
                    .map(|name| {
                        let zero = match schema.get(name.as_str()) {
                            Some(DataType::String) | None => lit("0"),
                            Some(_) => lit(0),
                        };
                        col(name.as_str()).fill_null(zero).alias(name.as_str())
                    })
                    .collect();
                lf.with_columns(fills)
            }
            Self::DerivePresenceFlag { flag } => match columns {
                [source] => {
                    lf.with_column(col(source.as_str()).is_not_null().alias(flag.as_str()))
                }
                _ => {
                    return Err(PrepError::DataProcessing(format!(
                        "presence flag '{flag}' needs exactly one source column, got {}",
                        columns.len()
                    )));
                }
            },
        })
    }
}
