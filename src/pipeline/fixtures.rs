//! Shared test data.

use crate::dictionary::{DictionaryEntry, ReferenceDictionary};
use polars::prelude::DataFrame;
use std::path::Path;

/// Six raw loans covering every status group, a joint application and
/// the usual gaps.
pub(crate) fn raw_loans() -> anyhow::Result<DataFrame> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/raw_loans.csv");
    Ok(super::io::load_raw_csv(&path)?)
}

pub(crate) fn dictionary() -> ReferenceDictionary {
    ReferenceDictionary::new(vec![
        DictionaryEntry::new(
            "hardship_flag",
            "Flags whether or not the borrower is on a hardship plan",
        ),
        DictionaryEntry::new(
            "debt_settlement_flag",
            "Flags whether or not the borrower, who has charged-off, is working with a debt-settlement company.",
        ),
        DictionaryEntry::new(
            "settlement_status",
            "The status of the borrower's settlement plan. Possible values are: COMPLETE, ACTIVE, BROKEN",
        ),
        DictionaryEntry::new(
            "payment_plan_start_date",
            "The day the first HARDSHIP plan payment is due.",
        ),
        DictionaryEntry::new(
            "loan_amnt",
            "The listed amount of the loan applied for by the borrower.",
        ),
    ])
}
