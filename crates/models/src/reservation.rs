use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// A booked room. Dates are kept exactly as supplied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_id: String,
    pub customer_id: String,
    pub hotel_id: String,
    pub check_in: String,
    pub check_out: String,
}

impl Reservation {
    pub fn new(reservation_id: String, customer_id: &str, hotel_id: &str, check_in: &str, check_out: &str) -> Self {
        Self {
            reservation_id,
            customer_id: customer_id.to_string(),
            hotel_id: hotel_id.to_string(),
            check_in: check_in.to_string(),
            check_out: check_out.to_string(),
        }
    }
}

/// Parsed stay, used only when date validation is switched on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StayDates {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayDates {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    /// Parse both dates and require `check_in < check_out`.
    pub fn parse(check_in: &str, check_out: &str) -> Result<Self, ModelError> {
        let check_in = parse_date("check_in", check_in)?;
        let check_out = parse_date("check_out", check_out)?;
        if check_in >= check_out {
            return Err(ModelError::Validation(format!(
                "check_in {check_in} must be before check_out {check_out}"
            )));
        }
        Ok(Self { check_in, check_out })
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ModelError> {
    NaiveDate::parse_from_str(value.trim(), StayDates::FORMAT)
        .map_err(|e| ModelError::Validation(format!("{field} '{value}' is not a YYYY-MM-DD date: {e}")))
}
