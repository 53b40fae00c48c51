use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Transaction kinds as labeled by the loan servicer's export. The label set
/// is closed: anything else maps to `Unknown`, which the replay engine treats
/// as a no-op rather than guessing at its meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransactionKind {
    Disbursement,
    AccruedInterest,
    Payment,
    AutoDebitPayment,
    PaymentReversal,
    ReturnedCharge,
    CapitalizedInterest,
    Adjustment,
    Unknown,
}

impl TransactionKind {
    /// Exact-match lookup of a servicer label. `None` means the label is not
    /// in the closed set; the caller decides whether that is worth flagging
    /// (the ingestion layer logs it and keeps the row as `Unknown`).
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Disbursement" => Some(Self::Disbursement),
            "Accrued Interest" => Some(Self::AccruedInterest),
            "Payment" => Some(Self::Payment),
            "Auto debit payment" => Some(Self::AutoDebitPayment),
            "Payment reversal" => Some(Self::PaymentReversal),
            "Returned check charge" => Some(Self::ReturnedCharge),
            "Capitalized Interest" => Some(Self::CapitalizedInterest),
            "Adjustment" => Some(Self::Adjustment),
            _ => None,
        }
    }
}

/// One ledger line as the servicer recorded it, immutable once typed.
/// `amount` is directly signed and lands on the balance as-is; `fees`,
/// `principal` and `interest` keep whatever sign the export stored (payments
/// usually store them as reductions). The replay engine owns the
/// interpretation of those signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TransactionRow {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub fees: Decimal,
    pub principal: Decimal,
    pub interest: Decimal,
}

/// Field values for one record, already split out of the delimited file.
/// Typing knows nothing about file paths, streams or delimiters; the reader
/// hands it these.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawRow<'a> {
    pub date: &'a str,
    pub kind: &'a str,
    pub amount: &'a str,
    pub fees: &'a str,
    pub principal: &'a str,
    pub interest: &'a str,
}

/// Hard typing failures. An unrecognized kind is not one of these: it types
/// as `TransactionKind::Unknown` instead of failing the row.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RowError {
    #[error("{column} value {value:?} is not a number")]
    MalformedNumber { column: &'static str, value: String },
    #[error("{value:?} is not a calendar date")]
    MalformedDate { value: String },
}

impl TransactionRow {
    /// Pure mapping from split field values to a typed row. Number and date
    /// problems are hard errors; an unrecognized kind is not.
    pub fn from_raw(raw: RawRow<'_>) -> Result<Self, RowError> {
        Ok(Self {
            date: parse_date(raw.date)?,
            kind: TransactionKind::from_label(raw.kind).unwrap_or(TransactionKind::Unknown),
            amount: parse_decimal("amount", raw.amount)?,
            fees: parse_decimal("fees", raw.fees)?,
            principal: parse_decimal("principal", raw.principal)?,
            interest: parse_decimal("interest", raw.interest)?,
        })
    }
}

/// Money columns the servicer didn't touch come through blank; those read as
/// zero. Anything else has to parse as a decimal.
fn parse_decimal(column: &'static str, value: &str) -> Result<Decimal, RowError> {
    if value.is_empty() {
        return Ok(Decimal::ZERO);
    }
    value.parse().map_err(|_| RowError::MalformedNumber {
        column,
        value: value.to_string(),
    })
}

/// Dates are US-style (`03/17/2014`) in the servicer export; ISO dates are
/// accepted as well.
fn parse_date(value: &str) -> Result<NaiveDate, RowError> {
    ["%m/%d/%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .ok_or_else(|| RowError::MalformedDate {
            value: value.to_string(),
        })
}

/// One replay snapshot: the row itself plus the running totals *after*
/// applying it. The paid fields are cumulative magnitudes, not the row's own
/// signed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HistoryEntry {
    pub transaction: TransactionRow,
    pub resulting_balance: Decimal,
    pub principal_paid: Decimal,
    pub interest_paid: Decimal,
    pub fees_paid: Decimal,
}

/// Everything known about the account after replaying its ledger. The totals
/// are copies of the last history entry's running totals; an empty ledger
/// leaves them at zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct AccountSummary {
    pub balance: Decimal,
    pub total_interest: Decimal,
    pub total_principal: Decimal,
    pub total_fees: Decimal,
    pub history: Vec<HistoryEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw(kind: &'static str) -> RawRow<'static> {
        RawRow {
            date: "03/17/2014",
            kind,
            amount: "0",
            fees: "0",
            principal: "0",
            interest: "0",
        }
    }

    #[test]
    fn type_full_row() {
        let row = TransactionRow::from_raw(RawRow {
            date: "03/17/2014",
            kind: "Payment",
            amount: "-125.00",
            fees: "-5.00",
            principal: "-100.00",
            interest: "-20.00",
        })
        .unwrap();
        assert_eq!(
            row,
            TransactionRow {
                date: NaiveDate::from_ymd_opt(2014, 3, 17).unwrap(),
                kind: TransactionKind::Payment,
                amount: dec!(-125.00),
                fees: dec!(-5.00),
                principal: dec!(-100.00),
                interest: dec!(-20.00),
            }
        );
    }

    #[test]
    fn every_servicer_label_resolves() {
        for (label, kind) in [
            ("Disbursement", TransactionKind::Disbursement),
            ("Accrued Interest", TransactionKind::AccruedInterest),
            ("Payment", TransactionKind::Payment),
            ("Auto debit payment", TransactionKind::AutoDebitPayment),
            ("Payment reversal", TransactionKind::PaymentReversal),
            ("Returned check charge", TransactionKind::ReturnedCharge),
            ("Capitalized Interest", TransactionKind::CapitalizedInterest),
            ("Adjustment", TransactionKind::Adjustment),
        ] {
            assert_eq!(TransactionKind::from_label(label), Some(kind));
        }
    }

    #[test]
    fn unknown_label_types_as_unknown_not_error() {
        assert_eq!(TransactionKind::from_label("Loan forgiveness"), None);
        let row = TransactionRow::from_raw(raw("Loan forgiveness")).unwrap();
        assert_eq!(row.kind, TransactionKind::Unknown);
    }

    #[test]
    fn lookup_is_exact_match() {
        assert_eq!(TransactionKind::from_label("payment"), None);
        assert_eq!(TransactionKind::from_label("Payment "), None);
    }

    #[test]
    fn blank_money_cell_reads_as_zero() {
        let row = TransactionRow::from_raw(RawRow {
            fees: "",
            ..raw("Payment")
        })
        .unwrap();
        assert_eq!(row.fees, Decimal::ZERO);
    }

    #[test]
    fn junk_number_is_rejected() {
        assert_eq!(
            TransactionRow::from_raw(RawRow {
                amount: "12x.00",
                ..raw("Payment")
            }),
            Err(RowError::MalformedNumber {
                column: "amount",
                value: "12x.00".to_string(),
            })
        );
    }

    #[test]
    fn junk_date_is_rejected() {
        assert_eq!(
            TransactionRow::from_raw(RawRow {
                date: "last tuesday",
                ..raw("Payment")
            }),
            Err(RowError::MalformedDate {
                value: "last tuesday".to_string(),
            })
        );
    }

    #[test]
    fn iso_date_is_accepted() {
        let row = TransactionRow::from_raw(RawRow {
            date: "2014-03-17",
            ..raw("Adjustment")
        })
        .unwrap();
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2014, 3, 17).unwrap());
    }
}
