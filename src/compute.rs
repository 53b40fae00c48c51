use crate::data::{AccountSummary, HistoryEntry, TransactionKind::*, TransactionRow};
use rust_decimal::Decimal;

/// The replay engine: a strict left-to-right fold over one account's ledger.
/// Four running totals advance per the kind table in `apply`, and every row
/// emits one history entry snapshotting them. The balance moves by the row's
/// signed `amount`; the paid totals accumulate magnitudes, whichever sign the
/// export stored the row fields with.
#[derive(Debug, Default)]
pub(crate) struct Replay {
    balance: Decimal,
    principal_paid: Decimal,
    interest_paid: Decimal,
    fees_paid: Decimal,
    history: Vec<HistoryEntry>,
}

impl Replay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the running totals by one row and record the snapshot. Total
    /// over all typed rows: kinds with no rule of their own (including
    /// `Unknown`) leave every total untouched but still show up in history.
    pub fn apply(&mut self, row: TransactionRow) {
        match row.kind {
            // A disbursement re-baselines the balance, it doesn't add to it.
            Disbursement => self.balance = row.amount,
            AccruedInterest => self.balance += row.amount,
            Payment | AutoDebitPayment => {
                self.balance += row.amount;
                self.principal_paid += row.principal.abs();
                self.interest_paid += row.interest.abs();
                self.fees_paid += row.fees.abs();
            }
            PaymentReversal => {
                self.balance += row.amount;
                self.principal_paid -= row.principal.abs();
                self.interest_paid -= row.interest.abs();
                self.fees_paid -= row.fees.abs();
            }
            ReturnedCharge => self.balance += row.amount,
            CapitalizedInterest | Adjustment | Unknown => {}
        }
        self.history.push(HistoryEntry {
            transaction: row,
            resulting_balance: self.balance,
            principal_paid: self.principal_paid,
            interest_paid: self.interest_paid,
            fees_paid: self.fees_paid,
        });
    }

    /// Derive the account summary from the final snapshot; an empty history
    /// gives the all-zero summary.
    pub fn into_summary(self) -> AccountSummary {
        match self.history.last().copied() {
            Some(last) => AccountSummary {
                balance: last.resulting_balance,
                total_interest: last.interest_paid,
                total_principal: last.principal_paid,
                total_fees: last.fees_paid,
                history: self.history,
            },
            None => AccountSummary::default(),
        }
    }
}

/// One-shot replay of an ordered, already-materialized ledger.
pub(crate) fn replay<I>(rows: I) -> AccountSummary
where
    I: IntoIterator<Item = TransactionRow>,
{
    let mut engine = Replay::new();
    for row in rows {
        engine.apply(row);
    }
    engine.into_summary()
}
