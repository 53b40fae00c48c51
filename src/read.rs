use crate::data::{RawRow, TransactionKind, TransactionRow};
use anyhow::Context;

/// Where typed rows go as they come off the file, one at a time, in file
/// order. The service collects them for the replay engine; tests use it to
/// check what the reader actually produced.
pub(crate) trait RowConsumer {
    fn consume(&mut self, row: TransactionRow);
}

/// Shape of one ledger export: the field delimiter and the column names,
/// given positionally. The file's own header line is skipped, not trusted.
#[derive(Debug, Clone)]
pub(crate) struct LedgerFormat {
    pub delimiter: u8,
    pub headers: Vec<String>,
}

impl Default for LedgerFormat {
    /// The servicer's standard export: comma-separated, six columns.
    fn default() -> Self {
        Self {
            delimiter: b',',
            headers: ["Date", "Type", "Amount", "Fees", "Principal", "Interest"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
        }
    }
}

/// Positions of the required columns within a record, resolved once per file
/// from the configured header names.
struct Columns {
    date: usize,
    kind: usize,
    amount: usize,
    fees: usize,
    principal: usize,
    interest: usize,
}

impl Columns {
    fn resolve(headers: &[String]) -> Result<Self, anyhow::Error> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|header| header == name)
                .with_context(|| format!("ledger format is missing a {name:?} column"))
        };
        Ok(Self {
            date: position("Date")?,
            kind: position("Type")?,
            amount: position("Amount")?,
            fees: position("Fees")?,
            principal: position("Principal")?,
            interest: position("Interest")?,
        })
    }

    fn split<'a>(&self, record: &'a csv::StringRecord) -> Option<RawRow<'a>> {
        Some(RawRow {
            date: record.get(self.date)?,
            kind: record.get(self.kind)?,
            amount: record.get(self.amount)?,
            fees: record.get(self.fees)?,
            principal: record.get(self.principal)?,
            interest: record.get(self.interest)?,
        })
    }
}

/// Stream a delimited ledger into `consumer`, preserving file order. Any
/// malformed row aborts the whole read: a ledger with one corrupt line
/// cannot produce a running balance worth trusting.
pub(crate) fn read_rows<R: std::io::Read, C: RowConsumer>(
    reader: R,
    format: &LedgerFormat,
    consumer: &mut C,
) -> Result<(), anyhow::Error> {
    let columns = Columns::resolve(&format.headers)?;
    // `has_headers` defaults to true, which consumes the file's own header
    // line; only the configured names in `format.headers` count.
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(format.delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);
    for (index, result) in rdr.records().enumerate() {
        let line = index + 2; // 1-based, after the header line
        let record = result.with_context(|| format!("ledger line {line} is unreadable"))?;
        let raw = columns
            .split(&record)
            .with_context(|| format!("ledger line {line} is missing fields"))?;
        let row =
            TransactionRow::from_raw(raw).with_context(|| format!("ledger line {line}"))?;
        if row.kind == TransactionKind::Unknown {
            tracing::warn!(
                line,
                kind = raw.kind,
                "unrecognized transaction kind, will replay as a no-op"
            );
        }
        consumer.consume(row);
    }
    Ok(())
}
