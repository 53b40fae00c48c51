use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::OnceCell;

use crate::compute::replay;
use crate::data::{AccountSummary, TransactionRow};
use crate::read::{read_rows, LedgerFormat, RowConsumer};

/// Identity of one ledger: where it lives and how it is shaped. One
/// `AccountService` caches exactly one of these.
#[derive(Debug, Clone)]
pub(crate) struct LedgerSource {
    pub path: PathBuf,
    pub format: LedgerFormat,
}

/// Materializes the row sequence in file order before the fold runs.
#[derive(Default)]
struct RowBuffer {
    rows: Vec<TransactionRow>,
}

impl RowConsumer for RowBuffer {
    fn consume(&mut self, row: TransactionRow) {
        self.rows.push(row);
    }
}

/// Loads the ledger at most once per process and hands out the cached
/// summary. Concurrent first calls share a single load, and a failed load
/// leaves the cell empty: a later call retries instead of a half-loaded
/// summary being served as the real thing.
pub(crate) struct AccountService {
    source: LedgerSource,
    summary: OnceCell<Arc<AccountSummary>>,
}

impl AccountService {
    pub fn new(source: LedgerSource) -> Self {
        Self {
            source,
            summary: OnceCell::new(),
        }
    }

    pub async fn account_summary(&self) -> Result<Arc<AccountSummary>, anyhow::Error> {
        let summary = self
            .summary
            .get_or_try_init(|| async { self.load().await.map(Arc::new) })
            .await?;
        Ok(Arc::clone(summary))
    }

    async fn load(&self) -> Result<AccountSummary, anyhow::Error> {
        let path = &self.source.path;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("cannot read ledger file {}", path.display()))?;
        let mut buffer = RowBuffer::default();
        read_rows(bytes.as_slice(), &self.source.format, &mut buffer)
            .with_context(|| format!("cannot replay ledger file {}", path.display()))?;
        Ok(replay(buffer.rows))
    }
}
