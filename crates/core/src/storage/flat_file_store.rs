use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::budget::{Expense, Income};
use crate::constants::{
    DAILY_STOCKS_FILE, DIVIDENDS_FILE, EXPENSES_FILE, INCOME_FILE, LEDGER_FILE, STOCKS_FILE,
    STOCK_INFO_FILE,
};
use crate::errors::{DataQualityWarning, Result, StorageError};
use crate::ledger::{Ledger, LedgerDocument};
use crate::portfolio::dividends::DividendSchedule;
use crate::portfolio::holdings::{CompanyProfile, StockHolding};
use crate::portfolio::positions::DailyStockRecord;

/// Files that feed the pipeline, in fingerprint order.
const INPUT_FILES: [&str; 7] = [
    LEDGER_FILE,
    STOCKS_FILE,
    STOCK_INFO_FILE,
    DAILY_STOCKS_FILE,
    EXPENSES_FILE,
    INCOME_FILE,
    DIVIDENDS_FILE,
];

/// Typed access to the tables of the data directory.
///
/// The ledger and `daily_stocks.csv` are required; every other table reads
/// as empty when its file is absent. Writes go to a sibling temporary file
/// that is then renamed over the target, so readers never see a partial
/// table.
#[derive(Debug, Clone)]
pub struct FlatFileStore {
    root: PathBuf,
}

impl FlatFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    pub fn exists(&self, file: &str) -> bool {
        self.path(file).is_file()
    }

    /// Loads and validates `stock_dictionary.json`.
    pub fn read_ledger(&self) -> Result<(Ledger, Vec<DataQualityWarning>)> {
        let path = self.path(LEDGER_FILE);
        let file = open_required(&path)?;
        let document: LedgerDocument = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| StorageError::Json {
                path: path.clone(),
                source,
            })?;
        debug!("Read {} ledger entries from {}", document.len(), path.display());
        Ledger::from_document(document)
    }

    pub fn read_daily_stocks(&self) -> Result<Vec<DailyStockRecord>> {
        read_csv(&self.path(DAILY_STOCKS_FILE), true)
    }

    pub fn read_holdings(&self) -> Result<Vec<StockHolding>> {
        read_csv(&self.path(STOCKS_FILE), false)
    }

    pub fn read_profiles(&self) -> Result<Vec<CompanyProfile>> {
        read_csv(&self.path(STOCK_INFO_FILE), false)
    }

    pub fn read_expenses(&self) -> Result<Vec<Expense>> {
        read_csv(&self.path(EXPENSES_FILE), false)
    }

    pub fn read_income(&self) -> Result<Vec<Income>> {
        read_csv(&self.path(INCOME_FILE), false)
    }

    pub fn read_dividends(&self) -> Result<Vec<DividendSchedule>> {
        read_csv(&self.path(DIVIDENDS_FILE), false)
    }

    pub fn write_daily_stocks(&self, rows: &[DailyStockRecord]) -> Result<()> {
        self.write_table(DAILY_STOCKS_FILE, rows)
    }

    pub fn write_holdings(&self, rows: &[StockHolding]) -> Result<()> {
        self.write_table(STOCKS_FILE, rows)
    }

    pub fn write_profiles(&self, rows: &[CompanyProfile]) -> Result<()> {
        self.write_table(STOCK_INFO_FILE, rows)
    }

    /// SHA-256 over the name and contents of every input file, hex encoded.
    /// Absent files contribute a marker so that creating one changes the
    /// fingerprint.
    pub fn fingerprint(&self) -> Result<String> {
        let mut hasher = Sha256::new();
        for file in INPUT_FILES {
            let path = self.path(file);
            hasher.update(file.as_bytes());
            hasher.update(b"|");
            match fs::read(&path) {
                Ok(bytes) => {
                    hasher.update((bytes.len() as u64).to_le_bytes());
                    hasher.update(&bytes);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => hasher.update(b"<missing>"),
                Err(source) => return Err(StorageError::Io { path, source }.into()),
            }
            hasher.update(b"|");
        }
        Ok(hex::encode(hasher.finalize()))
    }

    fn write_table<T: Serialize>(&self, file: &str, rows: &[T]) -> Result<()> {
        let target = self.path(file);
        fs::create_dir_all(&self.root).map_err(|source| StorageError::Io {
            path: self.root.clone(),
            source,
        })?;

        let staging = self.path(&format!(".{}.tmp", file));
        let staged = write_csv(&staging, rows).and_then(|()| {
            fs::rename(&staging, &target).map_err(|source| StorageError::Io {
                path: target.clone(),
                source,
            })?;
            Ok(())
        });
        if let Err(e) = staged {
            if let Err(cleanup) = fs::remove_file(&staging) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(
                        "Could not remove staging file {}: {}",
                        staging.display(),
                        cleanup
                    );
                }
            }
            return Err(e);
        }

        info!("Wrote {} rows to {}", rows.len(), target.display());
        Ok(())
    }
}

fn open_required(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            StorageError::MissingFile(path.to_path_buf()).into()
        } else {
            StorageError::Io {
                path: path.to_path_buf(),
                source,
            }
            .into()
        }
    })
}

fn read_csv<T: DeserializeOwned>(path: &Path, required: bool) -> Result<Vec<T>> {
    if !required && !path.exists() {
        debug!("{} is absent; reading as empty", path.display());
        return Ok(Vec::new());
    }
    let file = open_required(path)?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: T = record.map_err(|source| StorageError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(row);
    }
    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let csv_error = |source| StorageError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut writer = csv::Writer::from_writer(BufWriter::new(file));
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let inner = writer.into_inner().map_err(|e| StorageError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(e.error().kind(), e.to_string()),
    })?;
    inner.get_ref().sync_all().map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
