//! Pool registry: resolves pool names to volumes for the dosing engine.
//!
//! The CSV registry keeps one row per pool under a header row. Writers take
//! an exclusive lock on a `<file>.lock` sidecar and replace the sheet
//! atomically, so concurrent `add` calls never lose rows.

use crate::pool::{ADDRESS_COLUMN, NAME_COLUMN, REGISTRY_COLUMNS, VOLUME_COLUMN};
use crate::{Error, Pool, PoolInfo, Result};
use csv::StringRecord;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Source of pool definitions
pub trait PoolRegistry {
    /// Find a pool by exact name
    fn lookup(&self, name: &str) -> Result<Pool>;

    /// All pool names in registration order
    fn list_names(&self) -> Result<Vec<String>>;

    /// Register a new pool. Names are trimmed; duplicates are rejected.
    fn add(&mut self, name: &str, volume_m3: f64) -> Result<Pool>;

    /// Volume [m³] of a registered pool
    fn volume(&self, name: &str) -> Result<f64> {
        Ok(self.lookup(name)?.volume_m3)
    }
}

/// Validate a new pool's name and volume, returning the trimmed name
fn validate_new_pool(name: &str, volume_m3: f64) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("pool name must not be empty".into()));
    }
    if !volume_m3.is_finite() || volume_m3 <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "pool volume must be a positive number of m³, got {}",
            volume_m3
        )));
    }
    Ok(name.to_string())
}

/// A freshly added pool: address defaults to the pool name, the rest is blank
fn new_pool<'a>(name: &str, volume_m3: f64, columns: impl IntoIterator<Item = &'a str>) -> Pool {
    let mut info = PoolInfo::default();
    for column in columns {
        match column {
            NAME_COLUMN | VOLUME_COLUMN => {}
            ADDRESS_COLUMN => info.insert(column, Some(name.to_string())),
            other => info.insert(other, None),
        }
    }
    Pool {
        name: name.to_string(),
        volume_m3,
        info,
    }
}

// ============================================================================
// In-memory registry
// ============================================================================

/// Registry held entirely in memory
#[derive(Clone, Debug, Default)]
pub struct MemoryRegistry {
    pools: Vec<Pool>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pools(&self) -> &[Pool] {
        &self.pools
    }

    /// Insert or replace by name, keeping the first position
    fn upsert(&mut self, pool: Pool) {
        match self.pools.iter_mut().find(|p| p.name == pool.name) {
            Some(existing) => {
                tracing::warn!("Pool '{}' listed more than once, using the last row", pool.name);
                *existing = pool;
            }
            None => self.pools.push(pool),
        }
    }
}

impl PoolRegistry for MemoryRegistry {
    fn lookup(&self, name: &str) -> Result<Pool> {
        self.pools
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| Error::PoolNotFound(name.to_string()))
    }

    fn list_names(&self) -> Result<Vec<String>> {
        Ok(self.pools.iter().map(|p| p.name.clone()).collect())
    }

    fn add(&mut self, name: &str, volume_m3: f64) -> Result<Pool> {
        let name = validate_new_pool(name, volume_m3)?;
        if self.pools.iter().any(|p| p.name == name) {
            return Err(Error::DuplicatePool(name));
        }
        let pool = new_pool(&name, volume_m3, REGISTRY_COLUMNS.iter().copied());
        self.pools.push(pool.clone());
        Ok(pool)
    }
}

// ============================================================================
// CSV registry
// ============================================================================

/// Raw registry sheet, kept verbatim so unknown columns survive rewrites
struct Sheet {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl Sheet {
    fn empty() -> Self {
        Self {
            headers: StringRecord::from(REGISTRY_COLUMNS.to_vec()),
            rows: Vec::new(),
        }
    }

    fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::Registry(format!("missing '{}' column", name)))
    }

    fn to_registry(&self) -> Result<MemoryRegistry> {
        let name_idx = self.column(NAME_COLUMN)?;
        let volume_idx = self.column(VOLUME_COLUMN)?;

        let mut registry = MemoryRegistry::new();
        for (row_num, row) in self.rows.iter().enumerate() {
            let name = row.get(name_idx).unwrap_or("").trim();
            if name.is_empty() {
                continue;
            }

            let raw_volume = row.get(volume_idx).unwrap_or("").trim();
            let volume_m3 = match raw_volume.parse::<f64>() {
                Ok(v) if v.is_finite() && v > 0.0 => v,
                _ => {
                    tracing::warn!(
                        "Skipping pool '{}' at row {}: invalid volume '{}'",
                        name,
                        row_num + 2,
                        raw_volume
                    );
                    continue;
                }
            };

            let mut info = PoolInfo::default();
            for (idx, header) in self.headers.iter().enumerate() {
                if idx == name_idx || idx == volume_idx {
                    continue;
                }
                info.insert(header, row.get(idx).map(|v| v.trim().to_string()));
            }

            registry.upsert(Pool {
                name: name.to_string(),
                volume_m3,
                info,
            });
        }

        Ok(registry)
    }
}

/// Registry backed by a CSV file
pub struct CsvRegistry {
    path: PathBuf,
}

impl CsvRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut lock = self.path.clone().into_os_string();
        lock.push(".lock");
        PathBuf::from(lock)
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn open_lock(&self) -> Result<File> {
        std::fs::create_dir_all(self.dir())?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        Ok(file)
    }

    fn read_sheet(&self) -> Result<Sheet> {
        if !self.path.exists() {
            return Ok(Sheet::empty());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_path(&self.path)?;

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(Sheet::empty());
        }

        let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Sheet { headers, rows })
    }

    /// Load every pool under a shared lock
    pub fn load(&self) -> Result<MemoryRegistry> {
        if !self.path.exists() {
            tracing::info!("No registry found at {:?}, starting empty", self.path);
            return Ok(MemoryRegistry::new());
        }

        let lock = self.open_lock()?;
        lock.lock_shared()?;
        let sheet = self.read_sheet();
        lock.unlock()?;

        let registry = sheet?.to_registry()?;
        tracing::debug!(
            "Loaded {} pools from {:?}",
            registry.pools().len(),
            self.path
        );
        Ok(registry)
    }

    fn add_locked(&self, name: &str, volume_m3: f64) -> Result<Pool> {
        let sheet = self.read_sheet()?;
        if sheet.to_registry()?.lookup(name).is_ok() {
            return Err(Error::DuplicatePool(name.to_string()));
        }

        let pool = new_pool(name, volume_m3, sheet.headers.iter());
        let row: Vec<String> = sheet
            .headers
            .iter()
            .map(|header| match header {
                NAME_COLUMN => name.to_string(),
                VOLUME_COLUMN => volume_m3.to_string(),
                other => pool.info.get(other).unwrap_or("").to_string(),
            })
            .collect();

        // Write the whole sheet to a temp file, then rename over the original
        let temp = NamedTempFile::new_in(self.dir())?;
        {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(temp.as_file());
            writer.write_record(&sheet.headers)?;
            for record in &sheet.rows {
                writer.write_record(record)?;
            }
            writer.write_record(&row)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::info!("Added pool '{}' ({} m³) to {:?}", name, volume_m3, self.path);
        Ok(pool)
    }
}

impl PoolRegistry for CsvRegistry {
    fn lookup(&self, name: &str) -> Result<Pool> {
        self.load()?.lookup(name)
    }

    fn list_names(&self) -> Result<Vec<String>> {
        self.load()?.list_names()
    }

    fn add(&mut self, name: &str, volume_m3: f64) -> Result<Pool> {
        let name = validate_new_pool(name, volume_m3)?;

        let lock = self.open_lock()?;
        lock.lock_exclusive()?;
        let result = self.add_locked(&name, volume_m3);
        lock.unlock()?;

        result
    }
}
