use analysis_core::{CoreResult, PredictionError, ReferenceEntry};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Immutable symbol -> company attributes lookup, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    entries: HashMap<String, ReferenceEntry>,
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

impl ReferenceTable {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ReferenceEntry>,
    {
        let entries = entries
            .into_iter()
            .map(|e| (normalize_symbol(&e.symbol), e))
            .collect();
        Self { entries }
    }

    /// Load the company CSV (`Symbol,Shortname,Longname,Sector,Industry`, extra
    /// columns ignored). An unreadable or empty table is a load failure.
    pub fn load_csv<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            PredictionError::ReferenceDataLoadFailure(format!(
                "Failed to open {}: {}",
                path.display(),
                e
            ))
        })?;
        let table = Self::from_reader(file)?;
        tracing::info!(
            "Loaded reference data: {} symbols from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> CoreResult<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut entries = Vec::new();

        for (line, record) in csv_reader.deserialize::<ReferenceEntry>().enumerate() {
            let entry = record.map_err(|e| {
                PredictionError::ReferenceDataLoadFailure(format!("Row {}: {}", line + 1, e))
            })?;
            if entry.symbol.trim().is_empty() {
                continue;
            }
            entries.push(entry);
        }

        if entries.is_empty() {
            return Err(PredictionError::ReferenceDataLoadFailure(
                "Reference table has no entries".to_string(),
            ));
        }

        Ok(Self::from_entries(entries))
    }

    /// Look up a symbol. Absence is a hard `UnknownSymbol` error.
    pub fn get(&self, symbol: &str) -> CoreResult<&ReferenceEntry> {
        self.entries
            .get(&normalize_symbol(symbol))
            .ok_or_else(|| PredictionError::UnknownSymbol(symbol.to_string()))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.contains_key(&normalize_symbol(symbol))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
