//! DMR id to callsign resolution, for log output only

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use ghost_core::DmrId;

pub trait IdLookup: Send + Sync {
    /// Display name for `id`. Unknown ids render as the decimal id.
    fn resolve(&self, id: DmrId) -> String;
}

/// Lookup that knows no names
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLookup;

impl IdLookup for NoLookup {
    fn resolve(&self, id: DmrId) -> String {
        id.to_string()
    }
}

/// Table read from a text file with one `<id> <callsign>` pair per line.
/// Blank lines and lines starting with `#` are skipped.
#[derive(Debug, Default, Clone)]
pub struct FileIdLookup {
    names: HashMap<DmrId, String>,
}

impl FileIdLookup {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let lookup = Self::parse(&contents);
        tracing::info!("loaded {} ids from {}", lookup.len(), path.as_ref().display());
        Ok(lookup)
    }

    pub fn parse(contents: &str) -> Self {
        let mut names = HashMap::new();
        for (lineno, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            match (fields.next().map(str::parse::<DmrId>), fields.next()) {
                (Some(Ok(id)), Some(name)) => {
                    names.insert(id, name.to_string());
                }
                _ => tracing::warn!("id lookup: skipping malformed line {}: {:?}", lineno + 1, line),
            }
        }
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl IdLookup for FileIdLookup {
    fn resolve(&self, id: DmrId) -> String {
        match self.names.get(&id) {
            Some(name) => name.clone(),
            None => id.to_string(),
        }
    }
}
