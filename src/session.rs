#![allow(dead_code)]

use crate::dataset;
use crate::error::{EditorError, Result};
use crate::form::{self, FormState};
use crate::record::{Record, TextField, TextKind};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Distinct ability and type names seen in the base dataset, sorted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Vocabulary {
    pub abilities: Vec<String>,
    pub types: Vec<String>,
}

impl Vocabulary {
    pub fn from_records(records: &[Record]) -> Self {
        let mut abilities = BTreeSet::new();
        let mut types = BTreeSet::new();
        for record in records {
            for field in TextField::ALL {
                let Some(value) = record.text(field).filter(|value| !value.is_empty()) else {
                    continue;
                };
                match field.kind() {
                    TextKind::Ability => abilities.insert(value),
                    TextKind::Type => types.insert(value),
                };
            }
        }
        Self {
            abilities: abilities.into_iter().map(str::to_string).collect(),
            types: types.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn options(&self, kind: TextKind) -> &[String] {
        match kind {
            TextKind::Ability => &self.abilities,
            TextKind::Type => &self.types,
        }
    }
}

/// Base dataset plus the committed overrides for one editing session.
pub struct EditorSession {
    base: Vec<Record>,
    vocabulary: Vocabulary,
    overrides: Vec<Record>,
}

impl EditorSession {
    pub fn new(base: Vec<Record>) -> Self {
        let vocabulary = Vocabulary::from_records(&base);
        tracing::info!(
            records = base.len(),
            abilities = vocabulary.abilities.len(),
            types = vocabulary.types.len(),
            "Dataset ready"
        );
        Self {
            base,
            vocabulary,
            overrides: Vec::new(),
        }
    }

    pub fn base(&self) -> &[Record] {
        &self.base
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Committed records in first-commit order.
    pub fn overrides(&self) -> &[Record] {
        &self.overrides
    }

    pub fn base_record(&self, name: &str) -> Option<&Record> {
        self.base.iter().find(|record| record.name == name)
    }

    pub fn override_for(&self, name: &str) -> Option<&Record> {
        self.overrides.iter().find(|record| record.name == name)
    }

    /// The override for `name` if one was committed, else the base record.
    pub fn effective(&self, name: &str) -> Option<&Record> {
        self.override_for(name).or_else(|| self.base_record(name))
    }

    pub fn selectable_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self
            .overrides
            .iter()
            .chain(self.base.iter())
            .map(|record| record.name.as_str())
            .collect();
        names.into_iter().map(str::to_string).collect()
    }

    /// Keeps `current` while it is still selectable, otherwise falls back to
    /// the first name in sorted order.
    pub fn reconcile_selection(&self, current: Option<&str>) -> Option<String> {
        let names = self.selectable_names();
        match current {
            Some(name) if names.iter().any(|candidate| candidate == name) => {
                Some(name.to_string())
            }
            _ => names.into_iter().next(),
        }
    }

    pub fn preview(&self, name: &str, form: &FormState) -> Result<u32> {
        let original = self.require(name)?;
        Ok(form::preview_aggregate(original, form))
    }

    pub fn commit(&mut self, name: &str, form: &FormState) -> Result<&Record> {
        let record = form::resolve_record(self.require(name)?, form);
        tracing::info!(name = %record.name, bst = record.aggregate(), "Committed edit");
        Ok(self.store_override(record))
    }

    /// Stores imported records as overrides. Names missing from the base
    /// dataset are skipped. Returns how many were stored.
    pub fn import_overrides(&mut self, records: Vec<Record>) -> usize {
        let mut imported = 0;
        for mut record in records {
            let Some(base) = self.base_record(&record.name) else {
                tracing::warn!(name = %record.name, "Skipping override for unknown record");
                continue;
            };
            if record.id != base.id {
                tracing::debug!(
                    name = %record.name,
                    imported_id = record.id,
                    base_id = base.id,
                    "Keeping base id for imported override"
                );
                record.id = base.id;
            }
            self.store_override(record);
            imported += 1;
        }
        tracing::info!(imported, "Imported overrides");
        imported
    }

    pub fn export_json(&self, dir: &Path) -> Result<PathBuf> {
        self.ensure_exportable()?;
        let path = dataset::export_json(&self.overrides, dir)?;
        tracing::info!(records = self.overrides.len(), path = %path.display(), "Exported JSON");
        Ok(path)
    }

    pub fn export_csv(&self, dir: &Path) -> Result<PathBuf> {
        self.ensure_exportable()?;
        let path = dataset::export_csv(&self.overrides, dir)?;
        tracing::info!(records = self.overrides.len(), path = %path.display(), "Exported CSV");
        Ok(path)
    }

    /// Writes the overrides into a copy of the HMA stats table at `stats_path`.
    pub fn export_hma_patch(
        &self,
        stats_path: &Path,
        abilities_path: &Path,
        dir: &Path,
    ) -> Result<PathBuf> {
        self.ensure_exportable()?;
        let path = dataset::export_hma_patch(&self.overrides, stats_path, abilities_path, dir)?;
        tracing::info!(records = self.overrides.len(), path = %path.display(), "Exported HMA patch");
        Ok(path)
    }

    fn ensure_exportable(&self) -> Result<()> {
        if self.overrides.is_empty() {
            tracing::warn!("Export requested with no custom records");
            return Err(EditorError::NothingToExport);
        }
        Ok(())
    }

    fn require(&self, name: &str) -> Result<&Record> {
        self.effective(name)
            .ok_or_else(|| EditorError::UnknownRecord(name.to_string()))
    }

    fn store_override(&mut self, record: Record) -> &Record {
        let idx = match self
            .overrides
            .iter()
            .position(|existing| existing.name == record.name)
        {
            Some(idx) => {
                self.overrides[idx] = record;
                idx
            }
            None => {
                self.overrides.push(record);
                self.overrides.len() - 1
            }
        };
        &self.overrides[idx]
    }
}
