//! Edit form state and the rules that turn it into a record.
//!
//! The same fallback rules back the live total preview and the commit, so a
//! preview always shows what a commit would store.
#![allow(dead_code)]

use crate::record::{Record, Stat, StatBlock, TextField};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EditField {
    Text(TextField),
    Stat(Stat),
}

impl EditField {
    pub fn all() -> impl Iterator<Item = EditField> {
        TextField::ALL
            .into_iter()
            .map(EditField::Text)
            .chain(Stat::ALL.into_iter().map(EditField::Stat))
    }

    pub fn label(self) -> &'static str {
        match self {
            EditField::Text(field) => field.label(),
            EditField::Stat(stat) => stat.label(),
        }
    }

    /// Lowercase label with spaces turned into dashes, e.g. `sp-atk`.
    pub fn slug(self) -> String {
        slugify(self.label())
    }

    /// Accepts either the display label (any case) or its slug.
    pub fn parse(name: &str) -> Option<EditField> {
        let wanted = slugify(name.trim());
        EditField::all().find(|field| field.slug() == wanted)
    }
}

fn slugify(label: &str) -> String {
    label.to_lowercase().replace(' ', "-")
}

/// Current contents of every edit control. An empty slot means "keep original".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormState {
    text: [String; 5],
    stats: [String; 6],
}

impl FormState {
    pub fn text(&self, field: TextField) -> &str {
        &self.text[field.index()]
    }

    pub fn text_mut(&mut self, field: TextField) -> &mut String {
        &mut self.text[field.index()]
    }

    pub fn stat(&self, stat: Stat) -> &str {
        &self.stats[stat.index()]
    }

    pub fn stat_mut(&mut self, stat: Stat) -> &mut String {
        &mut self.stats[stat.index()]
    }

    pub fn set(&mut self, field: EditField, value: impl Into<String>) {
        let slot = match field {
            EditField::Text(field) => self.text_mut(field),
            EditField::Stat(stat) => self.stat_mut(stat),
        };
        *slot = value.into();
    }

    pub fn clear(&mut self) {
        *self = FormState::default();
    }
}

pub fn resolve_text(original: Option<&str>, edited: &str) -> Option<String> {
    let edited = edited.trim();
    if edited.is_empty() {
        original.map(str::to_string)
    } else {
        Some(edited.to_string())
    }
}

/// A stat edit only applies when it reads as an integer above zero. Blank,
/// unparseable, zero and negative input all keep the original value.
pub fn resolve_stat(original: u32, edited: &str) -> u32 {
    parse_leading_int(edited)
        .filter(|value| *value > 0)
        .and_then(|value| u32::try_from(value).ok())
        .unwrap_or(original)
}

fn parse_leading_int(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|value| value * sign)
}

pub fn resolve_stats(original: &Record, form: &FormState) -> StatBlock {
    let mut stats = original.stats;
    for stat in Stat::ALL {
        stats.set(stat, resolve_stat(original.stats.get(stat), form.stat(stat)));
    }
    stats
}

pub fn preview_aggregate(original: &Record, form: &FormState) -> u32 {
    resolve_stats(original, form).total()
}

/// Builds the record a commit would store. Identity is copied from `original`.
pub fn resolve_record(original: &Record, form: &FormState) -> Record {
    let mut record = Record {
        id: original.id,
        name: original.name.clone(),
        type_1: None,
        type_2: None,
        ability_1: None,
        ability_2: None,
        hidden_ability: None,
        stats: resolve_stats(original, form),
    };
    for field in TextField::ALL {
        record.set_text(field, resolve_text(original.text(field), form.text(field)));
    }
    record
}
