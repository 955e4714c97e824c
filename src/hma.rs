//! Merging committed records into a Hex Maniac Advance stats table.
//!
//! The table is the text dump of `data.pokemon.stats`: one `+#Name#, ...` row
//! per species with 25 columns after the name. Rows for committed records are
//! rewritten and every other line is passed through.
#![allow(dead_code)]

use crate::record::{Record, Stat};
use std::collections::HashMap;

pub const PATCH_FILENAME: &str = "balance_patch.tfl";
pub const TABLE_HEADER: &str = "^data.pokemon.stats";

const NO_ABILITY: &str = "-------";
const ROW_PREFIX: &str = "+#";
const COLUMN_COUNT: usize = 25;

// The table orders speed ahead of the special stats.
const STAT_COLUMNS: [(usize, Stat); 6] = [
    (0, Stat::Hp),
    (1, Stat::Attack),
    (2, Stat::Defense),
    (3, Stat::Speed),
    (4, Stat::SpAtk),
    (5, Stat::SpDef),
];
const TYPE_1_COLUMN: usize = 6;
const TYPE_2_COLUMN: usize = 7;
const ABILITY_1_COLUMN: usize = 20;
const ABILITY_2_COLUMN: usize = 21;
const HIDDEN_ABILITY_COLUMN: usize = 23;

/// Ability name to table id, read from `abilities.names.txt`. `-------` is
/// id 0 and listed names count up from 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbilityIds(HashMap<String, u32>);

impl AbilityIds {
    pub fn parse(text: &str) -> Self {
        let mut ids = HashMap::from([(NO_ABILITY.to_string(), 0)]);
        let mut next = 0;
        for line in text.lines().map(str::trim) {
            if !line.starts_with(['+', '"']) {
                continue;
            }
            let stripped = line.replace('+', "");
            let name = stripped.trim().trim_matches('"');
            if name == NO_ABILITY {
                continue;
            }
            next += 1;
            ids.insert(name.to_string(), next);
        }
        Self(ids)
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

pub fn type_abbreviation(name: &str) -> &str {
    match name {
        "Electric" => "Electr",
        "Psychic" => "Psychc",
        "Fighting" => "Fight",
        other => other,
    }
}

/// Decodes the escaped table name, e.g. `Nidoran\sf` -> `Nidoran F`.
pub fn species_name(raw: &str) -> String {
    let name = raw
        .replace("\\sf", " F")
        .replace("\\sm", " M")
        .replace("\\s", " ");
    if name.contains("Farfetch'd") {
        "Farfetchd".to_string()
    } else {
        name
    }
}

/// Splits on commas that sit outside quotes and parentheses. Columns are trimmed.
pub fn split_columns(data: &str) -> Vec<String> {
    let mut columns = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut depth = 0i32;
    for ch in data.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => depth -= 1,
            _ => {}
        }
        if ch == ',' && !in_quotes && depth == 0 {
            columns.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }
    columns.push(current.trim().to_string());
    columns
}

/// Rewrites the rows of `table` that belong to `records` and prepends the
/// table anchor unless the dump already starts with a `@!` directive.
pub fn patch_table(table: &str, records: &[Record], abilities: &AbilityIds) -> String {
    let mut patched = 0;
    let lines: Vec<String> = table
        .lines()
        .enumerate()
        .map(|(idx, raw)| {
            let line = raw.trim();
            match patch_row(line, idx + 1, records, abilities) {
                Some(row) => {
                    patched += 1;
                    row
                }
                None => line.to_string(),
            }
        })
        .collect();
    tracing::info!(rows = patched, records = records.len(), "Patched stats table");

    let mut text = String::new();
    if !lines.first().is_some_and(|first| first.starts_with("@!")) {
        text.push_str(TABLE_HEADER);
        text.push('\n');
    }
    text.push_str(&lines.join("\n"));
    text
}

fn patch_row(
    line: &str,
    line_number: usize,
    records: &[Record],
    abilities: &AbilityIds,
) -> Option<String> {
    let raw_name = line.strip_prefix(ROW_PREFIX)?.split('#').next()?;
    let species = species_name(raw_name);
    let record = records.iter().find(|record| record.name == species)?;

    let Some((_, data)) = line.split_once(&format!("#{raw_name}#,")) else {
        tracing::warn!(line = line_number, name = %species, "Stats row has no column data, keeping original");
        return None;
    };
    let mut columns = split_columns(data);
    if columns.len() != COLUMN_COUNT {
        tracing::warn!(
            line = line_number,
            name = %species,
            columns = columns.len(),
            "Malformed stats row, expected {COLUMN_COUNT} columns, keeping original"
        );
        return None;
    }
    apply_record(&mut columns, record, abilities);
    tracing::debug!(line = line_number, name = %species, "Applied edit to stats row");
    Some(format!("{ROW_PREFIX}{raw_name}#, {}", columns.join(", ")))
}

fn apply_record(columns: &mut [String], record: &Record, abilities: &AbilityIds) {
    for (column, stat) in STAT_COLUMNS {
        columns[column] = record.stats.get(stat).to_string();
    }

    let type_1 = record
        .type_1
        .clone()
        .unwrap_or_else(|| columns[TYPE_1_COLUMN].clone());
    let type_2 = record.type_2.clone().unwrap_or_else(|| type_1.clone());
    columns[TYPE_1_COLUMN] = type_abbreviation(&type_1).to_string();
    columns[TYPE_2_COLUMN] = type_abbreviation(&type_2).to_string();

    if let Some(id) = record.ability_1.as_deref().and_then(|name| abilities.get(name)) {
        columns[ABILITY_1_COLUMN] = id.to_string();
    }
    if let Some(id) = abilities.get(record.ability_2.as_deref().unwrap_or(NO_ABILITY)) {
        columns[ABILITY_2_COLUMN] = id.to_string();
    }
    let hidden = record.hidden_ability.as_deref().unwrap_or(NO_ABILITY);
    match abilities.get(hidden) {
        Some(id) => columns[HIDDEN_ABILITY_COLUMN] = id.to_string(),
        None => tracing::warn!(
            name = %record.name,
            ability = hidden,
            "Hidden ability has no table id, keeping original"
        ),
    }
}
