use crate::error::{EditorError, Result};
use crate::hma::{self, AbilityIds};
use crate::record::{Record, Stat, TextField};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const EXPORT_JSON_FILENAME: &str = "custom_pokemon.json";
pub const EXPORT_CSV_FILENAME: &str = "custom_pokemon.csv";

const CSV_TEXT_COLUMNS: [TextField; 5] = [
    TextField::Type1,
    TextField::Type2,
    TextField::Ability1,
    TextField::Ability2,
    TextField::HiddenAbility,
];

pub fn load_dataset(path: &Path) -> Result<Vec<Record>> {
    let data = fs::read_to_string(path).map_err(|source| EditorError::DatasetRead {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<Record> =
        serde_json::from_str(&data).map_err(|source| EditorError::DatasetParse {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), records = records.len(), "Loaded dataset");
    Ok(records)
}

/// Earlier exports are either a plain array or an object keyed by name.
#[derive(Deserialize)]
#[serde(untagged)]
enum OverridesFile {
    List(Vec<Record>),
    ByName(BTreeMap<String, Record>),
}

pub fn load_overrides(path: &Path) -> Result<Vec<Record>> {
    let data = fs::read_to_string(path).map_err(|source| EditorError::OverridesRead {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: OverridesFile =
        serde_json::from_str(&data).map_err(|source| EditorError::OverridesParse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(match parsed {
        OverridesFile::List(records) => records,
        OverridesFile::ByName(records) => records.into_values().collect(),
    })
}

pub fn export_json(records: &[Record], dir: &Path) -> Result<PathBuf> {
    write_replacing(&dir.join(EXPORT_JSON_FILENAME), |writer| {
        serde_json::to_writer_pretty(&mut *writer, records)?;
        writeln!(writer)
    })
}

pub fn export_csv(records: &[Record], dir: &Path) -> Result<PathBuf> {
    write_replacing(&dir.join(EXPORT_CSV_FILENAME), |writer| {
        write_records_csv(writer, records)
    })
}

/// Merges `records` into the stats table dump at `stats_path` and writes the
/// result as a `.tfl` script. Ability names resolve through `abilities_path`.
pub fn export_hma_patch(
    records: &[Record],
    stats_path: &Path,
    abilities_path: &Path,
    dir: &Path,
) -> Result<PathBuf> {
    let abilities = AbilityIds::parse(&read_hma_source(abilities_path)?);
    tracing::info!(path = %abilities_path.display(), abilities = abilities.len(), "Mapped ability ids");
    let table = read_hma_source(stats_path)?;
    let patched = hma::patch_table(&table, records, &abilities);
    write_replacing(&dir.join(hma::PATCH_FILENAME), |writer| {
        writer.write_all(patched.as_bytes())
    })
}

fn read_hma_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| EditorError::HmaSourceRead {
        path: path.to_path_buf(),
        source,
    })
}

fn write_records_csv(writer: &mut impl Write, records: &[Record]) -> io::Result<()> {
    let mut header = vec!["#", "Name"];
    header.extend(CSV_TEXT_COLUMNS.iter().map(|field| field.label()));
    header.extend(Stat::ALL.iter().map(|stat| stat.label()));
    header.push("BST");
    writeln!(writer, "{}", header.join(","))?;

    for record in records {
        let mut row = vec![record.id.to_string(), csv_field(&record.name)];
        row.extend(
            CSV_TEXT_COLUMNS
                .iter()
                .map(|field| csv_field(record.text(*field).unwrap_or_default())),
        );
        row.extend(Stat::ALL.iter().map(|stat| record.stats.get(*stat).to_string()));
        row.push(record.aggregate().to_string());
        writeln!(writer, "{}", row.join(","))?;
    }
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Writes through a temporary sibling and renames it over `path`, so a failed
/// export never leaves a truncated file behind.
fn write_replacing<F>(path: &Path, write: F) -> Result<PathBuf>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let tmp_path = tmp_sibling(path);
    let outcome = create_parent(path)
        .and_then(|()| File::create(&tmp_path))
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            write(&mut writer)?;
            writer.flush()?;
            fs::rename(&tmp_path, path)
        });
    if let Err(source) = outcome {
        let _ = fs::remove_file(&tmp_path);
        return Err(EditorError::Export {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(path.to_path_buf())
}

/// `custom_pokemon.json` -> `custom_pokemon.json.tmp`, distinct per export.
fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn create_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample_record;

    const DATASET: &str = r##"[
        {"#": 1, "Name": "Bulbasaur", "Type 1": "Grass", "Type 2": "Poison",
         "Ability 1": "Overgrow", "Ability 2": null, "Hidden Ability": "Chlorophyll",
         "HP": 45, "Attack": 49, "Defense": 49, "Sp Atk": 65, "Sp Def": 65, "Speed": 45, "BST": 318},
        {"#": 132, "Name": "Ditto", "Type 1": "Normal", "Type 2": null,
         "Ability 1": "Limber", "Ability 2": null, "Hidden Ability": "Imposter",
         "HP": 48, "Attack": 48, "Defense": 48, "Sp Atk": 48, "Sp Def": 48}
    ]"##;

    #[test]
    fn load_dataset_derives_totals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pokemon_cache.json");
        fs::write(&path, DATASET).unwrap();

        let records = load_dataset(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].aggregate(), 318);
        assert_eq!(records[1].aggregate(), 48 * 5);
    }

    #[test]
    fn bundled_dataset_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(crate::config::DEFAULT_DATASET_PATH);
        let records = load_dataset(&path).unwrap();
        assert!(!records.is_empty());
        let mewtwo = records.iter().find(|record| record.name == "Mewtwo").unwrap();
        assert_eq!(mewtwo.aggregate(), 680);
    }

    #[test]
    fn missing_dataset_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dataset(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, EditorError::DatasetRead { .. }));
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn malformed_dataset_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"not\": \"a list\"").unwrap();
        assert!(matches!(
            load_dataset(&path),
            Err(EditorError::DatasetParse { .. })
        ));
    }

    #[test]
    fn json_export_uses_two_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![sample_record("Bulbasaur", [45, 49, 49, 65, 65, 45])];
        let path = export_json(&records, dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), EXPORT_JSON_FILENAME);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n  {\n    \"#\": 1,"));
        let reloaded: Vec<Record> = serde_json::from_str(&text).unwrap();
        assert_eq!(reloaded, records);
        assert!(!dir.path().join("custom_pokemon.json.tmp").exists());
    }

    #[test]
    fn csv_export_has_header_and_rows_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut ditto = sample_record("Ditto, Shiny", [48, 48, 48, 48, 48, 48]);
        ditto.id = 132;
        ditto.type_2 = None;
        let records = vec![sample_record("Bulbasaur", [45, 49, 49, 65, 65, 45]), ditto];
        let path = export_csv(&records, dir.path()).unwrap();

        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "#,Name,Type 1,Type 2,Ability 1,Ability 2,Hidden Ability,HP,Attack,Defense,Sp Atk,Sp Def,Speed,BST"
        );
        assert_eq!(
            lines[1],
            "1,Bulbasaur,Grass,Poison,Overgrow,,Chlorophyll,45,49,49,65,65,45,318"
        );
        assert_eq!(
            lines[2],
            "132,\"Ditto, Shiny\",Grass,,Overgrow,,Chlorophyll,48,48,48,48,48,48,288"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn export_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports").join("gen1");
        let records = vec![sample_record("Bulbasaur", [45, 49, 49, 65, 65, 45])];

        let json = export_json(&records, &target).unwrap();
        let csv = export_csv(&records, &target).unwrap();
        assert_eq!(json, target.join(EXPORT_JSON_FILENAME));
        assert!(json.exists());
        assert!(csv.exists());
    }

    #[test]
    fn unrelated_tmp_file_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let unrelated = dir.path().join("custom_pokemon.tmp");
        fs::write(&unrelated, "notes").unwrap();
        let records = vec![sample_record("Bulbasaur", [45, 49, 49, 65, 65, 45])];

        export_json(&records, dir.path()).unwrap();
        export_csv(&records, dir.path()).unwrap();
        assert_eq!(fs::read_to_string(&unrelated).unwrap(), "notes");
        assert!(!dir.path().join("custom_pokemon.csv.tmp").exists());
    }

    #[test]
    fn csv_fields_with_line_breaks_are_quoted() {
        assert_eq!(csv_field("Odd\rName"), "\"Odd\rName\"");
        assert_eq!(csv_field("Two\nLines"), "\"Two\nLines\"");
        assert_eq!(csv_field("Say \"hi\""), "\"Say \"\"hi\"\"\"");
        assert_eq!(csv_field("Plain"), "Plain");
    }

    #[test]
    fn hma_patch_merges_edits_into_stats_table() {
        let dir = tempfile::tempdir().unwrap();
        let stats_path = dir.path().join("pokemon.stats.txt");
        let abilities_path = dir.path().join("abilities.names.txt");
        fs::write(
            &stats_path,
            "+#Bulbasaur#, 45, 49, 49, 45, 65, 65, Grass, Poison, 45, 64, 1, 0, 0, 0, 0, 0, 0, 31, 20, 70, 3, 0, 0, 4, 0\n\
             +#Pikachu#, 35, 55, 40, 90, 50, 50, Electr, Electr, 190, 112, 0, 0, 0, 0, 0, 0, 0, 127, 10, 70, 9, 0, 0, 31, 0\n",
        )
        .unwrap();
        fs::write(&abilities_path, "+\"Stench\"\n+\"Overgrow\"\n+\"Chlorophyll\"\n").unwrap();

        let mut bulbasaur = sample_record("Bulbasaur", [60, 62, 63, 80, 80, 60]);
        bulbasaur.type_2 = None;
        let path = export_hma_patch(&[bulbasaur], &stats_path, &abilities_path, dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), hma::PATCH_FILENAME);

        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], hma::TABLE_HEADER);
        assert_eq!(
            lines[1],
            "+#Bulbasaur#, 60, 62, 63, 60, 80, 80, Grass, Grass, 45, 64, 1, 0, 0, 0, 0, 0, 0, 31, 20, 70, 2, 0, 0, 3, 0"
        );
        assert_eq!(
            lines[2],
            "+#Pikachu#, 35, 55, 40, 90, 50, 50, Electr, Electr, 190, 112, 0, 0, 0, 0, 0, 0, 0, 127, 10, 70, 9, 0, 0, 31, 0"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn hma_patch_needs_both_source_files() {
        let dir = tempfile::tempdir().unwrap();
        let stats_path = dir.path().join("pokemon.stats.txt");
        fs::write(&stats_path, "").unwrap();
        let records = vec![sample_record("Bulbasaur", [45, 49, 49, 65, 65, 45])];

        let err = export_hma_patch(&records, &stats_path, &dir.path().join("abilities.names.txt"), dir.path())
            .unwrap_err();
        assert!(matches!(err, EditorError::HmaSourceRead { ref path, .. } if path.ends_with("abilities.names.txt")));
        assert!(!dir.path().join(hma::PATCH_FILENAME).exists());
    }

    #[test]
    fn overrides_load_from_list_or_map() {
        let dir = tempfile::tempdir().unwrap();
        let list_path = dir.path().join("list.json");
        fs::write(&list_path, DATASET).unwrap();
        assert_eq!(load_overrides(&list_path).unwrap().len(), 2);

        let map_path = dir.path().join("map.json");
        fs::write(
            &map_path,
            r##"{"Ditto": {"#": 132, "Name": "Ditto", "HP": 60, "Attack": 48,
                 "Defense": 48, "Sp Atk": 48, "Sp Def": 48, "Speed": 48, "BST": 1}}"##,
        )
        .unwrap();
        let records = load_overrides(&map_path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].aggregate(), 300);
    }

    #[test]
    fn malformed_overrides_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "42").unwrap();
        assert!(matches!(
            load_overrides(&path),
            Err(EditorError::OverridesParse { .. })
        ));
    }
}
