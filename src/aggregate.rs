// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Merging per-class tables into one combined table.
//!
//! The combined table gets a canonical header derived from the body-part
//! schema, class-qualified filenames, and two trailing label columns.

use std::path::Path;

use crate::bodypart::BodyPart;
use crate::error::{PreprocessError, Result};
use crate::warn;

/// Number of fields in a per-class table row: filename + (x, y, score) per part.
pub const PER_CLASS_FIELDS: usize = 1 + 3 * BodyPart::COUNT;

/// Canonical combined-table header.
///
/// `filename`, then `<PART>_x,<PART>_y,<PART>_score` for every body part
/// in schema order, then `class_no,class_name`.
#[must_use]
pub fn combined_header() -> Vec<String> {
    let mut header = Vec::with_capacity(PER_CLASS_FIELDS + 2);
    header.push("filename".to_string());
    for part in BodyPart::ALL {
        let name = part.as_str();
        header.push(format!("{name}_x"));
        header.push(format!("{name}_y"));
        header.push(format!("{name}_score"));
    }
    header.push("class_no".to_string());
    header.push("class_name".to_string());
    header
}

/// Merge all per-class tables into one combined CSV.
///
/// Classes are visited in the order of `class_names`; a class's ordinal is
/// its position in that list. A class whose table is missing or empty is
/// skipped with a warning but keeps its ordinal reserved, so the label
/// numbering always matches the directory structure regardless of how many
/// rows each class contributed.
///
/// Returns the number of combined rows written.
///
/// # Errors
///
/// Returns an error if any row's field count disagrees with the body-part
/// schema (unrecoverable inconsistency) or on CSV read/write failures.
pub fn combine_tables<P: AsRef<Path>, Q: AsRef<Path>>(
    csvs_dir: P,
    class_names: &[String],
    out_path: Q,
) -> Result<usize> {
    let csvs_dir = csvs_dir.as_ref();
    let out_path = out_path.as_ref();

    let mut writer = csv::Writer::from_path(out_path)?;
    writer.write_record(combined_header())?;

    let mut total_rows = 0usize;

    for (class_index, class_name) in class_names.iter().enumerate() {
        let csv_path = csvs_dir.join(format!("{class_name}.csv"));
        if !csv_path.exists() {
            warn!("CSV not found for {class_name}");
            continue;
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&csv_path)?;

        let mut class_rows = 0usize;
        for record in reader.records() {
            let record = record?;

            if record.len() != PER_CLASS_FIELDS {
                return Err(PreprocessError::AggregationError(format!(
                    "{}: expected {PER_CLASS_FIELDS} columns, found {} (row {})",
                    csv_path.display(),
                    record.len(),
                    class_rows + 1
                )));
            }

            let mut row = Vec::with_capacity(PER_CLASS_FIELDS + 2);
            row.push(format!("{class_name}/{}", &record[0]));
            row.extend(record.iter().skip(1).map(str::to_string));
            row.push(class_index.to_string());
            row.push(class_name.clone());
            writer.write_record(&row)?;
            class_rows += 1;
        }

        if class_rows == 0 {
            warn!("No data in {class_name}");
        }
        total_rows += class_rows;
    }

    writer.flush().map_err(|e| {
        PreprocessError::CsvError(format!("Failed to flush {}: {e}", out_path.display()))
    })?;

    Ok(total_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_per_class_csv(dir: &Path, class: &str, rows: usize) {
        let mut lines = String::new();
        for i in 0..rows {
            let mut fields = vec![format!("img{i}.jpg")];
            fields.extend((0..3 * BodyPart::COUNT).map(|v| format!("{}.5", v)));
            lines.push_str(&fields.join(","));
            lines.push('\n');
        }
        fs::write(dir.join(format!("{class}.csv")), lines).unwrap();
    }

    #[test]
    fn test_header_layout() {
        let header = combined_header();
        assert_eq!(header.len(), 1 + 3 * BodyPart::COUNT + 2);
        assert_eq!(header[0], "filename");
        assert_eq!(&header[1..4], ["NOSE_x", "NOSE_y", "NOSE_score"]);
        assert_eq!(header[header.len() - 2], "class_no");
        assert_eq!(header[header.len() - 1], "class_name");
    }

    #[test]
    fn test_combine_rows_and_ordinals() {
        let dir = tempfile::tempdir().unwrap();
        write_per_class_csv(dir.path(), "chair", 2);
        write_per_class_csv(dir.path(), "tree", 3);

        let out = dir.path().join("combined.csv");
        let classes = vec!["chair".to_string(), "tree".to_string()];
        let rows = combine_tables(dir.path(), &classes, &out).unwrap();
        assert_eq!(rows, 5);

        let mut reader = csv::Reader::from_path(&out).unwrap();
        let records: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 5);

        for record in &records {
            assert_eq!(record.len(), 1 + 3 * BodyPart::COUNT + 2);
        }
        assert_eq!(&records[0][0], "chair/img0.jpg");
        assert_eq!(&records[0][record_class_no_index()], "0");
        assert_eq!(&records[4][0], "tree/img2.jpg");
        assert_eq!(&records[4][record_class_no_index()], "1");
        assert_eq!(&records[4][record_class_no_index() + 1], "tree");
    }

    fn record_class_no_index() -> usize {
        1 + 3 * BodyPart::COUNT
    }

    #[test]
    fn test_missing_class_reserves_ordinal() {
        let dir = tempfile::tempdir().unwrap();
        write_per_class_csv(dir.path(), "chair", 1);
        // "dog" has no CSV at all.
        write_per_class_csv(dir.path(), "tree", 1);

        let out = dir.path().join("combined.csv");
        let classes = vec![
            "chair".to_string(),
            "dog".to_string(),
            "tree".to_string(),
        ];
        let rows = combine_tables(dir.path(), &classes, &out).unwrap();
        assert_eq!(rows, 2);

        let mut reader = csv::Reader::from_path(&out).unwrap();
        let records: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        // "tree" keeps ordinal 2 even though "dog" contributed nothing.
        assert_eq!(&records[1][record_class_no_index()], "2");
    }

    #[test]
    fn test_column_mismatch_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.csv"), "img.jpg,1.0,2.0\n").unwrap();

        let out = dir.path().join("combined.csv");
        let classes = vec!["bad".to_string()];
        let result = combine_tables(dir.path(), &classes, &out);
        assert!(matches!(
            result,
            Err(PreprocessError::AggregationError(_))
        ));
    }

    #[test]
    fn test_empty_table_contributes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("empty.csv"), "").unwrap();
        write_per_class_csv(dir.path(), "tree", 1);

        let out = dir.path().join("combined.csv");
        let classes = vec!["empty".to_string(), "tree".to_string()];
        let rows = combine_tables(dir.path(), &classes, &out).unwrap();
        assert_eq!(rows, 1);
    }
}
