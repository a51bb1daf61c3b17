use std::path::Path;

use rust_xlsxwriter::{Table, TableColumn, TableStyle, Workbook, XlsxError};
use tracing::info;

use ainews_core::{Error, Result};

/// Writes a record table into an `.xlsx` file with a named, banded-row
/// Excel table spanning header + data. Cells are written verbatim:
/// datetime columns must be pre-rendered to strings by the caller.
///
/// The destination directory must already exist and the path must end in
/// `.xlsx`; both are checked before anything is written.
pub fn write_table(
    path: &str,
    sheet_name: &str,
    table_name: &str,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<()> {
    if !path.ends_with(".xlsx") {
        return Err(Error::Validation(
            "The file name must end with '.xlsx'.".to_string(),
        ));
    }

    let parent = Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if !parent.is_dir() {
        return Err(Error::Validation(format!(
            "The directory {} does not exist.",
            parent.display()
        )));
    }

    if headers.is_empty() || rows.is_empty() {
        return Err(Error::Validation(
            "There are no rows to export.".to_string(),
        ));
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).map_err(export_err)?;

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(export_err)?;
    }
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32 + 1, col_idx as u16, cell)
                .map_err(export_err)?;
        }
    }

    let columns: Vec<TableColumn> = headers
        .iter()
        .map(|header| TableColumn::new().set_header(*header))
        .collect();
    let table = Table::new()
        .set_name(table_name)
        .set_style(TableStyle::Medium9)
        .set_banded_rows(true)
        .set_columns(&columns);

    // Range covers the header row plus every data row.
    worksheet
        .add_table(0, 0, rows.len() as u32, headers.len() as u16 - 1, &table)
        .map_err(export_err)?;

    workbook
        .save(path)
        .map_err(|e| Error::Export(format!("Failed to write {}: {}", path, e)))?;

    info!("Stored {} rows in {}", rows.len(), path);
    Ok(())
}

fn export_err(e: XlsxError) -> Error {
    Error::Export(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_rows() -> Vec<Vec<String>> {
        (1..=3)
            .map(|i| {
                vec![
                    format!("Title {}", i),
                    format!("https://example.com/{}", i),
                    String::new(),
                    "2020-10-09 14:19:00Z".to_string(),
                ]
            })
            .collect()
    }

    #[test]
    fn test_rejects_wrong_extension() {
        let result = write_table(
            "out.csv",
            "AI-News",
            "RecentAINews",
            &["a"],
            &[vec!["1".to_string()]],
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_rejects_missing_directory() {
        let result = write_table(
            "no/such/directory/out.xlsx",
            "AI-News",
            "RecentAINews",
            &["a"],
            &[vec!["1".to_string()]],
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_rejects_empty_table() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("out.xlsx");
        let result = write_table(
            path.to_str().unwrap(),
            "AI-News",
            "RecentAINews",
            &["a"],
            &[],
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_writes_header_and_rows() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("news.xlsx");

        // 3 data rows x 4 columns -> table range A1:D4.
        write_table(
            path.to_str().unwrap(),
            "AI-News",
            "RecentAINews",
            &["title", "news_link", "image_link", "publish_date"],
            &sample_rows(),
        )
        .unwrap();

        assert!(path.is_file());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
