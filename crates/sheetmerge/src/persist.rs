//! Writing the combined workbook out

use std::io::{Seek, Write};
use std::path::Path;

use sheetmerge_core::Workbook;
use sheetmerge_xlsx::XlsxWriter;

use crate::error::PersistError;

/// Serialize `workbook` to XLSX bytes
///
/// Refuses a workbook with no sheets: that means no input contributed
/// anything, and the container cannot represent an empty workbook anyway.
pub fn persist(workbook: &Workbook) -> Result<Vec<u8>, PersistError> {
    ensure_not_empty(workbook)?;
    Ok(XlsxWriter::to_bytes(workbook)?)
}

/// Serialize `workbook` into `writer`
pub fn persist_to<W: Write + Seek>(workbook: &Workbook, writer: W) -> Result<(), PersistError> {
    ensure_not_empty(workbook)?;
    XlsxWriter::write(workbook, writer)?;
    Ok(())
}

/// Serialize `workbook` to a file at `path`
///
/// Nothing is created on disk when the workbook is empty.
pub fn persist_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> Result<(), PersistError> {
    ensure_not_empty(workbook)?;
    XlsxWriter::write_file(workbook, path)?;
    Ok(())
}

fn ensure_not_empty(workbook: &Workbook) -> Result<(), PersistError> {
    if workbook.is_empty() {
        tracing::warn!("refusing to write a workbook without sheets");
        return Err(PersistError::EmptyResult);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetmerge_xlsx::XlsxReader;

    #[test]
    fn test_empty_workbook_is_refused() {
        let wb = Workbook::empty();
        assert!(matches!(persist(&wb), Err(PersistError::EmptyResult)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("combined.xlsx");
        assert!(matches!(
            persist_file(&wb, &path),
            Err(PersistError::EmptyResult)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_persist_roundtrip() {
        let mut wb = Workbook::new();
        wb.worksheet_mut(0)
            .unwrap()
            .set_cell_value("A1", "kept")
            .unwrap();

        let bytes = persist(&wb).unwrap();
        let back = XlsxReader::from_bytes(&bytes).unwrap();
        assert_eq!(back.sheet_count(), 1);
        assert_eq!(
            back.worksheet(0).unwrap().get_value("A1").unwrap().as_string(),
            Some("kept")
        );
    }

    #[test]
    fn test_persist_to_writer_and_file() {
        let mut wb = Workbook::new();
        wb.worksheet_mut(0)
            .unwrap()
            .set_cell_value("B2", 7.0)
            .unwrap();

        let mut buf = Vec::new();
        persist_to(&wb, std::io::Cursor::new(&mut buf)).unwrap();
        assert_eq!(buf, persist(&wb).unwrap());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("combined.xlsx");
        persist_file(&wb, &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), buf);
    }

    #[test]
    fn test_empty_result_message() {
        assert_eq!(
            PersistError::EmptyResult.to_string(),
            "no matching sheets found across all inputs"
        );
    }
}
