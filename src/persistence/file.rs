use super::PersistenceResult;
use crate::persistence::Workbook;
use std::fs::File;
use std::path::Path;

pub fn save_workbook_to_json<P: AsRef<Path>>(workbook: &Workbook, path: P) -> PersistenceResult<()> {
    workbook.validate()?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, workbook)?;
    Ok(())
}

pub fn load_workbook_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Workbook> {
    let file = File::open(path)?;
    let workbook: Workbook = serde_json::from_reader(file)?;
    workbook.validate()?;
    Ok(workbook)
}
