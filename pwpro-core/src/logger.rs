use crate::error::PwProError;
use chrono::Utc;
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::{fs::OpenOptions, io, path::Path};

/// One logged calculation, as stored in the CSV history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub kind: String,
    pub inputs_json: String,
    pub outputs_json: String,
}

/// Appends calculation history to a CSV file, one row per computation.
pub struct CalculationLogger {
    writer: Writer<std::fs::File>,
}

impl CalculationLogger {
    /// Opens `path` for appending, writing the header only when the file is new.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, io::Error> {
        let path = path.as_ref();
        let is_new = !path.exists() || path.metadata()?.len() == 0;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        Ok(Self { writer })
    }

    pub fn log<I: Serialize, O: Serialize>(
        &mut self,
        kind: &str,
        inputs: &I,
        outputs: &O,
    ) -> Result<(), PwProError> {
        let entry = LogEntry {
            timestamp: Utc::now().to_rfc3339(),
            kind: kind.to_string(),
            inputs_json: serde_json::to_string(inputs)?,
            outputs_json: serde_json::to_string(outputs)?,
        };

        self.writer
            .serialize(entry)
            .map_err(|e| PwProError::CsvError(kind.to_string(), e))?;
        self.writer
            .flush()
            .map_err(|e| PwProError::FileIO(kind.to_string(), e))?;
        Ok(())
    }
}

/// Reads back every entry of a history file.
pub fn read_entries(path: impl AsRef<Path>) -> Result<Vec<LogEntry>, PwProError> {
    let display = path.as_ref().display().to_string();
    let mut reader =
        csv::Reader::from_path(path.as_ref()).map_err(|e| PwProError::CsvError(display.clone(), e))?;
    let mut entries = Vec::new();
    for result in reader.deserialize() {
        let entry: LogEntry = result.map_err(|e| PwProError::CsvError(display.clone(), e))?;
        entries.push(entry);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dilution::compute_batch_mix;
    use serde_json::json;

    #[test]
    fn appends_across_logger_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");

        {
            let mut logger = CalculationLogger::new(&path).unwrap();
            let mix = compute_batch_mix(50.0, 2.0);
            logger
                .log("batch_mix", &json!({"tank_volume": 50.0, "desired_percent": 2.0}), &mix)
                .unwrap();
        }
        {
            let mut logger = CalculationLogger::new(&path).unwrap();
            logger.log("nearest_preset", &49.0, &Some(50.0)).unwrap();
        }

        let entries = read_entries(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, "batch_mix");
        assert!(entries[0].outputs_json.contains("\"water_volume\":49.0"));
        assert_eq!(entries[1].inputs_json, "49.0");
    }
}
