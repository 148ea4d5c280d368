// Per-Step JSONL Time Series Writer
// Outputs one JSON line per recorded step for independent analysis

use peg_model::step::PEG;
use peg_model::{SimulationState, StepRecord};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct StepSnapshot {
    pub step: usize,
    #[serde(flatten)]
    pub record: StepRecord,
    pub peg_deviation: f64,
}

impl StepSnapshot {
    pub fn new(step: usize, record: StepRecord) -> Self {
        Self { step, record, peg_deviation: record.token_price - PEG }
    }
}

/// Write every row of `state`, seed step included, as JSONL.
pub fn write_jsonl(state: &SimulationState, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    for (step, record) in state.records().enumerate() {
        let line = serde_json::to_string(&StepSnapshot::new(step, record))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        writeln!(file, "{}", line)?;
    }
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_flattens_record() {
        let value = serde_json::to_value(StepSnapshot::new(0, StepRecord::GENESIS))
            .expect("test: serialize");
        assert_eq!(value["step"], 0);
        assert_eq!(value["collateral_price"], 500.0);
        assert_eq!(value["token_supply"], 100.0);
        assert_eq!(value["peg_deviation"], 0.0);
    }
}
