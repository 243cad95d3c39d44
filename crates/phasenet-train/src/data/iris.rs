//! Record sources: the embedded Fisher iris table and in-memory records.

use phasenet_core::{PhaseNetError, Result};

const FISHER_CSV: &str = include_str!("../../data/iris.csv");

/// One labeled measurement vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub measures: Vec<f64>,
    pub label: String,
}

impl Record {
    pub fn new(measures: Vec<f64>, label: impl Into<String>) -> Self {
        Self {
            measures,
            label: label.into(),
        }
    }
}

/// Anything that can hand over an ordered list of records.
pub trait RecordSource {
    fn load(&self) -> Result<Vec<Record>>;
}

/// Fisher's 150 iris flowers: sepal length/width, petal length/width, species.
#[derive(Debug, Clone, Copy, Default)]
pub struct FisherIris;

impl RecordSource for FisherIris {
    fn load(&self) -> Result<Vec<Record>> {
        parse_records(FISHER_CSV)
    }
}

/// Records already held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemory(pub Vec<Record>);

impl RecordSource for InMemory {
    fn load(&self) -> Result<Vec<Record>> {
        Ok(self.0.clone())
    }
}

/// Parse comma-separated rows of `measure,...,measure,label`.
///
/// The first line is a header. Blank lines are skipped. Every row must have
/// the same number of fields as the header.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let mut lines = text.lines().enumerate();
    let columns = match lines.next() {
        Some((_, header)) => header.split(',').count(),
        None => return Err(PhaseNetError::DataLoad("empty record table".into())),
    };
    if columns < 2 {
        return Err(PhaseNetError::DataLoad(format!(
            "header has {} column(s); need measures and a label",
            columns
        )));
    }

    let mut records = Vec::new();
    for (idx, line) in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != columns {
            return Err(PhaseNetError::DataLoad(format!(
                "line {}: expected {} fields, found {}",
                idx + 1,
                columns,
                fields.len()
            )));
        }
        let Some((label, values)) = fields.split_last() else {
            continue;
        };
        let measures = values
            .iter()
            .map(|v| {
                v.parse::<f64>().map_err(|e| {
                    PhaseNetError::DataLoad(format!("line {}: '{}': {}", idx + 1, v, e))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        records.push(Record::new(measures, *label));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fisher_iris_shape() -> Result<()> {
        let records = FisherIris.load()?;
        assert_eq!(records.len(), 150);
        assert!(records.iter().all(|r| r.measures.len() == 4));

        for label in ["setosa", "versicolor", "virginica"] {
            let count = records.iter().filter(|r| r.label == label).count();
            assert_eq!(count, 50, "{}", label);
        }

        assert_eq!(records[0].measures, vec![5.1, 3.5, 1.4, 0.2]);
        assert_eq!(records[0].label, "setosa");
        Ok(())
    }

    #[test]
    fn test_parse_skips_blank_lines() -> Result<()> {
        let records = parse_records("a,b,label\n1.0,2.0,x\n\n3.5,4.5,y\n")?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], Record::new(vec![3.5, 4.5], "y"));
        Ok(())
    }

    #[test]
    fn test_parse_reports_line_numbers() {
        let err = parse_records("a,b,label\n1.0,2.0,x\n1.0,x\n").unwrap_err();
        assert!(err.is_data_error());
        assert!(err.to_string().contains("line 3"), "{}", err);

        let err = parse_records("a,b,label\n1.0,oops,x\n").unwrap_err();
        assert!(err.to_string().contains("oops"), "{}", err);

        assert!(parse_records("").is_err());
    }

    #[test]
    fn test_in_memory_source() -> Result<()> {
        let source = InMemory(vec![Record::new(vec![1.0, 2.0, 3.0, 4.0], "synthetic")]);
        let records = source.load()?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label, "synthetic");
        Ok(())
    }
}
