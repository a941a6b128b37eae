use crate::domain::operation::Operation;
use crate::error::{Result, SplitterError};
use std::io::Read;

/// Streams scripted ledger operations out of CSV.
///
/// Fields are trimmed and rows may stop early, so `init, 1` and
/// `init, 1, , ` read the same.
pub struct OperationReader<R: Read> {
    csv: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    pub fn new(source: R) -> Self {
        let csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { csv }
    }

    /// One item per data row; a bad row does not end the stream.
    pub fn operations(self) -> impl Iterator<Item = Result<Operation>> {
        self.csv
            .into_deserialize()
            .map(|result| result.map_err(SplitterError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::Identity;
    use crate::domain::operation::OperationKind;

    #[test]
    fn test_reader_valid_stream() {
        let data = "op, caller, payee, value\ninit, 1, , \nadd_payee, 1, 2, 5\ndeposit, 7, , 100\nrelease_all, 1, , ";
        let reader = OperationReader::new(data.as_bytes());
        let results: Vec<Result<Operation>> = reader.operations().collect();

        assert_eq!(results.len(), 4);
        let add = results[1].as_ref().unwrap();
        assert_eq!(add.op, OperationKind::AddPayee);
        assert_eq!(add.payee, Some(Identity::new(2)));
        assert_eq!(add.value, Some(5));
        assert_eq!(
            results[3].as_ref().unwrap().op,
            OperationKind::ReleaseAll
        );
    }

    #[test]
    fn test_reader_short_rows() {
        // Trailing empty columns may be omitted entirely.
        let data = "op, caller, payee, value\ninit, 1\nrelease, 3, 2";
        let reader = OperationReader::new(data.as_bytes());
        let results: Vec<Result<Operation>> = reader.operations().collect();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().payee, None);
        assert_eq!(results[1].as_ref().unwrap().payee, Some(Identity::new(2)));
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "op, caller, payee, value\nwithdraw, 1, 1, 1";
        let reader = OperationReader::new(data.as_bytes());
        let results: Vec<Result<Operation>> = reader.operations().collect();

        assert!(matches!(results[0], Err(SplitterError::CsvError(_))));
    }
}
