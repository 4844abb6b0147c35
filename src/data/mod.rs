//! Record data that drives generation.

mod context;
mod record;
mod value;

pub use context::DataContext;
pub use record::{Record, RecordList};
pub use value::Value;

pub(crate) use record::normalize_key;

/// Split records into chunks of at most `fill_count`.
///
/// A `fill_count` of 0, or one at least as large as the list, yields a single
/// chunk holding every record. An empty input yields no chunks.
pub fn split_records(records: &RecordList, fill_count: usize) -> Vec<RecordList> {
    if records.is_empty() {
        return Vec::new();
    }
    if fill_count == 0 || fill_count >= records.len() {
        return vec![records.clone()];
    }

    let chunks: Vec<RecordList> = records
        .as_slice()
        .chunks(fill_count)
        .map(|chunk| chunk.to_vec().into())
        .collect();
    log::info!(
        "split {} records into {} chunks of up to {}",
        records.len(),
        chunks.len(),
        fill_count
    );
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> RecordList {
        (0..n)
            .map(|i| Record::new().with("Index", i as i64))
            .collect()
    }

    #[test]
    fn test_split_even_and_remainder() {
        let chunks = split_records(&records(7), 3);
        let sizes: Vec<_> = chunks.iter().map(RecordList::len).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(chunks[2].first().unwrap().text("Index"), Some("6".to_string()));
    }

    #[test]
    fn test_split_zero_or_large_is_one_chunk() {
        assert_eq!(split_records(&records(4), 0).len(), 1);
        assert_eq!(split_records(&records(4), 4).len(), 1);
        assert_eq!(split_records(&records(4), 10)[0].len(), 4);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_records(&RecordList::new(), 3).is_empty());
    }
}
