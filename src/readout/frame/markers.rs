use tracing::warn;

use crate::readout::common::error::{ReadoutError, Result};

/// Column indices injected by the readout electronics, shared by every
/// sensor of a run. Strictly increasing, no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerColumns {
    columns: Vec<usize>,
}

impl MarkerColumns {
    /// Sorts and de-duplicates `positions`. Every column must lie inside a
    /// sensor `width` columns wide.
    pub fn new(positions: impl IntoIterator<Item = usize>, width: usize) -> Result<Self> {
        let mut columns: Vec<usize> = positions.into_iter().collect();
        columns.sort_unstable();

        let configured = columns.len();
        columns.dedup();
        if columns.len() != configured {
            warn!(
                "Ignoring {} duplicated marker position(s)",
                configured - columns.len()
            );
        }

        if let Some(&last) = columns.last() {
            if last >= width {
                return Err(ReadoutError::Configuration(format!(
                    "marker column {} outside sensor width {}",
                    last, width
                )));
            }
        }

        if !columns.is_empty() && columns.len() >= width {
            return Err(ReadoutError::Configuration(format!(
                "{} marker columns leave nothing of a {} column sensor",
                columns.len(),
                width
            )));
        }

        Ok(Self { columns })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns.iter().copied()
    }

    pub fn contains(&self, column: usize) -> bool {
        self.columns.binary_search(&column).is_ok()
    }

    /// Number of marker columns strictly left of `column`.
    pub fn count_below(&self, column: usize) -> usize {
        self.columns.partition_point(|&marker| marker < column)
    }

    /// Width of a `width`-column frame once markers are removed.
    pub fn stripped_width(&self, width: usize) -> usize {
        width - self.count_below(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_and_deduplicated() {
        let markers = MarkerColumns::new([67, 0, 66, 1, 66], 264).unwrap();
        assert_eq!(markers.as_slice(), &[0, 1, 66, 67]);
        assert_eq!(markers.len(), 4);
    }

    #[test]
    fn test_rejects_column_outside_width() {
        let result = MarkerColumns::new([0, 264], 264);
        assert!(matches!(result, Err(ReadoutError::Configuration(_))));
    }

    #[test]
    fn test_rejects_markers_covering_sensor() {
        assert!(MarkerColumns::new([0, 1, 2], 3).is_err());
    }

    #[test]
    fn test_membership_and_counts() {
        let markers = MarkerColumns::new([0, 1, 66, 67], 264).unwrap();
        assert!(markers.contains(66));
        assert!(!markers.contains(65));
        assert_eq!(markers.count_below(0), 0);
        assert_eq!(markers.count_below(2), 2);
        assert_eq!(markers.count_below(67), 3);
        assert_eq!(markers.count_below(200), 4);
        assert_eq!(markers.stripped_width(264), 260);
    }

    #[test]
    fn test_empty_set() {
        let markers = MarkerColumns::empty();
        assert!(markers.is_empty());
        assert_eq!(markers.stripped_width(264), 264);
    }
}
