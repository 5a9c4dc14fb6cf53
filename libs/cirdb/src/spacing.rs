//! Parallel-run-length spacing tables.

use crate::error::{Error, Result};

/// A two-dimensional minimum spacing table keyed by wire width and
/// parallel run length.
///
/// Both key axes are stored in strictly increasing order. A lookup selects,
/// on each axis, the greatest tabulated key that does not exceed the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpacingTable {
    prls: Vec<i64>,
    widths: Vec<i64>,
    spacings: Vec<Vec<i64>>,
}

impl SpacingTable {
    /// Creates a table from parallel run lengths and `(width, spacings)` rows.
    ///
    /// Every row must hold one spacing per parallel run length, and both
    /// the widths and the parallel run lengths must be strictly increasing.
    pub fn new(
        prls: impl Into<Vec<i64>>,
        rows: impl IntoIterator<Item = (i64, Vec<i64>)>,
    ) -> Result<Self> {
        let prls = prls.into();
        if !is_strictly_increasing(&prls) {
            return Err(Error::InvalidArgument(format!(
                "parallel run lengths must be strictly increasing: {prls:?}"
            )));
        }
        let (widths, spacings): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        if !is_strictly_increasing(&widths) {
            return Err(Error::InvalidArgument(format!(
                "spacing table widths must be strictly increasing: {widths:?}"
            )));
        }
        if let Some((width, row)) = widths
            .iter()
            .zip(spacings.iter())
            .find(|(_, row)| row.len() != prls.len())
        {
            return Err(Error::InvalidArgument(format!(
                "spacing table row for width {width} has {} entries, expected {}",
                row.len(),
                prls.len()
            )));
        }
        Ok(Self {
            prls,
            widths,
            spacings,
        })
    }

    /// The tabulated parallel run lengths.
    pub fn prls(&self) -> &[i64] {
        &self.prls
    }

    /// The tabulated wire widths.
    pub fn widths(&self) -> &[i64] {
        &self.widths
    }

    /// Returns `true` if the table has no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.widths.is_empty() || self.prls.is_empty()
    }

    /// Looks up the spacing for a wire of the given width and parallel run length.
    ///
    /// Returns [`None`] if the query lies below the smallest tabulated
    /// width or parallel run length.
    pub fn lookup(&self, width: i64, prl: i64) -> Option<i64> {
        let row = floor_index(&self.widths, width)?;
        let col = floor_index(&self.prls, prl)?;
        Some(self.spacings[row][col])
    }
}

/// The index of the greatest key `<= value`.
fn floor_index(keys: &[i64], value: i64) -> Option<usize> {
    keys.partition_point(|&k| k <= value).checked_sub(1)
}

fn is_strictly_increasing(keys: &[i64]) -> bool {
    keys.windows(2).all(|w| w[0] < w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SpacingTable {
        SpacingTable::new(
            vec![0, 100],
            vec![(0, vec![10, 20]), (200, vec![30, 40]), (400, vec![50, 60])],
        )
        .unwrap()
    }

    #[test]
    fn selects_floor_on_both_axes() {
        let t = table();
        assert_eq!(t.lookup(250, 50), Some(30));
        assert_eq!(t.lookup(200, 100), Some(40));
        assert_eq!(t.lookup(399, 99), Some(30));
        assert_eq!(t.lookup(10_000, 10_000), Some(60));
        assert_eq!(t.lookup(0, 0), Some(10));
    }

    #[test]
    fn below_smallest_key_is_none() {
        let t = table();
        assert_eq!(t.lookup(-1, 50), None);
        assert_eq!(t.lookup(50, -1), None);
    }

    #[test]
    fn rejects_malformed_tables() {
        assert!(SpacingTable::new(vec![100, 0], [(0, vec![1, 2])]).is_err());
        assert!(SpacingTable::new(vec![0, 100], [(0, vec![1])]).is_err());
        let unsorted = [(200, vec![1]), (100, vec![2])];
        assert!(SpacingTable::new(vec![0], unsorted).is_err());
    }
}
