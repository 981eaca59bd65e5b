use thiserror::Error;

/// Column-major view over caller-owned feature columns.
///
/// Columns are borrowed, never copied, so building sweep variants of a large
/// table stays cheap.
#[derive(Debug, Clone)]
pub struct Table<'a> {
    columns: Vec<&'a [f64]>,
    rows_len: usize,
}

impl<'a> Table<'a> {
    pub fn new(columns: Vec<&'a [f64]>) -> Result<Self, TableError> {
        if columns.is_empty() || columns[0].is_empty() {
            return Err(TableError::EmptyTable);
        }

        let rows_len = columns[0].len();
        if columns.iter().skip(1).any(|c| c.len() != rows_len) {
            return Err(TableError::ColumnLengthMismatch);
        }

        if let Some(column) = columns
            .iter()
            .position(|c| c.iter().any(|v| !v.is_finite()))
        {
            return Err(TableError::NonFiniteValue { column });
        }

        Ok(Self { columns, rows_len })
    }

    pub fn column(&self, index: usize) -> impl '_ + Iterator<Item = f64> + Clone {
        self.columns[index].iter().copied()
    }

    pub fn row(&self, index: usize) -> impl '_ + Iterator<Item = f64> + Clone {
        self.columns.iter().map(move |column| column[index])
    }

    pub fn columns_len(&self) -> usize {
        self.columns.len()
    }

    pub fn rows_len(&self) -> usize {
        self.rows_len
    }

    /// Returns a view with `column` swapped in at `index`, leaving `self`
    /// untouched.
    ///
    /// `column` must hold one value per row of `self`.
    pub fn with_column<'b>(&self, index: usize, column: &'b [f64]) -> Table<'b>
    where
        'a: 'b,
    {
        debug_assert_eq!(column.len(), self.rows_len);
        let mut columns: Vec<&'b [f64]> = self.columns.clone();
        columns[index] = column;
        Table {
            columns,
            rows_len: self.rows_len,
        }
    }
}

#[derive(Debug, Error, Clone)]
pub enum TableError {
    #[error("table must have at least one column and one row")]
    EmptyTable,

    #[error("columns must all have the same row count")]
    ColumnLengthMismatch,

    #[error("column {column} contains non finite numbers")]
    NonFiniteValue { column: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_malformed_columns() {
        assert!(matches!(Table::new(vec![]), Err(TableError::EmptyTable)));

        let empty: [f64; 0] = [];
        assert!(matches!(
            Table::new(vec![&empty[..]]),
            Err(TableError::EmptyTable)
        ));

        let long = [1.0, 2.0];
        let short = [1.0];
        assert!(matches!(
            Table::new(vec![&long[..], &short[..]]),
            Err(TableError::ColumnLengthMismatch)
        ));

        let bad = [1.0, f64::NAN];
        assert!(matches!(
            Table::new(vec![&long[..], &bad[..]]),
            Err(TableError::NonFiniteValue { column: 1 })
        ));
        let bad = [f64::INFINITY, 2.0];
        assert!(matches!(
            Table::new(vec![&bad[..], &long[..]]),
            Err(TableError::NonFiniteValue { column: 0 })
        ));
    }

    #[test]
    fn accessors_read_columns_and_rows() -> Result<(), anyhow::Error> {
        let c0 = [1.0, 2.0, 3.0];
        let c1 = [4.0, 5.0, 6.0];
        let table = Table::new(vec![&c0[..], &c1[..]])?;

        assert_eq!(table.columns_len(), 2);
        assert_eq!(table.rows_len(), 3);
        assert_eq!(table.column(1).collect::<Vec<_>>(), c1);
        assert_eq!(table.row(2).collect::<Vec<_>>(), [3.0, 6.0]);
        Ok(())
    }

    #[test]
    fn with_column_overrides_a_single_column() -> Result<(), anyhow::Error> {
        let c0 = [1.0, 2.0, 3.0];
        let c1 = [4.0, 5.0, 6.0];
        let table = Table::new(vec![&c0[..], &c1[..]])?;

        let forced = [9.0, 9.0, 9.0];
        let modified = table.with_column(1, &forced);
        assert_eq!(modified.column(0).collect::<Vec<_>>(), c0);
        assert_eq!(modified.column(1).collect::<Vec<_>>(), forced);
        assert_eq!(modified.row(0).collect::<Vec<_>>(), [1.0, 9.0]);

        // The original view is untouched.
        assert_eq!(table.column(1).collect::<Vec<_>>(), c1);
        Ok(())
    }
}
