//! Correlation Module
//! Pairwise Pearson correlation of the case metrics.

use polars::prelude::*;
use rayon::prelude::*;
use statrs::statistics::Statistics;

/// Square matrix of Pearson coefficients, rows and columns in `labels` order.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }

    /// Matrix as a frame with a leading `metric` label column, for printing.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let mut columns = Vec::with_capacity(self.size() + 1);
        columns.push(Column::new("metric".into(), self.labels.clone()));
        for (j, label) in self.labels.iter().enumerate() {
            let values: Vec<f64> = self.values.iter().map(|row| row[j]).collect();
            columns.push(Column::new(label.as_str().into(), values));
        }
        DataFrame::new(columns)
    }
}

/// Computes correlation matrices with multi-threading support.
pub struct CorrelationCalculator;

impl CorrelationCalculator {
    /// Pearson coefficient from sample covariance and standard deviations.
    ///
    /// `NaN` when either side has fewer than two values or zero variance.
    pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
        if x.len() != y.len() || x.len() < 2 {
            return f64::NAN;
        }

        let sx = x.std_dev();
        let sy = y.std_dev();
        if sx == 0.0 || sy == 0.0 {
            return f64::NAN;
        }

        (x.covariance(y) / (sx * sy)).clamp(-1.0, 1.0)
    }

    /// Read a numeric column as `f64`, skipping nulls.
    pub fn column_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<f64>> {
        let casted = df.column(name)?.cast(&DataType::Float64)?;
        Ok(casted.f64()?.into_iter().flatten().collect())
    }

    /// Correlation matrix over `columns`, upper triangle computed in parallel.
    pub fn compute(df: &DataFrame, columns: &[&str]) -> PolarsResult<CorrelationMatrix> {
        let data: Vec<Vec<f64>> = columns
            .iter()
            .map(|name| Self::column_values(df, name))
            .collect::<PolarsResult<_>>()?;

        let n = columns.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();

        let coefficients: Vec<((usize, usize), f64)> = pairs
            .par_iter()
            .map(|&(i, j)| ((i, j), Self::pearson(&data[i], &data[j])))
            .collect();

        let mut values = vec![vec![f64::NAN; n]; n];
        for (i, column) in data.iter().enumerate() {
            if column.len() >= 2 && column.std_dev() > 0.0 {
                values[i][i] = 1.0;
            }
        }
        for ((i, j), r) in coefficients {
            values[i][j] = r;
            values[j][i] = r;
        }

        Ok(CorrelationMatrix {
            labels: columns.iter().map(|s| s.to_string()).collect(),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_pearson_perfect_correlation() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        let z = [8.0, 6.0, 4.0, 2.0];
        assert!(approx(CorrelationCalculator::pearson(&x, &y), 1.0));
        assert!(approx(CorrelationCalculator::pearson(&x, &z), -1.0));
    }

    #[test]
    fn test_pearson_known_value() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 1.0, 4.0, 3.0, 5.0];
        assert!(approx(CorrelationCalculator::pearson(&x, &y), 0.8));
    }

    #[test]
    fn test_pearson_degenerate_inputs() {
        assert!(CorrelationCalculator::pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
        assert!(CorrelationCalculator::pearson(&[1.0], &[2.0]).is_nan());
    }

    #[test]
    fn test_matrix_symmetric_with_unit_diagonal() {
        let df = df!(
            "a" => [1i64, 2, 3, 4, 10],
            "b" => [5i64, 3, 4, 1, 0],
            "c" => [2i64, 2, 7, 1, 9]
        )
        .unwrap();

        let matrix = CorrelationCalculator::compute(&df, &["a", "b", "c"]).unwrap();
        assert_eq!(matrix.size(), 3);
        for i in 0..3 {
            assert_eq!(matrix.get(i, i), 1.0);
            for j in 0..3 {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
            }
        }

        let frame = matrix.to_frame().unwrap();
        assert_eq!(frame.shape(), (3, 4));
    }

    #[test]
    fn test_constant_column_yields_nan() {
        let df = df!("a" => [1i64, 2, 3], "flat" => [7i64, 7, 7]).unwrap();
        let matrix = CorrelationCalculator::compute(&df, &["a", "flat"]).unwrap();
        assert!(matrix.get(1, 1).is_nan());
        assert!(matrix.get(0, 1).is_nan());
        assert_eq!(matrix.get(0, 0), 1.0);
    }
}
