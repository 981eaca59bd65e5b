pub fn mean(xs: impl Iterator<Item = f64>) -> f64 {
    let mut count = 0;
    let mut total = 0.0;
    for x in xs {
        count += 1;
        total += x;
    }
    assert_ne!(count, 0);
    total / count as f64
}

/// Least-squares line through the points `(xs[k], ys[k])`, as `(slope, intercept)`.
///
/// An abscissa without two distinct values has no defined slope; the fit
/// degenerates to the horizontal line through the mean of `ys`.
pub fn least_squares_line(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    debug_assert_eq!(xs.len(), ys.len());
    let x_mean = mean(xs.iter().copied());
    let y_mean = mean(ys.iter().copied());

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        covariance += (x - x_mean) * (y - y_mean);
        variance += (x - x_mean).powi(2);
    }
    if variance == 0.0 {
        return (0.0, y_mean);
    }

    let slope = covariance / variance;
    (slope, y_mean - slope * x_mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_works() {
        assert_eq!(mean([1.0, 2.0, 3.0, 6.0].into_iter()), 3.0);
    }

    #[test]
    fn least_squares_line_recovers_exact_line() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [5.0, 7.0, 9.0, 11.0];
        assert_eq!(least_squares_line(&xs, &ys), (2.0, 5.0));
    }

    #[test]
    fn least_squares_line_fits_quadratic_points() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [0.0, 1.0, 4.0, 9.0, 16.0];
        assert_eq!(least_squares_line(&xs, &ys), (4.0, -2.0));
    }

    #[test]
    fn least_squares_line_degenerates_on_constant_abscissa() {
        let xs = [2.0, 2.0, 2.0];
        let ys = [1.0, 3.0, 8.0];
        assert_eq!(least_squares_line(&xs, &ys), (0.0, 4.0));
    }
}
