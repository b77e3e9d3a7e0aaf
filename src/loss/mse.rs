/// Squared error against an integer label used as a regression target.
pub struct SquaredError;

impl SquaredError {
    /// `(target - predicted)²`
    #[inline]
    pub fn loss(predicted: f64, target: i32) -> f64 {
        let err = f64::from(target) - predicted;
        err * err
    }

    /// `∂L/∂predicted = 2 * (predicted - target)`
    #[inline]
    pub fn derivative(predicted: f64, target: i32) -> f64 {
        2.0 * (predicted - f64::from(target))
    }
}
