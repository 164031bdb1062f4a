/// Mean of one channel across the stack.
///
/// Values are accumulated as floating point, the quotient is truncated toward
/// zero and clamped to `[0, 255]`. An empty slice yields 0.
pub fn channel_mean(values: &[u8]) -> u8 {
    if values.is_empty() {
        return 0;
    }
    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    let mean = (sum / values.len() as f64).trunc() as i64;
    mean.clamp(0, 255) as u8
}
