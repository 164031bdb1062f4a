/// Median of one channel across the stack.
///
/// For an even count the lower of the two central values is returned rather
/// than their average, so the result is always one of the input samples.
/// Uses `select_nth_unstable` for O(n) selection; `values` is reordered.
/// An empty slice yields 0.
pub fn channel_median(values: &mut [u8]) -> u8 {
    let n = values.len();
    if n == 0 {
        return 0;
    }
    let mid = if n % 2 == 0 { n / 2 - 1 } else { n / 2 };
    *values.select_nth_unstable(mid).1
}
