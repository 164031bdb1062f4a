/// Most frequent value of one channel across the stack.
///
/// Ties between equally frequent values resolve to the smallest value.
/// An empty slice yields 0.
pub fn channel_mode(values: &[u8]) -> u8 {
    let mut counts = [0u32; 256];
    for &v in values {
        counts[v as usize] += 1;
    }

    let mut best_value = 0u8;
    let mut best_count = 0u32;
    for (value, &count) in counts.iter().enumerate() {
        // Strictly greater keeps the first (smallest) value on ties.
        if count > best_count {
            best_count = count;
            best_value = value as u8;
        }
    }
    best_value
}
