use crate::buffer::PixelBuffer;
use crate::error::StackError;

/// Shared geometry of a validated stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackGeometry {
    pub width: u32,
    pub height: u32,
    /// Number of images in the stack.
    pub depth: usize,
}

impl StackGeometry {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Check that the stack is non-empty and every buffer matches the first
/// buffer's width and height.
pub fn validate_stack(buffers: &[PixelBuffer]) -> Result<StackGeometry, StackError> {
    let first = buffers.first().ok_or(StackError::EmptyStack)?;
    let expected = first.dimensions();

    if let Some((index, buffer)) = buffers
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, b)| b.dimensions() != expected)
    {
        return Err(StackError::DimensionMismatch {
            index,
            expected,
            found: buffer.dimensions(),
        });
    }

    Ok(StackGeometry {
        width: expected.0,
        height: expected.1,
        depth: buffers.len(),
    })
}
