use rayon::prelude::*;
use tracing::{debug, info};

use crate::buffer::{Channel, PixelBuffer};
use crate::consts::{
    CHANNEL_COUNT, PARALLEL_BAND_ROWS, PARALLEL_PIXEL_THRESHOLD, PROGRESS_PIXEL_INTERVAL,
};
use crate::error::{CombinerError, Result};
use crate::stack::{validate_stack, Operation, OperationSet, StackGeometry};

use super::types::{CompositeResult, ProgressEvent, ProgressReporter, ResultNaming};

/// Run every selected operation over the stack, in the order mean, median,
/// mode, producing one result per operation.
///
/// The stack is validated first; on failure no events are emitted. Pixels are
/// scanned row-major. Images with at least `PARALLEL_PIXEL_THRESHOLD` pixels
/// are computed in row bands on the Rayon pool, but every reporter callback
/// still happens on the calling thread.
pub fn composite_stack(
    buffers: &[PixelBuffer],
    operations: OperationSet,
    naming: &ResultNaming,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<CompositeResult>> {
    let geometry = validate_stack(buffers)?;
    if operations.is_empty() {
        return Err(CombinerError::NoOperations);
    }

    let total_ops = operations.len();
    let parallel = geometry.pixel_count() >= PARALLEL_PIXEL_THRESHOLD && geometry.depth > 1;
    info!(
        width = geometry.width,
        height = geometry.height,
        images = geometry.depth,
        operations = total_ops,
        parallel,
        "Compositing stack"
    );

    let mut results = Vec::with_capacity(total_ops);
    for (index, operation) in operations.iter().enumerate() {
        reporter.operation_started(operation);
        let mut progress =
            OperationProgress::new(reporter, operation, index, total_ops, geometry.pixel_count());

        let buffer = if parallel {
            composite_banded(buffers, &geometry, operation, &mut progress)
        } else {
            composite_sequential(buffers, &geometry, operation, &mut progress)
        };
        progress.finish();
        info!(operation = operation.name(), "Operation complete");

        results.push(CompositeResult {
            operation,
            display_name: naming.display_name(operation),
            buffer,
        });
    }

    reporter.progress(&ProgressEvent::complete());
    Ok(results)
}

/// Per-channel sample lists reused for every coordinate.
struct ChannelScratch {
    lists: [Vec<u8>; CHANNEL_COUNT],
}

impl ChannelScratch {
    fn new(depth: usize) -> Self {
        Self {
            lists: std::array::from_fn(|_| Vec::with_capacity(depth)),
        }
    }

    /// Gather the stack's samples at (row, col) and reduce each channel.
    fn compute(
        &mut self,
        buffers: &[PixelBuffer],
        row: usize,
        col: usize,
        operation: Operation,
    ) -> [u8; CHANNEL_COUNT] {
        for list in &mut self.lists {
            list.clear();
        }
        for buffer in buffers {
            let samples = buffer.samples();
            for channel in Channel::ALL {
                let c = channel.index();
                self.lists[c].push(samples[[row, col, c]]);
            }
        }

        let mut pixel = [0u8; CHANNEL_COUNT];
        for channel in Channel::ALL {
            let c = channel.index();
            pixel[c] = operation.apply(&mut self.lists[c]);
        }
        pixel
    }
}

fn composite_sequential(
    buffers: &[PixelBuffer],
    geometry: &StackGeometry,
    operation: Operation,
    progress: &mut OperationProgress<'_>,
) -> PixelBuffer {
    let (w, h) = (geometry.width as usize, geometry.height as usize);
    let mut output = PixelBuffer::zeros(geometry.width, geometry.height);
    let mut scratch = ChannelScratch::new(geometry.depth);
    let mut processed = 0usize;

    let out = output.samples_mut();
    for row in 0..h {
        for col in 0..w {
            let pixel = scratch.compute(buffers, row, col, operation);
            for (c, value) in pixel.into_iter().enumerate() {
                out[[row, col, c]] = value;
            }
            processed += 1;
            if processed % PROGRESS_PIXEL_INTERVAL == 0 {
                progress.report(processed);
            }
        }
        progress.report(processed);
    }

    output
}

fn composite_banded(
    buffers: &[PixelBuffer],
    geometry: &StackGeometry,
    operation: Operation,
    progress: &mut OperationProgress<'_>,
) -> PixelBuffer {
    let (w, h) = (geometry.width as usize, geometry.height as usize);
    let depth = geometry.depth;
    let mut output = PixelBuffer::zeros(geometry.width, geometry.height);
    let mut processed = 0usize;

    let mut band_start = 0;
    while band_start < h {
        let band_end = (band_start + PARALLEL_BAND_ROWS).min(h);

        // Scratch lists are reused across the rows a worker takes.
        let rows: Vec<Vec<u8>> = (band_start..band_end)
            .into_par_iter()
            .map_init(
                || ChannelScratch::new(depth),
                |scratch, row| {
                    let mut row_result = Vec::with_capacity(w * CHANNEL_COUNT);
                    for col in 0..w {
                        row_result.extend(scratch.compute(buffers, row, col, operation));
                    }
                    row_result
                },
            )
            .collect();

        for (offset, row_data) in rows.into_iter().enumerate() {
            let row = band_start + offset;
            let mut dst = output.samples_mut().slice_mut(ndarray::s![row, .., ..]);
            for (d, s) in dst.iter_mut().zip(row_data) {
                *d = s;
            }
            processed += w;
            progress.report(processed);
        }

        debug!(operation = operation.name(), rows = band_end, "Band complete");
        band_start = band_end;
    }

    output
}

/// Turns pixel counts into progress events for one operation.
struct OperationProgress<'a> {
    reporter: &'a dyn ProgressReporter,
    operation: Operation,
    completed_ops: usize,
    total_ops: usize,
    total_pixels: usize,
    last_reported: Option<usize>,
}

impl<'a> OperationProgress<'a> {
    fn new(
        reporter: &'a dyn ProgressReporter,
        operation: Operation,
        completed_ops: usize,
        total_ops: usize,
        total_pixels: usize,
    ) -> Self {
        Self {
            reporter,
            operation,
            completed_ops,
            total_ops,
            total_pixels,
            last_reported: None,
        }
    }

    fn report(&mut self, processed: usize) {
        if self.last_reported == Some(processed) {
            return;
        }
        self.last_reported = Some(processed);

        let operation_fraction = if self.total_pixels == 0 {
            1.0
        } else {
            processed as f64 / self.total_pixels as f64
        };
        let overall_fraction =
            (self.completed_ops as f64 + operation_fraction) / self.total_ops as f64;

        self.reporter.progress(&ProgressEvent {
            overall_fraction,
            operation_name: self.operation.name(),
            operation_fraction,
        });
    }

    /// Make sure the operation's final event (fraction 1.0) went out.
    fn finish(&mut self) {
        self.report(self.total_pixels);
    }
}
