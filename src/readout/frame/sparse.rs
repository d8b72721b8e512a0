use tracing::{debug, warn};

use crate::readout::frame::markers::MarkerColumns;
use crate::readout::frame::types::SparsePixel;

/// Moves zero-suppressed pixels into the marker-stripped coordinate system.
///
/// Pixels sitting on a marker column are discarded; the others have their
/// `x` shifted left by the number of markers before them. Source order is
/// kept and coordinates that collide after the shift are not merged.
pub fn remap_sparse_pixels(pixels: Vec<SparsePixel>, markers: &MarkerColumns) -> Vec<SparsePixel> {
    if markers.is_empty() {
        return pixels;
    }

    pixels
        .into_iter()
        .filter_map(|pixel| {
            let x = usize::from(pixel.x);
            if markers.contains(x) {
                warn!(
                    x = pixel.x,
                    y = pixel.y,
                    "Found a sparse pixel on a marker column, discarding it"
                );
                return None;
            }
            let shift = markers.count_below(x) as u16;
            let remapped = SparsePixel::new(pixel.x - shift, pixel.y, pixel.signal);
            debug!(?remapped, "Remapped sparse pixel");
            Some(remapped)
        })
        .collect()
}
