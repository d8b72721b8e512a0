use crate::readout::frame::markers::MarkerColumns;
use crate::readout::frame::types::Frame;

/// Removes every marker column from a row-major array `width` columns wide.
///
/// Each row is rebuilt from the runs of columns lying between consecutive
/// markers, so relative order is preserved and marker columns are never
/// copied. Markers at or beyond `width` are ignored.
pub fn strip_columns<T: Copy>(data: &[T], width: usize, markers: &MarkerColumns) -> Vec<T> {
    if markers.is_empty() || width == 0 {
        return data.to_vec();
    }

    let in_row = markers.count_below(width);
    let row_markers = &markers.as_slice()[..in_row];
    let rows = data.len() / width;
    let mut stripped = Vec::with_capacity((width - in_row) * rows);

    for row in data.chunks_exact(width) {
        let mut start = 0;
        for &marker in row_markers {
            stripped.extend_from_slice(&row[start..marker]);
            start = marker + 1;
        }
        stripped.extend_from_slice(&row[start..]);
    }

    stripped
}

impl<T: Copy> Frame<T> {
    /// Returns the frame with marker columns removed. An empty marker set
    /// hands the frame back untouched.
    pub fn strip_markers(self, markers: &MarkerColumns) -> Frame<T> {
        if markers.is_empty() {
            return self;
        }
        let width = markers.stripped_width(self.width());
        let height = self.height();
        let data = strip_columns(self.data(), self.width(), markers);
        Frame::from_parts_unchecked(width, height, data)
    }
}
