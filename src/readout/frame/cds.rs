use crate::readout::frame::types::{Frame, PivotMap, SignalPolarity, ThreeSampleFrames};

/// Correlated double sampling over three raw samples.
///
/// Per pixel, `polarity × (−p·first + (2p − 1)·second + (1 − p)·third)`
/// where `p` is the pivot bit: `second − first` for pivot pixels and
/// `third − second` for the others. Arithmetic is done in `i32` and the
/// result truncated to the 16-bit sample width of the readout.
pub fn compute_cds(
    first: &[i16],
    second: &[i16],
    third: &[i16],
    pivot: &PivotMap,
    polarity: SignalPolarity,
) -> Vec<i16> {
    debug_assert!(first.len() == second.len() && second.len() == third.len());
    debug_assert_eq!(first.len(), pivot.len());

    let sign = polarity.factor();
    first
        .iter()
        .zip(second)
        .zip(third)
        .zip(pivot.iter())
        .map(|(((&a, &b), &c), pivot)| {
            let p = i32::from(pivot);
            let combined = -p * i32::from(a) + (2 * p - 1) * i32::from(b) + (1 - p) * i32::from(c);
            (sign * combined) as i16
        })
        .collect()
}

impl ThreeSampleFrames {
    /// CDS frame on the full, marker-inclusive geometry. The pivot map is
    /// indexed with markers in place, so stripping must happen afterwards.
    pub fn cds(&self, polarity: SignalPolarity) -> Frame<i16> {
        let data = compute_cds(
            self.first.data(),
            self.second.data(),
            self.third.data(),
            &self.pivot,
            polarity,
        );
        Frame::from_parts_unchecked(self.first.width(), self.first.height(), data)
    }
}
