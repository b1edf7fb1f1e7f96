use mzpeaks::CentroidPeak;

use crate::mass::neutral_mass;

/// A centroided tandem mass spectrum with its selected precursor
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spectrum {
    pub scan: usize,
    pub precursor_mz: f64,
    pub precursor_charge: i32,
    pub peaks: Vec<CentroidPeak>,
}

impl Spectrum {
    pub fn new(scan: usize, precursor_mz: f64, precursor_charge: i32, peaks: Vec<CentroidPeak>) -> Self {
        Self {
            scan,
            precursor_mz,
            precursor_charge,
            peaks,
        }
    }

    /// The neutral mass of the precursor ion
    pub fn precursor_mass(&self) -> f64 {
        neutral_mass(self.precursor_mz, self.precursor_charge)
    }

    /// The highest charge state fragments are searched at
    pub fn max_fragment_charge(&self) -> i32 {
        self.precursor_charge.max(1)
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    pub fn total_intensity(&self) -> f64 {
        self.peaks.iter().map(|p| p.intensity as f64).sum()
    }

    /// Rescale peak intensities so they sum to 100
    pub fn normalize(&mut self) {
        let total = self.total_intensity();
        if total <= 0.0 {
            return;
        }
        for peak in self.peaks.iter_mut() {
            peak.intensity = (peak.intensity as f64 / total * 100.0) as f32;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_normalize() {
        let mut spectrum = Spectrum::new(
            1,
            500.0,
            2,
            vec![
                CentroidPeak::new(204.08, 300.0, 0),
                CentroidPeak::new(366.14, 100.0, 1),
            ],
        );
        spectrum.normalize();
        assert!((spectrum.peaks[0].intensity - 75.0).abs() < 1e-4);
        assert!((spectrum.total_intensity() - 100.0).abs() < 1e-3);

        let mut empty = Spectrum::new(2, 500.0, 2, vec![CentroidPeak::new(204.08, 0.0, 0)]);
        empty.normalize();
        assert_eq!(empty.peaks[0].intensity, 0.0);
    }

    #[test]
    fn test_precursor_mass() {
        let spectrum = Spectrum::new(1, 1001.007825, 2, Vec::new());
        assert!((spectrum.precursor_mass() - 2000.0).abs() < 1e-6);
        assert_eq!(Spectrum::new(1, 100.0, 0, Vec::new()).max_fragment_charge(), 1);
    }
}
