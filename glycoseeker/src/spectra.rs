use std::io;
use std::path::Path;
use std::time::Instant;

use mzdata::prelude::*;
use mzdata::spectrum::{MultiLayerSpectrum, SignalContinuity};
use mzpeaks::CentroidPeak;
use tracing::{debug, info, trace, warn};

use glycoseek::Spectrum;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub ms1_spectra: usize,
    pub msn_spectra: usize,
    pub missing_precursor: usize,
    pub unusable_peaks: usize,
}

fn centroid_peaks(scan: &mut MultiLayerSpectrum) -> Option<Vec<CentroidPeak>> {
    match scan.signal_continuity() {
        SignalContinuity::Unknown => None,
        SignalContinuity::Centroid => scan
            .try_build_centroids()
            .ok()
            .map(|peaks| peaks.iter().cloned().collect()),
        SignalContinuity::Profile => {
            if let Err(e) = scan.pick_peaks(1.0) {
                warn!("Failed to pick peaks for {}: {e}", scan.id());
                return None;
            }
            scan.description_mut().signal_continuity = SignalContinuity::Centroid;
            scan.peaks
                .as_ref()
                .map(|peaks| peaks.iter().cloned().collect())
        }
    }
}

/// Convert a tandem scan with a charged precursor into a [`Spectrum`]
pub fn to_spectrum(mut scan: MultiLayerSpectrum, progress: &mut LoadProgress) -> Option<Spectrum> {
    if scan.ms_level() < 2 {
        progress.ms1_spectra += 1;
        return None;
    }
    progress.msn_spectra += 1;
    let (precursor_mz, precursor_charge) = match scan.precursor() {
        Some(prec) => (prec.ion().mz, prec.charge()),
        None => (0.0, None),
    };
    let Some(precursor_charge) = precursor_charge.filter(|z| *z > 0) else {
        trace!("Skipping {} without a precursor charge", scan.id());
        progress.missing_precursor += 1;
        return None;
    };
    let Some(peaks) = centroid_peaks(&mut scan) else {
        debug!("Skipping {}, its peaks could not be centroided", scan.id());
        progress.unusable_peaks += 1;
        return None;
    };
    Some(Spectrum::new(
        scan.index(),
        precursor_mz,
        precursor_charge,
        peaks,
    ))
}

/// Read every usable tandem spectrum from `path`, in any format [`mzdata::MZReader`]
/// recognizes
pub fn load_spectra<P: AsRef<Path>>(path: P) -> io::Result<Vec<Spectrum>> {
    let start = Instant::now();
    let reader = mzdata::MZReader::open_path(path.as_ref())?;
    let mut progress = LoadProgress::default();
    let spectra: Vec<Spectrum> = reader
        .filter_map(|scan| to_spectrum(scan, &mut progress))
        .collect();
    info!(
        "Read {} tandem spectra ({} MS1, {} MSn, {} without a precursor charge) in {:0.3?}",
        spectra.len(),
        progress.ms1_spectra,
        progress.msn_spectra,
        progress.missing_precursor,
        start.elapsed()
    );
    if progress.unusable_peaks > 0 {
        warn!("{} spectra had peaks that could not be used", progress.unusable_peaks);
    }
    Ok(spectra)
}
