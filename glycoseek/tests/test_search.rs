use std::collections::HashSet;

use mzpeaks::CentroidPeak;

use glycoseek::glycan::{GlycanState, StructureKind, SubsetCategory, BRANCH_COUNT};
use glycoseek::mass::{mass_charge_ratio, neutral_mass, peptide_mass, ION_MASS};
use glycoseek::monosaccharide::{Composition, HEX, HEXNAC};
use glycoseek::peptide::FragmentMasses;
use glycoseek::{
    build, decoy_dispatch, dispatch, CoElution, GlycanBounds, GlycanDatabase, PrecursorMatcher,
    ScoreType, SearchParameters, Spectrum, Tolerance,
};

fn glycopeptide_spectrum(database: &GlycanDatabase, scan: usize, peptide: &str, glycan: &str) -> Spectrum {
    let pep_mass = peptide_mass(peptide).unwrap();
    let glycan_mass = database.glycan_mass(glycan).unwrap();
    let b1 = FragmentMasses::new(peptide, 2).unwrap().without_glycan[0];
    let peaks = vec![
        CentroidPeak::new(mass_charge_ratio(HEXNAC, 1), 50.0, 0),
        CentroidPeak::new(mass_charge_ratio(b1, 1), 10.0, 1),
        CentroidPeak::new(mass_charge_ratio(HEXNAC + HEX, 1), 20.0, 2),
        CentroidPeak::new(mass_charge_ratio(pep_mass + 2.0 * HEXNAC, 2), 15.0, 3),
    ];
    Spectrum::new(scan, mass_charge_ratio(pep_mass + glycan_mass, 3), 3, peaks)
}

#[test_log::test]
fn test_dispatch_end_to_end() {
    let database = build(GlycanBounds::new(4, 5, 1, 0, 0).unwrap());
    let peptides = vec!["AANGTK".to_string(), "LCNVSK".to_string()];
    let glycan = "GlcNAc-4-Man-3-";
    let mut spectra: Vec<Spectrum> = (0..5)
        .map(|i| glycopeptide_spectrum(&database, 100 + i, "AANGTK", glycan))
        .collect();
    spectra.push(Spectrum::new(200, 300.0, 2, vec![CentroidPeak::new(204.08, 10.0, 0)]));

    let params = SearchParameters::default()
        .with_threads(2)
        .with_bounds(GlycanBounds::new(4, 5, 1, 0, 0).unwrap())
        .with_tolerances(Tolerance::PPM(10.0), Tolerance::Da(0.01));

    let mut output = dispatch(&database, &peptides, &spectra, params).unwrap();
    assert_eq!(output.progress.spectra, 6);
    assert_eq!(output.progress.precursor_matched, 5);
    assert_eq!(output.progress.spectra_with_hits, 5);
    assert_eq!(output.len(), 5);
    let mut scans: Vec<usize> = output.results.iter().map(|r| r.scan).collect();
    scans.sort();
    assert_eq!(scans, vec![100, 101, 102, 103, 104]);
    for result in output.results.iter() {
        assert_eq!(result.peptide, "AANGTK");
        assert_eq!(result.glycan, glycan);
        assert_eq!(result.site, 2);
        assert!(result.raw_score() > 0.0);
        assert!((result.extra_score(ScoreType::Precursor) - 1.0).abs() < 1e-6);
    }

    // five adjacent scans land in five ranges that are not neighbors
    CoElution::default().update(&mut output.results);
    for result in output.results.iter() {
        assert!((result.extra_score(ScoreType::Elution) - 0.2).abs() < 1e-12);
    }

    let decoys = decoy_dispatch(&database, &peptides, &spectra, params.with_threads(3)).unwrap();
    assert_eq!(decoys.progress.spectra, 6);
    assert!(decoys.len() >= 5);
}

#[test_log::test]
fn test_dispatch_empty() {
    let database = build(GlycanBounds::new(2, 3, 1, 0, 0).unwrap());
    let peptides = vec!["AANGTK".to_string()];
    for threads in [1, 4] {
        let params = SearchParameters::default().with_threads(threads);
        assert!(dispatch(&database, &peptides, &[], params).unwrap().is_empty());
        assert!(decoy_dispatch(&database, &peptides, &[], params).unwrap().is_empty());
    }
}

#[test]
fn test_dispatch_rejects_zero_fragment_tolerance() {
    let database = build(GlycanBounds::new(4, 5, 1, 0, 0).unwrap());
    let peptides = vec!["AANGTK".to_string()];
    let spectra = vec![glycopeptide_spectrum(&database, 1, "AANGTK", "GlcNAc-4-Man-3-")];
    let params = SearchParameters::default().with_tolerances(Tolerance::PPM(10.0), Tolerance::Da(0.0));
    assert!(params.validate().is_err());
    assert!(dispatch(&database, &peptides, &spectra, params).is_err());
    assert!(decoy_dispatch(&database, &peptides, &spectra, params).is_err());
}

#[test]
fn test_precursor_isotope_window() {
    let database = build(GlycanBounds::new(4, 5, 1, 0, 0).unwrap());
    let peptides = vec!["AANGTK".to_string()];
    let glycan = "GlcNAc-4-Man-3-";
    let mut matcher = PrecursorMatcher::new(Tolerance::PPM(10.0), &database.isomers).unwrap();
    assert_eq!(matcher.init(&peptides), 1);
    let mass = peptide_mass("AANGTK").unwrap() + database.isomers.mass(glycan).unwrap();

    let has_match = |target: f64, charge: i32, isotope_count: u32| {
        matcher
            .match_precursor(target, charge, isotope_count)
            .glycans("AANGTK")
            .any(|g| g == glycan)
    };

    for charge in 1..=3 {
        // the precursor was picked `shift` isotope peaks above the monoisotopic peak
        for shift in 0..=2u32 {
            let mz = mass_charge_ratio(mass, charge) + shift as f64 * ION_MASS / charge as f64;
            let target = neutral_mass(mz, charge);
            for isotope_count in 0..=3u32 {
                assert_eq!(
                    has_match(target, charge, isotope_count),
                    shift <= isotope_count,
                    "charge {charge} shift {shift} isotope count {isotope_count}"
                );
            }
        }
    }
}

#[test]
fn test_enumeration_determinism() {
    let bounds = GlycanBounds::new(5, 6, 1, 1, 0).unwrap();
    let first = build(bounds);
    let second = build(bounds);
    assert_eq!(first, second);
}

#[test]
fn test_monotonic_subsets() {
    let bounds = GlycanBounds::new(5, 6, 1, 1, 0).unwrap();
    let database = build(bounds);
    let kind = StructureKind::default();
    for category in SubsetCategory::ALL {
        let store = database.subsets(category);
        for (parent, masses) in store.iter() {
            for sugar in glycoseek::glycan::GlycanBuilder::DEFAULT_CANDIDATES {
                for child in kind.grow(parent, sugar) {
                    if !bounds.admits(&child.composition()) {
                        continue;
                    }
                    let child_masses = store.get(&child).unwrap();
                    assert!(child_masses.is_superset(masses), "{parent} -> {child}");
                }
            }
        }
    }
}

#[test]
fn test_composition_mass_consistency() {
    let database = build(GlycanBounds::new(5, 6, 1, 1, 0).unwrap());
    for (name, group) in database.isomers.iter() {
        let parsed: Composition = name.parse().unwrap();
        assert_eq!(&parsed.name(), name);
        assert!((parsed.mass() - group.mass).abs() < 1e-9, "{name}");
        for isomer in group.isomers.iter() {
            assert_eq!(isomer.composition(), parsed);
        }
    }

    let name = "GlcNAc-5-Man-3-Gal-3-Fuc-1-NeuAc-1-";
    let group = database.isomers.get(name).unwrap();
    let parsed = Composition::interpret(name).unwrap();
    assert_eq!(parsed.hexnac(), 5);
    assert_eq!(parsed.hex(), 6);
    for isomer in group.isomers.iter() {
        assert_eq!(isomer.composition(), parsed);
        assert!((isomer.mass() - parsed.mass()).abs() < 1e-9);
    }
}

#[test]
fn test_branch_permutations_are_unique() {
    let database = build(GlycanBounds::new(6, 6, 2, 2, 0).unwrap());
    let mut seen: HashSet<(Vec<u8>, Vec<[u8; 5]>)> = HashSet::new();
    for (_, group) in database.isomers.iter() {
        for isomer in group.isomers.iter() {
            let core = isomer.table()[..4].to_vec();
            let mut branches: Vec<[u8; 5]> = (0..BRANCH_COUNT).map(|i| isomer.branch(i)).collect();
            branches.sort_by(|a, b| b.cmp(a));
            assert!(seen.insert((core, branches)), "{}", isomer.id());
        }
    }
}

#[test]
fn test_root_round_trip() {
    let root = GlycanState::root();
    let parsed: GlycanState = root.id().parse().unwrap();
    assert_eq!(parsed, root);
    assert!(root.composition().is_empty());
}
