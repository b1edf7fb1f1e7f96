use clap::{CommandFactory, FromArgMatches};
use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};

use glycoseek::Tolerance;
use glycoseeker::{explicit_arguments, GlycoSeeker};

#[test_log::test]
#[test_log(default_log_filter = "debug")]
fn test_configured() {
    let mut config = Figment::new();
    config = config.merge(Toml::file_exact("tests/data/configured.toml"));
    let driver: glycoseeker::GlycoSeeker = config.extract().unwrap();
    assert_eq!(driver.threads, 2);
    assert_eq!(driver.hexnac, 4);
    assert_eq!(driver.fragment_tolerance, Tolerance::Da(0.01));
    assert!(driver.decoy_file.is_none());
    driver.main().unwrap();
}

#[test_log::test]
fn test_partial_config_uses_defaults() {
    let config = Figment::new().merge(Toml::string(
        r#"
spectra_file = "tests/data/glycopeptide.mgf"
peptide_file = "tests/data/peptides.txt"
precursor_tolerance = "20ppm"
"#,
    ));
    let driver: glycoseeker::GlycoSeeker = config.extract().unwrap();
    assert_eq!(driver.precursor_tolerance, Tolerance::PPM(20.0));
    assert_eq!(driver.neuac, 4);
    assert_eq!(driver.output_file, "-");
    let params = driver.parameters().unwrap();
    assert_eq!(params.isotope_count, 0);
}

#[test]
fn test_command_line_overrides_config() {
    let matches = GlycoSeeker::command().get_matches_from([
        "glycoseeker",
        "tests/data/glycopeptide.mgf",
        "-p",
        "tests/data/peptides.txt",
        "--hexnac",
        "6",
        "-m",
        "5ppm",
    ]);
    let args = GlycoSeeker::from_arg_matches(&matches).unwrap();
    let explicit = explicit_arguments(&matches, &args);
    assert!(explicit.contains_key("hexnac"));
    assert!(explicit.contains_key("spectra_file"));
    assert!(!explicit.contains_key("hex"));
    assert!(!explicit.contains_key("decoy_file"));

    let config = Figment::new()
        .merge(Serialized::defaults(&args))
        .merge(Toml::string(
            r#"
hexnac = 3
hex = 7
precursor_tolerance = "20ppm"
fragment_tolerance = "0.02da"
"#,
        ))
        .merge(Serialized::defaults(explicit));
    let driver: GlycoSeeker = config.extract().unwrap();
    assert_eq!(driver.hexnac, 6);
    assert_eq!(driver.hex, 7);
    assert_eq!(driver.precursor_tolerance, Tolerance::PPM(5.0));
    assert_eq!(driver.fragment_tolerance, Tolerance::Da(0.02));
}
