use std::path::Path;

use tracing::{debug, info};

use crate::readout::common::error::{ReadoutError, Result};
use crate::readout::config::types::ReaderConfig;

/// Loads and validates a `ReaderConfig` from a TOML file. Keys left out of
/// the file keep their default value.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ReaderConfig> {
    let path = path.as_ref();
    debug!("Loading reader config from: {}", path.display());

    let text = std::fs::read_to_string(path)
        .map_err(|e| ReadoutError::InputRead(format!("{}: {}", path.display(), e)))?;
    let config: ReaderConfig = toml::from_str(&text)?;
    config.validate()?;

    info!(
        "Loaded reader config from {} (markers removed: {}, CDS: {})",
        path.display(),
        config.remove_markers,
        config.cds
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::readout::frame::SignalPolarity;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(
            r#"
            remove_markers = true
            marker_positions = [67, 66, 1, 0]
            polarity = 1
            max_events = 100
            cds_collection = "cds"
            "#,
        );

        let config = load_config(file.path()).unwrap();

        assert!(config.remove_markers);
        assert_eq!(config.polarity, SignalPolarity::Positive);
        assert_eq!(config.max_events, Some(100));
        assert_eq!(config.cds_collection, "cds");
        assert_eq!(config.zs_collection, "zsdata");
        assert_eq!(config.sensor_width, 264);
        assert_eq!(config.marker_columns().unwrap().as_slice(), &[0, 1, 66, 67]);
    }

    #[test]
    fn test_bad_polarity_rejected() {
        let file = write_config("polarity = 3\n");
        assert!(matches!(load_config(file.path()), Err(ReadoutError::ConfigParse(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let file = write_config("remove_marker = true\n");
        assert!(matches!(load_config(file.path()), Err(ReadoutError::ConfigParse(_))));
    }

    #[test]
    fn test_semantic_validation_runs() {
        let file = write_config("sparse_pixel_type = 4\n");
        assert!(matches!(load_config(file.path()), Err(ReadoutError::Configuration(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_config("/nonexistent/reader.toml"),
            Err(ReadoutError::InputRead(_))
        ));
    }
}
