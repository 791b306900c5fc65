//! Tests for error formatting, source chaining and path context

#[cfg(test)]
mod tests {
    use overlapwfc::ModelError;
    use overlapwfc::io::error::{WithPath, invalid_parameter};
    use std::error::Error;
    use std::path::{Path, PathBuf};

    // Tests I/O failures keep their underlying cause
    // Verified by returning None from source
    #[test]
    fn test_error_source_chain() {
        let error = ModelError::FileSystem {
            path: "/tmp/templates".into(),
            operation: "read directory",
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };

        assert!(error.source().is_some());
        let message = error.to_string();
        assert!(message.contains("read directory"));
        assert!(message.contains("/tmp/templates"));
    }

    // Tests validation errors have no source and name the parameter
    // Verified by omitting the value from the message
    #[test]
    fn test_invalid_parameter_message() {
        let error = invalid_parameter("pattern_size", &0, &"must be between 1 and 255");

        assert!(error.source().is_none());
        let message = error.to_string();
        assert!(message.contains("pattern_size"));
        assert!(message.contains("'0'"));
        assert!(message.contains("must be between 1 and 255"));
    }

    // Tests template and offset errors describe the problem
    // Verified by dropping the template index from the message
    #[test]
    fn test_template_and_offset_messages() {
        let template = ModelError::InvalidTemplate {
            index: 2,
            reason: "has 3 channels but the first template has 4".to_string(),
        };
        let offsets = ModelError::InvalidOffsets {
            reason: "offset (1, 0) has no opposite (-1, 0)".to_string(),
        };

        assert!(template.to_string().contains("template 2"));
        assert!(offsets.to_string().contains("no opposite"));
    }

    // Tests decoding errors become load errors with the caller's path
    // Verified by converting image errors into export errors
    #[test]
    fn test_image_error_with_path() {
        let result: Result<(), image::ImageError> = Err(image::ImageError::IoError(
            std::io::Error::new(std::io::ErrorKind::InvalidData, "truncated"),
        ));

        let error = result.with_path(Path::new("tiles/a.png")).unwrap_err();
        match &error {
            ModelError::ImageLoad { path, .. } => {
                assert_eq!(path, &PathBuf::from("tiles/a.png"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(error.to_string().contains("tiles/a.png"));
    }

    // Tests a known path is not overwritten
    // Verified by always replacing the path
    #[test]
    fn test_with_path_keeps_known_path() {
        let result: Result<(), ModelError> = Err(ModelError::FileSystem {
            path: "first.png".into(),
            operation: "read",
            source: std::io::Error::other("denied"),
        });

        match result.with_path(Path::new("second.png")).unwrap_err() {
            ModelError::FileSystem { path, .. } => assert_eq!(path, PathBuf::from("first.png")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    // Tests successful results pass through untouched
    // Verified by mapping Ok values
    #[test]
    fn test_with_path_ok() {
        let result: Result<u8, std::io::Error> = Ok(4);
        assert_eq!(result.with_path(Path::new("x")).unwrap(), 4);
    }
}
