//! Tests for argument parsing and the load-generate-save runner

#[cfg(test)]
mod tests {
    use clap::Parser;
    use overlapwfc::io::cli::{Cli, Runner};
    use overlapwfc::io::image::{load_template, save_png};
    use overlapwfc::spatial::tiles::Template;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn checkerboard() -> Template {
        let rows: Vec<Vec<[u8; 3]>> = (0..4)
            .map(|row| {
                (0..4)
                    .map(|col| {
                        if (row + col) % 2 == 0 {
                            [0, 0, 0]
                        } else {
                            [255, 255, 255]
                        }
                    })
                    .collect()
            })
            .collect();
        Template::from_rows(&rows).unwrap()
    }

    // Tests defaults when only the template path is given
    // Verified by changing the default output size
    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["overlapwfc", "tiles"]).unwrap();

        assert_eq!(cli.target, PathBuf::from("tiles"));
        assert_eq!(cli.pattern_size, 3);
        assert!(!cli.rotate);
        assert!(cli.periodic);
        assert_eq!(cli.width, 64);
        assert_eq!(cli.height, 64);
        assert_eq!(cli.iterations, -1);
        assert_eq!(cli.seed, None);
        assert!(!cli.sliding);
        assert!(cli.should_show_progress());
        assert_eq!(cli.log, "warn");
        assert_eq!(cli.iteration_limit(), None);
        assert_eq!(cli.output_path(), PathBuf::from("tiles/results/result.png"));
    }

    // Tests every option maps onto the model configuration
    // Verified by swapping width and height in the configuration
    #[test]
    fn test_full_arguments() {
        let cli = Cli::try_parse_from([
            "overlapwfc",
            "tiles",
            "-d",
            "2",
            "-r",
            "--periodic",
            "false",
            "-W",
            "32",
            "-H",
            "16",
            "-i",
            "500",
            "-s",
            "99",
            "--sliding",
            "-o",
            "out/image.png",
            "-q",
        ])
        .unwrap();

        let config = cli.model_config();
        assert_eq!(config.pattern_size, 2);
        assert!(config.include_rotations);
        assert!(!config.periodic);
        assert_eq!(config.output_width, 32);
        assert_eq!(config.output_height, 16);
        assert_eq!(config.iteration_limit, Some(500));
        assert_eq!(cli.seed, Some(99));
        assert!(!cli.should_show_progress());
        assert_eq!(cli.offsets().unwrap().len(), 8);
        assert_eq!(cli.output_path(), PathBuf::from("out/image.png"));
    }

    // Tests negative iteration counts mean no limit
    // Verified by rejecting negative numbers in the parser
    #[test]
    fn test_negative_iterations_unbounded() {
        let cli = Cli::try_parse_from(["overlapwfc", "tiles", "-i", "-1"]).unwrap();

        assert_eq!(cli.iterations, -1);
        assert_eq!(cli.iteration_limit(), None);
        assert_eq!(cli.offsets().unwrap().len(), 4);
    }

    // Tests malformed arguments are reported by the parser
    // Verified by making the target optional
    #[test]
    fn test_parse_errors() {
        assert!(Cli::try_parse_from(["overlapwfc"]).is_err());
        assert!(Cli::try_parse_from(["overlapwfc", "tiles", "--periodic", "maybe"]).is_err());
        assert!(Cli::try_parse_from(["overlapwfc", "tiles", "-d", "x"]).is_err());
    }

    // Tests a run writes a result image next to the templates
    // Verified by writing the output into the working directory
    #[test]
    fn test_runner_writes_default_output() {
        let dir = TempDir::new().unwrap();
        save_png(&checkerboard(), &dir.path().join("board.png")).unwrap();
        let target = dir.path().to_string_lossy().to_string();

        let cli = Cli::try_parse_from([
            "overlapwfc",
            target.as_str(),
            "-d",
            "2",
            "-W",
            "9",
            "-H",
            "7",
            "-s",
            "5",
            "-q",
        ])
        .unwrap();
        let runner = Runner::new(cli);
        let output = runner.run().unwrap();

        assert_eq!(output, dir.path().join("results").join("result.png"));
        let result = load_template(&output).unwrap();
        assert_eq!(result.width(), 9);
        assert_eq!(result.height(), 7);
        assert_eq!(result.format(), checkerboard().format());
        assert_eq!(runner.cli().seed, Some(5));
    }

    // Tests a missing template directory is an error
    // Verified by treating missing paths as empty directories
    #[test]
    fn test_runner_missing_templates() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing").to_string_lossy().to_string();
        let cli = Cli::try_parse_from(["overlapwfc", missing.as_str(), "-q"]).unwrap();

        assert!(Runner::new(cli).run().is_err());
    }
}
