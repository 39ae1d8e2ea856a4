#[cfg(test)]
mod tests {
    use clap::Parser;
    use mtcgen::cli::{handle_port_list, validate_device, Args};
    use mtcgen::Settings;

    #[cfg(feature = "test-mock")]
    #[test]
    fn test_port_list() {
        let ports = handle_port_list();
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0], "Mock Device 1");
        assert_eq!(ports[1], "Mock Device 2");
    }

    #[cfg(feature = "test-mock")]
    #[test]
    fn test_valid_output_device() {
        let ports = handle_port_list();
        assert!(validate_device("Mock Device 2", &ports).is_ok());
    }

    #[test]
    fn test_invalid_output_device_lists_ports() {
        let ports = vec!["Mock Device 1".to_string(), "Mock Device 2".to_string()];
        let err = validate_device("Nonexistent Device", &ports).unwrap_err();
        assert!(err.contains("Nonexistent Device"));
        assert!(err.contains("  - Mock Device 1"));
        assert!(err.contains("  - Mock Device 2"));
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["test"]);
        assert!(!args.list_ports);
        assert!(!args.no_display);
        assert_eq!(args.output_device, None);
        assert_eq!(args.rate, None);
        assert_eq!(args.host_speed, None);
        assert_eq!(args.config, None);
    }

    #[test]
    fn test_args_with_output_device() {
        let args = Args::parse_from(["test", "--output-device", "Mock Device 1", "--rate", "2"]);
        assert_eq!(args.output_device, Some("Mock Device 1".to_string()));
        assert_eq!(args.rate, Some(2));
    }

    #[test]
    fn test_rate_out_of_range_rejected() {
        assert!(Args::try_parse_from(["test", "--rate", "4"]).is_err());
    }

    #[test]
    fn test_negative_host_speed() {
        let args = Args::parse_from(["test", "--host-speed", "-1.0"]);
        assert_eq!(args.host_speed, Some(-1.0));
    }

    #[test]
    fn test_args_override_settings() {
        let args = Args::parse_from([
            "test",
            "--sample-rate",
            "44100",
            "--block-size",
            "256",
            "--zero-position",
            "3600",
            "--jitter-tolerance",
            "4",
        ]);
        let mut settings = Settings::default();
        settings.apply_args(&args);

        assert_eq!(settings.sample_rate, 44100.0);
        assert_eq!(settings.block_size, 256);
        assert_eq!(settings.zero_position, 3600.0);
        assert_eq!(settings.jitter_tolerance, 4);
        assert_eq!(settings.rate, 3, "unset flags keep their value");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_zero_block_size_is_invalid() {
        let args = Args::parse_from(["test", "--block-size", "0"]);
        let mut settings = Settings::default();
        settings.apply_args(&args);
        assert!(settings.validate().is_err());
    }
}
