use std::path::PathBuf;

use tempdir::TempDir;

use crate::{
    core::config::{CodecConfig, Config},
    types::encoding::DecodingOptions,
    CodecContext,
};

fn config_path(dir: &TempDir) -> PathBuf {
    dir.path().join("codec.conf")
}

#[test]
fn config_save_and_load() {
    let dir = TempDir::new("codec_config").unwrap();
    let path = config_path(&dir);

    let mut config = CodecConfig::default();
    config.decoding.max_array_length = 1000;
    config.encoding.cycle_check_depth = 8;
    assert!(config.save(&path).is_ok());

    let loaded = CodecConfig::load::<CodecConfig>(&path).unwrap();
    assert_eq!(config, loaded);
}

#[test]
fn config_partial_yaml_uses_defaults() {
    let config: CodecConfig = serde_yaml::from_str("decoding:\n  max_string_length: 10\n").unwrap();
    assert_eq!(config.decoding.max_string_length, 10);
    assert_eq!(
        config.decoding.max_array_length,
        DecodingOptions::default().max_array_length
    );
    assert_eq!(config.encoding, CodecConfig::default().encoding);
}

#[test]
fn config_invalid_is_not_saved() {
    let dir = TempDir::new("codec_config").unwrap();
    let path = config_path(&dir);

    let mut config = CodecConfig::default();
    config.decoding.max_decoding_depth = 0;
    assert!(!config.is_valid());
    assert!(config.save(&path).is_err());
    assert!(!path.exists());

    let mut config = CodecConfig::default();
    config.encoding.max_encoding_depth = 0;
    assert!(!config.is_valid());
}

#[test]
fn config_load_missing_file() {
    let dir = TempDir::new("codec_config").unwrap();
    assert!(CodecConfig::load::<CodecConfig>(&config_path(&dir)).is_err());
}

#[test]
fn config_limits_reach_context() {
    let mut config = CodecConfig::default();
    config.decoding.max_string_length = 3;
    config.encoding.max_encoding_depth = 10;
    let context = CodecContext::from_config(&config);
    assert_eq!(context.decoding_options().max_string_length, 3);
    assert_eq!(context.encoding_options().max_encoding_depth, 10);

    let bytes = context.encode(&String::from("abcd")).unwrap();
    let err = context.decode::<String>(&bytes).unwrap_err();
    assert_eq!(err.kind(), crate::types::ErrorKind::LimitExceeded);
}
