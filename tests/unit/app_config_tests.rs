/*!
 * Tests for application configuration functionality
 */

use yadtwai::app_config::{Config, LogLevel, SourceKind, TranslationProvider};
use crate::common;

fn valid_config() -> Config {
    let mut config = Config::default();
    config.source.owner = "acme".to_string();
    config.source.repo = "handbook".to_string();
    config.translation.provider = TranslationProvider::Ollama;
    config
}

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.language_code, "fr");
    assert_eq!(config.doc_dir, "docs");
    assert_eq!(config.source.kind, SourceKind::GitHub);
    assert_eq!(config.source.path, "docs");
    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);
    assert_eq!(config.translation.get_model(), "gpt-3.5-turbo-1106");
    assert_eq!(config.translation.common.max_history_messages, 10);
    assert_eq!(config.translation.common.retry_count, 5);
    assert!(config.translation.common.system_prompt.is_empty());
    assert!(!config.retry_failed_sections);
    assert_eq!(config.log_level, LogLevel::Info);

    let anthropic = config
        .translation
        .get_provider_config(&TranslationProvider::Anthropic)
        .expect("Anthropic provider config should exist");
    assert_eq!(anthropic.rate_limit, Some(45));
}

#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = valid_config();
    assert!(config.validate().is_ok());

    config.language_code = "xx".to_string();
    assert!(config.validate().is_err());
    config.language_code = "pt-BR".to_string();
    assert!(config.validate().is_ok());

    config.source.repo = String::new();
    assert!(config.validate().is_err());
    config.source.repo = "handbook".to_string();

    config.source.kind = SourceKind::Local;
    assert!(config.validate().is_err(), "local source needs a root");
    config.source.local_root = Some("./docs".into());
    assert!(config.validate().is_ok());

    config.max_concurrent_files = Some(0);
    assert!(config.validate().is_err());
    config.max_concurrent_files = Some(3);
    assert_eq!(config.concurrency(), 3);

    config.translation.common.max_history_messages = 1;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_validation_withHostedProviderKey_shouldPass() {
    let mut config = valid_config();
    config.translation.provider = TranslationProvider::Anthropic;
    config.translation.active_provider_config_mut().api_key = "sk-test".to_string();

    assert!(config.validate().is_ok());
    assert_eq!(config.translation.get_api_key(), "sk-test");
}

#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "language_code": "de",
        "source": { "owner": "acme", "repo": "handbook" },
        "translation": { "provider": "ollama", "common": { "temperature": 0.2 } }
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.language_code, "de");
    assert_eq!(config.source.path, "docs");
    assert_eq!(config.prefix_to_remove, "docs/");
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.translation.common.temperature, 0.2);
    assert_eq!(config.translation.common.max_retry_delay_ms, 60_000);
    // No provider list in the file: defaults come from the provider type
    assert_eq!(config.translation.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.translation.get_timeout_secs(), 120);
    assert_eq!(config.translation.get_rate_limit(), None);
}

#[test]
fn test_languageName_shouldPreferExplicitName() {
    let mut config = valid_config();
    config.language_code = "pt-BR".to_string();
    assert_eq!(config.language_name().unwrap(), "Portuguese (BR)");

    config.language = Some("Brazilian Portuguese".to_string());
    assert_eq!(config.language_name().unwrap(), "Brazilian Portuguese");
}

#[test]
fn test_activeProviderConfigMut_withMissingEntry_shouldCreateIt() {
    let mut config = valid_config();
    config.translation.available_providers.clear();
    config.translation.provider = TranslationProvider::LMStudio;

    config.translation.active_provider_config_mut().model = "qwen2.5-7b".to_string();

    assert_eq!(config.translation.available_providers.len(), 1);
    assert_eq!(config.translation.get_model(), "qwen2.5-7b");
    assert_eq!(config.translation.get_endpoint(), "http://localhost:1234/v1");
}

#[test]
fn test_saveAndLoad_shouldRoundTripThroughFile() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("conf.json");

    let mut config = valid_config();
    config.retry_failed_sections = true;
    config.save(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert!(loaded.retry_failed_sections);
    assert_eq!(loaded.source.owner, "acme");
    assert_eq!(loaded.store_path(), config.save_path.join("acme").join("handbook.json"));
}

#[test]
fn test_providerFromStr_shouldAcceptLowercaseNames() {
    assert_eq!("LMStudio".parse::<TranslationProvider>().unwrap(), TranslationProvider::LMStudio);
    assert_eq!(TranslationProvider::OpenAI.to_string(), "openai");
    assert!("gemini".parse::<TranslationProvider>().is_err());
}
