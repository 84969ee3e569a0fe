pub mod defaults;
pub mod model;

pub use model::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::ClipFormat;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(settings.history.poll_interval_ms, 500);
        assert_eq!(settings.display.max_menu_item_title_length, 50);
        assert_eq!(settings.history.store_types, ClipFormat::ALL.to_vec());
        assert!(settings.history.excluded_application_identifiers.is_empty());
    }

    #[test]
    fn partial_json_fills_missing_sections_with_defaults() {
        let json = r#"{ "schema_version": 1, "history": { "max_history_size": 3 } }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.history.max_history_size, 3);
        assert_eq!(settings.history.poll_interval_ms, 500);
        assert_eq!(settings.paste, PasteSettings::default());
    }
}
