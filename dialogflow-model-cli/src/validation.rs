use std::path::Path;
use unic_langid::LanguageIdentifier;

/// Validate the locale using unic-langid (same parsing as the lib crate)
pub fn validate_locale(locale: &str) -> Result<(), String> {
    if locale.trim().is_empty() {
        return Err("Locale cannot be empty".to_string());
    }

    locale
        .parse::<LanguageIdentifier>()
        .map(|_| ())
        .map_err(|_| {
            format!(
                "Invalid locale: {}. Expected a BCP 47 language identifier such as en-US",
                locale
            )
        })
}

/// Validate that the agent directory exists
pub fn validate_agent_dir(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        return Err(format!("Directory does not exist: {}", path));
    }

    if !path_obj.is_dir() {
        return Err(format!("Path is not a directory: {}", path));
    }

    Ok(())
}

/// Validate that the model file exists
pub fn validate_model_file(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if !path_obj.is_file() {
        return Err(format!("Model file does not exist: {}", path));
    }

    Ok(())
}
