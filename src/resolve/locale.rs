use crate::error::ConfigError;

/// Map a language tag's primary subtag to its ISO 639-2/T code, which ID3
/// comment frames expect. The table covers the languages the tool is known
/// to be used with; an unknown tag is a hard configuration error.
pub fn comment_language(tag: &str) -> Result<&'static str, ConfigError> {
    let primary = tag
        .split(['-', '_'])
        .next()
        .unwrap_or(tag)
        .to_ascii_lowercase();

    let code = match primary.as_str() {
        "en" => "eng",
        "de" => "deu",
        "fr" => "fra",
        "es" => "spa",
        "it" => "ita",
        "pt" => "por",
        "nl" => "nld",
        "sv" => "swe",
        "da" => "dan",
        "nb" | "no" => "nor",
        "fi" => "fin",
        "pl" => "pol",
        "cs" => "ces",
        "ru" => "rus",
        "uk" => "ukr",
        "ja" => "jpn",
        "ko" => "kor",
        "zh" => "zho",
        _ => {
            return Err(ConfigError::UnknownLanguage {
                tag: tag.to_string(),
            });
        }
    };

    Ok(code)
}
