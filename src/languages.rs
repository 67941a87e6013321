//! ISO-639 language code to English name mapping
//!
//! Model language tables typically carry short ISO codes; this table maps
//! them to display names for logs and CLI output. Codes not in the table
//! (including full labels like "english") pass through unchanged via
//! [`display_name`].

/// Look up the English name for an ISO-639 language code
pub fn language_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "ab" => "Abkhazian",
        "af" => "Afrikaans",
        "am" => "Amharic",
        "ar" => "Arabic",
        "as" => "Assamese",
        "az" => "Azerbaijani",
        "ba" => "Bashkir",
        "be" => "Belarusian",
        "bg" => "Bulgarian",
        "bn" => "Bengali",
        "bo" => "Tibetan",
        "br" => "Breton",
        "bs" => "Bosnian",
        "ca" => "Catalan",
        "ceb" => "Cebuano",
        "cs" => "Czech",
        "cy" => "Welsh",
        "da" => "Danish",
        "de" => "German",
        "el" => "Greek",
        "en" => "English",
        "eo" => "Esperanto",
        "es" => "Spanish",
        "et" => "Estonian",
        "eu" => "Basque",
        "fa" => "Persian",
        "fi" => "Finnish",
        "fo" => "Faroese",
        "fr" => "French",
        "gl" => "Galician",
        "gn" => "Guarani",
        "gu" => "Gujarati",
        "gv" => "Manx",
        "ha" => "Hausa",
        "haw" => "Hawaiian",
        "hi" => "Hindi",
        "hr" => "Croatian",
        "ht" => "Haitian",
        "hu" => "Hungarian",
        "hy" => "Armenian",
        "ia" => "Interlingua",
        "id" => "Indonesian",
        "is" => "Icelandic",
        "it" => "Italian",
        "iw" => "Hebrew",
        "ja" => "Japanese",
        "jw" => "Javanese",
        "ka" => "Georgian",
        "kk" => "Kazakh",
        "km" => "Central Khmer",
        "kn" => "Kannada",
        "ko" => "Korean",
        "la" => "Latin",
        "lb" => "Luxembourgish",
        "ln" => "Lingala",
        "lo" => "Lao",
        "lt" => "Lithuanian",
        "lv" => "Latvian",
        "mg" => "Malagasy",
        "mi" => "Maori",
        "mk" => "Macedonian",
        "ml" => "Malayalam",
        "mn" => "Mongolian",
        "mr" => "Marathi",
        "ms" => "Malay",
        "mt" => "Maltese",
        "my" => "Burmese",
        "ne" => "Nepali",
        "nl" => "Dutch",
        "nn" => "Norwegian Nynorsk",
        "no" => "Norwegian",
        "oc" => "Occitan",
        "pa" => "Panjabi",
        "pl" => "Polish",
        "ps" => "Pushto",
        "pt" => "Portuguese",
        "ro" => "Romanian",
        "ru" => "Russian",
        "sa" => "Sanskrit",
        "sco" => "Scots",
        "sd" => "Sindhi",
        "si" => "Sinhala",
        "sk" => "Slovak",
        "sl" => "Slovenian",
        "sn" => "Shona",
        "so" => "Somali",
        "sq" => "Albanian",
        "sr" => "Serbian",
        "su" => "Sundanese",
        "sv" => "Swedish",
        "sw" => "Swahili",
        "ta" => "Tamil",
        "te" => "Telugu",
        "tg" => "Tajik",
        "th" => "Thai",
        "tk" => "Turkmen",
        "tl" => "Tagalog",
        "tr" => "Turkish",
        "tt" => "Tatar",
        "uk" => "Ukrainian",
        "ur" => "Urdu",
        "uz" => "Uzbek",
        "vi" => "Vietnamese",
        "war" => "Waray",
        "yi" => "Yiddish",
        "yo" => "Yoruba",
        "zh" => "Chinese",
        _ => return None,
    };
    Some(name)
}

/// Display name for a label: the mapped English name when the label is a
/// known ISO code, otherwise the label itself
pub fn display_name(label: &str) -> &str {
    language_name(label).unwrap_or(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(language_name("en"), Some("English"));
        assert_eq!(language_name("ru"), Some("Russian"));
        assert_eq!(language_name("ceb"), Some("Cebuano"));
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(language_name("xx"), None);
    }

    #[test]
    fn test_display_name_passthrough() {
        assert_eq!(display_name("en"), "English");
        assert_eq!(display_name("english"), "english");
    }
}
