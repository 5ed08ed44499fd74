/// Surname used when a student has none.
const DEFAULT_SURNAME: &str = "default";

/// Build the portrait lookup key, `<surname>_<initial>` in lowercase.
///
/// The Patil twins share a surname and an initial, so their key carries the
/// whole first name. Leanne's portrait is stored under `default_image`.
pub fn image_key(first_name: &str, last_name: Option<&str>) -> String {
    let surname = last_name.unwrap_or(DEFAULT_SURNAME);

    let suffix = match first_name {
        "Padma" | "Parvati" => first_name.to_string(),
        "Leanne" => "image".to_string(),
        _ => first_name.chars().next().map(String::from).unwrap_or_default(),
    };

    format!("{}_{}", surname, suffix).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_key_default() {
        assert_eq!(image_key("Hermione", Some("Granger")), "granger_h");
        assert_eq!(image_key("Justin", Some("Finch-Fletchley")), "finch-fletchley_j");
    }

    #[test]
    fn test_image_key_overrides() {
        assert_eq!(image_key("Padma", Some("Patil")), "patil_padma");
        assert_eq!(image_key("Parvati", Some("Patil")), "patil_parvati");
        assert_eq!(image_key("Leanne", None), "default_image");
    }

    #[test]
    fn test_image_key_missing_surname() {
        assert_eq!(image_key("Luna", None), "default_l");
        assert_eq!(image_key("", None), "default_");
    }
}
