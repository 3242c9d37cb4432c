//! Creative profile vocabulary and normalization.

use std::collections::HashSet;

use crate::error::CoreError;

/// Maximum number of skills kept on a profile.
pub const MAX_SKILLS: usize = 30;

text_enum! {
    /// Category tags a creative professional can list under.
    CreativeCategory("category") {
        Photography => "PHOTOGRAPHY",
        Videography => "VIDEOGRAPHY",
        Music => "MUSIC",
        Dj => "DJ",
        GraphicDesign => "GRAPHIC_DESIGN",
        Makeup => "MAKEUP",
        Decoration => "DECORATION",
        Catering => "CATERING",
        Entertainment => "ENTERTAINMENT",
        Writing => "WRITING",
        Other => "OTHER",
    }
}

/// Parse category tags, dropping duplicates while keeping first-seen order.
pub fn parse_categories<S: AsRef<str>>(raw: &[S]) -> Result<Vec<CreativeCategory>, CoreError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for tag in raw {
        let category: CreativeCategory = tag.as_ref().trim().to_uppercase().parse()?;
        if seen.insert(category) {
            out.push(category);
        }
    }
    Ok(out)
}

/// Trim skills, drop blanks and case-insensitive duplicates, cap the list.
pub fn normalize_skills<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .take(MAX_SKILLS)
        .map(str::to_string)
        .collect()
}

/// Validate an hourly rate.
pub fn validate_rate(rate: Option<f64>) -> Result<(), CoreError> {
    match rate {
        Some(r) if !r.is_finite() || r < 0.0 => Err(CoreError::Validation(
            "hourlyRate must be a non-negative number".into(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_case_insensitive_and_deduplicated() {
        let parsed = parse_categories(&["photography", "DJ", "Photography"]).unwrap();
        assert_eq!(
            parsed,
            vec![CreativeCategory::Photography, CreativeCategory::Dj]
        );
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(parse_categories(&["JUGGLING"]).is_err());
    }

    #[test]
    fn skills_are_trimmed_and_deduplicated() {
        let skills = normalize_skills(&[" Lighting ", "lighting", "", "Drone"]);
        assert_eq!(skills, vec!["Lighting".to_string(), "Drone".to_string()]);
    }

    #[test]
    fn negative_rate_is_rejected() {
        assert!(validate_rate(Some(-5.0)).is_err());
        assert!(validate_rate(Some(0.0)).is_ok());
    }
}
