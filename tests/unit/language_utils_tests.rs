/*!
 * Tests for language utility functions
 */

use bisub::language_utils::{
    get_language_name, language_codes_match, normalize_to_part1_or_part2t, normalize_to_part2t,
    validate_language_code, LanguageCodeType,
};

/// Test validation of language codes
#[test]
fn test_validate_language_code_withValidCodes_shouldReturnCorrectType() {
    assert_eq!(validate_language_code("en").unwrap(), LanguageCodeType::Part1);
    assert_eq!(validate_language_code("fr").unwrap(), LanguageCodeType::Part1);

    assert_eq!(validate_language_code("eng").unwrap(), LanguageCodeType::Part2T);
    assert_eq!(validate_language_code("fra").unwrap(), LanguageCodeType::Part2T);

    assert_eq!(validate_language_code("fre").unwrap(), LanguageCodeType::Part2B);
    assert_eq!(validate_language_code("ger").unwrap(), LanguageCodeType::Part2B);

    // Whitespace and case
    assert_eq!(validate_language_code(" EN ").unwrap(), LanguageCodeType::Part1);
    assert_eq!(validate_language_code("ENG").unwrap(), LanguageCodeType::Part2T);
}

#[test]
fn test_validate_language_code_withInvalidCodes_shouldFail() {
    assert!(validate_language_code("").is_err());
    assert!(validate_language_code("e").is_err());
    assert!(validate_language_code("12").is_err());
    assert!(validate_language_code("english").is_err());
}

#[test]
fn test_normalize_to_part2t_withValidCodes_shouldNormalizeCorrectly() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");
    assert_eq!(normalize_to_part2t(" FR ").unwrap(), "fra");
    assert!(normalize_to_part2t("zz").is_err());
}

#[test]
fn test_normalize_to_part1_or_part2t_withValidCodes_shouldPreferTwoLetterCode() {
    assert_eq!(normalize_to_part1_or_part2t("eng").unwrap(), "en");
    assert_eq!(normalize_to_part1_or_part2t("fre").unwrap(), "fr");
    assert_eq!(normalize_to_part1_or_part2t("DE").unwrap(), "de");
}

#[test]
fn test_language_codes_match_withEquivalentCodes_shouldReturnTrue() {
    assert!(language_codes_match("en", "eng"));
    assert!(language_codes_match("fre", "fr"));
    assert!(language_codes_match("ger", "deu"));
}

#[test]
fn test_language_codes_match_withDifferentOrInvalidCodes_shouldReturnFalse() {
    assert!(!language_codes_match("en", "fr"));
    assert!(!language_codes_match("zz", "zz"));
    assert!(!language_codes_match("", "en"));
}

#[test]
fn test_get_language_name_withValidCodes_shouldReturnEnglishName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("fre").unwrap(), "French");
    assert!(get_language_name("zz").is_err());
}
