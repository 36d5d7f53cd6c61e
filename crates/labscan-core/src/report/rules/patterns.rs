//! Common regex patterns for lab report extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Normalization
    pub static ref SPACE_BEFORE_PUNCT: Regex = Regex::new(r" +([,.])").unwrap();

    pub static ref SPLIT_DECIMAL: Regex = Regex::new(r"(\d)([.,]) (\d)").unwrap();

    // Numbers
    pub static ref STRICT_DECIMAL: Regex = Regex::new(
        r"^[-+]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)$"
    ).unwrap();

    pub static ref NUMBER_TOKEN: Regex = Regex::new(
        r"[-+]?[0-9]+(?:[.,][0-9]+)?"
    ).unwrap();

    // Page headers written by the OCR export ("=== Strana 2 ===")
    pub static ref PAGE_HEADER: Regex = Regex::new(
        r"(?im)^[ \t]*=+[ \t]*(?:strana|stránka|page)[ \t]+\d+[ \t]*=+[ \t]*$"
    ).unwrap();

    // Dates
    pub static ref DATE_TOKEN: Regex = Regex::new(
        r"\b(\d{1,2}\.\s?\d{1,2}\.\s?\d{2,4}|\d{4}-\d{1,2}-\d{1,2}|\d{1,2}/\d{1,2}/\d{2,4})\b"
    ).unwrap();

    pub static ref DATE_DMY: Regex = Regex::new(
        r"^(\d{1,2})[./](\d{1,2})[./](\d{4}|\d{2})$"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"^(\d{4})-(\d{1,2})-(\d{1,2})$"
    ).unwrap();

    pub static ref LABELED_DATE: Regex = Regex::new(
        r"(?i)\b(?:datum(?:\s+(?:a\s+čas\s+)?(?:odběru|vyšetření|přijetí|tisku|vydání|zprávy|výsledku))?|date(?:\s+of\s+(?:collection|report|issue))?|collected|vydáno)\s*:?\s*(\d{1,2}\.\s?\d{1,2}\.\s?\d{2,4}|\d{4}-\d{1,2}-\d{1,2}|\d{1,2}/\d{1,2}/\d{2,4})"
    ).unwrap();

    pub static ref BIRTH_LABEL: Regex = Regex::new(
        r"(?i)naroz|\bnar\.|birth|\bdob\b"
    ).unwrap();

    // Patient
    pub static ref PATIENT_LABELED: Regex = Regex::new(
        r"(?im)(?:\b(?:jméno\s+a\s+příjmení|příjmení\s+a\s+jméno|jméno\s+pacienta|pacient(?:ka)?|patient(?:\s+name)?|jméno)|^[ \t]*name)[ \t]*:[ \t]*([^\n]+)"
    ).unwrap();

    pub static ref PATIENT_HONORIFIC: Regex = Regex::new(
        r"\b(?i:pan|paní|mr\.|mrs\.|ms\.)\s+(\p{Lu}\p{Ll}+(?:[ \t]+\p{Lu}\p{Ll}+)+)"
    ).unwrap();

    // Doctor
    pub static ref DOCTOR_LABELED: Regex = Regex::new(
        r"(?i)\b(?:ošetřující\s+lékař|odesílající\s+lékař|indikující\s+lékař|referring\s+physician|requested\s+by|lékař|doctor|physician)[ \t]*:[ \t]*([^\n]+)"
    ).unwrap();

    pub static ref DOCTOR_TITLE: Regex = Regex::new(
        r"\b((?:prof\.\s*|doc\.\s*)?(?:MUDr|MDDr|MVDr|PharmDr|RNDr|Dr)\.\s*\p{Lu}\p{L}+(?:[ \t]+\p{Lu}\p{L}+)*)"
    ).unwrap();

    // Address
    pub static ref ADDRESS_LABELED: Regex = Regex::new(
        r"(?i)\b(?:trvalé\s+bydliště|bydliště|adresa(?:\s+pacienta)?|address)[ \t]*:[ \t]*([^\n]+)"
    ).unwrap();

    pub static ref ADDRESS_POSTAL: Regex = Regex::new(
        r"(\p{Lu}\p{L}+(?: \p{L}+)* \d+[a-zA-Z]?(?:/\d+[a-zA-Z]?)?(?:, ?| )\d{3} ?\d{2} \p{Lu}\p{L}+(?:[ \-]\p{L}+)*(?: \d{1,2})?)"
    ).unwrap();

    // Diagnosis
    pub static ref DIAGNOSIS_LABELED: Regex = Regex::new(
        r"(?i)\b(?:diagnóza|diagnoza|diagnózy|diagnosis|dg)[ \t]*[.:]+[ \t]*([^\n]+)"
    ).unwrap();

    pub static ref DIAGNOSIS_CODE: Regex = Regex::new(
        r"\b([A-Z][0-9]{2}(?:\.[0-9]{1,2})?)\b"
    ).unwrap();

    // Where a labeled value runs into the next field on the same line
    pub static ref NEXT_FIELD: Regex = Regex::new(
        r"(?i)\s+(?:(?:rodné\s+číslo|pojišťovna|pojištovna|datum|adresa|bydliště|lékař|diagnóza|dg|date|doctor|physician|address|diagnosis|patient|pacient)\s*[.:]|nar\.|narozen[aá]?\s|r\.\s?č\.|\d{6}\s?/\s?\d{3,4})"
    ).unwrap();
}
