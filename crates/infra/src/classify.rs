//! Keyword classifiers used when normalising upstream job records.
//!
//! Rule tables are plain data: each category lists the lowercase substrings
//! that select it. Matching is case-insensitive substring search.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DutyCategory {
    Data,
    Development,
    Marketing,
    Design,
    Hr,
    Finance,
    Administration,
    Research,
    Other,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentType {
    Intern,
    Contract,
    Regular,
    Other,
}

/// Duty rules, checked independently (a text may select several).
pub const DUTY_RULES: &[(DutyCategory, &[&str])] = &[
    (DutyCategory::Data, &["데이터", "정보", "전산", "it"]),
    (DutyCategory::Development, &["개발", "프로그래", "소프트웨어"]),
    (DutyCategory::Marketing, &["마케팅", "홍보", "광고"]),
    (DutyCategory::Design, &["디자인", "ui", "ux"]),
    (DutyCategory::Hr, &["인사", "채용", "hr"]),
    (DutyCategory::Finance, &["재무", "회계", "세무", "경리"]),
    (DutyCategory::Administration, &["행정", "사무", "총무", "비서"]),
    (DutyCategory::Research, &["연구", "r&d", "분석"]),
];

/// Employment rules in priority order; the first match wins.
///
/// Contract precedes regular because "비정규직" contains "정규직".
pub const EMPLOYMENT_RULES: &[(EmploymentType, &[&str])] = &[
    (EmploymentType::Intern, &["인턴", "실습", "체험"]),
    (EmploymentType::Contract, &["비정규", "계약", "기간제"]),
    (EmploymentType::Regular, &["정규직"]),
];

const INTERNSHIP_TITLE_KEYWORDS: &[&str] = &["인턴", "실습", "체험형"];
const INTERNSHIP_HIRE_TYPE_KEYWORDS: &[&str] = &["인턴", "체험"];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Duty categories for a free-text duty description; `{Other}` when nothing matches.
pub fn classify_duties(text: Option<&str>) -> BTreeSet<DutyCategory> {
    let lower = text.unwrap_or_default().to_lowercase();

    let mut categories: BTreeSet<DutyCategory> = DUTY_RULES
        .iter()
        .filter(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(category, _)| *category)
        .collect();

    if categories.is_empty() {
        categories.insert(DutyCategory::Other);
    }
    categories
}

/// Employment type for a hire-type label.
pub fn classify_employment(text: Option<&str>) -> EmploymentType {
    let lower = text.unwrap_or_default().to_lowercase();
    EMPLOYMENT_RULES
        .iter()
        .find(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(kind, _)| *kind)
        .unwrap_or(EmploymentType::Other)
}

/// Internship flag from the posting title and hire-type label.
pub fn is_internship(title: Option<&str>, hire_type: Option<&str>) -> bool {
    let title = title.unwrap_or_default().to_lowercase();
    let hire_type = hire_type.unwrap_or_default().to_lowercase();
    contains_any(&title, INTERNSHIP_TITLE_KEYWORDS)
        || contains_any(&hire_type, INTERNSHIP_HIRE_TYPE_KEYWORDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_or_missing_duties_fall_back_to_other() {
        assert_eq!(classify_duties(None), BTreeSet::from([DutyCategory::Other]));
        assert_eq!(classify_duties(Some("조경")), BTreeSet::from([DutyCategory::Other]));
    }

    #[test]
    fn duties_can_select_several_categories() {
        let categories = classify_duties(Some("데이터 분석 및 소프트웨어 개발"));
        assert_eq!(
            categories,
            BTreeSet::from([
                DutyCategory::Data,
                DutyCategory::Development,
                DutyCategory::Research
            ])
        );
    }

    #[test]
    fn duty_matching_is_case_insensitive() {
        assert!(classify_duties(Some("UX Research")).contains(&DutyCategory::Design));
        assert!(classify_duties(Some("R&D 센터")).contains(&DutyCategory::Research));
    }

    #[test]
    fn employment_type_uses_rule_priority() {
        assert_eq!(classify_employment(Some("청년인턴(체험형)")), EmploymentType::Intern);
        assert_eq!(classify_employment(Some("정규직")), EmploymentType::Regular);
        assert_eq!(classify_employment(Some("비정규직")), EmploymentType::Contract);
        assert_eq!(classify_employment(Some("무기계약직")), EmploymentType::Contract);
        assert_eq!(classify_employment(Some("기타")), EmploymentType::Other);
        assert_eq!(classify_employment(None), EmploymentType::Other);
    }

    #[test]
    fn internship_detection_checks_title_and_hire_type() {
        assert!(is_internship(Some("2025 청년인턴 채용"), None));
        assert!(is_internship(Some("채용 공고"), Some("체험형 인턴")));
        assert!(!is_internship(Some("정규직 채용"), Some("정규직")));
    }

    #[test]
    fn categories_serialize_as_upper_snake_case() {
        assert_eq!(serde_json::to_string(&DutyCategory::Hr).unwrap(), "\"HR\"");
        assert_eq!(
            serde_json::to_string(&EmploymentType::Intern).unwrap(),
            "\"INTERN\""
        );
    }
}
