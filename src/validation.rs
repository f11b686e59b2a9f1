use std::sync::OnceLock;

use regex::Regex;

use crate::{database::quiz::option_labels, error::QuizError};

fn invalid(reason: &str) -> QuizError {
    QuizError::InvalidInput(reason.to_owned())
}

pub fn parse_age(input: &str) -> Result<u8, QuizError> {
    let age: i64 = input
        .trim()
        .parse()
        .map_err(|_| invalid("Iltimos, to'g'ri yoshni kiriting:"))?;
    if !(7..=25).contains(&age) {
        return Err(invalid(
            "Yosh 7 va 25 oralig'ida bo'lishi kerak. Iltimos, yoshingizni qaytadan kiriting:",
        ));
    }
    Ok(age as u8)
}

fn phone_pattern() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^\+998\d{9}$").expect("phone pattern compiles"))
}

pub fn parse_phone(input: &str) -> Result<String, QuizError> {
    if phone_pattern().is_match(input) {
        Ok(input.to_owned())
    } else {
        Err(invalid("Iltimos, telefon raqamingizni +998XXXXXXXXX formatida kiriting:"))
    }
}

pub fn parse_grade(input: &str) -> Result<u8, QuizError> {
    let grade: i64 = input
        .trim()
        .parse()
        .map_err(|_| invalid("Iltimos, to'g'ri sinf raqamini kiriting:"))?;
    if !(1..=12).contains(&grade) {
        return Err(invalid(
            "Sinf 1 va 12 oralig'ida bo'lishi kerak. Iltimos, sinfni qaytadan kiriting:",
        ));
    }
    Ok(grade as u8)
}

/// Reads a grade button such as `9 sinf`.
pub fn parse_grade_button(input: &str) -> Result<u8, QuizError> {
    let first = input.split_whitespace().next().unwrap_or_default();
    parse_grade(first).map_err(|_| invalid("Noto'g'ri sinf tanlandi. Iltimos, qayta tanlang."))
}

pub fn parse_option_count(input: &str) -> Result<u8, QuizError> {
    let count: i64 = input
        .trim()
        .parse()
        .map_err(|_| invalid("Iltimos, raqam kiriting:"))?;
    if count < 2 {
        return Err(invalid("Iltimos, kamida 2 ta variant kiriting:"));
    }
    if count > 26 {
        return Err(invalid("Variantlar soni 26 tadan oshmasligi kerak:"));
    }
    Ok(count as u8)
}

/// The correct answer must be one of the question's option letters.
pub fn parse_correct_answer(input: &str, option_count: u8) -> Result<String, QuizError> {
    let answer = input.trim().to_uppercase();
    if option_labels(option_count).contains(&answer) {
        Ok(answer)
    } else {
        Err(invalid("To'g'ri javob variantlardan biri bo'lishi kerak. Qaytadan tanlang:"))
    }
}

/// Signed amount of tanga to grant.
pub fn parse_amount(input: &str) -> Result<i64, QuizError> {
    input
        .trim()
        .parse()
        .map_err(|_| invalid("Iltimos, raqam kiriting."))
}

pub fn parse_chat_id(input: &str) -> Result<i64, QuizError> {
    let input = input.trim();
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("Chat ID faqat raqamlardan iborat bo'lishi kerak."));
    }
    input
        .parse()
        .map_err(|_| invalid("Chat ID faqat raqamlardan iborat bo'lishi kerak."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_bounds() {
        assert_eq!(parse_age("7"), Ok(7));
        assert_eq!(parse_age(" 25 "), Ok(25));
        assert!(parse_age("6").is_err());
        assert!(parse_age("26").is_err());
        assert!(parse_age("o'n").is_err());
    }

    #[test]
    fn phone_format() {
        assert!(parse_phone("+998901234567").is_ok());
        assert!(parse_phone("998901234567").is_err());
        assert!(parse_phone("+99890123456").is_err());
        assert!(parse_phone("+9989012345678").is_err());
    }

    #[test]
    fn grade_bounds() {
        assert_eq!(parse_grade("12"), Ok(12));
        assert!(parse_grade("0").is_err());
        assert!(parse_grade("13").is_err());
        assert_eq!(parse_grade_button("9 sinf"), Ok(9));
        assert!(parse_grade_button("sinf").is_err());
        assert!(parse_grade_button("").is_err());
    }

    #[test]
    fn option_count_needs_two() {
        assert_eq!(parse_option_count("4"), Ok(4));
        assert!(parse_option_count("1").is_err());
        assert!(parse_option_count("ikki").is_err());
    }

    #[test]
    fn correct_answer_within_options() {
        assert_eq!(parse_correct_answer(" b ", 3), Ok("B".to_owned()));
        assert!(parse_correct_answer("D", 3).is_err());
        assert!(parse_correct_answer("AB", 3).is_err());
    }

    #[test]
    fn amounts_may_be_negative() {
        assert_eq!(parse_amount("-3"), Ok(-3));
        assert!(parse_amount("besh").is_err());
    }

    #[test]
    fn chat_ids_are_digits_only() {
        assert_eq!(parse_chat_id("12345"), Ok(12345));
        assert!(parse_chat_id("-12345").is_err());
        assert!(parse_chat_id("abc").is_err());
    }
}
