/// Somalia's international dialling code.
pub const SOMALI_COUNTRY_CODE: &str = "252";

/// Normalizes a Somali mobile number to international digits (`252...`).
///
/// Non-digit characters are dropped; the country code is added when missing.
pub fn format_somali_phone_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.starts_with(SOMALI_COUNTRY_CODE) {
        digits
    } else {
        format!("{SOMALI_COUNTRY_CODE}{digits}")
    }
}
