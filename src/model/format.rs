/// Formats damage with thousands separators, e.g. `1234567` as `1,234,567`.
pub fn format_damage(damage: i64) -> String {
    let digits = damage.unsigned_abs().to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if damage < 0 {
        formatted.push('-');
    }

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(c);
    }

    formatted
}
