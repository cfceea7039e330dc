//! Quote-aware line splitting.
//!
//! The only escaping rule is quote toggling: a `"` flips between quoted and
//! unquoted mode and is itself dropped. There is no escaped quote inside quotes.

pub const FIELD_DELIMITER: char = ',';

/// Splits one snapshot record into fields.
///
/// A trailing empty field is dropped, so `a,b,` yields two fields.
pub fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            FIELD_DELIMITER if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        fields.push(current);
    }
    fields
}

/// Quotes `field` when it contains the delimiter.
pub fn format_field(field: &str) -> String {
    if field.contains(FIELD_DELIMITER) {
        format!("\"{field}\"")
    } else {
        field.to_string()
    }
}

/// Splits a shell line into words on whitespace; quotes group words.
///
/// `""` yields an empty word, unquoted runs of whitespace yield nothing.
pub fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if quoted || !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            _ => current.push(ch),
        }
    }
    if quoted || !current.is_empty() {
        words.push(current);
    }
    words
}
