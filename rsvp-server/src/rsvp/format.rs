//! Guest rows as stored in the spreadsheet

use chrono::{DateTime, Utc};
use chrono_tz::Europe::Moscow;
use shared::models::{Attendance, GuestEntry, HousingChoice};

use crate::sheets::Row;

/// Columns A..G of the guest sheet
pub const HEADER_ROW: [&str; 7] = [
    "ФИО",
    "Номер телефона",
    "Присутствие",
    "Алкоголь",
    "Жилье",
    "Сообщение для нас",
    "Время отправки сообщения",
];

/// Stored in place of an empty value
pub const PLACEHOLDER: &str = "-";

const COUNTRY_CODE: char = '7';
const TRUNK_PREFIX: char = '8';
const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Form preference id → label shown in the sheet
const ALCOHOL_LABELS: [(&str, &str); 5] = [
    ("champagne", "Шампанское"),
    ("wine", "Вино"),
    ("cognac", "Коньяк"),
    ("whiskey", "Виски"),
    ("vodka", "Водка"),
];

/// Digits only, in domestic format (`8XXXXXXXXXX`) when recognizable
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let first = digits.chars().next();

    match (digits.len(), first) {
        (0, _) => PLACEHOLDER.to_string(),
        (11, Some(COUNTRY_CODE)) => format!("{TRUNK_PREFIX}{}", &digits[1..]),
        (10, Some(c)) if c != COUNTRY_CODE && c != TRUNK_PREFIX => {
            format!("{TRUNK_PREFIX}{digits}")
        }
        _ => digits,
    }
}

pub fn alcohol_label(id: &str) -> &str {
    ALCOHOL_LABELS
        .iter()
        .find(|(key, _)| *key == id)
        .map_or(id, |(_, label)| *label)
}

/// Labels joined with ", ", unknown ids kept as-is
pub fn alcohol_labels(ids: &[String]) -> String {
    let labels: Vec<&str> = ids
        .iter()
        .map(|id| alcohol_label(id))
        .filter(|label| !label.is_empty())
        .collect();
    if labels.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        labels.join(", ")
    }
}

pub fn attendance_cell(attendance: Attendance) -> &'static str {
    match attendance {
        Attendance::Attending => "да",
        Attendance::NotAttending => "нет",
    }
}

/// Housing is only asked of attending guests
pub fn housing_cell(attendance: Attendance, housing: Option<HousingChoice>) -> &'static str {
    if !attendance.is_attending() {
        return PLACEHOLDER;
    }
    match housing {
        Some(HousingChoice::Yes) => "да",
        Some(HousingChoice::No) => "нет",
        None => "не указано",
    }
}

/// Submission time on the wedding's local clock
pub fn submission_timestamp(now: DateTime<Utc>) -> String {
    now.with_timezone(&Moscow).format(TIMESTAMP_FORMAT).to_string()
}

/// Only an empty value is replaced; whitespace is stored as typed
fn or_placeholder(value: &str) -> String {
    if value.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

/// One row per guest. The message and timestamp are shared by every row
/// of the submission.
pub fn guest_rows(guests: &[GuestEntry], message: Option<&str>, timestamp: &str) -> Vec<Row> {
    let message = or_placeholder(message.unwrap_or_default());

    guests
        .iter()
        .map(|guest| {
            vec![
                or_placeholder(&guest.name),
                normalize_phone(&guest.phone_number),
                attendance_cell(guest.attendance).to_string(),
                alcohol_labels(&guest.alcohol_preference),
                housing_cell(guest.attendance, guest.housing_required).to_string(),
                message.clone(),
                timestamp.to_string(),
            ]
        })
        .collect()
}
