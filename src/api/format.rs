use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::database::models::{Item, ItemChanges, NewItem};
use crate::error::{ApiError, FieldErrors};

pub const NAME_MAX_LENGTH: usize = 255;
pub const PRICE_MAX_DIGITS: u32 = 10;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const NOT_A_STRING: &str = "Not a valid string.";
const NOT_A_NUMBER: &str = "A valid number is required.";

/// Public wire form of an item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRepresentation {
    pub id: i64,
    pub name: String,
    pub price: String,
    pub created_at: String,
}

impl From<&Item> for ItemRepresentation {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            price: format_price(item.price),
            created_at: format_timestamp(item.created_at),
        }
    }
}

impl From<Item> for ItemRepresentation {
    fn from(item: Item) -> Self {
        Self::from(&item)
    }
}

pub fn format_price(price: Decimal) -> String {
    let mut price = price;
    price.rescale(PRICE_DECIMAL_PLACES);
    price.to_string()
}

/// RFC 3339 in UTC with a `Z` suffix; sub-second digits only when present.
/// Always UTC, even where a deployment would prefer a local zone such as
/// `America/Sao_Paulo` (`-03:00`).
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    let format = if ts.nanosecond() == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    ts.to_rfc3339_opts(format, true)
}

/// Inbound validation of item payloads.
pub struct ItemSerializer;

impl ItemSerializer {
    /// Full validation: every writable field is required.
    pub fn validate_create(body: &Value) -> Result<NewItem, ApiError> {
        let changes = Self::validate(body, false)?;
        match (changes.name, changes.price) {
            (Some(name), Some(price)) => Ok(NewItem { name, price }),
            _ => Err(ApiError::server_fault()),
        }
    }

    /// `partial` skips the required check for absent fields.
    pub fn validate_update(body: &Value, partial: bool) -> Result<ItemChanges, ApiError> {
        Self::validate(body, partial)
    }

    fn validate(body: &Value, partial: bool) -> Result<ItemChanges, ApiError> {
        let object = expect_object(body)?;
        let mut errors = FieldErrors::new();
        let mut changes = ItemChanges::default();

        match object.get("name") {
            None if partial => {}
            None => add_error(&mut errors, "name", REQUIRED),
            Some(value) => match validate_name(value) {
                Ok(name) => changes.name = Some(name),
                Err(message) => add_error(&mut errors, "name", message),
            },
        }

        match object.get("price") {
            None if partial => {}
            None => add_error(&mut errors, "price", REQUIRED),
            Some(value) => match validate_price(value) {
                Ok(price) => changes.price = Some(price),
                Err(message) => add_error(&mut errors, "price", message),
            },
        }

        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(ApiError::validation_error(errors))
        }
    }
}

/// Require a JSON object body.
pub fn expect_object(body: &Value) -> Result<&Map<String, Value>, ApiError> {
    body.as_object().ok_or_else(|| {
        ApiError::field_error(
            "non_field_errors",
            format!("Invalid data. Expected a dictionary, but got {}.", json_type_name(body)),
        )
    })
}

/// Required non-blank string field of a credentials payload. `trim` strips
/// surrounding whitespace before the blank check.
pub fn required_string(
    object: &Map<String, Value>,
    field: &str,
    trim: bool,
    errors: &mut FieldErrors,
) -> Option<String> {
    let result = match object.get(field) {
        None => Err(REQUIRED.to_string()),
        Some(value) => string_value(value).and_then(|s| {
            let s = if trim { s.trim().to_string() } else { s };
            if s.is_empty() {
                Err(NOT_BLANK.to_string())
            } else {
                Ok(s)
            }
        }),
    };

    match result {
        Ok(s) => Some(s),
        Err(message) => {
            add_error(errors, field, message);
            None
        }
    }
}

fn add_error(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors.entry(field.to_string()).or_default().push(message.into());
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Strings pass through, numbers are rendered, anything else is rejected.
fn string_value(value: &Value) -> Result<String, String> {
    match value {
        Value::Null => Err(NOT_NULL.to_string()),
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(NOT_A_STRING.to_string()),
    }
}

fn validate_name(value: &Value) -> Result<String, String> {
    let name = string_value(value)?.trim().to_string();
    if name.is_empty() {
        return Err(NOT_BLANK.to_string());
    }
    if name.chars().count() > NAME_MAX_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            NAME_MAX_LENGTH
        ));
    }
    Ok(name)
}

fn validate_price(value: &Value) -> Result<Decimal, String> {
    let raw = match value {
        Value::Null => return Err(NOT_NULL.to_string()),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err(NOT_A_NUMBER.to_string()),
    };

    let price = match Decimal::from_str(&raw).or_else(|_| Decimal::from_scientific(&raw)) {
        Ok(price) => price,
        // a well-formed literal only fails to parse when it overflows
        Err(_) if is_decimal_literal(&raw) => return Err(max_digits_message()),
        Err(_) => return Err(NOT_A_NUMBER.to_string()),
    };

    check_precision(price)?;

    if price < Decimal::ZERO {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }

    Ok(price)
}

fn max_digits_message() -> String {
    format!("Ensure that there are no more than {} digits in total.", PRICE_MAX_DIGITS)
}

/// Optional sign, digits with at most one point, optional exponent.
fn is_decimal_literal(raw: &str) -> bool {
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (unsigned, None),
    };

    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mantissa_ok = !(whole.is_empty() && fraction.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit());

    let exponent_ok = exponent.map_or(true, |e| {
        let digits = e.strip_prefix(['+', '-']).unwrap_or(e);
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    });

    mantissa_ok && exponent_ok
}

/// Digit limits counted the way the written value reads, so trailing zeros
/// after the point count as decimal places.
fn check_precision(price: Decimal) -> Result<(), String> {
    let digits = {
        let mantissa = price.mantissa().unsigned_abs();
        if mantissa == 0 {
            1
        } else {
            mantissa.ilog10() + 1
        }
    };
    let scale = price.scale();

    let (total_digits, whole_digits, decimal_places) = if scale == 0 {
        (digits, digits, 0)
    } else if digits > scale {
        (digits, digits - scale, scale)
    } else {
        (scale, 0, scale)
    };

    if total_digits > PRICE_MAX_DIGITS {
        return Err(max_digits_message());
    }
    if decimal_places > PRICE_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {} decimal places.",
            PRICE_DECIMAL_PLACES
        ));
    }
    let max_whole = PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES;
    if whole_digits > max_whole {
        return Err(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            max_whole
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn field_errors(err: ApiError) -> Value {
        assert!(matches!(err, ApiError::ValidationError(_)), "got {:?}", err);
        err.to_json()
    }

    #[test]
    fn renders_items() {
        let item = Item {
            id: 3,
            name: "Widget".to_string(),
            price: Decimal::from_str("10").unwrap(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
                + chrono::Duration::microseconds(123456),
        };
        let value = serde_json::to_value(ItemRepresentation::from(&item)).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 3,
                "name": "Widget",
                "price": "10.00",
                "created_at": "2025-01-01T12:00:00.123456Z"
            })
        );

        let whole = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(format_timestamp(whole), "2025-01-01T12:00:00Z");
    }

    #[test]
    fn accepts_strings_and_numbers() {
        let item = ItemSerializer::validate_create(&json!({"name": "  Widget ", "price": "9.99"})).unwrap();
        assert_eq!(item.name, "Widget");
        assert_eq!(item.price, Decimal::from_str("9.99").unwrap());

        let item = ItemSerializer::validate_create(&json!({"name": 42, "price": 5})).unwrap();
        assert_eq!(item.name, "42");
        assert_eq!(item.price, Decimal::from(5));

        let item = ItemSerializer::validate_create(&json!({"name": "x", "price": 1.5, "id": 99})).unwrap();
        assert_eq!(item.price, Decimal::from_str("1.5").unwrap());
    }

    #[test]
    fn reports_every_field() {
        let err = ItemSerializer::validate_create(&json!({})).unwrap_err();
        assert_eq!(
            field_errors(err),
            json!({"name": ["This field is required."], "price": ["This field is required."]})
        );

        let err = ItemSerializer::validate_create(&json!({"name": "", "price": null})).unwrap_err();
        assert_eq!(
            field_errors(err),
            json!({"name": ["This field may not be blank."], "price": ["This field may not be null."]})
        );

        let err = ItemSerializer::validate_create(&json!({"name": true, "price": "abc"})).unwrap_err();
        assert_eq!(
            field_errors(err),
            json!({"name": ["Not a valid string."], "price": ["A valid number is required."]})
        );
    }

    #[test]
    fn enforces_price_limits() {
        let cases = [
            ("-1", "Ensure this value is greater than or equal to 0."),
            ("1.234", "Ensure that there are no more than 2 decimal places."),
            ("123456789", "Ensure that there are no more than 8 digits before the decimal point."),
            ("12345678901", "Ensure that there are no more than 10 digits in total."),
            ("1.000", "Ensure that there are no more than 2 decimal places."),
            ("NaN", "A valid number is required."),
        ];
        for (raw, message) in cases {
            let err = ItemSerializer::validate_create(&json!({"name": "x", "price": raw})).unwrap_err();
            assert_eq!(field_errors(err), json!({"price": [message]}), "price {}", raw);
        }

        let huge = format!("1{}", "0".repeat(30));
        let err = ItemSerializer::validate_create(&json!({"name": "x", "price": huge})).unwrap_err();
        assert_eq!(
            field_errors(err),
            json!({"price": ["Ensure that there are no more than 10 digits in total."]})
        );

        assert!(ItemSerializer::validate_create(&json!({"name": "x", "price": "12345678.99"})).is_ok());
        assert!(ItemSerializer::validate_create(&json!({"name": "x", "price": "0"})).is_ok());
    }

    #[test]
    fn recognises_decimal_literals() {
        for raw in ["1", "-1.5", "+.5", "5.", "1e40", "2.5E-3"] {
            assert!(is_decimal_literal(raw), "{}", raw);
        }
        for raw in ["", ".", "-", "1.2.3", "1e", "abc", "NaN", "1 000"] {
            assert!(!is_decimal_literal(raw), "{}", raw);
        }
    }

    #[test]
    fn enforces_name_length() {
        let ok = "a".repeat(NAME_MAX_LENGTH);
        assert!(ItemSerializer::validate_create(&json!({"name": ok, "price": "1"})).is_ok());

        let long = "a".repeat(NAME_MAX_LENGTH + 1);
        let err = ItemSerializer::validate_create(&json!({"name": long, "price": "1"})).unwrap_err();
        assert_eq!(
            field_errors(err),
            json!({"name": ["Ensure this field has no more than 255 characters."]})
        );
    }

    #[test]
    fn partial_updates_skip_absent_fields() {
        let changes = ItemSerializer::validate_update(&json!({"price": "12.50"}), true).unwrap();
        assert_eq!(changes.name, None);
        assert_eq!(changes.price, Some(Decimal::from_str("12.50").unwrap()));

        assert!(ItemSerializer::validate_update(&json!({}), true).unwrap().is_empty());
        assert!(ItemSerializer::validate_update(&json!({"price": "1"}), false).is_err());
    }

    #[test]
    fn rejects_non_object_bodies() {
        for (body, kind) in [
            (json!([1, 2]), "list"),
            (json!("text"), "str"),
            (json!(7), "int"),
            (json!(1.5), "float"),
            (json!(true), "bool"),
            (Value::Null, "NoneType"),
        ] {
            let err = ItemSerializer::validate_create(&body).unwrap_err();
            assert_eq!(
                field_errors(err),
                json!({"non_field_errors": [format!("Invalid data. Expected a dictionary, but got {}.", kind)]})
            );
        }
    }

    #[test]
    fn credentials_fields_are_required() {
        let body = json!({"username": "  ", "password": " pw "});
        let mut errors = FieldErrors::new();
        let object = expect_object(&body).unwrap();
        assert_eq!(required_string(object, "username", true, &mut errors), None);
        assert_eq!(required_string(object, "password", false, &mut errors), Some(" pw ".to_string()));
        assert_eq!(required_string(object, "missing", true, &mut errors), None);
        assert_eq!(errors["username"], vec![NOT_BLANK.to_string()]);
        assert_eq!(errors["missing"], vec![REQUIRED.to_string()]);
    }
}
