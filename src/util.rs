use serde_json::Value;

/// First present key whose value renders as a string.
pub fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(s) = as_string(v) {
                return Some(s);
            }
        }
    }
    None
}

pub fn pick_i64(value: &Value, keys: &[&str]) -> Option<i64> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(num) = as_i64(v) {
                return Some(num);
            }
        }
    }
    None
}

pub fn pick_f64(value: &Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(num) = as_f64(v) {
                return Some(num);
            }
        }
    }
    None
}

pub fn pick_bool(value: &Value, keys: &[&str]) -> Option<bool> {
    for key in keys {
        if let Some(b) = value.get(*key).and_then(Value::as_bool) {
            return Some(b);
        }
    }
    None
}

pub fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Score-style coercion: absent, null or non-numeric collapses to 0.
pub fn safe_int(value: Option<&Value>) -> i64 {
    value.and_then(as_i64).unwrap_or(0)
}

/// Shot-quality coercion: `"-"` and any non-numeric value collapse to 0.0
/// so downstream aggregation always sees a numeric column.
pub fn coerce_f64(value: Option<&Value>) -> f64 {
    let Some(value) = value else {
        return 0.0;
    };
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let cleaned = s.trim().replace('-', "0");
            cleaned.parse::<f64>().unwrap_or(0.0)
        }
        _ => 0.0,
    }
}
