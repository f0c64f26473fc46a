use super::Scalar;
use super::repr::render_value;
use crate::error::HarvestError;
use serde_json::Value;

/// One observation of one named metric at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongRow {
    pub metric: String,
    pub timestamp: String,
    pub value: Scalar,
}

impl LongRow {
    #[must_use]
    pub fn new(metric: impl Into<String>, timestamp: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self {
            metric: metric.into(),
            timestamp: timestamp.into(),
            value: value.into(),
        }
    }
}

/// Keys that may carry the observation time, in lookup order.
const TIME_KEYS: [&str; 2] = ["end_time", "timestamp"];

/// Turn an insights response into long-format rows.
///
/// The expected shape is
/// `{"data": [{"name": ..., "values": [{"end_time": ..., "value": ...}, ...]}, ...]}`.
/// A response without `data` has nothing to report and yields no rows.
///
/// # Errors
///
/// Fails with [`HarvestError::DataShape`] when `data` is present but does not
/// follow the series shape.
pub fn extract_series(value: &Value) -> Result<Vec<LongRow>, HarvestError> {
    let Some(data) = value.get("data") else {
        return Ok(Vec::new());
    };

    let series = data.as_array().ok_or_else(|| HarvestError::data_shape("data", "expected an array of metric series"))?;

    let mut rows = Vec::new();
    for (i, entry) in series.iter().enumerate() {
        let path = format!("data[{i}]");

        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| HarvestError::data_shape(&path, "missing string field 'name'"))?;

        let values = entry
            .get("values")
            .and_then(Value::as_array)
            .ok_or_else(|| HarvestError::data_shape(&path, "missing array field 'values'"))?;

        for (j, observation) in values.iter().enumerate() {
            let timestamp = TIME_KEYS
                .iter()
                .find_map(|key| observation.get(*key).and_then(time_text))
                .ok_or_else(|| HarvestError::data_shape(format!("{path}.values[{j}]"), "missing 'end_time' or 'timestamp'"))?;

            rows.push(LongRow {
                metric: name.to_string(),
                timestamp,
                value: observation.get("value").map_or(Scalar::Null, cell_value),
            });
        }
    }

    Ok(rows)
}

fn time_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// Breakdown metrics report an object per day, stored in the same notation as rendered sequences.
fn cell_value(value: &Value) -> Scalar {
    Scalar::from_json(value).unwrap_or_else(|| Scalar::String(render_value(value).into()))
}
