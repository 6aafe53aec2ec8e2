use async_graphql::{InputValueError, InputValueResult, Scalar, ScalarType, Value};
use chrono::{DateTime, Utc};

/// A point in time, carried on the wire as an integer number of milliseconds
/// since the Unix epoch.
///
/// Only integers are accepted as input. Inline literals and variables are
/// held to the same rule, anything else is rejected with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochMillis(pub DateTime<Utc>);

impl From<DateTime<Utc>> for EpochMillis {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

#[Scalar(name = "DateTime")]
impl ScalarType for EpochMillis {
    fn parse(value: Value) -> InputValueResult<Self> {
        let Value::Number(number) = &value else {
            return Err(InputValueError::expected_type(value));
        };
        let millis = number.as_i64().ok_or_else(|| {
            InputValueError::custom(format!(
                "expected an integer number of milliseconds, found {}",
                number
            ))
        })?;
        DateTime::from_timestamp_millis(millis)
            .map(EpochMillis)
            .ok_or_else(|| {
                InputValueError::custom(format!("{} is out of range for a timestamp", millis))
            })
    }

    fn is_valid(value: &Value) -> bool {
        matches!(value, Value::Number(number) if number.is_i64())
    }

    fn to_value(&self) -> Value {
        Value::Number(self.0.timestamp_millis().into())
    }
}
