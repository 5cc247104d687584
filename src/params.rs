use indexmap::IndexMap;
use serde_json::Value;

/// Params is an ordered parameter bag; insertion order is wire order.
pub type Params = IndexMap<String, Value>;

/// Arguments to a read call.
///
/// A bare scalar binds to the alias's default parameter; a bag is sent key by
/// key.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParamInput {
    #[default]
    None,
    Bare(Value),
    Bag(Params),
}

impl ParamInput {
    /// Look up a key in a bag; bare and empty inputs have no keys.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            ParamInput::Bag(params) => params.get(key),
            _ => None,
        }
    }
}

impl From<Params> for ParamInput {
    fn from(params: Params) -> Self {
        ParamInput::Bag(params)
    }
}

impl From<Option<Params>> for ParamInput {
    fn from(params: Option<Params>) -> Self {
        params.map_or(ParamInput::None, ParamInput::Bag)
    }
}

impl From<&str> for ParamInput {
    fn from(value: &str) -> Self {
        ParamInput::Bare(Value::String(value.to_string()))
    }
}

impl From<String> for ParamInput {
    fn from(value: String) -> Self {
        ParamInput::Bare(Value::String(value))
    }
}

impl From<i64> for ParamInput {
    fn from(value: i64) -> Self {
        ParamInput::Bare(Value::from(value))
    }
}

impl From<u64> for ParamInput {
    fn from(value: u64) -> Self {
        ParamInput::Bare(Value::from(value))
    }
}

impl From<Vec<&str>> for ParamInput {
    fn from(values: Vec<&str>) -> Self {
        ParamInput::Bare(Value::from(values))
    }
}

impl From<Value> for ParamInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ParamInput::None,
            Value::Object(map) => ParamInput::Bag(map.into_iter().collect()),
            other => ParamInput::Bare(other),
        }
    }
}

/// Render a parameter value for a query string (before url-encoding).
///
/// Lists are joined with commas, which is how the read API takes id and
/// tag lists. `null` renders as an empty string.
pub fn wire_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(wire_value).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Build a [`Params`] bag from `key => value` pairs.
///
/// ```
/// let params = mediacove::params! {
///     "page_size" => 25,
///     "sort_by" => "MODIFIED_DATE",
/// };
/// assert_eq!(params.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut params = $crate::params::Params::new();
        $(params.insert(($key).to_string(), $crate::json!($value));)*
        params
    }};
}
