use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A complete itinerary as rendered by the client.
///
/// Model output is accepted loosely: missing fields default to empty values,
/// numbers are accepted where text is expected, and keys this struct does not
/// know about are carried through in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelPlan {
    #[serde(default, deserialize_with = "lenient_text")]
    pub destination: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub budget: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub best_season: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: String,
    #[serde(default)]
    pub daily_plan: Vec<DayPlan>,
    #[serde(default)]
    pub transportation: Transportation,
    #[serde(default)]
    pub packing_list: Vec<String>,
    #[serde(default)]
    pub food_recommend: Vec<FoodRecommendation>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub avoid_pits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TravelPlan {
    pub fn stamp(&mut self, ai_version: &str) {
        self.generated_at = Some(Utc::now());
        self.ai_version = Some(ai_version.to_string());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    #[serde(default, deserialize_with = "lenient_day")]
    pub day: u32,
    #[serde(default, deserialize_with = "lenient_text")]
    pub theme: String,
    #[serde(default)]
    pub activities: Vec<PlannedActivity>,
    #[serde(default)]
    pub meals: Meals,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub accommodation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PlannedActivity {
    #[serde(default, deserialize_with = "lenient_text")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub place: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub cost: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Meals {
    #[serde(default, deserialize_with = "lenient_text")]
    pub breakfast: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub lunch: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub dinner: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transportation {
    #[serde(default, deserialize_with = "lenient_text")]
    pub to_destination: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub local: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub tips: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FoodRecommendation {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub price: String,
}

/// What the link classifier guessed about a shared video.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoContext {
    #[serde(default, deserialize_with = "lenient_text")]
    pub destination: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub suggested_days: Option<String>,
}

impl VideoContext {
    pub fn new(destination: &str, keywords: &[&str], suggested_days: &str) -> Self {
        Self {
            destination: destination.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            suggested_days: Some(suggested_days.to_string()),
        }
    }
}

/// Accepts a string, a number or a bool as text; `null` and absence are `None`.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other @ (Value::Number(_) | Value::Bool(_))) => Some(other.to_string()),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected text, found {}",
                other
            )))
        }
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_string(deserializer).map(Option::unwrap_or_default)
}

fn lenient_day<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid day number {}", n))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid day number {:?}", s))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected day number, found {}",
            other
        ))),
    }
}
