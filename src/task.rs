//! Scheduled task records, as handed over by a [`TaskSource`](crate::traits::TaskSource)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Identifier of a task record, unique within its task source
pub type RecordId = i64;

/// Name of the property that holds the location of a task
pub const LOCATION_PROPERTY: &str = "LOCATION";
/// Name of the property that tells the style of a task (e.g. `habit`)
pub const STYLE_PROPERTY: &str = "STYLE";

/// Title prefix of `SCHEDULED:` dates
pub const SCHEDULED_TAG: &str = "SC: ";
/// Title prefix of `DEADLINE:` dates
pub const DEADLINE_TAG: &str = "DL: ";

/// One scheduled date/time span attached to a task.
///
/// Every occurrence of a record is mirrored as its own calendar entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Prefix that tells what kind of date this is (see [`SCHEDULED_TAG`] and [`DEADLINE_TAG`]).
    /// Plain timestamps have an empty kind.
    #[serde(default)]
    kind: String,
    begin: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(default)]
    all_day: bool,
}

impl Occurrence {
    pub fn new(kind: String, begin: DateTime<Utc>, end: DateTime<Utc>, all_day: bool) -> Self {
        Self { kind, begin, end, all_day }
    }

    /// A `SCHEDULED:` date
    pub fn scheduled(begin: DateTime<Utc>, end: DateTime<Utc>, all_day: bool) -> Self {
        Self::new(SCHEDULED_TAG.to_string(), begin, end, all_day)
    }

    /// A `DEADLINE:` date
    pub fn deadline(begin: DateTime<Utc>, end: DateTime<Utc>, all_day: bool) -> Self {
        Self::new(DEADLINE_TAG.to_string(), begin, end, all_day)
    }

    /// A plain active timestamp
    pub fn timestamp(begin: DateTime<Utc>, end: DateTime<Utc>, all_day: bool) -> Self {
        Self::new(String::new(), begin, end, all_day)
    }

    pub fn kind(&self) -> &str             { &self.kind   }
    pub fn begin(&self) -> &DateTime<Utc>  { &self.begin  }
    pub fn end(&self) -> &DateTime<Utc>    { &self.end    }
    pub fn all_day(&self) -> bool          { self.all_day }
}

/// A task, with its todo keyword, its (already sanitized) texts and its dates
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    id: RecordId,
    /// The todo keyword (e.g. `TODO`, `DONE`). Empty when the task has none
    #[serde(default)]
    todo: String,
    name: String,
    #[serde(default)]
    payload: String,
    #[serde(default)]
    properties: HashMap<String, String>,
    #[serde(default)]
    occurrences: Vec<Occurrence>,
}

impl TaskRecord {
    /// Create a record that has no properties and no dates yet
    pub fn new(id: RecordId, todo: String, name: String, payload: String) -> Self {
        Self::new_with_parameters(id, todo, name, payload, HashMap::new(), Vec::new())
    }

    pub fn new_with_parameters(id: RecordId, todo: String, name: String, payload: String,
                               properties: HashMap<String, String>, occurrences: Vec<Occurrence>,
                            ) -> Self
    {
        Self { id, todo, name, payload, properties, occurrences }
    }

    pub fn id(&self) -> RecordId        { self.id       }
    pub fn todo(&self) -> &str          { &self.todo    }
    pub fn name(&self) -> &str          { &self.name    }
    pub fn payload(&self) -> &str       { &self.payload }
    pub fn occurrences(&self) -> &[Occurrence]                 { &self.occurrences }
    pub fn properties(&self) -> &HashMap<String, String>      { &self.properties  }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|value| value.as_str())
    }

    /// The `LOCATION` property, if any
    pub fn location(&self) -> Option<&str> {
        self.property(LOCATION_PROPERTY)
    }

    /// Whether this is an org habit (`:STYLE: habit`)
    pub fn is_habit(&self) -> bool {
        self.property(STYLE_PROPERTY)
            .map(|style| style.trim().eq_ignore_ascii_case("habit"))
            .unwrap_or(false)
    }

    pub fn set_property(&mut self, name: String, value: String) {
        self.properties.insert(name, value);
    }

    pub fn add_occurrence(&mut self, occurrence: Occurrence) {
        self.occurrences.push(occurrence);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn occurrence_kinds() {
        let begin = Utc.with_ymd_and_hms(2030, 5, 1, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2030, 5, 1, 10, 0, 0).unwrap();

        assert_eq!(Occurrence::scheduled(begin, end, false).kind(), "SC: ");
        assert_eq!(Occurrence::deadline(begin, end, false).kind(), "DL: ");
        assert_eq!(Occurrence::timestamp(begin, end, true).kind(), "");
    }

    #[test]
    fn habits_and_location() {
        let mut record = TaskRecord::new(3, "TODO".to_string(), "Water plants".to_string(), String::new());
        assert!(record.is_habit() == false);
        assert_eq!(record.location(), None);

        record.set_property("STYLE".to_string(), "habit".to_string());
        record.set_property("LOCATION".to_string(), "Balcony".to_string());
        assert!(record.is_habit());
        assert_eq!(record.location(), Some("Balcony"));
    }
}
