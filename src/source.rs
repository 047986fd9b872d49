//! A task source that keeps its records in memory
//!
//! This is mostly useful for tests, and to feed tasks that have been exported to JSON by some other tool.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::task::{RecordId, TaskRecord};
use crate::traits::{TaskSource, TodoKeywordRegistry};

/// A task file and its scheduled records
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskFile {
    pub name: String,
    #[serde(default)]
    pub records: Vec<TaskRecord>,
}

/// A [`TaskSource`] and [`TodoKeywordRegistry`] backed by plain vectors
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySource {
    #[serde(default)]
    files: Vec<TaskFile>,
    /// Records that are known, but whose file is not
    #[serde(default)]
    orphans: Vec<TaskRecord>,
    #[serde(default)]
    todo_keywords: Vec<String>,
    #[serde(default)]
    active_todo_keywords: Vec<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty source that knows these keywords
    pub fn with_keywords(todo_keywords: Vec<String>, active_todo_keywords: Vec<String>) -> Self {
        Self { todo_keywords, active_todo_keywords, ..Self::default() }
    }

    /// Read a source from a JSON file
    pub fn from_file(path: &Path) -> SyncResult<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    /// Add an empty file, unless it exists already
    pub fn add_file(&mut self, name: &str) {
        if self.files.iter().any(|f| f.name == name) == false {
            self.files.push(TaskFile { name: name.to_string(), records: Vec::new() });
        }
    }

    /// Add a record to a file, creating the file if needed
    pub fn add_record(&mut self, file_name: &str, record: TaskRecord) {
        self.add_file(file_name);
        if let Some(file) = self.files.iter_mut().find(|f| f.name == file_name) {
            file.records.push(record);
        }
    }

    pub fn add_orphan_record(&mut self, record: TaskRecord) {
        self.orphans.push(record);
    }

    /// Remove every record with this id
    pub fn remove_record(&mut self, id: RecordId) {
        for file in self.files.iter_mut() {
            file.records.retain(|r| r.id() != id);
        }
        self.orphans.retain(|r| r.id() != id);
    }

    pub fn remove_file(&mut self, name: &str) {
        self.files.retain(|f| f.name != name);
    }

    pub fn files(&self) -> &[TaskFile] {
        &self.files
    }

    fn find_file(&self, name: &str) -> Option<&TaskFile> {
        self.files.iter().find(|f| f.name == name)
    }
}

#[async_trait]
impl TaskSource for MemorySource {
    async fn file_names(&self) -> SyncResult<Vec<String>> {
        Ok(self.files.iter().map(|f| f.name.clone()).collect())
    }

    async fn file_schedule(&self, file_name: &str, include_habits: bool) -> SyncResult<Vec<TaskRecord>> {
        let file = self.find_file(file_name)
            .ok_or_else(|| SyncError::FileNotFound(file_name.to_string()))?;

        Ok(file.records.iter()
            .filter(|record| record.occurrences().is_empty() == false)
            .filter(|record| include_habits || record.is_habit() == false)
            .cloned()
            .collect()
        )
    }

    async fn get_record(&self, id: RecordId) -> SyncResult<TaskRecord> {
        self.files.iter()
            .flat_map(|f| f.records.iter())
            .chain(self.orphans.iter())
            .find(|r| r.id() == id)
            .cloned()
            .ok_or(SyncError::RecordNotFound(id))
    }

    async fn get_record_file(&self, id: RecordId) -> SyncResult<String> {
        self.files.iter()
            .find(|f| f.records.iter().any(|r| r.id() == id))
            .map(|f| f.name.clone())
            .ok_or_else(|| SyncError::FileNotFound(format!("<file of record {}>", id)))
    }
}

#[async_trait]
impl TodoKeywordRegistry for MemorySource {
    async fn todo_keywords(&self) -> SyncResult<HashSet<String>> {
        Ok(self.todo_keywords.iter().cloned().collect())
    }

    async fn active_todo_keywords(&self) -> SyncResult<HashSet<String>> {
        Ok(self.active_todo_keywords.iter().cloned().collect())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use crate::task::Occurrence;

    fn record(id: RecordId, habit: bool) -> TaskRecord {
        let begin = Utc::now();
        let mut r = TaskRecord::new(id, "TODO".to_string(), format!("Task {}", id), String::new());
        r.add_occurrence(Occurrence::scheduled(begin, begin + Duration::hours(1), false));
        if habit {
            r.set_property("STYLE".to_string(), "habit".to_string());
        }
        r
    }

    #[tokio::test]
    async fn schedules_and_lookups() {
        let mut source = MemorySource::new();
        source.add_record("a.org", record(1, false));
        source.add_record("a.org", record(2, true));
        source.add_record("a.org", TaskRecord::new(3, String::new(), "Undated".to_string(), String::new()));
        source.add_orphan_record(record(4, false));

        assert_eq!(source.file_names().await.unwrap(), vec!["a.org".to_string()]);
        assert_eq!(source.file_schedule("a.org", true).await.unwrap().len(), 2);
        assert_eq!(source.file_schedule("a.org", false).await.unwrap().len(), 1);
        assert!(matches!(source.file_schedule("b.org", true).await, Err(SyncError::FileNotFound(_))));

        assert_eq!(source.get_record(2).await.unwrap().name(), "Task 2");
        assert_eq!(source.get_record_file(2).await.unwrap(), "a.org");
        assert!(source.get_record(4).await.is_ok());
        assert!(matches!(source.get_record_file(4).await, Err(SyncError::FileNotFound(_))));
        assert!(matches!(source.get_record(5).await, Err(SyncError::RecordNotFound(5))));
    }

    #[test]
    fn read_from_json() {
        let source: MemorySource = serde_json::from_str(r#"{
            "files": [
                { "name": "work.org", "records": [
                    { "id": 1, "todo": "TODO", "name": "Report",
                      "occurrences": [ { "kind": "DL: ", "begin": "2030-03-01T09:00:00Z", "end": "2030-03-01T10:00:00Z" } ] }
                ] }
            ],
            "todo_keywords": ["TODO", "DONE"],
            "active_todo_keywords": ["TODO"]
        }"#).unwrap();

        assert_eq!(source.files().len(), 1);
        let record = &source.files()[0].records[0];
        assert_eq!(record.occurrences()[0].kind(), "DL: ");
        assert!(record.occurrences()[0].all_day() == false);
    }
}
