//! Record builders and an in-memory sink shared by tests.

use super::error::SinkError;
use super::model::CommentRecord;
use super::sink::RecordSink;

/// A minimal record for pull request `number` anchored to `path`.
pub(crate) fn sample_record(number: u64, path: &str) -> CommentRecord {
    CommentRecord {
        comment_text: Some("nit".to_owned()),
        has_reply: false,
        thread: Vec::new(),
        file_path: path.to_owned(),
        comment_id: Some(format!("C{number}")),
        comment_url: None,
        comment_commit: None,
        diff_hunk: Some("@@ -1 +1 @@".to_owned()),
        file_diff: None,
        pull_request_diff: String::new(),
        resolved: false,
        pull_request_number: number,
        pull_request_url: None,
        pull_request_base_commit: None,
        pull_request_head_commit: None,
        pull_request_title: None,
        pull_request_body: None,
        pull_request_created_at: None,
        linked_issues: Vec::new(),
        comment_created_at: None,
    }
}

/// Sink keeping records in memory.
#[derive(Debug, Default)]
pub(crate) struct MemorySink {
    pub(crate) records: Vec<CommentRecord>,
    pub(crate) finished: bool,
}

impl RecordSink for MemorySink {
    fn write_record(&mut self, record: &CommentRecord) -> Result<(), SinkError> {
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.finished = true;
        Ok(())
    }
}
