//! Line-oriented Server-Sent Events consumption: a small record parser and
//! a reader that keeps a stream alive across reconnects

use std::time::Duration;

use futures::StreamExt;
use reqwest::header;
use tokio::sync::{mpsc, watch};

/// Delay between the end of one connection and the next attempt
pub const RECONNECT_DELAY: Duration = Duration::from_secs(10);

/// One dispatched event-stream record
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub event: String,
    pub data: String,
}

/// Accumulates `id:` / `event:` / `data:` lines into records
///
/// Comment lines (leading `:`) are ignored, one optional space after the
/// field name is trimmed, repeated `data:` lines join with newlines, and an
/// empty line dispatches whatever has accumulated.
#[derive(Debug, Default)]
pub struct RecordParser {
    id: String,
    event: String,
    data: Vec<String>,
    dirty: bool,
}

impl RecordParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (without its terminator); returns a record when the
    /// line completes one
    pub fn push_line(&mut self, line: &str) -> Option<Record> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() {
            return self.flush();
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "id" => self.id = value.to_string(),
            "event" => self.event = value.to_string(),
            "data" => self.data.push(value.to_string()),
            _ => return None,
        }

        self.dirty = true;
        None
    }

    /// Dispatch the accumulated record, if any field was set
    pub fn flush(&mut self) -> Option<Record> {
        if !self.dirty {
            return None;
        }

        let record = Record {
            id: std::mem::take(&mut self.id),
            event: std::mem::take(&mut self.event),
            data: std::mem::take(&mut self.data).join("\n"),
        };

        self.dirty = false;
        Some(record)
    }
}

enum Flow {
    Reconnect,
    Shutdown,
}

/// A reconnecting reader for one event-stream URL
///
/// Records are delivered through the caller's channel; the watch signal
/// terminates the reader cleanly, which closes that channel.
pub struct EventStream {
    http: reqwest::Client,
    url: String,
}

impl EventStream {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub async fn run(self, records: mpsc::Sender<Record>, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                return;
            }

            match self.connect_once(&records, &mut shutdown).await {
                Flow::Shutdown => return,
                Flow::Reconnect => {
                    tracing::warn!(url = %self.url, "stream ended, reconnecting");

                    tokio::select! {
                        _ = tokio::time::sleep(RECONNECT_DELAY) => {}
                        _ = shutdown.changed() => return,
                    }
                }
            }
        }
    }

    async fn connect_once(
        &self,
        records: &mpsc::Sender<Record>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Flow {
        let request = self
            .http
            .get(&self.url)
            .header(header::ACCEPT, "text/event-stream")
            .send();

        let response = tokio::select! {
            response = request => response,
            _ = shutdown.changed() => return Flow::Shutdown,
        };

        let response = match response {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!(url = %self.url, status = %response.status(), "unexpected status");
                return Flow::Reconnect;
            }
            Err(err) => {
                tracing::warn!(url = %self.url, error = %err, "connection failed");
                return Flow::Reconnect;
            }
        };

        let mut body = response.bytes_stream();
        let mut parser = RecordParser::new();
        let mut buffer: Vec<u8> = Vec::new();

        loop {
            let chunk = tokio::select! {
                chunk = body.next() => chunk,
                _ = shutdown.changed() => return Flow::Shutdown,
            };

            match chunk {
                // End of input dispatches whatever accumulated
                None => {
                    if let Some(record) = parser.flush() {
                        if records.send(record).await.is_err() {
                            return Flow::Shutdown;
                        }
                    }

                    return Flow::Reconnect;
                }

                Some(Err(err)) => {
                    tracing::warn!(url = %self.url, error = %err, "read failed");
                    return Flow::Reconnect;
                }

                Some(Ok(bytes)) => {
                    buffer.extend_from_slice(&bytes);

                    while let Some(end) = buffer.iter().position(|&byte| byte == b'\n') {
                        let line: Vec<u8> = buffer.drain(..=end).collect();
                        let line = String::from_utf8_lossy(&line[..line.len() - 1]).into_owned();

                        if let Some(record) = parser.push_line(&line) {
                            if records.send(record).await.is_err() {
                                return Flow::Shutdown;
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn feed(lines: &[&str]) -> Vec<Record> {
        let mut parser = RecordParser::new();
        let mut records = Vec::new();

        for line in lines {
            records.extend(parser.push_line(line));
        }
        records.extend(parser.flush());

        records
    }

    #[test]
    fn dispatches_on_the_empty_line() {
        let records = feed(&["event: message", "data: {\"kind\":\"ping\"}", "", "data: next"]);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].event, "message");
        assert_eq!(records[0].data, "{\"kind\":\"ping\"}");
        assert_eq!(records[1].data, "next");
    }

    #[test]
    fn comments_are_ignored() {
        let records = feed(&[": keep-alive", "", ": another", "data: real", ""]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data, "real");
    }

    #[test]
    fn repeated_data_lines_join_with_newlines() {
        let records = feed(&["data: one", "data: two", "data: three", ""]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data, "one\ntwo\nthree");
    }

    #[rstest]
    #[case("data: padded", "padded")]
    #[case("data:unpadded", "unpadded")]
    #[case("data:  two spaces", " two spaces")]
    fn one_leading_space_is_trimmed(#[case] line: &str, #[case] expected: &str) {
        let records = feed(&[line, ""]);

        assert_eq!(records[0].data, expected);
    }

    #[test]
    fn carriage_returns_are_stripped() {
        let records = feed(&["id: 7\r", "data: crlf\r", "\r"]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "7");
        assert_eq!(records[0].data, "crlf");
    }

    #[test]
    fn end_of_input_flushes_a_partial_record() {
        let records = feed(&["data: tail"]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data, "tail");
    }

    #[test]
    fn end_of_input_without_fields_dispatches_nothing() {
        assert!(feed(&[": comment only"]).is_empty());
        assert!(feed(&[]).is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let records = feed(&["retry: 3000", "data: kept", ""]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data, "kept");
    }
}
