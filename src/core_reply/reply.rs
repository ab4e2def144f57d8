use log::debug;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Pending reply lines sharing a single status code.
///
/// Every line is written as `DDD text\r\n`; no continuation-dash form is used.
/// The most recent non-zero code passed to [`ReplyQueue::add`] wins for the
/// whole batch.
#[derive(Debug, Default)]
pub struct ReplyQueue {
    code: u16,
    lines: Vec<String>,
}

impl ReplyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `text` under `code`. Embedded newlines split it into several lines.
    pub fn add(&mut self, code: u16, text: impl AsRef<str>) {
        self.code = code;
        self.push_lines(text.as_ref());
    }

    /// Queues more text under whatever code is already pending.
    pub fn append(&mut self, text: impl AsRef<str>) {
        self.push_lines(text.as_ref());
    }

    fn push_lines(&mut self, text: &str) {
        self.lines.extend(text.split('\n').map(|line| line.trim_end_matches('\r').to_string()));
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Renders the queued lines in wire format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&format!("{:03} {}\r\n", self.code, line));
        }
        out
    }

    /// Writes every queued line to `writer` and empties the queue.
    pub async fn flush<W>(&mut self, writer: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        if self.lines.is_empty() {
            return Ok(());
        }
        let rendered = self.render();
        for line in &self.lines {
            debug!("-> {:03} {}", self.code, line);
        }
        self.lines.clear();
        writer.write_all(rendered.as_bytes()).await?;
        writer.flush().await
    }
}
