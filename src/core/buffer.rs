//! Rendered entries waiting for the next flush

/// Append-only list of rendered entries, in logging order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryBuffer {
    entries: Vec<String>,
}

impl EntryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: String) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// All entries joined into one payload, each terminated by `\n`.
    pub fn payload(&self) -> String {
        let capacity = self.entries.iter().map(|entry| entry.len() + 1).sum();
        let mut payload = String::with_capacity(capacity);
        for entry in &self.entries {
            payload.push_str(entry);
            payload.push('\n');
        }
        payload
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
