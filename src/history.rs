use log::debug;

/// Push-style location history, the single source of truth for where the
/// reader is. Pushing drops any forward entries, like a browser does.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
}

impl History {
    pub fn new(start: impl Into<String>) -> Self {
        History {
            entries: vec![start.into()],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &str {
        &self.entries[self.cursor]
    }

    pub fn push(&mut self, path: impl Into<String>) {
        let path = path.into();
        debug!("Navigating to {}", path);
        self.entries.truncate(self.cursor + 1);
        self.entries.push(path);
        self.cursor = self.entries.len() - 1;
    }

    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
