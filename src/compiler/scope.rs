use std::collections::HashMap;

/// Name to storage-slot bindings for the function being compiled.
///
/// Frames nest with the source: the outermost holds the parameters, and
/// every `for` and `var` pushes one. Lookups search innermost first, so an
/// inner binding shadows an outer one until its frame is popped.
#[derive(Debug, Clone)]
pub struct Scope<S> {
    frames: Vec<HashMap<String, S>>,
}

impl<S: Copy> Default for Scope<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Copy> Scope<S> {
    pub fn new() -> Self {
        Scope {
            frames: vec![HashMap::new()],
        }
    }

    /// Binds `name` in the innermost frame. Rebinding in the same frame
    /// replaces the earlier binding.
    pub fn bind(&mut self, name: &str, slot: S) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), slot);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<S> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).copied())
    }

    pub fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Drops the innermost frame. The outermost frame is never popped.
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
