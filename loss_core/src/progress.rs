//! Progress reporting
//!
//! Long analysis passes report coarse progress to an optional sink owned by
//! the host. [`ProgressScope`] opens a message when created and closes it
//! when dropped, so every exit path (including `?`) closes the scope.

/// Receives progress messages from the engine
pub trait ProgressSink {
    fn begin(&self, message: &str);
    fn update(&self, message: &str);
    fn end(&self);
}

/// Scoped progress message
pub struct ProgressScope<'a> {
    sink: Option<&'a dyn ProgressSink>,
}

impl<'a> ProgressScope<'a> {
    pub fn begin(sink: Option<&'a dyn ProgressSink>, message: &str) -> Self {
        log::info!("{}", message);
        if let Some(sink) = sink {
            sink.begin(message);
        }
        ProgressScope { sink }
    }

    pub fn update(&self, message: &str) {
        log::debug!("{}", message);
        if let Some(sink) = self.sink {
            sink.update(message);
        }
    }
}

impl Drop for ProgressScope<'_> {
    fn drop(&mut self) {
        if let Some(sink) = self.sink {
            sink.end();
        }
    }
}
