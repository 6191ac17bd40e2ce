use std::sync::Mutex;

/// Per-stream sink for the response-code-detail recorded when a message is
/// rejected. Owned by the caller and exclusively accessible for the
/// duration of a validation call.
pub trait StreamInfoSink: Send + Sync {
    fn set_response_code_detail(&self, detail: &'static str);
}

#[derive(Debug, Default)]
pub struct NoopStreamInfo;

impl StreamInfoSink for NoopStreamInfo {
    fn set_response_code_detail(&self, _detail: &'static str) {}
}

/// Keeps the most recently recorded detail so the codec (or a test) can
/// read it back after validation returns.
#[derive(Debug, Default)]
pub struct RecordingStreamInfo {
    detail: Mutex<Option<&'static str>>,
}

impl RecordingStreamInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn response_code_detail(&self) -> Option<&'static str> {
        *self.detail.lock().expect("detail lock must not be poisoned")
    }
}

impl StreamInfoSink for RecordingStreamInfo {
    fn set_response_code_detail(&self, detail: &'static str) {
        *self.detail.lock().expect("detail lock must not be poisoned") = Some(detail);
    }
}
