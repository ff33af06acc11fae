/// A resolved file upload, as handed over by the transport layer.
///
/// Owned by a single request; ingestion consumes it and nothing outlives the
/// request on error.
#[derive(Debug, Clone)]
pub struct RawUpload {
    pub filename: Option<String>,
    pub declared_mime: Option<String>,
    pub data: Vec<u8>,
}

impl RawUpload {
    pub fn new(filename: Option<String>, declared_mime: Option<String>, data: Vec<u8>) -> Self {
        Self {
            filename,
            declared_mime,
            data,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}
