/// The minimal view of an inbound HTTP request the admission layer
/// needs. An adapter crate implements this against whatever HTTP
/// library (axum, hyper, ...) a deployment actually runs.
pub trait HttpRequestContext: Send + Sync {
    fn method(&self) -> &str;
    fn path(&self) -> &str;
    fn header(&self, name: &str) -> Option<&str>;
    fn body(&self) -> &[u8];
}

/// The minimal sink the admission layer writes a rejection response to.
pub trait ResponseWriter: Send {
    fn write_status(&mut self, status: u16);
    fn write_header(&mut self, name: &str, value: &str);
    fn write_json_body(&mut self, body: &serde_json::Value);
}
