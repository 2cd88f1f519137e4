#![allow(dead_code)]

use actix_web::HttpResponse;
use actix_web_security_headers::{RandomSource, SecurityHeadersError};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fills every buffer with the same byte and counts the calls.
#[derive(Debug, Default)]
pub struct CountingRandom {
    calls: AtomicUsize,
}

impl CountingRandom {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RandomSource for CountingRandom {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), SecurityHeadersError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        dest.fill(0xAB);
        Ok(())
    }
}

pub async fn html_page() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body("<!DOCTYPE html><html><body>ok</body></html>")
}

pub async fn json_api() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .body(r#"{"status":"ok"}"#)
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
