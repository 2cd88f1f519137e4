use actix_web::http::header::HeaderMap;
use actix_web_security_headers::{
    engine::PolicyContext, security::RequestSecurityState, HeaderPolicyCollection,
    PolicyEvaluation,
};
use std::sync::Arc;

fn main() {
    println!("Actix Web Security Headers Example");

    let collection = Arc::new(HeaderPolicyCollection::default_security_headers());
    let state = RequestSecurityState::default();
    let ctx = PolicyContext::new(&state).with_content_type("text/html; charset=utf-8");

    let mut headers = HeaderMap::new();
    let mut evaluation = PolicyEvaluation::new(collection);
    evaluation.write_headers(&ctx, &mut headers);
    evaluation.finish();

    println!("Default headers for an HTML response:");
    for (name, value) in headers.iter() {
        println!("  {}: {}", name, value.to_str().unwrap_or("<binary>"));
    }
}
