use actix_web::web;

pub mod companies;
pub mod decisions;
pub mod fixtures;
pub mod health;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure).service(
        web::scope("/v1")
            .configure(companies::configure)
            .configure(fixtures::configure)
            .configure(decisions::configure),
    );
}
