use crate::{
    api::{attendance, holiday, leave_request, timeline},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

// Helper to build per-scope limiter
fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = 60_000 / requests_per_min as u64;
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms.max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()?;
    Some(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let routes = web::scope(&config.api_prefix)
        .service(
            web::scope("/attendance")
                // /attendance
                .service(
                    web::resource("")
                        .route(web::post().to(attendance::check_in))
                        .route(web::put().to(attendance::check_out)),
                )
                // /attendance/break/{kind}/start|end
                .service(
                    web::resource("/break/{kind}/start")
                        .route(web::put().to(attendance::start_break)),
                )
                .service(
                    web::resource("/break/{kind}/end").route(web::put().to(attendance::end_break)),
                )
                .service(web::resource("/timeline").route(web::get().to(timeline::get_timeline)))
                .service(
                    web::resource("/timeline/compute")
                        .route(web::post().to(timeline::compute_timeline)),
                )
                .service(web::resource("/summary").route(web::get().to(timeline::get_summary)))
                .service(
                    web::resource("/export").route(web::get().to(timeline::export_timeline)),
                ),
        )
        .service(
            web::scope("/holiday").service(
                web::resource("")
                    .route(web::get().to(holiday::list_holidays))
                    .route(web::post().to(holiday::create_holiday)),
            ),
        )
        .service(
            web::scope("/leave")
                // /leave
                .service(
                    web::resource("")
                        .route(web::get().to(leave_request::leave_list))
                        .route(web::post().to(leave_request::create_leave)),
                )
                // /leave/{id}/approve
                .service(
                    web::resource("/{id}/approve")
                        .route(web::put().to(leave_request::approve_leave)),
                )
                // /leave/{id}/reject
                .service(
                    web::resource("/{id}/reject")
                        .route(web::put().to(leave_request::reject_leave)),
                ),
        );

    // Authentication happens in the AuthUser extractor of every handler
    match build_limiter(config.rate_protected_per_min) {
        Some(limiter) => cfg.service(routes.wrap(limiter)),
        None => {
            tracing::warn!("Rate limiter config rejected, serving without rate limiting");
            cfg.service(routes)
        }
    };
}
