use crate::{
    api::{attendance, dashboard},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::anyhow;

pub type LimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-client limit of `requests_per_min` with an equal burst. The returned
/// config shares its state with every `Governor` built from it.
pub fn limiter_config(requests_per_min: u32) -> anyhow::Result<LimiterConfig> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {} per minute", requests_per_min))?;
    Ok(cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiter: &LimiterConfig) {
    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Governor::new(limiter)) // rate limiting
            .configure(api_routes),
    );
}

pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/attendance")
            .route("/checkin", web::post().to(attendance::check_in))
            .route("/checkout", web::post().to(attendance::check_out))
            .route("/today", web::get().to(attendance::today_status))
            .route("/my-history", web::get().to(attendance::my_history))
            .route("/my-summary", web::get().to(attendance::my_summary))
            // manager
            .route("/all", web::get().to(attendance::list_all))
            .route("/employee/{id}", web::get().to(attendance::employee_attendance))
            .route("/summary", web::get().to(attendance::team_summary))
            .route("/export", web::get().to(attendance::export_csv))
            .route("/today-status", web::get().to(attendance::today_team_status)),
    )
    .service(
        web::scope("/dashboard")
            .route("/employee", web::get().to(dashboard::employee_dashboard))
            .route("/manager", web::get().to(dashboard::manager_dashboard)),
    );
}
