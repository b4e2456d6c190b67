use http::Method;
use muse_config::{AnyOrArray, CorsConfig};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

/// Build a Tower CORS layer from configuration
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(if config.credentials {
            // Wildcard headers cannot be combined with credentials
            AllowHeaders::list([http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        } else {
            AllowHeaders::any()
        });

    layer = match &config.origins {
        AnyOrArray::Any if config.credentials => layer.allow_origin(AllowOrigin::mirror_request()),
        AnyOrArray::Any => layer.allow_origin(AllowOrigin::any()),
        AnyOrArray::List(origins) => {
            let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            layer.allow_origin(origins)
        }
    };

    if config.credentials {
        layer = layer.allow_credentials(true);
    }

    if let Some(duration) = config.max_age_duration() {
        layer = layer.max_age(duration);
    }

    layer
}
