//! Telemetry for Muse
//!
//! Structured logging through `tracing`, with optional OTLP export of traces
//! and metrics

#![allow(clippy::must_use_candidate)]

pub mod metrics;

use muse_config::{ExportProtocol, ExporterConfig, LogFormat, TelemetryConfig};
use opentelemetry::trace::TracerProvider;
use opentelemetry::{KeyValue, global};
use opentelemetry_otlp::{WithExportConfig, WithHttpConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_semantic_conventions::resource as semconv;

/// Filter used when neither `RUST_LOG` nor the config sets one
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Guard that ensures proper cleanup of telemetry resources on drop
pub struct TelemetryGuard {
    meter_provider: Option<SdkMeterProvider>,
    tracer_provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.meter_provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("failed to shutdown meter provider: {e}");
        }
        if let Some(provider) = self.tracer_provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("failed to shutdown tracer provider: {e}");
        }
    }
}

/// Resource attributes attached to every exported span and metric
pub fn resource(config: &TelemetryConfig) -> Resource {
    let mut attrs = vec![
        KeyValue::new(semconv::SERVICE_NAME, config.service_name.clone()),
        KeyValue::new(semconv::SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
    ];

    if let Some(environment) = &config.environment {
        attrs.push(KeyValue::new("deployment.environment.name", environment.clone()));
    }

    attrs.extend(
        config
            .resource_attributes
            .iter()
            .map(|(key, value)| KeyValue::new(key.clone(), value.clone())),
    );

    Resource::builder().with_attributes(attrs).build()
}

/// Resolve the log filter: `RUST_LOG`, then the configured level, then `info`
pub fn log_filter(config: Option<&TelemetryConfig>) -> String {
    std::env::var("RUST_LOG")
        .ok()
        .filter(|filter| !filter.trim().is_empty())
        .or_else(|| config.and_then(|c| c.log_level.clone()))
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned())
}

/// Initialize telemetry from configuration
///
/// Installs the global `tracing` subscriber. When an exporter is configured
/// traces and metrics are also exported over OTLP. Hold the returned guard
/// for the lifetime of the process.
///
/// # Errors
///
/// Returns an error if an OTLP exporter cannot be built
pub fn init(config: Option<&TelemetryConfig>) -> anyhow::Result<TelemetryGuard> {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_new(log_filter(config)).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let format = config.map_or(LogFormat::Text, |c| c.log_format);
    let (text_layer, json_layer) = match format {
        LogFormat::Text => (Some(tracing_subscriber::fmt::layer().with_target(true)), None),
        LogFormat::Json => (
            None,
            Some(tracing_subscriber::fmt::layer().json().with_current_span(true).with_span_list(false)),
        ),
    };

    let mut guard = TelemetryGuard {
        meter_provider: None,
        tracer_provider: None,
    };

    let otel_layer = match config {
        Some(telemetry_config) => match &telemetry_config.exporter {
            Some(exporter) => {
                let resource = resource(telemetry_config);

                let meter_provider = init_metrics(exporter, resource.clone())?;
                global::set_meter_provider(meter_provider.clone());
                guard.meter_provider = Some(meter_provider);

                let tracer_provider = init_tracer(exporter, telemetry_config.sampling_rate, resource)?;
                let tracer = tracer_provider.tracer("muse");
                global::set_tracer_provider(tracer_provider.clone());
                guard.tracer_provider = Some(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            }
            None => None,
        },
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text_layer)
        .with(json_layer)
        .with(otel_layer)
        .init();

    Ok(guard)
}

/// Initialize OTLP metrics export
fn init_metrics(config: &ExporterConfig, resource: Resource) -> anyhow::Result<SdkMeterProvider> {
    use opentelemetry_otlp::MetricExporter;
    use opentelemetry_sdk::metrics::PeriodicReader;

    let exporter = match config.protocol {
        ExportProtocol::Grpc => {
            warn_ignored_headers(config);
            MetricExporter::builder()
                .with_tonic()
                .with_endpoint(config.endpoint.as_str())
                .with_timeout(config.timeout())
                .build()
                .map_err(|e| anyhow::anyhow!("failed to build gRPC metrics exporter: {e}"))?
        }
        ExportProtocol::HttpProto => MetricExporter::builder()
            .with_http()
            .with_endpoint(config.endpoint.as_str())
            .with_timeout(config.timeout())
            .with_headers(config.headers.clone())
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP metrics exporter: {e}"))?,
    };

    let reader = PeriodicReader::builder(exporter)
        .with_interval(config.export_interval())
        .build();

    Ok(SdkMeterProvider::builder()
        .with_resource(resource)
        .with_reader(reader)
        .build())
}

/// Initialize OTLP trace export
fn init_tracer(
    config: &ExporterConfig,
    sampling_rate: f64,
    resource: Resource,
) -> anyhow::Result<SdkTracerProvider> {
    use opentelemetry_otlp::SpanExporter;
    use opentelemetry_sdk::trace::Sampler;

    let exporter = match config.protocol {
        ExportProtocol::Grpc => SpanExporter::builder()
            .with_tonic()
            .with_endpoint(config.endpoint.as_str())
            .with_timeout(config.timeout())
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build gRPC span exporter: {e}"))?,
        ExportProtocol::HttpProto => SpanExporter::builder()
            .with_http()
            .with_endpoint(config.endpoint.as_str())
            .with_timeout(config.timeout())
            .with_headers(config.headers.clone())
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP span exporter: {e}"))?,
    };

    let sampler = if sampling_rate >= 1.0 {
        Sampler::AlwaysOn
    } else if sampling_rate <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(sampling_rate)
    };

    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_sampler(Sampler::ParentBased(Box::new(sampler)))
        .with_batch_exporter(exporter)
        .build())
}

fn warn_ignored_headers(config: &ExporterConfig) {
    if !config.headers.is_empty() {
        eprintln!("telemetry exporter headers are only sent with the http_proto protocol");
    }
}
