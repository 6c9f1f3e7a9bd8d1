use autometrics::prometheus_exporter;
use lazy_static::lazy_static;
use prometheus::exponential_buckets;
use prometheus::HistogramVec;
use prometheus::IntCounterVec;
use prometheus::IntGauge;
use prometheus::IntGaugeVec;
use prometheus::Opts;
use prometheus::Registry;
use tokio::sync::watch;
use warp::Filter;
use warp::Rejection;
use warp::Reply;

lazy_static! {
    pub static ref SNMP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("snmp_requests_total", "SNMP requests issued, by device and operation"),
        &["device", "op"]
    )
    .expect("metric can not be created");

    pub static ref SNMP_REQUEST_TIMEOUTS: IntCounterVec = IntCounterVec::new(
        Opts::new("snmp_request_timeouts_total", "SNMP requests with no response, by device and operation"),
        &["device", "op"]
    )
    .expect("metric can not be created");

    pub static ref SNMP_REQUEST_ERRORS: IntCounterVec = IntCounterVec::new(
        Opts::new("snmp_request_errors_total", "Failed SNMP requests, by device and operation"),
        &["device", "op"]
    )
    .expect("metric can not be created");

    pub static ref SNMP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        prometheus::HistogramOpts::new(
            "snmp_request_duration_ms",
            "Histogram of SNMP request round-trip duration in ms"
        )
        .buckets(exponential_buckets(1.0, 2.0, 12).expect("bucket layout is valid")),
        &["device", "op"]
    )
    .expect("metric can not be created");

    pub static ref SNMP_LAST_REQUEST: IntGaugeVec = IntGaugeVec::new(
        Opts::new("snmp_last_request_timestamp_seconds", "Wall clock of the last request per device"),
        &["device"]
    )
    .expect("metric can not be created");

    pub static ref NAMESPACE_LAST_UPDATE: IntGauge = IntGauge::new(
        "namespace_last_update_timestamp_seconds",
        "Wall clock of the last completed polling pass"
    )
    .expect("metric can not be created");

    pub static ref DEVICES_ONLINE: IntGauge = IntGauge::new(
        "devices_online",
        "Devices that finished bring-up and are being polled"
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

fn register_custom_metrics() {
    REGISTRY
        .register(Box::new(SNMP_REQUESTS_TOTAL.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(SNMP_REQUEST_TIMEOUTS.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(SNMP_REQUEST_ERRORS.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(SNMP_REQUEST_DURATION.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(SNMP_LAST_REQUEST.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(NAMESPACE_LAST_UPDATE.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(DEVICES_ONLINE.clone()))
        .expect("collector can be registered");
}

pub async fn start_server(port: u16, mut shutdown_signal: watch::Receiver<()>) {
    register_custom_metrics();

    let metrics_route = warp::path!("metrics").and_then(metrics_handler);

    let (_, server) =
        warp::serve(metrics_route).bind_with_graceful_shutdown(([0, 0, 0, 0], port), async move {
            let _ = shutdown_signal.changed().await;
        });
    server.await;
}

async fn metrics_handler() -> Result<impl Reply, Rejection> {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        eprintln!("could not encode custom metrics: {}", e);
    };
    let mut res = match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("custom metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    };

    res.push_str(&get_metrics_body());
    Ok(res)
}

/// Export metrics for Prometheus to scrape
pub fn get_metrics_body() -> String {
    let autometrics_response = prometheus_exporter::encode_http_response();
    autometrics_response.into_body()
}
