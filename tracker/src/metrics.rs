use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Gauge, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref TICKS_TOTAL: Counter = Counter::with_opts(Opts::new(
        "tracker_ticks_total",
        "Total replay timer ticks processed"
    ))
    .unwrap();
    pub static ref FIXES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "tracker_fixes_total",
        "Total fixes applied to the device state"
    ))
    .unwrap();
    pub static ref ALERTS_TOTAL: Counter = Counter::with_opts(Opts::new(
        "tracker_alerts_total",
        "Total emergency alerts raised"
    ))
    .unwrap();
    pub static ref PARSE_FALLBACKS_TOTAL: Counter = Counter::with_opts(Opts::new(
        "tracker_parse_fallbacks_total",
        "Total capture logs parsed without a coordinate entry"
    ))
    .unwrap();
    pub static ref HISTORY_SIZE: Gauge = Gauge::with_opts(Opts::new(
        "tracker_history_size",
        "Entries currently in the bounded history log"
    ))
    .unwrap();
}

pub fn init_metrics() {
    REGISTRY.register(Box::new(TICKS_TOTAL.clone())).unwrap();
    REGISTRY.register(Box::new(FIXES_TOTAL.clone())).unwrap();
    REGISTRY.register(Box::new(ALERTS_TOTAL.clone())).unwrap();
    REGISTRY
        .register(Box::new(PARSE_FALLBACKS_TOTAL.clone()))
        .unwrap();
    REGISTRY.register(Box::new(HISTORY_SIZE.clone())).unwrap();
}

pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}
