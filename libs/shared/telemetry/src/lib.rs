// [libs/shared/telemetry/src/lib.rs]
/*!
 * =================================================================
 * APARATO: OBSERVABILITY BOOTSTRAP (ESTRATO L4)
 * RESPONSABILIDAD: TRAZADO ESTRUCTURADO Y CAPTURA GLOBAL DE PÁNICOS
 *
 * Dev mode prints compact, colorized, human-readable spans. Production
 * mode emits flattened JSON lines a log pipeline can ingest directly.
 * A global panic hook makes sure a thread dying mid-request still
 * leaves a structured trace of where and why, instead of only the
 * default stderr backtrace.
 * =================================================================
 */

use std::panic;
use tracing::{error, info, instrument};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as formatting_layer, EnvFilter};

/// Initializes the process-wide tracing subscriber and panic hook.
///
/// `service_name` seeds the default env-filter directive (`<service>=debug`
/// in debug builds, `<service>=info` in release) and tags every panic
/// record so multi-service logs stay attributable.
///
/// # Panics
/// Panics if a global subscriber has already been installed.
#[instrument(skip_all)]
pub fn init_tracing(service_name: &str) {
    let environmental_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{service_name}={level},tower_http=warn,hyper=warn,libsql=error",
            level = if cfg!(debug_assertions) { "debug" } else { "info" }
        )
        .into()
    });

    if cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(environmental_filter)
            .with(formatting_layer::layer().compact().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(environmental_filter)
            .with(formatting_layer::layer().json().flatten_event(true))
            .init();
    }

    let service_id_snapshot = service_name.to_string();
    panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("<non-string panic payload>");

        error!(
            target: "panic_monitor",
            service = %service_id_snapshot,
            location = %location,
            "🔥 [PANIC]: thread terminated. {payload}"
        );
    }));

    info!("👁️ [TELEMETRY_ONLINE]: tracing initialized for [{}]", service_name);
}
