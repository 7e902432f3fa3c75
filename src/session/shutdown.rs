use tokio::select;
use tokio_util::sync::CancellationToken;

/// Detects signals sent to the process, or a shutdown requested from inside the session.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => (),
    };
}
