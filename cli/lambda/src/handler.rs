//! Lambda invocation handler.

use fl_transformer::{FlowLogTransformer, InvocationStats};
use fl_types::NotificationEvent;
use lambda_runtime::{Error, LambdaEvent};
use tracing::{Instrument, error, info, info_span};

/// Processes one S3 notification.
///
/// An aborted run is returned as an invocation error so the host applies
/// its retry policy.
pub async fn handle(
    transformer: &FlowLogTransformer,
    event: LambdaEvent<NotificationEvent>,
) -> Result<InvocationStats, Error> {
    let (payload, context) = event.into_parts();
    let span = info_span!(
        "invocation",
        request_id = %context.request_id,
        records = payload.records.len()
    );

    async {
        match transformer.process(&payload).await {
            Ok(stats) => {
                info!(
                    indexed = stats.documents_indexed,
                    skipped = stats.lines_skipped(),
                    "Invocation succeeded"
                );
                Ok(stats)
            }
            Err(e) => {
                error!(error = %e, "Invocation failed");
                Err(e.into())
            }
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_transformer::{LocalFetcher, StdoutIndexer, TransformerConfig};
    use lambda_runtime::Context;
    use std::sync::Arc;

    fn transformer(root: &std::path::Path, scratch: &std::path::Path) -> FlowLogTransformer {
        FlowLogTransformer::new(
            TransformerConfig::new("vpc-flow-logs").with_scratch_dir(scratch),
            Arc::new(LocalFetcher::new(root)),
            Arc::new(StdoutIndexer::with_writer(Box::new(std::io::sink()))),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_notification_succeeds() {
        let root = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let payload: NotificationEvent = serde_json::from_str(r#"{"Records": []}"#).unwrap();

        let stats = handle(
            &transformer(root.path(), scratch.path()),
            LambdaEvent::new(payload, Context::default()),
        )
        .await
        .unwrap();

        assert_eq!(stats.objects_processed, 0);
    }

    #[tokio::test]
    async fn test_missing_object_fails_invocation() {
        let root = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let payload = NotificationEvent::from_objects([("flow-logs", "missing.log.gz")]);

        let result = handle(
            &transformer(root.path(), scratch.path()),
            LambdaEvent::new(payload, Context::default()),
        )
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("missing.log.gz"));
    }
}
