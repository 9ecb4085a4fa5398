use rides_client::errors::Error;
use rides_client::retry::{MAX_ATTEMPTS, OperationKind, RetryCoordinator};

#[tokio::test(flavor = "current_thread")]
async fn validation_errors_surface_without_retry() {
    let coordinator = RetryCoordinator::new();

    let err = coordinator
        .execute(
            OperationKind::PriceEstimates,
            |_attempt| async {
                Err::<(), _>(Error::InvalidParam("simulated".into()))
            },
            |err| async move { Err(err) },
        )
        .await
        .expect_err("should not retry");

    match err {
        Error::InvalidParam(message) => assert!(message.contains("simulated")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test(flavor = "current_thread")]
async fn second_attempt_sees_its_number() {
    let coordinator = RetryCoordinator::new();

    let attempt = coordinator
        .execute(
            OperationKind::RideDetails,
            |attempt| async move {
                if attempt < MAX_ATTEMPTS {
                    Err(Error::UnableToAuthenticate("expired".into()))
                } else {
                    Ok(attempt)
                }
            },
            |_| async { Ok(()) },
        )
        .await
        .expect("retry should succeed");
    assert_eq!(attempt, 2);
}
