use axum::body::to_bytes;
use axum::extract::FromRequestParts;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use pretty_assertions::assert_eq;
use rstest::rstest;
use uuid::Uuid;

use slotbook_api::middleware::auth::{OwnerId, OWNER_ID_HEADER};
use slotbook_api::middleware::error_handling::AppError;
use slotbook_core::errors::BookingError;

#[rstest]
#[case(BookingError::NotFound("Facility not found".into()), StatusCode::NOT_FOUND)]
#[case(BookingError::Validation("slot is fully booked".into()), StatusCode::BAD_REQUEST)]
#[case(BookingError::Authorization("not the owner".into()), StatusCode::FORBIDDEN)]
#[case(BookingError::MissingColumn("customer_name".into()), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(BookingError::Notification("relay down".into()), StatusCode::INTERNAL_SERVER_ERROR)]
#[tokio::test]
async fn booking_errors_map_to_expected_status_codes(
    #[case] err: BookingError,
    #[case] expected: StatusCode,
) {
    let response = AppError(err).into_response();
    assert_eq!(response.status(), expected);
}

#[tokio::test]
async fn error_body_is_json_with_an_error_field() {
    let response = AppError(BookingError::Validation("slot is fully booked".into())).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Validation error: slot is fully booked");
}

#[tokio::test]
async fn owner_id_is_extracted_from_the_header() {
    let owner = Uuid::new_v4();
    let (mut parts, _) = Request::builder()
        .uri("/api/facilities")
        .header(OWNER_ID_HEADER, owner.to_string())
        .body(())
        .unwrap()
        .into_parts();

    let extracted = OwnerId::from_request_parts(&mut parts, &()).await.unwrap();
    assert_eq!(extracted.0, owner);
}

#[tokio::test]
async fn missing_owner_header_is_forbidden() {
    let (mut parts, _) = Request::builder()
        .uri("/api/facilities")
        .body(())
        .unwrap()
        .into_parts();

    let rejection = OwnerId::from_request_parts(&mut parts, &())
        .await
        .unwrap_err();
    assert_eq!(rejection.into_response().status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_owner_header_is_forbidden() {
    let (mut parts, _) = Request::builder()
        .uri("/api/facilities")
        .header(OWNER_ID_HEADER, "not-a-uuid")
        .body(())
        .unwrap()
        .into_parts();

    let rejection = OwnerId::from_request_parts(&mut parts, &())
        .await
        .unwrap_err();
    assert_eq!(rejection.into_response().status(), StatusCode::FORBIDDEN);
}
