use pretty_assertions::assert_eq;
use uuid::Uuid;

use slotbook_api::gateway::{MockExternalRelay, MockPrivilegedGateway};
use slotbook_api::workflow::confirmation::ConfirmationWorkflow;
use slotbook_api::workflow::{MockWorkflowStore, ReservationView};
use slotbook_core::errors::BookingError;
use slotbook_core::models::reservation::ReservationFilters;
use slotbook_core::models::settings::ReservationSetting;

use crate::test_utils::{
    sample_reservation, settings_with_auto_message, settings_without_message,
};

fn quiet_mocks() -> (MockWorkflowStore, MockPrivilegedGateway, MockExternalRelay) {
    (
        MockWorkflowStore::new(),
        MockPrivilegedGateway::new(),
        MockExternalRelay::new(),
    )
}

#[test_log::test(tokio::test)]
async fn confirm_with_explicit_message_dispatches_all_channels() {
    let (mut store, mut gateway, mut relay) = quiet_mocks();
    let owner_id = Uuid::new_v4();
    let facility_id = Uuid::new_v4();
    let confirmed = sample_reservation(facility_id, "confirmed");
    let reservation_id = confirmed.id;
    let user_id = confirmed.user_id;

    {
        let confirmed = confirmed.clone();
        store
            .expect_confirm_reservation_owned()
            .withf(move |o, r| *o == owner_id && *r == reservation_id)
            .times(1)
            .returning(move |_, _| Ok(confirmed.clone()));
    }
    store
        .expect_get_settings()
        .returning(move |fid| Ok(settings_without_message(fid)));
    store
        .expect_insert_thread_message()
        .withf(move |fid, sid, body| {
            *fid == facility_id && *sid == owner_id && body == "See you at 10:00"
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    store
        .expect_insert_notification()
        .withf(move |payload| {
            payload.user_id == user_id
                && payload.message == "See you at 10:00"
                && payload.kind == "reservation_confirmed"
        })
        .times(1)
        .returning(|_| Ok(()));
    {
        let confirmed = confirmed.clone();
        store
            .expect_list_reservations()
            .times(1)
            .returning(move |_, _| Ok(vec![confirmed.clone()]));
    }
    gateway.expect_confirm_reservation().never();
    gateway.expect_send_notification().never();
    relay.expect_deliver().times(1).returning(|_| Ok(()));

    let workflow = ConfirmationWorkflow::new(&store, &gateway, &relay);
    let mut view = ReservationView::default();
    let outcome = workflow
        .confirm(
            owner_id,
            reservation_id,
            Some("See you at 10:00"),
            ReservationFilters::default(),
            &mut view,
        )
        .await
        .unwrap();

    assert_eq!(outcome.reservation.status, "confirmed");
    let report = outcome.fanout.unwrap();
    assert!(report.thread_message);
    assert!(report.in_app);
    assert!(!report.in_app_via_gateway);
    assert!(report.relay);
    assert_eq!(outcome.reservations.len(), 1);
    assert_eq!(view.rows.len(), 1);
}

#[tokio::test]
async fn no_message_configured_skips_dispatch_entirely() {
    let (mut store, mut gateway, mut relay) = quiet_mocks();
    let owner_id = Uuid::new_v4();
    let confirmed = sample_reservation(Uuid::new_v4(), "confirmed");
    let reservation_id = confirmed.id;

    {
        let confirmed = confirmed.clone();
        store
            .expect_confirm_reservation_owned()
            .returning(move |_, _| Ok(confirmed.clone()));
    }
    store
        .expect_get_settings()
        .returning(move |fid| Ok(settings_without_message(fid)));
    store.expect_insert_thread_message().never();
    store.expect_insert_notification().never();
    gateway.expect_send_notification().never();
    relay.expect_deliver().never();
    {
        let confirmed = confirmed.clone();
        store
            .expect_list_reservations()
            .returning(move |_, _| Ok(vec![confirmed.clone()]));
    }

    let workflow = ConfirmationWorkflow::new(&store, &gateway, &relay);
    let mut view = ReservationView::default();
    let outcome = workflow
        .confirm(
            owner_id,
            reservation_id,
            None,
            ReservationFilters::default(),
            &mut view,
        )
        .await
        .unwrap();

    assert!(outcome.fanout.is_none());
}

#[tokio::test]
async fn facility_default_text_used_when_no_explicit_message() {
    let (mut store, mut gateway, mut relay) = quiet_mocks();
    let owner_id = Uuid::new_v4();
    let confirmed = sample_reservation(Uuid::new_v4(), "confirmed");
    let reservation_id = confirmed.id;

    {
        let confirmed = confirmed.clone();
        store
            .expect_confirm_reservation_owned()
            .returning(move |_, _| Ok(confirmed.clone()));
    }
    store
        .expect_get_settings()
        .returning(move |fid| Ok(settings_with_auto_message(fid, "ご予約を受け付けました")));
    store
        .expect_insert_thread_message()
        .withf(|_, _, body| body == "ご予約を受け付けました")
        .times(1)
        .returning(|_, _, _| Ok(()));
    store
        .expect_insert_notification()
        .withf(|payload| payload.message == "ご予約を受け付けました")
        .times(1)
        .returning(|_| Ok(()));
    relay.expect_deliver().times(1).returning(|_| Ok(()));
    gateway.expect_send_notification().never();
    {
        let confirmed = confirmed.clone();
        store
            .expect_list_reservations()
            .returning(move |_, _| Ok(vec![confirmed.clone()]));
    }

    let workflow = ConfirmationWorkflow::new(&store, &gateway, &relay);
    let mut view = ReservationView::default();
    let outcome = workflow
        .confirm(
            owner_id,
            reservation_id,
            None,
            ReservationFilters::default(),
            &mut view,
        )
        .await
        .unwrap();

    assert!(outcome.fanout.unwrap().thread_message);
}

#[test_log::test(tokio::test)]
async fn policy_rejection_falls_back_to_gateway() {
    let (mut store, mut gateway, mut relay) = quiet_mocks();
    let owner_id = Uuid::new_v4();
    let confirmed = sample_reservation(Uuid::new_v4(), "confirmed");
    let reservation_id = confirmed.id;

    store
        .expect_confirm_reservation_owned()
        .times(1)
        .returning(|_, _| Err(BookingError::Authorization("row policy rejected".into())));
    gateway
        .expect_confirm_reservation()
        .withf(move |o, r| *o == owner_id && *r == reservation_id)
        .times(1)
        .returning(|_, _| Ok(()));
    {
        let confirmed = confirmed.clone();
        store
            .expect_get_reservation_by_id()
            .times(1)
            .returning(move |_| Ok(Some(confirmed.clone())));
    }
    store
        .expect_get_settings()
        .returning(move |fid| Ok(settings_without_message(fid)));
    {
        let confirmed = confirmed.clone();
        store
            .expect_list_reservations()
            .returning(move |_, _| Ok(vec![confirmed.clone()]));
    }
    relay.expect_deliver().never();

    let workflow = ConfirmationWorkflow::new(&store, &gateway, &relay);
    let mut view = ReservationView::default();
    let outcome = workflow
        .confirm(
            owner_id,
            reservation_id,
            None,
            ReservationFilters::default(),
            &mut view,
        )
        .await
        .unwrap();

    assert_eq!(outcome.reservation.id, reservation_id);
    assert_eq!(outcome.reservation.status, "confirmed");
}

#[tokio::test]
async fn missing_row_never_triggers_gateway_fallback() {
    let (mut store, mut gateway, mut relay) = quiet_mocks();

    store
        .expect_confirm_reservation_owned()
        .times(1)
        .returning(|_, id| Err(BookingError::NotFound(format!("Reservation {} not found", id))));
    gateway.expect_confirm_reservation().never();
    store.expect_get_reservation_by_id().never();
    relay.expect_deliver().never();

    let workflow = ConfirmationWorkflow::new(&store, &gateway, &relay);
    let mut view = ReservationView::default();
    let result = workflow
        .confirm(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Some("hello"),
            ReservationFilters::default(),
            &mut view,
        )
        .await;

    assert!(matches!(result, Err(BookingError::NotFound(_))));
}

#[tokio::test]
async fn both_mutation_paths_failing_is_fatal() {
    let (mut store, mut gateway, mut relay) = quiet_mocks();

    store
        .expect_confirm_reservation_owned()
        .times(1)
        .returning(|_, _| Err(BookingError::Authorization("row policy rejected".into())));
    gateway
        .expect_confirm_reservation()
        .times(1)
        .returning(|_, _| Err(BookingError::Authorization("gateway rejected".into())));
    store.expect_insert_thread_message().never();
    store.expect_insert_notification().never();
    relay.expect_deliver().never();

    let workflow = ConfirmationWorkflow::new(&store, &gateway, &relay);
    let mut view = ReservationView::default();
    let result = workflow
        .confirm(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Some("hello"),
            ReservationFilters::default(),
            &mut view,
        )
        .await;

    assert!(matches!(result, Err(BookingError::Authorization(_))));
}

#[tokio::test]
async fn relay_failure_does_not_fail_the_confirmation() {
    let (mut store, mut gateway, mut relay) = quiet_mocks();
    let owner_id = Uuid::new_v4();
    let confirmed = sample_reservation(Uuid::new_v4(), "confirmed");
    let reservation_id = confirmed.id;

    {
        let confirmed = confirmed.clone();
        store
            .expect_confirm_reservation_owned()
            .returning(move |_, _| Ok(confirmed.clone()));
    }
    store
        .expect_get_settings()
        .returning(move |fid| Ok(settings_with_auto_message(fid, "Thanks!")));
    store
        .expect_insert_thread_message()
        .times(1)
        .returning(|_, _, _| Ok(()));
    store
        .expect_insert_notification()
        .times(1)
        .returning(|_| Ok(()));
    relay
        .expect_deliver()
        .times(1)
        .returning(|_| Err(BookingError::Notification("relay unreachable".into())));
    gateway.expect_send_notification().never();
    {
        let confirmed = confirmed.clone();
        store
            .expect_list_reservations()
            .returning(move |_, _| Ok(vec![confirmed.clone()]));
    }

    let workflow = ConfirmationWorkflow::new(&store, &gateway, &relay);
    let mut view = ReservationView::default();
    let outcome = workflow
        .confirm(
            owner_id,
            reservation_id,
            None,
            ReservationFilters::default(),
            &mut view,
        )
        .await
        .unwrap();

    let report = outcome.fanout.unwrap();
    assert!(report.thread_message);
    assert!(report.in_app);
    assert!(!report.relay);
}

#[tokio::test]
async fn unreadable_settings_still_sends_explicit_message() {
    let (mut store, mut gateway, mut relay) = quiet_mocks();
    let owner_id = Uuid::new_v4();
    let confirmed = sample_reservation(Uuid::new_v4(), "confirmed");
    let reservation_id = confirmed.id;

    {
        let confirmed = confirmed.clone();
        store
            .expect_confirm_reservation_owned()
            .returning(move |_, _| Ok(confirmed.clone()));
    }
    store
        .expect_get_settings()
        .returning(|_| Err(BookingError::Database(eyre::eyre!("connection reset"))));
    store
        .expect_insert_thread_message()
        .withf(|_, _, body| body == "We look forward to seeing you")
        .times(1)
        .returning(|_, _, _| Ok(()));
    store
        .expect_insert_notification()
        .times(1)
        .returning(|_| Ok(()));
    relay.expect_deliver().times(1).returning(|_| Ok(()));
    gateway.expect_send_notification().never();
    {
        let confirmed = confirmed.clone();
        store
            .expect_list_reservations()
            .returning(move |_, _| Ok(vec![confirmed.clone()]));
    }

    let workflow = ConfirmationWorkflow::new(&store, &gateway, &relay);
    let mut view = ReservationView::default();
    let outcome = workflow
        .confirm(
            owner_id,
            reservation_id,
            Some("  We look forward to seeing you  "),
            ReservationFilters::default(),
            &mut view,
        )
        .await
        .unwrap();

    assert!(outcome.fanout.unwrap().thread_message);
}

#[tokio::test]
async fn reconciliation_failure_keeps_the_optimistic_view() {
    let (mut store, mut gateway, mut relay) = quiet_mocks();
    let owner_id = Uuid::new_v4();
    let facility_id = Uuid::new_v4();
    let pending = sample_reservation(facility_id, "pending");
    let reservation_id = pending.id;
    let mut confirmed = pending.clone();
    confirmed.status = "confirmed".to_string();

    {
        let confirmed = confirmed.clone();
        store
            .expect_confirm_reservation_owned()
            .returning(move |_, _| Ok(confirmed.clone()));
    }
    store
        .expect_get_settings()
        .returning(move |fid| Ok(settings_without_message(fid)));
    store
        .expect_list_reservations()
        .times(1)
        .returning(|_, _| Err(BookingError::Database(eyre::eyre!("connection reset"))));
    gateway.expect_confirm_reservation().never();
    relay.expect_deliver().never();

    let workflow = ConfirmationWorkflow::new(&store, &gateway, &relay);
    let mut view = ReservationView::from_rows(vec![pending]);
    let outcome = workflow
        .confirm(
            owner_id,
            reservation_id,
            None,
            ReservationFilters::default(),
            &mut view,
        )
        .await
        .unwrap();

    assert_eq!(view.rows[0].status, "confirmed");
    assert_eq!(outcome.reservations[0].status, "confirmed");
}

#[test]
fn optimistic_update_only_touches_the_matching_row() {
    let facility_id = Uuid::new_v4();
    let target = sample_reservation(facility_id, "pending");
    let other = sample_reservation(facility_id, "pending");
    let target_id = target.id;

    let mut view = ReservationView::from_rows(vec![target, other]);
    view.apply_optimistic(target_id);

    assert_eq!(view.rows[0].status, "confirmed");
    assert_eq!(view.rows[1].status, "pending");
}

#[test]
fn reconciliation_replaces_the_view_wholesale() {
    let facility_id = Uuid::new_v4();
    let stale = sample_reservation(facility_id, "pending");
    let fresh = sample_reservation(facility_id, "confirmed");
    let fresh_id = fresh.id;

    let mut view = ReservationView::from_rows(vec![stale]);
    view.reconcile_from_source(vec![fresh]);

    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].id, fresh_id);
}

#[tokio::test]
async fn gateway_success_but_row_gone_is_not_found() {
    let (mut store, mut gateway, relay) = quiet_mocks();

    store
        .expect_confirm_reservation_owned()
        .returning(|_, _| Err(BookingError::Authorization("row policy rejected".into())));
    gateway
        .expect_confirm_reservation()
        .times(1)
        .returning(|_, _| Ok(()));
    store
        .expect_get_reservation_by_id()
        .times(1)
        .returning(|_| Ok(None));

    let workflow = ConfirmationWorkflow::new(&store, &gateway, &relay);
    let mut view = ReservationView::default();
    let result = workflow
        .confirm(
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            ReservationFilters::default(),
            &mut view,
        )
        .await;

    assert!(matches!(result, Err(BookingError::NotFound(_))));
}

#[test]
fn settings_fallback_defaults_leave_messaging_off() {
    let settings = ReservationSetting::defaults(Uuid::new_v4());
    assert_eq!(settings.confirmation_message(None), None);
    assert_eq!(
        settings.confirmation_message(Some("hand-typed")),
        Some("hand-typed".to_string())
    );
}
