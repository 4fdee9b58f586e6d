use chrono::NaiveDate;
use gotour_booking::{
    BookingWorkflow, ErrorReason, Field, Step, WorkflowConfig, WorkflowError, WorkflowServices,
    WorkflowState,
};
use gotour_core::payment::MockPaymentService;
use gotour_core::repository::{InMemoryCatalog, MockBookingService};
use gotour_core::supplier::MockInventoryService;
use gotour_core::{
    AuthProvider, AuthSession, AvailabilityResult, BearerAuthProvider, BookingPayload, Hotel,
    RoomType, ServiceError, StaticAuthProvider, Tour, TourDate,
};
use gotour_shared::{BookingType, ResourceType};
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    inventory: Arc<MockInventoryService>,
    bookings: Arc<MockBookingService>,
    payments: Arc<MockPaymentService>,
    catalog: InMemoryCatalog,
}

impl Harness {
    fn new() -> Self {
        let catalog = InMemoryCatalog::new()
            .with_hotel(Hotel {
                id: "hotel-danang".into(),
                name: "Da Nang Beach Resort".into(),
                room_types: vec![RoomType {
                    id: "deluxe".into(),
                    name: "Deluxe Ocean".into(),
                    price: Some(1_000_000),
                    discounted_price: None,
                    capacity: Some(2),
                    total_rooms: Some(10),
                }],
            })
            .with_tour(Tour {
                id: "tour-halong".into(),
                name: "Ha Long Bay Cruise".into(),
                price: Some(2_000_000),
                discounted_price: Some(1_500_000),
                max_group_size: Some(8),
                available_dates: vec![TourDate {
                    id: "dec-01".into(),
                    start_date: day("2026-12-01"),
                    end_date: Some(day("2026-12-03")),
                }],
            });

        Self {
            inventory: Arc::new(MockInventoryService::new()),
            bookings: Arc::new(MockBookingService::new()),
            payments: Arc::new(MockPaymentService::new()),
            catalog,
        }
    }

    fn services(&self) -> WorkflowServices {
        WorkflowServices {
            inventory: self.inventory.clone(),
            bookings: self.bookings.clone(),
            payments: self.payments.clone(),
        }
    }

    async fn open(&self, resource_type: ResourceType, id: &str, auth: Arc<dyn AuthProvider>) -> BookingWorkflow {
        BookingWorkflow::open(
            &self.catalog,
            resource_type,
            id,
            self.services(),
            auth,
            WorkflowConfig::default(),
            day("2026-10-17"),
        )
        .await
        .unwrap()
    }
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn signed_in() -> Arc<dyn AuthProvider> {
    Arc::new(StaticAuthProvider::new(AuthSession::authenticated("token-123", None)))
}

async fn set(wf: &BookingWorkflow, field: Field, value: &str) {
    wf.set_field(field, value.to_string()).await.unwrap();
}

/// Fill every hotel step and stop on the payment step.
async fn hotel_ready_to_confirm(wf: &BookingWorkflow) {
    set(wf, Field::CheckIn, "2026-11-10").await;
    set(wf, Field::CheckOut, "2026-11-13").await;
    set(wf, Field::Adults, "2").await;
    assert_eq!(wf.advance().await.unwrap(), WorkflowState::Editing { step: Step::ContactInfo });

    set(wf, Field::FullName, "Pham Thu Ha").await;
    set(wf, Field::Email, "thuha@example.vn").await;
    set(wf, Field::Phone, "0987654321").await;
    set(wf, Field::Identification, "079201001234").await;
    assert_eq!(wf.advance().await.unwrap(), WorkflowState::Editing { step: Step::Payment });
}

#[tokio::test]
async fn test_hotel_booking_happy_path() {
    let harness = Harness::new();
    let wf = harness.open(ResourceType::Hotel, "hotel-danang", signed_in()).await;
    hotel_ready_to_confirm(&wf).await;

    assert_eq!(wf.snapshot().await.price.total, 3_150_000);

    let WorkflowState::AwaitingPayment { booking } = wf.confirm().await.unwrap() else {
        panic!("booking was not created");
    };
    assert_eq!(booking.booking_type, BookingType::Hotel);
    assert_eq!(booking.total_price, 3_150_000);

    let created = harness.bookings.created().await;
    assert_eq!(created.len(), 1);
    let BookingPayload::Hotel(payload) = &created[0].1 else {
        panic!("expected a hotel payload");
    };
    assert_eq!(payload.nights, 3);
    assert_eq!(payload.guests, 2);
    assert_eq!(payload.contact_info.phone.expose(), "0987654321");

    let WorkflowState::Confirmed { booking: confirmed, payment: Some(payment), notice: None } =
        wf.create_payment().await.unwrap()
    else {
        panic!("payment was not created");
    };
    assert_eq!(payment.booking_id, confirmed.id);
    assert_eq!(payment.amount, 3_150_000);
}

#[tokio::test]
async fn test_tour_booking_uses_discounted_price() {
    let harness = Harness::new();
    let wf = harness.open(ResourceType::Tour, "tour-halong", signed_in()).await;

    set(&wf, Field::TourDate, "dec-01").await;
    set(&wf, Field::Adults, "3").await;
    set(&wf, Field::Children, "1").await;
    wf.advance().await.unwrap();
    set(&wf, Field::FullName, "Vo Quoc Bao").await;
    set(&wf, Field::Email, "bao@example.vn").await;
    set(&wf, Field::Phone, "0909090909").await;
    wf.advance().await.unwrap();

    assert!(matches!(wf.confirm().await.unwrap(), WorkflowState::AwaitingPayment { .. }));

    let created = harness.bookings.created().await;
    let BookingPayload::Tour(payload) = &created[0].1 else {
        panic!("expected a tour payload");
    };
    assert_eq!(payload.total_price, 6_000_000);
    assert_eq!(payload.number_of_people, 4);
    assert_eq!(payload.start_date, day("2026-12-01"));
}

#[tokio::test]
async fn test_unavailable_never_submits_booking() {
    let harness = Harness::new();
    harness
        .inventory
        .respond_with(Ok(AvailabilityResult::unavailable("Only 0 rooms left")))
        .await;
    let wf = harness.open(ResourceType::Hotel, "hotel-danang", signed_in()).await;
    hotel_ready_to_confirm(&wf).await;

    let state = wf.confirm().await.unwrap();

    assert_eq!(
        state,
        WorkflowState::Errored {
            step: Step::Details,
            reason: ErrorReason::Unavailable { message: "Only 0 rooms left".into() },
        }
    );
    assert_eq!(harness.inventory.calls(), 1);
    assert_eq!(harness.bookings.calls(), 0);

    // Input survives; the user can change dates and go again
    let snapshot = wf.snapshot().await;
    assert_eq!(snapshot.values.get(&Field::FullName).map(String::as_str), Some("Pham Thu Ha"));
}

#[tokio::test]
async fn test_inventory_outage_is_network_error() {
    let harness = Harness::new();
    harness
        .inventory
        .respond_with(Err(ServiceError::Network("connection reset".into())))
        .await;
    let wf = harness.open(ResourceType::Hotel, "hotel-danang", signed_in()).await;
    hotel_ready_to_confirm(&wf).await;

    let state = wf.confirm().await.unwrap();

    assert!(matches!(
        state,
        WorkflowState::Errored { step: Step::Details, reason: ErrorReason::Network { .. } }
    ));
    assert_eq!(harness.bookings.calls(), 0);
}

#[tokio::test]
async fn test_rejected_booking_keeps_draft_for_retry() {
    let harness = Harness::new();
    harness
        .bookings
        .fail_next(ServiceError::Rejected("Room type is fully booked".into()))
        .await;
    let wf = harness.open(ResourceType::Hotel, "hotel-danang", signed_in()).await;
    hotel_ready_to_confirm(&wf).await;

    assert_eq!(
        wf.confirm().await.unwrap(),
        WorkflowState::Errored {
            step: Step::Payment,
            reason: ErrorReason::Rejected { message: "Room type is fully booked".into() },
        }
    );

    // Retry from the same step without re-entering anything
    assert!(matches!(wf.confirm().await.unwrap(), WorkflowState::AwaitingPayment { .. }));
    assert_eq!(harness.bookings.calls(), 2);
    assert_eq!(harness.bookings.created().await.len(), 1);
}

#[tokio::test]
async fn test_payment_failure_keeps_single_booking() {
    let harness = Harness::new();
    harness.payments.fail_next(ServiceError::Timeout(10_000)).await;
    let wf = harness.open(ResourceType::Hotel, "hotel-danang", signed_in()).await;
    hotel_ready_to_confirm(&wf).await;

    wf.confirm().await.unwrap();
    let state = wf.create_payment().await.unwrap();

    let created = harness.bookings.created().await;
    assert_eq!(created.len(), 1);
    let booking_id = &created[0].0;

    let WorkflowState::Confirmed { booking, payment: None, notice: Some(notice) } = state else {
        panic!("expected confirmation without payment, got {:?}", state);
    };
    assert_eq!(&booking.id, booking_id);
    assert!(notice.contains(booking_id.as_str()));

    // Terminal: no automatic retry, no second booking
    assert!(matches!(wf.create_payment().await, Err(WorkflowError::InvalidTransition { .. })));
    assert!(matches!(wf.confirm().await, Err(WorkflowError::InvalidTransition { .. })));
    assert_eq!(harness.payments.calls(), 1);
    assert_eq!(harness.bookings.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_confirms_create_one_booking() {
    let harness = Harness::new();
    harness.bookings.set_delay(Duration::from_millis(500));
    let wf = harness.open(ResourceType::Hotel, "hotel-danang", signed_in()).await;
    hotel_ready_to_confirm(&wf).await;

    let (first, second) = tokio::join!(wf.confirm(), wf.confirm());

    let outcomes = [first, second];
    assert_eq!(
        outcomes.iter().filter(|r| matches!(r, Ok(WorkflowState::AwaitingPayment { .. }))).count(),
        1
    );
    assert_eq!(
        outcomes.iter().filter(|r| matches!(r, Err(WorkflowError::Ignored))).count(),
        1
    );
    assert_eq!(harness.bookings.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_submission_cannot_be_discarded() {
    let harness = Harness::new();
    harness.bookings.set_delay(Duration::from_millis(500));
    let wf = harness.open(ResourceType::Hotel, "hotel-danang", signed_in()).await;
    hotel_ready_to_confirm(&wf).await;

    let (confirmed, discarded) = tokio::join!(wf.confirm(), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        wf.discard().await
    });

    assert!(matches!(confirmed, Ok(WorkflowState::AwaitingPayment { .. })));
    assert_eq!(
        discarded,
        Err(WorkflowError::InvalidTransition { from: "submitting", action: "discard the session" })
    );
    assert!(wf.discard().await.is_err());

    wf.create_payment().await.unwrap();
    assert!(wf.discard().await.is_ok());
    assert!(wf.state().await.is_finished());
}

#[tokio::test]
async fn test_sign_in_required_before_any_remote_call() {
    let harness = Harness::new();
    let auth = Arc::new(BearerAuthProvider::new());
    let wf = harness.open(ResourceType::Hotel, "hotel-danang", auth.clone()).await;
    hotel_ready_to_confirm(&wf).await;

    assert_eq!(
        wf.confirm().await.unwrap(),
        WorkflowState::Errored { step: Step::Payment, reason: ErrorReason::AuthRequired }
    );
    assert_eq!(harness.inventory.calls(), 0);
    assert_eq!(harness.bookings.calls(), 0);

    // Signing in resumes with the same draft
    auth.sign_in("fresh-token", None).await;
    assert!(matches!(wf.confirm().await.unwrap(), WorkflowState::AwaitingPayment { .. }));
}

#[tokio::test]
async fn test_confirm_sends_user_to_first_invalid_step() {
    let harness = Harness::new();
    let wf = harness.open(ResourceType::Hotel, "hotel-danang", signed_in()).await;
    hotel_ready_to_confirm(&wf).await;

    // Still on the payment step, but a detail edit broke the party size
    set(&wf, Field::Adults, "5").await;

    let WorkflowState::Errored { step, reason: ErrorReason::Validation { errors } } =
        wf.confirm().await.unwrap()
    else {
        panic!("expected a validation error");
    };
    assert_eq!(step, Step::Details);
    assert!(errors.contains_key(&Field::Adults));
    assert_eq!(harness.inventory.calls(), 0);
}

#[tokio::test]
async fn test_back_navigation_and_exit() {
    let harness = Harness::new();
    let wf = harness.open(ResourceType::Hotel, "hotel-danang", signed_in()).await;
    hotel_ready_to_confirm(&wf).await;

    assert_eq!(wf.back().await.unwrap(), WorkflowState::Editing { step: Step::ContactInfo });
    assert_eq!(wf.back().await.unwrap(), WorkflowState::Editing { step: Step::Details });
    assert_eq!(wf.back().await.unwrap(), WorkflowState::Exited);
    assert!(wf.set_field(Field::Adults, "1".into()).await.is_err());
}

#[tokio::test]
async fn test_back_refused_after_submission() {
    let harness = Harness::new();
    let wf = harness.open(ResourceType::Hotel, "hotel-danang", signed_in()).await;
    hotel_ready_to_confirm(&wf).await;
    wf.confirm().await.unwrap();

    assert!(matches!(
        wf.back().await,
        Err(WorkflowError::InvalidTransition { from: "awaiting_payment", .. })
    ));
    assert!(wf.set_field(Field::Adults, "1".into()).await.is_err());
}
