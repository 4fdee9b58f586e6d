use chrono::{Duration as Days, NaiveDate, Utc};
use gotour_booking::{BookingWorkflow, PaymentOrchestrator, WorkflowConfig, WorkflowServices};
use gotour_core::payment::MockPaymentService;
use gotour_core::repository::{InMemoryCatalog, MockBookingService};
use gotour_core::supplier::MockInventoryService;
use gotour_core::{BearerAuthProvider, Hotel, ResourceCatalog, RoomType, Tour, TourDate};
use gotour_store::{
    BackendClient, BackendKind, Config, HttpBookingService, HttpInventoryService,
    HttpPaymentService, HttpResourceCatalog,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A live booking session: its workflow and the bearer token last presented
/// for it.
pub struct Session {
    pub workflow: Arc<BookingWorkflow>,
    pub auth: Arc<BearerAuthProvider>,
}

pub type SessionStore = Arc<RwLock<HashMap<Uuid, Arc<Session>>>>;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub catalog: Arc<dyn ResourceCatalog>,
    pub services: WorkflowServices,
    pub payments: Arc<PaymentOrchestrator>,
    pub workflow: WorkflowConfig,
}

impl AppState {
    pub fn new(catalog: Arc<dyn ResourceCatalog>, services: WorkflowServices, workflow: WorkflowConfig) -> Self {
        let payments = Arc::new(PaymentOrchestrator::new(
            services.payments.clone(),
            workflow.request_timeout,
        ));

        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            catalog,
            services,
            payments,
            workflow,
        }
    }

    /// Wire collaborators according to `backend.kind`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let workflow = WorkflowConfig {
            request_timeout: config.backend.request_timeout(),
            pricing: config.pricing.clone(),
        };

        let state = match config.backend.kind {
            BackendKind::Http => {
                let client = BackendClient::new(&config.backend.base_url, config.backend.request_timeout())?;
                tracing::info!("Using GoTour backend at {}", config.backend.base_url);

                let services = WorkflowServices {
                    inventory: Arc::new(HttpInventoryService::new(client.clone())),
                    bookings: Arc::new(HttpBookingService::new(client.clone())),
                    payments: Arc::new(HttpPaymentService::new(client.clone())),
                };
                Self::new(Arc::new(HttpResourceCatalog::new(client)), services, workflow)
            }
            BackendKind::Mock => {
                tracing::warn!("Using in-process mock backend; bookings are not persisted");
                Self::new(Arc::new(demo_catalog(today())), mock_services(), workflow)
            }
        };

        Ok(state)
    }

    pub async fn session(&self, id: &Uuid) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn mock_services() -> WorkflowServices {
    WorkflowServices {
        inventory: Arc::new(MockInventoryService::new()),
        bookings: Arc::new(MockBookingService::new()),
        payments: Arc::new(MockPaymentService::new()),
    }
}

/// Small catalog for the mock backend, with departures relative to `today`.
pub fn demo_catalog(today: NaiveDate) -> InMemoryCatalog {
    let departure = |id: &str, days: i64| TourDate {
        id: id.to_string(),
        start_date: today + Days::days(days),
        end_date: Some(today + Days::days(days + 2)),
    };

    InMemoryCatalog::new()
        .with_hotel(Hotel {
            id: "hotel-hoian".into(),
            name: "Hoi An Riverside Resort".into(),
            room_types: vec![
                RoomType {
                    id: "deluxe".into(),
                    name: "Deluxe River View".into(),
                    price: Some(1_000_000),
                    discounted_price: None,
                    capacity: Some(2),
                    total_rooms: Some(12),
                },
                RoomType {
                    id: "family".into(),
                    name: "Family Suite".into(),
                    price: Some(2_200_000),
                    discounted_price: Some(1_900_000),
                    capacity: Some(4),
                    total_rooms: Some(4),
                },
            ],
        })
        .with_tour(Tour {
            id: "tour-halong".into(),
            name: "Ha Long Bay 3 Days".into(),
            price: Some(2_000_000),
            discounted_price: Some(1_500_000),
            max_group_size: Some(12),
            available_dates: vec![departure("halong-1", 30), departure("halong-2", 60)],
        })
}
