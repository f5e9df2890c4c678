use std::sync::Arc;

use petcare_domain::lookup::BreedLookup;
use petcare_domain::services::{customers::CustomerService, telemetry::TelemetryGuard};
use petcare_storage::SeaOrmStorage;

#[derive(Clone)]
pub struct AppState {
    customers: Arc<CustomerService<SeaOrmStorage>>,
    breeds: Arc<dyn BreedLookup>,
    telemetry: TelemetryGuard,
}

impl AppState {
    pub fn new(
        customers: CustomerService<SeaOrmStorage>,
        breeds: Arc<dyn BreedLookup>,
        telemetry: TelemetryGuard,
    ) -> Self {
        Self {
            customers: Arc::new(customers),
            breeds,
            telemetry,
        }
    }

    pub fn customers(&self) -> &CustomerService<SeaOrmStorage> {
        self.customers.as_ref()
    }

    pub fn breeds(&self) -> &dyn BreedLookup {
        self.breeds.as_ref()
    }

    pub fn telemetry(&self) -> &TelemetryGuard {
        &self.telemetry
    }
}
