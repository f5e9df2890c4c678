use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use actix_web::{body::to_bytes, http::StatusCode, test, web, App};
use async_trait::async_trait;
use petcare_domain::lookup::{AddressLookup, BreedLookup, LookupError};
use petcare_domain::model::{Address, Breed, BreedId, PostalCode};
use petcare_domain::services::{
    cache::AddressMemo,
    customers::CustomerService,
    telemetry::{init_telemetry, TelemetryConfig, TelemetryGuard},
};
use petcare_storage::SeaOrmStorage;
use serde_json::json;

use crate::handlers::{
    configure,
    customers::{CustomerResponse, PetResponse},
    lookups::BreedResponse,
    metrics_handler, ErrorBody,
};
use crate::state::AppState;

const SE: &str = "01001-000";
const COPACABANA: &str = "22070-002";
const UNKNOWN: &str = "99999-999";
const OUTAGE: &str = "50000-000";

/// Knows two postal codes, fails hard for `OUTAGE` and misses everything
/// else. Counts remote calls.
#[derive(Default)]
struct FakeViaCep {
    calls: AtomicUsize,
}

#[async_trait]
impl AddressLookup for FakeViaCep {
    async fn resolve(&self, postal_code: &PostalCode) -> Result<Address, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (street, neighborhood, city, state) = match postal_code.as_str() {
            SE => ("Praça da Sé", "Sé", "São Paulo", "SP"),
            COPACABANA => ("Avenida Atlântica", "Copacabana", "Rio de Janeiro", "RJ"),
            OUTAGE => return Err(LookupError::Unreachable("connection refused".into())),
            other => return Err(LookupError::NotFound(other.to_string())),
        };
        Ok(Address {
            postal_code: postal_code.clone(),
            street: street.into(),
            complement: String::new(),
            neighborhood: neighborhood.into(),
            city: city.into(),
            state: state.into(),
        })
    }
}

struct FakeDogApi;

#[async_trait]
impl BreedLookup for FakeDogApi {
    async fn breed(&self, id: &BreedId) -> Result<Breed, LookupError> {
        match id.as_str() {
            "labrador" => Ok(Breed {
                id: id.clone(),
                name: "Labrador Retriever".into(),
                description: "Friendly and outgoing.".into(),
                hypoallergenic: false,
            }),
            "timeout" => Err(LookupError::Unreachable("timed out".into())),
            other => Err(LookupError::NotFound(other.to_string())),
        }
    }
}

async fn storage() -> SeaOrmStorage {
    SeaOrmStorage::builder()
        .database_url("sqlite::memory:")
        .max_connections(1)
        .build()
        .await
        .expect("storage inits")
}

fn telemetry() -> TelemetryGuard {
    let config = TelemetryConfig::from_env("API_TEST").expect("telemetry config loads");
    init_telemetry(&config).expect("telemetry inits")
}

async fn build_state(viacep: Arc<FakeViaCep>) -> AppState {
    let customers = CustomerService::new(storage().await, viacep, AddressMemo::default());
    AppState::new(customers, Arc::new(FakeDogApi), telemetry())
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .service(web::scope("/api/v1").configure(configure))
                .route("/metrics", web::get().to(metrics_handler)),
        )
        .await
    };
}

fn customer_body(name: &str, postal_code: &str, breeds: &[&str]) -> serde_json::Value {
    let pets: Vec<_> = breeds
        .iter()
        .map(|breed| json!({ "name": format!("{breed} pup"), "breed": breed }))
        .collect();
    json!({
        "name": name,
        "address": { "postal_code": postal_code },
        "pets": pets,
    })
}

async fn read_json<T: serde::de::DeserializeOwned>(
    resp: actix_web::dev::ServiceResponse,
) -> T {
    let body = to_bytes(resp.into_body()).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[actix_web::test]
async fn creates_customer_with_resolved_address_and_pets() {
    let viacep = Arc::new(FakeViaCep::default());
    let app = test_app!(build_state(viacep.clone()).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/customers")
        .set_json(customer_body("Ana", "01001000", &["labrador", "beagle"]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: CustomerResponse = read_json(resp).await;

    assert_eq!(created.name, "Ana");
    assert_eq!(created.address.postal_code, SE);
    assert_eq!(created.address.city, "São Paulo");
    assert_eq!(created.pets.len(), 2);
    assert_eq!(created.pets[0].species, "Dog");
    assert_eq!(created.pets[1].breed, "beagle");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/customers/{}", created.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: CustomerResponse = read_json(resp).await;
    assert_eq!(fetched, created);
    assert_eq!(viacep.calls.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn second_customer_reuses_cached_address() {
    let viacep = Arc::new(FakeViaCep::default());
    let app = test_app!(build_state(viacep.clone()).await);

    for name in ["Ana", "Bia"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/customers")
            .set_json(customer_body(name, SE, &[]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get().uri("/api/v1/customers").to_request();
    let listed: Vec<CustomerResponse> = read_json(test::call_service(&app, req).await).await;
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|c| c.address.postal_code == SE));
    assert_eq!(viacep.calls.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn rejects_malformed_postal_code() {
    let viacep = Arc::new(FakeViaCep::default());
    let app = test_app!(build_state(viacep.clone()).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/customers")
        .set_json(customer_body("Ana", "0100-100", &[]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = read_json(resp).await;
    assert!(body.error.contains("postal code"));
    assert_eq!(viacep.calls.load(Ordering::SeqCst), 0);
}

#[actix_web::test]
async fn rejects_malformed_json_with_error_body() {
    let app = test_app!(build_state(Arc::default()).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/customers")
        .set_json(json!({ "name": "Ana" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = read_json(resp).await;
    assert!(body.error.starts_with("invalid request body"));
}

#[actix_web::test]
async fn unknown_postal_code_leaves_no_rows() {
    let app = test_app!(build_state(Arc::default()).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/customers")
        .set_json(customer_body("Ana", UNKNOWN, &["labrador"]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::get().uri("/api/v1/customers").to_request();
    let listed: Vec<CustomerResponse> = read_json(test::call_service(&app, req).await).await;
    assert!(listed.is_empty());
}

#[actix_web::test]
async fn lookup_outage_is_bad_gateway() {
    let app = test_app!(build_state(Arc::default()).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/customers")
        .set_json(customer_body("Ana", OUTAGE, &[]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn update_rewrites_name_and_address_but_keeps_pets() {
    let app = test_app!(build_state(Arc::default()).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/customers")
        .set_json(customer_body("Ana", SE, &["labrador"]))
        .to_request();
    let created: CustomerResponse = read_json(test::call_service(&app, req).await).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/customers/{}", created.id))
        .set_json(customer_body("Ana Maria", COPACABANA, &["beagle", "pug"]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: CustomerResponse = read_json(resp).await;

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Ana Maria");
    assert_eq!(updated.address.city, "Rio de Janeiro");
    assert_eq!(updated.pets, created.pets);
}

#[actix_web::test]
async fn missing_customer_is_not_found_everywhere() {
    let app = test_app!(build_state(Arc::default()).await);

    let requests = [
        test::TestRequest::get().uri("/api/v1/customers/42"),
        test::TestRequest::put()
            .uri("/api/v1/customers/42")
            .set_json(customer_body("Nobody", SE, &[])),
        test::TestRequest::delete().uri("/api/v1/customers/42"),
        test::TestRequest::get().uri("/api/v1/customers/42/pets"),
        test::TestRequest::post().uri("/api/v1/customers/42/pets/labrador"),
    ];
    for req in requests {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    let req = test::TestRequest::get().uri("/api/v1/customers").to_request();
    let listed: Vec<CustomerResponse> = read_json(test::call_service(&app, req).await).await;
    assert!(listed.is_empty());
}

#[actix_web::test]
async fn delete_removes_customer_and_pets() {
    let app = test_app!(build_state(Arc::default()).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/customers")
        .set_json(customer_body("Ana", SE, &["labrador", "pug"]))
        .to_request();
    let created: CustomerResponse = read_json(test::call_service(&app, req).await).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/customers/{}", created.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/customers/{}/pets", created.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/customers/{}", created.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn attach_pet_appends_placeholder_dog() {
    let app = test_app!(build_state(Arc::default()).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/customers")
        .set_json(customer_body("Ana", SE, &["beagle"]))
        .to_request();
    let created: CustomerResponse = read_json(test::call_service(&app, req).await).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/customers/{}/pets/labrador", created.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let pet: PetResponse = read_json(resp).await;
    assert_eq!(pet.name, "New Pet");
    assert_eq!(pet.species, "Dog");
    assert_eq!(pet.breed, "labrador");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/customers/{}/pets", created.id))
        .to_request();
    let pets: Vec<PetResponse> = read_json(test::call_service(&app, req).await).await;
    assert_eq!(pets.len(), 2);
    assert_eq!(pets[1], pet);
}

#[actix_web::test]
async fn address_endpoint_resolves_once() {
    let viacep = Arc::new(FakeViaCep::default());
    let app = test_app!(build_state(viacep.clone()).await);

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/api/v1/addresses/22070002")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = read_json(resp).await;
        assert_eq!(body["postal_code"], COPACABANA);
        assert_eq!(body["neighborhood"], "Copacabana");
    }
    assert_eq!(viacep.calls.load(Ordering::SeqCst), 1);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/addresses/{UNKNOWN}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn breed_endpoint_passes_through_lookup() {
    let app = test_app!(build_state(Arc::default()).await);

    let req = test::TestRequest::get()
        .uri("/api/v1/breeds/labrador")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let breed: BreedResponse = read_json(resp).await;
    assert_eq!(breed.name, "Labrador Retriever");
    assert!(!breed.hypoallergenic);

    let req = test::TestRequest::get()
        .uri("/api/v1/breeds/unicorn")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/v1/breeds/timeout")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn metrics_endpoint_renders_prometheus_text() {
    let app = test_app!(build_state(Arc::default()).await);

    let req = test::TestRequest::post()
        .uri("/api/v1/customers")
        .set_json(customer_body("Ana", SE, &[]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = to_bytes(resp.into_body()).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("customer_operations_total"));
}

#[actix_web::test]
async fn malformed_customer_id_gets_json_error() {
    let app = test_app!(build_state(Arc::default()).await);

    let requests = [
        ("/api/v1/customers/abc", test::TestRequest::get()),
        ("/api/v1/customers/abc/pets", test::TestRequest::get()),
        ("/api/v1/customers/1.5/pets/labrador", test::TestRequest::post()),
    ];
    for (uri, req) in requests {
        let resp = test::call_service(&app, req.uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        let body: ErrorBody = read_json(resp).await;
        assert!(body.error.starts_with("invalid path parameter"), "{uri}");
    }
}

#[actix_web::test]
async fn failed_requests_are_counted_by_kind() {
    let app = test_app!(build_state(Arc::default()).await);

    let req = test::TestRequest::get()
        .uri("/api/v1/customers/777")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let body = to_bytes(test::call_service(&app, req).await.into_body())
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("api_errors_total"));
    assert!(text.contains("kind=\"customer_not_found\""));
}
