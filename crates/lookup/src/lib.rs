//! HTTP clients for the external collaborators: ViaCEP resolves Brazilian
//! postal codes into addresses and dogapi.dog serves breed metadata. Both
//! implement the lookup contracts declared in `petcare_domain::lookup`.

mod dog_api;
mod http;
mod viacep;

pub use dog_api::DogApiClient;
pub use http::build_http_client;
pub use viacep::ViaCepClient;
