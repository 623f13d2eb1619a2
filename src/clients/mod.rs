pub mod fake_client;
pub mod generation_api;
pub mod http_client;

pub use fake_client::{
    FakeGenerationClient, RecordedGenerateCall, RecordedListCall, RecordedUploadCall,
};
pub use generation_api::GenerationApi;
pub use http_client::{HttpClientConfig, HttpGenerationClient};
