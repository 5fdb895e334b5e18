pub mod configuration;
pub mod domain;
pub mod errors;
pub mod pipeline;
pub mod recipient_list;
pub mod sparkpost_client;
pub mod startup;
pub mod telemetry;
pub mod transmission_request;
