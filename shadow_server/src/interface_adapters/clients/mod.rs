// Outbound HTTP clients for collaborating services.

pub mod words;
