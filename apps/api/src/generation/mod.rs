// Generation: prompt construction, provider forwarding and the HTTP handlers on top.
// All provider calls go through llm_client.

pub mod handlers;
pub mod proxy;
