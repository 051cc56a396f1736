//! Mock SPARQL endpoint helpers built on wiremock

use sparql_export::{ConnectionConfig, FeatureToggle, FeatureToggles, SparqlClient};
use wiremock::{MockServer, Request};

/// Plain-HTTP config pointing at a running mock server
pub fn mock_config(server: &MockServer) -> ConnectionConfig {
    let address = server.address();
    ConnectionConfig {
        tls: false,
        ..ConnectionConfig::new([address.ip().to_string()], address.port())
    }
}

/// Client for the mock server with the given toggles
pub fn mock_client(server: &MockServer, toggles: FeatureToggles) -> SparqlClient {
    SparqlClient::new(mock_config(server), toggles).unwrap()
}

/// Toggle set that forces tuple-query exports
pub fn no_gsp() -> FeatureToggles {
    [FeatureToggle::NoGsp].into_iter().collect()
}

/// The `query` field of a form-encoded SPARQL request
pub fn form_query(request: &Request) -> Option<String> {
    url::form_urlencoded::parse(&request.body)
        .find(|(key, _)| key == "query")
        .map(|(_, value)| value.into_owned())
}

/// N-Triples body with `count` statements `<urn:s{i}> <urn:p> "{i}" .`
pub fn numbered_triples(count: usize) -> String {
    (0..count)
        .map(|i| format!("<urn:s{i}> <urn:p> \"{i}\" .\n"))
        .collect()
}

/// Address nothing is listening on
pub fn refused_config() -> ConnectionConfig {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    ConnectionConfig {
        tls: false,
        connect_timeout: std::time::Duration::from_secs(2),
        ..ConnectionConfig::new(["127.0.0.1"], port)
    }
}
