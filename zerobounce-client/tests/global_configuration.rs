use std::sync::Arc;
use zerobounce_client::{ApiVersion, Client, Params, Status, configuration, configure};

#[test]
fn test_global_configuration_reaches_default_clients() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v1/validate")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("apikey".into(), "global-key".into()),
            mockito::Matcher::UrlEncoded("email".into(), "someone@example.com".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"address":"someone@example.com","status":"Unknown","sub_status":"Greylisted"}"#)
        .expect(1)
        .create();

    configure(|config| {
        config.host = server.url();
        config.set_api_key("global-key");
        config.api_version = ApiVersion::V1;
    });

    let client = Client::new().unwrap();
    assert!(Arc::ptr_eq(client.configuration(), &configuration()));

    let result = zerobounce_client::validate(&Params::new("someone@example.com")).unwrap();
    mock.assert();
    assert_eq!(result.status(), Some(&Status::Unknown));
    assert!(result.is_invalid());

    // Existing results follow later changes
    configure(|config| {
        config.valid_statuses.insert(Status::Unknown);
    });
    assert!(result.is_valid());
}
